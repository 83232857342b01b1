use configspace::prelude::*;

fn mixed_space(seed: u64) -> ConfigurationSpace {
    let lr = Parameter::float("lr", 1e-5, 1.0)
        .default_value(1e-3)
        .build()
        .unwrap();
    let layers = Parameter::int("layers", 1, 9).build().unwrap();
    let width = Parameter::discrete("width", [32_i64, 64, 128, 256])
        .build()
        .unwrap();
    let act = Parameter::ordinal("act", ["relu", "gelu", "swish"])
        .build()
        .unwrap();
    let dropout = Parameter::float("dropout", 0.0, 0.5)
        .quantization(0.1)
        .build()
        .unwrap();
    ConfigurationSpace::builder("net")
        .parameters([lr, layers, width, act, dropout.clone()])
        .condition_text(&dropout, "layers > 2")
        .forbidden_clause_text("width == 256 && layers >= 8")
        .seed(seed)
        .build()
        .unwrap()
}

#[test]
fn every_sample_is_valid() {
    let space = mixed_space(1);
    let samples = space.samples(2000).unwrap();
    assert_eq!(samples.len(), 2000);
    for c in &samples {
        assert!(space.check_configuration(c).unwrap(), "{c}");
        c.check().unwrap();
    }
}

#[test]
fn seeds_make_sampling_reproducible() {
    let a = mixed_space(77).samples(20).unwrap();
    let b = mixed_space(77).samples(20).unwrap();
    let values = |cs: Vec<Configuration>| -> Vec<Vec<Datum>> {
        cs.into_iter().map(Configuration::into_values).collect()
    };
    assert_eq!(values(a), values(b));

    let space = mixed_space(5);
    let first = space.samples(5).unwrap();
    space.set_seed(5);
    let again = space.samples(5).unwrap();
    assert_eq!(first, again);
}

#[test]
fn quantized_values_stay_on_the_grid() {
    let space = mixed_space(8);
    let dropout = space.parameter_by_name("dropout").unwrap().clone();
    for c in space.samples(300).unwrap() {
        if let Some(v) = c.value_of(&dropout).unwrap().as_f64() {
            let steps = v / 0.1;
            assert!((steps - steps.round()).abs() < 1e-9, "{v}");
            assert!(v < 0.5);
        }
    }
}

#[test]
fn sampling_from_an_unreachable_region_fails_whole() {
    let x = Parameter::float("x", 0.0, 1.0).build().unwrap();
    let space = ConfigurationSpace::builder("u")
        .parameter(x)
        .seed(4)
        .build()
        .unwrap();
    let outside = Distribution::uniform_float(2.0, 3.0, Scale::Linear, 0.0).unwrap();
    space.set_distribution(&outside, &[0]).unwrap();
    assert_eq!(
        space.samples(8),
        Err(Error::SamplingUnsuccessful {
            requested: 8,
            obtained: 0
        })
    );
}

#[test]
fn normal_distributions_are_clipped_by_rejection() {
    let x = Parameter::float("x", -1.0, 1.0).build().unwrap();
    let space = ConfigurationSpace::builder("n")
        .parameter(x)
        .seed(6)
        .build()
        .unwrap();
    let wide = Distribution::normal_float(0.0, 1.0, Scale::Linear, 0.0).unwrap();
    space.set_distribution(&wide, &[0]).unwrap();
    for c in space.samples(500).unwrap() {
        let v = c.values()[0].as_f64().unwrap();
        assert!((-1.0..1.0).contains(&v));
    }
}
