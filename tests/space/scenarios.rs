use configspace::distribution::DistributionKind;
use configspace::prelude::*;

#[test]
fn default_configuration_marks_inactive_children() {
    let x = Parameter::float("x", -1.0, 1.0)
        .default_value(0.0)
        .build()
        .unwrap();
    let y = Parameter::int("y", 0, 10).build().unwrap();
    let space = ConfigurationSpace::builder("a")
        .parameters([x, y.clone()])
        .condition_text(&y, "x < 0")
        .build()
        .unwrap();

    let defaults = space.default_configuration().unwrap();
    assert_eq!(defaults.values(), &[Datum::Float(0.0), Datum::Inactive]);
    assert!(space.check_configuration(&defaults).unwrap());
}

#[test]
fn sampled_activity_follows_the_condition() {
    let p1 = Parameter::float("p1", -1.0, 1.0).build().unwrap();
    let p2 = Parameter::int("p2", 0, 10).build().unwrap();
    let space = ConfigurationSpace::builder("b")
        .parameters([p1.clone(), p2.clone()])
        .condition_text(&p2, "p1 < 0")
        .seed(2024)
        .build()
        .unwrap();

    let samples = space.samples(1000).unwrap();
    assert_eq!(samples.len(), 1000);
    let mut inactive = 0;
    for c in &samples {
        let v1 = c.value_of(&p1).unwrap().as_f64().unwrap();
        let v2 = c.value_of(&p2).unwrap();
        assert_eq!(v2.is_inactive(), v1 >= 0.0, "{c}");
        if v2.is_inactive() {
            inactive += 1;
        } else {
            let n = v2.as_i64().unwrap();
            assert!((0..10).contains(&n), "{c}");
        }
    }
    // Both branches show up.
    assert!((350..650).contains(&inactive), "{inactive} inactive");
}

#[test]
fn roulette_weights_drive_enumerated_sampling() {
    let roulette = Distribution::roulette(&[1.0, 1.0, 2.0]).unwrap();
    let DistributionKind::Roulette(r) = roulette.kind() else {
        panic!("expected a roulette");
    };
    assert_eq!(r.cumulative(), &[0.0, 0.25, 0.5, 1.0]);
    assert_eq!(r.index_for(0.6), 2);

    let c = Parameter::categorical("c", ["a", "b", "c"])
        .build()
        .unwrap();
    let space = ConfigurationSpace::builder("c")
        .parameter(c)
        .seed(9)
        .build()
        .unwrap();
    space.set_distribution(&roulette, &[0]).unwrap();
    let third = space
        .samples(4000)
        .unwrap()
        .iter()
        .filter(|s| s.values()[0] == Datum::from("c"))
        .count();
    assert!((1_800..2_200).contains(&third), "{third} draws of \"c\"");
}

#[test]
fn mixture_covers_both_ranges() {
    let low = Distribution::uniform_float(0.0, 1.0, Scale::Linear, 0.0).unwrap();
    let high = Distribution::uniform_float(10.0, 11.0, Scale::Linear, 0.0).unwrap();
    let mixture = Distribution::mixture(vec![low, high], &[1.0, 1.0]).unwrap();
    assert_eq!(
        mixture.bounds(),
        vec![configspace::interval::Interval::float(0.0, 11.0)]
    );

    let x = Parameter::float("x", 0.0, 11.0).build().unwrap();
    let space = ConfigurationSpace::builder("d")
        .parameter(x)
        .seed(17)
        .build()
        .unwrap();
    let ds = DistributionSpace::new(&space).unwrap();
    ds.set_distribution(&mixture, &[0]).unwrap();

    let mut rng = fastrand::Rng::with_seed(3);
    let samples = space.samples_with(Some(&ds), Some(&mut rng), 2000).unwrap();
    let mut in_low = 0;
    for c in &samples {
        let v = c.values()[0].as_f64().unwrap();
        assert!((0.0..1.0).contains(&v) || (10.0..11.0).contains(&v), "{v}");
        if v < 1.0 {
            in_low += 1;
        }
    }
    assert!((900..1_100).contains(&in_low), "{in_low} of 2000 below 1");
}
