use configspace::prelude::*;

fn space() -> (ConfigurationSpace, Parameter, Parameter, Parameter) {
    let kernel = Parameter::categorical("kernel", ["linear", "poly", "rbf"])
        .build()
        .unwrap();
    let degree = Parameter::int("degree", 1, 6)
        .default_value(2)
        .build()
        .unwrap();
    let c = Parameter::float("c", 0.0, 10.0)
        .default_value(1.0)
        .build()
        .unwrap();
    let space = ConfigurationSpace::builder("svm")
        .parameters([kernel.clone(), degree.clone(), c.clone()])
        .condition_text(&degree, r#"kernel == "poly""#)
        .forbidden_clause_text("degree > 4 && c > 5.0")
        .forbidden_clause_text(r#"kernel # ["rbf"] && c < 0.5"#)
        .seed(33)
        .build()
        .unwrap();
    (space, kernel, degree, c)
}

#[test]
fn sampled_configurations_avoid_forbidden_regions() {
    let (space, kernel, degree, c) = space();
    for s in space.samples(1000).unwrap() {
        let cv = s.value_of(&c).unwrap().as_f64().unwrap();
        if let Some(d) = s.value_of(&degree).unwrap().as_i64() {
            assert!(!(d > 4 && cv > 5.0), "{s}");
        }
        if s.value_of(&kernel).unwrap() == &Datum::from("rbf") {
            assert!(cv >= 0.5, "{s}");
        }
    }
}

#[test]
fn configuration_is_rejected_iff_an_active_clause_holds() {
    use Datum::{Float, Inactive, Int};

    let (space, ..) = space();
    let check = |values: Vec<Datum>| {
        let c = Configuration::new(&space, values).unwrap();
        space.check_configuration(&c).unwrap()
    };

    assert!(!check(vec![Datum::from("poly"), Int(5), Float(6.0)]));
    assert!(check(vec![Datum::from("poly"), Int(4), Float(6.0)]));
    // degree is inactive for rbf, so the first clause is skipped.
    assert!(check(vec![Datum::from("rbf"), Inactive, Float(6.0)]));
    assert!(!check(vec![Datum::from("rbf"), Inactive, Float(0.1)]));
    assert!(check(vec![Datum::from("linear"), Inactive, Float(0.1)]));
}

#[test]
fn check_reports_the_holding_clause() {
    let (space, ..) = space();
    let c = Configuration::new(
        &space,
        vec![Datum::from("poly"), Datum::Int(5), Datum::Float(6.0)],
    )
    .unwrap();
    let Err(Error::InvalidConfiguration(reason)) = c.check() else {
        panic!("expected a violation");
    };
    assert!(reason.contains("degree > 4 && c > 5.0"), "{reason}");
}

#[test]
fn clauses_holding_for_the_defaults_fail_the_build() {
    let x = Parameter::float("x", 0.0, 1.0)
        .default_value(0.5)
        .build()
        .unwrap();
    let built = ConfigurationSpace::builder("f")
        .parameter(x)
        .forbidden_clause_text("x == 0.5")
        .build();
    assert!(matches!(built, Err(Error::InvalidConfiguration(_))));
}
