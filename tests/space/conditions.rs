use configspace::prelude::*;

fn chain() -> (ConfigurationSpace, Vec<Parameter>) {
    let a = Parameter::categorical("a", ["on", "off"]).build().unwrap();
    let b = Parameter::int("b", 0, 8).default_value(4).build().unwrap();
    let c = Parameter::ordinal("c", ["low", "mid", "high"])
        .build()
        .unwrap();
    let d = Parameter::float("d", 0.0, 1.0).build().unwrap();
    let space = ConfigurationSpace::builder("chain")
        .parameters([d.clone(), c.clone(), b.clone(), a.clone()])
        .condition_text(&b, r#"a == "on""#)
        .condition_text(&c, "b >= 2")
        .condition_text(&d, r#"c > "low" || a == "off""#)
        .seed(12)
        .build()
        .unwrap();
    (space, vec![a, b, c, d])
}

#[test]
fn sorted_indexes_put_parents_first() {
    let (space, _) = chain();
    let order = space.sorted_indexes();
    let position = |i: usize| order.iter().position(|&j| j == i).unwrap();
    for child in 0..space.num_parameters() {
        for parent in space.parents(child).unwrap() {
            assert!(position(parent) < position(child));
        }
    }
    assert_eq!(space.parents(0).unwrap(), vec![1, 3]);
    assert_eq!(space.children(3).unwrap(), vec![0, 2]);
}

#[test]
fn inactive_operands_only_fail_their_side_of_an_or() {
    let (space, _) = chain();
    // a is off: b and c are inactive, but d is active through the right side.
    let mut values = vec![
        Datum::Float(0.3),
        Datum::from("mid"),
        Datum::Int(5),
        Datum::from("off"),
    ];
    space.set_actives(&mut values).unwrap();
    let expected = [
        Datum::Float(0.3),
        Datum::Inactive,
        Datum::Inactive,
        Datum::from("off"),
    ];
    assert_eq!(values, expected);
}

#[test]
fn samples_are_valid_and_reach_every_branch() {
    let (space, params) = chain();
    let samples = space.samples(500).unwrap();
    let mut d_active = 0;
    for c in &samples {
        assert!(space.check_configuration(c).unwrap(), "{c}");
        if !c.value_of(&params[3]).unwrap().is_inactive() {
            d_active += 1;
        }
    }
    assert!(d_active > 0 && d_active < samples.len());
}

#[test]
fn set_condition_updates_sampling() {
    let (space, params) = chain();
    let always_off = Expression::parse("b > 100", &space).unwrap();
    space.set_condition(&params[2], Some(always_off)).unwrap();
    for c in space.samples(50).unwrap() {
        assert!(c.value_of(&params[2]).unwrap().is_inactive());
    }
}

#[test]
fn conditions_on_categoricals_reject_orderings_and_unknown_values() {
    let a = Parameter::categorical("a", ["on", "off"]).build().unwrap();
    let b = Parameter::int("b", 0, 8).build().unwrap();

    let ordering = ConfigurationSpace::builder("x")
        .parameters([a.clone(), b.clone()])
        .condition_text(&b, r#"a < "on""#)
        .build();
    assert!(matches!(ordering, Err(Error::InvalidExpression(_))));

    let unknown = ConfigurationSpace::builder("x")
        .parameters([a, b.clone()])
        .condition_text(&b, r#"a == "maybe""#)
        .build();
    assert!(matches!(unknown, Err(Error::InvalidValue(_))));
}

#[test]
fn non_boolean_conditions_are_rejected() {
    let x = Parameter::float("x", 0.0, 1.0).build().unwrap();
    let y = Parameter::float("y", 0.0, 1.0).build().unwrap();
    let built = ConfigurationSpace::builder("x")
        .parameters([x, y.clone()])
        .condition_text(&y, "x * 2")
        .build();
    assert!(matches!(built, Err(Error::InvalidCondition(_))));
}
