use configspace::BoundValues;
use configspace::expression::{BinaryOp, ExpressionType, UnaryOp};
use configspace::prelude::*;

struct Fixture {
    set: ParameterSet,
    rate: Parameter,
    mode: Parameter,
    level: Parameter,
}

fn fixture() -> Fixture {
    let rate = Parameter::float("rate", 0.0, 1.0).build().unwrap();
    let mode = Parameter::categorical("mode", ["fast", "safe"])
        .build()
        .unwrap();
    let level = Parameter::ordinal("level", ["low", "mid", "high"])
        .build()
        .unwrap();
    let set = ParameterSet::new(vec![rate.clone(), mode.clone(), level.clone()]).unwrap();
    Fixture {
        set,
        rate,
        mode,
        level,
    }
}

fn eval(f: &Fixture, text: &str, values: &[Datum]) -> Result<Datum> {
    let e = Expression::parse(text, &f.set)?;
    e.eval(&BoundValues::new(&f.set, values)?)
}

#[test]
fn trees_built_by_hand_match_parsed_ones() {
    let f = fixture();
    let by_hand = Expression::binary(
        BinaryOp::Less,
        Expression::variable(&f.rate),
        Expression::literal(0.5),
    )
    .unwrap()
    .and(
        Expression::binary(
            BinaryOp::In,
            Expression::variable(&f.mode),
            Expression::list(vec![Expression::literal("fast")]).unwrap(),
        )
        .unwrap(),
    )
    .unwrap();
    let parsed = Expression::parse(r#"rate < 0.5 && mode # ["fast"]"#, &f.set).unwrap();
    assert_eq!(by_hand, parsed);
    assert_eq!(parsed.expression_type(), ExpressionType::And);
    assert_eq!(parsed.parameters(), vec![f.rate.clone(), f.mode.clone()]);
    parsed.check_context(&f.set).unwrap();
}

#[test]
fn evaluation_against_bindings() {
    let f = fixture();
    let values = [Datum::Float(0.25), Datum::from("safe"), Datum::from("mid")];
    assert_eq!(eval(&f, "rate * 4 + 1", &values), Ok(Datum::Float(2.0)));
    let (yes, no) = (Ok(Datum::Bool(true)), Ok(Datum::Bool(false)));
    assert_eq!(eval(&f, r#"level >= "mid""#, &values), yes);
    assert_eq!(eval(&f, r#"level > "mid""#, &values), no);
    assert_eq!(eval(&f, r#"mode != "fast""#, &values), yes);
    assert_eq!(eval(&f, "7 / 2 == 3", &values), yes);
    assert_eq!(eval(&f, "!(rate > 0.5)", &values), yes);
}

#[test]
fn inactive_values_short_only_the_or() {
    let f = fixture();
    let values = [Datum::Inactive, Datum::from("fast"), Datum::from("low")];
    assert_eq!(
        eval(&f, r#"rate > 0.5 || mode == "fast""#, &values),
        Ok(Datum::Bool(true))
    );
    assert_eq!(
        eval(&f, r#"rate > 0.5 && mode == "fast""#, &values),
        Err(Error::InactiveParameter("rate".into()))
    );
    assert_eq!(
        eval(&f, "rate > 0.5 || rate < 0.1", &values),
        Err(Error::InactiveParameter("rate".into()))
    );
}

#[test]
fn evaluation_errors() {
    let f = fixture();
    let values = [Datum::Float(0.25), Datum::from("safe"), Datum::from("mid")];
    let invalid = |text: &str| matches!(eval(&f, text, &values), Err(Error::InvalidValue(_)));
    assert!(invalid("1 / 0"));
    assert!(invalid("rate / 0.0"));
    assert!(invalid("rate && true"));
    assert!(invalid(r#"mode < "safe""#));
    assert!(matches!(
        Expression::unary(UnaryOp::Not, Expression::list(vec![]).unwrap()),
        Err(_)
    ));
}

#[test]
fn display_parses_back() {
    let f = fixture();
    for text in [
        "rate < 0.5",
        r#"(rate < 0.5 || mode == "safe") && level != "low""#,
        "-rate * (2 - 1) % 3",
        r#"level # ["low", "high"]"#,
        "!(rate >= 0.1)",
        "rate < -(1) || rate > +(0.5)",
    ] {
        let e = Expression::parse(text, &f.set).unwrap();
        assert_eq!(e.to_string(), text);
        assert_eq!(Expression::parse(&e.to_string(), &f.set).unwrap(), e);
    }
    let membership = Expression::parse(r#"level # ["low", "high"]"#, &f.set).unwrap();
    assert_eq!(membership.parameters(), vec![f.level.clone()]);
}

#[test]
fn unknown_names_and_bad_syntax_fail() {
    let f = fixture();
    for text in [
        "missing > 1",
        "rate <",
        "rate # 3",
        "(rate",
        "[1, [2]]",
        "rate < 1e999",
    ] {
        let parsed = Expression::parse(text, &f.set);
        assert!(matches!(parsed, Err(Error::InvalidExpression(_))), "{text}");
    }
}

#[test]
fn signed_number_operands_survive_printing() {
    let f = fixture();
    let rate = Expression::variable(&f.rate);
    let negated = Expression::unary(UnaryOp::Negative, Expression::literal(1)).unwrap();
    let tree = Expression::binary(BinaryOp::Less, rate, negated).unwrap();
    assert_eq!(tree.to_string(), "rate < -(1)");
    assert_eq!(Expression::parse(&tree.to_string(), &f.set).unwrap(), tree);
    assert_ne!(tree, Expression::parse("rate < -1", &f.set).unwrap());
}

#[test]
fn non_finite_literals_are_refused() {
    let f = fixture();
    let rate = Expression::variable(&f.rate);
    let infinite = Expression::literal(f64::INFINITY);
    let tree = Expression::binary(BinaryOp::Less, rate, infinite).unwrap();
    assert!(matches!(
        tree.check_context(&f.set),
        Err(Error::InvalidValue(_))
    ));
}
