//! Tree-walking evaluation.

use core::cmp::Ordering;

use super::{BinaryOp, Expression, UnaryOp};
use crate::binding::Binding;
use crate::datum::Datum;
use crate::error::{Error, Result, invalid_value};
use crate::parameter::ParameterKind;

impl Expression {
    /// Evaluates the expression against `binding`.
    ///
    /// Reading a variable whose bound value is [`Datum::Inactive`] signals
    /// [`Error::InactiveParameter`]. An `Or` node tolerates that signal on one
    /// side when the other side yields a boolean; the inactive side counts as
    /// `false`.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidValue`] on type mismatches, overflow, and division
    ///   or modulo by zero.
    /// - [`Error::InvalidExpression`] for a bare list, an inactive literal, or
    ///   a variable missing from the binding's context.
    /// - [`Error::InactiveParameter`] as described above.
    pub fn eval<B: Binding + ?Sized>(&self, binding: &B) -> Result<Datum> {
        match self {
            Expression::Literal(Datum::Inactive) => Err(Error::InvalidExpression(
                "the inactive marker cannot be a literal".to_owned(),
            )),
            Expression::Literal(value) => Ok(value.clone()),
            Expression::Variable(p) => {
                let index = binding.context().parameter_index(p).ok_or_else(|| {
                    Error::InvalidExpression(format!("parameter '{}' is not bound", p.name()))
                })?;
                match binding.value(index)? {
                    Datum::Inactive => Err(Error::InactiveParameter(p.name().to_owned())),
                    value => Ok(value.clone()),
                }
            }
            Expression::List(_) => Err(Error::InvalidExpression(
                "a list can only be evaluated as the right operand of '#'".to_owned(),
            )),
            Expression::Unary { op, operand } => eval_unary(*op, &operand.eval(binding)?),
            Expression::Binary { op, left, right } => match op {
                BinaryOp::Or => eval_or(left.eval(binding), right.eval(binding)),
                BinaryOp::And => {
                    let l = expect_bool(&left.eval(binding)?)?;
                    let r = expect_bool(&right.eval(binding)?)?;
                    Ok(Datum::Bool(l && r))
                }
                BinaryOp::In => eval_in(left, right, binding),
                BinaryOp::Equal | BinaryOp::NotEqual => {
                    let equal = eval_equal(left, right, binding)?;
                    Ok(Datum::Bool(equal == (*op == BinaryOp::Equal)))
                }
                BinaryOp::Less
                | BinaryOp::Greater
                | BinaryOp::LessOrEqual
                | BinaryOp::GreaterOrEqual => {
                    let ordering = eval_ordering(left, right, binding)?;
                    Ok(Datum::Bool(match op {
                        BinaryOp::Less => ordering == Ordering::Less,
                        BinaryOp::Greater => ordering == Ordering::Greater,
                        BinaryOp::LessOrEqual => ordering != Ordering::Greater,
                        _ => ordering != Ordering::Less,
                    }))
                }
                arithmetic => {
                    let (l, r) = (left.eval(binding)?, right.eval(binding)?);
                    eval_arithmetic(*arithmetic, &l, &r)
                }
            },
        }
    }
}

fn expect_bool(value: &Datum) -> Result<bool> {
    value
        .as_bool()
        .ok_or_else(|| invalid_value!("expected a boolean, got {value}"))
}

fn eval_or(left: Result<Datum>, right: Result<Datum>) -> Result<Datum> {
    let side = |r: Result<Datum>| -> Result<Option<bool>> {
        match r {
            Ok(v) => expect_bool(&v).map(Some),
            Err(e) if e.is_inactive() => Ok(None),
            Err(e) => Err(e),
        }
    };
    let inactive = match (&left, &right) {
        (Err(e), Err(other)) if e.is_inactive() && other.is_inactive() => Some(e.clone()),
        _ => None,
    };
    match (side(left)?, side(right)?) {
        (None, None) => Err(inactive.unwrap_or_else(|| {
            Error::InvalidExpression("both operands of '||' are inactive".to_owned())
        })),
        (l, r) => Ok(Datum::Bool(l.unwrap_or(false) || r.unwrap_or(false))),
    }
}

fn eval_unary(op: UnaryOp, value: &Datum) -> Result<Datum> {
    match (op, value) {
        (UnaryOp::Positive, Datum::Int(_) | Datum::Float(_)) => Ok(value.clone()),
        (UnaryOp::Negative, Datum::Int(v)) => v
            .checked_neg()
            .map(Datum::Int)
            .ok_or_else(|| invalid_value!("integer overflow negating {v}")),
        (UnaryOp::Negative, Datum::Float(v)) => Ok(Datum::Float(-v)),
        (UnaryOp::Not, Datum::Bool(b)) => Ok(Datum::Bool(!b)),
        (op, value) => Err(invalid_value!(
            "operator '{}' does not apply to {value}",
            op.symbol()
        )),
    }
}

/// The enumerated parameter behind a variable operand, if any.
fn enumerated(e: &Expression) -> Option<&crate::parameter::Parameter> {
    match e {
        Expression::Variable(p) => match p.kind() {
            ParameterKind::Categorical(_)
            | ParameterKind::Ordinal(_)
            | ParameterKind::Discrete(_) => Some(p),
            _ => None,
        },
        _ => None,
    }
}

fn eval_equal<B: Binding + ?Sized>(
    left: &Expression,
    right: &Expression,
    binding: &B,
) -> Result<bool> {
    let l = left.eval(binding)?;
    let r = right.eval(binding)?;
    if let Some(p) = enumerated(left).or_else(|| enumerated(right)) {
        let index = |v: &Datum| {
            p.index_of(v)
                .ok_or_else(|| invalid_value!("{v} is not a value of '{}'", p.name()))
        };
        return Ok(index(&l)? == index(&r)?);
    }
    l.equals(&r)
}

fn eval_ordering<B: Binding + ?Sized>(
    left: &Expression,
    right: &Expression,
    binding: &B,
) -> Result<Ordering> {
    let l = left.eval(binding)?;
    let r = right.eval(binding)?;
    if let Some(p) = enumerated(left).or_else(|| enumerated(right)) {
        match p.kind() {
            ParameterKind::Categorical(_) => {
                return Err(invalid_value!(
                    "categorical parameter '{}' has no order",
                    p.name()
                ));
            }
            ParameterKind::Ordinal(_) => return p.compare_values(&l, &r),
            _ => {}
        }
    }
    l.compare(&r)
}

fn eval_in<B: Binding + ?Sized>(
    left: &Expression,
    right: &Expression,
    binding: &B,
) -> Result<Datum> {
    let Expression::List(items) = right else {
        let message = "the right operand of '#' must be a list";
        return Err(Error::InvalidExpression(message.to_owned()));
    };
    let value = left.eval(binding)?;
    for item in items.iter() {
        let candidate = item.eval(binding)?;
        // Type mismatches count as "not equal" rather than as errors.
        if value.equals(&candidate).unwrap_or(false) {
            return Ok(Datum::Bool(true));
        }
    }
    Ok(Datum::Bool(false))
}

fn eval_arithmetic(op: BinaryOp, l: &Datum, r: &Datum) -> Result<Datum> {
    match (l, r) {
        (Datum::Int(a), Datum::Int(b)) => {
            let (a, b) = (*a, *b);
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0 {
                return Err(invalid_value!("division by zero"));
            }
            let result = match op {
                BinaryOp::Add => a.checked_add(b),
                BinaryOp::Subtract => a.checked_sub(b),
                BinaryOp::Multiply => a.checked_mul(b),
                BinaryOp::Divide => a.checked_div(b),
                _ => a.checked_rem(b),
            };
            result
                .map(Datum::Int)
                .ok_or_else(|| invalid_value!("integer overflow in {a} {} {b}", op.symbol()))
        }
        (l, r) if l.is_numeric() && r.is_numeric() => {
            let (a, b) = (l.as_f64().unwrap_or(f64::NAN), r.as_f64().unwrap_or(f64::NAN));
            if matches!(op, BinaryOp::Divide | BinaryOp::Modulo) && b == 0.0 {
                return Err(invalid_value!("division by zero"));
            }
            Ok(Datum::Float(match op {
                BinaryOp::Add => a + b,
                BinaryOp::Subtract => a - b,
                BinaryOp::Multiply => a * b,
                BinaryOp::Divide => a / b,
                _ => a % b,
            }))
        }
        (l, r) => Err(invalid_value!(
            "operator '{}' needs numbers, got {l} and {r}",
            op.symbol()
        )),
    }
}

#[cfg(test)]
#[allow(clippy::float_cmp)]
mod tests {
    use super::*;
    use crate::binding::{BoundValues, Context, ParameterSet};
    use crate::parameter::Parameter;

    struct Fixture {
        ctx: ParameterSet,
    }

    impl Fixture {
        fn new() -> Self {
            let ctx = ParameterSet::new(vec![
                Parameter::float("x", -1.0, 1.0).build().unwrap(),
                Parameter::int("n", 0, 10).build().unwrap(),
                Parameter::categorical("c", ["a", "b", "c"])
                    .build()
                    .unwrap(),
                Parameter::ordinal("o", ["lo", "mid", "hi"])
                    .build()
                    .unwrap(),
                Parameter::discrete("d", [1, 2, 4]).build().unwrap(),
            ])
            .unwrap();
            Self { ctx }
        }

        fn eval(&self, text: &str, values: &[Datum]) -> Result<Datum> {
            let e = Expression::parse(text, &self.ctx).unwrap();
            e.eval(&BoundValues::new(&self.ctx, values).unwrap())
        }

        fn values(&self) -> Vec<Datum> {
            vec![
                Datum::Float(-0.5),
                Datum::Int(3),
                Datum::from("b"),
                Datum::from("mid"),
                Datum::Int(2),
            ]
        }
    }

    #[test]
    fn arithmetic_keeps_integers() {
        let f = Fixture::new();
        let v = f.values();
        assert_eq!(f.eval("n * 2 + 1", &v).unwrap(), Datum::Int(7));
        assert_eq!(f.eval("7 / 2", &v).unwrap(), Datum::Int(3));
        assert_eq!(f.eval("7 % 4", &v).unwrap(), Datum::Int(3));
        assert_eq!(f.eval("n + x", &v).unwrap(), Datum::Float(2.5));
        assert_eq!(f.eval("-n", &v).unwrap(), Datum::Int(-3));
        assert_eq!(f.eval("5.5 % 2", &v).unwrap(), Datum::Float(1.5));
    }

    #[test]
    fn division_by_zero_is_invalid() {
        let f = Fixture::new();
        let v = f.values();
        assert!(matches!(f.eval("n / 0", &v), Err(Error::InvalidValue(_))));
        assert!(matches!(f.eval("n % 0", &v), Err(Error::InvalidValue(_))));
        assert!(matches!(f.eval("x / 0.0", &v), Err(Error::InvalidValue(_))));
        assert!(matches!(
            f.eval("9223372036854775807 + 1", &v),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn type_mismatches_are_invalid() {
        let f = Fixture::new();
        let v = f.values();
        assert!(matches!(
            f.eval("x + \"s\"", &v),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(f.eval("!n", &v), Err(Error::InvalidValue(_))));
        assert!(matches!(
            f.eval("n && true", &v),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            f.eval("\"s\" == 1", &v),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn comparisons() {
        let f = Fixture::new();
        let v = f.values();
        assert_eq!(f.eval("x < 0", &v).unwrap(), Datum::Bool(true));
        assert_eq!(f.eval("n >= 3.0", &v).unwrap(), Datum::Bool(true));
        assert_eq!(f.eval("n != 3", &v).unwrap(), Datum::Bool(false));
        assert_eq!(f.eval("\"abc\" < \"abd\"", &v).unwrap(), Datum::Bool(true));
    }

    #[test]
    fn enumerated_comparisons() {
        let f = Fixture::new();
        let v = f.values();
        assert_eq!(f.eval("c == \"b\"", &v).unwrap(), Datum::Bool(true));
        assert!(matches!(
            f.eval("c == \"z\"", &v),
            Err(Error::InvalidValue(_))
        ));
        assert!(matches!(
            f.eval("c < \"c\"", &v),
            Err(Error::InvalidValue(_))
        ));
        // Ordinal order is the declared rank, not the string order.
        assert_eq!(f.eval("o < \"lo\"", &v).unwrap(), Datum::Bool(false));
        assert_eq!(f.eval("o < \"hi\"", &v).unwrap(), Datum::Bool(true));
        assert_eq!(f.eval("\"hi\" > o", &v).unwrap(), Datum::Bool(true));
        assert_eq!(f.eval("d == 2.0", &v).unwrap(), Datum::Bool(true));
        assert_eq!(f.eval("d < 3", &v).unwrap(), Datum::Bool(true));
    }

    #[test]
    fn membership_tolerates_mismatches() {
        let f = Fixture::new();
        let v = f.values();
        assert_eq!(f.eval("c # [\"a\", \"b\"]", &v).unwrap(), Datum::Bool(true));
        assert_eq!(f.eval("c # [1, \"c\"]", &v).unwrap(), Datum::Bool(false));
        assert_eq!(f.eval("n # [1.0, 3.0]", &v).unwrap(), Datum::Bool(true));
        assert_eq!(f.eval("n # []", &v).unwrap(), Datum::Bool(false));
    }

    #[test]
    fn inactive_variables_signal() {
        let f = Fixture::new();
        let mut v = f.values();
        v[0] = Datum::Inactive;
        assert_eq!(
            f.eval("x < 0", &v),
            Err(Error::InactiveParameter("x".to_owned()))
        );
        assert!(f.eval("x < 0 && n > 1", &v).unwrap_err().is_inactive());
    }

    #[test]
    fn or_survives_one_inactive_side() {
        let f = Fixture::new();
        let mut v = f.values();
        v[0] = Datum::Inactive;
        assert_eq!(f.eval("x < 0 || n == 3", &v).unwrap(), Datum::Bool(true));
        assert_eq!(f.eval("n == 4 || x < 0", &v).unwrap(), Datum::Bool(false));

        v[1] = Datum::Inactive;
        assert!(f.eval("x < 0 || n == 3", &v).unwrap_err().is_inactive());
        // Real errors are not absorbed.
        assert!(matches!(
            f.eval("x < 0 || c < \"b\"", &v),
            Err(Error::InvalidValue(_))
        ));
    }

    #[test]
    fn bare_list_is_not_evaluable() {
        let f = Fixture::new();
        let list = Expression::list(vec![Expression::literal(1)]).unwrap();
        let values = f.values();
        let binding = BoundValues::new(&f.ctx, &values).unwrap();
        assert!(matches!(
            list.eval(&binding),
            Err(Error::InvalidExpression(_))
        ));
    }

    #[test]
    fn unbound_variable() {
        let f = Fixture::new();
        let stranger = Parameter::float("y", 0.0, 1.0).build().unwrap();
        let values = f.values();
        let binding = BoundValues::new(&f.ctx, &values).unwrap();
        assert_eq!(f.ctx.num_parameters(), 5);
        assert!(matches!(
            Expression::variable(&stranger).eval(&binding),
            Err(Error::InvalidExpression(_))
        ));
    }
}
