//! Infix expression parser built on `nom`.
//!
//! Parsing runs in two passes: the grammar produces a name-based syntax tree,
//! which is then resolved against a [`Context`].

use nom::IResult;
use nom::Parser;
use nom::branch::alt;
use nom::bytes::complete::{escaped_transform, is_not, tag};
use nom::character::complete::{alpha1, alphanumeric1, char, digit0, digit1, multispace0, one_of};
use nom::combinator::{all_consuming, map, map_res, opt, recognize, value};
use nom::error::Error as NomError;
use nom::multi::{many0_count, separated_list0};
use nom::sequence::{delimited, pair, preceded, tuple};

use super::{BinaryOp, Expression, UnaryOp};
use crate::binding::Context;
use crate::datum::Datum;
use crate::error::{Error, Result};

#[derive(Clone, Debug)]
enum Syntax {
    Literal(Datum),
    Name(String),
    Binary(BinaryOp, Box<Syntax>, Box<Syntax>),
    Unary(UnaryOp, Box<Syntax>),
    List(Vec<Syntax>),
}

impl Expression {
    /// Parses `text`, resolving variable names in `context`.
    ///
    /// Parsing checks syntax and names only; use
    /// [`check_context`](Self::check_context) to validate literals against
    /// the parameters they are compared with.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] on syntax errors, float literals
    /// that overflow, unknown names and misplaced lists.
    pub fn parse(text: &str, context: &dyn Context) -> Result<Self> {
        let (_, syntax) = all_consuming(delimited(multispace0, or_expr, multispace0))(text)
            .map_err(|e| Error::InvalidExpression(format!("cannot parse '{text}': {e}")))?;
        resolve(syntax, context)
    }
}

fn resolve(syntax: Syntax, context: &dyn Context) -> Result<Expression> {
    match syntax {
        Syntax::Literal(value) => Ok(Expression::Literal(value)),
        Syntax::Name(name) => context
            .parameter_by_name(&name)
            .map(Expression::variable)
            .ok_or_else(|| Error::InvalidExpression(format!("unknown parameter '{name}'"))),
        Syntax::Binary(op, left, right) => {
            Expression::binary(op, resolve(*left, context)?, resolve(*right, context)?)
        }
        Syntax::Unary(op, operand) => Expression::unary(op, resolve(*operand, context)?),
        Syntax::List(items) => Expression::list(
            items
                .into_iter()
                .map(|item| resolve(item, context))
                .collect::<Result<_>>()?,
        ),
    }
}

type ParseResult<'a> = IResult<&'a str, Syntax>;

fn ws<'a, O, P>(inner: P) -> impl FnMut(&'a str) -> IResult<&'a str, O>
where
    P: Parser<&'a str, O, NomError<&'a str>>,
{
    delimited(multispace0, inner, multispace0)
}

/// One left-associative precedence level.
fn left_assoc<'a, O>(
    operand: fn(&'a str) -> ParseResult<'a>,
    mut operator: O,
) -> impl FnMut(&'a str) -> ParseResult<'a>
where
    O: Parser<&'a str, BinaryOp, NomError<&'a str>>,
{
    move |input| {
        let (mut input, mut lhs) = operand(input)?;
        loop {
            let (after, op) = match preceded(multispace0, |i| operator.parse(i))(input) {
                Ok(found) => found,
                Err(nom::Err::Error(_)) => return Ok((input, lhs)),
                Err(e) => return Err(e),
            };
            let (rest, rhs) = operand(after)?;
            lhs = Syntax::Binary(op, Box::new(lhs), Box::new(rhs));
            input = rest;
        }
    }
}

fn or_expr(input: &str) -> ParseResult<'_> {
    left_assoc(and_expr, value(BinaryOp::Or, tag("||")))(input)
}

fn and_expr(input: &str) -> ParseResult<'_> {
    left_assoc(equality, value(BinaryOp::And, tag("&&")))(input)
}

fn equality(input: &str) -> ParseResult<'_> {
    left_assoc(
        relation,
        alt((
            value(BinaryOp::Equal, tag("==")),
            value(BinaryOp::NotEqual, tag("!=")),
        )),
    )(input)
}

fn relation(input: &str) -> ParseResult<'_> {
    left_assoc(
        membership,
        alt((
            value(BinaryOp::LessOrEqual, tag("<=")),
            value(BinaryOp::GreaterOrEqual, tag(">=")),
            value(BinaryOp::Less, tag("<")),
            value(BinaryOp::Greater, tag(">")),
        )),
    )(input)
}

fn membership(input: &str) -> ParseResult<'_> {
    left_assoc(additive, value(BinaryOp::In, tag("#")))(input)
}

fn additive(input: &str) -> ParseResult<'_> {
    left_assoc(
        multiplicative,
        alt((
            value(BinaryOp::Add, tag("+")),
            value(BinaryOp::Subtract, tag("-")),
        )),
    )(input)
}

fn multiplicative(input: &str) -> ParseResult<'_> {
    left_assoc(
        unary,
        alt((
            value(BinaryOp::Multiply, tag("*")),
            value(BinaryOp::Divide, tag("/")),
            value(BinaryOp::Modulo, tag("%")),
        )),
    )(input)
}

fn unary(input: &str) -> ParseResult<'_> {
    alt((
        // A minus sign directly followed by digits belongs to the literal.
        map(number, Syntax::Literal),
        map(
            pair(
                ws(alt((
                    value(UnaryOp::Positive, char('+')),
                    value(UnaryOp::Negative, char('-')),
                    value(UnaryOp::Not, char('!')),
                ))),
                unary,
            ),
            |(op, operand)| Syntax::Unary(op, Box::new(operand)),
        ),
        primary,
    ))(input)
}

fn primary(input: &str) -> ParseResult<'_> {
    ws(alt((
        map(string, |s| Syntax::Literal(Datum::String(s))),
        map(
            delimited(
                ws(char('[')),
                separated_list0(ws(char(',')), or_expr),
                ws(char(']')),
            ),
            Syntax::List,
        ),
        delimited(ws(char('(')), or_expr, ws(char(')'))),
        map(identifier, |name| match name {
            "none" => Syntax::Literal(Datum::None),
            "true" => Syntax::Literal(Datum::Bool(true)),
            "false" => Syntax::Literal(Datum::Bool(false)),
            name => Syntax::Name(name.to_owned()),
        }),
    )))(input)
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn number(input: &str) -> IResult<&str, Datum> {
    ws(map_res(
        recognize(tuple((
            opt(char('-')),
            digit1,
            opt(pair(char('.'), digit0)),
            opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
        ))),
        |text: &str| -> core::result::Result<Datum, String> {
            if !text.contains(['.', 'e', 'E']) {
                return text.parse().map(Datum::Int).map_err(|e| format!("{e}"));
            }
            match text.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(Datum::Float(v)),
                Ok(_) => Err(format!("{text} overflows a float")),
                Err(e) => Err(format!("{e}")),
            }
        },
    ))(input)
}

fn string(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                is_not("\\\""),
                '\\',
                alt((
                    value("\\", tag("\\")),
                    value("\"", tag("\"")),
                    value("\n", tag("n")),
                    value("\t", tag("t")),
                    value("\r", tag("r")),
                )),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ParameterSet;
    use crate::expression::ExpressionType;
    use crate::parameter::Parameter;

    fn ctx() -> ParameterSet {
        ParameterSet::new(vec![
            Parameter::float("x", -10.0, 10.0).build().unwrap(),
            Parameter::int("n_layers", 1, 8).build().unwrap(),
            Parameter::categorical("kind", ["a", "b"]).build().unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn precedence() {
        let c = ctx();
        let e = Expression::parse("1 + 2 * 3 < x || kind == \"a\" && n_layers > 2", &c).unwrap();
        let Expression::Binary { op, left, right } = &e else {
            panic!("expected a binary node");
        };
        assert_eq!(*op, BinaryOp::Or);
        assert_eq!(left.expression_type(), ExpressionType::Less);
        assert_eq!(right.expression_type(), ExpressionType::And);
    }

    #[test]
    fn left_associative() {
        let c = ctx();
        let e = Expression::parse("10 - 3 - 2", &c).unwrap();
        assert_eq!(e.to_string(), "10 - 3 - 2");
        let grouped = Expression::parse("10 - (3 - 2)", &c).unwrap();
        assert_ne!(e, grouped);
        assert_eq!(grouped.to_string(), "10 - (3 - 2)");
    }

    #[test]
    fn literals() {
        let c = ctx();
        let parse = |t: &str| Expression::parse(t, &c).unwrap();
        assert_eq!(parse("42"), Expression::literal(42));
        assert_eq!(parse("-7"), Expression::literal(-7));
        assert_eq!(parse("2.5e-3"), Expression::literal(2.5e-3));
        assert_eq!(parse("1."), Expression::literal(1.0));
        assert_eq!(parse("none"), Expression::literal(Datum::None));
        assert_eq!(parse("false"), Expression::literal(false));
        assert_eq!(parse(r#""""#), Expression::literal(""));
        assert_eq!(parse(r#""a\"b\\c\n""#), Expression::literal("a\"b\\c\n"));
    }

    #[test]
    fn unary_and_signed_literals() {
        let c = ctx();
        let e = Expression::parse("x-1", &c).unwrap();
        assert_eq!(e.expression_type(), ExpressionType::Subtract);
        let e = Expression::parse("--1", &c).unwrap();
        let negated = Expression::unary(UnaryOp::Negative, Expression::literal(-1));
        assert_eq!(e, negated.unwrap());
        assert_eq!(e.to_string(), "-(-1)");
        let e = Expression::parse("!(x < 1)", &c).unwrap();
        assert_eq!(e.expression_type(), ExpressionType::Not);
    }

    #[test]
    fn lists() {
        let c = ctx();
        let e = Expression::parse("kind # [\"a\", \"b\"]", &c).unwrap();
        assert_eq!(e.to_string(), "kind # [\"a\", \"b\"]");
        assert!(Expression::parse("kind # []", &c).is_ok());
        assert!(Expression::parse("kind # \"a\"", &c).is_err());
        assert!(Expression::parse("[1, 2] == x", &c).is_err());
    }

    #[test]
    fn errors() {
        let c = ctx();
        for bad in [
            "",
            "x <",
            "(x",
            "x y",
            "unknown > 1",
            "1 +* 2",
            "\"open",
            "x < 1e400",
        ] {
            assert!(
                matches!(Expression::parse(bad, &c), Err(Error::InvalidExpression(_))),
                "{bad:?} should not parse"
            );
        }
    }

    #[test]
    fn display_round_trip() {
        let c = ctx();
        for text in [
            "x < 0.5 && (n_layers == 2 || n_layers >= 6)",
            "(x + 1) * -2.0 % 3 != 0",
            "!(kind # [\"a\"]) || x / 2 <= -x",
            "kind == \"b\" && !true",
            "1 == (1 == true)",
            "x < -(1) || x > +(2.5)",
            "-(-1) == -x",
            "x < 1e300",
        ] {
            let e = Expression::parse(text, &c).unwrap();
            assert_eq!(e.to_string(), text);
            assert_eq!(Expression::parse(&e.to_string(), &c).unwrap(), e);
        }
    }
}
