//! Expressions for conditions, forbidden clauses and objectives.
//!
//! An [`Expression`] is an immutable tree of literals, parameter variables,
//! operators and lists. Trees are cheap to clone: children sit behind
//! [`Arc`]s.
//!
//! Expressions print in an infix syntax that [`Expression::parse`] reads back
//! into an equal tree:
//!
//! | Precedence | Operators |
//! |------------|-----------|
//! | 0 | `\|\|` |
//! | 1 | `&&` |
//! | 2 | `==` `!=` |
//! | 3 | `<` `>` `<=` `>=` |
//! | 4 | `#` (membership in a list) |
//! | 5 | `+` `-` |
//! | 6 | `*` `/` `%` |
//! | 7 | unary `+` `-` `!` |
//!
//! # Example
//!
//! ```
//! use configspace::binding::ParameterSet;
//! use configspace::expression::Expression;
//! use configspace::parameter::Parameter;
//!
//! let x = Parameter::float("x", -1.0, 1.0).build().unwrap();
//! let kind = Parameter::categorical("kind", ["a", "b", "c"]).build().unwrap();
//! let ctx = ParameterSet::new(vec![x, kind]).unwrap();
//!
//! let e = Expression::parse(r#"x < 0 || kind # ["a", "b"]"#, &ctx).unwrap();
//! assert_eq!(e.to_string(), r#"x < 0 || kind # ["a", "b"]"#);
//! ```

mod eval;
mod parser;

use core::fmt;
use std::sync::Arc;

use crate::binding::Context;
use crate::datum::Datum;
use crate::error::{Error, Result, invalid_value};
use crate::parameter::{Parameter, ParameterKind};

/// Every node type, with its arity and precedence.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionType {
    /// `a || b`
    Or,
    /// `a && b`
    And,
    /// `a == b`
    Equal,
    /// `a != b`
    NotEqual,
    /// `a < b`
    Less,
    /// `a > b`
    Greater,
    /// `a <= b`
    LessOrEqual,
    /// `a >= b`
    GreaterOrEqual,
    /// `a # [b, c]`, membership in a list.
    In,
    /// `a + b`
    Add,
    /// `a - b`
    Subtract,
    /// `a * b`
    Multiply,
    /// `a / b`
    Divide,
    /// `a % b`
    Modulo,
    /// `+a`
    Positive,
    /// `-a`
    Negative,
    /// `!a`
    Not,
    /// `[a, b, ...]`
    List,
    /// A constant.
    Literal,
    /// A parameter read from the binding.
    Variable,
}

impl ExpressionType {
    /// Number of children, or `None` for lists.
    #[must_use]
    pub fn arity(self) -> Option<usize> {
        match self {
            ExpressionType::Positive | ExpressionType::Negative | ExpressionType::Not => Some(1),
            ExpressionType::Literal | ExpressionType::Variable => Some(0),
            ExpressionType::List => None,
            _ => Some(2),
        }
    }

    /// Binding strength; higher binds tighter.
    #[must_use]
    pub fn precedence(self) -> u8 {
        match self {
            ExpressionType::Or => 0,
            ExpressionType::And => 1,
            ExpressionType::Equal | ExpressionType::NotEqual => 2,
            ExpressionType::Less
            | ExpressionType::Greater
            | ExpressionType::LessOrEqual
            | ExpressionType::GreaterOrEqual => 3,
            ExpressionType::In => 4,
            ExpressionType::Add | ExpressionType::Subtract => 5,
            ExpressionType::Multiply | ExpressionType::Divide | ExpressionType::Modulo => 6,
            ExpressionType::Positive | ExpressionType::Negative | ExpressionType::Not => 7,
            ExpressionType::List | ExpressionType::Literal | ExpressionType::Variable => 8,
        }
    }
}

/// Two-operand operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    /// Logical or; tolerates one inactive operand.
    Or,
    /// Logical and.
    And,
    /// Equality; enumerated parameters compare by value index.
    Equal,
    /// Negated [`BinaryOp::Equal`].
    NotEqual,
    /// Strict ordering; ordinal parameters order by declared rank.
    Less,
    /// Strict ordering.
    Greater,
    /// Non-strict ordering.
    LessOrEqual,
    /// Non-strict ordering.
    GreaterOrEqual,
    /// Membership of the left operand in the list on the right.
    In,
    /// Addition, checked for integers.
    Add,
    /// Subtraction, checked for integers.
    Subtract,
    /// Multiplication, checked for integers.
    Multiply,
    /// Division; integer division truncates.
    Divide,
    /// Remainder with the sign of the dividend.
    Modulo,
}

impl BinaryOp {
    /// The infix token, as printed and parsed.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Or => "||",
            BinaryOp::And => "&&",
            BinaryOp::Equal => "==",
            BinaryOp::NotEqual => "!=",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::In => "#",
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }

    /// The matching node type.
    #[must_use]
    pub fn expression_type(self) -> ExpressionType {
        match self {
            BinaryOp::Or => ExpressionType::Or,
            BinaryOp::And => ExpressionType::And,
            BinaryOp::Equal => ExpressionType::Equal,
            BinaryOp::NotEqual => ExpressionType::NotEqual,
            BinaryOp::Less => ExpressionType::Less,
            BinaryOp::Greater => ExpressionType::Greater,
            BinaryOp::LessOrEqual => ExpressionType::LessOrEqual,
            BinaryOp::GreaterOrEqual => ExpressionType::GreaterOrEqual,
            BinaryOp::In => ExpressionType::In,
            BinaryOp::Add => ExpressionType::Add,
            BinaryOp::Subtract => ExpressionType::Subtract,
            BinaryOp::Multiply => ExpressionType::Multiply,
            BinaryOp::Divide => ExpressionType::Divide,
            BinaryOp::Modulo => ExpressionType::Modulo,
        }
    }

    fn is_comparison(self) -> bool {
        matches!(
            self,
            BinaryOp::Equal
                | BinaryOp::NotEqual
                | BinaryOp::Less
                | BinaryOp::Greater
                | BinaryOp::LessOrEqual
                | BinaryOp::GreaterOrEqual
        )
    }
}

/// One-operand operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    /// Numeric identity.
    Positive,
    /// Numeric negation, checked for integers.
    Negative,
    /// Boolean negation.
    Not,
}

impl UnaryOp {
    /// The prefix token, as printed and parsed.
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            UnaryOp::Positive => "+",
            UnaryOp::Negative => "-",
            UnaryOp::Not => "!",
        }
    }

    /// The matching node type.
    #[must_use]
    pub fn expression_type(self) -> ExpressionType {
        match self {
            UnaryOp::Positive => ExpressionType::Positive,
            UnaryOp::Negative => ExpressionType::Negative,
            UnaryOp::Not => ExpressionType::Not,
        }
    }
}

/// An immutable expression tree.
///
/// Equality is structural; variables compare by parameter identity.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Expression {
    /// A constant value. [`Datum::Inactive`] is never a valid literal.
    Literal(Datum),
    /// The value bound to a parameter.
    Variable(Parameter),
    /// A two-operand node.
    Binary {
        op: BinaryOp,
        left: Arc<Expression>,
        right: Arc<Expression>,
    },
    /// A one-operand node.
    Unary {
        op: UnaryOp,
        operand: Arc<Expression>,
    },
    /// Only valid as the right operand of [`BinaryOp::In`].
    List(Arc<[Expression]>),
}

impl Expression {
    /// A constant node.
    #[must_use]
    pub fn literal(value: impl Into<Datum>) -> Self {
        Expression::Literal(value.into())
    }

    /// A node reading `parameter` from the binding.
    #[must_use]
    pub fn variable(parameter: &Parameter) -> Self {
        Expression::Variable(parameter.clone())
    }

    /// A two-operand node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] if a list is used anywhere but as
    /// the right operand of `In`, or if `In` has no list on its right.
    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Result<Self> {
        if left.is_list() {
            return Err(Error::InvalidExpression(format!(
                "a list cannot be the left operand of '{}'",
                op.symbol()
            )));
        }
        match (op, right.is_list()) {
            (BinaryOp::In, false) => {
                return Err(Error::InvalidExpression(
                    "the right operand of '#' must be a list".to_owned(),
                ));
            }
            (op, true) if op != BinaryOp::In => {
                return Err(Error::InvalidExpression(format!(
                    "a list cannot be the right operand of '{}'",
                    op.symbol()
                )));
            }
            _ => {}
        }
        Ok(Expression::Binary {
            op,
            left: Arc::new(left),
            right: Arc::new(right),
        })
    }

    /// A one-operand node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] if `operand` is a list.
    pub fn unary(op: UnaryOp, operand: Expression) -> Result<Self> {
        if operand.is_list() {
            return Err(Error::InvalidExpression(format!(
                "a list cannot be the operand of '{}'",
                op.symbol()
            )));
        }
        Ok(Expression::Unary {
            op,
            operand: Arc::new(operand),
        })
    }

    /// A list node, for the right side of `#`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] if an item is itself a list.
    pub fn list(items: Vec<Expression>) -> Result<Self> {
        if items.iter().any(Expression::is_list) {
            return Err(Error::InvalidExpression(
                "lists cannot be nested".to_owned(),
            ));
        }
        Ok(Expression::List(items.into()))
    }

    /// Shorthand for [`Expression::binary`] with [`BinaryOp::And`].
    ///
    /// # Errors
    ///
    /// Same as [`Expression::binary`].
    pub fn and(self, other: Expression) -> Result<Self> {
        Self::binary(BinaryOp::And, self, other)
    }

    /// Shorthand for [`Expression::binary`] with [`BinaryOp::Or`].
    ///
    /// # Errors
    ///
    /// Same as [`Expression::binary`].
    pub fn or(self, other: Expression) -> Result<Self> {
        Self::binary(BinaryOp::Or, self, other)
    }

    /// The node type at the root.
    #[must_use]
    pub fn expression_type(&self) -> ExpressionType {
        match self {
            Expression::Literal(_) => ExpressionType::Literal,
            Expression::Variable(_) => ExpressionType::Variable,
            Expression::Binary { op, .. } => op.expression_type(),
            Expression::Unary { op, .. } => op.expression_type(),
            Expression::List(_) => ExpressionType::List,
        }
    }

    /// Returns `true` for [`Expression::List`] nodes.
    #[must_use]
    pub fn is_list(&self) -> bool {
        matches!(self, Expression::List(_))
    }

    /// Direct children, left to right.
    #[must_use]
    pub fn children(&self) -> Vec<&Expression> {
        match self {
            Expression::Literal(_) | Expression::Variable(_) => Vec::new(),
            Expression::Binary { left, right, .. } => vec![left, right],
            Expression::Unary { operand, .. } => vec![operand],
            Expression::List(items) => items.iter().collect(),
        }
    }

    fn collect_parameters<'a>(&'a self, out: &mut Vec<&'a Parameter>) {
        if let Expression::Variable(p) = self {
            out.push(p);
        }
        for child in self.children() {
            child.collect_parameters(out);
        }
    }

    /// Every referenced parameter once, ordered by id.
    #[must_use]
    pub fn parameters(&self) -> Vec<Parameter> {
        let mut found = Vec::new();
        self.collect_parameters(&mut found);
        found.sort_by_key(|p| p.id());
        found.dedup_by_key(|p| p.id());
        found.into_iter().cloned().collect()
    }

    /// Indices of the referenced parameters in `context`, sorted and unique.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidExpression`] if a parameter is not in `context`.
    pub fn parameter_indices(&self, context: &dyn Context) -> Result<Vec<usize>> {
        let mut found = Vec::new();
        self.collect_parameters(&mut found);
        let mut indices = found
            .into_iter()
            .map(|p| {
                context.parameter_index(p).ok_or_else(|| {
                    let name = p.name();
                    Error::InvalidExpression(format!("parameter '{name}' is not in the context"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        indices.sort_unstable();
        indices.dedup();
        Ok(indices)
    }

    /// Checks the tree against `context` before it is used there.
    ///
    /// Every variable must belong to the context, no literal may be the
    /// inactive marker or a non-finite float, and a literal compared with an
    /// enumerated parameter must be one of its values. Categorical parameters
    /// have no order.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidExpression`] for structural problems and
    /// [`Error::InvalidValue`] for inadmissible literals.
    pub fn check_context(&self, context: &dyn Context) -> Result<()> {
        match self {
            Expression::Literal(Datum::Inactive) => {
                return Err(Error::InvalidExpression(
                    "the inactive marker cannot be a literal".to_owned(),
                ));
            }
            Expression::Literal(Datum::Float(v)) if !v.is_finite() => {
                return Err(invalid_value!("float literal {v} is not finite"));
            }
            Expression::Variable(p) if context.parameter_index(p).is_none() => {
                return Err(Error::InvalidExpression(format!(
                    "parameter '{}' is not in the context",
                    p.name()
                )));
            }
            Expression::Binary { op, left, right } if op.is_comparison() => {
                check_comparison(*op, left, right)?;
                check_comparison(*op, right, left)?;
            }
            _ => {}
        }
        for child in self.children() {
            child.check_context(context)?;
        }
        Ok(())
    }
}

fn check_comparison(op: BinaryOp, variable: &Expression, other: &Expression) -> Result<()> {
    let Expression::Variable(p) = variable else {
        return Ok(());
    };
    let ordering = !matches!(op, BinaryOp::Equal | BinaryOp::NotEqual);
    if ordering && matches!(p.kind(), ParameterKind::Categorical(_)) {
        return Err(Error::InvalidExpression(format!(
            "categorical parameter '{}' has no order for '{}'",
            p.name(),
            op.symbol()
        )));
    }
    if let Expression::Literal(value) = other {
        let enumerated = match p.kind() {
            ParameterKind::Categorical(_) | ParameterKind::Ordinal(_) => true,
            ParameterKind::Discrete(_) => !ordering,
            ParameterKind::Numerical(_) | ParameterKind::String => false,
        };
        if enumerated && p.validate_value(value).is_none() {
            return Err(invalid_value!("{value} is not a value of '{}'", p.name()));
        }
    }
    Ok(())
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Literal(value) => write!(f, "{value}"),
            Expression::Variable(p) => f.write_str(p.name()),
            Expression::Binary { op, left, right } => {
                let precedence = op.expression_type().precedence();
                // Operators associate to the left, so an equal-precedence
                // right operand needs parentheses.
                let left_parens = left.expression_type().precedence() < precedence;
                write_operand(f, left, left_parens)?;
                write!(f, " {} ", op.symbol())?;
                let right_parens = right.expression_type().precedence() <= precedence;
                write_operand(f, right, right_parens)
            }
            Expression::Unary { op, operand } => {
                f.write_str(op.symbol())?;
                let precedence = op.expression_type().precedence();
                // `-1` would read back as a single negative literal.
                let signed_number = *op != UnaryOp::Not
                    && matches!(&**operand, Expression::Literal(v) if v.is_numeric());
                let parens = signed_number || operand.expression_type().precedence() < precedence;
                write_operand(f, operand, parens)
            }
            Expression::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{item}")?;
                }
                f.write_str("]")
            }
        }
    }
}

fn write_operand(f: &mut fmt::Formatter<'_>, e: &Expression, parenthesize: bool) -> fmt::Result {
    if parenthesize {
        write!(f, "({e})")
    } else {
        write!(f, "{e}")
    }
}
