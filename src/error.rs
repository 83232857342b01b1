/// Errors produced while building, evaluating or sampling a configuration space.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// Returned for malformed input, type or arity mismatches, and
    /// division or modulo by zero.
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// Returned when an object of the wrong kind is supplied.
    #[error("invalid type: {0}")]
    InvalidType(String),

    /// Returned when an expression tree cannot be evaluated as written.
    #[error("invalid expression: {0}")]
    InvalidExpression(String),

    /// Returned when a condition does not evaluate to a boolean.
    #[error("invalid condition: {0}")]
    InvalidCondition(String),

    /// Returned when the condition dependency graph contains a cycle.
    #[error("invalid graph: conditions form a cycle")]
    InvalidGraph,

    /// Returned when a configuration violates its space.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Returned when rejection sampling runs out of attempts.
    #[error("sampling unsuccessful: obtained {obtained} of {requested} values")]
    SamplingUnsuccessful {
        /// Number of values requested.
        requested: usize,
        /// Number of values accepted before the budget ran out.
        obtained: usize,
    },

    /// Signalled when evaluation reads a parameter whose value is inactive.
    ///
    /// `Or` nodes, activation and forbidden-clause checks absorb this
    /// signal; everywhere else it propagates like any other error.
    #[error("parameter '{0}' is inactive")]
    InactiveParameter(String),

    /// Returned when an index is outside a container.
    #[error("index {index} out of bounds (len {len})")]
    OutOfBounds {
        /// The offending index.
        index: usize,
        /// The container length.
        len: usize,
    },

    /// Returned when a handle no longer refers to a live object.
    #[error("invalid object: {0}")]
    InvalidObject(&'static str),
}

impl Error {
    /// Returns `true` for the inactive-parameter signal.
    #[must_use]
    pub fn is_inactive(&self) -> bool {
        matches!(self, Error::InactiveParameter(_))
    }
}

pub type Result<T> = core::result::Result<T, Error>;

/// Builds an [`Error::InvalidValue`] from format arguments.
macro_rules! invalid_value {
    ($($arg:tt)*) => {
        $crate::error::Error::InvalidValue(format!($($arg)*))
    };
}

pub(crate) use invalid_value;
