#![forbid(unsafe_code)]
#![deny(clippy::all)]
#![deny(unreachable_pub)]
#![deny(clippy::correctness)]
#![deny(clippy::suspicious)]
#![deny(clippy::style)]
#![deny(clippy::complexity)]
#![deny(clippy::perf)]
#![deny(clippy::pedantic)]
#![deny(clippy::std_instead_of_core)]

//! Conditional configuration spaces for auto-tuning and hyperparameter
//! search: typed parameters, activation conditions, forbidden clauses and
//! distribution-driven rejection sampling of valid configurations.
//!
//! # Getting Started
//!
//! ```
//! use configspace::prelude::*;
//!
//! let solver = Parameter::categorical("solver", ["sgd", "adam"]).build().unwrap();
//! let momentum = Parameter::float("momentum", 0.0, 1.0).default_value(0.9).build().unwrap();
//! let batch = Parameter::discrete("batch", [16_i64, 32, 64, 128]).build().unwrap();
//!
//! let space = ConfigurationSpace::builder("train")
//!     .parameters([solver.clone(), momentum.clone(), batch])
//!     .condition_text(&momentum, r#"solver == "sgd""#)
//!     .forbidden_clause_text(r#"solver == "adam" && batch == 16"#)
//!     .seed(42)
//!     .build()
//!     .unwrap();
//!
//! for c in space.samples(20).unwrap() {
//!     assert!(space.check_configuration(&c).unwrap());
//!     println!("{c}");
//! }
//! ```
//!
//! # Core Concepts
//!
//! | Type | Role |
//! |------|------|
//! | [`Datum`] | A dynamically typed value: none, bool, int, float, string, object or inactive. |
//! | [`Parameter`] | A named, typed dimension with a domain, a default value and a default distribution. |
//! | [`Expression`] | A tree over literals and parameters, used for conditions and forbidden clauses. |
//! | [`ConfigurationSpace`] | Parameters plus conditions, forbidden clauses, a dependency graph and default distributions. |
//! | [`Configuration`] | One value per parameter of a space, inactive parameters marked. |
//! | [`Distribution`] | Uniform, normal, roulette, mixture or multivariate sampler of raw numbers. |
//! | [`DistributionSpace`] | An alternative distribution assignment for a space. |
//!
//! # Feature Flags
//!
//! | Flag | What it enables | Default |
//! |------|----------------|---------|
//! | `serde` | `Serialize`/`Deserialize` on value and distribution types | off |
//! | `tracing` | Structured log events via [`tracing`](https://docs.rs/tracing) when spaces are built, changed and sampled | off |

/// Emit a `tracing::info!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => { tracing::info!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Emit a `tracing::debug!` event when the `tracing` feature is enabled.
/// No-op otherwise.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => { tracing::debug!($($arg)*) };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}

pub mod binding;
mod configuration;
pub mod datum;
pub mod distribution;
mod distribution_space;
mod error;
pub mod expression;
pub mod graph;
pub mod interval;
mod lifecycle;
pub mod numeric;
pub mod parameter;
mod rng_util;
mod space;

pub use binding::{Binding, BoundValues, Context, ParameterSet};
pub use configuration::Configuration;
pub use datum::{Datum, DatumType, ObjectRef};
pub use distribution::{Distribution, Scale};
pub use distribution_space::{DistributionSpace, DistributionWrapper};
pub use error::{Error, Result};
pub use expression::Expression;
pub use parameter::{ParamId, Parameter, ParameterType};
pub use space::{ConfigurationSpace, ConfigurationSpaceBuilder, SpaceId, WeakConfigurationSpace};

/// Convenient wildcard import for the most common types.
///
/// ```
/// use configspace::prelude::*;
/// ```
pub mod prelude {
    pub use crate::binding::{Binding, Context, ParameterSet};
    pub use crate::configuration::Configuration;
    pub use crate::datum::Datum;
    pub use crate::distribution::{Distribution, Scale};
    pub use crate::distribution_space::DistributionSpace;
    pub use crate::error::{Error, Result};
    pub use crate::expression::Expression;
    pub use crate::parameter::Parameter;
    pub use crate::space::{ConfigurationSpace, ConfigurationSpaceBuilder};
}
