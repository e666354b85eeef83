//! Request-side query pipeline: raw input, validation, composition.

pub mod compose;
pub mod input;
pub mod validate;
pub mod value;

pub use compose::{compose, compose_with, ComposeError, PlaceholderStyle, PredicateBuilder, QueryPlan};
pub use input::RawInput;
pub use validate::{validate, Param, ValidatedParams, ValidationError};
pub use value::SqlValue;
