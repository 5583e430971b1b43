//! Field-level JSON validation with aggregated error reporting

pub mod context;
pub mod field;

pub use context::ValidationContext;
pub use field::{
    nullable, optional, required, Email, FieldError, FieldErrors, IsoDate, Nullable, Number, OneOf, Outcome, Shape,
    Text, UuidText,
};
