//! Traits for generator system standardization.

use super::{BlankError, GeneratedBlank};

/// Trait for validating request objects.
pub trait Validator {
    /// Validate the state of the object.
    fn validate(&self) -> Result<(), String>;
}

/// Trait for blank generators.
pub trait Generator<Req> {
    /// Generate a stamped blank from the request.
    fn generate(&self, request: Req) -> Result<GeneratedBlank, BlankError>;
}
