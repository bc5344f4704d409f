//! Core transform trait.

use crate::error::MdResult;

/// A fallible step from one tree representation to another.
pub trait Transform<Input> {
    /// Produced representation.
    type Output;

    /// Run the step. A failed step yields no partial output.
    fn transform(&self, input: Input) -> MdResult<Self::Output>;
}
