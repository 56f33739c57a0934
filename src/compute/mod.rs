//! Distance computation and coordinate validation.

pub mod distance;
pub mod validation;
