//! Data types of the dummy domain.

pub mod dummy;
pub mod params;

pub use dummy::*;
