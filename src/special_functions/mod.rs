//! Custom implementations of special functions not
//! provided by the standard lib.

mod gamma;
mod factorial;

pub use gamma::*;
pub use factorial::*;
