//! ib-core: scalar type, metadata tolerances and argument checks shared by
//! every ibflow crate.

pub mod error;
pub mod numeric;

pub use error::{IbError, IbResult};
pub use numeric::*;
