pub mod action;
pub mod constants;
pub mod error;
pub mod launch;
pub mod types;

#[cfg(any(test, feature = "testing"))]
pub mod testing;

pub use action::*;
pub use constants::*;
pub use error::{BiosError, Result};
pub use launch::*;
pub use types::*;
