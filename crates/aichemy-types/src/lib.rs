pub mod catalog;
pub mod domain;
pub mod error;
pub mod event;
mod util;

pub use catalog::*;
pub use domain::*;
pub use error::{Error, Result};
pub use event::*;
pub use util::*;
