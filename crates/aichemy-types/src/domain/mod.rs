mod message;
mod project;
mod steps;

pub use message::*;
pub use project::*;
pub use steps::*;
