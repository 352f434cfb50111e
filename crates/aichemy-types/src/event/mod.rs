mod reply;
mod request;
mod stream;

pub use reply::*;
pub use request::*;
pub use stream::*;
