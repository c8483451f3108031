//! Route handlers for the REST API

mod media;
mod search;
mod system;

pub use media::*;
pub use search::*;
pub use system::*;
