//! API request handlers.

mod health;
mod sync;
mod upload;

pub use health::*;
pub use sync::*;
pub use upload::*;
