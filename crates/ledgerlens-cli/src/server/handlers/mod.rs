//! API request handlers.

mod data;
mod export;
mod filter;
mod profile;
mod refresh;

pub use data::*;
pub use export::*;
pub use filter::*;
pub use profile::*;
pub use refresh::*;
