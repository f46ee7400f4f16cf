mod control;
pub mod error;
mod messaging;

pub use control::*;
pub use messaging::*;

pub static CORE_VERSION: &str = env!("CARGO_PKG_VERSION");
