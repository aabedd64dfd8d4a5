pub mod config;
pub mod records;
pub mod signals;

pub use config::*;
pub use records::*;
pub use signals::*;
