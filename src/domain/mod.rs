pub mod input;
pub mod market;
pub mod types;

pub use input::*;
pub use market::*;
pub use types::*;
