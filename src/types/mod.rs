pub mod market;
pub mod signals;

pub use market::*;
pub use signals::*;
