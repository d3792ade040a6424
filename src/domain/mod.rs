pub mod event;
pub mod market;
pub mod order;

pub use event::*;
pub use market::*;
pub use order::*;
