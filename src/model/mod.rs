pub mod item;
pub mod section;
pub mod board;
pub mod config;

pub use item::*;
pub use section::*;
pub use board::*;
pub use config::*;
