//! Report module - console tables, charts, and JSON export

pub mod charts;
pub mod export;
pub mod summary;

pub use charts::*;
pub use export::*;
pub use summary::*;
