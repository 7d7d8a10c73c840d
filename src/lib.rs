pub mod core;
pub mod error;
pub mod export;
pub mod parser;
pub mod pipeline;
pub mod reconstruct;
pub mod transcript;

pub use crate::core::config::LayoutConfig;
pub use crate::core::model::{Line, PageLayout, PageRecord};
pub use error::LayoutError;
pub use reconstruct::{GeometricLineEngine, LineEngine};
