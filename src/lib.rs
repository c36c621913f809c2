pub mod config;
pub mod error;
pub mod gemini;
pub mod image;
pub mod model;
pub mod pipeline;
pub mod render;
pub mod store;

pub use error::Error;
