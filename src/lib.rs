pub mod cache;
pub mod checkpoint;
pub mod cli;
pub mod config;
pub mod error;
pub mod generator;
pub mod i18n;
pub mod llm;
pub mod memory;
pub mod retrieval;
pub mod types;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::ReportError;
pub use generator::workflow::{launch, resume};
