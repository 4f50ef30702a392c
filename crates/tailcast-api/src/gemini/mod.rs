pub mod client;
pub mod error;
pub mod prompts;
pub mod types;

pub use client::GeminiClient;
pub use error::GeminiError;
