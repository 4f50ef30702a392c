pub mod client;
pub mod error;

pub use client::FigmaClient;
pub use error::FigmaError;
