#[cfg(feature = "native")]
pub mod cache;
pub mod color;
#[cfg(feature = "native")]
pub mod config;
pub mod error;
pub mod file_key;
pub mod json;
pub mod models;
pub mod projection;
#[cfg(feature = "native")]
pub mod storage;
