pub mod convert;
pub mod figma;
pub mod gemini;
pub mod image;
pub mod proxy;
pub mod sanitize;
pub mod traits;
