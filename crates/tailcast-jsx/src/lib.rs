pub mod ast;
pub mod error;
pub mod layout;
pub mod normalize;
pub mod parser;
pub mod preview;
pub mod sandbox;
pub mod scanner;
pub mod vdom;

pub use error::{CompileError, PreviewError};
pub use preview::{PreviewHost, PreviewReport};
pub use sandbox::{evaluate, Component, Runtime};
