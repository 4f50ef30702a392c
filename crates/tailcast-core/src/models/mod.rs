pub mod figma;
pub mod projected;
pub mod settings;

pub use figma::{BoundingBox, Color, FigmaFile, FigmaNode, Paint, TypeStyle};
pub use projected::{FigmaPayload, Layout, Padding, ProjectedNode, Style};
pub use settings::PersistedSettings;
