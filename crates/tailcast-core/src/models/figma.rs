//! Raw Figma REST document types.
//!
//! Only the fields the projection reads are modelled; everything else in
//! the upstream payload is ignored during deserialization. Numeric style
//! fields stay as [`serde_json::Number`] so values pass through with their
//! original JSON representation (`700`, not `700.0`).

use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Response of `GET /v1/files/:key`.
#[derive(Debug, Clone, Deserialize)]
pub struct FigmaFile {
    pub document: FigmaNode,
}

/// A node in the Figma document graph.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FigmaNode {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub node_type: Option<String>,
    pub characters: Option<String>,
    pub absolute_bounding_box: Option<BoundingBox>,
    pub fills: Option<Vec<Paint>>,
    pub strokes: Option<Vec<Paint>>,
    pub layout_mode: Option<String>,
    pub item_spacing: Option<Number>,
    pub padding_top: Option<Number>,
    pub padding_right: Option<Number>,
    pub padding_bottom: Option<Number>,
    pub padding_left: Option<Number>,
    pub style: Option<TypeStyle>,
    pub corner_radius: Option<Number>,
    pub stroke_weight: Option<Number>,
    /// Child slots may be `null` in sparse input.
    pub children: Option<Vec<Option<FigmaNode>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
}

/// A fill or stroke layer (`SOLID`, `IMAGE`, `GRADIENT_LINEAR`, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Paint {
    #[serde(rename = "type", default)]
    pub paint_type: String,
    pub color: Option<Color>,
}

/// Normalized RGBA color, each channel in `[0, 1]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeStyle {
    pub font_size: Option<Number>,
    pub font_weight: Option<Number>,
}

impl FigmaNode {
    /// First paint of the given kind in an ordered paint list.
    pub fn first_paint<'a>(paints: Option<&'a [Paint]>, kind: &str) -> Option<&'a Paint> {
        paints?.iter().find(|p| p.paint_type == kind)
    }

    pub fn is_type(&self, kind: &str) -> bool {
        self.node_type.as_deref() == Some(kind)
    }
}

impl FigmaFile {
    /// The projection root: the first frame of the first page.
    pub fn first_frame(&self) -> Option<&FigmaNode> {
        let page = first_child(&self.document)?;
        first_child(page)
    }
}

fn first_child(node: &FigmaNode) -> Option<&FigmaNode> {
    node.children.as_ref()?.first()?.as_ref()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deserialize_ignores_unknown_fields() {
        let json = r#"{
            "id": "1:2",
            "name": "Button",
            "type": "FRAME",
            "blendMode": "PASS_THROUGH",
            "absoluteBoundingBox": {"x": 0, "y": 0, "width": 120.4, "height": 40},
            "fills": [{"type": "SOLID", "color": {"r": 1, "g": 0, "b": 0, "a": 1}}],
            "style": {"fontFamily": "Inter", "fontSize": 16, "fontWeight": 700}
        }"#;

        let node: FigmaNode = serde_json::from_str(json).unwrap();
        assert_eq!(node.name.as_deref(), Some("Button"));
        assert!(node.is_type("FRAME"));
        let style = node.style.unwrap();
        assert_eq!(style.font_weight.unwrap().to_string(), "700");
        assert!(node.children.is_none());
    }

    #[test]
    fn test_first_frame() {
        let json = r#"{
            "document": {
                "type": "DOCUMENT",
                "children": [
                    {"type": "CANVAS", "name": "Page 1", "children": [
                        {"type": "FRAME", "name": "Home"},
                        {"type": "FRAME", "name": "About"}
                    ]}
                ]
            }
        }"#;

        let file: FigmaFile = serde_json::from_str(json).unwrap();
        let frame = file.first_frame().unwrap();
        assert_eq!(frame.name.as_deref(), Some("Home"));
    }

    #[test]
    fn test_first_frame_missing_on_empty_page() {
        let json = r#"{"document": {"children": [{"type": "CANVAS", "children": []}]}}"#;
        let file: FigmaFile = serde_json::from_str(json).unwrap();
        assert!(file.first_frame().is_none());
    }

    #[test]
    fn test_missing_alpha_defaults_opaque() {
        let color: Color = serde_json::from_str(r#"{"r": 0.5, "g": 0.5, "b": 0.5}"#).unwrap();
        assert_eq!(color.a, 1.0);
    }
}
