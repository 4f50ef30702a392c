use serde::{Deserialize, Serialize};
use serde_json::Number;

/// Minimal, UI-relevant description of a Figma node.
///
/// Absent values are omitted when serialized, so the JSON handed to the
/// generator contains only what the design actually sets.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectedNode {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub node_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub characters: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<i64>,
    #[serde(default)]
    pub is_image: bool,
    #[serde(default)]
    pub layout: Layout,
    #[serde(default)]
    pub style: Style,
    #[serde(default)]
    pub children: Vec<ProjectedNode>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gap: Option<Number>,
    #[serde(default)]
    pub padding: Padding,
}

/// Four-edge padding, keyed `t`/`r`/`b`/`l` on the wire.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Padding {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub t: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub r: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub b: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub l: Option<Number>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Style {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radius: Option<Number>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<Number>,
}

/// Body of a successful proxy response: `{ "figmaJson": ... }`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FigmaPayload {
    #[serde(rename = "figmaJson")]
    pub figma_json: ProjectedNode,
}

impl ProjectedNode {
    /// Total number of nodes in this subtree, including `self`.
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(ProjectedNode::node_count).sum::<usize>()
    }
}
