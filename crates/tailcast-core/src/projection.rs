//! Figma node-tree projection.
//!
//! Reduces a raw [`FigmaNode`] graph to the [`ProjectedNode`] fields code
//! generation needs: geometry, first solid fill/stroke colors, typography,
//! auto-layout and the recursive child list.

use crate::color::{round_half_up, to_hex};
use crate::models::{FigmaNode, Layout, Padding, ProjectedNode, Style};

const SOLID: &str = "SOLID";
const IMAGE: &str = "IMAGE";
const RECTANGLE: &str = "RECTANGLE";
const TEXT: &str = "TEXT";

/// Project an optional node. Absent input projects to `None`.
pub fn project(node: Option<&FigmaNode>) -> Option<ProjectedNode> {
    node.map(project_node)
}

/// Project a single node and its subtree.
///
/// Node types are not validated; unknown types pass through with whatever
/// fields they carry. Zero-sized bounding boxes yield no `width`/`height`.
pub fn project_node(node: &FigmaNode) -> ProjectedNode {
    let solid_fill = FigmaNode::first_paint(node.fills.as_deref(), SOLID);
    let solid_stroke = FigmaNode::first_paint(node.strokes.as_deref(), SOLID);
    let fill_hex = to_hex(solid_fill.and_then(|p| p.color.as_ref()));

    let is_image = node.is_type(RECTANGLE)
        && node
            .fills
            .as_deref()
            .is_some_and(|fills| fills.iter().any(|f| f.paint_type == IMAGE));

    let bbox = node.absolute_bounding_box.as_ref();

    ProjectedNode {
        name: node.name.clone(),
        node_type: node.node_type.clone(),
        characters: node.characters.clone(),
        width: bbox.and_then(|b| dimension(b.width)),
        height: bbox.and_then(|b| dimension(b.height)),
        is_image,
        layout: Layout {
            mode: node.layout_mode.clone(),
            gap: node.item_spacing.clone(),
            padding: Padding {
                t: node.padding_top.clone(),
                r: node.padding_right.clone(),
                b: node.padding_bottom.clone(),
                l: node.padding_left.clone(),
            },
        },
        style: Style {
            font_size: node.style.as_ref().and_then(|s| s.font_size.clone()),
            font_weight: node.style.as_ref().and_then(|s| s.font_weight.clone()),
            radius: node.corner_radius.clone(),
            text_color: if node.is_type(TEXT) {
                fill_hex.clone()
            } else {
                None
            },
            background_color: fill_hex,
            border_color: to_hex(solid_stroke.and_then(|p| p.color.as_ref())),
            border_width: node.stroke_weight.clone(),
        },
        children: node
            .children
            .as_deref()
            .unwrap_or_default()
            .iter()
            .filter_map(|child| project(child.as_ref()))
            .collect(),
    }
}

/// A bounding-box dimension counts only when it is non-zero.
fn dimension(value: Option<f64>) -> Option<i64> {
    value
        .filter(|v| *v != 0.0 && !v.is_nan())
        .map(|v| round_half_up(v) as i64)
}
