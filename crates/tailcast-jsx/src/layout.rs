//! Box-model estimate of a rendered tree.
//!
//! Sizes come from Tailwind sizing, spacing and typography utilities plus
//! `width`/`height` attributes. Tailwind's preflight makes every box
//! `border-box`, so explicit sizes include padding and borders. Margins,
//! positioning and variant-prefixed classes (`md:`, `hover:`) are ignored.

use serde::Serialize;

use crate::vdom::VNode;

/// Average glyph advance as a fraction of the font size.
const CHAR_WIDTH: f64 = 0.55;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    /// Whole-pixel size, rounded up.
    pub fn ceil(self) -> (u32, u32) {
        (self.width.ceil() as u32, self.height.ceil() as u32)
    }
}

/// The frame the tree is laid out in.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1280.0,
            height: 800.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Font {
    size: f64,
    line_height: f64,
}

const BASE_FONT: Font = Font {
    size: 16.0,
    line_height: 24.0,
};

#[derive(Clone, Copy)]
struct Ctx {
    available: f64,
    viewport: Viewport,
    font: Font,
}

/// Measure the natural size of `node` inside `viewport`.
pub fn measure(node: &VNode, viewport: Viewport) -> Size {
    let ctx = Ctx {
        available: viewport.width,
        viewport,
        font: BASE_FONT,
    };
    layout(node, &ctx)
}

fn layout(node: &VNode, ctx: &Ctx) -> Size {
    match node {
        VNode::Text { text } => text_size(text, ctx),
        VNode::Fragment { .. } => stack_block(&flatten(node), ctx, 0.0),
        VNode::Element { tag, .. } => element_size(node, tag, ctx),
    }
}

fn element_size(node: &VNode, tag: &str, ctx: &Ctx) -> Size {
    let classes = Classes::parse(node.attribute("className").unwrap_or_default());
    if classes.display == Some(Display::None) {
        return Size::ZERO;
    }

    let font = classes.font.unwrap_or(ctx.font);
    let [pt, pr, pb, pl] = classes.padding;
    let frame_x = pl + pr + 2.0 * classes.border;
    let frame_y = pt + pb + 2.0 * classes.border;

    let max_width = classes.max_width.map(|m| m.resolve(ctx.available, ctx.viewport.width));
    let explicit_width = classes
        .width
        .and_then(|w| w.resolve_width(ctx))
        .or_else(|| attribute_px(node, "width"))
        .map(|w| max_width.map_or(w, |m| w.min(m)));
    let explicit_height = classes
        .height
        .and_then(|h| h.resolve_height(ctx))
        .or_else(|| attribute_px(node, "height"));

    let outer_available = explicit_width
        .unwrap_or(ctx.available)
        .min(max_width.unwrap_or(f64::INFINITY));
    let inner = Ctx {
        available: (outer_available - frame_x).max(0.0),
        viewport: ctx.viewport,
        font,
    };

    let content = match tag {
        "input" | "select" => Size {
            width: 160.0,
            height: font.line_height,
        },
        "textarea" => Size {
            width: 160.0,
            height: font.line_height * 2.0,
        },
        _ => {
            let children = flatten(node);
            match classes.display {
                Some(Display::Flex) if classes.flex_col => {
                    stack_column(&children, &inner, classes.gap_y)
                }
                Some(Display::Flex) => stack_row(&children, &inner, classes.gap_x),
                Some(Display::Grid) => grid(&children, &inner, &classes),
                _ => stack_block(&children, &inner, classes.gap_y),
            }
        }
    };

    let width = explicit_width.unwrap_or(content.width + frame_x);
    Size {
        width: max_width.map_or(width, |m| width.min(m)),
        height: explicit_height.unwrap_or(content.height + frame_y),
    }
}

/// Children with fragments spliced in.
fn flatten(node: &VNode) -> Vec<&VNode> {
    fn push<'a>(nodes: &'a [VNode], out: &mut Vec<&'a VNode>) {
        for node in nodes {
            match node {
                VNode::Fragment { children } => push(children, out),
                other => out.push(other),
            }
        }
    }
    let mut out = Vec::new();
    match node {
        VNode::Element { children, .. } | VNode::Fragment { children } => push(children, &mut out),
        VNode::Text { .. } => {}
    }
    out
}

fn text_size(text: &str, ctx: &Ctx) -> Size {
    let chars = text.chars().count() as f64;
    if chars == 0.0 {
        return Size::ZERO;
    }
    let natural = chars * ctx.font.size * CHAR_WIDTH;
    if ctx.available > 0.0 && natural > ctx.available {
        let lines = (natural / ctx.available).ceil();
        Size {
            width: ctx.available,
            height: lines * ctx.font.line_height,
        }
    } else {
        Size {
            width: natural,
            height: ctx.font.line_height,
        }
    }
}

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "button", "code", "em", "i", "img", "input", "kbd", "label", "mark", "s",
    "select", "small", "span", "strong", "sub", "sup", "svg", "textarea", "u",
];

fn is_inline(node: &VNode) -> bool {
    match node {
        VNode::Text { .. } => true,
        VNode::Fragment { .. } => false,
        VNode::Element { tag, .. } => {
            let classes = Classes::parse(node.attribute("className").unwrap_or_default());
            match classes.display {
                Some(Display::Inline) => true,
                Some(_) => false,
                None => INLINE_TAGS.contains(&tag.as_str()),
            }
        }
    }
}

/// Normal flow: block children stack, runs of inline children share lines.
fn stack_block(children: &[&VNode], ctx: &Ctx, gap: f64) -> Size {
    let mut boxes: Vec<Size> = Vec::new();
    let mut run: Option<Size> = None;

    for &child in children {
        let size = layout(child, ctx);
        if is_inline(child) {
            let line = run.get_or_insert(Size::ZERO);
            line.width += size.width;
            line.height = line.height.max(size.height);
        } else {
            if let Some(line) = run.take() {
                boxes.push(wrap_line(line, ctx));
            }
            boxes.push(size);
        }
    }
    if let Some(line) = run {
        boxes.push(wrap_line(line, ctx));
    }

    let boxes: Vec<Size> = boxes
        .into_iter()
        .filter(|b| b.width > 0.0 || b.height > 0.0)
        .collect();
    Size {
        width: boxes.iter().map(|b| b.width).fold(0.0, f64::max),
        height: boxes.iter().map(|b| b.height).sum::<f64>() + gaps(boxes.len(), gap),
    }
}

fn wrap_line(line: Size, ctx: &Ctx) -> Size {
    if ctx.available > 0.0 && line.width > ctx.available {
        let lines = (line.width / ctx.available).ceil();
        Size {
            width: ctx.available,
            height: lines * line.height.max(ctx.font.line_height),
        }
    } else {
        line
    }
}

fn stack_row(children: &[&VNode], ctx: &Ctx, gap: f64) -> Size {
    let sizes: Vec<Size> = children.iter().map(|c| layout(c, ctx)).collect();
    Size {
        width: sizes.iter().map(|s| s.width).sum::<f64>() + gaps(sizes.len(), gap),
        height: sizes.iter().map(|s| s.height).fold(0.0, f64::max),
    }
}

fn stack_column(children: &[&VNode], ctx: &Ctx, gap: f64) -> Size {
    let sizes: Vec<Size> = children.iter().map(|c| layout(c, ctx)).collect();
    Size {
        width: sizes.iter().map(|s| s.width).fold(0.0, f64::max),
        height: sizes.iter().map(|s| s.height).sum::<f64>() + gaps(sizes.len(), gap),
    }
}

fn grid(children: &[&VNode], ctx: &Ctx, classes: &Classes) -> Size {
    let cols = classes.cols.max(1);
    let track = if ctx.available > 0.0 {
        ((ctx.available - gaps(cols, classes.gap_x)) / cols as f64).max(0.0)
    } else {
        0.0
    };
    let cell_ctx = Ctx {
        available: track,
        ..*ctx
    };
    let rows: Vec<Size> = children
        .chunks(cols)
        .map(|row| stack_row(row, &cell_ctx, classes.gap_x))
        .collect();
    Size {
        width: rows.iter().map(|r| r.width).fold(0.0, f64::max),
        height: rows.iter().map(|r| r.height).sum::<f64>() + gaps(rows.len(), classes.gap_y),
    }
}

fn gaps(count: usize, gap: f64) -> f64 {
    count.saturating_sub(1) as f64 * gap
}

fn attribute_px(node: &VNode, name: &str) -> Option<f64> {
    node.attribute(name)?
        .trim()
        .trim_end_matches("px")
        .parse()
        .ok()
}

// ── Tailwind utilities ──────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq)]
enum Display {
    None,
    Block,
    Inline,
    Flex,
    Grid,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Length {
    Px(f64),
    /// Fraction of the containing block.
    Fraction(f64),
    Full,
    Screen,
}

impl Length {
    fn resolve(self, available: f64, screen: f64) -> f64 {
        match self {
            Self::Px(px) => px,
            Self::Fraction(f) => available * f,
            Self::Full => available,
            Self::Screen => screen,
        }
    }

    fn resolve_width(self, ctx: &Ctx) -> Option<f64> {
        Some(self.resolve(ctx.available, ctx.viewport.width))
    }

    /// Percentage heights need a sized parent, which is not tracked.
    fn resolve_height(self, ctx: &Ctx) -> Option<f64> {
        match self {
            Self::Px(px) => Some(px),
            Self::Screen => Some(ctx.viewport.height),
            Self::Fraction(_) | Self::Full => None,
        }
    }
}

#[derive(Debug, Default)]
struct Classes {
    display: Option<Display>,
    flex_col: bool,
    cols: usize,
    width: Option<Length>,
    height: Option<Length>,
    max_width: Option<Length>,
    /// Top, right, bottom, left.
    padding: [f64; 4],
    border: f64,
    gap_x: f64,
    gap_y: f64,
    font: Option<Font>,
}

impl Classes {
    fn parse(class_name: &str) -> Self {
        let mut c = Self::default();
        for class in class_name.split_whitespace() {
            if class.contains(':') && !class.contains('[') {
                continue;
            }
            c.apply(class);
        }
        c
    }

    fn apply(&mut self, class: &str) {
        match class {
            "hidden" => self.display = Some(Display::None),
            "block" => self.display = Some(Display::Block),
            "inline" | "inline-block" => self.display = Some(Display::Inline),
            "flex" | "inline-flex" => self.display = Some(Display::Flex),
            "grid" | "inline-grid" => self.display = Some(Display::Grid),
            "flex-col" | "flex-col-reverse" => self.flex_col = true,
            "flex-row" | "flex-row-reverse" => self.flex_col = false,
            "border" => self.border = 1.0,
            _ => self.apply_valued(class),
        }
    }

    fn apply_valued(&mut self, class: &str) {
        let Some((prefix, value)) = split_utility(class) else {
            return;
        };
        match prefix {
            "w" => self.width = length(value),
            "h" => self.height = length(value),
            "size" => {
                self.width = length(value);
                self.height = length(value);
            }
            "max-w" => self.max_width = max_width(value),
            "p" => self.padding = [spacing(value).unwrap_or(0.0); 4],
            "px" => {
                if let Some(v) = spacing(value) {
                    self.padding[1] = v;
                    self.padding[3] = v;
                }
            }
            "py" => {
                if let Some(v) = spacing(value) {
                    self.padding[0] = v;
                    self.padding[2] = v;
                }
            }
            "pt" | "pr" | "pb" | "pl" => {
                let side = match prefix {
                    "pt" => 0,
                    "pr" => 1,
                    "pb" => 2,
                    _ => 3,
                };
                if let Some(v) = spacing(value) {
                    self.padding[side] = v;
                }
            }
            "gap" => {
                if let Some(v) = spacing(value) {
                    self.gap_x = v;
                    self.gap_y = v;
                }
            }
            "gap-x" | "space-x" => self.gap_x = spacing(value).unwrap_or(self.gap_x),
            "gap-y" | "space-y" => self.gap_y = spacing(value).unwrap_or(self.gap_y),
            "grid-cols" => self.cols = value.parse().unwrap_or(self.cols),
            "border" => {
                if let Ok(px) = value.parse::<f64>() {
                    self.border = px;
                }
            }
            "text" => {
                if let Some(font) = font_size(value) {
                    self.font = Some(font);
                }
            }
            _ => {}
        }
    }
}

/// Split `px-4` into `("px", "4")`, trying the longest known prefix first.
fn split_utility(class: &str) -> Option<(&str, &str)> {
    const PREFIXES: &[&str] = &[
        "grid-cols", "space-x", "space-y", "gap-x", "gap-y", "max-w", "size", "border", "text",
        "gap", "px", "py", "pt", "pr", "pb", "pl", "p", "w", "h",
    ];
    PREFIXES.iter().find_map(|prefix| {
        class
            .strip_prefix(prefix)
            .and_then(|rest| rest.strip_prefix('-'))
            .map(|value| (*prefix, value))
    })
}

/// Tailwind spacing scale: one unit is 0.25rem (4px).
fn spacing(value: &str) -> Option<f64> {
    if value == "px" {
        return Some(1.0);
    }
    if let Some(arbitrary) = value.strip_prefix('[').and_then(|v| v.strip_suffix(']')) {
        return arbitrary_px(arbitrary);
    }
    value.parse::<f64>().ok().map(|n| n * 4.0)
}

fn arbitrary_px(value: &str) -> Option<f64> {
    if let Some(px) = value.strip_suffix("px") {
        px.parse().ok()
    } else if let Some(rem) = value.strip_suffix("rem") {
        rem.parse::<f64>().ok().map(|r| r * 16.0)
    } else {
        value.parse().ok()
    }
}

fn length(value: &str) -> Option<Length> {
    match value {
        "full" => Some(Length::Full),
        "screen" => Some(Length::Screen),
        "auto" | "fit" | "min" | "max" => None,
        _ => {
            if let Some((num, den)) = value.split_once('/') {
                let (num, den): (f64, f64) = (num.parse().ok()?, den.parse().ok()?);
                return (den != 0.0).then(|| Length::Fraction(num / den));
            }
            spacing(value).map(Length::Px)
        }
    }
}

fn max_width(value: &str) -> Option<Length> {
    let px = match value {
        "xs" => 320.0,
        "sm" => 384.0,
        "md" => 448.0,
        "lg" => 512.0,
        "xl" => 576.0,
        "2xl" => 672.0,
        "3xl" => 768.0,
        "4xl" => 896.0,
        "5xl" => 1024.0,
        "6xl" => 1152.0,
        "7xl" => 1280.0,
        "full" => return Some(Length::Full),
        "screen" => return Some(Length::Screen),
        _ => {
            return value
                .strip_prefix('[')
                .and_then(|v| v.strip_suffix(']'))
                .and_then(arbitrary_px)
                .map(Length::Px)
        }
    };
    Some(Length::Px(px))
}

fn font_size(value: &str) -> Option<Font> {
    let (size, line_height) = match value {
        "xs" => (12.0, 16.0),
        "sm" => (14.0, 20.0),
        "base" => (16.0, 24.0),
        "lg" => (18.0, 28.0),
        "xl" => (20.0, 28.0),
        "2xl" => (24.0, 32.0),
        "3xl" => (30.0, 36.0),
        "4xl" => (36.0, 40.0),
        "5xl" => (48.0, 48.0),
        "6xl" => (60.0, 60.0),
        "7xl" => (72.0, 72.0),
        "8xl" => (96.0, 96.0),
        "9xl" => (128.0, 128.0),
        _ => {
            let px = value
                .strip_prefix('[')
                .and_then(|v| v.strip_suffix(']'))
                .and_then(arbitrary_px)?;
            (px, px * 1.5)
        }
    };
    Some(Font { size, line_height })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sandbox::Runtime;
    use crate::vdom::VDom;

    fn el(tag: &str, class: &str, children: Vec<VNode>) -> VNode {
        let attributes = if class.is_empty() {
            Vec::new()
        } else {
            vec![("className".to_string(), class.to_string())]
        };
        VDom.element(tag, attributes, children)
    }

    #[test]
    fn test_explicit_size() {
        let node = el("div", "w-64 h-32 p-4", vec![]);
        assert_eq!(measure(&node, Viewport::default()), Size { width: 256.0, height: 128.0 });
    }

    #[test]
    fn test_padding_wraps_content() {
        let node = el("div", "p-4 border", vec![el("div", "w-10 h-10", vec![])]);
        assert_eq!(measure(&node, Viewport::default()), Size { width: 74.0, height: 74.0 });
    }

    #[test]
    fn test_flex_row_and_column_with_gap() {
        let row = el(
            "div",
            "flex gap-2",
            vec![el("div", "w-8 h-8", vec![]), el("div", "w-8 h-12", vec![])],
        );
        assert_eq!(measure(&row, Viewport::default()), Size { width: 72.0, height: 48.0 });

        let col = el(
            "div",
            "flex flex-col space-y-4",
            vec![el("div", "w-8 h-8", vec![]), el("div", "w-16 h-8", vec![])],
        );
        assert_eq!(measure(&col, Viewport::default()), Size { width: 64.0, height: 80.0 });
    }

    #[test]
    fn test_text_uses_font_and_wraps() {
        let short = el("p", "text-sm", vec![VDom.text("abcd")]);
        let size = measure(&short, Viewport::default());
        assert_eq!(size.height, 20.0);
        assert!((size.width - 4.0 * 14.0 * CHAR_WIDTH).abs() < 1e-9);

        let long = el("p", "w-[100px]", vec![VDom.text(&"x".repeat(40))]);
        let size = measure(&long, Viewport::default());
        assert_eq!(size.width, 100.0);
        assert_eq!(size.height, 4.0 * 24.0);
    }

    #[test]
    fn test_hidden_and_max_width() {
        let node = el(
            "div",
            "max-w-sm",
            vec![el("div", "w-full h-4", vec![]), el("div", "hidden w-8 h-8", vec![])],
        );
        assert_eq!(measure(&node, Viewport::default()), Size { width: 384.0, height: 16.0 });
    }

    #[test]
    fn test_grid_columns() {
        let cell = || el("div", "h-10", vec![]);
        let node = el("div", "grid grid-cols-2 gap-4 w-[200px]", vec![cell(), cell(), cell()]);
        let size = measure(&node, Viewport::default());
        assert_eq!(size, Size { width: 200.0, height: 40.0 * 2.0 + 16.0 });
    }

    #[test]
    fn test_attribute_dimensions() {
        let img = VDom.element(
            "img",
            vec![("width".into(), "120".into()), ("height".into(), "80px".into())],
            vec![],
        );
        assert_eq!(measure(&img, Viewport::default()).ceil(), (120, 80));
    }

    #[test]
    fn test_variant_prefixes_ignored() {
        let node = el("div", "w-8 md:w-64 h-8", vec![]);
        assert_eq!(measure(&node, Viewport::default()).width, 32.0);
    }
}
