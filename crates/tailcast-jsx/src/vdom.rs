//! Virtual DOM runtime and its static HTML serializer.

use serde::Serialize;

use crate::sandbox::Runtime;

/// A rendered node.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum VNode {
    Element {
        tag: String,
        attributes: Vec<(String, String)>,
        children: Vec<VNode>,
    },
    Text {
        text: String,
    },
    Fragment {
        children: Vec<VNode>,
    },
}

impl VNode {
    /// Levels of elements and fragments, text leaves counting as one.
    pub fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack = vec![(self, 1)];
        while let Some((node, level)) = stack.pop() {
            deepest = deepest.max(level);
            if let Self::Element { children, .. } | Self::Fragment { children } = node {
                stack.extend(children.iter().map(|child| (child, level + 1)));
            }
        }
        deepest
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        match self {
            Self::Element { attributes, .. } => attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str()),
            _ => None,
        }
    }

    /// Concatenated text content of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            Self::Text { text } => out.push_str(text),
            Self::Element { children, .. } | Self::Fragment { children } => {
                for child in children {
                    child.collect_text(out);
                }
            }
        }
    }
}

/// The default runtime: builds [`VNode`] trees.
#[derive(Debug, Clone, Copy, Default)]
pub struct VDom;

impl Runtime for VDom {
    type Node = VNode;

    fn element(&self, tag: &str, attributes: Vec<(String, String)>, children: Vec<VNode>) -> VNode {
        VNode::Element {
            tag: tag.to_string(),
            attributes,
            children,
        }
    }

    fn text(&self, text: &str) -> VNode {
        VNode::Text {
            text: text.to_string(),
        }
    }

    fn fragment(&self, children: Vec<VNode>) -> VNode {
        VNode::Fragment { children }
    }
}

// ── HTML ────────────────────────────────────────────────────────

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source",
    "track", "wbr",
];

/// Serialize a tree to static markup.
pub fn to_html(node: &VNode) -> String {
    let mut out = String::new();
    write_html(node, &mut out);
    out
}

fn write_html(node: &VNode, out: &mut String) {
    match node {
        VNode::Text { text } => out.push_str(&escape(text)),
        VNode::Fragment { children } => {
            for child in children {
                write_html(child, out);
            }
        }
        VNode::Element {
            tag,
            attributes,
            children,
        } => {
            out.push('<');
            out.push_str(tag);
            for (name, value) in attributes {
                out.push(' ');
                out.push_str(&html_attribute_name(name));
                out.push_str("=\"");
                out.push_str(&escape(value));
                out.push('"');
            }
            if VOID_ELEMENTS.contains(&tag.as_str()) {
                out.push_str("/>");
                return;
            }
            out.push('>');
            for child in children {
                write_html(child, out);
            }
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn html_attribute_name(name: &str) -> String {
    match name {
        "className" => "class".into(),
        "htmlFor" => "for".into(),
        "xlinkHref" => "xlink:href".into(),
        "strokeWidth" | "strokeLinecap" | "strokeLinejoin" | "strokeDasharray"
        | "strokeDashoffset" | "strokeOpacity" | "strokeMiterlimit" | "fillRule" | "fillOpacity"
        | "clipRule" | "clipPath" | "stopColor" | "stopOpacity" | "textAnchor"
        | "dominantBaseline" | "fontFamily" | "fontSize" | "fontWeight" => kebab(name),
        _ => name.into(),
    }
}

fn kebab(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    for c in name.chars() {
        if c.is_ascii_uppercase() {
            out.push('-');
            out.push(c.to_ascii_lowercase());
        } else {
            out.push(c);
        }
    }
    out
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#x27;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn element(tag: &str, attributes: &[(&str, &str)], children: Vec<VNode>) -> VNode {
        VDom.element(
            tag,
            attributes
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            children,
        )
    }

    #[test]
    fn test_depth() {
        let tree = VDom.fragment(vec![
            VDom.text("a"),
            element("p", &[], vec![element("b", &[], vec![VDom.text("x")])]),
        ]);
        assert_eq!(tree.depth(), 4);
        assert_eq!(VDom.text("a").depth(), 1);
    }

    #[test]
    fn test_to_html_maps_react_attribute_names() {
        let node = element(
            "label",
            &[("className", "text-sm"), ("htmlFor", "email")],
            vec![VDom.text("Email")],
        );
        assert_eq!(to_html(&node), r#"<label class="text-sm" for="email">Email</label>"#);
    }

    #[test]
    fn test_void_elements_and_fragments() {
        let node = VDom.fragment(vec![
            element("img", &[("src", "/a.png"), ("alt", "")], vec![]),
            element("br", &[], vec![]),
            VDom.text("after"),
        ]);
        assert_eq!(to_html(&node), r#"<img src="/a.png" alt=""/><br/>after"#);
    }

    #[test]
    fn test_svg_attributes_become_kebab_case() {
        let node = element(
            "path",
            &[("strokeWidth", "2"), ("strokeLinecap", "round"), ("viewBox", "0 0 24 24")],
            vec![],
        );
        assert_eq!(
            to_html(&node),
            r#"<path stroke-width="2" stroke-linecap="round" viewBox="0 0 24 24"></path>"#
        );
    }

    #[test]
    fn test_escaping() {
        let node = element("p", &[("title", "\"q\" & 'a'")], vec![VDom.text("1 < 2 > 0")]);
        assert_eq!(
            to_html(&node),
            "<p title=\"&quot;q&quot; &amp; &#x27;a&#x27;\">1 &lt; 2 &gt; 0</p>"
        );
    }

    #[test]
    fn test_text_content_and_attribute() {
        let node = element(
            "div",
            &[("id", "root")],
            vec![VDom.text("a"), VDom.fragment(vec![VDom.text("b")])],
        );
        assert_eq!(node.text_content(), "ab");
        assert_eq!(node.attribute("id"), Some("root"));
        assert_eq!(node.attribute("class"), None);
    }
}
