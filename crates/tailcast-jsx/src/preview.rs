//! Preview host: runs generated code and owns the outcome.

use serde::Serialize;
use tracing::{debug, warn};

use crate::error::PreviewError;
use crate::layout::{measure, Size, Viewport};
use crate::normalize::{find_name, normalize};
use crate::parser::{MAX_NESTING, NESTING_EXCEEDED};
use crate::sandbox::{evaluate, Component};
use crate::vdom::{to_html, VDom, VNode};

pub const TAILWIND_CDN: &str = "https://cdn.tailwindcss.com";

/// Holds at most one of a compiled component or the error that prevented it.
pub struct PreviewHost {
    viewport: Viewport,
    component: Option<Component<VDom>>,
    error: Option<PreviewError>,
    /// Contents of the target container after the last successful render.
    rendered: Option<VNode>,
    frame: Option<Size>,
}

impl Default for PreviewHost {
    fn default() -> Self {
        Self::new(Viewport::default())
    }
}

impl PreviewHost {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            component: None,
            error: None,
            rendered: None,
            frame: None,
        }
    }

    /// Normalize, compile and render `source`, replacing any previous outcome.
    pub fn run(&mut self, source: &str) -> Result<Size, PreviewError> {
        self.clear();
        let normalized = normalize(source);
        let name = find_name(&normalized);
        let outcome = if source.trim().is_empty() {
            Err(PreviewError::EmptySource)
        } else {
            evaluate(&normalized, name, VDom)
        };
        match outcome {
            Ok(component) => {
                self.component = Some(component);
                self.rerender()
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    /// Render the current component again and re-measure the frame.
    pub fn rerender(&mut self) -> Result<Size, PreviewError> {
        let Some(component) = &self.component else {
            return Err(self.error.clone().unwrap_or(PreviewError::EmptySource));
        };
        match component.render() {
            Ok(node) if node.depth() > MAX_NESTING => {
                Err(self.fail(PreviewError::Render(NESTING_EXCEEDED.into())))
            }
            Ok(node) => {
                // Measured from the rendered tree, never estimated up front.
                let size = measure(&node, self.viewport);
                debug!(
                    component = component.name(),
                    width = size.width,
                    height = size.height,
                    "preview rendered"
                );
                self.rendered = Some(node);
                self.frame = Some(size);
                Ok(size)
            }
            Err(e) => Err(self.fail(e)),
        }
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    fn clear(&mut self) {
        self.component = None;
        self.error = None;
        self.rendered = None;
        self.frame = None;
    }

    fn fail(&mut self, error: PreviewError) -> PreviewError {
        warn!(kind = error.kind(), "preview failed: {error}");
        self.clear();
        self.error = Some(error.clone());
        error
    }

    // ── Accessors ───────────────────────────────────────────────

    pub fn component(&self) -> Option<&Component<VDom>> {
        self.component.as_ref()
    }

    pub fn error(&self) -> Option<&PreviewError> {
        self.error.as_ref()
    }

    pub fn rendered(&self) -> Option<&VNode> {
        self.rendered.as_ref()
    }

    pub fn frame(&self) -> Option<Size> {
        self.frame
    }

    pub fn html(&self) -> Option<String> {
        self.rendered.as_ref().map(to_html)
    }

    pub fn report(&self) -> PreviewReport {
        PreviewReport {
            ok: self.component.is_some(),
            component: self.component.as_ref().map(|c| c.name().to_string()),
            html: self.html(),
            frame: self.frame,
            error: self.error.as_ref().map(ToString::to_string),
            kind: self.error.as_ref().map(PreviewError::kind),
        }
    }

    /// A standalone page that loads Tailwind and shows the current outcome.
    pub fn document(&self) -> String {
        let body = match (&self.rendered, &self.error) {
            (Some(node), _) => {
                let (width, height) = self.frame.unwrap_or_default().ceil();
                format!(
                    "<div id=\"preview-frame\" style=\"width:{width}px;height:{height}px\">{}</div>",
                    to_html(node)
                )
            }
            (None, Some(error)) => format!(
                "<pre id=\"preview-error\" class=\"text-red-600 whitespace-pre-wrap\">{}</pre>",
                escape_text(&error.to_string())
            ),
            (None, None) => String::new(),
        };
        format!(
            "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>Preview</title>\n<script src=\"{TAILWIND_CDN}\"></script>\n</head>\n<body>\n{body}\n</body>\n</html>\n"
        )
    }
}

/// Serializable summary of a preview run.
#[derive(Debug, Clone, Serialize)]
pub struct PreviewReport {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<&'static str>,
}

fn escape_text(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deep_markup_is_contained() {
        for n in [500, 3000, 50_000] {
            let source = "<div>".repeat(n) + &"</div>".repeat(n);
            let mut host = PreviewHost::default();
            let err = host.run(&source).unwrap_err();
            assert_eq!(err.kind(), "compile");
            assert!(host.component().is_none());
            assert!(host.rendered().is_none());
        }
    }

    #[test]
    fn test_deep_tree_from_children_is_rejected() {
        let layer = "<div>".repeat(40) + "{children}" + &"</div>".repeat(40);
        let source = format!(
            "function App() {{ return <A><A><A><A><span /></A></A></A></A> }}\n\
             function A({{ children }}) {{ return {layer} }}"
        );
        let mut host = PreviewHost::default();
        assert_eq!(
            host.run(&source).unwrap_err(),
            PreviewError::Render(NESTING_EXCEEDED.into())
        );
        assert!(host.frame().is_none());
    }

    #[test]
    fn test_success_sets_component_only() {
        let mut host = PreviewHost::default();
        let size = host
            .run("export default function Card() { return <div className=\"w-40 h-20\" />; }")
            .unwrap();
        assert_eq!(size, Size { width: 160.0, height: 80.0 });
        assert_eq!(host.component().map(|c| c.name()), Some("Card"));
        assert!(host.error().is_none());
        assert_eq!(host.html().as_deref(), Some("<div class=\"w-40 h-20\"></div>"));
    }

    #[test]
    fn test_empty_source_sets_error_only() {
        let mut host = PreviewHost::default();
        assert_eq!(host.run("   "), Err(PreviewError::EmptySource));
        assert!(host.component().is_none());
        assert_eq!(host.error(), Some(&PreviewError::EmptySource));
    }

    #[test]
    fn test_compile_error_clears_previous_component() {
        let mut host = PreviewHost::default();
        host.run("<p>ok</p>").unwrap();
        assert!(host.component().is_some());

        let err = host.run("function Foo(){ return <div").unwrap_err();
        assert_eq!(err.kind(), "compile");
        assert!(host.component().is_none());
        assert!(host.rendered().is_none());
        assert!(host.frame().is_none());
        assert_eq!(host.error().map(PreviewError::kind), Some("compile"));
    }

    #[test]
    fn test_render_error_is_contained() {
        let mut host = PreviewHost::default();
        let err = host.run("function App() { return <Missing /> }").unwrap_err();
        assert_eq!(err, PreviewError::Render("Missing is not defined".into()));
        assert!(host.component().is_none());
    }

    #[test]
    fn test_document_loads_tailwind() {
        let mut host = PreviewHost::default();
        host.run("<div className=\"w-10 h-10\">x</div>").unwrap();
        let doc = host.document();
        assert!(doc.contains(TAILWIND_CDN));
        assert!(doc.contains("style=\"width:40px;height:40px\""));
        assert!(doc.contains("<div class=\"w-10 h-10\">x</div>"));

        host.run("").unwrap_err();
        assert!(host.document().contains("Paste generated code first."));
    }

    #[test]
    fn test_report() {
        let mut host = PreviewHost::default();
        host.run("function A() { return <Nope /> }").unwrap_err();
        let report = serde_json::to_value(host.report()).unwrap();
        assert_eq!(
            report,
            serde_json::json!({"ok": false, "error": "Nope is not defined", "kind": "render"})
        );
    }
}
