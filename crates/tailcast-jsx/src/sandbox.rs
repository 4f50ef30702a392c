//! Sandbox evaluator.
//!
//! Compiled source is never executed. A [`Component`] interprets the
//! declarative [`Program`] against a [`Runtime`], the one dependency the
//! generated code is given. Literal values and props flow through; any
//! expression the compiler kept opaque renders as nothing.

use std::cell::Cell;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::ast::{Attribute, Expr, FunctionDecl, JsxNode, Params, Program, TemplatePart};
use crate::error::PreviewError;
use crate::parser::{compile, MAX_NESTING, NESTING_EXCEEDED};

/// Nested component calls beyond this depth abort the render.
pub const MAX_DEPTH: usize = 64;

/// The rendering library entry points handed to generated components.
pub trait Runtime {
    type Node: Clone;

    fn element(
        &self,
        tag: &str,
        attributes: Vec<(String, String)>,
        children: Vec<Self::Node>,
    ) -> Self::Node;

    fn text(&self, text: &str) -> Self::Node;

    fn fragment(&self, children: Vec<Self::Node>) -> Self::Node;
}

/// Compile normalized source and bind the component called `name`.
pub fn evaluate<R: Runtime>(
    source: &str,
    name: &str,
    runtime: R,
) -> Result<Component<R>, PreviewError> {
    if source.trim().is_empty() {
        return Err(PreviewError::EmptySource);
    }
    let program = compile(source)?;
    if program.function(name).is_none() {
        debug!(name, "component not found in compiled source");
        return Err(PreviewError::NotAComponent {
            name: name.to_string(),
        });
    }
    Ok(Component {
        program: Arc::new(program),
        name: name.to_string(),
        runtime,
    })
}

/// A compiled component ready to render.
pub struct Component<R: Runtime> {
    program: Arc<Program>,
    name: String,
    runtime: R,
}

impl<R: Runtime> Component<R> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Render with no props.
    pub fn render(&self) -> Result<R::Node, PreviewError> {
        self.render_with(Vec::new())
    }

    /// Render with string props, as if written `<Name key="value" />`.
    pub fn render_with(&self, props: Vec<(String, String)>) -> Result<R::Node, PreviewError> {
        let props = props
            .into_iter()
            .map(|(k, v)| (k, Value::Str(v)))
            .collect();
        let decl = self
            .program
            .function(&self.name)
            .ok_or_else(|| PreviewError::NotAComponent {
                name: self.name.clone(),
            })?;
        let renderer = Renderer {
            program: &self.program,
            runtime: &self.runtime,
            nesting: Cell::new(0),
        };
        let value = renderer.call(decl, props, 0)?;
        renderer.into_node(value)
    }
}

// ── Values ──────────────────────────────────────────────────────

#[derive(Clone)]
enum Value<N> {
    Undefined,
    Null,
    Bool(bool),
    Num(f64),
    Str(String),
    Node(N),
    Object(Vec<(String, Value<N>)>),
    /// A value only a JavaScript engine could produce.
    Opaque,
}

impl<N> Value<N> {
    fn is_undefined(&self) -> bool {
        matches!(self, Self::Undefined)
    }

    /// `String(value)` for template interpolation.
    fn to_js_string(&self) -> String {
        match self {
            Self::Undefined => "undefined".into(),
            Self::Null => "null".into(),
            Self::Bool(b) => b.to_string(),
            Self::Num(n) => js_number(*n),
            Self::Str(s) => s.clone(),
            Self::Node(_) | Self::Object(_) => "[object Object]".into(),
            Self::Opaque => String::new(),
        }
    }

    /// Attribute serialization; `None` omits the attribute.
    fn to_attribute(&self) -> Option<String> {
        match self {
            Self::Bool(true) => Some(String::new()),
            Self::Num(n) => Some(js_number(*n)),
            Self::Str(s) => Some(s.clone()),
            _ => None,
        }
    }
}

type Scope<N> = Vec<(String, Value<N>)>;

fn lookup<'a, N>(scope: &'a Scope<N>, name: &str) -> Option<&'a Value<N>> {
    scope.iter().rev().find(|(k, _)| k == name).map(|(_, v)| v)
}

/// Format a number the way JavaScript prints it.
pub(crate) fn js_number(n: f64) -> String {
    if n.is_nan() {
        "NaN".into()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.into()
    } else if n == n.trunc() && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{n}")
    }
}

// ── Rendering ───────────────────────────────────────────────────

struct Renderer<'a, R: Runtime> {
    program: &'a Program,
    runtime: &'a R,
    /// JSX nodes currently being built, across component calls.
    nesting: Cell<usize>,
}

impl<R: Runtime> Renderer<'_, R> {
    fn call(
        &self,
        decl: &FunctionDecl,
        props: Vec<(String, Value<R::Node>)>,
        depth: usize,
    ) -> Result<Value<R::Node>, PreviewError> {
        if depth >= MAX_DEPTH {
            return Err(PreviewError::Render(
                "Maximum component depth exceeded".into(),
            ));
        }
        trace!(component = %decl.name, depth, "render component");

        let mut scope: Scope<R::Node> = Vec::new();
        match &decl.params {
            Params::None => {}
            Params::Object(name) => scope.push((name.clone(), Value::Object(props))),
            Params::Destructured(bindings) => {
                for binding in bindings {
                    let given = lookup(&props, &binding.prop)
                        .cloned()
                        .unwrap_or(Value::Undefined);
                    let value = match (&binding.default, given.is_undefined()) {
                        (Some(default), true) => self.eval(default, &Vec::new(), depth)?,
                        _ => given,
                    };
                    scope.push((binding.local.clone(), value));
                }
            }
        }

        match &decl.returns {
            Some(expr) => self.eval(expr, &scope, depth),
            None => Ok(Value::Undefined),
        }
    }

    fn eval(
        &self,
        expr: &Expr,
        scope: &Scope<R::Node>,
        depth: usize,
    ) -> Result<Value<R::Node>, PreviewError> {
        Ok(match expr {
            Expr::Str(s) => Value::Str(s.clone()),
            Expr::Num(n) => Value::Num(*n),
            Expr::Bool(b) => Value::Bool(*b),
            Expr::Null => Value::Null,
            Expr::Undefined => Value::Undefined,
            Expr::Ident(name) => lookup(scope, name).cloned().unwrap_or(Value::Opaque),
            Expr::Member(object, prop) => match lookup(scope, object) {
                Some(Value::Object(fields)) => {
                    lookup(fields, prop).cloned().unwrap_or(Value::Undefined)
                }
                Some(Value::Str(s)) if prop == "length" => Value::Num(s.chars().count() as f64),
                _ => Value::Opaque,
            },
            Expr::Template(parts) => {
                let mut out = String::new();
                for part in parts {
                    match part {
                        TemplatePart::Lit(lit) => out.push_str(lit),
                        TemplatePart::Expr(e) => {
                            out.push_str(&self.eval(e, scope, depth)?.to_js_string())
                        }
                    }
                }
                Value::Str(out)
            }
            Expr::Jsx(node) => Value::Node(self.node(node, scope, depth)?),
            Expr::Opaque(source) => {
                trace!(source = %source, "skipping opaque expression");
                Value::Opaque
            }
        })
    }

    fn node(
        &self,
        node: &JsxNode,
        scope: &Scope<R::Node>,
        depth: usize,
    ) -> Result<R::Node, PreviewError> {
        let nesting = self.nesting.get();
        if nesting >= MAX_NESTING {
            return Err(PreviewError::Render(NESTING_EXCEEDED.into()));
        }
        self.nesting.set(nesting + 1);
        let out = self.build(node, scope, depth);
        self.nesting.set(nesting);
        out
    }

    fn build(
        &self,
        node: &JsxNode,
        scope: &Scope<R::Node>,
        depth: usize,
    ) -> Result<R::Node, PreviewError> {
        match node {
            JsxNode::Text(text) => Ok(self.runtime.text(text)),
            JsxNode::Fragment(children) => {
                Ok(self.runtime.fragment(self.children(children, scope, depth)?))
            }
            JsxNode::Expr(expr) => {
                let value = self.eval(expr, scope, depth)?;
                self.into_node(value)
            }
            JsxNode::Element(element) => {
                let children = self.children(&element.children, scope, depth)?;
                if !element.is_component() {
                    let attributes = self.host_attributes(&element.attributes, scope, depth)?;
                    return Ok(self.runtime.element(&element.name, attributes, children));
                }

                if let Some(decl) = self.program.function(&element.name) {
                    let mut props = self.component_props(&element.attributes, scope, depth)?;
                    if !children.is_empty() {
                        let child = if children.len() == 1 {
                            children.into_iter().next().map(Value::Node)
                        } else {
                            Some(Value::Node(self.runtime.fragment(children)))
                        };
                        if let Some(child) = child {
                            props.push(("children".into(), child));
                        }
                    }
                    let value = self.call(decl, props, depth + 1)?;
                    return self.into_node(value);
                }

                if matches!(element.name.as_str(), "Fragment" | "React.Fragment") {
                    return Ok(self.runtime.fragment(children));
                }
                Err(PreviewError::Render(format!(
                    "{} is not defined",
                    element.name
                )))
            }
        }
    }

    fn children(
        &self,
        children: &[JsxNode],
        scope: &Scope<R::Node>,
        depth: usize,
    ) -> Result<Vec<R::Node>, PreviewError> {
        let mut out = Vec::with_capacity(children.len());
        for child in children {
            if let JsxNode::Expr(expr) = child {
                let value = self.eval(expr, scope, depth)?;
                if let Some(node) = self.child_node(value)? {
                    out.push(node);
                }
            } else {
                out.push(self.node(child, scope, depth)?);
            }
        }
        Ok(out)
    }

    /// A value in child position; booleans, null and opaque values render nothing.
    fn child_node(&self, value: Value<R::Node>) -> Result<Option<R::Node>, PreviewError> {
        Ok(match value {
            Value::Str(s) => Some(self.runtime.text(&s)),
            Value::Num(n) => Some(self.runtime.text(&js_number(n))),
            Value::Node(node) => Some(node),
            Value::Object(_) => {
                return Err(PreviewError::Render(
                    "Objects are not valid as a React child".into(),
                ))
            }
            Value::Undefined | Value::Null | Value::Bool(_) | Value::Opaque => None,
        })
    }

    fn into_node(&self, value: Value<R::Node>) -> Result<R::Node, PreviewError> {
        Ok(self
            .child_node(value)?
            .unwrap_or_else(|| self.runtime.fragment(Vec::new())))
    }

    fn host_attributes(
        &self,
        attributes: &[Attribute],
        scope: &Scope<R::Node>,
        depth: usize,
    ) -> Result<Vec<(String, String)>, PreviewError> {
        let mut out: Vec<(String, String)> = Vec::new();
        let mut set = |name: &str, value: &Value<R::Node>| {
            if is_event_handler(name) || matches!(name, "key" | "ref" | "children") {
                return;
            }
            out.retain(|(k, _)| k != name);
            if let Some(v) = value.to_attribute() {
                out.push((name.to_string(), v));
            }
        };

        for attribute in attributes {
            match attribute {
                Attribute::Named { name, value } => {
                    let value = self.eval(value, scope, depth)?;
                    set(name, &value);
                }
                Attribute::Spread(source) => {
                    if let Some(Value::Object(fields)) = lookup(scope, source) {
                        for (name, value) in fields {
                            set(name, value);
                        }
                    }
                }
            }
        }
        Ok(out)
    }

    fn component_props(
        &self,
        attributes: &[Attribute],
        scope: &Scope<R::Node>,
        depth: usize,
    ) -> Result<Vec<(String, Value<R::Node>)>, PreviewError> {
        let mut props: Vec<(String, Value<R::Node>)> = Vec::new();
        for attribute in attributes {
            match attribute {
                Attribute::Named { name, value } => {
                    let value = self.eval(value, scope, depth)?;
                    props.retain(|(k, _)| k != name);
                    props.push((name.clone(), value));
                }
                Attribute::Spread(source) => {
                    if let Some(Value::Object(fields)) = lookup(scope, source) {
                        for (name, value) in fields {
                            props.retain(|(k, _)| k != name);
                            props.push((name.clone(), value.clone()));
                        }
                    }
                }
            }
        }
        Ok(props)
    }
}

fn is_event_handler(name: &str) -> bool {
    name.len() > 2
        && name.starts_with("on")
        && name[2..].starts_with(|c: char| c.is_ascii_uppercase())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::normalize::{find_name, normalize};
    use crate::vdom::{to_html, VDom};

    fn html(source: &str) -> String {
        let normalized = normalize(source);
        let component = evaluate(&normalized, find_name(&normalized), VDom).unwrap();
        to_html(&component.render().unwrap())
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(evaluate("", "X", VDom).err(), Some(PreviewError::EmptySource));
        assert_eq!(
            evaluate("  \n\t", "X", VDom).err(),
            Some(PreviewError::EmptySource)
        );
    }

    #[test]
    fn test_unterminated_jsx_is_compile_error() {
        let err = evaluate("function Foo(){ return <div", "Foo", VDom)
            .err()
            .unwrap();
        assert_eq!(err.kind(), "compile");
        assert!(err.to_string().starts_with("Unterminated JSX contents."));
    }

    #[test]
    fn test_missing_component() {
        let err = evaluate("function Foo() { return null }", "Bar", VDom)
            .err()
            .unwrap();
        assert_eq!(
            err,
            PreviewError::NotAComponent {
                name: "Bar".into()
            }
        );
        assert_eq!(err.to_string(), "No valid React component found.");
    }

    #[test]
    fn test_bare_snippet_renders_through_fragment() {
        assert_eq!(
            html(r#"<div className="p-4"><h1>Hi</h1></div>"#),
            r#"<div class="p-4"><h1>Hi</h1></div>"#
        );
    }

    #[test]
    fn test_nested_components_with_props_and_children() {
        let source = r#"
import React from 'react';

export default function App() {
  return (
    <main>
      <Button label="Save" />
      <Button label="Cancel" variant="ghost">
        <span>!</span>
      </Button>
    </main>
  );
}

function Button({ label, variant = 'primary', children }) {
  return <button className={`btn btn-${variant}`} onClick={() => alert(1)}>{label}{children}</button>;
}
"#;
        assert_eq!(
            html(source),
            concat!(
                "<main>",
                r#"<button class="btn btn-primary">Save</button>"#,
                r#"<button class="btn btn-ghost">Cancel<span>!</span></button>"#,
                "</main>"
            )
        );
    }

    #[test]
    fn test_props_object_and_spread() {
        let source = r#"
function Field(props) {
  return <input {...props} />;
}
function Form() {
  return <form><Field type="email" required name={"mail"} /></form>;
}
"#;
        let component = evaluate(source, "Form", VDom).unwrap();
        assert_eq!(
            to_html(&component.render().unwrap()),
            r#"<form><input type="email" required="" name="mail"/></form>"#
        );
    }

    #[test]
    fn test_value_rendering_rules() {
        assert_eq!(
            html("function V() { return <p>{1.5}{0}{true}{null}{'s'}{count}{undefined}</p>; }"),
            "<p>1.50s</p>"
        );
    }

    #[test]
    fn test_render_with_props() {
        let component = evaluate(
            "function Hello({ name }) { return <b>Hello {name}</b>; }",
            "Hello",
            VDom,
        )
        .unwrap();
        let node = component
            .render_with(vec![("name".into(), "Ada".into())])
            .unwrap();
        assert_eq!(to_html(&node), "<b>Hello Ada</b>");
    }

    #[test]
    fn test_unknown_component_is_render_error() {
        let component = evaluate("function A() { return <Icon /> }", "A", VDom).unwrap();
        assert_eq!(
            component.render().err(),
            Some(PreviewError::Render("Icon is not defined".into()))
        );
    }

    #[test]
    fn test_recursion_is_bounded() {
        let component = evaluate("function Loop() { return <div><Loop /></div> }", "Loop", VDom)
            .unwrap();
        assert_eq!(
            component.render().err(),
            Some(PreviewError::Render("Maximum component depth exceeded".into()))
        );
    }

    #[test]
    fn test_nesting_across_components_is_bounded() {
        let component = evaluate(
            "function Loop() { return <div><div><div><Loop /></div></div></div> }",
            "Loop",
            VDom,
        )
        .unwrap();
        assert_eq!(
            component.render().err(),
            Some(PreviewError::Render(NESTING_EXCEEDED.into()))
        );
    }

    #[test]
    fn test_js_number() {
        assert_eq!(js_number(3.0), "3");
        assert_eq!(js_number(-0.25), "-0.25");
        assert_eq!(js_number(f64::NAN), "NaN");
    }
}
