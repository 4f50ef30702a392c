//! Declarative program tree produced by the JSX compiler.
//!
//! Function bodies are not kept; each function is reduced to its parameter
//! bindings and the value of its first top-level `return`.

/// All function-like declarations found in a module, in source order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub functions: Vec<FunctionDecl>,
}

/// A `function Name(...) {...}` or `const Name = (...) => ...` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionDecl {
    pub name: String,
    pub params: Params,
    /// `None` when the body never returns at its top level.
    pub returns: Option<Expr>,
}

/// How the first parameter binds incoming props.
#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    None,
    /// `(props)`: the whole props object under one name.
    Object(String),
    /// `({ title, size = 2, label: text })`.
    Destructured(Vec<ParamBinding>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct ParamBinding {
    pub prop: String,
    pub local: String,
    pub default: Option<Expr>,
}

/// An expression, reduced to the forms the evaluator understands.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Str(String),
    Num(f64),
    Bool(bool),
    Null,
    Undefined,
    Ident(String),
    /// `object.property`
    Member(String, String),
    Template(Vec<TemplatePart>),
    Jsx(Box<JsxNode>),
    /// Anything else, kept as source text and never evaluated.
    Opaque(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TemplatePart {
    Lit(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum JsxNode {
    Element(Element),
    Fragment(Vec<JsxNode>),
    Text(String),
    Expr(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub name: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<JsxNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Named { name: String, value: Expr },
    Spread(String),
}

impl Program {
    pub fn function(&self, name: &str) -> Option<&FunctionDecl> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl Element {
    /// Capitalized or dotted names refer to components, everything else to host tags.
    pub fn is_component(&self) -> bool {
        self.name.contains('.') || self.name.starts_with(|c: char| c.is_ascii_uppercase())
    }
}
