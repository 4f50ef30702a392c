//! JSX compiler: source text to a declarative [`Program`].
//!
//! Only the shape of component functions is retained: parameter bindings
//! and the first top-level `return`. Everything else is scanned just far
//! enough to find statement boundaries and to reject malformed JSX, so a
//! syntax error anywhere in the markup fails the whole compile.

use tracing::debug;

use crate::ast::{
    Attribute, Element, Expr, FunctionDecl, JsxNode, ParamBinding, Params, Program, TemplatePart,
};
use crate::error::CompileError;
use crate::scanner::{is_ident_char, is_ident_start, Cursor};

const UNTERMINATED_JSX: &str = "Unterminated JSX contents.";

/// Deepest nesting of elements, groups, parentheses and templates accepted.
/// Rendering, measuring and serializing recurse over the same tree.
pub const MAX_NESTING: usize = 128;
pub const NESTING_EXCEEDED: &str = "Maximum nesting depth exceeded";

/// Words after which a `<` starts JSX rather than a comparison.
const EXPR_KEYWORDS: &[&str] = &[
    "return", "typeof", "case", "do", "else", "in", "of", "new", "delete", "void", "throw",
    "yield", "await", "instanceof", "export", "default",
];

/// Compile JSX-flavored source into its component declarations.
pub fn compile(source: &str) -> Result<Program, CompileError> {
    let program = Parser::new(source).program()?;
    debug!(functions = program.functions.len(), "compiled source");
    Ok(program)
}

struct Parser {
    cur: Cursor,
    /// Whether the next token sits where an expression may begin.
    expr_start: bool,
    nesting: usize,
}

#[derive(Clone, Copy)]
enum TypeEnd {
    /// `const X: T = ...`
    Assign,
    /// `(...): T => ...`
    Arrow,
    /// `function f(): T { ... }`
    Block,
}

impl Parser {
    fn new(source: &str) -> Self {
        Self {
            cur: Cursor::new(source),
            expr_start: true,
            nesting: 0,
        }
    }

    /// Run `f` one nesting level deeper, failing past [`MAX_NESTING`].
    fn nested<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<T, CompileError>,
    ) -> Result<T, CompileError> {
        if self.nesting >= MAX_NESTING {
            return Err(self.cur.error(NESTING_EXCEEDED));
        }
        self.nesting += 1;
        let out = f(self);
        self.nesting -= 1;
        out
    }

    fn program(mut self) -> Result<Program, CompileError> {
        let mut functions = Vec::new();
        loop {
            self.cur.skip_trivia()?;
            if self.cur.eof() {
                break;
            }
            if self.cur.eat_keyword("export") || self.cur.eat_keyword("default") {
                self.expr_start = true;
                continue;
            }
            match self.declaration()? {
                Some(decl) => functions.push(decl),
                None => self.skip_token()?,
            }
        }
        Ok(Program { functions })
    }

    // ── Declarations ────────────────────────────────────────────

    fn declaration(&mut self) -> Result<Option<FunctionDecl>, CompileError> {
        let start = self.cur.pos();
        self.cur.eat_keyword("async");
        self.cur.skip_trivia()?;

        if self.cur.eat_keyword("function") {
            self.cur.skip_trivia()?;
            self.cur.eat('*');
            self.cur.skip_trivia()?;
            let name = self.cur.read_ident().unwrap_or_default();
            let (params, returns) = self.function_tail()?;
            self.expr_start = true;
            return Ok((!name.is_empty()).then_some(FunctionDecl {
                name,
                params,
                returns,
            }));
        }

        if ["const", "let", "var"].iter().any(|kw| self.cur.eat_keyword(kw)) {
            self.cur.skip_trivia()?;
            if let Some(name) = self.cur.read_ident() {
                self.cur.skip_trivia()?;
                if self.cur.eat(':') {
                    self.skip_type(TypeEnd::Assign)?;
                }
                if self.cur.eat('=') {
                    self.cur.skip_trivia()?;
                    if let Some((params, returns)) = self.function_value()? {
                        self.expr_start = true;
                        return Ok(Some(FunctionDecl {
                            name,
                            params,
                            returns,
                        }));
                    }
                }
            }
        }

        self.cur.reset(start);
        Ok(None)
    }

    /// A function expression or arrow function in value position.
    fn function_value(&mut self) -> Result<Option<(Params, Option<Expr>)>, CompileError> {
        let start = self.cur.pos();
        self.cur.eat_keyword("async");
        self.cur.skip_trivia()?;

        if self.cur.eat_keyword("function") {
            self.cur.skip_trivia()?;
            self.cur.eat('*');
            self.cur.skip_trivia()?;
            self.cur.read_ident();
            return self.function_tail().map(Some);
        }

        let params = if self.cur.peek() == Some('(') {
            match self.params() {
                Ok(params) => params,
                Err(_) => {
                    self.cur.reset(start);
                    return Ok(None);
                }
            }
        } else if let Some(name) = self.cur.read_ident() {
            Params::Object(name)
        } else {
            self.cur.reset(start);
            return Ok(None);
        };

        self.cur.skip_trivia()?;
        if self.cur.eat(':') && self.skip_type(TypeEnd::Arrow).is_err() {
            self.cur.reset(start);
            return Ok(None);
        }
        self.cur.skip_trivia()?;
        if !self.cur.eat_str("=>") {
            self.cur.reset(start);
            return Ok(None);
        }
        self.cur.skip_trivia()?;

        let returns = if self.cur.peek() == Some('{') {
            self.block_body()?
        } else {
            Some(self.value()?)
        };
        Ok(Some((params, returns)))
    }

    /// Everything after a function name: generics, parameters, return type, body.
    fn function_tail(&mut self) -> Result<(Params, Option<Expr>), CompileError> {
        self.cur.skip_trivia()?;
        if self.cur.peek() == Some('<') {
            while !matches!(self.cur.peek(), None | Some('(')) {
                self.cur.bump();
            }
        }
        let params = self.params()?;
        self.cur.skip_trivia()?;
        if self.cur.eat(':') {
            self.skip_type(TypeEnd::Block)?;
        }
        self.cur.skip_trivia()?;
        let returns = self.block_body()?;
        Ok((params, returns))
    }

    fn params(&mut self) -> Result<Params, CompileError> {
        self.expect('(')?;
        self.cur.skip_trivia()?;
        let params = match self.cur.peek() {
            Some(')') => Params::None,
            Some('{') => Params::Destructured(self.destructured()?),
            _ => self.cur.read_ident().map_or(Params::None, Params::Object),
        };

        // Type annotations, defaults and any further parameters.
        loop {
            self.cur.skip_trivia()?;
            match self.cur.peek() {
                Some(')') => {
                    self.cur.bump();
                    return Ok(params);
                }
                None => return Err(self.cur.error("Unexpected token, expected \")\"")),
                _ => {
                    self.expr_start = false;
                    self.skip_token()?;
                }
            }
        }
    }

    fn destructured(&mut self) -> Result<Vec<ParamBinding>, CompileError> {
        self.expect('{')?;
        let mut bindings = Vec::new();
        loop {
            self.cur.skip_trivia()?;
            if self.cur.eat('}') {
                break;
            }
            if self.cur.eat_str("...") {
                self.cur.skip_trivia()?;
                self.cur.read_ident();
            } else {
                let prop = match self.cur.peek() {
                    Some('\'' | '"') => self.cur.read_string()?,
                    _ => self
                        .cur
                        .read_ident()
                        .ok_or_else(|| self.cur.error("Unexpected token"))?,
                };
                self.cur.skip_trivia()?;

                let mut local = Some(prop.clone());
                if self.cur.eat(':') {
                    self.cur.skip_trivia()?;
                    local = match self.cur.peek() {
                        // Nested patterns bind nothing we can name.
                        Some('{' | '[') => {
                            self.skip_token()?;
                            None
                        }
                        _ => Some(
                            self.cur
                                .read_ident()
                                .ok_or_else(|| self.cur.error("Unexpected token"))?,
                        ),
                    };
                    self.cur.skip_trivia()?;
                }

                let default = if self.cur.peek() == Some('=') && self.cur.peek_at(1) != Some('>') {
                    self.cur.bump();
                    self.cur.skip_trivia()?;
                    Some(self.value()?)
                } else {
                    None
                };

                if let Some(local) = local {
                    bindings.push(ParamBinding {
                        prop,
                        local,
                        default,
                    });
                }
            }

            self.cur.skip_trivia()?;
            if !self.cur.eat(',') {
                self.cur.skip_trivia()?;
                self.expect('}')?;
                break;
            }
        }
        Ok(bindings)
    }

    /// Scan a `{ ... }` body and return the value of its first top-level `return`.
    ///
    /// Returns guarded by a brace-less `if`/`else` are parsed but not
    /// selected; returns inside nested blocks are skipped with the block.
    fn block_body(&mut self) -> Result<Option<Expr>, CompileError> {
        self.expect('{')?;
        self.expr_start = true;
        let mut returns = None;
        loop {
            self.cur.skip_trivia()?;
            match self.cur.peek() {
                None => return Err(self.cur.error("Unexpected token, expected \"}\"")),
                Some('}') => {
                    self.cur.bump();
                    break;
                }
                _ => {}
            }

            if self.cur.eat_keyword("return") {
                let value = self.return_value()?;
                if returns.is_none() {
                    returns = Some(value);
                }
            } else if self.cur.eat_keyword("if") {
                self.cur.skip_trivia()?;
                if self.cur.peek() == Some('(') {
                    self.skip_token()?;
                }
                self.guarded_return()?;
            } else if self.cur.eat_keyword("else") {
                self.guarded_return()?;
            } else {
                self.skip_token()?;
            }
        }
        self.expr_start = true;
        Ok(returns)
    }

    fn guarded_return(&mut self) -> Result<(), CompileError> {
        self.cur.skip_trivia()?;
        if self.cur.eat_keyword("return") {
            self.return_value()?;
        }
        self.expr_start = true;
        Ok(())
    }

    fn return_value(&mut self) -> Result<Expr, CompileError> {
        let newline = self.cur.skip_trivia()?;
        if newline || matches!(self.cur.peek(), None | Some(';' | '}')) {
            return Ok(Expr::Undefined);
        }
        self.value()
    }

    fn skip_type(&mut self, end: TypeEnd) -> Result<(), CompileError> {
        loop {
            self.cur.skip_trivia()?;
            let stop = match (end, self.cur.peek()) {
                (_, None) => true,
                (_, Some(';')) => true,
                (TypeEnd::Assign, Some('=')) => self.cur.peek_at(1) != Some('>'),
                (TypeEnd::Arrow, Some('{')) => true,
                (TypeEnd::Arrow, Some('=')) => self.cur.peek_at(1) == Some('>'),
                (TypeEnd::Block, Some('{')) => true,
                _ => false,
            };
            if stop {
                return Ok(());
            }
            self.expr_start = false;
            self.skip_token()?;
        }
    }

    // ── Expressions ─────────────────────────────────────────────

    /// Parse an expression. Forms the evaluator cannot interpret come back
    /// as [`Expr::Opaque`] holding their source text.
    fn value(&mut self) -> Result<Expr, CompileError> {
        self.nested(Self::expression)
    }

    fn expression(&mut self) -> Result<Expr, CompileError> {
        let start = self.cur.pos();
        self.expr_start = true;
        if let Some(expr) = self.primary()? {
            let end = self.cur.pos();
            let newline = self.cur.skip_trivia()?;
            let ends = match self.cur.peek() {
                None | Some(')' | ']' | '}' | ',' | ';') => true,
                Some(c) => newline && !continues_expression(c),
            };
            self.cur.reset(end);
            if ends {
                self.expr_start = false;
                return Ok(expr);
            }
        }

        self.cur.reset(start);
        self.skip_expression()?;
        Ok(Expr::Opaque(
            self.cur.slice(start, self.cur.pos()).trim().to_string(),
        ))
    }

    fn primary(&mut self) -> Result<Option<Expr>, CompileError> {
        let Some(c) = self.cur.peek() else {
            return Ok(None);
        };
        let expr = match c {
            '(' => {
                self.cur.bump();
                self.cur.skip_trivia()?;
                let inner = self.value()?;
                self.cur.skip_trivia()?;
                if !self.cur.eat(')') {
                    return Ok(None);
                }
                inner
            }
            '<' if self.at_jsx_start() => Expr::Jsx(Box::new(self.jsx_element()?)),
            '\'' | '"' => Expr::Str(self.cur.read_string()?),
            '`' => Expr::Template(self.template()?),
            '-' if self.cur.peek_at(1).is_some_and(|d| d.is_ascii_digit()) => {
                self.cur.bump();
                match self.cur.read_number() {
                    Some(n) => Expr::Num(-n),
                    None => return Ok(None),
                }
            }
            c if c.is_ascii_digit() => match self.cur.read_number() {
                Some(n) => Expr::Num(n),
                None => return Ok(None),
            },
            c if is_ident_start(c) => {
                let Some(ident) = self.cur.read_ident() else {
                    return Ok(None);
                };
                match ident.as_str() {
                    "true" => Expr::Bool(true),
                    "false" => Expr::Bool(false),
                    "null" => Expr::Null,
                    "undefined" => Expr::Undefined,
                    _ => {
                        if self.cur.peek() == Some('.')
                            && self.cur.peek_at(1).is_some_and(is_ident_start)
                        {
                            self.cur.bump();
                            let prop = self.cur.read_ident().unwrap_or_default();
                            Expr::Member(ident, prop)
                        } else {
                            Expr::Ident(ident)
                        }
                    }
                }
            }
            _ => return Ok(None),
        };
        Ok(Some(expr))
    }

    fn template(&mut self) -> Result<Vec<TemplatePart>, CompileError> {
        self.nested(Self::template_parts)
    }

    fn template_parts(&mut self) -> Result<Vec<TemplatePart>, CompileError> {
        let start = self.cur.pos();
        self.cur.bump();
        let mut parts = Vec::new();
        let mut lit = String::new();
        loop {
            match self.cur.bump() {
                None => return Err(self.cur.error_at(start, "Unterminated template.")),
                Some('`') => break,
                Some('\\') => match self.cur.bump() {
                    Some('n') => lit.push('\n'),
                    Some('t') => lit.push('\t'),
                    Some(c) => lit.push(c),
                    None => return Err(self.cur.error_at(start, "Unterminated template.")),
                },
                Some('$') if self.cur.peek() == Some('{') => {
                    self.cur.bump();
                    if !lit.is_empty() {
                        parts.push(TemplatePart::Lit(std::mem::take(&mut lit)));
                    }
                    self.cur.skip_trivia()?;
                    let expr = self.value()?;
                    self.cur.skip_trivia()?;
                    self.expect('}')?;
                    parts.push(TemplatePart::Expr(expr));
                }
                Some(c) => lit.push(c),
            }
        }
        if !lit.is_empty() {
            parts.push(TemplatePart::Lit(lit));
        }
        Ok(parts)
    }

    /// Skip one expression, stopping before a delimiter at depth zero.
    fn skip_expression(&mut self) -> Result<(), CompileError> {
        self.expr_start = true;
        let mut consumed = false;
        loop {
            let newline = self.cur.skip_trivia()?;
            match self.cur.peek() {
                None | Some(')' | ']' | '}' | ',' | ';') => return Ok(()),
                Some(c) if consumed && newline && !continues_expression(c) => return Ok(()),
                _ => {
                    self.skip_token()?;
                    consumed = true;
                }
            }
        }
    }

    /// Skip a single token. Bracketed groups count as one token; JSX met in
    /// expression position is parsed so that its errors surface.
    fn skip_token(&mut self) -> Result<(), CompileError> {
        let Some(c) = self.cur.peek() else {
            return Err(self.cur.error("Unexpected end of input"));
        };
        match c {
            '\'' | '"' => {
                self.cur.read_string()?;
                self.expr_start = false;
            }
            '`' => {
                self.template()?;
                self.expr_start = false;
            }
            '(' | '[' | '{' => {
                self.skip_group(c)?;
                self.expr_start = c == '{';
            }
            ')' | ']' | '}' => return Err(self.cur.error(format!("Unexpected token `{c}`"))),
            '<' if self.expr_start && self.at_jsx_start() => {
                self.jsx_element()?;
                self.expr_start = false;
            }
            c if c.is_ascii_digit() => {
                if self.cur.read_number().is_none() && self.cur.peek() == Some(c) {
                    self.cur.bump();
                }
                self.expr_start = false;
            }
            c if is_ident_start(c) => {
                let word = self.cur.read_ident().unwrap_or_default();
                self.expr_start = EXPR_KEYWORDS.contains(&word.as_str());
            }
            _ => {
                self.cur.bump();
                self.expr_start = true;
            }
        }
        Ok(())
    }

    fn skip_group(&mut self, open: char) -> Result<(), CompileError> {
        self.nested(|p| p.group(open))
    }

    fn group(&mut self, open: char) -> Result<(), CompileError> {
        let close = match open {
            '(' => ')',
            '[' => ']',
            _ => '}',
        };
        self.cur.bump();
        self.expr_start = true;
        loop {
            self.cur.skip_trivia()?;
            match self.cur.peek() {
                None => {
                    return Err(self
                        .cur
                        .error(format!("Unexpected token, expected \"{close}\"")))
                }
                Some(c) if c == close => {
                    self.cur.bump();
                    return Ok(());
                }
                _ => self.skip_token()?,
            }
        }
    }

    // ── JSX ─────────────────────────────────────────────────────

    fn at_jsx_start(&self) -> bool {
        self.cur.peek() == Some('<')
            && self
                .cur
                .peek_at(1)
                .is_some_and(|c| c == '>' || is_ident_start(c))
    }

    fn jsx_element(&mut self) -> Result<JsxNode, CompileError> {
        self.nested(Self::jsx_tag)
    }

    fn jsx_tag(&mut self) -> Result<JsxNode, CompileError> {
        self.cur.bump();
        self.cur.skip_trivia()?;
        if self.cur.eat('>') {
            return Ok(JsxNode::Fragment(self.jsx_children("")?));
        }

        let name = self
            .jsx_name()
            .ok_or_else(|| self.cur.error("Unexpected token"))?;
        let mut attributes = Vec::new();
        loop {
            self.cur.skip_trivia()?;
            match self.cur.peek() {
                None => return Err(self.cur.error(UNTERMINATED_JSX)),
                Some('/') => {
                    self.cur.bump();
                    self.cur.skip_trivia()?;
                    if self.cur.eof() {
                        return Err(self.cur.error(UNTERMINATED_JSX));
                    }
                    self.expect('>')?;
                    return Ok(JsxNode::Element(Element {
                        name,
                        attributes,
                        children: Vec::new(),
                    }));
                }
                Some('>') => {
                    self.cur.bump();
                    let children = self.jsx_children(&name)?;
                    return Ok(JsxNode::Element(Element {
                        name,
                        attributes,
                        children,
                    }));
                }
                Some('{') => {
                    self.cur.bump();
                    self.cur.skip_trivia()?;
                    if !self.cur.eat_str("...") {
                        return Err(self.cur.error("Unexpected token, expected \"...\""));
                    }
                    let from = self.cur.pos();
                    self.skip_expression()?;
                    let spread = self.cur.slice(from, self.cur.pos()).trim().to_string();
                    self.cur.skip_trivia()?;
                    self.expect('}')?;
                    attributes.push(Attribute::Spread(spread));
                }
                Some(_) => {
                    let attr = self
                        .jsx_name()
                        .ok_or_else(|| self.cur.error("Unexpected token"))?;
                    self.cur.skip_trivia()?;
                    let value = if self.cur.eat('=') {
                        self.cur.skip_trivia()?;
                        self.jsx_attr_value()?
                    } else {
                        Expr::Bool(true)
                    };
                    attributes.push(Attribute::Named { name: attr, value });
                }
            }
        }
    }

    fn jsx_attr_value(&mut self) -> Result<Expr, CompileError> {
        match self.cur.peek() {
            Some('\'' | '"') => Ok(Expr::Str(decode_entities(&self.cur.read_jsx_string()?))),
            Some('{') => {
                self.cur.bump();
                self.cur.skip_trivia()?;
                let value = self.value()?;
                self.cur.skip_trivia()?;
                self.expect('}')?;
                Ok(value)
            }
            Some('<') => Ok(Expr::Jsx(Box::new(self.jsx_element()?))),
            None => Err(self.cur.error(UNTERMINATED_JSX)),
            Some(_) => Err(self
                .cur
                .error("JSX value should be either an expression or a quoted JSX text.")),
        }
    }

    fn jsx_children(&mut self, name: &str) -> Result<Vec<JsxNode>, CompileError> {
        let mut children = Vec::new();
        loop {
            match self.cur.peek() {
                None => return Err(self.cur.error(UNTERMINATED_JSX)),
                Some('<') if self.cur.peek_at(1) == Some('/') => {
                    let close_at = self.cur.pos();
                    self.cur.bump();
                    self.cur.bump();
                    self.cur.skip_trivia()?;
                    let closing = self.jsx_name().unwrap_or_default();
                    self.cur.skip_trivia()?;
                    if self.cur.eof() {
                        return Err(self.cur.error(UNTERMINATED_JSX));
                    }
                    self.expect('>')?;
                    if closing != name {
                        let message = if name.is_empty() {
                            "Expected corresponding closing tag for JSX fragment.".to_string()
                        } else {
                            format!("Expected corresponding JSX closing tag for <{name}>.")
                        };
                        return Err(self.cur.error_at(close_at, message));
                    }
                    return Ok(children);
                }
                Some('<') => children.push(self.jsx_element()?),
                Some('{') => {
                    self.cur.bump();
                    self.cur.skip_trivia()?;
                    if self.cur.eat('}') {
                        continue;
                    }
                    let value = self.value()?;
                    self.cur.skip_trivia()?;
                    self.expect('}')?;
                    children.push(JsxNode::Expr(value));
                }
                Some(_) => {
                    let from = self.cur.pos();
                    while matches!(self.cur.peek(), Some(c) if c != '<' && c != '{') {
                        self.cur.bump();
                    }
                    let text = clean_jsx_text(&self.cur.slice(from, self.cur.pos()));
                    if !text.is_empty() {
                        children.push(JsxNode::Text(decode_entities(&text)));
                    }
                }
            }
        }
    }

    /// Tag or attribute name: identifiers joined by `-`, `:` or `.`.
    fn jsx_name(&mut self) -> Option<String> {
        if !self.cur.at_ident_start() {
            return None;
        }
        let start = self.cur.pos();
        while matches!(self.cur.peek(), Some(c) if is_ident_char(c) || matches!(c, '-' | ':' | '.'))
        {
            self.cur.bump();
        }
        Some(self.cur.slice(start, self.cur.pos()))
    }

    fn expect(&mut self, c: char) -> Result<(), CompileError> {
        if self.cur.eat(c) {
            Ok(())
        } else {
            Err(self.cur.error(format!("Unexpected token, expected \"{c}\"")))
        }
    }
}

fn continues_expression(c: char) -> bool {
    matches!(
        c,
        '.' | '?' | ':' | '&' | '|' | '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '(' | '['
    )
}

/// Collapse JSX text the way React's JSX transform does: lines are trimmed
/// where they meet a line break, blank lines vanish, and the remaining
/// lines are joined with single spaces.
pub(crate) fn clean_jsx_text(raw: &str) -> String {
    let lines: Vec<&str> = raw.split('\n').map(|l| l.trim_end_matches('\r')).collect();
    let last_non_empty = lines.iter().rposition(|l| !l.trim().is_empty());
    let mut out = String::new();
    for (i, line) in lines.iter().enumerate() {
        let mut text = line.replace('\t', " ");
        if i != 0 {
            text = text.trim_start().to_string();
        }
        if i != lines.len() - 1 {
            text = text.trim_end().to_string();
        }
        if !text.is_empty() {
            out.push_str(&text);
            if Some(i) != last_non_empty {
                out.push(' ');
            }
        }
    }
    out
}

/// Decode HTML character references in JSX text and attribute strings.
pub(crate) fn decode_entities(text: &str) -> String {
    if !text.contains('&') {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        let tail = &rest[amp..];
        let decoded = tail
            .find(';')
            .filter(|&semi| semi <= 10)
            .and_then(|semi| entity(&tail[1..semi]).map(|c| (c, semi)));
        match decoded {
            Some((c, semi)) => {
                out.push(c);
                rest = &tail[semi + 1..];
            }
            None => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn entity(name: &str) -> Option<char> {
    if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse().ok()?,
        };
        return char::from_u32(code);
    }
    let c = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "copy" => '©',
        "reg" => '®',
        "trade" => '™',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "middot" => '·',
        "bull" => '•',
        "times" => '×',
        "rarr" => '→',
        "larr" => '←',
        "laquo" => '«',
        "raquo" => '»',
        "euro" => '€',
        "deg" => '°',
        _ => return None,
    };
    Some(c)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn returns_of(source: &str, name: &str) -> Expr {
        let program = compile(source).unwrap();
        program
            .function(name)
            .and_then(|f| f.returns.clone())
            .unwrap()
    }

    fn el(name: &str, attributes: Vec<Attribute>, children: Vec<JsxNode>) -> JsxNode {
        JsxNode::Element(Element {
            name: name.into(),
            attributes,
            children,
        })
    }

    fn attr(name: &str, value: Expr) -> Attribute {
        Attribute::Named {
            name: name.into(),
            value,
        }
    }

    #[test]
    fn test_function_declaration() {
        let ret = returns_of(
            r#"function Card() {
                return (
                    <div className="p-4">
                        <h1>Hello</h1>
                    </div>
                );
            }"#,
            "Card",
        );
        assert_eq!(
            ret,
            Expr::Jsx(Box::new(el(
                "div",
                vec![attr("className", Expr::Str("p-4".into()))],
                vec![el("h1", vec![], vec![JsxNode::Text("Hello".into())])],
            )))
        );
    }

    #[test]
    fn test_arrow_with_destructured_props() {
        let program = compile(
            "const Badge = ({ label, tone = 'gray', size: s }: BadgeProps) => <span>{label}</span>;",
        )
        .unwrap();
        let badge = program.function("Badge").unwrap();
        assert_eq!(
            badge.params,
            Params::Destructured(vec![
                ParamBinding {
                    prop: "label".into(),
                    local: "label".into(),
                    default: None,
                },
                ParamBinding {
                    prop: "tone".into(),
                    local: "tone".into(),
                    default: Some(Expr::Str("gray".into())),
                },
                ParamBinding {
                    prop: "size".into(),
                    local: "s".into(),
                    default: None,
                },
            ])
        );
        assert_eq!(
            badge.returns,
            Some(Expr::Jsx(Box::new(el(
                "span",
                vec![],
                vec![JsxNode::Expr(Expr::Ident("label".into()))],
            ))))
        );
    }

    #[test]
    fn test_arrow_block_body_and_props_object() {
        let program = compile(
            "export const Row: React.FC<Props> = (props) => {\n  const x = 1;\n  return <p>{props.text}</p>;\n};",
        )
        .unwrap();
        let row = program.function("Row").unwrap();
        assert_eq!(row.params, Params::Object("props".into()));
        assert_eq!(
            row.returns,
            Some(Expr::Jsx(Box::new(el(
                "p",
                vec![],
                vec![JsxNode::Expr(Expr::Member("props".into(), "text".into()))],
            ))))
        );
    }

    #[test]
    fn test_first_top_level_return_wins() {
        let ret = returns_of(
            r#"function Panel({ items }) {
                if (!items) return null;
                const rows = items.map((i) => { return <li>{i}</li>; });
                if (items.length === 0) {
                    return <p>empty</p>;
                }
                return <ul />;
            }"#,
            "Panel",
        );
        assert_eq!(ret, Expr::Jsx(Box::new(el("ul", vec![], vec![]))));
    }

    #[test]
    fn test_opaque_expressions_keep_source() {
        let ret = returns_of(
            "function List({ items }) { return <ul>{items.map((i) => <li key={i}>{i}</li>)}</ul>; }",
            "List",
        );
        let Expr::Jsx(node) = ret else {
            panic!("expected jsx");
        };
        let JsxNode::Element(ul) = *node else {
            panic!("expected element");
        };
        assert_eq!(
            ul.children,
            vec![JsxNode::Expr(Expr::Opaque(
                "items.map((i) => <li key={i}>{i}</li>)".into()
            ))]
        );
    }

    #[test]
    fn test_attribute_forms() {
        let ret = returns_of(
            r#"function F(p) { return <input disabled type='text' value={`a ${p.v} b`} {...p} onChange={() => go(1)} />; }"#,
            "F",
        );
        assert_eq!(
            ret,
            Expr::Jsx(Box::new(el(
                "input",
                vec![
                    attr("disabled", Expr::Bool(true)),
                    attr("type", Expr::Str("text".into())),
                    attr(
                        "value",
                        Expr::Template(vec![
                            TemplatePart::Lit("a ".into()),
                            TemplatePart::Expr(Expr::Member("p".into(), "v".into())),
                            TemplatePart::Lit(" b".into()),
                        ])
                    ),
                    Attribute::Spread("p".into()),
                    attr("onChange", Expr::Opaque("() => go(1)".into())),
                ],
                vec![],
            )))
        );
    }

    #[test]
    fn test_fragment_and_comment_children() {
        let ret = returns_of(
            "function G() { return (<>\n  {/* header */}\n  <b>x</b> &amp; y\n</>); }",
            "G",
        );
        assert_eq!(
            ret,
            Expr::Jsx(Box::new(JsxNode::Fragment(vec![
                el("b", vec![], vec![JsxNode::Text("x".into())]),
                JsxNode::Text(" & y".into()),
            ])))
        );
    }

    #[test]
    fn test_unterminated_jsx() {
        let err = compile("function Foo(){ return <div").unwrap_err();
        assert_eq!(err.message, UNTERMINATED_JSX);
        assert_eq!(err.line, 1);
    }

    #[test]
    fn test_nesting_is_bounded() {
        let deep = "<div>".repeat(5000) + &"</div>".repeat(5000);
        let err = compile(&format!("function Foo() {{ return {deep} }}")).unwrap_err();
        assert_eq!(err.message, NESTING_EXCEEDED);

        let parens = "(".repeat(5000) + "1" + &")".repeat(5000);
        let err = compile(&format!("function Foo() {{ const x = {parens}; return null }}"))
            .unwrap_err();
        assert_eq!(err.message, NESTING_EXCEEDED);

        let fits = "<div>".repeat(100) + &"</div>".repeat(100);
        assert!(compile(&format!("function Foo() {{ return {fits} }}")).is_ok());
    }

    #[test]
    fn test_mismatched_closing_tag() {
        let err = compile("function Foo() {\n  return <div><span></div>;\n}").unwrap_err();
        assert_eq!(
            err.message,
            "Expected corresponding JSX closing tag for <span>."
        );
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_errors_in_unreturned_jsx_still_fail() {
        let err = compile("function Foo() { const x = <p>; return null; }").unwrap_err();
        assert_eq!(err.message, UNTERMINATED_JSX);
    }

    #[test]
    fn test_comparisons_and_generics_are_not_jsx() {
        let program = compile(
            "function Count() { const [n, setN] = useState<number>(0); for (let i = 0; i < n; i++) {} return <em>{n}</em>; }",
        )
        .unwrap();
        assert!(program.function("Count").unwrap().returns.is_some());
    }

    #[test]
    fn test_return_followed_by_newline_is_undefined() {
        let ret = returns_of("function H() {\n  return\n  <div/>;\n}", "H");
        assert_eq!(ret, Expr::Undefined);
    }

    #[test]
    fn test_skips_types_and_unrelated_statements() {
        let program = compile(
            r#"interface Props { title: string }
            type Size = 'sm' | 'lg';
            const TOKENS = { gap: 4 };
            export default function Hero({ title }: Props): JSX.Element {
                return <h1>{title}</h1>;
            }"#,
        )
        .unwrap();
        let names: Vec<_> = program.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["Hero"]);
    }

    #[test]
    fn test_clean_jsx_text() {
        assert_eq!(clean_jsx_text("\n    Hello\n    world\n  "), "Hello world");
        assert_eq!(clean_jsx_text("  a b  "), "  a b  ");
        assert_eq!(clean_jsx_text("\n   \n"), "");
        assert_eq!(clean_jsx_text("x\n  "), "x");
    }

    #[test]
    fn test_decode_entities() {
        assert_eq!(decode_entities("a &lt;b&gt; &#169; &#x41; &bogus; &"), "a <b> © A &bogus; &");
    }
}
