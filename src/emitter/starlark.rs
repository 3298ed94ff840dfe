//! Minimal Starlark rule writer.
//!
//! Rules are rendered with a fixed layout so that equal input always yields
//! equal text:
//!
//! ```text
//! java_import(
//!     name = "com_example__myapp__1_0",
//!     jars = ["@com_example__myapp__1_0//file"],
//!     deps = [
//!         ":com_example__a",
//!         ":com_example__b",
//!     ],
//! )
//! ```
//!
//! Attributes keep insertion order, empty lists are omitted and single
//! element lists stay on one line.

use std::fmt::Write;

/// An attribute value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Str(String),
    List(Vec<String>),
}

/// A rule invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    kind: &'static str,
    attributes: Vec<(&'static str, Value)>,
}

impl Rule {
    /// A rule of `kind` named `name`.
    pub fn new(kind: &'static str, name: impl Into<String>) -> Self {
        Self {
            kind,
            attributes: vec![("name", Value::Str(name.into()))],
        }
    }

    #[must_use]
    pub fn str(mut self, attribute: &'static str, value: impl Into<String>) -> Self {
        self.attributes.push((attribute, Value::Str(value.into())));
        self
    }

    #[must_use]
    pub fn list<I, S>(mut self, attribute: &'static str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let values: Vec<String> = values.into_iter().map(Into::into).collect();
        if !values.is_empty() {
            self.attributes.push((attribute, Value::List(values)));
        }
        self
    }

    /// The `name` attribute, if set.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        match self.attribute("name") {
            Some(Value::Str(name)) => Some(name),
            _ => None,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> &'static str {
        self.kind
    }

    /// Value of `attribute`, if set.
    #[must_use]
    pub fn attribute(&self, attribute: &str) -> Option<&Value> {
        self.attributes.iter().find(|(name, _)| *name == attribute).map(|(_, value)| value)
    }

    /// Render the rule with every line indented by `indent` spaces.
    #[must_use]
    pub fn render(&self, indent: usize) -> String {
        let pad = " ".repeat(indent);
        let inner = " ".repeat(indent + 4);
        let mut out = String::new();
        let _ = writeln!(out, "{pad}{}(", self.kind);
        for (name, value) in &self.attributes {
            match value {
                Value::Str(text) => {
                    let _ = writeln!(out, "{inner}{name} = {},", quote(text));
                }
                Value::List(items) if items.len() == 1 => {
                    let _ = writeln!(out, "{inner}{name} = [{}],", quote(&items[0]));
                }
                Value::List(items) => {
                    let _ = writeln!(out, "{inner}{name} = [");
                    for item in items {
                        let _ = writeln!(out, "{inner}    {},", quote(item));
                    }
                    let _ = writeln!(out, "{inner}],");
                }
            }
        }
        let _ = writeln!(out, "{pad})");
        out
    }
}

/// Double-quoted Starlark string literal.
#[must_use]
pub fn quote(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            _ => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Render `rules` as the body of a macro: indented, separated by blank lines,
/// `pass` when there are none.
#[must_use]
pub fn render_body(rules: &[Rule]) -> String {
    if rules.is_empty() {
        return "    pass\n".to_string();
    }
    rules.iter().map(|rule| rule.render(4)).collect::<Vec<_>>().join("\n")
}
