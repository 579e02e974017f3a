// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Response interpretation.
//!
//! A [`ResponseInterpreter`] turns the raw response line of a state query
//! into the text the switch compares against `"True"`. The switch does not
//! care how the text is produced; three strategies ship with the crate:
//!
//! - [`Identity`]: the raw response as-is
//! - [`ValueTemplate`]: a small `{{ value }}` / `{{ value_json.path }}` template
//! - any `Fn(&str) -> String` closure
//!
//! # Examples
//!
//! ```
//! use telnet_switch::interpreter::{ResponseInterpreter, ValueTemplate};
//!
//! let template = ValueTemplate::parse("{{ value_json.relay.on }}").unwrap();
//! assert_eq!(template.evaluate(r#"{"relay": {"on": true}}"#), "True");
//! assert_eq!(template.evaluate(r#"{"relay": {"on": false}}"#), "False");
//! ```

use std::fmt;

use serde_json::Value;

use crate::error::ConfigError;

/// Renders a raw response into the text compared against `"True"`.
pub trait ResponseInterpreter: Send + Sync {
    /// Renders the raw response.
    fn evaluate(&self, raw: &str) -> String;
}

impl<F> ResponseInterpreter for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn evaluate(&self, raw: &str) -> String {
        self(raw)
    }
}

/// Passes the raw response through unchanged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Identity;

impl ResponseInterpreter for Identity {
    fn evaluate(&self, raw: &str) -> String {
        raw.to_string()
    }
}

// ============================================================================
// ValueTemplate
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Value,
    ValueJson(Vec<PathStep>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum PathStep {
    Key(String),
    Index(usize),
}

/// Attribute access on an undefined value.
#[derive(Debug)]
struct UndefinedAccess;

/// A minimal value template.
///
/// Supports literal text plus `{{ value }}` (the raw response) and
/// `{{ value_json }}` placeholders. `value_json` is the response parsed
/// as JSON and accepts `.key`, `[index]` and `['key']` steps.
///
/// JSON scalars render as `True`/`False` for booleans, `None` for null,
/// strings without quotes and numbers as written. Arrays and objects render
/// as `[True, None]` and `{'key': 'text'}`. The rendered text is trimmed of
/// surrounding whitespace. A missing key renders
/// as empty text. Stepping into something that is not defined at all (for
/// example when the response is not JSON) fails the render, and the raw
/// response is returned instead.
#[derive(Clone, PartialEq, Eq)]
pub struct ValueTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl ValueTemplate {
    /// Parses a template.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidTemplate` for unterminated or empty
    /// placeholders, unknown variables, or malformed paths.
    pub fn parse(source: &str) -> Result<Self, ConfigError> {
        let mut segments = Vec::new();
        let mut rest = source;

        while let Some(start) = rest.find("{{") {
            if start > 0 {
                segments.push(Segment::Literal(rest[..start].to_string()));
            }

            let after_open = &rest[start + 2..];
            let end = after_open.find("}}").ok_or_else(|| {
                ConfigError::InvalidTemplate(format!("unterminated placeholder in {source:?}"))
            })?;

            segments.push(parse_expression(after_open[..end].trim())?);
            rest = &after_open[end + 2..];
        }

        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self {
            source: source.to_string(),
            segments,
        })
    }

    /// Returns the template source text.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    fn render(&self, raw: &str) -> Result<String, UndefinedAccess> {
        let json = serde_json::from_str::<Value>(raw).ok();
        let mut out = String::new();

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Value => out.push_str(raw),
                Segment::ValueJson(path) => {
                    if let Some(value) = lookup(json.as_ref(), path)? {
                        out.push_str(&render_json(value));
                    }
                }
            }
        }

        Ok(out.trim().to_string())
    }
}

impl ResponseInterpreter for ValueTemplate {
    fn evaluate(&self, raw: &str) -> String {
        match self.render(raw) {
            Ok(rendered) => rendered,
            Err(UndefinedAccess) => {
                tracing::error!(
                    template = %self.source,
                    response = raw,
                    "Error rendering template, using raw response"
                );
                raw.to_string()
            }
        }
    }
}

impl fmt::Debug for ValueTemplate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ValueTemplate").field(&self.source).finish()
    }
}

fn parse_expression(expr: &str) -> Result<Segment, ConfigError> {
    if expr.is_empty() {
        return Err(ConfigError::InvalidTemplate("empty placeholder".to_string()));
    }
    if expr == "value" {
        return Ok(Segment::Value);
    }

    let Some(mut rest) = expr.strip_prefix("value_json") else {
        return Err(ConfigError::InvalidTemplate(format!(
            "unknown variable in {{{{ {expr} }}}}"
        )));
    };

    let invalid = || ConfigError::InvalidTemplate(format!("malformed path in {{{{ {expr} }}}}"));
    let mut path = Vec::new();

    while !rest.is_empty() {
        if let Some(after_dot) = rest.strip_prefix('.') {
            let len = after_dot
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .unwrap_or(after_dot.len());
            if len == 0 {
                return Err(invalid());
            }
            path.push(PathStep::Key(after_dot[..len].to_string()));
            rest = &after_dot[len..];
        } else if let Some(after_bracket) = rest.strip_prefix('[') {
            let close = after_bracket.find(']').ok_or_else(invalid)?;
            let inner = after_bracket[..close].trim();
            let step = if let Some(quoted) = strip_quotes(inner) {
                PathStep::Key(quoted.to_string())
            } else {
                PathStep::Index(inner.parse().map_err(|_| invalid())?)
            };
            path.push(step);
            rest = &after_bracket[close + 1..];
        } else {
            return Err(invalid());
        }
    }

    Ok(Segment::ValueJson(path))
}

fn strip_quotes(s: &str) -> Option<&str> {
    s.strip_prefix('\'')
        .and_then(|s| s.strip_suffix('\''))
        .or_else(|| s.strip_prefix('"').and_then(|s| s.strip_suffix('"')))
}

/// Walks `path` from `root`. `Ok(None)` is a missing key; `Err` is a step
/// taken from an already undefined value.
fn lookup<'a>(
    root: Option<&'a Value>,
    path: &[PathStep],
) -> Result<Option<&'a Value>, UndefinedAccess> {
    let mut current = root;

    for step in path {
        let value = current.ok_or(UndefinedAccess)?;
        current = match step {
            PathStep::Key(key) => value.get(key.as_str()),
            PathStep::Index(index) => value.get(*index),
        };
    }

    Ok(current)
}

fn render_json(value: &Value) -> String {
    match value {
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::Null => "None".to_string(),
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Array(_) | Value::Object(_) => {
            let mut out = String::new();
            write_repr(value, &mut out);
            out
        }
    }
}

/// Writes a container the way the template host prints it:
/// `[True, None]`, `{'a': 1}`.
fn write_repr(value: &Value, out: &mut String) {
    match value {
        Value::String(s) => {
            let quote = if s.contains('\'') && !s.contains('"') { '"' } else { '\'' };
            out.push(quote);
            for c in s.chars() {
                match c {
                    '\n' => out.push_str("\\n"),
                    '\r' => out.push_str("\\r"),
                    '\t' => out.push_str("\\t"),
                    '\\' => out.push_str("\\\\"),
                    c if c == quote => {
                        out.push('\\');
                        out.push(c);
                    }
                    c => out.push(c),
                }
            }
            out.push(quote);
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(item, out);
            }
            out.push(']');
        }
        Value::Object(map) => {
            out.push('{');
            for (i, (key, item)) in map.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                write_repr(&Value::String(key.clone()), out);
                out.push_str(": ");
                write_repr(item, out);
            }
            out.push('}');
        }
        scalar => out.push_str(&render_json(scalar)),
    }
}
