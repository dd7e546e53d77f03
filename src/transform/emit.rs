use crate::error::{Result, SfcJsError};

/// Registry expression used when none is configured.
pub const DEFAULT_REGISTRY: &str = "window.VueComponents";

/// Escape markup for embedding in a backtick string literal.
///
/// Only backticks are escaped. Backslashes and `${` are embedded as-is.
pub fn escape_backticks(markup: &str) -> String {
    markup.replace('`', "\\`")
}

/// Reject names that would break out of the single-quoted registry key.
pub fn validate_component_name(name: &str) -> Result<()> {
    let breaks_literal = |c: char| matches!(c, '\'' | '\\' | '\n' | '\r' | '\u{2028}' | '\u{2029}');

    if name.is_empty() || name.chars().any(breaks_literal) {
        return Err(SfcJsError::InvalidComponentName {
            name: name.to_string(),
        });
    }

    Ok(())
}

/// Byte offset of a `//` comment on `line`, ignoring `//` inside string
/// literals.
fn line_comment_start(line: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut prev_slash = false;

    for (i, c) in line.char_indices() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if c == '\\' {
                escaped = true;
            } else if c == q {
                quote = None;
            }
            continue;
        }

        match c {
            '\'' | '"' | '`' => {
                quote = Some(c);
                prev_slash = false;
            }
            '/' if prev_slash => return Some(i - 1),
            '/' => prev_slash = true,
            _ => prev_slash = false,
        }
    }

    None
}

/// Last character of actual code in `body`, skipping trailing line comments.
fn last_code_char(body: &str) -> Option<char> {
    body.lines().rev().find_map(|line| {
        let code = match line_comment_start(line) {
            Some(idx) => &line[..idx],
            None => line,
        };
        code.trim_end().chars().last()
    })
}

/// Object literal with its closing brace removed, ready for one more
/// property.
#[derive(Debug)]
struct ReopenedLiteral<'a> {
    body: &'a str,
    /// `,` unless the body ends in `{` or a trailing comma.
    separator: &'static str,
    /// The last line ends in a `//` comment, so the separator must start on
    /// a new line.
    ends_in_comment: bool,
}

fn reopen_object_literal(literal: &str) -> Result<ReopenedLiteral<'_>> {
    let body = literal
        .trim_end()
        .strip_suffix('}')
        .ok_or(SfcJsError::MalformedScript)?
        .trim_end();

    if !body.starts_with('{') {
        return Err(SfcJsError::MalformedScript);
    }

    let separator = match last_code_char(body) {
        Some('{') | Some(',') => "",
        _ => ",",
    };
    let ends_in_comment = body
        .lines()
        .last()
        .is_some_and(|line| line_comment_start(line).is_some());

    Ok(ReopenedLiteral {
        body,
        separator,
        ends_in_comment,
    })
}

/// Generates the registry initialization and assignment statements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistryEmitter {
    registry: String,
}

impl RegistryEmitter {
    pub fn new<S: Into<String>>(registry: S) -> Self {
        Self {
            registry: registry.into(),
        }
    }

    pub fn registry(&self) -> &str {
        &self.registry
    }

    pub fn init_statement(&self) -> String {
        format!("{0} = {0} || {{}};", self.registry)
    }

    pub fn emit(&self, name: &str, object_literal: &str, template: &str) -> Result<String> {
        validate_component_name(name)?;
        let literal = reopen_object_literal(object_literal)?;
        let template = escape_backticks(template);

        let mut dest = String::with_capacity(
            self.registry.len() * 3 + name.len() + literal.body.len() + template.len() + 48,
        );
        dest.push_str(&self.init_statement());
        dest.push('\n');
        dest.push_str(&format!("{}['{}'] = ", self.registry, name));
        dest.push_str(literal.body);
        if literal.ends_in_comment {
            dest.push('\n');
        }
        dest.push_str(literal.separator);
        dest.push_str("\ntemplate: `");
        dest.push_str(&template);
        dest.push_str("`\n};");

        Ok(dest)
    }
}

impl Default for RegistryEmitter {
    fn default() -> Self {
        Self::new(DEFAULT_REGISTRY)
    }
}
