//! Message templates for cataloged errors.
//!
//! A template references variables as `%name%`. `%%` renders a literal `%`,
//! and a `%` that does not open a well-formed `%name%` is kept as-is, so
//! "100% done" needs no escaping.

use crate::error::{Error, Result};
use std::collections::BTreeMap;

/// Variable values for [`render_template`], keyed by variable name.
pub type TemplateArgs = BTreeMap<String, String>;

fn is_var_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '_'
}

/// Whether `name` is a legal template variable name.
pub fn is_valid_variable_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_var_char)
}

/// Render `template`, substituting every `%name%` with `args[name]`.
///
/// Fails if an argument has an illegal name or the template references a
/// variable that `args` does not provide.
pub fn render_template(template: &str, args: &TemplateArgs) -> Result<String> {
    if let Some(bad) = args.keys().find(|k| !is_valid_variable_name(k)) {
        return Err(Error::template(
            template,
            format!("illegal variable name '{bad}'"),
        ));
    }

    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 1..];

        if let Some(tail) = after.strip_prefix('%') {
            out.push('%');
            rest = tail;
            continue;
        }

        let name_len = after
            .find(|c: char| !is_var_char(c))
            .unwrap_or(after.len());
        let closes = after[name_len..].starts_with('%');

        if name_len == 0 || !closes {
            out.push('%');
            rest = after;
            continue;
        }

        let name = &after[..name_len];
        let value = args.get(name).ok_or_else(|| {
            Error::template(template, format!("missing value for variable '{name}'"))
        })?;
        out.push_str(value);
        rest = &after[name_len + 1..];
    }

    out.push_str(rest);
    Ok(out)
}
