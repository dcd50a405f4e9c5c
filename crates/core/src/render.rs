//! Placeholder substitution for notification templates.
//!
//! Templates carry named tokens in braces (`"Due in {days} days"`). Rendering
//! is a single left-to-right scan: each token present in the variable map is
//! replaced with its value, and the value is never re-scanned for further
//! tokens. Tokens missing from the map are left verbatim in the output so a
//! template/payload mismatch is visible rather than silently dropped.

use std::collections::HashMap;

/// Variables resolved against a template's `{token}` placeholders.
pub type VarMap = HashMap<String, String>;

/// Render `template` against `vars`.
///
/// - Matching is case-sensitive (`{Days}` does not resolve `days`).
/// - Substitution is not recursive: brace tokens inside a substituted value
///   are emitted as-is.
/// - A `{` without a closing `}` is emitted literally.
pub fn render(template: &str, vars: &VarMap) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after_open = &rest[open + 1..];

        match after_open.find('}') {
            Some(close) => {
                let token = &after_open[..close];
                match vars.get(token) {
                    Some(value) => out.push_str(value),
                    None => {
                        // Unknown token: keep the literal placeholder.
                        out.push('{');
                        out.push_str(token);
                        out.push('}');
                    }
                }
                rest = &after_open[close + 1..];
            }
            None => {
                // Unterminated brace: emit the remainder untouched.
                out.push_str(&rest[open..]);
                return out;
            }
        }
    }

    out.push_str(rest);
    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
