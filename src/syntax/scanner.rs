//! Template tokenizer.
//!
//! Scans raw template text for `${name}` and `${name:{...}}` spans. Scanning
//! comes in two modes: [`scan_tokens`] treats syntax errors as fatal (used by
//! the filler), [`extract_tokens`] is best effort and silently skips
//! malformed spans (used by "does this string contain tokens" checks).

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::{template_source, to_span, TemplateError};
use crate::syntax::object;

/// One placeholder found in a template.
///
/// Invariants: `start < end`, `raw == template[start..end]`, `format_text`
/// is `None` iff the placeholder has no format clause. Scan output is
/// ordered by `start` and non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScannedToken {
    pub start: usize,
    pub end: usize,
    pub name: String,
    pub format_text: Option<String>,
    pub raw: String,
}

// Anchored head: `${`, optional whitespace, a name, optional whitespace, and
// an optional colon announcing a format clause.
static TOKEN_HEAD: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\$\{\s*([A-Za-z0-9_]*)\s*(:\s*)?").expect("head pattern is valid"));

/// Scans a template, failing on the first malformed placeholder.
pub fn scan_tokens(template: &str) -> Result<Vec<ScannedToken>, TemplateError> {
    scan_impl(template, true)
}

/// Scans a template, skipping malformed placeholders.
pub fn extract_tokens(template: &str) -> Vec<ScannedToken> {
    scan_impl(template, false).expect("non-throwing scan cannot fail")
}

fn scan_impl(template: &str, throw_on_error: bool) -> Result<Vec<ScannedToken>, TemplateError> {
    let mut tokens = Vec::new();
    let mut search_from = 0;

    while let Some(found) = template[search_from..].find("${") {
        let start = search_from + found;
        match parse_token_at(template, start) {
            Ok(token) => {
                // Resume after the token so `${` inside a format string can
                // never produce an overlapping second token.
                search_from = token.end;
                tokens.push(token);
            }
            Err(error) => {
                if throw_on_error {
                    return Err(error);
                }
                search_from = start + 2;
            }
        }
    }

    Ok(tokens)
}

fn parse_token_at(template: &str, start: usize) -> Result<ScannedToken, TemplateError> {
    let Some(caps) = TOKEN_HEAD.captures(&template[start..]) else {
        return Err(TemplateError::InvalidTokenStart {
            src: template_source(template),
            span: to_span(start, start + 2),
        });
    };
    let name = caps.get(1).map_or("", |m| m.as_str());
    let has_colon = caps.get(2).is_some();
    let head_end = start + caps.get(0).map_or(0, |m| m.end());

    if name.is_empty() {
        let next = template[head_end..].chars().next();
        return Err(if has_colon || next == Some('}') {
            TemplateError::EmptyTokenName {
                src: template_source(template),
                span: to_span(start, head_end),
            }
        } else {
            TemplateError::InvalidTokenStart {
                src: template_source(template),
                span: to_span(start, start + 2),
            }
        });
    }

    // No format clause: the next non-whitespace character must close the token.
    if !has_colon {
        let close = skip_whitespace(template, head_end);
        if !template[close..].starts_with('}') {
            return Err(missing_closing_brace(name, template, start, head_end));
        }
        let end = close + 1;
        return Ok(ScannedToken {
            start,
            end,
            name: name.to_string(),
            format_text: None,
            raw: template[start..end].to_string(),
        });
    }

    // Format clause: a single object literal, then the closing brace.
    let object_start = head_end;
    if !template[object_start..].starts_with('{') {
        return Err(TemplateError::FormatNotObject {
            token: name.to_string(),
            src: template_source(template),
            span: to_span(start, object_start.max(start + 2)),
        });
    }

    let object_len = object::object_end(&template[object_start..]).map_err(|e| {
        TemplateError::InvalidFormatObject {
            token: name.to_string(),
            message: e.message,
            src: template_source(template),
            span: to_span(object_start + e.offset, object_start + e.offset + 1),
        }
    })?;
    let object_end = object_start + object_len;

    let close = skip_whitespace(template, object_end);
    if !template[close..].starts_with('}') {
        return Err(missing_closing_brace(name, template, start, object_end));
    }
    let end = close + 1;
    Ok(ScannedToken {
        start,
        end,
        name: name.to_string(),
        format_text: Some(template[object_start..object_end].to_string()),
        raw: template[start..end].to_string(),
    })
}

fn missing_closing_brace(
    name: &str,
    template: &str,
    start: usize,
    span_end: usize,
) -> TemplateError {
    TemplateError::MissingClosingBrace {
        token: name.to_string(),
        src: template_source(template),
        span: to_span(start, span_end),
    }
}

fn skip_whitespace(s: &str, from: usize) -> usize {
    s[from..]
        .char_indices()
        .find(|(_, c)| !c.is_whitespace())
        .map_or(s.len(), |(i, _)| from + i)
}
