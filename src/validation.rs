//! Dry-run validation of templates, file names and paths.
//!
//! Every entry point returns an empty string on success and a human-readable
//! complaint on failure; only this module turns [`TemplateError`] values into
//! messages. Token checks run against a synthetic context (dummy note and
//! attachment identity), so they exercise schemas and evaluators without any
//! real file or user interaction.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::TemplateError;
use crate::runtime::context::FillOptions;
use crate::runtime::filler::TemplateEngine;
use crate::syntax::scanner::{extract_tokens, scan_tokens};

/// How a file-name validator treats placeholders in its input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenValidationMode {
    /// Any placeholder is an error.
    Error,
    /// Placeholders pass through unexamined.
    Skip,
    /// Placeholders are dry-run against the engine.
    Validate,
}

#[derive(Debug, Clone)]
pub struct FileNameValidationOptions {
    pub file_name: String,
    pub is_empty_allowed: bool,
    pub are_single_dots_allowed: bool,
    pub mode: TokenValidationMode,
}

#[derive(Debug, Clone)]
pub struct PathValidationOptions {
    pub path: String,
    pub are_tokens_allowed: bool,
}

// Characters rejected by at least one mainstream filesystem.
static OS_UNSAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[\x00-\x1f\\/:*?"<>|]"#).expect("pattern is valid"));
static CONSECUTIVE_DOTS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\.{3,}").expect("pattern is valid"));
static TRAILING_DOTS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.+$").expect("pattern is valid"));

/// Replaces each placeholder with a `__name__` stand-in so the remaining
/// literal text can be checked as a file name. Fails on malformed syntax.
pub fn remove_tokens(text: &str) -> Result<String, TemplateError> {
    let tokens = scan_tokens(text)?;
    let mut out = String::with_capacity(text.len());
    let mut consumed = 0;
    for token in tokens {
        out.push_str(&text[consumed..token.start]);
        out.push_str("__");
        out.push_str(&token.name);
        out.push_str("__");
        consumed = token.end;
    }
    out.push_str(&text[consumed..]);
    Ok(out)
}

/// Dry-runs every placeholder of `candidate` against the engine. An empty
/// string means all tokens are known, their formats parse and their schemas
/// and evaluators accept a synthetic context.
pub async fn validate_tokens(engine: &TemplateEngine, candidate: &str) -> String {
    let tokens = match scan_tokens(candidate) {
        Ok(tokens) => tokens,
        Err(e) => return format!("Invalid token syntax: {}", e),
    };

    for token in tokens {
        if !engine.is_registered(&token.name) {
            return format!("Unknown token '{}'.", token.name);
        }

        if let Some(format_text) = &token.format_text {
            if let Err(e) = crate::syntax::object::parse_format_object(format_text) {
                return format!("Invalid format for token '{}': {}", token.name, e.message);
            }
        }

        if let Err(e) = engine.fill(&token.raw, FillOptions::synthetic()).await {
            return format!("Invalid token '{}': {}", token.raw, e);
        }
    }

    String::new()
}

/// Validates a configured file name, token policy included.
pub async fn validate_file_name(
    engine: &TemplateEngine,
    options: &FileNameValidationOptions,
) -> String {
    match options.mode {
        TokenValidationMode::Error => {
            if !extract_tokens(&options.file_name).is_empty() {
                return "Tokens are not allowed in file name".to_string();
            }
        }
        TokenValidationMode::Skip => {}
        TokenValidationMode::Validate => {
            let message = validate_tokens(engine, &options.file_name).await;
            if !message.is_empty() {
                return message;
            }
        }
    }

    let clean = match remove_tokens(&options.file_name) {
        Ok(clean) => clean,
        Err(_) => {
            return format!(
                "Invalid token syntax in file name \"{}\"",
                options.file_name
            )
        }
    };

    check_clean_file_name(
        &clean,
        &options.file_name,
        options.is_empty_allowed,
        options.are_single_dots_allowed,
    )
}

/// Validates a configured `/`-separated path: token policy first, then each
/// segment as a file name with dots and empty segments allowed.
pub async fn validate_path(engine: &TemplateEngine, options: &PathValidationOptions) -> String {
    if options.are_tokens_allowed {
        let message = validate_tokens(engine, &options.path).await;
        if !message.is_empty() {
            return message;
        }
    } else if !extract_tokens(&options.path).is_empty() {
        return "Tokens are not allowed in path".to_string();
    }

    validate_segments(&options.path)
}

/// Validates a prompt answer: no placeholders at all, then the usual path
/// segment checks. Synchronous so hosts can run it on every keystroke.
pub fn validate_prompt_value(value: &str) -> String {
    if !extract_tokens(value).is_empty() {
        return "Tokens are not allowed in path".to_string();
    }
    validate_segments(value)
}

fn validate_segments(path: &str) -> String {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return String::new();
    }

    for segment in trimmed.split('/') {
        let clean = match remove_tokens(segment) {
            Ok(clean) => clean,
            Err(_) => return format!("Invalid token syntax in file name \"{}\"", segment),
        };
        let message = check_clean_file_name(&clean, segment, true, true);
        if !message.is_empty() {
            return message;
        }
    }

    String::new()
}

/// The token-free file-name checks, in precedence order.
fn check_clean_file_name(
    clean: &str,
    original: &str,
    is_empty_allowed: bool,
    are_single_dots_allowed: bool,
) -> String {
    if clean == "." || clean == ".." {
        return if are_single_dots_allowed {
            String::new()
        } else {
            "Single dots are not allowed in file name".to_string()
        };
    }

    if clean.is_empty() {
        return if is_empty_allowed {
            String::new()
        } else {
            "File name is empty".to_string()
        };
    }

    if OS_UNSAFE.is_match(clean) {
        return format!("File name \"{}\" contains invalid symbols", original);
    }

    if CONSECUTIVE_DOTS.is_match(clean) {
        return format!("File name \"{}\" contains more than two dots", original);
    }

    if TRAILING_DOTS.is_match(clean) {
        return format!("File name \"{}\" contains trailing dots", original);
    }

    String::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stand_ins_replace_tokens() {
        let clean = remove_tokens("a-${noteFileName}-b").unwrap();
        assert_eq!(clean, "a-__noteFileName__-b");
    }

    #[test]
    fn stand_ins_fail_on_bad_syntax() {
        assert!(remove_tokens("${noteFileName").is_err());
    }

    #[test]
    fn clean_name_checks() {
        assert_eq!(check_clean_file_name("note", "note", false, false), "");
        assert_eq!(
            check_clean_file_name("", "", false, false),
            "File name is empty"
        );
        assert_eq!(check_clean_file_name("", "", true, false), "");
        assert_eq!(
            check_clean_file_name(".", ".", false, false),
            "Single dots are not allowed in file name"
        );
        assert_eq!(check_clean_file_name("..", "..", false, true), "");
        assert!(
            check_clean_file_name("a:b", "a:b", false, false).contains("invalid symbols")
        );
        assert!(
            check_clean_file_name("...", "...", false, false)
                .contains("more than two dots")
        );
        assert!(
            check_clean_file_name("a...b", "a...b", false, false)
                .contains("more than two dots")
        );
        assert!(
            check_clean_file_name("name.", "name.", false, false)
                .contains("trailing dots")
        );
    }

    #[test]
    fn prompt_values_reject_tokens() {
        assert_eq!(
            validate_prompt_value("${uuid}"),
            "Tokens are not allowed in path"
        );
        assert_eq!(validate_prompt_value("notes/picture"), "");
        assert!(validate_prompt_value("bad|name").contains("invalid symbols"));
    }
}
