//! Shared string-projection transforms.
//!
//! Several tokens project a context string through the same optional
//! transforms, applied in a fixed order: trim, then slugify, then case
//! conversion.

use serde::Deserialize;
use unicode_segmentation::UnicodeSegmentation;

use crate::errors::TemplateError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseTransform {
    Lower,
    Upper,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrimSide {
    /// Keep the first `length` graphemes.
    Left,
    /// Keep the last `length` graphemes.
    Right,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrimFormat {
    pub side: TrimSide,
    pub length: usize,
}

/// The common `case` / `slugify` / `trim` format keys. Tokens that take
/// additional keys repeat these fields in their own schema and convert via
/// their accessor, because `deny_unknown_fields` does not compose with
/// `#[serde(flatten)]`.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct StringFormat {
    #[serde(default)]
    pub case: Option<CaseTransform>,
    #[serde(default)]
    pub slugify: Option<bool>,
    #[serde(default)]
    pub trim: Option<TrimFormat>,
}

impl StringFormat {
    pub fn apply(&self, token: &str, value: &str) -> Result<String, TemplateError> {
        let mut value = match self.trim {
            Some(trim) => {
                if trim.length == 0 {
                    return Err(TemplateError::InvalidFormat {
                        token: token.to_string(),
                        message: "trim length must be positive".to_string(),
                    });
                }
                apply_trim(value, trim)
            }
            None => value.to_string(),
        };

        if self.slugify.unwrap_or(false) {
            value = slugify(&value);
        }

        Ok(match self.case {
            Some(CaseTransform::Lower) => value.to_lowercase(),
            Some(CaseTransform::Upper) => value.to_uppercase(),
            None => value,
        })
    }
}

fn apply_trim(value: &str, trim: TrimFormat) -> String {
    let graphemes: Vec<&str> = value.graphemes(true).collect();
    match trim.side {
        TrimSide::Left => graphemes.iter().take(trim.length).copied().collect(),
        TrimSide::Right => {
            if trim.length >= graphemes.len() {
                value.to_string()
            } else {
                graphemes[graphemes.len() - trim.length..].concat()
            }
        }
    }
}

/// Replaces separator runs with single dashes and drops everything that is
/// neither alphanumeric nor a separator. Case is preserved; a later `case`
/// transform may still change it.
pub fn slugify(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut pending_dash = false;
    for c in value.chars() {
        if c.is_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else if c.is_whitespace() || c == '-' || c == '_' || c == '.' || c == '/' {
            pending_dash = true;
        }
        // other punctuation is dropped without acting as a separator
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn format(json: serde_json::Value) -> StringFormat {
        serde_json::from_value(json).unwrap()
    }

    #[test]
    fn transforms_apply_in_fixed_order() {
        // trim first (keeps "My Notes!"), then slugify, then upper-case
        let f = format(serde_json::json!({
            "trim": {"side": "left", "length": 9},
            "slugify": true,
            "case": "upper"
        }));
        assert_eq!(f.apply("t", "My Notes! and more").unwrap(), "MY-NOTES");
    }

    #[test]
    fn trim_right_keeps_tail() {
        let f = format(serde_json::json!({"trim": {"side": "right", "length": 4}}));
        assert_eq!(f.apply("t", "attachment").unwrap(), "ment");
    }

    #[test]
    fn trim_longer_than_value_is_identity() {
        let f = format(serde_json::json!({"trim": {"side": "right", "length": 99}}));
        assert_eq!(f.apply("t", "short").unwrap(), "short");
    }

    #[test]
    fn trim_counts_graphemes() {
        let f = format(serde_json::json!({"trim": {"side": "left", "length": 2}}));
        assert_eq!(f.apply("t", "ab̄cd").unwrap(), "ab̄");
    }

    #[test]
    fn zero_trim_length_is_rejected() {
        let f = format(serde_json::json!({"trim": {"side": "left", "length": 0}}));
        assert!(matches!(
            f.apply("t", "x"),
            Err(TemplateError::InvalidFormat { .. })
        ));
    }

    #[test]
    fn slugify_examples() {
        assert_eq!(slugify("Hello World!"), "Hello-World");
        assert_eq!(slugify("  a  b  "), "a-b");
        assert_eq!(slugify("notes/daily_2024.md"), "notes-daily-2024-md");
        assert_eq!(slugify("???"), "");
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result: Result<StringFormat, _> =
            serde_json::from_value(serde_json::json!({"bogus": 1}));
        assert!(result.is_err());
    }

    #[test]
    fn invalid_enum_value_is_rejected() {
        let result: Result<StringFormat, _> =
            serde_json::from_value(serde_json::json!({"case": "title"}));
        assert!(result.is_err());
    }
}
