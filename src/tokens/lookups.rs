//! Structural lookup tokens: attachment size, frontmatter values, headings.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::errors::TemplateError;
use crate::runtime::context::EvaluatorContext;
use crate::tokens::parse_token_format;

// ============================================================================
// ATTACHMENT FILE SIZE
// ============================================================================

const BYTES_IN_KB: f64 = 1024.0;
const BYTES_IN_MB: f64 = 1024.0 * 1024.0;

#[derive(Debug, Clone, Copy, Default, Deserialize)]
enum SizeUnit {
    #[default]
    #[serde(rename = "B")]
    Bytes,
    #[serde(rename = "KB")]
    Kilobytes,
    #[serde(rename = "MB")]
    Megabytes,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct SizeFormat {
    #[serde(default)]
    unit: SizeUnit,
    #[serde(default)]
    decimal_points: usize,
}

/// `${attachmentFileSize:{unit:'KB',decimalPoints:1}}` - byte length of the
/// in-flight attachment content; 0 when there is none.
pub(crate) fn attachment_file_size(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: SizeFormat = parse_token_format(ctx)?;
    let bytes = ctx
        .attachment_content
        .as_ref()
        .map_or(0, |content| content.len()) as f64;
    let value = match format.unit {
        SizeUnit::Bytes => bytes,
        SizeUnit::Kilobytes => bytes / BYTES_IN_KB,
        SizeUnit::Megabytes => bytes / BYTES_IN_MB,
    };
    Ok(format!("{:.*}", format.decimal_points, value))
}

// ============================================================================
// FRONTMATTER
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct FrontmatterFormat {
    /// Dotted path into the frontmatter mapping, e.g. `"project.tags.0"`.
    key: String,
}

/// `${frontmatter:{key:'a.b'}}` - empty string when the note, its cache or
/// the key is absent.
pub(crate) fn frontmatter(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: FrontmatterFormat = parse_token_format(ctx)?;
    let Some(root) = ctx.host().frontmatter(&ctx.note_file_path) else {
        return Ok(String::new());
    };

    let mut current = &root;
    for segment in format.key.split('.') {
        let next = match current {
            Value::Object(map) => map.get(segment),
            Value::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        };
        match next {
            Some(value) => current = value,
            None => return Ok(String::new()),
        }
    }

    Ok(render_frontmatter_value(current))
}

fn render_frontmatter_value(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        // compound values render as compact JSON
        other => serde_json::to_string(other).unwrap_or_default(),
    }
}

// ============================================================================
// HEADING
// ============================================================================

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
enum HeadingLevel {
    #[serde(rename = "1")]
    H1,
    #[serde(rename = "2")]
    H2,
    #[serde(rename = "3")]
    H3,
    #[serde(rename = "4")]
    H4,
    #[serde(rename = "5")]
    H5,
    #[serde(rename = "6")]
    H6,
    #[default]
    #[serde(rename = "any")]
    Any,
}

impl HeadingLevel {
    fn as_number(self) -> Option<u8> {
        match self {
            Self::H1 => Some(1),
            Self::H2 => Some(2),
            Self::H3 => Some(3),
            Self::H4 => Some(4),
            Self::H5 => Some(5),
            Self::H6 => Some(6),
            Self::Any => None,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct HeadingFormat {
    #[serde(default)]
    level: HeadingLevel,
}

/// `${heading:{level:'2'}}` - the nearest heading at the requested level at
/// or above the cursor line; `'any'` picks the nearest heading of any level.
/// Empty string without a cursor or when no heading qualifies.
pub(crate) async fn heading(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: HeadingFormat = parse_token_format(ctx)?;
    let Some(cursor_line) = ctx.cursor_line else {
        return Ok(String::new());
    };

    let headings = ctx.host().headings(&ctx.note_file_path).await;

    // Track, per level, the highest qualifying line seen so far.
    let mut nearest_per_level: HashMap<u8, (u32, &str)> = HashMap::new();
    let mut nearest_any: Option<(u32, &str)> = None;
    for h in &headings {
        if h.line > cursor_line {
            continue;
        }
        let per_level = nearest_per_level
            .entry(h.level)
            .or_insert((h.line, h.text.as_str()));
        if h.line >= per_level.0 {
            *per_level = (h.line, h.text.as_str());
        }
        if nearest_any.map_or(true, |(line, _)| h.line >= line) {
            nearest_any = Some((h.line, h.text.as_str()));
        }
    }

    let found = match format.level.as_number() {
        Some(level) => nearest_per_level.get(&level).map(|&(_, text)| text),
        None => nearest_any.map(|(_, text)| text),
    };
    Ok(found.unwrap_or("").to_string())
}
