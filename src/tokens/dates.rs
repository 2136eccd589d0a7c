//! Date and time tokens.
//!
//! All of them take a required strftime `pattern`; the file-timestamp
//! variants additionally take `valueWhenUnknown` to pick a fallback when the
//! stat is unavailable. During token validation the note-file variants
//! format the current instant instead of requiring a real file, so dry runs
//! can still catch pattern and schema mistakes.

use std::fmt::Write as _;

use chrono::{DateTime, Local, TimeZone};
use serde::Deserialize;

use crate::errors::TemplateError;
use crate::runtime::context::ActionContext;
use crate::runtime::context::EvaluatorContext;
use crate::tokens::{evaluation_error, parse_token_format};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct DateFormat {
    pattern: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum ValueWhenUnknown {
    #[default]
    Empty,
    Now,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct StatDateFormat {
    pattern: String,
    #[serde(default)]
    value_when_unknown: ValueWhenUnknown,
}

/// `${date:{pattern:'%Y-%m-%d'}}` - the current instant.
pub(crate) fn date_now(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: DateFormat = parse_token_format(ctx)?;
    render(ctx, Local::now(), &format.pattern)
}

pub(crate) fn note_file_creation_date(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: DateFormat = parse_token_format(ctx)?;
    let stat = note_stat(ctx)?;
    render_millis(ctx, stat.map(|s| s.ctime_ms), &format.pattern)
}

pub(crate) fn note_file_modification_date(
    ctx: &EvaluatorContext,
) -> Result<String, TemplateError> {
    let format: DateFormat = parse_token_format(ctx)?;
    let stat = note_stat(ctx)?;
    render_millis(ctx, stat.map(|s| s.mtime_ms), &format.pattern)
}

pub(crate) fn original_attachment_file_creation_date(
    ctx: &EvaluatorContext,
) -> Result<String, TemplateError> {
    let format: StatDateFormat = parse_token_format(ctx)?;
    attachment_date(ctx, format, |s| s.ctime_ms)
}

pub(crate) fn original_attachment_file_modification_date(
    ctx: &EvaluatorContext,
) -> Result<String, TemplateError> {
    let format: StatDateFormat = parse_token_format(ctx)?;
    attachment_date(ctx, format, |s| s.mtime_ms)
}

fn attachment_date(
    ctx: &EvaluatorContext,
    format: StatDateFormat,
    pick: impl Fn(&crate::runtime::context::FileStat) -> i64,
) -> Result<String, TemplateError> {
    match &ctx.attachment_stat {
        Some(stat) => {
            let instant = instant_from_millis(ctx, pick(stat))?;
            render(ctx, instant, &format.pattern)
        }
        None => match format.value_when_unknown {
            ValueWhenUnknown::Now => render(ctx, Local::now(), &format.pattern),
            ValueWhenUnknown::Empty => Ok(String::new()),
        },
    }
}

/// Note stat via the host. Validation dry-runs substitute the current
/// instant so a synthetic note path does not fail the whole validation.
fn note_stat(
    ctx: &EvaluatorContext,
) -> Result<Option<crate::runtime::context::FileStat>, TemplateError> {
    match ctx.host().note_file_stat(&ctx.note_file_path) {
        Some(stat) => Ok(Some(stat)),
        None if ctx.action == ActionContext::ValidateTokens => Ok(None),
        None => Err(evaluation_error(
            ctx,
            format!("note file '{}' not found", ctx.note_file_path),
        )),
    }
}

fn render_millis(
    ctx: &EvaluatorContext,
    millis: Option<i64>,
    pattern: &str,
) -> Result<String, TemplateError> {
    match millis {
        Some(ms) => {
            let instant = instant_from_millis(ctx, ms)?;
            render(ctx, instant, pattern)
        }
        None => render(ctx, Local::now(), pattern),
    }
}

fn instant_from_millis(
    ctx: &EvaluatorContext,
    millis: i64,
) -> Result<DateTime<Local>, TemplateError> {
    Local
        .timestamp_millis_opt(millis)
        .single()
        .ok_or_else(|| evaluation_error(ctx, format!("timestamp {} is out of range", millis)))
}

fn render(
    ctx: &EvaluatorContext,
    instant: DateTime<Local>,
    pattern: &str,
) -> Result<String, TemplateError> {
    // chrono reports unknown specifiers only while rendering
    let mut out = String::new();
    write!(out, "{}", instant.format(pattern))
        .map_err(|_| evaluation_error(ctx, format!("invalid date pattern '{}'", pattern)))?;
    Ok(out)
}
