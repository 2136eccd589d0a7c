//! Name and path projection tokens.
//!
//! These project a context string, optionally through the shared
//! trim/slugify/case transforms. The folder-name token can additionally
//! pick a specific segment of the folder path.

use serde::Deserialize;

use crate::errors::TemplateError;
use crate::runtime::context::EvaluatorContext;
use crate::tokens::string_format::{CaseTransform, StringFormat, TrimFormat};
use crate::tokens::{parse_token_format, EmptyFormat};

pub(crate) fn note_file_name(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: StringFormat = parse_token_format(ctx)?;
    format.apply(&ctx.token, &ctx.note_file_name)
}

pub(crate) fn note_file_path(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let _: EmptyFormat = parse_token_format(ctx)?;
    Ok(ctx.note_file_path.clone())
}

pub(crate) fn note_folder_path(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let _: EmptyFormat = parse_token_format(ctx)?;
    Ok(ctx.note_folder_path.clone())
}

pub(crate) fn generated_attachment_file_name(
    ctx: &EvaluatorContext,
) -> Result<String, TemplateError> {
    let format: StringFormat = parse_token_format(ctx)?;
    format.apply(&ctx.token, &ctx.generated_attachment_file_name)
}

pub(crate) fn generated_attachment_file_path(
    ctx: &EvaluatorContext,
) -> Result<String, TemplateError> {
    let _: EmptyFormat = parse_token_format(ctx)?;
    Ok(ctx.generated_attachment_file_path.clone())
}

pub(crate) fn original_attachment_file_name(
    ctx: &EvaluatorContext,
) -> Result<String, TemplateError> {
    let format: StringFormat = parse_token_format(ctx)?;
    format.apply(&ctx.token, &ctx.original_attachment_file_name)
}

pub(crate) fn original_attachment_file_extension(
    ctx: &EvaluatorContext,
) -> Result<String, TemplateError> {
    let _: EmptyFormat = parse_token_format(ctx)?;
    Ok(ctx.original_attachment_file_extension.clone())
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
enum PickFrom {
    Start,
    End,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(deny_unknown_fields)]
struct PickFormat {
    from: PickFrom,
    #[serde(default)]
    index: usize,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct FolderNameFormat {
    #[serde(default)]
    case: Option<CaseTransform>,
    #[serde(default)]
    slugify: Option<bool>,
    #[serde(default)]
    trim: Option<TrimFormat>,
    #[serde(default)]
    pick: Option<PickFormat>,
}

/// `${noteFolderName}` defaults to the nearest folder; `pick` selects any
/// segment counted from either end. An out-of-range pick yields an empty
/// string rather than an error.
pub(crate) fn note_folder_name(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: FolderNameFormat = parse_token_format(ctx)?;

    let segments: Vec<&str> = ctx.note_folder_path.split('/').collect();
    let index = match format.pick {
        None => Some(segments.len() - 1),
        Some(PickFormat {
            from: PickFrom::Start,
            index,
        }) => Some(index),
        Some(PickFormat {
            from: PickFrom::End,
            index,
        }) => (segments.len() - 1).checked_sub(index),
    };
    let segment = index.and_then(|i| segments.get(i).copied()).unwrap_or("");

    let string_format = StringFormat {
        case: format.case,
        slugify: format.slugify,
        trim: format.trim,
    };
    string_format.apply(&ctx.token, segment)
}
