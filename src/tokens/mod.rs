//! The token catalog.
//!
//! Every placeholder name resolves to one [`Token`] descriptor: a closed set
//! of built-in variants plus a [`Custom`](Token::Custom) variant for
//! user-registered evaluators. Each descriptor owns exactly one format
//! schema (a `Deserialize` struct; strict schemas use `deny_unknown_fields`)
//! and evaluates to a `String`.
//!
//! Module structure mirrors the behavior domains:
//!
//! - **`string_format`**: shared trim/slugify/case transforms
//! - **`dates`**: current instant and file-timestamp tokens
//! - **`names`**: note/attachment name and path projections
//! - **`generators`**: random string, sequence number, uuid
//! - **`lookups`**: attachment size, frontmatter, heading
//! - **`prompt`**: interactive input
//! - **`custom`**: user-defined tokens and their source loader

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::errors::TemplateError;
use crate::runtime::context::EvaluatorContext;

pub mod custom;
pub mod dates;
pub mod generators;
pub mod lookups;
pub mod names;
pub mod prompt;
pub mod string_format;

pub use custom::{CustomEvaluatorFn, CustomToken};

/// A named unit of behavior bound to a token name. Dispatch is by variant
/// tag; the set is closed and extensible only through `Custom`.
#[derive(Debug)]
pub enum Token {
    AttachmentFileSize,
    Date,
    Frontmatter,
    GeneratedAttachmentFileName,
    GeneratedAttachmentFilePath,
    Heading,
    NoteFileCreationDate,
    NoteFileModificationDate,
    NoteFileName,
    NoteFilePath,
    NoteFolderName,
    NoteFolderPath,
    OriginalAttachmentFileCreationDate,
    OriginalAttachmentFileExtension,
    OriginalAttachmentFileModificationDate,
    OriginalAttachmentFileName,
    Prompt,
    Random,
    SequenceNumber,
    Uuid,
    Custom(CustomToken),
}

impl Token {
    /// Canonical (display) name. Lookup is case-insensitive.
    pub fn name(&self) -> &str {
        match self {
            Self::AttachmentFileSize => "attachmentFileSize",
            Self::Date => "date",
            Self::Frontmatter => "frontmatter",
            Self::GeneratedAttachmentFileName => "generatedAttachmentFileName",
            Self::GeneratedAttachmentFilePath => "generatedAttachmentFilePath",
            Self::Heading => "heading",
            Self::NoteFileCreationDate => "noteFileCreationDate",
            Self::NoteFileModificationDate => "noteFileModificationDate",
            Self::NoteFileName => "noteFileName",
            Self::NoteFilePath => "noteFilePath",
            Self::NoteFolderName => "noteFolderName",
            Self::NoteFolderPath => "noteFolderPath",
            Self::OriginalAttachmentFileCreationDate => "originalAttachmentFileCreationDate",
            Self::OriginalAttachmentFileExtension => "originalAttachmentFileExtension",
            Self::OriginalAttachmentFileModificationDate => {
                "originalAttachmentFileModificationDate"
            }
            Self::OriginalAttachmentFileName => "originalAttachmentFileName",
            Self::Prompt => "prompt",
            Self::Random => "random",
            Self::SequenceNumber => "sequenceNumber",
            Self::Uuid => "uuid",
            Self::Custom(custom) => custom.name(),
        }
    }

    pub async fn evaluate(&self, ctx: &EvaluatorContext) -> Result<String, TemplateError> {
        match self {
            Self::AttachmentFileSize => lookups::attachment_file_size(ctx),
            Self::Date => dates::date_now(ctx),
            Self::Frontmatter => lookups::frontmatter(ctx),
            Self::GeneratedAttachmentFileName => names::generated_attachment_file_name(ctx),
            Self::GeneratedAttachmentFilePath => names::generated_attachment_file_path(ctx),
            Self::Heading => lookups::heading(ctx).await,
            Self::NoteFileCreationDate => dates::note_file_creation_date(ctx),
            Self::NoteFileModificationDate => dates::note_file_modification_date(ctx),
            Self::NoteFileName => names::note_file_name(ctx),
            Self::NoteFilePath => names::note_file_path(ctx),
            Self::NoteFolderName => names::note_folder_name(ctx),
            Self::NoteFolderPath => names::note_folder_path(ctx),
            Self::OriginalAttachmentFileCreationDate => {
                dates::original_attachment_file_creation_date(ctx)
            }
            Self::OriginalAttachmentFileExtension => {
                names::original_attachment_file_extension(ctx)
            }
            Self::OriginalAttachmentFileModificationDate => {
                dates::original_attachment_file_modification_date(ctx)
            }
            Self::OriginalAttachmentFileName => names::original_attachment_file_name(ctx),
            Self::Prompt => prompt::prompt(ctx).await,
            Self::Random => generators::random(ctx),
            Self::SequenceNumber => generators::sequence_number(ctx),
            Self::Uuid => generators::uuid(ctx),
            Self::Custom(custom) => custom.evaluate(ctx).await,
        }
    }

    /// The full built-in set, in registration order.
    pub fn builtins() -> Vec<Token> {
        vec![
            Self::AttachmentFileSize,
            Self::Date,
            Self::Frontmatter,
            Self::GeneratedAttachmentFileName,
            Self::GeneratedAttachmentFilePath,
            Self::Heading,
            Self::NoteFileCreationDate,
            Self::NoteFileModificationDate,
            Self::NoteFileName,
            Self::NoteFilePath,
            Self::NoteFolderName,
            Self::NoteFolderPath,
            Self::OriginalAttachmentFileCreationDate,
            Self::OriginalAttachmentFileExtension,
            Self::OriginalAttachmentFileModificationDate,
            Self::OriginalAttachmentFileName,
            Self::Prompt,
            Self::Random,
            Self::SequenceNumber,
            Self::Uuid,
        ]
    }
}

/// Schema for tokens that accept no format keys at all.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct EmptyFormat {}

/// Applies a descriptor's format schema to the placeholder's parsed format
/// object. With no format clause present, the schema's own defaults apply;
/// a schema with required keys then fails with "does not support default
/// format".
pub(crate) fn parse_token_format<T: DeserializeOwned>(
    ctx: &EvaluatorContext,
) -> Result<T, TemplateError> {
    match &ctx.format {
        Some(map) => serde_json::from_value(Value::Object(map.clone())).map_err(|e| {
            TemplateError::InvalidFormat {
                token: ctx.token.clone(),
                message: e.to_string(),
            }
        }),
        None => serde_json::from_value(Value::Object(Map::new())).map_err(|_| {
            TemplateError::DefaultFormatUnsupported {
                token: ctx.token.clone(),
            }
        }),
    }
}

/// Shorthand for descriptor-specific evaluation failures.
pub(crate) fn evaluation_error(ctx: &EvaluatorContext, message: impl Into<String>) -> TemplateError {
    TemplateError::Evaluation {
        token: ctx.token.clone(),
        message: message.into(),
    }
}
