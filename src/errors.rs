//! Tokenfill error handling.
//!
//! One error type covers the whole pipeline. Every failure in a fill aborts
//! that fill entirely; only the validator converts errors into messages.

use miette::{Diagnostic, NamedSource, SourceSpan};
use thiserror::Error;

/// The single error type for scanning, format parsing, registry lookups,
/// evaluation and custom-token loading.
#[derive(Debug, Error, Diagnostic)]
pub enum TemplateError {
    // Syntax errors - malformed placeholders
    #[error("invalid token start")]
    #[diagnostic(code(tokenfill::syntax::invalid_token_start))]
    InvalidTokenStart {
        #[source_code]
        src: NamedSource<String>,
        #[label("token opens here")]
        span: SourceSpan,
    },

    #[error("empty token name")]
    #[diagnostic(code(tokenfill::syntax::empty_token_name))]
    EmptyTokenName {
        #[source_code]
        src: NamedSource<String>,
        #[label("name expected here")]
        span: SourceSpan,
    },

    #[error("token '{token}' is missing closing '}}'")]
    #[diagnostic(code(tokenfill::syntax::missing_closing_brace))]
    MissingClosingBrace {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("unclosed token")]
        span: SourceSpan,
    },

    #[error("format for token '{token}' must be an object starting with '{{'")]
    #[diagnostic(code(tokenfill::syntax::format_not_object))]
    FormatNotObject {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("format clause starts here")]
        span: SourceSpan,
    },

    #[error("invalid format object for token '{token}': {message}")]
    #[diagnostic(code(tokenfill::syntax::invalid_format_object))]
    InvalidFormatObject {
        token: String,
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("within this format object")]
        span: SourceSpan,
    },

    // Resolution errors
    #[error("unknown token '{token}'")]
    #[diagnostic(code(tokenfill::resolve::unknown_token))]
    UnknownToken {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("not registered")]
        span: SourceSpan,
    },

    // Schema errors - format object rejected before evaluation
    #[error("invalid format for token '{token}': {message}")]
    #[diagnostic(code(tokenfill::schema::invalid_format))]
    InvalidFormat { token: String, message: String },

    #[error("token '{token}' does not support default format")]
    #[diagnostic(code(tokenfill::schema::default_format_unsupported))]
    DefaultFormatUnsupported { token: String },

    // Evaluation errors
    #[error("token '{token}' evaluation failed: {message}")]
    #[diagnostic(code(tokenfill::eval::failed))]
    Evaluation { token: String, message: String },

    #[error("prompt cancelled")]
    #[diagnostic(code(tokenfill::eval::prompt_cancelled))]
    PromptCancelled,

    #[error("template expansion aborted")]
    #[diagnostic(code(tokenfill::eval::aborted))]
    Aborted,

    #[error("template recursion limit of {limit} exceeded")]
    #[diagnostic(
        code(tokenfill::eval::recursion_limit),
        help("a custom token most likely expands itself, directly or through another token")
    )]
    RecursionLimit { limit: usize },

    // Custom-token source errors
    #[error("invalid custom token source: {message}")]
    #[diagnostic(code(tokenfill::custom::invalid_source))]
    CustomTokenSource {
        message: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("here")]
        span: SourceSpan,
    },

    #[error("duplicate custom token '{token}'")]
    #[diagnostic(code(tokenfill::custom::duplicate))]
    DuplicateCustomToken {
        token: String,
        #[source_code]
        src: NamedSource<String>,
        #[label("registered twice")]
        span: SourceSpan,
    },
}

/// Coarse error categories, mainly for test assertions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Syntax,
    Resolution,
    Schema,
    Evaluation,
    Cancelled,
    CustomSource,
}

impl TemplateError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidTokenStart { .. }
            | Self::EmptyTokenName { .. }
            | Self::MissingClosingBrace { .. }
            | Self::FormatNotObject { .. }
            | Self::InvalidFormatObject { .. } => ErrorCategory::Syntax,

            Self::UnknownToken { .. } => ErrorCategory::Resolution,

            Self::InvalidFormat { .. } | Self::DefaultFormatUnsupported { .. } => {
                ErrorCategory::Schema
            }

            Self::Evaluation { .. }
            | Self::PromptCancelled
            | Self::RecursionLimit { .. } => ErrorCategory::Evaluation,

            Self::Aborted => ErrorCategory::Cancelled,

            Self::CustomTokenSource { .. } | Self::DuplicateCustomToken { .. } => {
                ErrorCategory::CustomSource
            }
        }
    }
}

/// Builds a named source for diagnostics that point into a template string.
pub(crate) fn template_source(template: &str) -> NamedSource<String> {
    NamedSource::new("template", template.to_string())
}

/// Converts a byte range into a miette span.
pub(crate) fn to_span(start: usize, end: usize) -> SourceSpan {
    SourceSpan::from(start..end)
}
