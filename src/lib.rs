//! # tokenfill
//!
//! A `${token}` substitution template engine. Templates mix literal text
//! with placeholders - `${name}` or `${name:{...format...}}` - that resolve
//! through a case-insensitive registry of token evaluators: built-in tokens
//! for dates, note and attachment names, random values, frontmatter and
//! heading lookups plus interactive prompts, and custom tokens loaded from a
//! declarative `register(name, 'template')` source text.
//!
//! ```no_run
//! use std::sync::Arc;
//! use tokenfill::{ActionContext, FillOptions, NullHost, TemplateEngine};
//!
//! # async fn demo() -> Result<(), tokenfill::TemplateError> {
//! let engine = TemplateEngine::new(Arc::new(NullHost));
//! let options = FillOptions::new(ActionContext::AttachFile, "notes/daily/today.md");
//! let name = engine.fill("${noteFileName}-${uuid}", options).await?;
//! # let _ = name;
//! # Ok(())
//! # }
//! ```
//!
//! Filling is async and strictly left to right; each placeholder sees the
//! output of those before it. A failed placeholder fails the whole fill.
//! The [`validation`] module dry-runs templates, file names and paths
//! against a synthetic context and answers with plain messages instead of
//! errors.

pub mod errors;
pub mod runtime;
pub mod syntax;
pub mod tokens;
pub mod validation;

pub use errors::{ErrorCategory, TemplateError};
pub use runtime::{
    ActionContext, CancelSignal, Debouncer, EvaluatorContext, FileStat, FillOptions, Heading,
    HostServices, NullHost, PromptRequest, TemplateEngine, TokenRegistry, DUMMY_PATH,
    MAX_FILL_DEPTH,
};
pub use syntax::scanner::{extract_tokens, scan_tokens, ScannedToken};
pub use tokens::{CustomEvaluatorFn, CustomToken, Token};
pub use validation::{
    validate_file_name, validate_path, validate_prompt_value, validate_tokens,
    FileNameValidationOptions, PathValidationOptions, TokenValidationMode,
};
