//! The template filler.
//!
//! [`TemplateEngine`] owns the registry behind a lock and hands each fill an
//! `Arc` snapshot of it, so a rebuild never changes the token set of a fill
//! already in flight. Filling walks the scanned placeholders left to right,
//! evaluating strictly in order - later placeholders observe the side
//! effects (prompts, random draws) of earlier ones.

use std::sync::{Arc, RwLock};

use futures::future::BoxFuture;

use crate::errors::{template_source, to_span, TemplateError};
use crate::runtime::context::{
    CancelSignal, EvaluatorContext, FillOptions, FileStat, HostServices,
};
use crate::runtime::path;
use crate::runtime::registry::TokenRegistry;
use crate::syntax::object;
use crate::syntax::scanner::{scan_tokens, ScannedToken};
use crate::tokens::custom::CustomEvaluatorFn;

/// Maximum nesting depth of template expansion. Custom tokens and the
/// prompt default template re-enter the filler; this bound turns a cyclic
/// custom token into an error instead of unbounded recursion.
pub const MAX_FILL_DEPTH: usize = 16;

/// The engine: a rebuildable token registry plus the host bridge.
pub struct TemplateEngine {
    registry: RwLock<Arc<TokenRegistry>>,
    host: Arc<dyn HostServices>,
}

impl TemplateEngine {
    /// An engine over the built-in token set.
    pub fn new(host: Arc<dyn HostServices>) -> Self {
        Self::with_registry(TokenRegistry::builtins(), host)
    }

    pub fn with_registry(registry: TokenRegistry, host: Arc<dyn HostServices>) -> Self {
        Self {
            registry: RwLock::new(Arc::new(registry)),
            host,
        }
    }

    /// Swaps in a fresh registry built from `custom_source`. On a parse
    /// error the engine falls back to the built-ins only and reports the
    /// error; fills already in flight keep their old snapshot either way.
    pub fn rebuild_tokens(&self, custom_source: &str) -> Result<(), TemplateError> {
        let mut fresh = TokenRegistry::new();
        let result = fresh.rebuild(custom_source);
        *self.write_lock() = Arc::new(fresh);
        result
    }

    /// Registers a function-backed custom token on top of the current set.
    pub fn register_custom_fn(&self, name: impl Into<String>, evaluator: CustomEvaluatorFn) {
        let mut guard = self.write_lock();
        let mut next = (**guard).clone();
        next.register_custom_fn(name, evaluator);
        *guard = Arc::new(next);
    }

    /// The current registry snapshot.
    pub fn registry(&self) -> Arc<TokenRegistry> {
        Arc::clone(&self.registry.read().unwrap_or_else(|e| e.into_inner()))
    }

    pub fn is_registered(&self, name: &str) -> bool {
        self.registry().is_registered(name)
    }

    /// Expands every placeholder in `template`, strictly left to right.
    /// Returns the first error; a failed fill produces no partial output.
    pub async fn fill(
        &self,
        template: &str,
        options: FillOptions,
    ) -> Result<String, TemplateError> {
        let shared = Arc::new(FillerShared::new(self.registry(), Arc::clone(&self.host), options));
        let handle = FillHandle {
            inner: shared,
            depth: 0,
        };
        handle.fill(template).await
    }

    fn write_lock(&self) -> std::sync::RwLockWriteGuard<'_, Arc<TokenRegistry>> {
        self.registry.write().unwrap_or_else(|e| e.into_inner())
    }
}

/// Per-fill state: the registry snapshot, host, cancellation signal and the
/// note/attachment fields derived once from [`FillOptions`].
pub(crate) struct FillerShared {
    registry: Arc<TokenRegistry>,
    host: Arc<dyn HostServices>,
    cancel: CancelSignal,

    action: crate::runtime::context::ActionContext,

    note_file_path: String,
    note_file_name: String,
    note_folder_name: String,
    note_folder_path: String,

    old_note_file_path: String,
    old_note_file_name: String,
    old_note_folder_name: String,
    old_note_folder_path: String,

    original_attachment_file_name: String,
    original_attachment_file_extension: String,
    attachment_content: Option<Arc<Vec<u8>>>,
    attachment_stat: Option<FileStat>,

    generated_attachment_file_name: String,
    generated_attachment_file_path: String,

    cursor_line: Option<u32>,
    sequence_number: u64,
}

impl FillerShared {
    fn new(registry: Arc<TokenRegistry>, host: Arc<dyn HostServices>, options: FillOptions) -> Self {
        let note_path = options.note_file_path;
        let old_note_path = options
            .old_note_file_path
            .unwrap_or_else(|| note_path.clone());

        let original_full_name = options.original_attachment_file_name.unwrap_or_default();

        Self {
            registry,
            host,
            cancel: options.cancel,
            action: options.action,

            note_file_name: path::file_base_name(&note_path).to_string(),
            note_folder_name: path::dot_to_empty(path::file_name(path::parent_path(&note_path)))
                .to_string(),
            note_folder_path: path::dot_to_empty(path::parent_path(&note_path)).to_string(),

            old_note_file_name: path::file_base_name(&old_note_path).to_string(),
            old_note_folder_name: path::dot_to_empty(path::file_name(path::parent_path(
                &old_note_path,
            )))
            .to_string(),
            old_note_folder_path: path::dot_to_empty(path::parent_path(&old_note_path))
                .to_string(),

            original_attachment_file_name: path::file_base_name(&original_full_name).to_string(),
            original_attachment_file_extension: path::extension(&original_full_name).to_string(),
            attachment_content: options.attachment_content,
            attachment_stat: options.attachment_stat,

            generated_attachment_file_name: options.generated_attachment_file_name,
            generated_attachment_file_path: options.generated_attachment_file_path,

            cursor_line: options.cursor_line,
            sequence_number: options.sequence_number.unwrap_or(0),

            note_file_path: note_path,
            old_note_file_path: old_note_path,
        }
    }
}

/// A re-entrant filling handle: the shared per-fill state plus the current
/// nesting depth. Cloning increments nothing; the filler bumps the depth
/// when it hands the handle to an evaluator.
#[derive(Clone)]
pub(crate) struct FillHandle {
    pub(crate) inner: Arc<FillerShared>,
    pub(crate) depth: usize,
}

impl FillHandle {
    pub(crate) fn fill<'a>(
        &'a self,
        template: &'a str,
    ) -> BoxFuture<'a, Result<String, TemplateError>> {
        Box::pin(async move {
            if self.depth >= MAX_FILL_DEPTH {
                return Err(TemplateError::RecursionLimit {
                    limit: MAX_FILL_DEPTH,
                });
            }

            let tokens = scan_tokens(template)?;
            let mut out = String::with_capacity(template.len());
            let mut consumed = 0;

            for token in tokens {
                self.inner.cancel.check()?;
                out.push_str(&template[consumed..token.start]);

                let descriptor = self.inner.registry.lookup(&token.name).ok_or_else(|| {
                    TemplateError::UnknownToken {
                        token: token.name.clone(),
                        src: template_source(template),
                        span: to_span(token.start, token.end),
                    }
                })?;

                let format = match &token.format_text {
                    Some(text) => Some(object::parse_format_object(text).map_err(|e| {
                        TemplateError::InvalidFormatObject {
                            token: token.name.clone(),
                            message: e.message,
                            src: template_source(template),
                            span: to_span(token.start, token.end),
                        }
                    })?),
                    None => None,
                };

                let ctx = self.evaluator_context(template, &token, format);
                let value = descriptor.evaluate(&ctx).await?;
                self.inner.cancel.check()?;

                out.push_str(&value);
                consumed = token.end;
            }

            out.push_str(&template[consumed..]);
            Ok(out)
        })
    }

    fn evaluator_context(
        &self,
        template: &str,
        token: &ScannedToken,
        format: Option<serde_json::Map<String, serde_json::Value>>,
    ) -> EvaluatorContext {
        let shared = &self.inner;
        EvaluatorContext {
            action: shared.action,

            note_file_path: shared.note_file_path.clone(),
            note_file_name: shared.note_file_name.clone(),
            note_folder_name: shared.note_folder_name.clone(),
            note_folder_path: shared.note_folder_path.clone(),

            old_note_file_path: shared.old_note_file_path.clone(),
            old_note_file_name: shared.old_note_file_name.clone(),
            old_note_folder_name: shared.old_note_folder_name.clone(),
            old_note_folder_path: shared.old_note_folder_path.clone(),

            original_attachment_file_name: shared.original_attachment_file_name.clone(),
            original_attachment_file_extension: shared
                .original_attachment_file_extension
                .clone(),
            attachment_content: shared.attachment_content.clone(),
            attachment_stat: shared.attachment_stat,

            generated_attachment_file_name: shared.generated_attachment_file_name.clone(),
            generated_attachment_file_path: shared.generated_attachment_file_path.clone(),

            cursor_line: shared.cursor_line,
            sequence_number: shared.sequence_number,

            token: token.name.clone(),
            raw: token.raw.clone(),
            token_start_offset: token.start,
            token_end_offset: token.end,
            full_template: template.to_string(),
            format,

            cancel: shared.cancel.clone(),
            host: Arc::clone(&shared.host),
            filler: FillHandle {
                inner: Arc::clone(&self.inner),
                depth: self.depth + 1,
            },
        }
    }
}
