//! Evaluation context and host collaborators.
//!
//! A [`FillOptions`] value describes one top-level fill: which note is
//! active, the in-flight attachment, the externally maintained sequence
//! number, and a cancellation signal. The filler derives the remaining
//! fields once and hands every token evaluator an [`EvaluatorContext`] - an
//! immutable per-placeholder view that also carries the recursion handle.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::errors::TemplateError;
use crate::runtime::filler::FillHandle;

/// Sentinel path used for synthetic validation contexts and as the prompt
/// token's dry-run result.
pub const DUMMY_PATH: &str = "__dummy__";

/// What triggered the fill. Validation mode makes interactive and
/// file-backed tokens answer with sentinels instead of real side effects.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionContext {
    AttachFile,
    RenameNote,
    ValidateTokens,
}

/// Creation/modification instants of a host file, in Unix milliseconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FileStat {
    pub ctime_ms: i64,
    pub mtime_ms: i64,
}

/// One heading of a note, as cached by the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    pub level: u8,
    pub line: u32,
    pub text: String,
}

/// Cooperative cancellation. Cloned freely; checked by the filler before and
/// after every placeholder evaluation.
#[derive(Debug, Clone, Default)]
pub struct CancelSignal {
    cancelled: Arc<AtomicBool>,
}

impl CancelSignal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    /// Fails with [`TemplateError::Aborted`] once the signal fired.
    pub fn check(&self) -> Result<(), TemplateError> {
        if self.is_cancelled() {
            Err(TemplateError::Aborted)
        } else {
            Ok(())
        }
    }
}

/// Request handed to the host when the prompt token needs user input.
#[derive(Debug, Clone)]
pub struct PromptRequest {
    /// Name of the token asking for input.
    pub token: String,
    /// Pre-filled value; the prompt's default template, already expanded.
    pub default_value: String,
}

/// Everything the engine needs from the embedding application. Hosts should
/// run prompt input through [`crate::validation::validate_prompt_value`] for
/// live preview; the engine re-checks the final answer either way.
#[async_trait]
pub trait HostServices: Send + Sync {
    /// The parsed frontmatter of a note, if the note and its cache exist.
    fn frontmatter(&self, note_path: &str) -> Option<Value>;

    /// The cached headings of a note, in any order.
    async fn headings(&self, note_path: &str) -> Vec<Heading>;

    /// Creation/modification times of a note file.
    fn note_file_stat(&self, note_path: &str) -> Option<FileStat>;

    /// Collects a string from the user. `None` means the user cancelled.
    async fn prompt(&self, request: PromptRequest) -> Option<String>;
}

/// Host that answers every query with "nothing there". Prompts resolve to
/// their default value. Backs tests and synthetic validation.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullHost;

#[async_trait]
impl HostServices for NullHost {
    fn frontmatter(&self, _note_path: &str) -> Option<Value> {
        None
    }

    async fn headings(&self, _note_path: &str) -> Vec<Heading> {
        Vec::new()
    }

    fn note_file_stat(&self, _note_path: &str) -> Option<FileStat> {
        None
    }

    async fn prompt(&self, request: PromptRequest) -> Option<String> {
        Some(request.default_value)
    }
}

/// Caller-supplied description of one top-level fill.
#[derive(Debug, Clone)]
pub struct FillOptions {
    pub action: ActionContext,
    /// Path of the active note.
    pub note_file_path: String,
    /// Path the note had before a rename, for rename workflows.
    pub old_note_file_path: Option<String>,
    /// Full name (with extension) of the originally pasted attachment.
    pub original_attachment_file_name: Option<String>,
    /// Raw bytes of the in-flight attachment.
    pub attachment_content: Option<Arc<Vec<u8>>>,
    /// Filesystem stat of the original attachment, when known.
    pub attachment_stat: Option<FileStat>,
    pub generated_attachment_file_name: String,
    pub generated_attachment_file_path: String,
    /// Editor cursor line within the note, if an editor is open.
    pub cursor_line: Option<u32>,
    /// Externally maintained, monotonically assigned by the caller.
    pub sequence_number: Option<u64>,
    pub cancel: CancelSignal,
}

impl FillOptions {
    pub fn new(action: ActionContext, note_file_path: impl Into<String>) -> Self {
        Self {
            action,
            note_file_path: note_file_path.into(),
            old_note_file_path: None,
            original_attachment_file_name: None,
            attachment_content: None,
            attachment_stat: None,
            generated_attachment_file_name: String::new(),
            generated_attachment_file_path: String::new(),
            cursor_line: None,
            sequence_number: None,
            cancel: CancelSignal::new(),
        }
    }

    /// Options for the validator's synthetic context: dummy note and
    /// attachment identity, no content, no cursor.
    pub fn synthetic() -> Self {
        let mut options = Self::new(ActionContext::ValidateTokens, DUMMY_PATH);
        options.original_attachment_file_name = Some(DUMMY_PATH.to_string());
        options
    }
}

/// The per-placeholder view handed to token evaluators. Descriptors only
/// read from it; all mutation happens in the filler's output accumulator.
#[derive(Clone)]
pub struct EvaluatorContext {
    pub action: ActionContext,

    pub note_file_path: String,
    pub note_file_name: String,
    pub note_folder_name: String,
    pub note_folder_path: String,

    pub old_note_file_path: String,
    pub old_note_file_name: String,
    pub old_note_folder_name: String,
    pub old_note_folder_path: String,

    /// Base name of the originally pasted attachment, without extension.
    pub original_attachment_file_name: String,
    /// Extension of the original attachment, without the leading dot.
    pub original_attachment_file_extension: String,
    pub attachment_content: Option<Arc<Vec<u8>>>,
    pub attachment_stat: Option<FileStat>,

    pub generated_attachment_file_name: String,
    pub generated_attachment_file_path: String,

    pub cursor_line: Option<u32>,
    pub sequence_number: u64,

    /// Name of the placeholder currently being evaluated.
    pub token: String,
    /// The placeholder's raw text, `${...}` included.
    pub raw: String,
    pub token_start_offset: usize,
    pub token_end_offset: usize,
    pub full_template: String,
    /// The parsed format object, when a format clause was present.
    pub format: Option<Map<String, Value>>,

    pub cancel: CancelSignal,
    pub(crate) host: Arc<dyn HostServices>,
    pub(crate) filler: FillHandle,
}

impl EvaluatorContext {
    pub fn host(&self) -> &dyn HostServices {
        &*self.host
    }

    /// Re-enters the filler on another template, sharing this fill's
    /// registry snapshot, note context and cancellation signal. Nesting
    /// depth is bounded; see [`crate::runtime::filler::MAX_FILL_DEPTH`].
    pub async fn fill(&self, template: &str) -> Result<String, TemplateError> {
        self.filler.fill(template).await
    }
}
