#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokenfill::{
    ActionContext, FileStat, FillOptions, Heading, HostServices, PromptRequest, TemplateEngine,
};

/// Host double with canned answers for every query.
#[derive(Debug, Default, Clone)]
pub struct TestHost {
    pub frontmatter: Option<Value>,
    pub headings: Vec<Heading>,
    pub note_stat: Option<FileStat>,
    /// `None` simulates the user cancelling the prompt.
    pub prompt_reply: Option<String>,
}

#[async_trait]
impl HostServices for TestHost {
    fn frontmatter(&self, _note_path: &str) -> Option<Value> {
        self.frontmatter.clone()
    }

    async fn headings(&self, _note_path: &str) -> Vec<Heading> {
        self.headings.clone()
    }

    fn note_file_stat(&self, _note_path: &str) -> Option<FileStat> {
        self.note_stat
    }

    async fn prompt(&self, _request: PromptRequest) -> Option<String> {
        self.prompt_reply.clone()
    }
}

pub fn heading(level: u8, line: u32, text: &str) -> Heading {
    Heading {
        level,
        line,
        text: text.to_string(),
    }
}

pub fn engine() -> TemplateEngine {
    engine_with(TestHost::default())
}

pub fn engine_with(host: TestHost) -> TemplateEngine {
    TemplateEngine::new(Arc::new(host))
}

/// Options for an attach-file fill on a nested note with a realistic
/// original attachment.
pub fn attach_options() -> FillOptions {
    let mut options = FillOptions::new(ActionContext::AttachFile, "vault/projects/2024/note.md");
    options.original_attachment_file_name = Some("photo.png".to_string());
    options.sequence_number = Some(7);
    options
}
