//! User-defined tokens.
//!
//! Custom tokens come from two places. A source text of `register(name,
//! 'template')` statements is parsed into template-backed tokens; this is
//! declarative, so loading untrusted source can at worst produce odd file
//! names. Arbitrary behavior is only available through
//! [`CustomToken::from_fn`], which callers opt into in code.

use std::fmt;
use std::sync::Arc;

use futures::future::BoxFuture;
use miette::NamedSource;

use crate::errors::{to_span, TemplateError};
use crate::runtime::context::EvaluatorContext;
use crate::syntax::object::Cursor;

/// Boxed async evaluator for function-backed custom tokens.
pub type CustomEvaluatorFn =
    Arc<dyn Fn(EvaluatorContext) -> BoxFuture<'static, Result<String, TemplateError>> + Send + Sync>;

enum CustomBehavior {
    /// Expands a nested template through the active fill.
    Template(String),
    Function(CustomEvaluatorFn),
}

pub struct CustomToken {
    name: String,
    behavior: CustomBehavior,
}

impl fmt::Debug for CustomToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let behavior = match &self.behavior {
            CustomBehavior::Template(t) => format!("Template({:?})", t),
            CustomBehavior::Function(_) => "Function(..)".to_string(),
        };
        f.debug_struct("CustomToken")
            .field("name", &self.name)
            .field("behavior", &behavior)
            .finish()
    }
}

impl CustomToken {
    pub fn from_template(name: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            behavior: CustomBehavior::Template(template.into()),
        }
    }

    pub fn from_fn(name: impl Into<String>, evaluator: CustomEvaluatorFn) -> Self {
        Self {
            name: name.into(),
            behavior: CustomBehavior::Function(evaluator),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) async fn evaluate(&self, ctx: &EvaluatorContext) -> Result<String, TemplateError> {
        match &self.behavior {
            CustomBehavior::Template(template) => ctx.fill(template).await,
            CustomBehavior::Function(evaluator) => evaluator(ctx.clone()).await,
        }
    }
}

/// Parses a custom-token source text: a sequence of
/// `register(name, 'template');` statements. Names may be bare identifiers
/// or string literals and must be `[A-Za-z0-9_]+`; the trailing semicolon is
/// optional. Comments and whitespace follow the format-object trivia rules.
pub fn parse_custom_tokens(source: &str) -> Result<Vec<CustomToken>, TemplateError> {
    let mut cursor = Cursor::new(source);
    let mut tokens: Vec<CustomToken> = Vec::new();

    loop {
        trivia(&mut cursor, source)?;
        if cursor.at_end() {
            return Ok(tokens);
        }

        let start = cursor.pos();
        let keyword = cursor.take_identifier();
        if keyword != "register" {
            return Err(source_error(
                source,
                start,
                cursor.pos().max(start + 1),
                format!("expected 'register', found '{}'", keyword),
            ));
        }

        trivia(&mut cursor, source)?;
        expect_char(&mut cursor, source, '(')?;
        trivia(&mut cursor, source)?;

        let name_start = cursor.pos();
        let name = match cursor.peek() {
            Some('"') | Some('\'') => cursor
                .parse_string()
                .map_err(|e| rebase(source, e))?,
            _ => cursor.take_identifier().to_string(),
        };
        let name_end = cursor.pos();
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
            return Err(source_error(
                source,
                name_start,
                name_end.max(name_start + 1),
                format!("invalid token name '{}'", name),
            ));
        }
        if tokens
            .iter()
            .any(|t| t.name().eq_ignore_ascii_case(&name))
        {
            return Err(TemplateError::DuplicateCustomToken {
                token: name,
                src: custom_source(source),
                span: to_span(name_start, name_end.max(name_start + 1)),
            });
        }

        trivia(&mut cursor, source)?;
        expect_char(&mut cursor, source, ',')?;
        trivia(&mut cursor, source)?;

        let template = cursor.parse_string().map_err(|e| rebase(source, e))?;

        trivia(&mut cursor, source)?;
        expect_char(&mut cursor, source, ')')?;
        trivia(&mut cursor, source)?;
        if cursor.peek() == Some(';') {
            cursor.bump();
        }

        tokens.push(CustomToken::from_template(name, template));
    }
}

fn trivia(cursor: &mut Cursor<'_>, source: &str) -> Result<(), TemplateError> {
    cursor.skip_trivia().map_err(|e| rebase(source, e))
}

fn expect_char(
    cursor: &mut Cursor<'_>,
    source: &str,
    expected: char,
) -> Result<(), TemplateError> {
    if cursor.peek() == Some(expected) {
        cursor.bump();
        Ok(())
    } else {
        let pos = cursor.pos();
        Err(source_error(
            source,
            pos,
            pos + 1,
            format!("expected '{}'", expected),
        ))
    }
}

fn rebase(source: &str, err: crate::syntax::object::ObjectSyntaxError) -> TemplateError {
    source_error(source, err.offset, err.offset + 1, err.message)
}

fn source_error(
    source: &str,
    start: usize,
    end: usize,
    message: impl Into<String>,
) -> TemplateError {
    let start = start.min(source.len());
    let end = end.clamp(start, source.len()).max(start);
    TemplateError::CustomTokenSource {
        message: message.into(),
        src: custom_source(source),
        span: to_span(start, end),
    }
}

fn custom_source(source: &str) -> NamedSource<String> {
    NamedSource::new("custom tokens", source.to_string())
}
