//! The interactive `prompt` token.
//!
//! Asks the host for a value, pre-filled with a default rendered from a
//! nested template. During token validation (and for the synthetic dummy
//! attachment used there) the default is returned directly so dry runs never
//! block on user input.

use serde::Deserialize;

use crate::errors::TemplateError;
use crate::runtime::context::{ActionContext, EvaluatorContext, PromptRequest, DUMMY_PATH};
use crate::tokens::string_format::{CaseTransform, StringFormat, TrimFormat};
use crate::tokens::{evaluation_error, parse_token_format};
use crate::validation::validate_prompt_value;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct PromptFormat {
    #[serde(default)]
    case: Option<CaseTransform>,
    #[serde(default)]
    slugify: Option<bool>,
    #[serde(default)]
    trim: Option<TrimFormat>,
    #[serde(default = "default_value_template")]
    default_value_template: String,
}

fn default_value_template() -> String {
    "${originalAttachmentFileName}".to_string()
}

pub(crate) async fn prompt(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: PromptFormat = parse_token_format(ctx)?;

    // Dry runs never reach the host prompt.
    if ctx.action == ActionContext::ValidateTokens
        || ctx.original_attachment_file_name == DUMMY_PATH
    {
        return Ok(DUMMY_PATH.to_string());
    }

    let default_value = ctx.fill(&format.default_value_template).await?;

    let string_format = StringFormat {
        case: format.case,
        slugify: format.slugify,
        trim: format.trim,
    };

    let request = PromptRequest {
        token: ctx.token.clone(),
        default_value,
    };
    let answer = ctx
        .host()
        .prompt(request)
        .await
        .ok_or(TemplateError::PromptCancelled)?;

    let complaint = validate_prompt_value(&answer);
    if !complaint.is_empty() {
        return Err(evaluation_error(ctx, complaint));
    }

    string_format.apply(&ctx.token, &answer)
}
