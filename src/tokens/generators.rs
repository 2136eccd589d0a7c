//! Value-generating tokens: random strings, sequence numbers, UUIDs.

use rand::Rng;
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::TemplateError;
use crate::runtime::context::EvaluatorContext;
use crate::tokens::string_format::CaseTransform;
use crate::tokens::{evaluation_error, parse_token_format};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum LetterCase {
    Lower,
    Mixed,
    #[default]
    Upper,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
struct RandomFormat {
    #[serde(default = "default_length")]
    length: usize,
    #[serde(default = "default_true")]
    digits: bool,
    #[serde(default = "default_true")]
    letters: bool,
    #[serde(default)]
    letter_case: LetterCase,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct SequenceNumberFormat {
    #[serde(default = "default_length")]
    length: usize,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct UuidFormat {
    #[serde(default = "default_lower")]
    case: CaseTransform,
    #[serde(default = "default_true")]
    hyphens: bool,
}

fn default_length() -> usize {
    1
}

fn default_true() -> bool {
    true
}

fn default_lower() -> CaseTransform {
    CaseTransform::Lower
}

/// `${random:{length:5,digits:true,letters:false}}` - draws characters
/// uniformly from the requested classes.
pub(crate) fn random(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: RandomFormat = parse_token_format(ctx)?;

    let mut alphabet: Vec<char> = Vec::new();
    if format.digits {
        alphabet.extend('0'..='9');
    }
    if format.letters {
        match format.letter_case {
            LetterCase::Lower => alphabet.extend('a'..='z'),
            LetterCase::Upper => alphabet.extend('A'..='Z'),
            LetterCase::Mixed => {
                alphabet.extend('a'..='z');
                alphabet.extend('A'..='Z');
            }
        }
    }
    if alphabet.is_empty() {
        return Err(evaluation_error(
            ctx,
            "at least one of digits or letters must be enabled",
        ));
    }

    let mut rng = rand::thread_rng();
    Ok((0..format.length)
        .map(|_| alphabet[rng.gen_range(0..alphabet.len())])
        .collect())
}

/// `${sequenceNumber:{length:3}}` - zero-pads the externally supplied
/// sequence number.
pub(crate) fn sequence_number(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: SequenceNumberFormat = parse_token_format(ctx)?;
    Ok(format!(
        "{:0>width$}",
        ctx.sequence_number.to_string(),
        width = format.length
    ))
}

/// `${uuid:{hyphens:false,case:'upper'}}` - a fresh v4 UUID.
pub(crate) fn uuid(ctx: &EvaluatorContext) -> Result<String, TemplateError> {
    let format: UuidFormat = parse_token_format(ctx)?;
    let mut value = Uuid::new_v4().to_string();
    if !format.hyphens {
        value.retain(|c| c != '-');
    }
    if format.case == CaseTransform::Upper {
        value = value.to_uppercase();
    }
    Ok(value)
}
