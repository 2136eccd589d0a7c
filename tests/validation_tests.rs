//! Validator entry points: file names, paths and token dry runs.

mod common;

use common::engine;
use tokenfill::{
    validate_file_name, validate_path, validate_tokens, FileNameValidationOptions,
    PathValidationOptions, TokenValidationMode,
};

fn file_name_options(name: &str, mode: TokenValidationMode) -> FileNameValidationOptions {
    FileNameValidationOptions {
        file_name: name.to_string(),
        is_empty_allowed: false,
        are_single_dots_allowed: false,
        mode,
    }
}

#[tokio::test]
async fn plain_file_names_pass() {
    let engine = engine();
    let message = validate_file_name(
        &engine,
        &file_name_options("attachment-01", TokenValidationMode::Validate),
    )
    .await;
    assert_eq!(message, "");
}

#[tokio::test]
async fn tokens_can_be_forbidden_outright() {
    let engine = engine();
    let message = validate_file_name(
        &engine,
        &file_name_options("${uuid}", TokenValidationMode::Error),
    )
    .await;
    assert_eq!(message, "Tokens are not allowed in file name");
}

#[tokio::test]
async fn known_tokens_validate_cleanly() {
    let engine = engine();
    let message = validate_file_name(
        &engine,
        &file_name_options("${noteFileName}-${uuid}", TokenValidationMode::Validate),
    )
    .await;
    assert_eq!(message, "");
}

#[tokio::test]
async fn unknown_tokens_are_reported_by_name() {
    let engine = engine();
    let message = validate_tokens(&engine, "${noSuchToken}").await;
    assert_eq!(message, "Unknown token 'noSuchToken'.");
}

#[tokio::test]
async fn schema_violations_surface_through_dry_runs() {
    let engine = engine();
    let message = validate_tokens(&engine, "${uuid:{bogus: true}}").await;
    assert!(message.starts_with("Invalid token '${uuid:{bogus: true}}':"));
}

#[tokio::test]
async fn malformed_syntax_is_reported() {
    let engine = engine();
    let message = validate_tokens(&engine, "${noteFileName").await;
    assert!(message.starts_with("Invalid token syntax:"));
}

#[tokio::test]
async fn date_token_validates_without_a_real_note() {
    // The synthetic context has no note file; stat-backed tokens still must
    // not fail the dry run.
    let engine = engine();
    let message = validate_tokens(&engine, "${noteFileCreationDate:{pattern: '%Y'}}").await;
    assert_eq!(message, "");
}

#[tokio::test]
async fn prompt_token_validates_without_prompting() {
    let engine = engine();
    let message = validate_tokens(&engine, "${prompt}").await;
    assert_eq!(message, "");
}

#[tokio::test]
async fn reserved_characters_are_rejected() {
    let engine = engine();
    let message = validate_file_name(
        &engine,
        &file_name_options("name?bad", TokenValidationMode::Skip),
    )
    .await;
    assert_eq!(message, "File name \"name?bad\" contains invalid symbols");
}

#[tokio::test]
async fn all_dot_and_trailing_dot_names_are_rejected() {
    let engine = engine();
    let dots = validate_file_name(
        &engine,
        &file_name_options("...", TokenValidationMode::Skip),
    )
    .await;
    assert_eq!(dots, "File name \"...\" contains more than two dots");

    let trailing = validate_file_name(
        &engine,
        &file_name_options("name.", TokenValidationMode::Skip),
    )
    .await;
    assert_eq!(trailing, "File name \"name.\" contains trailing dots");
}

#[tokio::test]
async fn consecutive_dots_inside_a_name_are_rejected() {
    let engine = engine();
    let inner = validate_file_name(
        &engine,
        &file_name_options("file...name", TokenValidationMode::Skip),
    )
    .await;
    assert_eq!(inner, "File name \"file...name\" contains more than two dots");

    // two consecutive dots inside a name stay legal
    let pair = validate_file_name(
        &engine,
        &file_name_options("file..name", TokenValidationMode::Skip),
    )
    .await;
    assert_eq!(pair, "");
}

#[tokio::test]
async fn single_dots_follow_the_option() {
    let engine = engine();
    let rejected = validate_file_name(
        &engine,
        &file_name_options("..", TokenValidationMode::Skip),
    )
    .await;
    assert_eq!(rejected, "Single dots are not allowed in file name");

    let mut options = file_name_options(".", TokenValidationMode::Skip);
    options.are_single_dots_allowed = true;
    assert_eq!(validate_file_name(&engine, &options).await, "");
}

#[tokio::test]
async fn empty_names_follow_the_option() {
    let engine = engine();
    let rejected =
        validate_file_name(&engine, &file_name_options("", TokenValidationMode::Skip)).await;
    assert_eq!(rejected, "File name is empty");

    let mut options = file_name_options("", TokenValidationMode::Skip);
    options.is_empty_allowed = true;
    assert_eq!(validate_file_name(&engine, &options).await, "");
}

#[tokio::test]
async fn token_only_names_validate_via_stand_ins() {
    // `${uuid}` becomes `__uuid__`, which is a perfectly safe file name.
    let engine = engine();
    let message = validate_file_name(
        &engine,
        &file_name_options("${uuid}", TokenValidationMode::Validate),
    )
    .await;
    assert_eq!(message, "");
}

#[tokio::test]
async fn paths_validate_per_segment() {
    let engine = engine();
    let options = PathValidationOptions {
        path: "/attachments/${noteFileName}/media/".to_string(),
        are_tokens_allowed: true,
    };
    assert_eq!(validate_path(&engine, &options).await, "");

    let bad = PathValidationOptions {
        path: "attachments/bad|segment".to_string(),
        are_tokens_allowed: true,
    };
    assert!(validate_path(&engine, &bad).await.contains("invalid symbols"));
}

#[tokio::test]
async fn paths_can_forbid_tokens() {
    let engine = engine();
    let options = PathValidationOptions {
        path: "attachments/${uuid}".to_string(),
        are_tokens_allowed: false,
    };
    assert_eq!(
        validate_path(&engine, &options).await,
        "Tokens are not allowed in path"
    );
}

#[tokio::test]
async fn empty_paths_are_fine() {
    let engine = engine();
    let options = PathValidationOptions {
        path: "///".to_string(),
        are_tokens_allowed: false,
    };
    assert_eq!(validate_path(&engine, &options).await, "");
}

#[tokio::test]
async fn path_dry_runs_catch_bad_formats() {
    let engine = engine();
    let options = PathValidationOptions {
        path: "x/${date:{pattern: 5}}".to_string(),
        are_tokens_allowed: true,
    };
    let message = validate_path(&engine, &options).await;
    assert!(message.starts_with("Invalid token '"));
}
