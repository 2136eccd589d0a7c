//! Custom token loading, registry rebuilds and function-backed tokens.

mod common;

use common::{attach_options, engine};
use std::sync::Arc;
use tokenfill::tokens::custom::parse_custom_tokens;
use tokenfill::{TemplateError, TokenRegistry};

#[test]
fn source_text_parses_into_tokens() {
    let tokens = parse_custom_tokens(
        "// project naming conventions\n\
         register(stamp, '${date:{pattern: \"%Y%m%d\"}}');\n\
         register('slug', '${noteFileName:{slugify: true}}');",
    )
    .unwrap();
    assert_eq!(tokens.len(), 2);
    assert_eq!(tokens[0].name(), "stamp");
    assert_eq!(tokens[1].name(), "slug");
}

#[test]
fn duplicate_names_are_rejected() {
    let err = parse_custom_tokens("register(a, 'x'); register(A, 'y');").unwrap_err();
    assert!(matches!(err, TemplateError::DuplicateCustomToken { ref token, .. } if token == "A"));
}

#[test]
fn malformed_source_is_rejected() {
    let err = parse_custom_tokens("register(a 'x')").unwrap_err();
    assert!(matches!(err, TemplateError::CustomTokenSource { .. }));
}

#[test]
fn rebuild_failure_falls_back_to_builtins() {
    let mut registry = TokenRegistry::builtins();
    registry.rebuild("register(good, 'x')").unwrap();
    assert!(registry.is_registered("good"));

    assert!(registry.rebuild("not even close").is_err());
    assert!(!registry.is_registered("good"));
    assert!(registry.is_registered("uuid"));
}

#[tokio::test]
async fn custom_tokens_compose_with_builtins() {
    let engine = engine();
    engine
        .rebuild_tokens("register(prefixed, 'img-${noteFileName}')")
        .unwrap();
    let out = engine
        .fill("${prefixed}-${sequenceNumber}", attach_options())
        .await
        .unwrap();
    assert_eq!(out, "img-note-7");
}

#[tokio::test]
async fn in_flight_fill_keeps_its_registry_snapshot() {
    let engine = Arc::new(engine());
    engine.rebuild_tokens("register(marker, 'old')").unwrap();

    // A token that parks its fill until released, so a rebuild can happen
    // while the fill is suspended mid-template.
    let gate = Arc::new(tokio::sync::Notify::new());
    let released = Arc::clone(&gate);
    engine.register_custom_fn(
        "gate",
        Arc::new(move |_ctx| {
            let released = Arc::clone(&released);
            Box::pin(async move {
                released.notified().await;
                Ok(String::new())
            })
        }),
    );

    let filling = Arc::clone(&engine);
    let fill = tokio::spawn(async move {
        filling.fill("${gate}${marker}", attach_options()).await
    });
    tokio::task::yield_now().await;

    engine.rebuild_tokens("register(marker, 'new')").unwrap();
    gate.notify_one();

    // The suspended fill still resolves against the snapshot it started with.
    let out = fill.await.unwrap().unwrap();
    assert_eq!(out, "old");

    // A fill started after the rebuild sees the replacement.
    let fresh = engine.fill("${marker}", attach_options()).await.unwrap();
    assert_eq!(fresh, "new");
}

#[tokio::test]
async fn custom_tokens_survive_only_until_the_next_rebuild() {
    let engine = engine();
    engine.rebuild_tokens("register(first, 'a')").unwrap();
    assert!(engine.is_registered("first"));

    engine.rebuild_tokens("register(second, 'b')").unwrap();
    assert!(!engine.is_registered("first"));
    assert!(engine.is_registered("second"));
}

#[tokio::test]
async fn failed_engine_rebuild_keeps_builtins_working() {
    let engine = engine();
    assert!(engine.rebuild_tokens("garbage source").is_err());
    let out = engine
        .fill("${noteFileName}", attach_options())
        .await
        .unwrap();
    assert_eq!(out, "note");
}

#[tokio::test]
async fn function_backed_tokens_run_arbitrary_code() {
    let engine = engine();
    engine.register_custom_fn(
        "shout",
        Arc::new(|ctx| {
            Box::pin(async move { Ok(ctx.note_file_name.to_uppercase()) })
        }),
    );
    let out = engine.fill("${shout}!", attach_options()).await.unwrap();
    assert_eq!(out, "NOTE!");
}

#[tokio::test]
async fn custom_tokens_may_nest_other_custom_tokens() {
    let engine = engine();
    engine
        .rebuild_tokens(
            "register(inner, '${noteFolderName}');\n\
             register(outer, '${inner}/${noteFileName}');",
        )
        .unwrap();
    let out = engine.fill("${outer}", attach_options()).await.unwrap();
    assert_eq!(out, "2024/note");
}
