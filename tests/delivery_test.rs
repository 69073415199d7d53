//! Integration tests for the upload size ceiling
//!
//! Files are sparse, so the 2 GiB cases do not use real disk space.
//!
//! Run with: cargo test --test delivery_test

mod common;
mod mocks;

use common::fixtures::CHAT;
use common::{Sent, TestEnvironment};
use mocks::{FetchScript, ScriptedResolver};
use tubegrab::core::config;
use tubegrab::core::FlowError;
use tubegrab::download::{DeliveryKind, DeliveryPolicy};

const URL: &str = "https://youtu.be/abc";
const LIMIT: u64 = config::download::MAX_FILE_SIZE_BYTES;

fn resolver_producing(ext: &str, size: u64) -> ScriptedResolver {
    let resolver = ScriptedResolver::video();
    resolver.set_fetch(FetchScript::File { ext: ext.into(), size });
    resolver
}

#[tokio::test]
async fn test_file_one_byte_over_limit_is_rejected_and_removed() {
    let env = TestEnvironment::new(resolver_producing("mp4", LIMIT + 1));
    env.flow.on_url(CHAT, URL).await.unwrap();

    let err = env.flow.on_selection(CHAT, "18").await.unwrap_err();

    assert!(matches!(err, FlowError::TooLarge { size, limit } if size == LIMIT + 1 && limit == LIMIT));
    assert!(env.transport.uploads().is_empty());
    assert_eq!(env.files_left(), 0);
    assert!(env.sessions.get(CHAT).is_none());
    assert_eq!(
        env.transport.last_text().unwrap(),
        "⚠️ File too large for Telegram (limit: 2GB)."
    );
}

#[tokio::test]
async fn test_file_exactly_at_limit_is_sent() {
    let env = TestEnvironment::new(resolver_producing("mp4", LIMIT));
    env.flow.on_url(CHAT, URL).await.unwrap();

    let kind = env.flow.on_selection(CHAT, "18").await.unwrap();

    assert_eq!(kind, DeliveryKind::Video);
    assert_eq!(env.transport.uploads().len(), 1);
    assert_eq!(env.files_left(), 0);
}

#[tokio::test]
async fn test_custom_policy_limit() {
    let policy = DeliveryPolicy {
        max_size_bytes: 1000,
        ..DeliveryPolicy::default()
    };
    let env = TestEnvironment::with_policy(resolver_producing("m4a", 1001), policy);
    env.flow.on_url(CHAT, URL).await.unwrap();

    let err = env.flow.on_selection(CHAT, "140").await.unwrap_err();

    assert!(matches!(err, FlowError::TooLarge { .. }));
    assert!(env.transport.uploads().is_empty());
    assert_eq!(
        env.metrics.flow_errors.with_label_values(&["too_large"]).get(),
        1
    );
}

#[tokio::test]
async fn test_long_titles_are_truncated_for_audio_only() {
    let resolver = resolver_producing("opus", 10);
    let mut listing = mocks::sample_listing();
    listing.title = "ж".repeat(80);
    resolver.set_listing(listing);
    let env = TestEnvironment::new(resolver);
    env.flow.on_url(CHAT, URL).await.unwrap();

    env.flow.on_selection(CHAT, "140").await.unwrap();

    match &env.transport.uploads()[0] {
        Sent::Audio { title, .. } => assert_eq!(title.chars().count(), 64),
        other => panic!("expected audio, got {:?}", other),
    }
}
