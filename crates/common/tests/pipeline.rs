//! Integration tests for the store and retrieve pipelines

mod common;

use std::sync::Arc;
use std::time::Duration;

use ::common::prelude::*;
use ::common::transform::{AesGcmTransform, Base64Transform, GzipTransform};
use store::{Backend, FileBackend, KeyGenerator, StoreError};

#[tokio::test]
async fn test_hello_world_through_aes_gzip_base64() {
    let backend = common::memory_backend();
    let (ingest, retrieve) = common::pipelines(&["aes", "gzip", "base64"], backend.clone());

    let mut input: &[u8] = b"hello world";
    let key = ingest.store(&mut input).await.unwrap();

    // peel the stored blob by hand, outermost layer first
    let mut stored = Vec::new();
    backend.get(&key, &mut stored).await.unwrap();
    assert!(stored.iter().all(|b| b.is_ascii()));

    let gzipped = Base64Transform.reverse(&stored).unwrap();
    assert_eq!(&gzipped[..2], &[0x1f, 0x8b]);

    let sealed = GzipTransform::default().reverse(&gzipped).unwrap();
    assert_eq!(sealed.len(), 12 + b"hello world".len() + 16);

    let aes = AesGcmTransform::from_secret(common::AES_SECRET).unwrap();
    assert_eq!(aes.reverse(&sealed).unwrap(), b"hello world");

    assert_eq!(retrieve.fetch(&key).await.unwrap(), b"hello world");
}

#[tokio::test]
async fn test_size_boundary() {
    let backend = common::memory_backend();
    let (ingest, retrieve) = common::pipelines(&["gzip"], backend);
    let ingest = ingest.with_size_limit(1024);

    let exact = vec![b'x'; 1024];
    let mut input: &[u8] = &exact;
    let key = ingest.store(&mut input).await.unwrap();
    assert_eq!(retrieve.fetch(&key).await.unwrap(), exact);

    let over = vec![b'x'; 1025];
    let mut input: &[u8] = &over;
    let err = ingest.store(&mut input).await.unwrap_err();
    assert!(matches!(err, PipelineError::PayloadTooLarge { limit: 1024 }));
}

#[tokio::test]
async fn test_empty_chain_stores_bytes_verbatim() {
    let backend = common::memory_backend();
    let (ingest, retrieve) = common::pipelines(&[], backend.clone());

    let payload = [0u8, 1, 2, 254, 255];
    let mut input: &[u8] = &payload;
    let key = ingest.store(&mut input).await.unwrap();

    let mut stored = Vec::new();
    backend.get(&key, &mut stored).await.unwrap();
    assert_eq!(stored, payload);
    assert_eq!(retrieve.fetch(&key).await.unwrap(), payload);
}

#[tokio::test]
async fn test_empty_payload_roundtrips() {
    let backend = common::memory_backend();
    let (ingest, retrieve) = common::pipelines(&["chacha20", "gzip", "base64"], backend);

    let mut input: &[u8] = b"";
    let key = ingest.store(&mut input).await.unwrap();
    assert!(retrieve.fetch(&key).await.unwrap().is_empty());
}

#[tokio::test]
async fn test_reader_with_mismatched_order_fails() {
    let backend = common::memory_backend();
    let (ingest, _) = common::pipelines(&["gzip", "base64"], backend.clone());
    let (_, swapped) = common::pipelines(&["base64", "gzip"], backend);

    let mut input: &[u8] = b"order matters";
    let key = ingest.store(&mut input).await.unwrap();

    match swapped.fetch(&key).await {
        Err(PipelineError::Transform(err)) => assert!(err.is_corrupt_payload()),
        Err(other) => panic!("unexpected error: {}", other),
        Ok(out) => assert_ne!(out, b"order matters"),
    }
}

#[tokio::test]
async fn test_wrong_secret_is_corrupt_not_missing() {
    let backend = common::memory_backend();
    let (ingest, _) = common::pipelines(&["aes"], backend.clone());

    let mut input: &[u8] = b"secret";
    let key = ingest.store(&mut input).await.unwrap();

    let other_settings = TransformSettings {
        aes: Some(CipherSettings {
            key: "not the same".to_string(),
        }),
        ..Default::default()
    };
    let other_chain = Arc::new(TransformChain::from_names(&["aes"], &other_settings).unwrap());
    let err = RetrievePipeline::new(other_chain, backend)
        .fetch(&key)
        .await
        .unwrap_err();
    assert!(!err.is_not_found());
    assert!(matches!(err, PipelineError::Transform(ref e) if e.is_corrupt_payload()));
}

#[test]
fn test_every_bit_flip_is_detected() {
    let aes = AesGcmTransform::from_secret(common::AES_SECRET).unwrap();
    let sealed = aes.forward(b"tamper").unwrap();

    for byte in 0..sealed.len() {
        for bit in 0..8 {
            let mut tampered = sealed.clone();
            tampered[byte] ^= 1 << bit;
            let err = aes.reverse(&tampered).unwrap_err();
            assert!(err.is_corrupt_payload(), "byte {} bit {}", byte, bit);
        }
    }
}

#[tokio::test]
async fn test_missing_key_reports_not_found() {
    let (_, retrieve) = common::pipelines(&["aes", "base64"], common::memory_backend());
    let err = retrieve.fetch("AbCdEf").await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_file_backend_end_to_end() {
    let temp_dir = tempfile::tempdir().unwrap();
    let backend: Arc<dyn Backend> = Arc::new(
        FileBackend::new(temp_dir.path().join("pastes"), KeyGenerator::new(10).unwrap())
            .await
            .unwrap(),
    );
    let (ingest, retrieve) = common::pipelines(&["gzip", "aes"], backend);

    let payload = b"persisted to disk ".repeat(100);
    let mut input: &[u8] = &payload;
    let key = ingest.store(&mut input).await.unwrap();
    assert_eq!(key.len(), 10);
    assert!(temp_dir.path().join("pastes").join(&key).is_file());

    assert_eq!(retrieve.fetch(&key).await.unwrap(), payload);
}

#[tokio::test]
async fn test_backend_failure_after_parseable_prefix() {
    let backend: Arc<dyn Backend> = Arc::new(common::PartialThenFail::new(b"hello".to_vec()));
    let err = RetrievePipeline::new(common::chain(&[]), backend)
        .fetch("abcdef")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Backend(StoreError::Io(_))));

    // a complete gzip member followed by the failure
    let packed = GzipTransform::default().forward(b"hello").unwrap();
    let backend: Arc<dyn Backend> = Arc::new(common::PartialThenFail::new(packed));
    let err = RetrievePipeline::new(common::chain(&["gzip"]), backend)
        .fetch("abcdef")
        .await
        .unwrap_err();
    assert!(matches!(err, PipelineError::Backend(_)));
}

#[tokio::test]
async fn test_large_partial_write_through_tiny_pipe() {
    let backend: Arc<dyn Backend> = Arc::new(common::PartialThenFail::new(vec![b'x'; 200 * 1024]));
    let retrieve = RetrievePipeline::new(common::chain(&[]), backend).with_pipe_capacity(8);

    let err = tokio::time::timeout(Duration::from_secs(10), retrieve.fetch("abcdef"))
        .await
        .expect("fetch stalled")
        .unwrap_err();
    assert!(matches!(err, PipelineError::Backend(_)));
}
