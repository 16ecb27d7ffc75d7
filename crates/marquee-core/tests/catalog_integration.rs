//! Integration tests for the upload -> catalog -> transcode -> playback flow.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::sync::Arc;
use std::time::Duration;

use marquee_core::{
    CatalogSource, CatalogStore, HomeFeed, InMemoryCatalog, NewTitle, PlaybackSource, Result,
    StorageConfig, TitleRecord, TranscodeEvent, TranscodeProbe, TranscodeStatus, TranscodeWatcher,
    UploadFacade, UploadRequest, UrlSigner,
};

struct StaticSigner;

impl UrlSigner for StaticSigner {
    fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in_secs: u64,
    ) -> Result<String> {
        Ok(format!(
            "https://{bucket}.s3.amazonaws.com/{key}?content-type={content_type}&expires={expires_in_secs}"
        ))
    }
}

/// Reports every title as finished.
struct FinishedProbe;

impl TranscodeProbe for FinishedProbe {
    fn probe(&self, _title: &TitleRecord) -> Result<Option<TranscodeStatus>> {
        Ok(Some(TranscodeStatus::Complete))
    }
}

fn storage() -> StorageConfig {
    StorageConfig::from_lookup(|key| {
        let value = match key {
            "AWS_ACCESS_KEY_ID" => "AKIAINTEGRATION9876",
            "AWS_SECRET_ACCESS_KEY" => "secret",
            "AWS_REGION" => "us-east-1",
            "AWS_S3_BUCKET_NAME" => "marquee-uploads",
            "AWS_CLOUDFRONT_DOMAIN" => "d111.cloudfront.net",
            _ => return None,
        };
        Some(value.to_string())
    })
    .expect("all variables present")
}

#[tokio::test]
async fn test_uploaded_title_becomes_streamable() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();

    let catalog = Arc::new(InMemoryCatalog::new());
    let facade = UploadFacade::new(Some(storage()), StaticSigner);
    assert_eq!(facade.status().access_key_id.as_deref(), Some("****9876"));

    let ticket = facade
        .request_upload(&UploadRequest {
            filename: "Neon Horizon (4K).mov".to_string(),
            content_type: Some("video/quicktime".to_string()),
            video_id: "neon".to_string(),
        })
        .unwrap();
    assert_eq!(ticket.object_key, "inputs/neon/Neon_Horizon__4K_.mov");
    assert!(ticket.upload_url.contains("expires=3600"));

    let created = catalog
        .create_title(
            NewTitle::new("Neon Horizon", ticket.object_key.clone(), 2045)
                .with_genre(["Sci-Fi", "Thriller"])
                .with_video_url("https://cdn.example.com/neon.mp4")
                .with_hls_url(ticket.hls_url.clone()),
        )
        .unwrap();

    // Before transcoding the player gets the progressive file.
    let url = created.stream_url().unwrap().to_string();
    assert!(!PlaybackSource::resolve(url).is_segmented);

    let store: Arc<dyn CatalogStore> = catalog.clone();
    let watcher = TranscodeWatcher::with_interval(store, Arc::new(FinishedProbe), Duration::from_millis(20));
    let (mut events, handle) = watcher.start();

    let mut seen = Vec::new();
    while seen.len() < 2 {
        let event = tokio::time::timeout(Duration::from_secs(1), events.recv())
            .await
            .expect("timeout waiting for transcode event")
            .expect("watcher stopped early");
        seen.push(event);
    }
    handle.stop().await;

    assert_eq!(
        seen,
        vec![
            TranscodeEvent::StatusChanged {
                id: created.id.clone(),
                from: TranscodeStatus::Pending,
                to: TranscodeStatus::Processing,
            },
            TranscodeEvent::StatusChanged {
                id: created.id.clone(),
                from: TranscodeStatus::Processing,
                to: TranscodeStatus::Complete,
            },
        ]
    );

    let title = catalog.get_title(&created.id).unwrap();
    let source = PlaybackSource::resolve(title.stream_url().unwrap());
    assert!(source.is_segmented);
    assert_eq!(
        source.url,
        "https://d111.cloudfront.net/assets/neon/HLS/Neon_Horizon__4K_.m3u8"
    );
}

#[test]
fn test_home_feed_from_catalog() {
    let catalog = InMemoryCatalog::new();
    for (title, genre) in [
        ("Neon Horizon", "Sci-Fi"),
        ("Star Walker", "Sci-Fi"),
        ("Night City Chronicles", "Documentary"),
    ] {
        catalog
            .create_title(NewTitle::new(title, format!("inputs/x/{title}"), 2025).with_genre([genre]))
            .unwrap();
    }

    let titles = catalog.list_titles().unwrap();
    let feed = HomeFeed::compose(&titles, "Sci-Fi");

    assert_eq!(
        feed.featured.map(|t| t.title),
        Some("Night City Chronicles".to_string())
    );
    let spotlight = feed
        .rows
        .iter()
        .find(|row| row.title == "Top Sci-Fi Picks")
        .unwrap();
    assert_eq!(spotlight.items.len(), 2);
}
