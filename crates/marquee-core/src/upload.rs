//! Upload facade.
//!
//! Validates upload requests, derives where the source object and the
//! transcoded manifest will live, and asks a [`UrlSigner`] for a time-limited
//! upload URL. Signing itself belongs to the object-storage client and stays
//! behind the trait.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{error, info};

use crate::config::StorageConfig;
use crate::error::{Result, UploadError};

/// Content type assumed when the client does not send one.
pub const DEFAULT_CONTENT_TYPE: &str = "video/mp4";

/// Prefix of uploaded source objects.
pub const UPLOAD_PREFIX: &str = "inputs";

/// Characters that may not appear in an object key file name.
static UNSAFE_FILENAME_CHARS: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9.\-]").ok());

/// Replace every character outside `[A-Za-z0-9.-]` with `_`.
///
/// Returns `None` only if the pattern failed to compile.
#[must_use]
pub fn sanitize_filename(name: &str) -> Option<String> {
    let re = UNSAFE_FILENAME_CHARS.as_ref()?;
    Some(re.replace_all(name, "_").into_owned())
}

/// Object key of an uploaded source file.
#[must_use]
pub fn upload_object_key(video_id: &str, sanitized_filename: &str) -> String {
    format!("{UPLOAD_PREFIX}/{video_id}/{sanitized_filename}")
}

/// CDN URL of the manifest the transcoder will publish for `filename`.
///
/// The last extension of the file name is replaced by `.m3u8`.
#[must_use]
pub fn cdn_manifest_url(cdn_domain: &str, video_id: &str, filename: &str) -> String {
    let stem = match filename.rfind('.') {
        Some(dot) if dot > 0 => &filename[..dot],
        _ => filename,
    };
    format!("https://{cdn_domain}/assets/{video_id}/HLS/{stem}.m3u8")
}

/// Issues time-limited upload URLs.
#[cfg_attr(test, mockall::automock)]
pub trait UrlSigner: Send + Sync {
    /// A URL that accepts a `PUT` of `content_type` to `bucket/key` for
    /// `expires_in_secs` seconds.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::SigningFailed`] if the storage client refuses.
    fn presign_put(
        &self,
        bucket: &str,
        key: &str,
        content_type: &str,
        expires_in_secs: u64,
    ) -> Result<String>;
}

/// Client request for an upload URL.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadRequest {
    /// Original file name.
    #[serde(default)]
    pub filename: String,
    /// MIME type, defaults to `video/mp4`.
    #[serde(default)]
    pub content_type: Option<String>,
    /// Catalog id the upload belongs to.
    #[serde(default)]
    pub video_id: String,
}

/// Where to upload and where the stream will appear.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UploadTicket {
    /// Presigned upload URL.
    pub upload_url: String,
    /// Object key of the upload.
    #[serde(rename = "s3Key")]
    pub object_key: String,
    /// Manifest URL once transcoding completes.
    pub hls_url: String,
}

/// Storage status shown on the admin settings page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct StorageStatus {
    /// Whether uploads are possible.
    pub configured: bool,
    /// Storage region.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    /// Upload bucket.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bucket_name: Option<String>,
    /// CDN domain.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cloudfront_domain: Option<String>,
    /// Access key id, all but the last four characters masked.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_key_id: Option<String>,
    /// Hint shown when not configured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Upload request handling over an optional storage configuration.
pub struct UploadFacade<S: UrlSigner> {
    storage: Option<StorageConfig>,
    signer: S,
}

impl<S: UrlSigner> UploadFacade<S> {
    /// Create a facade; `storage` is `None` when uploads are disabled.
    pub const fn new(storage: Option<StorageConfig>, signer: S) -> Self {
        Self { storage, signer }
    }

    /// Whether storage credentials are present.
    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.storage.is_some()
    }

    /// Storage status without secrets.
    #[must_use]
    pub fn status(&self) -> StorageStatus {
        match &self.storage {
            Some(storage) => StorageStatus {
                configured: true,
                region: Some(storage.region.clone()),
                bucket_name: Some(storage.bucket_name.clone()),
                cloudfront_domain: Some(storage.cdn_domain.clone()),
                access_key_id: Some(storage.masked_access_key()),
                message: None,
            },
            None => StorageStatus {
                configured: false,
                region: None,
                bucket_name: None,
                cloudfront_domain: None,
                access_key_id: None,
                message: Some(UploadError::NotConfigured.to_string()),
            },
        }
    }

    /// Validate `request` and issue an upload ticket.
    ///
    /// # Errors
    ///
    /// Returns [`UploadError::NotConfigured`] without storage settings,
    /// [`UploadError::MissingField`] for a blank file name or video id, and
    /// whatever the signer reports.
    pub fn request_upload(&self, request: &UploadRequest) -> Result<UploadTicket> {
        let storage = self.storage.as_ref().ok_or_else(|| {
            error!("Upload requested but object storage is not configured");
            UploadError::NotConfigured
        })?;

        if request.filename.trim().is_empty() {
            return Err(UploadError::MissingField("filename").into());
        }
        if request.video_id.trim().is_empty() {
            return Err(UploadError::MissingField("videoId").into());
        }

        let sanitized = sanitize_filename(&request.filename)
            .ok_or_else(|| UploadError::InvalidFilename(request.filename.clone()))?;
        let object_key = upload_object_key(&request.video_id, &sanitized);
        let content_type = request
            .content_type
            .as_deref()
            .filter(|ct| !ct.trim().is_empty())
            .unwrap_or(DEFAULT_CONTENT_TYPE);

        info!("Generating upload URL for {}", object_key);
        let upload_url = self.signer.presign_put(
            &storage.bucket_name,
            &object_key,
            content_type,
            storage.upload_url_expiry_secs,
        )?;

        Ok(UploadTicket {
            upload_url,
            hls_url: cdn_manifest_url(&storage.cdn_domain, &request.video_id, &sanitized),
            object_key,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::error::Error;
    use mockall::predicate::eq;

    fn storage() -> StorageConfig {
        StorageConfig {
            access_key_id: "AKIAEXAMPLE1234".to_string(),
            secret_access_key: "secret".to_string(),
            bucket_name: "marquee-uploads".to_string(),
            region: "us-east-1".to_string(),
            cdn_domain: "d111.cloudfront.net".to_string(),
            transcoder_endpoint: None,
            transcoder_role: None,
            upload_url_expiry_secs: 3600,
        }
    }

    fn request(filename: &str, video_id: &str) -> UploadRequest {
        UploadRequest {
            filename: filename.to_string(),
            content_type: None,
            video_id: video_id.to_string(),
        }
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(
            sanitize_filename("My Movie (final).mp4").as_deref(),
            Some("My_Movie__final_.mp4")
        );
        assert_eq!(sanitize_filename("clip-01.mov").as_deref(), Some("clip-01.mov"));
        assert_eq!(sanitize_filename("été.mp4").as_deref(), Some("_t_.mp4"));
        assert_eq!(sanitize_filename("../etc/passwd").as_deref(), Some(".._etc_passwd"));
    }

    #[test]
    fn test_object_key() {
        assert_eq!(
            upload_object_key("abc", "movie.mp4"),
            "inputs/abc/movie.mp4"
        );
    }

    #[test]
    fn test_cdn_manifest_url_drops_last_extension() {
        assert_eq!(
            cdn_manifest_url("d111.cloudfront.net", "abc", "movie.final.mp4"),
            "https://d111.cloudfront.net/assets/abc/HLS/movie.final.m3u8"
        );
        assert_eq!(
            cdn_manifest_url("cdn", "abc", "noext"),
            "https://cdn/assets/abc/HLS/noext.m3u8"
        );
    }

    #[test]
    fn test_request_upload_issues_ticket() {
        let mut signer = MockUrlSigner::new();
        signer
            .expect_presign_put()
            .with(
                eq("marquee-uploads"),
                eq("inputs/42/My_Movie.mp4"),
                eq("video/mp4"),
                eq(3600_u64),
            )
            .times(1)
            .returning(|_, _, _, _| Ok("https://signed.example.com/put".to_string()));

        let facade = UploadFacade::new(Some(storage()), signer);
        let ticket = facade.request_upload(&request("My Movie.mp4", "42")).unwrap();

        assert_eq!(ticket.upload_url, "https://signed.example.com/put");
        assert_eq!(ticket.object_key, "inputs/42/My_Movie.mp4");
        assert_eq!(
            ticket.hls_url,
            "https://d111.cloudfront.net/assets/42/HLS/My_Movie.m3u8"
        );
    }

    #[test]
    fn test_request_upload_keeps_content_type() {
        let mut signer = MockUrlSigner::new();
        signer
            .expect_presign_put()
            .withf(|_, _, content_type, _| content_type == "video/quicktime")
            .times(1)
            .returning(|_, _, _, _| Ok("url".to_string()));

        let facade = UploadFacade::new(Some(storage()), signer);
        let mut req = request("clip.mov", "7");
        req.content_type = Some("video/quicktime".to_string());
        facade.request_upload(&req).unwrap();
    }

    #[test]
    fn test_request_upload_requires_configuration() {
        let mut signer = MockUrlSigner::new();
        signer.expect_presign_put().never();

        let facade = UploadFacade::new(None, signer);
        let err = facade.request_upload(&request("a.mp4", "1")).unwrap_err();
        assert!(matches!(err, Error::Upload(UploadError::NotConfigured)));
    }

    #[test]
    fn test_request_upload_requires_fields() {
        let mut signer = MockUrlSigner::new();
        signer.expect_presign_put().never();
        let facade = UploadFacade::new(Some(storage()), signer);

        let err = facade.request_upload(&request("", "1")).unwrap_err();
        assert!(matches!(
            err,
            Error::Upload(UploadError::MissingField("filename"))
        ));
        let err = facade.request_upload(&request("a.mp4", " ")).unwrap_err();
        assert!(matches!(
            err,
            Error::Upload(UploadError::MissingField("videoId"))
        ));
    }

    #[test]
    fn test_signer_failure_propagates() {
        let mut signer = MockUrlSigner::new();
        signer
            .expect_presign_put()
            .returning(|_, _, _, _| Err(UploadError::SigningFailed("expired credentials".into()).into()));

        let facade = UploadFacade::new(Some(storage()), signer);
        let err = facade.request_upload(&request("a.mp4", "1")).unwrap_err();
        assert!(err.to_string().contains("expired credentials"));
    }

    #[test]
    fn test_status_masks_access_key() {
        let facade = UploadFacade::new(Some(storage()), MockUrlSigner::new());
        let status = facade.status();
        assert!(status.configured);
        assert_eq!(status.access_key_id.as_deref(), Some("****1234"));
        assert_eq!(status.bucket_name.as_deref(), Some("marquee-uploads"));

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["cloudfrontDomain"], "d111.cloudfront.net");
        assert!(json.get("message").is_none());
    }

    #[test]
    fn test_status_when_unconfigured() {
        let facade = UploadFacade::new(None, MockUrlSigner::new());
        let status = facade.status();
        assert!(!status.configured);
        assert!(status.access_key_id.is_none());
        assert!(status.message.unwrap().contains("AWS_S3_BUCKET_NAME"));
    }

    #[test]
    fn test_ticket_json_matches_api() {
        let ticket = UploadTicket {
            upload_url: "u".to_string(),
            object_key: "inputs/1/a.mp4".to_string(),
            hls_url: "h".to_string(),
        };
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["s3Key"], "inputs/1/a.mp4");
        assert_eq!(json["uploadUrl"], "u");
        assert_eq!(json["hlsUrl"], "h");
    }
}
