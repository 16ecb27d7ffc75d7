//! `Marquee` Core Library
//!
//! Platform-independent core of the Marquee streaming frontend:
//! - Media source classification (segmented manifest vs progressive file)
//! - Streaming session state machine around an adaptive engine
//! - Playback transport, controls auto-hide and the [`Player`] facade
//! - Title catalog with the home-page feed layout
//! - Upload request handling and transcode lifecycle tracking
//! - Application configuration and (native) logging
//!
//! Browser specifics live behind the [`AdaptiveEngine`], [`EngineFactory`] and
//! [`PlaybackSurface`] traits so the whole player can be driven and tested
//! without a DOM.
//!
//! # Error Handling
//!
//! Library surfaces return [`Result`] with the crate [`Error`]. Player-side
//! failures are recovered or logged inside the player.
//!
//! ```rust,ignore
//! use marquee_core::{CatalogSource, InMemoryCatalog, Result};
//!
//! fn titles(catalog: &InMemoryCatalog) -> Result<usize> {
//!     Ok(catalog.list_titles()?.len())
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod controls;
pub mod engine;
pub mod error;
#[cfg(not(target_arch = "wasm32"))]
pub mod logging;
pub mod player;
pub mod quality;
pub mod session;
pub mod source;
pub mod surface;
pub mod transcode;
pub mod transport;
pub mod upload;

pub use catalog::{
    CatalogSource, CatalogStore, DEFAULT_DURATION, DEFAULT_RATING, FeedRow, HomeFeed,
    InMemoryCatalog, NewTitle, TRENDING_ROW_LEN, TitlePatch, TitleRecord,
};
pub use config::{
    AppConfig, DEFAULT_API_BASE_URL, DEFAULT_REGION, DEFAULT_UPLOAD_URL_EXPIRY_SECS, PlayerConfig,
    STORAGE_ENV_VARS, StorageConfig, mask_secret,
};
pub use controls::{ControlsVisibility, DEFAULT_HIDE_DELAY, HideTicket};
pub use engine::{AdaptiveEngine, EngineConfig, EngineError, EngineEvent, EngineFactory, ErrorCategory};
pub use error::{CatalogError, Error, FileSystemError, Result, UploadError};
#[cfg(not(target_arch = "wasm32"))]
pub use logging::{LogRotation, LoggingConfig, LoggingError, LoggingGuard};
pub use player::{DEFAULT_BACK_TARGET, PlaybackState, Player, PlayerOptions};
pub use quality::{
    AUTO_QUALITY_ID, AUTO_QUALITY_LABEL, LevelInfo, QualityLevel, current_level_label,
    quality_menu,
};
pub use session::{RecoveryPolicy, SessionState, SourceToken, StreamingSession};
pub use source::{
    PlaybackSource, SEGMENTED_MANIFEST_EXTENSION, SEGMENTED_MIME_TYPE, is_segmented_url,
};
pub use surface::{PlaybackSurface, SurfaceEvent};
pub use transcode::TranscodeStatus;
#[cfg(not(target_arch = "wasm32"))]
pub use transcode::{
    DEFAULT_TRANSCODE_POLL_INTERVAL, TranscodeEvent, TranscodeProbe, TranscodeWatcher,
    TranscodeWatcherHandle, poll_once,
};
pub use transport::{DEFAULT_VOLUME, TransportController};
pub use upload::{
    DEFAULT_CONTENT_TYPE, StorageStatus, UploadFacade, UploadRequest, UploadTicket, UrlSigner,
    cdn_manifest_url, sanitize_filename, upload_object_key,
};
