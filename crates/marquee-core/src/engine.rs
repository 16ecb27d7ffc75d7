//! Adaptive-bitrate engine interface.
//!
//! The streaming session drives the engine only through [`AdaptiveEngine`];
//! in the browser it is backed by hls.js, in tests by a mock. Engines report
//! back through [`EngineEvent`]s that the host forwards to the session
//! together with the [`SourceToken`](crate::session::SourceToken) they were
//! created under.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::quality::LevelInfo;

/// Engine tuning passed to [`EngineFactory::create`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineConfig {
    /// Demux transport streams in a web worker.
    #[serde(default = "default_true")]
    pub enable_worker: bool,
    /// Low-latency live mode.
    #[serde(default)]
    pub low_latency_mode: bool,
    /// Seconds of already-played media kept in the buffer.
    #[serde(default = "default_back_buffer")]
    pub back_buffer_length_secs: u32,
}

const fn default_true() -> bool {
    true
}

const fn default_back_buffer() -> u32 {
    90
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            enable_worker: true,
            low_latency_mode: false,
            back_buffer_length_secs: default_back_buffer(),
        }
    }
}

/// Operations the session needs from an adaptive engine instance.
///
/// Implementations are bound to a single playback surface at construction
/// time; `attach_media` wires the engine to it.
#[cfg_attr(test, mockall::automock)]
pub trait AdaptiveEngine {
    /// Begin loading the manifest at `url`.
    fn load_source(&mut self, url: &str);

    /// Attach the engine to its playback surface.
    fn attach_media(&mut self);

    /// Restart segment loading for the current source.
    fn start_load(&mut self);

    /// Attempt in-place recovery from a decode error.
    fn recover_media_error(&mut self);

    /// Pin the engine to `level`, or `-1` for automatic selection.
    fn set_current_level(&mut self, level: i32);

    /// Whether automatic level selection is active.
    fn auto_level_enabled(&self) -> bool;

    /// Release the engine and detach every listener it registered.
    fn destroy(&mut self);
}

/// Creates engines for a playback surface.
#[cfg_attr(test, mockall::automock)]
pub trait EngineFactory {
    /// Whether the platform supports the adaptive engine at all.
    fn is_supported(&self) -> bool;

    /// Create a new, unattached engine.
    fn create(&self, config: &EngineConfig) -> Box<dyn AdaptiveEngine>;
}

/// Error family reported by the engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub enum ErrorCategory {
    /// Manifest or segment fetch failed.
    Network,
    /// Demux/decode failure.
    Media,
    /// Anything else (key system, mux, internal).
    Other,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network => write!(f, "network"),
            Self::Media => write!(f, "media"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// An error event emitted by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EngineError {
    /// Error family.
    pub category: ErrorCategory,
    /// Whether the engine gave up on its own.
    pub fatal: bool,
    /// Engine-specific detail string.
    #[serde(default)]
    pub details: String,
}

impl EngineError {
    /// A fatal error of the given category.
    pub fn fatal(category: ErrorCategory, details: impl Into<String>) -> Self {
        Self {
            category,
            fatal: true,
            details: details.into(),
        }
    }

    /// A non-fatal error the engine will handle internally.
    pub fn recoverable(category: ErrorCategory, details: impl Into<String>) -> Self {
        Self {
            category,
            fatal: false,
            details: details.into(),
        }
    }
}

/// Events delivered from the engine to the session, in emission order.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "data")]
pub enum EngineEvent {
    /// The manifest was parsed and these renditions are available.
    ManifestParsed {
        /// Renditions in manifest order.
        levels: Vec<LevelInfo>,
    },
    /// The engine switched to the level at this index.
    LevelSwitched {
        /// Engine level index.
        level: usize,
    },
    /// The engine reported an error.
    Error(EngineError),
}
