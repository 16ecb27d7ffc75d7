//! Playback surface interface.
//!
//! A surface is the media element plus the container it lives in. The player
//! relays user intent to it and mirrors its native events back into
//! [`PlaybackState`](crate::player::PlaybackState).

use serde::{Deserialize, Serialize};

/// Commands and queries the player issues against a playback surface.
#[cfg_attr(test, mockall::automock)]
pub trait PlaybackSurface {
    /// Point the surface directly at a URL (no adaptive engine).
    fn set_source(&mut self, url: &str);

    /// Whether the surface can play segmented manifests without an engine.
    fn can_play_segmented_natively(&self) -> bool;

    /// Start playback. Completion or refusal arrives as a later event.
    fn play(&mut self);

    /// Pause playback.
    fn pause(&mut self);

    /// Current position in seconds.
    fn current_time(&self) -> f64;

    /// Media duration in seconds, `None` until metadata has loaded.
    fn duration(&self) -> Option<f64>;

    /// Jump to an absolute position in seconds.
    fn seek_to(&mut self, seconds: f64);

    /// Set output volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f64);

    /// Set the mute flag.
    fn set_muted(&mut self, muted: bool);

    /// Ask the platform to make the container fullscreen.
    fn request_fullscreen(&mut self);

    /// Leave fullscreen.
    fn exit_fullscreen(&mut self);
}

/// Native events a surface reports back.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "data")]
pub enum SurfaceEvent {
    /// Playback position advanced.
    TimeUpdate,
    /// Playback actually started.
    Playing,
    /// Playback paused (including a refused `play`).
    Paused,
    /// Playback reached the end.
    Ended,
    /// Fullscreen state changed outside the player's control.
    FullscreenChanged(bool),
}

/// Returns the duration if it is usable for progress arithmetic.
pub(crate) fn known_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|d| d.is_finite() && *d > 0.0)
}
