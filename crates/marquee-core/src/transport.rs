//! Playback transport: play/pause, seek, volume, mute and fullscreen.
//!
//! Commands update the local flags optimistically; surface events reconcile
//! them with what the media element actually did.

use tracing::debug;

use crate::surface::{PlaybackSurface, SurfaceEvent, known_duration};

/// Volume a fresh surface starts at.
pub const DEFAULT_VOLUME: f64 = 1.0;

/// Transport flags mirrored from the surface.
#[derive(Debug, Clone, PartialEq)]
pub struct TransportController {
    is_playing: bool,
    progress_percent: f64,
    volume: f64,
    is_muted: bool,
    is_fullscreen: bool,
}

impl Default for TransportController {
    fn default() -> Self {
        Self::new()
    }
}

impl TransportController {
    /// Create a controller in the initial (paused, full volume) state.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            is_playing: false,
            progress_percent: 0.0,
            volume: DEFAULT_VOLUME,
            is_muted: false,
            is_fullscreen: false,
        }
    }

    /// Whether playback is believed to be active.
    #[must_use]
    pub const fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Playback position as a percentage of the duration.
    #[must_use]
    pub const fn progress_percent(&self) -> f64 {
        self.progress_percent
    }

    /// Output volume in `[0, 1]`.
    #[must_use]
    pub const fn volume(&self) -> f64 {
        self.volume
    }

    /// Whether output is muted.
    #[must_use]
    pub const fn is_muted(&self) -> bool {
        self.is_muted
    }

    /// Whether the container is fullscreen.
    #[must_use]
    pub const fn is_fullscreen(&self) -> bool {
        self.is_fullscreen
    }

    /// Pause if playing, otherwise play.
    pub fn toggle_play<S: PlaybackSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.is_playing {
            surface.pause();
        } else {
            surface.play();
        }
        self.is_playing = !self.is_playing;
    }

    /// Seek to `percent` of the duration. No-op while the duration is unknown.
    pub fn seek<S: PlaybackSurface + ?Sized>(&mut self, surface: &mut S, percent: f64) {
        let Some(duration) = known_duration(surface.duration()) else {
            debug!("Seek to {}% ignored, duration unknown", percent);
            return;
        };
        if percent.is_nan() {
            return;
        }

        let percent = percent.clamp(0.0, 100.0);
        surface.seek_to(percent / 100.0 * duration);
        self.progress_percent = percent;
    }

    /// Set the output volume. Zero mutes, anything above unmutes.
    pub fn set_volume<S: PlaybackSurface + ?Sized>(&mut self, surface: &mut S, level: f64) {
        if level.is_nan() {
            return;
        }

        let level = level.clamp(0.0, 1.0);
        surface.set_volume(level);
        self.volume = level;
        self.is_muted = level == 0.0;
        surface.set_muted(self.is_muted);
    }

    /// Flip the mute flag, leaving the volume untouched.
    pub fn toggle_mute<S: PlaybackSurface + ?Sized>(&mut self, surface: &mut S) {
        self.is_muted = !self.is_muted;
        surface.set_muted(self.is_muted);
    }

    /// Enter fullscreen if windowed, otherwise leave it.
    pub fn toggle_fullscreen<S: PlaybackSurface + ?Sized>(&mut self, surface: &mut S) {
        if self.is_fullscreen {
            surface.exit_fullscreen();
        } else {
            surface.request_fullscreen();
        }
        self.is_fullscreen = !self.is_fullscreen;
    }

    /// Reconcile with a native surface event.
    pub fn handle_event<S: PlaybackSurface + ?Sized>(&mut self, surface: &S, event: SurfaceEvent) {
        match event {
            SurfaceEvent::TimeUpdate => {
                if let Some(duration) = known_duration(surface.duration()) {
                    self.progress_percent =
                        (surface.current_time() / duration * 100.0).clamp(0.0, 100.0);
                }
            }
            SurfaceEvent::Playing => self.is_playing = true,
            SurfaceEvent::Paused | SurfaceEvent::Ended => self.is_playing = false,
            SurfaceEvent::FullscreenChanged(fullscreen) => self.is_fullscreen = fullscreen,
        }
    }

    /// Return to the initial state and push volume and mute to the surface.
    pub fn reset<S: PlaybackSurface + ?Sized>(&mut self, surface: &mut S) {
        let is_fullscreen = self.is_fullscreen;
        *self = Self::new();
        // Fullscreen belongs to the container, not the source.
        self.is_fullscreen = is_fullscreen;
        surface.set_volume(self.volume);
        surface.set_muted(self.is_muted);
    }
}
