//! Player facade.
//!
//! [`Player`] is the single owner of a playback surface. It composes the
//! streaming session, the transport controller and the controls visibility
//! timer, and exposes the combined view as a [`PlaybackState`] snapshot for
//! the UI to render.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::PlayerConfig;
use crate::controls::{ControlsVisibility, HideTicket};
use crate::engine::{EngineEvent, EngineFactory};
use crate::quality::{AUTO_QUALITY_ID, AUTO_QUALITY_LABEL, QualityLevel};
use crate::session::{SessionState, SourceToken, StreamingSession};
use crate::source::PlaybackSource;
use crate::surface::{PlaybackSurface, SurfaceEvent};
use crate::transport::{DEFAULT_VOLUME, TransportController};

/// Route the back button returns to when none is given.
pub const DEFAULT_BACK_TARGET: &str = "/";

/// Everything the player UI renders, as one value.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PlaybackState {
    /// Playback believed active.
    pub is_playing: bool,
    /// Position as a percentage of the duration.
    pub progress_percent: f64,
    /// Output volume in `[0, 1]`.
    pub volume: f64,
    /// Output muted.
    pub is_muted: bool,
    /// Container fullscreen.
    pub is_fullscreen: bool,
    /// Controls overlay shown.
    pub controls_visible: bool,
    /// Quality the user selected, `-1` for automatic.
    pub selected_quality_id: i32,
    /// Label of the level currently playing.
    pub current_quality_label: String,
}

impl Default for PlaybackState {
    fn default() -> Self {
        Self {
            is_playing: false,
            progress_percent: 0.0,
            volume: DEFAULT_VOLUME,
            is_muted: false,
            is_fullscreen: false,
            controls_visible: true,
            selected_quality_id: AUTO_QUALITY_ID,
            current_quality_label: AUTO_QUALITY_LABEL.to_string(),
        }
    }
}

/// Public configuration of the player component.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PlayerOptions {
    /// Media URL to play.
    pub source_url: String,
    /// Image shown before playback starts.
    #[serde(default)]
    pub poster_url: Option<String>,
    /// Title shown in the top bar.
    pub title: String,
    /// Route the back button navigates to.
    #[serde(default)]
    pub back_target: Option<String>,
}

impl PlayerOptions {
    /// Options for `source_url` titled `title`.
    pub fn new(source_url: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            poster_url: None,
            title: title.into(),
            back_target: None,
        }
    }

    /// Builder: set the poster image.
    #[must_use]
    pub fn with_poster_url(mut self, poster_url: impl Into<String>) -> Self {
        self.poster_url = Some(poster_url.into());
        self
    }

    /// Builder: set the back route.
    #[must_use]
    pub fn with_back_target(mut self, back_target: impl Into<String>) -> Self {
        self.back_target = Some(back_target.into());
        self
    }

    /// Back route, defaulting to `/`.
    #[must_use]
    pub fn back_target(&self) -> &str {
        self.back_target.as_deref().unwrap_or(DEFAULT_BACK_TARGET)
    }
}

/// A player bound to one surface.
#[derive(Debug)]
pub struct Player<S: PlaybackSurface> {
    surface: S,
    session: StreamingSession,
    transport: TransportController,
    controls: ControlsVisibility,
}

impl<S: PlaybackSurface> Player<S> {
    /// Create an idle player that owns `surface`.
    pub fn new(surface: S, factory: Box<dyn EngineFactory>, config: &PlayerConfig) -> Self {
        Self {
            surface,
            session: StreamingSession::new(factory, config),
            transport: TransportController::new(),
            controls: ControlsVisibility::new(config.controls_hide_delay()),
        }
    }

    /// Play `url`, replacing the current source.
    ///
    /// Setting the URL that is already loaded keeps the running session and
    /// returns its token, unless that session is dead. A destroyed or
    /// unsupported session is loaded again.
    pub fn set_source(&mut self, url: &str) -> SourceToken {
        let reusable = !matches!(
            self.session.state(),
            SessionState::Uninitialized | SessionState::Destroyed | SessionState::Unsupported
        );
        if reusable && self.session.source().is_some_and(|source| source.url == url)
        {
            debug!("Source unchanged: {}", url);
            return self.session.token();
        }

        info!("Setting source: {}", url);
        self.transport.reset(&mut self.surface);
        self.controls.reset();
        self.session
            .load(PlaybackSource::resolve(url), &mut self.surface)
    }

    /// Release the engine, e.g. when the player unmounts.
    pub fn unload(&mut self) {
        self.session.unload();
        self.controls.reset();
    }

    /// Forward an engine callback registered under `token`.
    pub fn handle_engine_event(&mut self, token: SourceToken, event: EngineEvent) -> bool {
        self.session.handle_event(token, event)
    }

    /// Forward a native surface event.
    pub fn handle_surface_event(&mut self, event: SurfaceEvent) {
        self.transport.handle_event(&self.surface, event);
    }

    /// Play or pause.
    pub fn toggle_play(&mut self) {
        self.transport.toggle_play(&mut self.surface);
    }

    /// Seek to a percentage of the duration.
    pub fn seek(&mut self, percent: f64) {
        self.transport.seek(&mut self.surface, percent);
    }

    /// Set the output volume.
    pub fn set_volume(&mut self, level: f64) {
        self.transport.set_volume(&mut self.surface, level);
    }

    /// Mute or unmute.
    pub fn toggle_mute(&mut self) {
        self.transport.toggle_mute(&mut self.surface);
    }

    /// Enter or leave fullscreen.
    pub fn toggle_fullscreen(&mut self) {
        self.transport.toggle_fullscreen(&mut self.surface);
    }

    /// Pick a quality menu entry.
    pub fn select_quality(&mut self, id: i32) -> bool {
        self.session.select_quality(id)
    }

    /// Pointer moved over the player. The host should call
    /// [`hide_delay_elapsed`](Self::hide_delay_elapsed) with the returned
    /// ticket after [`hide_delay`](Self::hide_delay).
    pub fn pointer_moved(&mut self) -> HideTicket {
        self.controls.pointer_moved()
    }

    /// Pointer left the player.
    pub fn pointer_left(&mut self) {
        self.controls.pointer_left(self.transport.is_playing());
    }

    /// A controls countdown fired.
    pub fn hide_delay_elapsed(&mut self, ticket: HideTicket) -> bool {
        self.controls
            .hide_delay_elapsed(ticket, self.transport.is_playing())
    }

    /// Inactivity delay before the controls hide.
    #[must_use]
    pub const fn hide_delay(&self) -> std::time::Duration {
        self.controls.hide_delay()
    }

    /// Current render state.
    #[must_use]
    pub fn snapshot(&self) -> PlaybackState {
        PlaybackState {
            is_playing: self.transport.is_playing(),
            progress_percent: self.transport.progress_percent(),
            volume: self.transport.volume(),
            is_muted: self.transport.is_muted(),
            is_fullscreen: self.transport.is_fullscreen(),
            controls_visible: self.controls.is_visible(),
            selected_quality_id: self.session.selected_quality_id(),
            current_quality_label: self.session.current_quality_label().to_string(),
        }
    }

    /// Quality menu entries.
    #[must_use]
    pub fn qualities(&self) -> &[QualityLevel] {
        self.session.qualities()
    }

    /// Streaming session state.
    #[must_use]
    pub const fn session_state(&self) -> SessionState {
        self.session.state()
    }

    /// Source currently loaded.
    #[must_use]
    pub const fn source(&self) -> Option<&PlaybackSource> {
        self.session.source()
    }

    /// The owned surface.
    #[must_use]
    pub const fn surface(&self) -> &S {
        &self.surface
    }
}
