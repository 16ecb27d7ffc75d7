//! Streaming session controller.
//!
//! Binds at most one adaptive engine to one playback surface for the
//! lifetime of a source. The session is an explicit state machine:
//!
//! ```text
//! Uninitialized --load(segmented, engine)--> Loading --manifest--> Ready
//! Uninitialized --load(segmented, native)--> NativeFallback
//! Uninitialized --load(segmented, none)----> Unsupported
//! Uninitialized --load(progressive)--------> Direct
//! Loading/Ready --fatal other error--------> Destroyed
//! any           --load / unload / drop-----> engine released first
//! ```
//!
//! Every `load` issues a fresh [`SourceToken`]. Engine callbacks are
//! forwarded together with the token they were registered under, so events
//! from a released engine can never reach the state of its successor.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::config::PlayerConfig;
use crate::engine::{AdaptiveEngine, EngineConfig, EngineError, EngineEvent, EngineFactory, ErrorCategory};
use crate::quality::{
    AUTO_QUALITY_ID, AUTO_QUALITY_LABEL, LevelInfo, QualityLevel, current_level_label,
    quality_menu,
};
use crate::source::PlaybackSource;
use crate::surface::PlaybackSurface;

/// Identifies one `load` of the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct SourceToken(u64);

/// Position of the session in its state machine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No source assigned.
    #[default]
    Uninitialized,
    /// Engine created and attached, manifest loading.
    Loading,
    /// Manifest parsed, quality levels known.
    Ready,
    /// Segmented source played natively by the surface.
    NativeFallback,
    /// Progressive source played directly by the surface.
    Direct,
    /// Segmented source with neither engine nor native support.
    Unsupported,
    /// Engine torn down after an unrecoverable error.
    Destroyed,
}

impl SessionState {
    /// Whether an engine instance is live in this state.
    #[must_use]
    pub const fn has_engine(self) -> bool {
        matches!(self, Self::Loading | Self::Ready)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Uninitialized => "uninitialized",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::NativeFallback => "native-fallback",
            Self::Direct => "direct",
            Self::Unsupported => "unsupported",
            Self::Destroyed => "destroyed",
        };
        write!(f, "{name}")
    }
}

/// How many automatic recoveries a session attempts in a row.
///
/// The budget refills once the engine shows it is playing again, so every
/// fatal error that follows a recovery gets its own attempt.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct RecoveryPolicy {
    /// Reload attempts after fatal network errors.
    #[serde(default = "default_budget")]
    pub network_retries: u32,
    /// In-place recovery attempts after fatal media errors.
    #[serde(default = "default_budget")]
    pub media_recoveries: u32,
}

const fn default_budget() -> u32 {
    1
}

impl Default for RecoveryPolicy {
    fn default() -> Self {
        Self {
            network_retries: default_budget(),
            media_recoveries: default_budget(),
        }
    }
}

/// The streaming session controller.
pub struct StreamingSession {
    factory: Box<dyn EngineFactory>,
    engine_config: EngineConfig,
    recovery: RecoveryPolicy,
    sort_levels: bool,
    engine: Option<Box<dyn AdaptiveEngine>>,
    state: SessionState,
    source: Option<PlaybackSource>,
    token: SourceToken,
    levels: Vec<LevelInfo>,
    qualities: Vec<QualityLevel>,
    selected_quality_id: i32,
    current_quality_label: String,
    network_retries_used: u32,
    media_recoveries_used: u32,
}

impl fmt::Debug for StreamingSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamingSession")
            .field("state", &self.state)
            .field("source", &self.source)
            .field("token", &self.token)
            .field("qualities", &self.qualities)
            .field("selected_quality_id", &self.selected_quality_id)
            .field("current_quality_label", &self.current_quality_label)
            .finish_non_exhaustive()
    }
}

impl StreamingSession {
    /// Create an idle session that will build engines with `factory`.
    pub fn new(factory: Box<dyn EngineFactory>, config: &PlayerConfig) -> Self {
        Self {
            factory,
            engine_config: config.engine.clone(),
            recovery: config.recovery,
            sort_levels: config.sort_levels,
            engine: None,
            state: SessionState::Uninitialized,
            source: None,
            token: SourceToken::default(),
            levels: Vec::new(),
            qualities: vec![QualityLevel::auto()],
            selected_quality_id: AUTO_QUALITY_ID,
            current_quality_label: AUTO_QUALITY_LABEL.to_string(),
            network_retries_used: 0,
            media_recoveries_used: 0,
        }
    }

    /// Current state.
    #[must_use]
    pub const fn state(&self) -> SessionState {
        self.state
    }

    /// Token of the current load.
    #[must_use]
    pub const fn token(&self) -> SourceToken {
        self.token
    }

    /// The source of the current load, if any.
    #[must_use]
    pub const fn source(&self) -> Option<&PlaybackSource> {
        self.source.as_ref()
    }

    /// Quality menu, automatic entry first.
    #[must_use]
    pub fn qualities(&self) -> &[QualityLevel] {
        &self.qualities
    }

    /// Id of the menu entry the user selected.
    #[must_use]
    pub const fn selected_quality_id(&self) -> i32 {
        self.selected_quality_id
    }

    /// Label of the level currently playing.
    #[must_use]
    pub fn current_quality_label(&self) -> &str {
        &self.current_quality_label
    }

    /// Assign a new source, releasing whatever the previous one held.
    pub fn load<S>(&mut self, source: PlaybackSource, surface: &mut S) -> SourceToken
    where
        S: PlaybackSurface + ?Sized,
    {
        self.release_engine();
        self.reset_quality();
        self.refill_recovery_budget();
        self.token = SourceToken(self.token.0.wrapping_add(1));

        self.state = if source.is_segmented {
            if self.factory.is_supported() {
                let mut engine = self.factory.create(&self.engine_config);
                engine.load_source(&source.url);
                engine.attach_media();
                self.engine = Some(engine);
                SessionState::Loading
            } else if surface.can_play_segmented_natively() {
                surface.set_source(&source.url);
                SessionState::NativeFallback
            } else {
                warn!(
                    "No adaptive engine or native support for segmented source {}",
                    source.url
                );
                SessionState::Unsupported
            }
        } else {
            surface.set_source(&source.url);
            SessionState::Direct
        };

        info!("Session {} for {}", self.state, source.url);
        self.source = Some(source);
        self.token
    }

    /// Release the engine on unmount. The session can be loaded again.
    pub fn unload(&mut self) {
        self.release_engine();
        self.reset_quality();
        self.source = None;
        self.state = SessionState::Uninitialized;
        // Outstanding callbacks belong to the released engine.
        self.token = SourceToken(self.token.0.wrapping_add(1));
    }

    /// Apply an engine event. Returns whether the event was accepted.
    pub fn handle_event(&mut self, token: SourceToken, event: EngineEvent) -> bool {
        if token != self.token || !self.state.has_engine() || self.engine.is_none() {
            debug!("Ignoring engine event in state {}: {:?}", self.state, event);
            return false;
        }

        match event {
            EngineEvent::ManifestParsed { levels } => {
                info!("Manifest parsed, found {} quality levels", levels.len());
                self.qualities = quality_menu(&levels, self.sort_levels);
                self.levels = levels;
                self.state = SessionState::Ready;
                self.refill_recovery_budget();
                true
            }
            EngineEvent::LevelSwitched { level } => {
                let switched = self.on_level_switched(level);
                if switched {
                    self.refill_recovery_budget();
                }
                switched
            }
            EngineEvent::Error(err) => {
                self.on_engine_error(&err);
                true
            }
        }
    }

    /// Select a quality menu entry. The playing label follows asynchronously
    /// through the next level-switch event.
    pub fn select_quality(&mut self, id: i32) -> bool {
        if !self.qualities.iter().any(|q| q.id == id) {
            warn!("Ignoring unknown quality level {}", id);
            return false;
        }

        self.selected_quality_id = id;
        if let Some(engine) = self.engine.as_mut() {
            engine.set_current_level(id);
        }
        true
    }

    fn on_level_switched(&mut self, level: usize) -> bool {
        if self.state != SessionState::Ready {
            debug!("Level switch to {} before manifest was parsed", level);
            return false;
        }
        let Some(info) = self.levels.get(level) else {
            debug!("Level switch to unknown level {}", level);
            return false;
        };
        let auto_enabled = self
            .engine
            .as_ref()
            .is_some_and(|engine| engine.auto_level_enabled());
        self.current_quality_label = current_level_label(info, auto_enabled);
        debug!("Switched to {}", self.current_quality_label);
        true
    }

    fn on_engine_error(&mut self, err: &EngineError) {
        if !err.fatal {
            debug!("Non-fatal {} error: {}", err.category, err.details);
            return;
        }

        match err.category {
            ErrorCategory::Network => {
                if self.network_retries_used < self.recovery.network_retries {
                    self.network_retries_used += 1;
                    error!("Network error ({}), attempting to recover...", err.details);
                    if let Some(engine) = self.engine.as_mut() {
                        engine.start_load();
                    }
                } else {
                    warn!(
                        "Network error ({}), retry budget exhausted; playback stalled",
                        err.details
                    );
                }
            }
            ErrorCategory::Media => {
                if self.media_recoveries_used < self.recovery.media_recoveries {
                    self.media_recoveries_used += 1;
                    error!("Media error ({}), attempting to recover...", err.details);
                    if let Some(engine) = self.engine.as_mut() {
                        engine.recover_media_error();
                    }
                } else {
                    warn!(
                        "Media error ({}), recovery budget exhausted; playback stalled",
                        err.details
                    );
                }
            }
            ErrorCategory::Other => {
                error!("Fatal error ({}), cannot recover", err.details);
                self.release_engine();
                self.state = SessionState::Destroyed;
            }
        }
    }

    fn refill_recovery_budget(&mut self) {
        self.network_retries_used = 0;
        self.media_recoveries_used = 0;
    }

    fn reset_quality(&mut self) {
        self.levels.clear();
        self.qualities = vec![QualityLevel::auto()];
        self.selected_quality_id = AUTO_QUALITY_ID;
        self.current_quality_label = AUTO_QUALITY_LABEL.to_string();
    }

    fn release_engine(&mut self) {
        if let Some(mut engine) = self.engine.take() {
            debug!("Destroying adaptive engine");
            engine.destroy();
        }
    }
}

impl Drop for StreamingSession {
    fn drop(&mut self) {
        self.release_engine();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use crate::engine::{MockAdaptiveEngine, MockEngineFactory};
    use crate::surface::MockPlaybackSurface;

    const MANIFEST: &str = "https://cdn.example.com/assets/1/HLS/movie.m3u8";

    fn ladder() -> Vec<LevelInfo> {
        vec![
            LevelInfo {
                height: 360,
                bitrate: 800_000,
            },
            LevelInfo {
                height: 720,
                bitrate: 2_800_000,
            },
            LevelInfo {
                height: 1080,
                bitrate: 5_000_000,
            },
        ]
    }

    /// Engine that expects to be loaded, attached and destroyed exactly once.
    fn attached_engine() -> MockAdaptiveEngine {
        let mut engine = MockAdaptiveEngine::new();
        engine
            .expect_load_source()
            .withf(|url| url == MANIFEST)
            .times(1)
            .return_const(());
        engine.expect_attach_media().times(1).return_const(());
        engine.expect_destroy().times(1).return_const(());
        engine
    }

    fn factory_with(engine: MockAdaptiveEngine) -> Box<dyn EngineFactory> {
        let mut factory = MockEngineFactory::new();
        factory.expect_is_supported().return_const(true);
        factory
            .expect_create()
            .times(1)
            .return_once(move |_| -> Box<dyn AdaptiveEngine> { Box::new(engine) });
        Box::new(factory)
    }

    fn unsupported_factory() -> Box<dyn EngineFactory> {
        let mut factory = MockEngineFactory::new();
        factory.expect_is_supported().return_const(false);
        factory.expect_create().never();
        Box::new(factory)
    }

    fn loaded_session(engine: MockAdaptiveEngine) -> (StreamingSession, SourceToken) {
        let mut session = StreamingSession::new(factory_with(engine), &PlayerConfig::default());
        let mut surface = MockPlaybackSurface::new();
        surface.expect_set_source().never();
        let token = session.load(PlaybackSource::resolve(MANIFEST), &mut surface);
        (session, token)
    }

    #[test]
    fn test_segmented_source_with_engine_is_loading() {
        let (session, _) = loaded_session(attached_engine());
        assert_eq!(session.state(), SessionState::Loading);
        assert_eq!(session.qualities(), &[QualityLevel::auto()]);
        assert_eq!(session.current_quality_label(), "Auto");
    }

    #[test]
    fn test_segmented_source_native_fallback() {
        let mut session = StreamingSession::new(unsupported_factory(), &PlayerConfig::default());
        let mut surface = MockPlaybackSurface::new();
        surface
            .expect_can_play_segmented_natively()
            .return_const(true);
        surface
            .expect_set_source()
            .withf(|url| url == MANIFEST)
            .times(1)
            .return_const(());

        session.load(PlaybackSource::resolve(MANIFEST), &mut surface);
        assert_eq!(session.state(), SessionState::NativeFallback);
    }

    #[test]
    fn test_segmented_source_without_any_support() {
        let mut session = StreamingSession::new(unsupported_factory(), &PlayerConfig::default());
        let mut surface = MockPlaybackSurface::new();
        surface
            .expect_can_play_segmented_natively()
            .return_const(false);
        surface.expect_set_source().never();

        session.load(PlaybackSource::resolve(MANIFEST), &mut surface);
        assert_eq!(session.state(), SessionState::Unsupported);
    }

    #[test]
    fn test_progressive_source_is_direct() {
        let mut factory = MockEngineFactory::new();
        factory.expect_is_supported().never();
        factory.expect_create().never();
        let mut session = StreamingSession::new(Box::new(factory), &PlayerConfig::default());
        let mut surface = MockPlaybackSurface::new();
        surface
            .expect_set_source()
            .withf(|url| url == "movie.mp4")
            .times(1)
            .return_const(());

        session.load(PlaybackSource::resolve("movie.mp4"), &mut surface);
        assert_eq!(session.state(), SessionState::Direct);
    }

    #[test]
    fn test_manifest_parsed_builds_quality_menu() {
        let (mut session, token) = loaded_session(attached_engine());

        assert!(session.handle_event(token, EngineEvent::ManifestParsed { levels: ladder() }));

        assert_eq!(session.state(), SessionState::Ready);
        let qualities = session.qualities();
        assert_eq!(qualities.len(), 4);
        assert_eq!(qualities[0], QualityLevel::auto());
        assert_eq!(qualities[1].id, 0);
        assert_eq!(qualities[1].label, "360p (800 kbps)");
        assert_eq!(qualities[3].id, 2);
    }

    #[test]
    fn test_level_switch_labels_follow_auto_mode() {
        let mut engine = attached_engine();
        let mut auto = vec![true, false].into_iter();
        engine
            .expect_auto_level_enabled()
            .times(2)
            .returning(move || auto.next().unwrap_or(false));
        let (mut session, token) = loaded_session(engine);
        session.handle_event(token, EngineEvent::ManifestParsed { levels: ladder() });

        session.handle_event(token, EngineEvent::LevelSwitched { level: 1 });
        assert_eq!(session.current_quality_label(), "Auto (720p)");

        session.handle_event(token, EngineEvent::LevelSwitched { level: 2 });
        assert_eq!(session.current_quality_label(), "1080p");
    }

    #[test]
    fn test_level_switch_to_unknown_index_ignored() {
        let (mut session, token) = loaded_session(attached_engine());
        session.handle_event(token, EngineEvent::ManifestParsed { levels: ladder() });

        assert!(!session.handle_event(token, EngineEvent::LevelSwitched { level: 9 }));
        assert_eq!(session.current_quality_label(), "Auto");
    }

    #[test]
    fn test_select_quality_is_fire_and_forget() {
        let mut engine = attached_engine();
        engine
            .expect_set_current_level()
            .with(mockall::predicate::eq(2))
            .times(1)
            .return_const(());
        engine
            .expect_set_current_level()
            .with(mockall::predicate::eq(AUTO_QUALITY_ID))
            .times(1)
            .return_const(());
        let (mut session, token) = loaded_session(engine);
        session.handle_event(token, EngineEvent::ManifestParsed { levels: ladder() });

        assert!(session.select_quality(2));
        assert_eq!(session.selected_quality_id(), 2);
        // Label only changes on the engine's level switch.
        assert_eq!(session.current_quality_label(), "Auto");

        assert!(session.select_quality(AUTO_QUALITY_ID));
        assert_eq!(session.selected_quality_id(), AUTO_QUALITY_ID);
    }

    #[test]
    fn test_select_unknown_quality_rejected() {
        let mut engine = attached_engine();
        engine.expect_set_current_level().never();
        let (mut session, _) = loaded_session(engine);

        assert!(!session.select_quality(3));
        assert_eq!(session.selected_quality_id(), AUTO_QUALITY_ID);
    }

    #[test]
    fn test_fatal_network_error_reloads_once() {
        let mut engine = attached_engine();
        engine.expect_start_load().times(1).return_const(());
        let (mut session, token) = loaded_session(engine);

        let err = EngineError::fatal(ErrorCategory::Network, "fragLoadError");
        session.handle_event(token, EngineEvent::Error(err.clone()));
        assert_eq!(session.state(), SessionState::Loading);

        // Budget exhausted: stalls without another reload.
        session.handle_event(token, EngineEvent::Error(err));
        assert_eq!(session.state(), SessionState::Loading);
    }

    #[test]
    fn test_each_recovered_fatal_error_gets_its_own_attempt() {
        let mut engine = attached_engine();
        engine.expect_start_load().times(2).return_const(());
        engine.expect_recover_media_error().times(2).return_const(());
        engine.expect_auto_level_enabled().return_const(true);
        let (mut session, token) = loaded_session(engine);
        session.handle_event(token, EngineEvent::ManifestParsed { levels: ladder() });

        let network = EngineError::fatal(ErrorCategory::Network, "fragLoadError");
        session.handle_event(token, EngineEvent::Error(network.clone()));
        assert!(session.handle_event(token, EngineEvent::LevelSwitched { level: 1 }));
        session.handle_event(token, EngineEvent::Error(network));

        let media = EngineError::fatal(ErrorCategory::Media, "bufferStalledError");
        session.handle_event(token, EngineEvent::Error(media.clone()));
        session.handle_event(token, EngineEvent::LevelSwitched { level: 2 });
        session.handle_event(token, EngineEvent::Error(media.clone()));
        // Back to back without a recovery in between: stalls.
        session.handle_event(token, EngineEvent::Error(media));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_fatal_media_error_recovers_once() {
        let mut engine = attached_engine();
        engine.expect_recover_media_error().times(1).return_const(());
        let (mut session, token) = loaded_session(engine);
        session.handle_event(token, EngineEvent::ManifestParsed { levels: ladder() });

        let err = EngineError::fatal(ErrorCategory::Media, "bufferAppendError");
        session.handle_event(token, EngineEvent::Error(err.clone()));
        session.handle_event(token, EngineEvent::Error(err));
        assert_eq!(session.state(), SessionState::Ready);
    }

    #[test]
    fn test_non_fatal_error_ignored() {
        let mut engine = attached_engine();
        engine.expect_start_load().never();
        let (mut session, token) = loaded_session(engine);

        session.handle_event(
            token,
            EngineEvent::Error(EngineError::recoverable(ErrorCategory::Network, "levelLoadTimeOut")),
        );
        assert_eq!(session.state(), SessionState::Loading);
    }

    #[test]
    fn test_fatal_other_error_destroys_engine_once() {
        let (mut session, token) = loaded_session(attached_engine());

        session.handle_event(
            token,
            EngineEvent::Error(EngineError::fatal(ErrorCategory::Other, "keySystemError")),
        );
        assert_eq!(session.state(), SessionState::Destroyed);

        // Inert afterwards; the drop below must not destroy a second time.
        assert!(!session.handle_event(token, EngineEvent::ManifestParsed { levels: ladder() }));
        assert!(!session.handle_event(token, EngineEvent::LevelSwitched { level: 0 }));
        assert_eq!(session.state(), SessionState::Destroyed);
        drop(session);
    }

    #[test]
    fn test_reload_releases_previous_engine_and_ignores_stale_events() {
        let first = attached_engine();
        let second = attached_engine();
        let mut engines = vec![second, first];

        let mut factory = MockEngineFactory::new();
        factory.expect_is_supported().return_const(true);
        factory
            .expect_create()
            .times(2)
            .returning(move |_| -> Box<dyn AdaptiveEngine> {
                Box::new(engines.pop().expect("two engines"))
            });
        let mut session = StreamingSession::new(Box::new(factory), &PlayerConfig::default());
        let mut surface = MockPlaybackSurface::new();

        let old = session.load(PlaybackSource::resolve(MANIFEST), &mut surface);
        session.handle_event(old, EngineEvent::ManifestParsed { levels: ladder() });
        let new = session.load(PlaybackSource::resolve(MANIFEST), &mut surface);

        assert_ne!(old, new);
        assert_eq!(session.qualities(), &[QualityLevel::auto()]);
        assert!(!session.handle_event(old, EngineEvent::ManifestParsed { levels: ladder() }));
        assert_eq!(session.state(), SessionState::Loading);
    }

    #[test]
    fn test_unload_releases_engine() {
        let (mut session, token) = loaded_session(attached_engine());
        session.unload();

        assert_eq!(session.state(), SessionState::Uninitialized);
        assert!(session.source().is_none());
        assert!(!session.handle_event(token, EngineEvent::ManifestParsed { levels: ladder() }));
    }

    #[test]
    fn test_custom_recovery_budget() {
        let mut engine = attached_engine();
        engine.expect_start_load().times(3).return_const(());
        let config = PlayerConfig {
            recovery: RecoveryPolicy {
                network_retries: 3,
                media_recoveries: 0,
            },
            ..PlayerConfig::default()
        };
        let mut session = StreamingSession::new(factory_with(engine), &config);
        let mut surface = MockPlaybackSurface::new();
        let token = session.load(PlaybackSource::resolve(MANIFEST), &mut surface);

        for _ in 0..5 {
            session.handle_event(
                token,
                EngineEvent::Error(EngineError::fatal(ErrorCategory::Network, "fragLoadError")),
            );
        }
    }
}
