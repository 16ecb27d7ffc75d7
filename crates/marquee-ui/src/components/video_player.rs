//! Full-screen video player.
//!
//! The component owns a core [`Player`] bound to its `<video>` element and an
//! hls.js engine factory. DOM events and engine events are fed into the
//! player; after every call the player's snapshot is published to signals
//! that drive the overlay.
//!
//! Engine and refused-play callbacks are deferred to the next task so they
//! never re-enter the player while a command is running.

use std::cell::RefCell;
use std::rc::Rc;

use gloo_timers::future::TimeoutFuture;
use leptos::html;
use leptos::prelude::*;
use leptos::task::spawn_local;
use marquee_core::{
    PlaybackState, Player, PlayerConfig, PlayerOptions, QualityLevel, SessionState, SurfaceEvent,
};
use web_sys::{HtmlElement, HtmlMediaElement, HtmlVideoElement};

use super::icons;
use super::toast::NotificationContext;
use crate::hls::{EngineBinder, EngineSink, HlsEngineFactory};
use crate::router::Router;
use crate::video_surface::{RefusedPlay, VideoSurface, document_is_fullscreen};

/// Shown when the source is a manifest nothing in this browser can play.
pub const UNSUPPORTED_MESSAGE: &str = "This video format is not supported in this browser.";

/// A mounted player and the binder for the engines it creates.
#[derive(Clone)]
struct Mounted {
    player: Rc<RefCell<Player<VideoSurface>>>,
    binder: EngineBinder,
}

/// Copyable access to the mounted player from event handlers.
#[derive(Clone, Copy)]
struct PlayerHandle {
    slot: StoredValue<Option<Mounted>, LocalStorage>,
    set_state: WriteSignal<PlaybackState>,
    set_qualities: WriteSignal<Vec<QualityLevel>>,
    set_session: WriteSignal<SessionState>,
}

impl PlayerHandle {
    fn mounted(self) -> Option<Mounted> {
        self.slot.try_with_value(Clone::clone).flatten()
    }

    /// Run `f` against the player and publish the resulting state.
    ///
    /// Returns `None` before mount, after unmount, or if the player is busy.
    fn run<R>(self, f: impl FnOnce(&mut Player<VideoSurface>) -> R) -> Option<R> {
        let mounted = self.mounted()?;
        let Ok(mut player) = mounted.player.try_borrow_mut() else {
            leptos::logging::warn!("Player busy, dropping command");
            return None;
        };
        let result = f(&mut player);
        let state = player.snapshot();
        let qualities = player.qualities().to_vec();
        let session = player.session_state();
        drop(player);

        self.set_state.try_set(state);
        self.set_qualities.try_set(qualities);
        self.set_session.try_set(session);
        Some(result)
    }

    /// [`run`](Self::run) on the next task.
    fn run_later(self, f: impl FnOnce(&mut Player<VideoSurface>) + 'static) {
        spawn_local(async move {
            self.run(f);
        });
    }

    fn surface_event(self, event: SurfaceEvent) {
        self.run(|p| p.handle_surface_event(event));
    }

    fn install(self, video: HtmlVideoElement, container: HtmlElement, config: &PlayerConfig) {
        let sink: EngineSink = Rc::new(move |token, event| {
            self.run_later(move |p| {
                p.handle_engine_event(token, event);
            });
        });
        let refused: RefusedPlay = Rc::new(move || {
            self.run_later(|p| p.handle_surface_event(SurfaceEvent::Paused));
        });

        let media: HtmlMediaElement = video.clone().into();
        let factory = HlsEngineFactory::new(media, sink);
        let binder = factory.binder();
        let surface = VideoSurface::new(video, container, refused);
        let player = Player::new(surface, Box::new(factory), config);

        self.slot.set_value(Some(Mounted {
            player: Rc::new(RefCell::new(player)),
            binder,
        }));
    }

    /// Point the player at `url` and bind the engine it created, if any.
    fn load(self, url: &str) {
        let Some(token) = self.run(|p| p.set_source(url)) else {
            return;
        };
        if let Some(mounted) = self.mounted() {
            mounted.binder.bind(token);
        }
    }

    fn unmount(self) {
        if let Some(Some(mounted)) = self.slot.try_update_value(Option::take)
            && let Ok(mut player) = mounted.player.try_borrow_mut()
        {
            player.unload();
        }
    }
}

/// Value of the volume slider: muted shows as zero.
#[must_use]
pub fn volume_slider_value(state: &PlaybackState) -> f64 {
    if state.is_muted { 0.0 } else { state.volume }
}

/// Video player with auto-hiding controls, quality menu and back button.
#[component]
pub fn VideoPlayer(
    /// Media URL; a manifest URL streams adaptively.
    #[prop(into)]
    source_url: Signal<String>,
    /// Image shown before playback starts.
    #[prop(optional_no_strip)]
    poster_url: Option<String>,
    /// Title shown in the controls bar.
    #[prop(into)]
    title: String,
    /// Route the back button returns to, `/` by default.
    #[prop(optional, into)]
    back_target: Option<String>,
    /// Replaces the default back navigation; receives the back target.
    #[prop(optional)]
    on_back: Option<Callback<String>>,
) -> impl IntoView {
    let options = PlayerOptions {
        source_url: source_url.get_untracked(),
        poster_url,
        title,
        back_target,
    };
    let back = options.back_target().to_string();
    let config = PlayerConfig::default();

    let video_ref = NodeRef::<html::Video>::new();
    let container_ref = NodeRef::<html::Div>::new();

    let (state, set_state) = signal(PlaybackState::default());
    let (qualities, set_qualities) = signal(vec![QualityLevel::auto()]);
    let (session, set_session) = signal(SessionState::Uninitialized);
    let (menu_open, set_menu_open) = signal(false);

    let handle = PlayerHandle {
        slot: StoredValue::new_local(None),
        set_state,
        set_qualities,
        set_session,
    };

    Effect::new(move |_| {
        let url = source_url.get();
        if handle.mounted().is_none() {
            let (Some(video), Some(container)) = (video_ref.get(), container_ref.get()) else {
                return;
            };
            handle.install(video, container.into(), &config);
        }
        handle.load(&url);
    });

    let notifications = use_context::<NotificationContext>();
    Effect::new(move |previous: Option<SessionState>| {
        let current = session.get();
        if current == SessionState::Unsupported
            && previous != Some(SessionState::Unsupported)
            && let Some(ctx) = notifications
        {
            ctx.warning(UNSUPPORTED_MESSAGE);
        }
        current
    });

    on_cleanup(move || handle.unmount());

    let router = use_context::<Router>();
    let go_back = move |_| {
        if let Some(callback) = on_back {
            callback.run(back.clone());
        } else if let Some(router) = router {
            router.navigate_to_path(&back);
        } else if let Err(e) = window().location().set_href(&back) {
            leptos::logging::error!("Back navigation failed: {:?}", e);
        }
    };

    let on_pointer_move = move |_| {
        let Some((ticket, delay)) = handle.run(|p| (p.pointer_moved(), p.hide_delay())) else {
            return;
        };
        spawn_local(async move {
            TimeoutFuture::new(delay.as_millis() as u32).await;
            handle.run(|p| p.hide_delay_elapsed(ticket));
        });
    };

    let controls_hidden = move || !state.get().controls_visible;
    let is_playing = move || state.get().is_playing;

    view! {
        <div
            class="player"
            class:controls-hidden=controls_hidden
            node_ref=container_ref
            on:mousemove=on_pointer_move
            on:mouseleave=move |_| {
                handle.run(Player::pointer_left);
            }
            on:fullscreenchange=move |_| {
                handle.surface_event(SurfaceEvent::FullscreenChanged(document_is_fullscreen()));
            }
            data-testid="video-player"
        >
            <video
                class="player-video"
                node_ref=video_ref
                poster=options.poster_url.clone()
                playsinline=true
                on:click=move |_| {
                    handle.run(Player::toggle_play);
                }
                on:timeupdate=move |_| handle.surface_event(SurfaceEvent::TimeUpdate)
                on:playing=move |_| handle.surface_event(SurfaceEvent::Playing)
                on:pause=move |_| handle.surface_event(SurfaceEvent::Paused)
                on:ended=move |_| handle.surface_event(SurfaceEvent::Ended)
            />

            <div class="player-top">
                <button class="icon-button player-back" aria-label="Back" on:click=go_back>
                    <svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor">
                        <path d=icons::BACK />
                    </svg>
                </button>
            </div>

            <Show when=move || !is_playing()>
                <div class="player-paused">
                    <div class="player-big-play">
                        <svg viewBox="0 0 24 24" width="48" height="48" fill="currentColor">
                            <path d=icons::PLAY />
                        </svg>
                    </div>
                </div>
            </Show>

            <Show when=move || session.get() == SessionState::Unsupported>
                <div class="player-message" role="alert">{UNSUPPORTED_MESSAGE}</div>
            </Show>

            <div class="player-controls">
                <input
                    class="player-progress"
                    type="range"
                    min="0"
                    max="100"
                    step="0.1"
                    aria-label="Seek"
                    prop:value=move || state.get().progress_percent
                    on:input=move |ev| {
                        if let Ok(percent) = event_target_value(&ev).parse::<f64>() {
                            handle.run(|p| p.seek(percent));
                        }
                    }
                />

                <div class="player-bar">
                    <div class="player-bar-left">
                        <button
                            class="icon-button"
                            aria-label=move || if is_playing() { "Pause" } else { "Play" }
                            on:click=move |_| {
                                handle.run(Player::toggle_play);
                            }
                        >
                            <svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor">
                                <path d=move || if is_playing() { icons::PAUSE } else { icons::PLAY } />
                            </svg>
                        </button>

                        <div class="player-volume">
                            <button
                                class="icon-button"
                                aria-label="Mute"
                                on:click=move |_| {
                                    handle.run(Player::toggle_mute);
                                }
                            >
                                <svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor">
                                    <path d=move || {
                                        if state.get().is_muted { icons::VOLUME_OFF } else { icons::VOLUME }
                                    } />
                                </svg>
                            </button>
                            <input
                                class="player-volume-slider"
                                type="range"
                                min="0"
                                max="1"
                                step="0.01"
                                aria-label="Volume"
                                prop:value=move || volume_slider_value(&state.get())
                                on:input=move |ev| {
                                    if let Ok(level) = event_target_value(&ev).parse::<f64>() {
                                        handle.run(|p| p.set_volume(level));
                                    }
                                }
                            />
                        </div>

                        <h2 class="player-title">{options.title.clone()}</h2>
                    </div>

                    <div class="player-bar-right">
                        <div class="quality-menu-anchor">
                            <button
                                class="icon-button"
                                aria-label="Quality"
                                on:click=move |_| set_menu_open.update(|open| *open = !*open)
                            >
                                <svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor">
                                    <path d=icons::SETTINGS />
                                </svg>
                            </button>
                            <Show when=move || menu_open.get()>
                                <div class="quality-menu" role="menu">
                                    <div class="quality-menu-label">"Quality (Adaptive Bitrate)"</div>
                                    <For
                                        each=move || qualities.get()
                                        key=|level| level.id
                                        children=move |level| {
                                            let id = level.id;
                                            view! {
                                                <button
                                                    class="quality-menu-item"
                                                    role="menuitemradio"
                                                    class:selected=move || state.get().selected_quality_id == id
                                                    on:click=move |_| {
                                                        handle.run(|p| p.select_quality(id));
                                                        set_menu_open.set(false);
                                                    }
                                                >
                                                    {level.label}
                                                </button>
                                            }
                                        }
                                    />
                                    <div class="quality-menu-current">
                                        "Current: " {move || state.get().current_quality_label}
                                    </div>
                                </div>
                            </Show>
                        </div>

                        <button
                            class="icon-button"
                            aria-label="Fullscreen"
                            on:click=move |_| {
                                handle.run(Player::toggle_fullscreen);
                            }
                        >
                            <svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor">
                                <path d=move || {
                                    if state.get().is_fullscreen { icons::FULLSCREEN_EXIT } else { icons::FULLSCREEN }
                                } />
                            </svg>
                        </button>
                    </div>
                </div>
            </div>
        </div>
    }
}
