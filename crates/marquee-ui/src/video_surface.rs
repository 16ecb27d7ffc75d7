//! `<video>` element as a [`PlaybackSurface`].

use std::rc::Rc;

use leptos::task::spawn_local;
use marquee_core::{PlaybackSurface, SEGMENTED_MIME_TYPE};
use wasm_bindgen_futures::JsFuture;
use web_sys::{HtmlElement, HtmlVideoElement};

/// Called when the browser refuses a `play()` request, e.g. autoplay policy.
pub type RefusedPlay = Rc<dyn Fn()>;

/// A video element plus the container that goes fullscreen.
pub struct VideoSurface {
    video: HtmlVideoElement,
    container: HtmlElement,
    on_refused: RefusedPlay,
}

impl VideoSurface {
    /// Wrap `video`, using `container` for fullscreen.
    pub fn new(video: HtmlVideoElement, container: HtmlElement, on_refused: RefusedPlay) -> Self {
        Self {
            video,
            container,
            on_refused,
        }
    }

    /// The wrapped element.
    #[must_use]
    pub const fn video(&self) -> &HtmlVideoElement {
        &self.video
    }
}

/// Whether any element of the document is fullscreen.
#[must_use]
pub fn document_is_fullscreen() -> bool {
    web_sys::window()
        .and_then(|w| w.document())
        .and_then(|d| d.fullscreen_element())
        .is_some()
}

impl PlaybackSurface for VideoSurface {
    fn set_source(&mut self, url: &str) {
        self.video.set_src(url);
    }

    fn can_play_segmented_natively(&self) -> bool {
        !self.video.can_play_type(SEGMENTED_MIME_TYPE).is_empty()
    }

    fn play(&mut self) {
        let refused = Rc::clone(&self.on_refused);
        match self.video.play() {
            Ok(promise) => spawn_local(async move {
                if let Err(e) = JsFuture::from(promise).await {
                    leptos::logging::warn!("play() refused: {:?}", e);
                    refused();
                }
            }),
            Err(e) => {
                leptos::logging::warn!("play() threw: {:?}", e);
                spawn_local(async move { refused() });
            }
        }
    }

    fn pause(&mut self) {
        if let Err(e) = self.video.pause() {
            leptos::logging::warn!("pause() threw: {:?}", e);
        }
    }

    fn current_time(&self) -> f64 {
        self.video.current_time()
    }

    fn duration(&self) -> Option<f64> {
        let duration = self.video.duration();
        (!duration.is_nan()).then_some(duration)
    }

    fn seek_to(&mut self, seconds: f64) {
        self.video.set_current_time(seconds);
    }

    fn set_volume(&mut self, volume: f64) {
        self.video.set_volume(volume);
    }

    fn set_muted(&mut self, muted: bool) {
        self.video.set_muted(muted);
    }

    fn request_fullscreen(&mut self) {
        if let Err(e) = self.container.request_fullscreen() {
            leptos::logging::warn!("requestFullscreen failed: {:?}", e);
        }
    }

    fn exit_fullscreen(&mut self) {
        if !document_is_fullscreen() {
            return;
        }
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            document.exit_fullscreen();
        }
    }
}
