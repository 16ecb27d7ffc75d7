//! hls.js bindings.
//!
//! [`HlsEngineFactory`] backs the core [`EngineFactory`] with the global
//! `Hls` class loaded from `index.html`. Engine events are forwarded to an
//! [`EngineSink`] together with the [`SourceToken`] of the load that created
//! the engine, so events from a torn-down engine are recognisably stale.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use marquee_core::{
    AdaptiveEngine, EngineConfig, EngineError, EngineEvent, EngineFactory, ErrorCategory,
    LevelInfo, SourceToken,
};
use serde::Serialize;
use wasm_bindgen::prelude::*;
use web_sys::HtmlMediaElement;

#[wasm_bindgen]
extern "C" {
    /// The hls.js player class.
    type Hls;

    #[wasm_bindgen(constructor, catch)]
    fn new(config: &JsValue) -> Result<Hls, JsValue>;

    #[wasm_bindgen(static_method_of = Hls, js_name = isSupported, catch)]
    fn is_supported() -> Result<bool, JsValue>;

    #[wasm_bindgen(method, js_name = loadSource)]
    fn load_source(this: &Hls, url: &str);

    #[wasm_bindgen(method, js_name = attachMedia)]
    fn attach_media(this: &Hls, media: &HtmlMediaElement);

    #[wasm_bindgen(method, js_name = startLoad)]
    fn start_load(this: &Hls);

    #[wasm_bindgen(method, js_name = recoverMediaError)]
    fn recover_media_error(this: &Hls);

    #[wasm_bindgen(method, setter = currentLevel)]
    fn set_current_level(this: &Hls, level: i32);

    #[wasm_bindgen(method, getter = autoLevelEnabled)]
    fn auto_level_enabled(this: &Hls) -> bool;

    #[wasm_bindgen(method)]
    fn destroy(this: &Hls);

    #[wasm_bindgen(method)]
    fn on(this: &Hls, event: &str, listener: &Closure<dyn FnMut(JsValue, JsValue)>);
}

/// hls.js event names.
pub mod events {
    /// Manifest parsed, renditions known.
    pub const MANIFEST_PARSED: &str = "hlsManifestParsed";
    /// Active rendition changed.
    pub const LEVEL_SWITCHED: &str = "hlsLevelSwitched";
    /// Any error.
    pub const ERROR: &str = "hlsError";
}

/// hls.js error type for fetch failures.
const NETWORK_ERROR: &str = "networkError";
/// hls.js error type for demux/decode failures.
const MEDIA_ERROR: &str = "mediaError";

/// Receives engine events tagged with the load they belong to.
pub type EngineSink = Rc<dyn Fn(SourceToken, EngineEvent)>;

/// Constructor options understood by hls.js.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HlsConfig {
    /// `enableWorker`.
    pub enable_worker: bool,
    /// `lowLatencyMode`.
    pub low_latency_mode: bool,
    /// `backBufferLength`, seconds.
    pub back_buffer_length: u32,
}

impl From<&EngineConfig> for HlsConfig {
    fn from(config: &EngineConfig) -> Self {
        Self {
            enable_worker: config.enable_worker,
            low_latency_mode: config.low_latency_mode,
            back_buffer_length: config.back_buffer_length_secs,
        }
    }
}

/// Map an hls.js error type to the core category.
#[must_use]
pub fn error_category(error_type: &str) -> ErrorCategory {
    match error_type {
        NETWORK_ERROR => ErrorCategory::Network,
        MEDIA_ERROR => ErrorCategory::Media,
        _ => ErrorCategory::Other,
    }
}

fn field(data: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(data, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

fn number_field(data: &JsValue, key: &str) -> Option<f64> {
    field(data, key).as_f64().filter(|n| n.is_finite() && *n >= 0.0)
}

fn parse_levels(data: &JsValue) -> Vec<LevelInfo> {
    let levels = field(data, "levels");
    if !js_sys::Array::is_array(&levels) {
        return Vec::new();
    }
    js_sys::Array::from(&levels)
        .iter()
        .map(|level| LevelInfo {
            height: number_field(&level, "height").unwrap_or(0.0) as u32,
            bitrate: number_field(&level, "bitrate").unwrap_or(0.0) as u64,
        })
        .collect()
}

fn parse_error(data: &JsValue) -> EngineError {
    let category = error_category(&field(data, "type").as_string().unwrap_or_default());
    let details = field(data, "details").as_string().unwrap_or_default();
    if field(data, "fatal").as_bool().unwrap_or(false) {
        EngineError::fatal(category, details)
    } else {
        EngineError::recoverable(category, details)
    }
}

/// Slot the host fills with the token of the load that created an engine.
type TokenSlot = Rc<Cell<Option<SourceToken>>>;

/// An hls.js instance bound to one video element.
struct HlsEngine {
    hls: Hls,
    media: HtmlMediaElement,
    listeners: Vec<Closure<dyn FnMut(JsValue, JsValue)>>,
}

impl HlsEngine {
    fn new(hls: Hls, media: HtmlMediaElement, slot: &TokenSlot, sink: &EngineSink) -> Self {
        let mut engine = Self {
            hls,
            media,
            listeners: Vec::with_capacity(3),
        };
        engine.listen(events::MANIFEST_PARSED, slot, sink, |data| {
            Some(EngineEvent::ManifestParsed {
                levels: parse_levels(data),
            })
        });
        engine.listen(events::LEVEL_SWITCHED, slot, sink, |data| {
            number_field(data, "level").map(|level| EngineEvent::LevelSwitched {
                level: level as usize,
            })
        });
        engine.listen(events::ERROR, slot, sink, |data| {
            Some(EngineEvent::Error(parse_error(data)))
        });
        engine
    }

    fn listen(
        &mut self,
        event: &'static str,
        slot: &TokenSlot,
        sink: &EngineSink,
        parse: fn(&JsValue) -> Option<EngineEvent>,
    ) {
        let slot = Rc::clone(slot);
        let sink = Rc::clone(sink);
        let listener = Closure::new(move |_event: JsValue, data: JsValue| {
            let Some(token) = slot.get() else {
                leptos::logging::warn!("hls.js {} before the load was bound", event);
                return;
            };
            if let Some(parsed) = parse(&data) {
                sink(token, parsed);
            }
        });
        self.hls.on(event, &listener);
        self.listeners.push(listener);
    }
}

impl AdaptiveEngine for HlsEngine {
    fn load_source(&mut self, url: &str) {
        self.hls.load_source(url);
    }

    fn attach_media(&mut self) {
        self.hls.attach_media(&self.media);
    }

    fn start_load(&mut self) {
        self.hls.start_load();
    }

    fn recover_media_error(&mut self) {
        self.hls.recover_media_error();
    }

    fn set_current_level(&mut self, level: i32) {
        self.hls.set_current_level(level);
    }

    fn auto_level_enabled(&self) -> bool {
        self.hls.auto_level_enabled()
    }

    fn destroy(&mut self) {
        self.hls.destroy();
        self.listeners.clear();
    }
}

/// Hands the token returned by a load to the engine that load created.
#[derive(Clone, Default)]
pub struct EngineBinder {
    pending: Rc<RefCell<Option<TokenSlot>>>,
}

impl EngineBinder {
    /// Bind the most recently created engine to `token`.
    ///
    /// Does nothing when the last load created no engine.
    pub fn bind(&self, token: SourceToken) {
        if let Some(slot) = self.pending.borrow_mut().take() {
            slot.set(Some(token));
        }
    }
}

/// Creates hls.js engines for one video element.
pub struct HlsEngineFactory {
    media: HtmlMediaElement,
    sink: EngineSink,
    binder: EngineBinder,
}

impl HlsEngineFactory {
    /// Factory for engines attached to `media`, reporting to `sink`.
    pub fn new(media: HtmlMediaElement, sink: EngineSink) -> Self {
        Self {
            media,
            sink,
            binder: EngineBinder::default(),
        }
    }

    /// Binder for the tokens of engines this factory creates.
    #[must_use]
    pub fn binder(&self) -> EngineBinder {
        self.binder.clone()
    }
}

impl EngineFactory for HlsEngineFactory {
    fn is_supported(&self) -> bool {
        let defined = web_sys::window()
            .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str("Hls")).ok())
            .is_some_and(|hls| hls.is_function());
        defined && Hls::is_supported().unwrap_or(false)
    }

    fn create(&self, config: &EngineConfig) -> Box<dyn AdaptiveEngine> {
        let options = serde_wasm_bindgen::to_value(&HlsConfig::from(config)).unwrap_or_else(|e| {
            leptos::logging::error!("Failed to serialize hls.js config: {}", e);
            JsValue::UNDEFINED
        });
        let slot: TokenSlot = Rc::new(Cell::new(None));
        *self.binder.pending.borrow_mut() = Some(Rc::clone(&slot));

        match Hls::new(&options) {
            Ok(hls) => Box::new(HlsEngine::new(hls, self.media.clone(), &slot, &self.sink)),
            Err(e) => {
                leptos::logging::error!("hls.js construction failed: {:?}", e);
                Box::new(DetachedEngine)
            }
        }
    }
}

/// Stand-in when hls.js throws on construction. Reports nothing, so the
/// player stays in its loading state with the poster shown.
struct DetachedEngine;

impl AdaptiveEngine for DetachedEngine {
    fn load_source(&mut self, _url: &str) {}

    fn attach_media(&mut self) {}

    fn start_load(&mut self) {}

    fn recover_media_error(&mut self) {}

    fn set_current_level(&mut self, _level: i32) {}

    fn auto_level_enabled(&self) -> bool {
        true
    }

    fn destroy(&mut self) {}
}
