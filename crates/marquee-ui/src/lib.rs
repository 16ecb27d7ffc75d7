//! `Marquee` UI - Leptos-based streaming frontend.
//!
//! Home feed of catalog titles and a full-screen player. Playback logic lives
//! in `marquee-core`; this crate binds it to the DOM and to hls.js.

// Component files tend to be large by nature - they contain view logic
#![allow(clippy::too_many_lines)]
// Option<Option<T>> is sometimes cleaner for "loading / missing / present"
#![allow(clippy::option_option)]
// Pass by value suggestions for small types like bool - not always clearer
#![allow(clippy::trivially_copy_pass_by_ref)]

pub mod api;
pub mod app;
pub mod components;
pub mod hls;
pub mod router;
pub mod theme;
pub mod types;
pub mod video_surface;

pub use app::App;
pub use types::Route;
