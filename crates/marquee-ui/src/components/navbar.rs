//! Top navigation bar of the home page.

use leptos::prelude::*;

use super::icons;
use crate::router::use_router;
use crate::types::Route;

/// Browse links shown next to the logo.
const NAV_LINKS: [&str; 5] = ["Home", "Series", "Movies", "New & Popular", "My List"];

/// Fixed navbar; turns opaque once the page scrolls.
#[component]
pub fn Navbar() -> impl IntoView {
    let router = use_router();
    let (is_scrolled, set_is_scrolled) = signal(false);

    let handle = window_event_listener(leptos::ev::scroll, move |_| {
        let scroll_y = window().scroll_y().unwrap_or(0.0);
        set_is_scrolled.set(scroll_y > 0.0);
    });
    on_cleanup(move || handle.remove());

    view! {
        <nav class="navbar" class:scrolled=move || is_scrolled.get()>
            <div class="navbar-left">
                <button class="navbar-logo" on:click=move |_| router.navigate(Route::Home)>
                    "MARQUEE"
                </button>
                <div class="navbar-links">
                    {NAV_LINKS
                        .iter()
                        .enumerate()
                        .map(|(i, name)| {
                            view! {
                                <span class="navbar-link" class:active=i == 0>{*name}</span>
                            }
                        })
                        .collect_view()}
                </div>
            </div>
            <div class="navbar-right">
                <button class="icon-button" aria-label="Search">
                    <svg viewBox="0 0 24 24" width="20" height="20" fill="currentColor">
                        <path d=icons::SEARCH />
                    </svg>
                </button>
                <button class="icon-button" aria-label="Notifications">
                    <svg viewBox="0 0 24 24" width="20" height="20" fill="currentColor">
                        <path d=icons::BELL />
                    </svg>
                </button>
                <div class="navbar-avatar">"M"</div>
            </div>
        </nav>
    }
}
