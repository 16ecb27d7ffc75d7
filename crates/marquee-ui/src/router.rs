//! Minimal history-API routing between the home and watch pages.

use leptos::prelude::*;
use wasm_bindgen::JsValue;

use crate::types::Route;

/// Current route plus navigation, shared through context.
#[derive(Clone, Copy)]
pub struct Router {
    /// Page being shown.
    pub route: ReadSignal<Route>,
    set_route: WriteSignal<Route>,
}

impl Router {
    /// Router starting at the browser's current location.
    #[must_use]
    pub fn new() -> Self {
        let (route, set_route) = signal(Route::from_path(&current_path()));

        // Back/forward buttons.
        let handle = window_event_listener(leptos::ev::popstate, move |_| {
            set_route.set(Route::from_path(&current_path()));
        });
        on_cleanup(move || handle.remove());

        Self { route, set_route }
    }

    /// Show `route` and record it in the session history.
    pub fn navigate(&self, route: Route) {
        if self.route.get_untracked() == route {
            return;
        }
        let path = route.path();
        if let Ok(history) = window().history()
            && let Err(e) = history.push_state_with_url(&JsValue::NULL, "", Some(&path))
        {
            leptos::logging::warn!("pushState({}) failed: {:?}", path, e);
        }
        self.set_route.set(route);
    }

    /// Navigate to a raw path such as a back target.
    pub fn navigate_to_path(&self, path: &str) {
        self.navigate(Route::from_path(path));
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}

fn current_path() -> String {
    window().location().pathname().unwrap_or_else(|_| "/".to_string())
}

/// Access the router.
///
/// # Panics
/// Panics if called outside of the `App` component tree.
pub fn use_router() -> Router {
    expect_context::<Router>()
}
