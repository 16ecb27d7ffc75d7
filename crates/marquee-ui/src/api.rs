//! Catalog REST client.
//!
//! Talks to the `/api/videos` endpoints with the browser `fetch`. When the API
//! is unreachable the bundled sample catalog stands in, so the home page and
//! the player keep working offline.

use marquee_core::{DEFAULT_API_BASE_URL, TitleRecord};
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Request, RequestInit, RequestMode, Response};

use crate::types::sample_titles;

/// Where a title list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogOrigin {
    /// Served by the API.
    Api,
    /// API unreachable; bundled sample catalog.
    Sample,
}

/// Build the URL of a catalog resource under `base`.
#[must_use]
pub fn endpoint(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

/// `GET` `url` and decode the JSON body.
async fn get_json<T: serde::de::DeserializeOwned>(url: &str) -> Result<T, String> {
    let window = web_sys::window().ok_or_else(|| "No window available".to_string())?;

    let init = RequestInit::new();
    init.set_method("GET");
    init.set_mode(RequestMode::SameOrigin);

    let request = Request::new_with_str_and_init(url, &init).map_err(|e| {
        let msg = e
            .as_string()
            .unwrap_or_else(|| format!("Invalid request URL: {url}"));
        leptos::logging::error!("GET {} FAILED (request): {}", url, msg);
        msg
    })?;
    // Headers are mutable until the request is sent.
    let _ = request.headers().set("Accept", "application/json");

    leptos::logging::log!("GET {}", url);

    let response = JsFuture::from(window.fetch_with_request(&request))
        .await
        .map_err(|e| {
            let msg = e
                .as_string()
                .unwrap_or_else(|| "Network error".to_string());
            leptos::logging::error!("GET {} FAILED (fetch): {}", url, msg);
            msg
        })?;
    let response: Response = response
        .dyn_into()
        .map_err(|_| "Fetch did not return a Response".to_string())?;

    if !response.ok() {
        let msg = format!("HTTP {} {}", response.status(), response.status_text());
        leptos::logging::error!("GET {} FAILED: {}", url, msg);
        return Err(msg);
    }

    let body = response
        .json()
        .map_err(|_| "Response body is not readable".to_string())?;
    let body = JsFuture::from(body).await.map_err(|e| {
        let msg = e
            .as_string()
            .unwrap_or_else(|| "Response body is not JSON".to_string());
        leptos::logging::error!("GET {} FAILED (body): {}", url, msg);
        msg
    })?;

    serde_wasm_bindgen::from_value(body).map_err(|e| {
        let msg = format!("Failed to deserialize response: {e}");
        leptos::logging::error!("GET {} FAILED (deserialize): {}", url, msg);
        msg
    })
}

/// List all titles, newest first.
pub async fn list_titles(base: &str) -> Result<Vec<TitleRecord>, String> {
    get_json(&endpoint(base, "videos")).await
}

/// Fetch one title.
pub async fn get_title(base: &str, id: &str) -> Result<TitleRecord, String> {
    let encoded: String = js_sys::encode_uri_component(id).into();
    get_json(&endpoint(base, &format!("videos/{encoded}"))).await
}

/// List titles from the default API, falling back to the sample catalog.
pub async fn load_catalog() -> (Vec<TitleRecord>, CatalogOrigin) {
    match list_titles(DEFAULT_API_BASE_URL).await {
        Ok(titles) => (titles, CatalogOrigin::Api),
        Err(e) => {
            leptos::logging::warn!("Catalog API unavailable, using sample catalog: {}", e);
            (sample_titles(), CatalogOrigin::Sample)
        }
    }
}

/// Resolve a title for the watch page.
///
/// Looks in the already loaded `titles` first, then asks the API.
pub async fn find_title(titles: &[TitleRecord], id: &str) -> Option<TitleRecord> {
    if let Some(title) = titles.iter().find(|t| t.id == id) {
        return Some(title.clone());
    }
    match get_title(DEFAULT_API_BASE_URL, id).await {
        Ok(title) => Some(title),
        Err(e) => {
            leptos::logging::warn!("Title {} not found: {}", id, e);
            sample_titles().into_iter().find(|t| t.id == id)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_paths() {
        assert_eq!(endpoint("/api", "videos"), "/api/videos");
        assert_eq!(endpoint("/api/", "/videos/1"), "/api/videos/1");
        assert_eq!(
            endpoint("https://example.com/api", "videos"),
            "https://example.com/api/videos"
        );
    }
}
