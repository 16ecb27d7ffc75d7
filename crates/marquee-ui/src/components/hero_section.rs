//! Featured title banner at the top of the home page.

use leptos::prelude::*;
use marquee_core::TitleRecord;

use super::icons;
use crate::router::use_router;
use crate::types::Route;

/// Full-height banner for `title` with a play button.
#[component]
pub fn HeroSection(title: TitleRecord) -> impl IntoView {
    let router = use_router();
    let route = Route::Watch(title.id.clone());
    let image = title.poster_url().unwrap_or_default().to_string();

    view! {
        <section class="hero" data-testid="hero">
            <div class="hero-backdrop">
                <img src=image alt=title.title.clone() />
                <div class="hero-fade" />
            </div>
            <div class="hero-content">
                <h1 class="hero-title">{title.title.clone()}</h1>
                <div class="hero-meta">
                    <span class="hero-year">{title.year}</span>
                    <span class="badge">{title.rating.clone()}</span>
                    <span>{title.duration.clone()}</span>
                    <span class="badge badge-outline">"HD"</span>
                </div>
                {title.description.clone().map(|description| view! {
                    <p class="hero-description">{description}</p>
                })}
                <div class="hero-actions">
                    <button class="btn btn-play" on:click=move |_| router.navigate(route.clone())>
                        <svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor">
                            <path d=icons::PLAY />
                        </svg>
                        "Play"
                    </button>
                    <button class="btn btn-secondary">
                        <svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor">
                            <path d=icons::INFO />
                        </svg>
                        "More Info"
                    </button>
                </div>
            </div>
        </section>
    }
}
