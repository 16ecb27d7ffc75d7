//! Horizontally scrolling row of title cards.

use leptos::prelude::*;
use marquee_core::{FeedRow, TitleRecord};

use super::icons;
use crate::router::use_router;
use crate::types::{Route, genre_line};

/// Genre tags shown on a card.
const CARD_GENRES: usize = 3;

/// One row of the home feed.
#[component]
pub fn ContentRow(row: FeedRow) -> impl IntoView {
    let is_large = row.is_large;

    view! {
        <section class="content-row" data-testid="content-row">
            <h2 class="content-row-title">{row.title}</h2>
            <div class="content-row-track">
                {row
                    .items
                    .into_iter()
                    .map(|title| view! { <TitleCard title=title is_large=is_large /> })
                    .collect_view()}
            </div>
        </section>
    }
}

#[component]
fn TitleCard(title: TitleRecord, is_large: bool) -> impl IntoView {
    let router = use_router();
    let route = Route::Watch(title.id.clone());
    let image = if is_large {
        title.poster_url()
    } else {
        title.thumbnail_url.as_deref().or(title.poster_url())
    };
    let image = image.unwrap_or_default().to_string();
    let mut tags = title.clone();
    tags.genre.truncate(CARD_GENRES);

    view! {
        <button
            class="title-card"
            class:large=is_large
            on:click=move |_| router.navigate(route.clone())
        >
            <div class="title-card-image">
                <img src=image alt=title.title.clone() loading="lazy" />
                <div class="title-card-overlay">
                    <svg viewBox="0 0 24 24" width="24" height="24" fill="currentColor">
                        <path d=icons::PLAY />
                    </svg>
                </div>
            </div>
            <div class="title-card-info">
                <span class="title-card-name">{title.title.clone()}</span>
                <div class="title-card-meta">
                    <span class="badge">{title.rating.clone()}</span>
                    <span>{title.duration.clone()}</span>
                </div>
                <span class="title-card-genres">{genre_line(&tags)}</span>
            </div>
        </button>
    }
}
