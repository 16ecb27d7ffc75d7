//! Main application component.

use leptos::prelude::*;
use leptos::task::spawn_local;
use marquee_core::{HomeFeed, TitleRecord};

use crate::api::{self, CatalogOrigin};
use crate::components::{
    ContentRow, HeroSection, Navbar, NotificationProvider, VideoPlayer, use_notifications,
};
use crate::router::{Router, use_router};
use crate::theme::generate_css_variables;
use crate::types::Route;

/// Genre of the spotlight row on the home page.
pub const SPOTLIGHT_GENRE: &str = "Sci-Fi";

/// Main application component.
#[component]
pub fn App() -> impl IntoView {
    let css_vars = generate_css_variables();

    view! {
        <style>{css_vars}</style>
        <style>{include_str!("../styles/main.css")}</style>
        <NotificationProvider>
            <AppContent />
        </NotificationProvider>
    }
}

/// Loads the catalog once and switches between pages.
#[component]
fn AppContent() -> impl IntoView {
    let notifications = use_notifications();
    let router = Router::new();
    provide_context(router);

    let (titles, set_titles) = signal::<Vec<TitleRecord>>(vec![]);
    let (loaded, set_loaded) = signal(false);

    spawn_local(async move {
        let (list, origin) = api::load_catalog().await;
        if origin == CatalogOrigin::Sample {
            notifications.info("Server unreachable, showing the sample catalog.");
        }
        set_titles.set(list);
        set_loaded.set(true);
    });

    view! {
        {move || match router.route.get() {
            Route::Home => view! { <HomePage titles=titles loaded=loaded /> }.into_any(),
            Route::Watch(id) => view! { <WatchPage id=id titles=titles loaded=loaded /> }.into_any(),
        }}
    }
}

#[component]
fn HomePage(titles: ReadSignal<Vec<TitleRecord>>, loaded: ReadSignal<bool>) -> impl IntoView {
    let feed = Signal::derive(move || titles.with(|t| HomeFeed::compose(t, SPOTLIGHT_GENRE)));

    view! {
        <div class="home">
            <Navbar />
            <main class="home-main">
                <Show
                    when=move || loaded.get()
                    fallback=|| view! { <div class="page-loading">"Loading…"</div> }
                >
                    {move || feed.get().featured.map(|title| view! { <HeroSection title=title /> })}
                    <div class="home-rows">
                        {move || {
                            feed.get()
                                .rows
                                .into_iter()
                                .map(|row| view! { <ContentRow row=row /> })
                                .collect_view()
                        }}
                    </div>
                </Show>
            </main>
            <footer class="home-footer">
                <p>"© 2026 Marquee"</p>
            </footer>
        </div>
    }
}

#[component]
fn WatchPage(
    id: String,
    titles: ReadSignal<Vec<TitleRecord>>,
    loaded: ReadSignal<bool>,
) -> impl IntoView {
    // None while resolving, Some(None) when the id is unknown.
    let (title, set_title) = signal::<Option<Option<TitleRecord>>>(None);

    Effect::new(move |_| {
        if !loaded.get() {
            return;
        }
        let list = titles.get();
        let id = id.clone();
        spawn_local(async move {
            set_title.set(Some(api::find_title(&list, &id).await));
        });
    });

    view! {
        <div class="watch">
            {move || match title.get() {
                None => view! { <div class="page-loading">"Loading…"</div> }.into_any(),
                Some(None) => view! { <NotFound /> }.into_any(),
                Some(Some(title)) => {
                    let source = title.stream_url().unwrap_or_default().to_string();
                    let poster = title.poster_url().map(ToString::to_string);
                    view! {
                        <VideoPlayer source_url=source poster_url=poster title=title.title />
                    }
                        .into_any()
                }
            }}
        </div>
    }
}

#[component]
fn NotFound() -> impl IntoView {
    let router = use_router();

    view! {
        <div class="not-found">
            <h1>"404"</h1>
            <p>"This title does not exist."</p>
            <button class="btn btn-play" on:click=move |_| router.navigate(Route::Home)>
                "Back to Home"
            </button>
        </div>
    }
}
