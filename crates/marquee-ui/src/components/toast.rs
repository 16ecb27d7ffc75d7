//! Toast notifications.
//!
//! Used to tell the viewer when the catalog API could not be reached and
//! when a title cannot be played in this browser.

use leptos::prelude::*;
use leptos::task::spawn_local;

use crate::types::{Notification, NotificationType};

/// Context for managing notifications across the application.
#[derive(Clone, Copy)]
pub struct NotificationContext {
    /// Current list of notifications.
    pub notifications: ReadSignal<Vec<Notification>>,
    set_notifications: WriteSignal<Vec<Notification>>,
}

impl NotificationContext {
    /// Create a new notification context.
    #[must_use]
    pub fn new() -> Self {
        let (notifications, set_notifications) = signal::<Vec<Notification>>(vec![]);
        Self {
            notifications,
            set_notifications,
        }
    }

    /// Add a notification to the stack.
    pub fn push(&self, notification: Notification) {
        let id = notification.id;
        let duration_ms = notification.duration_ms;
        let set_notifications = self.set_notifications;

        self.set_notifications.update(|notifications| {
            notifications.push(notification);
        });

        if let Some(duration) = duration_ms {
            spawn_local(async move {
                gloo_timers::future::TimeoutFuture::new(duration as u32).await;
                set_notifications.update(|notifications| {
                    notifications.retain(|n| n.id != id);
                });
            });
        }
    }

    /// Remove a notification by ID.
    pub fn dismiss(&self, id: u64) {
        self.set_notifications.update(|notifications| {
            notifications.retain(|n| n.id != id);
        });
    }

    /// Show an info notification.
    pub fn info(&self, message: impl Into<String>) {
        self.push(Notification::info(message));
    }

    /// Show a warning notification.
    pub fn warning(&self, message: impl Into<String>) {
        self.push(Notification::warning(message));
    }

    /// Show an error notification.
    pub fn error(&self, message: impl Into<String>) {
        self.push(Notification::error(message));
    }
}

impl Default for NotificationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Stack of visible toasts, bottom right.
#[component]
pub fn ToastContainer() -> impl IntoView {
    let ctx = expect_context::<NotificationContext>();

    view! {
        <div class="toast-container" data-testid="toast-container">
            <For
                each=move || ctx.notifications.get()
                key=|notification| notification.id
                children=move |notification| {
                    let id = notification.id;
                    view! {
                        <Toast
                            notification=notification
                            on_dismiss=Callback::new(move |()| {
                                ctx.dismiss(id);
                            })
                        />
                    }
                }
            />
        </div>
    }
}

#[component]
fn Toast(notification: Notification, on_dismiss: Callback<()>) -> impl IntoView {
    let notification_type = notification.notification_type;
    let icon = match notification_type {
        NotificationType::Info => "M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm1 15h-2v-6h2v6zm0-8h-2V7h2v2z",
        NotificationType::Warning => "M1 21h22L12 2 1 21zm12-3h-2v-2h2v2zm0-4h-2v-4h2v4z",
        NotificationType::Error => "M12 2C6.48 2 2 6.48 2 12s4.48 10 10 10 10-4.48 10-10S17.52 2 12 2zm1 15h-2v-2h2v2zm0-4h-2V7h2v6z",
    };

    view! {
        <div
            class=format!("toast toast-{notification_type}")
            role="alert"
            aria-live="polite"
            data-testid="toast"
        >
            <svg class="toast-icon" viewBox="0 0 24 24" width="20" height="20" fill="currentColor">
                <path d=icon/>
            </svg>
            <div class="toast-message">{notification.message}</div>
            <button
                class="toast-dismiss"
                on:click=move |_| on_dismiss.run(())
                aria-label="Dismiss notification"
            >
                <svg viewBox="0 0 24 24" width="16" height="16" fill="currentColor">
                    <path d="M19 6.41L17.59 5 12 10.59 6.41 5 5 6.41 10.59 12 5 17.59 6.41 19 12 13.41 17.59 19 19 17.59 13.41 12z"/>
                </svg>
            </button>
        </div>
    }
}

/// Sets up the notification context for `children`.
#[component]
pub fn NotificationProvider(children: Children) -> impl IntoView {
    provide_context(NotificationContext::new());

    view! {
        {children()}
        <ToastContainer />
    }
}

/// Access the notification context.
///
/// # Panics
/// Panics if called outside of a `NotificationProvider`.
pub fn use_notifications() -> NotificationContext {
    expect_context::<NotificationContext>()
}
