//! Shared types for the `Marquee` UI.
//!
//! Catalog records come straight from `marquee-core`; this module adds the
//! view-level types (routes, notifications) and the bundled sample catalog
//! shown when the API is unreachable.

use marquee_core::{TitleRecord, TranscodeStatus};
use serde::{Deserialize, Serialize};

// =============================================================================
// Routes
// =============================================================================

/// Path prefix of the watch page.
pub const WATCH_PREFIX: &str = "/watch/";

/// Pages of the application.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Route {
    /// Home feed.
    #[default]
    Home,
    /// Full-screen player for a title id.
    Watch(String),
}

impl Route {
    /// Parse a location path. Unknown paths land on the home page.
    #[must_use]
    pub fn from_path(path: &str) -> Self {
        match path.strip_prefix(WATCH_PREFIX) {
            Some(id) if !id.is_empty() && !id.contains('/') => Self::Watch(id.to_string()),
            _ => Self::Home,
        }
    }

    /// Location path of this route.
    #[must_use]
    pub fn path(&self) -> String {
        match self {
            Self::Home => "/".to_string(),
            Self::Watch(id) => format!("{WATCH_PREFIX}{id}"),
        }
    }
}

// =============================================================================
// Sample Catalog
// =============================================================================

const SAMPLE_MEDIA_BASE: &str = "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample";
const SAMPLE_IMAGE_BASE: &str = "/assets/images";

struct SampleTitle {
    id: &'static str,
    title: &'static str,
    description: &'static str,
    image: &'static str,
    duration: &'static str,
    year: i32,
    genre: &'static [&'static str],
    rating: &'static str,
    media: &'static str,
}

const SAMPLE_TITLES: [SampleTitle; 6] = [
    SampleTitle {
        id: "1",
        title: "Neon Horizon",
        description: "In a future where neon lights hide dark secrets, one detective must uncover the truth behind the city's eternal rain.",
        image: "sci-fi-city.png",
        duration: "2h 14m",
        year: 2045,
        genre: &["Sci-Fi", "Thriller", "Cyberpunk"],
        rating: "PG-13",
        media: "TearsOfSteel.mp4",
    },
    SampleTitle {
        id: "2",
        title: "Star Walker",
        description: "Alone in the vastness of space, Commander Sarah Jenkins faces the ultimate test of survival when her ship malfunctions.",
        image: "astronaut.png",
        duration: "1h 45m",
        year: 2024,
        genre: &["Sci-Fi", "Drama", "Space"],
        rating: "PG",
        media: "Sintel.mp4",
    },
    SampleTitle {
        id: "3",
        title: "Night City Chronicles",
        description: "The underground world of street racing and cyber-enhancements comes to life in this adrenaline-pumping documentary.",
        image: "cyberpunk-street.png",
        duration: "58m",
        year: 2025,
        genre: &["Documentary", "Action"],
        rating: "R",
        media: "BigBuckBunny.mp4",
    },
    SampleTitle {
        id: "4",
        title: "The Algorithm",
        description: "When an AI achieves consciousness, it doesn't want to destroy humanity. It wants to optimize it.",
        image: "tech.png",
        duration: "2h 30m",
        year: 2026,
        genre: &["Thriller", "Tech", "Mystery"],
        rating: "PG-13",
        media: "ElephantsDream.mp4",
    },
    SampleTitle {
        id: "5",
        title: "Neon Horizon II",
        description: "The sequel to the hit sci-fi thriller.",
        image: "sci-fi-city.png",
        duration: "2h 10m",
        year: 2048,
        genre: &["Sci-Fi", "Action"],
        rating: "PG-13",
        media: "TearsOfSteel.mp4",
    },
    SampleTitle {
        id: "6",
        title: "Star Walker: Origins",
        description: "Before the mission, there was the training.",
        image: "astronaut.png",
        duration: "1h 30m",
        year: 2023,
        genre: &["Sci-Fi", "Drama"],
        rating: "PG",
        media: "Sintel.mp4",
    },
];

impl SampleTitle {
    fn to_record(&self) -> TitleRecord {
        let image = format!("{SAMPLE_IMAGE_BASE}/{}", self.image);
        TitleRecord {
            id: self.id.to_string(),
            title: self.title.to_string(),
            description: Some(self.description.to_string()),
            s3_key: String::new(),
            thumbnail_url: Some(image.clone()),
            hero_image_url: Some(image),
            video_url: Some(format!("{SAMPLE_MEDIA_BASE}/{}", self.media)),
            hls_url: None,
            duration: self.duration.to_string(),
            year: self.year,
            genre: self.genre.iter().map(ToString::to_string).collect(),
            rating: self.rating.to_string(),
            transcode_status: TranscodeStatus::Complete,
            created_at: 0,
            updated_at: 0,
        }
    }
}

/// Catalog bundled with the app, shown when the API is unreachable.
#[must_use]
pub fn sample_titles() -> Vec<TitleRecord> {
    SAMPLE_TITLES.iter().map(SampleTitle::to_record).collect()
}

/// Genre tags joined for display, e.g. `Sci-Fi • Thriller`.
#[must_use]
pub fn genre_line(title: &TitleRecord) -> String {
    title.genre.join(" • ")
}

// =============================================================================
// Notification Types
// =============================================================================

/// Type of notification to display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum NotificationType {
    /// Informational message.
    #[default]
    Info,
    /// Warning message.
    Warning,
    /// Error message.
    Error,
}

impl std::fmt::Display for NotificationType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Info => write!(f, "info"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// A toast notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    /// Unique identifier for this notification.
    pub id: u64,
    /// The notification type.
    pub notification_type: NotificationType,
    /// The main message to display.
    pub message: String,
    /// Duration in milliseconds before auto-dismiss (None = manual dismiss only).
    pub duration_ms: Option<u64>,
}

impl Notification {
    /// Create a new notification with a unique ID.
    #[must_use]
    pub fn new(notification_type: NotificationType, message: impl Into<String>) -> Self {
        use std::sync::atomic::{AtomicU64, Ordering};
        static COUNTER: AtomicU64 = AtomicU64::new(1);

        Self {
            id: COUNTER.fetch_add(1, Ordering::Relaxed),
            notification_type,
            message: message.into(),
            duration_ms: Some(5000),
        }
    }

    /// Create an info notification.
    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Info, message)
    }

    /// Create a warning notification.
    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NotificationType::Warning, message)
    }

    /// Create an error notification.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        let mut notification = Self::new(NotificationType::Error, message);
        notification.duration_ms = Some(8000); // Errors stay longer
        notification
    }
}
