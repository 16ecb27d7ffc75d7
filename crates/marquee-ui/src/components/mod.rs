//! UI components.

pub mod content_row;
pub mod hero_section;
pub mod icons;
pub mod navbar;
pub mod toast;
pub mod video_player;

pub use content_row::ContentRow;
pub use hero_section::HeroSection;
pub use navbar::Navbar;
pub use toast::{NotificationContext, NotificationProvider, ToastContainer, use_notifications};
pub use video_player::VideoPlayer;
