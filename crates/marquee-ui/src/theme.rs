//! Theme configuration for `Marquee`.
//!
//! Cinema dark mode: near-black surfaces, a red brand accent and translucent
//! overlays for the player chrome.

/// Color palette for the application.
pub mod colors {
    /// Background colors.
    pub mod background {
        /// Page background.
        pub const PRIMARY: &str = "#0a0a0a";
        /// Cards and menus.
        pub const SECONDARY: &str = "#141414";
        /// Hovered cards.
        pub const HOVER: &str = "#232323";
        /// Player backdrop.
        pub const PLAYER: &str = "#000000";
        /// Navbar once the page scrolled.
        pub const NAVBAR: &str = "rgba(10, 10, 10, 0.92)";
    }

    /// Text colors.
    pub mod text {
        /// Primary text color.
        pub const PRIMARY: &str = "#ffffff";
        /// Secondary/muted text.
        pub const SECONDARY: &str = "#b3b3b3";
        /// Captions and metadata.
        pub const MUTED: &str = "#808080";
    }

    /// Accent colors.
    pub mod accent {
        /// Brand red.
        pub const PRIMARY: &str = "#e50914";
        /// Brand red for hover states.
        pub const PRIMARY_DIM: &str = "#b20710";
        /// Rating badges.
        pub const RATING: &str = "#46d369";
        /// Warning toasts.
        pub const WARNING: &str = "#fbbf24";
        /// Error toasts.
        pub const ERROR: &str = "#f87171";
        /// Info toasts.
        pub const INFO: &str = "#60a5fa";
    }

    /// Overlays on top of imagery and video.
    pub mod overlay {
        /// Controls bar gradient.
        pub const CONTROLS: &str =
            "linear-gradient(to top, rgba(0, 0, 0, 0.9) 0%, rgba(0, 0, 0, 0.6) 50%, transparent 100%)";
        /// Hero banner fade into the page.
        pub const HERO: &str =
            "linear-gradient(to top, #0a0a0a 0%, rgba(10, 10, 10, 0.4) 50%, transparent 100%)";
        /// Dimming behind the big play button.
        pub const PAUSED: &str = "rgba(0, 0, 0, 0.4)";
        /// Quality menu background.
        pub const MENU: &str = "rgba(0, 0, 0, 0.9)";
        /// Hairline borders on dark surfaces.
        pub const BORDER: &str = "rgba(255, 255, 255, 0.1)";
    }
}

/// Typography configuration.
pub mod typography {
    /// Font family.
    pub const FONT_FAMILY: &str =
        "'Inter', -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif";
    /// Heading font family.
    pub const FONT_FAMILY_HEADING: &str =
        "'Bebas Neue', 'Inter', -apple-system, BlinkMacSystemFont, sans-serif";

    /// Font sizes.
    pub mod sizes {
        /// Small text.
        pub const SM: &str = "0.875rem";
        /// Base text.
        pub const BASE: &str = "1rem";
        /// Row headings.
        pub const ROW: &str = "1.375rem";
        /// Hero title.
        pub const HERO: &str = "4rem";
    }
}

/// Spacing values.
pub mod spacing {
    /// Small spacing.
    pub const SM: &str = "0.5rem";
    /// Medium spacing.
    pub const MD: &str = "1rem";
    /// Large spacing.
    pub const LG: &str = "1.5rem";
    /// Page gutter.
    pub const GUTTER: &str = "3rem";
}

/// Border radius values.
pub mod radius {
    /// Cards.
    pub const SM: &str = "0.25rem";
    /// Menus.
    pub const MD: &str = "0.5rem";
    /// Round buttons.
    pub const FULL: &str = "9999px";
}

/// Animation/transition configuration.
pub mod animation {
    /// Fast transition for interactive elements.
    pub const FAST: &str = "0.15s cubic-bezier(0.4, 0, 0.2, 1)";
    /// Controls fade.
    pub const FADE: &str = "0.3s ease";
    /// Card zoom on hover.
    pub const ZOOM: &str = "0.3s cubic-bezier(0.4, 0, 0.2, 1)";
}

/// Generate CSS custom properties for the theme.
pub fn generate_css_variables() -> String {
    format!(
        r":root {{
  /* Background colors */
  --bg-primary: {bg_primary};
  --bg-secondary: {bg_secondary};
  --bg-hover: {bg_hover};
  --bg-player: {bg_player};
  --bg-navbar: {bg_navbar};

  /* Text colors */
  --text-primary: {text_primary};
  --text-secondary: {text_secondary};
  --text-muted: {text_muted};

  /* Accent colors */
  --accent-primary: {accent_primary};
  --accent-primary-dim: {accent_primary_dim};
  --accent-rating: {accent_rating};
  --accent-warning: {accent_warning};
  --accent-error: {accent_error};
  --accent-info: {accent_info};

  /* Overlays */
  --overlay-controls: {overlay_controls};
  --overlay-hero: {overlay_hero};
  --overlay-paused: {overlay_paused};
  --overlay-menu: {overlay_menu};
  --overlay-border: {overlay_border};

  /* Typography */
  --font-family: {font_family};
  --font-family-heading: {font_family_heading};
  --font-size-sm: {font_sm};
  --font-size-base: {font_base};
  --font-size-row: {font_row};
  --font-size-hero: {font_hero};

  /* Spacing */
  --spacing-sm: {spacing_sm};
  --spacing-md: {spacing_md};
  --spacing-lg: {spacing_lg};
  --spacing-gutter: {spacing_gutter};

  /* Border radius */
  --radius-sm: {radius_sm};
  --radius-md: {radius_md};
  --radius-full: {radius_full};

  /* Transitions */
  --transition-fast: {transition_fast};
  --transition-fade: {transition_fade};
  --transition-zoom: {transition_zoom};
}}",
        bg_primary = colors::background::PRIMARY,
        bg_secondary = colors::background::SECONDARY,
        bg_hover = colors::background::HOVER,
        bg_player = colors::background::PLAYER,
        bg_navbar = colors::background::NAVBAR,
        text_primary = colors::text::PRIMARY,
        text_secondary = colors::text::SECONDARY,
        text_muted = colors::text::MUTED,
        accent_primary = colors::accent::PRIMARY,
        accent_primary_dim = colors::accent::PRIMARY_DIM,
        accent_rating = colors::accent::RATING,
        accent_warning = colors::accent::WARNING,
        accent_error = colors::accent::ERROR,
        accent_info = colors::accent::INFO,
        overlay_controls = colors::overlay::CONTROLS,
        overlay_hero = colors::overlay::HERO,
        overlay_paused = colors::overlay::PAUSED,
        overlay_menu = colors::overlay::MENU,
        overlay_border = colors::overlay::BORDER,
        font_family = typography::FONT_FAMILY,
        font_family_heading = typography::FONT_FAMILY_HEADING,
        font_sm = typography::sizes::SM,
        font_base = typography::sizes::BASE,
        font_row = typography::sizes::ROW,
        font_hero = typography::sizes::HERO,
        spacing_sm = spacing::SM,
        spacing_md = spacing::MD,
        spacing_lg = spacing::LG,
        spacing_gutter = spacing::GUTTER,
        radius_sm = radius::SM,
        radius_md = radius::MD,
        radius_full = radius::FULL,
        transition_fast = animation::FAST,
        transition_fade = animation::FADE,
        transition_zoom = animation::ZOOM,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_css_variables() {
        let css = generate_css_variables();
        assert!(css.contains(":root"));
        assert!(css.contains("--bg-player: #000000"));
        assert!(css.contains("--accent-primary: #e50914"));
        assert!(css.contains("--overlay-controls"));
    }

    #[test]
    fn test_color_values() {
        assert!(colors::background::PRIMARY.starts_with('#'));
        assert!(colors::accent::PRIMARY.starts_with('#'));
    }
}
