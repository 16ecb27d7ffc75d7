//! Quality levels offered by a segmented stream.

use serde::{Deserialize, Serialize};

/// Id of the "automatic selection" sentinel level.
pub const AUTO_QUALITY_ID: i32 = -1;

/// Label of the automatic sentinel.
pub const AUTO_QUALITY_LABEL: &str = "Auto";

/// One rendition as reported by the adaptive engine.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LevelInfo {
    /// Vertical resolution in pixels.
    pub height: u32,
    /// Peak bitrate in bits per second.
    pub bitrate: u64,
}

impl LevelInfo {
    /// Bitrate in kbps, rounded half up.
    #[must_use]
    pub const fn kbps(&self) -> u64 {
        (self.bitrate + 500) / 1000
    }

    /// Short label used once the level is playing, e.g. `720p`.
    #[must_use]
    pub fn short_label(&self) -> String {
        format!("{}p", self.height)
    }
}

/// A selectable entry in the quality menu.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct QualityLevel {
    /// `-1` for automatic selection, otherwise the engine's level index.
    pub id: i32,
    /// Menu label.
    pub label: String,
}

impl QualityLevel {
    /// The automatic selection entry.
    #[must_use]
    pub fn auto() -> Self {
        Self {
            id: AUTO_QUALITY_ID,
            label: AUTO_QUALITY_LABEL.to_string(),
        }
    }

    /// Menu entry for the engine level at `index`.
    #[must_use]
    pub fn from_level(index: usize, level: &LevelInfo) -> Self {
        Self {
            id: i32::try_from(index).unwrap_or(i32::MAX),
            label: format!("{}p ({} kbps)", level.height, level.kbps()),
        }
    }

    /// Whether this is the automatic sentinel.
    #[must_use]
    pub const fn is_auto(&self) -> bool {
        self.id == AUTO_QUALITY_ID
    }
}

/// Build the quality menu for a freshly parsed manifest.
///
/// The automatic entry always comes first. Level entries keep the manifest's
/// order unless `sort_by_bitrate` is set; ids stay the engine's indices
/// either way.
#[must_use]
pub fn quality_menu(levels: &[LevelInfo], sort_by_bitrate: bool) -> Vec<QualityLevel> {
    let mut indexed: Vec<(usize, &LevelInfo)> = levels.iter().enumerate().collect();
    if sort_by_bitrate {
        indexed.sort_by_key(|(_, level)| level.bitrate);
    }

    std::iter::once(QualityLevel::auto())
        .chain(
            indexed
                .into_iter()
                .map(|(index, level)| QualityLevel::from_level(index, level)),
        )
        .collect()
}

/// Label describing the level currently playing.
#[must_use]
pub fn current_level_label(level: &LevelInfo, auto_enabled: bool) -> String {
    if auto_enabled {
        format!("{AUTO_QUALITY_LABEL} ({})", level.short_label())
    } else {
        level.short_label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ladder() -> Vec<LevelInfo> {
        vec![
            LevelInfo {
                height: 1080,
                bitrate: 5_000_000,
            },
            LevelInfo {
                height: 360,
                bitrate: 800_499,
            },
            LevelInfo {
                height: 720,
                bitrate: 2_800_500,
            },
        ]
    }

    #[test]
    fn test_menu_has_auto_first_and_indexed_levels() {
        let menu = quality_menu(&ladder(), false);
        assert_eq!(menu.len(), 4);
        assert_eq!(menu[0], QualityLevel::auto());
        for (position, entry) in menu.iter().skip(1).enumerate() {
            assert_eq!(entry.id, position as i32);
        }
    }

    #[test]
    fn test_level_labels_round_kbps() {
        let menu = quality_menu(&ladder(), false);
        assert_eq!(menu[1].label, "1080p (5000 kbps)");
        assert_eq!(menu[2].label, "360p (800 kbps)");
        assert_eq!(menu[3].label, "720p (2801 kbps)");
    }

    #[test]
    fn test_empty_manifest_yields_only_auto() {
        let menu = quality_menu(&[], false);
        assert_eq!(menu, vec![QualityLevel::auto()]);
    }

    #[test]
    fn test_sorted_menu_keeps_engine_ids() {
        let menu = quality_menu(&ladder(), true);
        let ids: Vec<i32> = menu.iter().map(|q| q.id).collect();
        assert_eq!(ids, vec![AUTO_QUALITY_ID, 1, 2, 0]);
    }

    #[test]
    fn test_current_level_label() {
        let level = LevelInfo {
            height: 720,
            bitrate: 2_800_000,
        };
        assert_eq!(current_level_label(&level, true), "Auto (720p)");
        assert_eq!(current_level_label(&level, false), "720p");
    }
}
