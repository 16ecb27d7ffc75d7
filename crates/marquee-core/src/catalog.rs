//! Title catalog.
//!
//! Pages read titles through [`CatalogSource`]; administrative flows mutate
//! them through [`CatalogStore`]. [`InMemoryCatalog`] implements both and
//! backs tests, the transcode watcher and the bundled sample catalog.
//! [`HomeFeed`] arranges a title list into the rows of the home page.

use std::sync::RwLock;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{CatalogError, Error, Result};
use crate::transcode::TranscodeStatus;

/// Duration shown for titles that have not been probed yet.
pub const DEFAULT_DURATION: &str = "0h 00m";

/// Rating shown for unrated titles.
pub const DEFAULT_RATING: &str = "NR";

/// A catalog title as exchanged with the REST API.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TitleRecord {
    /// Unique id.
    pub id: String,
    /// Display title.
    pub title: String,
    /// Synopsis.
    #[serde(default)]
    pub description: Option<String>,
    /// Key of the uploaded source object.
    #[serde(default)]
    pub s3_key: String,
    /// Card image.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Banner image for the hero section and the player poster.
    #[serde(default)]
    pub hero_image_url: Option<String>,
    /// Progressive file URL.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Segmented manifest URL, valid once transcoding completed.
    #[serde(default)]
    pub hls_url: Option<String>,
    /// Human readable running time, e.g. `2h 14m`.
    #[serde(default = "default_duration")]
    pub duration: String,
    /// Release year.
    #[serde(default)]
    pub year: i32,
    /// Genre tags.
    #[serde(default)]
    pub genre: Vec<String>,
    /// Content rating.
    #[serde(default = "default_rating")]
    pub rating: String,
    /// Transcoding lifecycle.
    #[serde(default)]
    pub transcode_status: TranscodeStatus,
    /// Creation time, Unix seconds.
    #[serde(default)]
    pub created_at: u64,
    /// Last modification time, Unix seconds.
    #[serde(default)]
    pub updated_at: u64,
}

fn default_duration() -> String {
    DEFAULT_DURATION.to_string()
}

fn default_rating() -> String {
    DEFAULT_RATING.to_string()
}

impl TitleRecord {
    /// URL the player should stream.
    ///
    /// The segmented manifest once transcoding completed, otherwise the
    /// progressive file.
    #[must_use]
    pub fn stream_url(&self) -> Option<&str> {
        match (self.transcode_status, self.hls_url.as_deref()) {
            (TranscodeStatus::Complete, Some(hls)) => Some(hls),
            _ => self.video_url.as_deref(),
        }
    }

    /// Poster image, preferring the hero banner.
    #[must_use]
    pub fn poster_url(&self) -> Option<&str> {
        self.hero_image_url
            .as_deref()
            .or(self.thumbnail_url.as_deref())
    }

    /// Whether the title carries `genre` (exact tag match).
    #[must_use]
    pub fn has_genre(&self, genre: &str) -> bool {
        self.genre.iter().any(|g| g == genre)
    }
}

/// Fields accepted when creating a title.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct NewTitle {
    /// Display title (required).
    pub title: String,
    /// Key of the uploaded source object (required).
    pub s3_key: String,
    /// Synopsis.
    #[serde(default)]
    pub description: Option<String>,
    /// Card image.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// Banner image.
    #[serde(default)]
    pub hero_image_url: Option<String>,
    /// Progressive file URL.
    #[serde(default)]
    pub video_url: Option<String>,
    /// Segmented manifest URL.
    #[serde(default)]
    pub hls_url: Option<String>,
    /// Running time, defaults to `0h 00m`.
    #[serde(default)]
    pub duration: Option<String>,
    /// Release year; the caller supplies the current year when unknown.
    pub year: i32,
    /// Genre tags.
    #[serde(default)]
    pub genre: Vec<String>,
    /// Rating, defaults to `NR`.
    #[serde(default)]
    pub rating: Option<String>,
}

impl NewTitle {
    /// A title with the two required fields.
    pub fn new(title: impl Into<String>, s3_key: impl Into<String>, year: i32) -> Self {
        Self {
            title: title.into(),
            s3_key: s3_key.into(),
            description: None,
            thumbnail_url: None,
            hero_image_url: None,
            video_url: None,
            hls_url: None,
            duration: None,
            year,
            genre: Vec::new(),
            rating: None,
        }
    }

    /// Builder: set genre tags.
    #[must_use]
    pub fn with_genre<I, T>(mut self, genre: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.genre = genre.into_iter().map(Into::into).collect();
        self
    }

    /// Builder: set the segmented manifest URL.
    #[must_use]
    pub fn with_hls_url(mut self, url: impl Into<String>) -> Self {
        self.hls_url = Some(url.into());
        self
    }

    /// Builder: set the progressive file URL.
    #[must_use]
    pub fn with_video_url(mut self, url: impl Into<String>) -> Self {
        self.video_url = Some(url.into());
        self
    }

    /// Check required fields.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] for a blank title or object key.
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::invalid_field("title", "must not be empty"));
        }
        if self.s3_key.trim().is_empty() {
            return Err(Error::invalid_field("s3Key", "must not be empty"));
        }
        Ok(())
    }

    fn into_record(self, id: String, now: u64) -> TitleRecord {
        TitleRecord {
            id,
            title: self.title,
            description: self.description,
            s3_key: self.s3_key,
            thumbnail_url: self.thumbnail_url,
            hero_image_url: self.hero_image_url,
            video_url: self.video_url,
            hls_url: self.hls_url,
            duration: self.duration.unwrap_or_else(default_duration),
            year: self.year,
            genre: self.genre,
            rating: self.rating.unwrap_or_else(default_rating),
            transcode_status: TranscodeStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Partial update; `None` fields are left untouched.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct TitlePatch {
    /// New display title.
    #[serde(default)]
    pub title: Option<String>,
    /// New synopsis.
    #[serde(default)]
    pub description: Option<String>,
    /// New card image.
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    /// New banner image.
    #[serde(default)]
    pub hero_image_url: Option<String>,
    /// New progressive file URL.
    #[serde(default)]
    pub video_url: Option<String>,
    /// New segmented manifest URL.
    #[serde(default)]
    pub hls_url: Option<String>,
    /// New running time.
    #[serde(default)]
    pub duration: Option<String>,
    /// New release year.
    #[serde(default)]
    pub year: Option<i32>,
    /// New genre tags.
    #[serde(default)]
    pub genre: Option<Vec<String>>,
    /// New rating.
    #[serde(default)]
    pub rating: Option<String>,
}

impl TitlePatch {
    fn apply(self, record: &mut TitleRecord) -> Result<()> {
        if let Some(title) = self.title {
            if title.trim().is_empty() {
                return Err(Error::invalid_field("title", "must not be empty"));
            }
            record.title = title;
        }
        if let Some(description) = self.description {
            record.description = Some(description);
        }
        if let Some(url) = self.thumbnail_url {
            record.thumbnail_url = Some(url);
        }
        if let Some(url) = self.hero_image_url {
            record.hero_image_url = Some(url);
        }
        if let Some(url) = self.video_url {
            record.video_url = Some(url);
        }
        if let Some(url) = self.hls_url {
            record.hls_url = Some(url);
        }
        if let Some(duration) = self.duration {
            record.duration = duration;
        }
        if let Some(year) = self.year {
            record.year = year;
        }
        if let Some(genre) = self.genre {
            record.genre = genre;
        }
        if let Some(rating) = self.rating {
            record.rating = rating;
        }
        Ok(())
    }
}

/// Read access to the catalog.
pub trait CatalogSource: Send + Sync {
    /// All titles, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn list_titles(&self) -> Result<Vec<TitleRecord>>;

    /// One title by id.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id.
    fn get_title(&self, id: &str) -> Result<TitleRecord>;
}

/// Write access to the catalog.
pub trait CatalogStore: CatalogSource {
    /// Validate and insert a new title in `pending` transcode state.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::InvalidField`] when validation fails.
    fn create_title(&self, title: NewTitle) -> Result<TitleRecord>;

    /// Apply a partial update and bump `updated_at`.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::NotFound`] for an unknown id.
    fn update_title(&self, id: &str, patch: TitlePatch) -> Result<TitleRecord>;

    /// Remove a title. Removing an unknown id succeeds.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be written.
    fn delete_title(&self, id: &str) -> Result<()>;

    /// Move a title through the transcode lifecycle.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::IllegalTransition`] when the lifecycle forbids
    /// the change, or [`CatalogError::NotFound`] for an unknown id.
    fn set_transcode_status(&self, id: &str, status: TranscodeStatus) -> Result<TitleRecord>;
}

/// Current time in Unix seconds.
fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}

/// Catalog held in memory, newest title first.
#[derive(Debug, Default)]
pub struct InMemoryCatalog {
    titles: RwLock<Vec<TitleRecord>>,
}

impl InMemoryCatalog {
    /// Empty catalog.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Catalog seeded with `titles`, already in newest-first order.
    #[must_use]
    pub fn with_titles(titles: Vec<TitleRecord>) -> Self {
        Self {
            titles: RwLock::new(titles),
        }
    }

    /// Number of titles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.titles.read().map(|titles| titles.len()).unwrap_or(0)
    }

    /// Whether the catalog is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn modify<F>(&self, id: &str, f: F) -> Result<TitleRecord>
    where
        F: FnOnce(&mut TitleRecord) -> Result<()>,
    {
        let mut titles = self
            .titles
            .write()
            .map_err(|_| CatalogError::StoreUnavailable)?;
        let record = titles
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| Error::title_not_found(id))?;

        let mut updated = record.clone();
        f(&mut updated)?;
        updated.updated_at = now_secs().max(record.updated_at);
        *record = updated.clone();
        Ok(updated)
    }
}

impl CatalogSource for InMemoryCatalog {
    fn list_titles(&self) -> Result<Vec<TitleRecord>> {
        let titles = self
            .titles
            .read()
            .map_err(|_| CatalogError::StoreUnavailable)?;
        Ok(titles.clone())
    }

    fn get_title(&self, id: &str) -> Result<TitleRecord> {
        let titles = self
            .titles
            .read()
            .map_err(|_| CatalogError::StoreUnavailable)?;
        titles
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| Error::title_not_found(id))
    }
}

impl CatalogStore for InMemoryCatalog {
    fn create_title(&self, title: NewTitle) -> Result<TitleRecord> {
        title.validate()?;

        let record = title.into_record(Uuid::new_v4().to_string(), now_secs());
        let mut titles = self
            .titles
            .write()
            .map_err(|_| CatalogError::StoreUnavailable)?;
        titles.insert(0, record.clone());

        info!("Created title {} ({})", record.title, record.id);
        Ok(record)
    }

    fn update_title(&self, id: &str, patch: TitlePatch) -> Result<TitleRecord> {
        let record = self.modify(id, |record| patch.apply(record))?;
        debug!("Updated title {}", id);
        Ok(record)
    }

    fn delete_title(&self, id: &str) -> Result<()> {
        let mut titles = self
            .titles
            .write()
            .map_err(|_| CatalogError::StoreUnavailable)?;
        let before = titles.len();
        titles.retain(|t| t.id != id);

        if titles.len() == before {
            debug!("Delete of unknown title {} ignored", id);
        } else {
            info!("Deleted title {}", id);
        }
        Ok(())
    }

    fn set_transcode_status(&self, id: &str, status: TranscodeStatus) -> Result<TitleRecord> {
        self.modify(id, |record| {
            let from = record.transcode_status;
            if from == status {
                return Ok(());
            }
            if !from.can_transition_to(status) {
                warn!("Rejected transcode transition {} -> {} for {}", from, status, id);
                return Err(CatalogError::IllegalTransition {
                    id: id.to_string(),
                    from: from.to_string(),
                    to: status.to_string(),
                }
                .into());
            }
            info!("Title {} transcode {} -> {}", id, from, status);
            record.transcode_status = status;
            Ok(())
        })
    }
}

// =============================================================================
// Home feed
// =============================================================================

/// Number of titles in the trending row.
pub const TRENDING_ROW_LEN: usize = 5;

/// One horizontal row of cards on the home page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FeedRow {
    /// Row heading.
    pub title: String,
    /// Titles in display order.
    pub items: Vec<TitleRecord>,
    /// Render tall poster cards instead of landscape thumbnails.
    pub is_large: bool,
}

impl FeedRow {
    fn new(title: impl Into<String>, items: Vec<TitleRecord>) -> Self {
        Self {
            title: title.into(),
            items,
            is_large: false,
        }
    }

    const fn large(mut self) -> Self {
        self.is_large = true;
        self
    }
}

/// The home page layout: a featured title and a list of rows.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HomeFeed {
    /// Title shown in the hero banner.
    pub featured: Option<TitleRecord>,
    /// Rows below the banner; empty rows are omitted.
    pub rows: Vec<FeedRow>,
}

impl HomeFeed {
    /// Arrange `titles` (newest first) into the home page rows, with a
    /// spotlight row for `genre`.
    #[must_use]
    pub fn compose(titles: &[TitleRecord], genre: &str) -> Self {
        let trending: Vec<TitleRecord> = titles
            .iter()
            .skip(1)
            .take(TRENDING_ROW_LEN)
            .cloned()
            .collect();
        let spotlight: Vec<TitleRecord> =
            titles.iter().filter(|t| t.has_genre(genre)).cloned().collect();
        let new_releases: Vec<TitleRecord> = titles.iter().rev().cloned().collect();

        let rows = [
            FeedRow::new("Trending Now", trending),
            FeedRow::new(format!("Top {genre} Picks"), spotlight),
            FeedRow::new("New Releases", new_releases).large(),
            FeedRow::new("Watch It Again", titles.to_vec()),
        ]
        .into_iter()
        .filter(|row| !row.items.is_empty())
        .collect();

        Self {
            featured: titles.first().cloned(),
            rows,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    fn record(id: &str, genre: &[&str]) -> TitleRecord {
        TitleRecord {
            id: id.to_string(),
            title: format!("Title {id}"),
            description: None,
            s3_key: format!("inputs/{id}/movie.mp4"),
            thumbnail_url: None,
            hero_image_url: None,
            video_url: Some(format!("https://cdn.example.com/{id}.mp4")),
            hls_url: None,
            duration: DEFAULT_DURATION.to_string(),
            year: 2025,
            genre: genre.iter().map(ToString::to_string).collect(),
            rating: DEFAULT_RATING.to_string(),
            transcode_status: TranscodeStatus::Pending,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_create_applies_defaults() {
        let catalog = InMemoryCatalog::new();
        let created = catalog
            .create_title(NewTitle::new("Neon Horizon", "inputs/x/neon.mp4", 2045))
            .unwrap();

        assert!(!created.id.is_empty());
        assert_eq!(created.duration, "0h 00m");
        assert_eq!(created.rating, "NR");
        assert!(created.genre.is_empty());
        assert_eq!(created.transcode_status, TranscodeStatus::Pending);
        assert_eq!(created.created_at, created.updated_at);
        assert_eq!(catalog.get_title(&created.id).unwrap(), created);
    }

    #[test]
    fn test_create_rejects_blank_required_fields() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .create_title(NewTitle::new("  ", "inputs/x/a.mp4", 2025))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Catalog(CatalogError::InvalidField { field: "title", .. })
        ));

        let err = catalog
            .create_title(NewTitle::new("Title", "", 2025))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Catalog(CatalogError::InvalidField { field: "s3Key", .. })
        ));
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_list_is_newest_first() {
        let catalog = InMemoryCatalog::new();
        let first = catalog.create_title(NewTitle::new("A", "k/a", 2024)).unwrap();
        let second = catalog.create_title(NewTitle::new("B", "k/b", 2024)).unwrap();

        let ids: Vec<String> = catalog
            .list_titles()
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec![second.id, first.id]);
    }

    #[test]
    fn test_update_patches_only_given_fields() {
        let catalog = InMemoryCatalog::new();
        let created = catalog
            .create_title(NewTitle::new("Draft", "k/a", 2024).with_genre(["Drama"]))
            .unwrap();

        let updated = catalog
            .update_title(
                &created.id,
                TitlePatch {
                    title: Some("Final".to_string()),
                    rating: Some("PG".to_string()),
                    ..TitlePatch::default()
                },
            )
            .unwrap();

        assert_eq!(updated.title, "Final");
        assert_eq!(updated.rating, "PG");
        assert_eq!(updated.genre, vec!["Drama".to_string()]);
        assert!(updated.updated_at >= created.updated_at);
    }

    #[test]
    fn test_update_unknown_title() {
        let catalog = InMemoryCatalog::new();
        let err = catalog
            .update_title("missing", TitlePatch::default())
            .unwrap_err();
        assert_eq!(err.to_string(), "Video not found: missing");
    }

    #[test]
    fn test_update_rejects_blank_title_and_keeps_record() {
        let catalog = InMemoryCatalog::new();
        let created = catalog.create_title(NewTitle::new("Keep", "k/a", 2024)).unwrap();

        let result = catalog.update_title(
            &created.id,
            TitlePatch {
                title: Some(String::new()),
                ..TitlePatch::default()
            },
        );
        assert!(result.is_err());
        assert_eq!(catalog.get_title(&created.id).unwrap().title, "Keep");
    }

    #[test]
    fn test_delete_is_idempotent() {
        let catalog = InMemoryCatalog::with_titles(vec![record("1", &[])]);
        catalog.delete_title("1").unwrap();
        catalog.delete_title("1").unwrap();
        assert!(catalog.is_empty());
    }

    #[test]
    fn test_transcode_status_transitions() {
        let catalog = InMemoryCatalog::with_titles(vec![record("1", &[])]);

        catalog
            .set_transcode_status("1", TranscodeStatus::Processing)
            .unwrap();
        let done = catalog
            .set_transcode_status("1", TranscodeStatus::Complete)
            .unwrap();
        assert_eq!(done.transcode_status, TranscodeStatus::Complete);

        // Same state is a no-op, going back is rejected.
        catalog
            .set_transcode_status("1", TranscodeStatus::Complete)
            .unwrap();
        let err = catalog
            .set_transcode_status("1", TranscodeStatus::Pending)
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Catalog(CatalogError::IllegalTransition { .. })
        ));
    }

    #[test]
    fn test_stream_url_prefers_manifest_once_complete() {
        let mut title = record("1", &[]);
        title.hls_url = Some("https://cdn.example.com/assets/1/HLS/movie.m3u8".to_string());
        assert_eq!(title.stream_url(), Some("https://cdn.example.com/1.mp4"));

        title.transcode_status = TranscodeStatus::Complete;
        assert_eq!(
            title.stream_url(),
            Some("https://cdn.example.com/assets/1/HLS/movie.m3u8")
        );

        title.hls_url = None;
        assert_eq!(title.stream_url(), Some("https://cdn.example.com/1.mp4"));
    }

    #[test]
    fn test_record_json_is_camel_case() {
        let json = serde_json::to_value(record("1", &["Sci-Fi"])).unwrap();
        assert_eq!(json["s3Key"], "inputs/1/movie.mp4");
        assert_eq!(json["transcodeStatus"], "pending");
        assert!(json.get("heroImageUrl").is_some());
    }

    #[test]
    fn test_record_from_sparse_json() {
        let record: TitleRecord =
            serde_json::from_str(r#"{"id":"7","title":"Sparse","year":2020}"#).unwrap();
        assert_eq!(record.duration, "0h 00m");
        assert_eq!(record.rating, "NR");
        assert_eq!(record.transcode_status, TranscodeStatus::Pending);
    }

    #[test]
    fn test_home_feed_rows() {
        let titles: Vec<TitleRecord> = (1..=8)
            .map(|i| {
                let genre: &[&str] = if i % 2 == 0 { &["Sci-Fi"] } else { &["Drama"] };
                record(&i.to_string(), genre)
            })
            .collect();

        let feed = HomeFeed::compose(&titles, "Sci-Fi");
        assert_eq!(feed.featured.as_ref().map(|t| t.id.as_str()), Some("1"));

        let headings: Vec<&str> = feed.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(
            headings,
            vec!["Trending Now", "Top Sci-Fi Picks", "New Releases", "Watch It Again"]
        );

        let trending: Vec<&str> = feed.rows[0].items.iter().map(|t| t.id.as_str()).collect();
        assert_eq!(trending, vec!["2", "3", "4", "5", "6"]);
        assert_eq!(feed.rows[1].items.len(), 4);
        assert!(feed.rows[2].is_large);
        assert_eq!(feed.rows[2].items[0].id, "8");
        assert_eq!(feed.rows[3].items.len(), 8);
    }

    #[test]
    fn test_home_feed_omits_empty_rows() {
        let feed = HomeFeed::compose(&[record("1", &["Drama"])], "Sci-Fi");
        let headings: Vec<&str> = feed.rows.iter().map(|r| r.title.as_str()).collect();
        assert_eq!(headings, vec!["New Releases", "Watch It Again"]);

        let empty = HomeFeed::compose(&[], "Sci-Fi");
        assert!(empty.featured.is_none());
        assert!(empty.rows.is_empty());
    }
}
