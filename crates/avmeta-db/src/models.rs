//! Internal Rust models matching the database schema.

use serde::{Deserialize, Serialize};

/// Resolved metadata record for one video identifier, as produced by one
/// content source. `(avid, source)` is the natural key.
///
/// Primary fields (`avid`, `title`, `source`, `image_url`) are set exactly
/// once by the parse step of the source that produced the record; the
/// enrichment fields are merged in afterwards via [`AvInfo::apply_enrichment`]
/// and the record is immutable once persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AvInfo {
    /// Upper-cased video identifier.
    pub avid: String,
    /// Display title extracted from the source page.
    pub title: String,
    /// Name of the source that produced this record.
    pub source: String,
    /// Release date, enrichment-only.
    pub release_date: Option<String>,
    /// Runtime, enrichment-only.
    pub duration: Option<String>,
    /// Director, enrichment-only.
    pub director: Option<String>,
    /// Cover image URL.
    pub image_url: Option<String>,
}

impl AvInfo {
    /// Build a record from a source's primary fields. The avid is
    /// upper-cased here so every record carries the normalized form.
    pub fn from_source(
        avid: &str,
        title: impl Into<String>,
        source: impl Into<String>,
        image_url: impl Into<String>,
    ) -> Self {
        Self {
            avid: avid.to_uppercase(),
            title: title.into(),
            source: source.into(),
            release_date: None,
            duration: None,
            director: None,
            image_url: Some(image_url.into()),
        }
    }

    /// Merge scraped enrichment fields into this record.
    ///
    /// Non-null scraped fields fill in `release_date`, `duration`, and
    /// `director`; a scraped `image_url` is only taken when the record does
    /// not already carry one.
    pub fn apply_enrichment(&mut self, scraped: &ScrapedMetadata) {
        if let Some(ref release_date) = scraped.release_date {
            self.release_date = Some(release_date.clone());
        }
        if let Some(ref duration) = scraped.duration {
            self.duration = Some(duration.clone());
        }
        if let Some(ref director) = scraped.director {
            self.director = Some(director.clone());
        }
        if self.image_url.is_none() {
            if let Some(ref image_url) = scraped.image_url {
                self.image_url = Some(image_url.clone());
            }
        }
    }

    /// Render the fixed-format text block shown to end users.
    ///
    /// Enrichment fields that were never filled render as `未知`.
    pub fn display_text(&self) -> String {
        let unknown = "未知";
        format!(
            "AVID：{}\n标题：{}\n来源：{}\n发行日期：{}\n时长：{}\n导演：{}",
            self.avid,
            self.title,
            self.source,
            self.release_date.as_deref().unwrap_or(unknown),
            self.duration.as_deref().unwrap_or(unknown),
            self.director.as_deref().unwrap_or(unknown),
        )
    }
}

/// Enrichment payload produced by a scraper. All fields optional; an empty
/// payload counts as a scrape miss.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ScrapedMetadata {
    pub release_date: Option<String>,
    pub duration: Option<String>,
    pub director: Option<String>,
    pub image_url: Option<String>,
}

impl ScrapedMetadata {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        self.release_date.is_none()
            && self.duration.is_none()
            && self.director.is_none()
            && self.image_url.is_none()
    }
}

/// Per-source session cookie cache row. At most one row per source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SourceCookie {
    /// Source name, the key.
    pub source: String,
    /// Opaque serialized cookie-jar string, `"k1=v1; k2=v2"`.
    pub cookie: String,
}
