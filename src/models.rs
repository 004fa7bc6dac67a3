// Core data structures for trend records and analysis windows

use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;

use crate::analytics::error::{AnalysisError, AnalysisResult};

/// Category assigned to records that carry no category
pub const DEFAULT_CATEGORY: &str = "Other";

/// Social platform a trend record was observed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Platform {
    Youtube,
    Tiktok,
    X,
    Instagram,
}

impl Platform {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Youtube => "YOUTUBE",
            Self::Tiktok => "TIKTOK",
            Self::X => "X",
            Self::Instagram => "INSTAGRAM",
        }
    }

    /// Create from string (case-insensitive, accepts a few common aliases)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "youtube" | "yt" => Some(Self::Youtube),
            "tiktok" | "tt" => Some(Self::Tiktok),
            "x" | "twitter" => Some(Self::X),
            "instagram" | "ig" => Some(Self::Instagram),
            _ => None,
        }
    }

    /// Get all platforms
    pub fn all() -> Vec<Self> {
        vec![Self::Youtube, Self::Tiktok, Self::X, Self::Instagram]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| format!("unknown platform: {s}"))
    }
}

/// One observed piece of content (video, post, clip)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendRecord {
    pub id: String,
    pub platform: Platform,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub hashtags: Vec<String>,
    #[serde(default)]
    pub views: Option<u64>,
    #[serde(default)]
    pub likes: Option<u64>,
    #[serde(default)]
    pub comments: Option<u64>,
    pub timestamp: DateTime<Utc>,
    pub week_number: u32, // ISO week
    pub month_number: u32,
    pub year: i32,
}

impl TrendRecord {
    /// Create a record with window keys derived from its timestamp
    pub fn new(id: impl Into<String>, platform: Platform, timestamp: DateTime<Utc>) -> Self {
        Self {
            id: id.into(),
            platform,
            category: None,
            title: String::new(),
            hashtags: Vec::new(),
            views: None,
            likes: None,
            comments: None,
            timestamp,
            week_number: timestamp.iso_week().week(),
            month_number: timestamp.month(),
            year: timestamp.year(),
        }
    }

    #[must_use]
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    #[must_use]
    pub fn with_hashtags<I, S>(mut self, hashtags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.hashtags = hashtags.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_views(mut self, views: u64) -> Self {
        self.views = Some(views);
        self
    }

    #[must_use]
    pub fn with_likes(mut self, likes: u64) -> Self {
        self.likes = Some(likes);
        self
    }

    #[must_use]
    pub fn with_comments(mut self, comments: u64) -> Self {
        self.comments = Some(comments);
        self
    }

    /// ISO week-year that `week_number` belongs to
    ///
    /// Differs from `year` only around New Year: week 1 in December belongs to
    /// the next year, weeks 52/53 in January to the previous one.
    pub fn iso_week_year(&self) -> i32 {
        match (self.week_number, self.month_number) {
            (1, 12) => self.year + 1,
            (52 | 53, 1) => self.year - 1,
            _ => self.year,
        }
    }

    /// Category name, with missing or blank categories mapped to [`DEFAULT_CATEGORY`]
    pub fn category_name(&self) -> &str {
        match self.category.as_deref().map(str::trim) {
            Some(c) if !c.is_empty() => c,
            _ => DEFAULT_CATEGORY,
        }
    }

    /// Hashtags normalized for vocabulary comparison
    pub fn normalized_hashtags(&self) -> impl Iterator<Item = String> + '_ {
        self.hashtags.iter().filter_map(|tag| normalize_hashtag(tag))
    }
}

/// Normalize a hashtag: trim, strip leading `#`, lower-case; blank tags yield `None`
pub fn normalize_hashtag(tag: &str) -> Option<String> {
    let tag = tag.trim().trim_start_matches('#').trim();
    if tag.is_empty() {
        None
    } else {
        Some(tag.to_lowercase())
    }
}

/// Period type of a window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WindowKind {
    Week,
    Month,
}

impl WindowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Week => "week",
            Self::Month => "month",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A bounded period used to bucket trend records
///
/// Week windows are ISO weeks keyed by ISO week-year; month windows use
/// calendar months 1..=12. Fields are only reachable through validated
/// constructors, deserialization included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawWindow")]
pub struct Window {
    kind: WindowKind,
    number: u32,
    year: i32,
}

#[derive(Deserialize)]
struct RawWindow {
    kind: WindowKind,
    number: u32,
    year: i32,
}

impl TryFrom<RawWindow> for Window {
    type Error = AnalysisError;

    fn try_from(raw: RawWindow) -> AnalysisResult<Self> {
        Self::new(raw.kind, raw.number, raw.year)
    }
}

impl Window {
    /// Create a validated window
    pub fn new(kind: WindowKind, number: u32, year: i32) -> AnalysisResult<Self> {
        let max = match kind {
            WindowKind::Week => iso_weeks_in_year(year),
            WindowKind::Month => 12,
        };
        if number == 0 || number > max {
            return Err(AnalysisError::InvalidWindow {
                kind,
                number,
                year,
                max,
            });
        }
        Ok(Self { kind, number, year })
    }

    pub fn week(number: u32, year: i32) -> AnalysisResult<Self> {
        Self::new(WindowKind::Week, number, year)
    }

    pub fn month(number: u32, year: i32) -> AnalysisResult<Self> {
        Self::new(WindowKind::Month, number, year)
    }

    pub fn kind(&self) -> WindowKind {
        self.kind
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    /// ISO week-year for week windows, calendar year for month windows
    pub fn year(&self) -> i32 {
        self.year
    }

    /// Window of the given kind that a timestamp falls in
    pub fn containing(timestamp: DateTime<Utc>, kind: WindowKind) -> Self {
        let (number, year) = match kind {
            WindowKind::Week => {
                let iso = timestamp.iso_week();
                (iso.week(), iso.year())
            }
            WindowKind::Month => (timestamp.month(), timestamp.year()),
        };
        Self { kind, number, year }
    }

    /// The immediately preceding window of the same kind
    #[must_use]
    pub fn previous(&self) -> Self {
        if self.number > 1 {
            return Self {
                number: self.number - 1,
                ..*self
            };
        }
        let year = self.year - 1;
        let number = match self.kind {
            WindowKind::Week => iso_weeks_in_year(year),
            WindowKind::Month => 12,
        };
        Self {
            kind: self.kind,
            number,
            year,
        }
    }

    /// The `count` windows ending at (and including) this one, oldest first
    pub fn trailing(&self, count: usize) -> Vec<Self> {
        let mut windows = Vec::with_capacity(count);
        let mut current = *self;
        for _ in 0..count {
            windows.push(current);
            current = current.previous();
        }
        windows.reverse();
        windows
    }

    /// Check whether a record belongs to this window
    pub fn contains(&self, record: &TrendRecord) -> bool {
        let (number, year) = match self.kind {
            WindowKind::Week => (record.week_number, record.iso_week_year()),
            WindowKind::Month => (record.month_number, record.year),
        };
        year == self.year && number == self.number
    }

    /// Chronological comparison; windows of different kinds are not comparable
    pub fn compare(&self, other: &Self) -> AnalysisResult<Ordering> {
        if self.kind != other.kind {
            return Err(AnalysisError::WindowMismatch {
                current: *self,
                previous: *other,
            });
        }
        Ok((self.year, self.number).cmp(&(other.year, other.number)))
    }

    /// Require `earlier` to be the same kind as `self` and strictly before it
    pub fn ensure_precedes(&self, earlier: &Self) -> AnalysisResult<()> {
        match self.compare(earlier)? {
            Ordering::Greater => Ok(()),
            _ => Err(AnalysisError::WindowMismatch {
                current: *self,
                previous: *earlier,
            }),
        }
    }
}

impl fmt::Display for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WindowKind::Week => write!(f, "{}-W{:02}", self.year, self.number),
            WindowKind::Month => write!(f, "{}-{:02}", self.year, self.number),
        }
    }
}

/// Number of ISO weeks (52 or 53) in a year
fn iso_weeks_in_year(year: i32) -> u32 {
    if NaiveDate::from_isoywd_opt(year, 53, Weekday::Mon).is_some() {
        53
    } else {
        52
    }
}
