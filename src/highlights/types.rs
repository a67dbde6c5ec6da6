//! Highlight records and identity stamps

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::geometry::PageRect;

/// Default highlight color (yellow)
pub const DEFAULT_COLOR: &str = "#ffff00";

fn default_color() -> String {
    DEFAULT_COLOR.to_string()
}

/// A persisted highlight annotation
///
/// `timestamp` is the highlight's identity within a document: deletes are
/// keyed by it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Highlight {
    /// Rectangles in visual selection order
    #[serde(default)]
    pub rects: Vec<PageRect>,
    #[serde(default = "default_color")]
    pub color: String,
    /// Selected text, captured at creation
    #[serde(default)]
    pub text: String,
    /// RFC 3339 creation time
    pub timestamp: String,
}

impl Highlight {
    pub fn new(rects: Vec<PageRect>, color: impl Into<String>, text: impl Into<String>, timestamp: String) -> Self {
        Self {
            rects,
            color: color.into(),
            text: text.into(),
            timestamp,
        }
    }
}

/// Issues creation timestamps that never repeat within a process.
///
/// Stamps have millisecond precision; when two are requested within the
/// same millisecond (or the clock steps back) the later one is pushed one
/// millisecond past the previous stamp.
#[derive(Debug, Default)]
pub struct StampSource {
    last: Option<DateTime<Utc>>,
}

impl StampSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Next stamp from the system clock
    pub fn next(&mut self) -> String {
        self.next_at(Utc::now())
    }

    /// Next stamp given the current time
    pub fn next_at(&mut self, now: DateTime<Utc>) -> String {
        let now = DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now);
        let stamp = match self.last {
            Some(last) if now <= last => last + chrono::Duration::milliseconds(1),
            _ => now,
        };
        self.last = Some(stamp);
        stamp.to_rfc3339_opts(SecondsFormat::Millis, true)
    }
}
