use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Origin tag stamped on records published without an explicit source.
pub const DEFAULT_SOURCE: &str = "cloud";

const IS_WATCHING_REQUIRED: &str = "Invalid data: isWatching boolean required";

/// The shared "now watching" record.
///
/// Only `isWatching` and `timestamp` are typed. The descriptive fields
/// are kept as the JSON the producer sent, so a record from the local
/// companion round-trips untouched, unknown keys included. Use the
/// accessors for typed views.
///
/// Absent descriptive fields serialize as `null` so readers always see
/// the same shape regardless of which source produced the record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchingRecord {
    pub is_watching: bool,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub title: Option<Value>,
    #[serde(default)]
    pub episode: Option<Value>,
    #[serde(default)]
    pub season: Option<Value>,
    /// Playback position, as reported by the publisher (usually a percentage).
    #[serde(default)]
    pub progress: Option<Value>,
    #[serde(default)]
    pub source: Option<Value>,
    /// Fields this crate does not know about.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl WatchingRecord {
    /// A "not watching" record stamped with the current time.
    pub fn not_watching() -> Self {
        Self::not_watching_at(Utc::now())
    }

    pub fn not_watching_at(timestamp: DateTime<Utc>) -> Self {
        Self {
            is_watching: false,
            timestamp,
            title: None,
            episode: None,
            season: None,
            progress: None,
            source: None,
            extra: Map::new(),
        }
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_ref().and_then(Value::as_str)
    }

    /// Episode number. Accepts integral numbers and numeric strings.
    pub fn episode(&self) -> Option<u64> {
        self.episode.as_ref().and_then(as_count)
    }

    pub fn season(&self) -> Option<u64> {
        self.season.as_ref().and_then(as_count)
    }

    pub fn progress(&self) -> Option<f64> {
        match self.progress.as_ref()? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    pub fn source(&self) -> Option<&str> {
        self.source.as_ref().and_then(Value::as_str)
    }

    /// Whether two records describe the same status, ignoring when they
    /// were written.
    pub fn same_status(&self, other: &Self) -> bool {
        self.is_watching == other.is_watching
            && self.title == other.title
            && self.episode == other.episode
            && self.season == other.season
            && self.progress == other.progress
            && self.source == other.source
            && self.extra == other.extra
    }

    /// One-line human summary, e.g. `Frieren S1E12 (42%)`.
    pub fn summary(&self) -> String {
        if !self.is_watching {
            return "Not watching".into();
        }

        let mut line = self
            .title
            .as_ref()
            .map(display)
            .unwrap_or_else(|| "Something".into());
        match (self.season(), self.episode()) {
            (Some(s), Some(e)) => line.push_str(&format!(" S{s}E{e}")),
            (None, Some(e)) => line.push_str(&format!(" Episode {e}")),
            (Some(s), None) => line.push_str(&format!(" Season {s}")),
            (None, None) => {}
        }
        if let Some(p) = self.progress() {
            line.push_str(&format!(" ({p:.0}%)"));
        }
        if let Some(src) = &self.source {
            line.push_str(&format!(" via {}", display(src)));
        }
        line
    }
}

fn as_count(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64().or_else(|| {
            n.as_f64()
                .filter(|f| f.fract() == 0.0 && *f >= 0.0)
                .map(|f| f as u64)
        }),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn display(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// JSON values that count as "not provided": `null`, `false`, `0`, `""`.
fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f == 0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(_) | Value::Object(_) => false,
    }
}

/// Payload accepted by the publisher.
///
/// Only `isWatching` is checked. Descriptive fields are carried as
/// given; the publisher does not interpret them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchingUpdate {
    pub is_watching: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub episode: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub season: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<Value>,
}

impl WatchingUpdate {
    /// Validate an untrusted JSON payload.
    ///
    /// The only requirement is a boolean `isWatching`. Other fields are
    /// taken as they are, whatever their type; unknown keys are dropped.
    pub fn from_value(value: &Value) -> Result<Self, String> {
        let obj = value.as_object().ok_or(IS_WATCHING_REQUIRED)?;
        let is_watching = obj
            .get("isWatching")
            .and_then(Value::as_bool)
            .ok_or(IS_WATCHING_REQUIRED)?;

        let field = |key: &str| obj.get(key).filter(|v| !v.is_null()).cloned();
        Ok(Self {
            is_watching,
            title: field("title"),
            episode: field("episode"),
            season: field("season"),
            progress: field("progress"),
            source: field("source"),
        })
    }

    /// Build the full record that replaces whatever is stored.
    ///
    /// Falsy values (`false`, `0`, `""`) count as absent, and a missing
    /// source becomes [`DEFAULT_SOURCE`].
    pub fn into_record(self, timestamp: DateTime<Utc>) -> WatchingRecord {
        let present = |v: Option<Value>| v.filter(|v| !is_falsy(v));
        WatchingRecord {
            is_watching: self.is_watching,
            timestamp,
            title: present(self.title),
            episode: present(self.episode),
            season: present(self.season),
            progress: present(self.progress),
            source: Some(present(self.source).unwrap_or_else(|| DEFAULT_SOURCE.into())),
            extra: Map::new(),
        }
    }
}
