use std::fmt;

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, TimeZone, Utc};
use mongodb::bson::{Bson, Document};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::{Map, Number, Value};

/// A stored task document, exactly as the client sent it plus the store's `_id`.
///
/// Only the fields the server reasons about have accessors, and those read
/// leniently: a field of an unexpected type is treated as absent rather than
/// failing the whole read.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Task {
    document: Document,
}

impl Task {
    /// Owner of the task.
    pub fn email(&self) -> Option<&str> {
        self.document.get_str("email").ok()
    }

    pub fn deadline(&self) -> Option<Deadline> {
        self.document.get("deadline").and_then(Deadline::from_bson)
    }

    /// Set explicitly by clients; a stored value of exactly 100 marks the task completed.
    pub fn progress_percentage(&self) -> Option<f64> {
        match self.document.get("progressPercentage")? {
            Bson::Double(v) => Some(*v),
            Bson::Int32(v) => Some(f64::from(*v)),
            Bson::Int64(v) => Some(*v as f64),
            _ => None,
        }
    }

    /// The JSON rendering clients see: ids as hex strings, dates as RFC 3339.
    pub fn into_json(self) -> Map<String, Value> {
        self.document
            .into_iter()
            .map(|(key, value)| (key, bson_to_json(value)))
            .collect()
    }
}

impl From<Document> for Task {
    fn from(document: Document) -> Self {
        Task { document }
    }
}

impl Serialize for Task {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        self.clone().into_json().serialize(serializer)
    }
}

fn bson_to_json(value: Bson) -> Value {
    match value {
        Bson::ObjectId(oid) => Value::String(oid.to_hex()),
        Bson::DateTime(at) => Value::String(Deadline::from_millis(at.timestamp_millis()).to_string()),
        Bson::Double(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        Bson::Int32(v) => Value::from(v),
        Bson::Int64(v) => Value::from(v),
        Bson::Document(doc) => Value::Object(
            doc.into_iter()
                .map(|(key, value)| (key, bson_to_json(value)))
                .collect(),
        ),
        Bson::Array(items) => Value::Array(items.into_iter().map(bson_to_json).collect()),
        other => other.into_relaxed_extjson(),
    }
}

/// Body of `PATCH /tasks/{id}`. Values are written as sent; absent fields are written as null.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskEdit {
    #[serde(default)]
    pub task_name: Value,
    #[serde(default)]
    pub task_description: Value,
    #[serde(default)]
    pub deadline: Value,
    #[serde(default)]
    pub priority: Value,
}

/// Body of `PUT /tasks/{id}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StatusUpdate {
    #[serde(default)]
    pub status: Value,
}

#[derive(Debug, Default, Deserialize)]
pub struct TaskQuery {
    pub email: Option<String>,
}

/// A task deadline as read from a stored document.
///
/// Anything that reads as a point in time is normalised to UTC. Other values
/// never take part in scheduling arithmetic.
#[derive(Debug, Clone, PartialEq)]
pub enum Deadline {
    At(DateTime<Utc>),
    Unrecognized(String),
}

impl Deadline {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();

        if let Ok(at) = DateTime::parse_from_rfc3339(trimmed) {
            return Deadline::At(at.with_timezone(&Utc));
        }
        // Browsers send `<input type="date">` values as bare dates.
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
            if let Some(midnight) = date.and_hms_opt(0, 0, 0) {
                return Deadline::At(midnight.and_utc());
            }
        }
        for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M"] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
                return Deadline::At(naive.and_utc());
            }
        }

        Deadline::Unrecognized(raw.to_string())
    }

    pub fn from_millis(millis: i64) -> Self {
        match Utc.timestamp_millis_opt(millis).single() {
            Some(at) => Deadline::At(at),
            None => Deadline::Unrecognized(millis.to_string()),
        }
    }

    /// Strings are parsed, numbers are epoch milliseconds, BSON dates are taken as-is.
    /// `null` means no deadline at all.
    pub fn from_bson(value: &Bson) -> Option<Self> {
        match value {
            Bson::Null => None,
            Bson::String(raw) => Some(Deadline::parse(raw)),
            Bson::DateTime(at) => Some(Deadline::from_millis(at.timestamp_millis())),
            Bson::Int32(millis) => Some(Deadline::from_millis(i64::from(*millis))),
            Bson::Int64(millis) => Some(Deadline::from_millis(*millis)),
            Bson::Double(v) if v.is_finite() && v.abs() < i64::MAX as f64 => {
                Some(Deadline::from_millis(v.trunc() as i64))
            }
            other => Some(Deadline::Unrecognized(other.to_string())),
        }
    }

    /// The instant this deadline names, if it names one.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        match self {
            Deadline::At(at) => Some(*at),
            Deadline::Unrecognized(_) => None,
        }
    }
}

impl From<DateTime<Utc>> for Deadline {
    fn from(at: DateTime<Utc>) -> Self {
        Deadline::At(at)
    }
}

impl fmt::Display for Deadline {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Deadline::At(at) => f.write_str(&at.to_rfc3339_opts(SecondsFormat::Millis, true)),
            Deadline::Unrecognized(raw) => f.write_str(raw),
        }
    }
}
