//! Core domain types for the issue tracker.
//!
//! This module defines the persisted [`Issue`] record and the request-side
//! shapes that drive the service: [`NewIssue`] for creation, [`IssueUpdate`]
//! for partial updates and [`IssueFilter`] for equality queries.
//!
//! Field names follow the wire format of the HTTP API (`_id`, `issue_title`,
//! `created_on`, ...) so the same types serialize straight into responses.

use crate::validation::is_blank;
use chrono::{DateTime, SubsecRound, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;

/// Current time truncated to the millisecond precision that timestamps are
/// stored and serialized with.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}

/// An issue tracked under a project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Unique identifier (UUID), assigned on creation
    #[serde(rename = "_id")]
    pub id: String,
    /// Short summary of the issue
    pub issue_title: String,
    /// Detailed description
    pub issue_text: String,
    /// When the issue was created
    #[serde(with = "timestamp")]
    pub created_on: DateTime<Utc>,
    /// When the issue was last modified
    #[serde(with = "timestamp")]
    pub updated_on: DateTime<Utc>,
    /// Who reported the issue
    pub created_by: String,
    /// Who is working on it ("" when unassigned)
    #[serde(default)]
    pub assigned_to: String,
    /// Whether the issue is still open
    pub open: bool,
    /// Free-form status line ("" when unset)
    #[serde(default)]
    pub status_text: String,
}

impl Issue {
    /// Create a new open issue with a fresh identifier and empty optional fields
    pub fn new(issue_title: String, issue_text: String, created_by: String) -> Self {
        let created_on = now();
        Self {
            id: Uuid::new_v4().to_string(),
            issue_title,
            issue_text,
            created_on,
            updated_on: created_on,
            created_by,
            assigned_to: String::new(),
            open: true,
            status_text: String::new(),
        }
    }

    /// Apply every non-blank field of `update` and refresh `updated_on`.
    ///
    /// The identifier and `created_on` are never touched.
    pub fn apply_update(&mut self, update: &IssueUpdate) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(v) = value {
                if !is_blank(Some(v.as_str())) {
                    *target = v.clone();
                }
            }
        }

        set(&mut self.issue_title, &update.issue_title);
        set(&mut self.issue_text, &update.issue_text);
        set(&mut self.created_by, &update.created_by);
        set(&mut self.assigned_to, &update.assigned_to);
        set(&mut self.status_text, &update.status_text);
        if let Some(open) = update.open {
            self.open = open;
        }
        self.updated_on = now().max(self.created_on);
    }
}

/// Fields accepted when creating an issue.
///
/// Everything is optional at the type level so a missing required field is
/// reported as a validation error rather than a decoding failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_text: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
}

/// A partial update addressed by identifier
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUpdate {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_text: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    /// Setting this to `false` closes the issue
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub open: Option<bool>,
}

/// Equality constraints over issue fields, combined with logical AND.
///
/// An empty filter matches every issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueFilter {
    #[serde(rename = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub issue_title: Option<String>,
    #[serde(default)]
    pub issue_text: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
    #[serde(default)]
    pub assigned_to: Option<String>,
    #[serde(default)]
    pub status_text: Option<String>,
    #[serde(default, deserialize_with = "deserialize_flag")]
    pub open: Option<bool>,
    #[serde(default)]
    pub created_on: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_on: Option<DateTime<Utc>>,
}

impl IssueFilter {
    /// True when no constraint is set
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Build a filter from query-string pairs.
    ///
    /// Unknown keys are ignored and a repeated key keeps its last value.
    /// Returns `None` when a value cannot be interpreted (an `open` other
    /// than true/false, a timestamp that is not RFC 3339): no issue can
    /// satisfy such a filter.
    pub fn from_params<'a, I>(params: I) -> Option<Self>
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut filter = Self::default();
        for (key, value) in params {
            let text = Some(value.to_string());
            match key {
                "_id" => filter.id = text,
                "issue_title" => filter.issue_title = text,
                "issue_text" => filter.issue_text = text,
                "created_by" => filter.created_by = text,
                "assigned_to" => filter.assigned_to = text,
                "status_text" => filter.status_text = text,
                "open" => filter.open = parse_flag(value).ok()?,
                "created_on" => filter.created_on = Some(timestamp::parse(value).ok()?),
                "updated_on" => filter.updated_on = Some(timestamp::parse(value).ok()?),
                _ => {}
            }
        }
        Some(filter)
    }

    /// Check whether `issue` satisfies every constraint in this filter
    pub fn matches(&self, issue: &Issue) -> bool {
        fn eq<T: PartialEq>(wanted: &Option<T>, actual: &T) -> bool {
            wanted.as_ref().map_or(true, |w| w == actual)
        }

        eq(&self.id, &issue.id)
            && eq(&self.issue_title, &issue.issue_title)
            && eq(&self.issue_text, &issue.issue_text)
            && eq(&self.created_by, &issue.created_by)
            && eq(&self.assigned_to, &issue.assigned_to)
            && eq(&self.status_text, &issue.status_text)
            && eq(&self.open, &issue.open)
            && eq(&self.created_on, &issue.created_on)
            && eq(&self.updated_on, &issue.updated_on)
    }
}

/// Accept `open` as a JSON boolean or as the strings "true"/"false".
///
/// Query strings and form-style clients only ever send text.
fn deserialize_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Flag {
        Bool(bool),
        Text(String),
    }

    match Option::<Flag>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Flag::Bool(b)) => Ok(Some(b)),
        Some(Flag::Text(s)) => parse_flag(&s).map_err(D::Error::custom),
    }
}

/// Parse a textual `open` flag. Blank means "not sent".
fn parse_flag(raw: &str) -> Result<Option<bool>, String> {
    match raw.trim() {
        "" => Ok(None),
        "true" => Ok(Some(true)),
        "false" => Ok(Some(false)),
        other => Err(format!("invalid value for open: '{}'", other)),
    }
}

/// RFC 3339 timestamps with millisecond precision and a `Z` suffix,
/// e.g. `2021-04-19T16:08:27.271Z`.
pub mod timestamp {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse(&raw).map_err(serde::de::Error::custom)
    }

    pub fn parse(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
        DateTime::parse_from_rfc3339(raw).map(|dt| dt.with_timezone(&Utc))
    }
}
