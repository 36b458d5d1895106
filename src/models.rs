use serde::{Deserialize, Deserializer, Serialize};

/// A movie as stored by the catalog service.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieRecord {
    pub id: i64,
    /// A missing or `null` title reads as empty rather than failing the whole list.
    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_year: Option<i32>,
    #[serde(default)]
    pub rating: Option<f64>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a create or full-replacement update. Absent fields go out as `null`.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MovieInput {
    pub title: String,
    pub description: Option<String>,
    pub genre: Option<String>,
    pub release_year: Option<i32>,
    pub rating: Option<f64>,
}

impl MovieInput {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            genre: None,
            release_year: None,
            rating: None,
        }
    }

    /// True when the record carries exactly the values of this input.
    pub fn matches(&self, record: &MovieRecord) -> bool {
        record.title == self.title
            && record.description == self.description
            && record.genre == self.genre
            && record.release_year == self.release_year
            && record.rating == self.rating
    }
}

/// The `{message, ...}` envelope the service answers mutations with.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct ServiceMessage {
    #[serde(default)]
    pub message: Option<String>,
}
