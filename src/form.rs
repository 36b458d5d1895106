//! Raw form fields and their coercion into a `MovieInput`.

use crate::error::SyncError;
use crate::models::{MovieInput, MovieRecord};

/// Text exactly as typed into the add or edit form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MovieForm {
    pub title: String,
    pub description: String,
    pub genre: String,
    pub release_year: String,
    pub rating: String,
}

impl MovieForm {
    /// Prefills the edit form. Zero is a value, so `rating: Some(0.0)` shows as "0".
    pub fn from_record(record: &MovieRecord) -> Self {
        Self {
            title: record.title.clone(),
            description: record.description.clone().unwrap_or_default(),
            genre: record.genre.clone().unwrap_or_default(),
            release_year: record
                .release_year
                .map(|y| y.to_string())
                .unwrap_or_default(),
            rating: record.rating.map(|r| r.to_string()).unwrap_or_default(),
        }
    }

    pub fn into_input(self) -> Result<MovieInput, SyncError> {
        let title = self.title.trim().to_string();
        if title.is_empty() {
            return Err(SyncError::Validation("Title is required".to_string()));
        }

        let release_year = match optional_text(&self.release_year) {
            Some(raw) => Some(raw.parse::<i32>().map_err(|_| {
                SyncError::Validation(format!("Release year must be a whole number, got '{raw}'"))
            })?),
            None => None,
        };

        let rating = match optional_text(&self.rating) {
            Some(raw) => {
                let value = raw
                    .parse::<f64>()
                    .ok()
                    .filter(|v| v.is_finite())
                    .ok_or_else(|| {
                        SyncError::Validation(format!("Rating must be a number, got '{raw}'"))
                    })?;
                Some(value)
            }
            None => None,
        };

        Ok(MovieInput {
            title,
            description: optional_text(&self.description),
            genre: optional_text(&self.genre),
            release_year,
            rating,
        })
    }
}

fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
