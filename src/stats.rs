use crate::models::MovieRecord;
use std::fmt;

/// Summary panel numbers derived from the mirror.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Statistics {
    pub count: usize,
    /// `None` when no record has a rating.
    pub avg_rating: Option<f64>,
    /// `None` when no record has a release year.
    pub latest_year: Option<i32>,
}

pub fn compute_statistics(movies: &[MovieRecord]) -> Statistics {
    let ratings: Vec<f64> = movies.iter().filter_map(|m| m.rating).collect();
    let avg_rating = if ratings.is_empty() {
        None
    } else {
        Some(ratings.iter().sum::<f64>() / ratings.len() as f64)
    };
    let latest_year = movies.iter().filter_map(|m| m.release_year).max();

    Statistics {
        count: movies.len(),
        avg_rating,
        latest_year,
    }
}

impl Statistics {
    pub fn avg_rating_label(&self) -> String {
        match self.avg_rating {
            Some(avg) => format!("{avg:.1}"),
            None => "N/A".to_string(),
        }
    }

    pub fn latest_year_label(&self) -> String {
        match self.latest_year {
            Some(year) => year.to_string(),
            None => "N/A".to_string(),
        }
    }
}

impl fmt::Display for Statistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Total movies: {} | Avg rating: {} | Latest year: {}",
            self.count,
            self.avg_rating_label(),
            self.latest_year_label()
        )
    }
}
