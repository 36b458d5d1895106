//! Presentation helpers. Everything here is a pure consumer of mirror data.
//! Titles, genres and descriptions come from other users: escape before markup,
//! sanitize before the terminal.

use crate::models::MovieRecord;
use crate::stats::Statistics;
use std::fmt::Write;

pub const EMPTY_STATE: &str = "No movies yet. Add your first one!";
pub const LOAD_FAILED_STATE: &str = "Failed to load movies. Please try again.";

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Replaces control characters (ESC, BEL, CR, ...) so stored text can't drive the terminal.
/// Newlines survive.
pub fn sanitize_terminal(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_control() && c != '\n' {
                '\u{FFFD}'
            } else {
                c
            }
        })
        .collect()
}

fn format_rating(rating: f64) -> String {
    format!("⭐ {rating}/10")
}

pub fn card_markup(movie: &MovieRecord) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<div class="movie-card" data-id="{id}"><div class="movie-header"><h3 class="movie-title">{title}</h3><span class="movie-id">ID: {id}</span></div><div class="movie-meta">"#,
        id = movie.id,
        title = escape_html(&movie.title),
    );
    if let Some(genre) = &movie.genre {
        let _ = write!(
            html,
            r#"<span class="meta-item">🎭 {}</span>"#,
            escape_html(genre)
        );
    }
    if let Some(year) = movie.release_year {
        let _ = write!(html, r#"<span class="meta-item">📅 {year}</span>"#);
    }
    if let Some(rating) = movie.rating {
        let _ = write!(
            html,
            r#"<span class="movie-rating">{}</span>"#,
            format_rating(rating)
        );
    }
    html.push_str("</div>");
    if let Some(description) = &movie.description {
        let _ = write!(
            html,
            r#"<p class="movie-description">{}</p>"#,
            escape_html(description)
        );
    }
    html.push_str("</div>");
    html
}

pub fn cards_markup(movies: &[MovieRecord]) -> String {
    movies.iter().map(card_markup).collect::<Vec<_>>().join("\n")
}

pub fn card_text(movie: &MovieRecord) -> String {
    let mut meta = Vec::new();
    if let Some(genre) = &movie.genre {
        meta.push(format!("🎭 {}", sanitize_terminal(genre)));
    }
    if let Some(year) = movie.release_year {
        meta.push(format!("📅 {year}"));
    }
    if let Some(rating) = movie.rating {
        meta.push(format_rating(rating));
    }

    let mut out = format!("[{}] {}", movie.id, sanitize_terminal(&movie.title));
    if !meta.is_empty() {
        let _ = write!(out, "\n    {}", meta.join("  "));
    }
    if let Some(description) = &movie.description {
        let _ = write!(out, "\n    {}", sanitize_terminal(description));
    }
    out
}

pub fn movie_list(movies: &[MovieRecord]) -> String {
    if movies.is_empty() {
        return EMPTY_STATE.to_string();
    }
    movies.iter().map(card_text).collect::<Vec<_>>().join("\n")
}

pub fn summary_panel(stats: &Statistics) -> String {
    format!(
        "Total movies: {}\nAverage rating: {}\nLatest year: {}",
        stats.count,
        stats.avg_rating_label(),
        stats.latest_year_label()
    )
}
