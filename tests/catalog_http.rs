//! Runs the real HTTP client against an in-process catalog service.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use cinecatalog::app::{
    App, Command, MovieFields, CANCELLED_MESSAGE, NOT_FOUND_MESSAGE, OFFLINE_MESSAGE,
};
use cinecatalog::catalog::{CatalogApi, CatalogClient};
use cinecatalog::config::CatalogConfig;
use cinecatalog::error::{CatalogError, SyncError};
use cinecatalog::models::{MovieInput, MovieRecord};
use cinecatalog::notify::Severity;
use cinecatalog::render::LOAD_FAILED_STATE;
use cinecatalog::sync::{RemoteCollectionSync, ServiceStatus, LOAD_FAILED};
use serde_json::json;
use std::sync::{Arc, Mutex};

#[derive(Default)]
struct Store {
    next_id: i64,
    movies: Vec<MovieRecord>,
    list_down: bool,
    /// Raw 200 body served instead of the movie array.
    list_body: Option<String>,
    reject_create: Option<(StatusCode, String)>,
    mutation_requests: usize,
}

type Shared = Arc<Mutex<Store>>;

fn seeded() -> Shared {
    Arc::new(Mutex::new(Store {
        next_id: 3,
        movies: vec![
            MovieRecord {
                id: 1,
                title: "Heat".to_string(),
                description: Some("Cops and robbers".to_string()),
                genre: Some("Crime".to_string()),
                release_year: Some(1995),
                rating: Some(7.0),
            },
            MovieRecord {
                id: 2,
                title: "Primer".to_string(),
                description: None,
                genre: None,
                release_year: Some(2004),
                rating: Some(9.0),
            },
        ],
        ..Store::default()
    }))
}

async fn list(State(store): State<Shared>) -> Response {
    let store = store.lock().unwrap();
    if store.list_down {
        return (StatusCode::SERVICE_UNAVAILABLE, "down").into_response();
    }
    if let Some(body) = store.list_body.clone() {
        return (StatusCode::OK, body).into_response();
    }
    Json(store.movies.clone()).into_response()
}

async fn create(State(store): State<Shared>, Json(input): Json<MovieInput>) -> Response {
    let mut store = store.lock().unwrap();
    store.mutation_requests += 1;
    if let Some((status, body)) = store.reject_create.clone() {
        return (status, body).into_response();
    }
    let id = store.next_id;
    store.next_id += 1;
    let movie = MovieRecord {
        id,
        title: input.title,
        description: input.description,
        genre: input.genre,
        release_year: input.release_year,
        rating: input.rating,
    };
    store.movies.push(movie.clone());
    (
        StatusCode::CREATED,
        Json(json!({ "message": "Movie created", "movie": movie })),
    )
        .into_response()
}

async fn update(
    State(store): State<Shared>,
    Path(id): Path<i64>,
    Json(input): Json<MovieInput>,
) -> Response {
    let mut store = store.lock().unwrap();
    store.mutation_requests += 1;
    match store.movies.iter_mut().find(|m| m.id == id) {
        Some(movie) => {
            movie.title = input.title;
            movie.description = input.description;
            movie.genre = input.genre;
            movie.release_year = input.release_year;
            movie.rating = input.rating;
            // No message: the client falls back to its own wording.
            Json(json!({ "movie": movie })).into_response()
        }
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Movie not found" })),
        )
            .into_response(),
    }
}

async fn delete(State(store): State<Shared>, Path(id): Path<i64>) -> Response {
    let mut store = store.lock().unwrap();
    store.mutation_requests += 1;
    let before = store.movies.len();
    store.movies.retain(|m| m.id != id);
    if store.movies.len() == before {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Movie not found" })),
        )
            .into_response();
    }
    Json(json!({ "message": "Movie deleted" })).into_response()
}

/// Bind to port 0 and return the catalog base URL.
async fn start_service(store: Shared) -> String {
    let app = Router::new()
        .route("/api/movies", get(list).post(create))
        .route("/api/movies/:id", axum::routing::put(update).delete(delete))
        .with_state(store);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}/api/movies")
}

/// A base URL nothing listens on.
async fn dead_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{addr}/api/movies")
}

fn client_for(base_url: &str) -> Arc<dyn CatalogApi> {
    Arc::new(CatalogClient::new(&CatalogConfig::new(base_url)).expect("client builds"))
}

async fn sync_for(store: &Shared) -> RemoteCollectionSync {
    let base = start_service(store.clone()).await;
    RemoteCollectionSync::new(client_for(&base))
}

#[tokio::test]
async fn refresh_mirrors_the_service() {
    let store = seeded();
    let sync = sync_for(&store).await;

    let snapshot = sync.refresh().await.expect("refresh succeeds");
    assert_eq!(snapshot.movies.len(), 2);
    assert_eq!(snapshot.stats.count, 2);
    assert_eq!(snapshot.stats.avg_rating, Some(8.0));
    assert_eq!(snapshot.stats.latest_year, Some(2004));
    assert_eq!(*snapshot.movies, store.lock().unwrap().movies);
}

#[tokio::test]
async fn create_adds_exactly_one_record() {
    let store = seeded();
    let sync = sync_for(&store).await;
    let before = sync.refresh().await.unwrap().movies.len();

    let input = MovieInput {
        genre: Some("Sci-Fi".to_string()),
        rating: Some(0.0),
        ..MovieInput::titled("Stalker")
    };
    let report = sync.create(input.clone()).await.expect("create succeeds");
    assert_eq!(report.message, "Movie created");
    assert!(report.refresh_error.is_none());

    let snapshot = sync.snapshot().await;
    assert_eq!(snapshot.movies.len(), before + 1);
    let created = snapshot
        .movies
        .iter()
        .find(|m| input.matches(m))
        .expect("created record is mirrored");
    assert_eq!(created.id, 3);
    // The zero rating counts toward the average: (7 + 9 + 0) / 3.
    assert_eq!(snapshot.stats.avg_rating, Some(16.0 / 3.0));
}

#[tokio::test]
async fn delete_removes_the_record() {
    let store = seeded();
    let sync = sync_for(&store).await;
    sync.refresh().await.unwrap();

    let report = sync.delete(1).await.expect("delete succeeds");
    assert_eq!(report.message, "Movie deleted");
    let snapshot = sync.snapshot().await;
    assert!(snapshot.find(1).is_none());
    assert_eq!(snapshot.movies.len(), 1);
}

#[tokio::test]
async fn update_without_message_uses_fallback() {
    let store = seeded();
    let sync = sync_for(&store).await;
    sync.refresh().await.unwrap();

    let input = MovieInput {
        release_year: Some(1996),
        ..MovieInput::titled("Heat (Director's Cut)")
    };
    let report = sync.update(1, input.clone()).await.expect("update succeeds");
    assert_eq!(report.message, "Movie updated successfully!");
    let updated = sync.find(1).await.expect("record still there");
    assert!(input.matches(&updated));
    // Full replacement: the description was not sent, so it is gone.
    assert_eq!(updated.description, None);
}

#[tokio::test]
async fn failed_create_leaves_mirror_untouched() {
    let store = seeded();
    store.lock().unwrap().reject_create = Some((
        StatusCode::BAD_REQUEST,
        json!({ "message": "Title must be unique" }).to_string(),
    ));
    let sync = sync_for(&store).await;
    let before = sync.refresh().await.unwrap();

    let err = sync
        .create(MovieInput::titled("Heat"))
        .await
        .expect_err("service rejects");
    assert_eq!(
        err,
        SyncError::Service {
            status: 400,
            message: "Title must be unique".to_string()
        }
    );

    let after = sync.snapshot().await;
    assert_eq!(after.version, before.version);
    assert_eq!(after.movies, before.movies);
}

#[tokio::test]
async fn failed_create_without_json_gets_generic_message() {
    let store = seeded();
    store.lock().unwrap().reject_create =
        Some((StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>".to_string()));
    let sync = sync_for(&store).await;

    let err = sync.create(MovieInput::titled("Heat")).await.unwrap_err();
    assert_eq!(
        err,
        SyncError::Service {
            status: 500,
            message: "Failed to add movie".to_string()
        }
    );
}

#[tokio::test]
async fn update_of_missing_record_reports_service_message() {
    let store = seeded();
    let sync = sync_for(&store).await;

    let err = sync.update(99, MovieInput::titled("Ghost")).await.unwrap_err();
    assert_eq!(err.user_message(), "Movie not found");
}

#[tokio::test]
async fn blank_title_never_reaches_the_service() {
    let store = seeded();
    let sync = sync_for(&store).await;

    let err = sync.create(MovieInput::titled("  ")).await.unwrap_err();
    assert!(matches!(err, SyncError::Validation(_)));
    assert_eq!(store.lock().unwrap().mutation_requests, 0);
}

#[tokio::test]
async fn outage_empties_the_mirror() {
    let store = seeded();
    let sync = sync_for(&store).await;
    sync.refresh().await.unwrap();

    store.lock().unwrap().list_down = true;
    let err = sync.refresh().await.unwrap_err();
    assert_eq!(err, SyncError::Unavailable(LOAD_FAILED.to_string()));

    let snapshot = sync.snapshot().await;
    assert!(snapshot.movies.is_empty());
    assert_eq!(snapshot.stats.count, 0);
    assert_eq!(snapshot.stats.avg_rating, None);
    assert_eq!(sync.probe().await, ServiceStatus::Offline);
}

#[tokio::test]
async fn malformed_list_reads_as_unavailable() {
    let store = seeded();
    let sync = sync_for(&store).await;
    sync.refresh().await.unwrap();
    assert_eq!(sync.snapshot().await.movies.len(), 2);

    store.lock().unwrap().list_body = Some(r#"{"movies":[]}"#.to_string());
    let base = start_service(store.clone()).await;
    assert!(matches!(
        client_for(&base).list().await,
        Err(CatalogError::Decode(_))
    ));

    let err = sync.refresh().await.unwrap_err();
    assert_eq!(err, SyncError::Unavailable(LOAD_FAILED.to_string()));
    let snapshot = sync.snapshot().await;
    assert!(snapshot.movies.is_empty());
    assert_eq!(snapshot.stats.count, 0);
}

#[tokio::test]
async fn unreachable_service_is_unavailable() {
    let sync = RemoteCollectionSync::new(client_for(&dead_url().await));

    assert!(sync.refresh().await.unwrap_err().is_unavailable());
    assert_eq!(sync.probe().await, ServiceStatus::Offline);
    let err = sync.create(MovieInput::titled("Heat")).await.unwrap_err();
    assert_eq!(
        err,
        SyncError::Unavailable("Failed to add movie. Please try again.".to_string())
    );
}

#[tokio::test]
async fn probe_reports_online() {
    let store = seeded();
    let sync = sync_for(&store).await;
    assert_eq!(sync.probe().await, ServiceStatus::Online);
}

#[tokio::test]
async fn app_add_reports_success_and_lists_cards() {
    let store = seeded();
    let base = start_service(store.clone()).await;
    let mut app = App::new(client_for(&base));

    let report = app
        .run(
            Command::Add {
                fields: MovieFields {
                    title: Some("Stalker".to_string()),
                    release_year: Some("1979".to_string()),
                    ..MovieFields::default()
                },
            },
            |_| unreachable!("add never asks for confirmation"),
        )
        .await;

    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].severity, Severity::Success);
    assert_eq!(report.notifications[0].message, "Movie created");
    let output = report.output.expect("list is printed");
    assert!(output.contains("[3] Stalker"));
    assert!(output.contains("📅 1979"));
}

#[tokio::test]
async fn app_add_with_bad_year_is_a_validation_error() {
    let store = seeded();
    let base = start_service(store.clone()).await;
    let mut app = App::new(client_for(&base));

    let report = app
        .run(
            Command::Add {
                fields: MovieFields {
                    title: Some("Stalker".to_string()),
                    release_year: Some("late seventies".to_string()),
                    ..MovieFields::default()
                },
            },
            |_| false,
        )
        .await;

    assert!(report.output.is_none());
    assert_eq!(report.notifications[0].severity, Severity::Error);
    assert_eq!(store.lock().unwrap().mutation_requests, 0);
}

#[tokio::test]
async fn app_update_keeps_unspecified_fields() {
    let store = seeded();
    let base = start_service(store.clone()).await;
    let mut app = App::new(client_for(&base));

    let report = app
        .run(
            Command::Update {
                id: 1,
                fields: MovieFields {
                    rating: Some("8".to_string()),
                    ..MovieFields::default()
                },
            },
            |_| false,
        )
        .await;
    assert_eq!(report.notifications[0].severity, Severity::Success);

    let heat = store.lock().unwrap().movies[0].clone();
    assert_eq!(heat.rating, Some(8.0));
    assert_eq!(heat.title, "Heat");
    assert_eq!(heat.description.as_deref(), Some("Cops and robbers"));
    assert_eq!(heat.release_year, Some(1995));
}

#[tokio::test]
async fn app_delete_asks_first() {
    let store = seeded();
    let base = start_service(store.clone()).await;
    let mut app = App::new(client_for(&base));

    let mut asked = String::new();
    let report = app
        .run(Command::Delete { id: 2, yes: false }, |prompt| {
            asked = prompt.to_string();
            false
        })
        .await;
    assert_eq!(asked, "Are you sure you want to delete \"Primer\"?");
    assert_eq!(report.notifications.len(), 1);
    assert_eq!(report.notifications[0].severity, Severity::Info);
    assert_eq!(report.notifications[0].message, CANCELLED_MESSAGE);
    assert_eq!(store.lock().unwrap().movies.len(), 2);

    let report = app.run(Command::Delete { id: 2, yes: false }, |_| true).await;
    assert_eq!(report.notifications[0].message, "Movie deleted");
    assert_eq!(store.lock().unwrap().movies.len(), 1);

    let report = app.run(Command::Delete { id: 2, yes: true }, |_| true).await;
    assert_eq!(report.notifications[0].message, NOT_FOUND_MESSAGE);
}

#[tokio::test]
async fn app_offline_degrades_instead_of_failing() {
    let mut app = App::new(client_for(&dead_url().await));

    assert_eq!(app.check_status().await, ServiceStatus::Offline);
    let report = app.run(Command::List { html: false }, |_| false).await;
    assert_eq!(report.output.as_deref(), Some(LOAD_FAILED_STATE));
    let messages: Vec<_> = report
        .notifications
        .iter()
        .map(|n| n.message.as_str())
        .collect();
    assert_eq!(messages, vec![OFFLINE_MESSAGE, LOAD_FAILED]);

    let report = app.run(Command::Stats, |_| false).await;
    assert_eq!(
        report.output.as_deref(),
        Some("Total movies: 0\nAverage rating: N/A\nLatest year: N/A")
    );
}
