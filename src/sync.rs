use crate::catalog::CatalogApi;
use crate::error::{CatalogError, SyncError};
use crate::models::{MovieInput, MovieRecord, ServiceMessage};
use crate::stats::{compute_statistics, Statistics};
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

pub const LOAD_FAILED: &str = "Failed to load movies. Please check your connection.";

/// One consistent view of the mirror: the records of a single list response
/// and the statistics computed from exactly those records.
#[derive(Debug, Clone, Default)]
pub struct MirrorSnapshot {
    pub movies: Arc<Vec<MovieRecord>>,
    pub stats: Statistics,
    /// Ticket of the refresh that produced this snapshot. 0 before the first one.
    pub version: u64,
}

impl MirrorSnapshot {
    pub fn find(&self, id: i64) -> Option<&MovieRecord> {
        self.movies.iter().find(|m| m.id == id)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    fn verb(self) -> &'static str {
        match self {
            MutationKind::Create => "add",
            MutationKind::Update => "update",
            MutationKind::Delete => "delete",
        }
    }

    pub fn success_fallback(self) -> String {
        let past = match self {
            MutationKind::Create => "added",
            MutationKind::Update => "updated",
            MutationKind::Delete => "deleted",
        };
        format!("Movie {past} successfully!")
    }

    pub fn failure_fallback(self) -> String {
        format!("Failed to {} movie", self.verb())
    }

    pub fn retry_message(self) -> String {
        format!("Failed to {} movie. Please try again.", self.verb())
    }

    fn classify(self, err: CatalogError) -> SyncError {
        match err {
            CatalogError::Status { status, message } => SyncError::Service {
                status,
                message: message.unwrap_or_else(|| self.failure_fallback()),
            },
            CatalogError::Transport(_) | CatalogError::Decode(_) => {
                SyncError::Unavailable(self.retry_message())
            }
        }
    }
}

/// Outcome of a mutation the service accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct MutationReport {
    pub message: String,
    /// Set when the follow-up refresh failed; the mutation itself still went through.
    pub refresh_error: Option<SyncError>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServiceStatus {
    Online,
    Offline,
}

/// Keeps an in-memory mirror of the remote collection.
///
/// Every mutation is followed by a full refresh; the mirror is never patched
/// locally. Refreshes are version-stamped so a slow response can't overwrite a
/// newer one, and mutations run one at a time.
pub struct RemoteCollectionSync {
    api: Arc<dyn CatalogApi>,
    mirror: RwLock<MirrorSnapshot>,
    tickets: AtomicU64,
    mutations: Mutex<()>,
}

impl RemoteCollectionSync {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            api,
            mirror: RwLock::new(MirrorSnapshot::default()),
            tickets: AtomicU64::new(0),
            mutations: Mutex::new(()),
        }
    }

    pub async fn snapshot(&self) -> MirrorSnapshot {
        self.mirror.read().await.clone()
    }

    pub async fn statistics(&self) -> Statistics {
        self.mirror.read().await.stats
    }

    pub async fn find(&self, id: i64) -> Option<MovieRecord> {
        self.mirror.read().await.find(id).cloned()
    }

    /// Replaces the mirror with the current server collection.
    ///
    /// On failure the mirror is emptied and `Unavailable` is returned. Either
    /// way the result is dropped if a newer refresh has already been applied.
    pub async fn refresh(&self) -> Result<MirrorSnapshot, SyncError> {
        let ticket = self.tickets.fetch_add(1, Ordering::SeqCst) + 1;
        match self.api.list().await {
            Ok(movies) => {
                info!("Loaded {} movies", movies.len());
                Ok(self.apply(ticket, movies).await)
            }
            Err(e) => {
                warn!("Error fetching movies: {}", e);
                self.apply(ticket, Vec::new()).await;
                Err(SyncError::Unavailable(LOAD_FAILED.to_string()))
            }
        }
    }

    pub async fn create(&self, input: MovieInput) -> Result<MutationReport, SyncError> {
        validate(&input)?;
        self.mutate(MutationKind::Create, self.api.create(&input))
            .await
    }

    /// Full replacement of record `id`. Whether it exists is for the service to say.
    pub async fn update(&self, id: i64, input: MovieInput) -> Result<MutationReport, SyncError> {
        validate(&input)?;
        self.mutate(MutationKind::Update, self.api.update(id, &input))
            .await
    }

    pub async fn delete(&self, id: i64) -> Result<MutationReport, SyncError> {
        self.mutate(MutationKind::Delete, self.api.delete(id)).await
    }

    pub async fn probe(&self) -> ServiceStatus {
        match self.api.probe().await {
            Ok(()) => ServiceStatus::Online,
            Err(e) => {
                warn!("Catalog probe failed: {}", e);
                ServiceStatus::Offline
            }
        }
    }

    async fn mutate<F>(&self, kind: MutationKind, request: F) -> Result<MutationReport, SyncError>
    where
        F: Future<Output = Result<ServiceMessage, CatalogError>>,
    {
        let _turn = self.mutations.lock().await;

        let reply = match request.await {
            Ok(reply) => reply,
            Err(e) => {
                warn!("Error trying to {} movie: {}", kind.verb(), e);
                return Err(kind.classify(e));
            }
        };
        let message = reply
            .message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| kind.success_fallback());
        info!("{}", message);

        let refresh_error = self.refresh().await.err();
        Ok(MutationReport {
            message,
            refresh_error,
        })
    }

    async fn apply(&self, ticket: u64, movies: Vec<MovieRecord>) -> MirrorSnapshot {
        let mut mirror = self.mirror.write().await;
        if ticket <= mirror.version {
            debug!(
                ticket,
                applied = mirror.version,
                "Discarding stale catalog response"
            );
            return mirror.clone();
        }
        let stats = compute_statistics(&movies);
        *mirror = MirrorSnapshot {
            movies: Arc::new(movies),
            stats,
            version: ticket,
        };
        mirror.clone()
    }
}

fn validate(input: &MovieInput) -> Result<(), SyncError> {
    if input.title.trim().is_empty() {
        return Err(SyncError::Validation("Title is required".to_string()));
    }
    Ok(())
}
