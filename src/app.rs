use crate::catalog::{CatalogApi, CatalogClient};
use crate::config::CatalogConfig;
use crate::error::SyncError;
use crate::form::MovieForm;
use crate::notify::{Notification, NotificationCenter};
use crate::render;
use crate::sync::{MutationReport, RemoteCollectionSync, ServiceStatus};
use anyhow::Result;
use chrono::Utc;
use clap::{Args, Subcommand};
use std::sync::Arc;
use tracing::info;

pub const OFFLINE_MESSAGE: &str = "API is currently offline. Please check the backend server.";
pub const NOT_FOUND_MESSAGE: &str = "Movie not found";
pub const CANCELLED_MESSAGE: &str = "Delete cancelled";

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Print every movie as a card
    List {
        #[arg(long)]
        html: bool,
    },
    /// Print the summary panel
    Stats,
    /// Check whether the catalog service is reachable
    Status,
    /// Print a single movie
    Show { id: i64 },
    /// Add a movie
    Add {
        #[command(flatten)]
        fields: MovieFields,
    },
    /// Replace a movie; fields left out keep their current value
    Update {
        id: i64,
        #[command(flatten)]
        fields: MovieFields,
    },
    /// Delete a movie
    Delete {
        id: i64,
        /// Skip the confirmation prompt
        #[arg(long)]
        yes: bool,
    },
}

/// Raw form values from the command line. An empty string clears an optional field.
#[derive(Debug, Clone, Default, Args)]
pub struct MovieFields {
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long)]
    pub genre: Option<String>,
    #[arg(long = "year")]
    pub release_year: Option<String>,
    #[arg(long)]
    pub rating: Option<String>,
}

impl MovieFields {
    fn apply_to(self, mut form: MovieForm) -> MovieForm {
        if let Some(v) = self.title {
            form.title = v;
        }
        if let Some(v) = self.description {
            form.description = v;
        }
        if let Some(v) = self.genre {
            form.genre = v;
        }
        if let Some(v) = self.release_year {
            form.release_year = v;
        }
        if let Some(v) = self.rating {
            form.rating = v;
        }
        form
    }
}

/// What a command produced: the page body plus the notifications raised on the way.
#[derive(Debug, Default)]
pub struct Report {
    pub output: Option<String>,
    pub notifications: Vec<Notification>,
}

pub struct App {
    sync: Arc<RemoteCollectionSync>,
    notices: NotificationCenter,
}

impl App {
    pub fn new(api: Arc<dyn CatalogApi>) -> Self {
        Self {
            sync: Arc::new(RemoteCollectionSync::new(api)),
            notices: NotificationCenter::new(),
        }
    }

    pub fn from_config(config: &CatalogConfig) -> Result<Self> {
        let client = CatalogClient::new(config)?;
        info!("Using catalog at {}", client.base_url());
        Ok(Self::new(Arc::new(client)))
    }

    /// Startup probe; an unreachable service is reported but never fatal.
    pub async fn check_status(&mut self) -> ServiceStatus {
        let status = self.sync.probe().await;
        if status == ServiceStatus::Offline {
            self.notices.push(Notification::error(OFFLINE_MESSAGE));
        }
        status
    }

    /// Runs one command. `confirm` is asked before anything is deleted.
    pub async fn run<C>(&mut self, command: Command, confirm: C) -> Report
    where
        C: FnOnce(&str) -> bool,
    {
        let output = match command {
            Command::Status => Some(self.status_line().await),
            Command::List { html } => Some(self.list(html).await),
            Command::Stats => Some(self.stats().await),
            Command::Show { id } => self.show(id).await,
            Command::Add { fields } => self.add(fields).await,
            Command::Update { id, fields } => self.update(id, fields).await,
            Command::Delete { id, yes } => self.delete(id, yes, confirm).await,
        };
        Report {
            output,
            notifications: self.notices.take_active(Utc::now()),
        }
    }

    async fn status_line(&mut self) -> String {
        match self.check_status().await {
            ServiceStatus::Online => "API status: Online".to_string(),
            ServiceStatus::Offline => "API status: Offline".to_string(),
        }
    }

    async fn refresh(&mut self) -> bool {
        match self.sync.refresh().await {
            Ok(_) => true,
            Err(e) => {
                self.report_error(&e);
                false
            }
        }
    }

    async fn list(&mut self, html: bool) -> String {
        if !self.refresh().await {
            return render::LOAD_FAILED_STATE.to_string();
        }
        self.render_list(html).await
    }

    async fn render_list(&self, html: bool) -> String {
        let snapshot = self.sync.snapshot().await;
        if html && !snapshot.movies.is_empty() {
            render::cards_markup(&snapshot.movies)
        } else {
            render::movie_list(&snapshot.movies)
        }
    }

    async fn stats(&mut self) -> String {
        self.refresh().await;
        render::summary_panel(&self.sync.statistics().await)
    }

    async fn show(&mut self, id: i64) -> Option<String> {
        if !self.refresh().await {
            return Some(render::LOAD_FAILED_STATE.to_string());
        }
        match self.sync.find(id).await {
            Some(movie) => Some(render::card_text(&movie)),
            None => {
                self.notices.push(Notification::error(NOT_FOUND_MESSAGE));
                None
            }
        }
    }

    async fn add(&mut self, fields: MovieFields) -> Option<String> {
        let input = match fields.apply_to(MovieForm::default()).into_input() {
            Ok(input) => input,
            Err(e) => {
                self.report_error(&e);
                return None;
            }
        };
        match self.sync.create(input).await {
            Ok(report) => Some(self.after_mutation(report).await),
            Err(e) => {
                self.report_error(&e);
                None
            }
        }
    }

    async fn update(&mut self, id: i64, fields: MovieFields) -> Option<String> {
        if !self.refresh().await {
            return Some(render::LOAD_FAILED_STATE.to_string());
        }
        let Some(existing) = self.sync.find(id).await else {
            self.notices.push(Notification::error(NOT_FOUND_MESSAGE));
            return None;
        };
        let input = match fields.apply_to(MovieForm::from_record(&existing)).into_input() {
            Ok(input) => input,
            Err(e) => {
                self.report_error(&e);
                return None;
            }
        };
        match self.sync.update(id, input).await {
            Ok(report) => Some(self.after_mutation(report).await),
            Err(e) => {
                self.report_error(&e);
                None
            }
        }
    }

    async fn delete<C>(&mut self, id: i64, yes: bool, confirm: C) -> Option<String>
    where
        C: FnOnce(&str) -> bool,
    {
        if !self.refresh().await {
            return Some(render::LOAD_FAILED_STATE.to_string());
        }
        let Some(existing) = self.sync.find(id).await else {
            self.notices.push(Notification::error(NOT_FOUND_MESSAGE));
            return None;
        };
        let prompt = format!(
            "Are you sure you want to delete \"{}\"?",
            render::sanitize_terminal(&existing.title)
        );
        if !yes && !confirm(&prompt) {
            info!("Delete of movie {} cancelled", id);
            self.notices.push(Notification::info(CANCELLED_MESSAGE));
            return None;
        }
        match self.sync.delete(id).await {
            Ok(report) => Some(self.after_mutation(report).await),
            Err(e) => {
                self.report_error(&e);
                None
            }
        }
    }

    fn report_error(&mut self, err: &SyncError) {
        self.notices.push(Notification::from(err));
    }

    async fn after_mutation(&mut self, report: MutationReport) -> String {
        self.notices.push(Notification::success(report.message));
        match report.refresh_error {
            Some(err) => {
                self.report_error(&err);
                render::LOAD_FAILED_STATE.to_string()
            }
            None => self.render_list(false).await,
        }
    }
}
