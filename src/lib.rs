pub mod app;
pub mod catalog;
pub mod config;
pub mod error;
pub mod form;
pub mod models;
pub mod notify;
pub mod render;
pub mod stats;
pub mod sync;
