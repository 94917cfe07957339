pub mod app;
pub mod auth;
pub mod config;
pub mod domain;
pub mod enterobase;
pub mod error;
pub mod output;
pub mod pacing;
pub mod prompt;
pub mod registry;
pub mod report;
pub mod store;
