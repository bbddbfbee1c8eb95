pub mod analytics;
pub mod api;
pub mod config;
pub mod db;
pub mod ledger;
pub mod models;
pub mod reminders;
