pub mod config;
pub mod cookies;
pub mod dashboard;
pub mod env_file;
pub mod fetch;
pub mod formatter;
pub mod models;
pub mod poller;
pub mod process;
pub mod store;
