pub mod app;
pub mod app_state;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod modules;
pub mod services;
pub mod telemetry;
