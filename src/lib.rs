#![recursion_limit = "512"]

pub mod auth;
pub mod cache;
pub mod config;
pub mod context;
pub mod database;
pub mod domains;
pub mod errors;
pub mod http;
pub mod storage;
pub mod types;
pub mod validation;

pub use context::AppContext;
pub use http::dispatch;
