pub mod auth;
pub mod db;
pub mod error;
pub mod import;
pub mod models;
pub mod store;
