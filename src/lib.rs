//! Postboard - a small posts and tags REST backend
//!
//! Posts and tags are exposed as JSON:API documents behind bearer token
//! authentication. Accounts register with a username and password and trade
//! HTTP Basic credentials for tokens.

pub mod api;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
