//! Article Feed - A server-rendered front end for an article/blog REST API
//!
//! This crate renders categories, articles and comments fetched from a
//! backend API. The browser keeps the session token in a cookie and each
//! user action swaps one HTML fragment into the page.

pub mod api;
pub mod config;
pub mod models;
pub mod routes;
pub mod session;
