//! HousePal Frontend
//!
//! Session handling, route guards and the helper task board of the HousePal
//! marketplace, rendered with Leptos.

pub mod api;
pub mod app;
pub mod auth;
pub mod board;
pub mod components;
pub mod config;
pub mod context;
pub mod error;
pub mod models;
pub mod router;
pub mod session;
pub mod store;
