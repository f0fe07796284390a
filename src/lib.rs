//! # storefront-discovery
//!
//! Search and recommendation coordination for a retail storefront. One
//! session combines three independent sources into a single view:
//!
//! - text matches filtered from the product catalog
//! - image-similarity recommendations from an external service
//! - wishlist membership for every product shown
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration
//! - [`models`] - Products, wishlist entries and events, upload state, view types
//! - [`services::catalog`] - Read-only catalog snapshot
//! - [`services::wishlist`] - Wishlist store with a publish/subscribe channel
//! - [`services::query`] - Query state and the case-insensitive name filter
//! - [`services::recommender`] - Image similarity client (multipart upload)
//! - [`services::coordinator`] - The search coordinator and its upload state machine
//! - [`api`] - Axum HTTP surface hosting one coordinator per process

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod services;
