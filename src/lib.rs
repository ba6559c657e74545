//! Asynchronous Article Analysis Service
//!
//! This library provides the core functionality for the article-analyzer
//! system: a submission API that enqueues URL-analysis jobs onto a durable
//! Redis-backed queue, and a worker that processes them and records status
//! transitions for polling.

pub mod app_state;
pub mod config;
pub mod models;
pub mod routes;
pub mod services;
