//! # Tasklist API Server Library
//!
//! This library provides the HTTP layer of the tasklist service.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Extractors that report rejections in the error envelope
//! - `routes`: API route handlers and response views

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod routes;
