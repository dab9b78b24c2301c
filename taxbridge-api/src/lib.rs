//! # TaxBridge API Server Library
//!
//! This library provides the core functionality for the TaxBridge API
//! server: multi-tenant registration and login, buyer management, the
//! invoice draft store and the FBR submission endpoint.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `routes`: API route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod routes;
