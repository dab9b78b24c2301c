/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Authentication endpoints (register, login)
/// - `buyers`: Buyer management endpoints
/// - `invoices`: Invoice draft store and FBR submission
/// - `settings`: Tenant FBR credential management

pub mod auth;
pub mod buyers;
pub mod health;
pub mod invoices;
pub mod settings;
