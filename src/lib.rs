//! Online Leads Eligibility API Library
//!
//! Screens loan leads submitted from online campaigns against a fixed chain
//! of eligibility rules and answers with a uniform result envelope.
//!
//! # Modules
//!
//! - `api`: API definitions.
//! - `core`: Eligibility pipeline.
//! - `integrations`: External collaborators.
//! - `auth`: Token and API-access gate.
//! - `circuit_breaker`: Circuit breaker for external lookups.
//! - `config`: Configuration management.
//! - `db`: Database connection and pool management.
//! - `eligibility`: Pipeline orchestration.
//! - `errors`: Error handling types.
//! - `handlers`: HTTP request handlers and router.
//! - `history`: Diagnostic logs and API call history.
//! - `models`: Request fields and the typed lead.
//! - `openapi`: OpenAPI document and Swagger UI.
//! - `pincode_client`: Pincode serviceability client.
//! - `response`: Result envelope.
//! - `rules`: Ordered eligibility rules.
//! - `sectors`: Sector and sub-sector exclusion lists.
//! - `thresholds`: Rule bounds and their cache.
//! - `validation`: Request validation.

pub mod api;
pub mod core;
pub mod integrations;

pub mod auth;
pub mod circuit_breaker;
pub mod config;
pub mod db;
pub mod eligibility;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod openapi;
pub mod pincode_client;
pub mod response;
pub mod rules;
pub mod sectors;
pub mod thresholds;
pub mod validation;
