//! # rental-client: Backend Access and Client State
//!
//! Talks to the rental backend over HTTP, caches what it reads, and keeps
//! the session and UI preferences in single-writer stores.
//!
//! ## Data Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │   page ──► Hooks::categories(params) ──► Query ──► QueryCache (fresh?)  │
//! │                                            │                            │
//! │                                            ▼ miss / stale               │
//! │                                  api::CategoriesApi::list               │
//! │                                            │                            │
//! │                                            ▼                            │
//! │                    HttpClient ──► Bearer token from AuthHandle          │
//! │                         │                                               │
//! │                         ▼                                               │
//! │              rental_core::envelope ──► Page<Category>                   │
//! │                                                                         │
//! │   page ──► Hooks::create_category() ──► Mutation                        │
//! │                 └─ success ──► QueryCache::invalidate(["categories"])   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`config`] - TOML + environment configuration
//! - [`http`] - The one HTTP client, auth header and error mapping
//! - [`api`] - One struct per backend resource
//! - [`cache`] - Typed query cache with group invalidation
//! - [`hooks`] - Query / Mutation primitives and per-resource bindings
//! - [`store`] - Auth and app stores with persistence
//! - [`error`] - Client and store error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod hooks;
pub mod http;
pub mod store;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use api::Api;
pub use cache::QueryCache;
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult, StoreError, StoreResult};
pub use hooks::{Hooks, Mutation, Query, QueryState};
pub use http::{HttpClient, NoSession, SessionProvider};
pub use store::{AppHandle, AppStore, AuthHandle, AuthStore, FileStorage, MemoryStorage, Storage};
