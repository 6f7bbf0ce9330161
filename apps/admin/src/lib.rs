//! # Rental Admin Library
//!
//! Page controllers for the rental/inventory admin, plus the mount/unmount
//! lifecycle that wires them to the stores and the backend.
//!
//! ## Module Organization
//! ```text
//! rental_admin/
//! ├── lib.rs            ◄─── You are here (logging, re-exports)
//! ├── app.rs            ◄─── AdminApp: mount, open, logout, unmount
//! ├── navigation.rs     ◄─── Routes, auth guard, Navigator
//! ├── pages/
//! │   ├── mod.rs        ◄─── PageContext shared by every page
//! │   ├── listing.rs    ◄─── Paginated list plumbing
//! │   ├── editor.rs     ◄─── Create / edit / delete dialogs
//! │   ├── login.rs      ◄─── /login
//! │   ├── dashboard.rs  ◄─── /dashboard
//! │   ├── categories.rs ◄─── /products/categories and /products/categories/new
//! │   ├── brands.rs     ◄─── /products/brands
//! │   ├── suppliers.rs  ◄─── /purchases/suppliers
//! │   ├── locations.rs  ◄─── /admin/locations
//! │   ├── skus.rs       ◄─── /products/skus
//! │   ├── sales.rs      ◄─── /sales
//! │   └── rentals_due.rs◄─── /rentals/due-today
//! └── error.rs          ◄─── AppError for pages and commands
//! ```
//!
//! ## Page Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        One Page Controller                              │
//! │                                                                         │
//! │  ┌──────────────────┐ ┌──────────────────┐ ┌──────────────────────┐   │
//! │  │  ListState       │ │  FormState       │ │  DialogState         │   │
//! │  │  (rows / empty / │ │  (draft, inline  │ │  (which modal, for   │   │
//! │  │   failed)        │ │   errors, banner)│ │   which row)         │   │
//! │  └──────────────────┘ └──────────────────┘ └──────────────────────┘   │
//! │                                                                         │
//! │  success ──► invalidate cache group ──► toast ──► navigate             │
//! │  failure ──► keep draft ──► banner + toast ──► stay                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod app;
pub mod error;
pub mod navigation;
pub mod pages;

pub use app::AdminApp;
pub use error::{AppError, AppResult, ErrorCode};
pub use navigation::{guard, HistoryNavigator, Navigator, Route};
pub use pages::PageContext;

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_LOG_FILTER: &str = "info,rental=debug,reqwest=warn";

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=rental_client=trace` - Show trace for the client crate only
/// - Default: `info,rental=debug,reqwest=warn`
///
/// Safe to call more than once; later calls are ignored.
pub fn init_tracing() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}
