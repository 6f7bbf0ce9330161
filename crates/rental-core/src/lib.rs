//! # rental-core: Pure Domain Logic for the Rental Admin
//!
//! Everything the admin knows about rentals, inventory and sales that does
//! not need a network or a disk.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       Rental Admin Architecture                         │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    rental-admin (pages, routes)                 │   │
//! │  │   Login ──► Dashboard ──► Categories / Brands / SKUs / Sales    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │          rental-client (HTTP, query cache, stores)              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ rental-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌───────────┐ ┌──────────────────┐  │   │
//! │  │   │  types   │ │ envelope │ │ hierarchy │ │ validation       │  │   │
//! │  │   │ Category │ │ shapes   │ │ paths     │ │ form schemas     │  │   │
//! │  │   │ Sku ...  │ │ errors   │ │ trees     │ │ page_state, keys │  │   │
//! │  │   └──────────┘ └──────────┘ └───────────┘ └──────────────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • NO TIMERS • PURE FUNCTIONS              │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Wire models (Category, Sku, Transaction, Purchase, InventoryUnit, Customer, ...)
//! - [`envelope`] - Response shape detection and error message extraction
//! - [`hierarchy`] - Category paths, levels, trees and breadcrumbs
//! - [`validation`] - Form schemas and field errors
//! - [`page_state`] - List, form and dialog state machines
//! - [`query_key`] - Hierarchical cache keys
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use rental_core::hierarchy;
//!
//! let root = hierarchy::preview(None, "Electronics");
//! assert_eq!(root.path, "Electronics");
//! assert_eq!(root.level, 0);
//! assert!(root.is_leaf);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod envelope;
pub mod error;
pub mod hierarchy;
pub mod page_state;
pub mod query_key;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult};
pub use page_state::{DialogState, FormPhase, FormState, ListState};
pub use query_key::{QueryKey, Resource};
pub use types::*;
pub use validation::{
    check, BrandForm, CategoryForm, CustomerForm, FormErrors, FormSchema, InventoryUnitForm,
    LocationForm, LoginForm, PaymentForm, PurchaseForm, PurchaseLineForm, PurchaseReturnForm,
    PurchaseReturnLineForm, ReturnContext, SaleForm, SaleLineForm, SkuForm, SupplierForm,
    TransferForm,
};
