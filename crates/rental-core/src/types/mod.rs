//! # Domain Types
//!
//! Wire models for every backend resource the admin touches.
//!
//! ## Resource Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Module         Entity             Backend path                         │
//! │  ─────────────  ─────────────────  ──────────────────────────────────   │
//! │  category       Category           /categories                          │
//! │  brand          Brand              /brands                              │
//! │  supplier       Supplier           /suppliers, /analytics/suppliers     │
//! │  location       Location           /locations                           │
//! │  sku            Sku                /skus                                │
//! │  transaction    Transaction        /transactions                        │
//! │  purchase       Purchase, Return   /transactions/purchase(-returns)     │
//! │  inventory      InventoryUnit      /inventory/units                     │
//! │  customer       Customer           /customers                           │
//! │  rental         RentalDueToday     /rentals-due-today                   │
//! │  auth           User, LoginResp.   /auth                                │
//! │  notification   Notification       (client only)                        │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! All entities are snapshots of server state. Nothing here is
//! authoritative; create/update/delete always goes through the API.

pub mod auth;
pub mod brand;
pub mod category;
pub mod common;
pub mod customer;
pub mod inventory;
pub mod location;
pub mod notification;
pub mod purchase;
pub mod rental;
pub mod sku;
pub mod supplier;
pub mod transaction;

pub use auth::{EffectivePermissions, LoginRequest, LoginResponse, User, UserRole, UserType};
pub use brand::{Brand, BrandCreate, BrandListParams, BrandUpdate};
pub use category::{
    Category, CategoryCreate, CategoryListParams, CategoryMove, CategoryStatistics, CategoryTree,
    CategoryUpdate,
};
pub use common::{Audit, Page, PageRequest, DEFAULT_PAGE_SIZE};
pub use customer::{
    BlacklistAction, BlacklistStatus, Customer, CustomerCreate, CustomerListParams, CustomerTier,
    CustomerType, CustomerUpdate,
};
pub use inventory::{
    BulkTransfer, BulkTransferResult, ConditionGrade, InventoryFilters, InventoryStatus,
    InventoryStatusUpdate, InventoryUnit, InventoryUnitCreate, StatusCountParams, StatusCounts,
    TransferFailure, UnitTransfer,
};
pub use location::{Location, LocationListParams, LocationPayload, LocationType};
pub use notification::{
    AppSettings, Notification, NotificationKind, SettingsPatch, Theme, TimeFormat,
    MAX_NOTIFICATIONS,
};
pub use purchase::{
    returnable, Purchase, PurchaseHistoryParams, PurchaseItem, PurchaseItemRecord,
    PurchaseListParams, PurchaseRecord, PurchaseReturn, PurchaseReturnItem,
    PurchaseReturnItemRecord, PurchaseReturnListParams, PurchaseReturnRecord, PurchaseStatus,
    ReturnReason, ReturnStatus, ReturnValidation, ReturnableItem, SupplierRef,
};
pub use rental::{DueUrgency, RentalDueItem, RentalDueToday, RentalsDueParams, RentalsDueSummary};
pub use sku::{Sku, SkuCreate, SkuListParams, SkuRentalSettings, SkuSaleSettings, SkuUpdate};
pub use supplier::{
    PaymentTerms, Supplier, SupplierAnalytics, SupplierCreate, SupplierListParams,
    SupplierPerformanceUpdate, SupplierStatusUpdate, SupplierTier, SupplierType, SupplierUpdate,
};
pub use transaction::{
    CancelRequest, CreateSaleRequest, DailySummary, PaymentMethod, PaymentRequest, PaymentStatus,
    SaleItem, Transaction, TransactionLine, TransactionListParams, TransactionStatus,
    TransactionType,
};
