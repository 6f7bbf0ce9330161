//! # Resource APIs
//!
//! One struct per backend resource. Each method is exactly one HTTP request
//! (the supplier analytics fallback is the single documented exception).
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────────┐
//! │  Api                                                                 │
//! │  ├── auth          /auth/login, /auth/me, /auth/logout               │
//! │  ├── categories    /categories/...                                   │
//! │  ├── brands        /brands/...                                       │
//! │  ├── suppliers     /suppliers/..., /analytics/suppliers              │
//! │  ├── locations     /locations/...                                    │
//! │  ├── skus          /skus/...                                         │
//! │  ├── sales         /transactions/...                                 │
//! │  ├── purchases     /transactions/purchases, .../purchase-returns     │
//! │  ├── inventory     /inventory/units/...                              │
//! │  ├── customers     /customers/...                                    │
//! │  └── rentals_due   /rentals-due-today/...                            │
//! └──────────────────────────────────────────────────────────────────────┘
//! ```

pub mod auth;
pub mod brands;
pub mod categories;
pub mod customers;
pub mod inventory;
pub mod locations;
pub mod purchases;
pub mod rentals_due;
pub mod sales;
pub mod skus;
pub mod suppliers;

pub use auth::AuthApi;
pub use brands::BrandsApi;
pub use categories::CategoriesApi;
pub use customers::CustomersApi;
pub use inventory::InventoryApi;
pub use locations::LocationsApi;
pub use purchases::PurchasesApi;
pub use rentals_due::RentalsDueApi;
pub use sales::SalesApi;
pub use skus::SkusApi;
pub use suppliers::SuppliersApi;

use crate::http::HttpClient;

/// Query for endpoints that take none.
pub(crate) const NO_QUERY: &[(&str, &str)] = &[];

/// Every resource API over one shared HTTP client.
#[derive(Debug, Clone)]
pub struct Api {
    pub auth: AuthApi,
    pub categories: CategoriesApi,
    pub brands: BrandsApi,
    pub suppliers: SuppliersApi,
    pub locations: LocationsApi,
    pub skus: SkusApi,
    pub sales: SalesApi,
    pub purchases: PurchasesApi,
    pub inventory: InventoryApi,
    pub customers: CustomersApi,
    pub rentals_due: RentalsDueApi,
}

impl Api {
    pub fn new(http: HttpClient) -> Self {
        Api {
            auth: AuthApi::new(http.clone()),
            categories: CategoriesApi::new(http.clone()),
            brands: BrandsApi::new(http.clone()),
            suppliers: SuppliersApi::new(http.clone()),
            locations: LocationsApi::new(http.clone()),
            skus: SkusApi::new(http.clone()),
            sales: SalesApi::new(http.clone()),
            purchases: PurchasesApi::new(http.clone()),
            inventory: InventoryApi::new(http.clone()),
            customers: CustomersApi::new(http.clone()),
            rentals_due: RentalsDueApi::new(http),
        }
    }
}

/// Percent-encodes one path segment (RFC 3986 unreserved characters pass).
pub(crate) fn segment(raw: &str) -> String {
    urlencoding::encode(raw).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_segment_encoding() {
        assert_eq!(segment("WH-01"), "WH-01");
        assert_eq!(segment("Electronics/Cameras"), "Electronics%2FCameras");
        assert_eq!(segment("Canon EOS"), "Canon%20EOS");
        assert_eq!(segment("é"), "%C3%A9");
        assert_eq!(segment("a?b#c&d=e"), "a%3Fb%23c%26d%3De");
        assert_eq!(segment("~sku_1.2"), "~sku_1.2");
    }
}
