//! `/suppliers` endpoints and supplier analytics.

use rental_core::{
    Page, PageRequest, Supplier, SupplierAnalytics, SupplierCreate, SupplierListParams,
    SupplierPerformanceUpdate, SupplierStatusUpdate, SupplierTier, SupplierUpdate,
};
use serde::Serialize;
use tracing::{info, warn};

use super::segment;
use crate::error::ClientResult;
use crate::http::HttpClient;

/// Rows fetched when analytics are computed locally.
pub const ANALYTICS_FALLBACK_LIMIT: u64 = 1000;

#[derive(Serialize)]
struct NameSearch<'a> {
    name: &'a str,
    limit: u64,
}

#[derive(Serialize)]
struct Limit {
    limit: u64,
}

#[derive(Debug, Clone)]
pub struct SuppliersApi {
    http: HttpClient,
}

impl SuppliersApi {
    pub fn new(http: HttpClient) -> Self {
        SuppliersApi { http }
    }

    pub async fn create(&self, payload: &SupplierCreate) -> ClientResult<Supplier> {
        let supplier: Supplier = self.http.post("/suppliers/", payload).await?;
        info!(supplier_id = %supplier.id, code = %supplier.supplier_code, "Supplier created");
        Ok(supplier)
    }

    pub async fn list(&self, params: &SupplierListParams) -> ClientResult<Page<Supplier>> {
        self.http.get_page("/suppliers/", params).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Supplier> {
        self.http.get(&format!("/suppliers/{}", segment(id))).await
    }

    pub async fn by_code(&self, code: &str) -> ClientResult<Supplier> {
        self.http
            .get(&format!("/suppliers/code/{}", segment(code)))
            .await
    }

    pub async fn update(&self, id: &str, payload: &SupplierUpdate) -> ClientResult<Supplier> {
        let supplier: Supplier = self
            .http
            .put(&format!("/suppliers/{}", segment(id)), payload)
            .await?;
        info!(supplier_id = %supplier.id, "Supplier updated");
        Ok(supplier)
    }

    /// `PATCH /suppliers/{id}/status`.
    pub async fn set_active(&self, id: &str, is_active: bool) -> ClientResult<Supplier> {
        let supplier: Supplier = self
            .http
            .patch(
                &format!("/suppliers/{}/status", segment(id)),
                &SupplierStatusUpdate { is_active },
            )
            .await?;
        info!(supplier_id = %supplier.id, is_active, "Supplier status changed");
        Ok(supplier)
    }

    /// `PATCH /suppliers/{id}/performance`.
    pub async fn update_performance(
        &self,
        id: &str,
        metrics: &SupplierPerformanceUpdate,
    ) -> ClientResult<Supplier> {
        self.http
            .patch(&format!("/suppliers/{}/performance", segment(id)), metrics)
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.http
            .delete(&format!("/suppliers/{}", segment(id)))
            .await?;
        info!(supplier_id = %id, "Supplier deleted");
        Ok(())
    }

    /// `GET /suppliers/search/name?name=&limit=`.
    pub async fn search_by_name(&self, name: &str, limit: u64) -> ClientResult<Vec<Supplier>> {
        let page = self
            .http
            .get_page("/suppliers/search/name", &NameSearch { name, limit })
            .await?;
        Ok(page.items)
    }

    /// `GET /suppliers/tier/{tier}`.
    pub async fn by_tier(&self, tier: SupplierTier, page: PageRequest) -> ClientResult<Page<Supplier>> {
        self.http
            .get_page(&format!("/suppliers/tier/{}", tier.as_str()), &page)
            .await
    }

    /// `GET /suppliers/top/by-spend`.
    pub async fn top_by_spend(&self, limit: u64) -> ClientResult<Vec<Supplier>> {
        let page = self
            .http
            .get_page("/suppliers/top/by-spend", &Limit { limit })
            .await?;
        Ok(page.items)
    }

    /// `GET /analytics/suppliers`.
    ///
    /// When the analytics endpoint fails for any reason other than an
    /// expired session, the numbers are computed from the supplier list.
    pub async fn analytics(&self) -> ClientResult<SupplierAnalytics> {
        match self.http.get("/analytics/suppliers").await {
            Ok(analytics) => Ok(analytics),
            Err(e) if e.is_unauthorized() => Err(e),
            Err(e) => {
                warn!(error = %e, "Supplier analytics unavailable, computing from supplier list");
                let params = SupplierListParams {
                    page: PageRequest::new(0, ANALYTICS_FALLBACK_LIMIT),
                    ..Default::default()
                };
                let page = self.list(&params).await?;
                let mut analytics = SupplierAnalytics::from_suppliers(&page.items);
                analytics.total_suppliers = page.total.max(page.items.len() as u64);
                Ok(analytics)
            }
        }
    }
}
