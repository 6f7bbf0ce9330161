//! `/inventory/units` endpoints.

use rental_core::{
    BulkTransfer, BulkTransferResult, InventoryFilters, InventoryStatus, InventoryStatusUpdate,
    InventoryUnit, InventoryUnitCreate, Page, StatusCountParams, StatusCounts, UnitTransfer,
};
use tracing::{info, warn};

use super::segment;
use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct InventoryApi {
    http: HttpClient,
}

impl InventoryApi {
    pub fn new(http: HttpClient) -> Self {
        InventoryApi { http }
    }

    pub async fn create(&self, payload: &InventoryUnitCreate) -> ClientResult<InventoryUnit> {
        let unit: InventoryUnit = self.http.post("/inventory/units", payload).await?;
        info!(unit_id = %unit.id, sku_id = %unit.sku_id, "Inventory unit created");
        Ok(unit)
    }

    /// `GET /inventory/units` with multi-valued filters as repeated keys.
    pub async fn list(&self, filters: &InventoryFilters) -> ClientResult<Page<InventoryUnit>> {
        self.http
            .get_page("/inventory/units", &filters.to_query())
            .await
    }

    pub async fn get(&self, id: &str) -> ClientResult<InventoryUnit> {
        self.http
            .get(&format!("/inventory/units/{}", segment(id)))
            .await
    }

    pub async fn by_code(&self, code: &str) -> ClientResult<InventoryUnit> {
        self.http
            .get(&format!("/inventory/units/code/{}", segment(code)))
            .await
    }

    /// `PUT /inventory/units/{id}/status`.
    pub async fn set_status(
        &self,
        id: &str,
        status: InventoryStatus,
        notes: Option<String>,
    ) -> ClientResult<InventoryUnit> {
        let unit: InventoryUnit = self
            .http
            .put(
                &format!("/inventory/units/{}/status", segment(id)),
                &InventoryStatusUpdate { status, notes },
            )
            .await?;
        info!(unit_id = %unit.id, status = %status, "Inventory status changed");
        Ok(unit)
    }

    /// `POST /inventory/units/{id}/transfer`.
    pub async fn transfer(&self, id: &str, transfer: &UnitTransfer) -> ClientResult<InventoryUnit> {
        let unit: InventoryUnit = self
            .http
            .post(&format!("/inventory/units/{}/transfer", segment(id)), transfer)
            .await?;
        info!(unit_id = %unit.id, to = %transfer.to_location_id, "Inventory unit transferred");
        Ok(unit)
    }

    /// `POST /inventory/units/transfer/bulk`. Partial failure is not an error.
    pub async fn transfer_bulk(&self, transfer: &BulkTransfer) -> ClientResult<BulkTransferResult> {
        let result: BulkTransferResult = self
            .http
            .post("/inventory/units/transfer/bulk", transfer)
            .await?;
        if !result.failed.is_empty() {
            warn!(
                transferred = result.transferred.len(),
                failed = result.failed.len(),
                "Bulk transfer partially failed"
            );
        }
        Ok(result)
    }

    /// `GET /inventory/units/status-count`.
    pub async fn status_counts(&self, params: &StatusCountParams) -> ClientResult<StatusCounts> {
        self.http
            .get_with_query("/inventory/units/status-count", params)
            .await
    }
}
