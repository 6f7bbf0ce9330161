//! `/transactions/purchases` and `/transactions/purchase-returns`.

use rental_core::{
    Page, Purchase, PurchaseHistoryParams, PurchaseListParams, PurchaseRecord, PurchaseReturn,
    PurchaseReturnItemRecord, PurchaseReturnListParams, PurchaseReturnRecord, ReturnValidation,
};
use serde::Serialize;
use tracing::info;

use super::{segment, NO_QUERY};
use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Serialize)]
struct PurchaseSearch<'a> {
    q: &'a str,
    limit: u64,
}

#[derive(Serialize)]
struct ValidateReturn<'a> {
    original_purchase_id: &'a str,
    items: &'a [PurchaseReturnItemRecord],
}

#[derive(Debug, Clone)]
pub struct PurchasesApi {
    http: HttpClient,
}

impl PurchasesApi {
    pub fn new(http: HttpClient) -> Self {
        PurchasesApi { http }
    }

    /// `POST /transactions/purchases`.
    pub async fn record(&self, record: &PurchaseRecord) -> ClientResult<Purchase> {
        let purchase: Purchase = self.http.post("/transactions/purchases", record).await?;
        info!(
            purchase_id = %purchase.id,
            supplier_id = %purchase.supplier_id,
            lines = record.items.len(),
            "Purchase recorded"
        );
        Ok(purchase)
    }

    pub async fn list(&self, params: &PurchaseListParams) -> ClientResult<Page<Purchase>> {
        self.http.get_page("/transactions/purchases", params).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Purchase> {
        self.http
            .get(&format!("/transactions/purchases/{}", segment(id)))
            .await
    }

    /// `GET /transactions/purchases/supplier/{id}`.
    pub async fn by_supplier(
        &self,
        supplier_id: &str,
        params: &PurchaseHistoryParams,
    ) -> ClientResult<Page<Purchase>> {
        self.http
            .get_page(
                &format!("/transactions/purchases/supplier/{}", segment(supplier_id)),
                params,
            )
            .await
    }

    /// `GET /transactions/purchases/search?q=&limit=`.
    pub async fn search(&self, q: &str, limit: u64) -> ClientResult<Vec<Purchase>> {
        let page = self
            .http
            .get_page("/transactions/purchases/search", &PurchaseSearch { q, limit })
            .await?;
        Ok(page.items)
    }

    /// `POST /transactions/purchase-returns`.
    pub async fn record_return(&self, record: &PurchaseReturnRecord) -> ClientResult<PurchaseReturn> {
        let ret: PurchaseReturn = self
            .http
            .post("/transactions/purchase-returns", record)
            .await?;
        info!(
            return_id = %ret.id,
            purchase_id = %record.original_purchase_id,
            refund = record.refund_amount,
            "Purchase return recorded"
        );
        Ok(ret)
    }

    pub async fn returns(&self, params: &PurchaseReturnListParams) -> ClientResult<Page<PurchaseReturn>> {
        self.http
            .get_page("/transactions/purchase-returns", params)
            .await
    }

    pub async fn get_return(&self, id: &str) -> ClientResult<PurchaseReturn> {
        self.http
            .get(&format!("/transactions/purchase-returns/{}", segment(id)))
            .await
    }

    /// `GET /transactions/purchase-returns/purchase/{id}`.
    pub async fn returns_for(&self, purchase_id: &str) -> ClientResult<Vec<PurchaseReturn>> {
        let page = self
            .http
            .get_page(
                &format!("/transactions/purchase-returns/purchase/{}", segment(purchase_id)),
                NO_QUERY,
            )
            .await?;
        Ok(page.items)
    }

    /// `POST /transactions/purchase-returns/validate`.
    pub async fn validate_return(
        &self,
        original_purchase_id: &str,
        items: &[PurchaseReturnItemRecord],
    ) -> ClientResult<ReturnValidation> {
        self.http
            .post(
                "/transactions/purchase-returns/validate",
                &ValidateReturn {
                    original_purchase_id,
                    items,
                },
            )
            .await
    }
}
