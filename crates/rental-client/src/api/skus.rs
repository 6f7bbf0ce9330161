//! `/skus` endpoints.

use rental_core::{
    Page, PageRequest, Sku, SkuCreate, SkuListParams, SkuRentalSettings, SkuSaleSettings, SkuUpdate,
};
use tracing::info;

use super::segment;
use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct SkusApi {
    http: HttpClient,
}

impl SkusApi {
    pub fn new(http: HttpClient) -> Self {
        SkusApi { http }
    }

    pub async fn list(&self, params: &SkuListParams) -> ClientResult<Page<Sku>> {
        self.http.get_page("/skus/", params).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Sku> {
        self.http.get(&format!("/skus/{}", segment(id))).await
    }

    pub async fn by_code(&self, code: &str) -> ClientResult<Sku> {
        self.http.get(&format!("/skus/code/{}", segment(code))).await
    }

    pub async fn by_barcode(&self, barcode: &str) -> ClientResult<Sku> {
        self.http
            .get(&format!("/skus/barcode/{}", segment(barcode)))
            .await
    }

    pub async fn create(&self, payload: &SkuCreate) -> ClientResult<Sku> {
        let sku: Sku = self.http.post("/skus/", payload).await?;
        info!(sku_id = %sku.id, code = %sku.sku_code, "SKU created");
        Ok(sku)
    }

    pub async fn update(&self, id: &str, payload: &SkuUpdate) -> ClientResult<Sku> {
        let sku: Sku = self
            .http
            .put(&format!("/skus/{}", segment(id)), payload)
            .await?;
        info!(sku_id = %sku.id, "SKU updated");
        Ok(sku)
    }

    /// `PUT /skus/{id}/rental`.
    pub async fn update_rental(&self, id: &str, settings: &SkuRentalSettings) -> ClientResult<Sku> {
        self.http
            .put(&format!("/skus/{}/rental", segment(id)), settings)
            .await
    }

    /// `PUT /skus/{id}/sale`.
    pub async fn update_sale(&self, id: &str, settings: &SkuSaleSettings) -> ClientResult<Sku> {
        self.http
            .put(&format!("/skus/{}/sale", segment(id)), settings)
            .await
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.http.delete(&format!("/skus/{}", segment(id))).await?;
        info!(sku_id = %id, "SKU deleted");
        Ok(())
    }

    /// `GET /skus/item/{item_id}/skus`.
    pub async fn by_item(&self, item_id: &str, page: PageRequest) -> ClientResult<Page<Sku>> {
        self.http
            .get_page(&format!("/skus/item/{}/skus", segment(item_id)), &page)
            .await
    }

    pub async fn rentable(&self, page: PageRequest) -> ClientResult<Page<Sku>> {
        self.http.get_page("/skus/rentable/", &page).await
    }

    pub async fn saleable(&self, page: PageRequest) -> ClientResult<Page<Sku>> {
        self.http.get_page("/skus/saleable/", &page).await
    }
}
