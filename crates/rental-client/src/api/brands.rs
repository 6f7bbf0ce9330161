//! `/brands` endpoints.

use rental_core::{Brand, BrandCreate, BrandListParams, BrandUpdate, Page};
use tracing::info;

use super::segment;
use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct BrandsApi {
    http: HttpClient,
}

impl BrandsApi {
    pub fn new(http: HttpClient) -> Self {
        BrandsApi { http }
    }

    pub async fn create(&self, payload: &BrandCreate) -> ClientResult<Brand> {
        let brand: Brand = self.http.post("/brands/", payload).await?;
        info!(brand_id = %brand.id, name = %brand.brand_name, "Brand created");
        Ok(brand)
    }

    pub async fn list(&self, params: &BrandListParams) -> ClientResult<Page<Brand>> {
        self.http.get_page("/brands/", params).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Brand> {
        self.http.get(&format!("/brands/{}", segment(id))).await
    }

    pub async fn by_code(&self, code: &str) -> ClientResult<Brand> {
        self.http
            .get(&format!("/brands/by-code/{}", segment(code)))
            .await
    }

    pub async fn by_name(&self, name: &str) -> ClientResult<Brand> {
        self.http
            .get(&format!("/brands/by-name/{}", segment(name)))
            .await
    }

    pub async fn update(&self, id: &str, payload: &BrandUpdate) -> ClientResult<Brand> {
        let brand: Brand = self
            .http
            .put(&format!("/brands/{}", segment(id)), payload)
            .await?;
        info!(brand_id = %brand.id, "Brand updated");
        Ok(brand)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.http.delete(&format!("/brands/{}", segment(id))).await?;
        info!(brand_id = %id, "Brand deleted");
        Ok(())
    }
}
