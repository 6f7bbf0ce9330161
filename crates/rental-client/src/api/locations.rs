//! `/locations` endpoints.

use rental_core::{Location, LocationListParams, LocationPayload, Page};
use tracing::info;

use super::segment;
use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct LocationsApi {
    http: HttpClient,
}

impl LocationsApi {
    pub fn new(http: HttpClient) -> Self {
        LocationsApi { http }
    }

    pub async fn list(&self, params: &LocationListParams) -> ClientResult<Page<Location>> {
        self.http.get_page("/locations/", params).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Location> {
        self.http.get(&format!("/locations/{}", segment(id))).await
    }

    pub async fn by_code(&self, code: &str) -> ClientResult<Location> {
        self.http
            .get(&format!("/locations/code/{}", segment(code)))
            .await
    }

    pub async fn create(&self, payload: &LocationPayload) -> ClientResult<Location> {
        let location: Location = self.http.post("/locations/", payload).await?;
        info!(location_id = %location.id, code = %location.location_code, "Location created");
        Ok(location)
    }

    pub async fn update(&self, id: &str, payload: &LocationPayload) -> ClientResult<Location> {
        let location: Location = self
            .http
            .put(&format!("/locations/{}", segment(id)), payload)
            .await?;
        info!(location_id = %location.id, "Location updated");
        Ok(location)
    }

    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.http
            .delete(&format!("/locations/{}", segment(id)))
            .await?;
        info!(location_id = %id, "Location deleted");
        Ok(())
    }
}
