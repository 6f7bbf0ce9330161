//! `/rentals-due-today` endpoints.

use rental_core::{Page, RentalDueToday, RentalsDueParams, RentalsDueSummary};
use serde::Serialize;

use crate::error::ClientResult;
use crate::http::HttpClient;

/// Rows plus the summary block the list endpoint returns alongside them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RentalsDueReport {
    pub rentals: Page<RentalDueToday>,
    pub summary: Option<RentalsDueSummary>,
}

#[derive(Serialize)]
struct SummaryQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    location_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct RentalsDueApi {
    http: HttpClient,
}

impl RentalsDueApi {
    pub fn new(http: HttpClient) -> Self {
        RentalsDueApi { http }
    }

    /// `GET /rentals-due-today/`.
    pub async fn list(&self, params: &RentalsDueParams) -> ClientResult<RentalsDueReport> {
        let (rentals, summary) = self.http.get_report("/rentals-due-today/", params).await?;
        Ok(RentalsDueReport { rentals, summary })
    }

    /// `GET /rentals-due-today/summary`.
    pub async fn summary(&self, location_id: Option<&str>) -> ClientResult<RentalsDueSummary> {
        self.http
            .get_with_query("/rentals-due-today/summary", &SummaryQuery { location_id })
            .await
    }
}
