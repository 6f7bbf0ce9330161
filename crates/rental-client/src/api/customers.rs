//! `/customers` endpoints.

use rental_core::{
    BlacklistAction, Customer, CustomerCreate, CustomerListParams, CustomerUpdate, Page,
};
use serde::Serialize;
use tracing::info;

use super::segment;
use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Serialize)]
struct NameSearch<'a> {
    name: &'a str,
    limit: u64,
}

#[derive(Debug, Clone)]
pub struct CustomersApi {
    http: HttpClient,
}

impl CustomersApi {
    pub fn new(http: HttpClient) -> Self {
        CustomersApi { http }
    }

    pub async fn create(&self, payload: &CustomerCreate) -> ClientResult<Customer> {
        let customer: Customer = self.http.post("/customers/", payload).await?;
        info!(customer_id = %customer.id, code = %customer.customer_code, "Customer created");
        Ok(customer)
    }

    pub async fn list(&self, params: &CustomerListParams) -> ClientResult<Page<Customer>> {
        self.http.get_page("/customers/", params).await
    }

    pub async fn get(&self, id: &str) -> ClientResult<Customer> {
        self.http.get(&format!("/customers/{}", segment(id))).await
    }

    pub async fn by_code(&self, code: &str) -> ClientResult<Customer> {
        self.http
            .get(&format!("/customers/code/{}", segment(code)))
            .await
    }

    pub async fn update(&self, id: &str, payload: &CustomerUpdate) -> ClientResult<Customer> {
        let customer: Customer = self
            .http
            .put(&format!("/customers/{}", segment(id)), payload)
            .await?;
        info!(customer_id = %customer.id, "Customer updated");
        Ok(customer)
    }

    /// `POST /customers/{id}/blacklist` with `{"action": "blacklist" | "unblacklist"}`.
    pub async fn set_blacklist(&self, id: &str, action: BlacklistAction) -> ClientResult<Customer> {
        let customer: Customer = self
            .http
            .post(&format!("/customers/{}/blacklist", segment(id)), &action)
            .await?;
        info!(
            customer_id = %customer.id,
            blacklisted = customer.is_blacklisted(),
            "Customer blacklist changed"
        );
        Ok(customer)
    }

    /// `GET /customers/search/name?name=&limit=`.
    pub async fn search_by_name(&self, name: &str, limit: u64) -> ClientResult<Vec<Customer>> {
        let page = self
            .http
            .get_page("/customers/search/name", &NameSearch { name, limit })
            .await?;
        Ok(page.items)
    }
}
