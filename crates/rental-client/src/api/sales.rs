//! `/transactions` endpoints used by the sales pages.

use chrono::NaiveDate;
use rental_core::{
    CancelRequest, CreateSaleRequest, DailySummary, Page, PaymentRequest, Transaction,
    TransactionListParams,
};
use serde::Serialize;
use tracing::info;

use super::segment;
use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Serialize)]
struct ReportDate {
    date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct SalesApi {
    http: HttpClient,
}

impl SalesApi {
    pub fn new(http: HttpClient) -> Self {
        SalesApi { http }
    }

    /// `POST /transactions/sales`.
    pub async fn create_sale(&self, request: &CreateSaleRequest) -> ClientResult<Transaction> {
        let transaction: Transaction = self.http.post("/transactions/sales", request).await?;
        info!(
            transaction_id = %transaction.id,
            number = %transaction.transaction_number,
            lines = request.items.len(),
            "Sale created"
        );
        Ok(transaction)
    }

    pub async fn get(&self, id: &str) -> ClientResult<Transaction> {
        self.http
            .get(&format!("/transactions/{}", segment(id)))
            .await
    }

    pub async fn by_number(&self, number: &str) -> ClientResult<Transaction> {
        self.http
            .get(&format!("/transactions/number/{}", segment(number)))
            .await
    }

    pub async fn list(&self, params: &TransactionListParams) -> ClientResult<Page<Transaction>> {
        self.http.get_page("/transactions/", params).await
    }

    /// `POST /transactions/{id}/payment`.
    pub async fn record_payment(&self, id: &str, payment: &PaymentRequest) -> ClientResult<Transaction> {
        let transaction: Transaction = self
            .http
            .post(&format!("/transactions/{}/payment", segment(id)), payment)
            .await?;
        info!(
            transaction_id = %transaction.id,
            amount = payment.payment_amount,
            "Payment recorded"
        );
        Ok(transaction)
    }

    /// `POST /transactions/{id}/cancel`.
    pub async fn cancel(&self, id: &str, reason: &str) -> ClientResult<Transaction> {
        let transaction: Transaction = self
            .http
            .post(
                &format!("/transactions/{}/cancel", segment(id)),
                &CancelRequest {
                    reason: reason.to_string(),
                },
            )
            .await?;
        info!(transaction_id = %transaction.id, "Transaction cancelled");
        Ok(transaction)
    }

    /// `GET /transactions/customer/{id}/history`.
    pub async fn customer_history(
        &self,
        customer_id: &str,
        params: &TransactionListParams,
    ) -> ClientResult<Page<Transaction>> {
        self.http
            .get_page(
                &format!("/transactions/customer/{}/history", segment(customer_id)),
                params,
            )
            .await
    }

    /// `GET /transactions/reports/daily?date=YYYY-MM-DD`.
    pub async fn daily_summary(&self, date: NaiveDate) -> ClientResult<DailySummary> {
        self.http
            .get_with_query("/transactions/reports/daily", &ReportDate { date })
            .await
    }
}
