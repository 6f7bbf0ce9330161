//! `/sales`
//!
//! ## Dialogs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  New sale     SaleForm, lines added/removed in place, live total        │
//! │  Payment      PaymentForm for one transaction, prefilled with balance   │
//! │  Cancel       reason required; only for non-terminal transactions       │
//! │                                                                         │
//! │  Only one of the three is open at a time.                               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use rental_core::{
    DailySummary, DialogState, FormSchema, ListState, PaymentForm, PaymentMethod, PaymentStatus,
    SaleForm, SaleLineForm, Transaction, TransactionListParams, TransactionStatus,
    TransactionType,
};
use tracing::{info, warn};

use super::editor::Editor;
use super::listing::Listing;
use super::{failure_message, PageContext};
use crate::error::{AppError, AppResult};

pub const NO_TRANSACTIONS: &str = "No transactions found";
pub const SALE_FAILED: &str = "Failed to create sale. Please try again.";
pub const PAYMENT_FAILED: &str = "Failed to record payment. Please try again.";
pub const CANCEL_FAILED: &str = "Failed to cancel transaction. Please try again.";

/// Running totals for the new-sale dialog.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SaleTotals {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl SaleTotals {
    /// Totals for the lines typed so far, valid or not.
    pub fn of(form: &SaleForm) -> Self {
        let payload = form.payload();
        let subtotal = payload.subtotal();
        let total = payload.total();
        SaleTotals {
            subtotal,
            tax: total - subtotal,
            total,
        }
    }
}

#[derive(Debug)]
pub struct SalesPage {
    ctx: PageContext,
    listing: Listing<Transaction, TransactionListParams>,
    sale: Editor<Transaction, SaleForm>,
    payment: Editor<Transaction, PaymentForm>,
    cancel: DialogState<Transaction>,
    daily: Option<DailySummary>,
}

impl SalesPage {
    pub fn new(ctx: PageContext) -> Self {
        SalesPage {
            ctx,
            listing: Listing::new(TransactionListParams::default()),
            sale: Editor::new(),
            payment: Editor::new(),
            cancel: DialogState::Closed,
            daily: None,
        }
    }

    pub fn listing(&self) -> &Listing<Transaction, TransactionListParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<Transaction> {
        self.listing.state()
    }

    pub fn sale_editor(&self) -> &Editor<Transaction, SaleForm> {
        &self.sale
    }

    pub fn payment_editor(&self) -> &Editor<Transaction, PaymentForm> {
        &self.payment
    }

    pub fn cancel_dialog(&self) -> &DialogState<Transaction> {
        &self.cancel
    }

    pub fn daily_summary(&self) -> Option<&DailySummary> {
        self.daily.as_ref()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_TRANSACTIONS)
    }

    fn any_dialog_open(&self) -> bool {
        self.sale.is_open() || self.payment.is_open() || self.cancel.is_open()
    }

    fn ensure_no_dialog(&self) -> AppResult<()> {
        if self.any_dialog_open() {
            Err(AppError::invalid_state("Another dialog is already open"))
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // List
    // =========================================================================

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.transactions(self.listing.params().clone());
        self.listing.load(query).await?;
        Ok(())
    }

    pub async fn filter_status(
        &mut self,
        status: Option<TransactionStatus>,
        payment_status: Option<PaymentStatus>,
    ) -> AppResult<()> {
        self.listing.filter(|p| {
            p.status = status;
            p.payment_status = payment_status;
        });
        self.load().await
    }

    pub async fn filter_type(&mut self, transaction_type: Option<TransactionType>) -> AppResult<()> {
        self.listing.filter(|p| p.transaction_type = transaction_type);
        self.load().await
    }

    /// Inclusive date window; either end may be open.
    pub async fn filter_dates(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<()> {
        if let (Some(s), Some(e)) = (start, end) {
            if s > e {
                return Err(AppError::validation("Start date must be on or before end date"));
            }
        }
        self.listing.filter(|p| {
            p.start_date = start;
            p.end_date = end;
        });
        self.load().await
    }

    pub async fn filter_parties(
        &mut self,
        customer_id: Option<&str>,
        location_id: Option<&str>,
    ) -> AppResult<()> {
        self.listing.filter(|p| {
            p.customer_id = customer_id.map(str::to_string);
            p.location_id = location_id.map(str::to_string);
        });
        self.load().await
    }

    pub async fn next_page(&mut self) -> AppResult<()> {
        if self.listing.next_page() {
            self.load().await?;
        }
        Ok(())
    }

    pub async fn previous_page(&mut self) -> AppResult<()> {
        if self.listing.previous_page() {
            self.load().await?;
        }
        Ok(())
    }

    /// The summary card is optional; a failure hides it.
    pub async fn load_daily_summary(&mut self, date: NaiveDate) {
        match self.ctx.hooks.api().sales.daily_summary(date).await {
            Ok(summary) => self.daily = Some(summary),
            Err(e) => {
                warn!(error = %e, %date, "Daily summary unavailable");
                self.daily = None;
            }
        }
    }

    fn row(&self, id: &str) -> AppResult<Transaction> {
        self.listing
            .items()
            .iter()
            .find(|t| t.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Transaction", id))
    }

    // =========================================================================
    // New Sale
    // =========================================================================

    pub fn open_sale(&mut self) -> AppResult<()> {
        self.ensure_no_dialog()?;
        self.sale.open_create(SaleForm::default())
    }

    pub fn edit_sale(&mut self) -> AppResult<&mut SaleForm> {
        self.sale.edit()
    }

    pub fn add_line(&mut self, item_id: &str, quantity: u32, unit_price: f64) -> AppResult<()> {
        self.sale.edit()?.items.push(SaleLineForm {
            item_id: item_id.to_string(),
            quantity,
            unit_price,
            discount_percentage: None,
        });
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> AppResult<()> {
        let items = &mut self.sale.edit()?.items;
        if index >= items.len() {
            return Err(AppError::validation(format!("No sale line at position {}", index + 1)));
        }
        items.remove(index);
        Ok(())
    }

    pub fn sale_totals(&self) -> Option<SaleTotals> {
        self.sale.form().map(|f| SaleTotals::of(f.draft()))
    }

    pub fn close_sale(&mut self) {
        self.sale.close();
    }

    pub async fn submit_sale(&mut self) -> AppResult<Transaction> {
        let (request, _) = self.sale.begin_submit()?;

        match self.ctx.hooks.create_sale().mutate(request).await {
            Ok(created) => {
                self.sale.succeed()?;
                info!(
                    transaction_id = %created.id,
                    number = %created.transaction_number,
                    total = created.total_amount,
                    "Sale created"
                );
                self.ctx
                    .toast_success(
                        "Sale Created",
                        format!("Transaction {} created", created.transaction_number),
                    )
                    .await;
                self.load().await?;
                Ok(created)
            }
            Err(e) => {
                let message = self.sale.fail(&e, SALE_FAILED, &[])?;
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Opens the payment dialog prefilled with the outstanding balance.
    pub fn open_payment(&mut self, id: &str) -> AppResult<()> {
        self.ensure_no_dialog()?;
        let transaction = self.row(id)?;
        let balance = transaction.balance_due();
        if balance <= 0.0 {
            return Err(AppError::invalid_state(format!(
                "Transaction {} has no balance due",
                transaction.transaction_number
            )));
        }
        let draft = PaymentForm {
            amount: balance,
            method: PaymentMethod::Cash,
            reference: None,
        };
        self.payment.open_edit(transaction, draft)
    }

    pub fn edit_payment(&mut self) -> AppResult<&mut PaymentForm> {
        self.payment.edit()
    }

    pub fn close_payment(&mut self) {
        self.payment.close();
    }

    pub async fn submit_payment(&mut self) -> AppResult<Transaction> {
        let (request, target) = self.payment.begin_submit()?;
        let transaction =
            target.ok_or_else(|| AppError::invalid_state("No transaction selected for payment"))?;
        if request.payment_amount > transaction.balance_due() + f64::EPSILON {
            return Err(AppError::validation(format!(
                "Payment exceeds the balance due of {:.2}",
                transaction.balance_due()
            )));
        }

        match self
            .ctx
            .hooks
            .record_payment()
            .mutate((transaction.id.clone(), request))
            .await
        {
            Ok(updated) => {
                self.payment.succeed()?;
                self.ctx
                    .toast_success(
                        "Payment Recorded",
                        format!(
                            "{} balance now {:.2}",
                            updated.transaction_number,
                            updated.balance_due()
                        ),
                    )
                    .await;
                self.load().await?;
                Ok(updated)
            }
            Err(e) => {
                let message = self.payment.fail(&e, PAYMENT_FAILED, &[])?;
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }

    // =========================================================================
    // Cancel
    // =========================================================================

    pub fn open_cancel(&mut self, id: &str) -> AppResult<()> {
        self.ensure_no_dialog()?;
        let transaction = self.row(id)?;
        if !transaction.status.can_cancel() {
            return Err(AppError::invalid_state(format!(
                "Transaction {} cannot be cancelled",
                transaction.transaction_number
            )));
        }
        self.cancel.open(DialogState::ConfirmDelete(transaction))?;
        Ok(())
    }

    pub fn close_cancel(&mut self) {
        self.cancel.close();
    }

    pub async fn cancel_confirmed(&mut self, reason: &str) -> AppResult<Transaction> {
        let DialogState::ConfirmDelete(transaction) = &self.cancel else {
            return Err(AppError::invalid_state("No cancellation is awaiting confirmation"));
        };
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(AppError::validation("Cancellation reason is required"));
        }
        let id = transaction.id.clone();

        match self
            .ctx
            .hooks
            .cancel_transaction()
            .mutate((id, reason.to_string()))
            .await
        {
            Ok(cancelled) => {
                self.cancel.close();
                self.ctx
                    .toast_success(
                        "Transaction Cancelled",
                        format!("{} was cancelled", cancelled.transaction_number),
                    )
                    .await;
                self.load().await?;
                Ok(cancelled)
            }
            Err(e) => {
                self.ctx
                    .toast_error("Error", failure_message(&e, CANCEL_FAILED))
                    .await;
                Err(AppError::from(e))
            }
        }
    }
}
