//! `/purchases`, `/purchases/record`, `/purchases/returns`
//!
//! ## Dialogs
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Record       PurchaseForm, lines added/removed in place, live total    │
//! │  Return       PurchaseReturnForm against one purchase; the purchase     │
//! │               and its earlier returns are loaded first so quantities    │
//! │               are checked before anything is sent                       │
//! │                                                                         │
//! │  Only one of the two is open at a time.                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{NaiveDate, Utc};
use rental_core::{
    returnable, ConditionGrade, ListState, Purchase, PurchaseForm, PurchaseLineForm,
    PurchaseListParams, PurchaseReturn, PurchaseReturnForm, PurchaseReturnLineForm,
    PurchaseReturnListParams, PurchaseStatus, ReturnContext, ReturnReason, ReturnableItem,
};
use tracing::{info, warn};

use super::editor::Editor;
use super::listing::Listing;
use super::PageContext;
use crate::error::{AppError, AppResult};
use crate::navigation::Route;

pub const NO_PURCHASES: &str = "No purchases found";
pub const NO_RETURNS: &str = "No purchase returns found";
pub const RECORD_FAILED: &str = "Failed to record purchase. Please try again.";
pub const RETURN_FAILED: &str = "Failed to record purchase return. Please try again.";

fn ensure_date_window(start: Option<NaiveDate>, end: Option<NaiveDate>) -> AppResult<()> {
    match (start, end) {
        (Some(s), Some(e)) if s > e => {
            Err(AppError::validation("Start date must be on or before end date"))
        }
        _ => Ok(()),
    }
}

/// Return draft for `purchase`, checked against what is still returnable.
pub fn return_draft(
    purchase: &Purchase,
    returns: &[PurchaseReturn],
    today: NaiveDate,
) -> PurchaseReturnForm {
    PurchaseReturnForm {
        supplier_id: purchase.supplier_id.clone(),
        original_purchase_id: purchase.id.clone(),
        return_date: Some(today),
        original: Some(ReturnContext {
            purchase_date: purchase.purchase_date.map(|d| d.date_naive()),
            total_amount: purchase.total_amount,
            available: returnable(purchase, returns),
        }),
        ..Default::default()
    }
}

#[derive(Debug)]
pub struct PurchasesPage {
    ctx: PageContext,
    listing: Listing<Purchase, PurchaseListParams>,
    returns: Listing<PurchaseReturn, PurchaseReturnListParams>,
    record: Editor<Purchase, PurchaseForm>,
    ret: Editor<Purchase, PurchaseReturnForm>,
    detail: Option<Purchase>,
}

impl PurchasesPage {
    pub fn new(ctx: PageContext) -> Self {
        PurchasesPage {
            ctx,
            listing: Listing::new(PurchaseListParams::default()),
            returns: Listing::new(PurchaseReturnListParams::default()),
            record: Editor::new(),
            ret: Editor::new(),
            detail: None,
        }
    }

    pub fn listing(&self) -> &Listing<Purchase, PurchaseListParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<Purchase> {
        self.listing.state()
    }

    pub fn returns(&self) -> &Listing<PurchaseReturn, PurchaseReturnListParams> {
        &self.returns
    }

    pub fn record_editor(&self) -> &Editor<Purchase, PurchaseForm> {
        &self.record
    }

    pub fn return_editor(&self) -> &Editor<Purchase, PurchaseReturnForm> {
        &self.ret
    }

    pub fn detail(&self) -> Option<&Purchase> {
        self.detail.as_ref()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_PURCHASES)
    }

    pub fn returns_empty_message(&self) -> Option<&'static str> {
        self.returns.state().is_empty().then_some(NO_RETURNS)
    }

    fn ensure_no_dialog(&self) -> AppResult<()> {
        if self.record.is_open() || self.ret.is_open() {
            Err(AppError::invalid_state("Another dialog is already open"))
        } else {
            Ok(())
        }
    }

    // =========================================================================
    // Lists
    // =========================================================================

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.purchases(self.listing.params().clone());
        self.listing.load(query).await?;
        Ok(())
    }

    pub async fn load_returns(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.purchase_returns(self.returns.params().clone());
        self.returns.load(query).await?;
        Ok(())
    }

    pub async fn search(&mut self, term: &str) -> AppResult<()> {
        let term = term.trim();
        self.listing
            .filter(|p| p.search = (!term.is_empty()).then(|| term.to_string()));
        self.load().await
    }

    pub async fn filter(
        &mut self,
        supplier_id: Option<&str>,
        status: Option<PurchaseStatus>,
    ) -> AppResult<()> {
        self.listing.filter(|p| {
            p.supplier_id = supplier_id.map(str::to_string);
            p.status = status;
        });
        self.load().await
    }

    /// Inclusive date window; either end may be open.
    pub async fn filter_dates(
        &mut self,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> AppResult<()> {
        ensure_date_window(start, end)?;
        self.listing.filter(|p| {
            p.start_date = start;
            p.end_date = end;
        });
        self.load().await
    }

    pub async fn filter_returns_by_purchase(&mut self, purchase_id: Option<&str>) -> AppResult<()> {
        self.returns
            .filter(|p| p.original_purchase_id = purchase_id.map(str::to_string));
        self.load_returns().await
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

    /// Loads one purchase with its lines for the detail panel.
    pub async fn open_detail(&mut self, id: &str) -> AppResult<&Purchase> {
        let purchase = self.ctx.hooks.purchase(id).fetch().await?;
        Ok(self.detail.insert(purchase))
    }

    pub fn close_detail(&mut self) {
        self.detail = None;
    }

    // =========================================================================
    // Record
    // =========================================================================

    /// Opens the record dialog dated today, with one blank line.
    pub fn open_record(&mut self) -> AppResult<()> {
        self.ensure_no_dialog()?;
        let today = Utc::now().date_naive();
        self.record.open_create(PurchaseForm {
            purchase_date: Some(today),
            today: Some(today),
            items: vec![PurchaseLineForm::default()],
            ..Default::default()
        })
    }

    pub fn edit_record(&mut self) -> AppResult<&mut PurchaseForm> {
        self.record.edit()
    }

    pub fn add_line(
        &mut self,
        sku_id: &str,
        quantity: u32,
        unit_cost: f64,
        condition: ConditionGrade,
    ) -> AppResult<()> {
        let items = &mut self.record.edit()?.items;
        // The blank starter line is replaced, not kept.
        if items.len() == 1 && items[0] == PurchaseLineForm::default() {
            items.clear();
        }
        items.push(PurchaseLineForm {
            sku_id: sku_id.to_string(),
            quantity,
            unit_cost,
            condition,
            ..Default::default()
        });
        Ok(())
    }

    pub fn remove_line(&mut self, index: usize) -> AppResult<()> {
        let items = &mut self.record.edit()?.items;
        if index >= items.len() {
            return Err(AppError::validation(format!(
                "No purchase line at position {}",
                index + 1
            )));
        }
        items.remove(index);
        Ok(())
    }

    pub fn record_total(&self) -> Option<f64> {
        self.record.form().map(|f| f.draft().total())
    }

    pub fn close_record(&mut self) {
        self.record.close();
    }

    pub async fn submit_record(&mut self) -> AppResult<Purchase> {
        let (request, _) = self.record.begin_submit()?;

        match self.ctx.hooks.record_purchase().mutate(request).await {
            Ok(created) => {
                self.record.succeed()?;
                info!(
                    purchase_id = %created.id,
                    total = created.total_amount,
                    items = created.total_items,
                    "Purchase recorded"
                );
                self.ctx
                    .toast_success("Purchase Recorded", format!("Recorded {}", created.label()))
                    .await;
                self.ctx.navigate(Route::Purchases);
                self.load().await?;
                Ok(created)
            }
            Err(e) => {
                let message = self.record.fail(&e, RECORD_FAILED, &[])?;
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }

    // =========================================================================
    // Return
    // =========================================================================

    /// Loads the purchase and its earlier returns, then opens the return
    /// dialog. Fails without opening when nothing is left to return.
    pub async fn open_return(&mut self, purchase_id: &str) -> AppResult<()> {
        self.ensure_no_dialog()?;
        let purchase = self.ctx.hooks.purchase(purchase_id).fetch().await?;
        if purchase.status == PurchaseStatus::Cancelled {
            return Err(AppError::invalid_state(format!(
                "Purchase {} is cancelled",
                purchase.label()
            )));
        }
        let previous = self
            .ctx
            .hooks
            .returns_for_purchase(purchase_id)
            .fetch()
            .await?;

        let draft = return_draft(&purchase, &previous, Utc::now().date_naive());
        let remaining: u32 = available(&draft)
            .iter()
            .map(|a| a.max_returnable_quantity)
            .sum();
        if remaining == 0 {
            return Err(AppError::invalid_state(format!(
                "Everything on purchase {} has already been returned",
                purchase.label()
            )));
        }
        self.ret.open_edit(purchase, draft)
    }

    /// What the open return may still take back, per SKU.
    pub fn returnable_items(&self) -> &[ReturnableItem] {
        self.ret.form().map(|f| available(f.draft())).unwrap_or(&[])
    }

    pub fn edit_return(&mut self) -> AppResult<&mut PurchaseReturnForm> {
        self.ret.edit()
    }

    /// Adds a return line priced at the cost paid on the original purchase.
    pub fn add_return_line(
        &mut self,
        sku_id: &str,
        quantity: u32,
        reason: ReturnReason,
    ) -> AppResult<()> {
        let unit_cost = match self.ret.dialog().target() {
            Some(purchase) => purchase
                .items
                .iter()
                .find(|i| i.sku_id == sku_id)
                .map(|i| i.unit_cost)
                .ok_or_else(|| AppError::validation("SKU was not in the original purchase"))?,
            None => return Err(AppError::invalid_state("No return dialog is open")),
        };
        let draft = self.ret.edit()?;
        draft.items.push(PurchaseReturnLineForm {
            sku_id: sku_id.to_string(),
            quantity,
            unit_cost,
            return_reason: reason,
            condition: None,
            notes: None,
        });
        draft.refund_amount = draft
            .items
            .iter()
            .map(|l| l.unit_cost * f64::from(l.quantity))
            .sum();
        Ok(())
    }

    pub fn close_return(&mut self) {
        self.ret.close();
    }

    pub async fn submit_return(&mut self) -> AppResult<PurchaseReturn> {
        let (request, _) = self.ret.begin_submit()?;

        match self.ctx.hooks.record_purchase_return().mutate(request).await {
            Ok(created) => {
                self.ret.succeed()?;
                info!(
                    return_id = %created.id,
                    purchase_id = %created.original_purchase_id,
                    refund = created.refund_amount,
                    "Purchase return recorded"
                );
                self.ctx
                    .toast_success(
                        "Return Recorded",
                        format!("Refund of {:.2} recorded", created.refund_amount),
                    )
                    .await;
                if let Err(e) = self.load_returns().await {
                    warn!(error = %e, "Could not refresh purchase returns");
                }
                Ok(created)
            }
            Err(e) => {
                let message = self.ret.fail(&e, RETURN_FAILED, &[])?;
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }
}

fn available(form: &PurchaseReturnForm) -> &[ReturnableItem] {
    form.original
        .as_ref()
        .map(|o| o.available.as_slice())
        .unwrap_or(&[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use rental_core::{check, FormErrors};
    use serde_json::json;

    fn purchase() -> Purchase {
        serde_json::from_value(json!({
            "id": "p1",
            "supplier_id": "s1",
            "purchase_date": "2026-03-01T00:00:00",
            "total_amount": 500.0,
            "items": [
                {"id": "i1", "sku_id": "sku-a", "quantity": 4, "unit_cost": 100.0},
                {"id": "i2", "sku_id": "sku-b", "quantity": 1, "unit_cost": 100.0}
            ]
        }))
        .unwrap()
    }

    fn earlier_return(quantity: u32) -> PurchaseReturn {
        serde_json::from_value(json!({
            "id": "r1",
            "supplier_id": "s1",
            "original_purchase_id": "p1",
            "refund_amount": 100.0,
            "status": "COMPLETED",
            "items": [
                {"sku_id": "sku-a", "quantity": quantity, "unit_cost": 100.0,
                 "return_reason": "DEFECTIVE"}
            ]
        }))
        .unwrap()
    }

    fn line(sku: &str, quantity: u32) -> PurchaseReturnLineForm {
        PurchaseReturnLineForm {
            sku_id: sku.into(),
            quantity,
            unit_cost: 100.0,
            return_reason: ReturnReason::Defective,
            condition: None,
            notes: None,
        }
    }

    #[test]
    fn test_return_draft_counts_earlier_returns() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 10).unwrap();
        let mut draft = return_draft(&purchase(), &[earlier_return(3)], today);
        assert_eq!(draft.supplier_id, "s1");
        assert_eq!(draft.return_date, Some(today));
        let sku_a = &available(&draft)[0];
        assert_eq!(sku_a.max_returnable_quantity, 1);

        draft.items = vec![line("sku-a", 2)];
        draft.refund_amount = 200.0;
        let errors: FormErrors = check(&mut draft).unwrap_err();
        assert_eq!(
            errors.first("items[0].quantity"),
            Some("Cannot return more than 1 remaining")
        );

        draft.items = vec![line("sku-a", 1), line("sku-b", 1)];
        let payload = check(&mut draft).unwrap();
        assert_eq!(payload.items.len(), 2);
        assert_eq!(payload.original_purchase_id, "p1");
    }

    #[test]
    fn test_return_dated_before_purchase_is_rejected() {
        let too_early = NaiveDate::from_ymd_opt(2026, 2, 27).unwrap();
        let mut draft = return_draft(&purchase(), &[], too_early);
        draft.items = vec![line("sku-b", 1)];
        draft.refund_amount = 100.0;
        let errors = check(&mut draft).unwrap_err();
        assert_eq!(
            errors.first("return_date"),
            Some("Return date cannot be before the original purchase date")
        );
    }

    #[test]
    fn test_date_window_must_be_ordered() {
        let march = NaiveDate::from_ymd_opt(2026, 3, 1);
        let april = NaiveDate::from_ymd_opt(2026, 4, 1);
        assert!(ensure_date_window(march, april).is_ok());
        assert!(ensure_date_window(None, april).is_ok());
        assert!(ensure_date_window(april, march).unwrap_err().is_validation());
    }
}
