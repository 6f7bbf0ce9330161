//! `/purchases/suppliers`
//!
//! Table with type/tier/active filters, quick search, an analytics card and
//! create/edit/deactivate/delete dialogs.

use rental_core::{
    ListState, PaymentTerms, Supplier, SupplierAnalytics, SupplierCreate, SupplierForm,
    SupplierListParams, SupplierTier, SupplierType, SupplierUpdate,
};
use tracing::{info, warn};

use super::editor::Editor;
use super::listing::Listing;
use super::{failure_message, PageContext};
use crate::error::{AppError, AppResult};

pub const NO_SUPPLIERS: &str = "No suppliers found";
pub const SAVE_FAILED: &str = "Failed to save supplier. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete supplier. Please try again.";
pub const STATUS_FAILED: &str = "Failed to update supplier status. Please try again.";

/// Results offered by the quick-search box.
pub const QUICK_SEARCH_LIMIT: u64 = 10;

/// Prefills the edit dialog. The code is shown but cannot change.
pub fn supplier_form(supplier: &Supplier) -> SupplierForm {
    SupplierForm {
        supplier_code: supplier.supplier_code.clone(),
        company_name: supplier.company_name.clone(),
        supplier_type: supplier.supplier_type,
        contact_person: supplier.contact_person.clone(),
        email: supplier.email.clone(),
        phone: supplier.phone.clone(),
        address: supplier.address.clone(),
        tax_id: supplier.tax_id.clone(),
        payment_terms: supplier.payment_terms,
        credit_limit: Some(supplier.credit_limit),
        supplier_tier: supplier.supplier_tier,
    }
}

fn supplier_update(payload: SupplierCreate) -> SupplierUpdate {
    SupplierUpdate {
        company_name: Some(payload.company_name),
        supplier_type: Some(payload.supplier_type),
        contact_person: payload.contact_person,
        email: payload.email,
        phone: payload.phone,
        address: payload.address,
        payment_terms: payload.payment_terms,
        credit_limit: payload.credit_limit,
        supplier_tier: payload.supplier_tier,
    }
}

#[derive(Debug)]
pub struct SuppliersPage {
    ctx: PageContext,
    listing: Listing<Supplier, SupplierListParams>,
    editor: Editor<Supplier, SupplierForm>,
    analytics: Option<SupplierAnalytics>,
    quick_results: Vec<Supplier>,
}

impl SuppliersPage {
    pub fn new(ctx: PageContext) -> Self {
        SuppliersPage {
            ctx,
            listing: Listing::new(SupplierListParams::default()),
            editor: Editor::new(),
            analytics: None,
            quick_results: Vec::new(),
        }
    }

    pub fn listing(&self) -> &Listing<Supplier, SupplierListParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<Supplier> {
        self.listing.state()
    }

    pub fn editor(&self) -> &Editor<Supplier, SupplierForm> {
        &self.editor
    }

    pub fn analytics(&self) -> Option<&SupplierAnalytics> {
        self.analytics.as_ref()
    }

    pub fn quick_results(&self) -> &[Supplier] {
        &self.quick_results
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_SUPPLIERS)
    }

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.suppliers(self.listing.params().clone());
        self.listing.load(query).await?;
        Ok(())
    }

    /// The analytics card is optional; a failure hides it.
    pub async fn load_analytics(&mut self) {
        match self.ctx.hooks.supplier_analytics().fetch().await {
            Ok(analytics) => self.analytics = Some(analytics),
            Err(e) => {
                warn!(error = %e, "Supplier analytics unavailable");
                self.analytics = None;
            }
        }
    }

    pub async fn search(&mut self, term: &str) -> AppResult<()> {
        let term = term.trim();
        self.listing
            .filter(|p| p.search = (!term.is_empty()).then(|| term.to_string()));
        self.load().await
    }

    pub async fn filter(
        &mut self,
        supplier_type: Option<SupplierType>,
        supplier_tier: Option<SupplierTier>,
        payment_terms: Option<PaymentTerms>,
        is_active: Option<bool>,
    ) -> AppResult<()> {
        self.listing.filter(|p| {
            p.supplier_type = supplier_type;
            p.supplier_tier = supplier_tier;
            p.payment_terms = payment_terms;
            p.is_active = is_active;
        });
        self.load().await
    }

    /// Type-ahead lookup; a blank term clears the results.
    pub async fn quick_search(&mut self, term: &str) -> AppResult<&[Supplier]> {
        let term = term.trim();
        if term.is_empty() {
            self.quick_results.clear();
            return Ok(&self.quick_results);
        }
        self.quick_results = self
            .ctx
            .hooks
            .supplier_search(term, QUICK_SEARCH_LIMIT)
            .fetch()
            .await?;
        Ok(&self.quick_results)
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

    fn row(&self, id: &str) -> AppResult<Supplier> {
        self.listing
            .items()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Supplier", id))
    }

    pub fn open_create(&mut self) -> AppResult<()> {
        self.editor.open_create(SupplierForm::default())
    }

    pub fn open_edit(&mut self, id: &str) -> AppResult<()> {
        let supplier = self.row(id)?;
        let draft = supplier_form(&supplier);
        self.editor.open_edit(supplier, draft)
    }

    pub fn edit(&mut self) -> AppResult<&mut SupplierForm> {
        self.editor.edit()
    }

    pub fn close_dialog(&mut self) {
        self.editor.close();
    }

    pub async fn submit(&mut self) -> AppResult<Supplier> {
        let (payload, target) = self.editor.begin_submit()?;
        let (result, title) = match target {
            None => (
                self.ctx.hooks.create_supplier().mutate(payload).await,
                "Supplier Created",
            ),
            Some(supplier) => (
                self.ctx
                    .hooks
                    .update_supplier()
                    .mutate((supplier.id, supplier_update(payload)))
                    .await,
                "Supplier Updated",
            ),
        };

        match result {
            Ok(saved) => {
                self.editor.succeed()?;
                info!(supplier_id = %saved.id, code = %saved.supplier_code, "Supplier saved");
                self.ctx.toast_success(title, saved.label()).await;
                self.load().await?;
                Ok(saved)
            }
            Err(e) => {
                let message = self.editor.fail(&e, SAVE_FAILED, &[])?;
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }

    /// Activates or deactivates a supplier without opening a dialog.
    pub async fn set_active(&mut self, id: &str, active: bool) -> AppResult<Supplier> {
        let supplier = self.row(id)?;
        match self
            .ctx
            .hooks
            .set_supplier_active()
            .mutate((supplier.id.clone(), active))
            .await
        {
            Ok(updated) => {
                let title = if active {
                    "Supplier Activated"
                } else {
                    "Supplier Deactivated"
                };
                self.ctx.toast_success(title, updated.label()).await;
                self.load().await?;
                Ok(updated)
            }
            Err(e) => {
                self.ctx
                    .toast_error("Error", failure_message(&e, STATUS_FAILED))
                    .await;
                Err(AppError::from(e))
            }
        }
    }

    pub fn confirm_delete(&mut self, id: &str) -> AppResult<()> {
        let supplier = self.row(id)?;
        self.editor.open_delete(supplier)
    }

    pub async fn delete_confirmed(&mut self) -> AppResult<()> {
        let supplier = self
            .editor
            .pending_delete()
            .cloned()
            .ok_or_else(|| AppError::invalid_state("No delete is awaiting confirmation"))?;

        match self.ctx.hooks.delete_supplier().mutate(supplier.id.clone()).await {
            Ok(()) => {
                self.editor.close();
                self.ctx
                    .toast_success(
                        "Supplier Deleted",
                        format!("{} was deleted", supplier.company_name),
                    )
                    .await;
                self.load().await
            }
            Err(e) => {
                self.ctx
                    .toast_error("Error", failure_message(&e, DELETE_FAILED))
                    .await;
                Err(AppError::from(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_prefill_round_trips_into_update() {
        let supplier: Supplier = serde_json::from_value(serde_json::json!({
            "id": "s1",
            "supplier_code": "ACME",
            "company_name": "Acme Rentals",
            "supplier_type": "DISTRIBUTOR",
            "payment_terms": "NET15",
            "credit_limit": 5000.0,
            "supplier_tier": "PREFERRED"
        }))
        .unwrap();

        let form = supplier_form(&supplier);
        assert_eq!(form.supplier_code, "ACME");
        assert_eq!(form.credit_limit, Some(5000.0));
        assert_eq!(form.supplier_tier, SupplierTier::Preferred);

        let update = supplier_update(rental_core::FormSchema::payload(&form));
        assert_eq!(update.company_name.as_deref(), Some("Acme Rentals"));
        assert_eq!(update.payment_terms, Some(PaymentTerms::Net15));
        assert_eq!(update.supplier_tier, Some(SupplierTier::Preferred));
    }
}
