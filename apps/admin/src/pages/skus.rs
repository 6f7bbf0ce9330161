//! `/products/skus`
//!
//! ## Edit Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  submit() on an edit dialog                                             │
//! │    ├── PUT /skus/{id}          name, barcode, model, weight             │
//! │    ├── PUT /skus/{id}/rental   only when rental settings changed        │
//! │    └── PUT /skus/{id}/sale     only when sale settings changed          │
//! │                                                                         │
//! │  Any step failing keeps the dialog open; earlier steps stay applied.    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rental_core::{
    ListState, Sku, SkuCreate, SkuForm, SkuListParams, SkuRentalSettings, SkuSaleSettings,
    SkuUpdate,
};
use tracing::{debug, info};

use super::editor::Editor;
use super::listing::Listing;
use super::{failure_message, PageContext};
use crate::error::{AppError, AppResult};

pub const NO_SKUS: &str = "No SKUs found";
pub const SAVE_FAILED: &str = "Failed to save SKU. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete SKU. Please try again.";

pub fn sku_form(sku: &Sku) -> SkuForm {
    SkuForm {
        sku_code: sku.sku_code.clone(),
        sku_name: sku.sku_name.clone(),
        item_id: sku.item_id.clone(),
        barcode: sku.barcode.clone(),
        model_number: sku.model_number.clone(),
        weight: sku.weight,
        is_rentable: sku.is_rentable,
        is_saleable: sku.is_saleable,
        min_rental_days: sku.min_rental_days,
        max_rental_days: sku.max_rental_days,
        rental_base_price: sku.rental_base_price,
        sale_base_price: sku.sale_base_price,
    }
}

/// The three writes an edit may need.
#[derive(Debug, Clone, PartialEq)]
pub struct SkuEdit {
    pub update: SkuUpdate,
    pub rental: Option<SkuRentalSettings>,
    pub sale: Option<SkuSaleSettings>,
}

/// Splits a validated draft into the writes that differ from `current`.
pub fn plan_edit(current: &Sku, payload: SkuCreate) -> SkuEdit {
    let rental = SkuRentalSettings {
        is_rentable: payload.is_rentable,
        min_rental_days: payload.min_rental_days,
        max_rental_days: payload.max_rental_days,
        rental_base_price: payload.rental_base_price,
    };
    let rental_changed = rental.is_rentable != current.is_rentable
        || rental.min_rental_days != current.min_rental_days
        || rental.max_rental_days != current.max_rental_days
        || rental.rental_base_price != current.rental_base_price;

    let sale = SkuSaleSettings {
        is_saleable: payload.is_saleable,
        sale_base_price: payload.sale_base_price,
    };
    let sale_changed = sale.is_saleable != current.is_saleable
        || sale.sale_base_price != current.sale_base_price;

    SkuEdit {
        update: SkuUpdate {
            sku_name: Some(payload.sku_name),
            barcode: payload.barcode,
            model_number: payload.model_number,
            weight: payload.weight,
            is_active: None,
        },
        rental: rental_changed.then_some(rental),
        sale: sale_changed.then_some(sale),
    }
}

#[derive(Debug)]
pub struct SkusPage {
    ctx: PageContext,
    listing: Listing<Sku, SkuListParams>,
    editor: Editor<Sku, SkuForm>,
}

impl SkusPage {
    pub fn new(ctx: PageContext) -> Self {
        SkusPage {
            ctx,
            listing: Listing::new(SkuListParams::default()),
            editor: Editor::new(),
        }
    }

    pub fn listing(&self) -> &Listing<Sku, SkuListParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<Sku> {
        self.listing.state()
    }

    pub fn editor(&self) -> &Editor<Sku, SkuForm> {
        &self.editor
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_SKUS)
    }

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.skus(self.listing.params().clone());
        self.listing.load(query).await?;
        Ok(())
    }

    pub async fn search(&mut self, term: &str) -> AppResult<()> {
        let term = term.trim();
        self.listing
            .filter(|p| p.search = (!term.is_empty()).then(|| term.to_string()));
        self.load().await
    }

    /// Sets the search term without fetching; the next load applies it.
    pub fn set_search(&mut self, term: Option<&str>) {
        let term = term.map(str::trim).filter(|t| !t.is_empty());
        self.listing.filter(|p| p.search = term.map(str::to_string));
    }

    /// `None` for either flag means "don't care".
    pub async fn filter(
        &mut self,
        is_rentable: Option<bool>,
        is_saleable: Option<bool>,
        is_active: Option<bool>,
    ) -> AppResult<()> {
        self.listing.filter(|p| {
            p.is_rentable = is_rentable;
            p.is_saleable = is_saleable;
            p.is_active = is_active;
        });
        self.load().await
    }

    pub async fn filter_item(&mut self, item_id: Option<&str>) -> AppResult<()> {
        self.listing.filter(|p| p.item_id = item_id.map(str::to_string));
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

    fn row(&self, id: &str) -> AppResult<Sku> {
        self.listing
            .items()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("SKU", id))
    }

    pub fn open_create(&mut self) -> AppResult<()> {
        self.editor.open_create(SkuForm::default())
    }

    pub fn open_edit(&mut self, id: &str) -> AppResult<()> {
        let sku = self.row(id)?;
        let draft = sku_form(&sku);
        self.editor.open_edit(sku, draft)
    }

    pub fn edit(&mut self) -> AppResult<&mut SkuForm> {
        self.editor.edit()
    }

    pub fn close_dialog(&mut self) {
        self.editor.close();
    }

    pub async fn submit(&mut self) -> AppResult<Sku> {
        let (payload, target) = self.editor.begin_submit()?;
        let (result, title) = match target {
            None => (self.ctx.hooks.create_sku().mutate(payload).await, "SKU Created"),
            Some(current) => (self.apply_edit(&current, payload).await, "SKU Updated"),
        };

        match result {
            Ok(saved) => {
                self.editor.succeed()?;
                info!(sku_id = %saved.id, code = %saved.sku_code, "SKU saved");
                self.ctx
                    .toast_success(title, format!("{} ({})", saved.sku_name, saved.sku_code))
                    .await;
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

    async fn apply_edit(
        &self,
        current: &Sku,
        payload: SkuCreate,
    ) -> rental_client::ClientResult<Sku> {
        let plan = plan_edit(current, payload);
        let hooks = &self.ctx.hooks;

        let mut saved = hooks
            .update_sku()
            .mutate((current.id.clone(), plan.update))
            .await?;
        if let Some(rental) = plan.rental {
            debug!(sku_id = %current.id, "Updating rental settings");
            saved = hooks
                .update_sku_rental()
                .mutate((current.id.clone(), rental))
                .await?;
        }
        if let Some(sale) = plan.sale {
            debug!(sku_id = %current.id, "Updating sale settings");
            saved = hooks
                .update_sku_sale()
                .mutate((current.id.clone(), sale))
                .await?;
        }
        Ok(saved)
    }

    pub fn confirm_delete(&mut self, id: &str) -> AppResult<()> {
        let sku = self.row(id)?;
        self.editor.open_delete(sku)
    }

    pub async fn delete_confirmed(&mut self) -> AppResult<()> {
        let sku = self
            .editor
            .pending_delete()
            .cloned()
            .ok_or_else(|| AppError::invalid_state("No delete is awaiting confirmation"))?;

        match self.ctx.hooks.delete_sku().mutate(sku.id.clone()).await {
            Ok(()) => {
                self.editor.close();
                self.ctx
                    .toast_success("SKU Deleted", format!("{} was deleted", sku.sku_code))
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
    use rental_core::FormSchema;

    fn sku() -> Sku {
        serde_json::from_value(serde_json::json!({
            "id": "k1",
            "sku_code": "CAM-001",
            "sku_name": "Canon R5",
            "item_id": "i1",
            "is_rentable": true,
            "is_saleable": false,
            "min_rental_days": 1,
            "rental_base_price": 50.0
        }))
        .unwrap()
    }

    #[test]
    fn test_unchanged_settings_skip_extra_writes() {
        let current = sku();
        let mut form = sku_form(&current);
        form.sku_name = "Canon EOS R5".into();

        let plan = plan_edit(&current, form.payload());
        assert_eq!(plan.update.sku_name.as_deref(), Some("Canon EOS R5"));
        assert_eq!(plan.rental, None);
        assert_eq!(plan.sale, None);
    }

    #[test]
    fn test_changed_prices_plan_settings_writes() {
        let current = sku();
        let mut form = sku_form(&current);
        form.rental_base_price = Some(60.0);
        form.is_saleable = true;
        form.sale_base_price = Some(2500.0);

        let plan = plan_edit(&current, form.payload());
        assert_eq!(plan.rental.map(|r| r.rental_base_price), Some(Some(60.0)));
        assert_eq!(
            plan.sale,
            Some(SkuSaleSettings {
                is_saleable: true,
                sale_base_price: Some(2500.0),
            })
        );
    }
}
