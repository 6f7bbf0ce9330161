//! `/products/brands`

use rental_core::{Brand, BrandCreate, BrandForm, BrandListParams, BrandUpdate, ListState};
use tracing::info;

use super::editor::Editor;
use super::listing::Listing;
use super::PageContext;
use crate::error::{AppError, AppResult};

pub const NO_BRANDS: &str = "No brands found";
pub const SAVE_FAILED: &str = "Failed to save brand. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete brand. Please try again.";

/// Prefills the edit dialog.
pub fn brand_form(brand: &Brand) -> BrandForm {
    BrandForm {
        brand_name: brand.brand_name.clone(),
        brand_code: brand.brand_code.clone(),
        description: brand.description.clone(),
    }
}

fn brand_update(payload: BrandCreate) -> BrandUpdate {
    BrandUpdate {
        brand_name: Some(payload.brand_name),
        brand_code: payload.brand_code,
        description: payload.description,
        is_active: None,
    }
}

#[derive(Debug)]
pub struct BrandsPage {
    ctx: PageContext,
    listing: Listing<Brand, BrandListParams>,
    editor: Editor<Brand, BrandForm>,
}

impl BrandsPage {
    pub fn new(ctx: PageContext) -> Self {
        BrandsPage {
            ctx,
            listing: Listing::new(BrandListParams::default()),
            editor: Editor::new(),
        }
    }

    pub fn listing(&self) -> &Listing<Brand, BrandListParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<Brand> {
        self.listing.state()
    }

    pub fn editor(&self) -> &Editor<Brand, BrandForm> {
        &self.editor
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_BRANDS)
    }

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.brands(self.listing.params().clone());
        self.listing.load(query).await?;
        Ok(())
    }

    pub async fn search(&mut self, term: &str) -> AppResult<()> {
        let term = term.trim();
        self.listing
            .filter(|p| p.search = (!term.is_empty()).then(|| term.to_string()));
        self.load().await
    }

    /// `None` shows active and inactive brands.
    pub async fn filter_active(&mut self, active: Option<bool>) -> AppResult<()> {
        self.listing.filter(|p| p.is_active = active);
        self.load().await
    }

    /// Jumps to a one-based page without reloading.
    pub fn go_to_page(&mut self, page: u64) {
        self.listing.go_to_page(page);
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

    fn row(&self, id: &str) -> AppResult<Brand> {
        self.listing
            .items()
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Brand", id))
    }

    pub fn open_create(&mut self) -> AppResult<()> {
        self.editor.open_create(BrandForm::default())
    }

    pub fn open_edit(&mut self, id: &str) -> AppResult<()> {
        let brand = self.row(id)?;
        let draft = brand_form(&brand);
        self.editor.open_edit(brand, draft)
    }

    pub fn edit(&mut self) -> AppResult<&mut BrandForm> {
        self.editor.edit()
    }

    pub fn close_dialog(&mut self) {
        self.editor.close();
    }

    /// Saves the open create or edit dialog.
    pub async fn submit(&mut self) -> AppResult<Brand> {
        let (payload, target) = self.editor.begin_submit()?;
        let (result, title) = match target {
            None => (self.ctx.hooks.create_brand().mutate(payload).await, "Brand Created"),
            Some(brand) => (
                self.ctx
                    .hooks
                    .update_brand()
                    .mutate((brand.id, brand_update(payload)))
                    .await,
                "Brand Updated",
            ),
        };

        match result {
            Ok(saved) => {
                self.editor.succeed()?;
                info!(brand_id = %saved.id, "Brand saved");
                self.ctx.toast_success(title, saved.display_name()).await;
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

    pub fn confirm_delete(&mut self, id: &str) -> AppResult<()> {
        let brand = self.row(id)?;
        self.editor.open_delete(brand)
    }

    pub async fn delete_confirmed(&mut self) -> AppResult<()> {
        let brand = self
            .editor
            .pending_delete()
            .cloned()
            .ok_or_else(|| AppError::invalid_state("No delete is awaiting confirmation"))?;

        match self.ctx.hooks.delete_brand().mutate(brand.id.clone()).await {
            Ok(()) => {
                self.editor.close();
                self.ctx
                    .toast_success("Brand Deleted", format!("{} was deleted", brand.brand_name))
                    .await;
                self.load().await
            }
            Err(e) => {
                let message = super::failure_message(&e, DELETE_FAILED);
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edit_prefill_and_update_payload() {
        let brand: Brand = serde_json::from_value(serde_json::json!({
            "id": "b1", "brand_name": "Canon", "brand_code": "CAN", "description": null
        }))
        .unwrap();
        let form = brand_form(&brand);
        assert_eq!(form.brand_name, "Canon");
        assert_eq!(form.brand_code.as_deref(), Some("CAN"));

        let update = brand_update(BrandCreate {
            brand_name: "Canon Inc".into(),
            brand_code: Some("CAN".into()),
            description: None,
        });
        assert_eq!(update.brand_name.as_deref(), Some("Canon Inc"));
        assert_eq!(update.is_active, None);
    }
}
