//! `/admin/locations`

use rental_core::{
    ListState, Location, LocationForm, LocationListParams, LocationType,
};
use tracing::info;

use super::editor::Editor;
use super::listing::Listing;
use super::{failure_message, PageContext};
use crate::error::{AppError, AppResult};

pub const NO_LOCATIONS: &str = "No locations found";
pub const SAVE_FAILED: &str = "Failed to save location. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete location. Please try again.";

/// Prefills the edit dialog. Legacy rows missing address parts open with
/// blanks the user must fill before saving.
pub fn location_form(location: &Location) -> LocationForm {
    LocationForm {
        location_code: location.location_code.clone(),
        location_name: location.location_name.clone(),
        location_type: location.location_type,
        address: location.address.clone().unwrap_or_default(),
        city: location.city.clone().unwrap_or_default(),
        state: location.state.clone().unwrap_or_default(),
        country: location.country.clone().unwrap_or_default(),
        postal_code: location.postal_code.clone(),
        contact_number: location.contact_number.clone(),
        email: location.email.clone(),
        manager_user_id: location.manager_user_id.clone(),
    }
}

/// One row of the locations table.
#[derive(Debug, Clone, PartialEq)]
pub struct LocationRow {
    pub id: String,
    pub code: String,
    pub name: String,
    pub kind: &'static str,
    pub address: String,
    pub is_active: bool,
}

impl From<&Location> for LocationRow {
    fn from(l: &Location) -> Self {
        LocationRow {
            id: l.id.clone(),
            code: l.location_code.clone(),
            name: l.location_name.clone(),
            kind: l.location_type.label(),
            address: l.full_address(),
            is_active: l.is_active,
        }
    }
}

#[derive(Debug)]
pub struct LocationsPage {
    ctx: PageContext,
    listing: Listing<Location, LocationListParams>,
    editor: Editor<Location, LocationForm>,
}

impl LocationsPage {
    pub fn new(ctx: PageContext) -> Self {
        LocationsPage {
            ctx,
            listing: Listing::new(LocationListParams::default()),
            editor: Editor::new(),
        }
    }

    pub fn listing(&self) -> &Listing<Location, LocationListParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<Location> {
        self.listing.state()
    }

    pub fn editor(&self) -> &Editor<Location, LocationForm> {
        &self.editor
    }

    pub fn rows(&self) -> Vec<LocationRow> {
        self.listing.items().iter().map(LocationRow::from).collect()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_LOCATIONS)
    }

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.locations(self.listing.params().clone());
        self.listing.load(query).await?;
        Ok(())
    }

    pub async fn search(&mut self, term: &str) -> AppResult<()> {
        let term = term.trim();
        self.listing
            .filter(|p| p.search = (!term.is_empty()).then(|| term.to_string()));
        self.load().await
    }

    pub async fn filter_type(&mut self, location_type: Option<LocationType>) -> AppResult<()> {
        self.listing.filter(|p| p.location_type = location_type);
        self.load().await
    }

    pub async fn filter_active(&mut self, active: Option<bool>) -> AppResult<()> {
        self.listing.filter(|p| p.is_active = active);
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

    fn row(&self, id: &str) -> AppResult<Location> {
        self.listing
            .items()
            .iter()
            .find(|l| l.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Location", id))
    }

    pub fn open_create(&mut self) -> AppResult<()> {
        self.editor.open_create(LocationForm::default())
    }

    pub fn open_edit(&mut self, id: &str) -> AppResult<()> {
        let location = self.row(id)?;
        let draft = location_form(&location);
        self.editor.open_edit(location, draft)
    }

    pub fn edit(&mut self) -> AppResult<&mut LocationForm> {
        self.editor.edit()
    }

    pub fn close_dialog(&mut self) {
        self.editor.close();
    }

    /// Create and update send the same payload.
    pub async fn submit(&mut self) -> AppResult<Location> {
        let (payload, target) = self.editor.begin_submit()?;
        let (result, title) = match target {
            None => (
                self.ctx.hooks.create_location().mutate(payload).await,
                "Location Created",
            ),
            Some(location) => (
                self.ctx
                    .hooks
                    .update_location()
                    .mutate((location.id, payload))
                    .await,
                "Location Updated",
            ),
        };

        match result {
            Ok(saved) => {
                self.editor.succeed()?;
                info!(location_id = %saved.id, code = %saved.location_code, "Location saved");
                self.ctx
                    .toast_success(
                        title,
                        format!("{} ({})", saved.location_name, saved.location_code),
                    )
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

    pub fn confirm_delete(&mut self, id: &str) -> AppResult<()> {
        let location = self.row(id)?;
        self.editor.open_delete(location)
    }

    pub async fn delete_confirmed(&mut self) -> AppResult<()> {
        let location = self
            .editor
            .pending_delete()
            .cloned()
            .ok_or_else(|| AppError::invalid_state("No delete is awaiting confirmation"))?;

        match self.ctx.hooks.delete_location().mutate(location.id.clone()).await {
            Ok(()) => {
                self.editor.close();
                self.ctx
                    .toast_success(
                        "Location Deleted",
                        format!("{} was deleted", location.location_name),
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

    fn legacy_location() -> Location {
        serde_json::from_value(serde_json::json!({
            "id": "l1",
            "location_code": "WH-01",
            "location_name": "Main Warehouse",
            "location_type": "WAREHOUSE",
            "city": "Lahore",
            "country": "Pakistan"
        }))
        .unwrap()
    }

    #[test]
    fn test_row_and_prefill() {
        let location = legacy_location();
        let row = LocationRow::from(&location);
        assert_eq!(row.kind, "Warehouse");
        assert_eq!(row.address, "Lahore, Pakistan");

        let form = location_form(&location);
        assert_eq!(form.city, "Lahore");
        assert_eq!(form.address, "");
    }

    #[test]
    fn test_prefilled_legacy_row_needs_address_before_save() {
        let mut form = location_form(&legacy_location());
        assert!(rental_core::check(&mut form).is_err());

        form.address = "1 Mall Road".into();
        form.state = "Punjab".into();
        let payload = rental_core::check(&mut form).unwrap();
        assert_eq!(payload.location_code, "WH-01");
    }
}
