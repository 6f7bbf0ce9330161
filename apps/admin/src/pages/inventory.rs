//! `/inventory`
//!
//! Unit table filtered by location/SKU/status/grade, a status-count strip,
//! an add-unit dialog, per-row status changes and single or bulk transfers.

use rental_core::{
    BulkTransfer, BulkTransferResult, ConditionGrade, InventoryFilters, InventoryStatus,
    InventoryUnit, InventoryUnitForm, ListState, StatusCountParams, StatusCounts, TransferForm,
};
use tracing::{info, warn};

use super::editor::Editor;
use super::listing::Listing;
use super::{failure_message, PageContext};
use crate::error::{AppError, AppResult};

pub const NO_UNITS: &str = "No inventory units found";
pub const CREATE_FAILED: &str = "Failed to add inventory unit. Please try again.";
pub const STATUS_FAILED: &str = "Failed to update unit status. Please try again.";
pub const TRANSFER_FAILED: &str = "Failed to transfer unit. Please try again.";

/// Checks a status change before it is sent.
pub fn ensure_status_change(unit: &InventoryUnit, next: InventoryStatus) -> AppResult<()> {
    if unit.status.is_terminal() {
        return Err(AppError::invalid_state(format!(
            "Unit {} is {} and can no longer change status",
            unit.label(),
            unit.status
        )));
    }
    if unit.status == next {
        return Err(AppError::validation(format!("Unit {} is already {}", unit.label(), next)));
    }
    Ok(())
}

fn ensure_transferable(unit: &InventoryUnit) -> AppResult<()> {
    if unit.status.can_transfer() {
        Ok(())
    } else {
        Err(AppError::invalid_state(format!(
            "Unit {} is {} and cannot be transferred",
            unit.label(),
            unit.status
        )))
    }
}

#[derive(Debug)]
pub struct InventoryPage {
    ctx: PageContext,
    listing: Listing<InventoryUnit, InventoryFilters>,
    create: Editor<InventoryUnit, InventoryUnitForm>,
    transfer: Editor<InventoryUnit, TransferForm>,
    counts: Option<StatusCounts>,
}

impl InventoryPage {
    pub fn new(ctx: PageContext) -> Self {
        InventoryPage {
            ctx,
            listing: Listing::new(InventoryFilters::default()),
            create: Editor::new(),
            transfer: Editor::new(),
            counts: None,
        }
    }

    pub fn listing(&self) -> &Listing<InventoryUnit, InventoryFilters> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<InventoryUnit> {
        self.listing.state()
    }

    pub fn create_editor(&self) -> &Editor<InventoryUnit, InventoryUnitForm> {
        &self.create
    }

    pub fn transfer_editor(&self) -> &Editor<InventoryUnit, TransferForm> {
        &self.transfer
    }

    pub fn status_counts(&self) -> Option<&StatusCounts> {
        self.counts.as_ref()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_UNITS)
    }

    fn ensure_no_dialog(&self) -> AppResult<()> {
        if self.create.is_open() || self.transfer.is_open() {
            Err(AppError::invalid_state("Another dialog is already open"))
        } else {
            Ok(())
        }
    }

    fn row(&self, id: &str) -> AppResult<InventoryUnit> {
        self.listing
            .items()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Inventory unit", id))
    }

    // =========================================================================
    // List
    // =========================================================================

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.inventory_units(self.listing.params().clone());
        self.listing.load(query).await?;
        Ok(())
    }

    /// The count strip follows the location/SKU filters. A failure hides it.
    pub async fn load_counts(&mut self) {
        let filters = self.listing.params();
        let params = StatusCountParams {
            location_id: match filters.location_ids.as_slice() {
                [only] => Some(only.clone()),
                _ => None,
            },
            sku_id: match filters.sku_ids.as_slice() {
                [only] => Some(only.clone()),
                _ => None,
            },
        };
        match self.ctx.hooks.inventory_status_counts(params).fetch().await {
            Ok(counts) => self.counts = Some(counts),
            Err(e) => {
                warn!(error = %e, "Inventory status counts unavailable");
                self.counts = None;
            }
        }
    }

    pub async fn search(&mut self, term: &str) -> AppResult<()> {
        let term = term.trim();
        self.listing
            .filter(|f| f.search = (!term.is_empty()).then(|| term.to_string()));
        self.load().await
    }

    /// Empty lists mean "any".
    pub async fn filter(
        &mut self,
        location_ids: Vec<String>,
        sku_ids: Vec<String>,
        statuses: Vec<InventoryStatus>,
        condition_grades: Vec<ConditionGrade>,
    ) -> AppResult<()> {
        self.listing.filter(|f| {
            f.location_ids = location_ids;
            f.sku_ids = sku_ids;
            f.statuses = statuses;
            f.condition_grades = condition_grades;
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

    /// Looks a unit up by its scanned code.
    pub async fn find_by_code(&self, code: &str) -> AppResult<InventoryUnit> {
        let code = code.trim();
        if code.is_empty() {
            return Err(AppError::validation("Inventory code is required"));
        }
        Ok(self.ctx.hooks.api().inventory.by_code(code).await?)
    }

    // =========================================================================
    // Add unit
    // =========================================================================

    pub fn open_create(&mut self) -> AppResult<()> {
        self.ensure_no_dialog()?;
        self.create.open_create(InventoryUnitForm::default())
    }

    pub fn edit_create(&mut self) -> AppResult<&mut InventoryUnitForm> {
        self.create.edit()
    }

    pub fn close_create(&mut self) {
        self.create.close();
    }

    pub async fn submit_create(&mut self) -> AppResult<InventoryUnit> {
        let (payload, _) = self.create.begin_submit()?;

        match self.ctx.hooks.create_inventory_unit().mutate(payload).await {
            Ok(unit) => {
                self.create.succeed()?;
                info!(unit_id = %unit.id, sku_id = %unit.sku_id, "Inventory unit added");
                self.ctx
                    .toast_success("Unit Added", format!("Added {}", unit.label()))
                    .await;
                self.load().await?;
                Ok(unit)
            }
            Err(e) => {
                let message = self.create.fail(&e, CREATE_FAILED, &[])?;
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }

    // =========================================================================
    // Status
    // =========================================================================

    pub async fn set_status(
        &mut self,
        id: &str,
        status: InventoryStatus,
        notes: Option<&str>,
    ) -> AppResult<InventoryUnit> {
        let unit = self.row(id)?;
        ensure_status_change(&unit, status)?;
        let notes = notes.map(str::trim).filter(|n| !n.is_empty()).map(String::from);

        match self
            .ctx
            .hooks
            .set_inventory_status()
            .mutate((unit.id.clone(), status, notes))
            .await
        {
            Ok(updated) => {
                info!(unit_id = %updated.id, from = %unit.status, to = %updated.status, "Unit status changed");
                self.ctx
                    .toast_success(
                        "Status Updated",
                        format!("{} is now {}", updated.label(), updated.status),
                    )
                    .await;
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

    // =========================================================================
    // Transfer
    // =========================================================================

    pub fn open_transfer(&mut self, id: &str) -> AppResult<()> {
        self.ensure_no_dialog()?;
        let unit = self.row(id)?;
        ensure_transferable(&unit)?;
        let draft = TransferForm {
            from_location_id: unit.location_id.clone(),
            ..Default::default()
        };
        self.transfer.open_edit(unit, draft)
    }

    pub fn edit_transfer(&mut self) -> AppResult<&mut TransferForm> {
        self.transfer.edit()
    }

    pub fn close_transfer(&mut self) {
        self.transfer.close();
    }

    pub async fn submit_transfer(&mut self) -> AppResult<InventoryUnit> {
        let (request, target) = self.transfer.begin_submit()?;
        let unit = target.ok_or_else(|| AppError::invalid_state("No unit selected for transfer"))?;

        match self
            .ctx
            .hooks
            .transfer_unit()
            .mutate((unit.id.clone(), request))
            .await
        {
            Ok(moved) => {
                self.transfer.succeed()?;
                info!(
                    unit_id = %moved.id,
                    from = %unit.location_id,
                    to = %moved.location_id,
                    "Unit transferred"
                );
                self.ctx
                    .toast_success("Unit Transferred", format!("{} was moved", moved.label()))
                    .await;
                self.load().await?;
                Ok(moved)
            }
            Err(e) => {
                let message = self.transfer.fail(&e, TRANSFER_FAILED, &[])?;
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }

    /// Moves several listed units at once. They must share a location; units
    /// the server refuses are reported in the result, not as an error.
    pub async fn transfer_selected(
        &mut self,
        ids: &[&str],
        to_location_id: &str,
        notes: Option<&str>,
    ) -> AppResult<BulkTransferResult> {
        let units = ids
            .iter()
            .map(|id| self.row(id))
            .collect::<AppResult<Vec<_>>>()?;
        let Some(first) = units.first() else {
            return Err(AppError::validation("Select at least one unit to transfer"));
        };
        let from = first.location_id.clone();
        if units.iter().any(|u| u.location_id != from) {
            return Err(AppError::validation("Selected units must share a location"));
        }
        for unit in &units {
            ensure_transferable(unit)?;
        }
        let mut form = TransferForm {
            from_location_id: from.clone(),
            to_location_id: to_location_id.to_string(),
            transfer_notes: notes.map(String::from),
        };
        let single = rental_core::check(&mut form).map_err(AppError::from)?;

        let request = BulkTransfer {
            unit_ids: units.into_iter().map(|u| u.id).collect(),
            from_location_id: from,
            to_location_id: single.to_location_id,
            transfer_notes: single.transfer_notes,
        };
        match self.ctx.hooks.transfer_units().mutate(request).await {
            Ok(result) => {
                let title = if result.failed.is_empty() {
                    "Units Transferred"
                } else {
                    "Transfer Partially Completed"
                };
                self.ctx
                    .toast_success(
                        title,
                        format!(
                            "{} moved, {} failed",
                            result.transferred.len(),
                            result.failed.len()
                        ),
                    )
                    .await;
                self.load().await?;
                Ok(result)
            }
            Err(e) => {
                self.ctx
                    .toast_error("Error", failure_message(&e, TRANSFER_FAILED))
                    .await;
                Err(AppError::from(e))
            }
        }
    }
}
