//! `/customers`
//!
//! Table with type/tier/blacklist filters, name search, create/edit dialogs
//! and a one-click blacklist toggle.

use rental_core::{
    BlacklistAction, BlacklistStatus, Customer, CustomerCreate, CustomerForm,
    CustomerListParams, CustomerTier, CustomerType, CustomerUpdate, ListState,
};
use tracing::info;

use super::editor::Editor;
use super::listing::Listing;
use super::{failure_message, PageContext};
use crate::error::{AppError, AppResult};

pub const NO_CUSTOMERS: &str = "No customers found";
pub const SAVE_FAILED: &str = "Failed to save customer. Please try again.";
pub const BLACKLIST_FAILED: &str = "Failed to update blacklist status. Please try again.";

pub const NAME_SEARCH_LIMIT: u64 = 10;

/// Prefills the edit dialog. Code and type are fixed once created.
pub fn customer_form(customer: &Customer) -> CustomerForm {
    CustomerForm {
        customer_code: customer.customer_code.clone(),
        customer_type: customer.customer_type,
        business_name: customer.business_name.clone(),
        first_name: customer.first_name.clone(),
        last_name: customer.last_name.clone(),
        tax_id: customer.tax_id.clone(),
        customer_tier: customer.customer_tier,
        credit_limit: customer.credit_limit,
    }
}

fn customer_update(payload: CustomerCreate) -> CustomerUpdate {
    CustomerUpdate {
        business_name: payload.business_name,
        first_name: payload.first_name,
        last_name: payload.last_name,
        tax_id: payload.tax_id,
        customer_tier: payload.customer_tier,
        credit_limit: Some(payload.credit_limit),
    }
}

#[derive(Debug)]
pub struct CustomersPage {
    ctx: PageContext,
    listing: Listing<Customer, CustomerListParams>,
    editor: Editor<Customer, CustomerForm>,
    name_results: Vec<Customer>,
}

impl CustomersPage {
    pub fn new(ctx: PageContext) -> Self {
        CustomersPage {
            ctx,
            listing: Listing::new(CustomerListParams::default()),
            editor: Editor::new(),
            name_results: Vec::new(),
        }
    }

    pub fn listing(&self) -> &Listing<Customer, CustomerListParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<Customer> {
        self.listing.state()
    }

    pub fn editor(&self) -> &Editor<Customer, CustomerForm> {
        &self.editor
    }

    pub fn name_results(&self) -> &[Customer] {
        &self.name_results
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_CUSTOMERS)
    }

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.customers(self.listing.params().clone());
        self.listing.load(query).await?;
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
        customer_type: Option<CustomerType>,
        customer_tier: Option<CustomerTier>,
        blacklist_status: Option<BlacklistStatus>,
        is_active: Option<bool>,
    ) -> AppResult<()> {
        self.listing.filter(|p| {
            p.customer_type = customer_type;
            p.customer_tier = customer_tier;
            p.blacklist_status = blacklist_status;
            p.is_active = is_active;
        });
        self.load().await
    }

    /// Customer picker lookup; a blank name clears the results.
    pub async fn search_by_name(&mut self, name: &str) -> AppResult<&[Customer]> {
        let name = name.trim();
        if name.is_empty() {
            self.name_results.clear();
            return Ok(&self.name_results);
        }
        self.name_results = self
            .ctx
            .hooks
            .customer_search(name, NAME_SEARCH_LIMIT)
            .fetch()
            .await?;
        Ok(&self.name_results)
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

    fn row(&self, id: &str) -> AppResult<Customer> {
        self.listing
            .items()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Customer", id))
    }

    pub fn open_create(&mut self) -> AppResult<()> {
        self.editor.open_create(CustomerForm::default())
    }

    pub fn open_edit(&mut self, id: &str) -> AppResult<()> {
        let customer = self.row(id)?;
        let draft = customer_form(&customer);
        self.editor.open_edit(customer, draft)
    }

    pub fn edit(&mut self) -> AppResult<&mut CustomerForm> {
        self.editor.edit()
    }

    pub fn close_dialog(&mut self) {
        self.editor.close();
    }

    pub async fn submit(&mut self) -> AppResult<Customer> {
        let (payload, target) = self.editor.begin_submit()?;
        let (result, title) = match target {
            None => (
                self.ctx.hooks.create_customer().mutate(payload).await,
                "Customer Created",
            ),
            Some(customer) => (
                self.ctx
                    .hooks
                    .update_customer()
                    .mutate((customer.id, customer_update(payload)))
                    .await,
                "Customer Updated",
            ),
        };

        match result {
            Ok(saved) => {
                self.editor.succeed()?;
                info!(customer_id = %saved.id, code = %saved.customer_code, "Customer saved");
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

    /// Flips the customer's blacklist flag.
    pub async fn toggle_blacklist(&mut self, id: &str) -> AppResult<Customer> {
        let customer = self.row(id)?;
        let action = BlacklistAction::toggle_for(&customer);
        match self
            .ctx
            .hooks
            .set_customer_blacklist()
            .mutate((customer.id.clone(), action))
            .await
        {
            Ok(updated) => {
                let title = match action {
                    BlacklistAction::Blacklist => "Customer Blacklisted",
                    BlacklistAction::Unblacklist => "Customer Cleared",
                };
                info!(customer_id = %updated.id, ?action, "Blacklist status changed");
                self.ctx.toast_success(title, updated.display_name()).await;
                self.load().await?;
                Ok(updated)
            }
            Err(e) => {
                self.ctx
                    .toast_error("Error", failure_message(&e, BLACKLIST_FAILED))
                    .await;
                Err(AppError::from(e))
            }
        }
    }
}
