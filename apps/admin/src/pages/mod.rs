//! # Page Controllers
//!
//! One controller per route. A controller owns the explicit state machines
//! for its screen and wires hook results to toasts and navigation; it holds
//! no business rules of its own.

pub mod brands;
pub mod categories;
pub mod customers;
pub mod dashboard;
pub mod editor;
pub mod inventory;
pub mod listing;
pub mod locations;
pub mod login;
pub mod purchases;
pub mod rentals_due;
pub mod sales;
pub mod skus;
pub mod suppliers;

pub use brands::BrandsPage;
pub use categories::{CategoryListPage, CategoryNewPage};
pub use customers::CustomersPage;
pub use dashboard::DashboardPage;
pub use editor::Editor;
pub use inventory::InventoryPage;
pub use listing::Listing;
pub use locations::LocationsPage;
pub use login::LoginPage;
pub use purchases::PurchasesPage;
pub use rentals_due::RentalsDuePage;
pub use sales::SalesPage;
pub use skus::SkusPage;
pub use suppliers::SuppliersPage;

use std::sync::Arc;

use rental_client::{AppHandle, AuthHandle, ClientError, Hooks};
use rental_core::FormErrors;
use tracing::warn;

use crate::navigation::{guard, Navigator, Route};

/// Handles shared by every page. Cheap to clone.
#[derive(Clone)]
pub struct PageContext {
    pub hooks: Hooks,
    pub auth: AuthHandle,
    pub app: AppHandle,
    navigator: Arc<dyn Navigator>,
}

impl std::fmt::Debug for PageContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageContext")
            .field("auth", &self.auth)
            .field("current", &self.navigator.current())
            .finish()
    }
}

impl PageContext {
    pub fn new(hooks: Hooks, auth: AuthHandle, app: AppHandle, navigator: Arc<dyn Navigator>) -> Self {
        PageContext {
            hooks,
            auth,
            app,
            navigator,
        }
    }

    /// Navigates through the auth guard.
    pub fn navigate(&self, route: Route) {
        let landed = guard(route, &self.auth.state());
        self.navigator.navigate(landed);
    }

    pub fn current_route(&self) -> Option<Route> {
        self.navigator.current()
    }

    /// A toast is never worth failing the page over.
    pub async fn toast_success(&self, title: &str, message: impl Into<String>) {
        if let Err(e) = self.app.success(title, Some(message.into())).await {
            warn!(error = %e, title, "Could not show toast");
        }
    }

    pub async fn toast_error(&self, title: &str, message: impl Into<String>) {
        if let Err(e) = self.app.error(title, Some(message.into())).await {
            warn!(error = %e, title, "Could not show toast");
        }
    }
}

/// Banner text for a failed mutation: the server's own words when it sent
/// some, the page's fallback otherwise (including transport failures).
pub fn failure_message(err: &ClientError, fallback: &str) -> String {
    err.server_message()
        .map(str::to_string)
        .unwrap_or_else(|| fallback.to_string())
}

/// Server field errors keyed by the form's field names.
pub(crate) fn form_errors(err: &ClientError, renames: &[(&str, &str)]) -> FormErrors {
    let reported = err.field_errors();
    let mut errors = FormErrors::new();
    for field in reported.fields() {
        let name = renames
            .iter()
            .find(|(server, _)| *server == field)
            .map(|(_, form)| *form)
            .unwrap_or(field);
        for message in reported.messages(field) {
            errors.add(name, message.as_str());
        }
    }
    errors
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn test_failure_message_prefers_server_text() {
        let err = ClientError::api(400, "Category with name 'Cameras' already exists");
        assert_eq!(
            failure_message(&err, "Failed to create category. Please try again."),
            "Category with name 'Cameras' already exists"
        );
        let err = ClientError::Connection("refused".into());
        assert_eq!(
            failure_message(&err, "Failed to create category. Please try again."),
            "Failed to create category. Please try again."
        );
    }

    #[test]
    fn test_form_errors_renamed() {
        let mut fields = BTreeMap::new();
        fields.insert("category_name".to_string(), vec!["Too long".to_string()]);
        fields.insert("display_order".to_string(), vec!["Must be positive".to_string()]);
        let err = ClientError::Api {
            status: 422,
            message: "Validation failed".into(),
            field_errors: fields,
        };
        let errors = form_errors(&err, &[("category_name", "name")]);
        assert_eq!(errors.first("name"), Some("Too long"));
        assert_eq!(errors.first("display_order"), Some("Must be positive"));
        assert!(!errors.contains("category_name"));
    }
}
