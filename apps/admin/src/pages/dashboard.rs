//! `/dashboard`
//!
//! Landing page after login. Every card loads independently; a card that
//! fails stays hidden and the rest still render.

use rental_core::{RentalsDueSummary, User};
use tracing::warn;

use super::PageContext;
use crate::error::AppResult;
use crate::navigation::Route;

/// Shortcut tiles, shown only when the user holds the permission.
pub const SHORTCUTS: &[(&str, &str, Route)] = &[
    ("Categories", "CATEGORY_VIEW", Route::Categories),
    ("Brands", "BRAND_VIEW", Route::Brands),
    ("SKUs", "SKU_VIEW", Route::Skus),
    ("Suppliers", "SUPPLIER_VIEW", Route::Suppliers),
    ("Purchases", "PURCHASE_VIEW", Route::Purchases),
    ("Inventory", "INVENTORY_VIEW", Route::Inventory),
    ("Customers", "CUSTOMER_VIEW", Route::Customers),
    ("Locations", "LOCATION_VIEW", Route::Locations),
    ("Sales", "SALE_VIEW", Route::Sales),
    ("Rentals Due", "RENTAL_VIEW", Route::RentalsDueToday),
];

#[derive(Debug)]
pub struct DashboardPage {
    ctx: PageContext,
    due: Option<RentalsDueSummary>,
}

impl DashboardPage {
    pub fn new(ctx: PageContext) -> Self {
        DashboardPage { ctx, due: None }
    }

    /// `"Welcome back, Ada!"`, or a plain greeting before the user loads.
    pub fn greeting(&self) -> String {
        match self.ctx.auth.user() {
            Some(user) => format!("Welcome back, {}!", user.display_name()),
            None => "Welcome back!".to_string(),
        }
    }

    pub fn unread_notifications(&self) -> usize {
        self.ctx.app.unread_count()
    }

    pub fn rentals_due(&self) -> Option<&RentalsDueSummary> {
        self.due.as_ref()
    }

    /// Shortcut tiles the signed-in user may open. Superusers see all.
    pub fn shortcuts(&self) -> Vec<(&'static str, Route)> {
        let state = self.ctx.auth.state();
        SHORTCUTS
            .iter()
            .filter(|(_, permission, _)| state.is_superuser() || state.has_permission(permission))
            .map(|(label, _, route)| (*label, route.clone()))
            .collect()
    }

    /// Refreshes the profile and the rentals-due card.
    pub async fn load(&mut self) -> AppResult<()> {
        self.refresh_user().await?;

        let location = self.ctx.app.state().current_location;
        match self
            .ctx
            .hooks
            .api()
            .rentals_due
            .summary(location.as_deref())
            .await
        {
            Ok(summary) => self.due = Some(summary),
            Err(e) => {
                warn!(error = %e, "Rentals-due card unavailable");
                self.due = None;
            }
        }
        Ok(())
    }

    async fn refresh_user(&self) -> AppResult<Option<User>> {
        match self.ctx.hooks.current_user().fetch().await {
            Ok(user) => {
                self.ctx.auth.update_user(user.clone()).await?;
                Ok(Some(user))
            }
            // A 401 already cleared the session; the guard sends us to login.
            Err(rental_client::ClientError::Unauthorized(_)) => {
                self.ctx.navigate(Route::Dashboard);
                Ok(None)
            }
            Err(e) => {
                warn!(error = %e, "Could not refresh profile");
                Ok(None)
            }
        }
    }

    pub fn open(&self, route: Route) {
        self.ctx.navigate(route);
    }
}
