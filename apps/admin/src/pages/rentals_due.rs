//! `/rentals/due-today`

use rental_core::{DueUrgency, ListState, RentalDueToday, RentalsDueParams, RentalsDueSummary};

use super::listing::Listing;
use super::PageContext;
use crate::error::{AppError, AppResult};

pub const NOTHING_DUE: &str = "No rentals due today";

/// Furthest look-ahead the filter offers.
pub const MAX_DAYS_AHEAD: u32 = 30;

#[derive(Debug)]
pub struct RentalsDuePage {
    ctx: PageContext,
    listing: Listing<RentalDueToday, RentalsDueParams>,
    summary: Option<RentalsDueSummary>,
}

impl RentalsDuePage {
    pub fn new(ctx: PageContext) -> Self {
        RentalsDuePage {
            ctx,
            listing: Listing::new(RentalsDueParams::default()),
            summary: None,
        }
    }

    pub fn listing(&self) -> &Listing<RentalDueToday, RentalsDueParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<RentalDueToday> {
        self.listing.state()
    }

    pub fn summary(&self) -> Option<&RentalsDueSummary> {
        self.summary.as_ref()
    }

    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NOTHING_DUE)
    }

    /// Rows with the given urgency, in server order.
    pub fn with_urgency(&self, urgency: DueUrgency) -> Vec<&RentalDueToday> {
        self.listing
            .items()
            .iter()
            .filter(|r| r.urgency() == urgency)
            .collect()
    }

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.rentals_due(self.listing.params().clone());
        let mut summary = None;
        let result = self
            .listing
            .load_from(async {
                query.fetch().await.map(|report| {
                    summary = report.summary;
                    report.rentals
                })
            })
            .await;
        self.summary = summary;
        result?;
        Ok(())
    }

    /// Applies all three filters with a single fetch.
    pub async fn filter(
        &mut self,
        include_overdue: bool,
        location_id: Option<&str>,
        days_ahead: u32,
    ) -> AppResult<()> {
        check_days_ahead(days_ahead)?;
        self.listing.filter(|p| {
            p.include_overdue = include_overdue;
            p.location_id = location_id.map(str::to_string);
            p.days_ahead = days_ahead;
        });
        self.load().await
    }

    pub async fn include_overdue(&mut self, include: bool) -> AppResult<()> {
        self.listing.filter(|p| p.include_overdue = include);
        self.load().await
    }

    pub async fn filter_location(&mut self, location_id: Option<&str>) -> AppResult<()> {
        self.listing.filter(|p| p.location_id = location_id.map(str::to_string));
        self.load().await
    }

    pub async fn days_ahead(&mut self, days: u32) -> AppResult<()> {
        check_days_ahead(days)?;
        self.listing.filter(|p| p.days_ahead = days);
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
}

fn check_days_ahead(days: u32) -> AppResult<()> {
    if days > MAX_DAYS_AHEAD {
        return Err(AppError::validation(format!(
            "Look-ahead must be {} days or less",
            MAX_DAYS_AHEAD
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_days_ahead_bounded() {
        assert!(check_days_ahead(0).is_ok());
        assert!(check_days_ahead(MAX_DAYS_AHEAD).is_ok());
        let err = check_days_ahead(MAX_DAYS_AHEAD + 1).unwrap_err();
        assert!(err.is_validation());
    }
}
