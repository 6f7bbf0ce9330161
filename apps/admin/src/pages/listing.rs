//! Paginated list plumbing shared by the list pages.

use std::future::Future;

use rental_client::{ClientResult, Query};
use rental_core::{
    BrandListParams, CategoryListParams, CustomerListParams, InventoryFilters, ListState,
    LocationListParams, Page, PageRequest, PurchaseListParams, PurchaseReturnListParams,
    RentalsDueParams, SkuListParams, SupplierListParams, TransactionListParams,
};

/// List filters that carry a skip/limit window.
pub trait Paginated {
    fn page_request(&self) -> PageRequest;

    fn set_page_request(&mut self, page: PageRequest);
}

macro_rules! paginated {
    ($($params:ty),* $(,)?) => {
        $(
            impl Paginated for $params {
                fn page_request(&self) -> PageRequest {
                    self.page
                }

                fn set_page_request(&mut self, page: PageRequest) {
                    self.page = page;
                }
            }
        )*
    };
}

paginated!(
    CategoryListParams,
    BrandListParams,
    SupplierListParams,
    LocationListParams,
    SkuListParams,
    TransactionListParams,
    RentalsDueParams,
    PurchaseListParams,
    PurchaseReturnListParams,
    InventoryFilters,
    CustomerListParams,
);

/// Filters plus the rows they produced.
#[derive(Debug, Clone)]
pub struct Listing<T, P> {
    params: P,
    state: ListState<T>,
}

impl<T, P> Listing<T, P>
where
    T: Clone + Send + Sync + 'static,
    P: Paginated + Clone,
{
    pub fn new(params: P) -> Self {
        Listing {
            params,
            state: ListState::Idle,
        }
    }

    pub fn params(&self) -> &P {
        &self.params
    }

    /// Changes filters and goes back to the first page.
    pub fn filter(&mut self, change: impl FnOnce(&mut P)) {
        change(&mut self.params);
        let page = self.params.page_request();
        self.params.set_page_request(PageRequest::new(0, page.limit));
    }

    pub fn state(&self) -> &ListState<T> {
        &self.state
    }

    pub fn items(&self) -> &[T] {
        self.state.items()
    }

    /// Runs `query` and records the outcome. The error, if any, is also
    /// kept in the list state for rendering.
    pub async fn load(&mut self, query: Query<Page<T>>) -> ClientResult<()> {
        self.load_from(async move { query.fetch().await }).await
    }

    /// Like [`Listing::load`], for queries whose rows come wrapped in a
    /// larger report.
    pub async fn load_from(
        &mut self,
        fetch: impl Future<Output = ClientResult<Page<T>>>,
    ) -> ClientResult<()> {
        self.state.start_loading();
        let result = fetch.await;
        let outcome = result.as_ref().map(|_| ()).map_err(Clone::clone);
        self.state.finish(result.map_err(|e| e.user_message()));
        outcome
    }

    /// Zero-based index of the page on screen.
    pub fn page_index(&self) -> u64 {
        let page = self.params.page_request();
        if page.limit == 0 {
            0
        } else {
            page.skip / page.limit
        }
    }

    pub fn page_count(&self) -> u64 {
        let limit = self.params.page_request().limit;
        match self.state.page() {
            Some(page) if limit > 0 => page.total.div_ceil(limit),
            _ => 0,
        }
    }

    pub fn has_next(&self) -> bool {
        self.state.page().is_some_and(Page::has_more)
    }

    pub fn has_previous(&self) -> bool {
        self.params.page_request().skip > 0
    }

    /// Moves the window forward. Returns false on the last page.
    pub fn next_page(&mut self) -> bool {
        if !self.has_next() {
            return false;
        }
        let next = self.params.page_request().next();
        self.params.set_page_request(next);
        true
    }

    pub fn previous_page(&mut self) -> bool {
        let page = self.params.page_request();
        if page.skip == 0 {
            return false;
        }
        self.params
            .set_page_request(PageRequest::new(page.skip.saturating_sub(page.limit), page.limit));
        true
    }

    /// One-based page number, as pagination controls show it.
    pub fn go_to_page(&mut self, page: u64) {
        let limit = self.params.page_request().limit;
        self.params.set_page_request(PageRequest::from_page(page, limit));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded(total: u64, skip: u64, limit: u64, rows: usize) -> Listing<u32, BrandListParams> {
        let mut listing = Listing::new(BrandListParams {
            page: PageRequest::new(skip, limit),
            ..Default::default()
        });
        listing.state.finish(Ok::<_, String>(Page {
            items: vec![0; rows],
            total,
            skip,
            limit,
        }));
        listing
    }

    #[test]
    fn test_paging_forward_and_back() {
        let mut listing = loaded(25, 0, 10, 10);
        assert_eq!(listing.page_count(), 3);
        assert!(listing.has_next());
        assert!(!listing.has_previous());

        assert!(listing.next_page());
        assert_eq!(listing.params().page.skip, 10);
        assert_eq!(listing.page_index(), 1);

        assert!(listing.previous_page());
        assert_eq!(listing.params().page.skip, 0);
        assert!(!listing.previous_page());
    }

    #[test]
    fn test_last_page_stops() {
        let mut listing = loaded(25, 20, 10, 5);
        assert!(!listing.has_next());
        assert!(!listing.next_page());
        listing.go_to_page(1);
        assert_eq!(listing.params().page, PageRequest::new(0, 10));
    }

    #[test]
    fn test_filter_resets_window() {
        let mut listing = loaded(25, 20, 10, 5);
        listing.filter(|p| p.search = Some("canon".into()));
        assert_eq!(listing.params().page, PageRequest::new(0, 10));
        assert_eq!(listing.params().search.as_deref(), Some("canon"));
    }
}
