//! # Query and Mutation Primitives
//!
//! A [`Query`] wraps one fetcher under one cache key; a [`Mutation`] wraps
//! one write and invalidates cache groups when it succeeds.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────────────┐
//! │  Query::fetch()                                                        │
//! │    ├── fresh entry in cache ─────────────► data (no request)           │
//! │    └── stale / missing ──► is_loading ──► fetcher ──► cache.resolve    │
//! │                                              │                         │
//! │                                              └─ err ──► state.error    │
//! │                                                                        │
//! │  Mutation::mutate(input)                                               │
//! │    is_pending ──► write ──┬─ ok  ──► invalidate groups ──► on_success  │
//! │                           └─ err ──────────────────────► on_error      │
//! └────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! [`Hooks`] binds both to the resource APIs with the cache keys and
//! invalidation groups each resource uses.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rental_core::{
    BlacklistAction, Brand, BrandCreate, BrandListParams, BrandUpdate, BulkTransfer,
    BulkTransferResult, Category, CategoryCreate, CategoryListParams, CategoryMove, CategoryTree,
    CategoryUpdate, CreateSaleRequest, Customer, CustomerCreate, CustomerListParams,
    CustomerUpdate, InventoryFilters, InventoryStatus, InventoryUnit, InventoryUnitCreate,
    Location, LocationListParams, LocationPayload, Page, PaymentRequest, Purchase,
    PurchaseHistoryParams, PurchaseListParams, PurchaseRecord, PurchaseReturn,
    PurchaseReturnListParams, PurchaseReturnRecord, QueryKey, Resource, RentalsDueParams, Sku,
    SkuCreate, SkuListParams, SkuRentalSettings, SkuSaleSettings, SkuUpdate, StatusCountParams,
    StatusCounts, Supplier, SupplierAnalytics, SupplierCreate, SupplierListParams,
    SupplierUpdate, Transaction, TransactionListParams, UnitTransfer, User,
};
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::api::rentals_due::RentalsDueReport;
use crate::api::Api;
use crate::cache::QueryCache;
use crate::error::{ClientError, ClientResult};

type BoxFuture<T> = Pin<Box<dyn Future<Output = ClientResult<T>> + Send>>;
type Fetcher<T> = Arc<dyn Fn() -> BoxFuture<T> + Send + Sync>;
type Writer<I, O> = Arc<dyn Fn(I) -> BoxFuture<O> + Send + Sync>;
type SuccessCallback<O> = Arc<dyn Fn(&O) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&ClientError) + Send + Sync>;

// =============================================================================
// Query
// =============================================================================

/// What a read hook exposes.
#[derive(Debug, Clone)]
pub struct QueryState<T> {
    pub data: Option<T>,
    pub is_loading: bool,
    pub error: Option<ClientError>,
}

impl<T> Default for QueryState<T> {
    fn default() -> Self {
        QueryState {
            data: None,
            is_loading: false,
            error: None,
        }
    }
}

/// A cached read.
#[derive(Clone)]
pub struct Query<T> {
    key: QueryKey,
    cache: QueryCache,
    fetcher: Fetcher<T>,
    state: Arc<watch::Sender<QueryState<T>>>,
}

impl<T> std::fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Query").field("key", &self.key).finish()
    }
}

impl<T> Query<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new<F, Fut>(cache: QueryCache, key: QueryKey, fetch: F) -> Self
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<T>> + Send + 'static,
    {
        let (state, _) = watch::channel(QueryState::default());
        Query {
            key,
            cache,
            fetcher: Arc::new(move || -> BoxFuture<T> { Box::pin(fetch()) }),
            state: Arc::new(state),
        }
    }

    pub fn key(&self) -> &QueryKey {
        &self.key
    }

    /// Snapshot of `{data, is_loading, error}`.
    pub fn state(&self) -> QueryState<T> {
        self.state.borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.state.borrow().data.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state.borrow().is_loading
    }

    pub fn error(&self) -> Option<ClientError> {
        self.state.borrow().error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<T>> {
        self.state.subscribe()
    }

    /// Serves a fresh cache entry, otherwise goes to the network.
    pub async fn fetch(&self) -> ClientResult<T> {
        if let Some(data) = self.cache.get_fresh::<T>(&self.key).await {
            debug!(key = %self.key, "Query served from cache");
            self.state.send_modify(|s| {
                s.data = Some(data.clone());
                s.is_loading = false;
                s.error = None;
            });
            return Ok(data);
        }
        self.refetch().await
    }

    /// Always goes to the network. Data already shown stays visible while
    /// the request is in flight.
    pub async fn refetch(&self) -> ClientResult<T> {
        self.state.send_modify(|s| s.is_loading = true);
        let epoch = self.cache.begin(&self.key).await;

        match (self.fetcher)().await {
            Ok(data) => {
                let kept = self.cache.resolve(&self.key, epoch, data.clone()).await;
                let shown = if kept {
                    Some(data.clone())
                } else {
                    self.cache.get::<T>(&self.key).await
                };
                self.state.send_modify(|s| {
                    s.data = shown;
                    s.is_loading = false;
                    s.error = None;
                });
                Ok(data)
            }
            Err(e) => {
                debug!(key = %self.key, error = %e, "Query failed");
                self.state.send_modify(|s| {
                    s.is_loading = false;
                    s.error = Some(e.clone());
                });
                Err(e)
            }
        }
    }
}

// =============================================================================
// Mutation
// =============================================================================

/// A write that invalidates cache groups when it succeeds.
pub struct Mutation<I, O> {
    cache: QueryCache,
    writer: Writer<I, O>,
    invalidates: Vec<QueryKey>,
    on_success: Option<SuccessCallback<O>>,
    on_error: Option<ErrorCallback>,
    pending: Arc<AtomicUsize>,
}

impl<I, O> Clone for Mutation<I, O> {
    fn clone(&self) -> Self {
        Mutation {
            cache: self.cache.clone(),
            writer: self.writer.clone(),
            invalidates: self.invalidates.clone(),
            on_success: self.on_success.clone(),
            on_error: self.on_error.clone(),
            pending: self.pending.clone(),
        }
    }
}

impl<I, O> std::fmt::Debug for Mutation<I, O> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mutation")
            .field("invalidates", &self.invalidates)
            .field("pending", &self.pending.load(Ordering::SeqCst))
            .finish()
    }
}

impl<I, O> Mutation<I, O>
where
    I: Send + 'static,
    O: Send + 'static,
{
    pub fn new<F, Fut>(cache: QueryCache, write: F) -> Self
    where
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<O>> + Send + 'static,
    {
        Mutation {
            cache,
            writer: Arc::new(move |input: I| -> BoxFuture<O> { Box::pin(write(input)) }),
            invalidates: Vec::new(),
            on_success: None,
            on_error: None,
            pending: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Adds a cache group to invalidate after a successful write.
    pub fn invalidates(mut self, group: QueryKey) -> Self {
        self.invalidates.push(group);
        self
    }

    pub fn on_success(mut self, callback: impl Fn(&O) + Send + Sync + 'static) -> Self {
        self.on_success = Some(Arc::new(callback));
        self
    }

    pub fn on_error(mut self, callback: impl Fn(&ClientError) + Send + Sync + 'static) -> Self {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::SeqCst) > 0
    }

    /// Runs the write. Errors are handed back unchanged; the cache is only
    /// touched on success.
    pub async fn mutate(&self, input: I) -> ClientResult<O> {
        let result = {
            let _pending = PendingGuard::enter(&self.pending);
            (self.writer)(input).await
        };

        match &result {
            Ok(output) => {
                for group in &self.invalidates {
                    self.cache.invalidate(group).await;
                }
                if let Some(callback) = &self.on_success {
                    callback(output);
                }
            }
            Err(e) => {
                warn!(error = %e, "Mutation failed");
                if let Some(callback) = &self.on_error {
                    callback(e);
                }
            }
        }
        result
    }
}

/// Counts one in-flight write; released on drop so an abandoned
/// `mutate` future does not leave the mutation pending.
struct PendingGuard<'a>(&'a AtomicUsize);

impl<'a> PendingGuard<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        PendingGuard(counter)
    }
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

// =============================================================================
// Resource Hooks
// =============================================================================

/// Queries and mutations for every resource, sharing one cache.
#[derive(Debug, Clone)]
pub struct Hooks {
    api: Api,
    cache: QueryCache,
}

impl Hooks {
    pub fn new(api: Api, cache: QueryCache) -> Self {
        Hooks { api, cache }
    }

    pub fn api(&self) -> &Api {
        &self.api
    }

    pub fn cache(&self) -> &QueryCache {
        &self.cache
    }

    fn mutation<I, O, F, Fut>(&self, groups: &[Resource], write: F) -> Mutation<I, O>
    where
        I: Send + 'static,
        O: Send + 'static,
        F: Fn(I) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ClientResult<O>> + Send + 'static,
    {
        groups.iter().fold(Mutation::new(self.cache.clone(), write), |m, r| {
            m.invalidates(QueryKey::resource(*r))
        })
    }

    // =========================================================================
    // Auth
    // =========================================================================

    pub fn current_user(&self) -> Query<User> {
        let api = self.api.auth.clone();
        Query::new(self.cache.clone(), QueryKey::resource(Resource::Auth).push("me"), move || {
            let api = api.clone();
            async move { api.me().await }
        })
    }

    // =========================================================================
    // Categories
    // =========================================================================

    pub fn categories(&self, params: CategoryListParams) -> Query<Page<Category>> {
        let api = self.api.categories.clone();
        let key = QueryKey::list(Resource::Categories, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub fn category(&self, id: &str) -> Query<Category> {
        let api = self.api.categories.clone();
        let id = id.to_string();
        let key = QueryKey::detail(Resource::Categories, &id);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let id = id.clone();
            async move { api.get(&id).await }
        })
    }

    pub fn category_tree(&self) -> Query<Vec<CategoryTree>> {
        let api = self.api.categories.clone();
        let key = QueryKey::resource(Resource::Categories).push("tree");
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            async move { api.tree().await }
        })
    }

    pub fn create_category(&self) -> Mutation<CategoryCreate, Category> {
        let api = self.api.categories.clone();
        self.mutation(&[Resource::Categories], move |payload: CategoryCreate| {
            let api = api.clone();
            async move { api.create(&payload).await }
        })
    }

    pub fn update_category(&self) -> Mutation<(String, CategoryUpdate), Category> {
        let api = self.api.categories.clone();
        self.mutation(&[Resource::Categories], move |(id, payload): (String, CategoryUpdate)| {
            let api = api.clone();
            async move { api.update(&id, &payload).await }
        })
    }

    pub fn move_category(&self) -> Mutation<(String, CategoryMove), Category> {
        let api = self.api.categories.clone();
        self.mutation(&[Resource::Categories], move |(id, payload): (String, CategoryMove)| {
            let api = api.clone();
            async move { api.move_to(&id, &payload).await }
        })
    }

    pub fn delete_category(&self) -> Mutation<String, ()> {
        let api = self.api.categories.clone();
        self.mutation(&[Resource::Categories], move |id: String| {
            let api = api.clone();
            async move { api.delete(&id).await }
        })
    }

    // =========================================================================
    // Brands
    // =========================================================================

    pub fn brands(&self, params: BrandListParams) -> Query<Page<Brand>> {
        let api = self.api.brands.clone();
        let key = QueryKey::list(Resource::Brands, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub fn create_brand(&self) -> Mutation<BrandCreate, Brand> {
        let api = self.api.brands.clone();
        self.mutation(&[Resource::Brands], move |payload: BrandCreate| {
            let api = api.clone();
            async move { api.create(&payload).await }
        })
    }

    pub fn update_brand(&self) -> Mutation<(String, BrandUpdate), Brand> {
        let api = self.api.brands.clone();
        self.mutation(&[Resource::Brands], move |(id, payload): (String, BrandUpdate)| {
            let api = api.clone();
            async move { api.update(&id, &payload).await }
        })
    }

    pub fn delete_brand(&self) -> Mutation<String, ()> {
        let api = self.api.brands.clone();
        self.mutation(&[Resource::Brands], move |id: String| {
            let api = api.clone();
            async move { api.delete(&id).await }
        })
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub fn suppliers(&self, params: SupplierListParams) -> Query<Page<Supplier>> {
        let api = self.api.suppliers.clone();
        let key = QueryKey::list(Resource::Suppliers, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub fn supplier_search(&self, term: &str, limit: u64) -> Query<Vec<Supplier>> {
        let api = self.api.suppliers.clone();
        let term = term.to_string();
        let key = QueryKey::search(Resource::Suppliers, &term);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let term = term.clone();
            async move { api.search_by_name(&term, limit).await }
        })
    }

    pub fn supplier_analytics(&self) -> Query<SupplierAnalytics> {
        let api = self.api.suppliers.clone();
        let key = QueryKey::resource(Resource::Suppliers).push("analytics");
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            async move { api.analytics().await }
        })
    }

    pub fn create_supplier(&self) -> Mutation<SupplierCreate, Supplier> {
        let api = self.api.suppliers.clone();
        self.mutation(&[Resource::Suppliers], move |payload: SupplierCreate| {
            let api = api.clone();
            async move { api.create(&payload).await }
        })
    }

    pub fn update_supplier(&self) -> Mutation<(String, SupplierUpdate), Supplier> {
        let api = self.api.suppliers.clone();
        self.mutation(&[Resource::Suppliers], move |(id, payload): (String, SupplierUpdate)| {
            let api = api.clone();
            async move { api.update(&id, &payload).await }
        })
    }

    pub fn set_supplier_active(&self) -> Mutation<(String, bool), Supplier> {
        let api = self.api.suppliers.clone();
        self.mutation(&[Resource::Suppliers], move |(id, active): (String, bool)| {
            let api = api.clone();
            async move { api.set_active(&id, active).await }
        })
    }

    pub fn delete_supplier(&self) -> Mutation<String, ()> {
        let api = self.api.suppliers.clone();
        self.mutation(&[Resource::Suppliers], move |id: String| {
            let api = api.clone();
            async move { api.delete(&id).await }
        })
    }

    // =========================================================================
    // Locations
    // =========================================================================

    pub fn locations(&self, params: LocationListParams) -> Query<Page<Location>> {
        let api = self.api.locations.clone();
        let key = QueryKey::list(Resource::Locations, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub fn create_location(&self) -> Mutation<LocationPayload, Location> {
        let api = self.api.locations.clone();
        self.mutation(&[Resource::Locations], move |payload: LocationPayload| {
            let api = api.clone();
            async move { api.create(&payload).await }
        })
    }

    pub fn update_location(&self) -> Mutation<(String, LocationPayload), Location> {
        let api = self.api.locations.clone();
        self.mutation(&[Resource::Locations], move |(id, payload): (String, LocationPayload)| {
            let api = api.clone();
            async move { api.update(&id, &payload).await }
        })
    }

    pub fn delete_location(&self) -> Mutation<String, ()> {
        let api = self.api.locations.clone();
        self.mutation(&[Resource::Locations], move |id: String| {
            let api = api.clone();
            async move { api.delete(&id).await }
        })
    }

    // =========================================================================
    // SKUs
    // =========================================================================

    pub fn skus(&self, params: SkuListParams) -> Query<Page<Sku>> {
        let api = self.api.skus.clone();
        let key = QueryKey::list(Resource::Skus, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub fn create_sku(&self) -> Mutation<SkuCreate, Sku> {
        let api = self.api.skus.clone();
        self.mutation(&[Resource::Skus], move |payload: SkuCreate| {
            let api = api.clone();
            async move { api.create(&payload).await }
        })
    }

    pub fn update_sku(&self) -> Mutation<(String, SkuUpdate), Sku> {
        let api = self.api.skus.clone();
        self.mutation(&[Resource::Skus], move |(id, payload): (String, SkuUpdate)| {
            let api = api.clone();
            async move { api.update(&id, &payload).await }
        })
    }

    pub fn update_sku_rental(&self) -> Mutation<(String, SkuRentalSettings), Sku> {
        let api = self.api.skus.clone();
        self.mutation(&[Resource::Skus], move |(id, settings): (String, SkuRentalSettings)| {
            let api = api.clone();
            async move { api.update_rental(&id, &settings).await }
        })
    }

    pub fn update_sku_sale(&self) -> Mutation<(String, SkuSaleSettings), Sku> {
        let api = self.api.skus.clone();
        self.mutation(&[Resource::Skus], move |(id, settings): (String, SkuSaleSettings)| {
            let api = api.clone();
            async move { api.update_sale(&id, &settings).await }
        })
    }

    pub fn delete_sku(&self) -> Mutation<String, ()> {
        let api = self.api.skus.clone();
        self.mutation(&[Resource::Skus], move |id: String| {
            let api = api.clone();
            async move { api.delete(&id).await }
        })
    }

    // =========================================================================
    // Sales and Rentals
    // =========================================================================

    pub fn transactions(&self, params: TransactionListParams) -> Query<Page<Transaction>> {
        let api = self.api.sales.clone();
        let key = QueryKey::list(Resource::Transactions, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    /// A sale moves stock and may settle rentals, so both groups refresh.
    pub fn create_sale(&self) -> Mutation<CreateSaleRequest, Transaction> {
        let api = self.api.sales.clone();
        self.mutation(
            &[Resource::Transactions, Resource::RentalsDueToday],
            move |request: CreateSaleRequest| {
                let api = api.clone();
                async move { api.create_sale(&request).await }
            },
        )
    }

    pub fn record_payment(&self) -> Mutation<(String, PaymentRequest), Transaction> {
        let api = self.api.sales.clone();
        self.mutation(
            &[Resource::Transactions, Resource::RentalsDueToday],
            move |(id, payment): (String, PaymentRequest)| {
                let api = api.clone();
                async move { api.record_payment(&id, &payment).await }
            },
        )
    }

    pub fn cancel_transaction(&self) -> Mutation<(String, String), Transaction> {
        let api = self.api.sales.clone();
        self.mutation(
            &[Resource::Transactions, Resource::RentalsDueToday],
            move |(id, reason): (String, String)| {
                let api = api.clone();
                async move { api.cancel(&id, &reason).await }
            },
        )
    }

    pub fn rentals_due(&self, params: RentalsDueParams) -> Query<RentalsDueReport> {
        let api = self.api.rentals_due.clone();
        let key = QueryKey::list(Resource::RentalsDueToday, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }
    // =========================================================================
    // Purchases
    // =========================================================================

    pub fn purchases(&self, params: PurchaseListParams) -> Query<Page<Purchase>> {
        let api = self.api.purchases.clone();
        let key = QueryKey::list(Resource::Purchases, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub fn purchase(&self, id: &str) -> Query<Purchase> {
        let api = self.api.purchases.clone();
        let id = id.to_string();
        let key = QueryKey::detail(Resource::Purchases, &id);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let id = id.clone();
            async move { api.get(&id).await }
        })
    }

    pub fn supplier_purchases(
        &self,
        supplier_id: &str,
        params: PurchaseHistoryParams,
    ) -> Query<Page<Purchase>> {
        let api = self.api.purchases.clone();
        let supplier_id = supplier_id.to_string();
        let key = QueryKey::resource(Resource::Purchases)
            .push("supplier")
            .push(supplier_id.as_str())
            .with_params(&params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let supplier_id = supplier_id.clone();
            let params = params.clone();
            async move { api.by_supplier(&supplier_id, &params).await }
        })
    }

    pub fn purchase_returns(&self, params: PurchaseReturnListParams) -> Query<Page<PurchaseReturn>> {
        let api = self.api.purchases.clone();
        let key = QueryKey::list(Resource::PurchaseReturns, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.returns(&params).await }
        })
    }

    /// Returns already filed against one purchase.
    pub fn returns_for_purchase(&self, purchase_id: &str) -> Query<Vec<PurchaseReturn>> {
        let api = self.api.purchases.clone();
        let purchase_id = purchase_id.to_string();
        let key = QueryKey::resource(Resource::PurchaseReturns)
            .push("purchase")
            .push(purchase_id.as_str());
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let purchase_id = purchase_id.clone();
            async move { api.returns_for(&purchase_id).await }
        })
    }

    /// New stock lands in inventory and moves the supplier's spend.
    pub fn record_purchase(&self) -> Mutation<PurchaseRecord, Purchase> {
        let api = self.api.purchases.clone();
        self.mutation(
            &[Resource::Purchases, Resource::InventoryUnits, Resource::Suppliers],
            move |record: PurchaseRecord| {
                let api = api.clone();
                async move { api.record(&record).await }
            },
        )
    }

    /// A return changes the purchase's status and takes units out of stock.
    pub fn record_purchase_return(&self) -> Mutation<PurchaseReturnRecord, PurchaseReturn> {
        let api = self.api.purchases.clone();
        self.mutation(
            &[Resource::PurchaseReturns, Resource::Purchases, Resource::InventoryUnits],
            move |record: PurchaseReturnRecord| {
                let api = api.clone();
                async move { api.record_return(&record).await }
            },
        )
    }

    // =========================================================================
    // Inventory
    // =========================================================================

    pub fn inventory_units(&self, filters: InventoryFilters) -> Query<Page<InventoryUnit>> {
        let api = self.api.inventory.clone();
        let key = QueryKey::list(Resource::InventoryUnits, &filters);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let filters = filters.clone();
            async move { api.list(&filters).await }
        })
    }

    pub fn inventory_status_counts(&self, params: StatusCountParams) -> Query<StatusCounts> {
        let api = self.api.inventory.clone();
        let key = QueryKey::resource(Resource::InventoryUnits)
            .push("status-count")
            .with_params(&params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.status_counts(&params).await }
        })
    }

    pub fn create_inventory_unit(&self) -> Mutation<InventoryUnitCreate, InventoryUnit> {
        let api = self.api.inventory.clone();
        self.mutation(&[Resource::InventoryUnits], move |payload: InventoryUnitCreate| {
            let api = api.clone();
            async move { api.create(&payload).await }
        })
    }

    pub fn set_inventory_status(
        &self,
    ) -> Mutation<(String, InventoryStatus, Option<String>), InventoryUnit> {
        let api = self.api.inventory.clone();
        self.mutation(
            &[Resource::InventoryUnits],
            move |(id, status, notes): (String, InventoryStatus, Option<String>)| {
                let api = api.clone();
                async move { api.set_status(&id, status, notes).await }
            },
        )
    }

    pub fn transfer_unit(&self) -> Mutation<(String, UnitTransfer), InventoryUnit> {
        let api = self.api.inventory.clone();
        self.mutation(&[Resource::InventoryUnits], move |(id, transfer): (String, UnitTransfer)| {
            let api = api.clone();
            async move { api.transfer(&id, &transfer).await }
        })
    }

    pub fn transfer_units(&self) -> Mutation<BulkTransfer, BulkTransferResult> {
        let api = self.api.inventory.clone();
        self.mutation(&[Resource::InventoryUnits], move |transfer: BulkTransfer| {
            let api = api.clone();
            async move { api.transfer_bulk(&transfer).await }
        })
    }

    // =========================================================================
    // Customers
    // =========================================================================

    pub fn customers(&self, params: CustomerListParams) -> Query<Page<Customer>> {
        let api = self.api.customers.clone();
        let key = QueryKey::list(Resource::Customers, &params);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let params = params.clone();
            async move { api.list(&params).await }
        })
    }

    pub fn customer_search(&self, term: &str, limit: u64) -> Query<Vec<Customer>> {
        let api = self.api.customers.clone();
        let term = term.to_string();
        let key = QueryKey::search(Resource::Customers, &term);
        Query::new(self.cache.clone(), key, move || {
            let api = api.clone();
            let term = term.clone();
            async move { api.search_by_name(&term, limit).await }
        })
    }

    pub fn create_customer(&self) -> Mutation<CustomerCreate, Customer> {
        let api = self.api.customers.clone();
        self.mutation(&[Resource::Customers], move |payload: CustomerCreate| {
            let api = api.clone();
            async move { api.create(&payload).await }
        })
    }

    pub fn update_customer(&self) -> Mutation<(String, CustomerUpdate), Customer> {
        let api = self.api.customers.clone();
        self.mutation(&[Resource::Customers], move |(id, payload): (String, CustomerUpdate)| {
            let api = api.clone();
            async move { api.update(&id, &payload).await }
        })
    }

    pub fn set_customer_blacklist(&self) -> Mutation<(String, BlacklistAction), Customer> {
        let api = self.api.customers.clone();
        self.mutation(&[Resource::Customers], move |(id, action): (String, BlacklistAction)| {
            let api = api.clone();
            async move { api.set_blacklist(&id, action).await }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::AtomicU32;
    use std::time::Duration;

    fn counting_query(cache: &QueryCache, calls: Arc<AtomicU32>) -> Query<u32> {
        Query::new(
            cache.clone(),
            QueryKey::lists(Resource::Categories),
            move || {
                let calls = calls.clone();
                async move { Ok(calls.fetch_add(1, Ordering::SeqCst) + 1) }
            },
        )
    }

    #[tokio::test]
    async fn test_query_uses_fresh_cache() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));
        let query = counting_query(&cache, calls.clone());

        assert_eq!(query.fetch().await.unwrap(), 1);
        assert_eq!(query.fetch().await.unwrap(), 1);
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        let state = query.state();
        assert_eq!(state.data, Some(1));
        assert!(!state.is_loading);
        assert!(state.error.is_none());
    }

    #[tokio::test]
    async fn test_zero_stale_time_refetches() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicU32::new(0));
        let query = counting_query(&cache, calls.clone());
        query.fetch().await.unwrap();
        assert_eq!(query.fetch().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_mutation_invalidates_on_success_only() {
        let cache = QueryCache::new(Duration::from_secs(60));
        let calls = Arc::new(AtomicU32::new(0));
        let query = counting_query(&cache, calls.clone());
        query.fetch().await.unwrap();

        let failing: Mutation<u32, u32> = Mutation::new(cache.clone(), |_: u32| async {
            Err(ClientError::api(400, "Category already exists"))
        })
        .invalidates(QueryKey::resource(Resource::Categories));
        let err = failing.mutate(1).await.unwrap_err();
        assert_eq!(err.user_message(), "Category already exists");
        assert_eq!(query.fetch().await.unwrap(), 1);

        let succeeding: Mutation<u32, u32> = Mutation::new(cache.clone(), |n: u32| async move { Ok(n) })
            .invalidates(QueryKey::resource(Resource::Categories));
        succeeding.mutate(7).await.unwrap();
        assert_eq!(query.fetch().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_callbacks_fire() {
        let cache = QueryCache::default();
        let seen = Arc::new(AtomicU32::new(0));
        let errors = Arc::new(AtomicU32::new(0));

        let s = seen.clone();
        let ok: Mutation<u32, u32> = Mutation::new(cache.clone(), |n: u32| async move { Ok(n * 2) })
            .on_success(move |out| {
                s.store(*out, Ordering::SeqCst);
            });
        ok.mutate(21).await.unwrap();
        assert_eq!(seen.load(Ordering::SeqCst), 42);
        assert!(!ok.is_pending());

        let e = errors.clone();
        let bad: Mutation<(), ()> = Mutation::new(cache, |_: ()| async {
            Err(ClientError::Connection("refused".into()))
        })
        .on_error(move |err| {
            assert!(err.is_transport());
            e.fetch_add(1, Ordering::SeqCst);
        });
        assert!(bad.mutate(()).await.is_err());
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_abandoned_mutation_is_not_pending() {
        let cache = QueryCache::default();
        let slow: Mutation<(), ()> = Mutation::new(cache, |_: ()| async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        });

        let abandoned = tokio::time::timeout(Duration::from_millis(20), slow.mutate(())).await;
        assert!(abandoned.is_err());
        assert!(!slow.is_pending());
    }

    #[test]
    fn test_stock_writes_refresh_dependent_groups() {
        let config = crate::ClientConfig::for_base_url("http://127.0.0.1:9/api/v1");
        let http = crate::HttpClient::new(&config).unwrap();
        let hooks = Hooks::new(Api::new(http), QueryCache::default());

        assert_eq!(
            hooks.record_purchase().invalidates,
            vec![
                QueryKey::resource(Resource::Purchases),
                QueryKey::resource(Resource::InventoryUnits),
                QueryKey::resource(Resource::Suppliers),
            ]
        );
        assert!(hooks
            .record_purchase_return()
            .invalidates
            .contains(&QueryKey::resource(Resource::InventoryUnits)));
        assert_eq!(
            hooks.transfer_unit().invalidates,
            vec![QueryKey::resource(Resource::InventoryUnits)]
        );
        assert_eq!(
            hooks.set_customer_blacklist().invalidates,
            vec![QueryKey::resource(Resource::Customers)]
        );
    }

    #[test]
    fn test_nested_keys_stay_in_their_group() {
        let config = crate::ClientConfig::for_base_url("http://127.0.0.1:9/api/v1");
        let hooks = Hooks::new(
            Api::new(crate::HttpClient::new(&config).unwrap()),
            QueryCache::default(),
        );
        let history = hooks.supplier_purchases("sup-1", PurchaseHistoryParams::default());
        assert!(history.key().starts_with(&QueryKey::resource(Resource::Purchases)));
        let counts = hooks.inventory_status_counts(StatusCountParams::default());
        assert!(counts.key().starts_with(&QueryKey::resource(Resource::InventoryUnits)));
        let returns = hooks.returns_for_purchase("p1");
        assert!(returns.key().starts_with(&QueryKey::resource(Resource::PurchaseReturns)));
    }

    #[tokio::test]
    async fn test_query_error_keeps_previous_data() {
        let cache = QueryCache::default();
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let query: Query<u32> = Query::new(cache, QueryKey::lists(Resource::Brands), move || {
            let n = c.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Ok(5)
                } else {
                    Err(ClientError::Timeout(10))
                }
            }
        });

        query.fetch().await.unwrap();
        assert!(query.refetch().await.is_err());
        let state = query.state();
        assert_eq!(state.data, Some(5));
        assert!(state.error.unwrap().is_transport());
    }
}
