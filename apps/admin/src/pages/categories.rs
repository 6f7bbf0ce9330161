//! `/products/categories` and `/products/categories/new`
//!
//! ## Create Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  load() ──► parent options (every active category, by path)             │
//! │                                                                         │
//! │  select_parent / edit name ──► preview(): path, level, leaf             │
//! │                                                                         │
//! │  submit()                                                               │
//! │    ├── schema fails ──► FormState::Invalid, no request                  │
//! │    ├── POST ok ──► invalidate ["categories"] ──► toast ──► list page    │
//! │    └── POST err ──► FormState::Failed, draft kept, banner, stay         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use rental_core::hierarchy::{self, CategoryIndex, CategoryPreview};
use rental_core::{
    Category, CategoryForm, CategoryListParams, DialogState, FormState, ListState, PageRequest,
};
use tracing::{info, warn};

use super::listing::Listing;
use super::{failure_message, form_errors, PageContext};
use crate::error::{AppError, AppResult};
use crate::navigation::Route;

pub const NO_CATEGORIES: &str = "No categories found";
pub const CREATE_FAILED: &str = "Failed to create category. Please try again.";
pub const DELETE_FAILED: &str = "Failed to delete category. Please try again.";

/// How many categories the parent picker loads.
pub const PARENT_OPTION_LIMIT: u64 = 1000;

const FIELD_RENAMES: &[(&str, &str)] = &[
    ("category_name", "name"),
    ("parent_category_id", "parent_id"),
];

// =============================================================================
// List Page
// =============================================================================

/// One row of the category table.
#[derive(Debug, Clone, PartialEq)]
pub struct CategoryRow {
    pub id: String,
    pub name: String,
    pub path: String,
    pub level: u32,
    pub is_leaf: bool,
    pub is_active: bool,
}

impl From<&Category> for CategoryRow {
    fn from(c: &Category) -> Self {
        CategoryRow {
            id: c.id.clone(),
            name: c.category_name.clone(),
            path: c.category_path.clone(),
            level: c.category_level,
            is_leaf: c.is_leaf,
            is_active: c.is_active,
        }
    }
}

#[derive(Debug)]
pub struct CategoryListPage {
    ctx: PageContext,
    listing: Listing<Category, CategoryListParams>,
    dialog: DialogState<Category>,
}

impl CategoryListPage {
    pub fn new(ctx: PageContext) -> Self {
        CategoryListPage {
            ctx,
            listing: Listing::new(CategoryListParams::default()),
            dialog: DialogState::Closed,
        }
    }

    pub fn listing(&self) -> &Listing<Category, CategoryListParams> {
        &self.listing
    }

    pub fn state(&self) -> &ListState<Category> {
        self.listing.state()
    }

    pub fn dialog(&self) -> &DialogState<Category> {
        &self.dialog
    }

    pub fn rows(&self) -> Vec<CategoryRow> {
        self.listing.items().iter().map(CategoryRow::from).collect()
    }

    /// Text for the explicit empty state.
    pub fn empty_message(&self) -> Option<&'static str> {
        self.state().is_empty().then_some(NO_CATEGORIES)
    }

    pub async fn load(&mut self) -> AppResult<()> {
        let query = self.ctx.hooks.categories(self.listing.params().clone());
        self.listing.load(query).await?;
        Ok(())
    }

    pub async fn search(&mut self, term: &str) -> AppResult<()> {
        let term = term.trim();
        self.listing.filter(|p| {
            p.search = (!term.is_empty()).then(|| term.to_string());
        });
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

    pub fn open_new(&self) {
        self.ctx.navigate(Route::CategoryNew);
    }

    pub fn confirm_delete(&mut self, id: &str) -> AppResult<()> {
        let category = self
            .listing
            .items()
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| AppError::not_found("Category", id))?;
        self.dialog.open(DialogState::ConfirmDelete(category))?;
        Ok(())
    }

    pub fn cancel_dialog(&mut self) {
        self.dialog.close();
    }

    /// Deletes the row the confirm dialog is open for and reloads.
    pub async fn delete_confirmed(&mut self) -> AppResult<()> {
        let DialogState::ConfirmDelete(category) = &self.dialog else {
            return Err(AppError::invalid_state("No delete is awaiting confirmation"));
        };
        let category = category.clone();

        match self.ctx.hooks.delete_category().mutate(category.id.clone()).await {
            Ok(()) => {
                self.dialog.close();
                self.ctx
                    .toast_success("Category Deleted", format!("{} was deleted", category.category_path))
                    .await;
                self.load().await
            }
            Err(e) => {
                let message = failure_message(&e, DELETE_FAILED);
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }
}

// =============================================================================
// Create Page
// =============================================================================

/// A choice in the parent picker.
#[derive(Debug, Clone, PartialEq)]
pub struct ParentOption {
    pub id: String,
    /// `Electronics > Cameras`
    pub label: String,
    pub level: u32,
    pub is_leaf: bool,
}

#[derive(Debug)]
pub struct CategoryNewPage {
    ctx: PageContext,
    form: FormState<CategoryForm>,
    categories: Vec<Category>,
}

impl CategoryNewPage {
    pub fn new(ctx: PageContext) -> Self {
        CategoryNewPage {
            ctx,
            form: FormState::new(CategoryForm::default()),
            categories: Vec::new(),
        }
    }

    pub fn form(&self) -> &FormState<CategoryForm> {
        &self.form
    }

    /// Loads the categories the parent picker offers. A failure leaves the
    /// picker with only "root".
    pub async fn load(&mut self) -> AppResult<()> {
        let params = CategoryListParams {
            page: PageRequest::new(0, PARENT_OPTION_LIMIT),
            is_active: Some(true),
            ..Default::default()
        };
        match self.ctx.hooks.categories(params).fetch().await {
            Ok(page) => {
                self.categories = page.items;
                Ok(())
            }
            Err(e) => {
                warn!(error = %e, "Could not load parent categories");
                Err(AppError::from(e))
            }
        }
    }

    pub fn parent_options(&self) -> Vec<ParentOption> {
        let index = CategoryIndex::new(&self.categories);
        hierarchy::parent_options(&self.categories)
            .into_iter()
            .map(|c| ParentOption {
                id: c.id.clone(),
                label: index
                    .display_path(&c.id)
                    .unwrap_or_else(|_| c.category_path.clone()),
                level: c.category_level,
                is_leaf: c.is_leaf,
            })
            .collect()
    }

    pub fn edit(&mut self) -> AppResult<&mut CategoryForm> {
        Ok(self.form.edit()?)
    }

    pub fn set_name(&mut self, name: &str) -> AppResult<()> {
        self.edit()?.name = name.to_string();
        Ok(())
    }

    /// `None` makes the new category a root.
    pub fn select_parent(&mut self, parent_id: Option<&str>) -> AppResult<()> {
        if let Some(id) = parent_id {
            if !self.categories.iter().any(|c| c.id == id && c.is_active) {
                return Err(AppError::validation(format!("Unknown parent category: {}", id)));
            }
        }
        self.edit()?.parent_id = parent_id.map(str::to_string);
        Ok(())
    }

    fn selected_parent(&self) -> Option<&Category> {
        let id = self.form.draft().parent_id.as_deref()?;
        self.categories.iter().find(|c| c.id == id)
    }

    /// Path, level and leaf flag the category will get.
    pub fn preview(&self) -> CategoryPreview {
        hierarchy::preview(self.selected_parent(), &self.form.draft().name)
    }

    /// The parent picker's view after a create; the created category is in
    /// it and its parent is no longer a leaf.
    pub fn known_categories(&self) -> &[Category] {
        &self.categories
    }

    pub async fn submit(&mut self) -> AppResult<Category> {
        let payload = self.form.submit()?;

        match self.ctx.hooks.create_category().mutate(payload).await {
            Ok(created) => {
                self.form.succeed()?;
                hierarchy::apply_created(&mut self.categories, created.clone());
                info!(
                    category_id = %created.id,
                    path = %created.category_path,
                    "Category created from form"
                );
                self.ctx
                    .toast_success(
                        "Category Created",
                        format!("Created {}", created.category_path),
                    )
                    .await;
                self.ctx.navigate(Route::Categories);
                Ok(created)
            }
            Err(e) => {
                let message = failure_message(&e, CREATE_FAILED);
                self.form.fail(message.clone(), form_errors(&e, FIELD_RENAMES))?;
                self.ctx.toast_error("Error", message).await;
                Err(AppError::from(e))
            }
        }
    }

    pub fn cancel(&self) {
        self.ctx.navigate(Route::Categories);
    }
}
