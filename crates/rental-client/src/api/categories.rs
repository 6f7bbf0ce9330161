//! `/categories` endpoints.

use rental_core::{
    Category, CategoryCreate, CategoryListParams, CategoryMove, CategoryStatistics, CategoryTree,
    CategoryUpdate, Page,
};
use tracing::info;

use super::{segment, NO_QUERY};
use crate::error::ClientResult;
use crate::http::HttpClient;

#[derive(Debug, Clone)]
pub struct CategoriesApi {
    http: HttpClient,
}

impl CategoriesApi {
    pub fn new(http: HttpClient) -> Self {
        CategoriesApi { http }
    }

    /// `POST /categories/`.
    pub async fn create(&self, payload: &CategoryCreate) -> ClientResult<Category> {
        let created: Category = self.http.post("/categories/", payload).await?;
        info!(
            category_id = %created.id,
            path = %created.category_path,
            level = created.category_level,
            "Category created"
        );
        Ok(created)
    }

    /// `GET /categories/`.
    pub async fn list(&self, params: &CategoryListParams) -> ClientResult<Page<Category>> {
        self.http.get_page("/categories/", params).await
    }

    /// `GET /categories/{id}`.
    pub async fn get(&self, id: &str) -> ClientResult<Category> {
        self.http.get(&format!("/categories/{}", segment(id))).await
    }

    /// `GET /categories/path/{path}`.
    pub async fn by_path(&self, path: &str) -> ClientResult<Category> {
        self.http
            .get(&format!("/categories/path/{}", segment(path)))
            .await
    }

    /// `GET /categories/tree/`.
    pub async fn tree(&self) -> ClientResult<Vec<CategoryTree>> {
        let page = self.http.get_page("/categories/tree/", NO_QUERY).await?;
        Ok(page.items)
    }

    /// `GET /categories/{id}/breadcrumb`.
    pub async fn breadcrumb(&self, id: &str) -> ClientResult<Vec<Category>> {
        let page = self
            .http
            .get_page(&format!("/categories/{}/breadcrumb", segment(id)), NO_QUERY)
            .await?;
        Ok(page.items)
    }

    /// `GET /categories/{id}/children`.
    pub async fn children(&self, id: &str) -> ClientResult<Vec<Category>> {
        let page = self
            .http
            .get_page(&format!("/categories/{}/children", segment(id)), NO_QUERY)
            .await?;
        Ok(page.items)
    }

    /// `GET /categories/leaf/all`.
    pub async fn leaves(&self) -> ClientResult<Vec<Category>> {
        let page = self.http.get_page("/categories/leaf/all", NO_QUERY).await?;
        Ok(page.items)
    }

    /// `GET /categories/statistics/summary`.
    pub async fn statistics(&self) -> ClientResult<CategoryStatistics> {
        self.http.get("/categories/statistics/summary").await
    }

    /// `PUT /categories/{id}`.
    pub async fn update(&self, id: &str, payload: &CategoryUpdate) -> ClientResult<Category> {
        let updated: Category = self
            .http
            .put(&format!("/categories/{}", segment(id)), payload)
            .await?;
        info!(category_id = %updated.id, "Category updated");
        Ok(updated)
    }

    /// `POST /categories/{id}/move`.
    pub async fn move_to(&self, id: &str, payload: &CategoryMove) -> ClientResult<Category> {
        let moved: Category = self
            .http
            .post(&format!("/categories/{}/move", segment(id)), payload)
            .await?;
        info!(category_id = %moved.id, path = %moved.category_path, "Category moved");
        Ok(moved)
    }

    /// `DELETE /categories/{id}` (soft delete on the server).
    pub async fn delete(&self, id: &str) -> ClientResult<()> {
        self.http
            .delete(&format!("/categories/{}", segment(id)))
            .await?;
        info!(category_id = %id, "Category deleted");
        Ok(())
    }
}
