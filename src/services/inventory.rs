// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Inventory endpoints: categories, products, sales and the dashboard.

use crate::error::Result;
use crate::models::{
    Category, CategoryInput, DashboardStats, Envelope, Product, ProductFilters, ProductInput,
    Sale, SaleInput,
};
use crate::services::{ApiClient, ApiRequest};
use std::sync::Arc;

const CATEGORIES: &str = "/inventory/categories/";
const PRODUCTS: &str = "/inventory/products/";
const LOW_STOCK: &str = "/inventory/products/low-stock/";
const SALES: &str = "/inventory/sales/";

fn detail(collection: &str, id: u64) -> String {
    format!("{}{}/", collection, id)
}

/// Typed access to the inventory API.
#[derive(Clone)]
pub struct InventoryService {
    api: Arc<ApiClient>,
}

impl InventoryService {
    pub fn new(api: Arc<ApiClient>) -> Self {
        Self { api }
    }

    // ─── Categories ──────────────────────────────────────────────────────────

    pub async fn categories(&self) -> Result<Envelope<Vec<Category>>> {
        self.api.send(&ApiRequest::get(CATEGORIES)).await
    }

    pub async fn category(&self, id: u64) -> Result<Envelope<Category>> {
        self.api.send(&ApiRequest::get(detail(CATEGORIES, id))).await
    }

    pub async fn create_category(&self, input: &CategoryInput) -> Result<Envelope<Category>> {
        self.api.send(&ApiRequest::post(CATEGORIES, input)?).await
    }

    pub async fn update_category(
        &self,
        id: u64,
        input: &CategoryInput,
    ) -> Result<Envelope<Category>> {
        self.api
            .send(&ApiRequest::put(detail(CATEGORIES, id), input)?)
            .await
    }

    pub async fn delete_category(&self, id: u64) -> Result<Envelope<()>> {
        self.api
            .send_empty(&ApiRequest::delete(detail(CATEGORIES, id)))
            .await
    }

    // ─── Products ────────────────────────────────────────────────────────────

    pub async fn products(&self, filters: &ProductFilters) -> Result<Envelope<Vec<Product>>> {
        let request = ApiRequest::get(PRODUCTS).with_query(filters.to_query());
        self.api.send(&request).await
    }

    pub async fn product(&self, id: u64) -> Result<Envelope<Product>> {
        self.api.send(&ApiRequest::get(detail(PRODUCTS, id))).await
    }

    pub async fn create_product(&self, input: &ProductInput) -> Result<Envelope<Product>> {
        self.api.send(&ApiRequest::post(PRODUCTS, input)?).await
    }

    pub async fn update_product(&self, id: u64, input: &ProductInput) -> Result<Envelope<Product>> {
        self.api
            .send(&ApiRequest::put(detail(PRODUCTS, id), input)?)
            .await
    }

    pub async fn delete_product(&self, id: u64) -> Result<Envelope<()>> {
        self.api
            .send_empty(&ApiRequest::delete(detail(PRODUCTS, id)))
            .await
    }

    /// Products at or below their stock threshold.
    pub async fn low_stock(&self) -> Result<Envelope<Vec<Product>>> {
        self.api.send(&ApiRequest::get(LOW_STOCK)).await
    }

    // ─── Sales ───────────────────────────────────────────────────────────────

    pub async fn sales(&self) -> Result<Envelope<Vec<Sale>>> {
        self.api.send(&ApiRequest::get(SALES)).await
    }

    pub async fn sale(&self, id: u64) -> Result<Envelope<Sale>> {
        self.api.send(&ApiRequest::get(detail(SALES, id))).await
    }

    pub async fn create_sale(&self, input: &SaleInput) -> Result<Envelope<Sale>> {
        self.api.send(&ApiRequest::post(SALES, input)?).await
    }

    pub async fn update_sale(&self, id: u64, input: &SaleInput) -> Result<Envelope<Sale>> {
        self.api
            .send(&ApiRequest::put(detail(SALES, id), input)?)
            .await
    }

    pub async fn delete_sale(&self, id: u64) -> Result<Envelope<()>> {
        self.api
            .send_empty(&ApiRequest::delete(detail(SALES, id)))
            .await
    }

    // ─── Dashboard ───────────────────────────────────────────────────────────

    /// Fetch the listings the dashboard needs and aggregate them.
    ///
    /// The three calls run concurrently; any failure fails the whole load.
    pub async fn dashboard(&self) -> Result<DashboardStats> {
        let all = ProductFilters::default();
        let (low_stock, categories, products) =
            tokio::try_join!(self.low_stock(), self.categories(), self.products(&all))?;

        let stats = DashboardStats::compute(&products.data, &low_stock.data);
        tracing::debug!(
            categories = categories.data.len(),
            products = stats.total_products,
            low_stock = stats.low_stock_products,
            "Dashboard loaded"
        );
        Ok(stats)
    }
}
