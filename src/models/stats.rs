//! Dashboard aggregates computed from product listings.
//!
//! The backend exposes no aggregate endpoint, so the dashboard derives its
//! numbers from the product and low-stock listings it already fetches.

use serde::Serialize;
use std::collections::HashMap;

use crate::models::Product;

/// Maximum number of bars in the low-stock chart.
const LOW_STOCK_CHART_LIMIT: usize = 5;

/// Product names longer than this are truncated in the chart.
const CHART_NAME_MAX_CHARS: usize = 15;

/// Label for products the backend returned without a category name.
const UNCATEGORIZED: &str = "Uncategorized";

/// Statistics shown on the dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    // ─── Counts ──────────────────────────────────────────────────
    pub total_products: usize,
    pub low_stock_products: usize,
    pub active_products: usize,

    // ─── Money ───────────────────────────────────────────────────
    /// Mean unit price (0 when there are no products)
    pub average_price: f64,
    /// Sum of price * quantity
    pub total_inventory_value: f64,

    // ─── Charts ──────────────────────────────────────────────────
    /// Product count per category, in first-seen order (for pie charts)
    pub category_distribution: Vec<CategoryShare>,
    /// Current stock against threshold for the first low-stock products
    pub low_stock_chart: Vec<LowStockBar>,
}

/// One slice of the category pie chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryShare {
    pub name: String,
    pub value: usize,
}

/// One bar of the low-stock chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LowStockBar {
    pub name: String,
    pub current: u32,
    pub threshold: u32,
}

impl DashboardStats {
    /// Compute dashboard statistics from the full product listing and the
    /// backend's low-stock listing.
    pub fn compute(products: &[Product], low_stock: &[Product]) -> Self {
        let total_products = products.len();
        let active_products = products.iter().filter(|p| p.is_active).count();

        let total_price: f64 = products.iter().map(|p| p.price).sum();
        let total_inventory_value: f64 = products
            .iter()
            .map(|p| p.price * f64::from(p.quantity))
            .sum();

        let average_price = if total_products > 0 {
            total_price / total_products as f64
        } else {
            0.0
        };

        // Count per category, remembering first-seen order
        let mut order: Vec<String> = Vec::new();
        let mut counts: HashMap<String, usize> = HashMap::new();
        for product in products {
            let name = product
                .category_name
                .as_deref()
                .filter(|n| !n.is_empty())
                .unwrap_or(UNCATEGORIZED)
                .to_string();
            let count = counts.entry(name.clone()).or_insert(0);
            if *count == 0 {
                order.push(name);
            }
            *count += 1;
        }

        let category_distribution = order
            .into_iter()
            .map(|name| {
                let value = counts.get(&name).copied().unwrap_or(0);
                CategoryShare { name, value }
            })
            .collect();

        let low_stock_chart = low_stock
            .iter()
            .take(LOW_STOCK_CHART_LIMIT)
            .map(|p| LowStockBar {
                name: chart_label(&p.name),
                current: p.quantity,
                threshold: p.stock_threshold,
            })
            .collect();

        Self {
            total_products,
            low_stock_products: low_stock.len(),
            active_products,
            average_price,
            total_inventory_value,
            category_distribution,
            low_stock_chart,
        }
    }
}

/// Truncate long product names for chart axes.
fn chart_label(name: &str) -> String {
    if name.chars().count() > CHART_NAME_MAX_CHARS {
        let head: String = name.chars().take(CHART_NAME_MAX_CHARS).collect();
        format!("{}...", head)
    } else {
        name.to_string()
    }
}
