//! Inventory records: categories, products and sales.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Product category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: u64,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Category create/update body.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryInput {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Product with stock levels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    pub name: String,
    /// Category ID
    pub category: u64,
    #[serde(default)]
    pub category_name: Option<String>,
    /// Unit price (the backend sends decimals as strings)
    #[serde(deserialize_with = "decimal")]
    pub price: f64,
    pub quantity: u32,
    #[serde(default)]
    pub description: Option<String>,
    pub stock_threshold: u32,
    #[serde(default)]
    pub sku: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Display hint only; the backend owns the low-stock listing.
    pub fn is_low_stock(&self) -> bool {
        self.quantity <= self.stock_threshold
    }
}

/// Product create/update body; unset fields are omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductInput {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_threshold: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sku: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Recorded sale of a product.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: u64,
    pub product: u64,
    #[serde(default)]
    pub product_name: Option<String>,
    pub quantity_sold: u32,
    pub sale_date: DateTime<Utc>,
    #[serde(default)]
    pub sold_by: Option<u64>,
    #[serde(default)]
    pub sold_by_name: Option<String>,
    #[serde(deserialize_with = "decimal")]
    pub total_price: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Sale create/update body. Total price is computed server-side when omitted.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SaleInput {
    pub product: u64,
    pub quantity_sold: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_price: Option<f64>,
}

/// Product list filters, sent as query parameters when set.
#[derive(Debug, Clone, Default)]
pub struct ProductFilters {
    pub category: Option<u64>,
    pub is_active: Option<bool>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub min_quantity: Option<u32>,
    pub max_quantity: Option<u32>,
    pub low_stock: Option<bool>,
    pub search: Option<String>,
}

impl ProductFilters {
    /// Query pairs for the filters that are set, in a stable order.
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        let mut push = |key: &str, value: Option<String>| {
            if let Some(v) = value {
                query.push((key.to_string(), v));
            }
        };

        push("category", self.category.map(|v| v.to_string()));
        push("is_active", self.is_active.map(|v| v.to_string()));
        push("min_price", self.min_price.map(|v| v.to_string()));
        push("max_price", self.max_price.map(|v| v.to_string()));
        push("min_quantity", self.min_quantity.map(|v| v.to_string()));
        push("max_quantity", self.max_quantity.map(|v| v.to_string()));
        push("low_stock", self.low_stock.map(|v| v.to_string()));
        push("search", self.search.clone().filter(|s| !s.is_empty()));

        query
    }
}

/// Accept a decimal as either a JSON number or a numeric string.
fn decimal<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumOrString {
        Num(f64),
        Str(String),
    }

    match NumOrString::deserialize(deserializer)? {
        NumOrString::Num(n) => Ok(n),
        NumOrString::Str(s) => s.trim().parse().map_err(serde::de::Error::custom),
    }
}
