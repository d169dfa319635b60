//! Orders placed from the cart.

use serde::{Deserialize, Serialize};

use cookie_shop_core::{OrderId, Price, ProductId, UserId};

use crate::cart::{CartItem, CartStore};

/// One ordered product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub quantity: u32,
    /// Unit price at the time of ordering.
    pub price: Price,
}

impl From<&CartItem> for OrderLine {
    fn from(item: &CartItem) -> Self {
        Self {
            product_id: item.id,
            quantity: item.quantity,
            price: item.price,
        }
    }
}

/// Delivery and payment details entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderDetails {
    pub recipient: Option<String>,
    pub address: Option<String>,
    pub comment: Option<String>,
    pub payment_method: Option<String>,
    pub promo_code: Option<String>,
    pub tip: Option<Price>,
}

/// Body of `POST /orders`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub items: Vec<OrderLine>,
    /// Cart total including VAT. Promo discounts are applied by the backend.
    pub total_price: Price,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promo_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub comment: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tip: Option<Price>,
}

impl OrderRequest {
    /// Build an order from the cart lines and totals.
    #[must_use]
    pub fn from_cart(cart: &CartStore, details: OrderDetails) -> Self {
        Self {
            items: cart.items().iter().map(OrderLine::from).collect(),
            total_price: cart.total_price() + cart.vat_price(),
            promo_code: non_blank(details.promo_code),
            recipient: non_blank(details.recipient),
            address: non_blank(details.address),
            comment: non_blank(details.comment),
            payment_method: non_blank(details.payment_method),
            tip: details.tip,
        }
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// An ordered line as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItemRecord {
    #[serde(default)]
    pub product_id: Option<ProductId>,
    #[serde(default)]
    pub quantity: u32,
    #[serde(default)]
    pub price: Option<Price>,
}

/// An order as stored by the backend.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRecord {
    #[serde(default)]
    pub id: Option<OrderId>,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub total_price: Option<Price>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default)]
    pub items: Vec<OrderItemRecord>,
}
