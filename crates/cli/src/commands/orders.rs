//! Checkout and order history.

use cookie_shop_client::orders::{OrderDetails, OrderRecord};
use cookie_shop_client::{ClientError, ShopContext};

/// Order the whole cart.
#[allow(clippy::print_stdout)]
pub async fn checkout(context: &ShopContext, details: OrderDetails) -> Result<(), ClientError> {
    let order = context.checkout(details).await?;

    match order.id {
        Some(id) => println!("Order {id} placed"),
        None => println!("Order placed"),
    }
    print_order(&order);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn list(context: &ShopContext) -> Result<(), ClientError> {
    let orders = context.api().my_orders().await?;

    if orders.is_empty() {
        println!("No orders");
        return Ok(());
    }

    for order in &orders {
        let id = order.id.map_or_else(|| "-".to_string(), |id| id.to_string());
        println!("Order {id}  {}", order.created_at.as_deref().unwrap_or(""));
        print_order(order);
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
fn print_order(order: &OrderRecord) {
    for item in &order.items {
        let product = item
            .product_id
            .map_or_else(|| "?".to_string(), |id| id.to_string());
        let price = item.price.map(|p| p.display()).unwrap_or_default();
        println!("  product {product:>5} x{:<3} {price:>10}", item.quantity);
    }
    if let Some(total) = order.total_price {
        println!("  Total:  {}", total.display());
    }
    if let Some(status) = &order.status {
        println!("  Status: {status}");
    }
}
