//! Local cart commands.

use cookie_shop_client::cart::VAT_PERCENT;
use cookie_shop_client::{ClientError, ShopContext};
use cookie_shop_core::ProductId;

#[allow(clippy::print_stdout)]
pub async fn list(context: &ShopContext) {
    let cart = context.cart().await;

    if cart.items().is_empty() {
        println!("Cart is empty");
        return;
    }

    for item in cart.items() {
        println!(
            "{:>5}  {:<32} x{:<3} {:>10}",
            item.id,
            item.title,
            item.quantity,
            item.line_total().display()
        );
    }
    println!("Total: {}", cart.total_price().display());
    println!("VAT {VAT_PERCENT}%: {}", cart.vat_price().display());
}

#[allow(clippy::print_stdout)]
pub async fn add(context: &ShopContext, product_id: i64) -> Result<(), ClientError> {
    let product = context.api().get_product(ProductId::new(product_id)).await?;
    let title = product.title.clone();
    context.cart().await.add(product)?;
    println!("Added {title} to cart");
    Ok(())
}

pub async fn remove(context: &ShopContext, product_id: i64) -> Result<(), ClientError> {
    context.cart().await.remove(ProductId::new(product_id))?;
    list(context).await;
    Ok(())
}

pub async fn increase(context: &ShopContext, product_id: i64) -> Result<(), ClientError> {
    context.cart().await.increase(ProductId::new(product_id))?;
    list(context).await;
    Ok(())
}

pub async fn decrease(context: &ShopContext, product_id: i64) -> Result<(), ClientError> {
    context.cart().await.decrease(ProductId::new(product_id))?;
    list(context).await;
    Ok(())
}
