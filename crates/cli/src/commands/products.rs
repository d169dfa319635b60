//! Catalog commands.

use cookie_shop_client::{ClientError, ShopContext};
use cookie_shop_core::ProductId;

#[allow(clippy::print_stdout)]
pub async fn list(context: &ShopContext, search: Option<&str>) -> Result<(), ClientError> {
    let products = context.api().list_products(search).await?;
    let favorites = context.favorites().await.fetch(false).await.to_vec();

    if products.is_empty() {
        println!("No products found");
        return Ok(());
    }

    for product in products {
        let marker = if favorites.iter().any(|f| f.product_id() == product.id) {
            '*'
        } else {
            ' '
        };
        println!(
            "{marker} {:>5}  {:<32} {:>10}",
            product.id,
            product.title,
            product.price.display()
        );
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn show(context: &ShopContext, id: i64) -> Result<(), ClientError> {
    let product = context.api().get_product(ProductId::new(id)).await?;

    println!("{} (#{})", product.title, product.id);
    println!("Price: {}", product.price.display());
    let details = [
        ("Description", &product.description),
        ("Ingredients", &product.ingredients),
        ("Calories", &product.calories),
        ("Story", &product.story),
    ];
    for (label, value) in details {
        if let Some(value) = value {
            println!("{label}: {value}");
        }
    }
    Ok(())
}
