//! Favorites commands.
//!
//! Favorites are listed with a single integer id: the server id for signed-in
//! favorites and the negated product id for guest favorites. `remove` accepts
//! the same ids.

use cookie_shop_client::favorites::{ProductCard, ToggleOutcome};
use cookie_shop_client::{ClientError, ShopContext};
use cookie_shop_core::{FavoriteKey, ProductId};

#[allow(clippy::print_stdout)]
pub async fn list(context: &ShopContext, force: bool) {
    let mut reconciler = context.favorites().await;
    let favorites = reconciler.fetch(force).await;

    if favorites.is_empty() {
        println!("No favorites");
        return;
    }

    for item in favorites {
        println!(
            "{:>6}  {:<32} {:>10}",
            item.key.to_legacy_id(),
            item.product.title,
            item.product.price.display()
        );
    }
}

#[allow(clippy::print_stdout)]
pub async fn toggle(context: &ShopContext, product_id: i64) -> Result<(), ClientError> {
    let product = context.api().get_product(ProductId::new(product_id)).await?;

    let mut reconciler = context.favorites().await;
    reconciler.fetch(false).await;
    let mut card = ProductCard::from_favorites(product, reconciler.favorites());

    match reconciler.toggle(&mut card).await? {
        ToggleOutcome::Added(id) => println!("Added {} to favorites (id {id})", card.product.title),
        ToggleOutcome::Removed => println!("Removed {} from favorites", card.product.title),
        ToggleOutcome::Unchanged => println!("{} is already a favorite", card.product.title),
        ToggleOutcome::SignInRequired => {
            println!("Sign in to save favorites to your account, or use `favorites add`");
        }
    }
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn add(context: &ShopContext, product_id: i64) -> Result<(), ClientError> {
    if context.session()?.is_authenticated() {
        println!("Signed in: use `favorites toggle` to save to your account");
        return Ok(());
    }

    let product = context.api().get_product(ProductId::new(product_id)).await?;
    let title = product.title.clone();
    context.favorites().await.add_to_local(product)?;

    println!("Saved {title} to guest favorites");
    Ok(())
}

/// Decode an id typed at the prompt. `0` is neither a favorite nor a product.
fn parse_key(id: i64) -> Result<FavoriteKey, ClientError> {
    FavoriteKey::parse_legacy_id(id)
        .ok_or_else(|| ClientError::InvalidArgument(format!("{id} is not a favorite id")))
}

#[allow(clippy::print_stdout)]
pub async fn remove(context: &ShopContext, id: i64) -> Result<(), ClientError> {
    let key = parse_key(id)?;

    let mut reconciler = context.favorites().await;
    reconciler.fetch(false).await;
    reconciler.remove(key).await?;

    println!("Removed favorite {id}");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn clear(context: &ShopContext) -> Result<(), ClientError> {
    context.favorites().await.clear_all().await?;
    println!("Cleared favorites");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn sync(context: &ShopContext) -> Result<(), ClientError> {
    let report = context.favorites().await.sync_local_to_server().await?;
    println!(
        "Synced {} of {} guest favorites ({} failed)",
        report.synced, report.attempted, report.failed
    );
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use cookie_shop_core::FavoriteId;

    use super::*;

    #[test]
    fn test_parse_key_rejects_zero() {
        assert!(matches!(parse_key(0), Err(ClientError::InvalidArgument(_))));
        assert_eq!(parse_key(-4).unwrap(), FavoriteKey::Local(ProductId::new(4)));
        assert_eq!(parse_key(4).unwrap(), FavoriteKey::Remote(FavoriteId::new(4)));
    }
}
