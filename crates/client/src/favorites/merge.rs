//! Pure list operations used by the reconciler.

use cookie_shop_core::FavoriteItem;

/// Whether `list` already holds `item`, by key or by product.
#[must_use]
pub fn contains(list: &[FavoriteItem], item: &FavoriteItem) -> bool {
    list.iter().any(|existing| existing.represents(item))
}

/// Union of a server list and the current list.
///
/// Server entries come first, followed by current entries the server list
/// does not already represent. Server order wins so a merged list reads the
/// same as the next full server response would.
#[must_use]
pub fn union_merge(server: Vec<FavoriteItem>, current: &[FavoriteItem]) -> Vec<FavoriteItem> {
    let mut merged = server;
    for item in current {
        if !contains(&merged, item) {
            merged.push(item.clone());
        }
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use cookie_shop_core::{FavoriteId, LocalFavoriteItem, Price, Product, ProductId};

    fn product(id: i64) -> Product {
        Product::new(ProductId::new(id), format!("Cookie {id}"), Price::from_units(10), "")
    }

    fn remote(id: i64, product_id: i64) -> FavoriteItem {
        FavoriteItem::remote(FavoriteId::new(id), product(product_id))
    }

    #[test]
    fn test_union_keeps_server_order_then_missing_current() {
        let server = vec![remote(2, 20)];
        let current = vec![remote(1, 10), remote(2, 20)];

        let merged = union_merge(server, &current);
        assert_eq!(merged, vec![remote(2, 20), remote(1, 10)]);
    }

    #[test]
    fn test_union_dedupes_by_product() {
        // Same product favorited locally and on the server.
        let server = vec![remote(7, 3)];
        let current = vec![LocalFavoriteItem::from(product(3)).into()];

        let merged = union_merge(server, &current);
        assert_eq!(merged, vec![remote(7, 3)]);
    }

    #[test]
    fn test_union_with_empty_server() {
        let current = vec![remote(1, 10)];
        assert_eq!(union_merge(Vec::new(), &current), current);
    }
}
