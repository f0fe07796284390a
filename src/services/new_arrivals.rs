use crate::{
    models::{ProductCard, NEW_ARRIVALS_LIMIT},
    services::{catalog::CatalogStore, wishlist::WishlistStore},
};

/// Cards for the "New Arrivals" rail: the first products of the catalog
pub fn new_arrivals(
    catalog: &CatalogStore,
    wishlist: &WishlistStore,
    placeholder_image: &str,
) -> Vec<ProductCard> {
    catalog
        .latest(NEW_ARRIVALS_LIMIT)
        .iter()
        .map(|product| {
            ProductCard::new(
                product,
                catalog.currency(),
                wishlist.contains_product(product),
            )
            .with_placeholder(placeholder_image)
        })
        .collect()
}
