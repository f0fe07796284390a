pub mod product;
pub mod upload;
pub mod view;
pub mod wishlist;

pub use product::{Product, ProductId};
pub use upload::{is_image_content_type, ImageUpload, UploadState};
pub use view::{
    format_price, ProductCard, SearchResults, SearchView, MAX_TEXT_RESULTS, NEW_ARRIVALS_LIMIT,
};
pub use wishlist::{
    normalize_size, WishlistChange, WishlistEntry, WishlistEvent, DEFAULT_SIZE, WISHLIST_UPDATED,
};
