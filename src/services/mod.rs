pub mod catalog;
pub mod coordinator;
pub mod new_arrivals;
pub mod query;
pub mod recommender;
pub mod wishlist;

pub use catalog::CatalogStore;
pub use coordinator::{BeginUpload, SearchCoordinator, SubmitOutcome, UploadTicket};
pub use new_arrivals::new_arrivals;
pub use query::{filter, QueryState};
pub use recommender::{ImageRecommender, SimilarityApiClient};
pub use wishlist::{WishlistStore, WishlistSubscription};
