//! Marketplace modules (search, listing writes)

mod listing_search;
mod listing_upsert;

pub use listing_search::ListingSearchModule;
pub use listing_upsert::ListingUpsertModule;
