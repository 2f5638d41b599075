pub mod catalog;
pub mod clock;
pub mod error;
pub mod item;
pub mod record;
pub mod store;

pub use catalog::Catalog;
pub use clock::{Clock, SystemClock};
pub use error::{CatalogError, CatalogResult, StoreError, StoreResult};
pub use item::{filter_by_name, Item, ItemCollection, Tag};
pub use record::{generate_id, tie_breaker, Query, Record, ID_FIELD, SEARCH_HISTORY, SELECTED_ITEMS};
pub use store::RecordStore;
