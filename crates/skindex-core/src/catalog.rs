use crate::error::CatalogResult;
use crate::item::Item;

pub trait Catalog {
    /// Items whose name contains `keyword`. An unknown keyword yields an
    /// empty list, not an error.
    fn search_by_keyword(&self, keyword: &str) -> CatalogResult<Vec<Item>>;

    /// One item by catalog id, or `Item::default()` when the catalog has none.
    fn get_details_by_id(&self, id: &str) -> CatalogResult<Item>;
}
