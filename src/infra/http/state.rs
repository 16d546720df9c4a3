use std::sync::Arc;

use crate::application::query::ProductQueryService;

#[derive(Clone)]
pub struct CatalogState {
    pub service: Arc<ProductQueryService>,
    pub default_page_size: u32,
}

impl CatalogState {
    pub fn new(service: Arc<ProductQueryService>, default_page_size: u32) -> Self {
        Self {
            service,
            default_page_size,
        }
    }
}
