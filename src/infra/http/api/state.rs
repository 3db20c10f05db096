use std::sync::Arc;

use crate::application::cart::CartService;
use crate::application::catalog::CatalogService;
use crate::application::chrome::ChromeService;
use crate::application::content::ContentService;

#[derive(Clone)]
pub struct ApiState {
    pub content: Arc<ContentService>,
    pub catalog: Arc<CatalogService>,
    pub chrome: Arc<ChromeService>,
    pub cart: Arc<CartService>,
}
