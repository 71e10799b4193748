use std::sync::Arc;

use crate::auth::TokenVerifier;
use crate::database::CatalogProvider;

/// Resources shared by every request
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<dyn CatalogProvider>,
    pub tokens: Arc<TokenVerifier>,
}

impl AppState {
    pub fn new(catalog: Arc<dyn CatalogProvider>, tokens: TokenVerifier) -> Self {
        Self {
            catalog,
            tokens: Arc::new(tokens),
        }
    }
}
