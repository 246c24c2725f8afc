use salvo::async_trait;
use std::sync::Arc;

use crate::error::AppResult;
use agendatico_core::error::CoreError;
use agendatico_service::storage::ImageStore;

pub struct ImageStoreHandler {
    pub images: Arc<ImageStore>,
}

#[async_trait]
impl salvo::Handler for ImageStoreHandler {
    #[tracing::instrument(skip(self, _req, depot, _res, _ctrl))]
    async fn handle(
        &self,
        _req: &mut salvo::Request,
        depot: &mut salvo::Depot,
        _res: &mut salvo::Response,
        _ctrl: &mut salvo::FlowCtrl,
    ) {
        depot.inject(self.images.clone());
    }
}

/// ## Summary
/// Retrieves the image store from the depot.
///
/// ## Errors
/// Returns an error if the image store is not found in the depot.
pub fn get_images_from_depot(depot: &salvo::Depot) -> AppResult<Arc<ImageStore>> {
    depot.obtain::<Arc<ImageStore>>().cloned().map_err(|_err| {
        CoreError::InvariantViolation("Image store not found in depot").into()
    })
}
