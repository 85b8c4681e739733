use axum::{extract::State, Extension, Json};

use pricecmp_core::SitesFile;

use super::{ApiResponse, AppState, ResponseMeta};
use crate::middleware::RequestId;

pub(super) async fn list_sites(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<SitesFile>> {
    Json(ApiResponse {
        data: SitesFile::clone(&state.sites),
        meta: ResponseMeta::new(req_id.0),
    })
}
