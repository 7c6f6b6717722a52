//! Dashboard home route.

use axum::{Json, Router, extract::State, routing::get};
use tracing::instrument;

use crate::db::DashboardRepository;
use crate::error::AppError;
use crate::middleware::RequireDashboard;
use crate::models::DashboardSummary;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/api/dashboard/summary", get(summary))
}

/// Headline counts for the caller: the whole marketplace for admins, the
/// vendor's own shops otherwise.
#[instrument(skip_all, fields(user_id = %user.id))]
async fn summary(
    State(state): State<AppState>,
    RequireDashboard(user): RequireDashboard,
) -> Result<Json<DashboardSummary>, AppError> {
    let summary = DashboardRepository::new(state.pool())
        .summary(user.vendor_scope())
        .await?;
    Ok(Json(summary))
}
