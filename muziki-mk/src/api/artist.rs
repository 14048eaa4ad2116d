//! Artist dashboard endpoint

use axum::extract::State;
use axum::{Extension, Json};
use muziki_common::auth::{AuthClaims, Role};
use muziki_common::{time, Error};

use crate::analytics::sales::{self, SalesAnalytics};
use crate::api::ApiError;
use crate::AppState;

/// GET /api/artist/analytics - Sales analytics for the authenticated artist
///
/// Artist-only: a listener token gets 403.
pub async fn artist_analytics(
    State(state): State<AppState>,
    Extension(claims): Extension<AuthClaims>,
) -> Result<Json<SalesAnalytics>, ApiError> {
    if claims.role != Role::Artist {
        return Err(Error::Forbidden("sales analytics are artist-only".to_string()).into());
    }

    let analytics = sales::sales_analytics(&state.db, claims.subject, time::now()).await?;
    Ok(Json(analytics))
}
