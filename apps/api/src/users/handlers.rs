//! Profile routes for the authenticated caller.

use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::auth::AuthedUser;
use crate::errors::AppError;
use crate::models::analysis::AnalysisRecord;
use crate::models::user::User;
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub user: User,
    pub resumes: Vec<AnalysisRecord>,
    pub last_two_resumes: Vec<AnalysisRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct UpdateProfileResponse {
    pub user: User,
}

/// GET /user/profile
///
/// A caller with a valid token but no analyses yet is created on the spot.
pub async fn handle_profile(
    State(state): State<AppState>,
    authed: AuthedUser,
) -> Result<Json<ProfileResponse>, AppError> {
    let user = state
        .users
        .ensure_user(authed.id, &authed.email)
        .await
        .map_err(AppError::Persistence)?;
    let resumes = state
        .analyses
        .find_by_owner(authed.id)
        .await
        .map_err(AppError::Persistence)?;

    let last_two_resumes = resumes[resumes.len().saturating_sub(2)..].to_vec();

    Ok(Json(ProfileResponse {
        user,
        resumes,
        last_two_resumes,
    }))
}

/// PUT /user/update-profile
pub async fn handle_update_profile(
    State(state): State<AppState>,
    authed: AuthedUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<UpdateProfileResponse>, AppError> {
    let first_name = non_blank(req.first_name.as_deref());
    let last_name = non_blank(req.last_name.as_deref());

    let user = state
        .users
        .update_name(authed.id, first_name, last_name)
        .await
        .map_err(AppError::Persistence)?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;

    info!(user_id = %user.id, "Profile updated");
    Ok(Json(UpdateProfileResponse { user }))
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_non_blank() {
        assert_eq!(non_blank(Some("  Asha ")), Some("Asha"));
        assert_eq!(non_blank(Some("   ")), None);
        assert_eq!(non_blank(None), None);
    }

    #[test]
    fn test_update_request_reads_camel_case() {
        let req: UpdateProfileRequest =
            serde_json::from_str(r#"{"firstName": "Asha", "lastName": null}"#).unwrap();
        assert_eq!(req.first_name.as_deref(), Some("Asha"));
        assert!(req.last_name.is_none());
    }
}
