use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::errors::IdentityError;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::ProfileUpdate;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn update_profile(
    State(state): State<AppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    body: Result<Json<UpdateProfileRequest>, JsonRejection>,
) -> Result<ApiSuccess<UserData>, ApiError> {
    let Json(body) = body?;
    let update = body.try_into_update()?;

    state
        .identity
        .update_profile(user.kind, &user.id, update)
        .await
        .map_err(ApiError::from)
        .map(|ref user| ApiSuccess::new(StatusCode::OK, user.into()))
}

/// Partial profile. Absent or blank fields keep their stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct UpdateProfileRequest {
    pub email: Option<String>,
    pub name: Option<String>,
    pub gender: Option<String>,
    pub locale: Option<String>,
    pub location: Option<String>,
    pub avatar_url: Option<String>,
}

impl UpdateProfileRequest {
    fn try_into_update(self) -> Result<ProfileUpdate, IdentityError> {
        let email = self
            .email
            .map(|email| email.trim().to_string())
            .filter(|email| !email.is_empty())
            .map(EmailAddress::new)
            .transpose()?;

        Ok(ProfileUpdate {
            email,
            name: self.name,
            gender: self.gender,
            locale: self.locale,
            location: self.location,
            avatar_url: self.avatar_url,
        })
    }
}
