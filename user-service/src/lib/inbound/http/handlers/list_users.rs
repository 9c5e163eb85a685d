use axum::extract::State;
use axum::http::StatusCode;

use super::ApiError;
use super::ApiSuccess;
use super::UserData;
use crate::domain::user::ports::UserServicePort;
use crate::inbound::http::router::AppState;
use crate::user::ports::UserRepository;

pub async fn list_users<UR>(
    State(state): State<AppState<UR>>,
) -> Result<ApiSuccess<Vec<UserData>>, ApiError>
where
    UR: UserRepository,
{
    state
        .user_service
        .list_users()
        .await
        .map_err(ApiError::from)
        .map(|users| ApiSuccess::new(StatusCode::OK, users.iter().map(UserData::from).collect()))
}
