use serde_json::json;

use super::{ApiCall, ApiError, EduApi};
use crate::{
    models::{LoginResponse, Profile, RegisterRequest},
    session::Role,
};

/// Outcome of a successful credential exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct SignedIn {
    pub token: String,
    pub role: Role,
}

/// login
///
/// OAuth2 password exchange against `/auth/token`. Credentials go out
/// form-encoded. When the token response carries no role, the profile
/// endpoint is asked with the fresh token.
pub async fn login(api: &dyn EduApi, username: &str, password: &str) -> Result<SignedIn, ApiError> {
    let reply = api
        .send(ApiCall::post("/auth/token").form(vec![
            ("username".to_string(), username.to_string()),
            ("password".to_string(), password.to_string()),
        ]))
        .await?;
    let token: LoginResponse = reply.json()?;

    let role = match token.role {
        Some(role) => role,
        None => profile(api, &token.access_token).await?.role,
    };
    let role = role.parse::<Role>().map_err(ApiError::Decode)?;

    Ok(SignedIn {
        token: token.access_token,
        role,
    })
}

/// register
///
/// Creates an account. The server answers with the new profile.
pub async fn register(api: &dyn EduApi, request: &RegisterRequest) -> Result<Profile, ApiError> {
    api.send(ApiCall::post("/auth/register").json(json!({
        "username": request.username,
        "password": request.password,
        "role": request.role,
    })))
    .await?
    .json()
}

pub async fn profile(api: &dyn EduApi, token: &str) -> Result<Profile, ApiError> {
    api.send(ApiCall::get("/auth/me").bearer(token)).await?.json()
}
