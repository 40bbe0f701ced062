use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct SignInRequest<'a> {
    pub username: &'a str,
    pub password: &'a str,
}

/// Sign-in response body. The token normally arrives in the
/// `x-auth-token` header; `token` covers servers that put it in the body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignInResponse {
    pub id: Option<String>,
    pub email: Option<String>,
    pub roles: Vec<String>,
    pub token: Option<String>,
}

impl SignInResponse {
    pub fn is_admin(&self) -> bool {
        self.roles.iter().any(|r| r.eq_ignore_ascii_case("admin"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    pub contact_number: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SignupResponse {
    pub message: Option<String>,
}
