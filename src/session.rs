use std::{convert::Infallible, fmt, str::FromStr};

use axum::{extract::FromRequestParts, http::request::Parts};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};

// The only place the persisted key names are spelled out.
const TOKEN_KEY: &str = "token";
const ROLE_KEY: &str = "role";
const USERNAME_KEY: &str = "username";

/// Role
///
/// The three account kinds known to the portal. Each one owns exactly one
/// protected route subtree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
    Admin,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Student, Role::Teacher, Role::Admin];

    /// Wire and cookie representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
            Role::Admin => "admin",
        }
    }

    /// Root of the role's subtree. Login lands here.
    pub fn home_path(&self) -> &'static str {
        match self {
            Role::Student => "/student",
            Role::Teacher => "/teacher",
            Role::Admin => "/admin",
        }
    }

    /// Canonical page an unmatched sub-path falls back to.
    pub fn default_page(&self) -> &'static str {
        match self {
            Role::Student => "/student/homeworks",
            Role::Teacher => "/teacher/lesson",
            Role::Admin => "/admin/dashboard",
        }
    }

    /// Human-facing label used in layouts and forms.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Student => "Student",
            Role::Teacher => "Teacher",
            Role::Admin => "Administrator",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "student" => Ok(Role::Student),
            "teacher" => Ok(Role::Teacher),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("Invalid role: {}", s)),
        }
    }
}

/// Session
///
/// The client-held `token`/`role`/`username` triple. The browser keeps it in
/// cookies; this type is the single read/write accessor for those cookies, so
/// no other module touches the key names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    /// Bearer token issued by the remote API. `None` when absent or empty.
    pub token: Option<String>,
    /// Role stored at login. Unknown role strings read back as `None`.
    pub role: Option<Role>,
    pub username: String,
}

impl Session {
    /// Builds the session recorded after a successful login.
    pub fn signed_in(token: impl Into<String>, role: Role, username: impl Into<String>) -> Self {
        Self {
            token: Some(token.into()),
            role: Some(role),
            username: username.into(),
        }
    }

    /// load
    ///
    /// Reads the triple from the request cookies. Missing keys simply yield an
    /// anonymous session; this never fails.
    pub fn load(jar: &CookieJar) -> Self {
        let token = jar
            .get(TOKEN_KEY)
            .map(|c| c.value().to_string())
            .filter(|t| !t.is_empty());
        let role = jar.get(ROLE_KEY).and_then(|c| c.value().parse().ok());
        let username = jar
            .get(USERNAME_KEY)
            .map(|c| c.value().to_string())
            .unwrap_or_default();

        Self {
            token,
            role,
            username,
        }
    }

    /// persist
    ///
    /// Writes all three keys into the outgoing jar. Keys without a value are
    /// written as expired cookies so the stored state always matches `self`.
    pub fn persist(&self, jar: CookieJar, secure: bool) -> CookieJar {
        let jar = match &self.token {
            Some(token) => jar.add(session_cookie(TOKEN_KEY, token.clone(), secure)),
            None => jar.add(expired_cookie(TOKEN_KEY)),
        };
        let jar = match self.role {
            Some(role) => jar.add(session_cookie(ROLE_KEY, role.as_str().to_string(), secure)),
            None => jar.add(expired_cookie(ROLE_KEY)),
        };
        jar.add(session_cookie(USERNAME_KEY, self.username.clone(), secure))
    }

    /// clear
    ///
    /// Expires every session key in one response. Safe to call with no session.
    pub fn clear(jar: CookieJar) -> CookieJar {
        jar.add(expired_cookie(TOKEN_KEY))
            .add(expired_cookie(ROLE_KEY))
            .add(expired_cookie(USERNAME_KEY))
    }

    /// Token to forward to the remote API. Empty when signed out.
    pub fn bearer(&self) -> &str {
        self.token.as_deref().unwrap_or("")
    }
}

fn session_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

fn expired_cookie(name: &'static str) -> Cookie<'static> {
    Cookie::build((name, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build()
}

/// Session Extractor Implementation
///
/// Lets handlers and middleware receive the session by injection. Reading
/// cookies cannot fail, so the rejection type is `Infallible`.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(Session::load(&CookieJar::from_headers(&parts.headers)))
    }
}
