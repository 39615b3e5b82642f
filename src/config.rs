use std::env;
use std::time::Duration;

/// Base URL used for the remote education API when running locally.
pub const LOCAL_API_BASE_URL: &str = "http://127.0.0.1:8000";

/// AppConfig
///
/// Holds the portal's entire configuration state. It is loaded once at startup,
/// never mutated afterwards, and pulled into handlers through `FromRef`.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls logging format and cookie security.
    pub env: Env,
    // Base URL of the remote education API (no trailing slash).
    pub api_base_url: String,
    // Address the HTTP listener binds to.
    pub bind_addr: String,
    // Upper bound for a single remote API call. Lesson and exercise generation is slow.
    pub api_timeout: Duration,
}

/// Env
///
/// Defines the runtime context. `Local` enables pretty logs and plain-HTTP cookies,
/// `Production` switches to JSON logs and `Secure` session cookies.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Non-panicking configuration used to scaffold state in tests.
    fn default() -> Self {
        Self {
            env: Env::Local,
            api_base_url: LOCAL_API_BASE_URL.to_string(),
            bind_addr: "127.0.0.1:3000".to_string(),
            api_timeout: Duration::from_secs(120),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads every parameter from environment variables and fails fast on missing
    /// production settings.
    ///
    /// # Panics
    /// Panics in `production` when `EDU_API_BASE_URL` is not set, and whenever
    /// `EDU_API_TIMEOUT_SECS` is set to something that is not a whole number of seconds.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let api_base_url = match env {
            Env::Production => env::var("EDU_API_BASE_URL")
                .expect("FATAL: EDU_API_BASE_URL must be set in production."),
            Env::Local => {
                env::var("EDU_API_BASE_URL").unwrap_or_else(|_| LOCAL_API_BASE_URL.to_string())
            }
        };

        let api_timeout = match env::var("EDU_API_TIMEOUT_SECS") {
            Ok(raw) => Duration::from_secs(
                raw.trim()
                    .parse()
                    .expect("FATAL: EDU_API_TIMEOUT_SECS must be a whole number of seconds."),
            ),
            Err(_) => Duration::from_secs(120),
        };

        Self {
            env,
            api_base_url: api_base_url.trim_end_matches('/').to_string(),
            bind_addr: env::var("PORTAL_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string()),
            api_timeout,
        }
    }

    /// Session cookies only carry the `Secure` attribute behind HTTPS in production.
    pub fn secure_cookies(&self) -> bool {
        self.env == Env::Production
    }
}
