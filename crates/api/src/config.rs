use dtg_events::delivery::{EmailConfig, SmsConfig};

use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables. The struct is built
/// once at process start and injected through `AppState`; nothing reads
/// ambient process state at call time.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry).
    pub jwt: JwtConfig,
    /// Outbound notification channel settings.
    pub notifications: NotificationSettings,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt: JwtConfig::from_env(),
            notifications: NotificationSettings::from_env(),
        }
    }
}

/// Outbound notification channel settings.
///
/// Each channel is `None` when its transport is not configured; the
/// notification router skips unconfigured channels. In-app notification
/// rows are always written.
#[derive(Debug, Clone, Default)]
pub struct NotificationSettings {
    /// SMTP settings; `None` when `SMTP_HOST` is unset.
    pub email: Option<EmailConfig>,
    /// SMS gateway settings; `None` when `SMS_GATEWAY_URL` is unset.
    pub sms: Option<SmsConfig>,
}

impl NotificationSettings {
    /// Load channel settings from environment variables.
    pub fn from_env() -> Self {
        Self {
            email: EmailConfig::from_env(),
            sms: SmsConfig::from_env(),
        }
    }
}
