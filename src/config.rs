use std::env;
use std::path::PathBuf;

/// Authentication mode for the application.
#[derive(Debug, Clone)]
pub enum AuthMode {
    /// No authentication required - all users can access the dashboard.
    Unauthenticated,
    /// A single analyst account: username plus an Argon2 password hash.
    Password { username: String, hash: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: PathBuf,
    pub static_path: PathBuf,
    pub auth_mode: AuthMode,
    pub session_ttl_minutes: i64,
    /// Upper bound on the number of records a single fetch may return.
    pub max_records_per_fetch: usize,
}

/// The magic value that disables authentication.
pub const UNAUTHENTICATED_MAGIC: &str = "DANGEROUSLY_ALLOW_UNAUTHENTICATED_USERS";

pub const DEFAULT_USERNAME: &str = "Admin";
pub const DEFAULT_SESSION_TTL_MINUTES: i64 = 60;
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let username =
            env::var("FLIGHTDESK_USERNAME").unwrap_or_else(|_| DEFAULT_USERNAME.to_string());

        let auth_mode = match parse_auth_mode(username, env::var("FLIGHTDESK_PASSWORD_HASH").ok())
        {
            Ok(mode) => mode,
            Err(msg) => panic!("{}", msg),
        };

        Self {
            host: env::var("FLIGHTDESK_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env::var("FLIGHTDESK_PORT")
                .ok()
                .and_then(|p| p.parse().ok())
                .unwrap_or(7080),
            database_path: env::var("FLIGHTDESK_DATABASE_URL")
                .map(|v| {
                    PathBuf::from(
                        v.strip_prefix("sqlite://")
                            .or_else(|| v.strip_prefix("sqlite:"))
                            .unwrap_or(&v),
                    )
                })
                .unwrap_or_else(|_| PathBuf::from("data/flightdesk.db")),
            static_path: env::var("FLIGHTDESK_STATIC_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("static")),
            auth_mode,
            session_ttl_minutes: env::var("FLIGHTDESK_SESSION_TTL_MINUTES")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|minutes: &i64| *minutes > 0)
                .unwrap_or(DEFAULT_SESSION_TTL_MINUTES),
            max_records_per_fetch: env::var("FLIGHTDESK_MAX_RECORDS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|limit: &usize| *limit > 0)
                .unwrap_or(DEFAULT_MAX_RECORDS),
        }
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn auth_enabled(&self) -> bool {
        matches!(self.auth_mode, AuthMode::Password { .. })
    }
}

/// Decide the auth mode from the configured hash. A missing or malformed
/// hash is a startup error; disabling auth has to be explicit.
pub fn parse_auth_mode(username: String, hash: Option<String>) -> Result<AuthMode, String> {
    match hash.as_deref() {
        Some(UNAUTHENTICATED_MAGIC) => Ok(AuthMode::Unauthenticated),
        Some(h) if h.starts_with("$argon2id$") => Ok(AuthMode::Password {
            username,
            hash: h.to_string(),
        }),
        Some("") | None => Err(format!(
            "FLIGHTDESK_PASSWORD_HASH is not set. Set an Argon2id hash or '{}' to \
             explicitly allow unauthenticated access.",
            UNAUTHENTICATED_MAGIC
        )),
        Some(h) => Err(format!(
            "Invalid FLIGHTDESK_PASSWORD_HASH: must start with '$argon2id$' or be '{}'. \
             Got: {}...",
            UNAUTHENTICATED_MAGIC,
            h.chars().take(20).collect::<String>()
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_auth_mode() {
        assert!(matches!(
            parse_auth_mode("Admin".into(), Some(UNAUTHENTICATED_MAGIC.into())),
            Ok(AuthMode::Unauthenticated)
        ));

        let mode = parse_auth_mode("ops".into(), Some("$argon2id$v=19$abc".into())).unwrap();
        match mode {
            AuthMode::Password { username, hash } => {
                assert_eq!(username, "ops");
                assert_eq!(hash, "$argon2id$v=19$abc");
            }
            other => panic!("unexpected mode {:?}", other),
        }

        assert!(parse_auth_mode("Admin".into(), None).is_err());
        assert!(parse_auth_mode("Admin".into(), Some(String::new())).is_err());
        let err = parse_auth_mode("Admin".into(), Some("plaintext-password".into())).unwrap_err();
        assert!(err.contains("plaintext-passwo"));
    }
}
