use std::net::IpAddr;
use std::path::PathBuf;

pub const DEFAULT_MAILBOX: &str = "admin@tringtriadmarketing.com";
pub const DEFAULT_SMTP_HOST: &str = "mail.tringtriadmarketing.com";
pub const DEFAULT_CORS_ORIGINS: &str =
    "https://www.tringtriadmarketing.com,http://localhost:3000,https://v6j.90b.mytemp.website";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub site_root: PathBuf,
    pub submissions_file: PathBuf,
    pub cors_origins: Vec<String>,
    pub max_body_size: usize,
    pub log_level: String,
    pub smtp: SmtpConfig,
}

#[derive(Debug, Clone)]
pub struct SmtpConfig {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub pass: String,
    pub secure: bool,
    pub from: String,
    pub recipient: String,
}

impl SmtpConfig {
    /// Host, user and password must all be set before the relay is contacted.
    pub fn is_complete(&self) -> bool {
        !self.host.trim().is_empty() && !self.user.trim().is_empty() && !self.pass.is_empty()
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source. `from_env` is this
    /// with the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, String>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let host: IpAddr = env_or("HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid HOST: {e}"))?;

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid PORT: {e}"))?;

        let site_root = PathBuf::from(env_or("SITE_ROOT", "."));

        let submissions_file = lookup("SUBMISSIONS_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|| site_root.join("contact_submissions.xlsx"));

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", DEFAULT_CORS_ORIGINS)
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect();

        let max_body_size: usize = env_or("MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("LOG_LEVEL", "info");

        let smtp = SmtpConfig {
            host: env_or("SMTP_HOST", DEFAULT_SMTP_HOST),
            port: env_or("SMTP_PORT", "587")
                .parse()
                .map_err(|e| format!("Invalid SMTP_PORT: {e}"))?,
            user: env_or("SMTP_USER", DEFAULT_MAILBOX),
            pass: env_or("SMTP_PASSWORD", ""),
            secure: env_or("SMTP_SECURE", "true").trim().eq_ignore_ascii_case("true"),
            from: env_or("SMTP_FROM_EMAIL", DEFAULT_MAILBOX),
            recipient: env_or("RECIPIENT_EMAIL", DEFAULT_MAILBOX),
        };

        Ok(Config {
            host,
            port,
            site_root,
            submissions_file,
            cors_origins,
            max_body_size,
            log_level,
            smtp,
        })
    }
}
