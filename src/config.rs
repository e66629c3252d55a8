use std::{env, net::SocketAddr};

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: SocketAddr,
    pub database_url: Option<String>,
    pub nonce_secret: Option<String>,
    pub nonce_lifetime_sec: u64,
    pub admin_users: String,
    pub seed_filter_terms: Option<String>,
    pub seed_replacement_text: Option<String>,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let port = env::var("PORT").unwrap_or_else(|_| "8080".to_owned());
        let http_bind = env::var("HTTP_BIND").unwrap_or_else(|_| format!("0.0.0.0:{port}"));
        let http_bind = http_bind.parse()?;

        Ok(Self {
            http_bind,
            database_url: env::var("DATABASE_URL").ok(),
            nonce_secret: env::var("NONCE_SECRET")
                .ok()
                .filter(|secret| !secret.is_empty()),
            nonce_lifetime_sec: env_u64("NONCE_LIFETIME_SEC", 86_400),
            admin_users: env::var("ADMIN_USERS").unwrap_or_default(),
            seed_filter_terms: env::var("WORD_FILTER_TERMS").ok(),
            seed_replacement_text: env::var("WORD_FILTER_REPLACEMENT").ok(),
        })
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .unwrap_or(default)
}
