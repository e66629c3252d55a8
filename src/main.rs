use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::{info, warn};
use wordfilter::{
    admin::SettingsCommands,
    auth::AccessDirectory,
    config::AppConfig,
    http::{self, AppState},
    nonce::NonceIssuer,
    settings::{
        FILTER_TERMS_OPTION, InMemorySettingsStore, PostgresSettingsStore,
        REPLACEMENT_TEXT_OPTION, SettingsStore, seed_option,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;

    let settings = build_settings_store(&config).await?;
    seed_settings(settings.as_ref(), &config).await?;

    let directory = AccessDirectory::parse(&config.admin_users);
    if directory.is_empty() {
        warn!("ADMIN_USERS is empty; admin pages will reject every request");
    } else {
        info!(accounts = directory.len(), "loaded admin accounts");
    }

    let commands = SettingsCommands::new(settings.clone(), build_nonce_issuer(&config));

    let app = http::router(AppState {
        settings,
        commands,
        directory: Arc::new(directory),
    });
    let listener = TcpListener::bind(config.http_bind).await?;
    info!("Word filter HTTP API listening on {}", config.http_bind);

    axum::serve(listener, app).await?;
    Ok(())
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .compact()
        .init();
}

async fn build_settings_store(config: &AppConfig) -> anyhow::Result<Arc<dyn SettingsStore>> {
    if let Some(database_url) = &config.database_url {
        let store = PostgresSettingsStore::connect(database_url).await?;
        info!("Connected to Postgres settings store");
        Ok(Arc::new(store))
    } else {
        warn!("DATABASE_URL not set; using in-memory settings store");
        Ok(Arc::new(InMemorySettingsStore::default()))
    }
}

async fn seed_settings(store: &dyn SettingsStore, config: &AppConfig) -> anyhow::Result<()> {
    if seed_option(store, FILTER_TERMS_OPTION, config.seed_filter_terms.as_deref()).await? {
        info!("seeded filter terms from WORD_FILTER_TERMS");
    }
    if seed_option(
        store,
        REPLACEMENT_TEXT_OPTION,
        config.seed_replacement_text.as_deref(),
    )
    .await?
    {
        info!("seeded replacement text from WORD_FILTER_REPLACEMENT");
    }
    Ok(())
}

fn build_nonce_issuer(config: &AppConfig) -> NonceIssuer {
    let secret = config.nonce_secret.clone().unwrap_or_else(|| {
        warn!("NONCE_SECRET not set; form tokens will not survive a restart");
        format!("{}{}", uuid::Uuid::new_v4(), uuid::Uuid::new_v4())
    });
    NonceIssuer::new(secret, config.nonce_lifetime_sec)
}
