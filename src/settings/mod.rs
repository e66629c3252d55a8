mod in_memory;
mod postgres;

use async_trait::async_trait;

use crate::types::FilterSettings;

pub use in_memory::InMemorySettingsStore;
pub use postgres::PostgresSettingsStore;

pub const FILTER_TERMS_OPTION: &str = "plugin_words_to_filter";
pub const REPLACEMENT_TEXT_OPTION: &str = "replacement-text";

#[async_trait]
pub trait SettingsStore: Send + Sync {
    async fn get_option(&self, name: &str) -> anyhow::Result<Option<String>>;

    async fn update_option(&self, name: &str, value: &str) -> anyhow::Result<()>;

    async fn delete_option(&self, name: &str) -> anyhow::Result<bool>;

    async fn load_filter_settings(&self) -> anyhow::Result<FilterSettings> {
        Ok(FilterSettings {
            filter_terms: self.get_option(FILTER_TERMS_OPTION).await?,
            replacement_text: self.get_option(REPLACEMENT_TEXT_OPTION).await?,
        })
    }
}

/// Writes `value` under `name` unless the option already exists.
pub async fn seed_option(
    store: &dyn SettingsStore,
    name: &str,
    value: Option<&str>,
) -> anyhow::Result<bool> {
    let Some(value) = value else {
        return Ok(false);
    };
    if store.get_option(name).await?.is_some() {
        return Ok(false);
    }
    store.update_option(name, value).await?;
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn seeding_never_overwrites_saved_options() {
        let store = InMemorySettingsStore::default();
        store
            .update_option(FILTER_TERMS_OPTION, "bad")
            .await
            .expect("update should succeed");

        let seeded = seed_option(&store, FILTER_TERMS_OPTION, Some("mean"))
            .await
            .expect("seed should succeed");
        assert!(!seeded);

        let seeded = seed_option(&store, REPLACEMENT_TEXT_OPTION, Some("[removed]"))
            .await
            .expect("seed should succeed");
        assert!(seeded);

        let settings = store
            .load_filter_settings()
            .await
            .expect("load should succeed");
        assert_eq!(settings.filter_terms.as_deref(), Some("bad"));
        assert_eq!(settings.replacement(), "[removed]");
    }

    #[tokio::test]
    async fn seeding_without_value_is_a_no_op() {
        let store = InMemorySettingsStore::default();
        let seeded = seed_option(&store, FILTER_TERMS_OPTION, None)
            .await
            .expect("seed should succeed");
        assert!(!seeded);
        assert_eq!(
            store.load_filter_settings().await.expect("load"),
            FilterSettings::default()
        );
    }
}
