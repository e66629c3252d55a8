use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::SettingsStore;

#[derive(Debug, Default)]
pub struct InMemorySettingsStore {
    options: Arc<RwLock<HashMap<String, String>>>,
}

#[async_trait]
impl SettingsStore for InMemorySettingsStore {
    async fn get_option(&self, name: &str) -> anyhow::Result<Option<String>> {
        Ok(self.options.read().await.get(name).cloned())
    }

    async fn update_option(&self, name: &str, value: &str) -> anyhow::Result<()> {
        self.options
            .write()
            .await
            .insert(name.to_owned(), value.to_owned());
        Ok(())
    }

    async fn delete_option(&self, name: &str) -> anyhow::Result<bool> {
        Ok(self.options.write().await.remove(name).is_some())
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::{FILTER_TERMS_OPTION, REPLACEMENT_TEXT_OPTION, SettingsStore};

    use super::InMemorySettingsStore;

    #[tokio::test]
    async fn round_trips_options() {
        let store = InMemorySettingsStore::default();
        assert!(
            store
                .get_option(FILTER_TERMS_OPTION)
                .await
                .expect("get should succeed")
                .is_none()
        );

        store
            .update_option(FILTER_TERMS_OPTION, "bad, mean")
            .await
            .expect("update should succeed");
        store
            .update_option(REPLACEMENT_TEXT_OPTION, "")
            .await
            .expect("update should succeed");

        let settings = store
            .load_filter_settings()
            .await
            .expect("load should succeed");
        assert_eq!(settings.filter_terms.as_deref(), Some("bad, mean"));
        assert_eq!(settings.replacement(), "");
    }

    #[tokio::test]
    async fn delete_reports_whether_option_existed() {
        let store = InMemorySettingsStore::default();
        store
            .update_option(REPLACEMENT_TEXT_OPTION, "[x]")
            .await
            .expect("update should succeed");

        assert!(store.delete_option(REPLACEMENT_TEXT_OPTION).await.expect("delete"));
        assert!(!store.delete_option(REPLACEMENT_TEXT_OPTION).await.expect("delete"));
        let settings = store.load_filter_settings().await.expect("load");
        assert_eq!(settings.replacement(), "***");
    }
}
