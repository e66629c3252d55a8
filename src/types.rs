use serde::{Deserialize, Serialize};

use crate::filter::DEFAULT_REPLACEMENT;

/// Snapshot of the two options the filter reads on every render.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterSettings {
    pub filter_terms: Option<String>,
    pub replacement_text: Option<String>,
}

impl FilterSettings {
    /// The configured replacement, `***` when the option was never saved.
    /// An explicitly saved empty string is kept and means "remove".
    pub fn replacement(&self) -> &str {
        self.replacement_text
            .as_deref()
            .unwrap_or(DEFAULT_REPLACEMENT)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Administrator,
    Editor,
    Subscriber,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Administrator => "administrator",
            Role::Editor => "editor",
            Role::Subscriber => "subscriber",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "administrator" | "admin" => Some(Role::Administrator),
            "editor" => Some(Role::Editor),
            "subscriber" => Some(Role::Subscriber),
            _ => None,
        }
    }

    pub fn has_capability(self, capability: Capability) -> bool {
        match capability {
            Capability::ManageOptions => self == Role::Administrator,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    ManageOptions,
}

impl Capability {
    pub fn as_str(self) -> &'static str {
        match self {
            Capability::ManageOptions => "manage_options",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: String,
    pub role: Option<Role>,
}

impl Principal {
    pub fn anonymous() -> Self {
        Self {
            user_id: String::new(),
            role: None,
        }
    }

    pub fn is_anonymous(&self) -> bool {
        self.role.is_none()
    }

    pub fn can(&self, capability: Capability) -> bool {
        self.role.is_some_and(|role| role.has_capability(capability))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replacement_defaults_only_when_unset() {
        assert_eq!(FilterSettings::default().replacement(), "***");
        let cleared = FilterSettings {
            filter_terms: None,
            replacement_text: Some(String::new()),
        };
        assert_eq!(cleared.replacement(), "");
    }

    #[test]
    fn only_administrators_manage_options() {
        assert!(Role::Administrator.has_capability(Capability::ManageOptions));
        assert!(!Role::Editor.has_capability(Capability::ManageOptions));
        assert!(!Principal::anonymous().can(Capability::ManageOptions));
    }

    #[test]
    fn settings_serialize_with_camel_case_keys() {
        let settings = FilterSettings {
            filter_terms: Some("bad".to_owned()),
            replacement_text: None,
        };
        let json = serde_json::to_value(&settings).expect("serialize");
        assert_eq!(json["filterTerms"], "bad");
        assert!(json["replacementText"].is_null());
    }
}
