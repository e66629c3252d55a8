use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    escape::sanitize_text_field,
    filter::parse_terms,
    nonce::NonceIssuer,
    settings::{FILTER_TERMS_OPTION, REPLACEMENT_TEXT_OPTION, SettingsStore},
    types::{Capability, Principal},
};

pub const SAVE_TERMS_ACTION: &str = "save-word-filter";
pub const REPLACEMENT_FIELDS_ACTION: &str = "replacement-fields-options";

pub const PERMISSION_DENIED_MESSAGE: &str =
    "Sorry, you do not have permission to perform that action.";

#[derive(Debug, Error)]
pub enum AdminError {
    #[error("missing capability {}", .0.as_str())]
    PermissionDenied(Capability),
    #[error("anti-forgery token did not verify")]
    InvalidNonce,
    #[error(transparent)]
    Store(#[from] anyhow::Error),
}

/// Authorizes and applies changes to the filter options.
///
/// Every write runs the capability check and the token check before touching
/// the store, so a rejected submission never leaves a partial update behind.
#[derive(Clone)]
pub struct SettingsCommands {
    store: Arc<dyn SettingsStore>,
    nonces: NonceIssuer,
}

impl SettingsCommands {
    pub fn new(store: Arc<dyn SettingsStore>, nonces: NonceIssuer) -> Self {
        Self { store, nonces }
    }

    pub fn nonce_for(&self, principal: &Principal, action: &str) -> String {
        self.nonces.create(action, &principal.user_id)
    }

    pub fn authorize(
        &self,
        principal: &Principal,
        action: &str,
        nonce: Option<&str>,
    ) -> Result<(), AdminError> {
        if !principal.can(Capability::ManageOptions) {
            return Err(AdminError::PermissionDenied(Capability::ManageOptions));
        }
        let nonce = nonce.unwrap_or_default();
        if !self.nonces.verify(action, &principal.user_id, nonce) {
            return Err(AdminError::InvalidNonce);
        }
        Ok(())
    }

    /// Sanitizes and stores the raw term list. Returns the stored value.
    pub async fn save_filter_terms(
        &self,
        principal: &Principal,
        nonce: Option<&str>,
        raw_terms: &str,
    ) -> Result<String, AdminError> {
        self.authorize(principal, SAVE_TERMS_ACTION, nonce)
            .inspect_err(|error| log_rejection(principal, SAVE_TERMS_ACTION, error))?;

        let sanitized = sanitize_text_field(raw_terms);
        self.store
            .update_option(FILTER_TERMS_OPTION, &sanitized)
            .await?;

        info!(
            user_id = %principal.user_id,
            term_count = parse_terms(&sanitized).len(),
            "filtered words saved"
        );
        Ok(sanitized)
    }

    /// Stores the replacement text as submitted. Empty is allowed and means
    /// matched terms are removed.
    pub async fn save_replacement_text(
        &self,
        principal: &Principal,
        nonce: Option<&str>,
        replacement: &str,
    ) -> Result<(), AdminError> {
        self.authorize(principal, REPLACEMENT_FIELDS_ACTION, nonce)
            .inspect_err(|error| log_rejection(principal, REPLACEMENT_FIELDS_ACTION, error))?;

        self.store
            .update_option(REPLACEMENT_TEXT_OPTION, replacement)
            .await?;

        info!(
            user_id = %principal.user_id,
            removes_terms = replacement.is_empty(),
            "replacement text saved"
        );
        Ok(())
    }
}

fn log_rejection(principal: &Principal, action: &str, error: &AdminError) {
    warn!(
        user_id = %principal.user_id,
        action,
        reason = %error,
        "settings update rejected"
    );
}
