use axum::http::{HeaderMap, header};
use base64::{Engine as _, engine::general_purpose};
use tracing::warn;

use crate::{
    nonce::constant_time_eq,
    types::{Principal, Role},
};

#[derive(Debug, Clone)]
struct Account {
    user_id: String,
    token: String,
    role: Role,
}

/// Known accounts, keyed by their access token.
#[derive(Debug, Clone, Default)]
pub struct AccessDirectory {
    accounts: Vec<Account>,
}

impl AccessDirectory {
    /// Parses `user:token:role` entries separated by commas. Malformed
    /// entries are skipped with a warning.
    pub fn parse(raw: &str) -> Self {
        let accounts = raw
            .split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .filter_map(|entry| {
                let account = parse_account(entry);
                if account.is_none() {
                    warn!("ignoring malformed ADMIN_USERS entry");
                }
                account
            })
            .collect();

        Self { accounts }
    }

    pub fn with_account(mut self, user_id: &str, token: &str, role: Role) -> Self {
        self.accounts.push(Account {
            user_id: user_id.to_owned(),
            token: token.to_owned(),
            role,
        });
        self
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Resolves the request's `Authorization` header (`Bearer <token>` or
    /// `Basic base64(user:token)`) to a principal. Anything that does not
    /// match a known account is anonymous.
    pub fn authenticate(&self, headers: &HeaderMap) -> Principal {
        let Some(value) = headers
            .get(header::AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
        else {
            return Principal::anonymous();
        };

        let account = if let Some(token) = value.strip_prefix("Bearer ") {
            self.find_by_token(token.trim())
        } else if let Some(encoded) = value.strip_prefix("Basic ") {
            decode_basic(encoded.trim()).and_then(|(user_id, token)| {
                self.find_by_token(&token)
                    .filter(|account| account.user_id == user_id)
            })
        } else {
            None
        };

        account.map_or_else(Principal::anonymous, |account| Principal {
            user_id: account.user_id.clone(),
            role: Some(account.role),
        })
    }

    fn find_by_token(&self, token: &str) -> Option<&Account> {
        if token.is_empty() {
            return None;
        }
        self.accounts
            .iter()
            .find(|account| constant_time_eq(&account.token, token))
    }
}

fn parse_account(entry: &str) -> Option<Account> {
    let mut parts = entry.splitn(3, ':').map(str::trim);
    let user_id = parts.next().filter(|part| !part.is_empty())?;
    let token = parts.next().filter(|part| !part.is_empty())?;
    let role = Role::parse(parts.next()?)?;

    Some(Account {
        user_id: user_id.to_owned(),
        token: token.to_owned(),
        role,
    })
}

fn decode_basic(encoded: &str) -> Option<(String, String)> {
    let decoded = general_purpose::STANDARD.decode(encoded).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (user_id, token) = decoded.split_once(':')?;
    Some((user_id.to_owned(), token.to_owned()))
}

#[cfg(test)]
mod tests {
    use axum::http::HeaderValue;

    use super::*;
    use crate::types::Capability;

    fn headers(value: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(value).expect("valid header"),
        );
        headers
    }

    fn directory() -> AccessDirectory {
        AccessDirectory::parse("alice:s3cret:administrator, bob:hunter2:editor, broken, eve::admin")
    }

    #[test]
    fn parses_well_formed_entries_only() {
        assert_eq!(directory().len(), 2);
        assert!(AccessDirectory::parse("").is_empty());
    }

    #[test]
    fn bearer_token_resolves_role() {
        let principal = directory().authenticate(&headers("Bearer s3cret"));
        assert_eq!(principal.user_id, "alice");
        assert!(principal.can(Capability::ManageOptions));

        let principal = directory().authenticate(&headers("Bearer hunter2"));
        assert_eq!(principal.user_id, "bob");
        assert!(!principal.can(Capability::ManageOptions));
    }

    #[test]
    fn basic_auth_requires_matching_user() {
        let encoded = general_purpose::STANDARD.encode("alice:s3cret");
        let principal = directory().authenticate(&headers(&format!("Basic {encoded}")));
        assert_eq!(principal.role, Some(Role::Administrator));

        let encoded = general_purpose::STANDARD.encode("bob:s3cret");
        let principal = directory().authenticate(&headers(&format!("Basic {encoded}")));
        assert!(principal.is_anonymous());
    }

    #[test]
    fn unknown_or_missing_credentials_are_anonymous() {
        assert!(directory().authenticate(&HeaderMap::new()).is_anonymous());
        assert!(directory().authenticate(&headers("Bearer nope")).is_anonymous());
        assert!(directory().authenticate(&headers("Bearer ")).is_anonymous());
        assert!(directory().authenticate(&headers("Token s3cret")).is_anonymous());
    }
}
