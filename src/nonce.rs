use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const TOKEN_LEN: usize = 20;

/// Issues and checks per-session, per-action anti-forgery tokens.
///
/// Time is split into ticks of half the lifetime; a token is accepted during
/// the tick it was issued in and the one after, so it stays valid for at
/// least half and at most the whole lifetime.
#[derive(Clone)]
pub struct NonceIssuer {
    secret: Vec<u8>,
    lifetime_secs: i64,
}

impl std::fmt::Debug for NonceIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NonceIssuer")
            .field("lifetime_secs", &self.lifetime_secs)
            .finish_non_exhaustive()
    }
}

impl NonceIssuer {
    pub fn new(secret: impl Into<Vec<u8>>, lifetime_secs: u64) -> Self {
        Self {
            secret: secret.into(),
            lifetime_secs: i64::try_from(lifetime_secs).unwrap_or(i64::MAX).max(2),
        }
    }

    pub fn create(&self, action: &str, session: &str) -> String {
        self.create_at(action, session, Utc::now())
    }

    pub fn verify(&self, action: &str, session: &str, token: &str) -> bool {
        self.verify_at(action, session, token, Utc::now())
    }

    pub fn create_at(&self, action: &str, session: &str, now: DateTime<Utc>) -> String {
        self.token_for_tick(self.tick(now), action, session)
    }

    pub fn verify_at(&self, action: &str, session: &str, token: &str, now: DateTime<Utc>) -> bool {
        if token.is_empty() {
            return false;
        }
        let current = self.tick(now);
        [current, current - 1].into_iter().any(|tick| {
            constant_time_eq(&self.token_for_tick(tick, action, session), token)
        })
    }

    fn tick(&self, now: DateTime<Utc>) -> i64 {
        let half = self.lifetime_secs / 2;
        // Ceiling division, so tick boundaries sit on multiples of `half`.
        (now.timestamp() + half - 1).div_euclid(half)
    }

    fn token_for_tick(&self, tick: i64, action: &str, session: &str) -> String {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .unwrap_or_else(|_| unreachable!("HMAC accepts keys of any length"));
        mac.update(format!("{tick}|{action}|{session}").as_bytes());
        let mut token = hex::encode(mac.finalize().into_bytes());
        token.truncate(TOKEN_LEN);
        token
    }
}

pub(crate) fn constant_time_eq(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result = 0u8;
    for (a_byte, b_byte) in a.bytes().zip(b.bytes()) {
        result |= a_byte ^ b_byte;
    }

    result == 0
}
