use std::fmt;

use hmac::{Hmac, Mac};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

/// Key for email fingerprints. `Debug` never prints the value.
#[derive(Clone, PartialEq, Eq)]
pub struct FingerprintSecret(String);

impl FingerprintSecret {
    /// Returns `None` for an empty secret, which counts as "not configured".
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }
}

impl fmt::Debug for FingerprintSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("FingerprintSecret(***)")
    }
}

/// HMAC-SHA256 of `email` keyed with `secret`, as lowercase hex.
pub fn fingerprint(email: &str, secret: &FingerprintSecret) -> String {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("hmac accepts keys of any length");
    mac.update(email.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}
