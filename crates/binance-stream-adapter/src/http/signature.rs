/*
[INPUT]:  API secret and the encoded query string + form body
[OUTPUT]: Lowercase hex HMAC-SHA256 signature
[POS]:    HTTP layer - request signing for SIGNED endpoints
[UPDATE]: When changing signing algorithm or payload layout
*/

use std::fmt;

use ring::hmac;

/// Signs request payloads with the account's API secret
#[derive(Clone)]
pub struct RequestSigner {
    key: hmac::Key,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("key", &"<redacted>")
            .finish()
    }
}

impl RequestSigner {
    pub fn new(api_secret: &str) -> Self {
        Self {
            key: hmac::Key::new(hmac::HMAC_SHA256, api_secret.as_bytes()),
        }
    }

    /// Sign `payload`, the query string followed directly by the form body
    pub fn sign(&self, payload: &str) -> String {
        let tag = hmac::sign(&self.key, payload.as_bytes());
        hex::encode(tag.as_ref())
    }
}
