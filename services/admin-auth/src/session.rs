//! Session persistence in cookies
//!
//! The identity-provider session is stored as `base64-<base64url(json)>`
//! under the storage key. Browsers cap a cookie around 4 KiB and sessions
//! carrying a provider token regularly exceed that, so long values are split
//! into `<key>.0`, `<key>.1`, ... and reassembled on read. The PKCE code
//! verifier lives next to it under `<key>-code-verifier`.

use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use time::Duration;
use tracing::debug;

use crate::{
    cookies::{CookieOptions, CookieStore},
    error::SessionError,
    models::Session,
};

/// Largest value written to a single cookie
pub const MAX_CHUNK_SIZE: usize = 3180;

const BASE64_PREFIX: &str = "base64-";

/// Browsers clamp cookie lifetimes to 400 days
const COOKIE_MAX_AGE_DAYS: i64 = 400;

/// Session manager for reading and writing the auth cookies
#[derive(Debug, Clone)]
pub struct SessionManager {
    storage_key: String,
    options: CookieOptions,
}

impl SessionManager {
    /// Create a new session manager for the given cookie name
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
            options: CookieOptions {
                max_age: Some(Duration::days(COOKIE_MAX_AGE_DAYS)),
                domain: None,
            },
        }
    }

    fn verifier_key(&self) -> String {
        format!("{}-code-verifier", self.storage_key)
    }

    fn chunk_key(&self, index: usize) -> String {
        format!("{}.{}", self.storage_key, index)
    }

    /// Write the session, replacing whatever was stored before
    pub fn store_session(
        &self,
        cookies: &mut dyn CookieStore,
        session: &Session,
    ) -> Result<(), SessionError> {
        let json = serde_json::to_vec(session)?;
        let value = format!("{}{}", BASE64_PREFIX, URL_SAFE_NO_PAD.encode(json));
        let chunks = split_chunks(&value, MAX_CHUNK_SIZE);

        if chunks.len() == 1 {
            cookies.set(&self.storage_key, &value, &self.options);
            self.remove_chunks_from(cookies, 0);
        } else {
            if cookies.get(&self.storage_key).is_some() {
                cookies.remove(&self.storage_key, &self.options);
            }
            for (index, chunk) in chunks.iter().enumerate() {
                cookies.set(&self.chunk_key(index), chunk, &self.options);
            }
            self.remove_chunks_from(cookies, chunks.len());
        }

        debug!(
            chunks = chunks.len(),
            bytes = value.len(),
            "Stored session cookie"
        );
        Ok(())
    }

    /// Read the session, `Ok(None)` when no session cookie is present
    pub fn load_session(&self, cookies: &dyn CookieStore) -> Result<Option<Session>, SessionError> {
        let value = match cookies.get(&self.storage_key) {
            Some(value) => value,
            None => {
                let mut combined = String::new();
                let mut index = 0;
                while let Some(chunk) = cookies.get(&self.chunk_key(index)) {
                    combined.push_str(&chunk);
                    index += 1;
                }
                if index == 0 {
                    return Ok(None);
                }
                combined
            }
        };

        if value.is_empty() {
            return Ok(None);
        }

        let session = match value.strip_prefix(BASE64_PREFIX) {
            Some(encoded) => serde_json::from_slice(&URL_SAFE_NO_PAD.decode(encoded)?)?,
            None => serde_json::from_str(&value)?,
        };
        Ok(Some(session))
    }

    /// Remove the session cookie and all of its chunks
    pub fn clear_session(&self, cookies: &mut dyn CookieStore) {
        if cookies.get(&self.storage_key).is_some() {
            cookies.remove(&self.storage_key, &self.options);
        }
        self.remove_chunks_from(cookies, 0);
    }

    /// Keep the PKCE verifier until the provider redirects back
    pub fn store_code_verifier(&self, cookies: &mut dyn CookieStore, verifier: &str) {
        cookies.set(&self.verifier_key(), verifier, &self.options);
    }

    /// Read and remove the PKCE verifier; it is single use
    pub fn take_code_verifier(&self, cookies: &mut dyn CookieStore) -> Option<String> {
        let key = self.verifier_key();
        let verifier = cookies.get(&key)?;
        cookies.remove(&key, &self.options);
        Some(verifier).filter(|v| !v.is_empty())
    }

    fn remove_chunks_from(&self, cookies: &mut dyn CookieStore, start: usize) {
        let mut index = start;
        loop {
            let key = self.chunk_key(index);
            if cookies.get(&key).is_none() {
                break;
            }
            cookies.remove(&key, &self.options);
            index += 1;
        }
    }
}

/// Split on char boundaries into pieces of at most `size` bytes
fn split_chunks(value: &str, size: usize) -> Vec<&str> {
    let mut chunks = Vec::new();
    let mut rest = value;
    while rest.len() > size {
        let mut cut = size;
        while !rest.is_char_boundary(cut) {
            cut -= 1;
        }
        let (head, tail) = rest.split_at(cut);
        chunks.push(head);
        rest = tail;
    }
    chunks.push(rest);
    chunks
}
