use super::{ChatMessage, Oracle, ResponseFormat};
use crate::cache::CacheStore;
use crate::error::Result;
use log::{debug, info};
use serde::de::DeserializeOwned;

/// Per-call options for [`CachedOracle::invoke`].
#[derive(Debug, Clone, Copy)]
pub struct InvokeOptions<'a> {
    /// Opaque key the response is cached under
    pub cache_key: &'a str,
    /// Whether the caller expects a JSON document back
    pub is_json_response: bool,
}

/// Cache-or-invoke wrapper shared by every oracle call site.
///
/// A cached value is returned as-is without touching the oracle. Otherwise the oracle is
/// called and its raw text is stored before being returned. Entries are never refreshed,
/// so an edited source file keeps receiving the response recorded for its key.
pub struct CachedOracle<'a> {
    oracle: &'a dyn Oracle,
    cache: &'a dyn CacheStore,
}

impl<'a> CachedOracle<'a> {
    pub fn new(oracle: &'a dyn Oracle, cache: &'a dyn CacheStore) -> Self {
        Self { oracle, cache }
    }

    /// Returns the cached or freshly generated raw text for `options.cache_key`.
    pub fn invoke(&self, messages: &[ChatMessage], options: InvokeOptions<'_>) -> Result<String> {
        let key = options.cache_key;

        if self.cache.exists(key)? {
            debug!("Cache hit for {}", key);
            return self.cache.get(key);
        }

        info!("Calling oracle for {}", key);
        let format = if options.is_json_response {
            ResponseFormat::Json
        } else {
            ResponseFormat::Text
        };
        let response = self.oracle.complete(messages, format)?;
        debug!("Oracle response for {}: {}", key, response);

        self.cache.set(key, &response)?;
        debug!("Response cached for {}", key);

        Ok(response)
    }

    /// Plain-text invocation.
    pub fn invoke_text(&self, messages: &[ChatMessage], cache_key: &str) -> Result<String> {
        self.invoke(messages, InvokeOptions { cache_key, is_json_response: false })
    }

    /// JSON invocation; the response (cached or fresh) is parsed into `T`.
    pub fn invoke_json<T: DeserializeOwned>(
        &self,
        messages: &[ChatMessage],
        cache_key: &str,
    ) -> Result<T> {
        let raw = self.invoke(messages, InvokeOptions { cache_key, is_json_response: true })?;
        Ok(serde_json::from_str(&raw)?)
    }
}
