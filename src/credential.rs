//! API key selection and storage.
//!
//! The host environment owns key selection. This module wraps it behind
//! [`CredentialHost`] so the controller receives it explicitly and tests can
//! substitute a double.

use async_trait::async_trait;
use std::sync::{Arc, RwLock};

/// Environment variables consulted for an API key, in priority order.
pub const API_KEY_ENV_VARS: [&str; 3] = ["API_KEY", "GEMINI_API_KEY", "GOOGLE_API_KEY"];

/// Host capability for querying and selecting an API key.
#[async_trait]
pub trait CredentialHost: Send + Sync {
    /// Returns true if a usable key is currently selected.
    async fn has_selected_api_key(&self) -> bool;

    /// Opens the interactive selection flow and reports whether it succeeded.
    async fn open_select_key(&self) -> bool;
}

/// Query/command pair over an optional [`CredentialHost`].
///
/// A missing host behaves as "no key selected".
#[derive(Clone, Default)]
pub struct CredentialGateway {
    host: Option<Arc<dyn CredentialHost>>,
}

impl CredentialGateway {
    /// Creates a gateway delegating to `host`.
    pub fn new(host: Arc<dyn CredentialHost>) -> Self {
        Self { host: Some(host) }
    }

    /// Creates a gateway with no host capability.
    pub fn unavailable() -> Self {
        Self { host: None }
    }

    /// Returns true if a host capability is present.
    pub fn is_available(&self) -> bool {
        self.host.is_some()
    }

    /// Returns true if the host reports a selected key.
    pub async fn has_credential(&self) -> bool {
        match &self.host {
            Some(host) => host.has_selected_api_key().await,
            None => false,
        }
    }

    /// Runs the host's selection flow.
    ///
    /// A reported failure is followed by exactly one re-check, since a
    /// dismissed dialog may still have left a key selected.
    pub async fn request_credential_selection(&self) -> bool {
        let Some(host) = &self.host else {
            tracing::debug!("no credential host available");
            return false;
        };
        if host.open_select_key().await {
            return true;
        }
        let selected = host.has_selected_api_key().await;
        tracing::debug!(selected, "re-checked key after unsuccessful selection");
        selected
    }
}

impl std::fmt::Debug for CredentialGateway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialGateway")
            .field("available", &self.is_available())
            .finish()
    }
}

/// Credential status as seen by the controller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CredentialState {
    /// A usable key is selected.
    pub has_key: bool,
    /// The selection prompt is open.
    pub awaiting_selection: bool,
}

/// Shared slot holding the current API key.
///
/// Clones share the same slot, so a key stored by a host is seen by the
/// generation client on its next call.
#[derive(Clone, Default)]
pub struct ApiKeySlot {
    inner: Arc<RwLock<Option<String>>>,
}

impl ApiKeySlot {
    /// Creates an empty slot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a slot holding `key`.
    pub fn with_key(key: impl Into<String>) -> Self {
        let slot = Self::new();
        slot.set(key);
        slot
    }

    /// Creates a slot seeded from [`API_KEY_ENV_VARS`].
    pub fn from_env() -> Self {
        let slot = Self::new();
        if let Some(key) = API_KEY_ENV_VARS
            .iter()
            .filter_map(|name| std::env::var(name).ok())
            .find(|value| !value.trim().is_empty())
        {
            slot.set(key);
        }
        slot
    }

    /// Returns the stored key, if any.
    pub fn get(&self) -> Option<String> {
        self.inner
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }

    /// Stores `key`. A blank key clears the slot.
    pub fn set(&self, key: impl Into<String>) {
        let key = key.into();
        let key = key.trim();
        let value = (!key.is_empty()).then(|| key.to_string());
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = value;
    }

    /// Removes the stored key.
    pub fn clear(&self) {
        *self
            .inner
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner()) = None;
    }

    /// Returns true if a key is stored.
    pub fn is_set(&self) -> bool {
        self.get().is_some()
    }
}

impl std::fmt::Debug for ApiKeySlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiKeySlot")
            .field("set", &self.is_set())
            .finish()
    }
}

/// Source of a key typed in by the user.
#[async_trait]
pub trait KeyPrompt: Send + Sync {
    /// Asks for a key. `None` means the user cancelled.
    async fn prompt_for_key(&self) -> Option<String>;
}

/// [`CredentialHost`] that stores prompted keys in an [`ApiKeySlot`].
pub struct SlotCredentialHost<P> {
    slot: ApiKeySlot,
    prompt: P,
}

impl<P: KeyPrompt> SlotCredentialHost<P> {
    /// Creates a host writing to `slot` and asking `prompt` for new keys.
    pub fn new(slot: ApiKeySlot, prompt: P) -> Self {
        Self { slot, prompt }
    }

    /// Returns the slot this host writes to.
    pub fn slot(&self) -> &ApiKeySlot {
        &self.slot
    }
}

#[async_trait]
impl<P: KeyPrompt> CredentialHost for SlotCredentialHost<P> {
    async fn has_selected_api_key(&self) -> bool {
        self.slot.is_set()
    }

    async fn open_select_key(&self) -> bool {
        match self.prompt.prompt_for_key().await {
            Some(key) if !key.trim().is_empty() => {
                self.slot.set(key);
                true
            }
            _ => false,
        }
    }
}
