//! Anonymous visitor identity.
//!
//! The identity is a short base-36 fingerprint derived from a few
//! environment signals. It is persisted under [`IDENTITY_KEY`] so it stays
//! stable across runs. It is low-entropy and never treated as a credential.

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock};

use chrono::{Local, Offset};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::StoreError;
use crate::persistence::{default_config_dir, read_text, write_text_secure};

/// Storage key (and file name) of the persisted identity.
pub const IDENTITY_KEY: &str = "vladfm_fp";

// ============================================================================
// Identity
// ============================================================================

/// A visitor fingerprint such as `"1x9k2"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(String);

impl Identity {
    /// Wraps a stored value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Derives a fresh identity from environment signals.
    pub fn derive(signals: &EnvironmentSignals) -> Self {
        Self(fingerprint(&signals.raw()))
    }

    /// The fingerprint string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Identity {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Hashes `raw` into a base-36 fingerprint.
///
/// Runs `hash * 31 + unit` over the UTF-16 code units with signed 32-bit
/// wrap-around, then renders the magnitude in lowercase base 36.
pub fn fingerprint(raw: &str) -> String {
    let mut hash: i32 = 0;
    for unit in raw.encode_utf16() {
        hash = (hash << 5).wrapping_sub(hash).wrapping_add(i32::from(unit));
    }
    to_base36(hash.unsigned_abs())
}

fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

// ============================================================================
// Environment Signals
// ============================================================================

/// Signals the fingerprint is derived from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSignals {
    /// Client user agent.
    pub user_agent: String,
    /// BCP 47-ish locale, e.g. `en-US`.
    pub locale: String,
    /// Screen (terminal) width.
    pub screen_width: u32,
    /// Screen (terminal) height.
    pub screen_height: u32,
    /// Color depth in bits.
    pub color_depth: u32,
    /// Minutes behind UTC (negative east of Greenwich).
    pub timezone_offset: i32,
}

impl EnvironmentSignals {
    /// Collects signals from the running process.
    pub fn from_env() -> Self {
        let locale = std::env::var("LC_ALL")
            .ok()
            .filter(|v| !v.is_empty())
            .or_else(|| std::env::var("LANG").ok())
            .map_or_else(|| "en-US".to_string(), |v| normalize_locale(&v));

        let offset_secs = Local::now().offset().fix().local_minus_utc();

        Self {
            user_agent: format!(
                "vladfm/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                std::env::consts::OS,
                std::env::consts::ARCH
            ),
            locale,
            screen_width: env_dimension("COLUMNS", 80),
            screen_height: env_dimension("LINES", 24),
            color_depth: 24,
            timezone_offset: -offset_secs / 60,
        }
    }

    /// The signal string that gets hashed.
    pub fn raw(&self) -> String {
        format!(
            "{}|{}|{}|{}|{}|{}",
            self.user_agent,
            self.locale,
            self.screen_width,
            self.screen_height,
            self.color_depth,
            self.timezone_offset
        )
    }
}

fn normalize_locale(value: &str) -> String {
    // en_US.UTF-8@euro -> en-US
    let base = value.split(['.', '@']).next().unwrap_or_default();
    if base.is_empty() || base == "C" || base == "POSIX" {
        return "en-US".to_string();
    }
    base.replace('_', "-")
}

fn env_dimension(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .filter(|v| *v > 0)
        .unwrap_or(default)
}

// ============================================================================
// Storage
// ============================================================================

/// Durable key/value storage for the identity.
pub trait IdentityStorage: Send + Sync {
    /// Reads a value. Absent keys are `Ok(None)`.
    fn load(&self, key: &str) -> Result<Option<String>, StoreError>;

    /// Writes a value.
    fn save(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Stores each key as a plain-text file in a directory.
#[derive(Debug, Clone)]
pub struct FileIdentityStorage {
    dir: PathBuf,
}

impl FileIdentityStorage {
    /// Storage rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Storage in the default config directory.
    pub fn default_location() -> Self {
        Self::new(default_config_dir())
    }

    /// Directory the files live in.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }
}

impl IdentityStorage for FileIdentityStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        read_text(&self.path(key))
            .map_err(|e| StoreError::Storage(format!("cannot read {key}: {e}")))
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        write_text_secure(&self.path(key), value)
            .map_err(|e| StoreError::Storage(format!("cannot write {key}: {e}")))
    }
}

/// Volatile storage. Clones share the same map.
#[derive(Debug, Clone, Default)]
pub struct MemoryIdentityStorage {
    values: Arc<Mutex<HashMap<String, String>>>,
}

impl MemoryIdentityStorage {
    /// Creates empty storage.
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdentityStorage for MemoryIdentityStorage {
    fn load(&self, key: &str) -> Result<Option<String>, StoreError> {
        let values = self
            .values
            .lock()
            .map_err(|_| StoreError::Storage("identity map poisoned".into()))?;
        Ok(values.get(key).cloned())
    }

    fn save(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values
            .lock()
            .map_err(|_| StoreError::Storage("identity map poisoned".into()))?
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

// ============================================================================
// Identity Provider
// ============================================================================

/// Resolves the identity once and hands out the same value afterwards.
///
/// Storage failures never surface: a fresh identity is derived and kept in
/// memory for the provider's lifetime.
pub struct IdentityProvider {
    storage: Arc<dyn IdentityStorage>,
    signals: EnvironmentSignals,
    resolved: OnceLock<Identity>,
}

impl fmt::Debug for IdentityProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityProvider")
            .field("signals", &self.signals)
            .field("resolved", &self.resolved.get())
            .finish_non_exhaustive()
    }
}

impl IdentityProvider {
    /// Creates a provider over `storage` using the given signals.
    pub fn new(storage: Arc<dyn IdentityStorage>, signals: EnvironmentSignals) -> Self {
        Self {
            storage,
            signals,
            resolved: OnceLock::new(),
        }
    }

    /// Creates a provider over `storage` using the process environment.
    pub fn from_env(storage: Arc<dyn IdentityStorage>) -> Self {
        Self::new(storage, EnvironmentSignals::from_env())
    }

    /// The visitor identity. Stable for the provider's lifetime.
    pub fn identity(&self) -> Identity {
        self.resolved.get_or_init(|| self.resolve()).clone()
    }

    /// Signals a fresh identity would be derived from.
    pub fn signals(&self) -> &EnvironmentSignals {
        &self.signals
    }

    fn resolve(&self) -> Identity {
        match self.storage.load(IDENTITY_KEY) {
            Ok(Some(stored)) if !stored.trim().is_empty() => {
                debug!("Using stored identity");
                return Identity::new(stored.trim());
            }
            Ok(_) => debug!("No stored identity"),
            Err(e) => warn!(error = %e, "Identity storage unreadable, deriving a new identity"),
        }

        let fresh = Identity::derive(&self.signals);
        match self.storage.save(IDENTITY_KEY, fresh.as_str()) {
            Ok(()) => info!(identity = %fresh, "Created identity"),
            Err(e) => warn!(error = %e, "Identity not persisted, keeping it for this session"),
        }
        fresh
    }
}

// ============================================================================
// Tests
// ============================================================================
