//! Effective rule settings and their per-resource cache.
//!
//! Settings come from the editor as a loosely shaped JSON object under the
//! `japanese-proofreading` section. [`SettingsPayload`] gives that object a
//! typed shape where every field is optional; [`EffectiveSettings::from_payload`]
//! layers what is present over the catalog defaults.

use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use eyre::Result;
use serde::Deserialize;
use serde_json::Value;
use tokio::sync::{Mutex, OnceCell, RwLock};
use tracing::{debug, warn};

use crate::catalog::{RuleCatalog, RuleDescriptor};

/// Configuration section requested from the editor.
pub const SETTINGS_SECTION: &str = "japanese-proofreading";

/// Default cap on diagnostics per document.
pub const DEFAULT_MAX_PROBLEMS: usize = 1000;

/// Settings payload as sent by the editor.
///
/// Unknown keys are ignored. A field with the wrong JSON type makes the whole
/// payload malformed.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPayload {
    #[serde(default)]
    pub max_number_of_problems: Option<usize>,
    /// Display name -> enabled. Values are judged by truthiness.
    #[serde(default)]
    pub textlint: Option<BTreeMap<String, Value>>,
}

impl SettingsPayload {
    /// Decode a raw payload. `None` means absent or malformed.
    pub fn decode(raw: &Value) -> Option<Self> {
        match serde_json::from_value(raw.clone()) {
            Ok(payload) => Some(payload),
            Err(e) => {
                if !raw.is_null() {
                    warn!("Ignoring malformed {SETTINGS_SECTION} settings: {e}");
                }
                None
            }
        }
    }
}

/// Loose boolean reading of a settings value. `null` counts as "not set".
fn truthiness(value: &Value) -> Option<bool> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(*b),
        Value::Number(n) => Some(n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan())),
        Value::String(s) => Some(!s.is_empty()),
        Value::Array(_) | Value::Object(_) => Some(true),
    }
}

/// Resolved settings for one configuration scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EffectiveSettings {
    pub max_problems: usize,
    pub enabled_by_display_name: HashMap<String, bool>,
}

impl EffectiveSettings {
    /// Settings built purely from the catalog defaults.
    pub fn defaults(catalog: &RuleCatalog) -> Self {
        let enabled_by_display_name = catalog
            .iter()
            .map(|rule| (rule.display_name.clone(), rule.default_enabled))
            .collect();
        Self {
            max_problems: DEFAULT_MAX_PROBLEMS,
            enabled_by_display_name,
        }
    }

    /// Merge a decoded payload over `defaults`. Keys absent from the payload
    /// keep their default value; present keys override it.
    pub fn merged(defaults: &Self, payload: &SettingsPayload) -> Self {
        let mut settings = defaults.clone();
        if let Some(max) = payload.max_number_of_problems {
            settings.max_problems = max;
        }
        if let Some(rules) = &payload.textlint {
            for (name, value) in rules {
                if let Some(enabled) = truthiness(value) {
                    settings.enabled_by_display_name.insert(name.clone(), enabled);
                }
            }
        }
        settings
    }

    /// Merge a raw JSON payload over `defaults`, falling back to `defaults`
    /// wholesale when the payload is absent or malformed.
    pub fn from_payload(defaults: &Self, raw: Option<&Value>) -> Self {
        match raw.and_then(SettingsPayload::decode) {
            Some(payload) => Self::merged(defaults, &payload),
            None => defaults.clone(),
        }
    }

    /// Whether `rule` is enabled, falling back to its own default when the map
    /// has no entry for its display name.
    pub fn is_enabled(&self, rule: &RuleDescriptor) -> bool {
        self.enabled_by_display_name
            .get(&rule.display_name)
            .copied()
            .unwrap_or(rule.default_enabled)
    }
}

type CacheSlot = Arc<OnceCell<Arc<EffectiveSettings>>>;

/// Derives the effective settings for each open resource.
///
/// With scoped configuration every resource gets its own cached entry,
/// fetched from the editor on first use. Without it a single global instance
/// is shared and replaced on each configuration change.
pub struct SettingsResolver {
    defaults: Arc<EffectiveSettings>,
    scoped: AtomicBool,
    global: RwLock<Arc<EffectiveSettings>>,
    cache: Mutex<HashMap<String, CacheSlot>>,
}

impl SettingsResolver {
    pub fn new(catalog: &RuleCatalog) -> Self {
        let defaults = Arc::new(EffectiveSettings::defaults(catalog));
        Self {
            global: RwLock::new(defaults.clone()),
            defaults,
            scoped: AtomicBool::new(false),
            cache: Mutex::new(HashMap::new()),
        }
    }

    pub fn default_settings(&self) -> Arc<EffectiveSettings> {
        self.defaults.clone()
    }

    /// Record whether the editor can answer per-resource configuration requests.
    pub fn set_scoped(&self, scoped: bool) {
        self.scoped.store(scoped, Ordering::SeqCst);
    }

    pub fn is_scoped(&self) -> bool {
        self.scoped.load(Ordering::SeqCst)
    }

    /// Settings for `resource`.
    ///
    /// `fetch` is only called on a cache miss in scoped mode. Concurrent
    /// resolutions of the same resource share one fetch. A failed fetch yields
    /// the defaults for this call and leaves nothing cached.
    pub async fn resolve<F, Fut>(&self, resource: &str, fetch: F) -> Arc<EffectiveSettings>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Value>>,
    {
        if !self.is_scoped() {
            return self.global.read().await.clone();
        }

        let slot = {
            let mut cache = self.cache.lock().await;
            cache.entry(resource.to_string()).or_default().clone()
        };

        let defaults = &self.defaults;
        let fetched = slot
            .get_or_try_init(|| async move {
                let raw = fetch().await?;
                debug!(resource, "Fetched settings");
                Ok::<_, eyre::Report>(Arc::new(EffectiveSettings::from_payload(
                    defaults,
                    Some(&raw),
                )))
            })
            .await;

        match fetched {
            Ok(settings) => settings.clone(),
            Err(e) => {
                warn!(resource, "Failed to fetch settings, using defaults: {e:#}");
                self.defaults.clone()
            }
        }
    }

    /// Drop every cached per-resource entry.
    pub async fn invalidate_all(&self) {
        self.cache.lock().await.clear();
    }

    /// Replace the global instance. Used when scoped configuration is unavailable.
    pub async fn apply_global_change(&self, raw: Option<&Value>) {
        let settings = EffectiveSettings::from_payload(&self.defaults, raw);
        *self.global.write().await = Arc::new(settings);
    }

    /// Evict the cached entry of a closed resource. A fetch still in flight
    /// for it completes into a detached slot and is discarded.
    pub async fn on_resource_closed(&self, resource: &str) {
        self.cache.lock().await.remove(resource);
    }

    pub async fn cached_resources(&self) -> usize {
        self.cache.lock().await.len()
    }
}
