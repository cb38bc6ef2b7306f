//! Backward compatibility with flat, directive-per-setting configuration
//! (`CSP_DEFAULT_SRC = "'self'"` and friends).
//!
//! Reconciliation is the one place in the crate that mutates shared data:
//! it folds the flat snapshot into the `default` policy of a mutable
//! definitions collection. It runs once at configuration-load time, never
//! per request.

use tracing::warn;

use crate::directive::setting_to_directive;
use crate::error::Result;
use crate::policy::NamedPolicies;
use crate::value::{RawValue, normalize};

pub const DEFAULT_SETTING_PREFIX: &str = "CSP_";

/// A snapshot of flat legacy settings, already dereferenced by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct LegacySettings {
    prefix: String,
    entries: Vec<(String, RawValue)>,
}

impl Default for LegacySettings {
    fn default() -> Self {
        Self::new()
    }
}

impl LegacySettings {
    pub fn new() -> Self {
        Self::with_prefix(DEFAULT_SETTING_PREFIX)
    }

    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            entries: Vec::new(),
        }
    }

    pub fn set(mut self, name: impl Into<String>, value: impl Into<RawValue>) -> Self {
        self.entries.push((name.into(), value.into()));
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &RawValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

/// Folds legacy settings into the `default` policy of `definitions`.
///
/// Any matching settings produce a single deprecation diagnostic listing
/// all of them. With `defer_to_legacy` the flat values overwrite the
/// structured ones; otherwise they apply only where the structured
/// definition has no entry for the directive. A setting name that does not
/// map into the registry fails with `UnknownDirective`.
pub fn reconcile(
    definitions: &mut NamedPolicies,
    snapshot: &LegacySettings,
    defer_to_legacy: bool,
) -> Result<()> {
    if snapshot.is_empty() {
        return Ok(());
    }

    let names: Vec<&str> = snapshot.iter().map(|(name, _)| name).collect();
    warn!(
        settings = %names.join(", "),
        "legacy CSP settings are deprecated; use structured policy definitions"
    );

    let policy = definitions.entry_or_default("default");
    for (name, raw) in snapshot.iter() {
        let directive = setting_to_directive(name, snapshot.prefix())?;
        if defer_to_legacy || !policy.contains(directive) {
            let value = normalize(directive, Some(raw))?;
            policy.set(directive, value);
        }
    }
    Ok(())
}
