//! Base configuration: the defaults table plus host-supplied definitions.
//!
//! Configuration is an explicit immutable value constructed once at
//! startup. [`CspConfig::resolve`] merges the defaults table with the raw
//! host definitions (folding the legacy layer in first) and freezes the
//! result into a [`ResolvedCsp`] that is safe to share across calls.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::directive::Directive;
use crate::error::{CspError, Result};
use crate::legacy::{self, LegacySettings};
use crate::policy::{NamedPolicies, PolicyDefinition, PolicyInput};
use crate::value::{DirectiveValue, RawValue};

/// A raw policy definition keyed by directive name (canonical or keyword
/// spelling). A `None` value marks the directive explicitly unset.
pub type RawPolicy = BTreeMap<String, Option<RawValue>>;

/// CSP configuration as supplied by the host application.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CspConfig {
    /// Names of the policies to emit, in emission order.
    pub policies: Vec<String>,

    /// Structured policy definitions, merged over the defaults table.
    pub definitions: BTreeMap<String, RawPolicy>,

    /// Policy cloned when an update delta references a name absent from
    /// the base configuration. `None` starts such appends from an empty
    /// policy.
    pub update_template: Option<String>,
}

impl Default for CspConfig {
    fn default() -> Self {
        Self {
            policies: vec!["default".to_string()],
            definitions: BTreeMap::new(),
            update_template: Some("default".to_string()),
        }
    }
}

impl CspConfig {
    /// Parses a configuration from JSON.
    pub fn from_json_str(content: &str) -> Result<Self> {
        serde_json::from_str(content).map_err(|e| CspError::Parse(format!("JSON: {e}")))
    }

    /// Parses a configuration from TOML.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| CspError::Parse(format!("TOML: {e}")))
    }

    /// Resolves the configuration into an immutable base ready for
    /// composition.
    ///
    /// The legacy snapshot, when supplied, is folded into the `default`
    /// definition before the defaults merge (see [`legacy::reconcile`] for
    /// the precedence rules). Every name in `policies` must resolve to a
    /// definition.
    pub fn resolve(
        &self,
        legacy_settings: Option<&LegacySettings>,
        defer_to_legacy: bool,
    ) -> Result<ResolvedCsp> {
        let mut custom = NamedPolicies::new();
        for (name, raw_policy) in &self.definitions {
            let mut policy = PolicyDefinition::new();
            for (key, raw) in raw_policy {
                policy.set_raw(key, raw.clone())?;
            }
            custom.insert(name.clone(), policy);
        }

        if let Some(snapshot) = legacy_settings {
            legacy::reconcile(&mut custom, snapshot, defer_to_legacy)?;
        }

        let mut definitions = NamedPolicies::new();
        definitions.insert("default", default_policy());
        for (name, policy) in custom.iter() {
            let merged = definitions.entry_or_default(name);
            for (directive, value) in policy.iter() {
                merged.set(directive, value.clone());
            }
        }

        let mut base = NamedPolicies::new();
        for name in &self.policies {
            let policy = definitions
                .get(name)
                .ok_or_else(|| CspError::PolicyNotFound(name.clone()))?;
            base.insert(name.clone(), policy.clone());
        }

        Ok(ResolvedCsp {
            base,
            update_template: self.update_template.clone(),
        })
    }
}

/// The fully merged base configuration. Immutable; reusable across any
/// number of composition calls.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCsp {
    base: NamedPolicies,
    update_template: Option<String>,
}

impl ResolvedCsp {
    /// Wraps an already-normalized collection, for callers that construct
    /// their base programmatically.
    pub fn from_policies(base: NamedPolicies, update_template: Option<String>) -> Self {
        Self {
            base,
            update_template,
        }
    }

    /// Wraps a caller-supplied base: either one flat policy (implicitly
    /// named `default`) or a full named collection. The append template
    /// keeps its configured default.
    pub fn from_input(input: impl Into<PolicyInput>) -> Self {
        Self {
            base: input.into().into_named(),
            update_template: Some("default".to_string()),
        }
    }

    pub fn base(&self) -> &NamedPolicies {
        &self.base
    }

    pub fn update_template(&self) -> Option<&str> {
        self.update_template.as_deref()
    }
}

/// The defaults table for the `default` policy: every registry member
/// present, `default-src 'self'`, flag directives off, reports routed to
/// the enforcing header, nonce placed in `default-src`.
pub fn default_policy() -> PolicyDefinition {
    let mut policy = PolicyDefinition::new();
    for directive in Directive::ALL {
        policy.set(directive, DirectiveValue::Unset);
    }
    policy.set(
        Directive::DefaultSrc,
        DirectiveValue::Sources(vec!["'self'".to_string()]),
    );
    policy.set(Directive::UpgradeInsecureRequests, DirectiveValue::Flag(false));
    policy.set(Directive::BlockAllMixedContent, DirectiveValue::Flag(false));
    policy.set(Directive::ReportOnly, DirectiveValue::Flag(false));
    policy.set(
        Directive::IncludeNonceIn,
        DirectiveValue::NonceTargets(vec![Directive::DefaultSrc]),
    );
    policy
}
