//! Policy definitions and named policy collections.
//!
//! Both maps are insertion-ordered and Vec-backed: the directive registry
//! is small and closed, and named collections rarely hold more than a
//! handful of policies, so linear lookup beats hashing here and insertion
//! order falls out for free.

use crate::directive::Directive;
use crate::error::{CspError, Result};
use crate::value::{DirectiveValue, RawValue, normalize};

/// A single policy: an insertion-ordered mapping from directive to value.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolicyDefinition {
    entries: Vec<(Directive, DirectiveValue)>,
}

impl PolicyDefinition {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, directive: Directive) -> bool {
        self.entries.iter().any(|(d, _)| *d == directive)
    }

    pub fn get(&self, directive: Directive) -> Option<&DirectiveValue> {
        self.entries
            .iter()
            .find(|(d, _)| *d == directive)
            .map(|(_, value)| value)
    }

    /// Inserts or overwrites, keeping the first-insertion position.
    pub fn set(&mut self, directive: Directive, value: DirectiveValue) {
        match self.entries.iter_mut().find(|(d, _)| *d == directive) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((directive, value)),
        }
    }

    pub fn remove(&mut self, directive: Directive) -> Option<DirectiveValue> {
        let position = self.entries.iter().position(|(d, _)| *d == directive)?;
        Some(self.entries.remove(position).1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (Directive, &DirectiveValue)> {
        self.entries.iter().map(|(d, v)| (*d, v))
    }

    /// Sets a source list.
    pub fn sources<I, S>(mut self, directive: Directive, tokens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let tokens = tokens.into_iter().map(Into::into).collect();
        self.set(directive, DirectiveValue::Sources(tokens));
        self
    }

    /// Sets a boolean flag directive.
    pub fn flag(mut self, directive: Directive, value: bool) -> Self {
        self.set(directive, DirectiveValue::Flag(value));
        self
    }

    /// Routes this policy to the report-only header variant.
    pub fn report_only(mut self, value: bool) -> Self {
        self.set(Directive::ReportOnly, DirectiveValue::Flag(value));
        self
    }

    /// Sets the violation report endpoints.
    pub fn report_uri<I, S>(self, uris: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.sources(Directive::ReportUri, uris)
    }

    /// Sets the directives that receive the nonce token at compile time.
    pub fn include_nonce_in<I>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = Directive>,
    {
        self.set(
            Directive::IncludeNonceIn,
            DirectiveValue::NonceTargets(targets.into_iter().collect()),
        );
        self
    }

    /// Inserts a raw entry under a canonical or keyword-style name,
    /// normalizing the value. Unknown names fail fast.
    pub fn set_raw(&mut self, name: &str, raw: Option<RawValue>) -> Result<()> {
        let directive = Directive::from_name(name)?;
        let value = normalize(directive, raw.as_ref())?;
        self.set(directive, value);
        Ok(())
    }
}

/// An insertion-ordered collection of named policies.
///
/// Insertion order is the default emission order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedPolicies {
    entries: Vec<(String, PolicyDefinition)>,
}

impl NamedPolicies {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.iter().any(|(n, _)| n == name)
    }

    pub fn get(&self, name: &str) -> Option<&PolicyDefinition> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, policy)| policy)
    }

    pub fn get_entry(&self, name: &str) -> Option<(&str, &PolicyDefinition)> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(n, policy)| (n.as_str(), policy))
    }

    /// Entry at a position in insertion order.
    pub fn at(&self, index: usize) -> Option<(&str, &PolicyDefinition)> {
        self.entries
            .get(index)
            .map(|(n, policy)| (n.as_str(), policy))
    }

    /// Inserts or overwrites, keeping the first-insertion position.
    pub fn insert(&mut self, name: impl Into<String>, policy: PolicyDefinition) {
        let name = name.into();
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = policy,
            None => self.entries.push((name, policy)),
        }
    }

    /// Inserts, failing on a name that is already present. Used when one
    /// call combines policies from two distinct definition sources.
    pub fn try_insert(&mut self, name: impl Into<String>, policy: PolicyDefinition) -> Result<()> {
        let name = name.into();
        if self.contains(&name) {
            return Err(CspError::DuplicatePolicy(name));
        }
        self.entries.push((name, policy));
        Ok(())
    }

    /// Inserts an unnamed policy under a name drawn from `namer`, returning
    /// the assigned name.
    pub fn insert_anonymous(
        &mut self,
        namer: &mut dyn PolicyNamer,
        policy: PolicyDefinition,
    ) -> String {
        let mut name = namer.next_name();
        while self.contains(&name) {
            name = namer.next_name();
        }
        self.entries.push((name.clone(), policy));
        name
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut PolicyDefinition> {
        self.entries
            .iter_mut()
            .find(|(n, _)| n == name)
            .map(|(_, policy)| policy)
    }

    /// Mutable access to the named policy, inserting an empty definition
    /// when the name is new.
    pub fn entry_or_default(&mut self, name: &str) -> &mut PolicyDefinition {
        let index = match self.entries.iter().position(|(n, _)| n == name) {
            Some(position) => position,
            None => {
                self.entries.push((name.to_string(), PolicyDefinition::new()));
                self.entries.len() - 1
            }
        };
        &mut self.entries[index].1
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PolicyDefinition)> {
        self.entries.iter().map(|(n, policy)| (n.as_str(), policy))
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn into_entries(self) -> Vec<(String, PolicyDefinition)> {
        self.entries
    }
}

/// Supplies names for policies submitted without one.
///
/// Injected rather than global so anonymous-policy naming stays
/// deterministic and scoped to a single composition call.
pub trait PolicyNamer {
    fn next_name(&mut self) -> String;
}

/// Counts up within one call: `policy-1`, `policy-2`, ...
#[derive(Debug, Default)]
pub struct CounterNamer {
    issued: usize,
}

impl CounterNamer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PolicyNamer for CounterNamer {
    fn next_name(&mut self) -> String {
        self.issued += 1;
        format!("policy-{}", self.issued)
    }
}

/// Caller input for configuration and deltas: either one flat policy
/// (implicitly named `default`) or a full named collection.
#[derive(Debug, Clone, PartialEq)]
pub enum PolicyInput {
    Single(PolicyDefinition),
    Named(NamedPolicies),
}

impl PolicyInput {
    /// Normalizes to a named collection; a flat policy lands under
    /// `default`.
    pub fn to_named(&self) -> NamedPolicies {
        match self {
            PolicyInput::Single(policy) => {
                let mut named = NamedPolicies::new();
                named.insert("default", policy.clone());
                named
            }
            PolicyInput::Named(named) => named.clone(),
        }
    }

    pub fn into_named(self) -> NamedPolicies {
        match self {
            PolicyInput::Single(policy) => {
                let mut named = NamedPolicies::new();
                named.insert("default", policy);
                named
            }
            PolicyInput::Named(named) => named,
        }
    }
}

impl From<PolicyDefinition> for PolicyInput {
    fn from(policy: PolicyDefinition) -> Self {
        PolicyInput::Single(policy)
    }
}

impl From<NamedPolicies> for PolicyInput {
    fn from(named: NamedPolicies) -> Self {
        PolicyInput::Named(named)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_definition_insertion_order() {
        let policy = PolicyDefinition::new()
            .sources(Directive::ScriptSrc, ["'self'"])
            .sources(Directive::ImgSrc, ["data:"])
            .sources(Directive::DefaultSrc, ["'none'"]);
        let order: Vec<Directive> = policy.iter().map(|(d, _)| d).collect();
        assert_eq!(
            order,
            vec![Directive::ScriptSrc, Directive::ImgSrc, Directive::DefaultSrc]
        );
    }

    #[test]
    fn test_set_overwrites_in_place() {
        let mut policy = PolicyDefinition::new()
            .sources(Directive::ScriptSrc, ["a"])
            .sources(Directive::ImgSrc, ["b"]);
        policy.set(Directive::ScriptSrc, DirectiveValue::Flag(true));
        let order: Vec<Directive> = policy.iter().map(|(d, _)| d).collect();
        assert_eq!(order, vec![Directive::ScriptSrc, Directive::ImgSrc]);
        assert_eq!(policy.get(Directive::ScriptSrc), Some(&DirectiveValue::Flag(true)));
    }

    #[test]
    fn test_set_raw_rejects_unknown_names() {
        let mut policy = PolicyDefinition::new();
        assert!(policy.set_raw("script-src", Some("'self'".into())).is_ok());
        assert!(policy.set_raw("not-a-directive", Some("'self'".into())).is_err());
    }

    #[test]
    fn test_named_try_insert_conflict() {
        let mut named = NamedPolicies::new();
        named.try_insert("default", PolicyDefinition::new()).unwrap();
        let err = named
            .try_insert("default", PolicyDefinition::new())
            .unwrap_err();
        assert!(matches!(err, CspError::DuplicatePolicy(name) if name == "default"));
    }

    #[test]
    fn test_counter_namer_is_deterministic() {
        let mut namer = CounterNamer::new();
        let mut named = NamedPolicies::new();
        let first = named.insert_anonymous(&mut namer, PolicyDefinition::new());
        let second = named.insert_anonymous(&mut namer, PolicyDefinition::new());
        assert_eq!(first, "policy-1");
        assert_eq!(second, "policy-2");
        assert_eq!(named.names().collect::<Vec<_>>(), vec!["policy-1", "policy-2"]);
    }

    #[test]
    fn test_single_input_lands_under_default() {
        let input = PolicyInput::from(
            PolicyDefinition::new().sources(Directive::DefaultSrc, ["'self'"]),
        );
        let named = input.to_named();
        assert!(named.contains("default"));
        assert_eq!(named.len(), 1);
    }
}
