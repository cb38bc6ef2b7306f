//! Policy composition: merging the base configuration with caller deltas.
//!
//! Three independent override channels apply in a fixed order per named
//! policy: replace deltas supersede base values outright, update deltas
//! append to source lists (and overwrite flag or pseudo values), and
//! update keys naming policies absent from the base append entirely new
//! policies, optionally cloned from a template.
//!
//! Nothing here mutates an argument. The base configuration commonly
//! originates from long-lived host configuration and must stay safe to
//! reuse across calls, so every merge step allocates fresh mappings.

use crate::error::{CspError, Result};
use crate::policy::{NamedPolicies, PolicyDefinition};
use crate::value::DirectiveValue;

/// One entry of an explicit emission order: a composed policy selected by
/// name or by position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderKey {
    Name(String),
    Index(usize),
}

impl From<&str> for OrderKey {
    fn from(name: &str) -> Self {
        OrderKey::Name(name.to_string())
    }
}

impl From<String> for OrderKey {
    fn from(name: String) -> Self {
        OrderKey::Name(name)
    }
}

impl From<usize> for OrderKey {
    fn from(index: usize) -> Self {
        OrderKey::Index(index)
    }
}

/// Merges `base` with the caller's deltas into the final ordered list of
/// normalized policies.
///
/// Without an explicit `order`, emission order is the base policies in
/// iteration order followed by appended policies in the order their keys
/// first appear in `update`. An explicit order selects exactly the given
/// sequence; an unresolvable name or index is an error, never a silent
/// skip.
pub fn compose(
    base: &NamedPolicies,
    update: &NamedPolicies,
    replace: &NamedPolicies,
    template: Option<&str>,
    order: Option<&[OrderKey]>,
) -> Result<Vec<(String, PolicyDefinition)>> {
    let mut composed = NamedPolicies::new();
    for (name, policy) in base.iter() {
        let mut merged = replace_policy(policy, replace.get(name));
        if let Some(delta) = update.get(name) {
            update_policy(&mut merged, delta);
        }
        composed.insert(name, merged);
    }
    append_policies(&mut composed, update, base, template)?;

    match order {
        Some(order) => reorder(&composed, order),
        None => Ok(composed.into_entries()),
    }
}

/// Replace pass: for every directive in either the base policy or its
/// replace delta, the delta wins where present. A chosen value of `Unset`
/// drops the directive. Values are cloned, never aliased.
fn replace_policy(base: &PolicyDefinition, replace: Option<&PolicyDefinition>) -> PolicyDefinition {
    let empty = PolicyDefinition::new();
    let replace = replace.unwrap_or(&empty);

    let mut merged = PolicyDefinition::new();
    for (directive, value) in base.iter() {
        let chosen = replace.get(directive).unwrap_or(value);
        if !chosen.is_unset() {
            merged.set(directive, chosen.clone());
        }
    }
    for (directive, value) in replace.iter() {
        if !base.contains(directive) && !value.is_unset() {
            merged.set(directive, value.clone());
        }
    }
    merged
}

/// Update pass: source lists concatenate after any existing value; flag
/// and pseudo values overwrite; `Unset` entries are ignored.
fn update_policy(policy: &mut PolicyDefinition, delta: &PolicyDefinition) {
    for (directive, value) in delta.iter() {
        match value {
            DirectiveValue::Unset => {}
            DirectiveValue::Sources(tokens) => match policy.get(directive) {
                Some(DirectiveValue::Sources(existing)) => {
                    let mut combined = existing.clone();
                    combined.extend(tokens.iter().cloned());
                    policy.set(directive, DirectiveValue::Sources(combined));
                }
                _ => policy.set(directive, DirectiveValue::Sources(tokens.clone())),
            },
            other => policy.set(directive, other.clone()),
        }
    }
}

/// Append pass: every update key absent from the composed collection
/// produces a new policy. The starting point is an empty policy (name
/// unknown, delta empty), a clone of the same-named base policy, or a
/// clone of the template policy. Templates resolve against the base
/// configuration only; a template name that does not resolve is an error
/// rather than a silent empty policy.
fn append_policies(
    composed: &mut NamedPolicies,
    update: &NamedPolicies,
    base: &NamedPolicies,
    template: Option<&str>,
) -> Result<()> {
    for (name, delta) in update.iter() {
        if composed.contains(name) {
            continue;
        }
        let mut policy = if !base.contains(name) && delta.is_empty() {
            PolicyDefinition::new()
        } else if let Some(existing) = base.get(name) {
            existing.clone()
        } else {
            match template {
                None => PolicyDefinition::new(),
                Some(template_name) => base
                    .get(template_name)
                    .cloned()
                    .ok_or_else(|| CspError::UnknownTemplate(template_name.to_string()))?,
            }
        };
        update_policy(&mut policy, delta);
        composed.insert(name, policy);
    }
    Ok(())
}

fn reorder(
    composed: &NamedPolicies,
    order: &[OrderKey],
) -> Result<Vec<(String, PolicyDefinition)>> {
    let mut selected = Vec::with_capacity(order.len());
    for key in order {
        let (name, policy) = match key {
            OrderKey::Name(name) => composed
                .get_entry(name)
                .ok_or_else(|| CspError::PolicyNotFound(name.clone()))?,
            OrderKey::Index(index) => composed
                .at(*index)
                .ok_or(CspError::IndexOutOfRange(*index))?,
        };
        selected.push((name.to_string(), policy.clone()));
    }
    Ok(selected)
}
