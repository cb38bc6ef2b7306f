//! Serialization of one composed policy into header-syntax text.

use tracing::warn;

use crate::directive::Directive;
use crate::policy::PolicyDefinition;
use crate::value::DirectiveValue;

/// The enforcing header name.
pub const CSP_HEADER: &str = "Content-Security-Policy";

/// The report-only variant.
pub const CSP_REPORT_ONLY_HEADER: &str = "Content-Security-Policy-Report-Only";

/// One compiled policy, ready to be applied to a response by the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CspHeader {
    /// The serialized policy.
    pub value: String,
    /// Routes the value to the report-only header variant.
    pub report_only: bool,
}

impl CspHeader {
    /// The header name this value belongs under.
    pub fn header_name(&self) -> &'static str {
        if self.report_only {
            CSP_REPORT_ONLY_HEADER
        } else {
            CSP_HEADER
        }
    }
}

/// Serializes one composed policy.
///
/// The pseudo-directives are extracted first: `report_only` routes the
/// result, `report-uri` is re-inserted after the directive loop (so it
/// always renders last), and `include_nonce_in` names the directives that
/// receive the nonce (defaulting to `default-src`). Flag-true directives
/// render as the bare name, flag-false directives are omitted, source
/// lists are space-joined.
///
/// With a nonce, each listed directive gets a `'nonce-<value>'` token
/// appended to its rendered value, or a fresh entry when it has none. A
/// directive listed more than once receives the token once per listing.
pub fn compile(policy: &PolicyDefinition, nonce: Option<&str>) -> CspHeader {
    let report_uri = match policy.get(Directive::ReportUri) {
        Some(DirectiveValue::Sources(tokens)) => tokens.clone(),
        _ => Vec::new(),
    };
    let report_only = matches!(
        policy.get(Directive::ReportOnly),
        Some(DirectiveValue::Flag(true))
    );
    let nonce_targets = match policy.get(Directive::IncludeNonceIn) {
        Some(DirectiveValue::NonceTargets(targets)) => targets.clone(),
        _ => vec![Directive::DefaultSrc],
    };

    let mut parts: Vec<(Directive, String)> = Vec::new();
    for (directive, value) in policy.iter() {
        if matches!(
            directive,
            Directive::ReportUri | Directive::ReportOnly | Directive::IncludeNonceIn
        ) {
            continue;
        }
        if directive == Directive::ChildSrc && !value.is_unset() {
            warn!("child-src is deprecated in CSP v3; use frame-src and worker-src");
        }
        match value {
            DirectiveValue::Flag(true) => parts.push((directive, String::new())),
            DirectiveValue::Flag(false) | DirectiveValue::Unset => {}
            DirectiveValue::Sources(tokens) => parts.push((directive, tokens.join(" "))),
            // Nonce targets only ever appear under include_nonce_in.
            DirectiveValue::NonceTargets(_) => {}
        }
    }

    if !report_uri.is_empty() {
        parts.push((Directive::ReportUri, report_uri.join(" ")));
    }

    if let Some(nonce) = nonce.filter(|n| !n.is_empty()) {
        for target in nonce_targets {
            match parts.iter_mut().find(|(directive, _)| *directive == target) {
                Some((_, rendered)) => {
                    *rendered = format!("{rendered} 'nonce-{nonce}'").trim().to_string();
                }
                None => parts.push((target, format!("'nonce-{nonce}'"))),
            }
        }
    }

    let value = parts
        .iter()
        .map(|(directive, rendered)| {
            if rendered.is_empty() {
                directive.as_str().to_string()
            } else {
                format!("{} {}", directive.as_str(), rendered)
            }
        })
        .collect::<Vec<_>>()
        .join("; ");

    CspHeader { value, report_only }
}
