//! # csp-policy
//!
//! Content-Security-Policy composition and header building.
//!
//! The crate turns a set of named policy definitions plus layered
//! overrides into final header values:
//!
//! - **Compose** - merge a base configuration with replace, update, and
//!   append deltas across any number of named policies.
//! - **Compile** - serialize each composed policy into header syntax,
//!   with report-only routing and per-response nonce injection.
//! - **Reconcile** - fold deprecated flat settings (`CSP_DEFAULT_SRC`)
//!   into structured definitions with a deprecation diagnostic.
//! - **Render** - build inline `<script>` elements with deterministic
//!   attribute formatting, as a companion to the nonce facility.
//!
//! The core is pure: no argument is ever mutated (legacy reconciliation
//! at configuration-load time is the one documented exception), so a
//! resolved configuration can be shared across concurrent calls. Applying
//! the returned `(value, report_only)` pairs to a response is the
//! caller's job; an adapter must not overwrite a header variant already
//! present on the outgoing response.
//!
//! # Example
//!
//! ```
//! use csp_policy::{build_policy, CspConfig, Directive, PolicyDefinition, PolicyInput};
//!
//! let config = CspConfig::default().resolve(None, false).unwrap();
//!
//! let headers = build_policy(&config, None, None, None, None).unwrap();
//! assert_eq!(headers[0].value, "default-src 'self'");
//! assert!(!headers[0].report_only);
//!
//! // Append to the default policy and inject a nonce.
//! let update = PolicyInput::from(
//!     PolicyDefinition::new()
//!         .sources(Directive::ScriptSrc, ["'self'"])
//!         .include_nonce_in([Directive::ScriptSrc]),
//! );
//! let headers = build_policy(&config, Some(&update), None, Some("r4nd0m"), None).unwrap();
//! assert_eq!(
//!     headers[0].value,
//!     "default-src 'self'; script-src 'self' 'nonce-r4nd0m'"
//! );
//! ```

pub mod compile;
pub mod compose;
pub mod config;
pub mod directive;
pub mod error;
pub mod legacy;
pub mod policy;
pub mod script;
pub mod value;

pub use compile::{CSP_HEADER, CSP_REPORT_ONLY_HEADER, CspHeader, compile as compile_policy};
pub use compose::{OrderKey, compose};
pub use config::{CspConfig, RawPolicy, ResolvedCsp, default_policy};
pub use directive::{Directive, DirectiveKind, directive_to_setting, setting_to_directive};
pub use error::{CspError, Result};
pub use legacy::{LegacySettings, reconcile};
pub use policy::{
    CounterNamer, NamedPolicies, PolicyDefinition, PolicyInput, PolicyNamer,
};
pub use script::{ScriptAttrs, build_script_tag};
pub use value::{DirectiveValue, RawValue, normalize};

/// Builds the final header values from a resolved base configuration and
/// the caller's deltas.
///
/// `update` and `replace` accept either a flat policy (implicitly named
/// `default`) or a full named collection. The returned entries follow the
/// composed emission order (base policies first, then appends, unless
/// `order` says otherwise); each carries the routing flag for its header
/// variant. No argument is mutated.
pub fn build_policy(
    config: &ResolvedCsp,
    update: Option<&PolicyInput>,
    replace: Option<&PolicyInput>,
    nonce: Option<&str>,
    order: Option<&[OrderKey]>,
) -> Result<Vec<CspHeader>> {
    let update = update.map(PolicyInput::to_named).unwrap_or_default();
    let replace = replace.map(PolicyInput::to_named).unwrap_or_default();

    let composed = compose::compose(
        config.base(),
        &update,
        &replace,
        config.update_template(),
        order,
    )?;
    Ok(composed
        .iter()
        .map(|(_, policy)| compile::compile(policy, nonce))
        .collect())
}
