//! The CSP directive registry.
//!
//! The set of valid directive names is closed. Every entry carries an
//! explicit kind tag: content directives hold source lists or flags and are
//! emitted into the header verbatim, while pseudo-directives are control
//! values consumed by the compiler (report-only routing, nonce placement).

use std::fmt;

use crate::error::{CspError, Result};

/// Whether a directive is emitted into the header or consumed as a control
/// value by the compiler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirectiveKind {
    Content,
    Pseudo,
}

/// A CSP directive name.
///
/// Canonical names are hyphenated for content directives (`script-src`)
/// and underscored for pseudo-directives (`report_only`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Directive {
    // Fetch directives
    ChildSrc,
    ConnectSrc,
    DefaultSrc,
    ScriptSrc,
    ScriptSrcAttr,
    ScriptSrcElem,
    ObjectSrc,
    StyleSrc,
    StyleSrcAttr,
    StyleSrcElem,
    FontSrc,
    FrameSrc,
    ImgSrc,
    ManifestSrc,
    MediaSrc,
    PrefetchSrc,
    WorkerSrc,
    // Document directives
    BaseUri,
    PluginTypes,
    Sandbox,
    // Navigation directives
    FormAction,
    FrameAncestors,
    NavigateTo,
    // Reporting directives
    ReportUri,
    ReportTo,
    RequireSriFor,
    // Other directives
    UpgradeInsecureRequests,
    BlockAllMixedContent,
    // Pseudo directives
    ReportOnly,
    IncludeNonceIn,
}

impl Directive {
    /// Every registry member, in canonical table order.
    pub const ALL: [Directive; 30] = [
        Directive::ChildSrc,
        Directive::ConnectSrc,
        Directive::DefaultSrc,
        Directive::ScriptSrc,
        Directive::ScriptSrcAttr,
        Directive::ScriptSrcElem,
        Directive::ObjectSrc,
        Directive::StyleSrc,
        Directive::StyleSrcAttr,
        Directive::StyleSrcElem,
        Directive::FontSrc,
        Directive::FrameSrc,
        Directive::ImgSrc,
        Directive::ManifestSrc,
        Directive::MediaSrc,
        Directive::PrefetchSrc,
        Directive::WorkerSrc,
        Directive::BaseUri,
        Directive::PluginTypes,
        Directive::Sandbox,
        Directive::FormAction,
        Directive::FrameAncestors,
        Directive::NavigateTo,
        Directive::ReportUri,
        Directive::ReportTo,
        Directive::RequireSriFor,
        Directive::UpgradeInsecureRequests,
        Directive::BlockAllMixedContent,
        Directive::ReportOnly,
        Directive::IncludeNonceIn,
    ];

    /// Canonical name as it appears in headers and structured definitions.
    pub fn as_str(&self) -> &'static str {
        match self {
            Directive::ChildSrc => "child-src",
            Directive::ConnectSrc => "connect-src",
            Directive::DefaultSrc => "default-src",
            Directive::ScriptSrc => "script-src",
            Directive::ScriptSrcAttr => "script-src-attr",
            Directive::ScriptSrcElem => "script-src-elem",
            Directive::ObjectSrc => "object-src",
            Directive::StyleSrc => "style-src",
            Directive::StyleSrcAttr => "style-src-attr",
            Directive::StyleSrcElem => "style-src-elem",
            Directive::FontSrc => "font-src",
            Directive::FrameSrc => "frame-src",
            Directive::ImgSrc => "img-src",
            Directive::ManifestSrc => "manifest-src",
            Directive::MediaSrc => "media-src",
            Directive::PrefetchSrc => "prefetch-src",
            Directive::WorkerSrc => "worker-src",
            Directive::BaseUri => "base-uri",
            Directive::PluginTypes => "plugin-types",
            Directive::Sandbox => "sandbox",
            Directive::FormAction => "form-action",
            Directive::FrameAncestors => "frame-ancestors",
            Directive::NavigateTo => "navigate-to",
            Directive::ReportUri => "report-uri",
            Directive::ReportTo => "report-to",
            Directive::RequireSriFor => "require-sri-for",
            Directive::UpgradeInsecureRequests => "upgrade-insecure-requests",
            Directive::BlockAllMixedContent => "block-all-mixed-content",
            Directive::ReportOnly => "report_only",
            Directive::IncludeNonceIn => "include_nonce_in",
        }
    }

    pub fn kind(&self) -> DirectiveKind {
        match self {
            Directive::ReportOnly | Directive::IncludeNonceIn => DirectiveKind::Pseudo,
            _ => DirectiveKind::Content,
        }
    }

    pub fn is_pseudo(&self) -> bool {
        self.kind() == DirectiveKind::Pseudo
    }

    /// Parses a canonical or keyword-style name.
    ///
    /// Keyword style spells content directives with underscores
    /// (`default_src`), matching the flat setting convention with the
    /// prefix already removed. Pseudo-directive names keep their
    /// underscores in both spellings.
    pub fn from_name(name: &str) -> Result<Directive> {
        let lowered = name.to_ascii_lowercase();
        for directive in Directive::ALL {
            if directive.as_str() == lowered {
                return Ok(directive);
            }
        }
        let hyphenated = lowered.replace('_', "-");
        for directive in Directive::ALL {
            if directive.kind() == DirectiveKind::Content && directive.as_str() == hyphenated {
                return Ok(directive);
            }
        }
        Err(CspError::UnknownDirective(name.to_string()))
    }
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Translates a flat setting name (`CSP_DEFAULT_SRC`) into its directive.
pub fn setting_to_directive(setting: &str, prefix: &str) -> Result<Directive> {
    let stripped = setting
        .strip_prefix(prefix)
        .ok_or_else(|| CspError::UnknownDirective(setting.to_string()))?;
    Directive::from_name(stripped)
}

/// Translates a directive into its flat setting name (`CSP_DEFAULT_SRC`).
pub fn directive_to_setting(directive: Directive, prefix: &str) -> String {
    format!(
        "{}{}",
        prefix,
        directive.as_str().replace('-', "_").to_ascii_uppercase()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_names_parse() {
        for directive in Directive::ALL {
            assert_eq!(Directive::from_name(directive.as_str()).unwrap(), directive);
        }
    }

    #[test]
    fn test_keyword_spelling() {
        assert_eq!(
            Directive::from_name("default_src").unwrap(),
            Directive::DefaultSrc
        );
        assert_eq!(
            Directive::from_name("script_src_elem").unwrap(),
            Directive::ScriptSrcElem
        );
    }

    #[test]
    fn test_pseudo_names_keep_underscores() {
        assert_eq!(
            Directive::from_name("report_only").unwrap(),
            Directive::ReportOnly
        );
        // The hyphenated spelling is not a registry member.
        assert!(Directive::from_name("include-nonce-in").is_err());
    }

    #[test]
    fn test_unknown_directive() {
        let err = Directive::from_name("bogus-src").unwrap_err();
        assert!(matches!(err, CspError::UnknownDirective(_)));
    }

    #[test]
    fn test_kind_tags() {
        assert_eq!(Directive::ScriptSrc.kind(), DirectiveKind::Content);
        assert_eq!(Directive::ReportUri.kind(), DirectiveKind::Content);
        assert!(Directive::ReportOnly.is_pseudo());
        assert!(Directive::IncludeNonceIn.is_pseudo());
    }

    #[test]
    fn test_setting_round_trip() {
        for directive in Directive::ALL {
            let setting = directive_to_setting(directive, "CSP_");
            assert_eq!(setting_to_directive(&setting, "CSP_").unwrap(), directive);
        }
        assert_eq!(
            directive_to_setting(Directive::DefaultSrc, "CSP_"),
            "CSP_DEFAULT_SRC"
        );
    }

    #[test]
    fn test_setting_requires_prefix() {
        assert!(setting_to_directive("DEFAULT_SRC", "CSP_").is_err());
    }
}
