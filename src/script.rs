//! Inline script-element rendering.
//!
//! Companion to the nonce facility: renders a `<script>` element whose
//! attributes come out in a fixed registry order, so output is
//! deterministic regardless of how the caller filled them in.

use once_cell::sync::Lazy;
use regex::Regex;

static SCRIPT_WRAPPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<script[^>]*>(.+?)</script>").unwrap());

/// Attribute set for [`build_script_tag`].
///
/// Emission order is fixed: nonce, id, src, type, async, defer,
/// integrity, nomodule. Unused attributes contribute nothing, not even a
/// separating space.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScriptAttrs {
    pub nonce: Option<String>,
    pub id: Option<String>,
    pub src: Option<String>,
    pub script_type: Option<String>,
    /// Three-state: `Some(true)` renders the bare word, `Some(false)`
    /// renders `async=false` with no quotes (the HTML spec permits the
    /// explicit form), `None` renders nothing.
    pub r#async: Option<bool>,
    pub defer: bool,
    pub integrity: Option<String>,
    pub nomodule: bool,
}

impl ScriptAttrs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nonce(mut self, value: impl Into<String>) -> Self {
        self.nonce = Some(value.into());
        self
    }

    pub fn id(mut self, value: impl Into<String>) -> Self {
        self.id = Some(value.into());
        self
    }

    pub fn src(mut self, value: impl Into<String>) -> Self {
        self.src = Some(value.into());
        self
    }

    pub fn script_type(mut self, value: impl Into<String>) -> Self {
        self.script_type = Some(value.into());
        self
    }

    pub fn r#async(mut self, value: bool) -> Self {
        self.r#async = Some(value);
        self
    }

    pub fn defer(mut self, value: bool) -> Self {
        self.defer = value;
        self
    }

    pub fn integrity(mut self, value: impl Into<String>) -> Self {
        self.integrity = Some(value.into());
        self
    }

    pub fn nomodule(mut self, value: bool) -> Self {
        self.nomodule = value;
        self
    }
}

fn quoted_attr(name: &str, value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => format!(" {name}=\"{v}\""),
        _ => String::new(),
    }
}

fn bool_attr(name: &str, value: bool) -> String {
    if value {
        format!(" {name}")
    } else {
        String::new()
    }
}

fn async_attr(value: Option<bool>) -> String {
    match value {
        Some(true) => " async".to_string(),
        Some(false) => " async=false".to_string(),
        None => String::new(),
    }
}

/// Extracts the content between script tags, if any.
fn unwrap_script(text: &str) -> &str {
    match SCRIPT_WRAPPER.captures(text).and_then(|c| c.get(1)) {
        Some(inner) => inner.as_str().trim(),
        None => text,
    }
}

/// Renders an inline script element.
///
/// Inline content is suppressed when `src` is set; the two are mutually
/// exclusive in HTML. Otherwise any enclosing `<script>` markup already
/// present in `content` is stripped before re-wrapping.
pub fn build_script_tag(content: Option<&str>, attrs: &ScriptAttrs) -> String {
    let mut rendered = String::new();
    rendered.push_str(&quoted_attr("nonce", attrs.nonce.as_deref()));
    rendered.push_str(&quoted_attr("id", attrs.id.as_deref()));
    rendered.push_str(&quoted_attr("src", attrs.src.as_deref()));
    rendered.push_str(&quoted_attr("type", attrs.script_type.as_deref()));
    rendered.push_str(&async_attr(attrs.r#async));
    rendered.push_str(&bool_attr("defer", attrs.defer));
    rendered.push_str(&quoted_attr("integrity", attrs.integrity.as_deref()));
    rendered.push_str(&bool_attr("nomodule", attrs.nomodule));

    let body = match content {
        Some(text) if attrs.src.is_none() => unwrap_script(text),
        _ => "",
    };
    format!("<script{}>{}</script>", rendered, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attributes_render_in_registry_order() {
        let attrs = ScriptAttrs::new()
            .defer(true)
            .id("app")
            .nonce("abc");
        let tag = build_script_tag(Some("var x = 1;"), &attrs);
        assert_eq!(tag, "<script nonce=\"abc\" id=\"app\" defer>var x = 1;</script>");
    }

    #[test]
    fn test_unused_attributes_contribute_nothing() {
        let tag = build_script_tag(Some("go();"), &ScriptAttrs::new());
        assert_eq!(tag, "<script>go();</script>");
    }

    #[test]
    fn test_async_three_states() {
        assert_eq!(
            build_script_tag(None, &ScriptAttrs::new().r#async(true)),
            "<script async></script>"
        );
        assert_eq!(
            build_script_tag(None, &ScriptAttrs::new().r#async(false)),
            "<script async=false></script>"
        );
        assert_eq!(build_script_tag(None, &ScriptAttrs::new()), "<script></script>");
    }

    #[test]
    fn test_src_suppresses_inline_content() {
        let attrs = ScriptAttrs::new().src("https://cdn.example.com/app.js");
        let tag = build_script_tag(Some("var x = 1;"), &attrs);
        assert_eq!(
            tag,
            "<script src=\"https://cdn.example.com/app.js\"></script>"
        );
    }

    #[test]
    fn test_existing_wrapper_is_stripped() {
        let content = "<script type=\"text/javascript\">\n  var x = 1;\n</script>";
        let tag = build_script_tag(Some(content), &ScriptAttrs::new().nonce("abc"));
        assert_eq!(tag, "<script nonce=\"abc\">var x = 1;</script>");
    }

    #[test]
    fn test_bool_attrs_only_when_true() {
        let attrs = ScriptAttrs::new().defer(false).nomodule(true);
        let tag = build_script_tag(None, &attrs);
        assert_eq!(tag, "<script nomodule></script>");
    }

    #[test]
    fn test_empty_string_attr_is_omitted() {
        let attrs = ScriptAttrs::new().id("");
        assert_eq!(build_script_tag(None, &attrs), "<script></script>");
    }
}
