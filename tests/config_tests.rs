//! Configuration loading and legacy-settings reconciliation.

use csp_policy::*;

#[test]
fn test_config_from_json() {
    let config = CspConfig::from_json_str(
        r#"{
            "policies": ["default", "api"],
            "definitions": {
                "default": {"default-src": ["'self'"], "script-src": "'self'"},
                "api": {"default-src": "'none'", "report_only": true}
            }
        }"#,
    )
    .unwrap();
    let resolved = config.resolve(None, false).unwrap();
    let headers = build_policy(&resolved, None, None, None, None).unwrap();

    assert_eq!(headers.len(), 2);
    assert_eq!(headers[0].value, "default-src 'self'; script-src 'self'");
    assert!(!headers[0].report_only);
    assert_eq!(headers[1].value, "default-src 'none'");
    assert!(headers[1].report_only);
}

#[test]
fn test_config_from_toml() {
    let config = CspConfig::from_toml_str(
        r#"
            policies = ["default"]
            update_template = "default"

            [definitions.default]
            default-src = ["'self'"]
            img-src = "data:"
            upgrade-insecure-requests = true
        "#,
    )
    .unwrap();
    let resolved = config.resolve(None, false).unwrap();
    let headers = build_policy(&resolved, None, None, None, None).unwrap();

    assert_eq!(
        headers[0].value,
        "default-src 'self'; img-src data:; upgrade-insecure-requests"
    );
}

#[test]
fn test_config_parse_errors() {
    assert!(matches!(
        CspConfig::from_json_str("{not json"),
        Err(CspError::Parse(_))
    ));
    assert!(matches!(
        CspConfig::from_toml_str("policies = {"),
        Err(CspError::Parse(_))
    ));
}

#[test]
fn test_keyword_spelling_in_definitions() {
    let config = CspConfig::from_json_str(
        r#"{"definitions": {"default": {"default_src": ["'self'"], "script_src": ["'self'"]}}}"#,
    )
    .unwrap();
    let resolved = config.resolve(None, false).unwrap();
    let headers = build_policy(&resolved, None, None, None, None).unwrap();
    assert_eq!(headers[0].value, "default-src 'self'; script-src 'self'");
}

#[test]
fn test_unknown_directive_in_config_fails() {
    let config = CspConfig::from_json_str(
        r#"{"definitions": {"default": {"frame-guard": "DENY"}}}"#,
    )
    .unwrap();
    assert!(matches!(
        config.resolve(None, false),
        Err(CspError::UnknownDirective(_))
    ));
}

#[test]
fn test_legacy_settings_defer_to_legacy() {
    let mut config = CspConfig::default();
    let mut raw = RawPolicy::new();
    raw.insert(
        "script-src".to_string(),
        Some(RawValue::from(vec!["structured"])),
    );
    config.definitions.insert("default".to_string(), raw);

    let legacy = LegacySettings::new()
        .set("CSP_SCRIPT_SRC", vec!["legacy"])
        .set("CSP_FONT_SRC", "fonts.example.com");

    let resolved = config.resolve(Some(&legacy), true).unwrap();
    let headers = build_policy(&resolved, None, None, None, None).unwrap();
    assert_eq!(
        headers[0].value,
        "default-src 'self'; script-src legacy; font-src fonts.example.com"
    );
}

#[test]
fn test_legacy_settings_structured_wins() {
    let mut config = CspConfig::default();
    let mut raw = RawPolicy::new();
    raw.insert(
        "script-src".to_string(),
        Some(RawValue::from(vec!["structured"])),
    );
    config.definitions.insert("default".to_string(), raw);

    let legacy = LegacySettings::new()
        .set("CSP_SCRIPT_SRC", vec!["legacy"])
        .set("CSP_FONT_SRC", "fonts.example.com");

    let resolved = config.resolve(Some(&legacy), false).unwrap();
    let headers = build_policy(&resolved, None, None, None, None).unwrap();
    assert_eq!(
        headers[0].value,
        "default-src 'self'; script-src structured; font-src fonts.example.com"
    );
}

#[test]
fn test_legacy_unknown_setting_fails() {
    let config = CspConfig::default();
    let legacy = LegacySettings::new().set("CSP_FRAME_GUARD", "DENY");
    assert!(matches!(
        config.resolve(Some(&legacy), true),
        Err(CspError::UnknownDirective(_))
    ));
}

#[test]
fn test_config_round_trips_through_serde() {
    let mut config = CspConfig::default();
    let mut raw = RawPolicy::new();
    raw.insert("default-src".to_string(), Some(RawValue::from(vec!["'self'"])));
    config.definitions.insert("default".to_string(), raw);

    let json = serde_json::to_string(&config).unwrap();
    let parsed = CspConfig::from_json_str(&json).unwrap();
    assert_eq!(parsed, config);
}
