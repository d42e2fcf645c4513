use std::collections::HashMap;
use std::ffi::OsString;

use super::*;

fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
    move |key| map.get(key).cloned()
}

#[test]
fn defaults_when_nothing_set() {
    let cfg = EditorConfig::from_lookup(lookup_from(&[])).unwrap();
    assert_eq!(cfg, EditorConfig::default());
    assert_eq!(cfg.history.max_depth, 50);
    assert_eq!(cfg.default_rack_height, 42);
    assert_eq!(cfg.default_rack_width, RackWidth::Nineteen);
    assert_eq!(cfg.default_face, Face::Front);
}

#[test]
fn parses_overrides() {
    let cfg = EditorConfig::from_lookup(lookup_from(&[
        (ENV_HISTORY_DEPTH, "200"),
        (ENV_DEFAULT_RACK_HEIGHT, " 24 "),
        (ENV_DEFAULT_RACK_WIDTH, "23"),
        (ENV_DEFAULT_FACE, "rear"),
    ]))
    .unwrap();
    assert_eq!(cfg.history.max_depth, 200);
    assert_eq!(cfg.default_rack_height, 24);
    assert_eq!(cfg.default_rack_width, RackWidth::TwentyThree);
    assert_eq!(cfg.default_face, Face::Rear);
}

#[test]
fn unparsable_numbers_fall_back() {
    let cfg = EditorConfig::from_lookup(lookup_from(&[
        (ENV_HISTORY_DEPTH, "lots"),
        (ENV_DEFAULT_RACK_HEIGHT, "tall"),
    ]))
    .unwrap();
    assert_eq!(cfg.history.max_depth, DEFAULT_HISTORY_DEPTH);
    assert_eq!(cfg.default_rack_height, DEFAULT_RACK_HEIGHT);
}

#[test]
fn rack_height_out_of_range_errors() {
    let err = EditorConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_RACK_HEIGHT, "0")])).unwrap_err();
    assert_eq!(err, ConfigError::RackHeightOutOfRange { var: ENV_DEFAULT_RACK_HEIGHT, value: 0 });
    assert_eq!(err.error_code(), "E_CONFIG_RANGE");
    assert!(EditorConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_RACK_HEIGHT, "101")])).is_err());
}

#[test]
fn unknown_width_errors() {
    let err = EditorConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_RACK_WIDTH, "17")])).unwrap_err();
    assert!(err.to_string().contains("unsupported rack width"));
    let err = EditorConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_RACK_WIDTH, "wide")])).unwrap_err();
    assert_eq!(err.error_code(), "E_CONFIG_PARSE");
}

#[test]
fn unknown_face_errors() {
    let err = EditorConfig::from_lookup(lookup_from(&[(ENV_DEFAULT_FACE, "side")])).unwrap_err();
    assert!(err.to_string().contains("unknown face 'side'"));
    assert!(!err.retryable());
}

#[test]
fn env_value_treats_unset_and_non_unicode_as_missing() {
    assert_eq!(env_value(ENV_DEFAULT_FACE, Ok("rear".to_string())), Some("rear".to_string()));
    assert_eq!(env_value(ENV_DEFAULT_FACE, Err(VarError::NotPresent)), None);
    let raw = OsString::from("r\u{e9}ar");
    assert_eq!(env_value(ENV_DEFAULT_FACE, Err(VarError::NotUnicode(raw))), None);
}
