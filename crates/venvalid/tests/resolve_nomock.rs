//! No-mock resolution tests.
//!
//! Covers:
//! - Resolution against the real process environment
//! - Typed coercion of every supported type through the public API
//! - Fail-fast, all-or-nothing results
//! - JSON spec documents resolved end to end

use std::collections::HashMap;
use std::env;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, OnceLock};

use rust_decimal::Decimal;
use venvalid::{
    env as load_env, resolve, resolve_env, ErrorKind, Origin, Resolver, Spec, TypeTag, Value,
    VarOptions, VarSpec,
};

static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();

struct EnvGuard {
    keys: Vec<String>,
    saved: Vec<Option<String>>,
}

impl EnvGuard {
    fn new(keys: &[&str]) -> Self {
        let mut saved = Vec::with_capacity(keys.len());
        for key in keys {
            saved.push(env::var(key).ok());
        }
        Self {
            keys: keys.iter().map(|k| k.to_string()).collect(),
            saved,
        }
    }
}

impl Drop for EnvGuard {
    fn drop(&mut self) {
        for (idx, key) in self.keys.iter().enumerate() {
            match self.saved.get(idx).and_then(|v| v.as_ref()) {
                Some(val) => env::set_var(key, val),
                None => env::remove_var(key),
            }
        }
    }
}

fn with_env_lock<T>(f: impl FnOnce() -> T) -> T {
    let _guard = ENV_LOCK
        .get_or_init(|| Mutex::new(()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    f()
}

fn source(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

// ============================================================================
// Process environment
// ============================================================================

#[test]
fn test_basic_types_from_process_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&["VV_TEST_DEBUG", "VV_TEST_PORT", "VV_TEST_SECRET_KEY"]);
        env::set_var("VV_TEST_DEBUG", "true");
        env::set_var("VV_TEST_PORT", "8000");
        env::set_var("VV_TEST_SECRET_KEY", "abc123");

        let spec = Spec::builder()
            .var("VV_TEST_DEBUG", TypeTag::Boolean)
            .var("VV_TEST_PORT", TypeTag::Integer)
            .var("VV_TEST_SECRET_KEY", TypeTag::String)
            .build()
            .expect("valid spec");

        let config = load_env(&spec).expect("environment should validate");
        assert_eq!(config.get_bool("VV_TEST_DEBUG"), Some(true));
        assert_eq!(config.get_integer("VV_TEST_PORT"), Some(8000));
        assert_eq!(config.get_str("VV_TEST_SECRET_KEY"), Some("abc123"));
    });
}

#[test]
fn test_default_when_unset_in_process_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&["VV_TEST_ENV"]);
        env::remove_var("VV_TEST_ENV");

        let spec = Spec::builder()
            .var(
                "VV_TEST_ENV",
                VarSpec::with(TypeTag::String, VarOptions::new().with_default("development")),
            )
            .build()
            .expect("valid spec");

        let config = resolve_env(&spec).expect("default should satisfy spec");
        assert_eq!(config.get_str("VV_TEST_ENV"), Some("development"));
        assert_eq!(config.origin("VV_TEST_ENV"), Some(Origin::Default));
    });
}

#[test]
fn test_missing_required_in_process_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&["VV_TEST_MISSING"]);
        env::remove_var("VV_TEST_MISSING");

        let resolver = Resolver::new(
            Spec::builder()
                .var("VV_TEST_MISSING", TypeTag::String)
                .build()
                .expect("valid spec"),
        );
        let err = resolver.resolve_env().expect_err("missing variable must fail");
        assert_eq!(err.kind(), ErrorKind::MissingVariable);
    });
}

#[test]
fn test_bool_variants_from_process_env() {
    with_env_lock(|| {
        let _guard = EnvGuard::new(&["VV_TEST_FEATURE_A", "VV_TEST_FEATURE_B"]);
        env::set_var("VV_TEST_FEATURE_A", "yes");
        env::set_var("VV_TEST_FEATURE_B", "false");

        let spec = Spec::from_entries([
            ("VV_TEST_FEATURE_A", TypeTag::Boolean),
            ("VV_TEST_FEATURE_B", TypeTag::Boolean),
        ])
        .expect("valid spec");

        let config = resolve_env(&spec).expect("booleans never fail");
        assert_eq!(config.get_bool("VV_TEST_FEATURE_A"), Some(true));
        assert_eq!(config.get_bool("VV_TEST_FEATURE_B"), Some(false));
    });
}

#[cfg(unix)]
#[test]
fn test_non_utf8_value_is_present_not_defaulted() {
    use std::ffi::OsStr;
    use std::os::unix::ffi::OsStrExt;

    with_env_lock(|| {
        let _guard = EnvGuard::new(&["VV_TEST_NON_UTF8"]);
        env::set_var("VV_TEST_NON_UTF8", OsStr::from_bytes(b"\xff\xfe8000"));

        let spec = Spec::builder()
            .var(
                "VV_TEST_NON_UTF8",
                VarSpec::with(TypeTag::Integer, VarOptions::new().with_default(1)),
            )
            .build()
            .expect("valid spec");

        let err = resolve_env(&spec).expect_err("set variable must not fall back to default");
        assert_eq!(err.kind(), ErrorKind::InvalidType);
        assert_eq!(err.variable(), Some("VV_TEST_NON_UTF8"));
    });
}

// ============================================================================
// Explicit sources
// ============================================================================

#[test]
fn test_every_type_coerces() {
    let spec = Spec::from_entries([
        ("NAME", TypeTag::String),
        ("PORT", TypeTag::Integer),
        ("DEBUG", TypeTag::Boolean),
        ("ALLOWED_HOSTS", TypeTag::List),
        ("RATE", TypeTag::Decimal),
        ("STARTS_AT", TypeTag::DateTime),
        ("DATA_DIR", TypeTag::Path),
        ("FEATURES", TypeTag::Json),
    ])
    .expect("valid spec");

    let src = source(&[
        ("NAME", "svc"),
        ("PORT", "8000"),
        ("DEBUG", "on"),
        ("ALLOWED_HOSTS", "a.com,b.com , c.com"),
        ("RATE", "0.075"),
        ("STARTS_AT", "2025-06-01T09:00:00Z"),
        ("DATA_DIR", "/var/lib/svc"),
        ("FEATURES", r#"{"beta": true}"#),
        ("UNRELATED", "ignored"),
    ]);

    let config = resolve(&spec, &src).expect("all values valid");
    assert_eq!(config.len(), 8);
    assert!(!config.contains("UNRELATED"));
    assert_eq!(config.get_str("NAME"), Some("svc"));
    assert_eq!(config.get_integer("PORT"), Some(8000));
    assert_eq!(config.get_bool("DEBUG"), Some(true));
    assert_eq!(
        config.get_list("ALLOWED_HOSTS").expect("list"),
        ["a.com", "b.com", "c.com"]
    );
    assert_eq!(config.get_decimal("RATE"), Decimal::from_str("0.075").ok());
    assert_eq!(
        config.get_datetime("STARTS_AT").map(|dt| dt.to_rfc3339()),
        Some("2025-06-01T09:00:00+00:00".to_string())
    );
    assert_eq!(config.get_path("DATA_DIR"), Some(Path::new("/var/lib/svc")));
    assert_eq!(config.get_json("FEATURES"), Some(&serde_json::json!({"beta": true})));
}

#[test]
fn test_mode_invalid_returns_no_config() {
    let spec = Spec::builder()
        .var("PORT", TypeTag::Integer)
        .var("MODE", VarSpec::one_of(["dev", "prod", "test"]))
        .build()
        .expect("valid spec");

    let result = resolve(&spec, &source(&[("PORT", "8000"), ("MODE", "invalid")]));
    let err = result.expect_err("invalid enum must abort");
    assert_eq!(err.kind(), ErrorKind::InvalidEnumValue);
    assert_eq!(err.variable(), Some("MODE"));
}

#[test]
fn test_allowed_invalid() {
    let spec = Spec::builder()
        .var(
            "REGION",
            VarSpec::with(TypeTag::String, VarOptions::new().with_allowed(["us", "eu"])),
        )
        .build()
        .expect("valid spec");

    let err = resolve(&spec, &source(&[("REGION", "asia")])).expect_err("asia is not allowed");
    assert_eq!(err.kind(), ErrorKind::NotAllowed);
    assert_eq!(err.to_string(), "REGION must be one of [us, eu], but got 'asia'");
}

#[test]
fn test_decimal_allowed_set_is_numeric() {
    let spec = Spec::builder()
        .var(
            "RATIO",
            VarSpec::with(
                TypeTag::Decimal,
                VarOptions::new().with_allowed([
                    Decimal::from_str("0.5").expect("decimal"),
                    Decimal::from_str("1").expect("decimal"),
                ]),
            ),
        )
        .build()
        .expect("valid spec");

    let config = resolve(&spec, &source(&[("RATIO", "0.50")])).expect("0.50 == 0.5");
    assert_eq!(config.get("RATIO"), Some(&Value::from(Decimal::from_str("0.5").expect("decimal"))));
}

#[test]
fn test_validator_sees_coerced_list() {
    let spec = Spec::builder()
        .var(
            "ALLOWED_HOSTS",
            VarSpec::with(
                TypeTag::List,
                VarOptions::new().with_validator(|v| {
                    v.as_list()
                        .map(|hosts| hosts.iter().all(|h| !h.is_empty()))
                        .unwrap_or(false)
                }),
            ),
        )
        .build()
        .expect("valid spec");

    assert!(resolve(&spec, &source(&[("ALLOWED_HOSTS", "a.com, b.com")])).is_ok());
    let err = resolve(&spec, &source(&[("ALLOWED_HOSTS", "a.com,,b.com")]))
        .expect_err("empty host rejected");
    assert_eq!(err.kind(), ErrorKind::CustomValidationFailed);
}

#[test]
fn test_document_spec_end_to_end() {
    let spec = Spec::from_json_str(
        r#"{
            "PORT": "int",
            "DEBUG": {"type": "bool", "default": false},
            "MODE": ["dev", "prod", "test"],
            "REGION": {"type": "string", "allowed": ["us", "eu"]}
        }"#,
    )
    .expect("valid document");

    let config = resolve(
        &spec,
        &source(&[("PORT", "9000"), ("MODE", "test"), ("REGION", "eu")]),
    )
    .expect("valid environment");

    let names: Vec<&str> = config.names().collect();
    assert_eq!(names, vec!["PORT", "DEBUG", "MODE", "REGION"]);
    assert_eq!(config.origin("DEBUG"), Some(Origin::Default));
    assert_eq!(
        serde_json::to_value(&config).expect("serialize"),
        serde_json::json!({"PORT": 9000, "DEBUG": false, "MODE": "test", "REGION": "eu"})
    );
}
