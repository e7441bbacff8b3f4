use envbind::{bind_from, Bind, ConfigError, FieldDescriptor, Url, ValidationError};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

fn vars(pairs: &[(&str, &str)]) -> HashMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

#[derive(Bind, Default, Debug)]
pub struct AllTypes {
    #[env = "NAME,required"]
    pub name: String,
    #[env = "DEBUG"]
    pub debug: bool,
    #[env = "OFFSET"]
    pub offset: i8,
    #[env = "LIMIT"]
    pub limit: i64,
    #[env = "PORT"]
    pub port: u16,
    #[env = "WORKERS"]
    pub workers: usize,
    #[env = "RATIO"]
    pub ratio: f32,
    #[env = "TIMEOUT"]
    pub timeout: Duration,
    #[env = "API"]
    pub api: Option<Url>,
    #[env = "REPLICAS"]
    pub replicas: Option<u8>,
    #[env = "TAGS"]
    pub tags: Vec<String>,
    pub untouched: u32,
}

#[test]
fn test_binds_every_supported_type() {
    let env = vars(&[
        ("NAME", "svc"),
        ("DEBUG", "on"),
        ("OFFSET", "-12"),
        ("LIMIT", "9000000000"),
        ("PORT", "443"),
        ("WORKERS", "16"),
        ("RATIO", "0.25"),
        ("TIMEOUT", "1m30s"),
        ("API", "https://api.example.com/v1"),
        ("REPLICAS", "3"),
        ("TAGS", "a, b,,c "),
    ]);

    let mut config = AllTypes {
        untouched: 7,
        ..Default::default()
    };
    bind_from(&mut config, &env, None).unwrap();

    assert_eq!(config.name, "svc");
    assert!(config.debug);
    assert_eq!(config.offset, -12);
    assert_eq!(config.limit, 9_000_000_000);
    assert_eq!(config.port, 443);
    assert_eq!(config.workers, 16);
    assert_eq!(config.ratio, 0.25);
    assert_eq!(config.timeout, Duration::from_secs(90));
    assert_eq!(config.api.unwrap().host_str(), Some("api.example.com"));
    assert_eq!(config.replicas, Some(3));
    assert_eq!(config.tags, vec!["a", "b", "c"]);
    assert_eq!(config.untouched, 7);
}

#[test]
fn test_absent_fields_keep_their_values() {
    let mut config = AllTypes {
        port: 80,
        replicas: Some(1),
        ..Default::default()
    };
    bind_from(&mut config, &vars(&[("NAME", "svc")]), None).unwrap();

    assert_eq!(config.port, 80);
    assert_eq!(config.replicas, Some(1));
    assert!(config.api.is_none());
}

#[test]
fn test_narrowing_overflow_is_type_mismatch() {
    let env = vars(&[("NAME", "svc"), ("OFFSET", "200"), ("PORT", "70000")]);
    let mut config = AllTypes::default();
    let err = bind_from(&mut config, &env, None).unwrap_err();

    assert_eq!(err.keys().collect::<Vec<_>>(), ["OFFSET", "PORT"]);
    assert!(err
        .errors()
        .iter()
        .all(|e| matches!(e, ConfigError::TypeMismatch { .. })));
}

#[derive(Bind, Default, Debug)]
pub struct Checked {
    #[env = "DB_URL,required"]
    pub db_url: String,
    #[env = "POOL"]
    #[validate = "min=1,max=50"]
    pub pool: u32,
    #[env = "MODE"]
    #[envdef = "dev"]
    #[validate = "oneof=dev|prod"]
    pub mode: String,
    #[env = "GRACE"]
    #[envdef = "10s"]
    #[validate = "min=1s,max=30s"]
    pub grace: Duration,
    #[env = "REGIONS"]
    #[envsep = ";"]
    #[validate = "oneof=eu|us|ap"]
    pub regions: Vec<String>,
}

#[test]
fn test_every_failure_is_reported() {
    colored::control::set_override(false);
    let env = vars(&[("POOL", "99"), ("MODE", "qa")]);
    let mut config = Checked::default();

    let err = bind_from(&mut config, &env, None).unwrap_err();
    assert_eq!(err.len(), 3);
    assert_eq!(err.keys().collect::<Vec<_>>(), ["DB_URL", "POOL", "MODE"]);

    assert!(err.errors()[0].is_missing());
    assert!(matches!(
        &err.errors()[1],
        ConfigError::ValidationViolation {
            source: ValidationError::AboveMax { .. },
            ..
        }
    ));
    assert!(matches!(
        &err.errors()[2],
        ConfigError::ValidationViolation {
            source: ValidationError::NotOneOf { .. },
            ..
        }
    ));

    // Values that converted are still assigned
    assert_eq!(config.pool, 99);
    assert_eq!(config.mode, "qa");

    let text = err.to_string();
    assert!(text.starts_with("Configuration failed with 3 error(s):"));
    assert!(text.contains("  - DB_URL: Is missing from environment and is required"));
    assert!(text.contains("  - POOL: Validation failed: must be <= 50"));
}

#[test]
fn test_list_elements_and_duration_bounds() {
    let env = vars(&[
        ("DB_URL", "pg://db"),
        ("REGIONS", "eu; mars"),
        ("GRACE", "45s"),
    ]);
    let mut config = Checked::default();
    let err = bind_from(&mut config, &env, None).unwrap_err();

    assert_eq!(err.keys().collect::<Vec<_>>(), ["GRACE", "REGIONS"]);
    match &err.errors()[1] {
        ConfigError::ValidationViolation {
            source: ValidationError::ElementNotOneOf { value, .. },
            ..
        } => assert_eq!(value, "mars"),
        other => panic!("unexpected {other:?}"),
    }
    assert_eq!(config.regions, vec!["eu", "mars"]);
}

#[test]
fn test_defaults_pass_validation() {
    let mut config = Checked::default();
    bind_from(&mut config, &vars(&[("DB_URL", "pg://db")]), None).unwrap();

    assert_eq!(config.mode, "dev");
    assert_eq!(config.grace, Duration::from_secs(10));
    assert!(config.regions.is_empty());
}

#[test]
fn test_prefix_is_tried_first() {
    let env = vars(&[
        ("DB_URL", "pg://shared"),
        ("APP_DB_URL", "pg://app"),
        ("POOL", "5"),
    ]);
    let mut config = Checked::default();
    bind_from(&mut config, &env, Some("APP_")).unwrap();

    assert_eq!(config.db_url, "pg://app");
    assert_eq!(config.pool, 5);
}

#[test]
fn test_values_and_defaults_are_expanded() {
    #[derive(Bind, Default)]
    struct Expanded {
        #[env = "URL"]
        url: String,
        #[env = "FALLBACK"]
        #[envdef = "${HOST}:${PORT:-5432}"]
        fallback: String,
    }

    let env = vars(&[("HOST", "db"), ("URL", "pg://${HOST}/app")]);
    let mut config = Expanded::default();
    bind_from(&mut config, &env, None).unwrap();

    assert_eq!(config.url, "pg://db/app");
    assert_eq!(config.fallback, "db:5432");
}

#[derive(Deserialize, Default, Debug, PartialEq)]
pub struct Limits {
    pub burst: u32,
    pub rate: f64,
}

#[derive(Bind, Default, Debug)]
pub struct WithJson {
    #[env = "WEIGHTS"]
    #[envjson]
    pub weights: HashMap<String, u32>,
    #[env = "LIMITS"]
    #[envjson = "true"]
    pub limits: Limits,
    #[env = "MAX_CONN"]
    #[envjson]
    #[validate = "max=10"]
    pub max_conn: Option<u32>,
}

#[test]
fn test_json_fields() {
    let env = vars(&[
        ("WEIGHTS", r#"{"a": 1, "b": 2}"#),
        ("LIMITS", r#"{"burst": 5, "rate": 1.5}"#),
        ("MAX_CONN", "4"),
    ]);
    let mut config = WithJson::default();
    bind_from(&mut config, &env, None).unwrap();

    assert_eq!(config.weights["b"], 2);
    assert_eq!(config.limits, Limits { burst: 5, rate: 1.5 });
    assert_eq!(config.max_conn, Some(4));
}

#[test]
fn test_json_errors_and_checks() {
    let env = vars(&[("LIMITS", "{burst: 5}"), ("MAX_CONN", "40")]);
    let mut config = WithJson::default();
    let err = bind_from(&mut config, &env, None).unwrap_err();

    assert!(matches!(&err.errors()[0], ConfigError::TypeMismatch { key, .. } if key == "LIMITS"));
    assert!(matches!(&err.errors()[1], ConfigError::ValidationViolation { key, .. } if key == "MAX_CONN"));
}

#[test]
fn test_json_null_clears_option() {
    let mut config = WithJson {
        max_conn: Some(2),
        ..Default::default()
    };
    bind_from(&mut config, &vars(&[("MAX_CONN", "null")]), None).unwrap();
    assert_eq!(config.max_conn, None);
}

#[derive(Bind)]
pub struct BadUrl {
    #[env = "ENDPOINT"]
    pub endpoint: Option<Url>,
    #[env = "STRICT_ENDPOINT"]
    pub strict: Url,
}

#[test]
fn test_url_by_value_is_rejected() {
    let env = vars(&[
        ("ENDPOINT", "not a url"),
        ("STRICT_ENDPOINT", "https://example.com"),
    ]);
    let mut config = BadUrl {
        endpoint: None,
        strict: Url::parse("http://localhost").unwrap(),
    };
    let err = bind_from(&mut config, &env, None).unwrap_err();

    assert!(matches!(&err.errors()[0], ConfigError::TypeMismatch { key, .. } if key == "ENDPOINT"));
    assert!(matches!(&err.errors()[1], ConfigError::UnsupportedType { key, .. } if key == "STRICT_ENDPOINT"));
}

#[test]
fn test_descriptor_table() {
    let table = Checked::descriptors();
    assert_eq!(table.len(), 5);

    assert_eq!(
        table[0],
        FieldDescriptor::new("DB_URL").field("db_url").required()
    );
    assert_eq!(
        table[2],
        FieldDescriptor::new("MODE")
            .field("mode")
            .default_value("dev")
            .rule("oneof=dev|prod")
    );
    assert_eq!(table[4].separator, ";");
    assert!(WithJson::descriptors().iter().all(|d| d.json));
}

#[test]
fn test_load_from_process_env() {
    std::env::set_var("EVB_DERIVE_LOAD_HOST", "example.org");

    #[derive(Bind, Default)]
    struct Loaded {
        #[env = "EVB_DERIVE_LOAD_HOST,required"]
        host: String,
        #[env = "EVB_DERIVE_LOAD_PORT"]
        #[envdef = "8443"]
        port: u16,
    }

    let config = Loaded::load();
    assert_eq!(config.host, "example.org");
    assert_eq!(config.port, 8443);

    #[derive(Bind, Default, Debug)]
    struct NeedsMissing {
        #[env = "EVB_DERIVE_NEVER_SET,required"]
        _value: String,
    }
    let err = NeedsMissing::load_or_error().unwrap_err();
    assert_eq!(err.keys().collect::<Vec<_>>(), ["EVB_DERIVE_NEVER_SET"]);
}

#[test]
#[should_panic(expected = "EVB_DERIVE_MUST_MISSING")]
fn test_must_bind_panics() {
    #[derive(Bind, Default)]
    struct Strict {
        #[env = "EVB_DERIVE_MUST_MISSING,required"]
        _value: u8,
    }
    envbind::must_bind(&mut Strict::default());
}

#[test]
fn test_process_prefix() {
    std::env::set_var("SVC_EVB_PFX_LEVEL", "3");
    std::env::set_var("EVB_PFX_LEVEL", "1");
    std::env::set_var("EVB_PFX_NAME", "shared");

    #[derive(Bind, Default)]
    struct Leveled {
        #[env = "EVB_PFX_LEVEL"]
        level: u8,
        #[env = "EVB_PFX_NAME"]
        name: String,
    }

    let mut config = Leveled::default();
    envbind::bind_with_prefix(&mut config, "SVC_").unwrap();
    assert_eq!(config.level, 3);
    assert_eq!(config.name, "shared");
}
