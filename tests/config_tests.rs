use std::fs;

use quotegate::error::{ConfigError, Error};
use quotegate::infrastructure::config::{CacheDriver, Config};

fn write_temp_config(contents: &str) -> tempfile::NamedTempFile {
    let file = tempfile::Builder::new()
        .prefix("quotegate-config-test-")
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    fs::write(file.path(), contents).expect("write temp config");
    file
}

#[test]
fn full_config_file_loads() {
    let file = write_temp_config(
        r#"
[logging]
level = "debug"
format = "json"

[cache]
enabled = true
driver = "memory+remote"
sweep_interval_secs = 30
key_prefix = "qg:"

[cache.remote]
url = "https://kv.example.com"
timeout_ms = 800

[ttl]
quote_secs = 20
quote_fallback_secs = 10
chain_secs = 45
chain_fallback_secs = 20
expirations_secs = 600
expirations_fallback_secs = 60

[providers.primary]
base_url = "https://api.polygon.io"
timeout_ms = 4000
max_pages = 5

[providers.fallback]
enabled = true
timeout_ms = 3000

[gateway]
call_timeout_ms = 6000
"#,
    );

    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.logging.format, "json");
    assert_eq!(config.cache.driver(), CacheDriver::Tiered);
    assert_eq!(config.cache.key_prefix, "qg:");
    assert_eq!(config.cache.remote.timeout_ms, 800);
    assert_eq!(config.ttl.policy().chain.fallback.as_secs(), 20);
    assert_eq!(config.providers.primary.max_pages, 5);
    assert_eq!(config.providers.fallback.timeout_ms, 3000);
    assert_eq!(config.gateway.call_timeout().as_millis(), 6000);
}

#[test]
fn config_rejects_zero_ttl() {
    let file = write_temp_config("[ttl]\nquote_secs = 0\n");

    match Config::load(file.path()) {
        Err(Error::Config(ConfigError::InvalidValue {
            field: "ttl.quote_secs",
            ..
        })) => {}
        Err(err) => panic!("Expected invalid ttl error, got {err}"),
        Ok(_) => panic!("Expected invalid ttl error, got Ok"),
    }
}

#[test]
fn config_rejects_zero_provider_timeout() {
    let file = write_temp_config("[providers.primary]\ntimeout_ms = 0\n");

    assert!(matches!(
        Config::load(file.path()),
        Err(Error::Config(ConfigError::InvalidValue {
            field: "providers.primary.timeout_ms",
            ..
        }))
    ));
}

#[test]
fn unknown_driver_is_not_an_error() {
    let file = write_temp_config("[cache]\ndriver = \"redis-cluster\"\n");
    let config = Config::load(file.path()).unwrap();
    assert_eq!(config.cache.driver(), CacheDriver::Memory);
}

#[test]
fn missing_file_is_a_read_error_for_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("absent.toml");

    assert!(matches!(
        Config::load(&path),
        Err(Error::Config(ConfigError::ReadFile(_)))
    ));
}

#[test]
fn missing_file_yields_defaults_for_load_or_default() {
    let dir = tempfile::tempdir().unwrap();
    let config = Config::load_or_default(dir.path().join("absent.toml")).unwrap();

    assert!(config.cache.enabled);
    assert_eq!(config.ttl.quote_secs, 30);
    assert_eq!(config.ttl.expirations_fallback_secs, 120);
}
