//! # Configuration Tests
//!
//! These tests mutate process-wide environment variables, so they are
//! serialized with `serial_test`.

use consulta_server::config::{get_config, ConfigError, DEV_JWT_SECRET};
use serial_test::serial;
use std::env;
use std::io::Write;
use tempfile::NamedTempFile;

const VARS: &[&str] = &[
    "PORT",
    "DB_URL",
    "JWT_SECRET",
    "TOKEN_TTL_SECS",
    "UPLOADS_DIR",
    "MAX_UPLOAD_BYTES",
    "CONSULTA_PORT",
    "CONSULTA_JWT_SECRET",
    "CONSULTA_TEST_DB_NAME",
];

/// Clears all environment variables read by `get_config`.
fn clear_env_vars() {
    for var in VARS {
        env::remove_var(var);
    }
}

fn write_yaml(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
#[serial]
fn test_defaults_without_file_or_env() {
    clear_env_vars();
    let empty = write_yaml("{}\n");

    let config = get_config(Some(empty.path().to_str().unwrap())).unwrap();

    assert_eq!(config.port, 3001);
    assert_eq!(config.db_url, "db/consulta.db");
    assert_eq!(config.jwt_secret, DEV_JWT_SECRET);
    assert_eq!(config.token_ttl_secs, 3600);
    assert_eq!(config.uploads_dir, "uploads");
    assert_eq!(config.max_upload_bytes, 10 * 1024 * 1024);
}

#[test]
#[serial]
fn test_plain_env_vars_override_defaults() {
    clear_env_vars();
    env::set_var("PORT", "4100");
    env::set_var("DB_URL", "/tmp/other.db");
    env::set_var("JWT_SECRET", "from-env");
    env::set_var("TOKEN_TTL_SECS", "60");
    env::set_var("MAX_UPLOAD_BYTES", "2048");
    let empty = write_yaml("{}\n");

    let config = get_config(Some(empty.path().to_str().unwrap())).unwrap();

    assert_eq!(config.port, 4100);
    assert_eq!(config.db_url, "/tmp/other.db");
    assert_eq!(config.jwt_secret, "from-env");
    assert_eq!(config.token_ttl_secs, 60);
    assert_eq!(config.max_upload_bytes, 2048);
    clear_env_vars();
}

#[test]
#[serial]
fn test_yaml_file_with_substitution_and_prefixed_override() {
    clear_env_vars();
    env::set_var("CONSULTA_TEST_DB_NAME", "clinic");
    env::set_var("CONSULTA_PORT", "5000");
    let file = write_yaml(
        r#"
port: 4000
db_url: "data/${CONSULTA_TEST_DB_NAME}.db"
jwt_secret: "yaml-secret"
uploads_dir: "files"
"#,
    );

    let config = get_config(Some(file.path().to_str().unwrap())).unwrap();

    assert_eq!(config.db_url, "data/clinic.db");
    assert_eq!(config.jwt_secret, "yaml-secret");
    assert_eq!(config.uploads_dir, "files");
    // The prefixed variable wins over the file.
    assert_eq!(config.port, 5000);
    clear_env_vars();
}

#[test]
#[serial]
fn test_missing_explicit_file_is_an_error() {
    clear_env_vars();
    let result = get_config(Some("/definitely/not/here/config.yml"));
    assert!(matches!(result, Err(ConfigError::NotFound(_))));
}

#[test]
#[serial]
fn test_invalid_port_is_rejected() {
    clear_env_vars();
    env::set_var("PORT", "not-a-number");
    let empty = write_yaml("{}\n");

    let result = get_config(Some(empty.path().to_str().unwrap()));
    assert!(matches!(result, Err(ConfigError::General(_))));
    clear_env_vars();
}
