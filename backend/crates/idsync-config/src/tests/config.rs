use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use idsync_core::{SyncDirection, SyncFrequency};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, len, none, ok, some};
use serial_test::serial;

// =========================================================================
// Loading
// =========================================================================

#[test]
#[serial]
fn given_no_config_file_when_load_then_defaults_used() {
    // Given
    let (_temp, _guard) = setup_config_dir();

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    let config = result.unwrap();
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
    assert_that!(config.provider.timeout_secs, eq(10));
    assert_that!(config.retry.max_retries, eq(3));
    assert_that!(config.registrar.max_attempts, eq(5));
    assert_that!(config.local_store.soft_delete, eq(true));
    assert_that!(config.validate(), ok(anything()));
}

#[test]
#[serial]
fn given_missing_config_dir_when_load_then_dir_created() {
    // Given
    let temp = tempfile::TempDir::new().unwrap();
    let nested = temp.path().join("nested").join("idsync");
    let _guard = EnvGuard::set("IDSYNC_CONFIG_DIR", nested.to_str().unwrap());

    // When
    let result = Config::load();

    // Then
    assert_that!(result, ok(anything()));
    assert_that!(nested.exists(), eq(true));
}

#[test]
#[serial]
fn given_toml_file_when_load_then_toml_values_used() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(
        temp.path().join("config.toml"),
        r#"
            [server]
            port = 9100

            [provider]
            base_url = "https://abc.supabase.co"
            page_size = 50

            [[scheduler.schedules]]
            direction = "to-django"
            frequency = "hourly"
            force_update = true
        "#,
    )
    .unwrap();

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(9100));
    assert_that!(config.provider.base_url, eq("https://abc.supabase.co"));
    assert_that!(config.provider.page_size, eq(50));
    assert_that!(config.scheduler.schedules, len(eq(1)));
    let seed = &config.scheduler.schedules[0];
    assert_that!(seed.direction, eq(SyncDirection::ToLocal));
    assert_that!(seed.frequency, eq(SyncFrequency::Hourly));
    assert_that!(seed.force_update, eq(true));
    assert_that!(seed.is_active, eq(true));
}

#[test]
#[serial]
fn given_env_var_and_toml_when_load_then_env_var_wins() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[server]\nport = 9000").unwrap();
    let _port = EnvGuard::set("IDSYNC_SERVER_PORT", "8888");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(8888));
}

#[test]
#[serial]
fn given_invalid_toml_when_load_then_error() {
    // Given
    let (temp, _guard) = setup_config_dir();
    std::fs::write(temp.path().join("config.toml"), "[server\nport = ").unwrap();

    // When / Then
    assert_that!(Config::load(), err(anything()));
}

#[test]
#[serial]
fn given_unparseable_env_number_when_load_then_value_kept() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _port = EnvGuard::set("IDSYNC_SERVER_PORT", "not-a-port");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.server.port, eq(crate::DEFAULT_PORT));
}

#[test]
#[serial]
fn given_log_file_env_when_load_then_option_set() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _file = EnvGuard::set("IDSYNC_LOG_FILE", "idsync.log");
    let _level = EnvGuard::set("IDSYNC_LOG_LEVEL", "DEBUG");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.logging.file, some(eq("idsync.log")));
    assert_that!(*config.logging.level, eq(log::LevelFilter::Debug));
}

// =========================================================================
// Validation
// =========================================================================

#[test]
#[serial]
fn given_privileged_port_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _port = EnvGuard::set("IDSYNC_SERVER_PORT", "80");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}

#[test]
#[serial]
fn given_database_path_escaping_dir_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _path = EnvGuard::set("IDSYNC_DATABASE_PATH", "../outside.db");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}

#[test]
fn given_inline_toml_when_parsed_then_sections_default() {
    // Given / When
    let config = Config::from_toml_str("[webhook]\nsync_enabled = false").unwrap();

    // Then
    assert_that!(config.webhook.sync_enabled, eq(false));
    assert_that!(config.webhook.secret, none());
    assert_that!(config.database.path, eq("idsync.db"));
}

#[test]
#[serial]
fn given_config_dir_env_removed_when_config_dir_then_cwd_relative() {
    // Given
    let _guard = EnvGuard::remove("IDSYNC_CONFIG_DIR");

    // When
    let dir = Config::config_dir().unwrap();

    // Then
    assert_that!(dir.ends_with(".idsync"), eq(true));
}
