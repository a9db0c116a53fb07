use crate::Config;
use crate::tests::{EnvGuard, setup_config_dir};

use googletest::assert_that;
use googletest::prelude::{anything, eq, err, ok};
use serial_test::serial;

#[test]
#[serial]
fn given_service_key_env_when_load_then_key_set_and_reported() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _key = EnvGuard::set("IDSYNC_PROVIDER_SERVICE_KEY", "service-role-key");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.provider.has_service_key(), eq(true));
    assert_that!(config.validate(), ok(anything()));
}

#[test]
#[serial]
fn given_blank_service_key_when_checked_then_not_set() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _key = EnvGuard::set("IDSYNC_PROVIDER_SERVICE_KEY", "   ");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.provider.has_service_key(), eq(false));
}

#[test]
#[serial]
fn given_non_http_url_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _url = EnvGuard::set("IDSYNC_PROVIDER_URL", "ftp://example.com");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}

#[test]
#[serial]
fn given_zero_timeout_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _timeout = EnvGuard::set("IDSYNC_PROVIDER_TIMEOUT_SECS", "0");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}

#[test]
#[serial]
fn given_page_size_over_max_when_validate_then_error() {
    // Given
    let (_temp, _guard) = setup_config_dir();
    let _page = EnvGuard::set("IDSYNC_PROVIDER_PAGE_SIZE", "5000");

    // When
    let config = Config::load().unwrap();

    // Then
    assert_that!(config.validate(), err(anything()));
}
