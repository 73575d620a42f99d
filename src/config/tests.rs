use serial_test::serial;

use super::load_config;
use super::settings::Settings;

#[test]
fn test_default_settings() {
    let settings = Settings::default();
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.server.port, 8080);
    assert_eq!(settings.server.cors_origin, "http://localhost:3000");
    assert_eq!(settings.hub.session_buffer, 64);
    assert_eq!(settings.hub.keep_alive_secs, 15);
}

#[test]
#[serial]
fn test_load_config_falls_back_to_defaults() {
    let settings = load_config().expect("defaults should always load");
    assert_eq!(settings.server.host, "127.0.0.1");
    assert_eq!(settings.hub.session_buffer, 64);
}

#[test]
#[serial]
fn test_env_overrides_port() {
    temp_env::with_var("SERVER_PORT", Some("9099"), || {
        let settings = load_config().expect("config with env override should load");
        assert_eq!(settings.server.port, 9099);
        // Untouched values keep their defaults.
        assert_eq!(settings.server.host, "127.0.0.1");
    });
}

#[test]
#[serial]
fn test_env_overrides_host() {
    temp_env::with_var("SERVER_HOST", Some("0.0.0.0"), || {
        let settings = load_config().expect("config with env override should load");
        assert_eq!(settings.server.host, "0.0.0.0");
    });
}
