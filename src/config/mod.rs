mod settings;

use crate::config::settings::PartialSettings;
use config::{Config, ConfigError, Environment, File};

pub use settings::{HubSettings, ServerSettings, Settings};

/// Loads the configuration from the default file and environment variables
/// Merges the configuration with default values
/// Returns a `Settings` struct containing the server and hub configurations
pub fn load_config() -> Result<Settings, ConfigError> {
    let builder = Config::builder()
        .add_source(File::with_name("config/default").required(false))
        .add_source(Environment::default().separator("_"));

    let config = builder.build()?;

    // Try to deserialize what is available
    let partial: PartialSettings = config.try_deserialize()?;

    // Merge with defaults
    let default = Settings::default();

    Ok(Settings {
        server: ServerSettings {
            host: partial
                .server
                .as_ref()
                .and_then(|s| s.host.clone())
                .unwrap_or(default.server.host),
            port: partial
                .server
                .as_ref()
                .and_then(|s| s.port)
                .unwrap_or(default.server.port),
            cors_origin: partial
                .server
                .as_ref()
                .and_then(|s| s.cors_origin.clone())
                .unwrap_or(default.server.cors_origin),
        },
        hub: HubSettings {
            session_buffer: partial
                .hub
                .as_ref()
                .and_then(|h| h.session_buffer)
                .unwrap_or(default.hub.session_buffer),
            keep_alive_secs: partial
                .hub
                .as_ref()
                .and_then(|h| h.keep_alive_secs)
                .unwrap_or(default.hub.keep_alive_secs),
        },
    })
}

#[cfg(test)]
mod tests;
