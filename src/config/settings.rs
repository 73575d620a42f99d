use serde::Deserialize;

/// Top-level configuration settings for the application.
///
/// Includes settings for both the HTTP server and the broadcast hub.
#[derive(Debug, Deserialize, Clone)]
pub struct Settings {
    pub server: ServerSettings,
    pub hub: HubSettings,
}

/// Configuration settings for the server.
///
/// Defines the bind address and the browser origin allowed to connect with
/// credentials.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
}

/// Configuration settings for the hub.
///
/// `session_buffer` caps each session's outbound queue (overflow is treated
/// as a dead transport); `keep_alive_secs` is the idle interval between SSE
/// comment frames.
#[derive(Debug, Deserialize, Clone)]
pub struct HubSettings {
    pub session_buffer: usize,
    pub keep_alive_secs: u64,
}

/// Partial configuration settings loaded from files or environment.
///
/// Allows partial specification of settings. Missing values can be filled using defaults.
#[derive(Debug, Deserialize)]
pub struct PartialSettings {
    pub server: Option<PartialServerSettings>,
    pub hub: Option<PartialHubSettings>,
}

/// Partial server settings.
///
/// Used when loading server configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialServerSettings {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub cors_origin: Option<String>,
}

/// Partial hub settings.
///
/// Used for hub configuration from external sources with optional values.
#[derive(Debug, Deserialize)]
pub struct PartialHubSettings {
    pub session_buffer: Option<usize>,
    pub keep_alive_secs: Option<u64>,
}

/// Provides default values for `Settings`.
///
/// Ensures the application has sensible defaults if no configuration is provided.
impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings {
                host: "127.0.0.1".to_string(),
                port: 8080,
                cors_origin: "http://localhost:3000".to_string(),
            },
            hub: HubSettings {
                session_buffer: 64,
                keep_alive_secs: 15,
            },
        }
    }
}
