//! Server configuration.

use serde::Deserialize;

use crate::engine::DEFAULT_MAX_CONNECTIONS;

/// Main server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Database connection URL
    pub database_url: String,

    /// Server bind address
    pub bind_address: String,

    /// Connection pool size
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    /// Enable CORS
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
}

fn default_true() -> bool {
    true
}

fn default_max_connections() -> u32 {
    DEFAULT_MAX_CONNECTIONS
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            database_url: "postgres://localhost/fleet_ops".to_string(),
            bind_address: "0.0.0.0:8080".to_string(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            cors_enabled: true,
        }
    }
}

impl ServerConfig {
    /// Create a new configuration builder.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder::default()
    }
}

/// Builder for ServerConfig.
#[derive(Debug, Default)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    /// Set the database URL.
    pub fn database(mut self, url: impl Into<String>) -> Self {
        self.config.database_url = url.into();
        self
    }

    /// Set the bind address.
    pub fn bind(mut self, addr: impl Into<String>) -> Self {
        self.config.bind_address = addr.into();
        self
    }

    /// Set the connection pool size.
    pub fn max_connections(mut self, n: u32) -> Self {
        self.config.max_connections = n;
        self
    }

    /// Enable or disable CORS.
    pub fn cors(mut self, enabled: bool) -> Self {
        self.config.cors_enabled = enabled;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> ServerConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let config = ServerConfig::builder()
            .database("postgres://db.internal/fleet")
            .bind("127.0.0.1:9000")
            .max_connections(20)
            .cors(false)
            .build();
        assert_eq!(config.database_url, "postgres://db.internal/fleet");
        assert_eq!(config.bind_address, "127.0.0.1:9000");
        assert_eq!(config.max_connections, 20);
        assert!(!config.cors_enabled);
    }
}
