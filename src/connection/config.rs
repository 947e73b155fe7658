use std::time::Duration;

const URL_SCHEME: &str = "dashstore://";

/// Store connection configuration
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Database name
    pub database: String,

    /// How long `acquire` waits for a free connection
    pub connect_timeout: Duration,

    /// Maximum number of connections in pool
    pub max_connections: usize,

    /// Minimum number of connections in pool
    pub min_connections: usize,

    /// Connection idle timeout
    pub idle_timeout: Option<Duration>,

    /// Maximum connection lifetime
    pub max_lifetime: Option<Duration>,

    /// Serve fetch + counts from one consistent read
    pub snapshot_reads: bool,
}

impl ConnectionConfig {
    pub fn new(database: &str) -> Self {
        Self {
            database: database.to_string(),
            connect_timeout: Duration::from_secs(30),
            max_connections: 10,
            min_connections: 1,
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
            snapshot_reads: true,
        }
    }

    pub fn database(mut self, database: &str) -> Self {
        self.database = database.to_string();
        self
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    pub fn min_connections(mut self, min: usize) -> Self {
        self.min_connections = min;
        self
    }

    pub fn idle_timeout(mut self, timeout: Duration) -> Self {
        self.idle_timeout = Some(timeout);
        self
    }

    pub fn max_lifetime(mut self, lifetime: Duration) -> Self {
        self.max_lifetime = Some(lifetime);
        self
    }

    pub fn snapshot_reads(mut self, enabled: bool) -> Self {
        self.snapshot_reads = enabled;
        self
    }

    /// Parse from connection string
    ///
    /// Format: `dashstore://database?max_connections=20&connect_timeout_ms=500`
    ///
    /// Recognised options: `min_connections`, `max_connections`,
    /// `connect_timeout_ms`, `snapshot_reads`.
    pub fn from_url(url: &str) -> Result<Self, String> {
        let rest = url
            .strip_prefix(URL_SCHEME)
            .ok_or_else(|| format!("URL must start with '{}'", URL_SCHEME))?;

        let (database, query) = match rest.split_once('?') {
            Some((database, query)) => (database, Some(query)),
            None => (rest, None),
        };

        if database.is_empty() || database.contains('/') {
            return Err("Invalid database name".to_string());
        }

        let mut config = Self::new(database);

        for pair in query.into_iter().flat_map(|q| q.split('&')).filter(|p| !p.is_empty()) {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| format!("Invalid option '{}'", pair))?;
            let bad_value = || format!("Invalid value for '{}': {}", key, value);

            match key {
                "min_connections" => config.min_connections = value.parse().map_err(|_| bad_value())?,
                "max_connections" => config.max_connections = value.parse().map_err(|_| bad_value())?,
                "connect_timeout_ms" => {
                    config.connect_timeout =
                        Duration::from_millis(value.parse().map_err(|_| bad_value())?)
                }
                "snapshot_reads" => config.snapshot_reads = value.parse().map_err(|_| bad_value())?,
                _ => return Err(format!("Unknown option '{}'", key)),
            }
        }

        Ok(config)
    }

    /// Convert to connection string
    pub fn to_url(&self) -> String {
        format!(
            "{}{}?min_connections={}&max_connections={}&connect_timeout_ms={}&snapshot_reads={}",
            URL_SCHEME,
            self.database,
            self.min_connections,
            self.max_connections,
            self.connect_timeout.as_millis(),
            self.snapshot_reads
        )
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database.is_empty() {
            return Err("Database name cannot be empty".to_string());
        }

        if self.max_connections == 0 {
            return Err("max_connections must be > 0".to_string());
        }

        if self.min_connections > self.max_connections {
            return Err("min_connections cannot exceed max_connections".to_string());
        }

        Ok(())
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new("dashstore")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ConnectionConfig::default();
        assert_eq!(config.database, "dashstore");
        assert_eq!(config.max_connections, 10);
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert!(config.snapshot_reads);
    }

    #[test]
    fn test_builder_pattern() {
        let config = ConnectionConfig::new("admin")
            .max_connections(20)
            .min_connections(2)
            .snapshot_reads(false);

        assert_eq!(config.max_connections, 20);
        assert_eq!(config.min_connections, 2);
        assert!(!config.snapshot_reads);
    }

    #[test]
    fn test_from_url() {
        let config = ConnectionConfig::from_url(
            "dashstore://admin?max_connections=4&connect_timeout_ms=250&snapshot_reads=false",
        )
        .unwrap();

        assert_eq!(config.database, "admin");
        assert_eq!(config.max_connections, 4);
        assert_eq!(config.connect_timeout, Duration::from_millis(250));
        assert!(!config.snapshot_reads);
    }

    #[test]
    fn test_url_round_trip_keeps_options() {
        let config = ConnectionConfig::new("admin").max_connections(3);
        let parsed = ConnectionConfig::from_url(&config.to_url()).unwrap();
        assert_eq!(parsed.max_connections, 3);
        assert_eq!(parsed.database, "admin");
    }

    #[test]
    fn test_invalid_url() {
        assert!(ConnectionConfig::from_url("invalid://url").is_err());
        assert!(ConnectionConfig::from_url("dashstore://").is_err());
        assert!(ConnectionConfig::from_url("dashstore://db?max_connections=many").is_err());
        assert!(ConnectionConfig::from_url("dashstore://db?color=blue").is_err());
    }

    #[test]
    fn test_validate() {
        assert!(ConnectionConfig::new("db").validate().is_ok());
        assert!(ConnectionConfig::new("").validate().is_err());
        assert!(ConnectionConfig::new("db").max_connections(0).validate().is_err());
        assert!(
            ConnectionConfig::new("db")
                .min_connections(10)
                .max_connections(5)
                .validate()
                .is_err()
        );
    }
}
