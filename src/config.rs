use serde::Deserialize;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    #[serde(default)]
    pub charts: ChartsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub path: String,
    pub max_pool_size: u32,
    /// Records older than this are pruned by the retention worker.
    #[serde(default = "default_retention_hours")]
    pub retention_hours: u32,
    #[serde(default = "default_prune_interval_secs")]
    pub prune_interval_secs: u64,
}

fn default_retention_hours() -> u32 {
    720
}

fn default_prune_interval_secs() -> u64 {
    3600
}

/// Chart defaults; a request may override interval and window.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ChartsConfig {
    /// Native reporting interval of load records.
    pub load_interval_secs: u64,
    /// Native reporting interval of ping tasks.
    pub ping_interval_secs: u64,
    pub default_hours: f64,
    pub max_hours: f64,
    /// Matching tolerance as a multiple of the grid interval.
    pub tolerance_factor: f64,
    pub format_cache_size: usize,
    /// Upper bound on grid slots a single chart request may allocate.
    pub max_grid_points: u64,
}

impl Default for ChartsConfig {
    fn default() -> Self {
        Self {
            load_interval_secs: 60,
            ping_interval_secs: 60,
            default_hours: 4.0,
            max_hours: 720.0,
            tolerance_factor: 1.0,
            format_cache_size: 1024,
            max_grid_points: 100_000,
        }
    }
}

impl ChartsConfig {
    /// Tolerance for a given grid interval, at least one second.
    pub fn tolerance_secs(&self, interval_secs: u64) -> u64 {
        ((interval_secs as f64 * self.tolerance_factor).round() as u64).max(1)
    }
}

impl AppConfig {
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let s = std::fs::read_to_string(&path)?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests).
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let config: AppConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.database.path.is_empty(),
            "database.path must be non-empty"
        );
        anyhow::ensure!(
            self.database.max_pool_size > 0,
            "database.max_pool_size must be > 0, got {}",
            self.database.max_pool_size
        );
        anyhow::ensure!(
            self.database.retention_hours > 0,
            "database.retention_hours must be > 0, got {}",
            self.database.retention_hours
        );
        anyhow::ensure!(
            self.database.prune_interval_secs > 0,
            "database.prune_interval_secs must be > 0, got {}",
            self.database.prune_interval_secs
        );
        anyhow::ensure!(
            self.charts.load_interval_secs > 0,
            "charts.load_interval_secs must be > 0, got {}",
            self.charts.load_interval_secs
        );
        anyhow::ensure!(
            self.charts.ping_interval_secs > 0,
            "charts.ping_interval_secs must be > 0, got {}",
            self.charts.ping_interval_secs
        );
        anyhow::ensure!(
            self.charts.default_hours > 0.0 && self.charts.default_hours <= self.charts.max_hours,
            "charts.default_hours must be in (0, max_hours], got {}",
            self.charts.default_hours
        );
        anyhow::ensure!(
            (0.5..=2.0).contains(&self.charts.tolerance_factor),
            "charts.tolerance_factor must be between 0.5 and 2.0, got {}",
            self.charts.tolerance_factor
        );
        anyhow::ensure!(
            self.charts.format_cache_size > 0,
            "charts.format_cache_size must be > 0, got {}",
            self.charts.format_cache_size
        );
        anyhow::ensure!(
            self.charts.max_grid_points > 0,
            "charts.max_grid_points must be > 0, got {}",
            self.charts.max_grid_points
        );
        Ok(())
    }
}
