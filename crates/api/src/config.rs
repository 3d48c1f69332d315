use chrono::Weekday;

/// Film metadata provider settings.
#[derive(Debug, Clone)]
pub struct FilmDbConfig {
    pub base_url: String,
    pub api_key: String,
    /// How long fetched film metadata stays cached.
    pub cache_ttl_secs: u64,
}

/// When the weekly settlement pass runs.
#[derive(Debug, Clone, Copy)]
pub struct SettlementSchedule {
    pub weekday: Weekday,
    /// Hour of day (UTC, 0-23).
    pub hour_utc: u32,
}

/// Server configuration loaded from environment variables.
///
/// All fields except the film database key have defaults suitable for
/// local development.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Time allowed for background tasks to stop after shutdown begins.
    pub shutdown_timeout_secs: u64,
    pub film_db: FilmDbConfig,
    pub settlement: SettlementSchedule,
    /// How often the draft clock checks for expired picks.
    pub draft_clock_interval_secs: u64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                     | Default                        |
    /// |-----------------------------|--------------------------------|
    /// | `HOST`                      | `0.0.0.0`                      |
    /// | `PORT`                      | `3000`                         |
    /// | `CORS_ORIGINS`              | `http://localhost:5173`        |
    /// | `REQUEST_TIMEOUT_SECS`      | `30`                           |
    /// | `SHUTDOWN_TIMEOUT_SECS`     | `30`                           |
    /// | `TMDB_API_KEY`              | required                       |
    /// | `TMDB_BASE_URL`             | `https://api.themoviedb.org/3` |
    /// | `FILM_CACHE_TTL_SECS`       | `3600`                         |
    /// | `SETTLEMENT_WEEKDAY`        | `Tue`                          |
    /// | `SETTLEMENT_HOUR_UTC`       | `12`                           |
    /// | `DRAFT_CLOCK_INTERVAL_SECS` | `1`                            |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = env_or("PORT", "3000")
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = env_or("CORS_ORIGINS", "http://localhost:5173")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = env_or("REQUEST_TIMEOUT_SECS", "30")
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let shutdown_timeout_secs: u64 = env_or("SHUTDOWN_TIMEOUT_SECS", "30")
            .parse()
            .expect("SHUTDOWN_TIMEOUT_SECS must be a valid u64");

        let film_db = FilmDbConfig {
            base_url: env_or("TMDB_BASE_URL", bmb_filmdb::tmdb::DEFAULT_BASE_URL),
            api_key: std::env::var("TMDB_API_KEY").expect("TMDB_API_KEY must be set"),
            cache_ttl_secs: env_or("FILM_CACHE_TTL_SECS", "3600")
                .parse()
                .expect("FILM_CACHE_TTL_SECS must be a valid u64"),
        };

        let hour_utc: u32 = env_or("SETTLEMENT_HOUR_UTC", "12")
            .parse()
            .expect("SETTLEMENT_HOUR_UTC must be a valid hour");
        assert!(hour_utc < 24, "SETTLEMENT_HOUR_UTC must be between 0 and 23");
        let settlement = SettlementSchedule {
            weekday: env_or("SETTLEMENT_WEEKDAY", "Tue")
                .parse()
                .expect("SETTLEMENT_WEEKDAY must be a weekday name (e.g. Tue)"),
            hour_utc,
        };

        let draft_clock_interval_secs: u64 = env_or("DRAFT_CLOCK_INTERVAL_SECS", "1")
            .parse()
            .expect("DRAFT_CLOCK_INTERVAL_SECS must be a valid u64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            shutdown_timeout_secs,
            film_db,
            settlement,
            draft_clock_interval_secs: draft_clock_interval_secs.max(1),
        }
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
