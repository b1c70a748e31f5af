/// Archive endpoint
pub const API_BASE_URL: &str = "https://archive-api.open-meteo.com/v1/archive";

/// Let the archive resolve the local timezone from the coordinates
pub const DEFAULT_TIMEZONE: &str = "auto";

/// Default variable selections
pub const DEFAULT_DAILY_VARS: [&str; 5] = [
    "temperature_2m_max",
    "temperature_2m_min",
    "temperature_2m_mean",
    "precipitation_sum",
    "rain_sum",
];
pub const DEFAULT_HOURLY_VARS: [&str; 0] = [];

/// Output columns that precede the variable codes
pub const TIME_COLUMN: &str = "time";
pub const TIMEZONE_COLUMN: &str = "timezone";

/// Chunking and request pacing defaults
pub const DEFAULT_CHUNK_DAYS: i64 = 365;
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;
pub const DEFAULT_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
pub const DEFAULT_PAUSE_MS: u64 = 1000;

/// Environment variable prefix for settings overrides
pub const ENV_PREFIX: &str = "OPENMETEO";

/// Default output location
pub const DEFAULT_OUTPUT_DIR: &str = "output";
