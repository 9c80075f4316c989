use std::env;
use std::time::Duration;

/// Service configuration, read once from the environment at startup.
/// Every knob has a workable default so a bare `cargo run` comes up.
#[derive(Clone, Debug)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    /// Deadline for the static page fetch.
    pub fetch_timeout: Duration,
    /// Deadline for the external rendering service call.
    pub render_timeout: Duration,
    /// Scrape endpoint of the headless-rendering service.
    pub renderer_url: String,
    pub renderer_token: Option<String>,
    pub cache_ttl: Duration,
    pub rate_limit_max_requests: u64,
    pub rate_limit_window: Duration,
    pub is_production: bool,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string()),
            server_port: env_parse("SERVER_PORT", 8080),
            fetch_timeout: Duration::from_secs(env_parse("FETCH_TIMEOUT_SECS", 10)),
            render_timeout: Duration::from_secs(env_parse("RENDER_TIMEOUT_SECS", 30)),
            renderer_url: env::var("RENDERER_URL")
                .unwrap_or_else(|_| "https://chrome.browserless.io/scrape".to_string()),
            renderer_token: env::var("RENDERER_TOKEN").ok().filter(|t| !t.is_empty()),
            cache_ttl: Duration::from_secs(env_parse("CACHE_TTL_SECS", 3600)),
            rate_limit_max_requests: env_parse("RATE_LIMIT_MAX_REQUESTS", 100),
            rate_limit_window: Duration::from_secs(env_parse("RATE_LIMIT_WINDOW_SECS", 60)),
            is_production: env::var("APP_ENV").as_deref() == Ok("production"),
        }
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server_host, self.server_port)
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
