use crate::app_config::AppConfig;
use crate::ConfigError;

/// Desktop browser identity presented on outbound page fetches. Many sites
/// serve degraded or blocked markup to non-browser clients.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files — useful for testing
/// or when the caller manages env setup.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual environment
/// so it can be tested with a pure `HashMap` lookup — no `set_var`/`remove_var` needed.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<usize>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    // SHELFPIX_BIND_ADDR wins; bare PORT is honored as a shorthand for
    // deployment platforms that only inject a port number.
    let bind_addr_raw = match lookup("SHELFPIX_BIND_ADDR") {
        Ok(addr) => addr,
        Err(_) => match lookup("PORT") {
            Ok(port) => format!("0.0.0.0:{port}"),
            Err(_) => "0.0.0.0:3000".to_string(),
        },
    };
    let bind_addr =
        bind_addr_raw
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: "SHELFPIX_BIND_ADDR".to_string(),
                reason: e.to_string(),
            })?;

    let log_level = or_default("SHELFPIX_LOG_LEVEL", "info");
    let veeqo_api_key = lookup("VEEQO_API_KEY").ok().filter(|k| !k.trim().is_empty());

    let fetch_timeout_secs = parse_u64("SHELFPIX_FETCH_TIMEOUT_SECS", "10")?;
    let max_redirects = parse_usize("SHELFPIX_MAX_REDIRECTS", "5")?;
    let user_agent = or_default("SHELFPIX_USER_AGENT", DEFAULT_USER_AGENT);

    let rate_limit_max_requests = parse_usize("SHELFPIX_RATE_LIMIT_MAX", "60")?;
    let rate_limit_window_secs = parse_u64("SHELFPIX_RATE_LIMIT_WINDOW_SECS", "60")?;

    Ok(AppConfig {
        bind_addr,
        log_level,
        veeqo_api_key,
        fetch_timeout_secs,
        max_redirects,
        user_agent,
        rate_limit_max_requests,
        rate_limit_window_secs,
    })
}
