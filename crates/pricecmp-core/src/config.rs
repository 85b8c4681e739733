use crate::app_config::{AppConfig, Environment};
use crate::scoring::{RatingPolicy, ScoringWeights};
use crate::ConfigError;

pub const DEFAULT_SERPAPI_BASE_URL: &str = "https://serpapi.com/search.json";

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so it can be tested with a plain
/// `HashMap` lookup.
///
/// # Errors
///
/// Returns `ConfigError` if values are present but invalid.
pub fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    // Empty values count as unset so `.env` templates can leave keys blank.
    let optional = |var: &str| -> Option<String> {
        lookup(var)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    };

    let invalid = |var: &str, reason: String| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason,
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        or_default(var, default)
            .parse::<u64>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_usize = |var: &str, default: &str| -> Result<usize, ConfigError> {
        or_default(var, default)
            .parse::<usize>()
            .map_err(|e| invalid(var, e.to_string()))
    };

    let parse_weight = |var: &str, default: &str| -> Result<f64, ConfigError> {
        let value = or_default(var, default)
            .parse::<f64>()
            .map_err(|e| invalid(var, e.to_string()))?;
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(var, "weight must be a non-negative number".into()));
        }
        Ok(value)
    };

    let env = parse_environment(&or_default("PRICECMP_ENV", "development"))?;

    let bind_addr = or_default("PRICECMP_BIND_ADDR", "0.0.0.0:3000")
        .parse::<SocketAddr>()
        .map_err(|e| invalid("PRICECMP_BIND_ADDR", e.to_string()))?;
    let log_level = or_default("PRICECMP_LOG_LEVEL", "info");
    let sites_path = PathBuf::from(or_default("PRICECMP_SITES_PATH", "./config/sites.yaml"));
    let fixture_path = optional("PRICECMP_FIXTURE_PATH").map(PathBuf::from);

    let serpapi_key = optional("SERPAPI_API_KEY");
    let serpapi_base_url = or_default("PRICECMP_SERPAPI_BASE_URL", DEFAULT_SERPAPI_BASE_URL);

    let default_num_results = parse_usize("PRICECMP_DEFAULT_RESULTS", "5")?;
    if default_num_results == 0 {
        return Err(invalid(
            "PRICECMP_DEFAULT_RESULTS",
            "must be at least 1".into(),
        ));
    }

    let request_timeout_secs = parse_u64("PRICECMP_REQUEST_TIMEOUT_SECS", "10")?;
    let user_agent = or_default("PRICECMP_USER_AGENT", "pricecmp/0.1 (product-comparison)");
    let cache_ttl_secs = parse_u64("PRICECMP_CACHE_TTL_SECS", "3600")?;

    let weights = ScoringWeights {
        price: parse_weight("PRICECMP_WEIGHT_PRICE", "0.4")?,
        rating: parse_weight("PRICECMP_WEIGHT_RATING", "0.4")?,
        reviews: parse_weight("PRICECMP_WEIGHT_REVIEWS", "0.2")?,
    };

    let rating_policy = if parse_bool(
        "PRICECMP_STRICT_RATING",
        &or_default("PRICECMP_STRICT_RATING", "false"),
    )? {
        RatingPolicy::Strict
    } else {
        RatingPolicy::Lenient
    };

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        sites_path,
        fixture_path,
        serpapi_key,
        serpapi_base_url,
        default_num_results,
        request_timeout_secs,
        user_agent,
        cache_ttl_secs,
        weights,
        rating_policy,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for unrecognized values.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "PRICECMP_ENV".to_string(),
            reason: format!("unknown environment \"{other}\"; expected development, test, or production"),
        }),
    }
}

fn parse_bool(var: &str, raw: &str) -> Result<bool, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: format!("expected a boolean, got \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
