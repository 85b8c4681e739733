use std::collections::HashSet;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// One e-commerce site that listings are searched on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Domain used to scope searches, e.g. `"amazon.in"`.
    pub domain: String,
    /// Display name used as the record's source tag, e.g. `"Amazon India"`.
    pub name: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

impl SiteConfig {
    /// An unconfigured domain requested ad hoc; the domain doubles as its name.
    #[must_use]
    pub fn ad_hoc(domain: &str) -> Self {
        Self {
            domain: domain.to_owned(),
            name: domain.to_owned(),
            enabled: true,
        }
    }
}

fn default_enabled() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SitesFile {
    pub sites: Vec<SiteConfig>,
    #[serde(default)]
    pub categories: Vec<String>,
    /// Suggested searches shown by front-ends.
    #[serde(default)]
    pub popular_queries: Vec<String>,
}

impl SitesFile {
    pub fn enabled_sites(&self) -> impl Iterator<Item = &SiteConfig> {
        self.sites.iter().filter(|s| s.enabled)
    }

    /// Resolves the sites to search for one comparison.
    ///
    /// An empty request selects every enabled site. Requested domains are
    /// matched case-insensitively against the configured list; unknown
    /// domains are searched ad hoc under their own name. Duplicates are
    /// collapsed, keeping the first occurrence.
    #[must_use]
    pub fn resolve(&self, requested: &[String]) -> Vec<SiteConfig> {
        if requested.is_empty() {
            return self.enabled_sites().cloned().collect();
        }

        let mut seen = HashSet::new();
        requested
            .iter()
            .map(|d| d.trim().to_ascii_lowercase())
            .filter(|d| !d.is_empty())
            .filter(|d| seen.insert(d.clone()))
            .map(|domain| {
                self.sites
                    .iter()
                    .find(|s| s.domain.eq_ignore_ascii_case(&domain))
                    .cloned()
                    .unwrap_or_else(|| SiteConfig::ad_hoc(&domain))
            })
            .collect()
    }
}

/// Load and validate the sites configuration from a YAML file.
///
/// # Errors
///
/// Returns `ConfigError` if the file cannot be read, parsed, or fails validation.
pub fn load_sites(path: &Path) -> Result<SitesFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::SitesFileIo {
        path: path.display().to_string(),
        source: e,
    })?;

    parse_sites(&content)
}

/// Parse and validate sites configuration from YAML text.
///
/// # Errors
///
/// Returns `ConfigError` if the YAML is malformed or fails validation.
pub fn parse_sites(content: &str) -> Result<SitesFile, ConfigError> {
    let sites_file: SitesFile =
        serde_yaml::from_str(content).map_err(ConfigError::SitesFileParse)?;

    validate_sites(&sites_file)?;

    Ok(sites_file)
}

fn validate_sites(sites_file: &SitesFile) -> Result<(), ConfigError> {
    let mut seen_domains = HashSet::new();
    let mut seen_names = HashSet::new();

    for site in &sites_file.sites {
        if site.domain.trim().is_empty() {
            return Err(ConfigError::Validation(
                "site domain must be non-empty".to_string(),
            ));
        }

        if site.domain.contains("://") || site.domain.contains('/') {
            return Err(ConfigError::Validation(format!(
                "site domain '{}' must be a bare host such as 'amazon.in'",
                site.domain
            )));
        }

        if site.name.trim().is_empty() {
            return Err(ConfigError::Validation(format!(
                "site '{}' has an empty name",
                site.domain
            )));
        }

        if !seen_domains.insert(site.domain.to_ascii_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site domain: '{}'",
                site.domain
            )));
        }

        if !seen_names.insert(site.name.to_lowercase()) {
            return Err(ConfigError::Validation(format!(
                "duplicate site name: '{}'",
                site.name
            )));
        }
    }

    if sites_file.enabled_sites().next().is_none() {
        return Err(ConfigError::Validation(
            "at least one site must be enabled".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
#[path = "sites_test.rs"]
mod tests;
