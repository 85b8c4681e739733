use anyhow::Context;
use pricecmp_core::{load_sites, AppConfig};

/// Prints the configured sites, categories and popular queries.
///
/// # Errors
///
/// Returns an error if the sites file cannot be loaded.
pub(crate) fn run_sites(config: &AppConfig) -> anyhow::Result<()> {
    let sites_file = load_sites(&config.sites_path)
        .with_context(|| format!("loading {}", config.sites_path.display()))?;

    println!("{:<22}{:<20}ENABLED", "DOMAIN", "NAME");
    for site in &sites_file.sites {
        println!(
            "{:<22}{:<20}{}",
            site.domain,
            site.name,
            if site.enabled { "yes" } else { "no" }
        );
    }

    if !sites_file.categories.is_empty() {
        println!();
        println!("Categories: {}", sites_file.categories.join(", "));
    }

    if !sites_file.popular_queries.is_empty() {
        println!();
        println!("Popular queries:");
        for q in &sites_file.popular_queries {
            println!("  {q}");
        }
    }

    Ok(())
}
