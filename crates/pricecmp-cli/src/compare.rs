//! `compare` command: fetch, score and print one comparison.

use anyhow::Context;
use serde::Serialize;

use pricecmp_compare::{Comparator, Comparison, Recommendation, SiteSummary, SourceStatus};
use pricecmp_core::{load_sites, AppConfig, RatingPolicy, SearchQuery};
use pricecmp_scraper::Backend;

use crate::CompareArgs;

const NAME_WIDTH: usize = 44;

#[derive(Serialize)]
struct JsonOutput<'a> {
    #[serde(flatten)]
    comparison: &'a Comparison,
    recommendation: Option<Recommendation>,
    site_summaries: Vec<SiteSummary>,
}

/// Runs one comparison and prints it as a table, or as JSON with `--json`.
///
/// Command-line flags override the matching environment settings for this run.
///
/// # Errors
///
/// Returns an error if the sites file cannot be loaded, no listing backend
/// can be built, or every source fails.
pub(crate) async fn run_compare(mut config: AppConfig, args: CompareArgs) -> anyhow::Result<()> {
    if let Some(path) = args.fixture {
        config.fixture_path = Some(path);
    }
    if args.strict_rating {
        config.rating_policy = RatingPolicy::Strict;
    }
    let weights = args.weights.unwrap_or(config.weights);
    let num_results = args.num.unwrap_or(config.default_num_results);

    let sites_file = load_sites(&config.sites_path)
        .with_context(|| format!("loading {}", config.sites_path.display()))?;
    let sites = sites_file.resolve(&args.sites);

    let backend = Backend::from_config(&config)?;
    let comparator = Comparator::new(backend.adapters(&sites), weights, config.rating_policy);

    let query = SearchQuery::new(args.query, num_results).with_category(args.category);
    tracing::info!(
        query = %query.text,
        sites = sites.len(),
        num_results,
        "starting comparison"
    );
    let comparison = comparator.compare(&query).await?;

    if args.json {
        let output = JsonOutput {
            comparison: &comparison,
            recommendation: comparison.recommendation(),
            site_summaries: comparison.site_summaries(),
        };
        println!("{}", serde_json::to_string_pretty(&output)?);
        return Ok(());
    }

    print_comparison(&comparison);
    Ok(())
}

fn print_comparison(comparison: &Comparison) {
    for report in &comparison.sources {
        if let SourceStatus::Failed { error } = &report.status {
            eprintln!("warning: {} unavailable: {error}", report.source);
        }
    }

    if comparison.records.is_empty() {
        println!(
            "no listings found for \"{}\" ({} dropped during validation)",
            comparison.query.text,
            comparison.dropped_total()
        );
        return;
    }

    println!(
        "{:<6}{:<width$}{:<18}{:>14}{:>8}{:>10}{:>8}",
        "RANK",
        "PRODUCT",
        "SITE",
        "PRICE",
        "RATING",
        "REVIEWS",
        "SCORE",
        width = NAME_WIDTH + 2
    );
    for (i, scored) in comparison.records.iter().enumerate() {
        let r = &scored.record;
        println!(
            "{:<6}{:<width$}{:<18}{:>14}{:>8.1}{:>10}{:>8.3}",
            i + 1,
            truncate(&r.name, NAME_WIDTH),
            truncate(&r.source, 16),
            truncate(&r.raw_price, 13),
            r.rating,
            r.reviews,
            scored.score,
            width = NAME_WIDTH + 2
        );
    }

    if let Some(rec) = comparison.recommendation() {
        println!();
        println!(
            "Best pick: {} on {} at {} (score {:.3}, {} lead)",
            rec.best.record.name,
            rec.best.record.source,
            rec.best.record.raw_price,
            rec.best.score,
            rec.strength
        );
        if let Some(link) = &rec.best.record.link {
            println!("  {link}");
        }
    }

    println!();
    println!(
        "{:<18}{:>6}{:>14}{:>11}{:>12}{:>11}",
        "SITE", "ROWS", "AVG PRICE", "AVG RATING", "AVG REVIEWS", "AVG SCORE"
    );
    for site in comparison.site_summaries() {
        println!(
            "{:<18}{:>6}{:>14.0}{:>11.2}{:>12.0}{:>11.3}",
            truncate(&site.source, 16),
            site.count,
            site.avg_price,
            site.avg_rating,
            site.avg_reviews,
            site.avg_score
        );
    }

    if comparison.dropped_total() > 0 {
        let reasons: Vec<String> = comparison
            .dropped
            .iter()
            .map(|(reason, count)| format!("{reason}={count}"))
            .collect();
        println!();
        println!(
            "dropped {} listing(s): {}",
            comparison.dropped_total(),
            reasons.join(", ")
        );
    }
}

/// Shortens `text` to at most `max` characters, marking the cut with `...`.
pub(crate) fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let kept: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{kept}...")
    } else {
        text.to_owned()
    }
}
