//! The `cache` subcommand: stats, expired cleanup, full clear.

use anyhow::Context;
use console::style;

use vpress_cache::AnalysisCache;

pub fn manage_cache(clear_all: bool, max_age_days: i64) -> anyhow::Result<()> {
    let mut cache =
        AnalysisCache::open_default(max_age_days * 24).context("failed to open analysis cache")?;

    let (total, valid) = cache.stats().context("failed to read cache statistics")?;
    println!("{}", style("Cache Statistics").bold());
    println!("  Total entries:           {total}");
    println!("  Valid entries:           {valid}");
    println!("  Invalid/expired entries: {}", total - valid);

    if clear_all {
        let removed = cache.clear_all().context("failed to clear cache")?;
        println!("{} {removed} entries removed", style("Cache cleared:").green());
        return Ok(());
    }

    if max_age_days > 0 {
        cache.set_max_age(max_age_days * 24);
        let removed = cache
            .clean_expired()
            .context("failed to clean expired entries")?;
        if removed > 0 {
            println!(
                "{} {removed} expired entries removed",
                style("Cleaned:").green()
            );
        } else {
            println!("No expired entries found");
        }
    }

    Ok(())
}
