//! cache clear / warm / stats

use colored::Colorize;

use crate::cache::{CacheReport, CacheService, ClearScope, KeyState};
use crate::cli::ClearTarget;
use crate::engagement::submission::validate_slug;
use crate::interfaces::cli::CliError;

pub fn clear_scope_from_target(target: ClearTarget) -> Result<ClearScope, CliError> {
    if let Some(slug) = target.post_slug {
        validate_slug(&slug)?;
        return Ok(ClearScope::Post(slug));
    }
    if target.metrics {
        return Ok(ClearScope::Metrics);
    }
    if target.details {
        return Ok(ClearScope::Details);
    }
    Ok(ClearScope::All)
}

fn warn_if_process_local(cache: &CacheService) {
    if cache.backend().backend_name() == "memory" {
        println!(
            "{} {}",
            "ℹ".bold().blue(),
            "Memory cache is per-process; a running server keeps its own entries.".dimmed()
        );
    }
}

pub async fn cache_clear(cache: &CacheService, target: ClearTarget) -> Result<(), CliError> {
    let scope = clear_scope_from_target(target)?;
    warn_if_process_local(cache);
    cache.clear(&scope).await;
    println!("{} Cache cleared: {:?}", "✓".bold().green(), scope);
    Ok(())
}

pub async fn cache_warm(
    cache: &CacheService,
    clear_first: bool,
    show_stats: bool,
) -> Result<(), CliError> {
    warn_if_process_local(cache);
    let report = cache.warm_all(clear_first).await?;

    println!(
        "{} Warmed {} keys ({} skipped, {} failed)",
        "✓".bold().green(),
        report.warmed.len().to_string().green(),
        report.skipped.len().to_string().yellow(),
        report.failed.len().to_string().red()
    );
    for key in &report.failed {
        println!("  {} {}", "✗".red(), key);
    }

    if show_stats {
        print_report(&cache.report(false, false).await?);
    }

    if report.failed.is_empty() {
        Ok(())
    } else {
        Err(CliError::CommandError(format!(
            "{} keys failed to warm",
            report.failed.len()
        )))
    }
}

pub async fn cache_stats(
    cache: &CacheService,
    detailed: bool,
    test_performance: bool,
) -> Result<(), CliError> {
    warn_if_process_local(cache);
    let report = cache.report(detailed, test_performance).await?;
    print_report(&report);
    Ok(())
}

fn print_report(report: &CacheReport) {
    let stats = &report.stats;
    println!("{}", "Cache statistics:".bold().green());
    println!("  backend:  {}", stats.backend.cyan());
    println!(
        "  health:   {}",
        if stats.health.is_healthy() {
            stats.health.status.green()
        } else {
            stats.health.status.red()
        }
    );
    if let Some(ref error) = stats.health.error {
        println!("  error:    {}", error.red());
    }
    println!("  ttl tiers:");
    for (tier, secs) in &stats.ttl_tiers {
        println!("    {:<10} {}s ({:.1} min)", tier, secs, *secs as f64 / 60.0);
    }
    // 命中计数只属于当前进程
    println!(
        "  {}",
        "Hit/miss counters are per process; see GET {admin}/cache/stats on the server.".dimmed()
    );

    let coverage = &report.coverage;
    println!();
    println!("{}", "Key coverage:".bold().green());
    println!(
        "  {} / {} known keys cached ({:.1}%)",
        coverage.cached.to_string().green(),
        coverage.total,
        coverage.coverage_percent
    );
    if coverage.undecodable > 0 {
        println!(
            "  {} undecodable entries",
            coverage.undecodable.to_string().red()
        );
    }
    for key in &coverage.keys {
        let label = match &key.lang {
            Some(lang) => format!("{} [{}]", key.slug, lang),
            None => format!("{} [metrics]", key.slug),
        };
        match key.state {
            KeyState::Cached => {
                println!("  {} {} ({} bytes)", "✓".green(), label, key.size_bytes)
            }
            KeyState::NotCached => println!("  {} {} (not cached)", "✗".red(), label),
            KeyState::Undecodable => println!("  {} {} (undecodable)", "!".yellow(), label),
        }
    }

    if let Some(ref perf) = report.performance {
        println!();
        println!("{}", "Performance test:".bold().green());
        println!(
            "  write:  {:.1} ops/sec ({} operations)",
            perf.write_ops_per_sec, perf.iterations
        );
        println!("  read:   {:.1} ops/sec", perf.read_ops_per_sec);
        println!("  delete: {:.1} ops/sec", perf.delete_ops_per_sec);
        println!("  hit rate: {:.1}%", perf.hit_rate_percent);
        println!("  total:  {:.3}s", perf.total_secs);
    }
    if let Some(score) = report.health_score {
        let text = format!("{:.1}/100", score);
        let colored = if score >= 80.0 {
            text.green()
        } else if score >= 50.0 {
            text.yellow()
        } else {
            text.red()
        };
        println!("  health score: {}", colored.bold());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clear_scope_from_target() {
        assert_eq!(
            clear_scope_from_target(ClearTarget::default()).unwrap(),
            ClearScope::All
        );
        assert_eq!(
            clear_scope_from_target(ClearTarget {
                post_slug: Some("hello-world".into()),
                ..Default::default()
            })
            .unwrap(),
            ClearScope::Post("hello-world".into())
        );
        assert_eq!(
            clear_scope_from_target(ClearTarget {
                details: true,
                ..Default::default()
            })
            .unwrap(),
            ClearScope::Details
        );
        assert!(
            clear_scope_from_target(ClearTarget {
                post_slug: Some("bad slug".into()),
                ..Default::default()
            })
            .is_err()
        );
    }

    #[tokio::test]
    async fn test_stats_report_after_warm() {
        use std::sync::Arc;

        use crate::cache::object_cache::MemoryObjectCache;
        use crate::config::{StaticConfig, update_config};
        use crate::storage::{NewPost, SeaOrmStorage};

        update_config(StaticConfig::default());
        let dir = tempfile::tempdir().unwrap();
        let url = format!("sqlite://{}?mode=rwc", dir.path().join("cli.db").display());
        let storage = Arc::new(SeaOrmStorage::new(&url, "sqlite").await.unwrap());
        storage
            .insert_post(NewPost {
                slug: "cli-post".into(),
                title: "CLI".into(),
                is_published: true,
                is_featured: false,
            })
            .await
            .unwrap();
        let cache = CacheService::new(
            Arc::new(MemoryObjectCache::new(100, 60)),
            storage,
            Default::default(),
        );

        cache_warm(&cache, false, true).await.unwrap();
        cache_stats(&cache, true, true).await.unwrap();

        let report = cache.report(true, true).await.unwrap();
        assert_eq!(report.coverage.total, 2);
        assert_eq!(report.coverage.cached, 2);
        assert_eq!(report.performance.unwrap().hit_rate_percent, 100.0);
    }
}
