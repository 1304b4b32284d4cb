//! post add / list, metrics

use colored::Colorize;

use crate::engagement::submission::validate_slug;
use crate::interfaces::cli::CliError;
use crate::storage::{NewPost, SeaOrmStorage};

pub async fn post_add(
    storage: &SeaOrmStorage,
    slug: String,
    title: String,
    published: bool,
    featured: bool,
) -> Result<(), CliError> {
    validate_slug(&slug)?;
    if title.trim().is_empty() {
        return Err(CliError::ParseError("Title cannot be empty".to_string()));
    }

    let post = storage
        .insert_post(NewPost {
            slug,
            title: title.trim().to_string(),
            is_published: published,
            is_featured: featured,
        })
        .await?;

    println!(
        "{} Added post {} (id {}){}",
        "✓".bold().green(),
        post.slug.cyan(),
        post.id,
        if post.is_published {
            String::new()
        } else {
            " [draft]".dimmed().to_string()
        }
    );
    Ok(())
}

pub async fn post_list(storage: &SeaOrmStorage) -> Result<(), CliError> {
    let posts = storage.list_posts().await?;

    if posts.is_empty() {
        println!("{} No posts found", "ℹ".bold().blue());
        return Ok(());
    }

    println!("{}", "Posts:".bold().green());
    println!();
    for post in &posts {
        let mut parts = vec![format!("{:>5}  {}", post.id, post.slug.cyan()), post.title.clone()];
        if !post.is_published {
            parts.push("[draft]".dimmed().yellow().to_string());
        }
        if post.is_featured {
            parts.push("★".yellow().to_string());
        }
        println!("  {}", parts.join("  "));
    }
    println!();
    println!(
        "{} Total {} posts",
        "ℹ".bold().blue(),
        posts.len().to_string().green()
    );
    Ok(())
}

/// 直接从存储读取，不经过缓存
pub async fn show_metrics(storage: &SeaOrmStorage, slug: &str) -> Result<(), CliError> {
    validate_slug(slug)?;
    let post = storage
        .find_post_by_slug(slug)
        .await?
        .ok_or_else(|| CliError::CommandError(format!("Post '{}' not found", slug)))?;
    let metrics = storage.load_metrics(&post).await?;

    println!("{} {}", "Metrics for".bold().green(), post.slug.cyan());
    println!("  views:            {}", metrics.view_count);
    println!("  reading seconds:  {}", metrics.total_reading_seconds);
    println!("  average seconds:  {}", metrics.average_reading_seconds);
    println!("  completed reads:  {}", metrics.completed_reads);
    println!("  shares:           {}", metrics.total_shares);
    for (channel, count) in &metrics.shares {
        println!("    {:<12} {}", channel, count);
    }
    if let Some(updated_at) = metrics.updated_at {
        println!(
            "  {}",
            format!("updated {}", updated_at.format("%Y-%m-%d %H:%M:%S UTC")).dimmed()
        );
    }
    Ok(())
}
