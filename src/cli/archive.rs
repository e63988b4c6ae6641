//! Stats, recent-files and images command implementations

use crate::archive::{format_bytes, AnalyzeTrigger, ArchiveSource};
use crate::cli::output::{format_image, format_recent_table, format_stats, format_stats_json, to_json};
use crate::cli::{ImageIdArgs, ImagesFetchArgs, RecentArgs, StatsArgs};
use colored::Colorize;
use std::sync::Arc;

type CliResult = Result<String, Box<dyn std::error::Error>>;

/// Handle `fleet stats`
pub async fn handle_stats(args: &StatsArgs, source: &dyn ArchiveSource) -> CliResult {
    let (stats, storage) =
        futures::future::try_join(source.processing_stats(), source.storage_stats()).await?;

    if args.json {
        Ok(format_stats_json(&stats, &storage))
    } else {
        Ok(format_stats(&stats, &storage))
    }
}

/// Handle `fleet recent`
pub async fn handle_recent(args: &RecentArgs, source: &dyn ArchiveSource) -> CliResult {
    let files = source.recent_files(args.limit).await?;
    if args.json {
        Ok(to_json(&files))
    } else {
        Ok(format_recent_table(&files))
    }
}

/// Handle `fleet images show`
pub async fn handle_images_show(args: &ImageIdArgs, source: &dyn ArchiveSource) -> CliResult {
    let image = source.image(&args.id).await?;
    Ok(format_image(&image))
}

/// Handle `fleet images fetch`
pub async fn handle_images_fetch(args: &ImagesFetchArgs, source: &dyn ArchiveSource) -> CliResult {
    let bytes = source.image_bytes(&args.id).await?;
    tokio::fs::write(&args.output, &bytes).await?;
    Ok(format!(
        "{} Saved image {} to {} ({})",
        "✓".green(),
        args.id,
        args.output.display(),
        format_bytes(bytes.len() as u64)
    ))
}

/// Handle `fleet images analyze`
///
/// The request is fire-and-forget; the process only waits for it to be sent
/// before exiting. The description shows up in a later `images show`.
pub async fn handle_images_analyze(
    args: &ImageIdArgs,
    source: Arc<dyn ArchiveSource>,
) -> CliResult {
    let trigger = AnalyzeTrigger::new(source);
    trigger.request(&args.id).await?;
    Ok(format!(
        "{} Analysis requested for image {}. Check back with `fleet images show {}`.",
        "✓".green(),
        args.id,
        args.id
    ))
}
