mod cli;
mod progress;

use anyhow::Result;
use cli::Cli;
use humansize::{format_size, DECIMAL};
use inquire::Confirm;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use uclone_core::{clone_project, stats};

fn main() -> Result<()> {
    let cli = Cli::parse_args();

    setup_logging(&cli)?;

    info!("Starting uclone");

    let request = cli.clone_request();
    let mut options = cli.clone_options();

    if cli.interactive && !options.force_delete && cli.target_dir.exists() {
        options.force_delete = Confirm::new(&format!(
            "Target directory {} already exists. Delete it?",
            cli.target_dir.display()
        ))
        .with_default(false)
        .prompt()?;
    }

    let source_stats = stats::scan(&cli.source_dir);
    info!(
        "Size of dir: {} ({} entries)",
        format_size(source_stats.bytes, DECIMAL),
        source_stats.entries
    );
    info!("This can take a while depending on the size of the project");

    let bar = progress::copy_progress_bar(source_stats.entries, cli.quiet)?;
    let result = clone_project(&request, &options, &mut || bar.inc(1));
    bar.finish_and_clear();

    let report = match result {
        Ok(report) => report,
        Err(err) => {
            error!("Unable to clone {:?}: {}", cli.source_dir, err);
            return Err(err.into());
        }
    };

    if options.dry_run {
        warn!("Dry run - nothing was written to {:?}", cli.target_dir);
    } else {
        let target_stats = stats::scan(&cli.target_dir);
        info!("New dir location: {:?}", cli.target_dir);
        info!("Size of new dir: {}", format_size(target_stats.bytes, DECIMAL));
    }

    println!("Clone complete!");
    println!("  Directories created: {}", report.directories_created);
    println!("  Directories ignored: {}", report.directories_ignored);
    println!("  Directories already present: {}", report.directories_conflicted);
    println!("  Directories unreadable: {}", report.directories_unreadable);
    println!("  Files copied: {}", report.files_copied);
    println!("  Files rewritten: {}", report.files_rewritten);
    println!("  Files skipped: {}", report.files_skipped);
    println!("  Files failed: {}", report.files_failed);
    println!("  Paths renamed: {}", report.paths_renamed);
    println!("  Redirects added: {}", report.redirects_added);

    info!("uclone completed successfully");
    Ok(())
}

fn setup_logging(cli: &Cli) -> Result<()> {
    let filter = if cli.quiet {
        EnvFilter::new("error")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_target(false)
                .with_thread_ids(false)
                .with_thread_names(false)
                .compact()
        )
        .with(filter)
        .init();

    Ok(())
}
