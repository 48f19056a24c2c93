//! Command-line front end for the invoice sorter.

use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, Level};
use tracing_subscriber::FmtSubscriber;

use trifac_core::models::RunReport;
use trifac_core::{PdfTextSource, SortConfig, Sorter};

/// Sort loose PDF invoices into <year>/Facture fournisseur/<month> folders
#[derive(Parser)]
#[command(name = "trifac")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Optional year filter (e.g. 2024) and extra keywords, in any order
    args: Vec<String>,

    /// Directory to sort
    #[arg(short, long, default_value = ".")]
    root: PathBuf,

    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Classify and report without moving anything (ZIP archives are
    /// counted but not expanded)
    #[arg(short, long)]
    dry_run: bool,

    /// Print the full statistics block after the run
    #[arg(long)]
    stats: bool,

    /// Number of parallel workers (0 = number of CPUs)
    #[arg(short = 'j', long, default_value = "0")]
    jobs: usize,

    /// Path to a JSON config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Delete ZIP archives after extracting them
    #[arg(long)]
    remove_archives: bool,

    /// Directory with OCR models for scanned PDFs
    #[arg(short, long)]
    model_dir: Option<PathBuf>,

    /// Exit non-zero if any document could not be processed
    #[arg(long)]
    fail_on_error: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    let mut config = match &cli.config {
        Some(path) => SortConfig::from_file(path)
            .map_err(|e| anyhow::anyhow!("failed to load config {}: {}", path.display(), e))?,
        None => SortConfig::default(),
    };

    // Positional arguments work like the folder names they target: a
    // standalone year narrows the run, anything else is an extra keyword.
    let (year, keywords) = split_positional(&cli.args);
    if let Some(year) = year {
        config.year_filter = Some(year);
    }
    config.keywords.extra.extend(keywords);
    config.dry_run = cli.dry_run;
    if cli.jobs > 0 {
        config.workers = cli.jobs;
    }
    if cli.remove_archives {
        config.archive.remove_after_extract = true;
    }

    if !cli.root.is_dir() {
        anyhow::bail!("not a directory: {}", cli.root.display());
    }

    println!(
        "{} Sorting {}{}",
        style("ℹ").blue(),
        style(cli.root.display()).bold(),
        if config.dry_run {
            style(" (dry run)").yellow().to_string()
        } else {
            String::new()
        }
    );
    if let Some(year) = config.year_filter {
        println!("{} Keeping only documents dated {}", style("ℹ").blue(), year);
    }

    let mut source = PdfTextSource::new();
    let model_dir = cli.model_dir.clone().or_else(|| config.ocr.model_dir.clone());
    if let Some(model_dir) = &model_dir {
        let engine = trifac_core::PureOcrEngine::from_dir(model_dir)
            .map_err(|e| anyhow::anyhow!("failed to load OCR models: {}", e))?;
        debug!("OCR models loaded from {}", model_dir.display());
        source = source.with_ocr(Arc::new(engine));
    }

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files")
            .unwrap()
            .progress_chars("=>-"),
    );

    let progress_bar = pb.clone();
    let sorter = Sorter::new(config, Arc::new(source)).with_progress(move |done, total| {
        progress_bar.set_length(total as u64);
        progress_bar.set_position(done as u64);
    });

    let report = sorter.run(&cli.root).await?;
    pb.finish_and_clear();

    print_report(&report, cli.stats || cli.verbose > 0);

    if cli.fail_on_error && report.stats.errors > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// A bare four-digit year among the positional arguments becomes the
/// year filter; everything else is an extra match keyword.
fn split_positional(args: &[String]) -> (Option<i32>, Vec<String>) {
    let mut year = None;
    let mut keywords = Vec::new();
    for arg in args {
        if year.is_none() && arg.len() == 4 && arg.chars().all(|c| c.is_ascii_digit()) {
            if let Ok(y) = arg.parse::<i32>() {
                year = Some(y);
                continue;
            }
        }
        keywords.push(arg.clone());
    }
    (year, keywords)
}

fn print_report(report: &RunReport, full_stats: bool) {
    let stats = &report.stats;

    println!();
    println!(
        "{} Processed {} file(s) in {:.1?}",
        style("✓").green(),
        stats.files_found,
        report.elapsed
    );
    println!(
        "   {} sorted, {} commande, {} skipped, {} error(s)",
        style(stats.sorted).green(),
        style(stats.commande).cyan(),
        stats.skipped,
        style(stats.errors).red()
    );

    if full_stats {
        println!();
        println!("{}", style("Statistics:").bold());
        println!("  files found          {}", stats.files_found);
        println!("  sorted by date       {}", stats.sorted);
        println!("  routed to commande   {}", stats.commande);
        println!("  skipped (year)       {}", stats.skipped);
        println!("  left unsorted        {}", stats.unsorted);
        println!("  errors               {}", stats.errors);
        println!("  OCR fallbacks        {}", stats.ocr_processed);
        println!("  archives extracted   {}", stats.archives_extracted);
        println!("  empty dirs removed   {}", stats.empty_dirs_removed);
        println!("  success rate         {:.1}%", stats.success_rate());
        println!("  avg per file         {:.1?}", report.avg_per_file());
    }

    if !report.failures.is_empty() {
        println!();
        println!("{}", style("Files left in place:").red());
        for (path, reason) in &report.failures {
            println!("  - {}: {}", path.display(), reason);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_positional_year_and_keywords() {
        let args = vec!["2024".to_string(), "quittance".to_string()];
        let (year, keywords) = split_positional(&args);
        assert_eq!(year, Some(2024));
        assert_eq!(keywords, vec!["quittance".to_string()]);
    }

    #[test]
    fn test_split_positional_only_first_year_filters() {
        let args = vec!["2024".to_string(), "2023".to_string()];
        let (year, keywords) = split_positional(&args);
        assert_eq!(year, Some(2024));
        assert_eq!(keywords, vec!["2023".to_string()]);
    }

    #[test]
    fn test_split_positional_no_year() {
        let args = vec!["abonnement".to_string(), "123".to_string()];
        let (year, keywords) = split_positional(&args);
        assert_eq!(year, None);
        assert_eq!(keywords.len(), 2);
    }
}
