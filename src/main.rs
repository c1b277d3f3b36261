use clap::Parser;
use std::path::PathBuf;
use std::time::Instant;

const EXIT_SUCCESS: i32 = 0;
const EXIT_AUTH: i32 = 1;
const EXIT_NETWORK: i32 = 2;
const EXIT_OUTPUT: i32 = 3;
const EXIT_CONFIG: i32 = 4;

#[derive(Parser, Debug)]
#[command(name = "pr-lens")]
#[command(about = "GitHub pull-request triage metrics and plots", long_about = None)]
#[command(version)]
struct Cli {
    /// Repository to analyze, as owner/repo (overrides REPO_NAME)
    #[arg(long)]
    repo: Option<String>,

    /// Branch to compare each PR against (overrides MAIN_BRANCH)
    #[arg(long)]
    branch: Option<String>,

    /// Write the full metrics table to this CSV file
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Where to save the 3D scatter plot
    #[arg(long, default_value = "pr-scatter.png")]
    plot: PathBuf,

    /// Skip rendering the plot
    #[arg(long)]
    no_plot: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    // Install rustls crypto provider (required for rustls 0.23+)
    rustls::crypto::ring::default_provider()
        .install_default()
        .expect("Failed to install rustls crypto provider");

    let cli = Cli::parse();
    let start_time = Instant::now();

    // Resolve configuration before touching the network.
    let settings = match pr_lens::config::resolve(
        cli.repo.as_deref(),
        cli.branch.as_deref(),
        cli.csv.clone(),
        cli.plot.clone(),
        cli.no_plot,
    ) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Config error: {}", e);
            std::process::exit(EXIT_CONFIG);
        }
    };

    if cli.verbose {
        eprintln!(
            "Analyzing {} against branch '{}'",
            settings.repo, settings.main_branch
        );
    }

    // Create GitHub client
    let client = match pr_lens::github::create_client(&settings) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to create GitHub client: {}", e);
            std::process::exit(EXIT_NETWORK);
        }
    };

    // Fetch and derive. Any API error aborts before anything is written.
    let prs = match pr_lens::pipeline::run(&client, &settings, cli.verbose).await {
        Ok(prs) => prs,
        Err(e) => {
            eprintln!("Fetch failed: {:#}", e);
            let code = match e.downcast_ref::<pr_lens::github::ApiError>() {
                Some(api) if api.kind() == pr_lens::github::ApiErrorKind::Auth => EXIT_AUTH,
                _ => EXIT_NETWORK,
            };
            std::process::exit(code);
        }
    };

    if cli.verbose {
        eprintln!(
            "Fetched and derived {} PRs in {:?}",
            prs.len(),
            start_time.elapsed()
        );
    }

    // Stdout report
    let use_colors = pr_lens::output::should_use_colors();
    let repo_name = settings.repo.to_string();
    println!(
        "{}",
        pr_lens::output::summary::format_summary(&repo_name, &prs, use_colors)
    );
    if !prs.is_empty() {
        println!();
        println!(
            "{}",
            pr_lens::output::summary::format_top_lists(&prs, 10, use_colors)
        );
    }

    // CSV output only when requested.
    if let Some(csv_path) = &settings.csv_path {
        if let Err(e) = pr_lens::output::csv::write_csv(csv_path, &prs) {
            eprintln!("CSV write failed: {:#}", e);
            std::process::exit(EXIT_OUTPUT);
        }
        println!("Wrote {} rows to {}", prs.len(), csv_path.display());
    }

    // Plot unless suppressed. An empty set is a notice, not a failure.
    if !settings.no_plot {
        if prs.is_empty() {
            eprintln!("Skipping plot: no pull requests to draw.");
        } else if let Err(e) =
            pr_lens::plot::render_scatter(&settings.plot_path, &repo_name, &prs)
        {
            eprintln!("Plot failed: {:#}", e);
            std::process::exit(EXIT_OUTPUT);
        } else {
            println!("Saved scatter plot to {}", settings.plot_path.display());
        }
    }

    std::process::exit(EXIT_SUCCESS);
}
