mod ai;
mod calendar;
mod cli;
mod config;
mod error;
mod github;
mod orchestrator;

use clap::Parser;
use cli::{Cli, Commands};
use config::Config;
use error::Result;
use indicatif::{ProgressBar, ProgressStyle};
use orchestrator::Orchestrator;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse CLI arguments
    let cli = Cli::parse();

    init_tracing(cli.verbose);

    // Validate CLI arguments
    if let Err(e) = cli.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle subcommands
    if let Some(command) = &cli.command {
        return handle_command(command);
    }

    // Load config
    let config = if let Some(config_path) = &cli.config {
        Config::load_from(config_path)?
    } else {
        Config::load_or_create_default()?
    };

    // Apply CLI overrides to config
    let config = apply_cli_overrides(config, &cli);
    config.validate()?;

    // Verify credentials are available (from env or config)
    if let Err(e) = config.github_token() {
        eprintln!("Error: {}", e);
        eprintln!("\nPlease either:");
        eprintln!("  1. Set the GITHUB_TOKEN environment variable");
        eprintln!(
            "  2. Add github_token to your config file at: {}",
            Config::default_config_path()?.display()
        );
        std::process::exit(1);
    }
    if let Err(e) = config.ai_api_key() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    run_report(config).await
}

async fn run_report(config: Config) -> Result<()> {
    println!("weekly-recap v{}", env!("CARGO_PKG_VERSION"));
    println!("AI-powered weekly activity report for GitHub and Google Calendar\n");

    let orchestrator = Orchestrator::new(config)?;
    let window = orchestrator.window();

    println!(
        "Reporting on {} from {} to {}",
        orchestrator.config().github_username,
        window.start_date(),
        window.end_date()
    );
    println!(
        "Repositories: {}\n",
        orchestrator.config().repositories.join(", ")
    );

    // Collect GitHub activity
    let spinner = new_spinner(format!(
        "Collecting activity from {} repositories...",
        orchestrator.config().repositories.len()
    ));
    let activity = orchestrator.collect_activity(&window).await;
    let total_commits: usize = activity.values().map(|repo| repo.commits.len()).sum();
    let total_prs: usize = activity.values().map(|repo| repo.pull_requests.len()).sum();
    spinner.finish_with_message(format!(
        "Collected {} commits and {} pull requests",
        total_commits, total_prs
    ));

    // Collect calendar meetings
    let meetings = if orchestrator.config().calendar_enabled {
        let spinner = new_spinner("Fetching calendar events...".to_string());
        let meetings = orchestrator.collect_meetings(&window).await?;
        spinner.finish_with_message(format!("Found {} meetings", meetings.len()));
        meetings
    } else {
        Vec::new()
    };

    // Generate the report
    let spinner = new_spinner(format!(
        "Generating report using {}...",
        orchestrator.config().ai_provider
    ));
    let path = orchestrator
        .generate_report(&activity, &meetings, &window)
        .await?;
    spinner.finish_with_message("Report generated");

    println!("\n✓ Report saved to: {}", path.display());

    Ok(())
}

fn handle_command(command: &Commands) -> Result<()> {
    match command {
        Commands::Init { force } => {
            let config_path = Config::default_config_path()?;

            if config_path.exists() && !force {
                eprintln!("Config file already exists at: {}", config_path.display());
                eprintln!("Use --force to overwrite");
                std::process::exit(1);
            }

            Config::create_default()?;
            println!("✓ Created config file at: {}", config_path.display());
            println!("\nEdit it to set your GitHub username and repositories, then provide:");
            println!("  - GITHUB_TOKEN for the GitHub API");
            println!("  - GROQ_API_KEY or ANTHROPIC_AUTH_TOKEN for report generation");
            println!("  - GOOGLE_CALENDAR_TOKEN for calendar events (optional)");
        }
        Commands::Config => {
            let config = Config::load_or_create_default()?;
            let toml_str = toml::to_string_pretty(&config)?;
            println!("Current configuration:\n");
            println!("{}", toml_str);
        }
    }
    Ok(())
}

fn init_tracing(verbose: u8) {
    let filter = match verbose {
        0 => EnvFilter::from_default_env(),
        1 => EnvFilter::new("weekly_recap=debug"),
        _ => EnvFilter::new("debug"),
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

fn new_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.cyan} {msg}")
            .unwrap(),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(std::time::Duration::from_millis(100));
    spinner
}

fn apply_cli_overrides(mut config: Config, cli: &Cli) -> Config {
    if let Some(ref username) = cli.username {
        config.github_username = username.clone();
    }

    if let Some(days) = cli.days {
        config.days_to_report = days;
    }

    if let Some(ref repos) = cli.repos {
        config.repositories = repos.clone();
    }

    if let Some(ref provider) = cli.provider {
        config.ai_provider = provider.clone();
    }

    if let Some(ref model) = cli.model {
        config.ai_model = Some(model.clone());
    }

    if let Some(ref output_dir) = cli.output_dir {
        config.output_dir = output_dir.clone();
    }

    if cli.no_calendar {
        config.calendar_enabled = false;
    }

    config
}
