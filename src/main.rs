use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::{EnvFilter, fmt};

use addon_releaser::cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_ansi(!cli.no_color)
        .without_time()
        .init();

    // Build a context once, pass everywhere
    let ctx = cli.context();

    let result = match cli.command {
        Commands::Release(args) => addon_releaser::release_run(args, &ctx),
        Commands::Init(args) => addon_releaser::infra::config_init(args, &ctx),
        Commands::Completions(args) => addon_releaser::completion::run(args, &ctx),
    };

    if let Err(err) = result {
        if ctx.no_color {
            eprintln!("Error: {err:#}");
        } else {
            eprintln!("{} {}", "Error:".red().bold(), format!("{err:#}").red());
        }
        std::process::exit(1);
    }
}
