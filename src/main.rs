//! refsort CLI entry point.

use clap::Parser;
use refsort::cli::commands::{self, RunContext};
use refsort::cli::{Cli, Commands, OutputFormat, insert_override};
use refsort::error::Error;
use std::process::ExitCode;

fn main() -> ExitCode {
    let cli = Cli::parse();

    if cli.no_color {
        colored::control::set_override(false);
    }

    // Set up tracing based on verbosity
    init_tracing(cli.verbose, cli.quiet);

    let json = cli.json || cli.format == OutputFormat::Json;

    match run(&cli, json) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if json {
                eprintln!("{}", e.to_structured_json());
            } else if !cli.quiet {
                if let Some(hint) = e.hint() {
                    eprintln!("Error: {e}\n  Hint: {hint}");
                } else {
                    eprintln!("Error: {e}");
                }
            }
            ExitCode::from(e.exit_code())
        }
    }
}

fn init_tracing(verbose: u8, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    if quiet {
        return;
    }

    // Honor RUST_LOG if set, otherwise use verbosity flag
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        match verbose {
            0 => EnvFilter::new("warn"),
            1 => EnvFilter::new("info"),
            2 => EnvFilter::new("debug,rusqlite=info"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .without_time()
        .init();
}

fn run(cli: &Cli, json: bool) -> Result<(), Error> {
    let ctx = RunContext::new(
        cli.db.as_deref(),
        cli.workspace.as_deref(),
        cli.owner.as_deref(),
        json,
    );

    match &cli.command {
        Commands::Version => commands::version::execute(json),

        // List editing
        Commands::Add {
            content,
            prepend,
            append,
        } => commands::list::execute_add(&ctx, content, insert_override(*prepend, *append)),
        Commands::Import {
            file,
            prepend,
            append,
        } => commands::list::execute_import(
            &ctx,
            file.as_deref(),
            insert_override(*prepend, *append),
        ),
        Commands::List => commands::list::execute_list(&ctx),
        Commands::Remove { position } => commands::list::execute_remove(&ctx, *position),
        Commands::Move { from, to } => commands::list::execute_move(&ctx, *from, *to),
        Commands::Clear => commands::list::execute_clear(&ctx),
        Commands::Title { title } => commands::list::execute_title(&ctx, title.as_deref()),

        // Export
        Commands::Export {
            output,
            links,
            no_links,
            html,
        } => {
            let links = match (*links, *no_links) {
                (true, _) => Some(true),
                (_, true) => Some(false),
                _ => None,
            };
            commands::export::execute(&ctx, output.as_deref(), links, *html)
        }

        // Project store
        Commands::Open { id } => commands::project::execute_open(&ctx, id),
        Commands::Close => commands::project::execute_close(&ctx),
        Commands::Save => commands::project::execute_save(&ctx),
        Commands::Status => commands::project::execute_status(&ctx),
        Commands::Projects { limit } => commands::project::execute_projects(&ctx, *limit),

        // Preferences
        Commands::Settings {
            prepend,
            copy_with_links,
        } => commands::settings::execute(*prepend, *copy_with_links, json),

        // Shell completions
        Commands::Completions { shell } => commands::completions::execute(shell),
    }
}
