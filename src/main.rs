//! gohugo - drive the Hugo static site generator.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gohugo::commands::{Command, Workbench};
use gohugo::config::ConfigLoader;
use gohugo::display::{ConsoleNotifier, ConsoleSurfaceFactory, StdinPrompter};
use gohugo::server::ETX;
use gohugo::ui::{MessageOptions, Notifier};

#[derive(Parser)]
#[command(
    name = "gohugo",
    about = "Create, theme, serve and build Hugo sites",
    version
)]
struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short = 'v', long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Project root. Defaults to the current directory.
    #[arg(short = 'w', long, global = true)]
    workspace: Option<PathBuf>,

    /// Site config file, relative to the project root.
    #[arg(short, long, global = true)]
    config: Option<String>,

    /// Dev server port.
    #[arg(short, long, global = true)]
    port: Option<u16>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the installed Hugo version.
    Version,
    /// Create a new site.
    NewSite,
    /// Create new content from an archetype.
    NewContent,
    /// Install a theme from a GitHub repository URL.
    AddTheme {
        /// Repository URL. Prompted for when omitted.
        url: Option<String>,
    },
    /// Pick a theme from the Hugo theme registry.
    SelectTheme,
    /// Run the dev server (type `restart`, `stop` or `quit`; Ctrl-C stops).
    Server,
    /// Production build.
    Build,
}

fn init_tracing(verbosity: u8) {
    let level = match verbosity {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let root = cli
        .workspace
        .or_else(|| std::env::current_dir().ok())
        .or_else(dirs::home_dir)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut settings = match ConfigLoader::new(&root).load() {
        Ok(settings) => settings,
        Err(e) => {
            notifier.notify(&e.to_string(), MessageOptions::error());
            return ExitCode::FAILURE;
        }
    };
    if let Some(config) = cli.config {
        settings.config = config;
    }
    if let Some(port) = cli.port {
        settings.port = port;
    }
    tracing::info!(root = %root.display(), config = %settings.config, port = settings.port, "Starting gohugo");

    let mut workbench = match Workbench::new(
        root,
        settings,
        Arc::clone(&notifier),
        Arc::new(StdinPrompter),
        Arc::new(ConsoleSurfaceFactory),
    ) {
        Ok(workbench) => workbench,
        Err(e) => {
            notifier.notify(&e.to_string(), MessageOptions::error());
            return ExitCode::FAILURE;
        }
    };

    match cli.command {
        Commands::Version => workbench.dispatch(Command::Version).await,
        Commands::NewSite => workbench.dispatch(Command::NewSite).await,
        Commands::NewContent => workbench.dispatch(Command::NewContent).await,
        Commands::AddTheme { url } => workbench.dispatch(Command::AddTheme(url)).await,
        Commands::SelectTheme => workbench.dispatch(Command::SelectTheme).await,
        Commands::Build => workbench.dispatch(Command::Build).await,
        Commands::Server => run_server(&mut workbench).await,
    }
    ExitCode::SUCCESS
}

/// Start the dev server and drive it from stdin until the user quits.
async fn run_server(workbench: &mut Workbench) {
    workbench.dispatch(Command::StartServer).await;
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                workbench.server().handle_input(&[ETX]);
                break;
            }
            line = lines.next_line() => match line {
                Ok(Some(line)) => match line.trim() {
                    "r" | "restart" => workbench.dispatch(Command::StartServer).await,
                    "s" | "stop" => workbench.dispatch(Command::StopServer).await,
                    "q" | "quit" | "exit" => {
                        workbench.server().surface_closed();
                        break;
                    }
                    "" => {}
                    other => println!("Unknown input `{other}`: use restart, stop or quit"),
                },
                Ok(None) | Err(_) => {
                    workbench.server().surface_closed();
                    break;
                }
            },
        }
    }
}
