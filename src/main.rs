//! CLI entry point for gazette

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use gazette_rs::{commands, server, Gazette};

#[derive(Parser)]
#[command(name = "gazette")]
#[command(version)]
#[command(about = "A static blog generator with responsive images and scoped styles", long_about = None)]
struct Cli {
    /// Set the base directory (defaults to current directory)
    #[arg(short, long, global = true)]
    cwd: Option<PathBuf>,

    /// Enable debug output
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new site
    Init {
        /// Directory to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        folder: PathBuf,
    },

    /// Create a new post
    New {
        /// Title of the new post
        title: String,

        /// Author (defaults to the site author)
        #[arg(short, long)]
        author: Option<String>,

        /// Route of the post (defaults to /<slug>)
        #[arg(short, long)]
        path: Option<String>,
    },

    /// Generate static files
    #[command(alias = "g")]
    Generate {
        /// Watch for file changes
        #[arg(short, long)]
        watch: bool,
    },

    /// Start a local server
    #[command(alias = "s")]
    Server {
        /// Port to listen on
        #[arg(short, long, default_value = "4000")]
        port: u16,

        /// IP address to bind to
        #[arg(short, long, default_value = "localhost")]
        ip: String,

        /// Open browser automatically
        #[arg(short, long)]
        open: bool,

        /// Enable static mode (no file watching)
        #[arg(long)]
        r#static: bool,
    },

    /// Remove the public folder
    Clean,

    /// List every post
    List,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.debug {
        "gazette_rs=debug,info"
    } else {
        "gazette_rs=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let base_dir = match cli.cwd {
        Some(dir) => dir,
        None => std::env::current_dir().context("Failed to read the current directory")?,
    };

    match cli.command {
        Commands::Init { folder } => {
            let target_dir = if folder.is_absolute() {
                folder
            } else {
                base_dir.join(folder)
            };
            tracing::info!("Initializing site in {:?}", target_dir);
            commands::init::init_site(&target_dir)?;
            println!("Initialized new site in {:?}", target_dir);
        }

        Commands::New {
            title,
            author,
            path,
        } => {
            let gazette = Gazette::new(&base_dir)?;
            tracing::info!("Creating new post: {}", title);
            commands::new::create_post(&gazette, &title, author.as_deref(), path.as_deref())?;
        }

        Commands::Generate { watch } => {
            let gazette = Gazette::new(&base_dir)?;
            tracing::info!("Generating static files...");

            commands::generate::run(&gazette)?;
            println!("Generated successfully!");

            if watch {
                commands::generate::watch(&gazette).await?;
            }
        }

        Commands::Server {
            port,
            ip,
            open,
            r#static,
        } => {
            let gazette = Gazette::new(&base_dir)?;

            tracing::info!("Generating static files...");
            gazette.generate()?;

            tracing::info!("Starting server at http://{}:{}", ip, port);
            server::start(&gazette, &ip, port, !r#static, open).await?;
        }

        Commands::Clean => {
            let gazette = Gazette::new(&base_dir)?;
            tracing::info!("Cleaning public folder...");
            gazette.clean()?;
            println!("Cleaned successfully!");
        }

        Commands::List => {
            let gazette = Gazette::new(&base_dir)?;
            commands::list::run(&gazette)?;
        }
    }

    Ok(())
}
