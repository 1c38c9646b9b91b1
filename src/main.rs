use clap::{Parser, Subcommand};
use statue::config::{self, SiteConfig};
use statue::preferences::{FileStore, FontScale};
use statue::{content, loader, output, scan};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "statue")]
#[command(about = "Content layer for markdown static sites")]
#[command(long_about = "\
Content layer for markdown static sites

Your filesystem is the data source. First-level directories under the content
root become navigation sections, nested directories become subsections, and
markdown files become pages.

Content structure:

  content/
  ├── faq.md                  # Page → /faq
  ├── about-us/               # Section → slug \"about-us\", title \"About Us\"
  ├── blog/
  │   ├── index.md            # Section title and description (front matter)
  │   ├── hello-world.md      # Page → /blog/hello-world
  │   └── 2024/               # Nested section → /blog/2024
  ├── _drafts/                # Hidden (underscore prefix)
  └── .git/                   # Hidden (dot prefix)

Sections are sorted by slug. Titles come from index.md front matter, then its
first heading, then the folder name (\"about-us\" → \"About Us\").

Run 'statue gen-config' to generate a documented statue.toml.")]
#[command(version)]
struct Cli {
    /// Config file
    #[arg(long, default_value = config::CONFIG_FILENAME, global = true)]
    config: PathBuf,

    /// Content directory (overrides content_root from the config file)
    #[arg(long, env = "STATUE_CONTENT_ROOT", global = true)]
    source: Option<PathBuf>,

    /// Log filter used when RUST_LOG is unset (e.g. "debug", "statue=trace")
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List navigation sections
    Directories {
        /// Include nested sections
        #[arg(long)]
        all: bool,
        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// List content items
    Content {
        /// Only items directly inside this section
        #[arg(long)]
        directory: Option<String>,
        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Print the page data for a route as JSON
    Load {
        /// Request path, e.g. "/blog/hello-world"
        path: String,
    },
    /// List every route the site prerenders
    Routes {
        /// Print JSON instead of a listing
        #[arg(long)]
        json: bool,
    },
    /// Load every route and report what each one is
    Check,
    /// Read or change the reader font scale
    FontScale {
        #[command(subcommand)]
        action: FontScaleAction,
    },
    /// Print a stock statue.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum FontScaleAction {
    /// Print the current scale
    Get,
    /// Set the scale (clamped to 0.5..=1.5)
    Set {
        #[arg(allow_negative_numbers = true)]
        value: f64,
    },
    /// Step the scale up by 0.1
    Increase,
    /// Step the scale down by 0.1
    Decrease,
    /// Restore the default scale of 1
    Reset,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    if let Command::GenConfig = cli.command {
        print!("{}", config::stock_config_toml());
        return Ok(());
    }

    let site = resolve_config(&cli)?;
    init_thread_pool(&site.processing);
    debug!(
        content_root = %site.content_root.display(),
        "resolved configuration"
    );

    match cli.command {
        Command::Directories { all, json } => {
            let entries = if all {
                scan::get_all_directories(&site)?
            } else {
                scan::get_content_directories(&site)?
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
            } else {
                output::print_directories(&entries);
            }
        }
        Command::Content { directory, json } => {
            let items = match directory {
                Some(slug) => content::get_content_by_directory(&site, &slug)?,
                None => content::get_all_content(&site)?,
            };
            if json {
                println!("{}", serde_json::to_string_pretty(&items)?);
            } else {
                output::print_content(&items);
            }
        }
        Command::Load { path } => {
            let page = loader::load(&site, &path)?;
            println!("{}", serde_json::to_string_pretty(&page)?);
        }
        Command::Routes { json } => {
            let routes = loader::prerender_routes(&site)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&routes)?);
            } else {
                output::print_routes(&routes);
            }
        }
        Command::Check => {
            println!("==> Checking {}", site.content_root.display());
            let pages = loader::prerender(&site)?;
            output::print_check_output(&pages);
            println!("==> Content is valid");
        }
        Command::FontScale { action } => {
            let mut scale = FontScale::load(FileStore::new(&site.preferences.path))?;
            let value = match action {
                FontScaleAction::Get => scale.get(),
                FontScaleAction::Set { value } => scale.set(value)?,
                FontScaleAction::Increase => scale.increase()?,
                FontScaleAction::Decrease => scale.decrease()?,
                FontScaleAction::Reset => scale.reset()?,
            };
            output::print_font_scale(value);
        }
        // Printed before config resolution.
        Command::GenConfig => {}
    }

    Ok(())
}

/// Send `tracing` output to stderr so JSON on stdout stays machine-readable.
///
/// `RUST_LOG` wins over `--log-level` when set.
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Load `statue.toml` and apply the `--source` override.
fn resolve_config(cli: &Cli) -> Result<SiteConfig, config::ConfigError> {
    let mut site = config::load_config(&cli.config)?;
    if let Some(source) = &cli.source {
        site.content_root = source.clone();
    }
    site.validate()?;
    Ok(site)
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores. User can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
