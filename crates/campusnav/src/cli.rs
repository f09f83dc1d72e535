use clap::{ArgAction, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(name = "campusnav")]
#[command(author, version, about)]
#[command(long_about = "An interactive campus map with route finding.\n\n\
    Talks to a campus navigation server for building data, shortest paths\n\
    and the campus minimum spanning tree.\n\n\
    Examples:\n  \
    campusnav                           Open the map (fullscreen)\n  \
    campusnav --windowed                Open the map in a window\n  \
    campusnav path Gymnasium Canteen    Print a route in the terminal\n  \
    campusnav mst                       Print the spanning tree summary")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Navigation server base URL (overrides server.base_url)
    #[arg(long, global = true, value_name = "URL")]
    pub server: Option<String>,

    /// Launch in a window instead of fullscreen
    #[arg(long, global = false)]
    pub windowed: bool,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List campus buildings
    Buildings,

    /// Find the shortest path between two buildings
    Path {
        /// Starting building
        source: String,

        /// Destination building
        destination: String,
    },

    /// Show the minimum spanning tree of the campus graph
    Mst,

    /// Show details of one building
    Info {
        /// Building name
        name: String,
    },

    /// View and modify configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Display current configuration
    Show,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. server.base_url, map.center, map.zoom, defaults.theme)
        key: String,

        /// Value to set
        value: String,
    },
}

#[derive(Clone, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    Powershell,
}

impl Cli {
    pub fn run(self) -> anyhow::Result<()> {
        let config = crate::config::Config::load_or_default();
        let base_url = self
            .server
            .clone()
            .unwrap_or_else(|| config.base_url().to_string());

        match self.command {
            Some(Commands::Buildings) => crate::commands::query::buildings(&base_url),
            Some(Commands::Path {
                source,
                destination,
            }) => crate::commands::query::path(&base_url, &source, &destination),
            Some(Commands::Mst) => crate::commands::query::mst(&base_url),
            Some(Commands::Info { name }) => crate::commands::query::info(&base_url, &name),
            Some(Commands::Config { command }) => crate::commands::config::run(command),
            Some(Commands::Completion { shell }) => {
                crate::commands::completion::run(shell);
                Ok(())
            }
            Some(Commands::Version) => {
                println!("campusnav {}", env!("CARGO_PKG_VERSION"));
                Ok(())
            }
            None => crate::app::run(config, base_url, self.windowed),
        }
    }
}
