use clap::{Args, Parser, Subcommand, ValueEnum};
use log::info;
use spotify_playlist::{
    client::SPOTIFY_API_URL, BatchMutator, DedupStrategy, EquivalenceKey, Order, PlaylistRef,
    PlaylistTools, SortSpec, Spotify, DEFAULT_BATCH_CAP,
};

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    /// OAuth bearer token with the playlist-read and playlist-modify scopes
    #[arg(long, env = "SPOTIFY_TOKEN", hide_env_values = true)]
    token: String,
    #[arg(long, env = "SPOTIFY_API_BASE", default_value = SPOTIFY_API_URL)]
    api_base: String,
    /// Most tracks sent in a single request
    #[arg(long, env = "SPOTIFY_BATCH_CAP", default_value_t = DEFAULT_BATCH_CAP)]
    batch_cap: usize,
    /// Work out the changes without writing them
    #[arg(long, global = true)]
    dry_run: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct Target {
    /// Playlist name, matched case-insensitively
    name: Option<String>,
    /// Playlist id, skips the name lookup
    #[arg(long)]
    id: Option<String>,
}

impl Target {
    fn playlist(self) -> PlaylistRef {
        match (self.id, self.name) {
            (Some(id), _) => PlaylistRef::Id(id),
            (None, name) => PlaylistRef::Name(name.unwrap_or_default()),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Reorders a playlist by metadata or an audio feature
    Sort {
        #[command(flatten)]
        target: Target,
        /// title, artist, album, release_date, duration, popularity, or an
        /// audio feature such as energy or tempo. Unknown keys sort by title.
        #[arg(long, short, default_value = "title")]
        by: String,
        #[arg(long)]
        descending: bool,
    },
    /// Removes exact duplicates, then songs repeated under another release
    Dedup {
        #[command(flatten)]
        target: Target,
        #[arg(long, value_enum, default_value_t = Strategy::KeepFirst)]
        strategy: Strategy,
        /// Skip the title and artist pass
        #[arg(long)]
        exact_only: bool,
    },
    /// Removes tracks that are already in other playlists
    Clean {
        #[command(flatten)]
        target: Target,
        /// Comma separated names of the playlists to check against
        #[arg(long, short, value_delimiter = ',', required = true)]
        against: Vec<String>,
        /// Match on title and primary artist instead of the exact track
        #[arg(long)]
        fuzzy: bool,
    },
    /// Appends every track of a playlist to another, creating it if needed
    Copy {
        #[command(flatten)]
        target: Target,
        /// Name of the playlist to copy into
        #[arg(long)]
        to: String,
        /// Leave out tracks the destination already has
        #[arg(long)]
        skip_existing: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    /// Keep the first copy of each track
    KeepFirst,
    /// Remove every copy of a duplicated track
    RemoveAll,
}

impl From<Strategy> for DedupStrategy {
    fn from(strategy: Strategy) -> Self {
        match strategy {
            Strategy::KeepFirst => DedupStrategy::KeepFirst,
            Strategy::RemoveAll => DedupStrategy::RemoveAll,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let spotify = Spotify::with_base_url(&cli.token, &cli.api_base)?;
    let tools = PlaylistTools::new(spotify, BatchMutator::new(cli.batch_cap)).dry_run(cli.dry_run);
    if cli.dry_run {
        info!("Dry run, no playlist will be modified");
    }

    match cli.command {
        Command::Sort {
            target,
            by,
            descending,
        } => {
            let order = if descending {
                Order::Descending
            } else {
                Order::Ascending
            };
            let report = tools
                .sort_playlist(&target.playlist(), SortSpec::parse(&by, order))
                .await?;
            if report.changed {
                println!(
                    "Sorted {} tracks of playlist {} by {}",
                    report.tracks, report.playlist_id, report.spec.key
                );
            } else {
                println!("Playlist {} is already sorted", report.playlist_id);
            }
        }
        Command::Dedup {
            target,
            strategy,
            exact_only,
        } => {
            let report = tools
                .remove_duplicates(&target.playlist(), strategy.into(), !exact_only)
                .await?;
            println!("Removed {} exact duplicates", report.exact_removed);
            if !exact_only {
                println!("Removed {} title and artist duplicates", report.fuzzy_removed);
            }
            println!("{} tracks remain", report.remaining);
        }
        Command::Clean {
            target,
            against,
            fuzzy,
        } => {
            let key = if fuzzy {
                EquivalenceKey::Fuzzy
            } else {
                EquivalenceKey::Identity
            };
            let report = tools.clean_against(&target.playlist(), &against, key).await?;
            for name in &report.missing_references {
                println!("Playlist '{name}' not found, skipped");
            }
            if report.removed.is_empty() {
                println!("No duplicates found");
            } else {
                println!("Removed {} tracks", report.removed.len());
            }
        }
        Command::Copy {
            target,
            to,
            skip_existing,
        } => {
            let report = tools.copy_tracks(&target.playlist(), &to, skip_existing).await?;
            if report.created {
                println!("Created playlist '{}'", report.target.name);
            }
            println!("Added {} tracks to '{}'", report.copied, report.target.name);
        }
    }
    Ok(())
}
