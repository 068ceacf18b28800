//! websift CLI - search and inspect content across all loaded site backends.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::io::Write as _;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use websift::backends::{Backend, BackendRegistry, fan_out};
use websift::capabilities::parse_full_id;
use websift::config::Config;
use websift::console::Console;
use websift::error::AdapterError;
use websift::formatters;

/// Content aggregator: one command, every loaded site backend.
#[derive(Parser, Debug)]
#[command(name = "websift")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Use a specific config file instead of the default location.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum number of results printed by listing commands.
    #[arg(short = 'n', long)]
    count: Option<usize>,

    /// Only address the named backend.
    #[arg(short, long)]
    backend: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search movies.
    SearchMovie { pattern: String },
    /// Get information about a movie.
    InfoMovie { id: String },
    /// List persons related to a movie, optionally filtered by role.
    Casting { movie_id: String, role: Option<String> },
    /// Search persons.
    SearchPerson { pattern: String },
    /// Get information about a person.
    InfoPerson { id: String },
    /// List movies of a person, optionally filtered by role.
    Filmography { person_id: String, role: Option<String> },
    /// Search torrents.
    SearchTorrent { pattern: String },
    /// Get information about a torrent.
    InfoTorrent { id: String },
    /// Download the .torrent file. FILENAME defaults to ID.torrent;
    /// use `-` for standard output.
    GetfileTorrent { id: String, filename: Option<String> },
    /// Search subtitles in a language.
    SearchSubtitle { language: String, pattern: Option<String> },
    /// Get information about a subtitle.
    InfoSubtitle { id: String },
    /// Download the subtitle archive. FILENAME defaults to ID;
    /// use `-` for standard output.
    GetfileSubtitle { id: String, filename: Option<String> },
    /// Search recipes.
    SearchRecipe { pattern: String },
    /// Get information about a recipe.
    InfoRecipe { id: String },
    /// Search radio stations.
    SearchRadio { pattern: Option<String> },
    /// Get information about a radio station, including now playing.
    InfoRadio { id: String },
    /// List bank accounts.
    ListAccounts,
    /// List the operation history of an account.
    History { account_id: String },
    /// List chat contacts.
    Contacts,
    /// List chat messages exchanged with a contact.
    Messages { contact_id: String },
}

/// Exit code for "nothing matched the requested id or pattern".
const EXIT_NOT_FOUND: u8 = 3;
/// Exit code for "only a magnet reference is available".
const EXIT_MAGNET_ONLY: u8 = 4;
/// Exit code for a local write failure.
const EXIT_WRITE_FAILED: u8 = 1;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let console = Console::new();

    match run(args, &console).await {
        Ok(code) => code,
        Err(err) => {
            console.error(&format!("{:#}", err));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args, console: &Console) -> Result<ExitCode> {
    let config = match &args.config {
        Some(path) => Config::load_from(path).context("Failed to load configuration")?,
        None => Config::load().context("Failed to load configuration")?,
    };
    config.validate().context("Invalid configuration")?;

    let registry =
        BackendRegistry::from_config(&config).context("Failed to initialize backends")?;

    let app = App {
        console,
        registry,
        count: args.count.unwrap_or(config.output.count),
        backend: args.backend,
    };
    app.dispatch(args.command).await
}

struct App<'a> {
    console: &'a Console,
    registry: BackendRegistry,
    count: usize,
    backend: Option<String>,
}

impl App<'_> {
    async fn dispatch(&self, command: Command) -> Result<ExitCode> {
        match command {
            Command::SearchMovie { pattern } => {
                let backends = self.backends(None);
                let results =
                    fan_out(&backends, |b| b.as_cinema(), |p| p.iter_movies(&pattern)).await;
                Ok(self.print_listing(results, formatters::format_movie_line))
            }
            Command::InfoMovie { id } => {
                let (raw_id, from_id) = parse_full_id(&id);
                let backends = self.backends(from_id);
                let results =
                    fan_out(&backends, |b| b.as_cinema(), |p| p.get_movie(raw_id)).await;
                self.print_detail(results, &id, "Movie", formatters::format_movie_info)
            }
            Command::Casting { movie_id, role } => {
                let (raw_id, from_id) = parse_full_id(&movie_id);
                let backends = self.backends(from_id);
                let results = fan_out(
                    &backends,
                    |b| b.as_cinema(),
                    |p| p.iter_movie_persons(raw_id, role.as_deref()),
                )
                .await;
                Ok(self.print_listing(results, formatters::format_person_line))
            }
            Command::SearchPerson { pattern } => {
                let backends = self.backends(None);
                let results =
                    fan_out(&backends, |b| b.as_cinema(), |p| p.iter_persons(&pattern)).await;
                Ok(self.print_listing(results, formatters::format_person_line))
            }
            Command::InfoPerson { id } => {
                let (raw_id, from_id) = parse_full_id(&id);
                let backends = self.backends(from_id);
                let results =
                    fan_out(&backends, |b| b.as_cinema(), |p| p.get_person(raw_id)).await;
                self.print_detail(results, &id, "Person", formatters::format_person_info)
            }
            Command::Filmography { person_id, role } => {
                let (raw_id, from_id) = parse_full_id(&person_id);
                let backends = self.backends(from_id);
                let results = fan_out(
                    &backends,
                    |b| b.as_cinema(),
                    |p| p.iter_person_movies(raw_id, role.as_deref()),
                )
                .await;
                Ok(self.print_listing(results, formatters::format_movie_line))
            }
            Command::SearchTorrent { pattern } => {
                let backends = self.backends(None);
                let results =
                    fan_out(&backends, |b| b.as_torrent(), |p| p.iter_torrents(&pattern)).await;
                Ok(self.print_listing(results, formatters::format_torrent_line))
            }
            Command::InfoTorrent { id } => {
                let (raw_id, from_id) = parse_full_id(&id);
                let backends = self.backends(from_id);
                let results =
                    fan_out(&backends, |b| b.as_torrent(), |p| p.get_torrent(raw_id)).await;
                self.print_detail(results, &id, "Torrent", formatters::format_torrent_info)
            }
            Command::GetfileTorrent { id, filename } => {
                let (raw_id, from_id) = parse_full_id(&id);
                let dest = filename.unwrap_or_else(|| format!("{}.torrent", raw_id));
                let backends = self.backends(from_id);
                let results = fan_out(
                    &backends,
                    |b| b.as_torrent(),
                    |p| p.get_torrent_file(raw_id),
                )
                .await;

                for (name, result) in results {
                    match result {
                        Ok(buf) => return Ok(self.write_file(&dest, &buf)),
                        Err(AdapterError::MagnetOnly { magnet }) => {
                            eprintln!(
                                "Error({}): No direct URL available, please provide this magnet URL to your client:\n{}",
                                name, magnet
                            );
                            return Ok(ExitCode::from(EXIT_MAGNET_ONLY));
                        }
                        Err(err) if err.is_not_found() => {}
                        Err(err) => self.console.backend_error(name, &err.to_string()),
                    }
                }

                self.console.error(&format!("Torrent not found: {}", id));
                Ok(ExitCode::from(EXIT_NOT_FOUND))
            }
            Command::SearchSubtitle { language, pattern } => {
                let backends = self.backends(None);
                let pattern = pattern.unwrap_or_default();
                let results = fan_out(
                    &backends,
                    |b| b.as_subtitle(),
                    |p| p.iter_subtitles(&language, &pattern),
                )
                .await;
                Ok(self.print_listing(results, formatters::format_subtitle_line))
            }
            Command::InfoSubtitle { id } => {
                let (raw_id, from_id) = parse_full_id(&id);
                let backends = self.backends(from_id);
                let results =
                    fan_out(&backends, |b| b.as_subtitle(), |p| p.get_subtitle(raw_id)).await;
                self.print_detail(results, &id, "Subtitle", formatters::format_subtitle_info)
            }
            Command::GetfileSubtitle { id, filename } => {
                let (raw_id, from_id) = parse_full_id(&id);
                let dest = filename.unwrap_or_else(|| raw_id.to_string());
                let backends = self.backends(from_id);
                let results = fan_out(
                    &backends,
                    |b| b.as_subtitle(),
                    |p| p.get_subtitle_file(raw_id),
                )
                .await;

                for (name, result) in results {
                    match result {
                        Ok(buf) => return Ok(self.write_file(&dest, &buf)),
                        Err(err) if err.is_not_found() => {}
                        Err(err) => self.console.backend_error(name, &err.to_string()),
                    }
                }

                self.console.error(&format!("Subtitle not found: {}", id));
                Ok(ExitCode::from(EXIT_NOT_FOUND))
            }
            Command::SearchRecipe { pattern } => {
                let backends = self.backends(None);
                let results =
                    fan_out(&backends, |b| b.as_recipe(), |p| p.iter_recipes(&pattern)).await;
                Ok(self.print_listing(results, formatters::format_recipe_line))
            }
            Command::InfoRecipe { id } => {
                let (raw_id, from_id) = parse_full_id(&id);
                let backends = self.backends(from_id);
                let results =
                    fan_out(&backends, |b| b.as_recipe(), |p| p.get_recipe(raw_id)).await;
                self.print_detail(results, &id, "Recipe", formatters::format_recipe_info)
            }
            Command::SearchRadio { pattern } => {
                let backends = self.backends(None);
                let pattern = pattern.unwrap_or_default();
                let results =
                    fan_out(&backends, |b| b.as_radio(), |p| p.iter_radios(&pattern)).await;
                Ok(self.print_listing(results, formatters::format_radio_line))
            }
            Command::InfoRadio { id } => {
                let (raw_id, from_id) = parse_full_id(&id);
                let backends = self.backends(from_id);
                let results =
                    fan_out(&backends, |b| b.as_radio(), |p| p.get_radio(raw_id)).await;
                self.print_detail(results, &id, "Radio", formatters::format_radio_info)
            }
            Command::ListAccounts => {
                let backends = self.backends(None);
                let results = fan_out(&backends, |b| b.as_bank(), |p| p.iter_accounts()).await;
                Ok(self.print_listing(results, formatters::format_account_line))
            }
            Command::History { account_id } => {
                let (raw_id, from_id) = parse_full_id(&account_id);
                let backends = self.backends(from_id);
                let results =
                    fan_out(&backends, |b| b.as_bank(), |p| p.iter_history(raw_id)).await;
                Ok(self.print_listing(results, formatters::format_transaction_line))
            }
            Command::Contacts => {
                let backends = self.backends(None);
                let results = fan_out(&backends, |b| b.as_chat(), |p| p.iter_contacts()).await;
                Ok(self.print_listing(results, formatters::format_contact_line))
            }
            Command::Messages { contact_id } => {
                let (raw_id, from_id) = parse_full_id(&contact_id);
                let backends = self.backends(from_id);
                let results =
                    fan_out(&backends, |b| b.as_chat(), |p| p.iter_messages(raw_id)).await;
                Ok(self.print_listing(results, formatters::format_message_line))
            }
        }
    }

    /// Backends to address: a name embedded in the id wins over the
    /// global `--backend` option.
    fn backends(&self, from_id: Option<&str>) -> Vec<Arc<dyn Backend>> {
        self.registry.select(from_id.or(self.backend.as_deref()))
    }

    /// Prints listing results, capped at the configured count, reporting
    /// each backend's failure without aborting the others.
    fn print_listing<T>(
        &self,
        results: Vec<(&'static str, Result<Vec<T>, AdapterError>)>,
        format: impl Fn(&Console, &T) -> String,
    ) -> ExitCode {
        let mut printed = 0;
        for (name, result) in results {
            match result {
                Ok(items) => {
                    for item in &items {
                        if printed >= self.count {
                            break;
                        }
                        println!("{}", format(self.console, item));
                        printed += 1;
                    }
                }
                Err(err) => self.console.backend_error(name, &err.to_string()),
            }
        }
        ExitCode::SUCCESS
    }

    /// Prints the first backend's hit for a get-by-id request, or exits
    /// with the not-found code.
    fn print_detail<T>(
        &self,
        results: Vec<(&'static str, Result<Option<T>, AdapterError>)>,
        id: &str,
        what: &str,
        format: impl Fn(&Console, &T) -> String,
    ) -> Result<ExitCode> {
        let mut found = None;
        for (name, result) in results {
            match result {
                Ok(Some(item)) => {
                    if found.is_none() {
                        found = Some(item);
                    }
                }
                Ok(None) => {}
                Err(err) if err.is_not_found() => {}
                Err(err) => self.console.backend_error(name, &err.to_string()),
            }
        }

        match found {
            Some(item) => {
                println!("{}", format(self.console, &item));
                Ok(ExitCode::SUCCESS)
            }
            None => {
                self.console.error(&format!("{} not found: {}", what, id));
                Ok(ExitCode::from(EXIT_NOT_FOUND))
            }
        }
    }

    /// Writes a fetched file to disk or standard output.
    fn write_file(&self, dest: &str, buf: &[u8]) -> ExitCode {
        if dest == "-" {
            return match std::io::stdout().write_all(buf) {
                Ok(()) => ExitCode::SUCCESS,
                Err(err) => {
                    self.console.error(&format!("Unable to write to stdout: {}", err));
                    ExitCode::from(EXIT_WRITE_FAILED)
                }
            };
        }

        match std::fs::write(dest, buf) {
            Ok(()) => {
                self.console.info(&format!("Saved to {}", dest));
                ExitCode::SUCCESS
            }
            Err(err) => {
                self.console
                    .error(&format!("Unable to write file in \"{}\": {}", dest, err));
                ExitCode::from(EXIT_WRITE_FAILED)
            }
        }
    }
}
