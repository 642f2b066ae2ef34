use std::{
    fmt,
    io::IsTerminal,
    path::{Path, PathBuf},
};

use anyhow::anyhow;
use clap::{Parser, Subcommand};
use inquire::{InquireError, Select};
use weather_core::{
    Config, Coordinate, Location, ViewController, config::DEFAULT_GEOLOCATION_URL,
    geolocator_from_config, provider_from_config,
};

use crate::terminal::{RedrawMode, Screen, TerminalRegion};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather", version, about = "Hourly weather forecast for the next day")]
pub struct Cli {
    /// Read configuration from this file instead of the default location.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Pick locations from a menu until you quit (the default).
    Pick,

    /// List the configured locations.
    List,

    /// Show the forecast for a configured location.
    Show {
        /// Location title, e.g. "Reykjavík" (case-insensitive).
        title: String,
    },

    /// Show the forecast for your current location.
    Here,

    /// Show the forecast for an arbitrary coordinate.
    #[command(allow_negative_numbers = true)]
    Coords {
        latitude: f64,
        longitude: f64,
    },

    /// Write a config file with the default settings.
    Init {
        /// Overwrite an existing file.
        #[arg(long)]
        force: bool,
    },
}

/// One entry of the interactive menu.
#[derive(Debug, Clone)]
enum Choice {
    Location(Location),
    MyLocation,
    Quit,
}

impl fmt::Display for Choice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Choice::Location(location) => f.write_str(&location.title),
            Choice::MyLocation => f.write_str("Use My Location"),
            Choice::Quit => f.write_str("Quit"),
        }
    }
}

impl Cli {
    pub async fn run(self, screen: &Screen) -> anyhow::Result<()> {
        let config_path = self.config.as_deref();

        match self.command.unwrap_or(Command::Pick) {
            Command::Init { force } => init_config(config_path, force)?,
            Command::List => {
                let config = load_config(config_path)?;
                for location in config.locations() {
                    match location.coordinate {
                        Some(coordinate) => println!("{} ({coordinate})", location.title),
                        None => println!("{}", location.title),
                    }
                }
            }
            Command::Show { title } => {
                let config = load_config(config_path)?;
                let location = config.find_location(&title).ok_or_else(|| {
                    anyhow!(
                        "Unknown location '{title}'.\n\
                         Hint: run `weather list` to see the configured locations."
                    )
                })?;
                let mut view = one_shot_view(&config, screen)?;
                view.request_search(location).await;
            }
            Command::Here => {
                let config = load_config(config_path)?;
                let mut view = one_shot_view(&config, screen)?;
                view.request_current_location().await;
            }
            Command::Coords { latitude, longitude } => {
                let config = load_config(config_path)?;
                let coordinate = Coordinate::new(latitude, longitude);
                if !coordinate.is_valid() {
                    tracing::warn!(%coordinate, "coordinate is out of range, sending it anyway");
                }
                let mut view = one_shot_view(&config, screen)?;
                view.request_search(Location::new(coordinate.to_string(), coordinate))
                    .await;
            }
            Command::Pick => {
                let config = load_config(config_path)?;
                pick(&config, screen).await?;
            }
        }

        Ok(())
    }
}

/// `None` means the platform config directory.
fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let config = match path {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    tracing::debug!(?path, "loaded configuration");
    Ok(config)
}

fn one_shot_view(
    config: &Config,
    screen: &Screen,
) -> anyhow::Result<ViewController<TerminalRegion<std::io::Stdout>>> {
    let stdout = std::io::stdout();
    let mode = if stdout.is_terminal() {
        RedrawMode::InPlace
    } else {
        RedrawMode::Plain
    };
    let provider = provider_from_config(config)?;
    Ok(ViewController::new(
        provider,
        geolocator_from_config(config),
        screen.region(stdout, mode),
    ))
}

async fn pick(config: &Config, screen: &Screen) -> anyhow::Result<()> {
    let mut choices: Vec<Choice> = config
        .locations()
        .into_iter()
        .map(Choice::Location)
        .collect();
    choices.push(Choice::MyLocation);
    choices.push(Choice::Quit);

    let provider = provider_from_config(config)?;
    let region = screen.region(std::io::stdout(), RedrawMode::ClearScreen);
    let mut view = ViewController::new(provider, geolocator_from_config(config), region);

    loop {
        let choice = match Select::new("Location:", choices.clone()).prompt() {
            Ok(choice) => choice,
            Err(InquireError::OperationCanceled | InquireError::OperationInterrupted) => break,
            Err(err) => {
                return Err(anyhow::Error::new(err).context("Failed to read location choice"));
            }
        };

        match choice {
            Choice::Location(location) => view.request_search(location).await,
            Choice::MyLocation => view.request_current_location().await,
            Choice::Quit => break,
        }
    }

    Ok(())
}

/// Write the default config to `path`, or to the platform config directory.
fn init_config(path: Option<&Path>, force: bool) -> anyhow::Result<()> {
    let target = match path {
        Some(path) => path.to_path_buf(),
        None => Config::config_file_path()?,
    };
    if target.exists() && !force {
        return Err(anyhow!(
            "Config file already exists: {}\n\
             Hint: pass --force to overwrite it.",
            target.display()
        ));
    }

    let config = Config::default();
    match path {
        Some(path) => config.save_to(path)?,
        None => config.save()?,
    }
    println!("{}", init_message(&target));
    Ok(())
}

fn init_message(path: &Path) -> String {
    format!(
        "Wrote default configuration to {}\n\
         Geolocation is off, so \"Use My Location\" reports it as unsupported.\n\
         To enable it, set `mode` under [geolocation] to \"fixed\" (with latitude and \
         longitude), or to \"ip\" to look your position up from your IP address \
         (this sends the address to {DEFAULT_GEOLOCATION_URL}).",
        path.display()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_pick() {
        let cli = Cli::try_parse_from(["weather"]).expect("parses");
        assert!(cli.command.is_none());
    }

    #[test]
    fn coords_accepts_negative_values() {
        let cli = Cli::try_parse_from(["weather", "coords", "64.1355", "-21.8954"])
            .expect("parses");
        match cli.command {
            Some(Command::Coords { latitude, longitude }) => {
                assert_eq!(latitude, 64.1355);
                assert_eq!(longitude, -21.8954);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_flag_is_global() {
        let cli = Cli::try_parse_from(["weather", "show", "Tokyo", "--config", "/tmp/w.toml"])
            .expect("parses");
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/w.toml")));
        assert!(matches!(cli.command, Some(Command::Show { ref title }) if title == "Tokyo"));
    }

    #[test]
    fn menu_labels() {
        assert_eq!(Choice::MyLocation.to_string(), "Use My Location");
        assert_eq!(Choice::Quit.to_string(), "Quit");
        assert_eq!(
            Choice::Location(Location::current()).to_string(),
            "Your Location"
        );
    }

    #[test]
    fn init_writes_defaults_once() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("weather").join("config.toml");

        init_config(Some(path.as_path()), false).expect("first init");
        let config = load_config(Some(path.as_path())).expect("load");
        assert_eq!(config, Config::default());

        let err = init_config(Some(path.as_path()), false).unwrap_err();
        assert!(err.to_string().contains("already exists"));
        init_config(Some(path.as_path()), true).expect("forced init");
    }

    #[test]
    fn init_message_explains_geolocation() {
        let message = init_message(Path::new("/tmp/config.toml"));
        assert!(message.starts_with("Wrote default configuration to /tmp/config.toml\n"));
        assert!(message.contains("Geolocation is off"));
        assert!(message.contains("\"ip\""));
        assert!(message.contains(DEFAULT_GEOLOCATION_URL));
    }
}
