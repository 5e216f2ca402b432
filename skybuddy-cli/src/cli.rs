use std::{fs, path::PathBuf, sync::Arc};

use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use skybuddy_core::{AppState, Config, Interaction, SearchQuery, ServiceId, SkyBuddy};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skybuddy", version, about = "A weather companion with a personality")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Skip character art generation.
    #[arg(long, global = true)]
    pub no_art: bool,

    /// Where to write generated character art. Defaults to the config directory.
    #[arg(long, global = true, value_name = "PATH")]
    pub art_out: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the API key for a service: "openweather", "gemini" or "stability".
    Configure { service: String },

    /// Weather for the default city, or for where you are.
    Now,

    /// Weather for a city. Without a name, pick one interactively.
    City { name: Option<String> },

    /// Weather at coordinates.
    #[command(allow_negative_numbers = true)]
    Coords {
        lat: f64,
        lon: f64,

        /// Label to announce, e.g. "Current Location".
        #[arg(long)]
        name: Option<String>,
    },

    /// City name suggestions.
    Suggest { query: String },

    /// Ask the mascot something about the weather in a city.
    Ask { city: String, message: String },

    /// Quick reaction from the mascot: outfit, mood or tip.
    Interact {
        city: String,
        kind: String,

        /// Generate the reply instead of using a canned line.
        #[arg(long)]
        ai: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        let mut config = Config::load()?;
        config.apply_env();
        let app = SkyBuddy::from_config(&config)?;
        debug!(
            gemini = config.is_service_configured(ServiceId::Gemini),
            stability = config.is_service_configured(ServiceId::Stability),
            "SkyBuddy ready"
        );

        let state = match self.command {
            Command::Configure { service } => return configure(&service),
            Command::Now => match config.default_city.as_deref() {
                Some(city) => search(&app, SearchQuery::city(city)).await?,
                None => app.start().await?,
            },
            Command::City { name: Some(name) } => search(&app, SearchQuery::city(name)).await?,
            Command::City { name: None } => {
                let query = pick_city(&app).await?;
                search(&app, query).await?
            }
            Command::Coords { lat, lon, name } => {
                search(&app, SearchQuery::coords(lat, lon, name)).await?
            }
            Command::Suggest { query } => {
                let found = app.suggest(&query).await;
                if found.is_empty() {
                    println!("No suggestions for '{query}'.");
                }
                for city in found {
                    println!("{}  ({:.2}, {:.2})", city.label(), city.lat, city.lon);
                }
                return Ok(());
            }
            Command::Ask { city, message } => {
                search(&app, SearchQuery::city(city)).await?;
                app.chat(&message).await.context("no weather loaded")?
            }
            Command::Interact { city, kind, ai } => {
                let kind = Interaction::try_from(kind.as_str())?;
                search(&app, SearchQuery::city(city)).await?;
                let updated = if ai {
                    app.ai_interact(kind).await
                } else {
                    app.interact(kind)
                };
                updated.context("no weather loaded")?
            }
        };

        print!("{}", render::state(&state, app.is_night(), chrono::Local::now()));

        if !self.no_art {
            save_art(&app, &state, self.art_out).await?;
        }

        Ok(())
    }
}

async fn search(app: &SkyBuddy, query: SearchQuery) -> anyhow::Result<Arc<AppState>> {
    match app.search(query).await? {
        Some(state) => Ok(state),
        None => bail!("Search was superseded by a newer one"),
    }
}

/// Prompt for a partial name and let the user pick from suggestions.
async fn pick_city(app: &SkyBuddy) -> anyhow::Result<SearchQuery> {
    let query = Text::new("Search city:").prompt()?;
    let suggestions = app.suggest(&query).await;
    if suggestions.is_empty() {
        return Ok(SearchQuery::city(query));
    }

    let labels: Vec<String> = suggestions.iter().map(|s| s.label()).collect();
    let picked = Select::new("Pick a city:", labels).raw_prompt()?;
    let city = &suggestions[picked.index];
    Ok(SearchQuery::coords(city.lat, city.lon, Some(city.name.clone())))
}

fn configure(service: &str) -> anyhow::Result<()> {
    let service = ServiceId::try_from(service)?;

    // Loaded without env overrides so they never end up on disk.
    let mut config = Config::load()?;
    if config.is_service_configured(service) {
        println!("Replacing the existing {service} key.");
    }

    let key = Password::new(&format!("{service} API key:"))
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    let key = key.trim();
    if key.is_empty() {
        bail!("API key must not be empty");
    }

    config.upsert_service_api_key(service, key.to_string());
    config.save()?;

    println!(
        "Saved {service} key to {}",
        Config::config_file_path()?.display()
    );
    Ok(())
}

async fn save_art(
    app: &SkyBuddy,
    state: &AppState,
    out: Option<PathBuf>,
) -> anyhow::Result<()> {
    if !app.enrichment().has_image() {
        return Ok(());
    }
    let Some(art) = app.character_art().await else {
        println!("🎨 No character art this time.");
        return Ok(());
    };

    let path = match out {
        Some(path) => path,
        None => {
            let dir = Config::config_file_path()?
                .parent()
                .map(PathBuf::from)
                .context("config path has no parent directory")?;
            dir.join(format!("art-{}.png", state.personality.as_str().to_lowercase()))
        }
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    fs::write(&path, &art.png)
        .with_context(|| format!("Failed to write character art: {}", path.display()))?;

    println!("🎨 {} art saved to {}", state.personality.profile().name, path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coords_accept_negative_numbers() {
        let cli = Cli::try_parse_from(["skybuddy", "coords", "-33.87", "151.21", "--name", "Sydney"])
            .unwrap();
        match cli.command {
            Command::Coords { lat, lon, name } => {
                assert_eq!(lat, -33.87);
                assert_eq!(lon, 151.21);
                assert_eq!(name.as_deref(), Some("Sydney"));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = Cli::try_parse_from(["skybuddy", "city", "Oslo", "--no-art", "-v"]).unwrap();
        assert!(cli.no_art);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::City { name: Some(ref n) } if n == "Oslo"));
    }

    #[test]
    fn interact_takes_kind_and_ai_flag() {
        let cli = Cli::try_parse_from(["skybuddy", "interact", "Rome", "tip", "--ai"]).unwrap();
        match cli.command {
            Command::Interact { city, kind, ai } => {
                assert_eq!(city, "Rome");
                assert_eq!(Interaction::try_from(kind.as_str()).unwrap(), Interaction::Tip);
                assert!(ai);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
