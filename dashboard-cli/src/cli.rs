use anyhow::{Context, bail};
use clap::{Parser, Subcommand};
use crossterm::{
    cursor::MoveTo,
    execute,
    terminal::{Clear, ClearType},
};
use dashboard_core::{Config, Dashboard, DashboardView, provider_from_config};
use inquire::{InquireError, Password, PasswordDisplayMode, Select, Text};
use std::{fmt, io};
use tracing::debug;

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-dashboard", version, about = "Terminal weather dashboard")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and default city.
    Configure,

    /// Fetch the weather once and print the dashboard.
    Show {
        /// City name; defaults to the configured city.
        city: Option<String>,

        /// Use the dark palette.
        #[arg(long)]
        dark: bool,

        /// Print the derived view as JSON instead of text.
        #[arg(long)]
        json: bool,
    },

    /// Interactive dashboard (the default).
    Interactive,
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<()> {
        match self.command.unwrap_or(Command::Interactive) {
            Command::Configure => configure(),
            Command::Show { city, dark, json } => show(city, dark, json).await,
            Command::Interactive => interactive().await,
        }
    }
}

fn configure() -> anyhow::Result<()> {
    let mut cfg = Config::load_file()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;

    let city = Text::new("Default city:").with_default(&cfg.default_city).prompt()?;

    cfg.set_api_key(api_key.trim().to_string());
    if !city.trim().is_empty() {
        cfg.default_city = city.trim().to_string();
    }
    cfg.save()?;

    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn build_dashboard(cfg: &Config, dark: bool) -> anyhow::Result<Dashboard> {
    let provider = provider_from_config(cfg)?;
    debug!(base_url = %cfg.base_url, city = %cfg.default_city, "building dashboard");

    Ok(Dashboard::new(provider, cfg.default_city.clone()).with_dark_mode(cfg.dark_mode || dark))
}

async fn show(city: Option<String>, dark: bool, json: bool) -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let dashboard = build_dashboard(&cfg, dark)?;

    let state = match city {
        Some(city) => dashboard.submit(city).await,
        None => dashboard.start().await,
    };
    let view = DashboardView::from_state(&state);

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&view).context("Failed to serialize dashboard view")?
        );
    } else {
        print!("{}", render::render(&view));
    }

    if let Some(message) = state.error() {
        bail!("{message}");
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MenuItem {
    Search,
    ToggleDarkMode,
    Refresh,
    Quit,
}

impl MenuItem {
    const ALL: [MenuItem; 4] =
        [MenuItem::Search, MenuItem::ToggleDarkMode, MenuItem::Refresh, MenuItem::Quit];
}

impl fmt::Display for MenuItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            MenuItem::Search => "Search city",
            MenuItem::ToggleDarkMode => "Toggle dark mode",
            MenuItem::Refresh => "Refresh",
            MenuItem::Quit => "Quit",
        })
    }
}

fn draw(view: &DashboardView) -> anyhow::Result<()> {
    execute!(io::stdout(), Clear(ClearType::All), MoveTo(0, 0))?;
    print!("{}", render::render(view));
    Ok(())
}

/// How a prompt ended: an answer, Esc (go back) or Ctrl-C (leave the dashboard).
#[derive(Debug, PartialEq, Eq)]
enum Prompted<T> {
    Answer(T),
    Back,
    Quit,
}

fn prompt_outcome<T>(result: Result<T, InquireError>) -> anyhow::Result<Prompted<T>> {
    match result {
        Ok(answer) => Ok(Prompted::Answer(answer)),
        Err(InquireError::OperationCanceled) => Ok(Prompted::Back),
        Err(InquireError::OperationInterrupted) => Ok(Prompted::Quit),
        Err(err) => Err(err.into()),
    }
}

async fn interactive() -> anyhow::Result<()> {
    let cfg = Config::load()?;
    let dashboard = build_dashboard(&cfg, false)?;

    println!("{}", render::loading_banner(cfg.dark_mode));
    dashboard.start().await;
    draw(&dashboard.view().await)?;

    loop {
        let answer = Select::new("What next?", MenuItem::ALL.to_vec()).prompt();
        let item = match prompt_outcome(answer)? {
            Prompted::Answer(item) => item,
            Prompted::Back | Prompted::Quit => break,
        };

        match item {
            MenuItem::Search => {
                let current = dashboard.state().await.city().to_string();
                let answer = Text::new("City:")
                    .with_initial_value(&current)
                    .with_placeholder("Enter city name")
                    .prompt();
                let city = match prompt_outcome(answer)? {
                    Prompted::Answer(city) => city,
                    Prompted::Back => continue,
                    Prompted::Quit => break,
                };

                println!("{}", render::loading_banner(dashboard.state().await.dark_mode()));
                dashboard.submit(city).await;
            }
            MenuItem::ToggleDarkMode => {
                dashboard.toggle_dark_mode().await;
            }
            MenuItem::Refresh => {
                let state = dashboard.state().await;
                println!("{}", render::loading_banner(state.dark_mode()));
                dashboard.submit(state.city()).await;
            }
            MenuItem::Quit => break,
        }

        draw(&dashboard.view().await)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_interactive() {
        let cli = Cli::try_parse_from(["weather-dashboard"]).expect("parses");
        assert!(cli.command.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn show_accepts_city_and_flags() {
        let args = ["weather-dashboard", "show", "New York", "--dark", "--json", "-v"];
        let cli = Cli::try_parse_from(args).expect("parses");

        assert!(cli.verbose);
        match cli.command {
            Some(Command::Show { city, dark, json }) => {
                assert_eq!(city.as_deref(), Some("New York"));
                assert!(dark);
                assert!(json);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn show_city_is_optional() {
        let cli = Cli::try_parse_from(["weather-dashboard", "show"]).expect("parses");
        assert!(matches!(
            cli.command,
            Some(Command::Show { city: None, dark: false, json: false })
        ));
    }

    #[test]
    fn build_dashboard_requires_api_key() {
        let err = build_dashboard(&Config::default(), false).unwrap_err();
        assert!(err.to_string().contains("No OpenWeather API key configured"));
    }

    #[test]
    fn ctrl_c_quits_and_esc_goes_back() {
        let interrupted: Result<String, _> = Err(InquireError::OperationInterrupted);
        let canceled: Result<String, _> = Err(InquireError::OperationCanceled);

        assert_eq!(prompt_outcome(interrupted).expect("handled"), Prompted::Quit);
        assert_eq!(prompt_outcome(canceled).expect("handled"), Prompted::Back);
        assert_eq!(
            prompt_outcome(Ok("Paris".to_string())).expect("answer"),
            Prompted::Answer("Paris".to_string())
        );
    }

    #[test]
    fn other_prompt_errors_are_fatal() {
        let not_tty: Result<String, _> = Err(InquireError::NotTTY);
        assert!(prompt_outcome(not_tty).is_err());
    }

    #[test]
    fn menu_labels() {
        let labels: Vec<String> = MenuItem::ALL.iter().map(ToString::to_string).collect();
        assert_eq!(labels, ["Search city", "Toggle dark mode", "Refresh", "Quit"]);
    }
}
