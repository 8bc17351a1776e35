//! Text rendering of a [`DashboardView`].

use chrono::{Datelike, Local};
use crossterm::style::{Color, Stylize};
use dashboard_core::{DashboardView, Tint, ViewStatus, WeatherPanel};

struct Palette {
    primary: Color,
    secondary: Color,
}

impl Palette {
    fn for_mode(dark_mode: bool) -> Self {
        if dark_mode {
            Self { primary: Color::White, secondary: Color::Grey }
        } else {
            Self { primary: Color::Black, secondary: Color::DarkGrey }
        }
    }
}

fn tint_color(tint: Tint) -> Color {
    match tint {
        Tint::Green => Color::Green,
        Tint::Yellow => Color::Yellow,
        Tint::Orange => Color::Rgb { r: 255, g: 165, b: 0 },
        Tint::Red => Color::Red,
        Tint::Blue => Color::Blue,
    }
}

/// Arrow pointing the way the wind blows from, matching the compass sector.
fn wind_arrow(compass: &str) -> &'static str {
    match compass {
        "N" => "↑",
        "NE" => "↗",
        "E" => "→",
        "SE" => "↘",
        "S" => "↓",
        "SW" => "↙",
        "W" => "←",
        _ => "↖",
    }
}

pub fn loading_banner(dark_mode: bool) -> String {
    let palette = Palette::for_mode(dark_mode);
    "Fetching weather data...".with(palette.secondary).to_string()
}

pub fn render(view: &DashboardView) -> String {
    let palette = Palette::for_mode(view.dark_mode);
    let icon = if view.is_night { "☾" } else { "☀" };

    let mut lines = vec![
        format!("{icon} Weather Forecast").bold().with(palette.primary).to_string(),
        format!("Search: {}", view.city_input).with(palette.secondary).to_string(),
        format!("Background: {}", view.background_url).with(palette.secondary).to_string(),
        String::new(),
    ];

    match &view.status {
        ViewStatus::Loading => lines.push(loading_banner(view.dark_mode)),
        ViewStatus::Failed(message) => lines.push(message.as_str().red().to_string()),
        ViewStatus::Empty => lines.push(
            "Enter a city name to see the weather.".with(palette.secondary).to_string(),
        ),
        ViewStatus::Ready => {
            if let Some(panel) = &view.weather {
                render_panel(panel, &palette, &mut lines);
            }
        }
    }

    lines.push(String::new());
    lines.push(
        format!("© {} Weather Dashboard", Local::now().year())
            .with(palette.secondary)
            .to_string(),
    );

    lines.join("\n") + "\n"
}

fn render_panel(panel: &WeatherPanel, palette: &Palette, lines: &mut Vec<String>) {
    let label = |text: &str| format!("{text:<12}").with(palette.secondary).to_string();
    let value = |text: &str| text.with(palette.primary).bold().to_string();

    lines.push(panel.heading.as_str().bold().with(palette.primary).to_string());
    lines.push(format!(
        "{}  {}",
        value(&panel.temperature),
        panel.range.as_str().with(palette.secondary)
    ));
    lines.push(panel.description.as_str().with(palette.secondary).to_string());

    if let Some(alert) = panel.alert {
        lines.push(String::new());
        lines.push(format!("⚠ {}", alert.message()).with(tint_color(alert.tint())).to_string());
    }

    lines.push(String::new());
    lines.push(format!("{}{}", label("Feels Like"), value(&panel.feels_like)));
    lines.push(format!("{}{}", label("Humidity"), value(&panel.humidity)));
    lines.push(format!(
        "{}{} {} ({})",
        label("Wind"),
        value(&panel.wind_speed),
        wind_arrow(panel.wind_compass),
        panel.wind_compass
    ));
    lines.push(format!("{}{}", label("Visibility"), value(&panel.visibility)));

    lines.push(String::new());
    lines.push("Sun Schedule".bold().with(palette.primary).to_string());
    lines.push(format!("{}{}", label("Sunrise"), value(&panel.sunrise)));
    lines.push(format!("{}{}", label("Sunset"), value(&panel.sunset)));

    lines.push(String::new());
    lines.push("Atmospheric Conditions".bold().with(palette.primary).to_string());
    lines.push(format!("{}{}", label("Pressure"), value(&panel.pressure)));
    lines.push(format!("{}{}", label("Cloud Cover"), value(&panel.cloud_cover)));

    lines.push(String::new());
    lines.push("Air Quality".bold().with(palette.primary).to_string());
    lines.push(format!(
        "{}{}",
        label("AQI Level"),
        panel
            .air_quality_label
            .as_str()
            .with(tint_color(panel.air_quality.tint))
            .bold()
    ));
}
