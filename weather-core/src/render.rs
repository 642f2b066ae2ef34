//! Plain-text presentation of [`RenderState`].

use crate::model::{ForecastResult, RenderState};

pub const INTRO_TEXT: &str =
    "Select a location to view the forecast, or search for your current location.";
pub const LOADING_TEXT: &str = "Loading...";

const HEADERS: [&str; 3] = ["Time", "Temperature (°C)", "Precipitation (mm)"];
const COLUMN_GAP: &str = "  ";

/// The single output area the view controller draws into.
///
/// Each call replaces whatever the previous call displayed.
pub trait RenderRegion {
    fn render(&mut self, state: &RenderState);
}

/// Render a state to text. The same state always yields the same text.
pub fn render_text(state: &RenderState) -> String {
    match state {
        RenderState::Idle => format!("{INTRO_TEXT}\n"),
        RenderState::Loading => format!("{LOADING_TEXT}\n"),
        RenderState::Result { location, forecast } => {
            format!(
                "Weather results for: {}\n\n{}",
                location.title,
                render_table(forecast)
            )
        }
        RenderState::Error { message } => format!("Error: {message}\n"),
    }
}

/// Header row followed by one row per reading; numbers get one decimal place.
pub fn render_table(forecast: &ForecastResult) -> String {
    let rows: Vec<[String; 3]> = forecast
        .readings()
        .iter()
        .map(|r| {
            [
                r.time.clone(),
                format!("{:.1}", r.temperature_celsius),
                format!("{:.1}", r.precipitation_mm),
            ]
        })
        .collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = format_row(&HEADERS, &widths);
    for row in &rows {
        out.push_str(&format_row(&row.each_ref().map(String::as_str), &widths));
    }
    out
}

fn format_row(cells: &[&str; 3], widths: &[usize; 3]) -> String {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    format!("{}\n", line.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Coordinate, HourlyReading, Location};

    fn reading(time: &str, temp: f64, precip: f64) -> HourlyReading {
        HourlyReading {
            time: time.to_string(),
            temperature_celsius: temp,
            precipitation_mm: precip,
        }
    }

    fn result_state(readings: Vec<HourlyReading>) -> RenderState {
        RenderState::Result {
            location: Location::new("Reykjavík", Coordinate::new(64.1355, -21.8954)),
            forecast: readings.into(),
        }
    }

    #[test]
    fn simple_states() {
        assert_eq!(render_text(&RenderState::Loading), "Loading...\n");
        assert_eq!(
            render_text(&RenderState::Error {
                message: "Failed to fetch weather data".into()
            }),
            "Error: Failed to fetch weather data\n"
        );
        assert!(render_text(&RenderState::Idle).starts_with("Select a location"));
    }

    #[test]
    fn result_table_has_header_and_one_row_per_hour() {
        let text = render_text(&result_state(vec![
            reading("2024-05-01T00:00", 5.5, 0.0),
            reading("2024-05-01T01:00", 5.04, 1.26),
        ]));

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "Weather results for: Reykjavík");
        assert_eq!(lines[1], "");
        assert_eq!(
            lines[2],
            "Time              Temperature (°C)  Precipitation (mm)"
        );
        assert_eq!(lines[3], "2024-05-01T00:00  5.5               0.0");
        assert_eq!(lines[4], "2024-05-01T01:00  5.0               1.3");
        assert_eq!(lines.len(), 5);
    }

    #[test]
    fn empty_result_is_header_only() {
        let table = render_table(&ForecastResult::default());
        assert_eq!(table, "Time  Temperature (°C)  Precipitation (mm)\n");
    }

    #[test]
    fn rendering_is_idempotent() {
        let state = result_state(vec![reading("00:00", -3.0, 0.4)]);
        assert_eq!(render_text(&state), render_text(&state));
    }
}
