use chrono::{DateTime, FixedOffset, Offset, Utc};
use weather_core::{ForecastSeries, LocationSuggestion, WeatherDisplay, WeatherSnapshot, Wind};

pub const FORECAST_PAGE_SIZE: usize = 8;

fn local_time(at: DateTime<Utc>, offset_secs: i32) -> String {
    let offset = FixedOffset::east_opt(offset_secs).unwrap_or_else(|| Utc.fix());
    at.with_timezone(&offset).format("%H:%M").to_string()
}

fn compass(deg: f64) -> &'static str {
    const POINTS: [&str; 8] = ["N", "NE", "E", "SE", "S", "SW", "W", "NW"];
    let idx = ((deg.rem_euclid(360.0) + 22.5) / 45.0) as usize % POINTS.len();
    POINTS[idx]
}

fn wind(w: &Wind) -> String {
    format!("{:.1} m/s {}", w.speed_mps, compass(w.direction_deg))
}

pub fn print_display(display: &WeatherDisplay, page: usize) {
    print_current(&display.current);
    println!("  Scene:      {}", display.category);
    println!();
    print_forecast(&display.forecast, page);
}

pub fn print_current(snap: &WeatherSnapshot) {
    let cond = snap.primary_condition();
    let offset = snap.timezone_offset_secs;

    println!("{}, {}", snap.place_name, snap.country);
    println!(
        "  Updated:    {} (local)",
        local_time(snap.observed_at, offset)
    );
    println!(
        "  Now:        {:.0}°C, feels like {:.0}°C, {}",
        snap.temperature_c, snap.feels_like_c, cond.description
    );
    println!("  Humidity:   {}%", snap.humidity_pct);
    println!("  Pressure:   {:.0} hPa", snap.pressure_hpa);
    println!("  Wind:       {}", wind(&snap.wind));
    if let (Some(rise), Some(set)) = (snap.sunrise, snap.sunset) {
        println!(
            "  Sun:        {} - {}",
            local_time(rise, offset),
            local_time(set, offset)
        );
    }
}

pub fn print_forecast(series: &ForecastSeries, page: usize) {
    let pages = series.page_count(FORECAST_PAGE_SIZE);
    let entries = series.page(page, FORECAST_PAGE_SIZE);
    if entries.is_empty() {
        println!("No forecast entries on page {} of {}.", page + 1, pages.max(1));
        return;
    }

    println!("Forecast (page {} of {})", page + 1, pages);
    for e in entries {
        let description = e
            .conditions
            .first()
            .map(|c| c.description.as_str())
            .unwrap_or("-");
        println!(
            "  {:<19}  {:>4.0}°C  {:>3.0}% rain  {:<14}  {}",
            e.timestamp_text,
            e.temperature_c,
            e.precipitation_probability * 100.0,
            wind(&e.wind),
            description
        );
    }
}

pub fn print_suggestions(suggestions: &[LocationSuggestion]) {
    if suggestions.is_empty() {
        println!("No matching locations.");
        return;
    }
    for s in suggestions {
        println!("  {s}  ({:.2}, {:.2})", s.lat, s.lon);
    }
}

pub fn print_comparison(cities: &[WeatherSnapshot]) {
    if cities.is_empty() {
        println!("No cities added.");
        return;
    }

    println!(
        "{:<20} {:>6} {:>10} {:<18} {:>8} {:>12} {:>9}",
        "City", "Temp", "Feels like", "Weather", "Humidity", "Wind", "Pressure"
    );
    for c in cities {
        let name = format!("{}, {}", c.place_name, c.country);
        println!(
            "{:<20} {:>5.0}° {:>9.0}° {:<18} {:>7}% {:>8.1} m/s {:>5.0} hPa",
            name,
            c.temperature_c,
            c.feels_like_c,
            c.primary_condition().description,
            c.humidity_pct,
            c.wind.speed_mps,
            c.pressure_hpa
        );
    }
}
