use headlog_core::models::{CatalogItem, CatalogKind, HeadacheLog, HeadacheStats};
use headlog_core::utils::{
    format_duration, format_mean, format_optional, format_timestamp, truncate_string,
};

/// Column width for catalog names in listings
const NAME_WIDTH: usize = 40;

pub fn print_stats(stats: &HeadacheStats) {
    println!("Headaches logged:       {}", stats.occurrences);
    println!(
        "Mean duration:          {}",
        stats
            .mean_duration
            .map(|secs| format_duration(secs.round() as i64))
            .unwrap_or_else(|| "-".to_string())
    );
    println!(
        "Most common intensity:  {}",
        format_optional(stats.most_common_intensity.as_deref(), "-")
    );
    println!(
        "Most common side:       {}",
        format_optional(
            stats
                .most_common_side_name
                .as_deref()
                .or(stats.most_common_side.as_deref()),
            "-"
        )
    );
    println!(
        "Most common result:     {}",
        format_optional(stats.most_common_remedy_result.as_deref(), "-")
    );

    if !stats.mean_remedies.is_empty() {
        println!("\nRemedies (mean quantity)");
        for remedy in &stats.mean_remedies {
            println!(
                "  {:<width$} {:.1}",
                truncate_string(&remedy.name, NAME_WIDTH),
                remedy.mean_quantity,
                width = NAME_WIDTH
            );
        }
    }

    println!("\nWeather");
    println!("  Temperature:          {}", format_mean(stats.mean_temperature, "°C"));
    println!(
        "  Feels like:           {}",
        format_mean(stats.mean_apparent_temperature, "°C")
    );
    println!(
        "  Min / max:            {} / {}",
        format_mean(stats.mean_min_temperature, "°C"),
        format_mean(stats.mean_max_temperature, "°C")
    );
    println!(
        "  Feels like min / max: {} / {}",
        format_mean(stats.mean_apparent_min_temperature, "°C"),
        format_mean(stats.mean_apparent_max_temperature, "°C")
    );
    println!("  UV index:             {}", format_mean(stats.mean_uv_index, ""));
    println!(
        "  Shortwave radiation:  {}",
        format_mean(stats.mean_shortwave_radiation, " W/m²")
    );
}

pub fn print_log_list(logs: &[HeadacheLog]) {
    if logs.is_empty() {
        println!("No headaches logged yet.");
        return;
    }

    for log in logs {
        let duration = if log.is_ongoing() {
            "ongoing".to_string()
        } else {
            log.duration_in_seconds
                .map(format_duration)
                .unwrap_or_else(|| "-".to_string())
        };
        println!(
            "{}  {}  {:<9} {:<6} {}",
            log.id,
            format_timestamp(&log.start_timestamp),
            log.intensity_display(),
            log.side.to_string(),
            duration
        );
    }
}

pub fn print_log(log: &HeadacheLog) {
    println!("Headache {}", log.id);
    println!("  Started:    {}", format_timestamp(&log.start_timestamp));
    match &log.end_timestamp {
        Some(end) => println!("  Ended:      {}", format_timestamp(end)),
        None => println!("  Ended:      (ongoing)"),
    }
    if let Some(secs) = log.duration_in_seconds {
        println!("  Duration:   {}", format_duration(secs));
    }
    println!(
        "  Intensity:  {} ({})",
        log.intensity_display(),
        log.intensity.level()
    );
    println!("  Side:       {}", log.side);
    println!("  Sleep rank: {}", log.sleep_rank);

    let symptoms = log.symptoms();
    if symptoms.is_empty() {
        println!("  Symptoms:   none");
    } else {
        println!("  Symptoms:   {}", symptoms.join(", "));
    }

    if let Some(weather) = &log.weather {
        println!(
            "  Weather:    {} (feels like {}), UV {}",
            format_mean(weather.temperature, "°C"),
            format_mean(weather.apparent_temperature, "°C"),
            format_mean(weather.uv_index, "")
        );
    }

    if !log.remedies.is_empty() {
        println!("  Remedies:");
        for remedy in &log.remedies {
            println!(
                "    [{}] {} x{}  {}",
                remedy.id,
                remedy.remedy.name,
                remedy.quantity,
                remedy.result.map(|r| r.symbol()).unwrap_or("unrated")
            );
        }
    }

    let names = |items: &[CatalogItem]| {
        items
            .iter()
            .map(|item| item.name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    if !log.foods.is_empty() {
        println!("  Foods:      {}", names(&log.foods));
    }
    if !log.drinks.is_empty() {
        println!("  Drinks:     {}", names(&log.drinks));
    }
}

pub fn print_catalog(kind: CatalogKind, items: &[CatalogItem]) {
    if items.is_empty() {
        println!("No {} yet.", kind.title().to_lowercase());
        return;
    }
    println!("{}", kind.title());
    for item in items {
        println!(
            "  {:<width$} {}",
            truncate_string(&item.name, NAME_WIDTH),
            item.id,
            width = NAME_WIDTH
        );
    }
}

/// Mark catalog entries that are part of the current selection
pub fn print_selection(title: &str, items: &[CatalogItem], selected: &[String]) {
    println!("{}", title);
    for item in items {
        let mark = if selected.contains(&item.id) { "x" } else { " " };
        println!("  [{}] {}", mark, item.name);
    }
}
