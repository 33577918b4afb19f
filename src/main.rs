//! One update cycle: fetch fresh readings, publish the new telemetry
//! snapshot, append today's history row, and print the evaluated report.
//!
//! Scheduling is external — cron (or the CI workflow) runs this binary on
//! a fixed interval. A conflict with a concurrent writer is logged and
//! left for the next scheduled run.

use std::time::Duration;

use chrono::{Local, Utc};

use sitemon_service::config::{load_config, store_token_from_env};
use sitemon_service::history::{parse_history_log, series_from_rows};
use sitemon_service::ingest::{
    forecast_or_fallback, hourly_or_unknown, rainfall_or_default,
    nws::NwsHourlyForecast, open_meteo::OpenMeteoForecast, usgs::UsgsRainGauge,
};
use sitemon_service::logging::{self, DataSource, LogLevel};
use sitemon_service::model::PublishError;
use sitemon_service::publish::{
    CycleInputs, HttpEtagResource, TelemetryPublisher, VersionedResource,
};
use sitemon_service::report::{ReportParams, SiteReport};

fn main() {
    dotenv::dotenv().ok();
    logging::init_logger(LogLevel::Info, Some("sitemon.log"), true);

    if let Err(e) = run() {
        logging::error(DataSource::System, None, &format!("cycle failed: {}", e));
        std::process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config("site.toml")?;
    let site = &config.site;

    let client = reqwest::blocking::Client::builder()
        .timeout(Duration::from_secs(30))
        .user_agent("sitemon_service/0.1 (site telemetry updater)")
        .build()?;

    // Fetch fresh readings; every failure is absorbed into a safe default.
    let today = Local::now().date_naive();
    let gauge = UsgsRainGauge::new(client.clone());
    let forecast_provider = OpenMeteoForecast::new(client.clone());
    let hourly_provider = NwsHourlyForecast::new(client.clone());

    let rainfall_24h = rainfall_or_default(&gauge, &site.usgs_station);
    let hourly = hourly_or_unknown(&hourly_provider, site.latitude, site.longitude);
    let forecast = forecast_or_fallback(&forecast_provider, site.latitude, site.longitude, today);

    logging::info(
        DataSource::System,
        Some(&site.project_name),
        &format!(
            "readings: rain_24h={:.2}in gust={}mph lightning={}",
            rainfall_24h, hourly.max_gust_mph, hourly.lightning_forecast,
        ),
    );

    // Publish under optimistic concurrency.
    let token = store_token_from_env();
    let status = HttpEtagResource::new(client.clone(), &config.store.status_url, token.clone());
    let history_log = HttpEtagResource::new(client.clone(), &config.store.history_url, token);
    let publisher = TelemetryPublisher::new(&status, &history_log);

    let inputs = CycleInputs {
        today,
        timestamp: Utc::now().format("%Y-%m-%d %H:%M UTC").to_string(),
        rainfall_24h,
        hourly,
    };

    let commit = match publisher.run_cycle(&inputs) {
        Ok(commit) => commit,
        Err(PublishError::Conflict { expected }) => {
            // Another writer won this cycle. Not fatal — the next scheduled
            // run re-reads and publishes then.
            logging::warn(
                DataSource::Store,
                Some(&site.project_name),
                &format!("concurrent update won (token {}), skipping this cycle", expected),
            );
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    logging::info(
        DataSource::Store,
        Some(&site.project_name),
        &format!("published revision {}", commit.token),
    );

    // Evaluate and print the report from the freshly committed state.
    let log_body = history_log.read()?.value;
    let series = series_from_rows(&parse_history_log(&log_body)?)?;
    let params = ReportParams {
        window_days: config.engine.window_days,
        decay: config.engine.decay,
        thresholds: config.engine.thresholds(),
    };
    let report = SiteReport::build(&series, &commit.telemetry, &forecast, &params);

    println!("\n{} — {}", site.project_name, commit.telemetry.last_updated);
    println!(
        "workability index {:.3} → {}",
        report.workability_index(),
        report.status(),
    );
    for action in report.actions() {
        println!("  • {}", action);
    }

    let alerts = report.alerts();
    if alerts.is_empty() {
        println!("no active alerts");
    } else {
        for alert in alerts {
            println!("[{}] {}: {}", alert.level, alert.title, alert.message);
        }
    }

    println!("\n14-day precipitation window:");
    for row in report.precipitation_table() {
        println!(
            "  {}  {:>5.2} in  {:>4}  {}",
            row.date,
            row.amount_in,
            row.probability_label(),
            row.kind,
        );
    }

    Ok(())
}
