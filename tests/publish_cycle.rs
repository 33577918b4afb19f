//! End-to-end publish cycle tests over in-memory versioned resources.
//!
//! These exercise the same path the scheduled binary takes — fetch (with
//! failing providers falling back to safe defaults), derive, publish under
//! optimistic concurrency, append history, then evaluate the report from
//! the committed state — without touching any live API.

use chrono::NaiveDate;

use sitemon_service::alert::AlertOutcome;
use sitemon_service::history::{HISTORY_HEADER, parse_history_log, series_from_rows};
use sitemon_service::ingest::{
    FallbackForecast, FallbackGauge, FallbackHourly, ForecastProvider, HourlySnapshot,
    forecast_or_fallback, hourly_or_unknown, rainfall_or_default,
};
use sitemon_service::model::{
    CraneSafety, LightningState, PrecipitationState, PublishError, SiteTelemetry, SwpppState,
    WorkabilityStatus,
};
use sitemon_service::publish::{
    CycleInputs, InMemoryResource, TelemetryPublisher, VersionedResource,
};
use sitemon_service::report::{ReportParams, SiteReport};

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
}

fn seed_telemetry() -> SiteTelemetry {
    SiteTelemetry {
        project_name: "J&J LMDS - Wilson, NC".to_string(),
        last_updated: "2026-08-28 06:00 EST".to_string(),
        precipitation: PrecipitationState {
            actual_24h: 0.0,
            forecast_prob: 10,
            soil_status: "DRYING".to_string(),
        },
        swppp: SwpppState {
            disturbed_acres: 148.2,
            sb3_capacity_pct: 58.0,
            freeboard_feet: 1.5,
            silt_fence_integrity: "OPTIMAL".to_string(),
            sediment_pct: 25.0,
        },
        crane_safety: CraneSafety {
            wind_speed: 8,
            max_gust: 12,
            status: "GO".to_string(),
        },
        lightning: LightningState {
            forecast: "STABLE".to_string(),
            recent_strikes_50mi: 0,
        },
    }
}

/// Five trailing days ending yesterday: 0.0, 0.0, 0.1, 0.0, 0.2 inches.
fn seed_history_log() -> String {
    let mut log = format!("{}\n", HISTORY_HEADER);
    let amounts = [0.0, 0.0, 0.1, 0.0, 0.2];
    for (i, amount) in amounts.iter().enumerate() {
        let date = today() - chrono::Duration::days(amounts.len() as i64 - i as i64);
        log.push_str(&format!("{},20,{},58.0,10,0,0\n", date.format("%Y-%m-%d"), amount));
    }
    log
}

fn cycle_inputs(rainfall_24h: f64, hourly: HourlySnapshot) -> CycleInputs {
    CycleInputs {
        today: today(),
        timestamp: "2026-08-29 06:00 EST".to_string(),
        rainfall_24h,
        hourly,
    }
}

#[test]
fn test_full_cycle_with_all_providers_down_still_commits() {
    // Every provider unreachable: rainfall defaults to 0.0, hourly to the
    // unknown snapshot, forecast to the synthetic series. The cycle must
    // still read, derive, and commit — provider failures never abort it.
    let status = InMemoryResource::new(serde_json::to_string(&seed_telemetry()).unwrap());
    let history = InMemoryResource::new(seed_history_log());
    let publisher = TelemetryPublisher::new(&status, &history);

    let rainfall = rainfall_or_default(&FallbackGauge, "02091500");
    let hourly = hourly_or_unknown(&FallbackHourly, 35.7413, -77.9938);
    let forecast = forecast_or_fallback(
        &FallbackForecast { today: today() },
        35.7413,
        -77.9938,
        today(),
    );

    let commit = publisher
        .run_cycle(&cycle_inputs(rainfall, hourly))
        .expect("cycle should commit with defaulted inputs");

    assert_eq!(commit.telemetry.precipitation.actual_24h, 0.0);
    assert_eq!(commit.telemetry.lightning.forecast, "UNKNOWN");
    assert_eq!(forecast.len(), 7);

    let rows = parse_history_log(&history.read().unwrap().value).unwrap();
    assert_eq!(rows.len(), 6, "five seeded days plus today's appended row");
    assert_eq!(rows.last().unwrap().date, today());
}

#[test]
fn test_report_from_committed_state_matches_reference_scenario() {
    // Seeded history 0.0, 0.0, 0.1, 0.0, 0.2 with a dry publish day pushes
    // yesterday's 0.2 one decay step back:
    //   0.0 + 0.2*0.85 + 0.0 + 0.1*0.85^3 + 0.0 = 0.231 → Optimal.
    let status = InMemoryResource::new(serde_json::to_string(&seed_telemetry()).unwrap());
    let history = InMemoryResource::new(seed_history_log());
    let publisher = TelemetryPublisher::new(&status, &history);

    let commit = publisher
        .run_cycle(&cycle_inputs(0.0, HourlySnapshot::unknown()))
        .expect("cycle should commit");

    let series = series_from_rows(&parse_history_log(&history.read().unwrap().value).unwrap())
        .expect("committed log should parse");
    let forecast = FallbackForecast { today: today() }
        .daily_forecast(35.7413, -77.9938)
        .unwrap();

    let report = SiteReport::build(
        &series,
        &commit.telemetry,
        &forecast,
        &ReportParams::default(),
    );

    assert_eq!(report.workability_index(), 0.231);
    assert_eq!(report.status(), WorkabilityStatus::Optimal);
    assert_eq!(*report.alert_outcome(), AlertOutcome::AllClear);
    assert_eq!(
        report.precipitation_table().len(),
        13,
        "6 trailing actuals (of 7 requested) plus 7 forecast rows",
    );
}

#[test]
fn test_storm_cycle_raises_wind_and_basin_alerts() {
    let status = InMemoryResource::new(serde_json::to_string(&seed_telemetry()).unwrap());
    let history = InMemoryResource::new(seed_history_log());
    let publisher = TelemetryPublisher::new(&status, &history);

    let storm = HourlySnapshot {
        temperature_f: 68,
        wind_speed_mph: 22,
        max_gust_mph: 34,
        precip_prob_pct: 90,
        lightning_forecast: "RISK".to_string(),
    };
    let commit = publisher
        .run_cycle(&cycle_inputs(2.4, storm))
        .expect("storm cycle should commit");

    assert_eq!(commit.telemetry.crane_safety.status, "STOP");
    assert_eq!(commit.telemetry.swppp.sb3_capacity_pct, 82.0);

    let series = series_from_rows(&parse_history_log(&history.read().unwrap().value).unwrap())
        .unwrap();
    let report = SiteReport::build(&series, &commit.telemetry, &[], &ReportParams::default());

    // api = 2.4 + decayed tail → well past 0.85
    assert_eq!(report.status(), WorkabilityStatus::Restricted);
    let alerts = report.alerts();
    assert_eq!(alerts.len(), 3, "wind danger, restricted danger, basin warning");
    assert_eq!(alerts[0].title, "High wind");
    assert_eq!(alerts[1].title, "Site restricted");
    assert_eq!(alerts[2].title, "Basin SB-3 capacity");
}

#[test]
fn test_two_cycles_from_one_read_exactly_one_commit() {
    let status = InMemoryResource::new(serde_json::to_string(&seed_telemetry()).unwrap());
    let history = InMemoryResource::new(seed_history_log());
    let publisher = TelemetryPublisher::new(&status, &history);

    let shared_read = publisher.read_current().unwrap();

    let first = publisher.publish(&shared_read, &cycle_inputs(0.1, HourlySnapshot::unknown()));
    let second = publisher.publish(&shared_read, &cycle_inputs(0.4, HourlySnapshot::unknown()));

    assert!(first.is_ok(), "first writer should commit");
    match second {
        Err(PublishError::Conflict { .. }) => {}
        other => panic!("second writer should see Conflict, got {:?}", other),
    }

    // Exactly one history row for today, carrying the winner's rainfall.
    let rows = parse_history_log(&history.read().unwrap().value).unwrap();
    let todays: Vec<_> = rows.iter().filter(|r| r.date == today()).collect();
    assert_eq!(todays.len(), 1);
    assert_eq!(todays[0].precip_actual, 0.1);
}
