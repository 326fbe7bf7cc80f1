use chrono::{NaiveDate, NaiveTime};
use saju_core::{calculate, calculate_offline, ephemeris, BirthInput, Gender, TimeAccuracy};

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // Example usage: 15th may 1990 2:30 PM, seoul korea
    let Some(date) = NaiveDate::from_ymd_opt(1990, 5, 15) else {
        return;
    };
    let birth_input = BirthInput {
        date,
        time: NaiveTime::from_hms_opt(14, 30, 0),
        time_accuracy: TimeAccuracy::Exact,
        gender: Gender::Male,
        longitude: Some(126.978),
        latitude: Some(37.566),
        tz_offset_minutes: 9 * 60,
    };

    let result = match ephemeris::global() {
        Ok(engine) => calculate(&birth_input, engine),
        Err(e) => {
            eprintln!("engine unavailable ({}), using approximate path", e);
            calculate_offline(&birth_input)
        }
    };

    match result {
        Ok(payload) => match serde_json::to_string_pretty(&payload) {
            Ok(json) => println!("{}", json),
            Err(e) => eprintln!("serialization error: {:?}", e),
        },
        Err(e) => eprintln!("Error: {:?}", e),
    }
}
