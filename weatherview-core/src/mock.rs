use chrono::Duration;
use serde_json::json;

use crate::{
    clock::Clock,
    condition::CLOUDY_DAY,
    model::{RawForecastDay, RawWeatherPayload},
    normalize::DEFAULT_CITY,
};

/// Placeholder payload shown whenever real data cannot be used.
///
/// Always complete: today plus two upcoming days. Only the dates depend on
/// the clock.
pub fn mock_payload(clock: &dyn Clock) -> RawWeatherPayload {
    let today = clock.today();
    let iso = |offset: i64| json!((today + Duration::days(offset)).format("%Y-%m-%d").to_string());

    RawWeatherPayload {
        city_name: Some(json!(DEFAULT_CITY)),
        temp: Some(json!(28)),
        description: Some(json!("Parcialmente nublado")),
        condition_slug: Some(json!(CLOUDY_DAY)),
        rain: Some(json!(8)),
        humidity: Some(json!(30)),
        wind_speedy: Some(json!("18 km/h")),
        date: Some(iso(0)),
        sunrise: Some(json!("05:30")),
        sunset: Some(json!("17:45")),
        forecast: Some(vec![
            Some(RawForecastDay {
                max: Some(json!(31)),
                min: Some(json!(28)),
                morning: Some(json!(29)),
                afternoon: Some(json!(31)),
                evening: Some(json!(30)),
                night: Some(json!(27)),
                condition: None,
                date: Some(iso(0)),
                weekday: None,
            }),
            Some(RawForecastDay {
                max: Some(json!(29)),
                min: Some(json!(26)),
                condition: Some(json!("rain")),
                date: Some(iso(1)),
                ..Default::default()
            }),
            Some(RawForecastDay {
                max: Some(json!(28)),
                min: Some(json!(25)),
                condition: Some(json!("storm")),
                date: Some(iso(2)),
                ..Default::default()
            }),
        ]),
    }
}
