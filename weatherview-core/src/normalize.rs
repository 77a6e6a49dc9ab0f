//! Raw provider payload -> [`WeatherView`].

use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::{
    clock::Clock,
    condition::{self, CLEAR_DAY, CLOUDY_DAY, CLOUDY_NIGHT},
    format::{
        CELSIUS, DEFAULT_UNIT, coerce_temperature, format_localized_date, parse_calendar_date,
        percent, scalar_text, short_label, weekday_label,
    },
    mock::mock_payload,
    model::{DailyForecast, HourlyForecast, RawForecastDay, RawWeatherPayload, WeatherView},
};

pub const DEFAULT_CITY: &str = "Fortaleza";
pub const UNKNOWN_DESCRIPTION: &str = "Condição desconhecida";
const NO_TIME: &str = "-:--";
const NO_WIND: &str = "-- km/h";

/// Number of upcoming days shown after today.
const NEXT_DAYS: usize = 2;

/// Fixed today slots: display time, the day field feeding it, and the
/// condition used when the day has none.
const TODAY_SLOTS: [(&str, DaySlot, &str); 4] = [
    ("09:00", DaySlot::Morning, CLOUDY_DAY),
    ("12:00", DaySlot::Afternoon, CLEAR_DAY),
    ("15:00", DaySlot::Evening, CLOUDY_DAY),
    ("18:00", DaySlot::Night, CLOUDY_NIGHT),
];

#[derive(Debug, Clone, Copy)]
enum DaySlot {
    Morning,
    Afternoon,
    Evening,
    Night,
}

impl DaySlot {
    fn read(self, day: &RawForecastDay) -> Option<&Value> {
        match self {
            DaySlot::Morning => day.morning.as_ref(),
            DaySlot::Afternoon => day.afternoon.as_ref(),
            DaySlot::Evening => day.evening.as_ref(),
            DaySlot::Night => day.night.as_ref(),
        }
    }
}

/// The payload had a shape the normalizer cannot read.
#[derive(Debug, Error)]
pub enum NormalizationError {
    #[error("expected a JSON object, got {0}")]
    NotAnObject(&'static str),

    #[error("unexpected payload shape: {0}")]
    Shape(#[from] serde_json::Error),
}

/// Build the view model, defaulting every field independently.
pub fn normalize(raw: &RawWeatherPayload, clock: &dyn Clock) -> WeatherView {
    let empty = RawForecastDay::default();
    let today = raw.forecast_day(0).unwrap_or(&empty);

    let condition = scalar_text(raw.condition_slug.as_ref()).unwrap_or_else(|| CLOUDY_DAY.into());
    if !condition::is_known(&condition) {
        debug!(%condition, "condition code outside the icon vocabulary");
    }

    WeatherView {
        city: scalar_text(raw.city_name.as_ref()).unwrap_or_else(|| DEFAULT_CITY.into()),
        current_temp: coerce_temperature(raw.temp.as_ref(), DEFAULT_UNIT),
        description: scalar_text(raw.description.as_ref())
            .unwrap_or_else(|| UNKNOWN_DESCRIPTION.into()),
        condition,
        precipitation: scalar_text(raw.rain.as_ref())
            .map(|rain| percent(&rain))
            .unwrap_or_else(|| "0%".into()),
        humidity: percent(&scalar_text(raw.humidity.as_ref()).unwrap_or_else(|| "--".into())),
        wind: wind_text(raw.wind_speedy.as_ref()),
        max_min: format!(
            "Max.: {} Min.: {}",
            coerce_temperature(today.max.as_ref(), DEFAULT_UNIT),
            coerce_temperature(today.min.as_ref(), DEFAULT_UNIT),
        ),
        today_forecast: TODAY_SLOTS.map(|(time, slot, fallback)| HourlyForecast {
            time: time.into(),
            temp: coerce_temperature(slot.read(today), CELSIUS),
            condition: scalar_text(today.condition.as_ref()).unwrap_or_else(|| fallback.into()),
        }),
        next_forecast: next_days(raw, clock),
        date: format_localized_date(raw.date.as_ref(), clock),
        sunrise: scalar_text(raw.sunrise.as_ref()).unwrap_or_else(|| NO_TIME.into()),
        sunset: scalar_text(raw.sunset.as_ref()).unwrap_or_else(|| NO_TIME.into()),
    }
}

/// Parse and normalize an untrusted JSON payload.
pub fn normalize_json(value: &Value, clock: &dyn Clock) -> Result<WeatherView, NormalizationError> {
    let raw = RawWeatherPayload::from_json(value)?;
    Ok(normalize(&raw, clock))
}

/// Like [`normalize_json`], but a payload that cannot be read is replaced by
/// the mock payload, so a view is always produced.
pub fn normalize_or_mock(value: &Value, clock: &dyn Clock) -> WeatherView {
    normalize_json(value, clock).unwrap_or_else(|err| {
        warn!(error = %err, "failed to normalize payload, using mock data");
        normalize(&mock_payload(clock), clock)
    })
}

fn next_days(raw: &RawWeatherPayload, clock: &dyn Clock) -> Vec<DailyForecast> {
    let Some(days) = raw.forecast.as_ref() else {
        return Vec::new();
    };

    let empty = RawForecastDay::default();
    days.iter()
        .enumerate()
        .skip(1)
        .take(NEXT_DAYS)
        .map(|(offset, day)| {
            let day = day.as_ref().unwrap_or(&empty);
            DailyForecast {
                day: day_label(day, offset, clock),
                temp: format!(
                    "{}: {}",
                    coerce_temperature(day.max.as_ref(), DEFAULT_UNIT),
                    coerce_temperature(day.min.as_ref(), DEFAULT_UNIT),
                ),
                condition: scalar_text(day.condition.as_ref()).unwrap_or_else(|| CLOUDY_DAY.into()),
            }
        })
        .collect()
}

/// Weekday from the day's date, else the provider's label, else the local
/// date `offset` days after today.
fn day_label(day: &RawForecastDay, offset: usize, clock: &dyn Clock) -> String {
    let today = clock.today();

    if let Some(date) = day.date.as_ref().and_then(|d| parse_calendar_date(d, today)) {
        return weekday_label(date);
    }

    if let Some(label) = scalar_text(day.weekday.as_ref()).and_then(|w| short_label(&w)) {
        return label;
    }

    weekday_label(today + chrono::Duration::days(offset as i64))
}

fn wind_text(value: Option<&Value>) -> String {
    match (value, scalar_text(value)) {
        (Some(Value::Number(_)), Some(speed)) => format!("{speed} km/h"),
        (_, Some(text)) => text,
        (_, None) => NO_WIND.into(),
    }
}
