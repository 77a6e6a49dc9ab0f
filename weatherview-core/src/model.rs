use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::normalize::NormalizationError;

/// Parameters handed to a [`crate::WeatherFetcher`] for a single attempt.
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub city_id: String,
    pub api_key: String,
    pub timeout: Duration,
}

/// Untrusted provider payload (the `results` object of the envelope).
///
/// Every scalar is kept as a raw JSON value: absent and `null` both end up as
/// `None`, and any other type is accepted here and coerced later by the
/// normalizer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawWeatherPayload {
    pub city_name: Option<Value>,
    pub temp: Option<Value>,
    pub description: Option<Value>,
    pub condition_slug: Option<Value>,
    pub rain: Option<Value>,
    pub humidity: Option<Value>,
    pub wind_speedy: Option<Value>,
    pub date: Option<Value>,
    pub sunrise: Option<Value>,
    pub sunset: Option<Value>,
    /// Day 0 is today. A `null` entry is treated as a day with no data.
    pub forecast: Option<Vec<Option<RawForecastDay>>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawForecastDay {
    pub max: Option<Value>,
    pub min: Option<Value>,
    pub morning: Option<Value>,
    pub afternoon: Option<Value>,
    pub evening: Option<Value>,
    pub night: Option<Value>,
    pub condition: Option<Value>,
    pub date: Option<Value>,
    /// Provider's own short weekday label, e.g. "Seg".
    pub weekday: Option<Value>,
}

impl RawWeatherPayload {
    /// Lift an arbitrary JSON value into the typed payload.
    ///
    /// Only structural mismatches fail: a payload that is not an object, a
    /// `forecast` that is not an array, or a forecast entry that is not an
    /// object. Field-level problems are left for the normalizer to default.
    pub fn from_json(value: &Value) -> Result<Self, NormalizationError> {
        if !value.is_object() {
            return Err(NormalizationError::NotAnObject(json_kind(value)));
        }

        if let Some(Value::Array(days)) = value.get("forecast") {
            if let Some(day) = days.iter().find(|d| !d.is_object() && !d.is_null()) {
                return Err(NormalizationError::NotAnObject(json_kind(day)));
            }
        }

        Ok(serde_json::from_value(value.clone())?)
    }

    /// Forecast entry at `index`, with missing and `null` entries as `None`.
    pub fn forecast_day(&self, index: usize) -> Option<&RawForecastDay> {
        self.forecast.as_ref()?.get(index)?.as_ref()
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Fully populated view model consumed by renderers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherView {
    pub city: String,
    pub current_temp: String,
    pub description: String,
    pub condition: String,
    pub precipitation: String,
    pub humidity: String,
    pub wind: String,
    pub max_min: String,
    pub today_forecast: [HourlyForecast; 4],
    pub next_forecast: Vec<DailyForecast>,
    pub date: String,
    pub sunrise: String,
    pub sunset: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HourlyForecast {
    pub time: String,
    pub temp: String,
    pub condition: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DailyForecast {
    pub day: String,
    pub temp: String,
    pub condition: String,
}

/// Why the displayed view came from mock data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCause {
    NoConnection,
    LoadFailed,
}

impl ErrorCause {
    pub fn message(self) -> &'static str {
        match self {
            ErrorCause::NoConnection => "Sem conexão",
            ErrorCause::LoadFailed => "Erro ao carregar",
        }
    }
}

/// User-facing error flag that accompanies a mock-backed view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorState {
    pub cause: ErrorCause,
    pub message: String,
}

impl ErrorState {
    /// Persistent notice shown next to the error while mock data is displayed.
    pub const MOCK_NOTICE: &'static str = "Dados mockados estão sendo exibidos";
}

impl From<ErrorCause> for ErrorState {
    fn from(cause: ErrorCause) -> Self {
        Self { cause, message: cause.message().to_string() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn from_json_maps_null_and_absent_to_none() {
        let raw = RawWeatherPayload::from_json(&json!({ "temp": null, "city_name": "Recife" }))
            .expect("object payload parses");

        assert_eq!(raw.temp, None);
        assert_eq!(raw.humidity, None);
        assert_eq!(raw.city_name, Some(json!("Recife")));
    }

    #[test]
    fn from_json_keeps_wrongly_typed_scalars() {
        let raw = RawWeatherPayload::from_json(&json!({ "temp": { "c": 20 }, "rain": true }))
            .expect("scalars of any type are accepted");

        assert_eq!(raw.temp, Some(json!({ "c": 20 })));
        assert_eq!(raw.rain, Some(json!(true)));
    }

    #[test]
    fn from_json_ignores_unknown_provider_fields() {
        let raw = RawWeatherPayload::from_json(&json!({
            "currently": "dia",
            "forecast": [{ "max": 30, "rain_probability": 40 }]
        }))
        .expect("unknown fields are ignored");

        assert_eq!(raw.forecast_day(0).and_then(|d| d.max.clone()), Some(json!(30)));
    }

    #[test]
    fn from_json_rejects_non_object_payload() {
        let err = RawWeatherPayload::from_json(&json!("oops")).unwrap_err();
        assert!(err.to_string().contains("string"));
    }

    #[test]
    fn from_json_rejects_non_array_forecast() {
        assert!(RawWeatherPayload::from_json(&json!({ "forecast": "soon" })).is_err());
    }

    #[test]
    fn from_json_rejects_positional_forecast_entries() {
        let err = RawWeatherPayload::from_json(&json!({ "forecast": [{}, [30, 20]] })).unwrap_err();
        assert!(err.to_string().contains("array"));
    }

    #[test]
    fn null_forecast_entries_read_as_missing() {
        let raw = RawWeatherPayload::from_json(&json!({ "forecast": [null, { "max": 1 }] }))
            .expect("null entries are allowed");

        assert!(raw.forecast_day(0).is_none());
        assert!(raw.forecast_day(1).is_some());
        assert!(raw.forecast_day(2).is_none());
    }

    #[test]
    fn view_serializes_camel_case() {
        let slot = HourlyForecast {
            time: "09:00".into(),
            temp: "20°C".into(),
            condition: "rain".into(),
        };
        let view = WeatherView {
            city: "Recife".into(),
            current_temp: "20°".into(),
            description: "Chuva".into(),
            condition: "rain".into(),
            precipitation: "0%".into(),
            humidity: "80%".into(),
            wind: "10 km/h".into(),
            max_min: "Max.: 22° Min.: 19°".into(),
            today_forecast: [slot.clone(), slot.clone(), slot.clone(), slot],
            next_forecast: Vec::new(),
            date: "19 de out.".into(),
            sunrise: "05:30".into(),
            sunset: "17:45".into(),
        };

        let json = serde_json::to_value(&view).expect("view serializes");
        assert_eq!(json["currentTemp"], "20°");
        assert_eq!(json["maxMin"], "Max.: 22° Min.: 19°");
        assert_eq!(json["todayForecast"].as_array().map(Vec::len), Some(4));
    }
}
