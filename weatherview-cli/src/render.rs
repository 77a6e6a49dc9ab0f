use serde_json::{Value, json};
use weatherview_core::{
    ErrorState, WeatherSnapshot, WeatherView,
    condition::{glyph, icon_name},
};

/// Formats a snapshot as a plain-text panel.
pub fn render(snapshot: &WeatherSnapshot) -> String {
    render_parts(snapshot.view.as_deref(), snapshot.error.as_ref())
}

/// Machine-readable form of a snapshot for `show --json`.
pub fn to_json(snapshot: &WeatherSnapshot) -> Value {
    let view = snapshot.view.as_deref();
    json!({
        "view": view,
        "icon": view.map(|v| icon_name(&v.condition)),
        "mock": snapshot.is_mock(),
        "error": &snapshot.error,
    })
}

fn render_parts(view: Option<&WeatherView>, error: Option<&ErrorState>) -> String {
    let mut output = String::new();

    if let Some(error) = error {
        output.push_str(&format!("{}\n{}\n", error.message, ErrorState::MOCK_NOTICE));
        output.push_str("Rode o comando novamente para tentar outra vez.\n\n");
    }

    let Some(view) = view else {
        output.push_str("Carregando dados meteorológicos...\n");
        return output;
    };

    output.push_str(&format!("{}\n", view.city));
    output.push_str(&format!(
        "{}  {} {}\n\n",
        view.current_temp,
        glyph(&view.condition),
        view.description
    ));
    output.push_str(&format!(
        "Chuva: {}  Umidade: {}  Vento: {}\n",
        view.precipitation, view.humidity, view.wind
    ));
    output.push_str(&format!("Nascer: {}  Pôr: {}\n", view.sunrise, view.sunset));
    output.push_str(&format!("{}\n\n", view.max_min));

    output.push_str(&format!("Hoje {}\n", view.date));
    for slot in &view.today_forecast {
        output.push_str(&format!("  {}  {} {}\n", slot.time, glyph(&slot.condition), slot.temp));
    }

    if !view.next_forecast.is_empty() {
        output.push_str("\nPróximos Dias\n");
        for day in &view.next_forecast {
            output.push_str(&format!("  {} {:<6} {}\n", glyph(&day.condition), day.day, day.temp));
        }
    }

    output
}
