use chrono::Weekday;
use serde::{Deserialize, Serialize};

use chatorder_text::fold;

/// A customer as known to the store: display name and delivery days.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Customer {
    /// May be empty; replies fall back to a generic salutation.
    name: String,
    /// Weekdays the customer receives deliveries on. Empty means "any day".
    allowed_weekdays: Vec<Weekday>,
}

impl Customer {
    pub fn new(name: impl Into<String>, allowed_weekdays: impl IntoIterator<Item = Weekday>) -> Self {
        let name = name.into().trim().to_string();

        let mut days: Vec<Weekday> = Vec::with_capacity(7);
        for day in allowed_weekdays {
            if !days.contains(&day) {
                days.push(day);
            }
        }

        Self {
            name,
            allowed_weekdays: days,
        }
    }

    /// Build a customer from Spanish day names as stored (`"Lunes"`, `"miercoles"`).
    ///
    /// Unrecognized names are skipped.
    pub fn from_day_names<S: AsRef<str>>(
        name: impl Into<String>,
        day_names: impl IntoIterator<Item = S>,
    ) -> Self {
        let days = day_names.into_iter().filter_map(|raw| {
            let parsed = parse_weekday(raw.as_ref());
            if parsed.is_none() {
                tracing::debug!(day = raw.as_ref(), "ignoring unknown weekday name");
            }
            parsed
        });
        Self::new(name, days)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn allowed_weekdays(&self) -> &[Weekday] {
        &self.allowed_weekdays
    }
}

/// Parse a Spanish weekday name, case- and accent-insensitive.
pub fn parse_weekday(raw: &str) -> Option<Weekday> {
    match fold(raw).as_str() {
        "lunes" => Some(Weekday::Mon),
        "martes" => Some(Weekday::Tue),
        "miercoles" => Some(Weekday::Wed),
        "jueves" => Some(Weekday::Thu),
        "viernes" => Some(Weekday::Fri),
        "sabado" => Some(Weekday::Sat),
        "domingo" => Some(Weekday::Sun),
        _ => None,
    }
}

/// Lowercase Spanish display name, with accents.
pub fn weekday_name(day: Weekday) -> &'static str {
    match day {
        Weekday::Mon => "lunes",
        Weekday::Tue => "martes",
        Weekday::Wed => "miércoles",
        Weekday::Thu => "jueves",
        Weekday::Fri => "viernes",
        Weekday::Sat => "sábado",
        Weekday::Sun => "domingo",
    }
}
