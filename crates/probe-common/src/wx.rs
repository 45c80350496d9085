//! Weather-string decoding.
//!
//! Weather grids carry integer indexes into a per-grid table of encoded
//! ("ugly") weather strings. An ugly string is a pipe-and-caret-delimited
//! token sequence; decoding maps a sampled index through the table into one
//! of three output forms.

use crate::value::Value;
use serde::{Deserialize, Serialize};

/// Output form for decoded weather.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WeatherMode {
    /// The table entry verbatim.
    Raw,
    /// Human-readable phrase ("Rain, Drizzle and Fog").
    English,
    /// Decimal form of the simple weather code.
    SimpleCode,
}

/// Decode a numeric weather sample through a grid's ugly-string table.
///
/// The sample is floored to an index; out-of-range indexes come back as the
/// index in decimal, which keeps bad grids diagnosable downstream.
pub fn decode_weather(sample: f64, table: &[String], mode: WeatherMode, version: u8) -> Value {
    let index = sample.floor() as i64;
    if index < 0 || index as usize >= table.len() {
        tracing::debug!(index, table_len = table.len(), "weather index outside table");
        return Value::Text(index.to_string());
    }
    let ugly = &table[index as usize];

    match mode {
        WeatherMode::Raw => Value::Text(ugly.clone()),
        WeatherMode::English => Value::Text(english_phrase(ugly)),
        WeatherMode::SimpleCode => Value::Text(simple_code(ugly, version).to_string()),
    }
}

/// Split an ugly string into its weather tokens.
///
/// Tokens are the non-empty substrings between `|` and `^` separators;
/// `<NoWx>` marks an explicit absence of weather.
pub fn tokenize(ugly: &str) -> Vec<&str> {
    ugly.split(['|', '^'])
        .map(str::trim)
        .filter(|t| !t.is_empty() && *t != "<NoWx>")
        .collect()
}

/// Join translated tokens into an English phrase.
///
/// Non-final pairs join with ", ", the final word joins with " and ". An
/// empty parse yields "No Weather".
pub fn english_phrase(ugly: &str) -> String {
    let words: Vec<String> = tokenize(ugly).iter().map(|t| english_word(t)).collect();
    match words.len() {
        0 => "No Weather".to_string(),
        1 => words.into_iter().next().unwrap(),
        n => {
            let mut phrase = words[..n - 1].join(", ");
            phrase.push_str(" and ");
            phrase.push_str(&words[n - 1]);
            phrase
        }
    }
}

/// Translate a single weather token. Unknown tokens pass through verbatim
/// so new phenomena stay readable.
fn english_word(token: &str) -> String {
    // Probability-qualified tokens keep their keyword part for translation.
    let key = token.trim_end_matches(|c: char| c.is_ascii_digit());
    let word = match key {
        "R" => "Rain",
        "RW" => "Rain Showers",
        "L" => "Drizzle",
        "ZR" => "Freezing Rain",
        "ZL" => "Freezing Drizzle",
        "S" => "Snow",
        "SW" => "Snow Showers",
        "IP" => "Sleet",
        "T" => "Thunderstorms",
        "F" => "Fog",
        "ZF" => "Freezing Fog",
        "IF" => "Ice Fog",
        "IC" => "Ice Crystals",
        "BS" => "Blowing Snow",
        "BD" => "Blowing Dust",
        "K" => "Smoke",
        "H" => "Haze",
        "FR" => "Frost",
        "A" => "Hail",
        "VA" => "Volcanic Ash",
        "WP" => "Waterspouts",
        "ZY" => "Freezing Spray",
        _ => return token.to_string(),
    };
    word.to_string()
}

/// Compute the simple weather code of an ugly string: the code of the most
/// severe token present. Version 2 distinguishes shower types from their
/// steady forms; version 1 collapses them.
pub fn simple_code(ugly: &str, version: u8) -> u8 {
    tokenize(ugly)
        .iter()
        .map(|t| token_code(t, version))
        .max()
        .unwrap_or(0)
}

// Codes are ordered by severity so the max over tokens is the dominant one:
// thunder > freezing > frozen > liquid > obscuration > none.
fn token_code(token: &str, version: u8) -> u8 {
    let key = token.trim_end_matches(|c: char| c.is_ascii_digit());
    match key {
        "T" => 9,
        "ZR" | "ZL" | "ZY" => 8,
        "IP" | "A" => 7,
        "SW" => {
            if version >= 2 {
                6
            } else {
                5
            }
        }
        "S" | "BS" | "IC" => 5,
        "RW" => {
            if version >= 2 {
                4
            } else {
                3
            }
        }
        "R" => 3,
        "L" => 2,
        "F" | "ZF" | "IF" | "K" | "H" | "BD" | "VA" => 1,
        _ => 0,
    }
}
