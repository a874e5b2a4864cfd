//! Weather report payload published by the device on `info/weather`.
//!
//! The device relays a wttr.in-shaped JSON object. All fields are
//! optional strings; the dashboard renders `--` placeholders for whatever
//! is missing rather than rejecting the report.

use serde::Deserialize;

use super::decode::DecodeError;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct WeatherReport {
    #[serde(rename = "temp_C", default)]
    pub temp_c: Option<String>,
    #[serde(rename = "weatherDesc", default)]
    pub description_en: Option<String>,
    /// Localized description, preferred for display when present.
    #[serde(rename = "weatherDesc_zh", default)]
    pub description_zh: Option<String>,
    #[serde(rename = "weatherCode", default)]
    pub weather_code: Option<String>,
    #[serde(default)]
    pub humidity: Option<String>,
    #[serde(rename = "windspeedKmph", default)]
    pub windspeed_kmph: Option<String>,
    #[serde(rename = "winddir16Point", default)]
    pub wind_direction: Option<String>,
    #[serde(default)]
    pub visibility: Option<String>,
    #[serde(rename = "FeelsLikeC", default)]
    pub feels_like_c: Option<String>,
}

impl WeatherReport {
    pub fn description(&self) -> &str {
        self.description_zh
            .as_deref()
            .or(self.description_en.as_deref())
            .unwrap_or("--")
    }

    /// Glyph for the wttr.in weather code. Unknown codes get a neutral
    /// thermometer.
    pub fn icon(&self) -> &'static str {
        let Some(code) = self.weather_code.as_deref() else {
            return "\u{1F321}";
        };
        match code {
            "113" => "\u{2600}",
            "116" => "\u{26C5}",
            "119" | "122" => "\u{2601}",
            "143" | "248" | "260" => "\u{1F32B}",
            "176" | "263" | "293" | "353" => "\u{1F326}",
            "200" | "386" | "389" | "392" | "395" => "\u{26C8}",
            "230" | "332" | "335" | "338" | "371" => "\u{2744}",
            "266" | "296" | "299" | "302" | "305" | "308" | "356" | "359" => "\u{1F327}",
            "179" | "182" | "185" | "227" | "281" | "284" | "311" | "314" | "317" | "320"
            | "323" | "326" | "329" | "350" | "362" | "365" | "368" | "374" | "377" => {
                "\u{1F328}"
            }
            _ => "\u{1F321}",
        }
    }
}

/// Parses the JSON blob. A failed parse keeps the previously displayed
/// report; the caller only logs the error.
pub fn decode_weather(payload: &str) -> Result<WeatherReport, DecodeError> {
    serde_json::from_str(payload).map_err(|e| DecodeError::WeatherJson(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_report() {
        let report = decode_weather(
            r#"{"temp_C":"12","weatherDesc":"Light rain","weatherCode":"296",
                "humidity":"87","windspeedKmph":"15","winddir16Point":"SW",
                "visibility":"9","FeelsLikeC":"10"}"#,
        )
        .unwrap();
        assert_eq!(report.temp_c.as_deref(), Some("12"));
        assert_eq!(report.description(), "Light rain");
        assert_eq!(report.icon(), "\u{1F327}");
    }

    #[test]
    fn localized_description_wins() {
        let report = decode_weather(
            r#"{"weatherDesc":"Sunny","weatherDesc_zh":"晴","weatherCode":"113"}"#,
        )
        .unwrap();
        assert_eq!(report.description(), "\u{6674}");
        assert_eq!(report.icon(), "\u{2600}");
    }

    #[test]
    fn missing_fields_are_tolerated() {
        let report = decode_weather("{}").unwrap();
        assert_eq!(report.description(), "--");
        assert_eq!(report.icon(), "\u{1F321}");
    }

    #[test]
    fn invalid_json_is_a_decode_error() {
        assert!(decode_weather("not json").is_err());
    }
}
