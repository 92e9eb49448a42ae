//! Record decoding
//!
//! A record is accepted only when it starts with the case-sensitive tag
//! `"C "` followed by something that begins with a finite number. Anything
//! else is dropped without error.

use chrono::{DateTime, SecondsFormat, Utc};
use regex::Regex;
use std::sync::OnceLock;

use super::series::{ChartPoint, ChartSeries};

/// Tag marking a Celsius reading
pub const TAG_PREFIX: &str = "C ";

/// Sign, mantissa with at least one digit, optional exponent
fn leading_number() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").ok())
        .as_ref()
}

/// Extract the Celsius value from a record
///
/// Leading whitespace is skipped and the longest numeric prefix is read,
/// so `"C 12abc"` is 12 and a trailing `\r` from the device is ignored.
pub fn parse_celsius(text: &str) -> Option<f64> {
    let payload = text.strip_prefix(TAG_PREFIX)?.trim_start();
    let number = leading_number()?.find(payload)?;
    let value: f64 = number.as_str().parse().ok()?;
    value.is_finite().then_some(value)
}

pub fn celsius_to_fahrenheit(celsius: f64) -> f64 {
    celsius * 1.8 + 32.0
}

/// Round half-up to one decimal and format, e.g. `74.12` → `"74.1"`
pub fn format_reading(value: f64) -> String {
    let rounded = (value * 10.0 + 0.5).floor() / 10.0;
    format!("{:.1}", rounded)
}

/// Decode a record into a chart point stamped with the current time
pub fn decode(text: &str) -> Option<ChartPoint> {
    decode_at(text, Utc::now())
}

/// Decode a record into a chart point stamped with `at`
pub fn decode_at(text: &str, at: DateTime<Utc>) -> Option<ChartPoint> {
    let celsius = parse_celsius(text)?;
    Some(ChartPoint {
        x: at.to_rfc3339_opts(SecondsFormat::Millis, true),
        y: format_reading(celsius_to_fahrenheit(celsius)),
    })
}

/// Transport state seen by a decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    Connected,
    Closed,
}

/// Per-connection decoder feeding a chart series
///
/// Starts connected; once closed, further messages are ignored.
#[derive(Debug, Clone)]
pub struct ClientDecoder {
    state: ClientState,
    series: ChartSeries,
    /// Bumped on every appended point; a change means the chart needs a redraw
    revision: u64,
}

impl ClientDecoder {
    pub fn new() -> Self {
        Self {
            state: ClientState::Connected,
            series: ChartSeries::new(),
            revision: 0,
        }
    }

    /// Handle an inbound text message
    ///
    /// Returns the appended point, or `None` if the message was discarded.
    pub fn on_message(&mut self, text: &str) -> Option<&ChartPoint> {
        self.on_message_at(text, Utc::now())
    }

    pub fn on_message_at(&mut self, text: &str, at: DateTime<Utc>) -> Option<&ChartPoint> {
        if self.state == ClientState::Closed {
            return None;
        }

        let point = decode_at(text, at)?;
        self.series.push(point);
        self.revision += 1;
        self.series.last()
    }

    /// The transport closed; no further messages are processed
    pub fn on_close(&mut self) {
        self.state = ClientState::Closed;
    }

    pub fn state(&self) -> ClientState {
        self.state
    }

    pub fn series(&self) -> &ChartSeries {
        &self.series
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}

impl Default for ClientDecoder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn fixed_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap()
    }

    fn y(text: &str) -> Option<String> {
        decode_at(text, fixed_time()).map(|p| p.y)
    }

    #[test]
    fn test_known_conversions() {
        assert_eq!(y("C 0"), Some("32.0".to_string()));
        assert_eq!(y("C 100"), Some("212.0".to_string()));
        assert_eq!(y("C -40"), Some("-40.0".to_string()));
        assert_eq!(y("C 23.4"), Some("74.1".to_string()));
        assert_eq!(y("C 37"), Some("98.6".to_string()));
    }

    #[test]
    fn test_conversion_matches_formula() {
        for tenths in -500..=1500 {
            let celsius = tenths as f64 / 10.0;
            let expected = celsius_to_fahrenheit(celsius);
            let decoded: f64 = y(&format!("C {}", celsius)).unwrap().parse().unwrap();
            assert!(
                (decoded - expected).abs() <= 0.05 + 1e-9,
                "{} C decoded to {} F, expected about {}",
                celsius,
                decoded,
                expected
            );
        }
    }

    #[test]
    fn test_rounds_half_up() {
        assert_eq!(format_reading(74.25), "74.3");
        assert_eq!(format_reading(-4.25), "-4.2");
        assert_eq!(format_reading(32.0), "32.0");
    }

    #[test]
    fn test_timestamp_is_iso8601_millis() {
        let point = decode_at("C 0", fixed_time()).unwrap();
        assert_eq!(point.x, "2024-03-01T12:30:05.000Z");
    }

    #[test]
    fn test_rejects_untagged_text() {
        assert_eq!(y("garbage"), None);
        assert_eq!(y(""), None);
        assert_eq!(y("c 20"), None);
        assert_eq!(y("C20"), None);
        assert_eq!(y("F 20"), None);
        assert_eq!(y(" C 20"), None);
    }

    #[test]
    fn test_rejects_non_numeric_payload() {
        assert_eq!(y("C notanumber"), None);
        assert_eq!(y("C "), None);
        assert_eq!(y("C -"), None);
        assert_eq!(y("C ."), None);
        assert_eq!(y("C NaN"), None);
        assert_eq!(y("C inf"), None);
        assert_eq!(y("C 1e999"), None);
    }

    #[test]
    fn test_reads_leading_number() {
        assert_eq!(y("C 12abc"), Some("53.6".to_string()));
        assert_eq!(y("C 23.4 C"), Some("74.1".to_string()));
        assert_eq!(y("C .5"), Some("32.9".to_string()));
        assert_eq!(y("C +10"), Some("50.0".to_string()));
        assert_eq!(y("C 2.5e1x"), Some("77.0".to_string()));
        // Exponent marker with no digits is not part of the number
        assert_eq!(y("C 1e"), Some("33.8".to_string()));
    }

    #[test]
    fn test_tolerates_surrounding_whitespace() {
        assert_eq!(y("C 19.5\r"), Some("67.1".to_string()));
        assert_eq!(y("C  21"), Some("69.8".to_string()));
    }

    #[test]
    fn test_decoder_appends_valid_points() {
        let mut decoder = ClientDecoder::new();
        assert_eq!(decoder.state(), ClientState::Connected);

        assert!(decoder.on_message_at("C 0", fixed_time()).is_some());
        assert!(decoder.on_message_at("garbage", fixed_time()).is_none());
        assert!(decoder.on_message_at("C notanumber", fixed_time()).is_none());
        assert!(decoder.on_message_at("C 100", fixed_time()).is_some());

        let ys: Vec<&str> = decoder.series().points().iter().map(|p| p.y.as_str()).collect();
        assert_eq!(ys, vec!["32.0", "212.0"]);
        assert_eq!(decoder.revision(), 2);
    }

    #[test]
    fn test_decoder_ignores_messages_after_close() {
        let mut decoder = ClientDecoder::new();
        decoder.on_message("C 10");
        decoder.on_close();

        assert_eq!(decoder.state(), ClientState::Closed);
        assert!(decoder.on_message("C 20").is_none());
        assert_eq!(decoder.series().len(), 1);
        assert_eq!(decoder.revision(), 1);
    }
}
