//! Per-message-kind payload decoders.
//!
//! Each decoder is a pure function from the raw payload string to a typed
//! record. Malformed payloads never panic and never escalate past this
//! boundary; callers log the [`DecodeError`] and keep the previous state.

use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("malformed pixel payload: {0:?}")]
    MalformedPixel(String),
    #[error("invalid color literal: {0:?}")]
    InvalidColor(String),
    #[error("malformed audio frame: {0:?}")]
    MalformedAudioFrame(String),
    #[error("malformed volume range: {0:?}")]
    MalformedVolumeRange(String),
    #[error("weather report is not valid JSON: {0}")]
    WeatherJson(String),
}

/// A decoded `debug/color` payload: `<index>:#RRGGBB`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelColor {
    pub index: usize,
    /// Normalized to uppercase with a leading `#`.
    pub color: String,
}

/// A decoded `debug/brightness` payload: `<index>:<brightness>`.
///
/// Brightness is nominally 0-255 but is not clamped here; the opacity
/// mapping in the visualization clamps at render time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PixelBrightness {
    pub index: usize,
    pub brightness: u32,
}

/// One audio telemetry frame from the MAX9814 monitor.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFrame {
    pub raw: i64,
    pub volume_db: f32,
    pub vu_level: u8,
    /// Up to 12 band magnitudes; shorter when the device sent fewer.
    pub spectrum: Vec<f32>,
}

/// Calibration range for the volume bar, in dB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VolumeRange {
    pub min_db: f32,
    pub max_db: f32,
}

/// `status` payload. The literal `"on"` means on; anything else is off.
/// There is no error case.
pub fn decode_status(payload: &str) -> bool {
    payload == "on"
}

/// `mode` / `controller` payloads are free-form tokens. Internal state is
/// lowercased; the original casing is kept for display.
pub fn decode_token(payload: &str) -> (String, String) {
    (payload.to_lowercase(), payload.to_string())
}

/// `debug/index` payload. Only `clear` (any casing) means anything.
pub fn decode_debug_clear(payload: &str) -> bool {
    payload.eq_ignore_ascii_case("clear")
}

/// Validates a `#RRGGBB` color literal and normalizes it to uppercase.
pub fn normalize_color(raw: &str) -> Result<String, DecodeError> {
    let hex = raw
        .strip_prefix('#')
        .ok_or_else(|| DecodeError::InvalidColor(raw.to_string()))?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(DecodeError::InvalidColor(raw.to_string()));
    }
    Ok(format!("#{}", hex.to_uppercase()))
}

fn parse_index(raw: &str) -> Option<usize> {
    if raw.is_empty() || !raw.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    raw.parse().ok()
}

/// Decodes `<index>:#RRGGBB`.
pub fn decode_pixel_color(payload: &str) -> Result<PixelColor, DecodeError> {
    let (index, color) = payload
        .split_once(':')
        .ok_or_else(|| DecodeError::MalformedPixel(payload.to_string()))?;
    let index =
        parse_index(index).ok_or_else(|| DecodeError::MalformedPixel(payload.to_string()))?;
    let color = normalize_color(color)?;
    Ok(PixelColor { index, color })
}

/// Decodes `<index>:<brightness>`.
pub fn decode_pixel_brightness(payload: &str) -> Result<PixelBrightness, DecodeError> {
    let (index, brightness) = payload
        .split_once(':')
        .ok_or_else(|| DecodeError::MalformedPixel(payload.to_string()))?;
    let index =
        parse_index(index).ok_or_else(|| DecodeError::MalformedPixel(payload.to_string()))?;
    if brightness.is_empty() || !brightness.chars().all(|c| c.is_ascii_digit()) {
        return Err(DecodeError::MalformedPixel(payload.to_string()));
    }
    let brightness = brightness
        .parse()
        .map_err(|_| DecodeError::MalformedPixel(payload.to_string()))?;
    Ok(PixelBrightness { index, brightness })
}

/// Decodes `raw,volume,vuLevel,band0,...,band11`.
///
/// The first three fields are fixed-position; the remainder is the
/// spectrum, truncated to 12 bands. A frame with fewer than 15 fields is
/// valid and simply yields a shorter spectrum.
pub fn decode_audio_frame(payload: &str) -> Result<AudioFrame, DecodeError> {
    let mut parts = payload.split(',');
    let err = || DecodeError::MalformedAudioFrame(payload.to_string());

    let raw = parts.next().and_then(|p| p.trim().parse().ok()).ok_or_else(err)?;
    let volume_db = parts.next().and_then(|p| p.trim().parse().ok()).ok_or_else(err)?;
    let vu_level = parts.next().and_then(|p| p.trim().parse().ok()).ok_or_else(err)?;

    let mut spectrum = Vec::with_capacity(12);
    for band in parts.take(12) {
        spectrum.push(band.trim().parse().map_err(|_| err())?);
    }

    Ok(AudioFrame {
        raw,
        volume_db,
        vu_level,
        spectrum,
    })
}

/// Decodes `minDb,maxDb`. Exactly two fields, otherwise the previous
/// range stays in effect.
pub fn decode_volume_range(payload: &str) -> Result<VolumeRange, DecodeError> {
    let parts: Vec<&str> = payload.split(',').collect();
    let err = || DecodeError::MalformedVolumeRange(payload.to_string());
    let [min, max] = parts.as_slice() else {
        return Err(err());
    };
    let min_db = min.trim().parse().map_err(|_| err())?;
    let max_db = max.trim().parse().map_err(|_| err())?;
    Ok(VolumeRange { min_db, max_db })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_matches_only_literal_on() {
        assert!(decode_status("on"));
        assert!(!decode_status("off"));
        assert!(!decode_status("On"));
        assert!(!decode_status(""));
    }

    #[test]
    fn tokens_keep_display_casing() {
        let (internal, display) = decode_token("Luminaire");
        assert_eq!(internal, "luminaire");
        assert_eq!(display, "Luminaire");
    }

    #[test]
    fn decodes_pixel_color() {
        let rec = decode_pixel_color("3:#aabbcc").unwrap();
        assert_eq!(rec.index, 3);
        assert_eq!(rec.color, "#AABBCC");
    }

    #[test]
    fn rejects_malformed_pixel_color() {
        assert!(decode_pixel_color("abc:#ZZZZZZ").is_err());
        assert!(decode_pixel_color("3:#ZZZZZZ").is_err());
        assert!(decode_pixel_color("3:#ABC").is_err());
        assert!(decode_pixel_color("3#AABBCC").is_err());
        assert!(decode_pixel_color("-1:#AABBCC").is_err());
    }

    #[test]
    fn decodes_pixel_brightness_without_clamping() {
        let rec = decode_pixel_brightness("5:128").unwrap();
        assert_eq!(rec.index, 5);
        assert_eq!(rec.brightness, 128);
        // Out-of-range values pass decode; clamping is a render concern.
        assert_eq!(decode_pixel_brightness("0:999").unwrap().brightness, 999);
    }

    #[test]
    fn rejects_malformed_pixel_brightness() {
        assert!(decode_pixel_brightness("5:full").is_err());
        assert!(decode_pixel_brightness("5").is_err());
    }

    #[test]
    fn clear_is_case_insensitive() {
        assert!(decode_debug_clear("clear"));
        assert!(decode_debug_clear("CLEAR"));
        assert!(!decode_debug_clear("reset"));
    }

    #[test]
    fn decodes_full_audio_frame() {
        let frame = decode_audio_frame(
            "512,65.2,3,0.4,0.5,0.6,0.7,0.6,0.5,0.4,0.3,0.2,0.1,0.05,0.03",
        )
        .unwrap();
        assert_eq!(frame.raw, 512);
        assert_eq!(frame.vu_level, 3);
        assert_eq!(frame.spectrum.len(), 12);
        assert_eq!(frame.spectrum[0], 0.4);
    }

    #[test]
    fn short_audio_frame_yields_short_spectrum() {
        let frame = decode_audio_frame("512,65.2,3").unwrap();
        assert!(frame.spectrum.is_empty());

        let frame = decode_audio_frame("512,65.2,3,0.1,0.2").unwrap();
        assert_eq!(frame.spectrum, vec![0.1, 0.2]);
    }

    #[test]
    fn extra_audio_bands_are_truncated() {
        let payload = format!("1,2.0,3{}", ",0.1".repeat(20));
        let frame = decode_audio_frame(&payload).unwrap();
        assert_eq!(frame.spectrum.len(), 12);
    }

    #[test]
    fn rejects_malformed_audio_frame() {
        assert!(decode_audio_frame("").is_err());
        assert!(decode_audio_frame("512,loud").is_err());
        assert!(decode_audio_frame("512,65.2,3,x").is_err());
    }

    #[test]
    fn decodes_volume_range() {
        let range = decode_volume_range("30,120").unwrap();
        assert_eq!(range.min_db, 30.0);
        assert_eq!(range.max_db, 120.0);
    }

    #[test]
    fn volume_range_needs_exactly_two_fields() {
        assert!(decode_volume_range("30").is_err());
        assert!(decode_volume_range("30,120,5").is_err());
        assert!(decode_volume_range("low,high").is_err());
    }

    #[test]
    fn normalizes_colors() {
        assert_eq!(normalize_color("#ff00aa").unwrap(), "#FF00AA");
        assert!(normalize_color("ff00aa").is_err());
        assert!(normalize_color("#ff00a").is_err());
        assert!(normalize_color("#gg0000").is_err());
    }
}
