//! Result interpretation
//!
//! Maps raw vote scores onto confidence labels and frame offsets onto a
//! position inside the matched recording.

use serde::Serialize;

use crate::config::EngineConfig;

/// Confidence bands over the raw score.
///
/// Thresholds are empirical, calibrated for queries of roughly 6-10 s, and
/// are part of the external contract: a score below 200 is reported as no
/// match even when a winning pair exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Confidence {
    #[serde(rename = "No match")]
    NoMatch,
    #[serde(rename = "Low confidence")]
    Low,
    #[serde(rename = "Medium confidence")]
    Medium,
    #[serde(rename = "High confidence")]
    High,
}

impl Confidence {
    pub fn from_score(score: u64) -> Self {
        match score {
            0..=199 => Confidence::NoMatch,
            200..=999 => Confidence::Low,
            1000..=2999 => Confidence::Medium,
            _ => Confidence::High,
        }
    }

    pub fn is_match(self) -> bool {
        self != Confidence::NoMatch
    }
}

impl std::fmt::Display for Confidence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Confidence::NoMatch => "No match",
            Confidence::Low => "Low confidence",
            Confidence::Medium => "Medium confidence",
            Confidence::High => "High confidence",
        })
    }
}

/// Format a position as M:SS. The sign is discarded: a negative offset
/// means the query started before the indexed recording.
pub fn format_position(seconds: f64) -> String {
    let total = seconds.abs() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Structured recognition outcome.
///
/// Serializes to one of two shapes: a match carries the song, position and
/// confidence; a non-match carries a message. `raw_score` is always
/// present.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recognition {
    pub matched: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub song: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position_in_song: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confidence: Option<Confidence>,
    pub raw_score: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl Recognition {
    /// A well-defined non-match outcome (not an error).
    pub fn no_match(message: impl Into<String>, raw_score: u64) -> Self {
        Recognition {
            matched: false,
            song: None,
            position_in_song: None,
            confidence: None,
            raw_score,
            message: Some(message.into()),
        }
    }
}

/// Turn a raw (song, offset, score) vote into the outward result shape.
pub fn interpret(
    song: Option<&str>,
    offset: Option<i64>,
    score: u64,
    config: &EngineConfig,
) -> Recognition {
    let confidence = Confidence::from_score(score);

    let (Some(song), Some(offset)) = (song, offset) else {
        return Recognition::no_match("No matching song detected", score);
    };
    if !confidence.is_match() {
        return Recognition::no_match("No matching song detected", score);
    }

    let position = format_position(offset as f64 * config.frame_seconds());
    Recognition {
        matched: true,
        song: Some(song.to_string()),
        position_in_song: Some(position),
        confidence: Some(confidence),
        raw_score: score,
        message: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn confidence_thresholds() {
        assert_eq!(Confidence::from_score(150), Confidence::NoMatch);
        assert_eq!(Confidence::from_score(199), Confidence::NoMatch);
        assert_eq!(Confidence::from_score(200), Confidence::Low);
        assert_eq!(Confidence::from_score(500), Confidence::Low);
        assert_eq!(Confidence::from_score(1000), Confidence::Medium);
        assert_eq!(Confidence::from_score(2000), Confidence::Medium);
        assert_eq!(Confidence::from_score(3000), Confidence::High);
        assert_eq!(Confidence::from_score(5000), Confidence::High);
    }

    #[test]
    fn confidence_labels() {
        assert_eq!(Confidence::NoMatch.to_string(), "No match");
        assert_eq!(Confidence::Low.to_string(), "Low confidence");
        assert_eq!(Confidence::Medium.to_string(), "Medium confidence");
        assert_eq!(Confidence::High.to_string(), "High confidence");
    }

    #[test]
    fn position_formatting() {
        assert_eq!(format_position(124.0), "2:04");
        assert_eq!(format_position(60.0), "1:00");
        assert_eq!(format_position(0.0), "0:00");
        assert_eq!(format_position(185.0), "3:05");
        assert_eq!(format_position(-185.0), "3:05");
    }

    #[test]
    fn strong_match_shape() {
        let config = EngineConfig::default();
        let result = interpret(Some("Test Song"), Some(1000), 3500, &config);

        assert!(result.matched);
        assert_eq!(result.song.as_deref(), Some("Test Song"));
        assert_eq!(result.confidence, Some(Confidence::High));
        assert_eq!(result.raw_score, 3500);
        assert!(result.message.is_none());
        // 1000 frames * 512 / 44100 = 11.6 s
        assert_eq!(result.position_in_song.as_deref(), Some("0:11"));
    }

    #[test]
    fn weak_score_reports_no_match() {
        let config = EngineConfig::default();
        let result = interpret(Some("Test Song"), Some(10), 50, &config);

        assert!(!result.matched);
        assert!(result.song.is_none());
        assert_eq!(result.raw_score, 50);
        assert!(result.message.is_some());
    }

    #[test]
    fn missing_candidate_reports_no_match() {
        let config = EngineConfig::default();
        let result = interpret(None, None, 0, &config);

        assert!(!result.matched);
        assert_eq!(result.raw_score, 0);
    }

    #[test]
    fn negative_offset_discards_the_sign() {
        let config = EngineConfig::default();
        let result = interpret(Some("Test Song"), Some(-1000), 3500, &config);
        assert_eq!(result.position_in_song.as_deref(), Some("0:11"));
    }

    #[test]
    fn serialized_shapes_skip_absent_fields() {
        let config = EngineConfig::default();

        let hit = serde_json::to_value(interpret(Some("x"), Some(0), 5000, &config)).unwrap();
        assert_eq!(hit["confidence"], "High confidence");
        assert!(hit.get("message").is_none());

        let miss = serde_json::to_value(Recognition::no_match("empty input", 0)).unwrap();
        assert_eq!(miss["matched"], false);
        assert_eq!(miss["message"], "empty input");
        assert!(miss.get("song").is_none());
    }
}
