//! Detector output and its validation

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

/// One detected object with its box in normalized image coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Detection {
    pub class_id: u32,
    pub class_name: String,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

/// Why a detector box was rejected
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidDetection {
    #[error("coordinate {name}={value} outside [0, 1]")]
    CoordinateOutOfRange { name: &'static str, value: f32 },

    #[error("inverted horizontal extent: x1={x1} x2={x2}")]
    InvertedX { x1: f32, x2: f32 },

    #[error("inverted vertical extent: y1={y1} y2={y2}")]
    InvertedY { y1: f32, y2: f32 },

    #[error("confidence {0} outside [0, 1]")]
    Confidence(f32),
}

fn unit_range(name: &'static str, value: f32) -> Result<(), InvalidDetection> {
    // NaN fails `contains`
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(InvalidDetection::CoordinateOutOfRange { name, value })
    }
}

impl Detection {
    /// Check coordinates and confidence
    pub fn validate(&self) -> Result<(), InvalidDetection> {
        unit_range("x1", self.x1)?;
        unit_range("y1", self.y1)?;
        unit_range("x2", self.x2)?;
        unit_range("y2", self.y2)?;
        if self.x1 >= self.x2 {
            return Err(InvalidDetection::InvertedX { x1: self.x1, x2: self.x2 });
        }
        if self.y1 >= self.y2 {
            return Err(InvalidDetection::InvertedY { y1: self.y1, y2: self.y2 });
        }
        if !(0.0..=1.0).contains(&self.confidence) {
            return Err(InvalidDetection::Confidence(self.confidence));
        }
        Ok(())
    }
}

/// Validated detections for one analyzed frame, in detector order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DetectionSet {
    detections: Vec<Detection>,
    dropped: usize,
}

impl DetectionSet {
    /// Keep the well-formed boxes and drop the rest.
    ///
    /// A malformed box never poisons the others from the same frame.
    pub fn from_raw<I>(raw: I) -> Self
    where
        I: IntoIterator<Item = Detection>,
    {
        let mut detections = Vec::new();
        let mut dropped = 0;
        for detection in raw {
            match detection.validate() {
                Ok(()) => detections.push(detection),
                Err(e) => {
                    warn!("Dropping detection '{}': {}", detection.class_name, e);
                    dropped += 1;
                }
            }
        }
        Self { detections, dropped }
    }

    pub fn len(&self) -> usize {
        self.detections.len()
    }

    pub fn is_empty(&self) -> bool {
        self.detections.is_empty()
    }

    /// Number of boxes rejected during validation
    pub fn dropped(&self) -> usize {
        self.dropped
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Detection> {
        self.detections.iter()
    }

    pub fn as_slice(&self) -> &[Detection] {
        &self.detections
    }

    /// Class names in detector order, duplicates included
    pub fn class_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.detections.iter().map(|d| d.class_name.as_str())
    }
}

impl<'a> IntoIterator for &'a DetectionSet {
    type Item = &'a Detection;
    type IntoIter = std::slice::Iter<'a, Detection>;

    fn into_iter(self) -> Self::IntoIter {
        self.detections.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detection(name: &str, x1: f32, y1: f32, x2: f32, y2: f32) -> Detection {
        Detection {
            class_id: 0,
            class_name: name.to_string(),
            confidence: 0.9,
            x1,
            y1,
            x2,
            y2,
        }
    }

    #[test]
    fn test_valid_box_passes() {
        assert!(detection("ok", 0.0, 0.0, 1.0, 1.0).validate().is_ok());
    }

    #[test]
    fn test_out_of_range_coordinate() {
        let err = detection("bad", -0.1, 0.0, 0.5, 0.5).validate().unwrap_err();
        assert_eq!(err, InvalidDetection::CoordinateOutOfRange { name: "x1", value: -0.1 });
    }

    #[test]
    fn test_inverted_and_degenerate_boxes() {
        assert!(matches!(
            detection("bad", 0.6, 0.0, 0.4, 0.5).validate(),
            Err(InvalidDetection::InvertedX { .. })
        ));
        assert!(matches!(
            detection("flat", 0.1, 0.5, 0.4, 0.5).validate(),
            Err(InvalidDetection::InvertedY { .. })
        ));
    }

    #[test]
    fn test_nan_is_rejected() {
        assert!(detection("nan", f32::NAN, 0.0, 0.5, 0.5).validate().is_err());
        let mut d = detection("nan", 0.1, 0.1, 0.5, 0.5);
        d.confidence = f32::NAN;
        assert!(matches!(d.validate(), Err(InvalidDetection::Confidence(_))));
    }

    #[test]
    fn test_from_raw_isolates_malformed_boxes() {
        let set = DetectionSet::from_raw(vec![
            detection("first", 0.1, 0.1, 0.2, 0.2),
            detection("broken", 0.5, 0.5, 0.4, 0.6),
            detection("second", 0.3, 0.3, 0.9, 0.9),
        ]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.dropped(), 1);
        assert_eq!(set.class_names().collect::<Vec<_>>(), vec!["first", "second"]);
    }

    #[test]
    fn test_detection_deserializes_from_json() {
        let d: Detection = serde_json::from_str(
            r#"{"class_id":1,"class_name":"Red light for car","confidence":0.87,"x1":0.1,"y1":0.2,"x2":0.3,"y2":0.4}"#,
        )
        .unwrap();
        assert_eq!(d.class_id, 1);
        assert!(d.validate().is_ok());
    }
}
