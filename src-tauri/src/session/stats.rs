//! Derived statistics over a record's detections.
//!
//! These are pure functions of the detection list, recomputed on every
//! read. Nothing here is cached, so the numbers can never drift from the
//! detections they describe.

use super::types::{Detection, SlideStats};

/// Round to one decimal place.
fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

/// Compute the summary statistics for a detection list.
///
/// An empty list is the healthy baseline: confidence 0, affected 0,
/// normal 100.
pub fn derive_stats(detections: &[Detection]) -> SlideStats {
    let count = detections.len();
    if count == 0 {
        return SlideStats {
            detection_count: 0,
            avg_confidence: 0.0,
            affected_pct: 0.0,
            normal_pct: 100.0,
        };
    }

    let sum: f64 = detections.iter().map(|d| d.confidence).sum();
    let avg = round1(sum / count as f64);

    SlideStats {
        detection_count: count,
        avg_confidence: avg,
        affected_pct: avg,
        normal_pct: round1(100.0 - avg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn det(confidence: f64) -> Detection {
        Detection {
            label: "pni".to_string(),
            confidence,
            polygon: vec![[10.0, 10.0], [20.0, 10.0], [20.0, 20.0]],
        }
    }

    #[test]
    fn test_empty_detections_are_healthy_baseline() {
        let stats = derive_stats(&[]);
        assert_eq!(stats.detection_count, 0);
        assert_eq!(stats.avg_confidence, 0.0);
        assert_eq!(stats.affected_pct, 0.0);
        assert_eq!(stats.normal_pct, 100.0);
    }

    #[test]
    fn test_single_detection() {
        let stats = derive_stats(&[det(80.0)]);
        assert_eq!(stats.detection_count, 1);
        assert_eq!(stats.avg_confidence, 80.0);
        assert_eq!(stats.affected_pct, 80.0);
        assert_eq!(stats.normal_pct, 20.0);
    }

    #[test]
    fn test_average_rounds_to_one_decimal() {
        let stats = derive_stats(&[det(70.0), det(75.5)]);
        assert_eq!(stats.avg_confidence, 72.8);
        assert_eq!(stats.affected_pct, 72.8);
        assert_eq!(stats.normal_pct, 27.2);
    }

    #[test]
    fn test_affected_and_normal_always_complement() {
        let stats = derive_stats(&[det(33.3), det(66.6), det(99.9)]);
        assert_eq!(round1(stats.affected_pct + stats.normal_pct), 100.0);
    }
}
