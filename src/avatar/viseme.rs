//! Viseme wire type and time lookup

use serde::{Deserialize, Serialize};

/// A timed set of blend-shape weights approximating a mouth shape.
///
/// `offset` is seconds from the start of the audio segment. The backend
/// currently sends 52 coefficients per viseme, but the count is
/// model-defined and not enforced here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viseme {
    pub offset: f64,
    #[serde(default)]
    pub coefficients: Vec<f32>,
}

/// Find the viseme active at `elapsed_ms` into the segment.
///
/// Picks the viseme whose offset is at or before the elapsed time and whose
/// successor starts after it; if no pair qualifies the last viseme wins.
/// Returns `None` only for an empty slice. Assumes offsets ascend.
pub fn active_viseme_at(visemes: &[Viseme], elapsed_ms: f64) -> Option<&Viseme> {
    for pair in visemes.windows(2) {
        let start_ms = pair[0].offset * 1000.0;
        let end_ms = pair[1].offset * 1000.0;
        if elapsed_ms >= start_ms && elapsed_ms < end_ms {
            return Some(&pair[0]);
        }
    }
    visemes.last()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viseme(offset: f64, weight: f32) -> Viseme {
        Viseme {
            offset,
            coefficients: vec![weight],
        }
    }

    fn sequence() -> Vec<Viseme> {
        vec![viseme(0.0, 0.1), viseme(0.5, 0.2), viseme(1.0, 0.3)]
    }

    #[test]
    fn selects_first_entry_early_in_segment() {
        let visemes = sequence();
        let active = active_viseme_at(&visemes, 200.0).unwrap();
        assert_eq!(active.offset, 0.0);
    }

    #[test]
    fn selects_middle_entry() {
        let visemes = sequence();
        let active = active_viseme_at(&visemes, 700.0).unwrap();
        assert_eq!(active.offset, 0.5);
    }

    #[test]
    fn selects_last_entry_when_no_successor_qualifies() {
        let visemes = sequence();
        let active = active_viseme_at(&visemes, 1400.0).unwrap();
        assert_eq!(active.offset, 1.0);
    }

    #[test]
    fn boundary_belongs_to_the_next_viseme() {
        let visemes = sequence();
        let active = active_viseme_at(&visemes, 500.0).unwrap();
        assert_eq!(active.offset, 0.5);
    }

    #[test]
    fn empty_slice_has_no_active_viseme() {
        assert!(active_viseme_at(&[], 100.0).is_none());
    }

    #[test]
    fn before_first_offset_falls_back_to_last() {
        // No pair brackets t, so the fallback applies even before the
        // first offset.
        let visemes = vec![viseme(0.5, 0.1), viseme(1.0, 0.2)];
        let active = active_viseme_at(&visemes, 100.0).unwrap();
        assert_eq!(active.offset, 1.0);
    }

    #[test]
    fn single_viseme_is_always_active() {
        let visemes = vec![viseme(0.0, 0.4)];
        assert_eq!(active_viseme_at(&visemes, 0.0).unwrap().offset, 0.0);
        assert_eq!(active_viseme_at(&visemes, 9999.0).unwrap().offset, 0.0);
    }
}
