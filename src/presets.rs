use serde::Serialize;

use crate::error::{Result, VisualizerError};

/// A labelled pair of strings offered to pre-fill the inputs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PresetPair {
    pub label: &'static str,
    pub source: &'static str,
    pub target: &'static str,
}

pub const PRESET_PAIRS: [PresetPair; 4] = [
    PresetPair {
        label: "Pair 1: Levenshtein & Lavenstaein",
        source: "Levenshtein",
        target: "Lavenstaein",
    },
    PresetPair {
        label: "Pair 2: TryHackMe & TriHackingMe",
        source: "TryHackMe",
        target: "TriHackingMe",
    },
    PresetPair {
        label: "Pair 3: Optimization & Progressive",
        source: "Optimization",
        target: "Progressive",
    },
    PresetPair {
        label: "Pair 4: This is easy & This is easy",
        source: "This is easy",
        target: "This is easy",
    },
];

pub fn preset(index: usize) -> Result<&'static PresetPair> {
    PRESET_PAIRS
        .get(index)
        .ok_or(VisualizerError::UnknownPreset(index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levenshtein::compute;

    #[test]
    fn lookup_by_index() {
        assert_eq!(preset(1).unwrap().source, "TryHackMe");
        assert!(matches!(preset(4), Err(VisualizerError::UnknownPreset(4))));
    }

    #[test]
    fn preset_distances() {
        let distances: Vec<u32> = PRESET_PAIRS
            .iter()
            .map(|p| compute(p.source, p.target).unwrap().distance())
            .collect();
        assert_eq!(distances, vec![3, 4, 11, 0]);
    }
}
