// src/levenshtein.rs
use std::sync::Arc;

use log::debug;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

use crate::error::{InputSide, Result, VisualizerError};
use crate::step::Step;

/// Per-side unit limit applied unless the caller configures another one.
/// The trace grows with m * n, so this keeps a browser tab responsive.
pub const DEFAULT_MAX_INPUT_UNITS: usize = 256;

/// Distance only, in two rolling rows over the shorter input. Memory stays
/// linear, so this has no input limit and records no trace.
pub fn levenshtein_distance<T: PartialEq>(s1: &[T], s2: &[T]) -> usize {
    let (short, long) = if s1.len() <= s2.len() { (s1, s2) } else { (s2, s1) };
    let mut previous: Vec<usize> = (0..=short.len()).collect();
    let mut current = vec![0; short.len() + 1];

    for (j, b) in long.iter().enumerate() {
        current[0] = j + 1;
        for (i, a) in short.iter().enumerate() {
            let substitution = previous[i] + usize::from(a != b);
            current[i + 1] = (previous[i + 1] + 1).min(current[i] + 1).min(substitution);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[short.len()]
}

/// [`levenshtein_distance`] over the units `granularity` splits out. Used
/// for inputs too large to trace.
pub fn unit_distance(s1: &str, s2: &str, granularity: Granularity) -> usize {
    levenshtein_distance(&granularity.split(s1), &granularity.split(s2))
}

/// What counts as one editable unit of a string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Granularity {
    /// Unicode scalar values.
    #[default]
    Char,
    /// Extended grapheme clusters, so `e` + combining accent is one unit.
    Grapheme,
}

impl Granularity {
    pub fn split(self, s: &str) -> Vec<&str> {
        match self {
            Granularity::Char => s
                .char_indices()
                .map(|(idx, c)| &s[idx..idx + c.len_utf8()])
                .collect(),
            Granularity::Grapheme => s.graphemes(true).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    pub granularity: Granularity,
    /// `None` disables the guard.
    pub max_input_units: Option<usize>,
}

impl Default for EngineOptions {
    fn default() -> Self {
        EngineOptions {
            granularity: Granularity::default(),
            max_input_units: Some(DEFAULT_MAX_INPUT_UNITS),
        }
    }
}

impl EngineOptions {
    fn check_len(&self, side: InputSide, len: usize) -> Result<()> {
        // cell values are u32, whatever the configured limit says
        let limit = self
            .max_input_units
            .unwrap_or(usize::MAX)
            .min(u32::MAX as usize - 1);
        if len > limit {
            return Err(VisualizerError::InputTooLarge { side, len, limit });
        }
        Ok(())
    }
}

/// The `(m + 1) x (n + 1)` table of prefix distances, stored row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistanceMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<u32>,
}

impl DistanceMatrix {
    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Panics when `(i, j)` lies outside the matrix, like slice indexing.
    pub fn get(&self, i: usize, j: usize) -> u32 {
        assert!(j < self.cols, "column {} out of range for {} columns", j, self.cols);
        self.cells[i * self.cols + j]
    }

    pub fn row(&self, i: usize) -> &[u32] {
        &self.cells[i * self.cols..(i + 1) * self.cols]
    }

    pub fn iter_rows(&self) -> impl Iterator<Item = &[u32]> {
        self.cells.chunks(self.cols)
    }

    /// The bottom-right cell.
    pub fn distance(&self) -> u32 {
        self.cells[self.cells.len() - 1]
    }
}

impl Serialize for DistanceMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter_rows())
    }
}

/// A finished matrix plus the ordered trace of how it was filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Computation {
    source_units: Vec<String>,
    target_units: Vec<String>,
    distance: u32,
    matrix: DistanceMatrix,
    steps: Arc<[Step]>,
}

impl Computation {
    /// The result for two empty strings.
    pub fn empty() -> Self {
        fill(&[], &[], 2)
    }

    pub fn source_units(&self) -> &[String] {
        &self.source_units
    }

    pub fn target_units(&self) -> &[String] {
        &self.target_units
    }

    pub fn matrix(&self) -> &DistanceMatrix {
        &self.matrix
    }

    pub fn steps(&self) -> &Arc<[Step]> {
        &self.steps
    }

    pub fn distance(&self) -> u32 {
        self.distance
    }
}

/// Number of trace steps for inputs of `m` and `n` units.
pub fn step_count(m: usize, n: usize) -> Option<usize> {
    m.checked_mul(n)?.checked_add(m + 1)?.checked_add(n + 1)
}

pub fn compute(s1: &str, s2: &str) -> Result<Computation> {
    compute_with(s1, s2, &EngineOptions::default())
}

/// Fills the full matrix bottom-up and records every cell write.
///
/// Boundary steps come first (column 0 top to bottom, then row 0 left to
/// right, so `(0, 0)` appears twice), followed by the interior in row-major
/// order.
pub fn compute_with(s1: &str, s2: &str, options: &EngineOptions) -> Result<Computation> {
    let source = options.granularity.split(s1);
    let target = options.granularity.split(s2);
    options.check_len(InputSide::Source, source.len())?;
    options.check_len(InputSide::Target, target.len())?;

    let m = source.len();
    let n = target.len();
    let rows = m + 1;
    let cols = n + 1;
    let too_large = || VisualizerError::InputTooLarge {
        side: InputSide::Source,
        len: m,
        limit: usize::MAX / cols,
    };
    rows.checked_mul(cols).ok_or_else(too_large)?;
    let total_steps = step_count(m, n).ok_or_else(too_large)?;

    let computation = fill(&source, &target, total_steps);
    debug!(
        "computed {}x{} matrix ({:?}), distance {}, {} steps",
        rows,
        cols,
        options.granularity,
        computation.distance,
        computation.steps.len()
    );
    Ok(computation)
}

// Sizes are checked by the caller.
fn fill(source: &[&str], target: &[&str], total_steps: usize) -> Computation {
    let m = source.len();
    let n = target.len();
    let cols = n + 1;

    let mut cells = vec![0u32; (m + 1) * cols];
    let mut steps = Vec::with_capacity(total_steps);

    for i in 0..=m {
        cells[i * cols] = i as u32;
        steps.push(Step::Init { i, j: 0, value: i as u32 });
    }
    for j in 0..=n {
        cells[j] = j as u32;
        steps.push(Step::Init { i: 0, j, value: j as u32 });
    }

    for i in 1..=m {
        for j in 1..=n {
            let cost = u32::from(source[i - 1] != target[j - 1]);
            let deletion = cells[(i - 1) * cols + j] + 1;
            let insertion = cells[i * cols + j - 1] + 1;
            let substitution = cells[(i - 1) * cols + j - 1] + cost;
            let value = deletion.min(insertion).min(substitution);
            cells[i * cols + j] = value;

            steps.push(Step::Calculation {
                i,
                j,
                value,
                cost,
                deletion,
                insertion,
                substitution,
                char1: source[i - 1].to_string(),
                char2: target[j - 1].to_string(),
            });
        }
    }

    let matrix = DistanceMatrix {
        rows: m + 1,
        cols,
        cells,
    };
    Computation {
        source_units: source.iter().map(|u| u.to_string()).collect(),
        target_units: target.iter().map(|u| u.to_string()).collect(),
        distance: matrix.distance(),
        matrix,
        steps: steps.into(),
    }
}
