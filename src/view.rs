//! Render-ready snapshots for the presentation layer.
//!
//! Views are rebuilt on every call so highlight classes always match the
//! current cursor.

use serde::Serialize;

use crate::levenshtein::Computation;
use crate::playback::{Highlight, PlaybackController, PlaybackState, TickScheduler};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CellView {
    pub value: u32,
    pub highlight: Highlight,
    pub class: &'static str,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowView {
    /// Source unit for rows 1..=m, `None` for row 0.
    pub label: Option<String>,
    pub index: usize,
    pub cells: Vec<CellView>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MatrixView {
    /// Target units, one per column 1..=n.
    pub column_labels: Vec<String>,
    pub rows: Vec<RowView>,
    pub distance: u32,
}

impl MatrixView {
    pub fn build<S: TickScheduler>(
        computation: &Computation,
        playback: &PlaybackController<S>,
    ) -> Self {
        let rows = computation
            .matrix()
            .iter_rows()
            .enumerate()
            .map(|(i, values)| RowView {
                label: i.checked_sub(1).map(|k| computation.source_units()[k].clone()),
                index: i,
                cells: values
                    .iter()
                    .enumerate()
                    .map(|(j, &value)| {
                        let highlight = playback.highlight(i, j);
                        CellView {
                            value,
                            highlight,
                            class: highlight.css_class(),
                        }
                    })
                    .collect(),
            })
            .collect();

        MatrixView {
            column_labels: computation.target_units().to_vec(),
            rows,
            distance: computation.distance(),
        }
    }
}

/// Where the animation stands, phrased for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlaybackStatus {
    pub cursor: usize,
    pub total: usize,
    pub state: PlaybackState,
    pub label: String,
    pub description: Option<String>,
    pub details: Vec<String>,
}

impl PlaybackStatus {
    pub fn of<S: TickScheduler>(playback: &PlaybackController<S>) -> Self {
        let step = playback.current_step();
        PlaybackStatus {
            cursor: playback.cursor(),
            total: playback.len(),
            state: playback.state(),
            label: format!("Step {} of {}", playback.cursor() + 1, playback.len()),
            description: step.map(|s| s.description()),
            details: step.map(|s| s.details()).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::levenshtein::compute;
    use crate::playback::ManualScheduler;
    use std::time::Duration;

    fn setup(s1: &str, s2: &str) -> (Computation, PlaybackController<ManualScheduler>) {
        let computation = compute(s1, s2).unwrap();
        let mut playback = PlaybackController::new(ManualScheduler::new(), Duration::from_secs(1));
        playback.install(computation.steps().clone());
        (computation, playback)
    }

    #[test]
    fn matrix_view_has_headers_and_values() {
        let (computation, playback) = setup("ab", "a");
        let view = MatrixView::build(&computation, &playback);
        assert_eq!(view.column_labels, vec!["a"]);
        assert_eq!(view.rows.len(), 3);
        assert_eq!(view.rows[0].label, None);
        assert_eq!(view.rows[2].label.as_deref(), Some("b"));
        assert_eq!(view.rows[2].index, 2);
        let values: Vec<Vec<u32>> = view
            .rows
            .iter()
            .map(|r| r.cells.iter().map(|c| c.value).collect())
            .collect();
        assert_eq!(values, vec![vec![0, 1], vec![1, 0], vec![2, 1]]);
        assert_eq!(view.distance, 1);
    }

    #[test]
    fn matrix_view_follows_cursor() {
        let (computation, mut playback) = setup("ab", "a");
        let view = MatrixView::build(&computation, &playback);
        assert_eq!(view.rows[0].cells[0].class, "current-cell");

        playback.start();
        for _ in 0..5 {
            let token = playback.scheduler().active().unwrap();
            playback.tick(token);
        }
        // step 5 is (1, 1)
        let view = MatrixView::build(&computation, &playback);
        assert_eq!(view.rows[1].cells[1].highlight, Highlight::Current);
        assert_eq!(view.rows[0].cells[0].highlight, Highlight::Related);
        assert_eq!(view.rows[0].cells[1].class, "related-cell");
        assert_eq!(view.rows[1].cells[0].class, "related-cell");
        assert_eq!(view.rows[2].cells[1].class, "");
    }

    #[test]
    fn status_for_calculation_step() {
        let (_, mut playback) = setup("a", "b");
        playback.start();
        for _ in 0..4 {
            let token = playback.scheduler().active().unwrap();
            playback.tick(token);
        }
        let status = PlaybackStatus::of(&playback);
        assert_eq!(status.label, "Step 5 of 5");
        assert_eq!(status.state, PlaybackState::Finished);
        assert_eq!(status.description.as_deref(), Some("dp[1][1] = min(2, 2, 1) = 1"));
        assert_eq!(status.details[0], "Characters: 'a' vs 'b'");
    }

    #[test]
    fn status_serializes_state_in_snake_case() {
        let (_, playback) = setup("", "");
        let json = serde_json::to_value(PlaybackStatus::of(&playback)).unwrap();
        assert_eq!(json["state"], "idle");
        assert_eq!(json["label"], "Step 1 of 2");
        assert_eq!(json["description"], "Initialize dp[0][0] = 0");
        assert_eq!(json["details"], serde_json::json!([]));
    }
}
