use serde::Serialize;

/// One cell fill recorded while building the distance matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Step {
    Init {
        i: usize,
        j: usize,
        value: u32,
    },
    Calculation {
        i: usize,
        j: usize,
        value: u32,
        cost: u32,
        deletion: u32,
        insertion: u32,
        substitution: u32,
        char1: String,
        char2: String,
    },
}

impl Step {
    /// The `(row, column)` this step writes.
    pub fn cell(&self) -> (usize, usize) {
        match *self {
            Step::Init { i, j, .. } | Step::Calculation { i, j, .. } => (i, j),
        }
    }

    pub fn value(&self) -> u32 {
        match *self {
            Step::Init { value, .. } | Step::Calculation { value, .. } => value,
        }
    }

    pub fn is_calculation(&self) -> bool {
        matches!(self, Step::Calculation { .. })
    }

    /// True when `(i, j)` is one of the three cells a calculation step reads.
    /// Init steps read nothing.
    pub fn reads(&self, i: usize, j: usize) -> bool {
        let Step::Calculation { i: ci, j: cj, .. } = *self else {
            return false;
        };
        let up = ci.checked_sub(1) == Some(i);
        let left = cj.checked_sub(1) == Some(j);
        (up && j == cj) || (i == ci && left) || (up && left)
    }

    pub fn description(&self) -> String {
        match self {
            Step::Init { i, j, value } => format!("Initialize dp[{}][{}] = {}", i, j, value),
            Step::Calculation {
                i,
                j,
                value,
                deletion,
                insertion,
                substitution,
                ..
            } => format!(
                "dp[{}][{}] = min({}, {}, {}) = {}",
                i, j, deletion, insertion, substitution, value
            ),
        }
    }

    /// Extra lines shown under the description. Empty for init steps.
    pub fn details(&self) -> Vec<String> {
        match self {
            Step::Init { .. } => Vec::new(),
            Step::Calculation {
                cost,
                deletion,
                insertion,
                substitution,
                char1,
                char2,
                ..
            } => vec![
                format!("Characters: '{}' vs '{}'", char1, char2),
                format!("Cost: {}", cost),
                format!("Deletion: {}", deletion),
                format!("Insertion: {}", insertion),
                format!("Substitution: {}", substitution),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn calc() -> Step {
        Step::Calculation {
            i: 2,
            j: 3,
            value: 1,
            cost: 1,
            deletion: 3,
            insertion: 2,
            substitution: 1,
            char1: "a".into(),
            char2: "b".into(),
        }
    }

    #[test]
    fn init_description() {
        let step = Step::Init { i: 4, j: 0, value: 4 };
        assert_eq!(step.description(), "Initialize dp[4][0] = 4");
        assert!(step.details().is_empty());
        assert!(!step.reads(3, 0));
    }

    #[test]
    fn calculation_description_and_details() {
        let step = calc();
        assert_eq!(step.description(), "dp[2][3] = min(3, 2, 1) = 1");
        assert_eq!(
            step.details(),
            vec![
                "Characters: 'a' vs 'b'",
                "Cost: 1",
                "Deletion: 3",
                "Insertion: 2",
                "Substitution: 1",
            ]
        );
    }

    #[test]
    fn calculation_reads_three_neighbours() {
        let step = calc();
        assert!(step.reads(1, 3));
        assert!(step.reads(2, 2));
        assert!(step.reads(1, 2));
        assert!(!step.reads(2, 3));
        assert!(!step.reads(3, 3));
        assert!(!step.reads(0, 0));
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(Step::Init { i: 0, j: 1, value: 1 }).unwrap();
        assert_eq!(json, serde_json::json!({"type": "init", "i": 0, "j": 1, "value": 1}));

        let json = serde_json::to_value(calc()).unwrap();
        assert_eq!(json["type"], "calculation");
        assert_eq!(json["char1"], "a");
        assert_eq!(json["substitution"], 1);
    }

    #[test]
    fn reads_on_the_boundary_does_not_underflow() {
        let at = |i, j| Step::Calculation {
            i,
            j,
            value: 2,
            cost: 1,
            deletion: 3,
            insertion: 2,
            substitution: 2,
            char1: String::new(),
            char2: "b".into(),
        };
        let edge = at(0, 2);
        assert!(edge.reads(0, 1));
        assert!(!edge.reads(0, 2));
        assert!(!edge.reads(0, 0));

        let corner = at(0, 0);
        assert!(!corner.reads(0, 0));
        assert!(!corner.reads(usize::MAX, usize::MAX));
    }
}
