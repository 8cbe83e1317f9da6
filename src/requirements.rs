use serde::Serialize;

use crate::models::Belt;

pub const STRIPES_PER_BELT: i64 = 5;

// Thresholds a record must meet to be promoted INTO a grade. All three
// legs must hold at once; comparisons use >=.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Requirement {
    pub min_quizzes: i64,
    pub min_accuracy: f64,
    pub min_council_readiness: f64,
}

const fn req(min_quizzes: i64, min_accuracy: f64, min_council_readiness: f64) -> Requirement {
    Requirement {
        min_quizzes,
        min_accuracy,
        min_council_readiness,
    }
}

// Indexed [belt][stripe]. Values never decrease along the lattice order;
// (white, 0) is the entry grade and (black, 4) is terminal.
static REQUIREMENT_TABLE: [[Requirement; 5]; 5] = [
    // white
    [
        req(0, 0.0, 0.0),
        req(3, 0.60, 0.20),
        req(4, 0.62, 0.22),
        req(5, 0.64, 0.24),
        req(6, 0.66, 0.26),
    ],
    // blue
    [
        req(8, 0.68, 0.30),
        req(8, 0.70, 0.32),
        req(9, 0.72, 0.34),
        req(10, 0.74, 0.36),
        req(10, 0.75, 0.38),
    ],
    // purple
    [
        req(12, 0.76, 0.42),
        req(12, 0.78, 0.44),
        req(13, 0.79, 0.46),
        req(14, 0.80, 0.48),
        req(14, 0.81, 0.50),
    ],
    // brown
    [
        req(16, 0.82, 0.55),
        req(16, 0.83, 0.58),
        req(17, 0.84, 0.60),
        req(18, 0.85, 0.62),
        req(18, 0.86, 0.65),
    ],
    // black
    [
        req(20, 0.88, 0.70),
        req(20, 0.89, 0.75),
        req(22, 0.90, 0.80),
        req(24, 0.92, 0.85),
        req(25, 0.95, 0.90),
    ],
];

pub fn requirement_for(belt: Belt, stripe: i64) -> Option<Requirement> {
    if !(0..STRIPES_PER_BELT).contains(&stripe) {
        return None;
    }
    Some(REQUIREMENT_TABLE[belt as usize][stripe as usize])
}

// The grade after (belt, stripe): the next stripe, or the next belt's
// stripe 0 past stripe 4. None from (black, 4).
pub fn next_grade(belt: Belt, stripe: i64) -> Option<(Belt, i64)> {
    if stripe < STRIPES_PER_BELT - 1 {
        Some((belt, stripe + 1))
    } else {
        belt.next().map(|b| (b, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ALL_BELTS: [Belt; 5] = [Belt::White, Belt::Blue, Belt::Purple, Belt::Brown, Belt::Black];

    #[test]
    fn entry_grade_has_zero_thresholds() {
        let r = requirement_for(Belt::White, 0).unwrap();
        assert_eq!(r.min_quizzes, 0);
        assert_eq!(r.min_accuracy, 0.0);
        assert_eq!(r.min_council_readiness, 0.0);
    }

    #[test]
    fn white_stripe_one_matches_documented_thresholds() {
        let r = requirement_for(Belt::White, 1).unwrap();
        assert_eq!(r.min_quizzes, 3);
        assert_eq!(r.min_accuracy, 0.60);
        assert_eq!(r.min_council_readiness, 0.20);
    }

    #[test]
    fn every_grade_has_an_entry() {
        for belt in ALL_BELTS {
            for stripe in 0..STRIPES_PER_BELT {
                assert!(
                    requirement_for(belt, stripe).is_some(),
                    "missing entry for {:?} stripe {}",
                    belt,
                    stripe
                );
            }
        }
    }

    #[test]
    fn out_of_range_stripe_has_no_entry() {
        assert!(requirement_for(Belt::White, -1).is_none());
        assert!(requirement_for(Belt::White, 5).is_none());
        assert!(requirement_for(Belt::Black, 99).is_none());
    }

    #[test]
    fn thresholds_never_decrease_along_lattice() {
        let mut prev: Option<Requirement> = None;
        for belt in ALL_BELTS {
            for stripe in 0..STRIPES_PER_BELT {
                let r = requirement_for(belt, stripe).unwrap();
                if let Some(p) = prev {
                    assert!(
                        r.min_quizzes >= p.min_quizzes,
                        "quizzes regressed at {:?} stripe {}",
                        belt,
                        stripe
                    );
                    assert!(
                        r.min_accuracy >= p.min_accuracy,
                        "accuracy regressed at {:?} stripe {}",
                        belt,
                        stripe
                    );
                    assert!(
                        r.min_council_readiness >= p.min_council_readiness,
                        "readiness regressed at {:?} stripe {}",
                        belt,
                        stripe
                    );
                }
                prev = Some(r);
            }
        }
    }

    #[test]
    fn next_grade_advances_stripe_within_belt() {
        assert_eq!(next_grade(Belt::White, 0), Some((Belt::White, 1)));
        assert_eq!(next_grade(Belt::Purple, 2), Some((Belt::Purple, 3)));
    }

    #[test]
    fn next_grade_rolls_over_to_next_belt() {
        assert_eq!(next_grade(Belt::White, 4), Some((Belt::Blue, 0)));
        assert_eq!(next_grade(Belt::Brown, 4), Some((Belt::Black, 0)));
    }

    #[test]
    fn next_grade_terminal_at_black_four() {
        assert_eq!(next_grade(Belt::Black, 4), None);
    }

    #[test]
    fn walking_next_grade_visits_every_grade_once() {
        let mut grade = (Belt::White, 0);
        let mut visited = 1;
        while let Some(next) = next_grade(grade.0, grade.1) {
            grade = next;
            visited += 1;
        }
        assert_eq!(visited, 25);
        assert_eq!(grade, (Belt::Black, 4));
    }
}
