use serde::{Deserialize, Serialize};

// Belt tiers for a (user, topic) progression, lowest to highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Belt {
    White = 0,
    Blue = 1,
    Purple = 2,
    Brown = 3,
    Black = 4,
}

impl Belt {
    pub fn as_str(&self) -> &'static str {
        match self {
            Belt::White => "white",
            Belt::Blue => "blue",
            Belt::Purple => "purple",
            Belt::Brown => "brown",
            Belt::Black => "black",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "white" | "w" => Some(Belt::White),
            "blue" | "bl" => Some(Belt::Blue),
            "purple" | "p" => Some(Belt::Purple),
            "brown" | "br" => Some(Belt::Brown),
            "black" | "b" => Some(Belt::Black),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Belt::White => "White",
            Belt::Blue => "Blue",
            Belt::Purple => "Purple",
            Belt::Brown => "Brown",
            Belt::Black => "Black",
        }
    }

    // Next belt in the ordering; None at black (terminal).
    pub fn next(&self) -> Option<Self> {
        match self {
            Belt::White => Some(Belt::Blue),
            Belt::Blue => Some(Belt::Purple),
            Belt::Purple => Some(Belt::Brown),
            Belt::Brown => Some(Belt::Black),
            Belt::Black => None,
        }
    }
}

// Informational attempt metadata carried on the record; never consulted
// by advancement decisions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdvancementProgress {
    #[serde(default)]
    pub last_quiz_score: Option<f64>,
    #[serde(default)]
    pub last_quiz_date: Option<String>,
    #[serde(default)]
    pub quizzes_completed: i64,
}

// One promotion, as appended to the record's history (oldest first).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BeltHistoryEntry {
    pub belt: Belt,
    pub stripe: i64,
    pub topic_name: String,
    pub promoted_at: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressionRecord {
    pub id: String,
    pub user_id: String,
    pub topic_name: String,
    pub belt: Belt,
    pub stripe: i64,
    pub total_quizzes: i64,
    pub successful_quizzes: i64,
    pub current_accuracy: f64,
    pub council_readiness_score: f64,
    pub advancement_progress: AdvancementProgress,
    pub created_at: String,
    pub belt_history: Vec<BeltHistoryEntry>,
}

impl ProgressionRecord {
    pub fn pass_rate(&self) -> f64 {
        if self.total_quizzes == 0 {
            0.0
        } else {
            (self.successful_quizzes as f64 / self.total_quizzes as f64) * 100.0
        }
    }
}

// Outcome of a recorded quiz attempt.
#[derive(Debug, Clone, Serialize)]
pub struct AttemptResult {
    pub accuracy: f64,
    pub passed: bool,
    pub promoted_to: Option<Promotion>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Promotion {
    pub belt: Belt,
    pub stripe: i64,
}

// Read-only snapshot for status reporting; percentages, not fractions.
#[derive(Debug, Clone, Serialize)]
pub struct StatusReport {
    pub user_id: String,
    pub topic_name: String,
    pub belt: Belt,
    pub stripe: i64,
    pub total_quizzes: i64,
    pub successful_quizzes: i64,
    pub accuracy_pct: f64,
    pub council_readiness_pct: f64,
    pub history: Vec<BeltHistoryEntry>,
}

// JSON output wrapper for CLI
#[derive(Debug, Serialize)]
pub struct JsonOutput<T: Serialize> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> JsonOutput<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(msg: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(msg.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    mod belt_tests {
        use super::*;

        #[test]
        fn as_str_returns_correct_values() {
            assert_eq!(Belt::White.as_str(), "white");
            assert_eq!(Belt::Blue.as_str(), "blue");
            assert_eq!(Belt::Purple.as_str(), "purple");
            assert_eq!(Belt::Brown.as_str(), "brown");
            assert_eq!(Belt::Black.as_str(), "black");
        }

        #[test]
        fn from_str_valid_inputs() {
            assert_eq!(Belt::from_str("white"), Some(Belt::White));
            assert_eq!(Belt::from_str("blue"), Some(Belt::Blue));
            assert_eq!(Belt::from_str("purple"), Some(Belt::Purple));
            assert_eq!(Belt::from_str("brown"), Some(Belt::Brown));
            assert_eq!(Belt::from_str("black"), Some(Belt::Black));
        }

        #[test]
        fn from_str_case_insensitive() {
            assert_eq!(Belt::from_str("WHITE"), Some(Belt::White));
            assert_eq!(Belt::from_str("Black"), Some(Belt::Black));
        }

        #[test]
        fn from_str_short_forms() {
            assert_eq!(Belt::from_str("w"), Some(Belt::White));
            assert_eq!(Belt::from_str("bl"), Some(Belt::Blue));
            assert_eq!(Belt::from_str("b"), Some(Belt::Black));
        }

        #[test]
        fn from_str_invalid_returns_none() {
            assert_eq!(Belt::from_str("green"), None);
            assert_eq!(Belt::from_str(""), None);
        }

        #[test]
        fn roundtrip_through_str() {
            for belt in [Belt::White, Belt::Blue, Belt::Purple, Belt::Brown, Belt::Black] {
                assert_eq!(Belt::from_str(belt.as_str()), Some(belt));
            }
        }

        #[test]
        fn belts_are_totally_ordered() {
            assert!(Belt::White < Belt::Blue);
            assert!(Belt::Blue < Belt::Purple);
            assert!(Belt::Purple < Belt::Brown);
            assert!(Belt::Brown < Belt::Black);
        }

        #[test]
        fn next_walks_the_ordering() {
            assert_eq!(Belt::White.next(), Some(Belt::Blue));
            assert_eq!(Belt::Blue.next(), Some(Belt::Purple));
            assert_eq!(Belt::Purple.next(), Some(Belt::Brown));
            assert_eq!(Belt::Brown.next(), Some(Belt::Black));
        }

        #[test]
        fn black_has_no_next() {
            assert_eq!(Belt::Black.next(), None);
        }

        #[test]
        fn label_returns_human_readable() {
            assert_eq!(Belt::White.label(), "White");
            assert_eq!(Belt::Black.label(), "Black");
        }
    }

    mod record_tests {
        use super::*;

        fn make_record(
            belt: Belt,
            stripe: i64,
            total_quizzes: i64,
            successful_quizzes: i64,
        ) -> ProgressionRecord {
            ProgressionRecord {
                id: "prog_test".to_string(),
                user_id: "user-1".to_string(),
                topic_name: "small-talk".to_string(),
                belt,
                stripe,
                total_quizzes,
                successful_quizzes,
                current_accuracy: 0.0,
                council_readiness_score: 0.0,
                advancement_progress: AdvancementProgress::default(),
                created_at: "2024-01-01T00:00:00Z".to_string(),
                belt_history: vec![],
            }
        }

        #[test]
        fn pass_rate_zero_attempts() {
            let r = make_record(Belt::White, 0, 0, 0);
            assert_eq!(r.pass_rate(), 0.0);
        }

        #[test]
        fn pass_rate_all_passes() {
            let r = make_record(Belt::White, 0, 10, 10);
            assert_eq!(r.pass_rate(), 100.0);
        }

        #[test]
        fn pass_rate_partial() {
            let r = make_record(Belt::White, 0, 4, 3);
            assert_eq!(r.pass_rate(), 75.0);
        }
    }

    mod advancement_progress_tests {
        use super::*;

        #[test]
        fn decodes_from_empty_object() {
            let p: AdvancementProgress = serde_json::from_str("{}").unwrap();
            assert!(p.last_quiz_score.is_none());
            assert!(p.last_quiz_date.is_none());
            assert_eq!(p.quizzes_completed, 0);
        }

        #[test]
        fn decodes_populated_bag() {
            let p: AdvancementProgress = serde_json::from_str(
                r#"{"last_quiz_score": 85.0, "last_quiz_date": "2024-03-01T12:00:00Z", "quizzes_completed": 7}"#,
            )
            .unwrap();
            assert_eq!(p.last_quiz_score, Some(85.0));
            assert_eq!(p.quizzes_completed, 7);
        }
    }

    mod json_output_tests {
        use super::*;

        #[test]
        fn ok_with_string() {
            let output = JsonOutput::ok("test data");
            assert!(output.success);
            assert_eq!(output.data, Some("test data"));
            assert!(output.error.is_none());
        }

        #[test]
        fn err_with_string() {
            let output = JsonOutput::<()>::err("something went wrong");
            assert!(!output.success);
            assert!(output.data.is_none());
            assert_eq!(output.error, Some("something went wrong".to_string()));
        }

        #[test]
        fn serializes_ok_correctly() {
            let output = JsonOutput::ok("test");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":true"));
            assert!(json.contains("\"data\":\"test\""));
            assert!(json.contains("\"error\":null"));
        }

        #[test]
        fn serializes_err_correctly() {
            let output = JsonOutput::<()>::err("error");
            let json = serde_json::to_string(&output).unwrap();
            assert!(json.contains("\"success\":false"));
            assert!(json.contains("\"data\":null"));
            assert!(json.contains("\"error\":\"error\""));
        }
    }

    mod serde_tests {
        use super::*;

        #[test]
        fn belt_serializes_lowercase() {
            assert_eq!(serde_json::to_string(&Belt::Brown).unwrap(), "\"brown\"");
        }

        #[test]
        fn belt_deserializes_lowercase() {
            let belt: Belt = serde_json::from_str("\"purple\"").unwrap();
            assert_eq!(belt, Belt::Purple);
        }
    }
}
