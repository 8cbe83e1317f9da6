mod db;
mod error;
mod ids;
mod models;
mod requirements;
mod tui;

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use db::Database;
use models::JsonOutput;
use requirements::{next_grade, requirement_for};

const DEFAULT_DB_NAME: &str = "dojo.db";

#[derive(Parser)]
#[command(name = "dojo")]
#[command(about = "A belt progression CLI tracking quiz mastery across dialogue training topics")]
#[command(version)]
struct Cli {
    /// Output as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize the database
    Init,

    /// Enroll a user in a topic at white belt, stripe 0 (idempotent)
    Enroll {
        /// User identifier
        user: String,

        /// Topic name
        topic: String,
    },

    /// Record a scored quiz attempt and evaluate advancement
    Quiz {
        /// User identifier
        user: String,

        /// Topic name
        topic: String,

        /// Quiz score, 0-100
        #[arg(long, short)]
        score: f64,
    },

    /// Set the externally assessed council readiness score
    Readiness {
        /// User identifier
        user: String,

        /// Topic name
        topic: String,

        /// Readiness score, 0-1
        #[arg(long, short)]
        score: f64,
    },

    /// Show a progression snapshot
    Status {
        /// User identifier
        user: String,

        /// Topic name
        topic: String,
    },

    /// Show the promotion history for a progression
    History {
        /// User identifier
        user: String,

        /// Topic name
        topic: String,
    },

    /// List progressions
    List {
        /// Filter by user
        #[arg(long, short)]
        user: Option<String>,
    },

    /// Show aggregate progression statistics
    Stats,

    /// Launch interactive terminal UI
    Tui,
}

fn get_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("DOJO_DB") {
        return PathBuf::from(path);
    }

    let config_dir = dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("dojo");

    std::fs::create_dir_all(&config_dir).ok();
    config_dir.join(DEFAULT_DB_NAME)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let db_path = get_db_path();
    let db = Database::open(&db_path)?;

    match cli.command {
        Commands::Init => {
            db.init()?;
            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
            } else {
                println!("Database initialized at: {}", db_path.display());
            }
        }

        Commands::Enroll { user, topic } => {
            let id = db.enroll(&user, &topic)?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "id": id,
                        "user": user,
                        "topic": topic
                    })))?
                );
            } else {
                println!("Enrolled {} in '{}' ({})", user, topic, id);
            }
        }

        Commands::Quiz { user, topic, score } => {
            let result = db.record_quiz_attempt(&user, &topic, score)?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&result))?);
            } else {
                println!(
                    "Recorded {:.1} for {} / {} ({})",
                    score,
                    user,
                    topic,
                    if result.passed { "pass" } else { "fail" }
                );

                if let Some(promotion) = &result.promoted_to {
                    println!(
                        "Promoted to {} belt, stripe {}!",
                        promotion.belt.label(),
                        promotion.stripe
                    );
                } else if let Some(status) = db.get_status(&user, &topic)? {
                    if let Some((belt, stripe)) = next_grade(status.belt, status.stripe) {
                        if let Some(req) = requirement_for(belt, stripe) {
                            println!(
                                "Next grade {} belt, stripe {}: {} quizzes at {:.0}% accuracy, {:.0}% readiness",
                                belt.label(),
                                stripe,
                                req.min_quizzes,
                                req.min_accuracy * 100.0,
                                req.min_council_readiness * 100.0
                            );
                        }
                    }
                }
            }
        }

        Commands::Readiness { user, topic, score } => {
            let found = db.set_council_readiness(&user, &topic, score)?;

            if cli.json {
                if found {
                    println!("{}", serde_json::to_string(&JsonOutput::<()>::ok(()))?);
                } else {
                    println!(
                        "{}",
                        serde_json::to_string(&JsonOutput::<()>::err("Progression not found"))?
                    );
                }
            } else if found {
                println!("Council readiness for {} / {} set to {:.2}", user, topic, score);
            } else {
                println!("Progression not found.");
            }
        }

        Commands::Status { user, topic } => {
            if let Some(status) = db.get_status(&user, &topic)? {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&status))?);
                } else {
                    println!("Progression: {} / {}", status.user_id, status.topic_name);
                    println!("Grade: {} belt, stripe {}", status.belt.label(), status.stripe);
                    println!(
                        "Quizzes this grade: {} ({} passed)",
                        status.total_quizzes, status.successful_quizzes
                    );
                    println!("Accuracy: {:.1}%", status.accuracy_pct);
                    println!("Council readiness: {:.1}%", status.council_readiness_pct);
                    println!("Promotions: {}", status.history.len());

                    match next_grade(status.belt, status.stripe) {
                        Some((belt, stripe)) => {
                            if let Some(req) = requirement_for(belt, stripe) {
                                println!();
                                println!(
                                    "Next grade {} belt, stripe {} requires: {} quizzes, {:.0}% accuracy, {:.0}% readiness",
                                    belt.label(),
                                    stripe,
                                    req.min_quizzes,
                                    req.min_accuracy * 100.0,
                                    req.min_council_readiness * 100.0
                                );
                            }
                        }
                        None => {
                            println!();
                            println!("Terminal grade reached.");
                        }
                    }
                }
            } else if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::<()>::err("Progression not found"))?
                );
            } else {
                println!("Progression not found.");
            }
        }

        Commands::History { user, topic } => {
            if let Some(history) = db.get_belt_history(&user, &topic)? {
                if cli.json {
                    println!("{}", serde_json::to_string(&JsonOutput::ok(&history))?);
                } else if history.is_empty() {
                    println!("No promotions yet.");
                } else {
                    println!("{:<4} {:<20} {}", "#", "GRADE", "DATE");
                    println!("{}", "-".repeat(50));
                    for (i, entry) in history.iter().enumerate() {
                        println!(
                            "{:<4} {:<20} {}",
                            i + 1,
                            format!("{} / {}", entry.belt.label(), entry.stripe),
                            entry.promoted_at
                        );
                    }
                }
            } else if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::<()>::err("Progression not found"))?
                );
            } else {
                println!("Progression not found.");
            }
        }

        Commands::List { user } => {
            let records = db.list_progressions(user.as_deref())?;

            if cli.json {
                println!("{}", serde_json::to_string(&JsonOutput::ok(&records))?);
            } else if records.is_empty() {
                println!("No progressions found.");
            } else {
                println!(
                    "{:<18} {:<26} {:<12} {:>8} {:>7}",
                    "USER", "TOPIC", "GRADE", "QUIZZES", "ACC%"
                );
                println!("{}", "-".repeat(75));
                for record in records {
                    println!(
                        "{:<18} {:<26} {:<12} {:>8} {:>6.0}%",
                        truncate(&record.user_id, 16),
                        truncate(&record.topic_name, 24),
                        format!("{}/{}", record.belt.as_str(), record.stripe),
                        record.total_quizzes,
                        record.current_accuracy * 100.0
                    );
                }
            }
        }

        Commands::Stats => {
            let stats = db.get_stats()?;
            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string(&JsonOutput::ok(serde_json::json!({
                        "total_progressions": stats.total_progressions,
                        "total_promotions": stats.total_promotions,
                        "black_belts": stats.black_belts,
                        "avg_accuracy": stats.avg_accuracy,
                        "avg_readiness": stats.avg_readiness
                    })))?
                );
            } else {
                println!("=== Progression Statistics ===");
                println!("Progressions: {}", stats.total_progressions);
                println!("Promotions: {}", stats.total_promotions);
                println!("Black belts: {}", stats.black_belts);
                println!("Average accuracy: {:.1}%", stats.avg_accuracy * 100.0);
                println!("Average readiness: {:.1}%", stats.avg_readiness * 100.0);
            }
        }

        Commands::Tui => {
            tui::run(db)?;
        }
    }

    Ok(())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        s.to_string()
    } else {
        format!("{}...", &s[..max_len - 3])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    mod truncate_tests {
        use super::*;

        #[test]
        fn truncate_short_string() {
            assert_eq!(truncate("hello", 10), "hello");
        }

        #[test]
        fn truncate_exact_length() {
            assert_eq!(truncate("hello", 5), "hello");
        }

        #[test]
        fn truncate_long_string() {
            assert_eq!(truncate("hello world", 8), "hello...");
        }

        #[test]
        fn truncate_empty_string() {
            assert_eq!(truncate("", 10), "");
        }
    }

    mod cli_parsing_tests {
        use super::*;

        #[test]
        fn parse_init_command() {
            let cli = Cli::try_parse_from(["dojo", "init"]).unwrap();
            assert!(!cli.json);
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_init_with_json() {
            let cli = Cli::try_parse_from(["dojo", "--json", "init"]).unwrap();
            assert!(cli.json);
            assert!(matches!(cli.command, Commands::Init));
        }

        #[test]
        fn parse_enroll() {
            let cli = Cli::try_parse_from(["dojo", "enroll", "alice", "small-talk"]).unwrap();
            match cli.command {
                Commands::Enroll { user, topic } => {
                    assert_eq!(user, "alice");
                    assert_eq!(topic, "small-talk");
                }
                _ => panic!("Expected Enroll command"),
            }
        }

        #[test]
        fn parse_quiz_with_score() {
            let cli = Cli::try_parse_from([
                "dojo",
                "quiz",
                "alice",
                "small-talk",
                "--score",
                "85",
            ])
            .unwrap();
            match cli.command {
                Commands::Quiz { user, topic, score } => {
                    assert_eq!(user, "alice");
                    assert_eq!(topic, "small-talk");
                    assert_eq!(score, 85.0);
                }
                _ => panic!("Expected Quiz command"),
            }
        }

        #[test]
        fn parse_quiz_score_short_flag() {
            let cli =
                Cli::try_parse_from(["dojo", "quiz", "alice", "small-talk", "-s", "72.5"]).unwrap();
            match cli.command {
                Commands::Quiz { score, .. } => assert_eq!(score, 72.5),
                _ => panic!("Expected Quiz command"),
            }
        }

        #[test]
        fn parse_quiz_requires_score() {
            assert!(Cli::try_parse_from(["dojo", "quiz", "alice", "small-talk"]).is_err());
        }

        #[test]
        fn parse_readiness() {
            let cli = Cli::try_parse_from([
                "dojo",
                "readiness",
                "alice",
                "small-talk",
                "--score",
                "0.4",
            ])
            .unwrap();
            match cli.command {
                Commands::Readiness { user, topic, score } => {
                    assert_eq!(user, "alice");
                    assert_eq!(topic, "small-talk");
                    assert_eq!(score, 0.4);
                }
                _ => panic!("Expected Readiness command"),
            }
        }

        #[test]
        fn parse_status() {
            let cli = Cli::try_parse_from(["dojo", "status", "alice", "small-talk"]).unwrap();
            assert!(matches!(cli.command, Commands::Status { .. }));
        }

        #[test]
        fn parse_history() {
            let cli = Cli::try_parse_from(["dojo", "history", "alice", "small-talk"]).unwrap();
            assert!(matches!(cli.command, Commands::History { .. }));
        }

        #[test]
        fn parse_list_without_filter() {
            let cli = Cli::try_parse_from(["dojo", "list"]).unwrap();
            match cli.command {
                Commands::List { user } => assert!(user.is_none()),
                _ => panic!("Expected List command"),
            }
        }

        #[test]
        fn parse_list_with_user_filter() {
            let cli = Cli::try_parse_from(["dojo", "list", "--user", "alice"]).unwrap();
            match cli.command {
                Commands::List { user } => assert_eq!(user, Some("alice".to_string())),
                _ => panic!("Expected List command"),
            }
        }

        #[test]
        fn parse_stats() {
            let cli = Cli::try_parse_from(["dojo", "stats"]).unwrap();
            assert!(matches!(cli.command, Commands::Stats));
        }

        #[test]
        fn parse_tui() {
            let cli = Cli::try_parse_from(["dojo", "tui"]).unwrap();
            assert!(matches!(cli.command, Commands::Tui));
        }

        #[test]
        fn unknown_subcommand_is_rejected() {
            assert!(Cli::try_parse_from(["dojo", "demote"]).is_err());
        }
    }

    mod db_path_tests {
        use super::*;
        use std::env;

        // One test so the set/remove on DOJO_DB cannot race a sibling.
        #[test]
        fn get_db_path_prefers_env_var_over_default() {
            let test_path = "/tmp/test_dojo.db";
            env::set_var("DOJO_DB", test_path);
            assert_eq!(get_db_path().to_str().unwrap(), test_path);

            env::remove_var("DOJO_DB");
            let path = get_db_path();
            assert!(path.to_str().unwrap().ends_with("dojo.db"));
        }
    }
}
