use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use crate::error::StudyError;
use crate::pipelines::generator::QuestionGenerator;
use crate::routes::{self, QuestionView};
use crate::state::app::AppState;

const USAGE: &str = "usage: studyaid <document.txt> [--user <name>]";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub document: PathBuf,
    pub user_id: String,
}

pub fn parse_args<I: IntoIterator<Item = String>>(args: I) -> Result<CliArgs, StudyError> {
    let mut document = None;
    let mut user_id = "anonymous".to_string();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--user" | "-u" => {
                user_id = args
                    .next()
                    .ok_or_else(|| {
                        StudyError::new("--user needs a value", "cli").with_context(USAGE)
                    })?;
            }
            "--help" | "-h" => return Err(StudyError::new(USAGE, "cli")),
            _ if document.is_none() => document = Some(PathBuf::from(arg)),
            _ => {
                return Err(StudyError::new(format!("Unexpected argument '{}'", arg), "cli")
                    .with_context(USAGE));
            }
        }
    }

    let document = document
        .ok_or_else(|| StudyError::new("No document given", "cli").with_context(USAGE))?;
    Ok(CliArgs { document, user_id })
}

fn show_question(question: &QuestionView) {
    println!();
    println!("[{} | {}] {}", question.topic, question.difficulty, question.question);
    show_options(question);
}

fn show_options(question: &QuestionView) {
    for (i, option) in question.options.iter().enumerate() {
        println!("  {}. {}", i + 1, option);
    }
}

/// A numbered reply to a multiple-choice question picks that option
fn resolve_answer<'a>(question: &'a QuestionView, input: &'a str) -> &'a str {
    match input.parse::<usize>() {
        Ok(n) if n >= 1 && n <= question.options.len() => &question.options[n - 1],
        _ => input,
    }
}

/// Interactive quiz over stdin until `:quit` or end of input
pub async fn run_quiz<G: QuestionGenerator>(
    state: &AppState,
    generator: &G,
    args: &CliArgs,
) -> Result<(), StudyError> {
    println!("Preparing quiz from {:?} ...", args.document);
    let init = routes::initialize(state, generator, &args.document).await?;
    println!("{} ({} questions)", init.message, init.question_count);
    if !init.summary.is_empty() {
        println!("\nSummary:\n{}", init.summary);
    }
    println!("\nTopics: {}", init.topics.join(", "));
    if !init.failed_topics.is_empty() {
        println!("No questions for: {}", init.failed_topics.join(", "));
    }
    println!("\nCommands: :hint  :status  :suggest  :quit");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut question = routes::get_question(state)?;
    show_question(&question);

    while let Some(line) = lines.next_line().await? {
        let input = line.trim();
        match input {
            "" => continue,
            ":quit" | ":q" => break,
            ":hint" => {
                println!("Topic: {}", question.topic);
                show_options(&question);
            }
            ":status" => {
                let overview = routes::quiz_overview(state)?;
                println!(
                    "{}: {} answered, {} correct, score {}, difficulty {}",
                    overview.content_id,
                    overview.progress.answered,
                    overview.progress.correct,
                    overview.progress.score,
                    overview.progress.difficulty
                );
                println!("Topics: {}", overview.topics.join(", "));
            }
            ":suggest" => {
                let feedback = routes::get_suggestions(state, generator).await?;
                println!("\n{}\n(score: {})", feedback.suggestions, feedback.score);
            }
            _ => {
                let result = routes::submit_answer(state, resolve_answer(&question, input))?;
                if result.correct {
                    println!("Correct! Score: {}", result.score);
                } else {
                    println!(
                        "Incorrect. The answer was: {}. Score: {}",
                        result.correct_answer, result.score
                    );
                }
                question = routes::get_question(state)?;
                show_question(&question);
            }
        }
    }

    let record = routes::finish_quiz(state, &args.user_id).await?;
    println!(
        "\nFinished: {} answered, {} correct, score {}",
        record.questions_attempted, record.correct_answers, record.score
    );
    if !record.weak_topics.is_empty() {
        println!("Review: {}", record.weak_topics.join(", "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::difficulty::{Difficulty, Tier};
    use crate::quiz::question::{QuestionId, QuestionKind, QuestionSource};

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn parses_document_and_user() {
        let parsed = parse_args(args(&["notes.txt", "--user", "sam"])).unwrap();
        assert_eq!(parsed.document, PathBuf::from("notes.txt"));
        assert_eq!(parsed.user_id, "sam");

        let parsed = parse_args(args(&["notes.txt"])).unwrap();
        assert_eq!(parsed.user_id, "anonymous");
    }

    #[test]
    fn rejects_missing_or_extra_arguments() {
        assert_eq!(parse_args(args(&[])).unwrap_err().stage, "cli");
        assert!(parse_args(args(&["a.txt", "b.txt"])).is_err());
        assert!(parse_args(args(&["a.txt", "--user"])).is_err());
    }

    #[test]
    fn numbered_reply_selects_option() {
        let view = QuestionView {
            id: QuestionId::from_text("q"),
            kind: QuestionKind::MultipleChoice,
            question: "q".into(),
            options: vec!["Red".into(), "Blue".into()],
            topic: "Colors".into(),
            difficulty: Difficulty::Tier(Tier::Easy),
            source: QuestionSource::Document,
        };
        assert_eq!(resolve_answer(&view, "2"), "Blue");
        assert_eq!(resolve_answer(&view, "3"), "3");
        assert_eq!(resolve_answer(&view, "blue"), "blue");
    }
}
