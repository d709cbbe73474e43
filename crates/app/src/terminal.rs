//! Line-oriented presentation host.

use std::io::Write;

use quiz_core::model::{ANSWER_DELIMITER, AnswerResult, LogEntry, PlayMode};
use quiz_core::session::{Feedback, Notification, Score, SessionSummary};
use services::{HistoryStats, PlayEvent, PresentationHost, QuizCatalog};

pub struct TerminalHost;

impl PresentationHost for TerminalHost {
    fn notify(&mut self, event: &PlayEvent) {
        match event {
            PlayEvent::SourceSelected { name, description } => {
                println!("== {name} ==");
                if !description.is_empty() {
                    println!("{description}");
                }
            }
            PlayEvent::Engine(notification) => show_notification(notification),
            PlayEvent::LogDeferred { pending, reason } => {
                eprintln!("warning: {pending} history entries not saved yet ({reason})");
            }
        }
    }
}

fn show_notification(notification: &Notification) {
    match notification {
        Notification::QuizChanged {
            question,
            displayed_count,
            ..
        } => {
            println!();
            println!("[{displayed_count}] {question}");
            prompt("> ");
        }
        Notification::AnswerJudged { result } => match result {
            AnswerResult::Correct => println!("Correct!"),
            AnswerResult::Incorrect => println!("Incorrect."),
            AnswerResult::NoAnswer => {}
        },
        Notification::FeedbackReady(feedback) => show_feedback(feedback),
        // The prompt line is not redrawn every second.
        Notification::TimerTick { .. } => {}
        Notification::SessionFinished(summary) => {
            println!();
            print!("{}", format_summary(summary));
        }
    }
}

fn show_feedback(feedback: &Feedback) {
    println!("Answer: {}", display_answers(&feedback.answer));
    if feedback.result == AnswerResult::Incorrect {
        println!("You typed: {}", feedback.submitted);
    }
    if !feedback.explanation.is_empty() {
        println!("{}", feedback.explanation);
    }
    prompt("(Enter: next quiz, :end: finish) ");
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// Render tab-delimited accepted answers for reading.
pub fn display_answers(delimited: &str) -> String {
    delimited
        .split(ANSWER_DELIMITER)
        .filter(|a| !a.is_empty())
        .collect::<Vec<_>>()
        .join(" / ")
}

/// `m:ss.s` for durations under an hour, `h:mm:ss` above.
pub fn format_duration(seconds: f64) -> String {
    let seconds = seconds.max(0.0);
    if seconds >= 3_600.0 {
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let whole = seconds as u64;
        return format!("{}:{:02}:{:02}", whole / 3_600, (whole / 60) % 60, whole % 60);
    }
    let minutes = (seconds / 60.0).floor();
    let rest = seconds - minutes * 60.0;
    format!("{minutes:.0}:{rest:04.1}")
}

pub fn describe_mode(mode: PlayMode) -> String {
    match mode {
        PlayMode::Endless => "endless".into(),
        PlayMode::TimeLimited { seconds } => format!("time-limit ({seconds} s)"),
        PlayMode::FixedCount { count } => format!("fixed-count ({count} quizzes)"),
    }
}

pub fn format_summary(summary: &SessionSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("--- Results: {} ---\n", summary.source_name));
    out.push_str(&format!("Mode:     {}\n", describe_mode(summary.mode)));
    out.push_str(&format!(
        "Quizzes:  {}  Correct: {}  Accuracy: {:.1}%\n",
        summary.displayed_count,
        summary.correct_count,
        summary.accuracy() * 100.0
    ));
    out.push_str(&format!("Time:     {}\n", format_duration(summary.elapsed_seconds)));
    match (summary.mode, summary.score()) {
        (_, Some(Score::AnswersPerSecond(score))) => {
            out.push_str(&format!("Score:    {score:.3} correct answers per second\n"));
        }
        (_, Some(Score::SecondsPerCorrectAnswer(score))) => {
            out.push_str(&format!("Score:    {score:.2} seconds per correct answer\n"));
        }
        (PlayMode::FixedCount { .. }, None) => out.push_str("Score:    - (no correct answers)\n"),
        _ => {}
    }
    if let Some(left) = summary.remaining_seconds_at_stop.filter(|left| *left > 0.0) {
        out.push_str(&format!("Time left: {}\n", format_duration(left)));
    }
    if let Some(left) = summary.quizzes_left() {
        out.push_str(&format!("Quizzes left: {left}\n"));
    }
    out
}

/// Print entries oldest first.
pub fn print_log(entries: &[LogEntry]) {
    for entry in entries.iter().rev() {
        println!(
            "{}  {}  {}  ->  {}",
            entry.answered_at.format("%Y-%m-%d %H:%M:%S"),
            entry.result.mark(),
            entry.question,
            display_answers(&entry.answer)
        );
    }
}

pub fn print_stats(stats: &HistoryStats) {
    println!(
        "{} entries: {} correct, {} incorrect, {} unanswered",
        stats.total, stats.correct, stats.incorrect, stats.no_answer
    );
}

pub fn print_catalog(catalog: &QuizCatalog) {
    for (index, source) in catalog.sources().iter().enumerate() {
        println!("{:>3}. {}", index + 1, source.name());
        if !source.description().is_empty() {
            println!("     {}", source.description());
        }
    }
    for rejected in catalog.rejected() {
        eprintln!("skipped {}: {}", rejected.label, rejected.error);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::session::FinishReason;
    use quiz_core::time::fixed_now;

    fn summary(mode: PlayMode, reason: FinishReason) -> SessionSummary {
        SessionSummary {
            source_name: "Animals".into(),
            mode,
            reason,
            started_at: fixed_now(),
            finished_at: fixed_now(),
            displayed_count: 4,
            correct_count: 2,
            elapsed_seconds: 65.4,
            remaining_seconds_at_stop: None,
        }
    }

    #[test]
    fn durations_are_readable() {
        assert_eq!(format_duration(0.0), "0:00.0");
        assert_eq!(format_duration(65.4), "1:05.4");
        assert_eq!(format_duration(-3.0), "0:00.0");
        assert_eq!(format_duration(3_725.0), "1:02:05");
    }

    #[test]
    fn answers_are_joined_for_display() {
        assert_eq!(display_answers("札幌市\t札幌\t"), "札幌市 / 札幌");
    }

    #[test]
    fn summary_lists_fixed_count_leftovers() {
        let text = format_summary(&summary(
            PlayMode::FixedCount { count: 10 },
            FinishReason::Retired,
        ));
        assert!(text.contains("Accuracy: 50.0%"));
        assert!(text.contains("32.70 seconds per correct answer"));
        assert!(text.contains("Quizzes left: 7"));
    }

    #[test]
    fn summary_shows_time_left_for_retired_countdown() {
        let mut retired = summary(PlayMode::TimeLimited { seconds: 120 }, FinishReason::Retired);
        retired.remaining_seconds_at_stop = Some(54.5);
        let text = format_summary(&retired);
        assert!(text.contains("0.017 correct answers per second"));
        assert!(text.contains("Time left: 0:54.5"));
    }
}
