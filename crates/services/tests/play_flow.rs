use std::sync::{Arc, Mutex};

use chrono::Duration;
use quiz_core::model::{AnswerResult, ModeKind, Overview, PlayMode};
use quiz_core::session::{FinishReason, Notification, Score, SessionSummary};
use quiz_core::time::fixed_now;
use services::{
    Clock, Entropy, HistoryService, PlayEvent, PlayService, PlaySettings, PresentationHost,
    QuizCatalog,
};
use storage::repository::{InMemoryQuizBank, LogSink, QuizRecord, QuizStore};
use storage::sqlite::SqliteRepository;

#[derive(Clone, Default)]
struct RecordingHost {
    events: Arc<Mutex<Vec<PlayEvent>>>,
}

impl RecordingHost {
    fn summary(&self) -> Option<SessionSummary> {
        self.events.lock().unwrap().iter().rev().find_map(|e| match e {
            PlayEvent::Engine(Notification::SessionFinished(summary)) => Some(summary.clone()),
            _ => None,
        })
    }

    fn questions(&self) -> Vec<String> {
        self.events
            .lock()
            .unwrap()
            .iter()
            .filter_map(|e| match e {
                PlayEvent::Engine(Notification::QuizChanged { question, .. }) => {
                    Some(question.clone())
                }
                _ => None,
            })
            .collect()
    }
}

impl PresentationHost for RecordingHost {
    fn notify(&mut self, event: &PlayEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

fn words_bank() -> Arc<dyn QuizStore> {
    Arc::new(InMemoryQuizBank::new(
        "words.db",
        Some(Overview::new("Animals", "type the animal")),
        vec![
            QuizRecord::new("cat", "cat", ""),
            QuizRecord::new("dog", "dog\tdoggo", "good boy"),
        ],
    ))
}

async fn sqlite_log(name: &str) -> Arc<dyn LogSink> {
    let repo = SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect");
    repo.migrate().await.expect("migrate");
    Arc::new(repo)
}

#[tokio::test]
async fn fixed_count_session_persists_one_entry_per_quiz() {
    let catalog = QuizCatalog::load(&[words_bank()]).await.unwrap();
    let log = sqlite_log("memdb_play_fixed").await;
    let host = RecordingHost::default();
    let mut svc = PlayService::new(
        Clock::fixed(fixed_now()),
        Entropy::Seeded(42),
        Arc::clone(&log),
        Box::new(host.clone()),
    );
    svc.select_source(catalog.find("Animals").unwrap());

    let mode = PlaySettings::default().resolve(ModeKind::FixedCount, Some("5"));
    svc.start(mode).await.unwrap();
    for _ in 0..5 {
        svc.clock_mut().advance(Duration::seconds(3));
        let answer = svc.session().unwrap().current_quiz().question().to_owned();
        svc.submit_answer(&answer).await.unwrap();
    }

    let summary = host.summary().expect("finished");
    assert_eq!(summary.reason, FinishReason::CountReached);
    assert_eq!(summary.displayed_count, 5);
    assert_eq!(summary.correct_count, 5);
    assert_eq!(summary.score(), Some(Score::SecondsPerCorrectAnswer(3.0)));
    assert_eq!(host.questions().len(), 5);

    let history = HistoryService::new(log);
    let entries = history.for_session(&summary, &[]).await.unwrap();
    assert_eq!(entries.len(), 5);
    assert!(entries.iter().all(|e| e.result == AnswerResult::Correct));
}

#[tokio::test]
async fn time_limited_session_expires_on_tick() {
    let catalog = QuizCatalog::load(&[words_bank()]).await.unwrap();
    let log = sqlite_log("memdb_play_timed").await;
    let host = RecordingHost::default();
    let mut svc = PlayService::new(
        Clock::fixed(fixed_now()),
        Entropy::Seeded(1),
        Arc::clone(&log),
        Box::new(host.clone()),
    );
    svc.select_source(catalog.find("Animals").unwrap());
    svc.start(PlayMode::TimeLimited { seconds: 10 }).await.unwrap();

    svc.submit_answer("wrong").await.unwrap();
    svc.clock_mut().advance(Duration::seconds(4));
    svc.tick().await;
    assert!(svc.is_playing());

    svc.clock_mut().advance(Duration::seconds(7));
    svc.tick().await;
    assert!(!svc.is_playing());

    let summary = host.summary().expect("finished");
    assert_eq!(summary.reason, FinishReason::TimeUp);
    assert_eq!(summary.remaining_seconds_at_stop, Some(0.0));
    assert_eq!(summary.score(), Some(Score::AnswersPerSecond(0.0)));

    let entries = log.load_all().await.unwrap();
    let results: Vec<_> = entries.iter().map(|e| e.result).collect();
    assert_eq!(results, [AnswerResult::NoAnswer, AnswerResult::Incorrect]);

    // A second retire after the forced finish writes nothing.
    svc.retire().await.unwrap();
    assert_eq!(log.load_all().await.unwrap().len(), 2);
    svc.close().await.unwrap();
}

#[tokio::test]
async fn endless_session_retired_by_close() {
    let catalog = QuizCatalog::load(&[words_bank()]).await.unwrap();
    let log = sqlite_log("memdb_play_endless").await;
    let host = RecordingHost::default();
    let mut svc = PlayService::new(
        Clock::fixed(fixed_now()),
        Entropy::Scripted(vec![0.9]),
        Arc::clone(&log),
        Box::new(host.clone()),
    );
    svc.select_source(catalog.find("Animals").unwrap());
    svc.start(PlayMode::Endless).await.unwrap();

    svc.submit_answer("doggo").await.unwrap();
    let feedback = host.events.lock().unwrap().iter().find_map(|e| match e {
        PlayEvent::Engine(Notification::FeedbackReady(feedback)) => Some(feedback.clone()),
        _ => None,
    });
    let feedback = feedback.expect("feedback shown");
    assert_eq!(feedback.result, AnswerResult::Correct);
    assert_eq!(feedback.answer, "dog\tdoggo");
    assert_eq!(feedback.explanation, "good boy");

    svc.request_next().await.unwrap();
    let history = HistoryService::new(Arc::clone(&log));
    assert_eq!(history.recent(None).await.unwrap().len(), 1);
    svc.close().await.unwrap();

    let summary = host.summary().expect("finished");
    assert_eq!(summary.reason, FinishReason::Retired);
    assert_eq!(summary.displayed_count, 2);
    assert_eq!(summary.accuracy(), 0.5);
    assert!(history.recent(None).await.is_err());
}
