use chrono::Duration;
use quiz_core::model::{AnswerResult, LogEntry, Overview, Quiz};
use quiz_core::time::fixed_now;
use storage::repository::{LogSink, QuizRecord, QuizStore, StorageError};
use storage::sqlite::SqliteRepository;

async fn memory_repo(name: &str) -> SqliteRepository {
    SqliteRepository::connect(&format!("sqlite:file:{name}?mode=memory&cache=shared"))
        .await
        .expect("connect")
}

fn entry(question: &str, answer: &str, result: AnswerResult, minutes: i64) -> LogEntry {
    LogEntry::for_quiz(
        &Quiz::from_delimited(question, answer, ""),
        result,
        fixed_now() + Duration::minutes(minutes),
    )
}

#[tokio::test]
async fn quiz_bank_round_trips_overview_and_quizzes() {
    let repo = memory_repo("memdb_bank_roundtrip").await;
    repo.create_bank_schema().await.expect("schema");

    let quizzes = vec![
        QuizRecord::new("北海道", "札幌市\t札幌", ""),
        QuizRecord::new("三重県", "津市\t津", "shortest name"),
    ];
    repo.write_bank(&Overview::new("Capitals", "prefectural capitals"), &quizzes)
        .await
        .unwrap();

    let overview = repo.list_overview().await.unwrap();
    assert_eq!(overview.name, "Capitals");
    assert_eq!(overview.description, "prefectural capitals");

    let loaded = QuizStore::load_all(&repo).await.unwrap();
    assert_eq!(loaded, quizzes);
    assert!(loaded[0].clone().into_quiz().check_answer("札幌"));
}

#[tokio::test]
async fn quiz_bank_without_rows_is_rejected() {
    let repo = memory_repo("memdb_bank_empty").await;
    repo.create_bank_schema().await.expect("schema");

    let err = repo.list_overview().await.unwrap_err();
    assert!(matches!(err, StorageError::MissingOverview));

    let err = QuizStore::load_all(&repo).await.unwrap_err();
    assert!(matches!(err, StorageError::EmptyQuizBank));
}

#[tokio::test]
async fn rewriting_a_bank_replaces_overview_and_updates_answers() {
    let repo = memory_repo("memdb_bank_rewrite").await;
    repo.create_bank_schema().await.expect("schema");

    repo.write_bank(&Overview::new("Old", ""), &[QuizRecord::new("q", "a", "")])
        .await
        .unwrap();
    repo.write_bank(&Overview::new("New", ""), &[QuizRecord::new("q", "b", "")])
        .await
        .unwrap();

    assert_eq!(repo.list_overview().await.unwrap().name, "New");
    let loaded = QuizStore::load_all(&repo).await.unwrap();
    assert_eq!(loaded, vec![QuizRecord::new("q", "b", "")]);
}

#[tokio::test]
async fn log_sink_stores_results_newest_first() {
    let repo = memory_repo("memdb_log_order").await;
    repo.migrate().await.expect("migrate");
    repo.migrate().await.expect("migrate twice");

    let first = repo
        .append(&entry("cat", "cat\tdog", AnswerResult::Correct, 0))
        .await
        .unwrap();
    let second = repo
        .append(&entry("dog", "dog", AnswerResult::Incorrect, 1))
        .await
        .unwrap();
    repo.append(&entry("owl", "owl", AnswerResult::NoAnswer, 2))
        .await
        .unwrap();
    assert!(second > first);

    let loaded = LogSink::load_all(&repo).await.unwrap();
    let results: Vec<_> = loaded.iter().map(|e| (e.question.as_str(), e.result)).collect();
    assert_eq!(
        results,
        [
            ("owl", AnswerResult::NoAnswer),
            ("dog", AnswerResult::Incorrect),
            ("cat", AnswerResult::Correct),
        ]
    );
    assert_eq!(loaded[2].answer, "cat\tdog");
    assert_eq!(loaded[2].answered_at, fixed_now());
}

#[tokio::test]
async fn closing_the_log_is_idempotent() {
    let repo = memory_repo("memdb_log_close").await;
    repo.migrate().await.expect("migrate");

    repo.close().await.unwrap();
    repo.close().await.unwrap();

    let err = repo
        .append(&entry("cat", "cat", AnswerResult::Correct, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Closed));
}
