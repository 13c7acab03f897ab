//! Full interactive sessions, from the first question to the backup file

mod mocks;

use chrono::NaiveDate;

use daybook::app::{App, Outcome, MODE_QUESTION, SCHEDULE_QUESTION, SUMMARY_QUESTION};
use daybook::error::Error;

use mocks::{test_config, CannedModel, MockCalendar, ScriptedPrompter};

const TWO_EVENTS: &str = r#"Sure! [
    {"summary": "Meeting", "start": "2024-09-25T09:00:00", "end": "2024-09-25T10:00:00"},
    {"summary": "Workout", "start": "2024-09-25T11:00:00", "end": "2024-09-25T12:00:00"}
]"#;

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 9, 25).unwrap()
}

#[tokio::test]
async fn natural_language_confirmed() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut app = App::new(&config, CannedModel::new(TWO_EVENTS), MockCalendar::default());
    let mut prompter = ScriptedPrompter::new(&["yes", "meeting at 9, workout at 11", "yes"]);
    let outcome = app.run(&mut prompter, today()).await.unwrap();

    match outcome {
        Outcome::Published(report) => {
            assert_eq!(report.published, vec![
                "20240925T090000-Meeting.ics",
                "20240925T110000-Workout.ics",
            ]);
            assert!(report.is_success());
        },
        other => panic!("unexpected outcome {:?}", other),
    }
    assert_eq!(prompter.questions.len(), 3);
    assert_eq!(prompter.questions[0], MODE_QUESTION);
    assert_eq!(prompter.questions[1], SCHEDULE_QUESTION);
    assert!(app.publisher().target().initialized);
    assert!(config.backup_path.exists());
}

#[tokio::test]
async fn natural_language_declined() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut app = App::new(&config, CannedModel::new(TWO_EVENTS), MockCalendar::default());
    let mut prompter = ScriptedPrompter::new(&["YES", "meeting at 9, workout at 11", "YES please"]);
    let outcome = app.run(&mut prompter, today()).await.unwrap();

    assert!(matches!(outcome, Outcome::Declined));
    assert!(app.publisher().target().attempts.is_empty());
    assert!(!config.backup_path.exists());
}

#[tokio::test]
async fn extraction_failure_ends_the_session() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut app = App::new(&config, CannedModel::new("I'm not sure what you mean."), MockCalendar::default());
    let mut prompter = ScriptedPrompter::new(&["yes", "???"]);
    let err = app.run(&mut prompter, today()).await.unwrap_err();

    assert!(matches!(err, Error::Extraction(_)));
    // The confirmation question is never asked
    assert_eq!(prompter.questions.len(), 2);
}

#[tokio::test]
async fn manual_entry() {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let model = CannedModel::new("[]");
    let mut app = App::new(&config, model, MockCalendar::default());
    let mut prompter = ScriptedPrompter::new(&[
        "no",
        "Dentist", "2024-09-25T15:00", "2024-09-25 16:00:00",
        "Groceries", "later", "2024-09-25T18:00:00",
        "",
    ]);
    let outcome = app.run(&mut prompter, today()).await.unwrap();

    let report = match outcome {
        Outcome::Published(report) => report,
        other => panic!("unexpected outcome {:?}", other),
    };
    assert_eq!(report.published, vec!["20240925T150000-Dentist.ics"]);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].0.start(), "later");
    assert_eq!(prompter.questions.last().map(|q| q.as_str()), Some(SUMMARY_QUESTION));
}

#[tokio::test]
async fn manual_entry_without_events() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(dir.path());

    let mut app = App::new(&config, CannedModel::new("[]"), MockCalendar::default());
    let mut prompter = ScriptedPrompter::new(&["no", ""]);
    let outcome = app.run(&mut prompter, today()).await.unwrap();

    assert!(matches!(outcome, Outcome::NothingToDo));
    assert!(!app.publisher().target().initialized);
}
