//! CLI integration tests using assert_cmd.

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn daypo() -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("daypo").unwrap();
    cmd.env_remove("DAYPO_PROGRESS_DIR").env_remove("DAYPO_RESUME");
    cmd
}

#[test]
fn validate_valid_quiz() {
    daypo()
        .arg("validate")
        .arg("../../quizzes/networking.xml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Networking Fundamentals"))
        .stdout(predicate::str::contains(
            "5 questions: 3 single, 1 multiple, 1 ordering",
        ))
        .stdout(predicate::str::contains("All quizzes valid"));
}

#[test]
fn validate_directory() {
    daypo()
        .arg("validate")
        .arg("../../quizzes")
        .assert()
        .success()
        .stdout(predicate::str::contains("Networking Fundamentals"))
        .stdout(predicate::str::contains("Computing History"));
}

#[test]
fn validate_reports_skipped_questions() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("partial.xml");
    std::fs::write(
        &path,
        r#"<test><c>
            <c><t>1</t><p>Kept</p><r><o>a</o><o>b</o></r><c>21</c></c>
            <c><t>9</t><p>Essay</p><r><o>x</o></r><c>2</c></c>
        </c></test>"#,
    )
    .unwrap();

    daypo()
        .arg("validate")
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("[node 2] WARNING: skipped"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_file() {
    daypo()
        .arg("validate")
        .arg("nonexistent.xml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn validate_quiz_without_container() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("empty.xml");
    std::fs::write(&path, "<test><p><t>Empty</t></p></test>").unwrap();

    daypo()
        .arg("validate")
        .arg(&path)
        .assert()
        .failure()
        .stderr(predicate::str::contains("no main question container"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    daypo()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created daypo.toml"))
        .stdout(predicate::str::contains("Created quizzes/sample.xml"));

    assert!(dir.path().join("daypo.toml").exists());
    assert!(dir.path().join("quizzes/sample.xml").exists());

    daypo()
        .current_dir(dir.path())
        .arg("validate")
        .arg("quizzes/sample.xml")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daypo Sample Quiz"))
        .stdout(predicate::str::contains("1 with exhibits"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();

    daypo().current_dir(dir.path()).arg("init").assert().success();

    daypo()
        .current_dir(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists"));
}

#[test]
fn exhibits_are_written() {
    let dir = TempDir::new().unwrap();
    daypo().current_dir(dir.path()).arg("init").assert().success();

    daypo()
        .current_dir(dir.path())
        .arg("exhibits")
        .arg("quizzes/sample.xml")
        .arg("--output")
        .arg("out")
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 exhibit(s)"));

    let png = std::fs::read(dir.path().join("out/question-4.png")).unwrap();
    assert_eq!(&png[1..4], b"PNG");
}

#[test]
fn exhibits_none() {
    let dir = TempDir::new().unwrap();
    daypo()
        .arg("exhibits")
        .arg("../../quizzes/history.xml")
        .arg("--output")
        .arg(dir.path())
        .assert()
        .success()
        .stdout(predicate::str::contains("No exhibits"));
}

#[test]
fn progress_without_sidecar() {
    let dir = TempDir::new().unwrap();
    let quiz = dir.path().join("quiz.xml");
    std::fs::write(&quiz, "<test/>").unwrap();

    daypo()
        .current_dir(dir.path())
        .arg("progress")
        .arg(&quiz)
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved progress"));
}

#[test]
fn progress_and_reset() {
    let dir = TempDir::new().unwrap();
    let quiz = dir.path().join("quiz.xml");
    std::fs::write(&quiz, "<test/>").unwrap();
    std::fs::write(
        dir.path().join("quiz.progress.json"),
        r#"{
            "title": "Stored",
            "current_question_index": 1,
            "questions": [
                {"text": "a", "user_answer_indices": [0], "user_input": [0], "is_answered": true, "is_correct": true},
                {"text": "b", "is_answered": true, "is_correct": false},
                {"text": "c"}
            ]
        }"#,
    )
    .unwrap();

    let output = daypo()
        .current_dir(dir.path())
        .arg("progress")
        .arg(&quiz)
        .arg("--format")
        .arg("json")
        .output()
        .unwrap();
    assert!(output.status.success());
    let status: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(status["title"], "Stored");
    assert_eq!(status["current_question"], 2);
    assert_eq!(status["total"], 3);
    assert_eq!(status["answered"], 2);
    assert_eq!(status["correct"], 1);
    assert_eq!(status["incorrect"], 1);

    daypo()
        .current_dir(dir.path())
        .arg("progress")
        .arg(&quiz)
        .assert()
        .success()
        .stdout(predicate::str::contains("Stored"))
        .stdout(predicate::str::contains("2 of 3"));

    daypo()
        .current_dir(dir.path())
        .arg("reset")
        .arg(&quiz)
        .assert()
        .success()
        .stdout(predicate::str::contains("Deleted"));

    assert!(!dir.path().join("quiz.progress.json").exists());

    daypo()
        .current_dir(dir.path())
        .arg("reset")
        .arg(&quiz)
        .assert()
        .success()
        .stdout(predicate::str::contains("No saved progress"));
}

#[test]
fn progress_rejects_unknown_format() {
    let dir = TempDir::new().unwrap();
    let quiz = dir.path().join("quiz.xml");
    std::fs::write(dir.path().join("quiz.progress.json"), "{}").unwrap();

    daypo()
        .current_dir(dir.path())
        .arg("progress")
        .arg(&quiz)
        .arg("--format")
        .arg("yaml")
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown format"));
}

#[test]
fn take_conflicting_flags() {
    daypo()
        .arg("take")
        .arg("../../quizzes/networking.xml")
        .arg("--resume")
        .arg("--fresh")
        .assert()
        .failure();
}

#[test]
fn help_output() {
    daypo()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Daypo XML practice tests"));
}

#[test]
fn version_output() {
    daypo()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("daypo"));
}
