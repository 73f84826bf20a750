//! CLI integration tests using assert_cmd.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

use qualimatch_core::bank::builtin_bank;
use qualimatch_core::model::Phase;

/// A command rooted in `dir`, isolated from user config and env overrides.
fn qualimatch(dir: &Path) -> Command {
    #[allow(deprecated)]
    let mut cmd = Command::cargo_bin("qualimatch").unwrap();
    cmd.current_dir(dir)
        .env("HOME", dir)
        .env_remove("QUALIMATCH_STORE")
        .env_remove("QUALIMATCH_BANK")
        .env_remove("RUST_LOG");
    cmd
}

fn answer_all(dir: &Path, phase: Phase, extra: &[&str]) {
    let bank = builtin_bank().unwrap();
    for item in bank.items(phase) {
        qualimatch(dir)
            .args(extra)
            .args(["quiz", "answer", phase.as_str(), item.id.as_str()])
            .args(["--design", item.correct_design.as_str()])
            .args(["--source", item.correct_source.as_str()])
            .assert()
            .success();
    }
}

const RQ: &str =
    "How do students describe their lived experience and feelings about the meaning of exam stress?";

#[test]
fn validate_builtin_bank() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .arg("validate")
        .assert()
        .success()
        .stdout(predicate::str::contains("10 pretest, 10 posttest, 10 practice"))
        .stdout(predicate::str::contains("Item bank valid"));
}

#[test]
fn validate_flags_bank_problems() {
    let dir = TempDir::new().unwrap();
    let bank = qualimatch_core::bank::BUILTIN_BANK.replacen(
        "distractor_designs = [\"case_study\", \"ethnography\", \"grounded_theory\"]",
        "distractor_designs = [\"phenomenology\", \"ethnography\", \"grounded_theory\"]",
        1,
    );
    let path = dir.path().join("bank.toml");
    std::fs::write(&path, bank).unwrap();

    qualimatch(dir.path())
        .args(["validate", "--bank"])
        .arg(&path)
        .assert()
        .success()
        .stdout(predicate::str::contains("bank.toml"))
        .stdout(predicate::str::contains("[pretest/pre_01] WARNING"))
        .stdout(predicate::str::contains("1 warning(s) found"));
}

#[test]
fn validate_nonexistent_bank() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["validate", "--bank", "nonexistent.toml"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error"));
}

#[test]
fn init_creates_files() {
    let dir = TempDir::new().unwrap();

    qualimatch(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Created qualimatch.toml"))
        .stdout(predicate::str::contains("Created banks/custom.toml"));

    assert!(dir.path().join("qualimatch.toml").exists());
    assert!(dir.path().join("banks/custom.toml").exists());

    qualimatch(dir.path())
        .args(["validate", "--bank", "banks/custom.toml"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Item bank valid"));
}

#[test]
fn init_skips_existing() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path()).arg("init").assert().success();
    qualimatch(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("already exists, skipping"));
}

#[test]
fn infer_suggests_phenomenology() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["infer", RQ, "--topic", "Exam stress"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Suggested: Phenomenology"))
        .stdout(predicate::str::contains("lived experience"));
}

#[test]
fn infer_without_cues() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["infer", "What is it?"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No clear design signal"));
}

#[test]
fn participant_round_trip() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["participant", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No participant set"));
    qualimatch(dir.path())
        .args(["participant", "set", "  Alex   Cruz "])
        .assert()
        .success()
        .stdout(predicate::str::contains("Participant: Alex_Cruz"));
    qualimatch(dir.path())
        .args(["participant", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Alex_Cruz"));
    qualimatch(dir.path())
        .args(["participant", "clear"])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["participant", "show"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No participant set"));
}

#[test]
fn quiz_show_lists_items() {
    let dir = TempDir::new().unwrap();
    let bank = builtin_bank().unwrap();
    qualimatch(dir.path())
        .args(["quiz", "show", "pretest"])
        .assert()
        .success()
        .stdout(predicate::str::contains(bank.pretest[0].id.as_str()))
        .stdout(predicate::str::contains("Answered 0/10"));
}

#[test]
fn quiz_rejects_non_quiz_phase() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["quiz", "show", "practice"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("not a quiz phase"));
    qualimatch(dir.path())
        .args(["quiz", "show", "midterm"])
        .assert()
        .failure();
}

#[test]
fn answer_unknown_item_fails() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["quiz", "answer", "pretest", "nope", "--design", "ethnography"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown item 'nope'"));
}

#[test]
fn submit_needs_participant() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["quiz", "submit", "pretest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("participant code"));
}

#[test]
fn submit_needs_every_answer() {
    let dir = TempDir::new().unwrap();
    let bank = builtin_bank().unwrap();
    let item = &bank.pretest[0];
    qualimatch(dir.path())
        .args(["--pid", "alex", "quiz", "answer", "pretest", item.id.as_str()])
        .args(["--design", item.correct_design.as_str()])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["--pid", "alex", "quiz", "submit", "pretest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("answer all items"));
}

#[test]
fn full_pretest_then_export() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["participant", "set", "alex"])
        .assert()
        .success();
    answer_all(dir.path(), Phase::Pretest, &[]);

    qualimatch(dir.path())
        .args(["quiz", "submit", "pretest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 20 / 20 (100%)"));

    qualimatch(dir.path())
        .args(["quiz", "export", "pretest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 10 row(s)"));

    let csv = std::fs::read_to_string(
        dir.path()
            .join("qualimatch-exports")
            .join("pretest_alex_default.csv"),
    )
    .unwrap();
    assert!(csv.starts_with("pid,phase,item_id,topic,rq"));
    assert!(csv.contains("\n\npid,phase,total_points,max_points,percent"));
    assert!(csv.contains("alex,pretest,20,20,100,"));
}

#[test]
fn anonymous_answers_follow_the_participant() {
    let dir = TempDir::new().unwrap();
    answer_all(dir.path(), Phase::Posttest, &["--seed", "s7"]);
    qualimatch(dir.path())
        .args(["--seed", "s7", "participant", "set", "alex"])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["--seed", "s7", "quiz", "submit", "posttest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Score: 20 / 20 (100%)"));
}

#[test]
fn seeds_keep_progress_apart() {
    let dir = TempDir::new().unwrap();
    answer_all(dir.path(), Phase::Pretest, &["--pid", "alex", "--seed", "a"]);
    qualimatch(dir.path())
        .args(["--pid", "alex", "--seed", "b", "quiz", "submit", "pretest"])
        .assert()
        .failure();
    qualimatch(dir.path())
        .args(["--pid", "alex", "--seed", "a", "quiz", "submit", "pretest"])
        .assert()
        .success();
}

#[test]
fn export_before_submit_fails() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["--pid", "alex", "quiz", "export", "posttest"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no submission yet for posttest"));
}

#[test]
fn quiz_reset_clears_answers() {
    let dir = TempDir::new().unwrap();
    answer_all(dir.path(), Phase::Pretest, &["--pid", "alex"]);
    qualimatch(dir.path())
        .args(["--pid", "alex", "quiz", "reset", "pretest"])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["--pid", "alex", "quiz", "show", "pretest"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Answered 0/10"));
}

#[test]
fn practice_check_and_export() {
    let dir = TempDir::new().unwrap();
    let bank = builtin_bank().unwrap();
    let card = &bank.practice[0];

    qualimatch(dir.path())
        .args(["practice", "check", card.id.as_str()])
        .args(["--design", card.correct_design.as_str()])
        .args(["--source", card.correct_source.as_str()])
        .assert()
        .success()
        .stdout(predicate::str::contains("Correct (2 / 2)"))
        .stdout(predicate::str::contains(card.explanation.as_str()));

    qualimatch(dir.path())
        .args(["practice", "export"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("participant code"));

    qualimatch(dir.path())
        .args(["--pid", "alex", "practice", "check", card.id.as_str()])
        .args(["--design", card.correct_design.as_str()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("pick both"));

    qualimatch(dir.path())
        .args(["--pid", "alex", "practice", "check", card.id.as_str()])
        .args(["--design", card.correct_design.as_str()])
        .args(["--source", card.correct_source.as_str()])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["--pid", "alex", "practice", "export"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Wrote 1 row(s)"));
    assert!(dir
        .path()
        .join("qualimatch-exports/practice_alex_default.csv")
        .exists());
}

#[test]
fn build_flow() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["build", "check"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("research question"));

    qualimatch(dir.path())
        .args(["build", "edit", "--topic", "Exam stress", "--rq", RQ])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["build", "edit", "--design", "phenomenology", "--source", "interview"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Exam stress"));

    qualimatch(dir.path())
        .args(["build", "check"])
        .assert()
        .success()
        .stdout(predicate::str::contains("[good]"))
        .stdout(predicate::str::contains("Example rewrites"));

    qualimatch(dir.path())
        .args(["build", "save"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("participant code"));

    qualimatch(dir.path())
        .args(["participant", "set", "alex"])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["build", "edit", "--design", "phenomenology", "--source", "interview", "--rq", RQ])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["build", "save"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Saved build entry for alex"));
    qualimatch(dir.path())
        .args(["build", "export"])
        .assert()
        .success();

    let csv = std::fs::read_to_string(dir.path().join("qualimatch-exports/build_alex_default.csv"))
        .unwrap();
    assert!(csv.starts_with("pid,phase,topic,rq_text"));
    assert!(csv.contains("alex,build,,"));
}

#[test]
fn build_save_reports_missing_fields() {
    let dir = TempDir::new().unwrap();
    qualimatch(dir.path())
        .args(["--pid", "alex", "build", "edit", "--rq", RQ])
        .assert()
        .success();
    qualimatch(dir.path())
        .args(["--pid", "alex", "build", "save"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("design, data source"));
}

#[test]
fn store_flag_overrides_location() {
    let dir = TempDir::new().unwrap();
    let store = dir.path().join("nested/state.json");
    qualimatch(dir.path())
        .arg("--store")
        .arg(&store)
        .args(["participant", "set", "alex"])
        .assert()
        .success();
    let body = std::fs::read_to_string(&store).unwrap();
    assert!(body.contains("qm_pid"));
}
