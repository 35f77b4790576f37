use std::thread;
use std::time::{Duration, Instant};

use charedit_core::character::Character;
use charedit_core::core_api::{
    CharacterSummary, CloseOutcome, CoreError, CoreErrorCode, Engine, EngineConfig, Session,
    SwitchOutcome, UnsavedChangesDecision,
};
use charedit_core::database::{Database, MemoryDatabase};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn roster() -> Vec<Character> {
    let mut aria = Character::new(1, "Aria");
    aria.level = 12;
    let mut brom = Character::new(2, "Brom");
    brom.level = 30;
    vec![aria, brom]
}

fn open(index: usize) -> Session {
    Engine::new()
        .open(Box::new(MemoryDatabase::new(roster())), index)
        .expect("roster has the character")
}

/// Accepts reads but never persists.
struct ReadOnlyDatabase(MemoryDatabase);

impl Database for ReadOnlyDatabase {
    fn characters(&self) -> Vec<CharacterSummary> {
        self.0.characters()
    }

    fn load(&self, index: usize) -> Result<Character, CoreError> {
        self.0.load(index)
    }

    fn save(&mut self, _character: &Character) -> bool {
        false
    }
}

fn open_read_only() -> Session {
    Engine::new()
        .open(Box::new(ReadOnlyDatabase(MemoryDatabase::new(roster()))), 0)
        .expect("roster has the character")
}

fn wait_for_title(session: &Session, expected: &str) {
    let deadline = Instant::now() + Duration::from_secs(2);
    while session.title() != expected {
        assert!(
            Instant::now() < deadline,
            "title stayed {:?}, expected {:?}",
            session.title(),
            expected
        );
        thread::sleep(Duration::from_millis(1));
    }
}

fn never_asked() -> UnsavedChangesDecision {
    panic!("decision requested for a clean session")
}

#[test]
fn open_renders_clean_title() {
    let session = open(0);

    wait_for_title(&session, &format!("Character Editor v{VERSION} [Aria]"));
    assert!(!session.is_dirty());
    assert!(!session.is_closed());
}

#[test]
fn open_missing_index_is_not_found() {
    let err = Engine::new()
        .open(Box::new(MemoryDatabase::new(roster())), 5)
        .expect_err("only two characters");
    assert_eq!(err.code, CoreErrorCode::NotFound);
}

#[test]
fn custom_title_prefix_is_used() {
    let engine = Engine::with_config(EngineConfig {
        poll_interval: Duration::from_millis(1),
        title_prefix: "Editor".to_string(),
    });
    let session = engine
        .open(Box::new(MemoryDatabase::new(roster())), 1)
        .expect("roster has the character");

    wait_for_title(&session, &format!("Editor v{VERSION} [Brom]"));
}

#[test]
fn edits_mark_title_dirty_and_save_clears_it() {
    let mut session = open(0);

    session.form_mut().set_level(13);
    assert!(session.is_dirty());
    wait_for_title(&session, &format!("Character Editor v{VERSION} [Aria] *"));

    session.save().expect("memory database accepts saves");
    assert!(!session.is_dirty());
    assert_eq!(session.character().level, 13);
    assert_eq!(session.database().load(0).map(|c| c.level), Ok(13));
    wait_for_title(&session, &format!("Character Editor v{VERSION} [Aria]"));
}

#[test]
fn renamed_character_shows_in_title_after_save() {
    let mut session = open(0);

    session.form_mut().set_name("Aria Stormborn");
    wait_for_title(&session, &format!("Character Editor v{VERSION} [Aria] *"));

    session.save().expect("memory database accepts saves");
    wait_for_title(
        &session,
        &format!("Character Editor v{VERSION} [Aria Stormborn]"),
    );
}

#[test]
fn failed_save_keeps_record_and_dirty_title() {
    let mut session = open_read_only();

    session.form_mut().set_level(40);
    let err = session.save().expect_err("read-only database rejects saves");

    assert_eq!(err.code, CoreErrorCode::PersistenceFailed);
    assert!(session.is_dirty());
    assert_eq!(session.character().level, 12);
    assert_eq!(session.form().level(), 40);
    wait_for_title(&session, &format!("Character Editor v{VERSION} [Aria] *"));
}

#[test]
fn clean_close_does_not_ask() {
    let mut session = open(0);

    assert_eq!(session.close(never_asked), Ok(CloseOutcome::Closed));
    assert!(session.is_closed());
    assert_eq!(session.close(never_asked), Ok(CloseOutcome::Closed));
}

#[test]
fn cancelled_close_keeps_session_open() {
    let mut session = open(0);
    session.form_mut().set_experience(99);

    let outcome = session.close(|| UnsavedChangesDecision::Cancel);

    assert_eq!(outcome, Ok(CloseOutcome::Cancelled));
    assert!(!session.is_closed());
    assert!(session.is_dirty());
    assert_eq!(session.form().experience(), 99);
    wait_for_title(&session, &format!("Character Editor v{VERSION} [Aria] *"));
}

#[test]
fn close_with_save_persists_changes() {
    let mut session = open(0);
    session.form_mut().set_experience(99);

    let outcome = session.close(|| UnsavedChangesDecision::Save);

    assert_eq!(outcome, Ok(CloseOutcome::Closed));
    assert!(session.is_closed());
    assert_eq!(session.database().load(0).map(|c| c.experience), Ok(99));
}

#[test]
fn close_with_discard_drops_changes() {
    let mut session = open(0);
    session.form_mut().set_experience(99);

    let outcome = session.close(|| UnsavedChangesDecision::Discard);

    assert_eq!(outcome, Ok(CloseOutcome::Closed));
    assert_eq!(session.database().load(0).map(|c| c.experience), Ok(0));
}

#[test]
fn close_aborts_when_save_fails() {
    let mut session = open_read_only();
    session.form_mut().set_experience(99);

    let err = session
        .close(|| UnsavedChangesDecision::Save)
        .expect_err("read-only database rejects saves");

    assert_eq!(err.code, CoreErrorCode::PersistenceFailed);
    assert!(!session.is_closed());
    assert!(session.is_dirty());
}

#[test]
fn switching_from_clean_session_loads_next() {
    let mut session = open(0);

    let outcome = session.switch_character(1, never_asked);

    assert_eq!(outcome, Ok(SwitchOutcome::Switched));
    assert_eq!(session.index(), 1);
    assert_eq!(session.form().name(), "Brom");
    wait_for_title(&session, &format!("Character Editor v{VERSION} [Brom]"));
}

#[test]
fn switching_with_discard_resets_flag() {
    let mut session = open(0);
    session.form_mut().set_name("Nobody");

    let outcome = session.switch_character(1, || UnsavedChangesDecision::Discard);

    assert_eq!(outcome, Ok(SwitchOutcome::Switched));
    assert!(!session.is_dirty());
    assert_eq!(session.character().name, "Brom");
    assert_eq!(session.database().load(0).map(|c| c.name), Ok("Aria".to_string()));
    wait_for_title(&session, &format!("Character Editor v{VERSION} [Brom]"));
}

#[test]
fn cancelled_switch_keeps_current_character() {
    let mut session = open(0);
    session.form_mut().set_name("Nobody");

    let outcome = session.switch_character(1, || UnsavedChangesDecision::Cancel);

    assert_eq!(outcome, Ok(SwitchOutcome::Cancelled));
    assert_eq!(session.index(), 0);
    assert_eq!(session.form().name(), "Nobody");
    assert!(session.is_dirty());
}

#[test]
fn switching_to_missing_index_does_not_ask() {
    let mut session = open(0);
    session.form_mut().set_name("Nobody");

    let err = session
        .switch_character(9, never_asked)
        .expect_err("only two characters");

    assert_eq!(err.code, CoreErrorCode::NotFound);
    assert_eq!(session.form().name(), "Nobody");
}
