use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::character::Character;
use crate::database::Database;
use crate::dirty::{DEFAULT_POLL_INTERVAL, DirtyFlag, DirtyState, DirtyWatcher};
use crate::form::EditorForm;
use crate::sync::SyncEngine;

use super::error::{CoreError, CoreErrorCode};
use super::types::{CloseOutcome, SwitchOutcome, UnsavedChangesDecision};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// How often the watcher samples the dirty flag.
    pub poll_interval: Duration,
    pub title_prefix: String,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval: DEFAULT_POLL_INTERVAL,
            title_prefix: "Character Editor".to_string(),
        }
    }
}

#[derive(Debug, Default, Clone)]
pub struct Engine {
    config: EngineConfig,
}

#[derive(Debug)]
struct TitleState {
    prefix: String,
    name: String,
    observed: DirtyState,
    text: String,
}

impl TitleState {
    fn new(prefix: &str, name: &str) -> Self {
        let mut state = Self {
            prefix: prefix.to_string(),
            name: name.to_string(),
            observed: DirtyState::Clean,
            text: String::new(),
        };
        state.render();
        state
    }

    fn render(&mut self) {
        self.text = format!("{} v{VERSION} [{}]", self.prefix, self.name);
        if self.observed.is_dirty() {
            self.text.push_str(" *");
        }
    }
}

type SharedTitle = Arc<RwLock<TitleState>>;

fn update_title(title: &SharedTitle, change: impl FnOnce(&mut TitleState)) {
    let mut state = title.write().unwrap_or_else(PoisonError::into_inner);
    change(&mut state);
    state.render();
}

/// One open character: the stored record, its editable form, and the watcher
/// that keeps the title in step with the dirty flag.
pub struct Session {
    database: Box<dyn Database>,
    index: usize,
    character: Character,
    form: EditorForm,
    dirty: DirtyFlag,
    sync: SyncEngine,
    title: SharedTitle,
    watcher: Option<DirtyWatcher>,
}

impl Engine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self { config }
    }

    pub fn open(&self, database: Box<dyn Database>, index: usize) -> Result<Session, CoreError> {
        let character = database.load(index)?;
        let dirty = DirtyFlag::new();
        let sync = SyncEngine::new();
        let form = sync.to_presentation(&character, &dirty);
        let title = Arc::new(RwLock::new(TitleState::new(
            &self.config.title_prefix,
            &character.name,
        )));
        let watcher = spawn_watcher(&dirty, &title, self.config.poll_interval)?;

        info!(index, id = character.id, name = %character.name, "opened character");
        Ok(Session {
            database,
            index,
            character,
            form,
            dirty,
            sync,
            title,
            watcher: Some(watcher),
        })
    }
}

fn spawn_watcher(
    dirty: &DirtyFlag,
    title: &SharedTitle,
    interval: Duration,
) -> Result<DirtyWatcher, CoreError> {
    let shared = Arc::clone(title);
    DirtyWatcher::spawn(dirty.clone(), interval, move |state| {
        update_title(&shared, |title| title.observed = state);
    })
    .map_err(|e| {
        CoreError::new(
            CoreErrorCode::Io,
            format!("failed to start dirty watcher: {e}"),
        )
    })
}

impl Session {
    /// Window title as last rendered by the watcher.
    pub fn title(&self) -> String {
        self.title
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .text
            .clone()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    pub fn form(&self) -> &EditorForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut EditorForm {
        &mut self.form
    }

    pub fn database(&self) -> &dyn Database {
        self.database.as_ref()
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty.is_dirty()
    }

    pub fn is_closed(&self) -> bool {
        self.watcher.is_none()
    }

    /// Writes the form into a copy of the record and persists it. The live
    /// record and the dirty flag change only when the database accepts it.
    pub fn save(&mut self) -> Result<(), CoreError> {
        let mut updated = self.character.clone();
        self.sync.apply(&self.form, &mut updated);

        if !self.database.save(&updated) {
            warn!(id = updated.id, name = %updated.name, "database rejected save");
            return Err(CoreError::new(
                CoreErrorCode::PersistenceFailed,
                format!("failed to save character '{}'", updated.name),
            ));
        }

        self.character = updated;
        update_title(&self.title, |title| {
            title.name = self.character.name.clone();
        });
        self.dirty.clear();
        info!(id = self.character.id, name = %self.character.name, "saved character");
        Ok(())
    }

    /// Loads the character at `index`. `decide` is asked only when the
    /// current one has unsaved changes.
    pub fn switch_character<F>(&mut self, index: usize, decide: F) -> Result<SwitchOutcome, CoreError>
    where
        F: FnOnce() -> UnsavedChangesDecision,
    {
        let count = self.database.characters().len();
        if index >= count {
            return Err(CoreError::new(
                CoreErrorCode::NotFound,
                format!("no character at index {index}, database holds {count}"),
            ));
        }
        if !self.resolve_unsaved(decide)? {
            debug!(index, "switch cancelled");
            return Ok(SwitchOutcome::Cancelled);
        }

        let next = self.database.load(index)?;
        self.form = self.sync.to_presentation(&next, &self.dirty);
        self.index = index;
        self.character = next;
        update_title(&self.title, |title| {
            title.name = self.character.name.clone();
        });
        info!(index, id = self.character.id, name = %self.character.name, "switched character");
        Ok(SwitchOutcome::Switched)
    }

    /// Stops the watcher unless `decide` answers Cancel. Closing twice is a
    /// no-op.
    pub fn close<F>(&mut self, decide: F) -> Result<CloseOutcome, CoreError>
    where
        F: FnOnce() -> UnsavedChangesDecision,
    {
        let Some(watcher) = self.watcher.take() else {
            return Ok(CloseOutcome::Closed);
        };

        match self.resolve_unsaved(decide) {
            Ok(true) => {
                watcher.stop();
                info!(id = self.character.id, "closed character");
                Ok(CloseOutcome::Closed)
            }
            Ok(false) => {
                self.watcher = Some(watcher);
                debug!("close cancelled");
                Ok(CloseOutcome::Cancelled)
            }
            Err(e) => {
                self.watcher = Some(watcher);
                Err(e)
            }
        }
    }

    fn resolve_unsaved<F>(&mut self, decide: F) -> Result<bool, CoreError>
    where
        F: FnOnce() -> UnsavedChangesDecision,
    {
        if !self.dirty.is_dirty() {
            return Ok(true);
        }

        let decision = decide();
        debug!(?decision, "unsaved changes");
        match decision {
            UnsavedChangesDecision::Save => self.save().map(|()| true),
            UnsavedChangesDecision::Discard => Ok(true),
            UnsavedChangesDecision::Cancel => Ok(false),
        }
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("index", &self.index)
            .field("character", &self.character.name)
            .field("dirty", &self.dirty.is_dirty())
            .field("closed", &self.is_closed())
            .finish_non_exhaustive()
    }
}
