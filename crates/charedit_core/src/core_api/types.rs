use serde::{Deserialize, Serialize};

use crate::character::CharacterClass;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CharacterSummary {
    pub index: usize,
    pub id: u32,
    pub name: String,
    pub level: i32,
    pub class: CharacterClass,
}

/// Answer to "save changes?" when leaving a dirty character.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnsavedChangesDecision {
    Save,
    Discard,
    Cancel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SwitchOutcome {
    Switched,
    Cancelled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloseOutcome {
    Closed,
    Cancelled,
}
