use std::fs;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tracing::{debug, warn};

use crate::character::Character;
use crate::core_api::{CharacterSummary, CoreError, CoreErrorCode};

/// Durable character storage.
pub trait Database {
    fn characters(&self) -> Vec<CharacterSummary>;

    fn load(&self, index: usize) -> Result<Character, CoreError>;

    /// Persists `character`, replacing the stored record with the same id.
    /// Failure leaves the store as it was.
    fn save(&mut self, character: &Character) -> bool;

    fn find(&self, name: &str) -> Option<usize> {
        self.characters()
            .into_iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
            .map(|c| c.index)
    }
}

fn summaries(characters: &[Character]) -> Vec<CharacterSummary> {
    characters
        .iter()
        .enumerate()
        .map(|(index, c)| CharacterSummary {
            index,
            id: c.id,
            name: c.name.clone(),
            level: c.level,
            class: c.class(),
        })
        .collect()
}

fn load_from(characters: &[Character], index: usize) -> Result<Character, CoreError> {
    characters.get(index).cloned().ok_or_else(|| {
        CoreError::new(
            CoreErrorCode::NotFound,
            format!(
                "no character at index {index}, database holds {}",
                characters.len()
            ),
        )
    })
}

fn upsert(characters: &mut Vec<Character>, character: &Character) {
    match characters.iter_mut().find(|c| c.id == character.id) {
        Some(existing) => *existing = character.clone(),
        None => characters.push(character.clone()),
    }
}

#[derive(Debug, Default, Clone)]
pub struct MemoryDatabase {
    characters: Vec<Character>,
}

impl MemoryDatabase {
    pub fn new(characters: Vec<Character>) -> Self {
        Self { characters }
    }

    pub fn records(&self) -> &[Character] {
        &self.characters
    }
}

impl Database for MemoryDatabase {
    fn characters(&self) -> Vec<CharacterSummary> {
        summaries(&self.characters)
    }

    fn load(&self, index: usize) -> Result<Character, CoreError> {
        load_from(&self.characters, index)
    }

    fn save(&mut self, character: &Character) -> bool {
        upsert(&mut self.characters, character);
        true
    }
}

/// Character store kept as a JSON array on disk. Paths ending in `.gz` are
/// gzip-compressed.
#[derive(Debug, Clone)]
pub struct JsonDatabase {
    output: PathBuf,
    characters: Vec<Character>,
}

impl JsonDatabase {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, CoreError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to read {}: {e}", path.display()),
            )
        })?;
        let characters = decode(path, &bytes).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Parse,
                format!("failed to parse {}: {e}", path.display()),
            )
        })?;
        debug!(path = %path.display(), count = characters.len(), "opened character database");

        Ok(Self {
            output: path.to_path_buf(),
            characters,
        })
    }

    pub fn create(path: impl AsRef<Path>, characters: Vec<Character>) -> Result<Self, CoreError> {
        let db = Self {
            output: path.as_ref().to_path_buf(),
            characters,
        };
        db.write(&db.characters).map_err(|e| {
            CoreError::new(
                CoreErrorCode::Io,
                format!("failed to write {}: {e}", db.output.display()),
            )
        })?;
        Ok(db)
    }

    /// Sends later saves to `path` instead of the file that was opened.
    pub fn with_output(mut self, path: impl AsRef<Path>) -> Self {
        self.output = path.as_ref().to_path_buf();
        self
    }

    pub fn path(&self) -> &Path {
        &self.output
    }

    pub fn records(&self) -> &[Character] {
        &self.characters
    }

    fn write(&self, characters: &[Character]) -> io::Result<()> {
        let bytes = encode(&self.output, characters)?;
        fs::write(&self.output, bytes)
    }
}

impl Database for JsonDatabase {
    fn characters(&self) -> Vec<CharacterSummary> {
        summaries(&self.characters)
    }

    fn load(&self, index: usize) -> Result<Character, CoreError> {
        load_from(&self.characters, index)
    }

    fn save(&mut self, character: &Character) -> bool {
        let mut updated = self.characters.clone();
        upsert(&mut updated, character);

        match self.write(&updated) {
            Ok(()) => {
                self.characters = updated;
                debug!(id = character.id, path = %self.output.display(), "saved character");
                true
            }
            Err(e) => {
                warn!(id = character.id, path = %self.output.display(), error = %e, "failed to save character");
                false
            }
        }
    }
}

fn is_gzip_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"))
}

fn decode(path: &Path, bytes: &[u8]) -> io::Result<Vec<Character>> {
    let json = if is_gzip_path(path) {
        let mut out = Vec::new();
        GzDecoder::new(bytes).read_to_end(&mut out)?;
        out
    } else {
        bytes.to_vec()
    };
    serde_json::from_slice(&json).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

fn encode(path: &Path, characters: &[Character]) -> io::Result<Vec<u8>> {
    let json = serde_json::to_vec_pretty(characters)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    if !is_gzip_path(path) {
        return Ok(json);
    }
    let mut encoder = GzEncoder::new(Vec::new(), Compression::default());
    encoder.write_all(&json)?;
    encoder.finish()
}
