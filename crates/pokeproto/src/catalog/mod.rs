// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Combatant catalog: species stat blocks, the fixed move table, and the
//! elemental effectiveness chart.
//!
//! Lookup is case-sensitive; callers may normalize. A miss carries a small
//! sample of valid names for user feedback.

mod moves;
mod species;
mod types;

pub use moves::{Category, MoveData};
pub use types::{combined_effectiveness, effectiveness, ElementType, TYPE_COUNT};

use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::io;
use std::path::Path;
use std::str::FromStr;

/// Names included in an unknown-name error, for user feedback.
const ERROR_SAMPLE_LEN: usize = 5;

/// Field separator of the on-disk species file.
const FIELD_SEP: char = '|';

/// Move-list separator within the species file's last field.
const MOVE_SEP: char = ';';

// =======================================================================
// Data Model
// =======================================================================

/// Six-stat block of a combatant. Immutable after setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Stats {
    pub hp: u32,
    pub attack: u32,
    pub defense: u32,
    pub sp_attack: u32,
    pub sp_defense: u32,
    pub speed: u32,
}

/// A combatant stat block with typing and known moves.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Species {
    pub name: String,
    pub primary: ElementType,
    pub secondary: Option<ElementType>,
    pub stats: Stats,
    pub moves: Vec<String>,
}

impl Species {
    /// Whether the given move type earns the same-type attack bonus.
    #[must_use]
    pub fn has_type(&self, element: ElementType) -> bool {
        self.primary == element || self.secondary == Some(element)
    }

    /// Whether this species knows the named move (case-sensitive).
    #[must_use]
    pub fn knows(&self, mv: &str) -> bool {
        self.moves.iter().any(|m| m == mv)
    }
}

// =======================================================================
// Errors
// =======================================================================

/// Catalog lookup and load failures.
#[derive(Debug)]
pub enum CatalogError {
    /// No species under that name; `sample` lists a few valid ones.
    UnknownSpecies { name: String, sample: Vec<String> },
    /// No move under that name; `sample` lists a few valid ones.
    UnknownMove { name: String, sample: Vec<String> },
    /// A species file row did not parse.
    Malformed { line: usize, reason: String },
    /// Species file could not be read.
    Io(io::Error),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CatalogError::UnknownSpecies { name, sample } => {
                write!(f, "unknown species '{}' (try one of: {})", name, sample.join(", "))
            }
            CatalogError::UnknownMove { name, sample } => {
                write!(f, "unknown move '{}' (try one of: {})", name, sample.join(", "))
            }
            CatalogError::Malformed { line, reason } => {
                write!(f, "species file line {}: {}", line, reason)
            }
            CatalogError::Io(err) => write!(f, "species file: {}", err),
        }
    }
}

impl std::error::Error for CatalogError {}

impl From<io::Error> for CatalogError {
    fn from(err: io::Error) -> Self {
        CatalogError::Io(err)
    }
}

// =======================================================================
// Catalog
// =======================================================================

/// Name-keyed combatant and move catalog, fixed after startup.
pub struct Catalog {
    species: BTreeMap<String, Species>,
    moves: BTreeMap<&'static str, MoveData>,
}

impl Catalog {
    /// Catalog holding the built-in species and move tables.
    #[must_use]
    pub fn builtin() -> Self {
        let moves = moves::MOVE_TABLE.iter().map(|m| (m.name, *m)).collect();
        let species = species::SPECIES_TABLE
            .iter()
            .map(|row| {
                let [hp, attack, defense, sp_attack, sp_defense, speed] = row.stats;
                let s = Species {
                    name: row.name.to_string(),
                    primary: row.primary,
                    secondary: row.secondary,
                    stats: Stats { hp, attack, defense, sp_attack, sp_defense, speed },
                    moves: row.moves.iter().map(|m| (*m).to_string()).collect(),
                };
                (s.name.clone(), s)
            })
            .collect();
        Self { species, moves }
    }

    /// Resolve a species name (case-sensitive).
    pub fn species(&self, name: &str) -> Result<&Species, CatalogError> {
        self.species.get(name).ok_or_else(|| CatalogError::UnknownSpecies {
            name: name.to_string(),
            sample: self.species.keys().take(ERROR_SAMPLE_LEN).cloned().collect(),
        })
    }

    /// Resolve a move name (case-sensitive).
    pub fn move_data(&self, name: &str) -> Result<&MoveData, CatalogError> {
        self.moves.get(name).ok_or_else(|| CatalogError::UnknownMove {
            name: name.to_string(),
            sample: self
                .moves
                .keys()
                .take(ERROR_SAMPLE_LEN)
                .map(|k| (*k).to_string())
                .collect(),
        })
    }

    /// All species names, sorted.
    #[must_use]
    pub fn species_names(&self) -> Vec<&str> {
        self.species.keys().map(String::as_str).collect()
    }

    /// Merge species rows from a delimited text file over the builtin table.
    ///
    /// Row format (one species per line, `#` comments and blank lines
    /// skipped):
    ///
    /// ```text
    /// name|primary|secondary-or-dash|hp|atk|def|spa|spd|spe|move;move;...
    /// ```
    pub fn load_species_file(&mut self, path: &Path) -> Result<usize, CatalogError> {
        let text = fs::read_to_string(path)?;
        let mut loaded = 0;
        for (idx, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let s = parse_species_row(line).map_err(|reason| CatalogError::Malformed {
                line: idx + 1,
                reason,
            })?;
            // Moves must exist in the fixed move table.
            for mv in &s.moves {
                if !self.moves.contains_key(mv.as_str()) {
                    return Err(CatalogError::Malformed {
                        line: idx + 1,
                        reason: format!("references unknown move '{}'", mv),
                    });
                }
            }
            self.species.insert(s.name.clone(), s);
            loaded += 1;
        }
        log::info!("[catalog] loaded {} species rows from {}", loaded, path.display());
        Ok(loaded)
    }
}

fn parse_species_row(line: &str) -> Result<Species, String> {
    let fields: Vec<&str> = line.split(FIELD_SEP).map(str::trim).collect();
    if fields.len() != 10 {
        return Err(format!("expected 10 fields, found {}", fields.len()));
    }
    let name = fields[0];
    if name.is_empty() {
        return Err("empty species name".to_string());
    }
    let primary = ElementType::from_str(fields[1])?;
    let secondary = match fields[2] {
        "-" | "" => None,
        other => Some(ElementType::from_str(other)?),
    };
    let mut stats = [0u32; 6];
    for (slot, field) in stats.iter_mut().zip(&fields[3..9]) {
        *slot = field
            .parse::<u32>()
            .map_err(|_| format!("bad stat value '{}'", field))?;
    }
    let moves: Vec<String> = fields[9]
        .split(MOVE_SEP)
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect();
    if moves.is_empty() {
        return Err("species knows no moves".to_string());
    }
    let [hp, attack, defense, sp_attack, sp_defense, speed] = stats;
    Ok(Species {
        name: name.to_string(),
        primary,
        secondary,
        stats: Stats { hp, attack, defense, sp_attack, sp_defense, speed },
        moves,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_builtin_lookup() {
        let catalog = Catalog::builtin();
        let pikachu = catalog.species("Pikachu").expect("builtin species");
        assert_eq!(pikachu.primary, ElementType::Electric);
        assert_eq!(pikachu.stats.sp_attack, 50);
        assert!(pikachu.knows("Thunderbolt"));

        let bolt = catalog.move_data("Thunderbolt").expect("builtin move");
        assert_eq!(bolt.power, 90);
        assert_eq!(bolt.category, Category::Special);
    }

    #[test]
    fn test_lookup_is_case_sensitive() {
        let catalog = Catalog::builtin();
        assert!(catalog.species("pikachu").is_err());
    }

    #[test]
    fn test_miss_carries_sample() {
        let catalog = Catalog::builtin();
        match catalog.species("Missingno") {
            Err(CatalogError::UnknownSpecies { name, sample }) => {
                assert_eq!(name, "Missingno");
                assert_eq!(sample.len(), ERROR_SAMPLE_LEN);
            }
            other => panic!("expected UnknownSpecies, got ok={}", other.is_ok()),
        }
    }

    #[test]
    fn test_builtin_moves_resolve() {
        // Every move a builtin species knows must exist in the move table.
        let catalog = Catalog::builtin();
        for name in catalog.species_names() {
            let s = catalog.species(name).expect("listed species");
            for mv in &s.moves {
                assert!(catalog.move_data(mv).is_ok(), "{} knows unknown move {}", name, mv);
            }
        }
    }

    #[test]
    fn test_species_file_merge() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "# custom roster").expect("write");
        writeln!(file, "Sparkrat|Electric|-|40|50|40|60|50|95|Thunderbolt;Quick Attack").expect("write");
        writeln!(file, "Mossback|Grass|Poison|70|60|80|75|80|40|Razor Leaf;Sludge Bomb").expect("write");

        let mut catalog = Catalog::builtin();
        let loaded = catalog.load_species_file(file.path()).expect("load");
        assert_eq!(loaded, 2);
        let sparkrat = catalog.species("Sparkrat").expect("merged species");
        assert_eq!(sparkrat.stats.speed, 95);
        assert_eq!(sparkrat.secondary, None);
    }

    #[test]
    fn test_species_file_rejects_bad_rows() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "Broken|Electric|-|40|50").expect("write");
        let mut catalog = Catalog::builtin();
        match catalog.load_species_file(file.path()) {
            Err(CatalogError::Malformed { line, .. }) => assert_eq!(line, 1),
            other => panic!("expected Malformed, got ok={}", other.is_ok()),
        }
    }

    #[test]
    fn test_species_file_rejects_unknown_move() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "Fakemon|Normal|-|40|50|40|60|50|95|Splash Dance").expect("write");
        let mut catalog = Catalog::builtin();
        assert!(catalog.load_species_file(file.path()).is_err());
    }
}
