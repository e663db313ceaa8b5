// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Fixed move table.
//!
//! The table is baked in at startup; combatants reference moves by name.

use std::fmt;
use std::str::FromStr;

use super::types::ElementType;

/// Damage category of a move, selecting which stat pair applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Uses Attack vs Defense.
    Physical,
    /// Uses Sp.Attack vs Sp.Defense.
    Special,
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Category::Physical => f.write_str("PHYSICAL"),
            Category::Special => f.write_str("SPECIAL"),
        }
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PHYSICAL" => Ok(Category::Physical),
            "SPECIAL" => Ok(Category::Special),
            other => Err(format!("unknown move category '{}'", other)),
        }
    }
}

/// One entry of the move table.
///
/// The elemental type doubles as the effectiveness-chart row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveData {
    pub name: &'static str,
    pub element: ElementType,
    pub power: u32,
    pub category: Category,
}

use Category::{Physical, Special};
use ElementType as E;

/// The built-in move table, fixed at startup.
#[rustfmt::skip]
pub(super) const MOVE_TABLE: &[MoveData] = &[
    MoveData { name: "Tackle",         element: E::Normal,   power:  40, category: Physical },
    MoveData { name: "Scratch",        element: E::Normal,   power:  40, category: Physical },
    MoveData { name: "Quick Attack",   element: E::Normal,   power:  40, category: Physical },
    MoveData { name: "Slash",          element: E::Normal,   power:  70, category: Physical },
    MoveData { name: "Body Slam",      element: E::Normal,   power:  85, category: Physical },
    MoveData { name: "Skull Bash",     element: E::Normal,   power: 130, category: Physical },
    MoveData { name: "Ember",          element: E::Fire,     power:  40, category: Special  },
    MoveData { name: "Flamethrower",   element: E::Fire,     power:  90, category: Special  },
    MoveData { name: "Fire Blast",     element: E::Fire,     power: 110, category: Special  },
    MoveData { name: "Water Gun",      element: E::Water,    power:  40, category: Special  },
    MoveData { name: "Bubble Beam",    element: E::Water,    power:  65, category: Special  },
    MoveData { name: "Surf",           element: E::Water,    power:  90, category: Special  },
    MoveData { name: "Hydro Pump",     element: E::Water,    power: 110, category: Special  },
    MoveData { name: "Thunder Shock",  element: E::Electric, power:  40, category: Special  },
    MoveData { name: "Thunderbolt",    element: E::Electric, power:  90, category: Special  },
    MoveData { name: "Vine Whip",      element: E::Grass,    power:  45, category: Physical },
    MoveData { name: "Razor Leaf",     element: E::Grass,    power:  55, category: Physical },
    MoveData { name: "Solar Beam",     element: E::Grass,    power: 120, category: Special  },
    MoveData { name: "Ice Beam",       element: E::Ice,      power:  90, category: Special  },
    MoveData { name: "Sludge Bomb",    element: E::Poison,   power:  90, category: Special  },
    MoveData { name: "Earthquake",     element: E::Ground,   power: 100, category: Physical },
    MoveData { name: "Wing Attack",    element: E::Flying,   power:  60, category: Physical },
    MoveData { name: "Psychic",        element: E::Psychic,  power:  90, category: Special  },
    MoveData { name: "Rock Throw",     element: E::Rock,     power:  50, category: Physical },
    MoveData { name: "Shadow Ball",    element: E::Ghost,    power:  80, category: Special  },
    MoveData { name: "Dragon Breath",  element: E::Dragon,   power:  60, category: Special  },
    MoveData { name: "Bite",           element: E::Dark,     power:  60, category: Physical },
    MoveData { name: "Dark Pulse",     element: E::Dark,     power:  80, category: Special  },
    MoveData { name: "Iron Tail",      element: E::Steel,    power: 100, category: Physical },
    MoveData { name: "Dazzling Gleam", element: E::Fairy,    power:  80, category: Special  },
];
