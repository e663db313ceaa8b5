// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Elemental types and the static effectiveness chart.

use std::fmt;
use std::str::FromStr;

/// Elemental type of a combatant or move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(usize)]
pub enum ElementType {
    Normal,
    Fire,
    Water,
    Electric,
    Grass,
    Ice,
    Fighting,
    Poison,
    Ground,
    Flying,
    Psychic,
    Bug,
    Rock,
    Ghost,
    Dragon,
    Dark,
    Steel,
    Fairy,
}

/// Number of elemental types (chart dimension).
pub const TYPE_COUNT: usize = 18;

impl ElementType {
    /// All types, in chart row/column order.
    pub const ALL: [ElementType; TYPE_COUNT] = [
        ElementType::Normal,
        ElementType::Fire,
        ElementType::Water,
        ElementType::Electric,
        ElementType::Grass,
        ElementType::Ice,
        ElementType::Fighting,
        ElementType::Poison,
        ElementType::Ground,
        ElementType::Flying,
        ElementType::Psychic,
        ElementType::Bug,
        ElementType::Rock,
        ElementType::Ghost,
        ElementType::Dragon,
        ElementType::Dark,
        ElementType::Steel,
        ElementType::Fairy,
    ];

    /// Chart index of this type.
    #[inline]
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Canonical display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            ElementType::Normal => "Normal",
            ElementType::Fire => "Fire",
            ElementType::Water => "Water",
            ElementType::Electric => "Electric",
            ElementType::Grass => "Grass",
            ElementType::Ice => "Ice",
            ElementType::Fighting => "Fighting",
            ElementType::Poison => "Poison",
            ElementType::Ground => "Ground",
            ElementType::Flying => "Flying",
            ElementType::Psychic => "Psychic",
            ElementType::Bug => "Bug",
            ElementType::Rock => "Rock",
            ElementType::Ghost => "Ghost",
            ElementType::Dragon => "Dragon",
            ElementType::Dark => "Dark",
            ElementType::Steel => "Steel",
            ElementType::Fairy => "Fairy",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ElementType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ElementType::ALL
            .iter()
            .copied()
            .find(|t| t.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| format!("unknown elemental type '{}'", s))
    }
}

// =======================================================================
// Effectiveness Chart
// =======================================================================

/// Attacker-type x defender-type multiplier chart.
///
/// Row = attacking move type, column = defending type, both in
/// [`ElementType::ALL`] order. Entries are restricted to {0, 0.5, 1, 2};
/// dual-typed defenders multiply two lookups.
#[rustfmt::skip]
const TYPE_CHART: [[f64; TYPE_COUNT]; TYPE_COUNT] = [
    //        Nor  Fir  Wat  Ele  Gra  Ice  Fig  Poi  Gro  Fly  Psy  Bug  Roc  Gho  Dra  Dar  Ste  Fai
    /* Nor */ [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 0.0, 1.0, 1.0, 0.5, 1.0],
    /* Fir */ [1.0, 0.5, 0.5, 1.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 0.5, 1.0, 0.5, 1.0, 2.0, 1.0],
    /* Wat */ [1.0, 2.0, 0.5, 1.0, 0.5, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5, 1.0, 1.0, 1.0],
    /* Ele */ [1.0, 2.0, 2.0, 0.5, 0.5, 1.0, 1.0, 1.0, 0.0, 2.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0],
    /* Gra */ [1.0, 0.5, 2.0, 1.0, 0.5, 1.0, 1.0, 0.5, 2.0, 0.5, 1.0, 0.5, 2.0, 1.0, 0.5, 1.0, 0.5, 1.0],
    /* Ice */ [1.0, 0.5, 0.5, 1.0, 2.0, 0.5, 1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5, 1.0],
    /* Fig */ [2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5, 1.0, 0.5, 0.5, 0.5, 2.0, 0.0, 1.0, 2.0, 2.0, 0.5],
    /* Poi */ [1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 0.5, 0.5, 1.0, 1.0, 1.0, 0.5, 0.5, 1.0, 1.0, 0.0, 2.0],
    /* Gro */ [1.0, 2.0, 1.0, 2.0, 0.5, 1.0, 1.0, 2.0, 1.0, 0.0, 1.0, 0.5, 2.0, 1.0, 1.0, 1.0, 2.0, 1.0],
    /* Fly */ [1.0, 1.0, 1.0, 0.5, 2.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 2.0, 0.5, 1.0, 1.0, 1.0, 0.5, 1.0],
    /* Psy */ [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 0.0, 0.5, 1.0],
    /* Bug */ [1.0, 0.5, 1.0, 1.0, 2.0, 1.0, 0.5, 0.5, 1.0, 0.5, 2.0, 1.0, 1.0, 0.5, 1.0, 2.0, 0.5, 0.5],
    /* Roc */ [1.0, 2.0, 1.0, 1.0, 1.0, 2.0, 0.5, 1.0, 0.5, 2.0, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0],
    /* Gho */ [0.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 1.0, 0.5, 1.0, 1.0],
    /* Dra */ [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 0.5, 0.0],
    /* Dar */ [1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 0.5, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 2.0, 1.0, 0.5, 1.0, 0.5],
    /* Ste */ [1.0, 0.5, 0.5, 0.5, 1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 1.0, 1.0, 1.0, 0.5, 2.0],
    /* Fai */ [1.0, 0.5, 1.0, 1.0, 1.0, 1.0, 2.0, 0.5, 1.0, 1.0, 1.0, 1.0, 1.0, 1.0, 2.0, 2.0, 0.5, 1.0],
];

/// Single-type effectiveness lookup.
#[inline]
#[must_use]
pub fn effectiveness(attacker: ElementType, defender: ElementType) -> f64 {
    TYPE_CHART[attacker.index()][defender.index()]
}

/// Combined effectiveness against a possibly dual-typed defender.
///
/// The dual-type case is the product of two single lookups, producing
/// values in {0, 0.25, 0.5, 1, 2, 4}.
#[must_use]
pub fn combined_effectiveness(
    attacker: ElementType,
    primary: ElementType,
    secondary: Option<ElementType>,
) -> f64 {
    let base = effectiveness(attacker, primary);
    match secondary {
        Some(second) => base * effectiveness(attacker, second),
        None => base,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chart_entries_are_legal_multipliers() {
        for row in &TYPE_CHART {
            for &mult in row {
                assert!(
                    mult == 0.0 || mult == 0.5 || mult == 1.0 || mult == 2.0,
                    "illegal multiplier {}",
                    mult
                );
            }
        }
    }

    #[test]
    fn test_known_matchups() {
        assert_eq!(effectiveness(ElementType::Electric, ElementType::Fire), 2.0);
        assert_eq!(effectiveness(ElementType::Electric, ElementType::Ground), 0.0);
        assert_eq!(effectiveness(ElementType::Water, ElementType::Fire), 2.0);
        assert_eq!(effectiveness(ElementType::Normal, ElementType::Ghost), 0.0);
        assert_eq!(effectiveness(ElementType::Fire, ElementType::Water), 0.5);
    }

    #[test]
    fn test_dual_type_product() {
        // Electric vs Water/Flying: 2 x 2 = 4
        let quad = combined_effectiveness(
            ElementType::Electric,
            ElementType::Water,
            Some(ElementType::Flying),
        );
        assert_eq!(quad, 4.0);

        // Grass vs Grass/Poison: 0.5 x 0.5 = 0.25
        let quarter = combined_effectiveness(
            ElementType::Grass,
            ElementType::Grass,
            Some(ElementType::Poison),
        );
        assert_eq!(quarter, 0.25);

        // Ground vs Rock/Flying: 2 x 0 = 0
        let immune = combined_effectiveness(
            ElementType::Ground,
            ElementType::Rock,
            Some(ElementType::Flying),
        );
        assert_eq!(immune, 0.0);
    }

    #[test]
    fn test_parse_roundtrip() {
        for t in ElementType::ALL {
            let parsed: ElementType = t.name().parse().expect("canonical name parses");
            assert_eq!(parsed, t);
        }
        assert!("Shadow".parse::<ElementType>().is_err());
    }
}
