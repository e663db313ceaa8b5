// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Built-in species definitions.

use super::types::ElementType;

/// Raw species row: name, primary, secondary, six stats, known moves.
pub(super) struct SpeciesRow {
    pub name: &'static str,
    pub primary: ElementType,
    pub secondary: Option<ElementType>,
    /// hp, attack, defense, sp_attack, sp_defense, speed
    pub stats: [u32; 6],
    pub moves: &'static [&'static str],
}

use ElementType as E;

#[rustfmt::skip]
pub(super) const SPECIES_TABLE: &[SpeciesRow] = &[
    SpeciesRow { name: "Pikachu",    primary: E::Electric, secondary: None,            stats: [ 35,  55,  40,  50,  50,  90], moves: &["Thunderbolt", "Thunder Shock", "Quick Attack", "Iron Tail"] },
    SpeciesRow { name: "Charmander", primary: E::Fire,     secondary: None,            stats: [ 39,  52,  43,  60,  50,  65], moves: &["Ember", "Flamethrower", "Scratch", "Dragon Breath"] },
    SpeciesRow { name: "Charizard",  primary: E::Fire,     secondary: Some(E::Flying), stats: [ 78,  84,  78, 109,  85, 100], moves: &["Flamethrower", "Fire Blast", "Wing Attack", "Slash"] },
    SpeciesRow { name: "Squirtle",   primary: E::Water,    secondary: None,            stats: [ 44,  48,  65,  50,  64,  43], moves: &["Water Gun", "Bubble Beam", "Tackle", "Bite"] },
    SpeciesRow { name: "Blastoise",  primary: E::Water,    secondary: None,            stats: [ 79,  83, 100,  85, 105,  78], moves: &["Hydro Pump", "Surf", "Bite", "Skull Bash"] },
    SpeciesRow { name: "Bulbasaur",  primary: E::Grass,    secondary: Some(E::Poison), stats: [ 45,  49,  49,  65,  65,  45], moves: &["Vine Whip", "Razor Leaf", "Tackle", "Sludge Bomb"] },
    SpeciesRow { name: "Venusaur",   primary: E::Grass,    secondary: Some(E::Poison), stats: [ 80,  82,  83, 100, 100,  80], moves: &["Razor Leaf", "Solar Beam", "Sludge Bomb", "Body Slam"] },
    SpeciesRow { name: "Gengar",     primary: E::Ghost,    secondary: Some(E::Poison), stats: [ 60,  65,  60, 130,  75, 110], moves: &["Shadow Ball", "Sludge Bomb", "Psychic", "Dark Pulse"] },
    SpeciesRow { name: "Onix",       primary: E::Rock,     secondary: Some(E::Ground), stats: [ 35,  45, 160,  30,  45,  70], moves: &["Rock Throw", "Earthquake", "Tackle", "Iron Tail"] },
    SpeciesRow { name: "Gyarados",   primary: E::Water,    secondary: Some(E::Flying), stats: [ 95, 125,  79,  60, 100,  81], moves: &["Surf", "Hydro Pump", "Bite", "Body Slam"] },
    SpeciesRow { name: "Snorlax",    primary: E::Normal,   secondary: None,            stats: [160, 110,  65,  65, 110,  30], moves: &["Body Slam", "Earthquake", "Surf", "Tackle"] },
    SpeciesRow { name: "Alakazam",   primary: E::Psychic,  secondary: None,            stats: [ 55,  50,  45, 135,  95, 120], moves: &["Psychic", "Shadow Ball", "Dazzling Gleam", "Quick Attack"] },
];
