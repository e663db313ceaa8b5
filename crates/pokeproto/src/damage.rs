// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Deterministic damage computation.
//!
//! Both peers evaluate the same formula over the same inputs and the same
//! shared roll, so their results must agree bit-for-bit. Boost accounting
//! (whether a boost flag is honored) is owned by the battle state machine;
//! this module only applies the outcome.

use crate::catalog::{combined_effectiveness, Category, MoveData, Species};
use crate::config::{BATTLE_LEVEL, BOOST_MULTIPLIER, STAB_MULTIPLIER};

/// Damage of one attack.
///
/// Level-50 formula:
///
/// ```text
/// base   = ((2 * 50 / 5 + 2) * power * atk / def) / 50 + 2
/// damage = floor(base * stab * type_mult * roll)
/// ```
///
/// with `roll` drawn from the shared stream in [0.85, 1.0). The result is
/// clamped to a minimum of 1 unless the defender is immune (type
/// multiplier 0), in which case it is 0.
#[must_use]
pub fn compute(
    mv: &MoveData,
    attacker: &Species,
    defender: &Species,
    atk_boosted: bool,
    def_boosted: bool,
    roll: f64,
) -> u32 {
    let (mut atk_stat, mut def_stat) = match mv.category {
        Category::Special => (
            f64::from(attacker.stats.sp_attack),
            f64::from(defender.stats.sp_defense),
        ),
        Category::Physical => (
            f64::from(attacker.stats.attack),
            f64::from(defender.stats.defense),
        ),
    };
    if atk_boosted {
        atk_stat *= BOOST_MULTIPLIER;
    }
    if def_boosted {
        def_stat *= BOOST_MULTIPLIER;
    }

    let level_term = f64::from(2 * BATTLE_LEVEL / 5 + 2);
    let base = (level_term * f64::from(mv.power) * atk_stat / def_stat) / 50.0 + 2.0;

    let stab = if attacker.has_type(mv.element) {
        STAB_MULTIPLIER
    } else {
        1.0
    };
    let type_mult = combined_effectiveness(mv.element, defender.primary, defender.secondary);

    let damage = (base * stab * type_mult * roll).floor();
    if type_mult == 0.0 {
        0
    } else if damage < 1.0 {
        1
    } else {
        damage as u32
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::Catalog;

    #[test]
    fn test_thunderbolt_vector() {
        // Pikachu (Electric, Sp.Atk 50) uses Thunderbolt (90, SPECIAL)
        // against Charmander (Fire, Sp.Def 50), roll 0.92:
        // base = (22 * 90 * 50 / 50) / 50 + 2 = 41.6
        // floor(41.6 * 1.5 (STAB) * 2.0 (type) * 0.92) = 114
        let catalog = Catalog::builtin();
        let pikachu = catalog.species("Pikachu").expect("species");
        let charmander = catalog.species("Charmander").expect("species");
        let bolt = catalog.move_data("Thunderbolt").expect("move");

        let damage = compute(bolt, pikachu, charmander, false, false, 0.92);
        assert_eq!(damage, 114);

        // Bit-identical across repeated evaluation.
        assert_eq!(damage, compute(bolt, pikachu, charmander, false, false, 0.92));
    }

    #[test]
    fn test_boost_raises_damage() {
        let catalog = Catalog::builtin();
        let pikachu = catalog.species("Pikachu").expect("species");
        let squirtle = catalog.species("Squirtle").expect("species");
        let bolt = catalog.move_data("Thunderbolt").expect("move");

        let plain = compute(bolt, pikachu, squirtle, false, false, 0.9);
        let boosted = compute(bolt, pikachu, squirtle, true, false, 0.9);
        let defended = compute(bolt, pikachu, squirtle, false, true, 0.9);
        assert!(boosted > plain);
        assert!(defended < plain);
    }

    #[test]
    fn test_immunity_yields_zero() {
        let catalog = Catalog::builtin();
        let pikachu = catalog.species("Pikachu").expect("species");
        let onix = catalog.species("Onix").expect("species");
        let bolt = catalog.move_data("Thunderbolt").expect("move");

        // Electric vs Rock/Ground: ground half is immune.
        assert_eq!(compute(bolt, pikachu, onix, false, false, 0.99), 0);
    }

    #[test]
    fn test_minimum_one_when_not_immune() {
        let catalog = Catalog::builtin();
        let charmander = catalog.species("Charmander").expect("species");
        let blastoise = catalog.species("Blastoise").expect("species");
        let ember = catalog.move_data("Ember").expect("move");

        // Weak hit into a resistant, bulky defender still deals at least 1.
        let damage = compute(ember, charmander, blastoise, false, true, 0.85);
        assert!(damage >= 1);
    }

    #[test]
    fn test_quad_effectiveness() {
        let catalog = Catalog::builtin();
        let pikachu = catalog.species("Pikachu").expect("species");
        let gyarados = catalog.species("Gyarados").expect("species");
        let charmander = catalog.species("Charmander").expect("species");
        let bolt = catalog.move_data("Thunderbolt").expect("move");

        // Water/Flying takes 4x from Electric; strictly above the 1x Fire case.
        let quad = compute(bolt, pikachu, gyarados, false, false, 0.9);
        let single = compute(bolt, pikachu, charmander, false, false, 0.9);
        assert!(quad > single);
    }

    #[test]
    fn test_stab_applies() {
        let catalog = Catalog::builtin();
        let pikachu = catalog.species("Pikachu").expect("species");
        let snorlax = catalog.species("Snorlax").expect("species");
        let bolt = catalog.move_data("Thunderbolt").expect("move");

        // Pikachu gets STAB on Thunderbolt: 1.5x over the no-STAB value.
        let with_stab = compute(bolt, pikachu, snorlax, false, false, 0.9);
        let base = (22.0 * 90.0 * 50.0 / f64::from(snorlax.stats.sp_defense)) / 50.0 + 2.0;
        let expected = (base * 1.5 * 1.0 * 0.9).floor() as u32;
        assert_eq!(with_stab, expected);
    }
}
