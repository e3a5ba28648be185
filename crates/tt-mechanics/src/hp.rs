//! Hit point transitions.
//!
//! Every function is pure: it takes the current [`HitPoints`] and returns
//! the next state. Arithmetic saturates, negative damage and healing
//! amounts count as zero, and current HP never rises above maximum.

use std::fmt;

use tt_core::HitPoints;

/// Set the maximum. Current HP is lowered to the new maximum if needed.
/// A negative maximum is treated as 0.
pub fn set_max_hp(hp: HitPoints, new_max: i32) -> HitPoints {
    let max = new_max.max(0);
    HitPoints {
        current: hp.current.min(max),
        max,
        temp: hp.temp,
    }
}

/// Set current HP, clamped into `[0, max]`.
pub fn set_current_hp(hp: HitPoints, value: i32) -> HitPoints {
    HitPoints {
        current: value.clamp(0, hp.max.max(0)),
        ..hp
    }
}

/// Set temporary HP, floored at 0.
pub fn set_temp_hp(hp: HitPoints, value: i32) -> HitPoints {
    HitPoints {
        temp: Some(value.max(0)),
        ..hp
    }
}

/// Apply damage. Temporary HP absorbs damage first; the remainder comes
/// off current HP, which stops at 0.
pub fn damage(hp: HitPoints, amount: i32) -> HitPoints {
    let amount = amount.max(0);
    let absorbed = hp.temp_or_zero().max(0).min(amount);
    let remaining = amount - absorbed;
    HitPoints {
        current: hp.current.saturating_sub(remaining).max(0),
        max: hp.max,
        temp: hp.temp.map(|t| t - absorbed),
    }
}

/// Heal current HP up to maximum. Temporary HP is never restored.
pub fn heal(hp: HitPoints, amount: i32) -> HitPoints {
    let amount = amount.max(0);
    HitPoints {
        current: hp.current.saturating_add(amount).min(hp.max),
        ..hp
    }
}

/// A single hit point transition, for callers that dispatch on user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HpChange {
    /// See [`set_max_hp`].
    SetMax(i32),
    /// See [`set_current_hp`].
    SetCurrent(i32),
    /// See [`set_temp_hp`].
    SetTemp(i32),
    /// See [`damage`].
    Damage(i32),
    /// See [`heal`].
    Heal(i32),
}

impl HpChange {
    /// Compute the next hit point state.
    pub fn apply(self, hp: HitPoints) -> HitPoints {
        match self {
            Self::SetMax(v) => set_max_hp(hp, v),
            Self::SetCurrent(v) => set_current_hp(hp, v),
            Self::SetTemp(v) => set_temp_hp(hp, v),
            Self::Damage(v) => damage(hp, v),
            Self::Heal(v) => heal(hp, v),
        }
    }
}

impl fmt::Display for HpChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetMax(v) => write!(f, "max HP set to {v}"),
            Self::SetCurrent(v) => write!(f, "HP set to {v}"),
            Self::SetTemp(v) => write!(f, "temp HP set to {v}"),
            Self::Damage(v) => write!(f, "{v} damage"),
            Self::Heal(v) => write!(f, "healed {v}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn hp(current: i32, max: i32, temp: Option<i32>) -> HitPoints {
        HitPoints { current, max, temp }
    }

    #[test]
    fn temp_absorbs_damage_first() {
        let next = damage(hp(10, 20, Some(5)), 8);
        assert_eq!(next, hp(7, 20, Some(0)));
    }

    #[test]
    fn damage_smaller_than_temp() {
        let next = damage(hp(10, 20, Some(5)), 3);
        assert_eq!(next, hp(10, 20, Some(2)));
    }

    #[test]
    fn damage_floors_at_zero() {
        assert_eq!(damage(hp(4, 20, None), 50), hp(0, 20, None));
    }

    #[test]
    fn negative_damage_is_ignored() {
        assert_eq!(damage(hp(4, 20, Some(2)), -10), hp(4, 20, Some(2)));
    }

    #[test]
    fn heal_caps_at_max_and_leaves_temp() {
        assert_eq!(heal(hp(15, 20, Some(0)), 10), hp(20, 20, Some(0)));
    }

    #[test]
    fn damage_then_heal_does_not_restore_temp() {
        let start = hp(10, 20, Some(5));
        let next = heal(damage(start, 8), 8);
        assert_eq!(next.temp, Some(0));
        assert_eq!(next.current, 15);
    }

    #[test]
    fn set_max_lowers_current() {
        assert_eq!(set_max_hp(hp(18, 20, None), 12), hp(12, 12, None));
        assert_eq!(set_max_hp(hp(8, 20, None), 30), hp(8, 30, None));
    }

    #[test]
    fn set_max_floors_at_zero() {
        assert_eq!(set_max_hp(hp(8, 20, None), -5), hp(0, 0, None));
    }

    #[test]
    fn set_current_clamps() {
        assert_eq!(set_current_hp(hp(5, 20, None), 99).current, 20);
        assert_eq!(set_current_hp(hp(5, 20, None), -3).current, 0);
        assert_eq!(set_current_hp(hp(5, 20, None), 11).current, 11);
    }

    #[test]
    fn set_temp_floors() {
        assert_eq!(set_temp_hp(hp(5, 20, None), -4).temp, Some(0));
        assert_eq!(set_temp_hp(hp(5, 20, None), 6).temp, Some(6));
    }

    #[test]
    fn hp_change_dispatch() {
        let start = hp(10, 20, Some(5));
        assert_eq!(HpChange::Damage(8).apply(start), damage(start, 8));
        assert_eq!(HpChange::SetMax(5).apply(start).current, 5);
        assert_eq!(HpChange::Damage(8).to_string(), "8 damage");
    }

    fn valid_hp() -> impl Strategy<Value = HitPoints> {
        (0i32..500, 0i32..500, proptest::option::of(0i32..100)).prop_map(|(a, b, temp)| {
            HitPoints {
                current: a.min(b),
                max: a.max(b),
                temp,
            }
        })
    }

    proptest! {
        #[test]
        fn set_max_then_set_current_stays_in_bounds(
            start in valid_hp(),
            new_max in -1000i32..1000,
            value in -1000i32..1000,
        ) {
            let next = set_current_hp(set_max_hp(start, new_max), value);
            prop_assert!(0 <= next.current);
            prop_assert!(next.current <= next.max);
        }

        #[test]
        fn damage_and_heal_preserve_bounds(
            start in valid_hp(),
            dmg in -100i32..1000,
            amount in -100i32..1000,
        ) {
            let hurt = damage(start, dmg);
            prop_assert!(hurt.current >= 0 && hurt.current <= hurt.max);
            prop_assert!(hurt.temp_or_zero() >= 0);
            let healed = heal(hurt, amount);
            prop_assert!(healed.current >= hurt.current && healed.current <= healed.max);
            prop_assert_eq!(healed.temp, hurt.temp);
        }
    }
}
