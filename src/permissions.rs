//! # Privilege Management Rules
//!
//! Decides which privilege changes an acting administrator may apply to
//! another user. The backend enforces the same rules; the client uses them
//! to decide which level-change actions to offer and enable.
//!
//! ## Rules
//!
//! - Moving a user to the level they already hold is never an action.
//! - A superuser (rank 0) may move anyone to any other level.
//! - A senior admin (rank 1) may only move users between the two lower tiers
//!   (ranks 2 and 3). They cannot touch peers or superiors, and cannot
//!   promote anyone to their own tier or above.
//! - Everyone else has no privilege-management capability.

use crate::models::{UserLevel, UserRank};

/// Returns whether `actor` may move a user from `target` to `proposed`.
pub fn can_change_level(actor: UserRank, target: UserRank, proposed: UserRank) -> bool {
    if proposed == target {
        return false;
    }

    match actor {
        UserRank::SUPERUSER => true,
        UserRank::SENIOR_ADMIN => target.min(proposed) > UserRank::SENIOR_ADMIN,
        _ => false,
    }
}

/// Levels the actor may move the target to, in display order.
pub fn level_options(actor: UserRank, target: UserRank) -> Vec<UserLevel> {
    UserLevel::ALL
        .into_iter()
        .filter(|level| can_change_level(actor, target, level.rank()))
        .collect()
}

/// Whether the apply action should be enabled for the tentatively selected level.
pub fn can_apply_level(actor: UserRank, target: UserRank, selected: Option<UserLevel>) -> bool {
    selected.is_some_and(|level| can_change_level(actor, target, level.rank()))
}
