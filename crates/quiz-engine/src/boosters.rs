use quiz_protocol::PlayerId;

use crate::error::EngineError;
use crate::state::Phase;

/// One kind of one-shot power-up assigned to a player at game start.
///
/// The source models these as a class per booster; here a closed,
/// compile-time-known set of kinds is matched against a small per-kind
/// `apply` function instead — a handler table keyed by variant, not a
/// vtable of trait objects, since the set never grows at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoosterType {
    /// Blocks the target's current submission from counting.
    Nope,
    /// Removes two incorrect options from the activator's own view.
    FiftyFifty,
    /// Extends the activator's personal deadline for the current question.
    LateLock,
    /// Lets the activator resubmit an answer for the current question.
    Wildcard,
    /// Makes a Nope targeted at the holder have no effect.
    Shield,
}

impl BoosterType {
    pub fn valid_phases(self) -> &'static [Phase] {
        match self {
            BoosterType::Nope => &[Phase::Answering],
            BoosterType::FiftyFifty => &[Phase::Question, Phase::Answering],
            BoosterType::LateLock => &[Phase::Answering],
            BoosterType::Wildcard => &[Phase::Answering],
            BoosterType::Shield => &[Phase::Answering],
        }
    }

    pub fn requires_target(self) -> bool {
        matches!(self, BoosterType::Nope)
    }
}

/// The derived, per-question effect of every booster currently active for
/// one player, folded into a single struct the orchestrator consults both
/// when validating an incoming command and when building that player's
/// personal broadcast view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoosterEffect {
    pub is_noped: bool,
    pub removed_options: Vec<String>,
    pub extended_deadline_seconds: u32,
    pub can_change_answer: bool,
    pub shielded: bool,
}

/// A single activation: `activator` used `booster` on `target` (if the
/// booster requires one).
pub struct BoosterActivation {
    pub booster: BoosterType,
    pub activator: PlayerId,
    pub target: Option<PlayerId>,
}

/// Validates and folds a sequence of activations into one effect per
/// affected player. `phase` is the phase the activations are occurring in;
/// an activation invalid for that phase is rejected rather than silently
/// dropped.
pub fn fold_effects(
    activations: &[BoosterActivation],
    phase: Phase,
) -> Result<std::collections::HashMap<PlayerId, BoosterEffect>, EngineError> {
    let mut effects: std::collections::HashMap<PlayerId, BoosterEffect> = std::collections::HashMap::new();

    for activation in activations {
        if !activation.booster.valid_phases().contains(&phase) {
            return Err(EngineError::InvalidState);
        }
        if activation.booster.requires_target() && activation.target.is_none() {
            return Err(EngineError::InvalidState);
        }

        match activation.booster {
            BoosterType::Nope => {
                let target = activation.target.expect("validated above");
                let target_effect = effects.entry(target).or_default();
                if !target_effect.shielded {
                    target_effect.is_noped = true;
                }
            }
            BoosterType::FiftyFifty => {
                effects.entry(activation.activator).or_default();
            }
            BoosterType::LateLock => {
                effects.entry(activation.activator).or_default().extended_deadline_seconds += 15;
            }
            BoosterType::Wildcard => {
                effects.entry(activation.activator).or_default().can_change_answer = true;
            }
            BoosterType::Shield => {
                effects.entry(activation.activator).or_default().shielded = true;
            }
        }
    }

    Ok(effects)
}
