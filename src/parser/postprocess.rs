//! Validation passes that run between parsing and execution: input
//! permissions, forbidden button combinations, and the pause-hold cap.

use std::collections::{HashMap, HashSet};

use thiserror::Error;

use crate::data::AccessLevel;

use super::InputPlan;

/// Represents all possible reasons a parsed sequence is refused. The
/// display text is surfaced directly to chat.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("no permission to use input \"{input}\", which requires at least {required} access")]
    PermissionDenied {
        input: String,
        required: AccessLevel,
    },
    #[error("the inputs \"{}\" cannot all be active at once", .combo.join(" + "))]
    ForbiddenCombo { combo: Vec<String> },
    #[error("the pause input cannot be held for longer than {max_ms}ms")]
    PauseDurationExceeded { max_ms: u64 },
}

/// Check every input in the sequence against the input access table.
/// Inputs without an entry are unrestricted. Fails on the first input
/// that requires a higher level than the user has.
pub fn check_input_permissions(
    user_level: AccessLevel,
    plan: &InputPlan,
    access: &HashMap<String, AccessLevel>,
) -> Result<(), ValidationError> {
    for input in plan.inputs() {
        let Some(&required) = access.get(&input.name) else {
            continue;
        };
        if user_level < required {
            return Err(ValidationError::PermissionDenied {
                input: input.name.clone(),
                required,
            });
        }
    }
    Ok(())
}

/// Check the sequence against every forbidden combination. `pressed` is
/// the set of input names currently pressed on the target controller, so
/// a sequence cannot complete a combo that earlier holds started.
pub fn check_button_combos(
    plan: &InputPlan,
    combos: &[Vec<String>],
    pressed: &HashSet<String>,
) -> Result<(), ValidationError> {
    for combo in combos {
        if !combo_allowed(plan, combo, pressed) {
            return Err(ValidationError::ForbiddenCombo {
                combo: combo.clone(),
            });
        }
    }
    Ok(())
}

/// Walk the sequence group by group tracking which combo members would be
/// active at once. `carried` holds members pressed before the sequence
/// plus everything held so far; `current` holds members pressed within
/// the group under inspection. Releases take members back out.
fn combo_allowed(plan: &InputPlan, combo: &[String], pressed: &HashSet<String>) -> bool {
    let mut carried: Vec<&str> = combo
        .iter()
        .filter(|name| pressed.contains(name.as_str()))
        .map(|name| name.as_str())
        .collect();
    let mut current: Vec<&str> = Vec::with_capacity(combo.len());

    // If the full combo is somehow already active, refusing everything
    // would also block the inputs that release it, so keep checking.

    for group in &plan.groups {
        current.clear();

        for input in group {
            if !combo.iter().any(|name| *name == input.name) {
                continue;
            }
            let name = input.name.as_str();

            if !input.release && !current.contains(&name) && !carried.contains(&name) {
                current.push(name);
                if current.len() + carried.len() == combo.len() {
                    return false;
                }
            }

            if input.hold {
                if !carried.contains(&name) {
                    carried.push(name);
                    current.retain(|n| *n != name);
                    if carried.len() + current.len() == combo.len() {
                        return false;
                    }
                }
            } else if input.release {
                carried.retain(|n| *n != name);
            }
        }
    }

    true
}

/// Cap how long the pause input can stay down across the sequence, to
/// keep chat from sitting on a reset button. Accumulates contiguous
/// press/hold time and resets whenever a group leaves the input alone.
pub fn check_pause_duration(
    plan: &InputPlan,
    pause_input: Option<&str>,
    max_hold_ms: Option<u64>,
) -> Result<(), ValidationError> {
    let (Some(pause_input), Some(max_ms)) = (pause_input, max_hold_ms) else {
        return Ok(());
    };

    let mut total: u64 = 0;
    let mut held = false;

    for group in &plan.groups {
        let mut found = false;
        let mut longest_in_group: u64 = 0;
        let mut longest_pause: u64 = 0;

        for input in group {
            longest_in_group = longest_in_group.max(input.duration_ms);

            if input.name != pause_input {
                continue;
            }
            longest_pause = longest_pause.max(input.duration_ms);
            found = true;

            if input.release {
                held = false;
                found = false;
            } else if !held && input.hold {
                held = true;
            }
        }

        if found || held {
            // A hold spans the whole group; a plain press only its own time
            total += if held { longest_in_group } else { longest_pause };
            if total > max_ms {
                return Err(ValidationError::PauseDurationExceeded { max_ms });
            }
        } else {
            total = 0;
        }
    }

    Ok(())
}
