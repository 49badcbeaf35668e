//! Parses chat text into timed input sequences.
//!
//! A message is a run of inputs, each an optional `_` (hold) or `-`
//! (release) modifier, an input name from the active console, an optional
//! percent (`a50%`), and an optional duration (`a500ms`, `a1s`). `+` chains
//! inputs into a group that is pressed simultaneously; anything else starts
//! the next group. `#` and `.` are waits that consume time only.

pub mod expand;
pub mod postprocess;

#[cfg(test)]
pub mod expand_test;

use thiserror::Error;

use crate::config::InputLimits;
use crate::console::ConsoleKind;

/// Longest snippet of unparseable text echoed back in errors
const ERROR_SNIPPET_LEN: usize = 16;

/// Represents all possible errors parsing an input sequence. The display
/// text is surfaced directly to chat.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("invalid input at position {position}: \"{snippet}\"")]
    InvalidInput { position: usize, snippet: String },
    #[error("invalid percentage for input \"{name}\"")]
    InvalidPercentage { name: String },
    #[error("duration for input \"{name}\" is missing a unit (ms or s)")]
    DurationTypeUnspecified { name: String },
    #[error("input sequence exceeds the maximum duration of {max_ms}ms")]
    DurationExceeded { max_ms: u64 },
}

/// One parsed input: a named control with press strength and timing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    pub name: String,
    /// Keep the input pressed when its group ends
    pub hold: bool,
    /// Release the input instead of pressing it
    pub release: bool,
    /// Press strength in percent (0-100)
    pub percent: u32,
    /// How long the input stays pressed, in milliseconds
    pub duration_ms: u64,
}

impl Input {
    fn with_defaults(limits: &InputLimits) -> Self {
        Self {
            name: String::new(),
            hold: false,
            release: false,
            percent: 100,
            duration_ms: limits.default_input_duration_ms,
        }
    }
}

/// A parsed input sequence: ordered groups of simultaneous inputs. A
/// group lasts as long as its longest member; groups run back to back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputPlan {
    pub groups: Vec<Vec<Input>>,
    /// Sum of every group's longest duration, in milliseconds
    pub total_duration_ms: u64,
}

impl InputPlan {
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Iterate over every input in every group, in order.
    pub fn inputs(&self) -> impl Iterator<Item = &Input> {
        self.groups.iter().flatten()
    }
}

/// Parse a fully expanded message into an [InputPlan] for the given
/// console. The running duration (sum of group maximums) is checked
/// against the limits as groups close, so an over-long sequence fails
/// fast.
pub fn parse(
    message: &str,
    console: ConsoleKind,
    limits: &InputLimits,
) -> Result<InputPlan, ParseError> {
    let message: String = message
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();

    let valid_inputs = console.valid_inputs();
    let mut plan = InputPlan::default();
    let mut group: Vec<Input> = Vec::new();
    let mut group_duration: u64 = 0;
    let mut total: u64 = 0;
    let mut pos = 0;

    while pos < message.len() {
        let (input, consumed) = parse_one(&message[pos..], pos, valid_inputs, limits)?;
        pos += consumed;
        group_duration = group_duration.max(input.duration_ms);
        group.push(input);

        // '+' chains the next input into the same group. A trailing '+'
        // is ignored.
        if message.as_bytes().get(pos) == Some(&b'+') {
            pos += 1;
            continue;
        }

        total = total.saturating_add(group_duration);
        if total > limits.max_input_duration_ms {
            return Err(ParseError::DurationExceeded {
                max_ms: limits.max_input_duration_ms,
            });
        }
        plan.groups.push(std::mem::take(&mut group));
        group_duration = 0;
    }

    // A trailing '+' leaves the last group unclosed
    if !group.is_empty() {
        total = total.saturating_add(group_duration);
        if total > limits.max_input_duration_ms {
            return Err(ParseError::DurationExceeded {
                max_ms: limits.max_input_duration_ms,
            });
        }
        plan.groups.push(group);
    }

    plan.total_duration_ms = total;
    Ok(plan)
}

/// Parse a single input at the start of `text`. Returns the input and how
/// many bytes it consumed. `offset` is only used for error positions.
fn parse_one(
    text: &str,
    offset: usize,
    valid_inputs: &[&str],
    limits: &InputLimits,
) -> Result<(Input, usize), ParseError> {
    let mut input = Input::with_defaults(limits);
    let bytes = text.as_bytes();
    let mut pos = 0;

    match bytes.first() {
        Some(b'_') => {
            input.hold = true;
            pos += 1;
        }
        Some(b'-') => {
            input.release = true;
            pos += 1;
        }
        _ => (),
    }

    // Try every valid input name, keeping the longest match so that
    // e.g. "ls1" never tokenizes as "l" followed by garbage.
    let rest = &text[pos..];
    let mut matched: Option<&str> = None;
    for name in valid_inputs {
        if rest.starts_with(name) && matched.is_none_or(|m| name.len() > m.len()) {
            matched = Some(name);
        }
    }
    // Report failures at the start of the token so a leading modifier on
    // ordinary chat ("-hello") still counts as position 0.
    let Some(name) = matched else {
        return Err(ParseError::InvalidInput {
            position: offset,
            snippet: text.chars().take(ERROR_SNIPPET_LEN).collect(),
        });
    };
    input.name = name.to_string();
    pos += name.len();

    // Percent: digits immediately followed by '%'
    let digits = count_digits(&bytes[pos..]);
    if digits > 0 && bytes.get(pos + digits) == Some(&b'%') {
        let percent: u32 = text[pos..pos + digits].parse().unwrap_or(u32::MAX);
        if percent > 100 {
            return Err(ParseError::InvalidPercentage { name: input.name });
        }
        input.percent = percent;
        pos += digits + 1;
    }

    // Duration: digits immediately followed by "ms" or "s"
    let digits = count_digits(&bytes[pos..]);
    if digits > 0 {
        // Absurdly long digit runs saturate and get caught by the
        // running duration check.
        let number: u64 = text[pos..pos + digits].parse().unwrap_or(u64::MAX);
        let unit = &text[pos + digits..];
        if unit.starts_with("ms") {
            input.duration_ms = number;
            pos += digits + 2;
        } else if unit.starts_with('s') {
            input.duration_ms = number.saturating_mul(1000);
            pos += digits + 1;
        } else {
            return Err(ParseError::DurationTypeUnspecified { name: input.name });
        }
    }

    Ok((input, pos))
}

fn count_digits(bytes: &[u8]) -> usize {
    bytes.iter().take_while(|b| b.is_ascii_digit()).count()
}
