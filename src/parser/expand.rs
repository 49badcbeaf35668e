//! Message expansion: repeat syntax, macro substitution, and synonyms.
//!
//! Runs before parsing. `[a.]*5` repeats a bracketed sequence, `#jump`
//! substitutes a stored macro (optionally with arguments, `#mash(a,b)`),
//! and synonyms are plain text replacements (e.g. "kappa" becomes the
//! wait input "#").

use std::collections::HashMap;

use crate::config::InputLimits;

/// Hard cap on the expanded message length. Repeats and macros multiply
/// text, and anything past this is already far over the duration limit.
const MAX_EXPANDED_LEN: usize = 65536;

/// Fully expand a chat message: strip whitespace, lowercase, expand
/// repeat syntax once up front, then run macro substitution rounds and
/// synonym replacement. Never fails; text it cannot expand is left in
/// place for the parser to reject.
pub fn expand(
    message: &str,
    macros: &HashMap<String, String>,
    synonyms: &HashMap<String, String>,
    limits: &InputLimits,
) -> String {
    let message: String = message
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase();
    let message = expandify(&message);
    let message = populate_macros(&message, macros, limits);
    apply_synonyms(&message, synonyms)
}

/// Expand bracketed repeat syntax: `[a.]*2` becomes `a.a.`. Repeat counts
/// are one or two digits. Innermost bracket pairs expand first, so nested
/// repeats multiply across iterations. A bracket pair not followed by
/// `*count` is left in place and scanning continues past it.
pub fn expandify(message: &str) -> String {
    let mut message = message.to_string();

    while let Some(repeat) = find_repeat(&message) {
        if message.len() > MAX_EXPANDED_LEN {
            log::warn!("Repeat expansion aborted: message too long");
            break;
        }
        let expanded = repeat.content.repeat(repeat.count);
        message.replace_range(repeat.start..repeat.end, &expanded);
    }

    message
}

struct Repeat {
    /// Byte range of the whole `[...]*N` token
    start: usize,
    end: usize,
    content: String,
    count: usize,
}

/// Find the first complete repeat token in the message. The content of a
/// pair never contains brackets, so tracking the most recent `[` pairs
/// innermost-first.
fn find_repeat(message: &str) -> Option<Repeat> {
    let bytes = message.as_bytes();
    let mut open: Option<usize> = None;

    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            b'[' => open = Some(i),
            b']' => {
                let Some(start) = open.take() else {
                    i += 1;
                    continue;
                };
                // Count digits after "]*", capped at two
                let mut digits = 0;
                if bytes.get(i + 1) == Some(&b'*') {
                    while digits < 2 && bytes.get(i + 2 + digits).is_some_and(u8::is_ascii_digit)
                    {
                        digits += 1;
                    }
                }
                if digits == 0 {
                    // Not a repeat; leave the pair alone
                    i += 1;
                    continue;
                }
                let end = i + 2 + digits;
                let count = message[i + 2..end].parse().unwrap_or(0);
                return Some(Repeat {
                    start,
                    end,
                    content: message[start + 1..i].to_string(),
                    count,
                });
            }
            _ => (),
        }
        i += 1;
    }

    None
}

/// Run macro substitution rounds until the message stops changing or the
/// round cap is hit, so self-referential macros always terminate. Returns
/// the (possibly partially) expanded message.
pub fn populate_macros(
    message: &str,
    macros: &HashMap<String, String>,
    limits: &InputLimits,
) -> String {
    let mut message = message.to_string();

    for _ in 0..limits.max_macro_recursion {
        if message.len() > MAX_EXPANDED_LEN {
            log::warn!("Macro expansion aborted: message too long");
            break;
        }
        let invocations = find_invocations(&message, macros);
        if invocations.is_empty() {
            break;
        }
        // Replace back to front so earlier spans stay valid
        for (range, replacement) in invocations.into_iter().rev() {
            message.replace_range(range, &replacement);
        }
    }

    message
}

/// Scan for macro invocations and resolve each against the macro table,
/// preferring the longest known macro name that prefixes the invocation.
/// Returns non-overlapping spans in ascending order with their
/// replacement text.
fn find_invocations(
    message: &str,
    macros: &HashMap<String, String>,
) -> Vec<(std::ops::Range<usize>, String)> {
    let bytes = message.as_bytes();
    let mut found = Vec::new();

    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] != b'#' {
            i += 1;
            continue;
        }

        // Identifier after '#'; a bare '#' is the wait input
        let name_start = i + 1;
        let mut j = name_start;
        while j < bytes.len() && bytes[j].is_ascii_alphanumeric() {
            j += 1;
        }
        if j == name_start {
            i += 1;
            continue;
        }

        // Optional parenthesized argument list
        let mut args: Vec<&str> = Vec::new();
        let mut args_end = j;
        if bytes.get(j) == Some(&b'(') {
            if let Some(close) = message[j..].find(')') {
                args = message[j + 1..j + close].split(',').collect();
                args_end = j + close + 1;
            }
        }

        // Arguments compare against stored names like "#mash(*,*)"
        let token = &message[i..j];
        let generic = if args.is_empty() {
            token.to_string()
        } else {
            format!("{token}({})", vec!["*"; args.len()].join(","))
        };

        let mut matched: Option<&String> = None;
        for name in macros.keys() {
            if generic.starts_with(name.as_str())
                && matched.is_none_or(|m| name.len() > m.len())
            {
                matched = Some(name);
            }
        }
        let Some(name) = matched else {
            i = j;
            continue;
        };

        let takes_args = name.contains('(');
        let template = &macros[name];
        if takes_args {
            found.push((i..args_end, populate_variables(template, &args)));
            i = args_end;
        } else {
            let end = i + name.len();
            found.push((i..end, template.clone()));
            i = end;
        }
    }

    found
}

/// Interpolate positional arguments into a macro template: `<0>` is
/// replaced with the first argument, `<1>` with the second, and so on.
fn populate_variables(template: &str, args: &[&str]) -> String {
    let mut populated = template.to_string();
    for (idx, arg) in args.iter().enumerate() {
        populated = populated.replace(&format!("<{idx}>"), arg);
    }
    populated
}

/// Apply synonym replacements. Synonyms are independent single words, so
/// replacement order does not matter.
fn apply_synonyms(message: &str, synonyms: &HashMap<String, String>) -> String {
    let mut message = message.to_string();
    for (word, replacement) in synonyms {
        message = message.replace(word.as_str(), replacement.as_str());
    }
    message
}
