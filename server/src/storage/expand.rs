//! Shell-style value expansion within a single environment block.
//!
//! References look like `$NAME` or `${NAME}` and resolve against sibling
//! keys of the same block only; the process environment is never consulted.
//! Expansion is a single pass: a reference inside a substituted value is
//! not re-expanded, which bounds the work and makes mutually-referential
//! keys harmless. Unresolvable references are kept as literal text.

use shared_types::EnvConfig;

/// Returns a copy of `block` with every value expanded against the raw
/// values of its siblings.
pub fn expand_block(block: &EnvConfig) -> EnvConfig {
    block
        .iter()
        .map(|(key, value)| (key.clone(), expand_value(value, block)))
        .collect()
}

fn expand_value(raw: &str, block: &EnvConfig) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(pos) = rest.find('$') {
        out.push_str(&rest[..pos]);
        let tail = &rest[pos..];
        match parse_reference(tail) {
            Some((name, len)) => {
                match block.get(name) {
                    Some(value) => out.push_str(value),
                    // Unknown key: keep the reference verbatim.
                    None => out.push_str(&tail[..len]),
                }
                rest = &tail[len..];
            }
            None => {
                out.push('$');
                rest = &tail[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Parses a reference at the start of `token` (which begins with `$`).
/// Returns the referenced name and the byte length of the whole token,
/// or `None` when the `$` does not introduce a valid reference.
fn parse_reference(token: &str) -> Option<(&str, usize)> {
    let body = &token[1..];
    if let Some(inner) = body.strip_prefix('{') {
        let end = inner.find('}')?;
        let name = &inner[..end];
        if is_valid_name(name) {
            // "${" + name + "}"
            Some((name, name.len() + 3))
        } else {
            None
        }
    } else {
        let len = leading_name_len(body);
        if len == 0 {
            None
        } else {
            Some((&body[..len], len + 1))
        }
    }
}

fn is_valid_name(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c == '_' || c.is_ascii_alphabetic() => {}
        _ => return false,
    }
    chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
}

/// Length of the longest valid reference name at the start of `s`.
fn leading_name_len(s: &str) -> usize {
    let mut len = 0;
    for (i, c) in s.char_indices() {
        let valid = if i == 0 {
            c == '_' || c.is_ascii_alphabetic()
        } else {
            c == '_' || c.is_ascii_alphanumeric()
        };
        if !valid {
            break;
        }
        len = i + c.len_utf8();
    }
    len
}

#[cfg(test)]
mod tests {
    use super::*;

    fn block(pairs: &[(&str, &str)]) -> EnvConfig {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect()
    }

    #[test]
    fn resolves_plain_reference() {
        let input = block(&[("A", "1"), ("B", "$A-suffix")]);
        let expanded = expand_block(&input);
        assert_eq!(expanded["B"], "1-suffix");
        assert_eq!(expanded["A"], "1");
    }

    #[test]
    fn resolves_braced_reference() {
        let input = block(&[("HOST", "db.internal"), ("URL", "postgres://${HOST}:5432")]);
        let expanded = expand_block(&input);
        assert_eq!(expanded["URL"], "postgres://db.internal:5432");
    }

    #[test]
    fn unresolved_reference_stays_literal() {
        let input = block(&[("B", "$MISSING")]);
        let expanded = expand_block(&input);
        assert_eq!(expanded["B"], "$MISSING");

        let input = block(&[("B", "x-${ALSO_MISSING}-y")]);
        let expanded = expand_block(&input);
        assert_eq!(expanded["B"], "x-${ALSO_MISSING}-y");
    }

    #[test]
    fn single_pass_does_not_recurse() {
        let input = block(&[("A", "$B"), ("B", "$A")]);
        let expanded = expand_block(&input);
        assert_eq!(expanded["A"], "$A");
        assert_eq!(expanded["B"], "$B");

        let input = block(&[("A", "x"), ("B", "$A"), ("C", "$B")]);
        let expanded = expand_block(&input);
        // C picks up B's raw value, not B's expanded value.
        assert_eq!(expanded["C"], "$A");
    }

    #[test]
    fn dollar_without_name_is_literal() {
        let input = block(&[("PRICE", "$5"), ("END", "trailing$"), ("BRACE", "${")]);
        let expanded = expand_block(&input);
        assert_eq!(expanded["PRICE"], "$5");
        assert_eq!(expanded["END"], "trailing$");
        assert_eq!(expanded["BRACE"], "${");
    }

    #[test]
    fn multiple_references_in_one_value() {
        let input = block(&[("A", "1"), ("B", "2"), ("C", "$A and ${B} and $A")]);
        let expanded = expand_block(&input);
        assert_eq!(expanded["C"], "1 and 2 and 1");
    }

    #[test]
    fn never_consults_process_environment() {
        // PATH exists in the process environment of any test run.
        let input = block(&[("X", "$PATH")]);
        let expanded = expand_block(&input);
        assert_eq!(expanded["X"], "$PATH");
    }
}
