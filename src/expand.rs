use crate::lookup::Lookup;
use std::collections::BTreeMap;

const MAX_MAP_PASSES: usize = 10;

/// Expand `${NAME}` and `${NAME:-default}` in `text`.
///
/// An unset `NAME` without a default becomes empty and `${}` is dropped. An
/// unterminated `${` is left as is. Substituted text is not expanded again.
/// Only the braced form is recognized; a bare `$NAME` stays literal.
pub fn expand<L: Lookup + ?Sized>(text: &str, lookup: &L) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("${") {
        let Some(len) = rest[start + 2..].find('}') else {
            break;
        };
        out.push_str(&rest[..start]);

        let inner = &rest[start + 2..start + 2 + len];
        let (name, default) = match inner.split_once(":-") {
            Some((name, default)) => (name, Some(default)),
            None => (inner, None),
        };
        if !name.is_empty() {
            match lookup.lookup(name) {
                Some(value) => out.push_str(&value),
                None => out.push_str(default.unwrap_or("")),
            }
        }

        rest = &rest[start + 2 + len + 1..];
    }

    out.push_str(rest);
    out
}

/// Expand the values of `vars`, resolving names against `vars` first and
/// `fallback` second. Chains resolve over repeated passes, bounded so that
/// cycles terminate.
pub fn expand_map<L: Lookup + ?Sized>(
    vars: &BTreeMap<String, String>,
    fallback: &L,
) -> BTreeMap<String, String> {
    let mut out = vars.clone();

    for _ in 0..MAX_MAP_PASSES {
        let snapshot = out.clone();
        let chained = Chained {
            first: &snapshot,
            second: fallback,
        };
        let mut stable = true;
        for value in out.values_mut() {
            let expanded = expand(value, &chained);
            if expanded != *value {
                *value = expanded;
                stable = false;
            }
        }
        if stable {
            break;
        }
    }
    out
}

struct Chained<'a, L: ?Sized> {
    first: &'a BTreeMap<String, String>,
    second: &'a L,
}

impl<L: Lookup + ?Sized> Lookup for Chained<'_, L> {
    fn lookup(&self, key: &str) -> Option<String> {
        self.first
            .get(key)
            .cloned()
            .or_else(|| self.second.lookup(key))
    }
}
