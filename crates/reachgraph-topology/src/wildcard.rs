//! Single-field wildcard matching for firewall rules.

use std::fmt;

use reachgraph_core::WILDCARD;

/// The value a field resolves to once a rule admits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Restriction<'a> {
    /// Both sides were wildcards; rendered as the solver's `_`.
    Unconstrained,
    Value(&'a str),
}

impl fmt::Display for Restriction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unconstrained => f.write_str("_"),
            Self::Value(v) => f.write_str(v),
        }
    }
}

/// Intersect a candidate value with a rule field. `None` means the rule rejects.
pub fn restrict<'a>(x: &'a str, y: &'a str) -> Option<Restriction<'a>> {
    match (x == WILDCARD, y == WILDCARD) {
        (true, true) => Some(Restriction::Unconstrained),
        (true, false) => Some(Restriction::Value(y)),
        (false, true) => Some(Restriction::Value(x)),
        (false, false) if x == y => Some(Restriction::Value(x)),
        (false, false) => None,
    }
}
