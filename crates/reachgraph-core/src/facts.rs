//! Fact lines handed to the external logic solver.
//!
//! A [`FactSet`] is append-only and de-duplicating: pushing a fact that is
//! already present is a no-op, so the rendered document never repeats a line.

use std::collections::{BTreeSet, HashSet};
use std::fmt;

use crate::types::Clause;

/// "Host `source` can reach host `dest` over `protocol`:`port`."
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Hacl {
    pub source: String,
    pub dest: String,
    pub protocol: String,
    pub port: String,
}

impl fmt::Display for Hacl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hacl({},{},{},{}).",
            self.source, self.dest, self.protocol, self.port
        )
    }
}

/// One line of the solver input.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Fact {
    /// `attackerLocated(<location>).`
    AttackerLocated(String),
    /// `attackGoal(<goal>).`
    AttackGoal(String),
    /// Any two hosts sharing a subnet label reach each other on any protocol/port.
    SameSubnetAxiom,
    /// A machine record rendered as a clause.
    Clause(Clause),
    /// `inSubnet(<machine>,<label>).`
    InSubnet { machine: String, subnet: String },
    Hacl(Hacl),
}

impl fmt::Display for Fact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AttackerLocated(loc) => write!(f, "attackerLocated({loc})."),
            Self::AttackGoal(goal) => write!(f, "attackGoal({goal})."),
            Self::SameSubnetAxiom => {
                write!(f, "hacl(X,Y,_,_):-\n\tinSubnet(X,S),\n\tinSubnet(Y,S).")
            }
            Self::Clause(c) => c.fmt(f),
            Self::InSubnet { machine, subnet } => write!(f, "inSubnet({machine},{subnet})."),
            Self::Hacl(h) => h.fmt(f),
        }
    }
}

/// Ordered, de-duplicated collection of facts produced by one compile.
#[derive(Debug, Clone, Default)]
pub struct FactSet {
    lines: Vec<Fact>,
    seen: HashSet<Fact>,
}

impl FactSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fact. Returns `false` if an identical fact was already present.
    pub fn push(&mut self, fact: Fact) -> bool {
        if self.seen.contains(&fact) {
            return false;
        }
        self.seen.insert(fact.clone());
        self.lines.push(fact);
        true
    }

    pub fn extend<I: IntoIterator<Item = Fact>>(&mut self, facts: I) {
        for fact in facts {
            self.push(fact);
        }
    }

    pub fn contains(&self, fact: &Fact) -> bool {
        self.seen.contains(fact)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Fact> {
        self.lines.iter()
    }

    pub fn hacl(&self) -> impl Iterator<Item = &Hacl> {
        self.lines.iter().filter_map(|f| match f {
            Fact::Hacl(h) => Some(h),
            _ => None,
        })
    }

    pub fn in_subnet(&self) -> impl Iterator<Item = (&str, &str)> {
        self.lines.iter().filter_map(|f| match f {
            Fact::InSubnet { machine, subnet } => Some((machine.as_str(), subnet.as_str())),
            _ => None,
        })
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Order-independent view used to compare two compiles.
    pub fn as_set(&self) -> BTreeSet<&Fact> {
        self.lines.iter().collect()
    }
}

impl fmt::Display for FactSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for fact in &self.lines {
            writeln!(f, "{fact}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hacl(a: &str, b: &str, proto: &str, port: &str) -> Fact {
        Fact::Hacl(Hacl {
            source: a.into(),
            dest: b.into(),
            protocol: proto.into(),
            port: port.into(),
        })
    }

    #[test]
    fn test_push_deduplicates() {
        let mut set = FactSet::new();
        assert!(set.push(hacl("a", "b", "tcp", "80")));
        assert!(!set.push(hacl("a", "b", "tcp", "80")));
        assert!(set.push(hacl("a", "b", "tcp", "443")));
        assert_eq!(set.len(), 2);
        assert_eq!(set.hacl().count(), 2);
    }

    #[test]
    fn test_render_lines() {
        let mut set = FactSet::new();
        set.push(Fact::AttackerLocated("internet".into()));
        set.push(Fact::InSubnet {
            machine: "A".into(),
            subnet: "R1Subnet".into(),
        });
        set.push(hacl("A", "B", "_", "80"));

        assert_eq!(
            set.to_string(),
            "attackerLocated(internet).\ninSubnet(A,R1Subnet).\nhacl(A,B,_,80).\n"
        );
    }

    #[test]
    fn test_same_subnet_axiom_text() {
        assert_eq!(
            Fact::SameSubnetAxiom.to_string(),
            "hacl(X,Y,_,_):-\n\tinSubnet(X,S),\n\tinSubnet(Y,S)."
        );
    }
}
