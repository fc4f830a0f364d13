//! Core domain types for the network topology.
//!
//! A topology is three flat collections: machines, routers (each carrying its
//! firewall rules), and links. These mirror the JSON documents submitted by the
//! topology builder and are immutable once parsed, apart from the one-time
//! subnet assignment on each router.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ReachgraphError;

/// The wildcard token accepted in any firewall rule field.
pub const WILDCARD: &str = "*";

// ── Solver Clauses ────────────────────────────────────────────────

/// A ground predicate such as `vulExists(web,cve1,httpd).`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Clause {
    pub name: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Clause {
    pub fn new<I, S>(name: &str, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.to_string(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl fmt::Display for Clause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({}).", self.name, self.args.join(","))
    }
}

// ── Machine ───────────────────────────────────────────────────────

/// A user account on a machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Account {
    pub user: String,
    pub machine: String,
    pub privilege: String,
}

/// A network service listening on a machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Service {
    pub machine: String,
    pub application: String,
    pub protocol: String,
    pub port: String,
    pub user: String,
}

/// An installed program.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Program {
    pub machine: String,
    pub application: String,
    pub privilege: String,
}

/// A known vulnerability in an application on a machine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Vulnerability {
    pub name: String,
    pub machine: String,
    pub application: String,
    pub locality: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub cvss: String,
}

/// A non-router host in the topology.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Machine {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub services: Vec<Service>,
    #[serde(default)]
    pub programs: Vec<Program>,
    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,
    /// Free-form extra facts attached to the machine.
    #[serde(default)]
    pub other: Vec<Clause>,
}

impl Machine {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: "machine".to_string(),
            accounts: Vec::new(),
            services: Vec::new(),
            programs: Vec::new(),
            vulnerabilities: Vec::new(),
            other: Vec::new(),
        }
    }

    /// Render every record on this machine as solver clauses, in record order.
    pub fn facts(&self) -> Vec<Clause> {
        let mut out = Vec::new();
        for a in &self.accounts {
            out.push(Clause::new(
                "hasAccount",
                [a.user.as_str(), a.machine.as_str(), a.privilege.as_str()],
            ));
            out.push(Clause::new("inCompetent", [a.user.as_str()]));
        }
        for s in &self.services {
            out.push(Clause::new(
                "networkServiceInfo",
                [
                    s.machine.as_str(),
                    s.application.as_str(),
                    s.protocol.as_str(),
                    s.port.as_str(),
                    s.user.as_str(),
                ],
            ));
        }
        for p in &self.programs {
            out.push(Clause::new("clientApplication", [p.application.as_str()]));
            out.push(Clause::new(
                "setuidProgramInfo",
                [p.machine.as_str(), p.application.as_str(), p.privilege.as_str()],
            ));
        }
        for v in &self.vulnerabilities {
            out.push(Clause::new(
                "vulProperty",
                [v.name.as_str(), v.locality.as_str(), v.kind.as_str()],
            ));
            out.push(Clause::new("cvss", [v.name.as_str(), v.cvss.as_str()]));
            out.push(Clause::new(
                "vulExists",
                [v.machine.as_str(), v.name.as_str(), v.application.as_str()],
            ));
        }
        out.extend(self.other.iter().cloned());
        out
    }
}

// ── Router ────────────────────────────────────────────────────────

/// Which side of a router a firewall rule guards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    In,
    Out,
}

/// A single firewall rule. Each field is a literal token or [`WILDCARD`].
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FirewallRule {
    pub source: String,
    pub dest: String,
    pub protocol: String,
    pub port: String,
    pub direction: Direction,
}

impl FirewallRule {
    pub fn new(source: &str, dest: &str, protocol: &str, port: &str, direction: Direction) -> Self {
        Self {
            source: source.to_string(),
            dest: dest.to_string(),
            protocol: protocol.to_string(),
            port: port.to_string(),
            direction,
        }
    }

    /// Whether the rule targets every machine behind the peer routers.
    pub fn is_broadcast(&self) -> bool {
        self.dest == WILDCARD
    }
}

/// A router with its ordered firewall rule list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Router {
    pub name: String,
    #[serde(default)]
    pub rules: Vec<FirewallRule>,
    /// Machines behind this router. Assigned once by the subnet resolver.
    #[serde(skip)]
    subnet: Option<BTreeSet<String>>,
}

impl Router {
    pub fn new(name: &str, rules: Vec<FirewallRule>) -> Self {
        Self {
            name: name.to_string(),
            rules,
            subnet: None,
        }
    }

    pub fn subnet(&self) -> Option<&BTreeSet<String>> {
        self.subnet.as_ref()
    }

    pub fn assign_subnet(&mut self, machines: BTreeSet<String>) {
        self.subnet = Some(machines);
    }

    /// The solver label shared by every machine behind this router.
    pub fn subnet_label(&self) -> String {
        format!("{}Subnet", self.name)
    }

    pub fn rules_in(&self, direction: Direction) -> impl Iterator<Item = &FirewallRule> {
        self.rules.iter().filter(move |r| r.direction == direction)
    }
}

// ── Link ──────────────────────────────────────────────────────────

/// An unordered adjacency between two named endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Link {
    pub source: String,
    pub dest: String,
}

impl Link {
    pub fn new(source: &str, dest: &str) -> Self {
        Self {
            source: source.to_string(),
            dest: dest.to_string(),
        }
    }
}

// ── Topology ──────────────────────────────────────────────────────

/// The complete compiler input.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Topology {
    #[serde(default)]
    pub machines: Vec<Machine>,
    #[serde(default)]
    pub routers: Vec<Router>,
    #[serde(default)]
    pub links: Vec<Link>,
}

impl Topology {
    pub fn from_json(input: &str) -> Result<Self, ReachgraphError> {
        Ok(serde_json::from_str(input)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clause_display() {
        let c = Clause::new("vulExists", ["web", "cve-1", "httpd"]);
        assert_eq!(c.to_string(), "vulExists(web,cve-1,httpd).");
        assert_eq!(Clause::new("empty", Vec::<String>::new()).to_string(), "empty().");
    }

    #[test]
    fn test_machine_facts_order() {
        let mut m = Machine::new("web");
        m.accounts.push(Account {
            user: "alice".into(),
            machine: "web".into(),
            privilege: "user".into(),
        });
        m.vulnerabilities.push(Vulnerability {
            name: "cve1".into(),
            machine: "web".into(),
            application: "httpd".into(),
            locality: "remoteExploit".into(),
            kind: "privEscalation".into(),
            cvss: "h".into(),
        });

        let lines: Vec<String> = m.facts().iter().map(ToString::to_string).collect();
        assert_eq!(
            lines,
            vec![
                "hasAccount(alice,web,user).",
                "inCompetent(alice).",
                "vulProperty(cve1,remoteExploit,privEscalation).",
                "cvss(cve1,h).",
                "vulExists(web,cve1,httpd).",
            ]
        );
    }

    #[test]
    fn test_topology_from_json() {
        let json = r#"{
            "machines": [{"name": "A", "type": "workstation"}],
            "routers": [{"name": "R1", "rules": [
                {"source": "*", "dest": "*", "protocol": "tcp", "port": "80", "direction": "out"}
            ]}],
            "links": [{"source": "A", "dest": "R1"}]
        }"#;

        let topo = Topology::from_json(json).unwrap();
        assert_eq!(topo.machines[0].kind, "workstation");
        assert_eq!(topo.routers[0].rules[0].direction, Direction::Out);
        assert!(topo.routers[0].rules[0].is_broadcast());
        assert!(topo.routers[0].subnet().is_none());
    }

    #[test]
    fn test_topology_bad_direction_rejected() {
        let json = r#"{"routers": [{"name": "R1", "rules": [
            {"source": "*", "dest": "*", "protocol": "tcp", "port": "80", "direction": "sideways"}
        ]}]}"#;
        assert!(matches!(
            Topology::from_json(json),
            Err(ReachgraphError::Serialization(_))
        ));
    }

    #[test]
    fn test_subnet_label() {
        let r = Router::new("core", vec![]);
        assert_eq!(r.subnet_label(), "coreSubnet");
    }
}
