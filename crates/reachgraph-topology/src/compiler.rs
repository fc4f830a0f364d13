//! Topology reachability compiler.
//!
//! Orchestrates component finding and subnet resolution, then walks the `out`
//! rules of every router to emit reachability facts. A rule with a wildcard
//! destination is a broadcast to every other router in the same component; a
//! rule naming a machine is evaluated only by that machine's router.

use std::collections::{BTreeSet, HashMap};

use reachgraph_core::config::CompileSection;
use reachgraph_core::{Direction, Fact, FactSet, Router, Topology, WILDCARD};

use crate::components::RouterComponents;
use crate::error::{Result, TopologyError};
use crate::evaluate::{accept, accept_all};
use crate::subnets::SubnetMap;

/// Compiles a [`Topology`] into the solver's fact document.
#[derive(Debug, Clone)]
pub struct TopologyCompiler {
    attacker_location: String,
    attack_goal: Option<String>,
}

impl Default for TopologyCompiler {
    fn default() -> Self {
        Self {
            attacker_location: "internet".to_string(),
            attack_goal: None,
        }
    }
}

impl TopologyCompiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &CompileSection) -> Self {
        Self {
            attacker_location: config.attacker_location.clone(),
            attack_goal: config.attack_goal.clone(),
        }
    }

    /// Emit `attackGoal(<goal>).` between the attacker location and the
    /// same-subnet axiom.
    pub fn with_attack_goal(mut self, goal: &str) -> Self {
        self.attack_goal = Some(goal.to_string());
        self
    }

    pub fn with_attacker_location(mut self, location: &str) -> Self {
        self.attacker_location = location.to_string();
        self
    }

    /// Compile a topology. Any malformed entity aborts the whole compile.
    pub fn compile(&self, topology: &Topology) -> Result<FactSet> {
        let mut facts = FactSet::new();
        facts.push(Fact::AttackerLocated(self.attacker_location.clone()));
        if let Some(goal) = &self.attack_goal {
            facts.push(Fact::AttackGoal(goal.clone()));
        }
        facts.push(Fact::SameSubnetAxiom);

        for machine in &topology.machines {
            facts.extend(machine.facts().into_iter().map(Fact::Clause));
        }

        let components = RouterComponents::find(&topology.routers, &topology.links);
        let subnets = SubnetMap::resolve(topology)?;

        let mut routers = topology.routers.clone();
        for router in &mut routers {
            let members = subnets.subnet(&router.name).cloned().unwrap_or_default();
            router.assign_subnet(members);
        }

        let by_name: HashMap<&str, &Router> =
            routers.iter().map(|r| (r.name.as_str(), r)).collect();

        for router in &routers {
            let peers: Vec<&Router> = components
                .peers(&router.name)
                .filter_map(|name| by_name.get(name).copied())
                .collect();
            build_router(router, &peers, &by_name, &subnets, &mut facts)?;
        }

        tracing::info!(
            routers = routers.len(),
            components = components.len(),
            machines = subnets.machine_count(),
            hacl = facts.hacl().count(),
            total = facts.len(),
            "Compiled topology"
        );

        Ok(facts)
    }
}

/// Emit `router`'s subnet membership and the reachability its `out` rules grant.
///
/// `peers` are the other routers in `router`'s component; `routers` resolves
/// the owning router of a targeted destination via `subnets`.
pub fn build_router(
    router: &Router,
    peers: &[&Router],
    routers: &HashMap<&str, &Router>,
    subnets: &SubnetMap,
    facts: &mut FactSet,
) -> Result<()> {
    let subnet = router.subnet().ok_or_else(|| TopologyError::MissingSubnet {
        router: router.name.clone(),
    })?;

    let label = router.subnet_label();
    for machine in subnet {
        facts.push(Fact::InSubnet {
            machine: machine.clone(),
            subnet: label.clone(),
        });
    }

    for rule in router.rules_in(Direction::Out) {
        let sources: BTreeSet<&str> = if rule.source == WILDCARD {
            subnet.iter().map(String::as_str).collect()
        } else {
            BTreeSet::from([rule.source.as_str()])
        };

        if rule.is_broadcast() {
            tracing::debug!(
                router = %router.name,
                peers = peers.len(),
                protocol = %rule.protocol,
                port = %rule.port,
                "Broadcasting rule"
            );
            for peer in peers {
                for m in &sources {
                    let admitted = accept_all(peer, m, &rule.protocol, &rule.port)?;
                    facts.extend(admitted.into_iter().map(Fact::Hacl));
                }
            }
        } else {
            let owner = subnets
                .owner(&rule.dest)
                .and_then(|name| routers.get(name).copied())
                .ok_or_else(|| TopologyError::UnknownDestination {
                    router: router.name.clone(),
                    dest: rule.dest.clone(),
                })?;
            tracing::debug!(
                router = %router.name,
                dest = %rule.dest,
                owner = %owner.name,
                "Applying targeted rule"
            );
            for m in &sources {
                let admitted = accept(owner, m, &rule.dest, &rule.protocol, &rule.port);
                facts.extend(admitted.into_iter().map(Fact::Hacl));
            }
        }
    }

    Ok(())
}
