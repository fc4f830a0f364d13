//! Subnet resolution: every machine belongs to exactly one adjacent router.

use std::collections::{BTreeSet, HashMap, HashSet};

use reachgraph_core::Topology;

use crate::error::{Result, TopologyError};

/// Router → machines behind it, and the inverse machine → router map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubnetMap {
    subnets: HashMap<String, BTreeSet<String>>,
    owners: HashMap<String, String>,
}

impl SubnetMap {
    /// Resolve subnets from the topology's links.
    ///
    /// Router-to-router links are skipped. A link joining two machines, a
    /// machine adjacent to two routers, or a declared machine with no router
    /// are configuration errors.
    pub fn resolve(topology: &Topology) -> Result<Self> {
        let mut subnets: HashMap<String, BTreeSet<String>> =
            HashMap::with_capacity(topology.routers.len());
        for router in &topology.routers {
            if router.name.is_empty() {
                return Err(TopologyError::EmptyName { entity: "router" });
            }
            if subnets.insert(router.name.clone(), BTreeSet::new()).is_some() {
                return Err(TopologyError::DuplicateRouter {
                    name: router.name.clone(),
                });
            }
        }

        let mut declared: HashSet<&str> = HashSet::with_capacity(topology.machines.len());
        for machine in &topology.machines {
            if machine.name.is_empty() {
                return Err(TopologyError::EmptyName { entity: "machine" });
            }
            declared.insert(machine.name.as_str());
        }

        let mut owners: HashMap<String, String> = HashMap::new();

        for link in &topology.links {
            let (src, dst) = (link.source.as_str(), link.dest.as_str());
            let (router, machine) = match (subnets.contains_key(src), subnets.contains_key(dst)) {
                (true, true) => continue,
                (true, false) => (src, dst),
                (false, true) => (dst, src),
                (false, false) => {
                    return Err(match (declared.contains(src), declared.contains(dst)) {
                        (true, true) => TopologyError::MachineToMachineLink {
                            source_name: src.to_string(),
                            dest: dst.to_string(),
                        },
                        (false, _) => TopologyError::UnknownEndpoint {
                            name: src.to_string(),
                        },
                        (true, false) => TopologyError::UnknownEndpoint {
                            name: dst.to_string(),
                        },
                    });
                }
            };

            if machine.is_empty() {
                return Err(TopologyError::EmptyName { entity: "machine" });
            }
            if !declared.contains(machine) {
                tracing::warn!(machine, router, "Linked machine has no declaration");
            }

            match owners.get(machine) {
                Some(existing) if existing != router => {
                    return Err(TopologyError::MachineOnMultipleRouters {
                        machine: machine.to_string(),
                        first: existing.clone(),
                        second: router.to_string(),
                    });
                }
                Some(_) => {}
                None => {
                    owners.insert(machine.to_string(), router.to_string());
                }
            }
            if let Some(members) = subnets.get_mut(router) {
                members.insert(machine.to_string());
            }
        }

        if let Some(orphan) = topology
            .machines
            .iter()
            .find(|m| !owners.contains_key(&m.name))
        {
            return Err(TopologyError::OrphanMachine {
                machine: orphan.name.clone(),
            });
        }

        Ok(Self { subnets, owners })
    }

    /// Machines behind `router`.
    pub fn subnet(&self, router: &str) -> Option<&BTreeSet<String>> {
        self.subnets.get(router)
    }

    /// The router a machine sits behind.
    pub fn owner(&self, machine: &str) -> Option<&str> {
        self.owners.get(machine).map(String::as_str)
    }

    pub fn machine_count(&self) -> usize {
        self.owners.len()
    }
}
