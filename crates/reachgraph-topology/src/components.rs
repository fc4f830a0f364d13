//! Connected components of the router graph.
//!
//! Only router-to-router links are considered; links touching a machine
//! define subnets and are handled by [`crate::subnets`].

use std::collections::{HashMap, HashSet};

use reachgraph_core::{Link, Router};

/// Partition of routers into connected components.
#[derive(Debug, Clone, Default)]
pub struct RouterComponents {
    /// Router names per component, in discovery order.
    components: Vec<Vec<String>>,
    /// Router name → component index.
    index: HashMap<String, usize>,
}

impl RouterComponents {
    /// Compute components with an explicit work stack seeded with every router,
    /// so isolated routers still get a singleton component.
    pub fn find(routers: &[Router], links: &[Link]) -> Self {
        let names: HashSet<&str> = routers.iter().map(|r| r.name.as_str()).collect();

        let mut adjacency: HashMap<&str, Vec<&str>> = HashMap::with_capacity(routers.len());
        for link in links {
            let (a, b) = (link.source.as_str(), link.dest.as_str());
            if names.contains(a) && names.contains(b) {
                adjacency.entry(a).or_default().push(b);
                adjacency.entry(b).or_default().push(a);
            }
        }

        let mut components: Vec<Vec<String>> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::with_capacity(routers.len());
        let mut visited: HashSet<&str> = HashSet::with_capacity(routers.len());

        // Reversed so routers pop in input order.
        let mut stack: Vec<&str> = routers.iter().rev().map(|r| r.name.as_str()).collect();

        while let Some(node) = stack.pop() {
            if !visited.insert(node) {
                continue;
            }

            // Not reached from the component being built: open a new one.
            let component = match index.get(node) {
                Some(&c) => c,
                None => {
                    components.push(Vec::new());
                    let c = components.len() - 1;
                    index.insert(node.to_string(), c);
                    c
                }
            };
            components[component].push(node.to_string());

            for &next in adjacency.get(node).into_iter().flatten() {
                if visited.contains(next) {
                    continue;
                }
                index.entry(next.to_string()).or_insert(component);
                stack.push(next);
            }
        }

        tracing::debug!(
            routers = routers.len(),
            components = components.len(),
            "Computed router components"
        );

        Self { components, index }
    }

    pub fn components(&self) -> &[Vec<String>] {
        &self.components
    }

    pub fn component_of(&self, router: &str) -> Option<usize> {
        self.index.get(router).copied()
    }

    /// Every other router in `router`'s component.
    pub fn peers<'a>(&'a self, router: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.component_of(router)
            .map(|c| self.components[c].as_slice())
            .unwrap_or_default()
            .iter()
            .map(String::as_str)
            .filter(move |name| *name != router)
    }

    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}
