//! Firewall rule evaluation.
//!
//! A rule admits a flow when all four fields survive [`restrict`]; the
//! resolved values form the emitted `hacl` tuple. A router admits a flow when
//! any of its `in` rules does.

use std::collections::BTreeSet;

use reachgraph_core::{Direction, FirewallRule, Hacl, Router};

use crate::error::{Result, TopologyError};
use crate::wildcard::restrict;

/// Evaluate one rule against a candidate flow, short-circuiting on the first
/// rejected field.
pub fn accept_rule(
    rule: &FirewallRule,
    m1: &str,
    m2: &str,
    protocol: &str,
    port: &str,
) -> Option<Hacl> {
    let source = restrict(m1, &rule.source)?;
    let dest = restrict(m2, &rule.dest)?;
    let protocol = restrict(protocol, &rule.protocol)?;
    let port = restrict(port, &rule.port)?;

    Some(Hacl {
        source: source.to_string(),
        dest: dest.to_string(),
        protocol: protocol.to_string(),
        port: port.to_string(),
    })
}

/// Union of every `in` rule on `router` admitting the flow.
pub fn accept(router: &Router, m1: &str, m2: &str, protocol: &str, port: &str) -> BTreeSet<Hacl> {
    router
        .rules_in(Direction::In)
        .filter_map(|rule| accept_rule(rule, m1, m2, protocol, port))
        .collect()
}

/// [`accept`] fanned out over every machine in `router`'s subnet.
pub fn accept_all(router: &Router, m1: &str, protocol: &str, port: &str) -> Result<BTreeSet<Hacl>> {
    let subnet = router.subnet().ok_or_else(|| TopologyError::MissingSubnet {
        router: router.name.clone(),
    })?;

    let mut out = BTreeSet::new();
    for m2 in subnet {
        out.extend(accept(router, m1, m2, protocol, port));
    }
    Ok(out)
}
