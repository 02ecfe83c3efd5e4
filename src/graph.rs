/*!

  Structural analyses over a [Circuit].

*/

use crate::circuit::Circuit;
#[cfg(feature = "graph")]
use crate::circuit::Connection;
use crate::error::{Error, Result};
use crate::gate::{GateType, Primitive};
use crate::port::{GateId, PortRef};
#[cfg(feature = "graph")]
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::{HashMap, HashSet};

/// A common trait of analyses than can be performed on a circuit.
/// Circuits are structurally immutable once built, so an analysis never goes stale.
pub trait Analysis<'a>
where
    Self: Sized + 'a,
{
    /// Construct the analysis for the circuit.
    fn build(circuit: &'a Circuit) -> Result<Self>;
}

/// A table that maps ports and gates to the gates they feed
pub struct FanOutTable<'a> {
    // A reference to the underlying circuit
    _circuit: &'a Circuit,
    // Maps an output port to the gates it drives
    port_fan_out: HashMap<PortRef, Vec<GateId>>,
    /// Maps a gate to the gates it drives
    gate_fan_out: HashMap<GateId, Vec<GateId>>,
}

impl FanOutTable<'_> {
    /// Returns an iterator to the gates fed by `port`.
    pub fn get_port_users(&self, port: &PortRef) -> impl Iterator<Item = GateId> {
        self.port_fan_out
            .get(port)
            .into_iter()
            .flat_map(|users| users.iter().copied())
    }

    /// Returns an iterator to the gates fed by `gate`.
    pub fn get_gate_users(&self, gate: &GateId) -> impl Iterator<Item = GateId> {
        self.gate_fan_out
            .get(gate)
            .into_iter()
            .flat_map(|users| users.iter().copied())
    }

    /// Returns `true` if anything reads `port`
    pub fn port_has_uses(&self, port: &PortRef) -> bool {
        self.port_fan_out.get(port).is_some_and(|u| !u.is_empty())
    }
}

impl<'a> Analysis<'a> for FanOutTable<'a> {
    fn build(circuit: &'a Circuit) -> Result<Self> {
        let mut port_fan_out: HashMap<PortRef, Vec<GateId>> = HashMap::new();
        let mut gate_fan_out: HashMap<GateId, Vec<GateId>> = HashMap::new();

        for c in circuit.connections() {
            port_fan_out
                .entry(c.src())
                .or_default()
                .push(c.target().gate);
            let users = gate_fan_out.entry(c.src().gate).or_default();
            if !users.contains(&c.target().gate) {
                users.push(c.target().gate);
            }
        }

        Ok(FanOutTable {
            _circuit: circuit,
            port_fan_out,
            gate_fan_out,
        })
    }
}

/// Logic levels of every gate. Building this analysis fails on combinational loops.
///
/// IN gates sit at level 0, OUT gates share the level of their driver,
/// and every other gate (composites included) adds one level.
pub struct CombDepth<'a> {
    // A reference to the underlying circuit
    _circuit: &'a Circuit,
    // Maps a gate to its logic level
    comb_depth: HashMap<GateId, usize>,
    /// The maximum depth of the circuit
    max_depth: usize,
}

impl CombDepth<'_> {
    /// Returns the logic level of a gate in the circuit.
    pub fn get_comb_depth(&self, gate: &GateId) -> Option<usize> {
        self.comb_depth.get(gate).copied()
    }

    /// Returns the maximum logic level of the circuit.
    pub fn get_max_depth(&self) -> usize {
        self.max_depth
    }
}

impl<'a> Analysis<'a> for CombDepth<'a> {
    fn build(circuit: &'a Circuit) -> Result<Self> {
        let mut comb_depth: HashMap<GateId, usize> = HashMap::new();
        // Gates whose drivers are still being explored
        let mut open: HashSet<GateId> = HashSet::new();

        for root in circuit.gates().map(|g| g.get_index()) {
            let mut stack = vec![(root, false)];
            while let Some((gate, expanded)) = stack.pop() {
                if comb_depth.contains_key(&gate) {
                    continue;
                }

                if expanded {
                    let level = circuit
                        .drivers_of(gate)
                        .filter_map(|d| comb_depth.get(&d).copied())
                        .max();
                    let depth = match circuit.get_gate_at(gate).map(|g| g.get_type()) {
                        Some(GateType::Primitive(Primitive::In)) => 0,
                        Some(GateType::Primitive(Primitive::Out)) => level.unwrap_or(0),
                        _ => level.map_or(1, |l| l + 1),
                    };
                    open.remove(&gate);
                    comb_depth.insert(gate, depth);
                    continue;
                }

                open.insert(gate);
                stack.push((gate, true));
                for driver in circuit.drivers_of(gate) {
                    if open.contains(&driver) {
                        let id = circuit
                            .get_gate_at(driver)
                            .map(|g| g.get_id().clone())
                            .unwrap_or_else(|| driver.to_string().into());
                        return Err(Error::CycleDetected { gate: id });
                    }
                    if !comb_depth.contains_key(&driver) {
                        stack.push((driver, false));
                    }
                }
            }
        }

        let max_depth = comb_depth.values().max().copied().unwrap_or(0);

        Ok(CombDepth {
            _circuit: circuit,
            comb_depth,
            max_depth,
        })
    }
}

/// A petgraph view of the circuit with one node per gate and one edge per wire
#[cfg(feature = "graph")]
pub struct MultiDiGraph<'a> {
    _circuit: &'a Circuit,
    graph: DiGraph<GateId, Connection>,
    nodes: HashMap<GateId, NodeIndex>,
}

#[cfg(feature = "graph")]
impl MultiDiGraph<'_> {
    /// Return a reference to the graph constructed by this analysis
    pub fn get_graph(&self) -> &DiGraph<GateId, Connection> {
        &self.graph
    }

    /// Returns the graph node of `gate`
    pub fn get_node(&self, gate: &GateId) -> Option<NodeIndex> {
        self.nodes.get(gate).copied()
    }
}

#[cfg(feature = "graph")]
impl<'a> Analysis<'a> for MultiDiGraph<'a> {
    fn build(circuit: &'a Circuit) -> Result<Self> {
        let mut nodes = HashMap::new();
        let mut graph = DiGraph::new();

        for gate in circuit.gates() {
            let id = graph.add_node(gate.get_index());
            nodes.insert(gate.get_index(), id);
        }

        for connection in circuit.connections() {
            let s_id = nodes[&connection.src().gate];
            let t_id = nodes[&connection.target().gate];
            graph.add_edge(s_id, t_id, connection);
        }

        Ok(Self {
            _circuit: circuit,
            graph,
            nodes,
        })
    }
}
