/*!

  Circuits: named collections of wired gates, and the propagation engine.

*/

use crate::{
    config::Config,
    container::BoundedVec,
    error::{Error, Result},
    gate::{Gate, GateType, Primitive},
    graph::{Analysis, CombDepth},
    port::{Direction, GateId, Identifier, Port, PortRef},
    template::{Endpoint, Template},
};
use std::collections::HashMap;
use tracing::{debug, trace, warn};

/// A reusable block of logic. Owns its gates, which own their ports.
///
/// Structure is fixed once built. Port states change through [Circuit::set_state],
/// which returns only after every downstream gate has settled.
///
/// Circuits only come out of [Circuit::build] and [Library::build]:
///
/// ```compile_fail
/// use gate_net::{circuit::Circuit, config::Config};
/// let mut circuit = Circuit::new("empty".to_string(), Config::default());
/// ```
#[derive(Debug, Clone)]
pub struct Circuit {
    /// The name other circuits instantiate this one by
    name: String,
    /// Limits this circuit was built with
    config: Config,
    /// Gates in declaration order
    gates: BoundedVec<Gate>,
    /// Gate id to position
    by_id: HashMap<Identifier, GateId>,
    /// OUTPUT port to the INPUT ports it feeds
    fan_out: HashMap<PortRef, Vec<PortRef>>,
    /// INPUT port to the OUTPUT port driving it
    drivers: HashMap<PortRef, PortRef>,
}

impl Circuit {
    /// Creates an empty circuit
    pub(crate) fn new(name: String, config: Config) -> Self {
        let gates = BoundedVec::with_capacity(config.gate_capacity);
        Self {
            name,
            config,
            gates,
            by_id: HashMap::new(),
            fan_out: HashMap::new(),
            drivers: HashMap::new(),
        }
    }

    /// Builds a circuit from `template` with the default [Config].
    /// Custom gate types are resolved against `dependencies`.
    pub fn build(template: &Template, dependencies: &[Circuit]) -> Result<Self> {
        Self::build_with(template, dependencies, &Config::default())
    }

    /// Builds a circuit from `template`, wires it and settles every signal.
    pub fn build_with(
        template: &Template,
        dependencies: &[Circuit],
        config: &Config,
    ) -> Result<Self> {
        debug!(
            circuit = %template.name,
            gates = template.gates.len(),
            wires = template.wires.len(),
            "building circuit"
        );

        let mut circuit = Self::new(template.name.clone(), config.clone());
        for decl in template.gates.iter() {
            circuit.add_gate(
                decl.id.clone(),
                decl.gate_type.as_str().into(),
                decl.pin.clone(),
                dependencies,
            )?;
        }

        for (from, to) in template.connections() {
            circuit.connect_endpoints(from, to)?;
        }

        if config.check_cycles {
            CombDepth::build(&circuit)?;
        }

        circuit.settle()?;
        Ok(circuit)
    }

    /// Creates a gate, resolves its ports and adds it to the circuit
    pub(crate) fn add_gate(
        &mut self,
        id: Identifier,
        gate_type: GateType,
        pin: Option<Identifier>,
        dependencies: &[Circuit],
    ) -> Result<GateId> {
        let mut gate = Gate::new(id, gate_type, self.config.port_capacity);
        gate.set_ports(pin, dependencies)?;
        self.insert_gate(gate)
    }

    /// Adds an already constructed gate. Gate ids must be unique.
    pub(crate) fn insert_gate(&mut self, mut gate: Gate) -> Result<GateId> {
        if self.by_id.contains_key(gate.get_id()) {
            return Err(Error::DuplicateGate {
                gate: gate.get_id().clone(),
            });
        }
        let index = GateId(self.gates.len());
        gate.relocate(index);
        let id = gate.get_id().clone();
        self.gates.push(gate)?;
        self.by_id.insert(id, index);
        Ok(index)
    }

    /// Wires the OUTPUT port `from` to the INPUT port `to`
    pub(crate) fn connect(&mut self, from: PortRef, to: PortRef) -> Result<()> {
        let reject = |reason: &str| Error::InvalidConnection {
            from: self.describe(from),
            to: self.describe(to),
            reason: reason.to_string(),
        };

        let src = self.get_port(from).ok_or_else(|| reject("no such driver port"))?;
        let dst = self.get_port(to).ok_or_else(|| reject("no such sink port"))?;
        if !src.is_output() {
            return Err(reject("driver is not an output port"));
        }
        if !dst.is_input() {
            return Err(reject("sink is not an input port"));
        }
        if let Some(prev) = self.drivers.get(&to) {
            let reason = format!("sink is already driven by {}", self.describe(*prev));
            return Err(reject(&reason));
        }

        self.drivers.insert(to, from);
        self.fan_out.entry(from).or_default().push(to);
        Ok(())
    }

    /// Wires two ports addressed by gate id and port name
    pub(crate) fn connect_endpoints(&mut self, from: &Endpoint, to: &Endpoint) -> Result<()> {
        let from = self.resolve(from)?;
        let to = self.resolve(to)?;
        self.connect(from, to)
    }

    /// Resolves a named endpoint to a port reference
    pub fn resolve(&self, endpoint: &Endpoint) -> Result<PortRef> {
        self.find_port(endpoint.gate.get_name(), endpoint.port.get_name())
            .ok_or_else(|| Error::PortNotFound {
                gate: endpoint.gate.clone(),
                port: endpoint.port.clone(),
            })
    }

    /// Evaluates every gate so that the all-low initial state becomes consistent
    pub fn settle(&mut self) -> Result<()> {
        let mut stack: Vec<GateId> = (0..self.gates.len()).rev().map(GateId).collect();
        for g in 0..self.gates.len() {
            let outputs: Vec<usize> = self.gates[g].outputs().map(|(i, _)| i).collect();
            for port in outputs {
                self.fan_out_into(PortRef::new(GateId(g), port), &mut stack);
            }
        }
        self.run(stack)
    }

    /// Sets the state of a port and propagates it until the circuit settles.
    ///
    /// Setting an OUTPUT port pushes the value to every INPUT port it feeds.
    /// Setting an INPUT port re-evaluates its gate.
    pub fn set_state(&mut self, port: PortRef, state: bool) -> Result<()> {
        let direction = match self.port_mut(port) {
            Some(p) => {
                p.set_state(state);
                p.get_direction()
            }
            None => return Err(self.missing(port)),
        };

        let mut stack = Vec::new();
        match direction {
            Direction::Output => self.fan_out_into(port, &mut stack),
            Direction::Input => stack.push(port.gate),
        }
        self.run(stack)
    }

    /// Copies the state of `from` onto each port it feeds, scheduling gates whose input changed
    fn fan_out_into(&mut self, from: PortRef, stack: &mut Vec<GateId>) {
        let Some(state) = self.state(from) else {
            return;
        };
        let Some(sinks) = self.fan_out.get(&from) else {
            return;
        };
        // Reversed so the first sink is popped first
        for sink in sinks.iter().rev() {
            let changed = self.gates[sink.gate.0]
                .get_port_mut(sink.port)
                .is_some_and(|p| p.set_state(state));
            if changed {
                stack.push(sink.gate);
            }
        }
    }

    /// Depth-first worklist evaluation, bounded by [Config::max_propagation_steps]
    fn run(&mut self, mut stack: Vec<GateId>) -> Result<()> {
        let mut steps = 0;
        while let Some(id) = stack.pop() {
            steps += 1;
            if steps > self.config.max_propagation_steps {
                warn!(circuit = %self.name, steps, "propagation did not converge");
                return Err(Error::PropagationDidNotConverge {
                    circuit: self.name.clone(),
                    steps: self.config.max_propagation_steps,
                });
            }

            let gate = &mut self.gates[id.0];
            trace!(circuit = %self.name, gate = %gate.get_id(), "evaluating");
            let changed = gate.evaluate()?;
            for port in changed.into_iter().rev() {
                self.fan_out_into(PortRef::new(id, port), &mut stack);
            }
        }
        Ok(())
    }

    /// Drives the pin of an IN gate and waits for the circuit to settle.
    /// Any other port is rejected with [Error::NotAnInputPin]; use [Circuit::set_state] for those.
    pub fn drive_input(&mut self, gate: &str, pin: &str, state: bool) -> Result<()> {
        let port = self.find_port(gate, pin).ok_or_else(|| Error::PortNotFound {
            gate: gate.into(),
            port: pin.into(),
        })?;
        if !self.gates[port.gate.0].get_type().is(Primitive::In) {
            return Err(Error::NotAnInputPin {
                gate: gate.into(),
                port: pin.into(),
            });
        }
        self.set_state(port, state)
    }

    /// Reads the settled state of a pin
    pub fn read_output(&self, gate: &str, pin: &str) -> Result<bool> {
        self.get_port_by_name(gate, pin)
            .map(Port::get_state)
            .ok_or_else(|| Error::PortNotFound {
                gate: gate.into(),
                port: pin.into(),
            })
    }

    fn port_mut(&mut self, port: PortRef) -> Option<&mut Port> {
        self.gates.get_mut(port.gate.0)?.get_port_mut(port.port)
    }

    fn missing(&self, port: PortRef) -> Error {
        let gate = self
            .get_gate_at(port.gate)
            .map(|g| g.get_id().clone())
            .unwrap_or_else(|| port.gate.to_string().into());
        Error::PortNotFound {
            gate,
            port: port.port.to_string().into(),
        }
    }

    /// Formats a port reference as `gate.port` using names where possible
    fn describe(&self, port: PortRef) -> String {
        match self.get_gate_at(port.gate) {
            Some(g) => match g.get_port(port.port) {
                Some(p) => format!("{}.{}", g.get_id(), p.get_name()),
                None => format!("{}.#{}", g.get_id(), port.port),
            },
            None => port.to_string(),
        }
    }
}

impl Circuit {
    /// Returns the name of the circuit
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the limits the circuit was built with
    pub fn get_config(&self) -> &Config {
        &self.config
    }

    /// Iterates over the gates in declaration order
    pub fn gates(&self) -> impl Iterator<Item = &Gate> {
        self.gates.iter()
    }

    /// Returns the number of gates
    pub fn num_gates(&self) -> usize {
        self.gates.len()
    }

    /// Returns the position of the gate with id `id`
    pub fn find_gate(&self, id: &str) -> Option<GateId> {
        self.by_id.get(id).copied()
    }

    /// Returns the gate with id `id`
    pub fn get_gate(&self, id: &str) -> Option<&Gate> {
        self.find_gate(id).and_then(|g| self.get_gate_at(g))
    }

    /// Returns the gate at position `index`
    pub fn get_gate_at(&self, index: GateId) -> Option<&Gate> {
        self.gates.get(index.0)
    }

    /// Locates port `port` of gate `gate`
    pub fn find_port(&self, gate: &str, port: &str) -> Option<PortRef> {
        let index = self.find_gate(gate)?;
        let pos = self.gates[index.0].find_port(port)?;
        Some(PortRef::new(index, pos))
    }

    /// Looks up port `port` on gate `gate`. A miss on either name yields [None].
    pub fn get_port_by_name(&self, gate: &str, port: &str) -> Option<&Port> {
        let Some(g) = self.get_gate(gate) else {
            warn!(circuit = %self.name, gate, "no such gate");
            return None;
        };
        let found = g.get_port_by_name(port);
        if found.is_none() {
            warn!(circuit = %self.name, gate, port, "failed to find port");
        }
        found
    }

    /// Returns the port at `port`
    pub fn get_port(&self, port: PortRef) -> Option<&Port> {
        self.gates.get(port.gate.0)?.get_port(port.port)
    }

    /// Returns the state of the port at `port`
    pub fn state(&self, port: PortRef) -> Option<bool> {
        self.get_port(port).map(Port::get_state)
    }

    /// Returns the OUTPUT port wired to the INPUT port `port`
    pub fn get_driver(&self, port: PortRef) -> Option<PortRef> {
        self.drivers.get(&port).copied()
    }

    /// Returns the INPUT ports fed by the OUTPUT port `port`
    pub fn get_sinks(&self, port: PortRef) -> &[PortRef] {
        self.fan_out.get(&port).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Returns the gates driving the inputs of `gate`, in port order
    pub fn drivers_of(&self, gate: GateId) -> impl Iterator<Item = GateId> {
        self.gates
            .get(gate.0)
            .into_iter()
            .flat_map(|g| g.inputs())
            .filter_map(move |(i, _)| self.get_driver(PortRef::new(gate, i)))
            .map(|p| p.gate)
    }

    /// The external input pins: the port of every IN gate, in declaration order
    pub fn input_pins(&self) -> impl Iterator<Item = PortRef> {
        self.pins_of(Primitive::In)
    }

    /// The external output pins: the port of every OUT gate, in declaration order
    pub fn output_pins(&self) -> impl Iterator<Item = PortRef> {
        self.pins_of(Primitive::Out)
    }

    fn pins_of(&self, primitive: Primitive) -> impl Iterator<Item = PortRef> {
        self.gates
            .iter()
            .filter(move |g| g.get_type().is(primitive) && g.num_ports() > 0)
            .map(|g| PortRef::new(g.get_index(), 0))
    }

    /// Iterates over every wire in the circuit
    pub fn connections(&self) -> iter::ConnectionIterator<'_> {
        iter::ConnectionIterator::new(self)
    }

    /// Walks the fan-in cone of `from`, depth first
    pub fn dfs(&self, from: GateId) -> iter::DfsIterator<'_> {
        iter::DfsIterator::new(self, from)
    }

    /// Checks that the circuit has outputs and no combinational loops
    pub fn verify(&self) -> Result<()> {
        if self.output_pins().next().is_none() {
            return Err(Error::NoOutputs(self.name.clone()));
        }
        CombDepth::build(self)?;
        Ok(())
    }

    /// Constructs an analysis of the circuit
    pub fn get_analysis<'a, A: Analysis<'a>>(&'a self) -> Result<A> {
        A::build(self)
    }
}

impl std::fmt::Display for Circuit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "circuit {} (", self.name)?;
        for gate in self.gates.iter() {
            for line in gate.to_string().lines() {
                writeln!(f, "  {line}")?;
            }
        }
        writeln!(f, ")")
    }
}

/// A wire from an OUTPUT port to an INPUT port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Connection {
    src: PortRef,
    target: PortRef,
}

impl Connection {
    /// Returns the driving port
    pub fn src(&self) -> PortRef {
        self.src
    }

    /// Returns the driven port
    pub fn target(&self) -> PortRef {
        self.target
    }
}

/// Iterators over a circuit
pub mod iter {
    use super::{Circuit, Connection};
    use crate::port::{GateId, PortRef};
    use std::collections::HashSet;

    /// An iterator over the wires of a circuit, in driver order
    pub struct ConnectionIterator<'a> {
        circuit: &'a Circuit,
        gate: usize,
        port: usize,
        sink: usize,
    }

    impl<'a> ConnectionIterator<'a> {
        /// Creates a new connection iterator for the circuit
        pub fn new(circuit: &'a Circuit) -> Self {
            Self {
                circuit,
                gate: 0,
                port: 0,
                sink: 0,
            }
        }
    }

    impl Iterator for ConnectionIterator<'_> {
        type Item = Connection;

        fn next(&mut self) -> Option<Self::Item> {
            while self.gate < self.circuit.gates.len() {
                let nports = self.circuit.gates[self.gate].num_ports();
                while self.port < nports {
                    let src = PortRef::new(GateId(self.gate), self.port);
                    let sinks = self.circuit.get_sinks(src);
                    if self.sink < sinks.len() {
                        let target = sinks[self.sink];
                        self.sink += 1;
                        return Some(Connection { src, target });
                    }
                    self.sink = 0;
                    self.port += 1;
                }
                self.port = 0;
                self.gate += 1;
            }
            None
        }
    }

    /// A depth-first iterator over a gate and everything that drives it
    pub struct DfsIterator<'a> {
        circuit: &'a Circuit,
        stack: Vec<GateId>,
        visited: HashSet<GateId>,
    }

    impl<'a> DfsIterator<'a> {
        /// Create a new DFS iterator for the circuit starting at `from`.
        pub fn new(circuit: &'a Circuit, from: GateId) -> Self {
            Self {
                circuit,
                stack: vec![from],
                visited: HashSet::new(),
            }
        }
    }

    impl Iterator for DfsIterator<'_> {
        type Item = GateId;

        fn next(&mut self) -> Option<Self::Item> {
            while let Some(gate) = self.stack.pop() {
                if self.circuit.get_gate_at(gate).is_none() || !self.visited.insert(gate) {
                    continue;
                }
                let drivers: Vec<GateId> = self.circuit.drivers_of(gate).collect();
                self.stack.extend(drivers.into_iter().rev());
                return Some(gate);
            }
            None
        }
    }
}

/// An ordered set of built circuits that templates may instantiate by name
#[derive(Debug, Clone, Default)]
pub struct Library {
    circuits: Vec<Circuit>,
    config: Config,
}

impl Library {
    /// Creates an empty library whose circuits are built with `config`
    pub fn new(config: Config) -> Self {
        Self {
            circuits: Vec::new(),
            config,
        }
    }

    /// Builds `template` against the circuits already in the library and registers it
    pub fn build(&mut self, template: &Template) -> Result<&Circuit> {
        if self.get(&template.name).is_some() {
            return Err(Error::DuplicateCircuit(template.name.clone()));
        }
        let circuit = Circuit::build_with(template, &self.circuits, &self.config)?;
        self.insert(circuit)
    }

    /// Registers an already built circuit
    pub fn insert(&mut self, circuit: Circuit) -> Result<&Circuit> {
        if self.get(circuit.get_name()).is_some() {
            return Err(Error::DuplicateCircuit(circuit.get_name().to_string()));
        }
        debug!(circuit = circuit.get_name(), "registered circuit");
        self.circuits.push(circuit);
        Ok(&self.circuits[self.circuits.len() - 1])
    }

    /// Returns the circuit called `name`
    pub fn get(&self, name: &str) -> Option<&Circuit> {
        self.circuits.iter().find(|c| c.get_name() == name)
    }

    /// Returns a fresh copy of the circuit called `name` to simulate
    pub fn instantiate(&self, name: &str) -> Option<Circuit> {
        self.get(name).cloned()
    }

    /// Returns every circuit in registration order
    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inverter() -> Template {
        Template::new("inv")
            .pin("a", "IN", "A")
            .gate("n", "NOT")
            .pin("y", "OUT", "Y")
            .wire(("a", "A"), ("n", "I0"))
            .wire(("n", "O0"), ("y", "Y"))
    }

    #[test]
    fn settles_on_build() {
        let circuit = Circuit::build(&inverter(), &[]).unwrap();
        assert_eq!(circuit.read_output("y", "Y"), Ok(true));
    }

    #[test]
    fn drive_and_read() {
        let mut circuit = Circuit::build(&inverter(), &[]).unwrap();
        circuit.drive_input("a", "A", true).unwrap();
        assert_eq!(circuit.read_output("y", "Y"), Ok(false));
        circuit.drive_input("a", "A", false).unwrap();
        assert_eq!(circuit.read_output("y", "Y"), Ok(true));
    }

    #[test]
    fn bad_wires() {
        let t = Template::new("t")
            .pin("a", "IN", "A")
            .gate("n", "NOT")
            .wire(("n", "I0"), ("a", "A"));
        assert!(matches!(
            Circuit::build(&t, &[]),
            Err(Error::InvalidConnection { .. })
        ));

        let t = Template::new("t")
            .pin("a", "IN", "A")
            .pin("b", "IN", "B")
            .gate("n", "NOT")
            .wire(("a", "A"), ("n", "I0"))
            .wire(("b", "B"), ("n", "I0"));
        let err = Circuit::build(&t, &[]).unwrap_err();
        assert_eq!(
            err,
            Error::InvalidConnection {
                from: "b.B".to_string(),
                to: "n.I0".to_string(),
                reason: "sink is already driven by a.A".to_string(),
            }
        );

        let t = Template::new("t")
            .pin("a", "IN", "A")
            .wire(("a", "A"), ("ghost", "I0"));
        assert_eq!(
            Circuit::build(&t, &[]).unwrap_err(),
            Error::PortNotFound {
                gate: "ghost".into(),
                port: "I0".into()
            }
        );
    }

    #[test]
    fn duplicate_ids() {
        let t = Template::new("t").gate("g", "AND").gate("g", "OR");
        assert_eq!(
            Circuit::build(&t, &[]).unwrap_err(),
            Error::DuplicateGate { gate: "g".into() }
        );
    }

    #[test]
    fn gate_overflow() {
        let config = Config::default().with_gate_capacity(2);
        let t = Template::new("t")
            .gate("a", "AND")
            .gate("b", "AND")
            .gate("c", "AND");
        assert_eq!(
            Circuit::build_with(&t, &[], &config).unwrap_err(),
            Error::ContainerOverflow { capacity: 2 }
        );
    }

    #[test]
    fn loop_is_rejected_or_capped() {
        let t = Template::new("ring")
            .gate("n", "NOT")
            .wire(("n", "O0"), ("n", "I0"));
        assert!(matches!(
            Circuit::build(&t, &[]),
            Err(Error::CycleDetected { .. })
        ));

        let config = Config::default()
            .with_cycle_check(false)
            .with_max_propagation_steps(100);
        assert_eq!(
            Circuit::build_with(&t, &[], &config).unwrap_err(),
            Error::PropagationDidNotConverge {
                circuit: "ring".to_string(),
                steps: 100
            }
        );
    }

    #[test]
    fn connections_and_dfs() {
        let circuit = Circuit::build(&inverter(), &[]).unwrap();
        let wires: Vec<_> = circuit.connections().collect();
        assert_eq!(wires.len(), 2);
        assert_eq!(wires[0].src(), circuit.find_port("a", "A").unwrap());
        assert_eq!(wires[1].target(), circuit.find_port("y", "Y").unwrap());

        let y = circuit.find_gate("y").unwrap();
        let cone: Vec<_> = circuit
            .dfs(y)
            .map(|g| circuit.get_gate_at(g).unwrap().get_id().to_string())
            .collect();
        assert_eq!(cone, ["y", "n", "a"]);
    }

    #[test]
    fn library_names_are_unique() {
        let mut lib = Library::default();
        lib.build(&inverter()).unwrap();
        assert_eq!(
            lib.build(&inverter()).unwrap_err(),
            Error::DuplicateCircuit("inv".to_string())
        );
        assert!(lib.instantiate("inv").is_some());
        assert!(lib.instantiate("buf").is_none());
    }

    #[test]
    fn shape_violation_on_hand_built_gate() {
        let mut circuit = Circuit::new("manual".to_string(), Config::default());
        let a = circuit
            .add_gate("a".into(), Primitive::In.into(), Some("A".into()), &[])
            .unwrap();
        // The output sits between the two inputs
        let bad = Gate::with_ports(
            "bad".into(),
            Primitive::And.into(),
            [
                ("I0".into(), Direction::Input),
                ("O0".into(), Direction::Output),
                ("I1".into(), Direction::Input),
            ],
            4,
        )
        .unwrap();
        let bad = circuit.insert_gate(bad).unwrap();
        circuit
            .connect(PortRef::new(a, 0), PortRef::new(bad, 0))
            .unwrap();

        assert!(matches!(
            circuit.drive_input("a", "A", true),
            Err(Error::PortShapeViolation { .. })
        ));
        assert!(matches!(
            circuit.settle(),
            Err(Error::PortShapeViolation { .. })
        ));
    }

    #[test]
    fn malformed_interface() {
        let mut broken = Circuit::new("broken".to_string(), Config::default());
        let no_ports: Vec<(Identifier, Direction)> = Vec::new();
        broken
            .insert_gate(Gate::with_ports("p".into(), Primitive::In.into(), no_ports, 4).unwrap())
            .unwrap();

        let t = Template::new("t").gate("inst", "broken");
        assert_eq!(
            Circuit::build(&t, &[broken]).unwrap_err(),
            Error::MalformedCompositeInterface {
                circuit: "broken".to_string(),
                gate: "p".into()
            }
        );
    }
}
