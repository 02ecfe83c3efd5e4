/*!

  Gates: typed nodes that own their ports.

  A gate is either one of the five [Primitive] kinds or a composite that
  instantiates another [Circuit]. Port lists are attached by [Gate::set_ports]
  right after creation and keep the layout their type dictates.

*/

use crate::{
    circuit::Circuit,
    container::BoundedVec,
    error::{Error, Result},
    port::{Direction, GateId, Identifier, Port, PortRef},
};
use tracing::{debug, warn};

use crate::port::Direction::{Input, Output};

/// The fixed-behavior gate kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Primitive {
    /// Two inputs, one output: `a && b`
    And,
    /// Two inputs, one output: `a || b`
    Or,
    /// One input, one output: `!a`
    Not,
    /// An externally driven circuit input pin
    In,
    /// An externally observed circuit output pin
    Out,
}

impl Primitive {
    /// Every primitive, in tag order
    pub const ALL: [Primitive; 5] = [
        Primitive::And,
        Primitive::Or,
        Primitive::Not,
        Primitive::In,
        Primitive::Out,
    ];

    /// Returns the type tag used in templates
    pub fn tag(&self) -> &'static str {
        match self {
            Primitive::And => "AND",
            Primitive::Or => "OR",
            Primitive::Not => "NOT",
            Primitive::In => "IN",
            Primitive::Out => "OUT",
        }
    }

    /// Parses a type tag, returning [None] for anything that is not a primitive
    pub fn from_tag(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.tag() == tag)
    }

    /// Returns the port directions, in order, that a gate of this kind carries
    pub fn layout(&self) -> &'static [Direction] {
        match self {
            Primitive::And | Primitive::Or => &[Input, Input, Output],
            Primitive::Not => &[Input, Output],
            Primitive::In => &[Output],
            Primitive::Out => &[Input],
        }
    }
}

impl std::fmt::Display for Primitive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.tag())
    }
}

/// The type of a gate: a primitive or the name of another circuit
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GateType {
    /// A built-in gate
    Primitive(Primitive),
    /// An instance of the circuit with this name
    Custom(String),
}

impl GateType {
    /// Returns `true` if this is exactly the given primitive
    pub fn is(&self, primitive: Primitive) -> bool {
        matches!(self, GateType::Primitive(p) if *p == primitive)
    }
}

impl From<&str> for GateType {
    fn from(tag: &str) -> Self {
        match Primitive::from_tag(tag) {
            Some(p) => GateType::Primitive(p),
            None => GateType::Custom(tag.to_string()),
        }
    }
}

impl From<Primitive> for GateType {
    fn from(p: Primitive) -> Self {
        GateType::Primitive(p)
    }
}

impl std::fmt::Display for GateType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GateType::Primitive(p) => p.fmt(f),
            GateType::Custom(name) => f.write_str(name),
        }
    }
}

/// Named views of a gate's ports, checked against its layout
#[derive(Debug)]
pub enum Pins<'a> {
    /// AND and OR
    Binary {
        /// First input
        a: &'a Port,
        /// Second input
        b: &'a Port,
        /// Output
        y: &'a Port,
    },
    /// NOT
    Unary {
        /// Input
        a: &'a Port,
        /// Output
        y: &'a Port,
    },
    /// IN: the pin the outside world drives
    Source {
        /// Output
        y: &'a Port,
    },
    /// OUT: the pin the outside world observes
    Sink {
        /// Input
        a: &'a Port,
    },
    /// A composite gate's interface, in the inner circuit's pin order
    Composite(&'a [Port]),
}

/// An owned instance of another circuit behind a composite gate
#[derive(Debug, Clone)]
pub struct Composite {
    circuit: Box<Circuit>,
    /// Inner pin for each of the gate's ports, same order
    pins: Vec<PortRef>,
}

impl Composite {
    /// Returns the inner circuit instance
    pub fn get_circuit(&self) -> &Circuit {
        &self.circuit
    }

    /// Returns the inner pin backing each port of the gate
    pub fn get_pins(&self) -> &[PortRef] {
        &self.pins
    }

    /// Pushes changed inputs into the inner circuit and pulls the outer outputs back out
    fn evaluate(&mut self, ports: &mut BoundedVec<Port>) -> Result<Vec<usize>> {
        for (port, pin) in ports.iter().zip(self.pins.iter()) {
            if port.is_input() && self.circuit.state(*pin) != Some(port.get_state()) {
                self.circuit.set_state(*pin, port.get_state())?;
            }
        }

        let mut changed = Vec::new();
        for (i, (port, pin)) in ports.iter_mut().zip(self.pins.iter()).enumerate() {
            if !port.is_output() {
                continue;
            }
            let state = self.circuit.state(*pin).ok_or_else(|| Error::PortNotFound {
                gate: self.circuit.get_name().into(),
                port: port.get_name().clone(),
            })?;
            if port.set_state(state) {
                changed.push(i);
            }
        }
        Ok(changed)
    }
}

/// A gate owned by a circuit
#[derive(Debug, Clone)]
pub struct Gate {
    id: Identifier,
    gate_type: GateType,
    index: GateId,
    ports: BoundedVec<Port>,
    composite: Option<Composite>,
}

impl Gate {
    /// Creates a gate with no ports. Call [Gate::set_ports] before using it.
    pub fn new(id: Identifier, gate_type: GateType, port_capacity: usize) -> Self {
        Self {
            id,
            gate_type,
            index: GateId(0),
            ports: BoundedVec::with_capacity(port_capacity),
            composite: None,
        }
    }

    /// Creates a gate with an explicit port list, bypassing type resolution.
    /// The layout is only checked when the gate is evaluated.
    pub(crate) fn with_ports(
        id: Identifier,
        gate_type: GateType,
        ports: impl IntoIterator<Item = (Identifier, Direction)>,
        port_capacity: usize,
    ) -> Result<Self> {
        let mut gate = Self::new(id, gate_type, port_capacity);
        for (name, direction) in ports {
            gate.ports.push(Port::new(name, direction, gate.index))?;
        }
        Ok(gate)
    }

    /// Attaches the ports required by the gate's type.
    ///
    /// `pin` names the single port of an IN or OUT gate and is ignored otherwise.
    /// Custom types are looked up by name in `dependencies` and flattened.
    /// On error the gate keeps no ports.
    pub fn set_ports(&mut self, pin: Option<Identifier>, dependencies: &[Circuit]) -> Result<()> {
        let mut ports = BoundedVec::with_capacity(self.ports.capacity());
        self.ports.clear();
        self.composite = None;

        match &self.gate_type {
            GateType::Primitive(p) => match p {
                Primitive::And | Primitive::Or => {
                    ports.push(self.new_port(Input, 0, None))?;
                    ports.push(self.new_port(Input, 1, None))?;
                    ports.push(self.new_port(Output, 0, None))?;
                }
                Primitive::Not => {
                    ports.push(self.new_port(Input, 0, None))?;
                    ports.push(self.new_port(Output, 0, None))?;
                }
                Primitive::In => ports.push(self.new_port(Output, 0, pin))?,
                Primitive::Out => ports.push(self.new_port(Input, 0, pin))?,
            },
            GateType::Custom(name) => {
                let Some(circuit) = dependencies.iter().find(|c| c.get_name() == name) else {
                    warn!(gate = %self.id, gate_type = %name, "failed to set ports");
                    return Err(Error::UnknownGateType {
                        gate: self.id.clone(),
                        gate_type: name.clone(),
                    });
                };
                self.composite = Some(self.flatten(circuit, &mut ports)?);
            }
        }

        self.ports = ports;
        Ok(())
    }

    fn new_port(&self, direction: Direction, index: usize, name: Option<Identifier>) -> Port {
        let name = name.unwrap_or_else(|| Identifier::default_port_name(direction, index));
        Port::new(name, direction, self.index)
    }

    /// Copies the IN/OUT pins of `circuit` onto `ports`, in declaration order
    fn flatten(&self, circuit: &Circuit, ports: &mut BoundedVec<Port>) -> Result<Composite> {
        let mut pins = Vec::new();
        for g in circuit.gates() {
            let direction = match g.gate_type {
                GateType::Primitive(Primitive::In) => Input,
                GateType::Primitive(Primitive::Out) => Output,
                _ => continue,
            };

            // An IN gate drives its pin, so the composite reads it, and vice versa.
            let pin = g
                .ports
                .get(0)
                .filter(|p| p.get_direction() != direction)
                .ok_or_else(|| Error::MalformedCompositeInterface {
                    circuit: circuit.get_name().to_string(),
                    gate: g.id.clone(),
                })?;

            ports.push(Port::new(pin.get_name().clone(), direction, self.index))?;
            pins.push(PortRef::new(g.index, 0));
        }

        debug!(
            gate = %self.id,
            circuit = circuit.get_name(),
            pins = pins.len(),
            "flattened composite interface"
        );

        Ok(Composite {
            circuit: Box::new(circuit.clone()),
            pins,
        })
    }

    /// Returns the id of the gate
    pub fn get_id(&self) -> &Identifier {
        &self.id
    }

    /// Returns the type of the gate
    pub fn get_type(&self) -> &GateType {
        &self.gate_type
    }

    /// Returns the position of the gate in its circuit
    pub fn get_index(&self) -> GateId {
        self.index
    }

    /// Moves the gate to position `index`, re-stamping the owner of every port
    pub(crate) fn relocate(&mut self, index: GateId) {
        self.index = index;
        for port in self.ports.iter_mut() {
            port.set_owner(index);
        }
    }

    /// Returns `true` once the gate carries ports it can be evaluated with
    pub fn is_resolved(&self) -> bool {
        match self.gate_type {
            GateType::Primitive(_) => !self.ports.is_empty(),
            GateType::Custom(_) => self.composite.is_some(),
        }
    }

    /// Returns the inner circuit of a composite gate
    pub fn get_composite(&self) -> Option<&Composite> {
        self.composite.as_ref()
    }

    /// Iterates over the ports in order
    pub fn ports(&self) -> impl Iterator<Item = &Port> {
        self.ports.iter()
    }

    /// Returns the number of ports
    pub fn num_ports(&self) -> usize {
        self.ports.len()
    }

    /// Returns the port at position `index`
    pub fn get_port(&self, index: usize) -> Option<&Port> {
        self.ports.get(index)
    }

    pub(crate) fn get_port_mut(&mut self, index: usize) -> Option<&mut Port> {
        self.ports.get_mut(index)
    }

    /// Returns the position of the port called `name`
    pub fn find_port(&self, name: &str) -> Option<usize> {
        self.ports.iter().position(|p| p.get_name().get_name() == name)
    }

    /// Returns the port called `name`
    pub fn get_port_by_name(&self, name: &str) -> Option<&Port> {
        self.find_port(name).map(|i| &self.ports[i])
    }

    /// Iterates over the input ports with their positions
    pub fn inputs(&self) -> impl Iterator<Item = (usize, &Port)> {
        self.ports.iter().enumerate().filter(|(_, p)| p.is_input())
    }

    /// Iterates over the output ports with their positions
    pub fn outputs(&self) -> impl Iterator<Item = (usize, &Port)> {
        self.ports.iter().enumerate().filter(|(_, p)| p.is_output())
    }

    /// Returns the ports under their role names, checking the layout first
    pub fn pins(&self) -> Result<Pins<'_>> {
        let primitive = match &self.gate_type {
            GateType::Primitive(p) => *p,
            GateType::Custom(_) => return Ok(Pins::Composite(self.ports.as_slice())),
        };

        let expected = primitive.layout();
        if !self
            .ports
            .iter()
            .map(Port::get_direction)
            .eq(expected.iter().copied())
        {
            return Err(Error::PortShapeViolation {
                gate: self.id.clone(),
                gate_type: primitive.to_string(),
                expected: expected.to_vec(),
                actual: self.ports.iter().map(Port::get_direction).collect(),
            });
        }

        let p = self.ports.as_slice();
        Ok(match primitive {
            Primitive::And | Primitive::Or => Pins::Binary {
                a: &p[0],
                b: &p[1],
                y: &p[2],
            },
            Primitive::Not => Pins::Unary { a: &p[0], y: &p[1] },
            Primitive::In => Pins::Source { y: &p[0] },
            Primitive::Out => Pins::Sink { a: &p[0] },
        })
    }

    /// Recomputes the outputs from the current inputs.
    /// Returns the positions of the output ports whose state changed.
    pub(crate) fn evaluate(&mut self) -> Result<Vec<usize>> {
        match self.gate_type {
            GateType::Primitive(p) => self.evaluate_primitive(p),
            GateType::Custom(ref name) => match self.composite.as_mut() {
                Some(composite) => composite.evaluate(&mut self.ports),
                None => Err(Error::UnknownGateType {
                    gate: self.id.clone(),
                    gate_type: name.clone(),
                }),
            },
        }
    }

    fn evaluate_primitive(&mut self, primitive: Primitive) -> Result<Vec<usize>> {
        let (value, y) = match self.pins()? {
            Pins::Binary { a, b, y } => match primitive {
                Primitive::And => (a.get_state() && b.get_state(), y),
                _ => (a.get_state() || b.get_state(), y),
            },
            Pins::Unary { a, y } => (!a.get_state(), y),
            // IN holds what was driven, OUT only observes
            Pins::Source { .. } | Pins::Sink { .. } | Pins::Composite(_) => return Ok(Vec::new()),
        };

        let y = self.position_of(y).ok_or_else(|| Error::PortNotFound {
            gate: self.id.clone(),
            port: y.get_name().clone(),
        })?;
        if self.ports[y].set_state(value) {
            Ok(vec![y])
        } else {
            Ok(Vec::new())
        }
    }

    /// Returns the position of a port borrowed from this gate
    fn position_of(&self, port: &Port) -> Option<usize> {
        self.ports.iter().position(|p| std::ptr::eq(p, port))
    }
}

impl std::fmt::Display for Gate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "{{ {} [{}] }}", self.id, self.gate_type)?;
        for port in self.ports.iter() {
            writeln!(f, "\t{port}")?;
        }
        Ok(())
    }
}
