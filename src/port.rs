/*!

  Ports: the signal-carrying pins of a gate.

*/

/// A name for a gate or a port
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Identifier {
    name: String,
}

impl Identifier {
    /// Creates a new identifier with the given name
    pub fn new(name: String) -> Self {
        Self { name }
    }

    /// Returns the name of the identifier
    pub fn get_name(&self) -> &str {
        &self.name
    }

    /// Returns the default name of the `index`th port in `direction`: `I0`, `I1`, `O0`...
    pub fn default_port_name(direction: Direction, index: usize) -> Self {
        let prefix = match direction {
            Direction::Input => 'I',
            Direction::Output => 'O',
        };
        Self::new(format!("{prefix}{index}"))
    }
}

impl From<&str> for Identifier {
    fn from(name: &str) -> Self {
        Self::new(name.to_string())
    }
}

impl From<String> for Identifier {
    fn from(name: String) -> Self {
        Self::new(name)
    }
}

impl std::borrow::Borrow<str> for Identifier {
    fn borrow(&self) -> &str {
        &self.name
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// Which way a signal flows through a port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    /// The gate reads this port
    Input,
    /// The gate drives this port
    Output,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Input => write!(f, "input"),
            Direction::Output => write!(f, "output"),
        }
    }
}

/// The position of a gate inside its owning circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GateId(pub(crate) usize);

impl GateId {
    /// Returns the index of the gate within the circuit
    pub fn index(&self) -> usize {
        self.0
    }
}

impl std::fmt::Display for GateId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Addresses one port of one gate inside a circuit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PortRef {
    /// The owning gate
    pub gate: GateId,
    /// Position of the port in the gate's port list
    pub port: usize,
}

impl PortRef {
    /// Creates a reference to port `port` of `gate`
    pub fn new(gate: GateId, port: usize) -> Self {
        Self { gate, port }
    }
}

impl std::fmt::Display for PortRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.gate, self.port)
    }
}

/// A named boolean signal with a fixed direction, owned by exactly one gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    name: Identifier,
    direction: Direction,
    state: bool,
    owner: GateId,
}

impl Port {
    /// Creates a low port owned by `owner`
    pub fn new(name: Identifier, direction: Direction, owner: GateId) -> Self {
        Self {
            name,
            direction,
            state: false,
            owner,
        }
    }

    /// Returns the name of the port
    pub fn get_name(&self) -> &Identifier {
        &self.name
    }

    /// Returns the direction of the port
    pub fn get_direction(&self) -> Direction {
        self.direction
    }

    /// Returns `true` if the port is read by its gate
    pub fn is_input(&self) -> bool {
        self.direction == Direction::Input
    }

    /// Returns `true` if the port is driven by its gate
    pub fn is_output(&self) -> bool {
        self.direction == Direction::Output
    }

    /// Returns the current signal
    pub fn get_state(&self) -> bool {
        self.state
    }

    /// Stores `state` without propagating it. Returns `true` if the value changed.
    ///
    /// Use [crate::circuit::Circuit::set_state] to push the change through the circuit.
    pub fn set_state(&mut self, state: bool) -> bool {
        let changed = self.state != state;
        self.state = state;
        changed
    }

    /// Returns the gate that owns this port
    pub fn get_owner(&self) -> GateId {
        self.owner
    }

    pub(crate) fn set_owner(&mut self, owner: GateId) {
        self.owner = owner;
    }
}

impl std::fmt::Display for Port {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) = {}",
            self.name,
            self.direction,
            if self.state { 1 } else { 0 }
        )
    }
}
