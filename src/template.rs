/*!

  The already-parsed description a [crate::circuit::Circuit] is built from.

  A template lists gates in declaration order and a wiring table from
  `(gate, OUTPUT port)` to the `(gate, INPUT port)` endpoints it feeds.
  Reading templates off disk is left to the caller.

*/

use crate::port::Identifier;

/// One gate of a template
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GateDecl {
    /// Unique id within the template
    pub id: Identifier,
    /// A primitive tag (`AND`, `OR`, `NOT`, `IN`, `OUT`) or a circuit name
    pub gate_type: String,
    /// External pin name of an IN or OUT gate
    #[cfg_attr(feature = "serde", serde(default))]
    pub pin: Option<Identifier>,
}

/// A named port on a named gate
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Endpoint {
    /// The gate id
    pub gate: Identifier,
    /// The port name on that gate
    pub port: Identifier,
}

impl Endpoint {
    /// Creates an endpoint for `port` on `gate`
    pub fn new(gate: Identifier, port: Identifier) -> Self {
        Self { gate, port }
    }
}

impl From<(&str, &str)> for Endpoint {
    fn from((gate, port): (&str, &str)) -> Self {
        Self::new(gate.into(), port.into())
    }
}

impl std::fmt::Display for Endpoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.gate, self.port)
    }
}

/// All the INPUT ports one OUTPUT port feeds
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Wire {
    /// The driving OUTPUT port
    pub from: Endpoint,
    /// The driven INPUT ports
    pub to: Vec<Endpoint>,
}

/// A parsed circuit description
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Template {
    /// The circuit name other templates refer to it by
    pub name: String,
    /// Gates in declaration order
    pub gates: Vec<GateDecl>,
    /// The wiring table
    #[cfg_attr(feature = "serde", serde(default))]
    pub wires: Vec<Wire>,
}

impl Template {
    /// Creates an empty template
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            gates: Vec::new(),
            wires: Vec::new(),
        }
    }

    /// Declares a gate
    pub fn gate(mut self, id: &str, gate_type: &str) -> Self {
        self.gates.push(GateDecl {
            id: id.into(),
            gate_type: gate_type.to_string(),
            pin: None,
        });
        self
    }

    /// Declares an IN or OUT gate with an external pin name
    pub fn pin(mut self, id: &str, gate_type: &str, pin: &str) -> Self {
        self.gates.push(GateDecl {
            id: id.into(),
            gate_type: gate_type.to_string(),
            pin: Some(pin.into()),
        });
        self
    }

    /// Connects an OUTPUT port to an INPUT port
    pub fn wire(mut self, from: impl Into<Endpoint>, to: impl Into<Endpoint>) -> Self {
        let from = from.into();
        let to = to.into();
        match self.wires.iter_mut().find(|w| w.from == from) {
            Some(w) => {
                if !w.to.contains(&to) {
                    w.to.push(to);
                }
            }
            None => self.wires.push(Wire { from, to: vec![to] }),
        }
        self
    }

    /// Iterates over every `(driver, sink)` pair in the wiring table
    pub fn connections(&self) -> impl Iterator<Item = (&Endpoint, &Endpoint)> {
        self.wires
            .iter()
            .flat_map(|w| w.to.iter().map(move |to| (&w.from, to)))
    }

    #[cfg(feature = "serde")]
    /// Reads a template from JSON
    pub fn from_json(reader: impl std::io::Read) -> Result<Self, serde_json::Error> {
        serde_json::from_reader(reader)
    }

    #[cfg(feature = "serde")]
    /// Writes the template as pretty-printed JSON
    pub fn to_json(&self, writer: impl std::io::Write) -> Result<(), serde_json::Error> {
        serde_json::to_writer_pretty(writer, self)
    }
}
