/*!

  Errors raised while building, wiring and simulating circuits.

*/

use crate::port::{Direction, Identifier};

/// The error type for every fallible operation in this crate.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The type tag names neither a primitive nor a supplied dependency circuit
    #[error("unknown gate type '{gate_type}' for gate '{gate}'")]
    UnknownGateType {
        /// The gate being resolved
        gate: Identifier,
        /// The offending type tag
        gate_type: String,
    },
    /// A gate id or port name did not resolve
    #[error("port '{port}' not found on gate '{gate}'")]
    PortNotFound {
        /// The gate that was searched
        gate: Identifier,
        /// The port name that missed
        port: Identifier,
    },
    /// Only the pin of an IN gate can be driven from outside
    #[error("port '{port}' of gate '{gate}' is not an external input pin")]
    NotAnInputPin {
        /// The gate that was addressed
        gate: Identifier,
        /// The port that was addressed
        port: Identifier,
    },
    /// An IN/OUT gate of a referenced circuit has no usable pin
    #[error("circuit '{circuit}' has a malformed interface pin at gate '{gate}'")]
    MalformedCompositeInterface {
        /// The referenced circuit
        circuit: String,
        /// The IN/OUT gate without a pin
        gate: Identifier,
    },
    /// A gate's ports do not match the layout its type requires
    #[error("gate '{gate}' of type {gate_type} expected ports {expected:?}, found {actual:?}")]
    PortShapeViolation {
        /// The evaluated gate
        gate: Identifier,
        /// The gate's type tag
        gate_type: String,
        /// The required layout
        expected: Vec<Direction>,
        /// The layout actually present
        actual: Vec<Direction>,
    },
    /// A bounded collection is full
    #[error("container overflow: capacity of {capacity} exceeded")]
    ContainerOverflow {
        /// The configured capacity
        capacity: usize,
    },
    /// Two gates in one circuit share an id
    #[error("gate '{gate}' is declared twice")]
    DuplicateGate {
        /// The repeated id
        gate: Identifier,
    },
    /// Two circuits in one library share a name
    #[error("circuit '{0}' is already registered")]
    DuplicateCircuit(String),
    /// A wire does not go from an OUTPUT port to an undriven INPUT port
    #[error("cannot connect {from} to {to}: {reason}")]
    InvalidConnection {
        /// The driving endpoint
        from: String,
        /// The driven endpoint
        to: String,
        /// Why the wire was rejected
        reason: String,
    },
    /// Propagation exceeded the configured number of gate evaluations
    #[error("propagation in '{circuit}' did not settle after {steps} gate evaluations")]
    PropagationDidNotConverge {
        /// The circuit being simulated
        circuit: String,
        /// The evaluation budget that was exhausted
        steps: usize,
    },
    /// The wiring contains a combinational loop
    #[error("combinational cycle through gate '{gate}'")]
    CycleDetected {
        /// A gate on the cycle
        gate: Identifier,
    },
    /// The circuit has no OUT pins
    #[error("circuit '{0}' has no outputs")]
    NoOutputs(String),
    /// Too many IN pins to enumerate exhaustively
    #[error("{inputs} inputs exceed the truth table limit of {limit}")]
    TruthTableTooWide {
        /// Number of IN pins
        inputs: usize,
        /// Configured maximum
        limit: usize,
    },
}

/// Result alias with [Error] as the error type.
pub type Result<T> = std::result::Result<T, Error>;
