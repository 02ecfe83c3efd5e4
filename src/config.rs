/*!

  Limits applied while building and simulating circuits.

*/

/// Capacities and budgets used by [crate::circuit::Circuit::build_with].
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct Config {
    /// Maximum number of ports on a single gate
    pub port_capacity: usize,
    /// Maximum number of gates in a single circuit
    pub gate_capacity: usize,
    /// Gate evaluations allowed for one state change before giving up
    pub max_propagation_steps: usize,
    /// Reject circuits with combinational loops at build time
    pub check_cycles: bool,
    /// Widest circuit [crate::table::TruthTable] will enumerate
    pub max_truth_table_inputs: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port_capacity: 64,
            gate_capacity: 4096,
            max_propagation_steps: 1 << 20,
            check_cycles: true,
            max_truth_table_inputs: 16,
        }
    }
}

impl Config {
    /// Sets the per-gate port capacity
    pub fn with_port_capacity(mut self, capacity: usize) -> Self {
        self.port_capacity = capacity;
        self
    }

    /// Sets the per-circuit gate capacity
    pub fn with_gate_capacity(mut self, capacity: usize) -> Self {
        self.gate_capacity = capacity;
        self
    }

    /// Sets the propagation budget
    pub fn with_max_propagation_steps(mut self, steps: usize) -> Self {
        self.max_propagation_steps = steps;
        self
    }

    /// Enables or disables the build-time cycle check
    pub fn with_cycle_check(mut self, check: bool) -> Self {
        self.check_cycles = check;
        self
    }

    /// Sets the widest circuit a truth table may be built for
    pub fn with_max_truth_table_inputs(mut self, inputs: usize) -> Self {
        self.max_truth_table_inputs = inputs;
        self
    }
}
