/*!

  Exhaustive truth tables of a circuit's external pins.

*/

use crate::circuit::Circuit;
use crate::error::{Error, Result};
use crate::port::{Identifier, PortRef};
use bitvec::vec::BitVec;

/// One column per OUT pin, one bit per input assignment.
///
/// Row `r` assigns bit `i` of `r` to the `i`th IN pin, so the first declared
/// input is the least significant.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TruthTable {
    inputs: Vec<Identifier>,
    outputs: Vec<Identifier>,
    columns: Vec<BitVec>,
}

impl TruthTable {
    /// Sweeps every input assignment on a copy of `circuit`
    pub fn build(circuit: &Circuit) -> Result<Self> {
        let input_pins: Vec<_> = circuit.input_pins().collect();
        let output_pins: Vec<_> = circuit.output_pins().collect();

        let limit = circuit.get_config().max_truth_table_inputs;
        if input_pins.len() > limit {
            return Err(Error::TruthTableTooWide {
                inputs: input_pins.len(),
                limit,
            });
        }

        let name_of = |p: PortRef| {
            circuit
                .get_port(p)
                .map(|port| port.get_name().clone())
                .unwrap_or_else(|| p.to_string().into())
        };
        let inputs = input_pins.iter().copied().map(name_of).collect();
        let outputs = output_pins.iter().copied().map(name_of).collect();

        let rows = 1usize
            .checked_shl(input_pins.len() as u32)
            .ok_or(Error::TruthTableTooWide {
                inputs: input_pins.len(),
                limit,
            })?;
        let mut columns = vec![BitVec::with_capacity(rows); output_pins.len()];
        let mut sim = circuit.clone();
        for row in 0..rows {
            for (i, pin) in input_pins.iter().enumerate() {
                sim.set_state(*pin, (row >> i) & 1 == 1)?;
            }
            for (column, pin) in columns.iter_mut().zip(output_pins.iter()) {
                column.push(sim.state(*pin).unwrap_or(false));
            }
        }

        Ok(Self {
            inputs,
            outputs,
            columns,
        })
    }

    /// Returns the IN pin names, least significant first
    pub fn get_inputs(&self) -> &[Identifier] {
        &self.inputs
    }

    /// Returns the OUT pin names
    pub fn get_outputs(&self) -> &[Identifier] {
        &self.outputs
    }

    /// Returns the number of rows
    pub fn num_rows(&self) -> usize {
        1 << self.inputs.len()
    }

    /// Returns the column of the OUT pin called `name`
    pub fn get_column(&self, name: &str) -> Option<&BitVec> {
        let i = self.outputs.iter().position(|o| o.get_name() == name)?;
        self.columns.get(i)
    }

    /// Returns the value of every OUT pin for the input assignment `row`
    pub fn get_row(&self, row: usize) -> Option<Vec<bool>> {
        if row >= self.num_rows() {
            return None;
        }
        Some(self.columns.iter().map(|c| c[row]).collect())
    }
}

impl std::fmt::Display for TruthTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (name, bv) in self.outputs.iter().zip(self.columns.iter()) {
            writeln!(
                f,
                "{} = {}'b{}",
                name,
                bv.len(),
                bv.iter()
                    .rev()
                    .map(|b| if *b { '1' } else { '0' })
                    .collect::<String>()
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::template::Template;

    fn and_circuit(config: &Config) -> Result<Circuit> {
        let t = Template::new("and2")
            .pin("a", "IN", "A")
            .pin("b", "IN", "B")
            .gate("g", "AND")
            .pin("y", "OUT", "Y")
            .wire(("a", "A"), ("g", "I0"))
            .wire(("b", "B"), ("g", "I1"))
            .wire(("g", "O0"), ("y", "Y"));
        Circuit::build_with(&t, &[], config)
    }

    #[test]
    fn and_table() {
        let circuit = and_circuit(&Config::default()).unwrap();
        let table = TruthTable::build(&circuit).unwrap();
        assert_eq!(table.num_rows(), 4);
        assert_eq!(
            table.get_inputs(),
            [Identifier::from("A"), Identifier::from("B")]
        );
        assert_eq!(table.get_row(3), Some(vec![true]));
        assert_eq!(table.get_row(2), Some(vec![false]));
        assert_eq!(table.get_row(4), None);
        assert_eq!(table.to_string(), "Y = 4'b1000\n");
        // The circuit itself is untouched
        assert_eq!(circuit.read_output("y", "Y"), Ok(false));
    }

    #[test]
    fn too_wide() {
        let config = Config::default().with_max_truth_table_inputs(1);
        let circuit = and_circuit(&config).unwrap();
        assert_eq!(
            TruthTable::build(&circuit),
            Err(Error::TruthTableTooWide {
                inputs: 2,
                limit: 1
            })
        );
    }
}
