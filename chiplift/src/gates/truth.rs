//! Truth tables for recognized combinational gates.

use std::fmt;

use arcstr::ArcStr;
use serde::{Deserialize, Serialize};

/// A truth table over an ordered list of inputs.
///
/// Row `i` assigns bit `(i >> j) & 1` to `inputs[j]`, so `inputs[0]` is the
/// least significant bit of the row index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthTable {
    inputs: Vec<ArcStr>,
    table: Vec<u8>,
}

impl TruthTable {
    /// Creates a truth table.
    ///
    /// # Panics
    ///
    /// Panics if `table` does not have exactly `2^inputs.len()` rows.
    pub fn new(inputs: Vec<ArcStr>, table: Vec<u8>) -> Self {
        assert_eq!(table.len(), 1 << inputs.len());
        Self { inputs, table }
    }

    /// The input names, least significant bit first.
    pub fn inputs(&self) -> &[ArcStr] {
        &self.inputs
    }

    /// The output column, indexed by input assignment.
    pub fn table(&self) -> &[u8] {
        &self.table
    }

    /// The output column as a bit string, row 0 first.
    pub fn output_string(&self) -> String {
        self.table.iter().map(|b| char::from(b'0' + b)).collect()
    }
}

impl fmt::Display for TruthTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (j, input) in self.inputs.iter().enumerate() {
            writeln!(f, "bit {j}: {input}")?;
        }
        write!(f, "{}", self.output_string())
    }
}
