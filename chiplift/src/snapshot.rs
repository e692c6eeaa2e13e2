//! Analysis snapshots for regression comparison.
//!
//! A snapshot captures the reconstructed netlist, the extracted transistors,
//! the pin names, and the drawing's bounding box. Snapshots taken from two
//! revisions of a tracing can be compared structurally to confirm that
//! retracing did not change the circuit.

use std::collections::HashMap;
use std::io;

use arcstr::ArcStr;
use geometry::{Rect, Segment};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::gates::Transistor;
use crate::layers::Label;
use crate::netlist::{Net, Netlist, Role, Terminal};

/// One transistor terminal in a snapshot, keyed by transistor name rather
/// than index so snapshots survive retracing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotTerminal {
    /// The terminal role.
    pub role: Role,
    /// The transistor name.
    pub q: ArcStr,
}

/// A serializable capture of an analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snapshot {
    /// All nets, keyed by name, with their terminals.
    pub nets: IndexMap<ArcStr, Vec<SnapshotTerminal>>,
    /// All extracted transistors.
    pub qs: Vec<Transistor>,
    /// Pin names.
    pub pins: Vec<ArcStr>,
    /// The drawing's bounding box.
    pub bounding_box: Option<Rect>,
}

impl Snapshot {
    /// Captures a snapshot of an analyzed drawing.
    pub fn new(
        netlist: &Netlist,
        qs: &[Transistor],
        pins: &[Label],
        bounding_box: Option<Rect>,
    ) -> Self {
        let nets = netlist
            .nets
            .iter()
            .map(|(name, net)| {
                let terminals = net
                    .iter()
                    .map(|t| SnapshotTerminal {
                        role: t.role,
                        q: qs[t.q].name.clone(),
                    })
                    .collect();
                (name.clone(), terminals)
            })
            .collect();
        Self {
            nets,
            qs: qs.to_vec(),
            pins: pins.iter().map(|p| p.text.clone()).collect(),
            bounding_box,
        }
    }

    /// Rebuilds the netlist, transistors, and pin labels captured by this
    /// snapshot, so gate recognition can rerun without the drawing.
    ///
    /// Terminals naming a transistor absent from the snapshot are dropped.
    /// Pin labels are restored with placeholder anchors; recognition only
    /// reads their text.
    pub fn resume(&self) -> (Netlist, Vec<Transistor>, Vec<Label>) {
        let index: HashMap<&ArcStr, usize> = self
            .qs
            .iter()
            .enumerate()
            .map(|(i, q)| (&q.name, i))
            .collect();
        let nets = self
            .nets
            .iter()
            .map(|(name, terminals)| {
                let net: Net = terminals
                    .iter()
                    .filter_map(|t| index.get(&t.q).map(|&q| Terminal { role: t.role, q }))
                    .collect();
                (name.clone(), net)
            })
            .collect();
        let pins = self
            .pins
            .iter()
            .map(|text| Label::new(text.clone(), Segment::default()))
            .collect();
        (Netlist { nets }, self.qs.clone(), pins)
    }

    /// Serializes the snapshot as JSON.
    pub fn to_writer<W: io::Write>(&self, writer: W) -> Result<(), Error> {
        serde_json::to_writer_pretty(writer, self)?;
        Ok(())
    }

    /// Deserializes a snapshot from JSON.
    pub fn from_reader<R: io::Read>(reader: R) -> Result<Self, Error> {
        Ok(serde_json::from_reader(reader)?)
    }
}
