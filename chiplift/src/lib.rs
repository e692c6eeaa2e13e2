//! Netlist reconstruction and gate recognition for traced NMOS integrated
//! circuits.
//!
//! The input is a [`Drawing`](layers::Drawing): polygons traced over die
//! photographs on the contact, poly, diff, and metal layers, plus text labels
//! naming signals, transistors, and pins. The analysis proceeds in three
//! stages:
//!
//! 1. [`extract`] finds transistors where poly crosses diff and classifies
//!    contacts by the layers they bridge.
//! 2. [`netlist`] builds a connectivity graph over layer regions and
//!    transistor terminals and collapses it into named nets.
//! 3. [`gates`] runs a sequence of structural recognition passes over the
//!    transistor pool, lifting transistors into logic gates.
//!
//! The result can be serialized as a [`snapshot`] for regression comparison
//! across revisions of a tracing.

#![warn(missing_docs)]

pub mod error;
pub mod extract;
pub mod gates;
pub mod layers;
pub mod netlist;
pub mod snapshot;

#[cfg(test)]
pub(crate) mod tests;

use diagnostics::IssueSet;
use geometry::Rect;

pub use error::Error;
use gates::{Gates, Transistor};
use layers::Drawing;
use netlist::Netlist;
use snapshot::Snapshot;

/// Power net name prefixes, matched case-sensitively.
pub const POWER_PREFIXES: [&str; 2] = ["VCC", "VDD"];

/// Ground net name prefixes, matched case-sensitively.
pub const GROUND_PREFIXES: [&str; 2] = ["VSS", "GND"];

/// Returns `true` if `net` names a power net.
pub fn is_power_net(net: &str) -> bool {
    POWER_PREFIXES.iter().any(|p| net.starts_with(p))
}

/// Returns `true` if `net` names a ground net.
pub fn is_ground_net(net: &str) -> bool {
    GROUND_PREFIXES.iter().any(|p| net.starts_with(p))
}

/// The result of analyzing a drawing.
pub struct Analysis {
    /// The reconstructed netlist.
    pub netlist: Netlist,
    /// The extracted transistors, with nets assigned, in extraction order.
    pub qs: Vec<Transistor>,
    /// The gate recognition engine, holding all recognized gates and any
    /// transistors left unallocated.
    pub gates: Gates,
    /// Pin name labels from the drawing.
    pub pins: Vec<layers::Label>,
    /// The drawing's bounding box.
    pub bounding_box: Option<Rect>,
    /// Issues found while extracting transistors and contacts.
    pub extract_issues: IssueSet<extract::ExtractIssue>,
    /// Issues found while building the netlist.
    pub net_issues: IssueSet<netlist::NetIssue>,
}

impl Analysis {
    /// Captures a regression snapshot of this analysis.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot::new(&self.netlist, &self.qs, &self.pins, self.bounding_box)
    }
}

/// Runs the full analysis pipeline on a drawing.
///
/// Returns an error for conditions that invalidate all downstream output:
/// a self-crossing traced polygon, a power-to-ground short, or conflicting
/// signal names on a single net.
pub fn analyze(mut drawing: Drawing) -> Result<Analysis, Error> {
    drawing.validate()?;
    drawing.normalize();

    let mut extract_issues = IssueSet::new();
    let mut qs = extract::extract_transistors(&mut drawing, &mut extract_issues);
    let contacts = extract::extract_contacts(&drawing, &mut extract_issues);
    extract::attach_transistor_names(&mut qs, &drawing, &mut extract_issues);

    let mut net_issues = IssueSet::new();
    let netlist = netlist::build(&drawing, &contacts, &mut qs, &mut net_issues)?;
    let bounding_box = drawing.bounding_box();

    let mut gates = Gates::new(&netlist, qs.clone(), drawing.pnames.clone());
    gates.recognize();

    Ok(Analysis {
        netlist,
        qs,
        gates,
        pins: drawing.pnames,
        bounding_box,
        extract_issues,
        net_issues,
    })
}
