//! Geometric extraction: transistors where poly crosses diff, and contacts
//! classified by the layers they bridge.

use std::fmt;

use arcstr::ArcStr;
use diagnostics::{Diagnostic, IssueSet, Severity};
use geometry::{Point, Polygon};

use crate::gates::Transistor;
use crate::layers::Drawing;

/// An issue found during extraction.
#[derive(Debug, Clone)]
pub enum ExtractIssue {
    /// A contact bridging fewer or more than two layers. The contact is
    /// ignored.
    IsolatedContact {
        /// The contact's location.
        location: Point,
        /// How many layers the contact touches.
        links: usize,
    },
    /// A gate region touching a number of diffusion regions other than two.
    /// No transistor is produced for it.
    GateElectrodes {
        /// The gate region's location.
        location: Point,
        /// How many diffusion regions touch the gate.
        count: usize,
    },
    /// A gate region with no intersecting poly polygon. Indicates an
    /// internal geometry inconsistency; no transistor is produced.
    GateWithoutPoly {
        /// The gate region's location.
        location: Point,
    },
    /// A transistor name label that lands on no gate region.
    UnmatchedTransistorName {
        /// The label text.
        text: ArcStr,
        /// The label's anchor location.
        location: Point,
    },
}

impl fmt::Display for ExtractIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::IsolatedContact { location, links } => write!(
                f,
                "contact at {location} bridges {links} layer(s), expected 2; ignoring it"
            ),
            Self::GateElectrodes { location, count } => write!(
                f,
                "gate at {location} touches {count} diffusion region(s), expected 2; skipping it"
            ),
            Self::GateWithoutPoly { location } => {
                write!(f, "gate at {location} has no intersecting poly")
            }
            Self::UnmatchedTransistorName { text, location } => {
                write!(f, "transistor name `{text}` at {location} is not on a gate")
            }
        }
    }
}

impl Diagnostic for ExtractIssue {
    fn severity(&self) -> Severity {
        match self {
            Self::IsolatedContact { .. } | Self::UnmatchedTransistorName { .. } => {
                Severity::Warning
            }
            Self::GateElectrodes { .. } | Self::GateWithoutPoly { .. } => Severity::Error,
        }
    }
}

/// A contact classified by the two layer polygons it bridges.
///
/// At most two of the index fields are set. A contact over all three layers
/// shorts them all together, but is recorded as poly-diff; the metal
/// connection is carried by the coincident metal-poly or metal-diff contact
/// that such structures are drawn with.
#[derive(Debug, Clone)]
pub struct Contact {
    /// The contact polygon.
    pub shape: Polygon,
    /// The intersecting metal polygon, if any.
    pub metal: Option<usize>,
    /// The intersecting poly polygon, if any.
    pub poly: Option<usize>,
    /// The intersecting diffusion polygon, if any.
    pub diff: Option<usize>,
}

impl Contact {
    /// The contact's location.
    pub fn location(&self) -> Point {
        self.shape.centroid()
    }
}

/// Finds transistors and rewrites the diffusion layer into non-gate regions.
///
/// A gate is a poly-over-diff intersection not covered by a contact
/// (a contacted crossover is a buried contact, not a transistor). The
/// diffusion layer is replaced by the original diffusion minus poly, plus
/// the contacted crossovers, so that gates split their diffusion into
/// separate electrode regions.
pub fn extract_transistors(
    drawing: &mut Drawing,
    issues: &mut IssueSet<ExtractIssue>,
) -> Vec<Transistor> {
    let crossovers = geometry::intersection(&drawing.diff, &drawing.poly);
    let (contacted, gates): (Vec<_>, Vec<_>) = crossovers
        .into_iter()
        .partition(|x| drawing.contacts.iter().any(|c| x.intersects(c)));

    let nongate = geometry::union(
        &geometry::difference(&drawing.diff, &drawing.poly),
        &contacted,
    );
    drawing.replace_diff(nongate);

    let mut qs = Vec::new();
    for gate in gates {
        let electrodes: Vec<usize> = drawing
            .diff
            .iter()
            .enumerate()
            .filter(|(_, d)| gate.touches(d))
            .map(|(i, _)| i)
            .collect();
        if electrodes.len() != 2 {
            issues.add_and_log(ExtractIssue::GateElectrodes {
                location: gate.centroid(),
                count: electrodes.len(),
            });
            continue;
        }
        let Some(poly) = drawing.poly.iter().position(|p| gate.intersects(p)) else {
            issues.add_and_log(ExtractIssue::GateWithoutPoly {
                location: gate.centroid(),
            });
            continue;
        };
        let name = arcstr::format!("{}", qs.len());
        qs.push(Transistor::new(
            name,
            poly,
            electrodes[0],
            electrodes[1],
            gate,
        ));
    }

    log_gate_stats(&qs);
    qs
}

fn log_gate_stats(qs: &[Transistor]) {
    if qs.is_empty() {
        tracing::info!("no transistors found");
        return;
    }
    let mut areas: Vec<f64> = qs.iter().map(|q| q.shape.area()).collect();
    areas.sort_by(f64::total_cmp);
    let n = areas.len();
    let mean = areas.iter().sum::<f64>() / n as f64;
    let median = if n % 2 == 1 {
        areas[n / 2]
    } else {
        (areas[n / 2 - 1] + areas[n / 2]) / 2.0
    };
    let variance = areas.iter().map(|a| (a - mean) * (a - mean)).sum::<f64>() / n as f64;
    tracing::info!(
        count = n,
        min = areas[0],
        max = areas[n - 1],
        mean,
        median,
        stdev = variance.sqrt(),
        "gate area statistics"
    );
}

/// Attaches transistor name labels to the gates they land on.
///
/// Unmatched labels are reported; unlabeled transistors keep their running
/// number.
pub fn attach_transistor_names(
    qs: &mut [Transistor],
    drawing: &Drawing,
    issues: &mut IssueSet<ExtractIssue>,
) {
    for label in &drawing.qnames {
        match qs.iter_mut().find(|q| label.anchor.intersects(&q.shape)) {
            Some(q) => q.name = label.text.clone(),
            None => issues.add_and_log(ExtractIssue::UnmatchedTransistorName {
                text: label.text.clone(),
                location: label.anchor.midpoint(),
            }),
        }
    }
}

/// Classifies contacts by the layer polygons they intersect.
///
/// Must run after [`extract_transistors`], which rewrites the diffusion
/// layer. For each layer the first intersecting polygon in canonical order
/// is taken. Contacts bridging anything other than exactly two layers are
/// reported and dropped.
pub fn extract_contacts(drawing: &Drawing, issues: &mut IssueSet<ExtractIssue>) -> Vec<Contact> {
    let mut contacts = Vec::new();
    for shape in &drawing.contacts {
        let find = |layer: &[Polygon]| layer.iter().position(|p| shape.intersects(p));
        let mut contact = Contact {
            shape: shape.clone(),
            metal: find(&drawing.metal),
            poly: find(&drawing.poly),
            diff: find(&drawing.diff),
        };
        if contact.metal.is_some() && contact.poly.is_some() && contact.diff.is_some() {
            contact.metal = None;
        }
        let links = [contact.metal, contact.poly, contact.diff]
            .iter()
            .flatten()
            .count();
        if links != 2 {
            issues.add_and_log(ExtractIssue::IsolatedContact {
                location: contact.location(),
                links,
            });
            continue;
        }
        contacts.push(contact);
    }
    tracing::info!(count = contacts.len(), "classified contacts");
    contacts
}
