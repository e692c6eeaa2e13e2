//! Transistors and net-oriented predicates over them.

use arcstr::ArcStr;
use geometry::{Point, Polygon};
use serde::{Deserialize, Serialize};

use crate::{is_ground_net, is_power_net};

/// An NMOS transistor extracted from the drawing.
///
/// `gate` indexes the poly layer; `electrode0` and `electrode1` index the
/// (rewritten, non-gate) diffusion layer. Electrode indices are ordered by
/// the canonical ordering of the diffusion polygons, so electrode numbering
/// is independent of tracing order. Net names are empty until netlist
/// construction assigns them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transistor {
    /// The transistor name, from a name label or a running number.
    pub name: ArcStr,
    /// The index of the poly polygon forming the gate.
    pub gate: usize,
    /// The index of the first electrode's diffusion polygon.
    pub electrode0: usize,
    /// The index of the second electrode's diffusion polygon.
    pub electrode1: usize,
    /// The gate-region polygon (poly over diff).
    pub shape: Polygon,
    /// The net attached to the gate.
    pub gate_net: ArcStr,
    /// The net attached to electrode 0.
    pub electrode0_net: ArcStr,
    /// The net attached to electrode 1.
    pub electrode1_net: ArcStr,
    /// For a merged parallel group, the member transistors. Empty for a
    /// physical transistor.
    pub components: Vec<Transistor>,
}

impl Transistor {
    /// Creates a new transistor with unassigned nets.
    pub fn new(
        name: impl Into<ArcStr>,
        gate: usize,
        electrode0: usize,
        electrode1: usize,
        shape: Polygon,
    ) -> Self {
        Self {
            name: name.into(),
            gate,
            electrode0,
            electrode1,
            shape,
            gate_net: ArcStr::new(),
            electrode0_net: ArcStr::new(),
            electrode1_net: ArcStr::new(),
            components: Vec::new(),
        }
    }

    /// Merges electrically parallel transistors (same gate net, same
    /// electrode nets) into one logical transistor.
    ///
    /// The merged transistor takes its name, indices, and nets from the
    /// first member and records all members in `components`.
    pub fn parallel(components: Vec<Transistor>) -> Self {
        debug_assert!(components.len() >= 2);
        let rep = components[0].clone();
        Self {
            components,
            ..rep
        }
    }

    /// The number of physical transistors this transistor stands for.
    pub fn num_qs(&self) -> usize {
        if self.components.is_empty() {
            1
        } else {
            self.components.iter().map(Transistor::num_qs).sum()
        }
    }

    /// The centroid of the gate region.
    pub fn centroid(&self) -> Point {
        self.shape.centroid()
    }

    /// Returns `true` if either electrode is on a ground net.
    pub fn is_grounding(&self) -> bool {
        is_ground_net(&self.electrode0_net) || is_ground_net(&self.electrode1_net)
    }

    /// Returns `true` if either electrode is on a power net.
    pub fn is_powering(&self) -> bool {
        is_power_net(&self.electrode0_net) || is_power_net(&self.electrode1_net)
    }

    /// For a grounding transistor, the electrode net that is not ground.
    ///
    /// Returns [`None`] if both electrodes are grounded.
    pub fn nongrounded_electrode_net(&self) -> Option<&ArcStr> {
        if is_ground_net(&self.electrode0_net) {
            if is_ground_net(&self.electrode1_net) {
                None
            } else {
                Some(&self.electrode1_net)
            }
        } else {
            Some(&self.electrode0_net)
        }
    }

    /// For a grounding transistor, the electrode net that is ground.
    pub fn grounded_electrode_net(&self) -> Option<&ArcStr> {
        if is_ground_net(&self.electrode0_net) {
            Some(&self.electrode0_net)
        } else if is_ground_net(&self.electrode1_net) {
            Some(&self.electrode1_net)
        } else {
            None
        }
    }

    /// For a powering transistor, the electrode net that is not power.
    ///
    /// Returns [`None`] if both electrodes are powered.
    pub fn nonpower_electrode_net(&self) -> Option<&ArcStr> {
        if is_power_net(&self.electrode0_net) {
            if is_power_net(&self.electrode1_net) {
                None
            } else {
                Some(&self.electrode1_net)
            }
        } else {
            Some(&self.electrode0_net)
        }
    }

    /// The electrode net opposite the given one.
    ///
    /// # Panics
    ///
    /// Panics if neither electrode is on `net`.
    pub fn opposite_electrode_net(&self, net: &str) -> &ArcStr {
        if self.electrode0_net == net {
            &self.electrode1_net
        } else {
            assert_eq!(
                self.electrode1_net, net,
                "transistor {} has no electrode on net `{net}`",
                self.name
            );
            &self.electrode0_net
        }
    }

    /// Returns `true` if either electrode is on the given net.
    pub fn is_electrode_connected_to(&self, net: &str) -> bool {
        self.electrode0_net == net || self.electrode1_net == net
    }

    /// Returns `true` if this is a merged parallel group.
    pub fn is_parallel(&self) -> bool {
        !self.components.is_empty()
    }
}
