//! The pool of unallocated transistors.
//!
//! Recognition passes draw transistors from the pool; a transistor removed
//! from the pool belongs to exactly one recognized gate. The pool keeps
//! secondary indices (by electrode net, by gate net, grounding, powering,
//! NMOS resistors) consistent on every insert and remove.

use std::fmt;

use arcstr::ArcStr;
use indexmap::{IndexMap, IndexSet};
use std::collections::HashMap;

use crate::gates::Transistor;
use crate::is_power_net;

/// An opaque pool-assigned transistor ID.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QId(u64);

impl fmt::Display for QId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "q{}", self.0)
    }
}

/// The pool of transistors not yet allocated to a gate.
#[derive(Debug, Clone, Default)]
pub struct Pool {
    next_id: u64,
    qs: IndexMap<QId, Transistor>,
    by_electrode_net: HashMap<ArcStr, IndexSet<QId>>,
    by_gate_net: HashMap<ArcStr, IndexSet<QId>>,
    grounding: IndexSet<QId>,
    powering: IndexSet<QId>,
    nmos_resistors: IndexSet<QId>,
}

impl Pool {
    /// Creates an empty pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a transistor to the pool, indexing it by its nets.
    pub fn insert(&mut self, q: Transistor) -> QId {
        let id = QId(self.next_id);
        self.next_id += 1;

        self.by_electrode_net
            .entry(q.electrode0_net.clone())
            .or_default()
            .insert(id);
        if q.electrode1_net != q.electrode0_net {
            self.by_electrode_net
                .entry(q.electrode1_net.clone())
                .or_default()
                .insert(id);
        }
        self.by_gate_net
            .entry(q.gate_net.clone())
            .or_default()
            .insert(id);
        if q.is_grounding() {
            self.grounding.insert(id);
        }
        if q.is_powering() {
            self.powering.insert(id);
            // An NMOS resistor is a powering transistor whose gate is tied
            // to its output electrode or to power.
            let self_gated = q.nonpower_electrode_net().is_some_and(|e| *e == q.gate_net);
            if self_gated || is_power_net(&q.gate_net) {
                self.nmos_resistors.insert(id);
            }
        }

        self.qs.insert(id, q);
        id
    }

    /// Removes a transistor from the pool and all of its indices.
    pub fn remove(&mut self, id: QId) -> Option<Transistor> {
        let q = self.qs.shift_remove(&id)?;
        for net in [&q.electrode0_net, &q.electrode1_net] {
            if let Some(set) = self.by_electrode_net.get_mut(net) {
                set.shift_remove(&id);
            }
        }
        if let Some(set) = self.by_gate_net.get_mut(&q.gate_net) {
            set.shift_remove(&id);
        }
        self.grounding.shift_remove(&id);
        self.powering.shift_remove(&id);
        self.nmos_resistors.shift_remove(&id);
        Some(q)
    }

    /// The transistor with the given ID, if still pooled.
    pub fn get(&self, id: QId) -> Option<&Transistor> {
        self.qs.get(&id)
    }

    /// The number of pooled transistors.
    pub fn len(&self) -> usize {
        self.qs.len()
    }

    /// Returns `true` if the pool is empty.
    pub fn is_empty(&self) -> bool {
        self.qs.is_empty()
    }

    /// A stable snapshot of the pooled IDs, in insertion order.
    pub fn ids(&self) -> Vec<QId> {
        self.qs.keys().copied().collect()
    }

    /// An iterator over pooled transistors, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (QId, &Transistor)> {
        self.qs.iter().map(|(&id, q)| (id, q))
    }

    /// IDs of pooled transistors with an electrode on the given net.
    pub fn electrode_qs(&self, net: &str) -> impl Iterator<Item = QId> + '_ {
        self.by_electrode_net
            .get(net)
            .into_iter()
            .flatten()
            .copied()
    }

    /// IDs of pooled transistors whose gate is on the given net.
    pub fn gate_qs(&self, net: &str) -> impl Iterator<Item = QId> + '_ {
        self.by_gate_net.get(net).into_iter().flatten().copied()
    }

    /// IDs of pooled transistors with a grounded electrode.
    pub fn grounding_ids(&self) -> &IndexSet<QId> {
        &self.grounding
    }

    /// IDs of pooled transistors with a powered electrode.
    pub fn powering_ids(&self) -> &IndexSet<QId> {
        &self.powering
    }

    /// IDs of pooled NMOS resistors (depletion-style pullups).
    pub fn nmos_resistor_ids(&self) -> &IndexSet<QId> {
        &self.nmos_resistors
    }

    /// Returns `true` if the given pooled transistor is an NMOS resistor.
    pub fn is_nmos_resistor(&self, id: QId) -> bool {
        self.nmos_resistors.contains(&id)
    }

    /// Consumes the pool, yielding the remaining transistors.
    pub fn into_leftovers(self) -> Vec<Transistor> {
        self.qs.into_values().collect()
    }
}
