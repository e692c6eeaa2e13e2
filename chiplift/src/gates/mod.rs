//! Gate recognition: lifting a transistor netlist into logic gates.
//!
//! Recognition runs a fixed sequence of structural passes over a pool of
//! unallocated transistors. Each pass removes the transistors (or
//! previously recognized sub-gates) it consumes, so a transistor ends up in
//! exactly one gate; whatever remains in the pool afterwards is reported as
//! unrecognized.
//!
//! Pass order matters: parallel power transistors are merged before
//! pulldown and LUT recognition, LUTs are found before pass transistors
//! (so LUT internals are not mistaken for routed signals), and compound
//! kinds (power NORs, ORs, tristates, latches, pin structures) are built
//! from the simpler kinds recognized before them.

mod kinds;
mod pool;
mod transistor;
mod truth;

use std::collections::{HashMap, HashSet};
use std::fmt;

use arcstr::ArcStr;
use diagnostics::{Diagnostic, IssueSet, Severity};
use indexmap::{IndexMap, IndexSet};
use petgraph::algo::all_simple_paths;
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;

pub use kinds::*;
pub use pool::{Pool, QId};
pub use transistor::Transistor;
pub use truth::TruthTable;

use crate::layers::Label;
use crate::netlist::Netlist;
use crate::{is_ground_net, is_power_net};

/// Returns the only element of `iter`.
///
/// # Panics
///
/// Panics if `iter` yields zero or several elements. Used where a
/// recognition invariant guarantees uniqueness.
pub(crate) fn only<I: IntoIterator>(iter: I) -> I::Item {
    let mut iter = iter.into_iter();
    let first = iter.next().expect("expected exactly one element, found none");
    assert!(
        iter.next().is_none(),
        "expected exactly one element, found several"
    );
    first
}

/// An issue found during gate recognition.
#[derive(Debug, Clone)]
pub enum RecognitionIssue {
    /// A pulled-up net with zero or several candidate pullup resistors.
    /// No LUT is produced for it.
    AmbiguousPullup {
        /// The pulled-up net.
        net: ArcStr,
        /// How many pullup resistors connect to the net.
        count: usize,
    },
    /// A pulled-up net whose logic network never reaches ground.
    /// No LUT is produced for it.
    NoGroundPath {
        /// The pulled-up net.
        net: ArcStr,
    },
}

impl fmt::Display for RecognitionIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AmbiguousPullup { net, count } => write!(
                f,
                "net `{net}` has {count} pullup resistor(s), expected 1; skipping its logic"
            ),
            Self::NoGroundPath { net } => {
                write!(f, "logic network on net `{net}` has no path to ground")
            }
        }
    }
}

impl Diagnostic for RecognitionIssue {
    fn severity(&self) -> Severity {
        Severity::Error
    }
}

/// A node in the LUT discovery graph.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum LutNode {
    /// A net connecting transistor electrodes.
    Net(ArcStr),
    /// A unique ground attachment. Each grounding transistor gets its own
    /// ground node so that ground never merges separate logic networks.
    Ground(QId),
    /// A shared sink for gate connections, used to detect nets that leave
    /// a logic network through a transistor gate.
    GateSink,
}

/// The gate recognition engine.
pub struct Gates {
    pool: Pool,
    pnames: Vec<Label>,
    power_nets: IndexSet<ArcStr>,
    ground_nets: IndexSet<ArcStr>,
    pulled_up_nets: IndexSet<ArcStr>,
    logic_nets: IndexSet<ArcStr>,
    /// Non-fatal problems found during recognition.
    pub issues: IssueSet<RecognitionIssue>,

    pulldowns: Vec<Pulldown>,
    pullups: Vec<Pullup>,
    pass_qs: Vec<PassTransistor>,
    luts: Vec<Lut>,
    muxes: Vec<Multiplexer>,
    power_muxes: Vec<PowerMultiplexer>,
    nors: Vec<NorGate>,
    power_nors: Vec<PowerNorGate>,
    nands: Vec<NandGate>,
    ors: Vec<OrGate>,
    tristate_inverters: Vec<TristateInverter>,
    tristate_buffers: Vec<TristateBuffer>,
    mux_d_latches: Vec<MuxDLatch>,
    signal_boosters: Vec<SignalBooster>,
    pin_inputs: Vec<PinInput>,
    pin_ios: Vec<PinIo>,
}

impl Gates {
    /// Creates an engine over the given transistors.
    ///
    /// Net classification (power, ground, pulled-up) is derived from the
    /// netlist's names and from the NMOS resistors present among the
    /// transistors.
    pub fn new(netlist: &Netlist, qs: Vec<Transistor>, pnames: Vec<Label>) -> Self {
        let mut pool = Pool::new();
        for q in qs {
            pool.insert(q);
        }
        let power_nets: IndexSet<ArcStr> = netlist
            .names()
            .filter(|n| is_power_net(n))
            .cloned()
            .collect();
        let ground_nets: IndexSet<ArcStr> = netlist
            .names()
            .filter(|n| is_ground_net(n))
            .cloned()
            .collect();
        let pulled_up_nets: IndexSet<ArcStr> = pool
            .nmos_resistor_ids()
            .iter()
            .filter_map(|&id| pool.get(id).and_then(Transistor::nonpower_electrode_net))
            .cloned()
            .collect();
        let logic_nets: IndexSet<ArcStr> = power_nets
            .iter()
            .chain(&ground_nets)
            .chain(&pulled_up_nets)
            .cloned()
            .collect();
        Self {
            pool,
            pnames,
            power_nets,
            ground_nets,
            pulled_up_nets,
            logic_nets,
            issues: IssueSet::new(),
            pulldowns: Vec::new(),
            pullups: Vec::new(),
            pass_qs: Vec::new(),
            luts: Vec::new(),
            muxes: Vec::new(),
            power_muxes: Vec::new(),
            nors: Vec::new(),
            power_nors: Vec::new(),
            nands: Vec::new(),
            ors: Vec::new(),
            tristate_inverters: Vec::new(),
            tristate_buffers: Vec::new(),
            mux_d_latches: Vec::new(),
            signal_boosters: Vec::new(),
            pin_inputs: Vec::new(),
            pin_ios: Vec::new(),
        }
    }

    /// Runs all recognition passes in order.
    pub fn recognize(&mut self) {
        self.merge_parallel();
        self.find_pulldowns();
        self.find_luts();
        self.find_pass_transistors();
        self.find_muxes();
        self.find_nors();
        self.find_nands();
        self.find_ors();
        self.find_tristates(false);
        self.find_tristates(true);
        self.find_mux_d_latches();
        self.find_pullups();
        self.find_signal_boosters();
        self.find_pin_inputs();
        self.find_pin_ios();
        self.log_summary();
    }

    /// Pass 1: merges electrically parallel transistors to power and to
    /// ground into single logical transistors.
    fn merge_parallel(&mut self) {
        for grounding in [false, true] {
            let ids: Vec<QId> = if grounding {
                self.pool.grounding_ids().iter().copied().collect()
            } else {
                self.pool.powering_ids().iter().copied().collect()
            };
            let mut groups: IndexMap<(ArcStr, ArcStr), Vec<QId>> = IndexMap::new();
            for id in ids {
                let Some(q) = self.pool.get(id) else { continue };
                let other = if grounding {
                    q.nongrounded_electrode_net()
                } else {
                    q.nonpower_electrode_net()
                };
                let Some(other) = other else { continue };
                groups
                    .entry((other.clone(), q.gate_net.clone()))
                    .or_default()
                    .push(id);
            }
            for (_, ids) in groups {
                if ids.len() < 2 {
                    continue;
                }
                let members: Vec<Transistor> =
                    ids.iter().filter_map(|&id| self.pool.remove(id)).collect();
                self.pool.insert(Transistor::parallel(members));
            }
        }
    }

    /// Pass 2: finds transistors pulling a net to ground, gated by ground.
    fn find_pulldowns(&mut self) {
        let ids: Vec<QId> = self.pool.grounding_ids().iter().copied().collect();
        for id in ids {
            let Some(q) = self.pool.get(id) else { continue };
            if is_ground_net(&q.gate_net) {
                if let Some(q) = self.pool.remove(id) {
                    self.pulldowns.push(Pulldown::new(q));
                }
            }
        }
    }

    /// Pass 3: discovers LUTs.
    ///
    /// Builds a graph of nets joined by transistor electrodes, with a
    /// unique ground node per grounding transistor and a shared sink for
    /// gate connections. Simple paths from a pulled-up net to the gate
    /// sink are cut out first: a net reachable from a pulled-up output
    /// only through transistor gates is not part of its logic network.
    /// Every remaining component with exactly one pulled-up net, a unique
    /// pullup resistor, and a path to ground becomes a LUT.
    fn find_luts(&mut self) {
        let mut graph: UnGraph<LutNode, Option<QId>> = UnGraph::new_undirected();
        let mut nodes: HashMap<LutNode, NodeIndex> = HashMap::new();
        fn node_of(
            graph: &mut UnGraph<LutNode, Option<QId>>,
            nodes: &mut HashMap<LutNode, NodeIndex>,
            node: LutNode,
        ) -> NodeIndex {
            if let Some(&idx) = nodes.get(&node) {
                idx
            } else {
                let idx = graph.add_node(node.clone());
                nodes.insert(node, idx);
                idx
            }
        }

        for (id, q) in self.pool.iter() {
            if self.pool.is_nmos_resistor(id) {
                continue;
            }
            if !q.is_powering() {
                if q.is_grounding() {
                    if let Some(net) = q.nongrounded_electrode_net() {
                        let a = node_of(&mut graph, &mut nodes, LutNode::Net(net.clone()));
                        let b = node_of(&mut graph, &mut nodes, LutNode::Ground(id));
                        graph.add_edge(a, b, Some(id));
                    }
                } else {
                    let a = node_of(
                        &mut graph,
                        &mut nodes,
                        LutNode::Net(q.electrode0_net.clone()),
                    );
                    let b = node_of(
                        &mut graph,
                        &mut nodes,
                        LutNode::Net(q.electrode1_net.clone()),
                    );
                    graph.add_edge(a, b, Some(id));
                }
            }
            if !self.pulled_up_nets.contains(&q.gate_net) {
                let a = node_of(&mut graph, &mut nodes, LutNode::Net(q.gate_net.clone()));
                let b = node_of(&mut graph, &mut nodes, LutNode::GateSink);
                if graph.find_edge(a, b).is_none() {
                    graph.add_edge(a, b, None);
                }
            }
        }

        // Cut every simple path from a pulled-up net to the gate sink.
        if let Some(&sink) = nodes.get(&LutNode::GateSink) {
            let mut cut: Vec<(NodeIndex, NodeIndex)> = Vec::new();
            for net in &self.pulled_up_nets {
                let Some(&start) = nodes.get(&LutNode::Net(net.clone())) else {
                    continue;
                };
                for path in all_simple_paths::<Vec<NodeIndex>, _>(&graph, start, sink, 0, None) {
                    cut.extend(path.windows(2).map(|w| (w[0], w[1])));
                }
            }
            for (a, b) in cut {
                while let Some(edge) = graph.find_edge(a, b) {
                    graph.remove_edge(edge);
                }
            }
        }

        let mut uf: UnionFind<usize> = UnionFind::new(graph.node_count());
        for edge in graph.edge_indices() {
            let (a, b) = graph.edge_endpoints(edge).unwrap();
            uf.union(a.index(), b.index());
        }
        let mut components: IndexMap<usize, Vec<NodeIndex>> = IndexMap::new();
        for idx in graph.node_indices() {
            components.entry(uf.find(idx.index())).or_default().push(idx);
        }

        for comp in components.values() {
            let pulled: Vec<&ArcStr> = comp
                .iter()
                .filter_map(|&idx| match &graph[idx] {
                    LutNode::Net(net) if self.pulled_up_nets.contains(net) => Some(net),
                    _ => None,
                })
                .collect();
            if pulled.len() != 1 {
                continue;
            }
            let output = pulled[0].clone();

            // A pulled-up net with no logic network at all (a pullup on a
            // routed signal, say) is not a LUT; leave its resistor alone.
            let members: HashSet<NodeIndex> = comp.iter().copied().collect();
            let member_ids: IndexSet<QId> = graph
                .edge_references()
                .filter(|e| members.contains(&e.source()) && members.contains(&e.target()))
                .filter_map(|e| *e.weight())
                .collect();
            if member_ids.is_empty() {
                tracing::debug!(net = %output, "pulled-up net has no logic network");
                continue;
            }

            let resistors: Vec<QId> = self
                .pool
                .electrode_qs(&output)
                .filter(|&id| self.pool.is_nmos_resistor(id))
                .collect();
            if resistors.len() != 1 {
                self.issues.add_and_log(RecognitionIssue::AmbiguousPullup {
                    net: output,
                    count: resistors.len(),
                });
                continue;
            }
            if !comp
                .iter()
                .any(|&idx| matches!(graph[idx], LutNode::Ground(_)))
            {
                self.issues
                    .add_and_log(RecognitionIssue::NoGroundPath { net: output });
                continue;
            }

            let Some(pullup) = self.pool.remove(resistors[0]) else {
                continue;
            };
            let logic_qs: Vec<Transistor> = member_ids
                .iter()
                .filter_map(|&id| self.pool.remove(id))
                .collect();
            self.luts.push(Lut::new(pullup, output, logic_qs));
        }
    }

    /// Pass 4: any remaining transistor with a non-logic electrode net is
    /// a pass transistor routing that net.
    fn find_pass_transistors(&mut self) {
        for id in self.pool.ids() {
            let Some(q) = self.pool.get(id) else { continue };
            let output = [&q.electrode0_net, &q.electrode1_net]
                .into_iter()
                .find(|net| !self.logic_nets.contains(*net))
                .cloned();
            if let Some(output) = output {
                if let Some(q) = self.pool.remove(id) {
                    self.pass_qs.push(PassTransistor::new(q, output));
                }
            }
        }
    }

    /// Pass 5: pass transistors sharing an output net form a multiplexer.
    /// A multiplexer routing only power and ground is a push-pull output
    /// stage and is promoted to a power multiplexer.
    fn find_muxes(&mut self) {
        let pass_qs = std::mem::take(&mut self.pass_qs);
        let mut groups: IndexMap<ArcStr, Vec<PassTransistor>> = IndexMap::new();
        for p in pass_qs {
            groups.entry(p.output.clone()).or_default().push(p);
        }
        for (_, group) in groups {
            if group.len() < 2 {
                self.pass_qs.extend(group);
                continue;
            }
            let mux = Multiplexer::new(group);
            let push_pull = mux
                .pass_qs
                .iter()
                .all(|p| p.q.is_powering() || p.q.is_grounding())
                && mux.pass_qs.iter().any(|p| p.q.is_powering())
                && mux.pass_qs.iter().any(|p| p.q.is_grounding());
            if push_pull {
                self.power_muxes.push(PowerMultiplexer::new(mux));
            } else {
                self.muxes.push(mux);
            }
        }
    }

    /// Pass 6: LUTs whose inputs all directly ground the output are NOR
    /// gates. A NOR whose output drives exactly the high side of a power
    /// multiplexer, with the mux's low side gated by the NOR's inputs, is
    /// promoted to a power NOR.
    fn find_nors(&mut self) {
        let luts = std::mem::take(&mut self.luts);
        for lut in luts {
            if lut.is_nor() {
                self.nors.push(NorGate::new(lut));
            } else {
                self.luts.push(lut);
            }
        }

        let nors = std::mem::take(&mut self.nors);
        for nor in nors {
            let mux_pos = self.power_muxes.iter().position(|m| {
                let high: HashSet<&ArcStr> = m.high_inputs.iter().collect();
                let low: HashSet<&ArcStr> = m.low_inputs.iter().collect();
                high == std::iter::once(nor.output()).collect()
                    && low == nor.lut.inputs.iter().collect()
            });
            match mux_pos {
                Some(pos) => {
                    let mux = self.power_muxes.remove(pos);
                    self.power_nors.push(PowerNorGate { nor, mux });
                }
                None => self.nors.push(nor),
            }
        }
    }

    /// Pass 7: LUTs whose logic network is a single series chain are NAND
    /// gates.
    fn find_nands(&mut self) {
        let luts = std::mem::take(&mut self.luts);
        for lut in luts {
            if lut.is_nand() {
                self.nands.push(NandGate { lut });
            } else {
                self.luts.push(lut);
            }
        }
    }

    /// Pass 8: a multi-input NOR whose output feeds exactly one gate, an
    /// inverter, combines with it into an OR.
    fn find_ors(&mut self) {
        let fanout = self.fanout();
        let mut invs_by_input: HashMap<&ArcStr, usize> = HashMap::new();
        for (i, nor) in self.nors.iter().enumerate() {
            if nor.is_inverter() {
                invs_by_input.entry(nor.input()).or_insert(i);
            }
        }

        let mut pairs: Vec<(usize, usize)> = Vec::new();
        let mut used: HashSet<usize> = HashSet::new();
        for (i, nor) in self.nors.iter().enumerate() {
            if nor.lut.inputs.len() < 2 {
                continue;
            }
            if fanout.get(nor.output()).copied().unwrap_or(0) != 1 {
                continue;
            }
            let Some(&j) = invs_by_input.get(nor.output()) else {
                continue;
            };
            if used.contains(&i) || used.contains(&j) {
                continue;
            }
            used.insert(i);
            used.insert(j);
            pairs.push((i, j));
        }
        drop(invs_by_input);

        let mut slots: Vec<Option<NorGate>> =
            std::mem::take(&mut self.nors).into_iter().map(Some).collect();
        for (i, j) in pairs {
            let nor = slots[i].take().unwrap();
            let inv = slots[j].take().unwrap();
            self.ors.push(OrGate { nor, inv });
        }
        self.nors = slots.into_iter().flatten().collect();
    }

    /// Passes 9 and 10: tristate drivers.
    ///
    /// A two-way power multiplexer whose high and low switches are each
    /// driven by a two-input NOR sharing exactly one input (the active-low
    /// enable) is a tristate driver. An inverter between the NORs' data
    /// inputs decides the polarity: inverter feeding the low NOR makes an
    /// inverting driver, inverter feeding the high NOR a non-inverting one.
    fn find_tristates(&mut self, buffer: bool) {
        let mut nor2_by_output: HashMap<&ArcStr, usize> = HashMap::new();
        let mut invs_by_output: HashMap<&ArcStr, usize> = HashMap::new();
        for (i, nor) in self.nors.iter().enumerate() {
            match nor.lut.inputs.len() {
                1 => {
                    invs_by_output.entry(nor.output()).or_insert(i);
                }
                2 => {
                    nor2_by_output.entry(nor.output()).or_insert(i);
                }
                _ => {}
            }
        }

        let mut matches: Vec<(usize, usize, usize, usize, ArcStr)> = Vec::new();
        let mut used_nors: HashSet<usize> = HashSet::new();
        for (m, mux) in self.power_muxes.iter().enumerate() {
            if mux.mux.pass_qs.len() != 2
                || mux.high_inputs.len() != 1
                || mux.low_inputs.len() != 1
            {
                continue;
            }
            let (Some(&hi), Some(&lo)) = (
                nor2_by_output.get(&mux.high_inputs[0]),
                nor2_by_output.get(&mux.low_inputs[0]),
            ) else {
                continue;
            };
            if hi == lo || used_nors.contains(&hi) || used_nors.contains(&lo) {
                continue;
            }
            let high_nor = &self.nors[hi];
            let low_nor = &self.nors[lo];
            let common: Vec<&ArcStr> = high_nor
                .lut
                .inputs
                .iter()
                .filter(|n| low_nor.lut.inputs.contains(*n))
                .collect();
            if common.len() != 1 {
                continue;
            }
            let noe = common[0];
            let high_data = only(high_nor.lut.inputs.iter().filter(|n| *n != noe));
            let low_data = only(low_nor.lut.inputs.iter().filter(|n| *n != noe));

            // The inverter couples the two data inputs; its direction
            // distinguishes buffer from inverter.
            let (inv_output, inv_input) = if buffer {
                (high_data, low_data)
            } else {
                (low_data, high_data)
            };
            let Some(&inv) = invs_by_output.get(inv_output) else {
                continue;
            };
            if self.nors[inv].input() != inv_input {
                continue;
            }
            if inv == hi || inv == lo || used_nors.contains(&inv) {
                continue;
            }
            used_nors.extend([inv, hi, lo]);
            matches.push((m, inv, hi, lo, noe.clone()));
        }
        drop(nor2_by_output);
        drop(invs_by_output);

        let mut mux_slots: Vec<Option<PowerMultiplexer>> = std::mem::take(&mut self.power_muxes)
            .into_iter()
            .map(Some)
            .collect();
        let mut nor_slots: Vec<Option<NorGate>> =
            std::mem::take(&mut self.nors).into_iter().map(Some).collect();
        for (m, inv, hi, lo, noe) in matches {
            let mux = mux_slots[m].take().unwrap();
            let inv = nor_slots[inv].take().unwrap();
            let high_nor = nor_slots[hi].take().unwrap();
            let low_nor = nor_slots[lo].take().unwrap();
            if buffer {
                self.tristate_buffers.push(TristateBuffer {
                    inv,
                    high_nor,
                    low_nor,
                    mux,
                    noe,
                });
            } else {
                self.tristate_inverters.push(TristateInverter {
                    inv,
                    high_nor,
                    low_nor,
                    mux,
                    noe,
                });
            }
        }
        self.power_muxes = mux_slots.into_iter().flatten().collect();
        self.nors = nor_slots.into_iter().flatten().collect();
    }

    /// Pass 11: a two-way multiplexer feeding cross-coupled LUTs is a
    /// D-latch. One selected input must be a feedback LUT output; the
    /// complement LUT must be grounded by the mux output, and the feedback
    /// LUT grounded by the complement output.
    fn find_mux_d_latches(&mut self) {
        // Candidate feedback elements: LUTs with direct-grounding inputs,
        // plus all NORs. `true` tags a NOR index.
        let mut cands: Vec<(bool, usize)> = Vec::new();
        for (i, lut) in self.luts.iter().enumerate() {
            if !lut.neg_ens.is_empty() {
                cands.push((false, i));
            }
        }
        for (i, _) in self.nors.iter().enumerate() {
            cands.push((true, i));
        }
        let output = |c: (bool, usize)| -> &ArcStr {
            if c.0 {
                self.nors[c.1].output()
            } else {
                &self.luts[c.1].output
            }
        };
        let neg_ens = |c: (bool, usize)| -> &[ArcStr] {
            if c.0 {
                &self.nors[c.1].lut.neg_ens
            } else {
                &self.luts[c.1].neg_ens
            }
        };

        let mut matches: Vec<(usize, (bool, usize), (bool, usize))> = Vec::new();
        let mut used: HashSet<(bool, usize)> = HashSet::new();
        for (m, mux) in self.muxes.iter().enumerate() {
            if mux.selected_inputs.len() != 2 {
                continue;
            }
            for &q_cand in &cands {
                if used.contains(&q_cand) {
                    continue;
                }
                if !mux.selected_inputs.contains(output(q_cand)) {
                    continue;
                }
                let nq_cands: Vec<(bool, usize)> = cands
                    .iter()
                    .copied()
                    .filter(|&nq| {
                        nq != q_cand
                            && !used.contains(&nq)
                            && neg_ens(nq).contains(&mux.output)
                            && neg_ens(q_cand).contains(output(nq))
                    })
                    .collect();
                if let [nq_cand] = nq_cands[..] {
                    used.insert(q_cand);
                    used.insert(nq_cand);
                    matches.push((m, q_cand, nq_cand));
                    break;
                }
            }
        }

        let mut mux_slots: Vec<Option<Multiplexer>> =
            std::mem::take(&mut self.muxes).into_iter().map(Some).collect();
        let mut lut_slots: Vec<Option<Lut>> =
            std::mem::take(&mut self.luts).into_iter().map(Some).collect();
        let mut nor_slots: Vec<Option<NorGate>> =
            std::mem::take(&mut self.nors).into_iter().map(Some).collect();
        let mut take = |c: (bool, usize)| -> LatchLut {
            if c.0 {
                LatchLut::Nor(nor_slots[c.1].take().unwrap())
            } else {
                LatchLut::Lut(lut_slots[c.1].take().unwrap())
            }
        };
        for (m, q_cand, nq_cand) in matches {
            let mux = mux_slots[m].take().unwrap();
            let q_lut = take(q_cand);
            let nq_lut = take(nq_cand);
            self.mux_d_latches.push(MuxDLatch::new(mux, q_lut, nq_lut));
        }
        drop(take);
        self.muxes = mux_slots.into_iter().flatten().collect();
        self.luts = lut_slots.into_iter().flatten().collect();
        self.nors = nor_slots.into_iter().flatten().collect();
    }

    /// Pass 12: NMOS resistors not consumed by a LUT are pullups.
    fn find_pullups(&mut self) {
        let ids: Vec<QId> = self.pool.nmos_resistor_ids().iter().copied().collect();
        for id in ids {
            if let Some(q) = self.pool.remove(id) {
                self.pullups.push(Pullup::new(q));
            }
        }
    }

    /// Pass 13: an inverter driving only the low side of a two-way power
    /// multiplexer whose high side is the inverter's own input is a
    /// signal booster.
    fn find_signal_boosters(&mut self) {
        let fanout = self.fanout();
        let mut matches: Vec<(usize, usize)> = Vec::new();
        let mut used_nors: HashSet<usize> = HashSet::new();
        for (m, mux) in self.power_muxes.iter().enumerate() {
            if mux.mux.pass_qs.len() != 2
                || mux.high_inputs.len() != 1
                || mux.low_inputs.len() != 1
            {
                continue;
            }
            let inv = self.nors.iter().position(|nor| {
                nor.is_inverter()
                    && nor.input() == &mux.high_inputs[0]
                    && nor.output() == &mux.low_inputs[0]
            });
            let Some(inv) = inv else { continue };
            if used_nors.contains(&inv) {
                continue;
            }
            if fanout.get(self.nors[inv].output()).copied().unwrap_or(0) != 1 {
                continue;
            }
            used_nors.insert(inv);
            matches.push((m, inv));
        }

        let mut mux_slots: Vec<Option<PowerMultiplexer>> = std::mem::take(&mut self.power_muxes)
            .into_iter()
            .map(Some)
            .collect();
        let mut nor_slots: Vec<Option<NorGate>> =
            std::mem::take(&mut self.nors).into_iter().map(Some).collect();
        for (m, inv) in matches {
            let mux = mux_slots[m].take().unwrap();
            let inv = nor_slots[inv].take().unwrap();
            self.signal_boosters.push(SignalBooster { mux, inv });
        }
        self.power_muxes = mux_slots.into_iter().flatten().collect();
        self.nors = nor_slots.into_iter().flatten().collect();
    }

    /// Pass 14: an inverter on a pin net, with nothing else on the pin
    /// except an optional pull device, is a pin input. A second inverter
    /// exclusively on the first's output restores polarity.
    fn find_pin_inputs(&mut self) {
        let pins: HashSet<&ArcStr> = self.pnames.iter().map(|p| &p.text).collect();
        let fanout = self.fanout();
        let mut invs_by_input: HashMap<&ArcStr, usize> = HashMap::new();
        for (i, nor) in self.nors.iter().enumerate() {
            if nor.is_inverter() {
                invs_by_input.entry(nor.input()).or_insert(i);
            }
        }
        let pullups_by_net: HashMap<&ArcStr, usize> = self
            .pullups
            .iter()
            .enumerate()
            .map(|(i, p)| (&p.input, i))
            .collect();
        let pulldowns_by_net: HashMap<&ArcStr, usize> = self
            .pulldowns
            .iter()
            .enumerate()
            .map(|(i, p)| (&p.input, i))
            .collect();

        type Match = (usize, Option<usize>, Option<usize>, Option<usize>);
        let mut matches: Vec<Match> = Vec::new();
        let mut used_nors: HashSet<usize> = HashSet::new();
        for (i, nor) in self.nors.iter().enumerate() {
            if !nor.is_inverter() || used_nors.contains(&i) {
                continue;
            }
            let pin = nor.input();
            if !pins.contains(pin) {
                continue;
            }
            let pullup = pullups_by_net.get(pin).copied();
            let pulldown = pulldowns_by_net.get(pin).copied();
            // The pin net must feed nothing beyond this inverter and its
            // pull devices.
            let expected = 1 + usize::from(pullup.is_some()) + usize::from(pulldown.is_some());
            if fanout.get(pin).copied().unwrap_or(0) != expected {
                continue;
            }
            let inv2 = invs_by_input
                .get(nor.output())
                .copied()
                .filter(|&j| j != i && !used_nors.contains(&j))
                .filter(|_| fanout.get(nor.output()).copied().unwrap_or(0) == 1);
            used_nors.insert(i);
            if let Some(j) = inv2 {
                used_nors.insert(j);
            }
            matches.push((i, inv2, pullup, pulldown));
        }
        drop(invs_by_input);
        drop(pullups_by_net);
        drop(pulldowns_by_net);

        let mut nor_slots: Vec<Option<NorGate>> =
            std::mem::take(&mut self.nors).into_iter().map(Some).collect();
        let mut pullup_slots: Vec<Option<Pullup>> =
            std::mem::take(&mut self.pullups).into_iter().map(Some).collect();
        let mut pulldown_slots: Vec<Option<Pulldown>> = std::mem::take(&mut self.pulldowns)
            .into_iter()
            .map(Some)
            .collect();
        for (i, inv2, pullup, pulldown) in matches {
            self.pin_inputs.push(PinInput {
                inv1: nor_slots[i].take().unwrap(),
                inv2: inv2.map(|j| nor_slots[j].take().unwrap()),
                pullup: pullup.map(|j| pullup_slots[j].take().unwrap()),
                pulldown: pulldown.map(|j| pulldown_slots[j].take().unwrap()),
            });
        }
        self.nors = nor_slots.into_iter().flatten().collect();
        self.pullups = pullup_slots.into_iter().flatten().collect();
        self.pulldowns = pulldown_slots.into_iter().flatten().collect();
    }

    /// Pass 15: a pin input whose pin net is driven by a tristate buffer
    /// is a bidirectional pin.
    fn find_pin_ios(&mut self) {
        let mut matches: Vec<(usize, usize)> = Vec::new();
        let mut used_tristates: HashSet<usize> = HashSet::new();
        for (p, pin_input) in self.pin_inputs.iter().enumerate() {
            let tb = self
                .tristate_buffers
                .iter()
                .position(|t| t.output() == pin_input.input());
            let Some(tb) = tb else { continue };
            if used_tristates.contains(&tb) {
                continue;
            }
            used_tristates.insert(tb);
            matches.push((p, tb));
        }

        let mut pin_slots: Vec<Option<PinInput>> =
            std::mem::take(&mut self.pin_inputs).into_iter().map(Some).collect();
        let mut tb_slots: Vec<Option<TristateBuffer>> = std::mem::take(&mut self.tristate_buffers)
            .into_iter()
            .map(Some)
            .collect();
        for (p, tb) in matches {
            self.pin_ios.push(PinIo {
                pin_input: pin_slots[p].take().unwrap(),
                tristate: tb_slots[tb].take().unwrap(),
            });
        }
        self.pin_inputs = pin_slots.into_iter().flatten().collect();
        self.tristate_buffers = tb_slots.into_iter().flatten().collect();
    }

    /// Counts, for every net, how many recognized gates take it as an
    /// input. A gate with a repeated input counts once.
    fn fanout(&self) -> HashMap<ArcStr, usize> {
        let mut counts: HashMap<ArcStr, usize> = HashMap::new();
        for gate in self.all_gates() {
            let inputs: IndexSet<ArcStr> = gate.inputs().into_iter().collect();
            for input in inputs {
                *counts.entry(input).or_insert(0) += 1;
            }
        }
        counts
    }

    fn log_summary(&self) {
        tracing::info!(
            pulldowns = self.pulldowns.len(),
            pullups = self.pullups.len(),
            pass_qs = self.pass_qs.len(),
            luts = self.luts.len(),
            muxes = self.muxes.len(),
            power_muxes = self.power_muxes.len(),
            nors = self.nors.len(),
            power_nors = self.power_nors.len(),
            nands = self.nands.len(),
            ors = self.ors.len(),
            tristate_inverters = self.tristate_inverters.len(),
            tristate_buffers = self.tristate_buffers.len(),
            mux_d_latches = self.mux_d_latches.len(),
            signal_boosters = self.signal_boosters.len(),
            pin_inputs = self.pin_inputs.len(),
            pin_ios = self.pin_ios.len(),
            leftover = self.pool.len(),
            "gate recognition summary"
        );
        for (_, q) in self.pool.iter() {
            tracing::debug!(name = %q.name, gate = %q.gate_net, "unrecognized transistor");
        }
    }

    /// All recognized gates.
    pub fn all_gates(&self) -> Vec<GateRef<'_>> {
        let mut gates: Vec<GateRef<'_>> = Vec::new();
        gates.extend(self.pulldowns.iter().map(GateRef::Pulldown));
        gates.extend(self.pullups.iter().map(GateRef::Pullup));
        gates.extend(self.pass_qs.iter().map(GateRef::PassTransistor));
        gates.extend(self.muxes.iter().map(GateRef::Multiplexer));
        gates.extend(self.power_muxes.iter().map(GateRef::PowerMultiplexer));
        gates.extend(self.luts.iter().map(GateRef::Lut));
        gates.extend(self.nors.iter().map(GateRef::Nor));
        gates.extend(self.power_nors.iter().map(GateRef::PowerNor));
        gates.extend(self.nands.iter().map(GateRef::Nand));
        gates.extend(self.ors.iter().map(GateRef::Or));
        gates.extend(self.tristate_inverters.iter().map(GateRef::TristateInverter));
        gates.extend(self.tristate_buffers.iter().map(GateRef::TristateBuffer));
        gates.extend(self.mux_d_latches.iter().map(GateRef::MuxDLatch));
        gates.extend(self.signal_boosters.iter().map(GateRef::SignalBooster));
        gates.extend(self.pin_inputs.iter().map(GateRef::PinInput));
        gates.extend(self.pin_ios.iter().map(GateRef::PinIo));
        gates
    }

    /// The number of physical transistors allocated to recognized gates.
    pub fn num_allocated_qs(&self) -> usize {
        self.all_gates().iter().map(GateLike::num_qs).sum()
    }

    /// Transistors not consumed by any pass.
    pub fn leftover(&self) -> impl Iterator<Item = &Transistor> {
        self.pool.iter().map(|(_, q)| q)
    }

    /// The number of unrecognized transistors left in the pool.
    pub fn num_leftover(&self) -> usize {
        self.pool.len()
    }

    /// Power net names.
    pub fn power_nets(&self) -> &IndexSet<ArcStr> {
        &self.power_nets
    }

    /// Ground net names.
    pub fn ground_nets(&self) -> &IndexSet<ArcStr> {
        &self.ground_nets
    }

    /// Nets held high by an NMOS resistor.
    pub fn pulled_up_nets(&self) -> &IndexSet<ArcStr> {
        &self.pulled_up_nets
    }

    /// Recognized pulldowns.
    pub fn pulldowns(&self) -> &[Pulldown] {
        &self.pulldowns
    }

    /// Recognized pullups.
    pub fn pullups(&self) -> &[Pullup] {
        &self.pullups
    }

    /// Pass transistors not absorbed into a multiplexer or other gate.
    pub fn pass_transistors(&self) -> &[PassTransistor] {
        &self.pass_qs
    }

    /// Recognized LUTs not refined into a more specific kind.
    pub fn luts(&self) -> &[Lut] {
        &self.luts
    }

    /// Recognized multiplexers.
    pub fn muxes(&self) -> &[Multiplexer] {
        &self.muxes
    }

    /// Recognized power multiplexers.
    pub fn power_muxes(&self) -> &[PowerMultiplexer] {
        &self.power_muxes
    }

    /// Recognized NOR gates (including inverters).
    pub fn nors(&self) -> &[NorGate] {
        &self.nors
    }

    /// Recognized power NOR gates.
    pub fn power_nors(&self) -> &[PowerNorGate] {
        &self.power_nors
    }

    /// Recognized NAND gates.
    pub fn nands(&self) -> &[NandGate] {
        &self.nands
    }

    /// Recognized OR gates.
    pub fn ors(&self) -> &[OrGate] {
        &self.ors
    }

    /// Recognized tristate inverters.
    pub fn tristate_inverters(&self) -> &[TristateInverter] {
        &self.tristate_inverters
    }

    /// Recognized tristate buffers.
    pub fn tristate_buffers(&self) -> &[TristateBuffer] {
        &self.tristate_buffers
    }

    /// Recognized mux D-latches.
    pub fn mux_d_latches(&self) -> &[MuxDLatch] {
        &self.mux_d_latches
    }

    /// Recognized signal boosters.
    pub fn signal_boosters(&self) -> &[SignalBooster] {
        &self.signal_boosters
    }

    /// Recognized pin inputs.
    pub fn pin_inputs(&self) -> &[PinInput] {
        &self.pin_inputs
    }

    /// Recognized bidirectional pins.
    pub fn pin_ios(&self) -> &[PinIo] {
        &self.pin_ios
    }
}
