//! Recognized gate kinds.
//!
//! Each kind records the transistors it consumed, so transistor conservation
//! (every extracted transistor is in exactly one gate or in the leftover
//! pool) can be checked at any time.

use std::collections::HashMap;

use arcstr::ArcStr;
use indexmap::IndexSet;
use petgraph::algo::{all_simple_paths, has_path_connecting};
use petgraph::graph::{NodeIndex, UnGraph};

use crate::gates::truth::TruthTable;
use crate::gates::{only, Transistor};

/// Common interface over all recognized gate kinds.
pub trait GateLike {
    /// A short human-readable kind name.
    fn kind(&self) -> &'static str;
    /// The gate's input nets.
    fn inputs(&self) -> Vec<ArcStr>;
    /// The gate's output nets.
    fn outputs(&self) -> Vec<ArcStr>;
    /// The transistors consumed by this gate.
    fn transistors(&self) -> Vec<&Transistor>;
    /// The number of physical transistors consumed by this gate.
    fn num_qs(&self) -> usize {
        self.transistors().iter().map(|q| q.num_qs()).sum()
    }
}

/// A transistor pulling a net to ground, gated by ground.
#[derive(Debug, Clone)]
pub struct Pulldown {
    /// The pulldown transistor.
    pub q: Transistor,
    /// The net being pulled down.
    pub input: ArcStr,
}

impl Pulldown {
    pub(crate) fn new(q: Transistor) -> Self {
        let input = q
            .nongrounded_electrode_net()
            .cloned()
            .unwrap_or_else(|| q.electrode0_net.clone());
        Self { q, input }
    }
}

impl GateLike for Pulldown {
    fn kind(&self) -> &'static str {
        "pulldown"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        vec![self.input.clone()]
    }
    fn outputs(&self) -> Vec<ArcStr> {
        Vec::new()
    }
    fn transistors(&self) -> Vec<&Transistor> {
        vec![&self.q]
    }
}

/// An NMOS resistor pulling a net toward power, not consumed by any LUT.
#[derive(Debug, Clone)]
pub struct Pullup {
    /// The pullup transistor.
    pub q: Transistor,
    /// The net being pulled up.
    pub input: ArcStr,
}

impl Pullup {
    pub(crate) fn new(q: Transistor) -> Self {
        let input = q
            .nonpower_electrode_net()
            .cloned()
            .unwrap_or_else(|| q.electrode0_net.clone());
        Self { q, input }
    }
}

impl GateLike for Pullup {
    fn kind(&self) -> &'static str {
        "pullup"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        vec![self.input.clone()]
    }
    fn outputs(&self) -> Vec<ArcStr> {
        Vec::new()
    }
    fn transistors(&self) -> Vec<&Transistor> {
        vec![&self.q]
    }
}

/// A transistor routing a signal under gate control.
#[derive(Debug, Clone)]
pub struct PassTransistor {
    /// The pass transistor.
    pub q: Transistor,
    /// The routed (non-logic) electrode net.
    pub output: ArcStr,
    /// The gate net controlling the switch.
    pub selecting_input: ArcStr,
    /// The electrode net routed to the output when the switch is on.
    pub selected_input: ArcStr,
}

impl PassTransistor {
    pub(crate) fn new(q: Transistor, output: ArcStr) -> Self {
        let selecting_input = q.gate_net.clone();
        let selected_input = if q.electrode0_net == output {
            q.electrode1_net.clone()
        } else {
            q.electrode0_net.clone()
        };
        Self {
            q,
            output,
            selecting_input,
            selected_input,
        }
    }

    /// Returns `true` if the selected input is a power or ground net.
    pub fn is_power_switch(&self) -> bool {
        crate::is_power_net(&self.selected_input) || crate::is_ground_net(&self.selected_input)
    }
}

impl GateLike for PassTransistor {
    fn kind(&self) -> &'static str {
        "pass transistor"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        vec![self.selecting_input.clone(), self.selected_input.clone()]
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output.clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        vec![&self.q]
    }
}

/// Two or more pass transistors sharing one output net.
#[derive(Debug, Clone)]
pub struct Multiplexer {
    /// The shared output net.
    pub output: ArcStr,
    /// The member pass transistors, in recognition order.
    pub pass_qs: Vec<PassTransistor>,
    /// The routed inputs, one per member.
    pub selected_inputs: Vec<ArcStr>,
    /// The gate nets, one per member.
    pub selecting_inputs: Vec<ArcStr>,
}

impl Multiplexer {
    pub(crate) fn new(pass_qs: Vec<PassTransistor>) -> Self {
        debug_assert!(pass_qs.len() >= 2);
        let output = pass_qs[0].output.clone();
        let selected_inputs = pass_qs.iter().map(|p| p.selected_input.clone()).collect();
        let selecting_inputs = pass_qs.iter().map(|p| p.selecting_input.clone()).collect();
        Self {
            output,
            pass_qs,
            selected_inputs,
            selecting_inputs,
        }
    }

    /// The number of selectable inputs.
    pub fn n_ways(&self) -> usize {
        self.pass_qs.len()
    }
}

impl GateLike for Multiplexer {
    fn kind(&self) -> &'static str {
        "mux"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        self.selected_inputs
            .iter()
            .chain(&self.selecting_inputs)
            .cloned()
            .collect()
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output.clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        self.pass_qs.iter().map(|p| &p.q).collect()
    }
}

/// A multiplexer routing only power and ground: a push-pull output stage.
#[derive(Debug, Clone)]
pub struct PowerMultiplexer {
    /// The underlying multiplexer.
    pub mux: Multiplexer,
    /// Gate nets of the members routing power.
    pub high_inputs: Vec<ArcStr>,
    /// Gate nets of the members routing ground.
    pub low_inputs: Vec<ArcStr>,
}

impl PowerMultiplexer {
    pub(crate) fn new(mux: Multiplexer) -> Self {
        let high_inputs = mux
            .pass_qs
            .iter()
            .filter(|p| p.q.is_powering())
            .map(|p| p.selecting_input.clone())
            .collect();
        let low_inputs = mux
            .pass_qs
            .iter()
            .filter(|p| p.q.is_grounding())
            .map(|p| p.selecting_input.clone())
            .collect();
        Self {
            mux,
            high_inputs,
            low_inputs,
        }
    }

    /// The output net.
    pub fn output(&self) -> &ArcStr {
        &self.mux.output
    }
}

impl GateLike for PowerMultiplexer {
    fn kind(&self) -> &'static str {
        "power mux"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        self.high_inputs
            .iter()
            .chain(&self.low_inputs)
            .cloned()
            .collect()
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.mux.output.clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        self.mux.transistors()
    }
}

/// A lookup table: a pulled-up output net driven low through a network of
/// grounding and series transistors.
#[derive(Debug, Clone)]
pub struct Lut {
    /// The NMOS resistor pulling the output up.
    pub pullup: Transistor,
    /// The output net.
    pub output: ArcStr,
    /// The logic transistors between output and ground.
    pub logic_qs: Vec<Transistor>,
    /// The distinct input (gate) nets, in discovery order.
    pub inputs: Vec<ArcStr>,
    /// The ground net the logic network sinks to.
    pub ground_net: ArcStr,
    /// Inputs that directly switch the output to ground.
    pub neg_ens: Vec<ArcStr>,
    /// Inputs that do not directly switch the output to ground.
    pub non_neg_ens: Vec<ArcStr>,
}

impl Lut {
    pub(crate) fn new(pullup: Transistor, output: ArcStr, logic_qs: Vec<Transistor>) -> Self {
        let ground_net = only(
            logic_qs
                .iter()
                .filter_map(|q| q.grounded_electrode_net())
                .collect::<IndexSet<_>>(),
        )
        .clone();
        let neg_ens: IndexSet<ArcStr> = logic_qs
            .iter()
            .filter(|q| q.is_grounding() && q.nongrounded_electrode_net() == Some(&output))
            .map(|q| q.gate_net.clone())
            .collect();
        let inputs: IndexSet<ArcStr> = logic_qs.iter().map(|q| q.gate_net.clone()).collect();
        let non_neg_ens = inputs
            .iter()
            .filter(|i| !neg_ens.contains(*i))
            .cloned()
            .collect();
        Self {
            pullup,
            output,
            inputs: inputs.into_iter().collect(),
            ground_net,
            neg_ens: neg_ens.into_iter().collect(),
            non_neg_ens,
            logic_qs,
        }
    }

    /// The number of distinct inputs.
    pub fn n_inputs(&self) -> usize {
        self.inputs.len()
    }

    /// Returns `true` if every input directly switches the output to ground.
    pub fn is_nor(&self) -> bool {
        self.non_neg_ens.is_empty()
    }

    /// Returns `true` if the logic network is a single series chain: exactly
    /// one simple path from the output to ground.
    pub fn is_nand(&self) -> bool {
        let (graph, nodes) = self.net_graph(|_| true);
        let (Some(&out), Some(&gnd)) = (nodes.get(&self.output), nodes.get(&self.ground_net))
        else {
            return false;
        };
        all_simple_paths::<Vec<NodeIndex>, _>(&graph, out, gnd, 0, None).count() == 1
    }

    /// Evaluates the LUT for one input assignment.
    ///
    /// The output is low exactly when the transistors switched on by the
    /// assignment form a conduction path from the output to ground.
    ///
    /// # Panics
    ///
    /// Panics if `values` does not cover every input.
    pub fn eval(&self, values: &HashMap<ArcStr, u8>) -> u8 {
        let (graph, nodes) = self.net_graph(|q| {
            *values
                .get(&q.gate_net)
                .unwrap_or_else(|| panic!("no value for input `{}`", q.gate_net))
                == 1
        });
        let (Some(&out), Some(&gnd)) = (nodes.get(&self.output), nodes.get(&self.ground_net))
        else {
            return 1;
        };
        if has_path_connecting(&graph, out, gnd, None) {
            0
        } else {
            1
        }
    }

    /// Computes the full truth table.
    ///
    /// # Panics
    ///
    /// Panics if the LUT has more than 10 inputs.
    pub fn truth_table(&self) -> TruthTable {
        let n = self.inputs.len();
        assert!(n <= 10, "refusing to enumerate a {n}-input truth table");
        let mut table = Vec::with_capacity(1 << n);
        for row in 0..1u32 << n {
            let values: HashMap<ArcStr, u8> = self
                .inputs
                .iter()
                .enumerate()
                .map(|(j, input)| (input.clone(), ((row >> j) & 1) as u8))
                .collect();
            table.push(self.eval(&values));
        }
        TruthTable::new(self.inputs.clone(), table)
    }

    /// Builds the electrode connectivity graph over the logic transistors
    /// selected by `keep`. Parallel transistors collapse into one edge.
    fn net_graph(
        &self,
        keep: impl Fn(&Transistor) -> bool,
    ) -> (UnGraph<(), ()>, HashMap<&ArcStr, NodeIndex>) {
        let mut graph = UnGraph::new_undirected();
        let mut nodes: HashMap<&ArcStr, NodeIndex> = HashMap::new();
        for q in self.logic_qs.iter().filter(|q| keep(q)) {
            let a = net_node(&mut graph, &mut nodes, &q.electrode0_net);
            let b = net_node(&mut graph, &mut nodes, &q.electrode1_net);
            if graph.find_edge(a, b).is_none() {
                graph.add_edge(a, b, ());
            }
        }
        (graph, nodes)
    }
}

fn net_node<'a>(
    graph: &mut UnGraph<(), ()>,
    nodes: &mut HashMap<&'a ArcStr, NodeIndex>,
    net: &'a ArcStr,
) -> NodeIndex {
    if let Some(&idx) = nodes.get(net) {
        idx
    } else {
        let idx = graph.add_node(());
        nodes.insert(net, idx);
        idx
    }
}

impl GateLike for Lut {
    fn kind(&self) -> &'static str {
        "lut"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        self.inputs.clone()
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output.clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        self.logic_qs.iter().chain(Some(&self.pullup)).collect()
    }
}

/// A LUT in which every input directly grounds the output.
#[derive(Debug, Clone)]
pub struct NorGate {
    /// The underlying LUT.
    pub lut: Lut,
}

impl NorGate {
    pub(crate) fn new(lut: Lut) -> Self {
        debug_assert!(lut.is_nor());
        Self { lut }
    }

    /// The output net.
    pub fn output(&self) -> &ArcStr {
        &self.lut.output
    }

    /// Returns `true` if this is a one-input NOR, i.e. an inverter.
    pub fn is_inverter(&self) -> bool {
        self.lut.inputs.len() == 1
    }

    /// For an inverter, the single input net.
    ///
    /// # Panics
    ///
    /// Panics if the gate has more than one input.
    pub fn input(&self) -> &ArcStr {
        only(&self.lut.inputs)
    }
}

impl GateLike for NorGate {
    fn kind(&self) -> &'static str {
        "nor"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        self.lut.inputs()
    }
    fn outputs(&self) -> Vec<ArcStr> {
        self.lut.outputs()
    }
    fn transistors(&self) -> Vec<&Transistor> {
        self.lut.transistors()
    }
}

/// A NOR gate whose output is re-driven by a push-pull power multiplexer.
#[derive(Debug, Clone)]
pub struct PowerNorGate {
    /// The recognizing NOR.
    pub nor: NorGate,
    /// The output stage.
    pub mux: PowerMultiplexer,
}

impl PowerNorGate {
    /// The driven output net.
    pub fn output(&self) -> &ArcStr {
        &self.mux.mux.output
    }
}

impl GateLike for PowerNorGate {
    fn kind(&self) -> &'static str {
        "power nor"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        self.nor.inputs()
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output().clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        let mut qs = self.nor.transistors();
        qs.extend(self.mux.transistors());
        qs
    }
}

/// A LUT whose logic network is a single series chain.
#[derive(Debug, Clone)]
pub struct NandGate {
    /// The underlying LUT.
    pub lut: Lut,
}

impl NandGate {
    /// The output net.
    pub fn output(&self) -> &ArcStr {
        &self.lut.output
    }
}

impl GateLike for NandGate {
    fn kind(&self) -> &'static str {
        "nand"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        self.lut.inputs()
    }
    fn outputs(&self) -> Vec<ArcStr> {
        self.lut.outputs()
    }
    fn transistors(&self) -> Vec<&Transistor> {
        self.lut.transistors()
    }
}

/// A NOR followed by an inverter.
#[derive(Debug, Clone)]
pub struct OrGate {
    /// The first-stage NOR.
    pub nor: NorGate,
    /// The output inverter.
    pub inv: NorGate,
}

impl OrGate {
    /// The output net.
    pub fn output(&self) -> &ArcStr {
        self.inv.output()
    }
}

impl GateLike for OrGate {
    fn kind(&self) -> &'static str {
        "or"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        self.nor.inputs()
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output().clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        let mut qs = self.nor.transistors();
        qs.extend(self.inv.transistors());
        qs
    }
}

/// An inverting tristate driver: inverter, two NORs, and a power multiplexer
/// gated by an active-low enable.
#[derive(Debug, Clone)]
pub struct TristateInverter {
    /// The input inverter.
    pub inv: NorGate,
    /// The NOR driving the power-routing switch.
    pub high_nor: NorGate,
    /// The NOR driving the ground-routing switch.
    pub low_nor: NorGate,
    /// The output stage.
    pub mux: PowerMultiplexer,
    /// The active-low output enable net.
    pub noe: ArcStr,
}

impl TristateInverter {
    /// The data input net.
    pub fn input(&self) -> &ArcStr {
        self.inv.input()
    }

    /// The output net.
    pub fn output(&self) -> &ArcStr {
        &self.mux.mux.output
    }
}

impl GateLike for TristateInverter {
    fn kind(&self) -> &'static str {
        "tristate inverter"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        vec![self.input().clone(), self.noe.clone()]
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output().clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        let mut qs = self.inv.transistors();
        qs.extend(self.high_nor.transistors());
        qs.extend(self.low_nor.transistors());
        qs.extend(self.mux.transistors());
        qs
    }
}

/// A non-inverting tristate driver, same structure as [`TristateInverter`]
/// with the inverter on the other NOR.
#[derive(Debug, Clone)]
pub struct TristateBuffer {
    /// The input inverter.
    pub inv: NorGate,
    /// The NOR driving the power-routing switch.
    pub high_nor: NorGate,
    /// The NOR driving the ground-routing switch.
    pub low_nor: NorGate,
    /// The output stage.
    pub mux: PowerMultiplexer,
    /// The active-low output enable net.
    pub noe: ArcStr,
}

impl TristateBuffer {
    /// The data input net.
    pub fn input(&self) -> &ArcStr {
        self.inv.input()
    }

    /// The output net.
    pub fn output(&self) -> &ArcStr {
        &self.mux.mux.output
    }
}

impl GateLike for TristateBuffer {
    fn kind(&self) -> &'static str {
        "tristate buffer"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        vec![self.input().clone(), self.noe.clone()]
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output().clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        let mut qs = self.inv.transistors();
        qs.extend(self.high_nor.transistors());
        qs.extend(self.low_nor.transistors());
        qs.extend(self.mux.transistors());
        qs
    }
}

/// A feedback element of a mux D-latch: either a general LUT or a NOR.
#[derive(Debug, Clone)]
pub enum LatchLut {
    /// A general LUT with direct-grounding inputs.
    Lut(Lut),
    /// A NOR gate.
    Nor(NorGate),
}

impl LatchLut {
    /// The output net.
    pub fn output(&self) -> &ArcStr {
        match self {
            Self::Lut(lut) => &lut.output,
            Self::Nor(nor) => nor.output(),
        }
    }

    /// Inputs that directly ground the output.
    pub fn neg_ens(&self) -> &[ArcStr] {
        match self {
            Self::Lut(lut) => &lut.neg_ens,
            Self::Nor(nor) => &nor.lut.neg_ens,
        }
    }

    /// All input nets.
    pub fn inputs(&self) -> &[ArcStr] {
        match self {
            Self::Lut(lut) => &lut.inputs,
            Self::Nor(nor) => &nor.lut.inputs,
        }
    }

    fn transistors(&self) -> Vec<&Transistor> {
        match self {
            Self::Lut(lut) => lut.transistors(),
            Self::Nor(nor) => nor.transistors(),
        }
    }
}

/// A D-latch built from a two-way multiplexer and cross-coupled LUTs.
#[derive(Debug, Clone)]
pub struct MuxDLatch {
    /// The input multiplexer.
    pub mux: Multiplexer,
    /// The LUT driving the latched output.
    pub q_lut: LatchLut,
    /// The LUT driving the complement output.
    pub nq_lut: LatchLut,
    /// The data input net.
    pub d_input: ArcStr,
    /// The clock net.
    pub c_input: ArcStr,
    /// The complement clock net.
    pub nc_input: ArcStr,
    /// Asynchronous set inputs.
    pub set_inputs: Vec<ArcStr>,
    /// Asynchronous clear inputs.
    pub clr_inputs: Vec<ArcStr>,
}

impl MuxDLatch {
    pub(crate) fn new(mux: Multiplexer, q_lut: LatchLut, nq_lut: LatchLut) -> Self {
        let i = mux
            .selected_inputs
            .iter()
            .position(|s| s == q_lut.output())
            .expect("latch feedback output must be a selected input");
        let nc_input = mux.selecting_inputs[i].clone();
        let c_input = mux.selecting_inputs[1 - i].clone();
        let d_input = mux.selected_inputs[1 - i].clone();
        let set_inputs = nq_lut
            .inputs()
            .iter()
            .filter(|n| *n != &mux.output)
            .cloned()
            .collect();
        let clr_inputs = q_lut
            .inputs()
            .iter()
            .filter(|n| *n != nq_lut.output())
            .cloned()
            .collect();
        Self {
            mux,
            q_lut,
            nq_lut,
            d_input,
            c_input,
            nc_input,
            set_inputs,
            clr_inputs,
        }
    }

    /// The latched output net.
    pub fn q_output(&self) -> &ArcStr {
        self.q_lut.output()
    }

    /// The complement output net.
    pub fn nq_output(&self) -> &ArcStr {
        self.nq_lut.output()
    }
}

impl GateLike for MuxDLatch {
    fn kind(&self) -> &'static str {
        "mux d-latch"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        let mut inputs = vec![
            self.d_input.clone(),
            self.c_input.clone(),
            self.nc_input.clone(),
        ];
        inputs.extend(self.set_inputs.iter().cloned());
        inputs.extend(self.clr_inputs.iter().cloned());
        inputs
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.q_output().clone(), self.nq_output().clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        let mut qs = self.mux.transistors();
        qs.extend(self.q_lut.transistors());
        qs.extend(self.nq_lut.transistors());
        qs
    }
}

/// An inverter driving a push-pull output stage: a buffer that restores
/// drive strength.
#[derive(Debug, Clone)]
pub struct SignalBooster {
    /// The output stage.
    pub mux: PowerMultiplexer,
    /// The inverter driving the low side.
    pub inv: NorGate,
}

impl SignalBooster {
    /// The input net.
    pub fn input(&self) -> &ArcStr {
        self.inv.input()
    }

    /// The output net.
    pub fn output(&self) -> &ArcStr {
        &self.mux.mux.output
    }
}

impl GateLike for SignalBooster {
    fn kind(&self) -> &'static str {
        "signal booster"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        vec![self.input().clone()]
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output().clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        let mut qs = self.mux.transistors();
        qs.extend(self.inv.transistors());
        qs
    }
}

/// An input pin structure: an inverter (or inverter pair) on a pin net,
/// optionally with a pull device.
#[derive(Debug, Clone)]
pub struct PinInput {
    /// The inverter on the pin net.
    pub inv1: NorGate,
    /// A second inverter restoring polarity, if present.
    pub inv2: Option<NorGate>,
    /// A pullup on the pin net, if present.
    pub pullup: Option<Pullup>,
    /// A pulldown on the pin net, if present.
    pub pulldown: Option<Pulldown>,
}

impl PinInput {
    /// The pin net.
    pub fn input(&self) -> &ArcStr {
        self.inv1.input()
    }

    /// The buffered pin signal.
    pub fn output(&self) -> &ArcStr {
        match &self.inv2 {
            Some(inv2) => inv2.output(),
            None => self.inv1.output(),
        }
    }

    /// Returns `true` if the structure inverts the pin signal.
    pub fn is_inverting(&self) -> bool {
        self.inv2.is_none()
    }
}

impl GateLike for PinInput {
    fn kind(&self) -> &'static str {
        "pin input"
    }
    fn inputs(&self) -> Vec<ArcStr> {
        vec![self.input().clone()]
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![self.output().clone()]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        let mut qs = self.inv1.transistors();
        if let Some(inv2) = &self.inv2 {
            qs.extend(inv2.transistors());
        }
        if let Some(pullup) = &self.pullup {
            qs.extend(pullup.transistors());
        }
        if let Some(pulldown) = &self.pulldown {
            qs.extend(pulldown.transistors());
        }
        qs
    }
}

/// A bidirectional pin: a pin input structure plus a tristate buffer driving
/// the same pin net.
#[derive(Debug, Clone)]
pub struct PinIo {
    /// The input side.
    pub pin_input: PinInput,
    /// The output driver.
    pub tristate: TristateBuffer,
}

impl PinIo {
    /// The pin net.
    pub fn pin(&self) -> &ArcStr {
        self.pin_input.input()
    }
}

impl GateLike for PinIo {
    fn kind(&self) -> &'static str {
        "pin i/o"
    }
    // The driver side carries the inputs; the pin itself is an output of the
    // driving tristate and an output toward the rest of the circuit.
    fn inputs(&self) -> Vec<ArcStr> {
        self.tristate.inputs()
    }
    fn outputs(&self) -> Vec<ArcStr> {
        vec![
            self.pin_input.output().clone(),
            self.tristate.output().clone(),
        ]
    }
    fn transistors(&self) -> Vec<&Transistor> {
        let mut qs = self.pin_input.transistors();
        qs.extend(self.tristate.transistors());
        qs
    }
}

/// A borrowed reference to any recognized gate.
#[derive(Debug, Clone, Copy)]
pub enum GateRef<'a> {
    /// A pulldown.
    Pulldown(&'a Pulldown),
    /// A pullup.
    Pullup(&'a Pullup),
    /// A lone pass transistor.
    PassTransistor(&'a PassTransistor),
    /// A multiplexer.
    Multiplexer(&'a Multiplexer),
    /// A power multiplexer.
    PowerMultiplexer(&'a PowerMultiplexer),
    /// A LUT not matching a more specific kind.
    Lut(&'a Lut),
    /// A NOR gate.
    Nor(&'a NorGate),
    /// A power NOR gate.
    PowerNor(&'a PowerNorGate),
    /// A NAND gate.
    Nand(&'a NandGate),
    /// An OR gate.
    Or(&'a OrGate),
    /// A tristate inverter.
    TristateInverter(&'a TristateInverter),
    /// A tristate buffer.
    TristateBuffer(&'a TristateBuffer),
    /// A mux D-latch.
    MuxDLatch(&'a MuxDLatch),
    /// A signal booster.
    SignalBooster(&'a SignalBooster),
    /// A pin input.
    PinInput(&'a PinInput),
    /// A bidirectional pin.
    PinIo(&'a PinIo),
}

macro_rules! delegate {
    ($self:ident, $method:ident) => {
        match $self {
            GateRef::Pulldown(g) => g.$method(),
            GateRef::Pullup(g) => g.$method(),
            GateRef::PassTransistor(g) => g.$method(),
            GateRef::Multiplexer(g) => g.$method(),
            GateRef::PowerMultiplexer(g) => g.$method(),
            GateRef::Lut(g) => g.$method(),
            GateRef::Nor(g) => g.$method(),
            GateRef::PowerNor(g) => g.$method(),
            GateRef::Nand(g) => g.$method(),
            GateRef::Or(g) => g.$method(),
            GateRef::TristateInverter(g) => g.$method(),
            GateRef::TristateBuffer(g) => g.$method(),
            GateRef::MuxDLatch(g) => g.$method(),
            GateRef::SignalBooster(g) => g.$method(),
            GateRef::PinInput(g) => g.$method(),
            GateRef::PinIo(g) => g.$method(),
        }
    };
}

impl GateLike for GateRef<'_> {
    fn kind(&self) -> &'static str {
        delegate!(self, kind)
    }
    fn inputs(&self) -> Vec<ArcStr> {
        delegate!(self, inputs)
    }
    fn outputs(&self) -> Vec<ArcStr> {
        delegate!(self, outputs)
    }
    fn transistors(&self) -> Vec<&Transistor> {
        delegate!(self, transistors)
    }
}
