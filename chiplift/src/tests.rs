use arcstr::ArcStr;
use geometry::{Point, Polygon, Rect, Segment};
use indexmap::IndexMap;
use test_log::test;

use diagnostics::{IssueSet, Severity};

use crate::extract;
use crate::gates::{GateLike, Gates, Pool, RecognitionIssue, Transistor};
use crate::layers::{Drawing, Label, Layer};
use crate::netlist::{self, Net, Netlist, Role, Terminal};
use crate::snapshot::Snapshot;
use crate::{analyze, Error};

fn rect_poly(x0: f64, y0: f64, x1: f64, y1: f64) -> Polygon {
    Polygon::from_rect(Rect::from_sides(x0, y0, x1, y1))
}

fn label(text: &str, x: f64, y: f64) -> Label {
    Label::new(text, Segment::new(Point::new(x, y), Point::new(x + 0.1, y)))
}

/// A transistor with nets assigned directly, for recognition tests that
/// skip geometry.
fn qnet(name: &str, gate: &str, e0: &str, e1: &str) -> Transistor {
    let mut q = Transistor::new(name, 0, 0, 1, rect_poly(0.0, 0.0, 1.0, 1.0));
    q.gate_net = ArcStr::from(gate);
    q.electrode0_net = ArcStr::from(e0);
    q.electrode1_net = ArcStr::from(e1);
    q
}

fn netlist_of(qs: &[Transistor]) -> Netlist {
    let mut nets: IndexMap<ArcStr, Net> = IndexMap::new();
    for (i, q) in qs.iter().enumerate() {
        for (role, net) in [
            (Role::Gate, &q.gate_net),
            (Role::E0, &q.electrode0_net),
            (Role::E1, &q.electrode1_net),
        ] {
            nets.entry(net.clone()).or_default().insert(Terminal { role, q: i });
        }
    }
    Netlist { nets }
}

fn recognize_with_pins(qs: Vec<Transistor>, pins: &[&str]) -> Gates {
    let netlist = netlist_of(&qs);
    let pnames = pins.iter().map(|p| label(p, 0.0, 0.0)).collect();
    let mut gates = Gates::new(&netlist, qs, pnames);
    gates.recognize();
    gates
}

fn recognize(qs: Vec<Transistor>) -> Gates {
    recognize_with_pins(qs, &[])
}

#[test]
fn recognizes_inverter() {
    let gates = recognize(vec![
        qnet("pu", "OUT", "VCC", "OUT"),
        qnet("q0", "IN", "OUT", "GND"),
    ]);
    let nors = gates.nors();
    assert_eq!(nors.len(), 1);
    assert!(nors[0].is_inverter());
    assert_eq!(nors[0].input(), "IN");
    assert_eq!(nors[0].output(), "OUT");
    assert_eq!(nors[0].num_qs(), 2);
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn recognizes_nor2_with_truth_table() {
    let gates = recognize(vec![
        qnet("pu", "OUT", "VCC", "OUT"),
        qnet("qa", "IN1", "OUT", "GND"),
        qnet("qb", "IN2", "OUT", "GND"),
    ]);
    let nors = gates.nors();
    assert_eq!(nors.len(), 1);
    assert_eq!(nors[0].inputs(), ["IN1", "IN2"]);
    assert_eq!(nors[0].num_qs(), 3);
    assert_eq!(gates.num_leftover(), 0);

    // Output is high only when all inputs are low; inputs[0] is the LSB.
    let tt = nors[0].lut.truth_table();
    assert_eq!(tt.inputs(), nors[0].lut.inputs.as_slice());
    assert_eq!(tt.output_string(), "1000");
}

#[test]
fn recognizes_nand3_chain() {
    let gates = recognize(vec![
        qnet("pu", "OUT", "VCC", "OUT"),
        qnet("q1", "IN1", "OUT", "N1"),
        qnet("q2", "IN2", "N1", "N2"),
        qnet("q3", "IN3", "N2", "GND"),
    ]);
    let nands = gates.nands();
    assert_eq!(nands.len(), 1);
    assert_eq!(nands[0].inputs(), ["IN1", "IN2", "IN3"]);
    assert_eq!(nands[0].output(), "OUT");
    assert_eq!(nands[0].num_qs(), 4);
    assert!(gates.nors().is_empty());
    assert_eq!(gates.num_leftover(), 0);

    // Low only when every series transistor conducts.
    let tt = nands[0].lut.truth_table();
    assert_eq!(tt.output_string(), "11111110");
}

#[test]
fn recognizes_two_way_mux() {
    let gates = recognize(vec![
        qnet("pux0", "X0", "VCC", "X0"),
        qnet("pux1", "X1", "VCC", "X1"),
        qnet("qa", "S0", "X0", "Y"),
        qnet("qb", "S1", "X1", "Y"),
    ]);
    let muxes = gates.muxes();
    assert_eq!(muxes.len(), 1);
    assert_eq!(muxes[0].output, "Y");
    assert_eq!(muxes[0].n_ways(), 2);
    assert_eq!(muxes[0].selected_inputs, ["X0", "X1"]);
    assert_eq!(muxes[0].selecting_inputs, ["S0", "S1"]);
    // The pulled-up sources stay behind as plain pullups.
    assert_eq!(gates.pullups().len(), 2);
    assert_eq!(gates.num_leftover(), 0);
}

fn tristate_inverter_qs() -> Vec<Transistor> {
    vec![
        // Input inverter.
        qnet("pu_nin", "NIN", "VCC", "NIN"),
        qnet("q_nin", "IN", "NIN", "GND"),
        // NOR driving the high-side switch.
        qnet("pu_nh", "NH", "VCC", "NH"),
        qnet("q_nh_oe", "NOE", "NH", "GND"),
        qnet("q_nh_in", "IN", "NH", "GND"),
        // NOR driving the low-side switch.
        qnet("pu_nl", "NL", "VCC", "NL"),
        qnet("q_nl_oe", "NOE", "NL", "GND"),
        qnet("q_nl_nin", "NIN", "NL", "GND"),
        // Push-pull output stage.
        qnet("q_hi", "NH", "VCC", "OUT"),
        qnet("q_lo", "NL", "OUT", "GND"),
    ]
}

#[test]
fn recognizes_tristate_inverter() {
    let gates = recognize(tristate_inverter_qs());
    let ts = gates.tristate_inverters();
    assert_eq!(ts.len(), 1);
    assert_eq!(ts[0].input(), "IN");
    assert_eq!(ts[0].output(), "OUT");
    assert_eq!(ts[0].noe, "NOE");
    assert_eq!(ts[0].num_qs(), 10);
    assert!(gates.nors().is_empty());
    assert!(gates.power_muxes().is_empty());
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn transistors_are_conserved_and_exclusive() {
    let qs = tristate_inverter_qs();
    let total: usize = qs.iter().map(Transistor::num_qs).sum();
    let gates = recognize(qs);
    assert_eq!(gates.num_allocated_qs() + gates.num_leftover(), total);

    // No transistor may appear in two gates.
    let all = gates.all_gates();
    let mut names: Vec<&ArcStr> = all
        .iter()
        .flat_map(|g| g.transistors())
        .map(|q| &q.name)
        .collect();
    let before = names.len();
    names.sort();
    names.dedup();
    assert_eq!(names.len(), before);
}

#[test]
fn recognizes_pulldowns() {
    let gates = recognize(vec![qnet("pd", "GND", "X", "GND")]);
    let pulldowns = gates.pulldowns();
    assert_eq!(pulldowns.len(), 1);
    assert_eq!(pulldowns[0].input, "X");
    assert!(pulldowns[0].outputs().is_empty());
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn merges_parallel_grounding_transistors() {
    let gates = recognize(vec![
        qnet("pu", "OUT", "VCC", "OUT"),
        qnet("qa", "IN", "OUT", "GND"),
        qnet("qb", "IN", "OUT", "GND"),
    ]);
    let nors = gates.nors();
    assert_eq!(nors.len(), 1);
    assert!(nors[0].is_inverter());
    // The two parallel pulldown paths merge into one logical transistor.
    assert_eq!(nors[0].lut.logic_qs.len(), 1);
    assert!(nors[0].lut.logic_qs[0].is_parallel());
    assert_eq!(nors[0].num_qs(), 3);
    assert_eq!(gates.num_allocated_qs(), 3);
}

#[test]
fn recognizes_power_nor() {
    let gates = recognize(vec![
        qnet("pu_nn", "NN", "VCC", "NN"),
        qnet("q_a", "A", "NN", "GND"),
        qnet("q_b", "B", "NN", "GND"),
        qnet("q_hi", "NN", "VCC", "OUT"),
        qnet("q_lo_a", "A", "OUT", "GND"),
        qnet("q_lo_b", "B", "OUT", "GND"),
    ]);
    let pnors = gates.power_nors();
    assert_eq!(pnors.len(), 1);
    assert_eq!(pnors[0].output(), "OUT");
    assert_eq!(pnors[0].inputs(), ["A", "B"]);
    assert_eq!(pnors[0].num_qs(), 6);
    assert!(gates.nors().is_empty());
    assert!(gates.power_muxes().is_empty());
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn recognizes_or_gate() {
    let gates = recognize(vec![
        qnet("pu_nn", "NN", "VCC", "NN"),
        qnet("q_a", "A", "NN", "GND"),
        qnet("q_b", "B", "NN", "GND"),
        qnet("pu_o", "O", "VCC", "O"),
        qnet("q_inv", "NN", "O", "GND"),
    ]);
    let ors = gates.ors();
    assert_eq!(ors.len(), 1);
    assert_eq!(ors[0].inputs(), ["A", "B"]);
    assert_eq!(ors[0].output(), "O");
    assert_eq!(ors[0].num_qs(), 5);
    assert!(gates.nors().is_empty());
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn recognizes_mux_d_latch() {
    let gates = recognize(vec![
        qnet("pu_q", "Q", "VCC", "Q"),
        qnet("q_q", "NQ", "Q", "GND"),
        qnet("pu_nq", "NQ", "VCC", "NQ"),
        qnet("q_nq", "M", "NQ", "GND"),
        qnet("pu_d", "D", "VCC", "D"),
        qnet("pd", "C", "D", "M"),
        qnet("pf", "NC", "Q", "M"),
    ]);
    let latches = gates.mux_d_latches();
    assert_eq!(latches.len(), 1);
    let latch = &latches[0];
    assert_eq!(latch.d_input, "D");
    assert_eq!(latch.c_input, "C");
    assert_eq!(latch.nc_input, "NC");
    assert_eq!(latch.q_output(), "Q");
    assert_eq!(latch.nq_output(), "NQ");
    assert!(latch.set_inputs.is_empty());
    assert!(latch.clr_inputs.is_empty());
    assert_eq!(latch.num_qs(), 6);
    // The driver holding D high is a plain pullup, not part of the latch.
    assert_eq!(gates.pullups().len(), 1);
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn recognizes_signal_booster() {
    let gates = recognize(vec![
        qnet("pu_na", "NA", "VCC", "NA"),
        qnet("q_na", "A", "NA", "GND"),
        qnet("q_hi", "A", "VCC", "OUT"),
        qnet("q_lo", "NA", "OUT", "GND"),
    ]);
    let boosters = gates.signal_boosters();
    assert_eq!(boosters.len(), 1);
    assert_eq!(boosters[0].input(), "A");
    assert_eq!(boosters[0].output(), "OUT");
    assert_eq!(boosters[0].num_qs(), 4);
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn recognizes_pin_input() {
    let gates = recognize_with_pins(
        vec![
            qnet("pu1", "B1", "VCC", "B1"),
            qnet("i1", "PIN", "B1", "GND"),
            qnet("pu2", "B2", "VCC", "B2"),
            qnet("i2", "B1", "B2", "GND"),
        ],
        &["PIN"],
    );
    let pin_inputs = gates.pin_inputs();
    assert_eq!(pin_inputs.len(), 1);
    assert_eq!(pin_inputs[0].input(), "PIN");
    assert_eq!(pin_inputs[0].output(), "B2");
    assert!(!pin_inputs[0].is_inverting());
    assert_eq!(pin_inputs[0].num_qs(), 4);
    assert!(gates.nors().is_empty());
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn recognizes_bidirectional_pin() {
    let gates = recognize_with_pins(
        vec![
            // Tristate buffer driving the pin.
            qnet("pu_nin", "NIN", "VCC", "NIN"),
            qnet("q_nin", "IN", "NIN", "GND"),
            qnet("pu_nh", "NH", "VCC", "NH"),
            qnet("q_nh_oe", "NOE", "NH", "GND"),
            qnet("q_nh_nin", "NIN", "NH", "GND"),
            qnet("pu_nl", "NL", "VCC", "NL"),
            qnet("q_nl_oe", "NOE", "NL", "GND"),
            qnet("q_nl_in", "IN", "NL", "GND"),
            qnet("q_hi", "NH", "VCC", "PIN"),
            qnet("q_lo", "NL", "PIN", "GND"),
            // Input inverter on the pin net.
            qnet("pu_pb", "PB", "VCC", "PB"),
            qnet("q_pb", "PIN", "PB", "GND"),
        ],
        &["PIN"],
    );
    let pin_ios = gates.pin_ios();
    assert_eq!(pin_ios.len(), 1);
    assert_eq!(pin_ios[0].pin(), "PIN");
    assert!(pin_ios[0].pin_input.is_inverting());
    assert_eq!(pin_ios[0].tristate.input(), "IN");
    assert_eq!(pin_ios[0].tristate.noe, "NOE");
    // The driver's inputs are the port's inputs; the received signal and
    // the driven pin are its outputs.
    assert_eq!(pin_ios[0].inputs(), ["IN", "NOE"]);
    assert_eq!(pin_ios[0].outputs(), ["PB", "PIN"]);
    assert_eq!(pin_ios[0].num_qs(), 12);
    assert!(gates.tristate_buffers().is_empty());
    assert!(gates.pin_inputs().is_empty());
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn ambiguous_pullup_is_reported() {
    let gates = recognize(vec![
        qnet("pu1", "OUT", "VCC", "OUT"),
        qnet("pu2", "VCC", "VCC", "OUT"),
        qnet("q0", "IN", "OUT", "GND"),
    ]);
    assert!(gates.issues.has_error());
    assert!(gates.luts().is_empty());
    assert!(gates.nors().is_empty());
    // Both resistors fall through to the pullup pass; the orphaned logic
    // transistor stays in the pool.
    assert_eq!(gates.pullups().len(), 2);
    assert_eq!(gates.num_leftover(), 1);
}

#[test]
fn logic_network_without_ground_is_reported() {
    let gates = recognize(vec![
        qnet("pu", "OUT", "VCC", "OUT"),
        qnet("q0", "IN", "OUT", "N1"),
    ]);
    assert!(gates.issues.has_error());
    assert!(gates
        .issues
        .iter()
        .any(|issue| matches!(issue, RecognitionIssue::NoGroundPath { net } if net == "OUT")));
    assert!(gates.luts().is_empty());
    // The stranded logic transistor matches as a pass transistor and the
    // resistor falls through to the pullup pass.
    assert_eq!(gates.pass_transistors().len(), 1);
    assert_eq!(gates.pullups().len(), 1);
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn pool_indices_stay_consistent() {
    let mut pool = Pool::new();
    let a = pool.insert(qnet("a", "G", "VCC", "X"));
    let b = pool.insert(qnet("b", "X", "X", "GND"));
    let c = pool.insert(qnet("c", "Y", "VCC", "Y"));
    assert!(pool.powering_ids().contains(&a));
    assert!(pool.grounding_ids().contains(&b));
    assert!(!pool.is_nmos_resistor(a));
    assert!(!pool.is_nmos_resistor(b));
    assert!(pool.is_nmos_resistor(c));
    assert_eq!(pool.electrode_qs("X").count(), 2);
    assert_eq!(pool.gate_qs("X").count(), 1);

    let removed = pool.remove(a).unwrap();
    assert_eq!(removed.name, "a");
    assert_eq!(pool.electrode_qs("X").count(), 1);
    assert!(!pool.powering_ids().contains(&a));
    assert!(pool.remove(a).is_none());
    assert_eq!(pool.len(), 2);
}

/// An inverter traced as layer geometry: a pullup whose gate is tied to its
/// output through metal, and a pulldown gated by `IN`.
fn inverter_drawing() -> Drawing {
    let mut drawing = Drawing::new();
    // Pullup: diffusion strip crossed by an L-shaped poly whose arm rises
    // next to the strip.
    drawing.diff.push(rect_poly(0.0, 0.0, 4.0, 40.0));
    drawing.poly.push(Polygon::from_verts(vec![
        Point::new(-10.0, 18.0),
        Point::new(10.0, 18.0),
        Point::new(10.0, 36.0),
        Point::new(6.0, 36.0),
        Point::new(6.0, 22.0),
        Point::new(-10.0, 22.0),
    ]));
    // Pulldown: a second strip crossed by a straight poly gate.
    drawing.diff.push(rect_poly(20.0, 0.0, 24.0, 40.0));
    drawing.poly.push(rect_poly(16.0, 18.0, 28.0, 22.0));
    // Metal tying pullup drain, pullup gate, and pulldown drain together.
    drawing.metal.push(rect_poly(0.0, 28.0, 24.0, 34.0));
    drawing.contacts.push(rect_poly(1.0, 29.0, 3.0, 33.0));
    drawing.contacts.push(rect_poly(7.0, 29.0, 9.0, 33.0));
    drawing.contacts.push(rect_poly(21.0, 29.0, 23.0, 33.0));
    drawing.snames.push(label("VCC", 2.0, 9.0));
    drawing.snames.push(label("GND", 22.0, 9.0));
    drawing.snames.push(label("IN", 17.0, 20.0));
    drawing.snames.push(label("OUT", 12.0, 31.0));
    drawing
}

#[test]
fn extracts_inverter_from_drawing() {
    let analysis = analyze(inverter_drawing()).unwrap();
    assert_eq!(analysis.qs.len(), 2);

    let nets = &analysis.netlist.nets;
    assert_eq!(nets.len(), 4);
    let out = &nets["OUT"];
    assert_eq!(out.len(), 3);
    assert!(out.contains(&Terminal { role: Role::Gate, q: 0 }));
    assert!(out.contains(&Terminal { role: Role::E1, q: 0 }));
    assert!(out.contains(&Terminal { role: Role::E1, q: 1 }));
    assert_eq!(&nets["VCC"], &Net::from_iter([Terminal { role: Role::E0, q: 0 }]));
    assert_eq!(&nets["GND"], &Net::from_iter([Terminal { role: Role::E0, q: 1 }]));
    assert_eq!(&nets["IN"], &Net::from_iter([Terminal { role: Role::Gate, q: 1 }]));

    let nors = analysis.gates.nors();
    assert_eq!(nors.len(), 1);
    assert!(nors[0].is_inverter());
    assert_eq!(nors[0].input(), "IN");
    assert_eq!(nors[0].output(), "OUT");
    assert_eq!(analysis.gates.num_leftover(), 0);
}

#[test]
fn transistor_name_labels_attach_to_gates() {
    let mut drawing = inverter_drawing();
    drawing.qnames.push(label("QPU", 2.0, 20.0));
    drawing.qnames.push(label("QDOWN", 22.0, 20.0));
    drawing.qnames.push(label("QLOST", 100.0, 100.0));
    let analysis = analyze(drawing).unwrap();
    assert_eq!(analysis.qs[0].name, "QPU");
    assert_eq!(analysis.qs[1].name, "QDOWN");
    assert!(analysis.extract_issues.has_warning());
}

#[test]
fn electrode_order_is_independent_of_tracing_order() {
    let reference = analyze(inverter_drawing()).unwrap();

    let mut reversed = inverter_drawing();
    reversed.diff.reverse();
    reversed.poly.reverse();
    reversed.contacts.reverse();
    reversed.snames.reverse();
    let analysis = analyze(reversed).unwrap();

    assert_eq!(analysis.qs.len(), reference.qs.len());
    for (a, b) in analysis.qs.iter().zip(&reference.qs) {
        assert_eq!(a.gate, b.gate);
        assert_eq!(a.electrode0, b.electrode0);
        assert_eq!(a.electrode1, b.electrode1);
        assert_eq!(a.gate_net, b.gate_net);
        assert_eq!(a.electrode0_net, b.electrode0_net);
        assert_eq!(a.electrode1_net, b.electrode1_net);
    }
}

#[test]
fn snapshot_round_trips() {
    let analysis = analyze(inverter_drawing()).unwrap();
    let snapshot = analysis.snapshot();
    let mut buf = Vec::new();
    snapshot.to_writer(&mut buf).unwrap();
    let restored = Snapshot::from_reader(buf.as_slice()).unwrap();
    assert_eq!(snapshot, restored);
    assert!(restored.bounding_box.is_some());
}

#[test]
fn recognition_resumes_from_snapshot() {
    let direct = analyze(inverter_drawing()).unwrap();
    let mut buf = Vec::new();
    direct.snapshot().to_writer(&mut buf).unwrap();
    let restored = Snapshot::from_reader(buf.as_slice()).unwrap();

    let (netlist, qs, pins) = restored.resume();
    assert_eq!(netlist, direct.netlist);
    assert_eq!(qs, direct.qs);

    let mut gates = Gates::new(&netlist, qs, pins);
    gates.recognize();
    let nors = gates.nors();
    assert_eq!(nors.len(), 1);
    assert!(nors[0].is_inverter());
    assert_eq!(nors[0].input(), "IN");
    assert_eq!(nors[0].output(), "OUT");
    assert_eq!(gates.num_leftover(), 0);
}

#[test]
fn detects_power_to_ground_short() {
    let mut drawing = Drawing::new();
    drawing.diff.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.diff.push(rect_poly(10.0, 0.0, 14.0, 4.0));
    drawing.metal.push(rect_poly(0.0, 2.0, 14.0, 3.0));
    drawing.contacts.push(rect_poly(1.0, 2.2, 2.0, 2.8));
    drawing.contacts.push(rect_poly(11.0, 2.2, 12.0, 2.8));
    drawing.snames.push(label("VCC", 2.0, 1.0));
    drawing.snames.push(label("GND", 12.0, 1.0));

    match analyze(drawing) {
        Err(Error::ShortCircuit { power, ground, trace }) => {
            assert_eq!(power, "VCC");
            assert_eq!(ground, "GND");
            assert!(!trace.0.is_empty());
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a short circuit error"),
    }
}

#[test]
fn conflicting_power_label_is_fatal() {
    let mut drawing = Drawing::new();
    drawing.diff.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.snames.push(label("VCC", 1.0, 1.0));
    drawing.snames.push(label("X", 3.0, 3.0));

    match analyze(drawing) {
        Err(Error::ConflictingLabels { first, second, .. }) => {
            assert_eq!(first, "VCC");
            assert_eq!(second, "X");
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a conflicting label error"),
    }
}

#[test]
fn short_circuit_is_recorded_as_a_fatal_issue() {
    let mut drawing = Drawing::new();
    drawing.diff.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.diff.push(rect_poly(10.0, 0.0, 14.0, 4.0));
    drawing.metal.push(rect_poly(0.0, 2.0, 14.0, 3.0));
    drawing.contacts.push(rect_poly(1.0, 2.2, 2.0, 2.8));
    drawing.contacts.push(rect_poly(11.0, 2.2, 12.0, 2.8));
    drawing.snames.push(label("VCC", 2.0, 1.0));
    drawing.snames.push(label("GND", 12.0, 1.0));
    drawing.normalize();

    let mut extract_issues = IssueSet::new();
    let mut qs = extract::extract_transistors(&mut drawing, &mut extract_issues);
    let contacts = extract::extract_contacts(&drawing, &mut extract_issues);

    let mut issues = IssueSet::new();
    assert!(netlist::build(&drawing, &contacts, &mut qs, &mut issues).is_err());
    assert!(issues.has_fatal());
    assert_eq!(issues.worst_severity(), Some(Severity::Fatal));
}

#[test]
fn conflicting_signal_labels_warn_and_keep_first() {
    let mut drawing = Drawing::new();
    drawing.metal.push(rect_poly(0.0, 0.0, 10.0, 10.0));
    drawing.snames.push(label("A", 3.0, 3.0));
    drawing.snames.push(label("B", 7.0, 7.0));
    let analysis = analyze(drawing).unwrap();
    assert_eq!(analysis.net_issues.num_warnings(), 1);
    assert!(analysis.netlist.nets.contains_key("A"));
    assert!(!analysis.netlist.nets.contains_key("B"));
}

#[test]
fn labels_prefer_metal_over_poly() {
    let mut drawing = Drawing::new();
    drawing.metal.push(rect_poly(0.0, 0.0, 10.0, 10.0));
    drawing.poly.push(rect_poly(0.0, 0.0, 10.0, 10.0));
    drawing.snames.push(label("X", 5.0, 5.0));
    let analysis = analyze(drawing).unwrap();
    // The label lands on the metal; the unnamed, terminal-free poly net is
    // dropped.
    assert_eq!(analysis.netlist.len(), 1);
    assert!(analysis.netlist.nets.contains_key("X"));
}

#[test]
fn same_text_labels_join_disjoint_regions() {
    let mut drawing = Drawing::new();
    drawing.metal.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.metal.push(rect_poly(10.0, 0.0, 14.0, 4.0));
    drawing.snames.push(label("S", 2.0, 2.0));
    drawing.snames.push(label("S", 12.0, 2.0));
    let analysis = analyze(drawing).unwrap();
    assert_eq!(analysis.netlist.len(), 1);
    assert!(analysis.netlist.nets.contains_key("S"));
}

#[test]
fn unattached_label_warns() {
    let mut drawing = Drawing::new();
    drawing.metal.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.snames.push(label("Z", 50.0, 50.0));
    let analysis = analyze(drawing).unwrap();
    assert_eq!(analysis.net_issues.num_warnings(), 1);
    assert!(analysis.netlist.is_empty());
}

#[test]
fn self_crossing_polygon_aborts_analysis() {
    let mut drawing = Drawing::new();
    drawing.poly.push(Polygon::from_verts(vec![
        Point::new(0.0, 0.0),
        Point::new(4.0, 4.0),
        Point::new(4.0, 0.0),
        Point::new(0.0, 4.0),
    ]));
    match analyze(drawing) {
        Err(Error::SelfCrossingPolygon { layer, index, .. }) => {
            assert_eq!(layer, Layer::Poly);
            assert_eq!(index, 0);
        }
        Err(other) => panic!("unexpected error: {other}"),
        Ok(_) => panic!("expected a self-crossing polygon error"),
    }
}

#[test]
fn gate_with_one_electrode_is_skipped() {
    let mut drawing = Drawing::new();
    // Poly covers the top end of the strip, leaving diffusion on one side
    // only.
    drawing.diff.push(rect_poly(0.0, 0.0, 4.0, 10.0));
    drawing.poly.push(rect_poly(-2.0, 6.0, 6.0, 10.0));
    let mut issues = IssueSet::new();
    let qs = extract::extract_transistors(&mut drawing, &mut issues);
    assert!(qs.is_empty());
    assert!(issues.has_error());
}

#[test]
fn triple_contact_drops_metal_link() {
    let mut drawing = Drawing::new();
    drawing.metal.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.poly.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.diff.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.contacts.push(rect_poly(1.0, 1.0, 3.0, 3.0));
    let mut issues = IssueSet::new();
    let contacts = extract::extract_contacts(&drawing, &mut issues);
    assert_eq!(contacts.len(), 1);
    assert!(contacts[0].metal.is_none());
    assert_eq!(contacts[0].poly, Some(0));
    assert_eq!(contacts[0].diff, Some(0));
    assert!(issues.is_empty());
}

#[test]
fn isolated_contact_warns_and_is_dropped() {
    let mut drawing = Drawing::new();
    drawing.metal.push(rect_poly(0.0, 0.0, 4.0, 4.0));
    drawing.contacts.push(rect_poly(1.0, 1.0, 3.0, 3.0));
    drawing.contacts.push(rect_poly(50.0, 50.0, 52.0, 52.0));
    let mut issues = IssueSet::new();
    let contacts = extract::extract_contacts(&drawing, &mut issues);
    // Both contacts bridge fewer than two layers.
    assert!(contacts.is_empty());
    assert_eq!(issues.num_warnings(), 2);
}

#[test]
fn buried_contact_crossover_is_not_a_gate() {
    let mut drawing = Drawing::new();
    drawing.diff.push(rect_poly(0.0, 0.0, 4.0, 20.0));
    drawing.poly.push(rect_poly(-4.0, 8.0, 8.0, 12.0));
    // A contact over the crossover makes it a buried connection.
    drawing.contacts.push(rect_poly(1.0, 9.0, 3.0, 11.0));
    let mut issues = IssueSet::new();
    let qs = extract::extract_transistors(&mut drawing, &mut issues);
    assert!(qs.is_empty());
    // The crossover folds back into the diffusion, rejoining the strip into
    // one conductive region.
    assert_eq!(drawing.diff.len(), 1);
}
