//! Netlist construction: collapsing layer connectivity into named nets.
//!
//! Layer polygons and transistor terminals become graph nodes; contacts,
//! gate/electrode attachments, and same-text signal labels become edges.
//! Each connected component is one net, named by its signal label or by a
//! generated placeholder.

use std::collections::HashMap;
use std::fmt;

use arcstr::ArcStr;
use diagnostics::{Diagnostic, IssueSet, Severity};
use geometry::Point;
use indexmap::{IndexMap, IndexSet};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use serde::{Deserialize, Serialize};

use crate::error::{Error, NetTrace, TraceNode};
use crate::extract::Contact;
use crate::gates::Transistor;
use crate::layers::{Drawing, Layer};
use crate::{is_ground_net, is_power_net};

/// A transistor terminal role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    /// The gate terminal.
    Gate,
    /// The first electrode.
    E0,
    /// The second electrode.
    E1,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Gate => write!(f, "gate"),
            Self::E0 => write!(f, "e0"),
            Self::E1 => write!(f, "e1"),
        }
    }
}

/// A transistor terminal: a role on the transistor at the given index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Terminal {
    /// The terminal role.
    pub role: Role,
    /// The transistor index.
    pub q: usize,
}

/// The set of transistor terminals on one net.
pub type Net = IndexSet<Terminal>;

/// The reconstructed netlist.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Netlist {
    /// All nets, keyed by name, in discovery order.
    pub nets: IndexMap<ArcStr, Net>,
}

impl Netlist {
    /// The number of nets.
    pub fn len(&self) -> usize {
        self.nets.len()
    }

    /// Returns `true` if the netlist has no nets.
    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    /// An iterator over net names.
    pub fn names(&self) -> impl Iterator<Item = &ArcStr> {
        self.nets.keys()
    }
}

/// An issue found during netlist construction.
#[derive(Debug, Clone)]
pub enum NetIssue {
    /// A signal label landing on no layer polygon.
    UnattachedLabel {
        /// The label text.
        text: ArcStr,
        /// The label's anchor location.
        location: Point,
    },
    /// Two different (non-power, non-ground) labels on one net. The first
    /// label in canonical node order is kept.
    ConflictingLabels {
        /// The label kept as the net name.
        kept: ArcStr,
        /// The label ignored.
        ignored: ArcStr,
    },
    /// A power and a ground label on one physically connected net. Analysis
    /// cannot continue.
    ShortCircuit {
        /// The power label.
        power: ArcStr,
        /// The ground label.
        ground: ArcStr,
    },
    /// Conflicting labels where at least one names power or ground. Analysis
    /// cannot continue.
    ConflictingPowerLabels {
        /// The first label found.
        first: ArcStr,
        /// The second label found.
        second: ArcStr,
    },
}

impl fmt::Display for NetIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnattachedLabel { text, location } => {
                write!(f, "signal label `{text}` at {location} is not on any polygon")
            }
            Self::ConflictingLabels { kept, ignored } => write!(
                f,
                "net is labeled both `{kept}` and `{ignored}`; keeping `{kept}`"
            ),
            Self::ShortCircuit { power, ground } => {
                write!(f, "power net `{power}` is shorted to ground net `{ground}`")
            }
            Self::ConflictingPowerLabels { first, second } => write!(
                f,
                "net is labeled both `{first}` and `{second}`, one of which is power or ground"
            ),
        }
    }
}

impl Diagnostic for NetIssue {
    fn severity(&self) -> Severity {
        match self {
            Self::UnattachedLabel { .. } | Self::ConflictingLabels { .. } => Severity::Warning,
            Self::ShortCircuit { .. } | Self::ConflictingPowerLabels { .. } => Severity::Fatal,
        }
    }
}

/// A connectivity graph node: a layer region or a transistor terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Node {
    Region(Layer, usize),
    Terminal(Role, usize),
}

/// Builds the netlist and assigns net names to every transistor terminal.
///
/// Fails with [`Error::ShortCircuit`] if a power and a ground label end up
/// on one component, and with [`Error::ConflictingLabels`] if two different
/// labels on one component involve a power or ground net.
pub fn build(
    drawing: &Drawing,
    contacts: &[Contact],
    qs: &mut [Transistor],
    issues: &mut IssueSet<NetIssue>,
) -> Result<Netlist, Error> {
    let mut graph: UnGraph<Node, ()> = UnGraph::new_undirected();
    let mut indices: HashMap<Node, NodeIndex> = HashMap::new();

    // Node indices follow canonical region order, then transistor order, so
    // component iteration below is deterministic.
    for (layer, count) in [
        (Layer::Metal, drawing.metal.len()),
        (Layer::Poly, drawing.poly.len()),
        (Layer::Diff, drawing.diff.len()),
    ] {
        for i in 0..count {
            let node = Node::Region(layer, i);
            indices.insert(node, graph.add_node(node));
        }
    }
    for (i, _) in qs.iter().enumerate() {
        for role in [Role::Gate, Role::E0, Role::E1] {
            let node = Node::Terminal(role, i);
            indices.insert(node, graph.add_node(node));
        }
    }

    for (i, q) in qs.iter().enumerate() {
        for (role, layer, region) in [
            (Role::Gate, Layer::Poly, q.gate),
            (Role::E0, Layer::Diff, q.electrode0),
            (Role::E1, Layer::Diff, q.electrode1),
        ] {
            graph.add_edge(
                indices[&Node::Terminal(role, i)],
                indices[&Node::Region(layer, region)],
                (),
            );
        }
    }

    for contact in contacts {
        let linked: Vec<Node> = [
            contact.metal.map(|i| Node::Region(Layer::Metal, i)),
            contact.poly.map(|i| Node::Region(Layer::Poly, i)),
            contact.diff.map(|i| Node::Region(Layer::Diff, i)),
        ]
        .into_iter()
        .flatten()
        .collect();
        // Contact classification guarantees exactly two links.
        graph.add_edge(indices[&linked[0]], indices[&linked[1]], ());
    }

    // Attach signal labels. Metal is checked before poly before diff, so a
    // label over a via names the metal.
    let mut node_labels: HashMap<NodeIndex, Vec<ArcStr>> = HashMap::new();
    let mut label_nodes: IndexMap<ArcStr, Vec<NodeIndex>> = IndexMap::new();
    for label in &drawing.snames {
        let point = label.anchor.midpoint();
        let attached = [Layer::Metal, Layer::Poly, Layer::Diff]
            .into_iter()
            .find_map(|layer| {
                drawing
                    .layer(layer)
                    .iter()
                    .position(|p| p.contains(&point))
                    .map(|i| Node::Region(layer, i))
            });
        match attached {
            Some(node) => {
                let idx = indices[&node];
                node_labels.entry(idx).or_default().push(label.text.clone());
                label_nodes.entry(label.text.clone()).or_default().push(idx);
            }
            None => issues.add_and_log(NetIssue::UnattachedLabel {
                text: label.text.clone(),
                location: point,
            }),
        }
    }

    // Same-text labels join their regions into one net.
    for nodes in label_nodes.values() {
        for pair in nodes.windows(2) {
            graph.add_edge(pair[0], pair[1], ());
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

    let mut nets: IndexMap<ArcStr, Net> = IndexMap::new();
    let mut num_synthetic = 0usize;
    for nodes in components.values() {
        // Distinct label texts on this component, first occurrence first.
        let mut names: Vec<(ArcStr, NodeIndex)> = Vec::new();
        for &idx in nodes {
            if let Some(labels) = node_labels.get(&idx) {
                for text in labels {
                    if !names.iter().any(|(n, _)| n == text) {
                        names.push((text.clone(), idx));
                    }
                }
            }
        }

        let power = names.iter().find(|(n, _)| is_power_net(n));
        let ground = names.iter().find(|(n, _)| is_ground_net(n));
        if let (Some((p, pn)), Some((g, gn))) = (power, ground) {
            issues.add_and_log(NetIssue::ShortCircuit {
                power: p.clone(),
                ground: g.clone(),
            });
            return Err(Error::ShortCircuit {
                power: p.clone(),
                ground: g.clone(),
                trace: trace_path(&graph, drawing, qs, *pn, *gn),
            });
        }

        let mut name: Option<(ArcStr, NodeIndex)> = None;
        for (text, idx) in &names {
            match &name {
                None => name = Some((text.clone(), *idx)),
                Some((kept, kept_idx)) if kept != text => {
                    if is_power_net(kept)
                        || is_ground_net(kept)
                        || is_power_net(text)
                        || is_ground_net(text)
                    {
                        issues.add_and_log(NetIssue::ConflictingPowerLabels {
                            first: kept.clone(),
                            second: text.clone(),
                        });
                        return Err(Error::ConflictingLabels {
                            first: kept.clone(),
                            second: text.clone(),
                            trace: trace_path(&graph, drawing, qs, *kept_idx, *idx),
                        });
                    }
                    issues.add_and_log(NetIssue::ConflictingLabels {
                        kept: kept.clone(),
                        ignored: text.clone(),
                    });
                }
                Some(_) => {}
            }
        }

        let terminals: Net = nodes
            .iter()
            .filter_map(|&idx| match graph[idx] {
                Node::Terminal(role, q) => Some(Terminal { role, q }),
                Node::Region(..) => None,
            })
            .collect();

        let name = match name {
            Some((name, _)) => name,
            None if terminals.is_empty() => continue,
            None => loop {
                let candidate = arcstr::format!("__net__{num_synthetic}");
                num_synthetic += 1;
                if !nets.contains_key(&candidate) && !label_nodes.contains_key(&candidate) {
                    break candidate;
                }
            },
        };

        for terminal in &terminals {
            let q = &mut qs[terminal.q];
            match terminal.role {
                Role::Gate => q.gate_net = name.clone(),
                Role::E0 => q.electrode0_net = name.clone(),
                Role::E1 => q.electrode1_net = name.clone(),
            }
        }
        nets.insert(name, terminals);
    }

    tracing::info!(nets = nets.len(), qs = qs.len(), "built netlist");
    Ok(Netlist { nets })
}

/// Traces a connectivity path between two graph nodes for error reporting.
fn trace_path(
    graph: &UnGraph<Node, ()>,
    drawing: &Drawing,
    qs: &[Transistor],
    from: NodeIndex,
    to: NodeIndex,
) -> NetTrace {
    let Some((_, path)) = petgraph::algo::astar(graph, from, |n| n == to, |_| 1, |_| 0) else {
        return NetTrace::default();
    };
    NetTrace(
        path.into_iter()
            .map(|idx| match graph[idx] {
                Node::Region(layer, i) => TraceNode {
                    description: format!("{layer}[{i}]"),
                    location: drawing.layer(layer)[i].centroid(),
                },
                Node::Terminal(role, q) => TraceNode {
                    description: format!("{role}({})", qs[q].name),
                    location: qs[q].centroid(),
                },
            })
            .collect(),
    )
}
