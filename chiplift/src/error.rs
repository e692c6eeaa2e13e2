//! Fatal analysis errors.

use std::fmt;

use arcstr::ArcStr;
use geometry::Point;

use crate::layers::Layer;

/// A condition that terminates analysis.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A traced polygon crosses itself.
    #[error("self-crossing polygon on the {layer} layer (index {index}, starting at {start})")]
    SelfCrossingPolygon {
        /// The layer the polygon was traced on.
        layer: Layer,
        /// The index of the polygon within its layer, in canonical order.
        index: usize,
        /// The first vertex of the polygon.
        start: Point,
    },
    /// A power net and a ground net are physically connected.
    #[error("short circuit: power net `{power}` is connected to ground net `{ground}`\n{trace}")]
    ShortCircuit {
        /// The power net name.
        power: ArcStr,
        /// The ground net name.
        ground: ArcStr,
        /// The path of drawing elements connecting the two labels.
        trace: NetTrace,
    },
    /// Two different power or ground labels are attached to the same net.
    #[error("conflicting labels: `{first}` and `{second}` name the same net\n{trace}")]
    ConflictingLabels {
        /// The label encountered first, in canonical node order.
        first: ArcStr,
        /// The conflicting label.
        second: ArcStr,
        /// The path of drawing elements connecting the two labels.
        trace: NetTrace,
    },
    /// An I/O error while reading or writing a snapshot.
    #[error("snapshot i/o error")]
    Io(#[from] std::io::Error),
    /// A serialization error while reading or writing a snapshot.
    #[error("snapshot serialization error")]
    Json(#[from] serde_json::Error),
}

/// One drawing element along a connectivity path.
#[derive(Debug, Clone)]
pub struct TraceNode {
    /// What the element is, e.g. `metal[3]` or `gate(Q12)`.
    pub description: String,
    /// Where the element is.
    pub location: Point,
}

/// A path of drawing elements connecting two points of a net.
///
/// Attached to fatal connectivity errors so users can follow the offending
/// wiring on the original tracing.
#[derive(Debug, Clone, Default)]
pub struct NetTrace(pub Vec<TraceNode>);

impl fmt::Display for NetTrace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in &self.0 {
            writeln!(f, "  {} at {}", node.description, node.location)?;
        }
        Ok(())
    }
}
