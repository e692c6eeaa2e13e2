//! The input drawing: traced layer polygons and text labels.

use std::fmt;

use arcstr::ArcStr;
use geometry::{Bbox, Polygon, Rect, Segment};
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// A drawing layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Layer {
    /// The metal interconnect layer.
    Metal,
    /// The polysilicon layer.
    Poly,
    /// The diffusion layer.
    Diff,
    /// The contact layer, bridging two of the other layers.
    Contact,
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::Metal => write!(f, "metal"),
            Self::Poly => write!(f, "poly"),
            Self::Diff => write!(f, "diff"),
            Self::Contact => write!(f, "contact"),
        }
    }
}

/// A text label anchored to a point or short baseline segment in the drawing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Label {
    /// The label text.
    pub text: ArcStr,
    /// The anchor baseline. The label names whatever drawing element the
    /// anchor lands on.
    pub anchor: Segment,
}

impl Label {
    /// Creates a new label.
    pub fn new(text: impl Into<ArcStr>, anchor: Segment) -> Self {
        Self {
            text: text.into(),
            anchor,
        }
    }
}

/// A traced drawing: layer polygons plus signal, transistor, and pin labels.
///
/// Same-layer polygons may overlap; [`Drawing::normalize`] coalesces them and
/// puts every layer into canonical order, which downstream indices depend on.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Drawing {
    /// Contact polygons.
    pub contacts: Vec<Polygon>,
    /// Polysilicon polygons.
    pub poly: Vec<Polygon>,
    /// Diffusion polygons.
    pub diff: Vec<Polygon>,
    /// Metal polygons.
    pub metal: Vec<Polygon>,
    /// Transistor name labels.
    pub qnames: Vec<Label>,
    /// Signal name labels.
    pub snames: Vec<Label>,
    /// Pin name labels.
    pub pnames: Vec<Label>,
}

impl Drawing {
    /// Creates an empty drawing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks every traced polygon for self-crossing rings.
    ///
    /// A self-crossing polygon makes boolean geometry unreliable, so the
    /// first one found aborts the run with its layer and location.
    pub fn validate(&self) -> Result<(), Error> {
        for (layer, polygons) in self.layers() {
            for (index, p) in polygons.iter().enumerate() {
                if !p.is_valid() {
                    return Err(Error::SelfCrossingPolygon {
                        layer,
                        index,
                        start: p.start_point().unwrap_or_default(),
                    });
                }
            }
        }
        Ok(())
    }

    /// Merges overlapping same-layer polygons and sorts each layer into
    /// canonical order.
    pub fn normalize(&mut self) {
        self.contacts = geometry::merge(&self.contacts);
        self.poly = geometry::merge(&self.poly);
        self.diff = geometry::merge(&self.diff);
        self.metal = geometry::merge(&self.metal);
    }

    /// The polygons of the given layer.
    pub fn layer(&self, layer: Layer) -> &[Polygon] {
        match layer {
            Layer::Metal => &self.metal,
            Layer::Poly => &self.poly,
            Layer::Diff => &self.diff,
            Layer::Contact => &self.contacts,
        }
    }

    fn layers(&self) -> [(Layer, &[Polygon]); 4] {
        [
            (Layer::Contact, self.contacts.as_slice()),
            (Layer::Poly, self.poly.as_slice()),
            (Layer::Diff, self.diff.as_slice()),
            (Layer::Metal, self.metal.as_slice()),
        ]
    }

    /// Replaces the diffusion layer.
    ///
    /// Transistor extraction rewrites diffusion into non-gate regions; all
    /// diffusion indices elsewhere refer to the rewritten layer.
    pub fn replace_diff(&mut self, diff: Vec<Polygon>) {
        self.diff = diff;
    }

    /// The bounding box of all traced polygons, or [`None`] for an empty
    /// drawing.
    pub fn bounding_box(&self) -> Option<Rect> {
        self.layers()
            .iter()
            .filter_map(|(_, polygons)| polygons.bbox())
            .reduce(|a, b| a.union(&b))
    }
}
