//! Fixed compositing layers

use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of layers every cell carries
pub const LAYER_COUNT: usize = 4;

/// Index of one of the fixed layers.
///
/// Layer 0 holds base terrain; layers 1-3 hold ground, hill and dirt
/// overlays. Layers are independent of each other for autotiling purposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct LayerIndex(u8);

impl LayerIndex {
    pub const TERRAIN: Self = Self(0);
    pub const GROUND: Self = Self(1);
    pub const HILLS: Self = Self(2);
    pub const DIRT: Self = Self(3);

    /// All layers, bottom to top
    pub const ALL: [Self; LAYER_COUNT] = [Self(0), Self(1), Self(2), Self(3)];

    /// Create a layer index, `None` if `index >= LAYER_COUNT`
    pub fn new(index: usize) -> Option<Self> {
        (index < LAYER_COUNT).then_some(Self(index as u8))
    }

    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl TryFrom<u8> for LayerIndex {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value as usize).ok_or_else(|| format!("layer {value} out of range"))
    }
}

impl From<LayerIndex> for u8 {
    fn from(layer: LayerIndex) -> Self {
        layer.0
    }
}

impl fmt::Display for LayerIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Set of layers a tile type may be painted on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LayerSet(u8);

impl LayerSet {
    pub const EMPTY: Self = Self(0);
    pub const ALL: Self = Self(0b1111);

    /// Set containing a single layer
    pub const fn only(layer: LayerIndex) -> Self {
        Self(1 << layer.0)
    }

    pub fn from_layers(layers: &[LayerIndex]) -> Self {
        layers.iter().fold(Self::EMPTY, |set, &l| set.with(l))
    }

    pub const fn with(self, layer: LayerIndex) -> Self {
        Self(self.0 | (1 << layer.0))
    }

    pub const fn contains(self, layer: LayerIndex) -> bool {
        self.0 & (1 << layer.0) != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 & Self::ALL.0 == 0
    }

    /// Layers in this set, bottom to top
    pub fn iter(self) -> impl Iterator<Item = LayerIndex> {
        LayerIndex::ALL.into_iter().filter(move |&l| self.contains(l))
    }
}
