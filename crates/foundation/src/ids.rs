use serde::{Deserialize, Serialize};

/// Addressable element of a 3D model (a node of the instance tree).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PartId(pub u32);

/// Renderable sub-piece of a part. A part may own several fragments.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(pub u32);

impl PartId {
    pub fn new(n: u32) -> Self {
        PartId(n)
    }
}

impl FragmentId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for PartId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
