use std::collections::{BTreeMap, BTreeSet};

use foundation::math::Vec3;
use foundation::{Aabb3, FragmentId, PartId};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Fragment {
    pub part: PartId,
    /// Resting bounds in model space.
    pub bounds: Aabb3,
    /// Current animated translation relative to the resting position.
    pub offset: Vec3,
}

/// Instance tree of a loaded model: parts, their fragments and view state.
///
/// Parts that were never registered are treated as not visible.
#[derive(Debug, Default)]
pub struct Model {
    parts: BTreeMap<PartId, Vec<FragmentId>>,
    fragments: Vec<Fragment>,
    hidden: BTreeSet<PartId>,
    explode_scale: f64,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a fragment for `part`, creating the part when needed.
    ///
    /// The new fragment picks up the current explode scale.
    pub fn add_fragment(&mut self, part: PartId, bounds: Aabb3) -> FragmentId {
        let id = FragmentId(self.fragments.len() as u32);
        self.fragments.push(Fragment {
            part,
            bounds,
            offset: Vec3::ZERO,
        });
        self.parts.entry(part).or_default().push(id);
        if self.explode_scale > 0.0 {
            self.apply_explode();
        }
        id
    }

    pub fn parts(&self) -> impl Iterator<Item = PartId> + '_ {
        self.parts.keys().copied()
    }

    pub fn contains_part(&self, part: PartId) -> bool {
        self.parts.contains_key(&part)
    }

    /// Fragments of `part` in registration order.
    pub fn fragments_of(&self, part: PartId) -> &[FragmentId] {
        self.parts.get(&part).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn fragment(&self, id: FragmentId) -> Option<&Fragment> {
        self.fragments.get(id.index())
    }

    /// Union of all resting fragment bounds.
    pub fn bounds(&self) -> Option<Aabb3> {
        let mut iter = self.fragments.iter();
        let first = iter.next()?.bounds;
        Some(iter.fold(first, |acc, f| acc.union(&f.bounds)))
    }

    pub fn is_visible(&self, part: PartId) -> bool {
        self.contains_part(part) && !self.hidden.contains(&part)
    }

    pub fn hide(&mut self, parts: &[PartId]) {
        for part in parts {
            if self.contains_part(*part) {
                self.hidden.insert(*part);
            }
        }
    }

    pub fn show(&mut self, parts: &[PartId]) {
        for part in parts {
            self.hidden.remove(part);
        }
    }

    /// Shows only `parts`. An empty slice clears isolation and shows everything.
    pub fn isolate(&mut self, parts: &[PartId]) {
        self.hidden.clear();
        if parts.is_empty() {
            return;
        }
        let keep: BTreeSet<PartId> = parts.iter().copied().collect();
        self.hidden = self.parts().filter(|p| !keep.contains(p)).collect();
    }

    pub fn explode_scale(&self) -> f64 {
        self.explode_scale
    }

    pub fn explode_active(&self) -> bool {
        self.explode_scale > 0.0
    }

    /// Moves every fragment away from the model center by `scale` times its
    /// resting distance. A scale of zero (or less) restores resting positions.
    pub fn explode(&mut self, scale: f64) {
        self.explode_scale = if scale.is_finite() { scale.max(0.0) } else { 0.0 };
        self.apply_explode();
    }

    fn apply_explode(&mut self) {
        let Some(center) = self.bounds().map(|b| b.center()) else {
            return;
        };
        let scale = self.explode_scale;
        for fragment in &mut self.fragments {
            fragment.offset = if scale > 0.0 {
                (fragment.bounds.center() - center).scale(scale)
            } else {
                Vec3::ZERO
            };
        }
    }
}
