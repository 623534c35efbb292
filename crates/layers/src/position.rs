//! Live positions of issue anchors under the viewer's explode animation.

use foundation::math::Vec3;
use foundation::{FragmentId, PartId};
use scene::ViewerRuntime;
use thiserror::Error;

/// Domain point of an anchor given the explode state.
///
/// With explode inactive the stored point is returned unchanged and `offset`
/// is ignored.
pub fn resolve(point: Vec3, explode_active: bool, offset: Vec3) -> Vec3 {
    if explode_active { point + offset } else { point }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PositionError {
    #[error("viewer geometry is not loaded yet")]
    GeometryNotLoaded,
    #[error("part {part} has no fragment")]
    FragmentNotFound { part: PartId },
}

/// Which fragments of a part stand in for the part's animated offset.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum AnchorMode {
    /// The first fragment the viewer enumerates. Multi-fragment parts follow
    /// that one sub-piece only.
    #[default]
    FirstFragment,
    /// Mean offset of every fragment of the part.
    AllFragments,
}

/// Fragment binding of one anchor, resolved once and cached.
///
/// A failed binding is not cached, so anchors created before the viewer
/// finished loading bind on a later resolution.
#[derive(Debug, Clone, PartialEq)]
pub struct FragmentAnchor {
    part: PartId,
    mode: AnchorMode,
    fragments: Option<Vec<FragmentId>>,
}

impl FragmentAnchor {
    pub fn new(part: PartId, mode: AnchorMode) -> Self {
        Self {
            part,
            mode,
            fragments: None,
        }
    }

    pub fn part(&self) -> PartId {
        self.part
    }

    pub fn is_bound(&self) -> bool {
        self.fragments.is_some()
    }

    pub fn bind<V: ViewerRuntime + ?Sized>(
        &mut self,
        viewer: &V,
    ) -> Result<&[FragmentId], PositionError> {
        if self.fragments.is_none() {
            if !viewer.geometry_loaded() {
                return Err(PositionError::GeometryNotLoaded);
            }
            let mut found = viewer.part_fragments(self.part);
            if found.is_empty() {
                return Err(PositionError::FragmentNotFound { part: self.part });
            }
            if self.mode == AnchorMode::FirstFragment {
                found.truncate(1);
            }
            self.fragments = Some(found);
        }
        Ok(self.fragments.as_deref().unwrap_or(&[]))
    }

    /// Current animated offset of the bound fragment(s).
    pub fn offset<V: ViewerRuntime + ?Sized>(&mut self, viewer: &V) -> Result<Vec3, PositionError> {
        let part = self.part;
        let fragments = self.bind(viewer)?;

        let mut sum = Vec3::ZERO;
        let mut count = 0usize;
        for fragment in fragments {
            if let Some(offset) = viewer.fragment_offset(*fragment) {
                sum = sum + offset;
                count += 1;
            }
        }
        if count == 0 {
            return Err(PositionError::FragmentNotFound { part });
        }
        Ok(sum.scale(1.0 / count as f64))
    }

    /// Live domain point of `point`, which is attached to this anchor's part.
    ///
    /// No fragment is needed while explode is inactive.
    pub fn resolve<V: ViewerRuntime + ?Sized>(
        &mut self,
        point: Vec3,
        viewer: &V,
    ) -> Result<Vec3, PositionError> {
        if !viewer.explode_active() {
            return Ok(resolve(point, false, Vec3::ZERO));
        }
        let offset = self.offset(viewer)?;
        Ok(resolve(point, true, offset))
    }
}
