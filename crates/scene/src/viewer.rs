use foundation::math::{Vec2, Vec3};
use foundation::{Aabb3, FragmentId, PartId};
use runtime::{Event, EventBus, ViewerEvent};

use crate::camera::Camera;
use crate::model::Model;

/// Queries an overlay needs from a 3D viewer.
///
/// Implementations answer from the viewer's current state; none of these
/// calls mutate it.
pub trait ViewerRuntime {
    fn is_part_visible(&self, part: PartId) -> bool;

    /// Fragments of `part` in enumeration order. Empty until geometry is loaded.
    fn part_fragments(&self, part: PartId) -> Vec<FragmentId>;

    /// Current animated translation of a fragment.
    fn fragment_offset(&self, fragment: FragmentId) -> Option<Vec3>;

    fn explode_active(&self) -> bool;

    fn world_to_client(&self, point: Vec3) -> Option<Vec2>;

    fn geometry_loaded(&self) -> bool;
}

/// In-process viewer: a model, a camera and the event stream they feed.
///
/// Every state change is published on the event bus.
#[derive(Debug, Default)]
pub struct SceneViewer {
    model: Model,
    camera: Camera,
    events: EventBus,
    loaded: bool,
}

impl SceneViewer {
    pub fn new(camera: Camera) -> Self {
        Self {
            camera,
            ..Self::default()
        }
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn events(&self) -> &[Event] {
        self.events.events()
    }

    /// Takes all pending events in emission order.
    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain()
    }

    /// Registers geometry while the model is loading. Call `finish_loading` once done.
    pub fn add_fragment(&mut self, part: PartId, bounds: Aabb3) -> FragmentId {
        self.model.add_fragment(part, bounds)
    }

    pub fn finish_loading(&mut self) {
        self.loaded = true;
        self.events.emit(ViewerEvent::GeometryLoaded);
    }

    pub fn set_camera(&mut self, camera: Camera) {
        self.camera = camera;
        self.events.emit(ViewerEvent::CameraChanged);
    }

    pub fn explode(&mut self, scale: f64) {
        self.model.explode(scale);
        self.events.emit(ViewerEvent::ExplodeChanged {
            scale: self.model.explode_scale(),
        });
    }

    pub fn hide(&mut self, parts: &[PartId]) {
        self.model.hide(parts);
        self.events.emit(ViewerEvent::Hide {
            parts: parts.to_vec(),
        });
    }

    pub fn show(&mut self, parts: &[PartId]) {
        self.model.show(parts);
        self.events.emit(ViewerEvent::Show {
            parts: parts.to_vec(),
        });
    }

    pub fn isolate(&mut self, parts: &[PartId]) {
        self.model.isolate(parts);
        self.events.emit(ViewerEvent::Isolate {
            parts: parts.to_vec(),
        });
    }

    pub fn select(&mut self, parts: &[PartId]) {
        self.events.emit(ViewerEvent::SelectionChanged {
            parts: parts.to_vec(),
        });
    }
}

impl ViewerRuntime for SceneViewer {
    fn is_part_visible(&self, part: PartId) -> bool {
        self.model.is_visible(part)
    }

    fn part_fragments(&self, part: PartId) -> Vec<FragmentId> {
        if !self.loaded {
            return Vec::new();
        }
        self.model.fragments_of(part).to_vec()
    }

    fn fragment_offset(&self, fragment: FragmentId) -> Option<Vec3> {
        self.model.fragment(fragment).map(|f| f.offset)
    }

    fn explode_active(&self) -> bool {
        self.model.explode_active()
    }

    fn world_to_client(&self, point: Vec3) -> Option<Vec2> {
        self.camera.world_to_client(point)
    }

    fn geometry_loaded(&self) -> bool {
        self.loaded
    }
}
