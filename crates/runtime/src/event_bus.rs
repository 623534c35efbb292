use foundation::PartId;

/// State changes published by the viewer runtime.
///
/// Events are discrete snapshots: a continuous camera drag is observed as
/// whatever `CameraChanged` events the viewer chooses to emit, nothing more.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewerEvent {
    CameraChanged,
    ExplodeChanged { scale: f64 },
    Isolate { parts: Vec<PartId> },
    Hide { parts: Vec<PartId> },
    Show { parts: Vec<PartId> },
    GeometryLoaded,
    SelectionChanged { parts: Vec<PartId> },
}

impl ViewerEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            ViewerEvent::CameraChanged => "camera_changed",
            ViewerEvent::ExplodeChanged { .. } => "explode_changed",
            ViewerEvent::Isolate { .. } => "isolate",
            ViewerEvent::Hide { .. } => "hide",
            ViewerEvent::Show { .. } => "show",
            ViewerEvent::GeometryLoaded => "geometry_loaded",
            ViewerEvent::SelectionChanged { .. } => "selection_changed",
        }
    }

    /// Whether projected overlays must be recomputed after this event.
    pub fn triggers_label_refresh(&self) -> bool {
        match self {
            ViewerEvent::CameraChanged
            | ViewerEvent::ExplodeChanged { .. }
            | ViewerEvent::Isolate { .. }
            | ViewerEvent::Hide { .. }
            | ViewerEvent::Show { .. }
            | ViewerEvent::GeometryLoaded => true,
            ViewerEvent::SelectionChanged { .. } => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub seq: u64,
    pub event: ViewerEvent,
}

/// Ordered log of viewer events, drained by subscribers on their own schedule.
#[derive(Debug, Default)]
pub struct EventBus {
    next_seq: u64,
    events: Vec<Event>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn emit(&mut self, event: ViewerEvent) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.events.push(Event { seq, event });
        seq
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn drain(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }
}
