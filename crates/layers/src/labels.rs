//! Screen-space issue labels kept in step with the viewer.
//!
//! Each tracked issue owns one label. A label's placement and visibility are
//! always derived from the issue's domain point and the viewer's current
//! state; nothing is interpolated between viewer events.

use foundation::PartId;
use foundation::math::{Vec2, Vec3};
use issues::Issue;
use runtime::{Event, ViewerEvent};
use scene::ViewerRuntime;
use serde::Serialize;
use tracing::debug;

use crate::position::{AnchorMode, FragmentAnchor};

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LabelSyncConfig {
    /// Added to the floored client position so the arrow tip sits on the point.
    pub arrow_offset_px: [f64; 2],
    pub anchor_mode: AnchorMode,
}

impl Default for LabelSyncConfig {
    fn default() -> Self {
        Self {
            arrow_offset_px: [10.0, 10.0],
            anchor_mode: AnchorMode::FirstFragment,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelState {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IssueLabel {
    issue_id: String,
    point: Vec3,
    author: String,
    text: String,
    img: Option<String>,
    anchor: FragmentAnchor,
    placement_px: Option<Vec2>,
    state: LabelState,
}

impl IssueLabel {
    pub fn new(issue: &Issue, mode: AnchorMode) -> Self {
        Self {
            issue_id: issue.id.clone(),
            point: issue.position(),
            author: issue.author.clone(),
            text: issue.text.clone(),
            img: issue.img.clone(),
            anchor: FragmentAnchor::new(issue.part_id, mode),
            placement_px: None,
            state: LabelState::Hidden,
        }
    }

    pub fn issue_id(&self) -> &str {
        &self.issue_id
    }

    pub fn part(&self) -> PartId {
        self.anchor.part()
    }

    pub fn state(&self) -> LabelState {
        self.state
    }

    /// Top-left corner of the label in client pixels, once it has been placed.
    pub fn placement_px(&self) -> Option<Vec2> {
        self.placement_px
    }

    /// Recomputes visibility, then placement. Returns `false` when the
    /// placement could not be computed; the previous placement is kept.
    /// A point that does not project (behind the camera) also hides the label.
    fn sync<V: ViewerRuntime + ?Sized>(&mut self, viewer: &V, config: &LabelSyncConfig) -> bool {
        self.state = if viewer.is_part_visible(self.part()) {
            LabelState::Visible
        } else {
            LabelState::Hidden
        };

        let point = match self.anchor.resolve(self.point, viewer) {
            Ok(point) => point,
            Err(err) => {
                debug!(issue = %self.issue_id, %err, "label position skipped");
                return false;
            }
        };
        let Some(client) = viewer.world_to_client(point) else {
            debug!(issue = %self.issue_id, "label point does not project");
            self.state = LabelState::Hidden;
            return false;
        };

        self.placement_px = Some(Vec2::new(
            client.x.floor() + config.arrow_offset_px[0],
            client.y.floor() + config.arrow_offset_px[1],
        ));
        true
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    pub positioned: usize,
    pub skipped: usize,
    pub visible: usize,
    pub hidden: usize,
}

/// Render-ready state of one label.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelView {
    pub id: String,
    pub left_px: Option<f64>,
    pub top_px: Option<f64>,
    pub state: LabelState,
    pub author: String,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub img: Option<String>,
}

/// The issue overlay: one label per issue while enabled, none otherwise.
#[derive(Debug, Default)]
pub struct IssueLabels {
    config: LabelSyncConfig,
    enabled: bool,
    labels: Vec<IssueLabel>,
}

impl IssueLabels {
    pub fn new(config: LabelSyncConfig) -> Self {
        Self {
            config,
            enabled: false,
            labels: Vec::new(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn labels(&self) -> &[IssueLabel] {
        &self.labels
    }

    pub fn label(&self, issue_id: &str) -> Option<&IssueLabel> {
        self.labels.iter().find(|l| l.issue_id == issue_id)
    }

    /// Replaces any existing labels with one per issue and places them.
    pub fn enable<V: ViewerRuntime + ?Sized>(
        &mut self,
        issues: &[Issue],
        viewer: &V,
    ) -> RefreshReport {
        let mode = self.config.anchor_mode;
        self.labels = issues.iter().map(|i| IssueLabel::new(i, mode)).collect();
        self.enabled = true;
        let report = self.refresh(viewer);
        debug!(labels = self.labels.len(), ?report, "issue labels enabled");
        report
    }

    /// Removes every label. Returns how many were removed.
    pub fn disable(&mut self) -> usize {
        self.enabled = false;
        let removed = self.labels.len();
        self.labels.clear();
        removed
    }

    /// Recomputes every tracked label. A no-op while disabled.
    pub fn refresh<V: ViewerRuntime + ?Sized>(&mut self, viewer: &V) -> RefreshReport {
        let mut report = RefreshReport::default();
        if !self.enabled {
            return report;
        }
        for label in &mut self.labels {
            if label.sync(viewer, &self.config) {
                report.positioned += 1;
            } else {
                report.skipped += 1;
            }
            match label.state {
                LabelState::Visible => report.visible += 1,
                LabelState::Hidden => report.hidden += 1,
            }
        }
        report
    }

    pub fn handle_event<V: ViewerRuntime + ?Sized>(
        &mut self,
        event: &ViewerEvent,
        viewer: &V,
    ) -> Option<RefreshReport> {
        if !self.enabled || !event.triggers_label_refresh() {
            return None;
        }
        Some(self.refresh(viewer))
    }

    /// Consumes a batch of drained events, refreshing at most once.
    pub fn pump<V: ViewerRuntime + ?Sized>(
        &mut self,
        events: impl IntoIterator<Item = Event>,
        viewer: &V,
    ) -> Option<RefreshReport> {
        let relevant = events
            .into_iter()
            .any(|e| e.event.triggers_label_refresh());
        if !self.enabled || !relevant {
            return None;
        }
        Some(self.refresh(viewer))
    }

    pub fn snapshot(&self) -> Vec<LabelView> {
        self.labels
            .iter()
            .map(|l| LabelView {
                id: l.issue_id.clone(),
                left_px: l.placement_px.map(|p| p.x),
                top_px: l.placement_px.map(|p| p.y),
                state: l.state,
                author: l.author.clone(),
                text: l.text.clone(),
                img: l.img.clone(),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use foundation::Aabb3;
    use issues::Facility;
    use pretty_assertions::assert_eq;
    use scene::{Camera, SceneViewer};

    fn camera() -> Camera {
        Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
            .with_viewport(200.0, 100.0)
            .with_fov_y(std::f64::consts::FRAC_PI_2)
    }

    fn cube(center: Vec3) -> Aabb3 {
        let h = Vec3::new(0.5, 0.5, 0.5);
        Aabb3::new(center - h, center + h)
    }

    fn issue(id: &str, part: u32, at: Vec3) -> Issue {
        Issue {
            id: id.into(),
            created_at: Utc::now(),
            facility: Facility::Montreal,
            author: "Jane".into(),
            text: "Check this".into(),
            img: None,
            x: at.x,
            y: at.y,
            z: at.z,
            part_id: PartId(part),
        }
    }

    fn loaded_viewer() -> SceneViewer {
        let mut viewer = SceneViewer::new(camera());
        viewer.add_fragment(PartId(1), cube(Vec3::new(-2.0, 0.0, 0.0)));
        viewer.add_fragment(PartId(2), cube(Vec3::new(2.0, 0.0, 0.0)));
        viewer.finish_loading();
        viewer.drain_events();
        viewer
    }

    #[test]
    fn create_places_labels_and_gates_visibility() {
        let mut viewer = loaded_viewer();
        viewer.hide(&[PartId(2)]);

        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        let report = labels.enable(
            &[issue("a", 1, Vec3::ZERO), issue("b", 2, Vec3::ZERO)],
            &viewer,
        );

        assert_eq!(
            report,
            RefreshReport {
                positioned: 2,
                skipped: 0,
                visible: 1,
                hidden: 1
            }
        );
        let a = labels.label("a").unwrap();
        assert_eq!(a.state(), LabelState::Visible);
        assert_eq!(a.placement_px(), Some(Vec2::new(110.0, 60.0)));
        assert_eq!(labels.label("b").unwrap().state(), LabelState::Hidden);
    }

    #[test]
    fn refresh_is_idempotent_without_viewer_changes() {
        let viewer = loaded_viewer();
        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        labels.enable(&[issue("a", 1, Vec3::new(1.3, -0.7, 0.2))], &viewer);

        labels.refresh(&viewer);
        let first = labels.snapshot();
        labels.refresh(&viewer);
        assert_eq!(labels.snapshot(), first);
    }

    #[test]
    fn camera_events_move_labels_and_selection_does_not() {
        let mut viewer = loaded_viewer();
        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        labels.enable(&[issue("a", 1, Vec3::ZERO)], &viewer);

        viewer.select(&[PartId(1)]);
        assert_eq!(labels.pump(viewer.drain_events(), &viewer), None);

        let moved = Camera {
            target: Vec3::new(-1.0, 0.0, 0.0),
            eye: Vec3::new(-1.0, 0.0, 10.0),
            ..camera()
        };
        viewer.set_camera(moved);
        let report = labels.pump(viewer.drain_events(), &viewer).unwrap();
        assert_eq!(report.positioned, 1);

        let placement = labels.label("a").unwrap().placement_px().unwrap();
        assert!(placement.x > 110.0);
    }

    #[test]
    fn labels_behind_the_camera_are_hidden() {
        let mut viewer = loaded_viewer();
        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        labels.enable(&[issue("a", 1, Vec3::ZERO)], &viewer);

        let turned = Camera::looking_at(Vec3::new(0.0, 0.0, 10.0), Vec3::new(0.0, 0.0, 20.0))
            .with_viewport(200.0, 100.0)
            .with_fov_y(std::f64::consts::FRAC_PI_2);
        viewer.set_camera(turned);
        let report = labels.pump(viewer.drain_events(), &viewer).unwrap();
        assert_eq!(
            report,
            RefreshReport {
                positioned: 0,
                skipped: 1,
                visible: 0,
                hidden: 1
            }
        );
        assert_eq!(labels.label("a").unwrap().state(), LabelState::Hidden);

        viewer.set_camera(camera());
        labels.pump(viewer.drain_events(), &viewer);
        let label = labels.label("a").unwrap();
        assert_eq!(label.state(), LabelState::Visible);
        assert_eq!(label.placement_px(), Some(Vec2::new(110.0, 60.0)));
    }

    #[test]
    fn hide_and_show_toggle_label_state() {
        let mut viewer = loaded_viewer();
        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        labels.enable(&[issue("a", 1, Vec3::ZERO)], &viewer);

        viewer.isolate(&[PartId(2)]);
        labels.pump(viewer.drain_events(), &viewer);
        assert_eq!(labels.label("a").unwrap().state(), LabelState::Hidden);

        viewer.isolate(&[]);
        labels.pump(viewer.drain_events(), &viewer);
        assert_eq!(labels.label("a").unwrap().state(), LabelState::Visible);
    }

    #[test]
    fn explode_shifts_label_by_fragment_offset() {
        let mut viewer = loaded_viewer();
        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        labels.enable(&[issue("a", 1, Vec3::ZERO)], &viewer);
        let before = labels.label("a").unwrap().placement_px().unwrap();

        viewer.explode(1.0);
        labels.pump(viewer.drain_events(), &viewer);
        let after = labels.label("a").unwrap().placement_px().unwrap();

        // Part 1 sits left of the model center, so it explodes further left.
        assert!(after.x < before.x);
        assert_eq!(after.y, before.y);
    }

    #[test]
    fn unresolvable_labels_keep_last_position_until_geometry_loads() {
        let mut viewer = SceneViewer::new(camera());
        viewer.add_fragment(PartId(1), cube(Vec3::new(-2.0, 0.0, 0.0)));
        viewer.add_fragment(PartId(2), cube(Vec3::new(2.0, 0.0, 0.0)));

        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        labels.enable(&[issue("a", 1, Vec3::ZERO)], &viewer);
        let resting = labels.label("a").unwrap().placement_px();
        assert!(resting.is_some());

        viewer.explode(1.0);
        let report = labels.pump(viewer.drain_events(), &viewer).unwrap();
        assert_eq!(report.skipped, 1);
        assert_eq!(labels.label("a").unwrap().placement_px(), resting);

        viewer.finish_loading();
        let report = labels.pump(viewer.drain_events(), &viewer).unwrap();
        assert_eq!(report.positioned, 1);
        assert_ne!(labels.label("a").unwrap().placement_px(), resting);
    }

    #[test]
    fn disable_removes_all_labels_and_stops_refreshing() {
        let mut viewer = loaded_viewer();
        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        labels.enable(
            &[issue("a", 1, Vec3::ZERO), issue("b", 2, Vec3::ZERO)],
            &viewer,
        );

        assert_eq!(labels.disable(), 2);
        assert!(labels.labels().is_empty());

        viewer.set_camera(camera());
        assert_eq!(labels.pump(viewer.drain_events(), &viewer), None);
        assert_eq!(
            labels.handle_event(&ViewerEvent::CameraChanged, &viewer),
            None
        );
    }

    #[test]
    fn snapshot_serializes_for_rendering() {
        let viewer = loaded_viewer();
        let mut labels = IssueLabels::new(LabelSyncConfig::default());
        labels.enable(&[issue("a", 1, Vec3::ZERO)], &viewer);

        let json = serde_json::to_value(labels.snapshot()).unwrap();
        assert_eq!(json[0]["id"], "a");
        assert_eq!(json[0]["leftPx"], 110.0);
        assert_eq!(json[0]["topPx"], 60.0);
        assert_eq!(json[0]["state"], "visible");
        assert!(json[0].get("img").is_none());
    }
}
