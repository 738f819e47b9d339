// ============================================================================
// TRANSFORM TOOL — pointer gestures that move / resize / rotate design layers
// ============================================================================
//
// A gesture freezes the target layer's transform, the pointer position, the
// layer center and the pointer angle at pointer-down. Every pointer-move then
// recomputes the transform from that frozen state and the current pointer
// alone; nothing is accumulated frame to frame.

use crate::components::handles::hit_test_layers;
use crate::components::layers::{DesignLayers, DesignTransform, MIN_LAYER_SIZE, Point, Size};

/// Rotation snaps to multiples of this many degrees while the snap modifier is held.
pub const ROTATION_SNAP_DEGREES: f64 = 15.0;

/// Control point that started a gesture.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Handle {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Rotate,
    Body,
}

impl Handle {
    pub fn kind(self) -> GestureKind {
        match self {
            Handle::Body => GestureKind::Move,
            Handle::Rotate => GestureKind::Rotate,
            _ => GestureKind::Resize,
        }
    }

    pub fn is_corner(self) -> bool {
        matches!(
            self,
            Handle::NorthEast | Handle::SouthEast | Handle::SouthWest | Handle::NorthWest
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            Handle::North => "n",
            Handle::NorthEast => "ne",
            Handle::East => "e",
            Handle::SouthEast => "se",
            Handle::South => "s",
            Handle::SouthWest => "sw",
            Handle::West => "w",
            Handle::NorthWest => "nw",
            Handle::Rotate => "rotate",
            Handle::Body => "body",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GestureKind {
    Move,
    Resize,
    Rotate,
}

/// Modifier keys sampled with each pointer-move.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Snap rotation to `ROTATION_SNAP_DEGREES` (Shift in the editor).
    pub snap: bool,
}

/// Round to the nearest snap increment, ties away from zero.
pub fn snap_rotation(degrees: f64) -> f64 {
    (degrees / ROTATION_SNAP_DEGREES).round() * ROTATION_SNAP_DEGREES
}

fn angle_degrees(offset: Point) -> f64 {
    offset.y.atan2(offset.x).to_degrees()
}

/// Frozen start state of one gesture.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InteractionSession {
    pub kind: GestureKind,
    pub handle: Handle,
    pub target: usize,
    pub start: DesignTransform,
    pub start_pointer: Point,
    pub start_center: Point,
    /// Pointer angle about `start_center` at pointer-down, in degrees.
    pub start_angle: f64,
}

impl InteractionSession {
    pub fn begin(target: usize, handle: Handle, start: DesignTransform, pointer: Point) -> Self {
        let start_center = start.center();
        Self {
            kind: handle.kind(),
            handle,
            target,
            start,
            start_pointer: pointer,
            start_center,
            start_angle: angle_degrees(pointer - start_center),
        }
    }

    /// Transform for the current pointer position, or `None` when this frame
    /// should leave the layer untouched (degenerate geometry).
    pub fn update(&self, pointer: Point, modifiers: Modifiers) -> Option<DesignTransform> {
        if !pointer.is_finite() {
            return None;
        }
        let next = match self.kind {
            GestureKind::Move => self.translated(pointer),
            GestureKind::Rotate => self.rotated(pointer, modifiers)?,
            GestureKind::Resize if self.handle.is_corner() => self.scaled_uniform(pointer)?,
            GestureKind::Resize => self.resized_edge(pointer),
        };
        next.is_finite().then_some(next)
    }

    fn translated(&self, pointer: Point) -> DesignTransform {
        DesignTransform {
            position: self.start.position + (pointer - self.start_pointer),
            ..self.start
        }
    }

    fn rotated(&self, pointer: Point, modifiers: Modifiers) -> Option<DesignTransform> {
        let offset = pointer - self.start_center;
        if offset.x == 0.0 && offset.y == 0.0 {
            return None;
        }
        let mut rotation = self.start.rotation + (angle_degrees(offset) - self.start_angle);
        if modifiers.snap {
            rotation = snap_rotation(rotation);
        }
        Some(DesignTransform { rotation, ..self.start })
    }

    fn scaled_uniform(&self, pointer: Point) -> Option<DesignTransform> {
        let start_distance = self.start_center.distance_to(self.start_pointer);
        if start_distance == 0.0 {
            return None;
        }
        let scale = self.start_center.distance_to(pointer) / start_distance;
        let size = Size::new(
            (self.start.size.width * scale).max(MIN_LAYER_SIZE),
            (self.start.size.height * scale).max(MIN_LAYER_SIZE),
        );
        Some(self.start.with_center(self.start_center, size))
    }

    /// Single-axis resize. The drag delta is projected onto the layer's
    /// rotated axis, and the center moves half the size change along that
    /// axis so the opposite edge stays put on screen.
    fn resized_edge(&self, pointer: Point) -> DesignTransform {
        let (sin, cos) = self.start.rotation.to_radians().sin_cos();
        let delta = pointer - self.start_pointer;
        let start_size = self.start.size;

        let mut size = start_size;
        match self.handle {
            Handle::East | Handle::West => {
                let along = delta.x * cos + delta.y * sin;
                let signed = if self.handle == Handle::West { -along } else { along };
                size.width = (start_size.width + signed).max(MIN_LAYER_SIZE);
            }
            _ => {
                let along = -delta.x * sin + delta.y * cos;
                let signed = if self.handle == Handle::North { -along } else { along };
                size.height = (start_size.height + signed).max(MIN_LAYER_SIZE);
            }
        }

        let half_dw = (size.width - start_size.width) / 2.0;
        let half_dh = (size.height - start_size.height) / 2.0;
        let shift = match self.handle {
            Handle::East => Point::new(half_dw * cos, half_dw * sin),
            Handle::West => Point::new(-half_dw * cos, -half_dw * sin),
            Handle::South => Point::new(half_dh * -sin, half_dh * cos),
            Handle::North => Point::new(-half_dh * -sin, -half_dh * cos),
            _ => Point::default(),
        };
        self.start.with_center(self.start_center + shift, size)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum GestureState {
    #[default]
    Idle,
    Active(InteractionSession),
}

/// Owns the layers of one open editor and drives gestures over them.
#[derive(Clone, Debug, Default)]
pub struct InteractionController {
    layers: DesignLayers,
    gesture: GestureState,
    /// Set while a generation request is in flight; all input is ignored.
    frozen: bool,
}

impl InteractionController {
    pub fn new(layers: DesignLayers) -> Self {
        Self {
            layers,
            gesture: GestureState::Idle,
            frozen: false,
        }
    }

    pub fn layers(&self) -> &DesignLayers {
        &self.layers
    }

    pub fn transforms(&self) -> &[DesignTransform] {
        self.layers.transforms()
    }

    pub fn gesture(&self) -> &GestureState {
        &self.gesture
    }

    pub fn session(&self) -> Option<&InteractionSession> {
        match &self.gesture {
            GestureState::Active(session) => Some(session),
            GestureState::Idle => None,
        }
    }

    pub fn is_active(&self) -> bool {
        matches!(self.gesture, GestureState::Active(_))
    }

    pub fn is_frozen(&self) -> bool {
        self.frozen
    }

    pub fn freeze(&mut self) {
        self.gesture = GestureState::Idle;
        self.frozen = true;
    }

    pub fn thaw(&mut self) {
        self.frozen = false;
    }

    /// Pointer pressed somewhere in the container. Hits select the topmost
    /// layer under the pointer and start a gesture on it; misses clear the
    /// selection. Returns the hit, if any.
    pub fn pointer_down(&mut self, pointer: Point) -> Option<(usize, Handle)> {
        if self.frozen || self.is_active() {
            return None;
        }
        match hit_test_layers(&self.layers, pointer) {
            Some((index, handle)) => {
                self.pointer_down_on(index, handle, pointer);
                Some((index, handle))
            }
            None => {
                self.layers.select(None);
                None
            }
        }
    }

    /// Pointer pressed on an already-resolved layer part.
    pub fn pointer_down_on(&mut self, index: usize, handle: Handle, pointer: Point) -> bool {
        if self.frozen || self.is_active() || !pointer.is_finite() {
            return false;
        }
        let Some(start) = self.layers.get(index).copied() else {
            return false;
        };
        self.layers.select(Some(index));
        let session = InteractionSession::begin(index, handle, start, pointer);
        crate::log_info!(
            "Gesture {:?} ({}) started on layer {}",
            session.kind,
            handle.name(),
            index
        );
        self.gesture = GestureState::Active(session);
        true
    }

    /// Recompute the active layer from the frozen session. Returns whether
    /// the layer changed this frame.
    pub fn pointer_move(&mut self, pointer: Point, modifiers: Modifiers) -> bool {
        let GestureState::Active(session) = &self.gesture else {
            return false;
        };
        match session.update(pointer, modifiers) {
            Some(next) => {
                self.layers.set(session.target, next);
                true
            }
            None => false,
        }
    }

    /// End the active gesture wherever the pointer is. Returns the committed
    /// layer and transform.
    pub fn pointer_up(&mut self) -> Option<(usize, DesignTransform)> {
        let GestureState::Active(session) = std::mem::take(&mut self.gesture) else {
            return None;
        };
        let committed = self.layers.get(session.target).copied()?;
        crate::log_info!(
            "Gesture {:?} committed on layer {}: pos=({:.1}, {:.1}) size={:.1}x{:.1} rot={:.1}",
            session.kind,
            session.target,
            committed.position.x,
            committed.position.y,
            committed.size.width,
            committed.size.height,
            committed.rotation
        );
        Some((session.target, committed))
    }

    pub fn select(&mut self, index: Option<usize>) {
        if !self.frozen {
            self.layers.select(index);
        }
    }

    pub fn add_layers(&mut self, count: usize) {
        self.layers.push_defaults(count);
    }

    /// Remove a layer. Any gesture in progress is dropped first since its
    /// target index may no longer exist.
    pub fn remove_layer(&mut self, index: usize) -> Option<DesignTransform> {
        self.gesture = GestureState::Idle;
        self.layers.remove(index)
    }

    /// Replace all layers, ending any gesture (new editing session).
    pub fn reset(&mut self, layers: DesignLayers) {
        self.layers = layers;
        self.gesture = GestureState::Idle;
        self.frozen = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    const RESIZE_HANDLES: [Handle; 8] = [
        Handle::North,
        Handle::NorthEast,
        Handle::East,
        Handle::SouthEast,
        Handle::South,
        Handle::SouthWest,
        Handle::West,
        Handle::NorthWest,
    ];

    fn square(x: f64, y: f64, side: f64, rotation: f64) -> DesignTransform {
        DesignTransform {
            position: Point::new(x, y),
            size: Size::new(side, side),
            rotation,
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < EPS
    }

    /// Screen position of an edge midpoint: `local` is the offset from the
    /// center in the layer's unrotated frame.
    fn edge_point(t: &DesignTransform, local: Point) -> Point {
        let (sin, cos) = t.rotation.to_radians().sin_cos();
        let c = t.center();
        Point::new(
            c.x + local.x * cos - local.y * sin,
            c.y + local.x * sin + local.y * cos,
        )
    }

    #[test]
    fn move_is_start_plus_total_delta() {
        let start = square(50.0, 50.0, 150.0, 20.0);
        let s = InteractionSession::begin(0, Handle::Body, start, Point::new(100.0, 100.0));
        let mut last = start;
        for p in [(103.3, 99.1), (250.7, -40.2), (101.0, 130.0)] {
            last = s.update(Point::new(p.0, p.1), Modifiers::default()).unwrap();
        }
        assert_eq!(last.position, Point::new(50.0 + 1.0, 50.0 + 30.0));
        assert_eq!(last.size, start.size);
        assert_eq!(last.rotation, 20.0);
    }

    #[test]
    fn repeated_frames_do_not_drift() {
        let start = square(0.1, 0.2, 150.0, 0.0);
        let s = InteractionSession::begin(0, Handle::Body, start, Point::new(0.0, 0.0));
        for i in 0..10_000 {
            let _ = s.update(Point::new(i as f64 * 0.1, -(i as f64) * 0.3), Modifiers::default());
        }
        let end = s.update(Point::new(7.0, 9.0), Modifiers::default()).unwrap();
        assert_eq!(end.position, Point::new(0.1 + 7.0, 0.2 + 9.0));
    }

    #[test]
    fn corner_resize_halves_and_keeps_center() {
        let start = square(50.0, 50.0, 150.0, 0.0);
        let center = start.center();
        let s = InteractionSession::begin(0, Handle::SouthEast, start, Point::new(center.x + 100.0, center.y));
        let next = s.update(Point::new(center.x, center.y + 50.0), Modifiers::default()).unwrap();
        assert!(approx(next.size.width, 75.0));
        assert!(approx(next.size.height, 75.0));
        assert!(approx(next.center().x, center.x));
        assert!(approx(next.center().y, center.y));
    }

    #[test]
    fn corner_resize_preserves_center_for_any_scale() {
        let start = DesignTransform {
            position: Point::new(13.0, 27.0),
            size: Size::new(120.0, 80.0),
            rotation: 47.0,
        };
        let c = start.center();
        let s = InteractionSession::begin(0, Handle::NorthWest, start, Point::new(c.x - 60.0, c.y - 40.0));
        for p in [(c.x + 500.0, c.y), (c.x - 1.0, c.y + 2.0), (c.x - 60.0, c.y - 40.0)] {
            let next = s.update(Point::new(p.0, p.1), Modifiers::default()).unwrap();
            assert!((next.center().x - c.x).abs() < 1e-9);
            assert!((next.center().y - c.y).abs() < 1e-9);
        }
    }

    #[test]
    fn corner_resize_from_center_is_noop() {
        let start = square(0.0, 0.0, 100.0, 0.0);
        let s = InteractionSession::begin(0, Handle::NorthEast, start, start.center());
        assert!(s.update(Point::new(300.0, 300.0), Modifiers::default()).is_none());
    }

    #[test]
    fn resize_never_below_minimum() {
        let start = square(50.0, 50.0, 150.0, 30.0);
        let c = start.center();
        for handle in RESIZE_HANDLES {
            let s = InteractionSession::begin(0, handle, start, Point::new(c.x + 75.0, c.y + 75.0));
            for p in [(c.x, c.y), (-5000.0, -5000.0), (5000.0, -5000.0), (c.x - 74.0, c.y - 74.0)] {
                let next = s.update(Point::new(p.0, p.1), Modifiers::default()).unwrap();
                assert!(next.size.width >= MIN_LAYER_SIZE, "{handle:?} width {}", next.size.width);
                assert!(next.size.height >= MIN_LAYER_SIZE, "{handle:?} height {}", next.size.height);
            }
        }
    }

    #[test]
    fn east_resize_keeps_west_edge_axis_aligned() {
        let start = square(50.0, 50.0, 150.0, 0.0);
        let s = InteractionSession::begin(0, Handle::East, start, Point::new(200.0, 125.0));
        let next = s.update(Point::new(260.0, 190.0), Modifiers::default()).unwrap();
        assert_eq!(next.position.x, 50.0);
        assert_eq!(next.size.width, 210.0);
        assert_eq!(next.size.height, 150.0);
        assert_eq!(next.position.y, 50.0);
    }

    #[test]
    fn north_resize_keeps_south_edge_axis_aligned() {
        let start = square(50.0, 50.0, 150.0, 0.0);
        let s = InteractionSession::begin(0, Handle::North, start, Point::new(125.0, 50.0));
        let next = s.update(Point::new(125.0, 80.0), Modifiers::default()).unwrap();
        assert_eq!(next.size.height, 120.0);
        assert_eq!(next.position.y + next.size.height, 200.0);
    }

    #[test]
    fn edge_resize_keeps_opposite_edge_under_rotation() {
        let start = DesignTransform {
            position: Point::new(80.0, 40.0),
            size: Size::new(140.0, 90.0),
            rotation: 37.0,
        };
        let (hw, hh) = (start.size.width / 2.0, start.size.height / 2.0);
        let cases = [
            (Handle::East, Point::new(-hw, 0.0), Point::new(hw, 0.0)),
            (Handle::West, Point::new(hw, 0.0), Point::new(-hw, 0.0)),
            (Handle::South, Point::new(0.0, -hh), Point::new(0.0, hh)),
            (Handle::North, Point::new(0.0, hh), Point::new(0.0, -hh)),
        ];
        for (handle, opposite_local, grabbed_local) in cases {
            let opposite = edge_point(&start, opposite_local);
            let grabbed = edge_point(&start, grabbed_local);
            let s = InteractionSession::begin(0, handle, start, grabbed);
            let next = s
                .update(Point::new(grabbed.x + 33.0, grabbed.y - 12.0), Modifiers::default())
                .unwrap();
            let new_local = match handle {
                Handle::East => Point::new(-next.size.width / 2.0, 0.0),
                Handle::West => Point::new(next.size.width / 2.0, 0.0),
                Handle::South => Point::new(0.0, -next.size.height / 2.0),
                _ => Point::new(0.0, next.size.height / 2.0),
            };
            let moved = edge_point(&next, new_local);
            assert!((moved.x - opposite.x).abs() < 1e-9, "{handle:?}");
            assert!((moved.y - opposite.y).abs() < 1e-9, "{handle:?}");
        }
    }

    #[test]
    fn rotation_follows_pointer_angle() {
        let start = square(0.0, 0.0, 100.0, 0.0);
        let c = start.center();
        let s = InteractionSession::begin(0, Handle::Rotate, start, Point::new(c.x + 100.0, c.y));
        let (sin, cos) = 37.0f64.to_radians().sin_cos();
        let p = Point::new(c.x + 100.0 * cos, c.y + 100.0 * sin);

        let free = s.update(p, Modifiers::default()).unwrap();
        assert!((free.rotation - 37.0).abs() < 1e-9);

        let snapped = s.update(p, Modifiers { snap: true }).unwrap();
        assert_eq!(snapped.rotation, 30.0);
    }

    #[test]
    fn snapped_rotation_is_multiple_of_step() {
        let start = square(0.0, 0.0, 100.0, 250.0);
        let c = start.center();
        let s = InteractionSession::begin(0, Handle::Rotate, start, Point::new(c.x + 10.0, c.y + 3.0));
        for p in [(c.x - 7.0, c.y + 2.0), (c.x + 1.0, c.y - 9.0), (c.x + 4.0, c.y + 4.0)] {
            let r = s.update(Point::new(p.0, p.1), Modifiers { snap: true }).unwrap().rotation;
            assert_eq!(r % ROTATION_SNAP_DEGREES, 0.0, "{r}");
        }
    }

    #[test]
    fn rotation_is_not_normalised() {
        let start = square(0.0, 0.0, 100.0, 350.0);
        let c = start.center();
        let s = InteractionSession::begin(0, Handle::Rotate, start, Point::new(c.x + 10.0, c.y));
        let next = s.update(Point::new(c.x, c.y + 10.0), Modifiers::default()).unwrap();
        assert!((next.rotation - 440.0).abs() < 1e-9);
    }

    #[test]
    fn snap_ties_round_away_from_zero() {
        assert_eq!(snap_rotation(37.0), 30.0);
        assert_eq!(snap_rotation(37.5), 45.0);
        assert_eq!(snap_rotation(-37.5), -45.0);
        assert_eq!(snap_rotation(7.4), 0.0);
    }

    #[test]
    fn rotate_with_pointer_on_center_is_noop() {
        let start = square(0.0, 0.0, 100.0, 10.0);
        let s = InteractionSession::begin(0, Handle::Rotate, start, Point::new(80.0, 50.0));
        assert!(s.update(start.center(), Modifiers::default()).is_none());
    }

    #[test]
    fn non_finite_pointer_is_noop() {
        let start = square(0.0, 0.0, 100.0, 0.0);
        let s = InteractionSession::begin(0, Handle::Body, start, Point::new(10.0, 10.0));
        assert!(s.update(Point::new(f64::NAN, 3.0), Modifiers::default()).is_none());
        assert!(s.update(Point::new(f64::INFINITY, 3.0), Modifiers::default()).is_none());
    }

    #[test]
    fn controller_gesture_lifecycle() {
        let mut ctl = InteractionController::new(DesignLayers::initialize(2, None));
        ctl.select(None);

        // Layer 1 is on top where both overlap.
        assert_eq!(ctl.pointer_down(Point::new(150.0, 150.0)), Some((1, Handle::Body)));
        assert!(ctl.is_active());
        assert_eq!(ctl.layers().selected(), Some(1));

        // A second press cannot interrupt the active session.
        assert_eq!(ctl.pointer_down(Point::new(60.0, 60.0)), None);

        assert!(ctl.pointer_move(Point::new(160.0, 140.0), Modifiers::default()));
        let (index, committed) = ctl.pointer_up().unwrap();
        assert_eq!(index, 1);
        assert_eq!(committed.position, Point::new(80.0, 60.0));
        assert!(!ctl.is_active());
        assert!(!ctl.pointer_move(Point::new(0.0, 0.0), Modifiers::default()));
    }

    #[test]
    fn controller_miss_clears_selection() {
        let mut ctl = InteractionController::new(DesignLayers::initialize(1, None));
        assert_eq!(ctl.layers().selected(), Some(0));
        assert_eq!(ctl.pointer_down(Point::new(1000.0, 1000.0)), None);
        assert_eq!(ctl.layers().selected(), None);
        assert!(!ctl.is_active());
    }

    #[test]
    fn controller_degenerate_frame_keeps_previous_value() {
        let mut ctl = InteractionController::new(DesignLayers::initialize(1, None));
        let center = ctl.transforms()[0].center();
        assert!(ctl.pointer_down_on(0, Handle::Rotate, Point::new(center.x, center.y + 99.0)));
        assert!(ctl.pointer_move(Point::new(center.x - 99.0, center.y), Modifiers::default()));
        let before = ctl.transforms()[0];
        assert!(!ctl.pointer_move(center, Modifiers::default()));
        assert_eq!(ctl.transforms()[0], before);
        assert!(ctl.is_active());
    }

    #[test]
    fn frozen_controller_ignores_input() {
        let mut ctl = InteractionController::new(DesignLayers::initialize(1, None));
        ctl.freeze();
        assert!(!ctl.pointer_down_on(0, Handle::Body, Point::new(60.0, 60.0)));
        assert_eq!(ctl.pointer_down(Point::new(60.0, 60.0)), None);
        ctl.thaw();
        assert!(ctl.pointer_down_on(0, Handle::Body, Point::new(60.0, 60.0)));
    }

    #[test]
    fn removing_layer_ends_gesture() {
        let mut ctl = InteractionController::new(DesignLayers::initialize(3, None));
        assert!(ctl.pointer_down_on(2, Handle::East, Point::new(240.0, 165.0)));
        ctl.remove_layer(2);
        assert!(!ctl.is_active());
        assert_eq!(ctl.transforms().len(), 2);
        assert_eq!(ctl.layers().selected(), None);
    }

    #[test]
    fn controller_resolves_handles_on_rotated_layer() {
        let mut ctl = InteractionController::new(DesignLayers::initialize(1, Some(&[square(50.0, 50.0, 150.0, 90.0)])));
        assert_eq!(ctl.layers().selected(), Some(0));

        // East midpoint of a box turned 90° sits below its center.
        let east = edge_point(&ctl.transforms()[0], Point::new(75.0, 0.0));
        assert!(approx(east.x, 125.0) && approx(east.y, 200.0));
        assert_eq!(ctl.pointer_down(east), Some((0, Handle::East)));
        ctl.pointer_move(Point::new(east.x, east.y + 30.0), Modifiers::default());
        let (_, widened) = ctl.pointer_up().unwrap();
        assert!(approx(widened.size.width, 180.0));
        assert!(approx(widened.size.height, 150.0));
        assert!(approx(widened.center().x, 125.0) && approx(widened.center().y, 140.0));

        // The rotate knob hangs off the local bottom edge, so on screen it is left of center.
        let knob = edge_point(
            &widened,
            Point::new(0.0, widened.size.height / 2.0 + crate::components::handles::ROTATE_HANDLE_OFFSET),
        );
        assert!(approx(knob.x, 26.0) && approx(knob.y, 140.0));
        assert_eq!(ctl.pointer_down(knob), Some((0, Handle::Rotate)));
        ctl.pointer_move(Point::new(125.0, 240.0), Modifiers::default());
        let (_, turned) = ctl.pointer_up().unwrap();
        assert!(approx(turned.rotation, 0.0));
        assert_eq!(turned.size, widened.size);
    }

    #[test]
    fn separate_moves_add_up() {
        let mut ctl = InteractionController::new(DesignLayers::initialize(1, None));
        let drags = [
            ((100.0, 100.0), (110.0, 95.0)),
            ((120.0, 120.0), (90.0, 150.0)),
            ((100.0, 150.0), (100.5, 149.25)),
        ];
        for (from, to) in drags {
            assert_eq!(ctl.pointer_down(Point::new(from.0, from.1)), Some((0, Handle::Body)));
            ctl.pointer_move(Point::new(from.0 + 400.0, from.1 - 7.0), Modifiers::default());
            ctl.pointer_move(Point::new(to.0, to.1), Modifiers::default());
            ctl.pointer_up();
        }
        // (10, -5) + (-30, 30) + (0.5, -0.75)
        assert_eq!(ctl.transforms()[0].position, Point::new(30.5, 74.25));
    }
}
