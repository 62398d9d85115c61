//! Interactive transform controller for a single card element.
//!
//! Pointer events drive a small state machine:
//! `Idle -> Dragging | Rotating | Resizing -> Idle`.
//! Each gesture captures an immutable [`InteractionSession`] on
//! pointer-down; every move recomputes the element's values from that
//! snapshot and the pointer delta, so no intermediate state accumulates.

mod gesture;
mod listeners;

pub use gesture::{Edges, ElementMetrics, GestureKind, GestureParseError, InteractionSession};
pub use listeners::{ListenerGuard, ListenerId, ListenerRegistry, LocalListenerRegistry};

use crate::config::EditorConfig;
use crate::geometry::{bearing_degrees, clamp_center, projected_extent, rotate_into_local};
use crate::transform::{Bounds, TransformValues};
use kurbo::Point;
use std::rc::Rc;

/// How resize handles change an element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResizeMode {
    /// Adjust the uniform `scale` (text-like elements).
    Scale,
    /// Adjust `width`/`height` symmetrically around the center (images, boxes).
    #[default]
    Dimensions,
}

/// Per-element interaction settings supplied by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct InteractionOptions {
    /// Allowed region for the element's projected center.
    pub bounds: Option<Bounds>,
    pub resize_mode: ResizeMode,
    pub min_width: f64,
    pub min_height: f64,
    pub min_scale: f64,
    /// Logical pixels of drag per unit of scale.
    pub scale_divisor: f64,
    /// Scale of the parent container; pointer deltas are divided by it.
    pub parent_scale: f64,
}

impl Default for InteractionOptions {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

impl InteractionOptions {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            bounds: None,
            resize_mode: ResizeMode::default(),
            min_width: config.min_width,
            min_height: config.min_height,
            min_scale: config.min_scale,
            scale_divisor: config.scale_divisor,
            parent_scale: config.parent_scale,
        }
    }

    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_resize_mode(mut self, mode: ResizeMode) -> Self {
        self.resize_mode = mode;
        self
    }
}

/// Observable state of the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionState {
    Idle,
    Dragging,
    Rotating,
    Resizing,
}

/// Result of a completed gesture, for the host to commit.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureOutcome {
    pub kind: GestureKind,
    pub initial: TransformValues,
    pub last: TransformValues,
}

impl GestureOutcome {
    /// Whether the gesture actually changed the element.
    pub fn changed(&self) -> bool {
        self.initial != self.last
    }
}

#[derive(Debug)]
struct ActiveGesture {
    session: InteractionSession,
    latest: TransformValues,
    _listeners: ListenerGuard,
}

/// Turns pointer events for one element into transform updates.
///
/// Dropping the controller mid-gesture discards the gesture and detaches
/// its listeners.
pub struct TransformController {
    options: InteractionOptions,
    registry: Rc<dyn ListenerRegistry>,
    active: bool,
    selected: bool,
    gesture: Option<ActiveGesture>,
}

impl TransformController {
    pub fn new(options: InteractionOptions, registry: Rc<dyn ListenerRegistry>) -> Self {
        Self {
            options,
            registry,
            active: true,
            selected: false,
            gesture: None,
        }
    }

    pub fn options(&self) -> &InteractionOptions {
        &self.options
    }

    pub fn set_options(&mut self, options: InteractionOptions) {
        self.options = options;
    }

    /// Enable or disable interaction. Disabling discards any gesture.
    pub fn set_active(&mut self, active: bool) {
        self.active = active;
        if !active && self.gesture.take().is_some() {
            log::debug!("gesture discarded: controller deactivated");
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Mark whether the element is the editor's current selection.
    pub fn set_selected(&mut self, selected: bool) {
        self.selected = selected;
    }

    pub fn is_selected(&self) -> bool {
        self.selected
    }

    pub fn state(&self) -> InteractionState {
        match self.gesture.as_ref().map(|g| g.session.kind) {
            None => InteractionState::Idle,
            Some(GestureKind::Drag) => InteractionState::Dragging,
            Some(GestureKind::Rotate) => InteractionState::Rotating,
            Some(GestureKind::Resize(_)) => InteractionState::Resizing,
        }
    }

    /// The session of the gesture in progress, if any.
    pub fn session(&self) -> Option<&InteractionSession> {
        self.gesture.as_ref().map(|g| &g.session)
    }

    /// Start a gesture. Returns `false` when the gesture is refused: the
    /// controller is inactive, another gesture is running, or a body drag
    /// was attempted on an element that is not yet selected.
    pub fn pointer_down(
        &mut self,
        kind: GestureKind,
        pointer: Point,
        current: &TransformValues,
        metrics: ElementMetrics,
    ) -> bool {
        if !self.active || self.gesture.is_some() {
            return false;
        }
        if kind == GestureKind::Drag && !self.selected {
            return false;
        }

        log::debug!("gesture {} started at ({:.1}, {:.1})", kind, pointer.x, pointer.y);
        self.gesture = Some(ActiveGesture {
            session: InteractionSession::new(kind, pointer, current.clone(), metrics),
            latest: current.clone(),
            _listeners: ListenerGuard::acquire(self.registry.clone()),
        });
        true
    }

    /// Feed a pointer position. Returns the updated values, or `None` when
    /// no gesture is running.
    pub fn pointer_move(&mut self, pointer: Point) -> Option<TransformValues> {
        let gesture = self.gesture.as_mut()?;
        let values = apply_gesture(&gesture.session, pointer, &self.options);
        gesture.latest = values.clone();
        Some(values)
    }

    /// End the gesture. Returns `None` when no gesture was running.
    pub fn pointer_up(&mut self) -> Option<GestureOutcome> {
        let gesture = self.gesture.take()?;
        log::debug!("gesture {} finished", gesture.session.kind);
        Some(GestureOutcome {
            kind: gesture.session.kind,
            initial: gesture.session.initial,
            last: gesture.latest,
        })
    }

    /// Abort the gesture and return the values the element had before it.
    pub fn cancel(&mut self) -> Option<TransformValues> {
        let gesture = self.gesture.take()?;
        log::debug!("gesture {} cancelled", gesture.session.kind);
        Some(gesture.session.initial)
    }
}

/// Compute an element's values for the given pointer position.
pub fn apply_gesture(
    session: &InteractionSession,
    pointer: Point,
    options: &InteractionOptions,
) -> TransformValues {
    match session.kind {
        GestureKind::Drag => apply_drag(session, pointer, options),
        GestureKind::Rotate => apply_rotate(session, pointer),
        GestureKind::Resize(edges) => match options.resize_mode {
            ResizeMode::Scale => apply_scale_resize(session, edges, pointer, options),
            ResizeMode::Dimensions => apply_dimension_resize(session, edges, pointer, options),
        },
    }
}

fn apply_drag(session: &InteractionSession, pointer: Point, options: &InteractionOptions) -> TransformValues {
    let initial = &session.initial;
    let delta = session.delta(pointer) / options.parent_scale;
    let mut x = initial.x + delta.x;
    let mut y = initial.y + delta.y;

    if let Some(bounds) = &options.bounds {
        let size = session.metrics.pixel_size;
        let (proj_w, proj_h) =
            projected_extent(size.width, size.height, initial.effective_scale(), initial.rotate);
        (x, y) = clamp_center(x, y, proj_w, proj_h, bounds);
    }

    TransformValues {
        x,
        y,
        ..initial.clone()
    }
}

fn apply_rotate(session: &InteractionSession, pointer: Point) -> TransformValues {
    let center = session.metrics.screen_center;
    let start = bearing_degrees(center, session.pointer_start);
    let now = bearing_degrees(center, pointer);
    TransformValues {
        rotate: session.initial.rotate + (now - start),
        ..session.initial.clone()
    }
}

fn apply_scale_resize(
    session: &InteractionSession,
    edges: Edges,
    pointer: Point,
    options: &InteractionOptions,
) -> TransformValues {
    let initial = &session.initial;
    let local = rotate_into_local(session.delta(pointer), initial.rotate);
    let change = if edges.is_growing() {
        local.x.max(local.y)
    } else {
        -local.x.min(local.y)
    };
    let scale = (initial.effective_scale() + change / options.scale_divisor).max(options.min_scale);
    TransformValues {
        scale: Some(scale),
        ..initial.clone()
    }
}

/// Resize is center-anchored: each active edge moves by the local delta and
/// the opposite edge mirrors it, so the center never moves.
fn apply_dimension_resize(
    session: &InteractionSession,
    edges: Edges,
    pointer: Point,
    options: &InteractionOptions,
) -> TransformValues {
    let initial = &session.initial;
    let local = rotate_into_local(session.delta(pointer), initial.rotate);

    let mut width = initial.width;
    if edges.east {
        width += 2.0 * local.x;
    }
    if edges.west {
        width -= 2.0 * local.x;
    }

    let mut height = initial.height;
    if edges.is_vertical() {
        let base = height.unwrap_or(session.metrics.pixel_size.height);
        let grown = if edges.south {
            base + 2.0 * local.y
        } else {
            base - 2.0 * local.y
        };
        height = Some(grown.max(options.min_height));
    }

    TransformValues {
        width: width.max(options.min_width),
        height,
        ..initial.clone()
    }
}
