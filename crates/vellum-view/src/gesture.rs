//! Input gesture router.
//!
//! Turns raw pointer events from the dynamic surface into engine gesture
//! calls: `Idle → (primary down) → Captured → (up) → Idle`. The router only
//! decides what to forward; `GraphView` performs the calls.

use tracing::trace;

/// Pointer button that changed state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

/// Modifier keys held during the event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
}

/// Raw pointer event in dynamic-surface pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    /// Button that changed state; for moves, the button that started the drag.
    pub button: PointerButton,
    pub modifiers: Modifiers,
    /// Primary button currently held.
    pub primary_down: bool,
    /// Secondary button currently held.
    pub secondary_down: bool,
    /// Host event time in milliseconds.
    pub timestamp_ms: u64,
}

impl PointerEvent {
    pub fn new(x: f32, y: f32, button: PointerButton, timestamp_ms: u64) -> Self {
        Self {
            x,
            y,
            button,
            modifiers: Modifiers::default(),
            primary_down: button == PointerButton::Primary,
            secondary_down: button == PointerButton::Secondary,
            timestamp_ms,
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    /// Same event with no buttons held, as delivered on release.
    pub fn released(mut self) -> Self {
        self.primary_down = false;
        self.secondary_down = false;
        self
    }
}

/// Engine gesture call produced by the router.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureCall {
    Press { x: f32, y: f32, ctrl: bool, shift: bool },
    SecondaryPress { x: f32, y: f32 },
    Move { x: f32, y: f32, primary: bool, secondary: bool },
    Release { x: f32, y: f32 },
    DoubleClick { x: f32, y: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureState {
    Idle,
    Captured,
}

/// Per-surface gesture state machine.
#[derive(Debug, Clone)]
pub struct GestureRouter {
    state: GestureState,
    primary_held: bool,
    secondary_held: bool,
    last_release_ms: Option<u64>,
    double_click_ms: u64,
    width: f32,
    height: f32,
    gestures_enabled: bool,
    zoom_enabled: bool,
}

impl GestureRouter {
    pub fn new(width: f32, height: f32, double_click_ms: u64) -> Self {
        Self {
            state: GestureState::Idle,
            primary_held: false,
            secondary_held: false,
            last_release_ms: None,
            double_click_ms,
            width,
            height,
            gestures_enabled: true,
            zoom_enabled: true,
        }
    }

    pub fn state(&self) -> GestureState {
        self.state
    }

    pub fn is_captured(&self) -> bool {
        self.state == GestureState::Captured
    }

    pub fn is_pressed(&self, button: PointerButton) -> bool {
        match button {
            PointerButton::Primary => self.primary_held,
            PointerButton::Secondary => self.secondary_held,
            PointerButton::Middle => false,
        }
    }

    pub fn gestures_enabled(&self) -> bool {
        self.gestures_enabled
    }

    /// While disabled nothing is forwarded. Disabling drops any capture.
    pub fn set_gestures_enabled(&mut self, enabled: bool) {
        if !enabled {
            self.reset();
        }
        self.gestures_enabled = enabled;
    }

    /// Whether zoom and pan requests may reach the engine.
    pub fn zoom_enabled(&self) -> bool {
        self.zoom_enabled
    }

    pub fn set_zoom_enabled(&mut self, enabled: bool) {
        self.zoom_enabled = enabled;
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    fn inside(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x <= self.width && y >= 0.0 && y <= self.height
    }

    pub fn pointer_down(&mut self, ev: &PointerEvent) -> Option<GestureCall> {
        if !self.gestures_enabled {
            trace!("press ignored, gestures disabled");
            return None;
        }
        match ev.button {
            PointerButton::Primary => {
                self.state = GestureState::Captured;
                self.primary_held = true;
                Some(GestureCall::Press {
                    x: ev.x,
                    y: ev.y,
                    ctrl: ev.modifiers.ctrl,
                    shift: ev.modifiers.shift,
                })
            }
            PointerButton::Secondary => {
                self.secondary_held = true;
                Some(GestureCall::SecondaryPress { x: ev.x, y: ev.y })
            }
            PointerButton::Middle => None,
        }
    }

    /// Forward while captured and inside the surface. Any captured move
    /// breaks a pending double-click.
    pub fn pointer_move(&mut self, ev: &PointerEvent) -> Option<GestureCall> {
        if !self.is_captured() {
            return None;
        }
        self.last_release_ms = None;
        if !self.inside(ev.x, ev.y) {
            trace!(x = ev.x, y = ev.y, "move outside surface suppressed");
            return None;
        }
        Some(GestureCall::Move {
            x: ev.x,
            y: ev.y,
            primary: ev.primary_down,
            secondary: ev.secondary_down,
        })
    }

    /// Release is always forwarded while gestures are enabled and always
    /// ends capture.
    pub fn pointer_up(&mut self, ev: &PointerEvent) -> Vec<GestureCall> {
        if !self.gestures_enabled {
            return Vec::new();
        }
        let mut calls = vec![GestureCall::Release { x: ev.x, y: ev.y }];
        if let Some(last) = self.last_release_ms
            && ev.timestamp_ms.saturating_sub(last) < self.double_click_ms
        {
            calls.push(GestureCall::DoubleClick { x: ev.x, y: ev.y });
        }
        self.last_release_ms = Some(ev.timestamp_ms);
        self.state = GestureState::Idle;
        self.primary_held = false;
        self.secondary_held = false;
        calls
    }

    /// Drop capture without forwarding anything (surface torn down).
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.primary_held = false;
        self.secondary_held = false;
        self.last_release_ms = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn down(x: f32, y: f32, t: u64) -> PointerEvent {
        PointerEvent::new(x, y, PointerButton::Primary, t)
    }

    fn double_clicks(calls: &[GestureCall]) -> usize {
        calls
            .iter()
            .filter(|c| matches!(c, GestureCall::DoubleClick { .. }))
            .count()
    }

    #[test]
    fn test_primary_press_captures() {
        let mut router = GestureRouter::new(100.0, 100.0, 300);
        let ev = down(10.0, 10.0, 0).with_modifiers(Modifiers {
            ctrl: true,
            ..Modifiers::default()
        });
        assert_eq!(
            router.pointer_down(&ev),
            Some(GestureCall::Press {
                x: 10.0,
                y: 10.0,
                ctrl: true,
                shift: false
            })
        );
        assert!(router.is_captured());
        assert!(router.is_pressed(PointerButton::Primary));
    }

    #[test]
    fn test_secondary_press_does_not_capture() {
        let mut router = GestureRouter::new(100.0, 100.0, 300);
        let ev = PointerEvent::new(5.0, 5.0, PointerButton::Secondary, 0);
        assert_eq!(
            router.pointer_down(&ev),
            Some(GestureCall::SecondaryPress { x: 5.0, y: 5.0 })
        );
        assert!(!router.is_captured());
        assert_eq!(router.pointer_move(&ev), None);
    }

    #[test]
    fn test_moves_outside_bounds_suppressed() {
        let mut router = GestureRouter::new(100.0, 50.0, 300);
        router.pointer_down(&down(10.0, 10.0, 0));
        assert!(router.pointer_move(&down(100.0, 50.0, 1)).is_some());
        assert!(router.pointer_move(&down(101.0, 10.0, 2)).is_none());
        assert!(router.pointer_move(&down(10.0, -1.0, 3)).is_none());
        // Capture survives an excursion outside the surface.
        assert!(router.is_captured());
    }

    #[test]
    fn test_double_click_window_is_strict() {
        let mut router = GestureRouter::new(100.0, 100.0, 300);

        router.pointer_down(&down(1.0, 1.0, 0));
        assert_eq!(double_clicks(&router.pointer_up(&down(1.0, 1.0, 1000).released())), 0);
        router.pointer_down(&down(1.0, 1.0, 1100));
        let calls = router.pointer_up(&down(1.0, 1.0, 1299).released());
        assert_eq!(calls.len(), 2);
        assert_eq!(double_clicks(&calls), 1);

        let mut router = GestureRouter::new(100.0, 100.0, 300);
        router.pointer_down(&down(1.0, 1.0, 0));
        router.pointer_up(&down(1.0, 1.0, 1000).released());
        router.pointer_down(&down(1.0, 1.0, 1200));
        assert_eq!(double_clicks(&router.pointer_up(&down(1.0, 1.0, 1300).released())), 0);
    }

    #[test]
    fn test_drag_between_releases_breaks_double_click() {
        let mut router = GestureRouter::new(100.0, 100.0, 300);
        router.pointer_down(&down(1.0, 1.0, 0));
        router.pointer_up(&down(1.0, 1.0, 10).released());
        router.pointer_down(&down(1.0, 1.0, 20));
        router.pointer_move(&down(30.0, 30.0, 30));
        assert_eq!(double_clicks(&router.pointer_up(&down(30.0, 30.0, 40).released())), 0);
    }

    #[test]
    fn test_release_always_forwarded_and_ends_capture() {
        let mut router = GestureRouter::new(100.0, 100.0, 300);
        let calls = router.pointer_up(&down(500.0, 500.0, 0).released());
        assert_eq!(calls, vec![GestureCall::Release { x: 500.0, y: 500.0 }]);

        router.pointer_down(&down(1.0, 1.0, 1000));
        router.pointer_up(&down(1.0, 1.0, 5000).released());
        assert_eq!(router.state(), GestureState::Idle);
    }

    #[test]
    fn test_disabled_gestures_forward_nothing() {
        let mut router = GestureRouter::new(100.0, 100.0, 300);
        router.pointer_down(&down(1.0, 1.0, 0));
        router.set_gestures_enabled(false);
        assert!(!router.is_captured());

        assert_eq!(router.pointer_down(&down(2.0, 2.0, 10)), None);
        assert_eq!(router.pointer_move(&down(3.0, 3.0, 20)), None);
        assert!(router.pointer_up(&down(3.0, 3.0, 30).released()).is_empty());

        // The ignored release does not arm a double-click.
        router.set_gestures_enabled(true);
        router.pointer_down(&down(1.0, 1.0, 40));
        assert_eq!(double_clicks(&router.pointer_up(&down(1.0, 1.0, 60).released())), 0);
        assert!(router.zoom_enabled());
    }
}
