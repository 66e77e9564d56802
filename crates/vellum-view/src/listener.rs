//! Host-facing notification hooks.

use crate::properties::PropertySnapshot;

/// A shape was clicked without an engine action taking the click.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeClick {
    pub shape_id: i32,
    pub tag: i32,
    pub x: f32,
    pub y: f32,
}

/// Receives view notifications. Every method defaults to doing nothing.
pub trait ViewListener {
    fn command_changed(&mut self, _command: &str) {}
    fn selection_changed(&mut self) {}
    fn content_changed(&mut self) {}
    fn dynamic_changed(&mut self) {}
    fn zoom_changed(&mut self) {}
    fn shape_clicked(&mut self, _click: &ShapeClick) {}
    fn shape_double_clicked(&mut self, _shape_id: i32, _tag: i32) {}
    /// Text is already localized.
    fn show_message(&mut self, _text: &str) {}
}

/// Host command selector and property panel.
pub trait UiBinding {
    /// Show `name` as the selected command without firing a UI change.
    fn select_command(&mut self, name: &str);
    fn selected_command(&self) -> Option<String>;
    fn show_properties(&mut self, _properties: &PropertySnapshot) {}
}
