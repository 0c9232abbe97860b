//! UI components.

pub mod canvas_viewer;
