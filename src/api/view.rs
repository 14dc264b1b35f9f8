//! Core View Trait
//!
//! This module defines the `ViewApi` trait, which is implemented by all views of the dashboard.
//! It provides a standardized interface for rendering and updating views.

use std::sync::Arc;

use crate::core::events::AppEvent;

/// Callback used by background tasks to ask the UI for a new frame.
pub type RepaintHook = Arc<dyn Fn() + Send + Sync>;

/// Trait defining the interface for application views.
pub trait ViewApi: Send {
    /// Renders the view.
    ///
    /// # Arguments
    /// * `publish` - A function to publish `AppEvent` events.
    /// * `ctx` - The `egui::Context` for rendering the UI.
    ///
    /// # Returns
    /// A result indicating success or failure.
    fn render<F: Fn(AppEvent) + ?Sized>(
        &mut self,
        publish: &F,
        ctx: &egui::Context,
    ) -> Result<(), String>;
}
