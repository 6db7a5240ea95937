use winit::event::WindowEvent;
use winit::window::WindowId;

use super::ctx::FrameCtx;

/// Control directive returned by app callbacks.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum AppControl {
    Continue,
    Exit,
}

/// Application contract implemented by higher layers.
///
/// The runtime calls `on_start` once after the window and GPU exist, then
/// `on_frame` for every redraw, then `on_shutdown` exactly once if `on_start`
/// succeeded.
pub trait App {
    /// Creates long-lived GPU resources. An error aborts the run and is
    /// returned from [`Runtime::run`](crate::window::Runtime::run).
    fn on_start(&mut self, ctx: &mut FrameCtx<'_, '_>) -> anyhow::Result<()>;

    /// Called for window events.
    fn on_window_event(&mut self, window_id: WindowId, event: &WindowEvent) -> AppControl {
        let _ = (window_id, event);
        AppControl::Continue
    }

    /// Called once per rendered frame.
    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl;

    /// Releases what `on_start` created. The GPU is still alive here.
    fn on_shutdown(&mut self, ctx: &mut FrameCtx<'_, '_>);
}
