use anyhow::{Context, Result};
use ouroboros::self_referencing;

use winit::application::ApplicationHandler;
use winit::dpi::LogicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

use crate::core::{App as CoreApp, AppControl, FrameCtx, WindowCtx};
use crate::device::{Gpu, GpuInit};
use crate::render::GpuResources;

use super::metrics::WindowMetrics;

/// Window/runtime configuration.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub title: String,
    pub initial_size: LogicalSize<f64>,
    pub resizable: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            title: "rook".to_string(),
            initial_size: LogicalSize::new(720.0, 720.0),
            resizable: true,
        }
    }
}

/// Render loop state. The loop only ever moves from `Running` to `Closing`.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum LoopState {
    Running,
    Closing,
}

/// What the caller must do after [`Lifecycle::close`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum CloseStep {
    /// Already closing; only make sure the event loop exits.
    AlreadyClosing,
    /// First close. `shutdown` is set when the app started and has not been
    /// shut down yet.
    Close { shutdown: bool },
}

/// Loop state plus whether the app's startup succeeded.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
struct Lifecycle {
    state: LoopState,
    started: bool,
}

impl Lifecycle {
    fn new() -> Self {
        Self { state: LoopState::Running, started: false }
    }

    fn is_closing(&self) -> bool {
        self.state == LoopState::Closing
    }

    /// Startup finished. Ignored once closing.
    fn mark_started(&mut self) {
        if self.state == LoopState::Running {
            self.started = true;
        }
    }

    fn can_draw(&self) -> bool {
        self.state == LoopState::Running && self.started
    }

    fn close(&mut self) -> CloseStep {
        if self.is_closing() {
            return CloseStep::AlreadyClosing;
        }
        self.state = LoopState::Closing;
        CloseStep::Close { shutdown: std::mem::take(&mut self.started) }
    }
}

/// Entry point for the runtime.
pub struct Runtime;

impl Runtime {
    /// Opens the window, drives `app` until the window closes, and returns
    /// the first startup failure, if any.
    pub fn run<A>(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Result<()>
    where
        A: 'static + CoreApp,
    {
        let event_loop = EventLoop::new().context("failed to create winit EventLoop")?;
        let mut state = AppState::new(config, gpu_init, app);

        event_loop
            .run_app(&mut state)
            .context("winit event loop terminated with error")?;

        match state.fatal.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

#[self_referencing]
struct WindowEntry {
    metrics: WindowMetrics,
    resources: GpuResources,

    window: Window,

    #[borrows(window)]
    #[covariant]
    gpu: Gpu<'this>,
}

struct AppState<A>
where
    A: CoreApp + 'static,
{
    config: RuntimeConfig,
    gpu_init: GpuInit,
    app: A,

    entry: Option<WindowEntry>,
    lifecycle: Lifecycle,
    fatal: Option<anyhow::Error>,
}

impl<A> AppState<A>
where
    A: CoreApp + 'static,
{
    fn new(config: RuntimeConfig, gpu_init: GpuInit, app: A) -> Self {
        Self {
            config,
            gpu_init,
            app,
            entry: None,
            lifecycle: Lifecycle::new(),
            fatal: None,
        }
    }

    fn create_window_entry(&mut self, event_loop: &ActiveEventLoop) -> Result<()> {
        let attrs = Window::default_attributes()
            .with_title(self.config.title.clone())
            .with_inner_size(self.config.initial_size)
            .with_resizable(self.config.resizable);

        let window = event_loop
            .create_window(attrs)
            .context("failed to create window")?;

        let metrics = WindowMetrics::from_window(&window);
        let size = metrics.framebuffer_size();
        log::info!("created window \"{}\" ({}x{})", self.config.title, size.width, size.height);

        let gpu_init = self.gpu_init.clone();
        let entry = WindowEntryTryBuilder {
            metrics,
            resources: GpuResources::new(),
            window,
            gpu_builder: |w| pollster::block_on(Gpu::new(w, gpu_init)),
        }
        .try_build()
        .context("GPU initialization failed for window")?;

        self.entry = Some(entry);
        Ok(())
    }

    fn start(&mut self) -> Result<()> {
        let (app, entry) = (&mut self.app, &mut self.entry);
        let Some(entry) = entry.as_mut() else {
            return Ok(());
        };

        entry.with_mut(|fields| {
            let mut ctx = FrameCtx {
                window: WindowCtx {
                    id: fields.window.id(),
                    window: fields.window,
                    metrics: fields.metrics,
                },
                gpu: fields.gpu,
                resources: fields.resources,
            };
            app.on_start(&mut ctx)
        })?;

        self.lifecycle.mark_started();
        entry.with_window(|w| w.request_redraw());
        Ok(())
    }

    /// Records the first fatal error and closes.
    fn fail(&mut self, event_loop: &ActiveEventLoop, err: anyhow::Error) {
        if self.fatal.is_none() {
            self.fatal = Some(err);
        }
        self.close(event_loop);
    }

    /// Moves to `Closing`: shuts the app down once, then drops the GPU
    /// context and the window, in that order.
    fn close(&mut self, event_loop: &ActiveEventLoop) {
        let shutdown = match self.lifecycle.close() {
            CloseStep::AlreadyClosing => {
                event_loop.exit();
                return;
            }
            CloseStep::Close { shutdown } => shutdown,
        };

        let (app, entry) = (&mut self.app, &mut self.entry);
        if shutdown {
            if let Some(entry) = entry.as_mut() {
                entry.with_mut(|fields| {
                    let mut ctx = FrameCtx {
                        window: WindowCtx {
                            id: fields.window.id(),
                            window: fields.window,
                            metrics: fields.metrics,
                        },
                        gpu: fields.gpu,
                        resources: fields.resources,
                    };
                    app.on_shutdown(&mut ctx);
                });
            }
        }

        // The entry drops `gpu` before the `window` it borrows.
        self.entry = None;
        log::info!("window closed");

        event_loop.exit();
    }
}

impl<A> ApplicationHandler for AppState<A>
where
    A: CoreApp + 'static,
{
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.entry.is_some() || self.lifecycle.is_closing() {
            return;
        }

        if let Err(e) = self.create_window_entry(event_loop) {
            self.fail(event_loop, e);
            return;
        }

        if let Err(e) = self.start() {
            self.fail(event_loop, e.context("application startup failed"));
        }
    }

    fn about_to_wait(&mut self, event_loop: &ActiveEventLoop) {
        if self.lifecycle.is_closing() {
            event_loop.exit();
            return;
        }

        event_loop.set_control_flow(ControlFlow::Wait);

        // Continuous redraw.
        if let Some(entry) = &self.entry {
            entry.with_window(|w| w.request_redraw());
        }
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        window_id: WindowId,
        event: WindowEvent,
    ) {
        if self.lifecycle.is_closing() {
            event_loop.exit();
            return;
        }

        // Split borrows to avoid `self` capture inside `ouroboros` closures.
        let (app, entry) = (&mut self.app, &mut self.entry);

        let Some(entry) = entry.as_mut() else {
            return;
        };
        if entry.with_window(|w| w.id()) != window_id {
            return;
        }

        if app.on_window_event(window_id, &event) == AppControl::Exit {
            self.close(event_loop);
            return;
        }

        match event {
            WindowEvent::CloseRequested => self.close(event_loop),

            WindowEvent::Resized(new_size) => {
                let logical = entry.with_mut(|fields| {
                    fields.metrics.resize(new_size);
                    fields.gpu.resize(new_size);
                    fields.window.request_redraw();
                    fields.metrics.logical_size()
                });
                log::debug!(
                    "resized to {:.0}x{:.0} (framebuffer {}x{})",
                    logical.width,
                    logical.height,
                    new_size.width,
                    new_size.height
                );
            }

            WindowEvent::ScaleFactorChanged { scale_factor, .. } => {
                entry.with_mut(|fields| {
                    let new_size = fields.window.inner_size();
                    fields.metrics.rescale(scale_factor, new_size);
                    fields.gpu.resize(new_size);
                    fields.window.request_redraw();
                });
            }

            WindowEvent::RedrawRequested => {
                if !self.lifecycle.can_draw() {
                    return;
                }

                let mut app_control = AppControl::Continue;
                entry.with_mut(|fields| {
                    if !fields.metrics.is_drawable() {
                        return;
                    }
                    let mut ctx = FrameCtx {
                        window: WindowCtx {
                            id: window_id,
                            window: fields.window,
                            metrics: fields.metrics,
                        },
                        gpu: fields.gpu,
                        resources: fields.resources,
                    };
                    app_control = app.on_frame(&mut ctx);
                });

                if app_control == AppControl::Exit {
                    self.close(event_loop);
                }
            }

            _ => {}
        }
    }
}
