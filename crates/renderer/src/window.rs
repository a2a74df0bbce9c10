use std::sync::Arc;
use std::time::Instant;

use anyhow::{anyhow, Result};
use scheduler::{RefreshSource, TickId};
use winit::dpi::LogicalSize;
use winit::event::{ElementState, Event, WindowEvent};
use winit::event_loop::{ControlFlow, EventLoop};
use winit::keyboard::{Key, NamedKey};
use winit::window::{Fullscreen, Window, WindowBuilder};

use crate::context::HostSurface;
use crate::error::RendererError;
use crate::gpu::GpuContext;
use crate::mount::Mount;
use crate::types::{GpuOptions, RendererConfig, SurfaceMetrics};
use crate::viewport::target_size;

/// A winit window acting as the hero's host surface.
pub struct WindowSurface {
    window: Arc<Window>,
    gpu: GpuOptions,
}

impl WindowSurface {
    pub fn new(window: Arc<Window>, gpu: GpuOptions) -> Self {
        Self { window, gpu }
    }
}

impl HostSurface for WindowSurface {
    type Context = GpuContext;

    fn acquire_context(&self) -> Result<GpuContext, RendererError> {
        GpuContext::for_window(self.window.clone(), target_size(self.metrics()), &self.gpu)
    }

    fn metrics(&self) -> SurfaceMetrics {
        SurfaceMetrics::from_physical(self.window.inner_size(), self.window.scale_factor())
    }
}

/// Refresh source backed by winit redraw requests, so frames follow the
/// display's refresh cadence.
pub struct RedrawRefresh {
    window: Arc<Window>,
    next_id: u64,
    pending: Option<TickId>,
}

impl RedrawRefresh {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            next_id: 0,
            pending: None,
        }
    }

    /// Claims the outstanding tick when a redraw arrives.
    pub fn take_pending(&mut self) -> Option<TickId> {
        self.pending.take()
    }
}

impl RefreshSource for RedrawRefresh {
    fn request_refresh(&mut self) -> TickId {
        self.next_id += 1;
        let id = TickId(self.next_id);
        self.pending = Some(id);
        self.window.request_redraw();
        id
    }

    fn cancel_refresh(&mut self, id: TickId) {
        if self.pending == Some(id) {
            self.pending = None;
        }
    }
}

/// Opens the hero window and runs its event loop until the window closes.
pub fn run_window(config: RendererConfig) -> Result<()> {
    let event_loop =
        EventLoop::new().map_err(|err| anyhow!("failed to create event loop: {err}"))?;

    let (width, height) = config.window_size;
    let mut builder = WindowBuilder::new()
        .with_title(config.title.as_str())
        .with_inner_size(LogicalSize::new(width, height));
    if config.fullscreen {
        builder = builder.with_fullscreen(Some(Fullscreen::Borderless(None)));
    }
    let window = Arc::new(
        builder
            .build(&event_loop)
            .map_err(|err| anyhow!("failed to create hero window: {err}"))?,
    );

    let mut refresh = RedrawRefresh::new(window.clone());
    let mut mount = Mount::attach(
        WindowSurface::new(window.clone(), config.gpu),
        &mut refresh,
        Instant::now(),
    );
    if !mount.is_active() {
        tracing::warn!("hero unavailable; window stays open without animation");
    }

    event_loop
        .run(move |event, elwt| {
            elwt.set_control_flow(ControlFlow::Wait);
            let Event::WindowEvent { window_id, event } = event else {
                return;
            };
            if window_id != window.id() {
                return;
            }
            match event {
                WindowEvent::CloseRequested | WindowEvent::Destroyed => {
                    mount.detach(&mut refresh);
                    elwt.exit();
                }
                WindowEvent::KeyboardInput { event, .. }
                    if event.state == ElementState::Pressed
                        && matches!(event.logical_key, Key::Named(NamedKey::Escape)) =>
                {
                    mount.detach(&mut refresh);
                    elwt.exit();
                }
                WindowEvent::Resized(_) | WindowEvent::ScaleFactorChanged { .. } => {
                    mount.notify_resize();
                }
                WindowEvent::RedrawRequested => {
                    if let Some(id) = refresh.take_pending() {
                        mount.on_refresh(id, &mut refresh, Instant::now());
                    }
                }
                _ => {}
            }
        })
        .map_err(|err| anyhow!("window event loop failed: {err}"))
}
