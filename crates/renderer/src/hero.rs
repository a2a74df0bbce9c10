use std::time::Instant;

use scheduler::{FrameTick, RefreshSource, RepeatingTask, TickId, TickOutcome};

use crate::context::{GraphicsContext, HostSurface};
use crate::error::RendererError;
use crate::program::{ShaderSources, QUAD_VERTEX_COUNT, QUAD_VERTICES};
use crate::types::PixelSize;
use crate::viewport::target_size;

type ProgramOf<S> = <<S as HostSurface>::Context as GraphicsContext>::Program;

/// Result of a resize pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResizeReport {
    pub size: PixelSize,
    /// True when the backing buffer was replaced.
    pub reallocated: bool,
}

/// Owns the drawing context, the linked program and the repeating frame task
/// for one host surface.
pub struct HeroRenderer<S: HostSurface> {
    surface: S,
    context: S::Context,
    program: ProgramOf<S>,
    size: PixelSize,
    task: RepeatingTask,
    resize_pending: bool,
    frames_drawn: u64,
}

impl<S: HostSurface> HeroRenderer<S> {
    /// Acquires a context from `surface` and builds the hero program on it.
    pub fn initialize(surface: S) -> Result<Self, RendererError> {
        Self::initialize_with(surface, ShaderSources::hero())
    }

    /// Same as [`HeroRenderer::initialize`] with caller-provided shader sources.
    pub fn initialize_with(surface: S, sources: ShaderSources<'_>) -> Result<Self, RendererError> {
        let mut context = surface.acquire_context().map_err(|err| {
            tracing::warn!(error = %err, "hero disabled: no graphics context");
            err
        })?;
        let mut program = compile_program(&mut context, sources)?;
        context.upload_quad(&mut program, &QUAD_VERTICES);

        let mut renderer = Self {
            surface,
            context,
            program,
            size: PixelSize::default(),
            task: RepeatingTask::new(),
            resize_pending: false,
            frames_drawn: 0,
        };
        renderer.resize();
        Ok(renderer)
    }

    /// Matches the backing buffer to the surface's current metrics.
    ///
    /// The requested size is capped by the context's limits first. Reallocates
    /// only when the capped size differs from the current backing buffer;
    /// viewport and resolution uniform are re-applied every time.
    pub fn resize(&mut self) -> ResizeReport {
        let metrics = self.surface.metrics();
        let requested = target_size(metrics);
        let size = self.context.clamp_backing(requested);
        let reallocated = self.context.backing_size() != size;
        if reallocated {
            if size != requested {
                tracing::warn!(
                    requested = %requested,
                    applied = %size,
                    "backing buffer capped to context limits"
                );
            }
            tracing::debug!(
                width = size.width,
                height = size.height,
                dpr = metrics.device_pixel_ratio,
                "reallocating backing buffer"
            );
            self.context.reallocate_backing(size);
        }
        self.context.set_viewport(size);
        self.context
            .set_resolution(&mut self.program, size.as_uniform());
        self.size = size;
        self.resize_pending = false;
        ResizeReport { size, reallocated }
    }

    /// Sets the time uniform and draws the quad once.
    pub fn render_frame(&mut self, elapsed_seconds: f32) {
        self.context.set_time(&mut self.program, elapsed_seconds);
        self.context
            .draw_triangles(&self.program, QUAD_VERTEX_COUNT);
        self.frames_drawn = self.frames_drawn.saturating_add(1);
    }

    /// Starts the refresh-driven loop. Returns false if it was already running.
    pub fn start<R>(&mut self, source: &mut R, now: Instant) -> bool
    where
        R: RefreshSource + ?Sized,
    {
        let started = self.task.start(source, now);
        if started {
            tracing::debug!(size = %self.size, "hero animation started");
        }
        started
    }

    /// Cancels the pending tick. Safe to call repeatedly.
    pub fn stop<R>(&mut self, source: &mut R) -> bool
    where
        R: RefreshSource + ?Sized,
    {
        let stopped = self.task.stop(source);
        if stopped {
            tracing::debug!(frames = self.frames_drawn, "hero animation stopped");
        }
        stopped
    }

    /// Marks the surface dimensions dirty; the next tick picks them up.
    pub fn notify_resize(&mut self) {
        self.resize_pending = true;
    }

    /// Handles a refresh tick: resize, then render at the elapsed time.
    pub fn on_refresh<R>(&mut self, id: TickId, source: &mut R, now: Instant) -> Option<FrameTick>
    where
        R: RefreshSource + ?Sized,
    {
        match self.task.fire(id, source, now) {
            TickOutcome::Ran(tick) => {
                self.resize();
                self.render_frame(tick.seconds());
                Some(tick)
            }
            TickOutcome::Stale | TickOutcome::Inactive => None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.task.is_active()
    }

    pub fn resize_pending(&self) -> bool {
        self.resize_pending
    }

    /// Size applied by the last resize pass.
    pub fn size(&self) -> PixelSize {
        self.size
    }

    pub fn frames_drawn(&self) -> u64 {
        self.frames_drawn
    }

    pub fn context(&self) -> &S::Context {
        &self.context
    }
}

/// Compiles `sources` on `context`, logging the diagnostic when it fails.
pub fn compile_program<C: GraphicsContext>(
    context: &mut C,
    sources: ShaderSources<'_>,
) -> Result<C::Program, RendererError> {
    context.compile_program(sources).map_err(|err| {
        match &err {
            RendererError::Compile { stage, log } => {
                tracing::error!(%stage, "hero shader compile failed:\n{log}")
            }
            RendererError::Link(log) => tracing::error!("hero program link failed:\n{log}"),
            RendererError::ContextUnavailable(reason) => {
                tracing::warn!(%reason, "graphics context lost while compiling")
            }
        }
        err
    })
}
