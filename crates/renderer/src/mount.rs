use std::time::Instant;

use scheduler::{FrameTick, RefreshSource, TickId};

use crate::context::HostSurface;
use crate::hero::HeroRenderer;
use crate::program::ShaderSources;

/// Lifetime of the hero on one host surface, from mount to unmount.
///
/// A mount whose setup failed stays inert: it requests no ticks and draws
/// nothing, but every operation remains callable.
pub struct Mount<S: HostSurface> {
    renderer: Option<HeroRenderer<S>>,
    resize_subscribed: bool,
}

impl<S: HostSurface> Mount<S> {
    pub fn attach<R>(surface: S, source: &mut R, now: Instant) -> Self
    where
        R: RefreshSource + ?Sized,
    {
        Self::attach_with(surface, ShaderSources::hero(), source, now)
    }

    pub fn attach_with<R>(
        surface: S,
        sources: ShaderSources<'_>,
        source: &mut R,
        now: Instant,
    ) -> Self
    where
        R: RefreshSource + ?Sized,
    {
        match HeroRenderer::initialize_with(surface, sources) {
            Ok(mut renderer) => {
                renderer.start(source, now);
                tracing::info!(size = %renderer.size(), "hero mounted");
                Self {
                    renderer: Some(renderer),
                    resize_subscribed: true,
                }
            }
            Err(_) => Self::inert(),
        }
    }

    fn inert() -> Self {
        Self {
            renderer: None,
            resize_subscribed: false,
        }
    }

    /// True while a renderer exists and its frame task is running.
    pub fn is_active(&self) -> bool {
        self.renderer
            .as_ref()
            .is_some_and(HeroRenderer::is_running)
    }

    pub fn notify_resize(&mut self) {
        if !self.resize_subscribed {
            return;
        }
        if let Some(renderer) = self.renderer.as_mut() {
            renderer.notify_resize();
        }
    }

    pub fn on_refresh<R>(&mut self, id: TickId, source: &mut R, now: Instant) -> Option<FrameTick>
    where
        R: RefreshSource + ?Sized,
    {
        self.renderer.as_mut()?.on_refresh(id, source, now)
    }

    /// Stops the frame task and releases the renderer. Returns false when
    /// there was nothing left to detach.
    pub fn detach<R>(&mut self, source: &mut R) -> bool
    where
        R: RefreshSource + ?Sized,
    {
        self.resize_subscribed = false;
        match self.renderer.take() {
            Some(mut renderer) => {
                renderer.stop(source);
                tracing::info!(frames = renderer.frames_drawn(), "hero unmounted");
                true
            }
            None => false,
        }
    }

    pub fn renderer(&self) -> Option<&HeroRenderer<S>> {
        self.renderer.as_ref()
    }

    pub fn renderer_mut(&mut self) -> Option<&mut HeroRenderer<S>> {
        self.renderer.as_mut()
    }
}
