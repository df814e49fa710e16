use blockwatch_core::chart::{ChartSurface, DrawingContext};
use tracing::debug;

/// Minimum chart area, in cells, for the chart surface to exist.
pub const MIN_CHART_WIDTH: u16 = 40;
pub const MIN_CHART_HEIGHT: u16 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceChange {
    Appeared,
    Vanished,
    Unchanged,
}

/// The terminal region the dashboard chart is drawn into.
///
/// The surface only exists while the layout leaves room for it. Redraw
/// requests mark the next frame dirty.
#[derive(Debug)]
pub struct TerminalSurface {
    surface_id: String,
    available: bool,
    live: Option<DrawingContext>,
    next_context: u64,
    dirty: bool,
}

impl TerminalSurface {
    pub fn new(surface_id: impl Into<String>) -> Self {
        Self {
            surface_id: surface_id.into(),
            available: false,
            live: None,
            next_context: 1,
            dirty: true,
        }
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Recomputes availability from the chart's layout area.
    pub fn fit(&mut self, width: u16, height: u16) -> SurfaceChange {
        let fits = width >= MIN_CHART_WIDTH && height >= MIN_CHART_HEIGHT;
        if fits == self.available {
            return SurfaceChange::Unchanged;
        }
        debug!(
            "Chart surface '{}' {} ({}x{})",
            self.surface_id,
            if fits { "available" } else { "unavailable" },
            width,
            height
        );
        self.available = fits;
        self.dirty = true;
        if fits {
            SurfaceChange::Appeared
        } else {
            SurfaceChange::Vanished
        }
    }

    /// Returns and clears the dirty flag.
    pub fn take_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }
}

impl ChartSurface for TerminalSurface {
    fn acquire_context(&mut self, surface_id: &str) -> Option<DrawingContext> {
        if !self.available || surface_id != self.surface_id {
            return None;
        }
        let context = DrawingContext::new(self.next_context);
        self.next_context += 1;
        self.live = Some(context);
        self.dirty = true;
        Some(context)
    }

    fn release_context(&mut self, context: DrawingContext) {
        if self.live == Some(context) {
            self.live = None;
        }
        self.dirty = true;
    }

    fn request_redraw(&mut self, context: DrawingContext) {
        if self.live == Some(context) {
            self.dirty = true;
        }
    }
}
