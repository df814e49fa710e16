use crate::theme::config::GradientSpec;

/// A 2D drawing context handed out by a [`ChartSurface`].
///
/// Ids are issued by the surface and never reused while the surface lives,
/// so anything bound to a context is tied to one chart instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DrawingContext {
    id: u64,
}

impl DrawingContext {
    pub fn new(id: u64) -> Self {
        Self { id }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn linear_gradient(&self, spec: &GradientSpec) -> BoundGradient {
        BoundGradient {
            context: *self,
            spec: spec.clone(),
        }
    }
}

/// A gradient created on a specific drawing context. Two bound gradients
/// are only equal if they share the context.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundGradient {
    context: DrawingContext,
    spec: GradientSpec,
}

impl BoundGradient {
    pub fn context(&self) -> DrawingContext {
        self.context
    }

    pub fn spec(&self) -> &GradientSpec {
        &self.spec
    }
}

/// Where charts get drawn. Implemented by the terminal UI and by test
/// doubles.
pub trait ChartSurface {
    /// Returns a context for the named surface, or `None` if no such surface
    /// is currently present.
    fn acquire_context(&mut self, surface_id: &str) -> Option<DrawingContext>;

    fn release_context(&mut self, context: DrawingContext);

    /// Asks the surface to repaint the chart drawn on `context`.
    fn request_redraw(&mut self, context: DrawingContext);
}
