mod renderer;
mod surface;

pub use renderer::{ChartHandle, ChartInstance, ChartRenderer, Series};
pub use surface::{BoundGradient, ChartSurface, DrawingContext};

#[cfg(test)]
pub(crate) use renderer::tests::{RecordingSurface, SurfaceEvent};
