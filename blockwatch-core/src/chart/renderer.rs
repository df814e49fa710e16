use tracing::{debug, error, info, trace};

use super::surface::{BoundGradient, ChartSurface, DrawingContext};
use crate::error::{BlockwatchError, BlockwatchResult};
use crate::theme::config::DatasetStyle;
use crate::theme::ThemeConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChartHandle(u64);

impl ChartHandle {
    pub fn id(&self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    pub style: DatasetStyle,
    pub fill: BoundGradient,
    pub data: Vec<u64>,
}

/// The live dual-series line chart.
#[derive(Debug, Clone)]
pub struct ChartInstance {
    handle: ChartHandle,
    context: DrawingContext,
    config: ThemeConfig,
    labels: Vec<String>,
    primary: Series,
    secondary: Series,
    updates: u64,
}

impl ChartInstance {
    pub fn handle(&self) -> ChartHandle {
        self.handle
    }

    pub fn context(&self) -> DrawingContext {
        self.context
    }

    pub fn config(&self) -> &ThemeConfig {
        &self.config
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn primary(&self) -> &Series {
        &self.primary
    }

    pub fn secondary(&self) -> &Series {
        &self.secondary
    }

    /// Number of series updates applied since initialization.
    pub fn updates(&self) -> u64 {
        self.updates
    }

    pub fn peak(&self) -> u64 {
        self.primary
            .data
            .iter()
            .chain(self.secondary.data.iter())
            .copied()
            .max()
            .unwrap_or(0)
    }
}

/// Owns at most one chart instance on a named surface.
pub struct ChartRenderer<S: ChartSurface> {
    surface: S,
    surface_id: String,
    instance: Option<ChartInstance>,
    next_handle: u64,
}

impl<S: ChartSurface> ChartRenderer<S> {
    pub fn new(surface: S, surface_id: impl Into<String>) -> Self {
        Self {
            surface,
            surface_id: surface_id.into(),
            instance: None,
            next_handle: 1,
        }
    }

    /// Builds a fresh, empty chart from `config`.
    ///
    /// Fails if an instance is already live or the surface is absent; both
    /// are logged here so callers may ignore the error.
    pub fn initialize(&mut self, config: &ThemeConfig) -> BlockwatchResult<ChartHandle> {
        if let Some(existing) = &self.instance {
            let err = BlockwatchError::ChartAlreadyInitialized(existing.handle.id());
            error!("{}", err);
            return Err(err);
        }

        let Some(context) = self.surface.acquire_context(&self.surface_id) else {
            let err = BlockwatchError::ChartSurfaceMissing(self.surface_id.clone());
            error!("Could not find chart context: {}", err);
            return Err(err);
        };

        let handle = ChartHandle(self.next_handle);
        self.next_handle += 1;

        let series = |style: &DatasetStyle| Series {
            style: style.clone(),
            fill: context.linear_gradient(&style.fill),
            data: Vec::new(),
        };

        self.instance = Some(ChartInstance {
            handle,
            context,
            config: config.clone(),
            labels: Vec::new(),
            primary: series(config.primary()),
            secondary: series(config.secondary()),
            updates: 0,
        });

        info!(
            "Chart {} initialized on '{}' with theme '{}'",
            handle.id(),
            self.surface_id,
            config.theme
        );
        trace!("Chart {} options: {}", handle.id(), config.to_json());
        Ok(handle)
    }

    /// Replaces labels and both series in place and requests a redraw.
    /// Returns `false` when there is no chart to update.
    pub fn update_series(&mut self, labels: &[String], primary: &[u64], secondary: &[u64]) -> bool {
        let Some(instance) = self.instance.as_mut() else {
            return false;
        };

        instance.labels.clear();
        instance.labels.extend_from_slice(labels);
        instance.primary.data.clear();
        instance.primary.data.extend_from_slice(primary);
        instance.secondary.data.clear();
        instance.secondary.data.extend_from_slice(secondary);
        instance.updates += 1;

        debug!(
            "Chart {} updated with {} points",
            instance.handle.id(),
            labels.len()
        );
        self.surface.request_redraw(instance.context);
        true
    }

    pub fn destroy(&mut self, handle: ChartHandle) -> BlockwatchResult<()> {
        match self.instance.take() {
            Some(instance) if instance.handle == handle => {
                self.surface.release_context(instance.context);
                debug!("Chart {} destroyed", handle.id());
                Ok(())
            }
            other => {
                self.instance = other;
                Err(BlockwatchError::UnknownChartHandle(handle.id()))
            }
        }
    }

    /// Destroys the live instance, if any, then initializes from `config`.
    pub fn rebuild(&mut self, config: &ThemeConfig) -> BlockwatchResult<ChartHandle> {
        if let Some(handle) = self.handle() {
            self.destroy(handle)?;
        }
        self.initialize(config)
    }

    pub fn handle(&self) -> Option<ChartHandle> {
        self.instance.as_ref().map(|i| i.handle)
    }

    pub fn instance(&self) -> Option<&ChartInstance> {
        self.instance.as_ref()
    }

    pub fn surface_id(&self) -> &str {
        &self.surface_id
    }

    pub fn surface(&self) -> &S {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut S {
        &mut self.surface
    }
}
