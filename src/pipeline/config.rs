use std::collections::HashMap;
use std::sync::Arc;

/// Per-stage channel sizing, visible to every [`Chain`] running inside a
/// [`Runtime`] task.
///
/// [`Chain`]: crate::pipeline::chain::Chain
/// [`Runtime`]: crate::pipeline::runtime::Runtime
#[derive(Clone, Default, Debug)]
pub(crate) struct StageConfig {
    pub buffers: Arc<HashMap<&'static str, usize>>,
}

impl StageConfig {
    /// Capacity of the channel fed by `stage`.
    pub fn buffer_for(&self, stage: &'static str, global: usize) -> usize {
        self.buffers.get(stage).copied().unwrap_or(global)
    }
}

tokio::task_local! {
    pub(crate) static STAGE_CONFIG: StageConfig;
}
