use crate::history::HistoryStore;
use brain_core::agent::Agent;
use brain_core::metrics::Metrics;
use brain_core::model::ModelProvider;
use brain_core::tooling::ToolRegistry;
use std::sync::Arc;

pub struct ServerState<P: ModelProvider> {
    pub(crate) agent: Arc<Agent<P>>,
    pub(crate) registry: Arc<ToolRegistry>,
    pub(crate) history: Arc<dyn HistoryStore>,
    pub(crate) metrics: Arc<Metrics>,
}

impl<P: ModelProvider> ServerState<P> {
    pub fn new(
        agent: Arc<Agent<P>>,
        registry: Arc<ToolRegistry>,
        history: Arc<dyn HistoryStore>,
        metrics: Arc<Metrics>,
    ) -> Self {
        Self {
            agent,
            registry,
            history,
            metrics,
        }
    }
}
