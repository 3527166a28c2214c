use matching_engine::EngineHandle;
use simulation::PopulationConfig;

#[derive(Clone)]
pub struct AppState {
    pub engine: EngineHandle,
    /// Parameters for strategies started by clients
    pub population: PopulationConfig,
}

impl AppState {
    pub fn new(engine: EngineHandle, population: PopulationConfig) -> Self {
        Self { engine, population }
    }
}
