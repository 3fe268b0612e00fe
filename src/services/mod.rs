pub mod events;
pub mod movement;
pub mod reconfigure;
pub mod tone_engine;

pub use events::{EventBus, Stamped, ToneEvent};
pub use movement::{MovementService, MovementStatus, SampleResult};
pub use reconfigure::{ReconfigurationController, RebuildState, RequestOutcome};
pub use tone_engine::{EngineParams, PaletteSnapshot, ToneEngine};
