//! urlscout core: pure intake state machine (bracket scanning and dedupe).
mod dedupe;
mod effect;
mod msg;
mod scanner;
mod state;
mod update;

pub use dedupe::SeenSet;
pub use effect::Effect;
pub use msg::Msg;
pub use scanner::{last_url_token, BracketScanner};
pub use state::{IntakePhase, IntakeState, IntakeStats, JobId};
pub use update::update;
