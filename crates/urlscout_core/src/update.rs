use crate::{Effect, IntakePhase, IntakeState, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: IntakeState, msg: Msg) -> (IntakeState, Vec<Effect>) {
    let effects = match msg {
        Msg::InputChunk(chunk) => {
            // Input that races in after end-of-input would never be fetched.
            if state.phase() == IntakePhase::Closed {
                return (state, Vec::new());
            }
            state
                .ingest(&chunk)
                .into_iter()
                .map(|(job_id, url)| Effect::EnqueueUrl { job_id, url })
                .collect()
        }
        Msg::EndOfInput => match state.phase() {
            IntakePhase::Open => {
                state.close();
                vec![Effect::CloseQueue]
            }
            IntakePhase::Closed => Vec::new(),
        },
    };

    (state, effects)
}
