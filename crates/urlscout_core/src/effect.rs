#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Hand a first-seen URL to the fetch queue.
    EnqueueUrl { job_id: crate::JobId, url: String },
    /// No more input will arrive; the queue may drain and stop.
    CloseQueue,
}
