use engine_logging::engine_info;
use urlscout_core::Effect;
use urlscout_engine::{Engine, FetchTask, QueueError, QueueReport};

/// Receiving end of intake effects. The fetch engine in a real run.
pub trait TaskQueue {
    /// Returns false when the queue no longer accepts work.
    fn enqueue_batch(&self, tasks: Vec<FetchTask>) -> bool;
    fn close(&mut self);
}

impl TaskQueue for Engine {
    fn enqueue_batch(&self, tasks: Vec<FetchTask>) -> bool {
        Engine::enqueue_batch(self, tasks)
    }

    fn close(&mut self) {
        Engine::close(self);
    }
}

/// Applies intake effects to the fetch queue.
pub struct EffectRunner<Q = Engine> {
    queue: Q,
}

impl<Q: TaskQueue> EffectRunner<Q> {
    pub fn new(queue: Q) -> Self {
        Self { queue }
    }

    /// URLs from one batch of effects reach the queue together, ahead of any
    /// close request in the same batch.
    pub fn apply(&mut self, effects: Vec<Effect>) {
        let mut batch = Vec::new();
        for effect in effects {
            match effect {
                Effect::EnqueueUrl { job_id, url } => {
                    engine_info!("EnqueueUrl job_id={} url={}", job_id, url);
                    batch.push(FetchTask { job_id, url });
                }
                Effect::CloseQueue => {
                    self.flush(&mut batch);
                    self.queue.close();
                }
            }
        }
        self.flush(&mut batch);
    }

    fn flush(&self, batch: &mut Vec<FetchTask>) {
        if batch.is_empty() {
            return;
        }
        let tasks = std::mem::take(batch);
        let count = tasks.len();
        if !self.queue.enqueue_batch(tasks) {
            engine_info!("dropped {} url(s) that arrived after end of input", count);
        }
    }
}

impl EffectRunner<Engine> {
    pub async fn finish(self) -> Result<QueueReport, QueueError> {
        self.queue.finish().await
    }
}
