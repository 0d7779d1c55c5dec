use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::queue::{Message, MessageQueue};

/// Generates the run's messages and appends them to the queue.
pub struct Producer {
    count: u64,
    payload_len: usize,
    rng: StdRng,
}

impl Producer {
    pub fn new(count: u64, payload_len: usize, rng: StdRng) -> Self {
        Self {
            count,
            payload_len,
            rng,
        }
    }

    /// Append exactly `count` messages, one lock acquisition each. Returns
    /// the number appended.
    pub fn produce(mut self, queue: &MessageQueue) -> u64 {
        debug!(count = self.count, "producer started");
        for id in 0..self.count {
            queue.push(Message::random(id, self.payload_len, &mut self.rng));
        }
        info!(count = self.count, "producer finished");
        self.count
    }
}
