use rand::Rng;
use rand::distr::Alphanumeric;
use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard};
use tokio::sync::Notify;

/// A synthetic message. Only the count matters to the simulation; `id` is
/// kept so tests can tell messages apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    pub id: u64,
    pub payload: String,
}

impl Message {
    /// Random alphanumeric payload of `len` characters.
    pub fn random<R: Rng + ?Sized>(id: u64, len: usize, rng: &mut R) -> Self {
        let payload = rng
            .sample_iter(Alphanumeric)
            .take(len)
            .map(char::from)
            .collect();
        Self { id, payload }
    }
}

#[derive(Default)]
struct QueueState {
    messages: VecDeque<Message>,
    appended: u64,
}

/// Unbounded FIFO shared by the producer and the senders.
///
/// Every mutation goes through one mutex, which is never held across an
/// `.await`. Waiting consumers park on a [`Notify`] instead of spinning.
#[derive(Default)]
pub struct MessageQueue {
    state: Mutex<QueueState>,
    available: Notify,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // A panic while holding the guard cannot leave the deque half-updated,
        // so a poisoned lock is still safe to use.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Append to the tail and wake any waiting consumers.
    pub fn push(&self, message: Message) {
        {
            let mut state = self.lock();
            state.messages.push_back(message);
            state.appended += 1;
        }
        self.available.notify_waiters();
    }

    /// Remove the head without blocking.
    pub fn try_pop(&self) -> Option<Message> {
        self.lock().messages.pop_front()
    }

    /// Remove the head, waiting for an append if the queue is empty.
    ///
    /// Cancel safe: a message is only removed on the path that returns it.
    pub async fn pop(&self) -> Message {
        loop {
            let notified = self.available.notified();
            tokio::pin!(notified);
            // Register before checking so an append between the check and the
            // await still wakes us.
            notified.as_mut().enable();

            if let Some(message) = self.try_pop() {
                return message;
            }
            notified.await;
        }
    }

    pub fn len(&self) -> usize {
        self.lock().messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().messages.is_empty()
    }

    /// Total number of messages ever appended.
    pub fn appended(&self) -> u64 {
        self.lock().appended
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use std::sync::Arc;
    use std::time::Duration;

    fn msg(id: u64) -> Message {
        Message {
            id,
            payload: format!("m{id}"),
        }
    }

    #[test]
    fn test_fifo_order() {
        let queue = MessageQueue::new();
        for id in 0..3 {
            queue.push(msg(id));
        }
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.try_pop().map(|m| m.id), Some(0));
        assert_eq!(queue.try_pop().map(|m| m.id), Some(1));
        assert_eq!(queue.try_pop().map(|m| m.id), Some(2));
        assert!(queue.try_pop().is_none());
        assert_eq!(queue.appended(), 3);
    }

    #[test]
    fn test_random_payload_is_alphanumeric() {
        let mut rng = StdRng::seed_from_u64(1);
        let m = Message::random(0, 100, &mut rng);
        assert_eq!(m.payload.len(), 100);
        assert!(m.payload.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pop_wakes_on_push() {
        let queue = Arc::new(MessageQueue::new());
        let waiter = tokio::spawn({
            let queue = queue.clone();
            async move { queue.pop().await }
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());

        queue.push(msg(7));
        let got = waiter.await.unwrap();
        assert_eq!(got.id, 7);
        assert!(queue.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_consumers_never_share_a_message() {
        let queue = Arc::new(MessageQueue::new());
        let total = 2_000u64;

        let consumers: Vec<_> = (0..8)
            .map(|_| {
                let queue = queue.clone();
                tokio::spawn(async move {
                    let mut seen = Vec::new();
                    while let Some(m) = queue.try_pop() {
                        seen.push(m.id);
                        tokio::task::yield_now().await;
                    }
                    seen
                })
            })
            .collect();

        // consumers may start before or after the fill; pick up the rest below
        for id in 0..total {
            queue.push(msg(id));
        }

        let mut ids: Vec<u64> = Vec::new();
        for c in consumers {
            ids.extend(c.await.unwrap());
        }
        while let Some(m) = queue.try_pop() {
            ids.push(m.id);
        }

        ids.sort_unstable();
        let expected: Vec<u64> = (0..total).collect();
        assert_eq!(ids, expected);
        assert_eq!(queue.appended(), total);
    }
}
