//! Dispatch queue between producers and the consumer thread
//!
//! A crossbeam channel carries records from any number of producers to the
//! single consumer. The sending half lives behind a lock only so that `close`
//! can drop it; producers share the read side and never touch sink I/O.

use super::{
    error::{LoggerError, Result},
    metrics::LoggerMetrics,
    overflow_policy::{OverflowCallback, OverflowPolicy},
    record::LogRecord,
    severity::Severity,
};
use crossbeam_channel::{bounded, unbounded, Receiver, SendTimeoutError, Sender, TrySendError};
use parking_lot::RwLock;
use std::sync::Arc;

/// Eviction attempts for `DropOldest` before falling back to dropping the new record
const MAX_EVICTION_ATTEMPTS: usize = 8;

/// Drop alerts go out on the first drop and then every this many drops
const DROP_ALERT_INTERVAL: u64 = 1000;

pub(crate) enum Message {
    Record(LogRecord),
    /// Barrier; acknowledged once everything queued before it was processed
    Flush(Sender<()>),
}

pub(crate) struct DispatchQueue {
    sender: RwLock<Option<Sender<Message>>>,
    /// Kept for `DropOldest` eviction and for handing to the consumer
    receiver: Receiver<Message>,
    capacity: Option<usize>,
    policy: OverflowPolicy,
    preserve_at: Severity,
    metrics: Arc<LoggerMetrics>,
    on_overflow: Option<OverflowCallback>,
}

impl DispatchQueue {
    /// `capacity` of `None` makes the queue unbounded
    pub(crate) fn new(
        capacity: Option<usize>,
        policy: OverflowPolicy,
        preserve_at: Severity,
        metrics: Arc<LoggerMetrics>,
        on_overflow: Option<OverflowCallback>,
    ) -> Self {
        let (sender, receiver) = match capacity {
            Some(size) => bounded(size),
            None => unbounded(),
        };

        Self {
            sender: RwLock::new(Some(sender)),
            receiver,
            capacity,
            policy,
            preserve_at,
            metrics,
            on_overflow,
        }
    }

    /// Hand a record to the consumer
    ///
    /// Order of acceptance is order of delivery. On a full queue the overflow
    /// policy applies, except that records at or above the preserve threshold
    /// always wait for space.
    pub(crate) fn enqueue(&self, record: LogRecord) -> Result<()> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or(LoggerError::LoggerStopped)?;
        let preserve = self.policy.is_lossy() && record.severity >= self.preserve_at;

        match sender.try_send(Message::Record(record)) {
            Ok(()) => {
                self.metrics.record_enqueued();
                Ok(())
            }
            Err(TrySendError::Full(message)) => {
                self.metrics.record_queue_full();
                if preserve {
                    self.metrics.record_preserved();
                    return self.send_blocking(sender, message);
                }
                self.handle_overflow(sender, message)
            }
            Err(TrySendError::Disconnected(_)) => Err(LoggerError::ChannelSendError),
        }
    }

    /// Queue a flush barrier behind every record accepted so far
    pub(crate) fn enqueue_flush(&self, ack: Sender<()>) -> Result<()> {
        let guard = self.sender.read();
        let sender = guard.as_ref().ok_or(LoggerError::LoggerStopped)?;
        sender
            .send(Message::Flush(ack))
            .map_err(|_| LoggerError::ChannelSendError)
    }

    /// Drop the sending half so the consumer exits once the queue is empty
    ///
    /// Returns `false` if the queue was already closed.
    pub(crate) fn close(&self) -> bool {
        self.sender.write().take().is_some()
    }

    pub(crate) fn receiver(&self) -> Receiver<Message> {
        self.receiver.clone()
    }

    pub(crate) fn len(&self) -> usize {
        self.receiver.len()
    }

    pub(crate) fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    fn handle_overflow(&self, sender: &Sender<Message>, message: Message) -> Result<()> {
        match &self.policy {
            OverflowPolicy::Block => self.send_blocking(sender, message),

            OverflowPolicy::BlockWithTimeout(timeout) => {
                self.metrics.record_block();
                match sender.send_timeout(message, *timeout) {
                    Ok(()) => {
                        self.metrics.record_enqueued();
                        Ok(())
                    }
                    Err(SendTimeoutError::Timeout(_)) => Err(self.drop_newest()),
                    Err(SendTimeoutError::Disconnected(_)) => Err(LoggerError::ChannelSendError),
                }
            }

            OverflowPolicy::DropNewest => Err(self.drop_newest()),

            OverflowPolicy::DropOldest => self.evict_oldest(sender, message),
        }
    }

    fn send_blocking(&self, sender: &Sender<Message>, message: Message) -> Result<()> {
        self.metrics.record_block();
        sender
            .send(message)
            .map_err(|_| LoggerError::ChannelSendError)?;
        self.metrics.record_enqueued();
        Ok(())
    }

    fn evict_oldest(&self, sender: &Sender<Message>, mut message: Message) -> Result<()> {
        for _ in 0..MAX_EVICTION_ATTEMPTS {
            match self.receiver.try_recv() {
                Ok(Message::Record(_oldest)) => self.count_drop(),
                // Barriers are never evicted; requeue behind the tail
                Ok(Message::Flush(ack)) => sender
                    .send(Message::Flush(ack))
                    .map_err(|_| LoggerError::ChannelSendError)?,
                Err(_) => {}
            }

            match sender.try_send(message) {
                Ok(()) => {
                    self.metrics.record_enqueued();
                    return Ok(());
                }
                Err(TrySendError::Full(returned)) => message = returned,
                Err(TrySendError::Disconnected(_)) => return Err(LoggerError::ChannelSendError),
            }
        }

        Err(self.drop_newest())
    }

    fn drop_newest(&self) -> LoggerError {
        self.count_drop();
        LoggerError::queue_full(self.capacity.unwrap_or(0))
    }

    fn count_drop(&self) {
        let total = self.metrics.record_dropped() + 1;

        if total == 1 || total % DROP_ALERT_INTERVAL == 0 {
            eprintln!(
                "[SHERLOG WARNING] Dispatch queue full, {} records dropped under {} policy. \
                 Consider a larger queue or the Block policy.",
                total, self.policy
            );

            if let Some(ref callback) = self.on_overflow {
                callback(total);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::atomic::{AtomicU64, Ordering};
    use std::thread;
    use std::time::Duration;

    fn record(sequence: u64, severity: Severity) -> LogRecord {
        LogRecord::new(
            sequence,
            severity,
            Box::new(io::Error::other(format!("record {}", sequence))),
        )
    }

    fn queue(capacity: Option<usize>, policy: OverflowPolicy) -> (DispatchQueue, Arc<LoggerMetrics>) {
        let metrics = Arc::new(LoggerMetrics::new());
        let queue = DispatchQueue::new(capacity, policy, Severity::Error, Arc::clone(&metrics), None);
        (queue, metrics)
    }

    fn drain_sequences(queue: &DispatchQueue) -> Vec<u64> {
        queue
            .receiver()
            .try_iter()
            .filter_map(|message| match message {
                Message::Record(record) => Some(record.sequence),
                Message::Flush(_) => None,
            })
            .collect()
    }

    #[test]
    fn test_fifo_order() {
        let (queue, metrics) = queue(None, OverflowPolicy::Block);
        for i in 0..10 {
            queue.enqueue(record(i, Severity::Info)).unwrap();
        }

        assert_eq!(metrics.enqueued_count(), 10);
        assert_eq!(queue.len(), 10);
        assert_eq!(drain_sequences(&queue), (0..10).collect::<Vec<_>>());
    }

    #[test]
    fn test_closed_queue_rejects() {
        let (queue, _) = queue(Some(4), OverflowPolicy::Block);
        assert!(queue.close());
        assert!(!queue.close());

        let err = queue.enqueue(record(0, Severity::Info)).unwrap_err();
        assert!(matches!(err, LoggerError::LoggerStopped));
    }

    #[test]
    fn test_drop_newest_counts_drops() {
        let (queue, metrics) = queue(Some(2), OverflowPolicy::DropNewest);
        queue.enqueue(record(0, Severity::Info)).unwrap();
        queue.enqueue(record(1, Severity::Info)).unwrap();

        let err = queue.enqueue(record(2, Severity::Info)).unwrap_err();
        assert!(matches!(err, LoggerError::QueueFull { capacity: 2 }));
        assert_eq!(metrics.dropped_count(), 1);
        assert_eq!(metrics.queue_full_events(), 1);
        assert_eq!(drain_sequences(&queue), vec![0, 1]);
    }

    #[test]
    fn test_drop_oldest_evicts_head() {
        let (queue, metrics) = queue(Some(2), OverflowPolicy::DropOldest);
        for i in 0..4 {
            queue.enqueue(record(i, Severity::Info)).unwrap();
        }

        assert_eq!(metrics.dropped_count(), 2);
        assert_eq!(drain_sequences(&queue), vec![2, 3]);
    }

    #[test]
    fn test_block_with_timeout_drops_after_wait() {
        let (queue, metrics) =
            queue(Some(1), OverflowPolicy::BlockWithTimeout(Duration::from_millis(20)));
        queue.enqueue(record(0, Severity::Info)).unwrap();

        let err = queue.enqueue(record(1, Severity::Info)).unwrap_err();
        assert!(matches!(err, LoggerError::QueueFull { .. }));
        assert_eq!(metrics.block_events(), 1);
        assert_eq!(metrics.dropped_count(), 1);
    }

    #[test]
    fn test_block_waits_for_consumer() {
        let (queue, metrics) = queue(Some(1), OverflowPolicy::Block);
        let receiver = queue.receiver();
        queue.enqueue(record(0, Severity::Info)).unwrap();

        let consumer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            receiver.iter().take(2).count()
        });

        queue.enqueue(record(1, Severity::Info)).unwrap();
        assert_eq!(consumer.join().unwrap(), 2);
        assert_eq!(metrics.block_events(), 1);
        assert_eq!(metrics.dropped_count(), 0);
    }

    #[test]
    fn test_severe_records_are_preserved_under_lossy_policy() {
        let (queue, metrics) = queue(Some(1), OverflowPolicy::DropNewest);
        let receiver = queue.receiver();
        queue.enqueue(record(0, Severity::Info)).unwrap();

        let consumer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(30));
            receiver.iter().take(2).count()
        });

        queue.enqueue(record(1, Severity::Fatal)).unwrap();
        assert_eq!(consumer.join().unwrap(), 2);
        assert_eq!(metrics.preserved_count(), 1);
        assert_eq!(metrics.dropped_count(), 0);
    }

    #[test]
    fn test_overflow_callback_fires_on_first_drop() {
        let calls = Arc::new(AtomicU64::new(0));
        let calls_clone = Arc::clone(&calls);
        let metrics = Arc::new(LoggerMetrics::new());
        let queue = DispatchQueue::new(
            Some(1),
            OverflowPolicy::DropNewest,
            Severity::Fatal,
            metrics,
            Some(Arc::new(move |total| {
                calls_clone.store(total, Ordering::Relaxed);
            })),
        );

        queue.enqueue(record(0, Severity::Info)).unwrap();
        let _ = queue.enqueue(record(1, Severity::Info));
        assert_eq!(calls.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn test_drop_oldest_keeps_flush_barrier() {
        let (queue, metrics) = queue(Some(2), OverflowPolicy::DropOldest);
        let (ack, ack_rx) = bounded(1);
        queue.enqueue_flush(ack).unwrap();
        queue.enqueue(record(0, Severity::Info)).unwrap();
        queue.enqueue(record(1, Severity::Info)).unwrap();

        // Nothing behind the barrier was written yet
        assert!(ack_rx.try_recv().is_err());
        assert_eq!(metrics.dropped_count(), 1);

        let receiver = queue.receiver();
        assert!(matches!(receiver.try_recv(), Ok(Message::Flush(_))));
        assert!(matches!(receiver.try_recv(), Ok(Message::Record(r)) if r.sequence == 1));
    }

    #[test]
    fn test_flush_barrier_follows_records() {
        let (queue, _) = queue(None, OverflowPolicy::Block);
        let (ack, _ack_rx) = bounded(1);
        queue.enqueue(record(0, Severity::Info)).unwrap();
        queue.enqueue_flush(ack).unwrap();

        let receiver = queue.receiver();
        assert!(matches!(receiver.try_recv(), Ok(Message::Record(_))));
        assert!(matches!(receiver.try_recv(), Ok(Message::Flush(_))));
    }
}
