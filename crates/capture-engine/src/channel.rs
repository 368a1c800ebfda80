//! Acknowledged sample channel.
//!
//! Screen samples flow from a provider's background producer to the
//! recorder's collector through a single-slot handoff. Every delivery
//! carries an acknowledgement handle; [`SampleProducer::send`] does not
//! return until the consumer has called [`Delivery::ack`], so at most one
//! sample is ever in flight and memory stays bounded no matter how fast
//! the producer can render.
//!
//! ```text
//!  producer ──send(image)──▶ [slot: 1] ──recv()──▶ collector
//!     ▲                                              │
//!     └──────────────── ack (oneshot) ◀──────────────┘
//! ```

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

/// The channel was closed or the consumer dropped a delivery unacknowledged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("sample channel closed")]
pub struct ChannelClosed;

/// One sample awaiting acknowledgement.
#[derive(Debug)]
pub struct Delivery {
    image: Arc<[u8]>,
    ack: oneshot::Sender<()>,
}

impl Delivery {
    /// Encoded image bytes.
    pub fn image(&self) -> &[u8] {
        &self.image
    }

    /// Acknowledge the sample, releasing the producer to emit the next one,
    /// and take ownership of the image.
    pub fn ack(self) -> Arc<[u8]> {
        // The producer may have given up already; nothing to release then.
        let _ = self.ack.send(());
        self.image
    }
}

/// Producer half, handed to an automation provider on screencast start.
#[derive(Debug, Clone)]
pub struct SampleProducer {
    tx: mpsc::Sender<Delivery>,
}

impl SampleProducer {
    /// Deliver one sample and wait until the consumer acknowledges it.
    pub async fn send(&self, image: impl Into<Arc<[u8]>>) -> Result<(), ChannelClosed> {
        let (ack_tx, ack_rx) = oneshot::channel();
        self.tx
            .send(Delivery {
                image: image.into(),
                ack: ack_tx,
            })
            .await
            .map_err(|_| ChannelClosed)?;
        ack_rx.await.map_err(|_| ChannelClosed)
    }

    /// Whether the consumer has gone away.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer half, owned by the recorder's collector task.
#[derive(Debug)]
pub struct SampleConsumer {
    rx: mpsc::Receiver<Delivery>,
}

impl SampleConsumer {
    /// Next delivery, or `None` once every producer is gone.
    pub async fn recv(&mut self) -> Option<Delivery> {
        self.rx.recv().await
    }

    /// Stop accepting deliveries; pending producers observe `ChannelClosed`.
    pub fn close(&mut self) {
        self.rx.close();
    }
}

/// Create a capacity-1 acknowledged sample channel.
pub fn sample_channel() -> (SampleProducer, SampleConsumer) {
    let (tx, rx) = mpsc::channel(1);
    (SampleProducer { tx }, SampleConsumer { rx })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    #[tokio::test]
    async fn test_send_waits_for_ack() {
        let (producer, mut consumer) = sample_channel();
        let sent = Arc::new(AtomicUsize::new(0));

        let counter = sent.clone();
        let task = tokio::spawn(async move {
            for i in 0..3u8 {
                producer.send(vec![i]).await.unwrap();
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        let first = consumer.recv().await.unwrap();
        assert_eq!(first.image(), &[0]);
        tokio::time::sleep(Duration::from_millis(20)).await;
        // Not acknowledged yet: the producer is still blocked on sample 0.
        assert_eq!(sent.load(Ordering::SeqCst), 0);

        first.ack();
        let second = consumer.recv().await.unwrap();
        assert_eq!(&*second.ack(), &[1]);
        let third = consumer.recv().await.unwrap();
        assert_eq!(&*third.ack(), &[2]);

        task.await.unwrap();
        assert_eq!(sent.load(Ordering::SeqCst), 3);
        assert!(consumer.recv().await.is_none());
    }

    #[tokio::test]
    async fn test_dropped_delivery_closes_producer() {
        let (producer, mut consumer) = sample_channel();
        let task = tokio::spawn(async move { producer.send(vec![7]).await });

        let delivery = consumer.recv().await.unwrap();
        drop(delivery);
        assert_eq!(task.await.unwrap(), Err(ChannelClosed));
    }

    #[tokio::test]
    async fn test_closed_consumer_rejects_send() {
        let (producer, mut consumer) = sample_channel();
        consumer.close();
        assert_eq!(producer.send(vec![1]).await, Err(ChannelClosed));
        assert!(producer.is_closed());
    }
}
