//! Progress channel between the stages and whoever renders them.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::Event;

/// Handle the stages report through. Cloned into every rayon worker.
#[derive(Clone)]
pub struct EventSender {
    tx: Sender<Event>,
}

impl EventSender {
    /// Report `event`. Nobody listening is fine; the event is dropped.
    pub fn send(&self, event: Event) {
        if self.tx.send(event).is_err() {
            tracing::trace!("no event listener");
        }
    }
}

/// Listening end, drained by the CLI progress thread.
pub struct EventReceiver {
    rx: Receiver<Event>,
}

impl EventReceiver {
    /// Events in send order; ends once every [`EventSender`] is gone
    pub fn iter(&self) -> impl Iterator<Item = Event> + '_ {
        self.rx.iter()
    }
}

/// Creates connected sender/receiver pairs.
pub struct EventChannel;

impl EventChannel {
    /// Unbounded sender/receiver pair
    pub fn new() -> (EventSender, EventReceiver) {
        let (tx, rx) = unbounded();
        (EventSender { tx }, EventReceiver { rx })
    }
}

/// Sender for callers that do not care about progress
pub fn null_sender() -> EventSender {
    EventChannel::new().0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::{HashEvent, PipelineEvent};
    use std::path::PathBuf;
    use std::thread;

    #[test]
    fn worker_events_reach_the_receiver_in_order() {
        let (sender, receiver) = EventChannel::new();

        let worker = sender.clone();
        thread::spawn(move || {
            worker.send(Event::Pipeline(PipelineEvent::Started));
            worker.send(Event::Hash(HashEvent::CacheHit {
                path: PathBuf::from("/data/a.txt"),
            }));
        })
        .join()
        .unwrap();
        drop(sender);

        let events: Vec<Event> = receiver.iter().collect();
        assert_eq!(events.len(), 2);
        assert!(matches!(events[0], Event::Pipeline(PipelineEvent::Started)));
        match &events[1] {
            Event::Hash(HashEvent::CacheHit { path }) => {
                assert_eq!(path, &PathBuf::from("/data/a.txt"));
            }
            other => panic!("unexpected event {other:?}"),
        }
    }

    #[test]
    fn sending_without_a_listener_is_harmless() {
        let sender = null_sender();

        sender.send(Event::Pipeline(PipelineEvent::Started));
        sender.clone().send(Event::Pipeline(PipelineEvent::Started));
    }
}
