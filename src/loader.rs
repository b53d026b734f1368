use crate::event::Event;
use crate::feed::EventSource;
use std::sync::mpsc::{channel, Receiver, Sender, TryRecvError};
use std::thread;

/// Runs feed fetches in the background and hands finished event sets back to
/// the UI thread.  Fetches may overlap, in which case whichever finishes last
/// wins.
#[derive(Debug)]
pub(crate) struct Loader<S> {
    source: S,
    sender: Sender<Vec<Event>>,
    receiver: Receiver<Vec<Event>>,
    pending: usize,
}

impl<S: EventSource + Clone + Send + 'static> Loader<S> {
    pub(crate) fn new(source: S) -> Self {
        let (sender, receiver) = channel();
        Loader {
            source,
            sender,
            receiver,
            pending: 0,
        }
    }

    pub(crate) fn source(&self) -> &S {
        &self.source
    }

    pub(crate) fn refresh(&mut self) {
        let source = self.source.clone();
        let sender = self.sender.clone();
        self.pending += 1;
        tracing::debug!(pending = self.pending, "Starting feed fetch");
        thread::spawn(move || {
            let events = source.fetch_events();
            if sender.send(events).is_err() {
                tracing::debug!("Calendar closed before feed fetch finished");
            }
        });
    }

    /// Returns the most recently completed event set, if any fetch has
    /// finished since the last call
    pub(crate) fn take_latest(&mut self) -> Option<Vec<Event>> {
        let mut latest = None;
        loop {
            match self.receiver.try_recv() {
                Ok(events) => {
                    self.pending = self.pending.saturating_sub(1);
                    latest = Some(events);
                }
                Err(TryRecvError::Empty | TryRecvError::Disconnected) => return latest,
            }
        }
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.pending > 0
    }

    #[cfg(test)]
    pub(crate) fn wait(&mut self, timeout: std::time::Duration) -> Option<Vec<Event>> {
        let events = self.receiver.recv_timeout(timeout).ok()?;
        self.pending = self.pending.saturating_sub(1);
        Some(events)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::event::Status;
    use std::sync::{Arc, Mutex};
    use std::time::{Duration, Instant};
    use time::macros::date;

    /// Event source handing out prepared results in order, then nothing
    #[derive(Clone, Debug, Default)]
    pub(crate) struct ScriptedSource(Arc<Mutex<Vec<Vec<Event>>>>);

    impl ScriptedSource {
        pub(crate) fn new(mut results: Vec<Vec<Event>>) -> Self {
            results.reverse();
            ScriptedSource(Arc::new(Mutex::new(results)))
        }
    }

    impl EventSource for ScriptedSource {
        fn fetch_events(&self) -> Vec<Event> {
            self.0.lock().unwrap().pop().unwrap_or_default()
        }
    }

    fn sample(sector: &str) -> Event {
        Event {
            start: date!(2026 - 03 - 02),
            end: date!(2026 - 03 - 03),
            sector: sector.to_owned(),
            responsible: None,
            activity: None,
            status: Status::InProgress,
        }
    }

    #[test]
    fn test_refresh() {
        let mut loader = Loader::new(ScriptedSource::new(vec![vec![sample("TI")]]));
        assert!(!loader.is_loading());
        assert_eq!(loader.take_latest(), None);
        loader.refresh();
        assert!(loader.is_loading());
        let events = loader.wait(Duration::from_secs(5)).unwrap();
        assert_eq!(events, [sample("TI")]);
        assert!(!loader.is_loading());
        assert_eq!(loader.take_latest(), None);
    }

    #[test]
    fn test_overlapping_refreshes() {
        let mut loader = Loader::new(ScriptedSource::new(vec![
            vec![sample("TI")],
            vec![sample("RH")],
        ]));
        loader.refresh();
        loader.refresh();
        let deadline = Instant::now() + Duration::from_secs(5);
        let mut latest = None;
        while loader.is_loading() && Instant::now() < deadline {
            if let Some(events) = loader.take_latest() {
                latest = Some(events);
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert!(!loader.is_loading());
        let latest = latest.unwrap();
        assert!(latest == [sample("TI")] || latest == [sample("RH")]);
    }

    #[test]
    fn test_failed_fetch_yields_empty_set() {
        let mut loader = Loader::new(ScriptedSource::new(Vec::new()));
        loader.refresh();
        assert_eq!(loader.wait(Duration::from_secs(5)), Some(Vec::new()));
    }
}
