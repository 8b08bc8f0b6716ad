//! Ticker watch loop
//!
//! Re-renders the display when the snapshot key is written (change
//! notification) and on a fixed polling interval, which covers backends
//! without a working change feed. A frame is only emitted when its rendered
//! text differs from the last one.

use crate::display::renderer::{DisplayRenderer, DisplayView};
use crate::storage::KeyValueStore;
use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;
use tokio::time::{interval, MissedTickBehavior};

/// What caused a render
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderReason {
    Initial,
    Notification,
    Poll,
}

/// One emitted render
#[derive(Debug, Clone)]
pub struct Frame {
    pub view: DisplayView,
    pub text: String,
    /// CRC32 of `text`
    pub fingerprint: u32,
    pub reason: RenderReason,
}

/// Drives a [`DisplayRenderer`] from notifications and a poll timer
pub struct TickerLoop<S> {
    renderer: DisplayRenderer<S>,
    poll_interval: Duration,
    last_fingerprint: Option<u32>,
    frames_emitted: u64,
}

impl<S: KeyValueStore> TickerLoop<S> {
    pub fn new(renderer: DisplayRenderer<S>, poll_interval: Duration) -> Self {
        Self {
            renderer,
            poll_interval,
            last_fingerprint: None,
            frames_emitted: 0,
        }
    }

    /// Number of frames emitted so far
    pub fn frames_emitted(&self) -> u64 {
        self.frames_emitted
    }

    /// Render now; returns a frame unless the text is unchanged
    pub fn tick(&mut self, reason: RenderReason) -> Option<Frame> {
        let view = self.renderer.render();
        let text = view.to_string();
        let fingerprint = crc32fast::hash(text.as_bytes());

        if self.last_fingerprint == Some(fingerprint) {
            tracing::trace!(?reason, "Display unchanged");
            return None;
        }

        self.last_fingerprint = Some(fingerprint);
        self.frames_emitted += 1;
        tracing::debug!(?reason, fingerprint, "Display changed");

        Some(Frame {
            view,
            text,
            fingerprint,
            reason,
        })
    }

    /// Run until `shutdown` resolves, passing each new frame to `on_frame`
    pub async fn run<F, Fut>(mut self, mut on_frame: F, shutdown: Fut)
    where
        F: FnMut(&Frame),
        Fut: Future<Output = ()>,
    {
        let mut events = self.renderer.subscribe();
        let mut notifications_open = true;

        let mut ticker = interval(self.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // First tick completes immediately
        ticker.tick().await;

        if let Some(frame) = self.tick(RenderReason::Initial) {
            on_frame(&frame);
        }

        tokio::pin!(shutdown);

        loop {
            let reason = tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => RenderReason::Poll,
                event = events.recv(), if notifications_open => match event {
                    Ok(event) if self.renderer.is_snapshot_event(&event) => RenderReason::Notification,
                    Ok(_) => continue,
                    Err(RecvError::Lagged(skipped)) => {
                        tracing::debug!(skipped, "Notification feed lagged, re-rendering");
                        RenderReason::Notification
                    }
                    Err(RecvError::Closed) => {
                        tracing::debug!("Notification feed closed, polling only");
                        notifications_open = false;
                        continue;
                    }
                },
            };

            if let Some(frame) = self.tick(reason) {
                on_frame(&frame);
            }
        }

        tracing::info!(frames = self.frames_emitted, "Ticker stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::admin::AdminEditor;
    use crate::storage::{FileStore, MemoryStore, StorageEvent, StorageResult, TallyStore};
    use std::sync::{Arc, Mutex};
    use tokio::sync::{broadcast, oneshot};

    fn renderer<S: KeyValueStore>(store: S) -> DisplayRenderer<S> {
        DisplayRenderer::new(TallyStore::new(store), vec![], "Trend")
    }

    async fn wait_for(frames: &Arc<Mutex<Vec<Frame>>>, count: usize) {
        for _ in 0..400 {
            if frames.lock().unwrap().len() >= count {
                return;
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("timed out waiting for {count} frames");
    }

    #[test]
    fn test_tick_suppresses_duplicates() {
        let store = MemoryStore::new();
        let mut ticker = TickerLoop::new(renderer(store.clone()), Duration::from_secs(4));

        let first = ticker.tick(RenderReason::Initial).unwrap();
        assert_eq!(first.fingerprint, crc32fast::hash(first.text.as_bytes()));
        assert!(ticker.tick(RenderReason::Poll).is_none());

        let mut editor = AdminEditor::load(TallyStore::new(store), vec![]);
        editor.save(&["10", "0", "0", "0", "0", "0"]).unwrap();

        let second = ticker.tick(RenderReason::Poll).unwrap();
        assert_ne!(second.fingerprint, first.fingerprint);
        assert!(second.text.contains("▲ +100.0%"));
        assert_eq!(ticker.frames_emitted(), 2);
    }

    #[tokio::test]
    async fn test_rerenders_on_notification() {
        let store = MemoryStore::new();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        // Long interval: only notifications can trigger the second frame
        let ticker = TickerLoop::new(renderer(store.clone()), Duration::from_secs(3600));
        let sink = frames.clone();
        let handle = tokio::spawn(async move {
            ticker
                .run(
                    move |frame| sink.lock().unwrap().push(frame.clone()),
                    async {
                        let _ = stop_rx.await;
                    },
                )
                .await;
        });

        wait_for(&frames, 1).await;

        let records = TallyStore::new(store);
        records.save_history(50.0).unwrap();
        let mut editor = AdminEditor::load(records, vec![]);
        editor.save(&["0", "0", "0", "4", "0", "0"]).unwrap();

        wait_for(&frames, 2).await;
        stop_tx.send(()).unwrap();
        handle.await.unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 2);
        assert_eq!(frames[0].reason, RenderReason::Initial);
        assert_eq!(frames[1].reason, RenderReason::Notification);
        assert!(frames[1].text.contains("▲ +100.0%"));
    }

    #[tokio::test]
    async fn test_rerenders_on_write_from_other_handle() {
        let dir = tempfile::tempdir().unwrap();
        let admin_store = FileStore::open(dir.path()).unwrap();
        let display_store = FileStore::open(dir.path()).unwrap();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let ticker = TickerLoop::new(renderer(display_store), Duration::from_secs(3600));
        let sink = frames.clone();
        let handle = tokio::spawn(async move {
            ticker
                .run(
                    move |frame| sink.lock().unwrap().push(frame.clone()),
                    async {
                        let _ = stop_rx.await;
                    },
                )
                .await;
        });

        wait_for(&frames, 1).await;

        let mut editor = AdminEditor::load(TallyStore::new(admin_store), vec![]);
        editor.save(&["0", "0", "7", "0", "0", "0"]).unwrap();

        wait_for(&frames, 2).await;
        stop_tx.send(()).unwrap();
        handle.await.unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames[1].reason, RenderReason::Notification);
        assert!(frames[1].text.contains("▲ +100.0%"));
    }

    /// Store whose notification feed is closed from the start
    struct SilentStore(MemoryStore);

    impl KeyValueStore for SilentStore {
        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            self.0.get(key)
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            self.0.set(key, value)
        }

        fn subscribe(&self) -> broadcast::Receiver<StorageEvent> {
            let (_tx, rx) = broadcast::channel(1);
            rx
        }
    }

    #[tokio::test]
    async fn test_polling_catches_unnotified_writes() {
        let store = MemoryStore::new();
        let frames = Arc::new(Mutex::new(Vec::new()));
        let (stop_tx, stop_rx) = oneshot::channel::<()>();

        let ticker = TickerLoop::new(
            renderer(SilentStore(store.clone())),
            Duration::from_millis(20),
        );
        let sink = frames.clone();
        let handle = tokio::spawn(async move {
            ticker
                .run(
                    move |frame| sink.lock().unwrap().push(frame.clone()),
                    async {
                        let _ = stop_rx.await;
                    },
                )
                .await;
        });

        wait_for(&frames, 1).await;

        let mut editor = AdminEditor::load(TallyStore::new(store), vec![]);
        editor.save(&["0", "9", "0", "0", "0", "0"]).unwrap();

        wait_for(&frames, 2).await;
        stop_tx.send(()).unwrap();
        handle.await.unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames[1].reason, RenderReason::Poll);
        assert!(frames[1].text.contains("▲ +100.0%"));
    }
}
