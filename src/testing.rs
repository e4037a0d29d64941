//! In-memory doubles for the store and backend boundaries, used by the unit
//! tests across the crate.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use anyhow::{Result, anyhow};
use async_trait::async_trait;

use crate::backend::DocumentBackend;
use crate::record::{BoardId, ContainerId, DocumentPayload, DrawableRecord, RecordId};
use crate::store::{ChangeListener, RecordStore, Unsubscribe};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Record store double with call counters and listener bookkeeping.
pub(crate) struct MemoryRecordStore {
    container: Mutex<ContainerId>,
    records: Mutex<BTreeMap<RecordId, DrawableRecord>>,
    listeners: Arc<Mutex<Vec<(u64, ChangeListener)>>>,
    next_listener: AtomicU64,
    pub(crate) insert_calls: AtomicUsize,
    pub(crate) delete_calls: AtomicUsize,
}

impl MemoryRecordStore {
    pub(crate) fn new(container: &str) -> Arc<Self> {
        Arc::new(Self {
            container: Mutex::new(ContainerId::new(container)),
            records: Mutex::new(BTreeMap::new()),
            listeners: Arc::new(Mutex::new(Vec::new())),
            next_listener: AtomicU64::new(0),
            insert_calls: AtomicUsize::new(0),
            delete_calls: AtomicUsize::new(0),
        })
    }

    /// Place records into the store without firing change notifications,
    /// as if they predate the session.
    pub(crate) fn seed(&self, records: Vec<DrawableRecord>) {
        let mut map = lock(&self.records);
        for record in records {
            map.insert(record.id.clone(), record);
        }
    }

    /// Simulate the editing surface discarding its state: every record
    /// vanishes at once.
    pub(crate) fn wipe(&self) {
        lock(&self.records).clear();
        self.notify();
    }

    pub(crate) fn set_container(&self, container: &str) {
        *lock(&self.container) = ContainerId::new(container);
    }

    pub(crate) fn listener_count(&self) -> usize {
        lock(&self.listeners).len()
    }

    fn notify(&self) {
        let listeners: Vec<ChangeListener> = lock(&self.listeners)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in listeners {
            listener();
        }
    }
}

impl RecordStore for MemoryRecordStore {
    fn current_container_id(&self) -> ContainerId {
        lock(&self.container).clone()
    }

    fn all_records(&self) -> Vec<DrawableRecord> {
        lock(&self.records).values().cloned().collect()
    }

    fn bulk_insert(&self, records: Vec<DrawableRecord>) {
        self.insert_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut map = lock(&self.records);
            for record in records {
                map.insert(record.id.clone(), record);
            }
        }
        self.notify();
    }

    fn bulk_delete(&self, ids: &[RecordId]) {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        {
            let mut map = lock(&self.records);
            for id in ids {
                map.remove(id);
            }
        }
        self.notify();
    }

    fn subscribe(&self, on_change: ChangeListener) -> Unsubscribe {
        let id = self.next_listener.fetch_add(1, Ordering::SeqCst);
        lock(&self.listeners).push((id, on_change));

        let listeners = Arc::clone(&self.listeners);
        Box::new(move || {
            lock(&listeners).retain(|(listener_id, _)| *listener_id != id);
        })
    }
}

/// Persistence backend double with failure and latency injection.
pub(crate) struct MemoryBackend {
    payloads: Mutex<HashMap<BoardId, DocumentPayload>>,
    pub(crate) fetch_calls: AtomicUsize,
    pub(crate) write_calls: AtomicUsize,
    fail_fetch: AtomicBool,
    fail_write: AtomicBool,
    write_delay: Mutex<Option<Duration>>,
}

impl MemoryBackend {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            payloads: Mutex::new(HashMap::new()),
            fetch_calls: AtomicUsize::new(0),
            write_calls: AtomicUsize::new(0),
            fail_fetch: AtomicBool::new(false),
            fail_write: AtomicBool::new(false),
            write_delay: Mutex::new(None),
        })
    }

    pub(crate) fn put_payload(&self, board: BoardId, payload: DocumentPayload) {
        lock(&self.payloads).insert(board, payload);
    }

    pub(crate) fn payload(&self, board: BoardId) -> Option<DocumentPayload> {
        lock(&self.payloads).get(&board).cloned()
    }

    pub(crate) fn fail_fetches(&self, fail: bool) {
        self.fail_fetch.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn fail_writes(&self, fail: bool) {
        self.fail_write.store(fail, Ordering::SeqCst);
    }

    pub(crate) fn set_write_delay(&self, delay: Duration) {
        *lock(&self.write_delay) = Some(delay);
    }
}

#[async_trait]
impl DocumentBackend for MemoryBackend {
    async fn fetch_document_payload(&self, board: BoardId) -> Result<Option<DocumentPayload>> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_fetch.load(Ordering::SeqCst) {
            return Err(anyhow!("injected fetch failure"));
        }
        Ok(self.payload(board))
    }

    async fn write_document_payload(
        &self,
        board: BoardId,
        payload: &DocumentPayload,
    ) -> Result<()> {
        self.write_calls.fetch_add(1, Ordering::SeqCst);
        let delay = *lock(&self.write_delay);
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(anyhow!("injected write failure"));
        }
        self.put_payload(board, payload.clone());
        Ok(())
    }
}
