use {
    crate::DetectionSet,
    std::sync::Arc,
    tokio::sync::watch,
};

/// Holds the latest detection set. Every write replaces the set wholesale, so
/// readers always see one complete set.
#[derive(Clone, Debug)]
pub struct DetectionStore {
    tx: Arc<watch::Sender<DetectionSet>>,
}

impl Default for DetectionStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DetectionStore {
    pub fn new() -> Self {
        let (tx, _) = watch::channel(DetectionSet::default());
        Self { tx: Arc::new(tx) }
    }

    pub fn replace(&self, set: DetectionSet) {
        self.tx.send_replace(set);
    }

    pub fn current(&self) -> DetectionSet {
        self.tx.borrow().clone()
    }

    pub fn clear(&self) {
        self.tx.send_replace(DetectionSet::default());
    }

    /// Receiver that wakes on every replace or clear.
    pub fn subscribe(&self) -> watch::Receiver<DetectionSet> {
        self.tx.subscribe()
    }

    /// Frame counter the service echoed with the current set.
    pub fn frame_count(&self) -> u64 {
        self.tx.borrow().frame_count
    }

    pub fn items_detected(&self) -> usize {
        self.tx.borrow().len()
    }
}
