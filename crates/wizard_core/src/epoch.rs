use std::collections::BTreeMap;

pub type Epoch = u64;

/// Categories of in-flight requests, each with its own epoch counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestKind {
    DatasetDetail,
    DocumentsLimit,
    ConnectionStatus,
    Preview,
    LarkPreview,
    Estimate,
    Submit,
    IndexingStatus,
    EmptyDataset,
}

/// Monotonic request epochs. There is no cancellation: a completion is applied only
/// if its epoch is still the current one for its kind.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RequestEpochs {
    current: BTreeMap<RequestKind, Epoch>,
}

impl RequestEpochs {
    pub fn begin(&mut self, kind: RequestKind) -> Epoch {
        let epoch = self.current.entry(kind).or_insert(0);
        *epoch += 1;
        *epoch
    }

    /// Orphans whatever is in flight for `kind`.
    pub fn invalidate(&mut self, kind: RequestKind) {
        self.begin(kind);
    }

    pub fn is_current(&self, kind: RequestKind, epoch: Epoch) -> bool {
        self.current.get(&kind) == Some(&epoch)
    }
}
