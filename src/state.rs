use crate::habits::{HabitDefinition, catalog};
use crate::remote::RemoteMirror;
use crate::storage::CompletionStore;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<Mutex<CompletionStore>>,
    pub remote: Option<RemoteMirror>,
    pub catalog: &'static [HabitDefinition],
}

impl AppState {
    pub fn new(store: CompletionStore, remote: Option<RemoteMirror>) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            remote,
            catalog: catalog(),
        }
    }
}
