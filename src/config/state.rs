// Application state module
// Everything a connection task needs, built once at startup and never mutated

use std::sync::atomic::AtomicUsize;

use super::types::Config;
use crate::handler::{Dispatcher, MethodTable, RootDir};

/// Application state
pub struct AppState {
    pub config: Config,
    pub dispatcher: Dispatcher,
    /// Connections currently being served
    pub active_connections: AtomicUsize,
}

impl AppState {
    /// Wire the standard method table to `root` using the limits from `config`
    pub fn new(config: Config, root: RootDir) -> Self {
        let dispatcher = Dispatcher::new(MethodTable::standard(), root)
            .with_max_body_size(config.http.max_body_size);

        Self {
            config,
            dispatcher,
            active_connections: AtomicUsize::new(0),
        }
    }
}
