use std::path::Path;

use tokio::sync::{mpsc, oneshot};

use tailcast_core::error::TailcastError;
use tailcast_core::models::PersistedSettings;
use tailcast_core::storage::Storage;

/// Async handle to the settings store, which lives on its own thread.
#[derive(Clone)]
pub struct SettingsHandle {
    tx: mpsc::UnboundedSender<SettingsCommand>,
}

enum SettingsCommand {
    Load {
        reply: oneshot::Sender<Result<PersistedSettings, TailcastError>>,
    },
    Save {
        settings: PersistedSettings,
        reply: oneshot::Sender<Result<(), TailcastError>>,
    },
    Clear {
        key: &'static str,
        reply: oneshot::Sender<Result<(), TailcastError>>,
    },
}

impl SettingsHandle {
    pub fn open(path: &Path) -> Option<Self> {
        let storage = Storage::open(path)
            .map_err(|e| tracing::error!("Failed to open settings database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    /// In-memory store, discarded with the last handle.
    pub fn open_memory() -> Option<Self> {
        let storage = Storage::open_memory()
            .map_err(|e| tracing::error!("Failed to open settings database: {e}"))
            .ok()?;
        Self::spawn(storage)
    }

    fn spawn(storage: Storage) -> Option<Self> {
        let (tx, rx) = mpsc::unbounded_channel();

        std::thread::Builder::new()
            .name("settings-actor".into())
            .spawn(move || actor_loop(storage, rx))
            .map_err(|e| tracing::error!("Failed to spawn settings thread: {e}"))
            .ok()?;

        Some(Self { tx })
    }

    pub async fn load(&self) -> Result<PersistedSettings, TailcastError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(SettingsCommand::Load { reply });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    /// Persist every `Some` field; `None` fields keep their stored value.
    pub async fn save(&self, settings: PersistedSettings) -> Result<(), TailcastError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(SettingsCommand::Save { settings, reply });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }

    pub async fn clear(&self, key: &'static str) -> Result<(), TailcastError> {
        let (reply, rx) = oneshot::channel();
        let _ = self.tx.send(SettingsCommand::Clear { key, reply });
        rx.await.unwrap_or_else(|_| Err(closed()))
    }
}

fn closed() -> TailcastError {
    TailcastError::Config("settings actor closed".into())
}

fn actor_loop(storage: Storage, mut rx: mpsc::UnboundedReceiver<SettingsCommand>) {
    while let Some(cmd) = rx.blocking_recv() {
        match cmd {
            SettingsCommand::Load { reply } => {
                let _ = reply.send(storage.load_settings());
            }
            SettingsCommand::Save { settings, reply } => {
                let _ = reply.send(storage.save_settings(&settings));
            }
            SettingsCommand::Clear { key, reply } => {
                let _ = reply.send(storage.delete_setting(key));
            }
        }
    }
    tracing::debug!("settings actor stopped");
}
