use std::io;
use std::path::PathBuf;

use tokio::sync::watch;
use tracing::info;

/// Persistence seam for the session token. The browser original kept the
/// token in localStorage; here the backing store is pluggable so tests can
/// run purely in memory.
pub trait TokenStore: Send + Sync {
    fn load(&self) -> Option<String>;
    fn save(&self, token: &str) -> io::Result<()>;
    fn clear(&self) -> io::Result<()>;
}

/// Token persisted as a single plain-text file.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl TokenStore for FileTokenStore {
    fn load(&self) -> Option<String> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        let token = raw.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn save(&self, token: &str) -> io::Result<()> {
        std::fs::write(&self.path, token)
    }

    fn clear(&self) -> io::Result<()> {
        match std::fs::remove_file(&self.path) {
            Err(err) if err.kind() != io::ErrorKind::NotFound => Err(err),
            _ => Ok(()),
        }
    }
}

/// Volatile store for tests and ephemeral sessions.
#[derive(Default)]
pub struct MemoryTokenStore {
    token: std::sync::Mutex<Option<String>>,
}

impl TokenStore for MemoryTokenStore {
    fn load(&self) -> Option<String> {
        self.token.lock().unwrap().clone()
    }

    fn save(&self, token: &str) -> io::Result<()> {
        *self.token.lock().unwrap() = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> io::Result<()> {
        *self.token.lock().unwrap() = None;
        Ok(())
    }
}

/// Process-wide holder of the session token.
///
/// Initialized from the backing store at construction. Dependents subscribe
/// to the watch channel instead of polling ambient state; [`SessionStore::refresh`]
/// re-reads the store and is meant to be wired to external-change signals
/// (another process wrote the token file, the app regained foreground
/// visibility) since same-process writes go through `set`/`clear` directly.
pub struct SessionStore {
    store: Box<dyn TokenStore>,
    tx: watch::Sender<Option<String>>,
}

impl SessionStore {
    pub fn new(store: Box<dyn TokenStore>) -> Self {
        let initial = store.load();
        let (tx, _) = watch::channel(initial);
        Self { store, tx }
    }

    pub fn get(&self) -> Option<String> {
        self.tx.borrow().clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.tx.borrow().is_some()
    }

    pub fn set(&self, token: &str) -> io::Result<()> {
        self.store.save(token)?;
        self.tx.send_replace(Some(token.to_string()));
        info!("session token stored");
        Ok(())
    }

    pub fn clear(&self) -> io::Result<()> {
        self.store.clear()?;
        let had_token = self.tx.send_replace(None).is_some();
        if had_token {
            info!("session token cleared");
        }
        Ok(())
    }

    /// Re-read the backing store and notify subscribers if the token changed
    /// underneath us.
    pub fn refresh(&self) {
        let current = self.store.load();
        self.tx.send_if_modified(|held| {
            if *held != current {
                *held = current;
                true
            } else {
                false
            }
        });
    }

    /// Subscribe to session changes. The receiver yields the current token
    /// value after every `set`/`clear`/`refresh` that changed it.
    pub fn subscribe(&self) -> watch::Receiver<Option<String>> {
        self.tx.subscribe()
    }
}
