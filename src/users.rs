//! Session-lifetime users cache
//!
//! `UsersStore` fetches the users collection once and keeps it for the rest of
//! the session, exposing a derived id → name index used to put author names on
//! posts. The store is constructed explicitly and shared by `Arc`.
//!
//! Fetching is not single-flight: concurrent callers that find the store empty
//! each issue a request, and whichever response lands last replaces the list.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::api::{ApiError, PostsClient, User};

/// Anything that can produce the users collection
#[async_trait]
pub trait UsersSource: Send + Sync {
    async fn get_users(&self) -> Result<Vec<User>, ApiError>;
}

#[async_trait]
impl UsersSource for PostsClient {
    async fn get_users(&self) -> Result<Vec<User>, ApiError> {
        PostsClient::get_users(self).await
    }
}

/// Observable phase of the store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UsersPhase {
    /// Nothing fetched yet
    Empty,
    /// A fetch is in flight, or one failed and left the flag set
    Loading,
    /// Users are present; further fetches are no-ops
    Loaded,
}

/// When the loading flag is released after a fetch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadingRelease {
    /// Cleared only when the fetch succeeds. A failed fetch leaves the
    /// store reporting `Loading`.
    #[default]
    OnSuccess,
    /// Cleared on every exit path of the fetch task, including errors and
    /// panics in the source
    Always,
}

#[derive(Debug, Default)]
struct UsersState {
    /// Users in the order the remote resource returned them
    list: Vec<User>,
    loading: bool,
}

impl UsersState {
    fn phase(&self) -> UsersPhase {
        if self.loading {
            UsersPhase::Loading
        } else if self.list.is_empty() {
            UsersPhase::Empty
        } else {
            UsersPhase::Loaded
        }
    }
}

/// Fetch-once users cache
pub struct UsersStore {
    source: Arc<dyn UsersSource>,
    state: Arc<Mutex<UsersState>>,
    release: LoadingRelease,
}

impl std::fmt::Debug for UsersStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UsersStore")
            .field("state", &*self.state())
            .field("release", &self.release)
            .finish()
    }
}

impl UsersStore {
    /// Creates an empty store backed by `source`
    pub fn new(source: Arc<dyn UsersSource>) -> Self {
        Self {
            source,
            state: Arc::new(Mutex::new(UsersState::default())),
            release: LoadingRelease::default(),
        }
    }

    /// Selects how the loading flag is released
    pub fn with_release(mut self, release: LoadingRelease) -> Self {
        self.release = release;
        self
    }

    pub fn release(&self) -> LoadingRelease {
        self.release
    }

    fn state(&self) -> MutexGuard<'_, UsersState> {
        lock_state(&self.state)
    }

    /// Loads the users collection unless it is already present
    ///
    /// With users present this returns immediately without touching the
    /// source. Otherwise it sets the loading flag and runs the request on a
    /// spawned task that stores the result verbatim. The task is detached
    /// from the caller: dropping the returned future does not stop the
    /// assignment.
    ///
    /// Must be called from within a tokio runtime.
    ///
    /// # Errors
    /// Source failures are returned unchanged. Under
    /// `LoadingRelease::OnSuccess` the loading flag stays set afterwards.
    pub async fn fetch_users(&self) -> Result<(), ApiError> {
        {
            let mut state = self.state();
            if !state.list.is_empty() {
                debug!(count = state.list.len(), "users already loaded");
                return Ok(());
            }
            state.loading = true;
        }

        let source = Arc::clone(&self.source);
        let state = Arc::clone(&self.state);
        let release = self.release;

        let task = tokio::spawn(async move {
            let _release_guard = LoadingGuard {
                state: Arc::clone(&state),
                armed: release == LoadingRelease::Always,
            };

            let users = match source.get_users().await {
                Ok(users) => users,
                Err(e) => {
                    warn!(error = %e, ?release, "users fetch failed");
                    return Err(e);
                }
            };

            let mut state = lock_state(&state);
            info!(count = users.len(), "users loaded");
            state.list = users;
            state.loading = false;
            Ok(())
        });

        task.await?
    }

    /// Snapshot of the users in received order
    pub fn users(&self) -> Vec<User> {
        self.state().list.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn phase(&self) -> UsersPhase {
        self.state().phase()
    }

    /// Fresh id → name mapping; on duplicate ids the later user wins
    pub fn by_id(&self) -> HashMap<u64, String> {
        self.state()
            .list
            .iter()
            .fold(HashMap::new(), |mut map, user| {
                map.insert(user.id, user.name.clone());
                map
            })
    }

    /// Name for a single id, with the same last-wins rule as `by_id`
    pub fn author_name(&self, id: u64) -> Option<String> {
        self.state()
            .list
            .iter()
            .rev()
            .find(|user| user.id == id)
            .map(|user| user.name.clone())
    }
}

// The lock is never held across an await, so a poisoned lock still holds a
// complete state.
fn lock_state(state: &Mutex<UsersState>) -> MutexGuard<'_, UsersState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Clears the loading flag when dropped, if armed
struct LoadingGuard {
    state: Arc<Mutex<UsersState>>,
    armed: bool,
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        if self.armed {
            lock_state(&self.state).loading = false;
        }
    }
}
