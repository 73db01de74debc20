//! Explicit session registry replacing a process-wide current-user singleton.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use dashmap::DashMap;
use tokio::{
    sync::{Mutex, watch},
    time::Instant,
};
use tracing::debug;
use uuid::Uuid;

use super::workspace::Workspace;
use crate::identity::AuthUser;

/// One signed-in client: its current user stream and its workspace.
pub struct Session {
    token: String,
    user: watch::Sender<Option<AuthUser>>,
    workspace: Mutex<Workspace>,
    opened_at: Instant,
    /// Milliseconds after `opened_at` of the last authenticated request.
    last_seen_ms: AtomicU64,
}

impl Session {
    fn new(token: String) -> Self {
        let (user, _rx) = watch::channel(None);
        Self {
            token,
            user,
            workspace: Mutex::new(Workspace::default()),
            opened_at: Instant::now(),
            last_seen_ms: AtomicU64::new(0),
        }
    }

    /// Record activity on this session.
    pub fn touch(&self) {
        let elapsed = u64::try_from(self.opened_at.elapsed().as_millis()).unwrap_or(u64::MAX);
        self.last_seen_ms.fetch_max(elapsed, Ordering::Relaxed);
    }

    /// Time since the last recorded activity.
    pub fn idle_for(&self) -> Duration {
        let last_seen = Duration::from_millis(self.last_seen_ms.load(Ordering::Relaxed));
        self.opened_at.elapsed().saturating_sub(last_seen)
    }

    /// Idle past `max_idle` with nobody listening on the current-user stream.
    fn is_expired(&self, max_idle: Duration) -> bool {
        self.user.receiver_count() == 0 && self.idle_for() >= max_idle
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn current_user(&self) -> Option<AuthUser> {
        self.user.borrow().clone()
    }

    /// Publish a new current user to every subscriber, even when none is listening.
    pub fn publish(&self, user: Option<AuthUser>) {
        self.user.send_replace(user);
    }

    /// Stream of current-user changes, starting with the present value.
    pub fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.user.subscribe()
    }

    /// Listings and selections; never hold the guard across a store call.
    pub fn workspace(&self) -> &Mutex<Workspace> {
        &self.workspace
    }
}

#[derive(Default)]
pub struct SessionManager {
    sessions: DashMap<String, Arc<Session>>,
}

impl SessionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fresh session with no current user.
    pub fn open(&self) -> Arc<Session> {
        let token = Uuid::new_v4().simple().to_string();
        let session = Arc::new(Session::new(token.clone()));
        self.sessions.insert(token, session.clone());
        debug!(sessions = self.sessions.len(), "session opened");
        session
    }

    pub fn get(&self, token: &str) -> Option<Arc<Session>> {
        self.sessions.get(token).map(|entry| entry.value().clone())
    }

    /// Publish `None` and forget the session.
    pub fn close(&self, token: &str) -> Option<Arc<Session>> {
        let (_, session) = self.sessions.remove(token)?;
        session.publish(None);
        Some(session)
    }

    /// Tear down every session; returns how many were open.
    pub fn close_all(&self) -> usize {
        let tokens = self
            .sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        tokens
            .iter()
            .filter(|token| self.close(token).is_some())
            .count()
    }

    /// Close every session idle for at least `max_idle`; returns how many were closed.
    pub fn sweep_idle(&self, max_idle: Duration) -> usize {
        let expired = self
            .sessions
            .iter()
            .filter(|entry| entry.value().is_expired(max_idle))
            .map(|entry| entry.key().clone())
            .collect::<Vec<_>>();
        let closed = expired
            .iter()
            .filter(|token| self.close(token).is_some())
            .count();
        if closed > 0 {
            debug!(closed, sessions = self.sessions.len(), "idle sessions expired");
        }
        closed
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
