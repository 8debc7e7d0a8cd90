//! In-memory session registry.
//!
//! Sessions live only in this process. A session is valid while both
//! `now - created_at <= absolute_ttl` and `now - last_activity <= idle_ttl`
//! hold; every successful lookup slides `last_activity` forward. Expired
//! entries are dropped lazily on lookup and proactively by the sweeper task.

use chrono::{DateTime, Duration, Utc};
use rand::RngCore;
use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::task::JoinHandle;
use utoipa::ToSchema;

use crate::models::role::Role;
use crate::types::UserId;

const TOKEN_BYTES: usize = 32;
const TOKEN_PREFIX_LEN: usize = 8;

/// Identity captured at login and cached for the life of the session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SessionUser {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

impl Session {
    pub fn user(&self) -> SessionUser {
        SessionUser {
            id: self.user_id,
            name: self.name.clone(),
            email: self.email.clone(),
            role: self.role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    pub fn has_role(&self, allowed: &[Role]) -> bool {
        allowed.contains(&self.role)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct SessionPolicy {
    pub absolute_ttl: Duration,
    pub idle_ttl: Duration,
}

impl Default for SessionPolicy {
    fn default() -> Self {
        Self {
            absolute_ttl: Duration::hours(24),
            idle_ttl: Duration::hours(2),
        }
    }
}

impl SessionPolicy {
    pub fn is_expired(&self, session: &Session, now: DateTime<Utc>) -> bool {
        now - session.created_at > self.absolute_ttl || now - session.last_activity > self.idle_ttl
    }
}

/// Admin-facing view of a session. The token is never exposed in full.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSummary {
    pub token_prefix: String,
    pub user_id: UserId,
    pub email: String,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionStats {
    pub total_sessions: usize,
    pub sessions: Vec<SessionSummary>,
}

pub struct SessionStore {
    sessions: Mutex<HashMap<String, Session>>,
    policy: SessionPolicy,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionPolicy::default())
    }
}

impl SessionStore {
    pub fn new(policy: SessionPolicy) -> Self {
        Self {
            sessions: Mutex::new(HashMap::new()),
            policy,
        }
    }

    pub fn policy(&self) -> SessionPolicy {
        self.policy
    }

    // A poisoned lock only means a panic happened mid-operation; the map itself
    // is still structurally valid.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, Session>> {
        self.sessions.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn create(&self, user: &SessionUser) -> String {
        self.create_at(user, Utc::now())
    }

    pub fn create_at(&self, user: &SessionUser, now: DateTime<Utc>) -> String {
        let session = Session {
            user_id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: now,
            last_activity: now,
        };

        let mut sessions = self.lock();
        let token = loop {
            let candidate = generate_token();
            if !sessions.contains_key(&candidate) {
                break candidate;
            }
        };
        sessions.insert(token.clone(), session);
        drop(sessions);

        tracing::debug!(user_id = %user.id, role = %user.role, "session created");
        token
    }

    pub fn get(&self, token: &str) -> Option<Session> {
        self.get_at(token, Utc::now())
    }

    pub fn get_at(&self, token: &str, now: DateTime<Utc>) -> Option<Session> {
        let mut sessions = self.lock();
        let expired = self.policy.is_expired(sessions.get(token)?, now);
        if expired {
            sessions.remove(token);
            tracing::debug!(token_prefix = prefix(token), "expired session dropped on lookup");
            return None;
        }

        let session = sessions.get_mut(token)?;
        session.last_activity = now;
        Some(session.clone())
    }

    pub fn destroy(&self, token: &str) -> bool {
        let removed = self.lock().remove(token).is_some();
        if removed {
            tracing::debug!(token_prefix = prefix(token), "session destroyed");
        }
        removed
    }

    /// Force-logout of a user everywhere. Returns how many sessions were dropped.
    pub fn destroy_all_for_user(&self, user_id: UserId) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| session.user_id != user_id);
        let removed = before - sessions.len();
        drop(sessions);

        if removed > 0 {
            tracing::info!(user_id = %user_id, removed, "destroyed all sessions for user");
        }
        removed
    }

    pub fn sweep_expired(&self) -> usize {
        self.sweep_expired_at(Utc::now())
    }

    pub fn sweep_expired_at(&self, now: DateTime<Utc>) -> usize {
        let mut sessions = self.lock();
        let before = sessions.len();
        sessions.retain(|_, session| !self.policy.is_expired(session, now));
        before - sessions.len()
    }

    pub fn sessions_for_user(&self, user_id: UserId) -> Vec<SessionSummary> {
        let now = Utc::now();
        self.lock()
            .iter()
            .filter(|(_, session)| {
                session.user_id == user_id && !self.policy.is_expired(session, now)
            })
            .map(|(token, session)| summarize(token, session))
            .collect()
    }

    pub fn stats(&self) -> SessionStats {
        self.stats_at(Utc::now())
    }

    pub fn stats_at(&self, now: DateTime<Utc>) -> SessionStats {
        let mut sessions: Vec<SessionSummary> = self
            .lock()
            .iter()
            .filter(|(_, session)| !self.policy.is_expired(session, now))
            .map(|(token, session)| summarize(token, session))
            .collect();
        sessions.sort_by(|a, b| b.last_activity.cmp(&a.last_activity));

        SessionStats {
            total_sessions: sessions.len(),
            sessions,
        }
    }

    /// Raw entry count, including entries that expired but were not swept yet.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn generate_token() -> String {
    let mut bytes = [0u8; TOKEN_BYTES];
    rand::thread_rng().fill_bytes(&mut bytes);
    hex::encode(bytes)
}

fn prefix(token: &str) -> &str {
    token.get(..TOKEN_PREFIX_LEN).unwrap_or(token)
}

fn summarize(token: &str, session: &Session) -> SessionSummary {
    SessionSummary {
        token_prefix: format!("{}...", prefix(token)),
        user_id: session.user_id,
        email: session.email.clone(),
        role: session.role,
        created_at: session.created_at,
        last_activity: session.last_activity,
    }
}

/// Periodically drops expired sessions so abandoned ones do not accumulate.
pub fn spawn_session_sweeper(
    store: Arc<SessionStore>,
    every: std::time::Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let removed = store.sweep_expired();
            if removed > 0 {
                tracing::info!(removed, remaining = store.len(), "expired sessions swept");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn user(id: i64, role: Role) -> SessionUser {
        SessionUser {
            id: UserId(id),
            name: format!("Usuario {}", id),
            email: format!("user{}@agro.test", id),
            role,
        }
    }

    fn t0() -> DateTime<Utc> {
        DateTime::parse_from_rfc3339("2024-03-01T08:00:00Z")
            .unwrap()
            .with_timezone(&Utc)
    }

    #[test]
    fn tokens_are_unique_and_hex() {
        let store = SessionStore::default();
        let producer = user(7, Role::Producer);
        let tokens: HashSet<String> = (0..200).map(|_| store.create(&producer)).collect();
        assert_eq!(tokens.len(), 200);
        assert!(tokens
            .iter()
            .all(|t| t.len() == 64 && t.chars().all(|c| c.is_ascii_hexdigit())));
        assert_eq!(store.len(), 200);
    }

    #[test]
    fn get_after_create_returns_owner_and_fresh_activity() {
        let store = SessionStore::default();
        let token = store.create(&user(42, Role::Administrator));

        let session = store.get(&token).expect("session should be live");
        assert_eq!(session.user_id, UserId(42));
        assert_eq!(session.role, Role::Administrator);
        assert_eq!(session.email, "user42@agro.test");
        assert!((Utc::now() - session.last_activity).num_seconds().abs() <= 1);
    }

    #[test]
    fn unknown_token_reads_as_none() {
        let store = SessionStore::default();
        assert!(store.get("does-not-exist").is_none());
        assert!(store.get("").is_none());
    }

    #[test]
    fn absolute_ttl_wins_over_activity() {
        let store = SessionStore::default();
        let policy = store.policy();
        let token = store.create_at(&user(1, Role::Producer), t0());

        // Keep it busy every hour right up to the absolute limit.
        let mut now = t0();
        while now + Duration::hours(1) <= t0() + policy.absolute_ttl {
            now += Duration::hours(1);
            assert!(store.get_at(&token, now).is_some(), "alive at {}", now);
        }

        let past_limit = t0() + policy.absolute_ttl + Duration::seconds(1);
        assert!(store.get_at(&token, past_limit).is_none());
        assert!(store.is_empty(), "expired lookup removes the entry");
    }

    #[test]
    fn idle_ttl_expires_quiet_sessions() {
        let store = SessionStore::default();
        let policy = store.policy();
        let token = store.create_at(&user(1, Role::Producer), t0());

        let quiet = t0() + policy.idle_ttl + Duration::seconds(1);
        assert!(quiet - t0() < policy.absolute_ttl);
        assert!(store.get_at(&token, quiet).is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn boundary_is_inclusive() {
        let store = SessionStore::default();
        let policy = store.policy();
        let token = store.create_at(&user(1, Role::Producer), t0());
        assert!(store.get_at(&token, t0() + policy.idle_ttl).is_some());
    }

    #[test]
    fn sliding_window_refreshes_last_activity() {
        let store = SessionStore::default();
        let policy = store.policy();
        let token = store.create_at(&user(3, Role::Advisor), t0());

        let step = policy.idle_ttl - Duration::minutes(1);
        let mut now = t0();
        for _ in 0..5 {
            now += step;
            let session = store.get_at(&token, now).expect("sliding window keeps it alive");
            assert_eq!(session.last_activity, now);
            assert_eq!(session.created_at, t0());
        }
    }

    #[test]
    fn destroy_reports_whether_anything_was_removed() {
        let store = SessionStore::default();
        let token = store.create(&user(5, Role::Producer));

        assert!(store.destroy(&token));
        assert!(store.get(&token).is_none());
        assert!(!store.destroy(&token));
        assert!(!store.destroy("unknown"));
    }

    #[test]
    fn destroy_all_for_user_leaves_other_users_alone() {
        let store = SessionStore::default();
        let target = user(10, Role::Producer);
        let other = user(11, Role::Producer);
        let a = store.create(&target);
        let b = store.create(&target);
        let c = store.create(&other);

        assert_eq!(store.destroy_all_for_user(UserId(10)), 2);
        assert!(store.get(&a).is_none());
        assert!(store.get(&b).is_none());
        assert!(store.get(&c).is_some());
        assert_eq!(store.destroy_all_for_user(UserId(10)), 0);
    }

    #[test]
    fn sweep_removes_only_expired_sessions() {
        let store = SessionStore::default();
        let policy = store.policy();
        let stale = store.create_at(&user(1, Role::Producer), t0());
        let later = t0() + policy.idle_ttl;
        let fresh = store.create_at(&user(2, Role::Producer), later);

        let removed = store.sweep_expired_at(later + Duration::minutes(1));
        assert_eq!(removed, 1);
        assert_eq!(store.len(), 1);
        assert!(store
            .get_at(&fresh, later + Duration::minutes(2))
            .is_some());
        assert!(store.get_at(&stale, later).is_none());
    }

    #[test]
    fn stats_truncate_tokens_and_skip_expired() {
        let store = SessionStore::default();
        let token = store.create_at(&user(1, Role::Administrator), t0());
        store.create_at(&user(2, Role::Producer), t0() - Duration::days(2));

        let stats = store.stats_at(t0() + Duration::minutes(5));
        assert_eq!(stats.total_sessions, 1);
        let summary = &stats.sessions[0];
        assert_eq!(summary.token_prefix, format!("{}...", &token[..8]));
        assert_eq!(summary.user_id, UserId(1));
        assert_eq!(summary.role, Role::Administrator);
    }

    #[test]
    fn sessions_for_user_lists_live_sessions() {
        let store = SessionStore::default();
        store.create(&user(4, Role::Advisor));
        store.create(&user(4, Role::Advisor));
        store.create(&user(5, Role::Producer));
        assert_eq!(store.sessions_for_user(UserId(4)).len(), 2);
        assert!(store.sessions_for_user(UserId(99)).is_empty());
    }

    #[test]
    fn concurrent_access_is_serialized() {
        let store = Arc::new(SessionStore::default());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    let me = user(i, Role::Producer);
                    for _ in 0..50 {
                        let token = store.create(&me);
                        assert!(store.get(&token).is_some());
                        store.sweep_expired();
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(store.len(), 400);
        assert_eq!(store.destroy_all_for_user(UserId(3)), 50);
    }

    #[tokio::test]
    async fn sweeper_task_removes_expired_sessions() {
        let store = Arc::new(SessionStore::default());
        store.create_at(&user(1, Role::Producer), Utc::now() - Duration::days(3));
        store.create(&user(2, Role::Producer));

        let handle = spawn_session_sweeper(Arc::clone(&store), std::time::Duration::from_millis(10));
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        handle.abort();

        assert_eq!(store.len(), 1);
    }
}
