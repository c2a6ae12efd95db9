//! Transient, dismissible notifications.
//!
//! Notifications expire after a fixed time-to-live. Admin alerts stack;
//! storefront toasts replace whatever toasts are still visible.

use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};

use tracing::debug;

pub const DEFAULT_TTL: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Level {
    Success,
    Error,
    Warning,
    Info,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Admin panel alerts. New alerts stack on top of older ones.
    Alert,
    /// Storefront toasts. A new toast removes every visible toast first.
    Toast,
}

impl Family {
    fn replaces_siblings(self) -> bool {
        matches!(self, Family::Toast)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NotificationId(u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Notification {
    pub id: NotificationId,
    pub level: Level,
    pub family: Family,
    pub text: String,
    pub expires_at: Instant,
}

struct Inner {
    ttl: Duration,
    next_id: u64,
    visible: Vec<Notification>,
}

/// Shared notification stack. Clones observe the same notifications.
#[derive(Clone)]
pub struct NotificationCenter {
    inner: Arc<Mutex<Inner>>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

impl NotificationCenter {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                ttl,
                next_id: 1,
                visible: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn notify(&self, level: Level, family: Family, text: impl Into<String>) -> NotificationId {
        self.notify_at(Instant::now(), level, family, text)
    }

    pub fn notify_at(
        &self,
        now: Instant,
        level: Level,
        family: Family,
        text: impl Into<String>,
    ) -> NotificationId {
        let text = text.into();
        let mut inner = self.lock();
        inner.visible.retain(|n| n.expires_at > now);

        if family.replaces_siblings() {
            inner.visible.retain(|n| n.family != family);
        }

        let id = NotificationId(inner.next_id);
        inner.next_id += 1;
        let expires_at = now + inner.ttl;
        debug!(?level, ?family, text = %text, "Notification shown");
        inner.visible.push(Notification {
            id,
            level,
            family,
            text,
            expires_at,
        });
        id
    }

    pub fn success(&self, text: impl Into<String>) -> NotificationId {
        self.notify(Level::Success, Family::Alert, text)
    }

    pub fn error(&self, text: impl Into<String>) -> NotificationId {
        self.notify(Level::Error, Family::Alert, text)
    }

    /// Removes one notification before it expires. Returns false if it was already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        let mut inner = self.lock();
        let before = inner.visible.len();
        inner.visible.retain(|n| n.id != id);
        inner.visible.len() != before
    }

    pub fn visible(&self) -> Vec<Notification> {
        self.visible_at(Instant::now())
    }

    /// Notifications still visible at `now`, oldest first. Expired ones are dropped.
    pub fn visible_at(&self, now: Instant) -> Vec<Notification> {
        let mut inner = self.lock();
        inner.visible.retain(|n| n.expires_at > now);
        inner.visible.clone()
    }

    /// Removes and returns everything currently visible.
    pub fn drain(&self) -> Vec<Notification> {
        let now = Instant::now();
        let mut inner = self.lock();
        inner.visible.retain(|n| n.expires_at > now);
        std::mem::take(&mut inner.visible)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn alerts_expire_after_ttl() {
        let center = NotificationCenter::new(Duration::from_secs(5));
        let start = Instant::now();
        center.notify_at(start, Level::Success, Family::Alert, "Produto deletado com sucesso!");

        assert_eq!(center.visible_at(start + Duration::from_secs(4)).len(), 1);
        assert!(center.visible_at(start + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn alerts_stack_and_toasts_replace() {
        let center = NotificationCenter::default();
        let now = Instant::now();
        center.notify_at(now, Level::Success, Family::Alert, "one");
        center.notify_at(now, Level::Error, Family::Alert, "two");
        center.notify_at(now, Level::Info, Family::Toast, "first toast");
        center.notify_at(now, Level::Error, Family::Toast, "second toast");

        let texts: Vec<_> = center.visible_at(now).into_iter().map(|n| n.text).collect();
        assert_eq!(texts, vec!["one", "two", "second toast"]);
    }

    #[test]
    fn notifying_prunes_expired_entries() {
        let center = NotificationCenter::new(Duration::from_secs(5));
        let start = Instant::now();
        for i in 0..10 {
            center.notify_at(start, Level::Info, Family::Alert, format!("old {i}"));
        }
        center.notify_at(start + Duration::from_secs(6), Level::Success, Family::Alert, "new");

        assert_eq!(center.lock().visible.len(), 1);
        assert_eq!(center.lock().visible[0].text, "new");
    }

    #[test]
    fn dismiss_removes_before_expiry() {
        let center = NotificationCenter::default();
        let id = center.error("Erro ao deletar produto: Erro desconhecido");
        let other = center.success("ok");

        assert!(center.dismiss(id));
        assert!(!center.dismiss(id));
        let visible = center.visible();
        assert_eq!(visible.len(), 1);
        assert_eq!(visible[0].id, other);
    }
}
