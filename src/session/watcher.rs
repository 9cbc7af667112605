// src/session/watcher.rs

use std::{sync::Arc, time::Duration};

use tokio::{
    sync::watch,
    task::JoinHandle,
    time::{self, MissedTickBehavior},
};

use crate::session::{SessionStorage, SessionStore};

pub const EXPIRY_POLL_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Active,
    Expired,
}

/// Verificação periódica de expiração.
///
/// Quando a sessão deixa de ser válida, limpa o storage e publica
/// [`SessionEvent::Expired`] uma única vez; depois disso a tarefa termina.
pub struct SessionWatcher {
    handle: JoinHandle<()>,
    events: watch::Receiver<SessionEvent>,
}

impl SessionWatcher {
    pub fn spawn<S>(store: Arc<SessionStore<S>>, period: Duration) -> Self
    where
        S: SessionStorage + 'static,
    {
        let (tx, events) = watch::channel(SessionEvent::Active);

        let handle = tokio::spawn(async move {
            let mut ticker = time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                ticker.tick().await;

                if !store.validate_session() {
                    store.clear_all_stored_data();
                    tracing::info!("🔒 Sessão expirada, dados locais removidos.");
                    // Ninguém ouvindo não é erro.
                    let _ = tx.send(SessionEvent::Expired);
                    break;
                }
            }
        });

        Self { handle, events }
    }

    pub fn events(&self) -> watch::Receiver<SessionEvent> {
        self.events.clone()
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn stop(self) {
        // O Drop aborta a tarefa.
    }
}

impl Drop for SessionWatcher {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use uuid::Uuid;

    use super::*;
    use crate::{
        permissions::Role,
        session::{MemoryStorage, SessionRecord, SESSION_KEY},
    };

    fn store_with(expires_in: chrono::Duration) -> Arc<SessionStore<MemoryStorage>> {
        let store = SessionStore::new(MemoryStorage::new(), chrono::Duration::hours(1));
        store.create(&SessionRecord {
            id: Uuid::new_v4(),
            role: Role::Corretor,
            session_id: "sid".into(),
            display_name: "Ana".into(),
            expires_at: Utc::now() + expires_in,
        });
        store.storage().set("vitrineturbo_cart_loja", "[]").unwrap();
        Arc::new(store)
    }

    #[tokio::test(start_paused = true)]
    async fn expired_session_is_cleared_and_reported() {
        let store = store_with(chrono::Duration::seconds(-5));
        let watcher = SessionWatcher::spawn(store.clone(), EXPIRY_POLL_INTERVAL);
        let mut events = watcher.events();

        events.changed().await.unwrap();
        assert_eq!(*events.borrow(), SessionEvent::Expired);
        assert!(store.get_stored_user().is_none());
        assert_eq!(store.storage().get("vitrineturbo_cart_loja").unwrap(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn live_session_keeps_polling_until_it_disappears() {
        let store = store_with(chrono::Duration::hours(1));
        let watcher = SessionWatcher::spawn(store.clone(), EXPIRY_POLL_INTERVAL);
        let mut events = watcher.events();

        // Várias voltas do intervalo sem mudança.
        let quiet = time::timeout(Duration::from_secs(95), events.changed()).await;
        assert!(quiet.is_err());
        assert_eq!(*events.borrow(), SessionEvent::Active);

        // Outra "aba" fez logout.
        store.storage().remove(SESSION_KEY).unwrap();
        events.changed().await.unwrap();
        assert_eq!(*events.borrow(), SessionEvent::Expired);
    }

    #[tokio::test(start_paused = true)]
    async fn stopping_aborts_the_poll() {
        let store = store_with(chrono::Duration::hours(1));
        let watcher = SessionWatcher::spawn(store.clone(), EXPIRY_POLL_INTERVAL);
        let mut events = watcher.events();
        watcher.stop();

        // Com a tarefa abortada, o sender some e o canal fecha.
        assert!(events.changed().await.is_err());
        assert!(store.is_authenticated());
    }
}
