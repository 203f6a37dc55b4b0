use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use teloxide::dispatching::dialogue::Storage;
use teloxide::types::ChatId;
use tokio::sync::Mutex;
use tokio::time::Instant;

type StorageFuture<T> = Pin<Box<dyn Future<Output = Result<T, Infallible>> + Send>>;

struct Session<D> {
    dialogue: D,
    touched_at: Instant,
}

/// In-memory dialogue storage that forgets conversations left idle for longer
/// than `idle_timeout`.
///
/// Reading or writing a session counts as activity. Expired sessions are
/// dropped when read, and all of them are swept whenever a session is written.
pub struct ExpiringStorage<D> {
    sessions: Mutex<HashMap<ChatId, Session<D>>>,
    idle_timeout: Duration,
}

impl<D> ExpiringStorage<D> {
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: Mutex::new(HashMap::new()),
            idle_timeout,
        })
    }

    fn is_expired(&self, session: &Session<D>, now: Instant) -> bool {
        now.duration_since(session.touched_at) > self.idle_timeout
    }
}

impl<D> Storage<D> for ExpiringStorage<D>
where
    D: Clone + Send + 'static,
{
    type Error = Infallible;

    fn remove_dialogue(self: Arc<Self>, chat_id: ChatId) -> StorageFuture<()>
    where
        D: Send + 'static,
    {
        Box::pin(async move {
            self.sessions.lock().await.remove(&chat_id);
            Ok(())
        })
    }

    fn update_dialogue(self: Arc<Self>, chat_id: ChatId, dialogue: D) -> StorageFuture<()>
    where
        D: Send + 'static,
    {
        Box::pin(async move {
            let now = Instant::now();
            let mut sessions = self.sessions.lock().await;

            let before = sessions.len();
            sessions.retain(|_, session| !self.is_expired(session, now));
            let swept = before - sessions.len();
            if swept > 0 {
                log::debug!("Dropped {swept} idle dialogue session(s)");
            }

            sessions.insert(
                chat_id,
                Session {
                    dialogue,
                    touched_at: now,
                },
            );
            Ok(())
        })
    }

    fn get_dialogue(self: Arc<Self>, chat_id: ChatId) -> StorageFuture<Option<D>> {
        Box::pin(async move {
            let now = Instant::now();
            let mut sessions = self.sessions.lock().await;

            let Some(session) = sessions.get_mut(&chat_id) else {
                return Ok(None);
            };

            if self.is_expired(session, now) {
                log::info!("Dialogue session in chat {chat_id} expired");
                sessions.remove(&chat_id);
                return Ok(None);
            }

            session.touched_at = now;
            Ok(Some(session.dialogue.clone()))
        })
    }
}
