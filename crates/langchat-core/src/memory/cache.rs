//! MemoryCache: process-wide conversation memory keyed by conversation id.
//!
//! Each conversation holds an optional pinned system message followed by a
//! window of at most `max_messages` user/assistant messages. Beyond the cap
//! the oldest message is evicted first. The system message never counts
//! toward the cap and is never evicted.
//!
//! `init_*` calls overwrite whatever is cached (last caller wins). Turns on the
//! same conversation are serialized through [`MemoryCache::begin_turn`], so a
//! relay's read-generate-append sequence never interleaves with another
//! relay or a clean on that id. A conversation's lock lives only while some
//! caller holds or waits on it.

use std::collections::VecDeque;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::trace;

use langchat_types::chat::{ConversationId, Message};

/// Bounded message window for one conversation.
#[derive(Debug, Clone)]
pub struct ConversationMemory {
    max_messages: usize,
    system: Option<Message>,
    messages: VecDeque<Message>,
}

impl ConversationMemory {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages,
            system: None,
            messages: VecDeque::new(),
        }
    }

    /// Build a window from persisted history, keeping only the most recent
    /// `max_messages` entries.
    pub fn from_history(max_messages: usize, history: impl IntoIterator<Item = Message>) -> Self {
        let mut memory = Self::new(max_messages);
        for message in history {
            memory.push(message);
        }
        memory
    }

    /// Pin `prompt` as the leading system message.
    pub fn with_system(mut self, prompt: impl Into<String>) -> Self {
        self.system = Some(Message::system(prompt));
        self
    }

    /// Append one message, evicting from the front beyond the cap.
    pub fn push(&mut self, message: Message) {
        self.messages.push_back(message);
        while self.messages.len() > self.max_messages {
            self.messages.pop_front();
        }
    }

    /// Ordered snapshot: the system message (if any) first, then the window.
    pub fn snapshot(&self) -> Vec<Message> {
        self.system
            .iter()
            .chain(self.messages.iter())
            .cloned()
            .collect()
    }

    /// Number of windowed messages, excluding the system message.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.system.is_none() && self.messages.is_empty()
    }
}

/// Shared cache of [`ConversationMemory`] entries.
pub struct MemoryCache {
    max_messages: usize,
    entries: DashMap<ConversationId, ConversationMemory>,
    turns: DashMap<ConversationId, Arc<Mutex<()>>>,
}

impl MemoryCache {
    pub fn new(max_messages: usize) -> Self {
        Self {
            max_messages,
            entries: DashMap::new(),
            turns: DashMap::new(),
        }
    }

    pub fn max_messages(&self) -> usize {
        self.max_messages
    }

    /// Replace the memory for `id` with the tail of `history`.
    pub fn init_history(&self, id: &ConversationId, history: impl IntoIterator<Item = Message>) {
        let memory = ConversationMemory::from_history(self.max_messages, history);
        self.entries.insert(id.clone(), memory);
    }

    /// Replace the memory for `id` with a single system message.
    pub fn init_system(&self, id: &ConversationId, prompt: &str) {
        let memory = ConversationMemory::new(self.max_messages).with_system(prompt);
        self.entries.insert(id.clone(), memory);
    }

    /// Replace the memory for `id` with an optional system prompt followed
    /// by the tail of `history`.
    pub fn seed(
        &self,
        id: &ConversationId,
        system: Option<&str>,
        history: impl IntoIterator<Item = Message>,
    ) {
        let mut memory = ConversationMemory::from_history(self.max_messages, history);
        if let Some(prompt) = system {
            memory = memory.with_system(prompt);
        }
        self.entries.insert(id.clone(), memory);
    }

    /// Snapshot of the memory for `id`. Empty when nothing is cached.
    pub fn get(&self, id: &ConversationId) -> Vec<Message> {
        self.entries
            .get(id)
            .map(|memory| memory.snapshot())
            .unwrap_or_default()
    }

    pub fn contains(&self, id: &ConversationId) -> bool {
        self.entries.contains_key(id)
    }

    /// Append messages to the memory for `id`, creating it if absent.
    pub fn append(&self, id: &ConversationId, messages: impl IntoIterator<Item = Message>) {
        let mut memory = self
            .entries
            .entry(id.clone())
            .or_insert_with(|| ConversationMemory::new(self.max_messages));
        for message in messages {
            memory.push(message);
        }
    }

    /// Drop the memory for `id` entirely.
    pub fn clean(&self, id: &ConversationId) {
        self.entries.remove(id);
    }

    /// Wait for exclusive use of the conversation `id` for one turn.
    ///
    /// The returned guard releases the conversation when dropped. Dropping
    /// the future while it waits also gives up the claim on the lock.
    pub async fn begin_turn(&self, id: &ConversationId) -> TurnGuard<'_> {
        let lock = self
            .turns
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let mut turn = TurnGuard {
            turns: &self.turns,
            id: id.clone(),
            guard: None,
        };
        let acquire = lock.lock_owned();
        turn.guard = Some(acquire.await);
        turn
    }

    /// Conversations with a turn lock currently held or awaited.
    pub fn active_turns(&self) -> usize {
        self.turns.len()
    }
}

/// Exclusive hold on one conversation, released on drop.
pub struct TurnGuard<'a> {
    turns: &'a DashMap<ConversationId, Arc<Mutex<()>>>,
    id: ConversationId,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for TurnGuard<'_> {
    fn drop(&mut self) {
        // Unlock first so the map holds the last reference when nobody waits.
        drop(self.guard.take());
        if self
            .turns
            .remove_if(&self.id, |_, lock| Arc::strong_count(lock) == 1)
            .is_some()
        {
            trace!(conversation_id = %self.id, "turn lock released");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    fn id(s: &str) -> ConversationId {
        ConversationId::from(s)
    }

    #[test]
    fn init_from_history_keeps_most_recent() {
        let cache = MemoryCache::new(2);
        let history = vec![
            Message::user("S"),
            Message::user("U1"),
            Message::assistant("A1"),
            Message::user("U2"),
            Message::assistant("A2"),
        ];
        cache.init_history(&id("c"), history);

        assert_eq!(
            cache.get(&id("c")),
            vec![Message::user("U2"), Message::assistant("A2")]
        );
    }

    #[test]
    fn init_system_sets_single_system_message() {
        let cache = MemoryCache::new(20);
        cache.append(&id("c"), [Message::user("stale")]);
        cache.init_system(&id("c"), "You are a helper");

        assert_eq!(cache.get(&id("c")), vec![Message::system("You are a helper")]);
    }

    #[test]
    fn append_evicts_oldest_but_keeps_system() {
        let cache = MemoryCache::new(2);
        cache.init_system(&id("c"), "sys");
        cache.append(&id("c"), [Message::user("u1"), Message::assistant("a1")]);
        cache.append(&id("c"), [Message::user("u2"), Message::assistant("a2")]);

        assert_eq!(
            cache.get(&id("c")),
            vec![
                Message::system("sys"),
                Message::user("u2"),
                Message::assistant("a2"),
            ]
        );
    }

    #[test]
    fn seed_prefixes_system_prompt() {
        let cache = MemoryCache::new(3);
        cache.seed(
            &id("c"),
            Some("sys"),
            vec![Message::user("u1"), Message::assistant("a1")],
        );

        let memory = cache.get(&id("c"));
        assert_eq!(memory.len(), 3);
        assert_eq!(memory[0], Message::system("sys"));
    }

    #[test]
    fn clean_removes_entry() {
        let cache = MemoryCache::new(4);
        cache.init_system(&id("c"), "sys");
        assert!(cache.contains(&id("c")));

        cache.clean(&id("c"));
        assert!(!cache.contains(&id("c")));
        assert!(cache.get(&id("c")).is_empty());
    }

    #[test]
    fn entries_are_isolated_per_conversation() {
        let cache = MemoryCache::new(4);
        cache.append(&id("a"), [Message::user("for a")]);
        assert!(cache.get(&id("b")).is_empty());
        assert_eq!(cache.get(&id("a")).len(), 1);
    }

    #[tokio::test]
    async fn begin_turn_serializes_same_conversation() {
        let cache = Arc::new(MemoryCache::new(4));
        let guard = cache.begin_turn(&id("c")).await;

        let waiter = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                let _guard = cache.begin_turn(&id("c")).await;
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!waiter.is_finished());

        // A different conversation is not blocked.
        let _other = cache.begin_turn(&id("d")).await;

        drop(guard);
        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
    }

    #[tokio::test]
    async fn turn_lock_is_removed_after_last_holder() {
        let cache = MemoryCache::new(4);
        for n in 0..16 {
            let _guard = cache.begin_turn(&id(&format!("c-{n}"))).await;
            assert_eq!(cache.active_turns(), 1);
        }
        assert_eq!(cache.active_turns(), 0);
    }

    #[tokio::test]
    async fn abandoned_waiter_does_not_leak_lock() {
        let cache = MemoryCache::new(4);
        let guard = cache.begin_turn(&id("c")).await;

        let waited =
            tokio::time::timeout(Duration::from_millis(10), cache.begin_turn(&id("c"))).await;
        assert!(waited.is_err());

        drop(guard);
        assert_eq!(cache.active_turns(), 0);
    }

    #[tokio::test]
    async fn turn_lock_survives_while_another_caller_waits() {
        let cache = Arc::new(MemoryCache::new(4));
        let guard = cache.begin_turn(&id("c")).await;

        let waiter = {
            let cache = Arc::clone(&cache);
            tokio::spawn(async move {
                let _guard = cache.begin_turn(&id("c")).await;
                cache.append(&id("c"), [Message::user("second")]);
            })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;

        // Clean does not touch the lock a running turn holds.
        cache.clean(&id("c"));
        drop(guard);
        assert_eq!(cache.active_turns(), 1);

        tokio::time::timeout(Duration::from_secs(1), waiter)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(cache.active_turns(), 0);
        assert_eq!(cache.get(&id("c")), vec![Message::user("second")]);
    }
}
