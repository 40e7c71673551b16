//! ChatRelay: streams one chat turn from a generation backend to a client.
//!
//! `start` validates the request and resolves the app and model on the
//! caller's task, so `InvalidRequest` and `NotFound` are reported before any
//! stream exists. The turn itself runs on a spawned task:
//!
//! 1. wait for the conversation's turn lock
//! 2. seed memory from persisted history if nothing is cached
//! 3. persist the user message
//! 4. stream fragments to the client while accumulating them
//! 5. persist the assistant message, update memory, send the success terminator
//!
//! Backend errors, timeouts and persistence failures end the stream with an
//! error terminator. A partial assistant message is never persisted.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::StreamExt;
use tokio::time::Instant;
use tracing::{Instrument, debug, error, info, warn};
use uuid::Uuid;

use langchat_types::app::App;
use langchat_types::chat::{ChatMessage, ChatRequest, ConversationId, Message, MessageRole};
use langchat_types::error::ChatError;
use langchat_types::llm::{CompletionRequest, StreamEvent, Usage};

use crate::chat::repository::ConversationStore;
use crate::llm::registry::{ChatModel, ProviderRegistry};
use crate::memory::MemoryCache;
use crate::repository::app::AppRepository;

use super::session::{RelayStream, StreamSession};

/// Tunables for [`ChatRelay`].
#[derive(Debug, Clone)]
pub struct RelaySettings {
    /// Deadline for one turn. `None` disables it.
    pub turn_timeout: Option<Duration>,
    /// Buffered events between the relay task and the client writer.
    pub channel_capacity: usize,
}

impl Default for RelaySettings {
    fn default() -> Self {
        Self {
            turn_timeout: Some(Duration::from_secs(120)),
            channel_capacity: 64,
        }
    }
}

/// How the generation loop ended.
enum Outcome {
    Finished,
    Failed(ChatError),
    Abandoned,
}

/// Orchestrates streaming chat turns.
///
/// Generic over the conversation store and app repository so the core never
/// depends on a storage technology.
pub struct ChatRelay<S: ConversationStore, A: AppRepository> {
    store: Arc<S>,
    apps: Arc<A>,
    memory: Arc<MemoryCache>,
    providers: Arc<ProviderRegistry>,
    settings: RelaySettings,
}

impl<S: ConversationStore, A: AppRepository> Clone for ChatRelay<S, A> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            apps: Arc::clone(&self.apps),
            memory: Arc::clone(&self.memory),
            providers: Arc::clone(&self.providers),
            settings: self.settings.clone(),
        }
    }
}

impl<S, A> ChatRelay<S, A>
where
    S: ConversationStore + 'static,
    A: AppRepository + 'static,
{
    pub fn new(
        store: Arc<S>,
        apps: Arc<A>,
        memory: Arc<MemoryCache>,
        providers: Arc<ProviderRegistry>,
        settings: RelaySettings,
    ) -> Self {
        Self {
            store,
            apps,
            memory,
            providers,
            settings,
        }
    }

    /// Begin a turn and return the client stream.
    ///
    /// Returns immediately after validation; generation proceeds on a
    /// spawned task and reports its outcome through the stream.
    pub async fn start(&self, request: ChatRequest) -> Result<RelayStream, ChatError> {
        if request.conversation_id.is_blank() {
            return Err(ChatError::InvalidRequest(
                "conversationId is required".to_string(),
            ));
        }
        if request.message.trim().is_empty() {
            return Err(ChatError::InvalidRequest("message is required".to_string()));
        }

        let app = match request.app_id.as_deref().filter(|id| !id.trim().is_empty()) {
            Some(app_id) => Some(
                self.apps
                    .get(app_id)
                    .await?
                    .ok_or_else(|| ChatError::NotFound(format!("app '{app_id}'")))?,
            ),
            None => None,
        };

        let model = self.resolve_model(&request, app.as_ref())?;

        info!(
            conversation_id = %request.conversation_id,
            user_id = %request.user_id,
            model = %model.id,
            message_len = request.message.len(),
            "chat request received"
        );

        let (session, stream) = StreamSession::open(self.settings.channel_capacity);
        let span = tracing::info_span!(
            "chat_relay",
            conversation_id = %request.conversation_id,
            user_id = %request.user_id,
        );
        let relay = self.clone();
        tokio::spawn(
            async move { relay.run_turn(request, app, model, session).await }.instrument(span),
        );

        Ok(stream)
    }

    fn resolve_model(
        &self,
        request: &ChatRequest,
        app: Option<&App>,
    ) -> Result<Arc<ChatModel>, ChatError> {
        let requested = request
            .model_id
            .as_deref()
            .or_else(|| app.and_then(|a| a.model_id.as_deref()))
            .filter(|id| !id.trim().is_empty());

        self.providers.chat(requested).ok_or_else(|| match requested {
            Some(id) => ChatError::InvalidRequest(format!("unknown model '{id}'")),
            None => ChatError::InvalidRequest("no chat model configured".to_string()),
        })
    }

    async fn run_turn(
        self,
        request: ChatRequest,
        app: Option<App>,
        model: Arc<ChatModel>,
        mut session: StreamSession,
    ) {
        let id = request.conversation_id.clone();
        let cancel = session.cancellation();

        let _turn = tokio::select! {
            guard = self.memory.begin_turn(&id) => guard,
            _ = cancel.cancelled() => {
                session.abandon();
                info!(conversation_id = %id, "client disconnected before turn started");
                return;
            }
        };

        if !self.memory.contains(&id) {
            match self.store.list(&id, Some(&request.user_id)).await {
                Ok(history) => {
                    let system = app.as_ref().and_then(App::system_prompt);
                    self.memory
                        .seed(&id, system, history.iter().map(ChatMessage::to_memory_message));
                    debug!(conversation_id = %id, persisted = history.len(), "memory seeded");
                }
                Err(e) => {
                    self.finish_failed(&mut session, &id, ChatError::PersistenceFailure(e))
                        .await;
                    return;
                }
            }
        }

        let user_record = record(&request, MessageRole::User, request.message.clone());
        if let Err(e) = self.store.append(&user_record).await {
            self.finish_failed(&mut session, &id, ChatError::PersistenceFailure(e))
                .await;
            return;
        }

        let mut messages = self.memory.get(&id);
        messages.push(Message::user(request.message.clone()));
        let completion = CompletionRequest {
            model: model.model.clone(),
            messages,
            max_tokens: model.max_tokens,
            temperature: model.temperature,
            stream: true,
        };

        let mut answer = String::new();
        let mut usage = Usage::default();
        let outcome = self
            .generate(&model, completion, &mut session, &mut answer, &mut usage)
            .await;

        match outcome {
            Outcome::Finished => {
                let mut assistant = record(&request, MessageRole::Assistant, answer.clone());
                assistant.model = Some(model.id.clone());
                assistant.input_tokens = Some(usage.input_tokens);
                assistant.output_tokens = Some(usage.output_tokens);

                if let Err(e) = self.store.append(&assistant).await {
                    self.finish_failed(&mut session, &id, ChatError::PersistenceFailure(e))
                        .await;
                    return;
                }

                self.memory.append(
                    &id,
                    [
                        Message::user(request.message.clone()),
                        Message::assistant(answer),
                    ],
                );

                if session.complete(usage.clone()).await {
                    info!(
                        conversation_id = %id,
                        input_tokens = usage.input_tokens,
                        output_tokens = usage.output_tokens,
                        "chat success in conversation id"
                    );
                } else {
                    info!(conversation_id = %id, "client disconnected before completion was delivered");
                }
            }
            Outcome::Failed(err) => self.finish_failed(&mut session, &id, err).await,
            Outcome::Abandoned => {
                session.abandon();
                info!(conversation_id = %id, "client disconnected, generation cancelled");
            }
        }
    }

    /// Drive the backend stream, forwarding fragments as they arrive.
    async fn generate(
        &self,
        model: &ChatModel,
        completion: CompletionRequest,
        session: &mut StreamSession,
        answer: &mut String,
        usage: &mut Usage,
    ) -> Outcome {
        let cancel = session.cancellation();
        let deadline = self.settings.turn_timeout;
        let expiry = async {
            match deadline {
                Some(limit) => tokio::time::sleep_until(Instant::now() + limit).await,
                None => std::future::pending::<()>().await,
            }
        };
        tokio::pin!(expiry);

        // Dropping the event stream at the end of this scope aborts the upstream call.
        let mut events = model.provider.stream(completion);
        let mut fragments = 0usize;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Outcome::Abandoned,
                _ = &mut expiry => {
                    let secs = deadline.map(|d| d.as_secs()).unwrap_or_default();
                    warn!(fragments, timeout_secs = secs, "generation deadline expired");
                    return Outcome::Failed(ChatError::Timeout(secs));
                }
                event = events.next() => match event {
                    Some(Ok(StreamEvent::TextDelta { text })) => {
                        if text.is_empty() {
                            continue;
                        }
                        answer.push_str(&text);
                        fragments += 1;
                        if session.send(text).await.is_err() {
                            return Outcome::Abandoned;
                        }
                    }
                    Some(Ok(StreamEvent::Usage(reported))) => *usage = reported,
                    Some(Ok(StreamEvent::Done)) | None => {
                        debug!(fragments, "generation finished");
                        return Outcome::Finished;
                    }
                    Some(Ok(_)) => {}
                    Some(Err(e)) => {
                        return Outcome::Failed(ChatError::BackendFailure(e.to_string()));
                    }
                },
            }
        }
    }

    async fn finish_failed(&self, session: &mut StreamSession, id: &ConversationId, err: ChatError) {
        error!(conversation_id = %id, error = %err, "chat error in conversation id");
        session.fail(err.to_string()).await;
    }
}

fn record(request: &ChatRequest, role: MessageRole, content: String) -> ChatMessage {
    ChatMessage {
        id: Uuid::now_v7(),
        conversation_id: request.conversation_id.clone(),
        user_id: request.user_id.clone(),
        username: request.username.clone(),
        role,
        content,
        created_at: Utc::now(),
        model: None,
        input_tokens: None,
        output_tokens: None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, Ordering};

    use futures_util::stream;
    use langchat_types::error::RepositoryError;
    use langchat_types::llm::{
        CompletionResponse, LlmError, ProviderCapabilities, StopReason,
    };

    use crate::llm::box_provider::BoxLlmProvider;
    use crate::llm::provider::{LlmEventStream, LlmProvider};
    use crate::relay::session::RelayEvent;

    // --- in-memory store ---

    #[derive(Default)]
    struct MemStore {
        messages: Mutex<Vec<ChatMessage>>,
        fail_appends: AtomicBool,
    }

    impl MemStore {
        fn all(&self) -> Vec<ChatMessage> {
            self.messages.lock().unwrap().clone()
        }
    }

    impl ConversationStore for MemStore {
        async fn append(&self, message: &ChatMessage) -> Result<(), RepositoryError> {
            if self.fail_appends.load(Ordering::SeqCst) {
                return Err(RepositoryError::Query("disk full".to_string()));
            }
            self.messages.lock().unwrap().push(message.clone());
            Ok(())
        }

        async fn list(
            &self,
            conversation_id: &ConversationId,
            user_id: Option<&str>,
        ) -> Result<Vec<ChatMessage>, RepositoryError> {
            Ok(self
                .all()
                .into_iter()
                .filter(|m| &m.conversation_id == conversation_id)
                .filter(|m| user_id.is_none_or(|u| m.user_id == u))
                .collect())
        }

        async fn clear(&self, conversation_id: &ConversationId) -> Result<u64, RepositoryError> {
            let mut messages = self.messages.lock().unwrap();
            let before = messages.len();
            messages.retain(|m| &m.conversation_id != conversation_id);
            Ok((before - messages.len()) as u64)
        }

        async fn count(&self) -> Result<u64, RepositoryError> {
            Ok(self.messages.lock().unwrap().len() as u64)
        }
    }

    #[derive(Default)]
    struct MemApps {
        apps: Vec<App>,
    }

    impl AppRepository for MemApps {
        async fn create(&self, app: &App) -> Result<App, RepositoryError> {
            Ok(app.clone())
        }

        async fn get(&self, id: &str) -> Result<Option<App>, RepositoryError> {
            Ok(self.apps.iter().find(|a| a.id == id).cloned())
        }

        async fn list(&self) -> Result<Vec<App>, RepositoryError> {
            Ok(self.apps.clone())
        }
    }

    // --- scripted provider ---

    #[derive(Clone)]
    enum Script {
        Events(Vec<Result<StreamEvent, LlmError>>),
        /// Emit the events, then never finish.
        Hang(Vec<Result<StreamEvent, LlmError>>),
        /// Emit the events with a pause before each one.
        Paced(Vec<Result<StreamEvent, LlmError>>, Duration),
    }

    struct ScriptedProvider {
        script: Script,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
        capabilities: ProviderCapabilities,
    }

    impl LlmProvider for ScriptedProvider {
        fn name(&self) -> &str {
            "scripted"
        }

        fn capabilities(&self) -> &ProviderCapabilities {
            &self.capabilities
        }

        async fn complete(
            &self,
            _request: &CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            Ok(CompletionResponse {
                id: "x".to_string(),
                content: String::new(),
                model: "scripted".to_string(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }

        fn stream(&self, request: CompletionRequest) -> LlmEventStream {
            self.seen.lock().unwrap().push(request);
            match self.script.clone() {
                Script::Events(events) => Box::pin(stream::iter(events)),
                Script::Hang(events) => {
                    Box::pin(stream::iter(events).chain(stream::pending()))
                }
                Script::Paced(events, pause) => {
                    Box::pin(stream::iter(events).then(move |event| async move {
                        tokio::time::sleep(pause).await;
                        event
                    }))
                }
            }
        }
    }

    fn text(t: &str) -> Result<StreamEvent, LlmError> {
        Ok(StreamEvent::TextDelta {
            text: t.to_string(),
        })
    }

    struct Harness {
        relay: ChatRelay<MemStore, MemApps>,
        store: Arc<MemStore>,
        memory: Arc<MemoryCache>,
        seen: Arc<Mutex<Vec<CompletionRequest>>>,
    }

    fn harness(script: Script, apps: Vec<App>, timeout: Option<Duration>) -> Harness {
        let store = Arc::new(MemStore::default());
        let memory = Arc::new(MemoryCache::new(10));
        let seen = Arc::new(Mutex::new(Vec::new()));
        let mut registry = ProviderRegistry::new();
        registry.register_chat(ChatModel {
            id: "m1".to_string(),
            model: "vendor-model".to_string(),
            temperature: Some(0.2),
            max_tokens: None,
            provider: Arc::new(BoxLlmProvider::new(ScriptedProvider {
                script,
                seen: Arc::clone(&seen),
                capabilities: ProviderCapabilities {
                    streaming: true,
                    vision: false,
                    max_context_tokens: 8_192,
                    max_output_tokens: 1_024,
                },
            })),
        });
        let relay = ChatRelay::new(
            Arc::clone(&store),
            Arc::new(MemApps { apps }),
            Arc::clone(&memory),
            Arc::new(registry),
            RelaySettings {
                turn_timeout: timeout,
                channel_capacity: 4,
            },
        );
        Harness {
            relay,
            store,
            memory,
            seen,
        }
    }

    fn request(conversation: &str, message: &str) -> ChatRequest {
        ChatRequest {
            conversation_id: ConversationId::from(conversation),
            user_id: "u-1".to_string(),
            username: Some("alice".to_string()),
            message: message.to_string(),
            model_id: None,
            app_id: None,
        }
    }

    fn helper_app() -> App {
        App {
            id: "app-1".to_string(),
            name: "Helper".to_string(),
            description: None,
            prompt: Some("You are a helper".to_string()),
            model_id: None,
            created_at: Utc::now(),
        }
    }

    /// Wait for every relay task to give its conversation lock back.
    async fn turns_released(memory: &MemoryCache) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while memory.active_turns() > 0 {
                tokio::task::yield_now().await;
            }
        })
        .await
        .expect("turn lock was never released");
    }

    async fn collect(stream: RelayStream) -> Vec<RelayEvent> {
        tokio::time::timeout(Duration::from_secs(5), stream.collect::<Vec<_>>())
            .await
            .expect("stream did not terminate")
    }

    #[tokio::test]
    async fn successful_turn_streams_in_order_and_persists() {
        let usage = Usage {
            input_tokens: 7,
            output_tokens: 3,
        };
        let h = harness(
            Script::Events(vec![
                Ok(StreamEvent::Connected),
                text("Hel"),
                text("lo"),
                text("!"),
                Ok(StreamEvent::Usage(usage.clone())),
                Ok(StreamEvent::Done),
            ]),
            vec![],
            None,
        );

        let stream = h.relay.start(request("c-1", "hi")).await.unwrap();
        let events = collect(stream).await;

        assert_eq!(
            events,
            vec![
                RelayEvent::Fragment("Hel".to_string()),
                RelayEvent::Fragment("lo".to_string()),
                RelayEvent::Fragment("!".to_string()),
                RelayEvent::Completed {
                    usage: usage.clone()
                },
            ]
        );

        let stored = h.store.all();
        assert_eq!(stored.len(), 2);
        assert_eq!(stored[0].role, MessageRole::User);
        assert_eq!(stored[0].content, "hi");
        assert_eq!(stored[1].role, MessageRole::Assistant);
        assert_eq!(stored[1].content, "Hello!");
        assert_eq!(stored[1].model.as_deref(), Some("m1"));
        assert_eq!(stored[1].output_tokens, Some(3));

        assert_eq!(
            h.memory.get(&ConversationId::from("c-1")),
            vec![Message::user("hi"), Message::assistant("Hello!")]
        );
        turns_released(&h.memory).await;
    }

    #[tokio::test]
    async fn backend_failure_keeps_user_message_only() {
        let h = harness(
            Script::Events(vec![
                text("a"),
                text("b"),
                text("c"),
                Err(LlmError::Stream("connection reset".to_string())),
            ]),
            vec![],
            None,
        );

        let stream = h.relay.start(request("c-1", "hi")).await.unwrap();
        let events = collect(stream).await;

        assert_eq!(events.len(), 4);
        assert!(
            matches!(&events[3], RelayEvent::Failed { message } if message.contains("connection reset"))
        );
        assert_eq!(events.iter().filter(|e| e.is_terminal()).count(), 1);

        let stored = h.store.all();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].role, MessageRole::User);
        assert!(h.memory.get(&ConversationId::from("c-1")).is_empty());
    }

    #[tokio::test]
    async fn invalid_requests_are_rejected_before_streaming() {
        let h = harness(Script::Events(vec![]), vec![], None);

        let err = h.relay.start(request("  ", "hi")).await.err().unwrap();
        assert!(matches!(err, ChatError::InvalidRequest(_)));

        let err = h.relay.start(request("c-1", "")).await.err().unwrap();
        assert!(matches!(err, ChatError::InvalidRequest(_)));

        let mut unknown = request("c-1", "hi");
        unknown.model_id = Some("nope".to_string());
        let err = h.relay.start(unknown).await.err().unwrap();
        assert!(matches!(err, ChatError::InvalidRequest(m) if m.contains("nope")));

        let mut missing_app = request("c-1", "hi");
        missing_app.app_id = Some("ghost".to_string());
        let err = h.relay.start(missing_app).await.err().unwrap();
        assert!(matches!(err, ChatError::NotFound(_)));

        assert!(h.store.all().is_empty());
        assert!(h.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn timeout_fails_stream_without_assistant_message() {
        let h = harness(
            Script::Hang(vec![text("slow")]),
            vec![],
            Some(Duration::from_millis(50)),
        );

        let stream = h.relay.start(request("c-1", "hi")).await.unwrap();
        let events = collect(stream).await;

        assert_eq!(events[0], RelayEvent::Fragment("slow".to_string()));
        assert!(matches!(&events[1], RelayEvent::Failed { message } if message.contains("timed out")));
        assert_eq!(h.store.all().len(), 1);
    }

    #[tokio::test]
    async fn user_persist_failure_prevents_generation() {
        let h = harness(Script::Events(vec![text("never")]), vec![], None);
        h.store.fail_appends.store(true, Ordering::SeqCst);

        let stream = h.relay.start(request("c-1", "hi")).await.unwrap();
        let events = collect(stream).await;

        assert_eq!(events.len(), 1);
        assert!(matches!(&events[0], RelayEvent::Failed { message } if message.contains("disk full")));
        assert!(h.seen.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn app_prompt_and_history_seed_the_request() {
        let h = harness(
            Script::Events(vec![text("ok"), Ok(StreamEvent::Done)]),
            vec![helper_app()],
            None,
        );
        let conv = ConversationId::from("c-9");
        h.store
            .append(&record(&request("c-9", "earlier"), MessageRole::User, "earlier".to_string()))
            .await
            .unwrap();

        let mut req = request("c-9", "now");
        req.app_id = Some("app-1".to_string());
        let stream = h.relay.start(req).await.unwrap();
        collect(stream).await;

        let seen = h.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "vendor-model");
        assert_eq!(
            seen[0].messages,
            vec![
                Message::system("You are a helper"),
                Message::user("earlier"),
                Message::user("now"),
            ]
        );
        drop(seen);

        assert_eq!(h.memory.get(&conv).len(), 4);
    }

    #[tokio::test]
    async fn client_disconnect_cancels_generation() {
        let h = harness(Script::Hang(vec![text("first")]), vec![], None);

        let mut stream = h.relay.start(request("c-1", "hi")).await.unwrap();
        let first = stream.next().await;
        assert_eq!(first, Some(RelayEvent::Fragment("first".to_string())));
        drop(stream);

        // The turn lock is released once the relay observes the cancellation.
        let guard = tokio::time::timeout(
            Duration::from_secs(2),
            h.memory.begin_turn(&ConversationId::from("c-1")),
        )
        .await;
        assert!(guard.is_ok());
        assert_eq!(h.store.all().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn turns_on_one_conversation_are_serialized() {
        let h = harness(
            Script::Paced(
                vec![text("r"), text("s"), Ok(StreamEvent::Done)],
                Duration::from_millis(30),
            ),
            vec![],
            None,
        );

        let first = h.relay.start(request("c-1", "one")).await.unwrap();
        let second = h.relay.start(request("c-1", "two")).await.unwrap();
        tokio::join!(collect(first), collect(second));

        let roles: Vec<MessageRole> = h.store.all().iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![
                MessageRole::User,
                MessageRole::Assistant,
                MessageRole::User,
                MessageRole::Assistant,
            ]
        );
        assert_eq!(h.memory.get(&ConversationId::from("c-1")).len(), 4);

        // The second turn only started once the first one was in memory.
        let seen = h.seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[1].messages.len(), 3);
        assert_eq!(seen[1].messages[0], seen[0].messages[0]);
        assert_eq!(seen[1].messages[1], Message::assistant("rs"));
        drop(seen);
        turns_released(&h.memory).await;
    }
}
