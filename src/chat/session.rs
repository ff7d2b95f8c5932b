//! Core chat session management.
//!
//! [`TutorSession`] ties the conversation store to a model gateway and turns
//! each user action into one atomic state transition: append the question,
//! ask the model with the full history, append the reply.  A failed
//! generation rolls the question back so the history never keeps an orphaned
//! question with no answer.

use crate::chat::config::ChatConfig;
use crate::client::ChatModel;
use crate::error::{Error, Result};
use crate::store::ConversationStore;
use crate::types::{Message, Role};

/// A chat session binding one student's conversation store to a gateway.
pub struct TutorSession<G: ChatModel> {
    gateway: G,
    store: ConversationStore,
    config: ChatConfig,
    student_id: String,
    request_count: u64,
}

/// The result of one successful user turn.
#[derive(Debug, Clone)]
pub struct TurnOutcome {
    /// The generated assistant reply.
    pub reply: String,

    /// Set when the turn succeeded but persisting the history failed; the
    /// messages are retained in memory and the caller should surface the
    /// data-loss risk.
    pub persist_warning: Option<Error>,
}

/// Aggregated stats for a chat session.
#[derive(Debug, Clone)]
pub struct SessionStats {
    /// The model used for the session.
    pub model: String,

    /// The sampling temperature.
    pub temperature: f32,

    /// The number of messages in the history, system message included.
    pub message_count: usize,

    /// The student identifier bound to this session.
    pub student_id: String,

    /// Total number of gateway requests made.
    pub total_requests: u64,
}

impl<G: ChatModel> TutorSession<G> {
    /// Creates a new session over an already-constructed store and gateway.
    pub fn new(
        gateway: G,
        store: ConversationStore,
        config: ChatConfig,
        student_id: impl Into<String>,
    ) -> Self {
        Self {
            gateway,
            store,
            config,
            student_id: student_id.into(),
            request_count: 0,
        }
    }

    /// Loads or seeds the persisted history.  See
    /// [`ConversationStore::initialize_session`].
    pub fn initialize_session(&mut self) -> Result<()> {
        self.store.initialize_session()
    }

    /// Sends a user message and returns the assistant reply.
    ///
    /// This method:
    /// 1. Appends the user message to the history (persisting it)
    /// 2. Sends the full ordered history to the gateway
    /// 3. Appends the assistant reply (persisting it)
    ///
    /// # Errors
    ///
    /// Returns the gateway error when generation fails; in that case the
    /// optimistically appended user message is rolled back from memory and
    /// disk, so the history length is unchanged from before the call.  When
    /// persisting that rollback fails too, the gateway error is still the
    /// one returned: the in-memory history is trimmed regardless, but the
    /// orphaned question may remain in the history file until the next
    /// successful write.
    /// History-write failures during the turn do not abort it; they are
    /// reported through [`TurnOutcome::persist_warning`].
    pub async fn send(&mut self, user_input: &str) -> Result<TurnOutcome> {
        let mut persist_warning = self.store.add_message(Role::User, user_input).err();

        self.request_count += 1;
        let outcome = self
            .gateway
            .generate_response(
                self.store.messages(),
                &self.config.model,
                self.config.temperature,
            )
            .await;

        match outcome {
            Ok(reply) => {
                if let Some(warning) = self.store.add_message(Role::Assistant, reply.as_str()).err() {
                    persist_warning = Some(warning);
                }
                Ok(TurnOutcome {
                    reply,
                    persist_warning,
                })
            }
            Err(err) => {
                // The gateway error takes precedence.  rollback_last trims
                // the in-memory history even when its write fails; the
                // orphaned question then stays on disk until the next
                // successful save.
                let _ = self.store.rollback_last();
                Err(err)
            }
        }
    }

    /// Clears the conversation history down to the system message.
    pub fn clear(&mut self) -> Result<()> {
        self.store.clear_history()
    }

    /// Exports the conversation.  See
    /// [`ConversationStore::export_conversation`].
    pub fn export(&self, format: &str) -> Result<String> {
        self.store.export_conversation(format)
    }

    /// Returns the history without the system message.
    pub fn display_messages(&self) -> Vec<&Message> {
        self.store.display_messages()
    }

    /// Returns true when the session has conversation content beyond the
    /// system message.
    pub fn has_conversation(&self) -> bool {
        self.store.len() > 1
    }

    /// Returns the student identifier bound to this session.
    pub fn student_id(&self) -> &str {
        &self.student_id
    }

    /// Returns the current session statistics snapshot.
    pub fn stats(&self) -> SessionStats {
        SessionStats {
            model: self.config.model.clone(),
            temperature: self.config.temperature,
            message_count: self.store.len(),
            student_id: self.student_id.clone(),
            total_requests: self.request_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prompts;
    use async_trait::async_trait;
    use std::fs;
    use std::path::{Path, PathBuf};
    use std::sync::Mutex;
    use std::time::{SystemTime, UNIX_EPOCH};

    fn temp_history_path(prefix: &str) -> PathBuf {
        let nanos = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .expect("time should be monotonic")
            .as_nanos();
        std::env::temp_dir()
            .join(format!(
                "edulingo_session_{prefix}_{}_{}",
                std::process::id(),
                nanos
            ))
            .join("history")
            .join("student001.json")
    }

    fn cleanup(path: &Path) {
        if let Some(dir) = path.parent().and_then(Path::parent) {
            let _ = fs::remove_dir_all(dir);
        }
    }

    fn session_over<G: ChatModel>(gateway: G, prefix: &str) -> TutorSession<G> {
        let store = ConversationStore::new(temp_history_path(prefix), prompts::system_prompt());
        let mut session = TutorSession::new(gateway, store, ChatConfig::new(), "student001");
        session.initialize_session().expect("seed should persist");
        session
    }

    /// Records what it was asked and answers with a fixed reply.
    struct RecordingModel {
        seen: Mutex<Vec<Vec<Message>>>,
        reply: String,
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn generate_response(
            &self,
            messages: &[Message],
            _model: &str,
            _temperature: f32,
        ) -> Result<String> {
            self.seen.lock().unwrap().push(messages.to_vec());
            Ok(self.reply.clone())
        }
    }

    struct FailingModel(Error);

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn generate_response(
            &self,
            _messages: &[Message],
            _model: &str,
            _temperature: f32,
        ) -> Result<String> {
            Err(self.0.clone())
        }
    }

    #[tokio::test]
    async fn successful_turn_appends_question_and_reply() {
        let gateway = RecordingModel {
            seen: Mutex::new(Vec::new()),
            reply: "现在完成时表示过去发生并持续到现在的动作。".to_string(),
        };
        let mut session = session_over(gateway, "ok_turn");
        let before = session.stats().message_count;

        let outcome = session
            .send("What is the present perfect?")
            .await
            .expect("turn should succeed");
        assert_eq!(outcome.reply, "现在完成时表示过去发生并持续到现在的动作。");
        assert!(outcome.persist_warning.is_none());
        assert_eq!(session.stats().message_count, before + 2);

        let display = session.display_messages();
        assert_eq!(display[display.len() - 2].role, Role::User);
        assert_eq!(display[display.len() - 1].role, Role::Assistant);

        let path = session.store.path().to_path_buf();
        cleanup(&path);
    }

    #[tokio::test]
    async fn gateway_sees_full_history_system_message_first() {
        let gateway = RecordingModel {
            seen: Mutex::new(Vec::new()),
            reply: "ok".to_string(),
        };
        let mut session = session_over(gateway, "full_history");
        session.send("first question").await.unwrap();
        session.send("second question").await.unwrap();

        let seen = session.gateway.seen.lock().unwrap();
        let last = seen.last().unwrap();
        assert_eq!(last[0].role, Role::System);
        assert_eq!(last.last().unwrap(), &Message::user("second question"));
        // Second request carries the first exchange too.
        assert_eq!(last.len(), 4);
        drop(seen);

        let path = session.store.path().to_path_buf();
        cleanup(&path);
    }

    #[tokio::test]
    async fn failed_generation_rolls_back_the_user_message() {
        let mut session = session_over(
            FailingModel(Error::rate_limit("slow down", Some(5))),
            "rollback",
        );
        session.store.add_message(Role::User, "q1").unwrap();
        session.store.add_message(Role::Assistant, "a1").unwrap();
        let before = session.stats().message_count;
        let on_disk_before = fs::read(session.store.path()).unwrap();

        let err = session.send("doomed question").await.unwrap_err();
        assert!(err.is_rate_limit());

        // Unchanged in memory and on disk.
        assert_eq!(session.stats().message_count, before);
        assert_eq!(fs::read(session.store.path()).unwrap(), on_disk_before);

        let path = session.store.path().to_path_buf();
        cleanup(&path);
    }

    #[tokio::test]
    async fn failed_rollback_write_still_trims_memory() {
        let mut session = session_over(
            FailingModel(Error::connection("connection refused", None)),
            "rollback_disk",
        );
        let before = session.stats().message_count;

        // Swap the history directory for a regular file so every save from
        // here on fails, including the rollback write.
        let history_dir = session.store.path().parent().unwrap().to_path_buf();
        fs::remove_dir_all(&history_dir).unwrap();
        fs::write(&history_dir, "not a directory").unwrap();

        let err = session.send("doomed question").await.unwrap_err();
        assert!(err.is_connection());
        assert_eq!(session.stats().message_count, before);

        let path = session.store.path().to_path_buf();
        cleanup(&path);
    }

    #[tokio::test]
    async fn clear_and_export_delegate_to_the_store() {
        let gateway = RecordingModel {
            seen: Mutex::new(Vec::new()),
            reply: "an answer".to_string(),
        };
        let mut session = session_over(gateway, "delegate");
        session.send("a question").await.unwrap();
        assert!(session.has_conversation());

        let txt = session.export("txt").unwrap();
        assert!(txt.contains("【学生】: a question"));

        session.clear().expect("clear should persist");
        assert!(!session.has_conversation());
        assert_eq!(session.stats().message_count, 1);

        let path = session.store.path().to_path_buf();
        cleanup(&path);
    }

    #[test]
    fn stats_track_requests_and_identity() {
        let gateway = RecordingModel {
            seen: Mutex::new(Vec::new()),
            reply: "ok".to_string(),
        };
        let mut session = session_over(gateway, "stats");
        tokio_test::block_on(async {
            session.send("one").await.unwrap();
            session.send("two").await.unwrap();
        });

        let stats = session.stats();
        assert_eq!(stats.total_requests, 2);
        assert_eq!(stats.student_id, "student001");
        assert_eq!(stats.model, "gpt-4o");

        let path = session.store.path().to_path_buf();
        cleanup(&path);
    }
}
