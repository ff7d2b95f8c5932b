//! Conversation state and its on-disk mirror.
//!
//! [`ConversationStore`] is the single source of truth for the session
//! history: an ordered message list whose first element is always the one
//! system message.  Every mutation rewrites the whole history file.
//!
//! The store assumes a single active session per student identifier.  Two
//! processes sharing a history file are last-writer-wins; no cross-process
//! locking is attempted.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::observability::{STORE_LOADS, STORE_LOAD_ERRORS, STORE_SAVES, STORE_SAVE_ERRORS};
use crate::types::{ExportFormat, Message, Role};

/// Owns the in-memory session history and mediates every read and write of
/// the persisted history file.
pub struct ConversationStore {
    path: PathBuf,
    system_prompt: Message,
    messages: Vec<Message>,
}

impl ConversationStore {
    /// Creates a store for the given history file, seeded in memory with the
    /// system message.  Nothing touches the disk until
    /// [`initialize_session`](Self::initialize_session) or a mutation runs.
    pub fn new<P: Into<PathBuf>>(path: P, system_prompt: Message) -> Self {
        let messages = vec![system_prompt.clone()];
        Self {
            path: path.into(),
            system_prompt,
            messages,
        }
    }

    /// Loads the persisted history, or seeds and persists a fresh one.
    ///
    /// An absent, unreadable, or empty history file is treated as "no
    /// history": the session falls back to `[system message]` and persists
    /// it immediately.  Read failures are never propagated.  Calling this
    /// twice without an intervening mutation yields equal histories.
    ///
    /// # Errors
    ///
    /// Returns [`Error::HistoryWrite`] when persisting the fresh seed fails;
    /// the in-memory history is seeded regardless, so the session remains
    /// usable.
    pub fn initialize_session(&mut self) -> Result<()> {
        match self.load() {
            Ok(messages) if !messages.is_empty() => {
                self.messages = messages;
                Ok(())
            }
            Ok(_) | Err(_) => {
                self.messages = vec![self.system_prompt.clone()];
                self.save()
            }
        }
    }

    /// Appends a message and persists the full updated history.
    ///
    /// The store owns the single system message, so `Role::System` is
    /// rejected with [`Error::InvalidRole`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::HistoryWrite`] when the disk write fails.  The
    /// message is retained in memory either way, so callers can keep the
    /// session going while surfacing the data-loss risk.
    pub fn add_message(&mut self, role: Role, content: impl Into<String>) -> Result<()> {
        if role == Role::System {
            return Err(Error::invalid_role(role.as_str()));
        }
        self.messages.push(Message::new(role, content));
        self.save()
    }

    /// Discards all messages except a newly constructed system message and
    /// persists the single-message history.  Irreversible.
    pub fn clear_history(&mut self) -> Result<()> {
        self.messages = vec![self.system_prompt.clone()];
        self.save()
    }

    /// Removes the most recent non-system message and persists the result.
    ///
    /// Used to undo an optimistically appended user message after a failed
    /// generation, so the history never keeps an orphaned question.  Returns
    /// the removed message, or `None` when only the system message remains.
    pub fn rollback_last(&mut self) -> Result<Option<Message>> {
        if self.messages.len() <= 1 {
            return Ok(None);
        }
        let removed = self.messages.pop();
        self.save()?;
        Ok(removed)
    }

    /// Renders the conversation for export.  `"json"` yields the full
    /// history as pretty-printed JSON, system message included; `"txt"`
    /// yields one `【label】: content` block per non-system message, blocks
    /// separated by a blank line.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedFormat`] for any other format value, with
    /// no side effect and no partial output.
    pub fn export_conversation(&self, format: &str) -> Result<String> {
        match format.parse::<ExportFormat>()? {
            ExportFormat::Json => serde_json::to_string_pretty(&self.messages)
                .map_err(|err| Error::unknown(format!("failed to serialize history: {err}"))),
            ExportFormat::Txt => {
                let blocks: Vec<String> = self
                    .display_messages()
                    .into_iter()
                    .map(|msg| format!("【{}】: {}\n", msg.role.display_label(), msg.content))
                    .collect();
                Ok(blocks.join("\n"))
            }
        }
    }

    /// Returns the history without the system message, order preserved.
    /// Pure read view; mutates and persists nothing.
    pub fn display_messages(&self) -> Vec<&Message> {
        self.messages
            .iter()
            .filter(|msg| msg.role != Role::System)
            .collect()
    }

    /// Returns the full ordered history, system message first.
    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    /// Returns the number of messages in the history.
    pub fn len(&self) -> usize {
        self.messages.len()
    }

    /// The history always contains at least the system message.
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Returns the path of the history file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<Message>> {
        STORE_LOADS.click();
        let data = fs::read(&self.path).map_err(|err| {
            STORE_LOAD_ERRORS.click();
            Error::history_read(
                format!("failed to read {}: {err}", self.path.display()),
                Some(Box::new(err)),
            )
        })?;
        serde_json::from_slice(&data).map_err(|err| {
            STORE_LOAD_ERRORS.click();
            Error::history_read(
                format!("failed to parse {}: {err}", self.path.display()),
                Some(Box::new(err)),
            )
        })
    }

    fn save(&self) -> Result<()> {
        STORE_SAVES.click();
        self.save_inner().inspect_err(|_| {
            STORE_SAVE_ERRORS.click();
        })
    }

    fn save_inner(&self) -> Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent).map_err(|err| {
                Error::history_write(
                    format!("failed to create {}: {err}", parent.display()),
                    Some(Box::new(err)),
                )
            })?;
        }

        let bytes = serde_json::to_vec_pretty(&self.messages)
            .map_err(|err| Error::history_write(err.to_string(), Some(Box::new(err))))?;

        let tmp_path = self.path.with_extension("json.tmp");
        fs::write(&tmp_path, bytes).map_err(|err| {
            Error::history_write(
                format!("failed to write {}: {err}", tmp_path.display()),
                Some(Box::new(err)),
            )
        })?;
        match fs::rename(&tmp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(rename_err) => {
                // Some platforms refuse to rename over an existing file.
                if self.path.exists() {
                    fs::remove_file(&self.path)
                        .and_then(|_| fs::rename(&tmp_path, &self.path))
                        .map_err(|err| {
                            Error::history_write(
                                format!("failed to replace {}: {err}", self.path.display()),
                                Some(Box::new(err)),
                            )
                        })
                } else {
                    Err(Error::history_write(
                        format!("failed to rename {}: {rename_err}", tmp_path.display()),
                        Some(Box::new(rename_err)),
                    ))
                }
            }
        }
    }
}
