// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Single-line input for prompt sessions.
//!
//! The UI loop owns the terminal event stream and forwards key events here
//! while a prompt is open. `read_line` runs on the prompt thread and blocks
//! until the line is submitted or cancelled; the render path reads the live
//! buffer through `live`.

use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::action::Channels;
use crate::error::{Error, Result};

/// Result of one blocking read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ReadOutcome {
    pub input: String,
    pub cancelled: bool,
}

impl ReadOutcome {
    pub(crate) fn submitted(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            cancelled: false,
        }
    }

    pub(crate) fn cancelled() -> Self {
        Self {
            input: String::new(),
            cancelled: true,
        }
    }
}

/// The line being edited, as seen by the renderer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LiveLine {
    pub framing: String,
    pub input: String,
    /// Byte offset of the edit point in `input`
    pub point: usize,
}

pub(crate) trait LineReader: Send + Sync {
    /// Block until the user submits or cancels a line framed by `framing`.
    fn read_line(&self, framing: &str) -> Result<ReadOutcome>;

    /// The line currently being edited, if a read is in progress.
    fn live(&self) -> Option<LiveLine>;

    /// Called when a prompt opens, before its read starts. Input and
    /// cancellations left over from an earlier session are discarded.
    fn prepare(&self) {}

    /// Abandon the current read as if the user cancelled it. Called after a
    /// prompt was opened, so a read that has not started yet is cancelled
    /// as soon as it starts.
    fn cancel(&self) {}
}

/// Find the previous character boundary at or before the given byte offset
fn prev_char_boundary(text: &str, byte_offset: usize) -> usize {
    if byte_offset == 0 || text.is_empty() {
        return 0;
    }
    let offset = byte_offset.min(text.len());
    text[..offset]
        .char_indices()
        .last()
        .map(|(i, _)| i)
        .unwrap_or(0)
}

/// Find the next character boundary after the given byte offset
fn next_char_boundary(text: &str, byte_offset: usize) -> usize {
    if text.is_empty() || byte_offset >= text.len() {
        return text.len();
    }
    text.char_indices()
        .find(|(i, _)| *i > byte_offset)
        .map(|(i, _)| i)
        .unwrap_or(text.len())
}

enum Edit {
    Continue,
    Submit,
    Cancel,
}

/// Editing buffer with a byte edit point kept on character boundaries.
#[derive(Debug, Clone, Default)]
struct LineBuffer {
    text: String,
    point: usize,
}

impl LineBuffer {
    fn insert(&mut self, ch: char) {
        self.text.insert(self.point, ch);
        self.point += ch.len_utf8();
    }

    fn backspace(&mut self) {
        if self.point == 0 {
            return;
        }
        let start = prev_char_boundary(&self.text, self.point);
        self.text.replace_range(start..self.point, "");
        self.point = start;
    }

    fn delete(&mut self) {
        if self.point >= self.text.len() {
            return;
        }
        let end = next_char_boundary(&self.text, self.point);
        self.text.replace_range(self.point..end, "");
    }

    fn kill_to_start(&mut self) {
        self.text.replace_range(..self.point, "");
        self.point = 0;
    }

    fn apply(&mut self, key: KeyEvent) -> Edit {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        match key.code {
            KeyCode::Enter => return Edit::Submit,
            KeyCode::Esc => return Edit::Cancel,
            KeyCode::Char('c') | KeyCode::Char('g') if ctrl => return Edit::Cancel,
            KeyCode::Char('a') if ctrl => self.point = 0,
            KeyCode::Char('e') if ctrl => self.point = self.text.len(),
            KeyCode::Char('u') if ctrl => self.kill_to_start(),
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char(ch) => self.insert(ch),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Delete => self.delete(),
            KeyCode::Left => self.point = prev_char_boundary(&self.text, self.point),
            KeyCode::Right => self.point = next_char_boundary(&self.text, self.point),
            KeyCode::Home => self.point = 0,
            KeyCode::End => self.point = self.text.len(),
            _ => {}
        }
        Edit::Continue
    }
}

struct Session {
    framing: String,
    buffer: LineBuffer,
    cancelled: bool,
}

/// `LineReader` fed with key events from the UI loop.
pub(crate) struct TerminalReader {
    keys: Mutex<Receiver<KeyEvent>>,
    interrupt: Sender<KeyEvent>,
    session: Mutex<Option<Session>>,
    /// Only read or written while holding `session`
    cancel_pending: AtomicBool,
    channels: Arc<dyn Channels>,
}

impl TerminalReader {
    /// Create a reader and the sender the UI loop forwards keys into.
    pub(crate) fn new(channels: Arc<dyn Channels>) -> (Self, Sender<KeyEvent>) {
        let (tx, rx) = mpsc::channel();
        let reader = Self {
            keys: Mutex::new(rx),
            interrupt: tx.clone(),
            session: Mutex::new(None),
            cancel_pending: AtomicBool::new(false),
            channels,
        };
        (reader, tx)
    }

    fn session(&self) -> MutexGuard<'_, Option<Session>> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn collect(&self, keys: &Receiver<KeyEvent>) -> Result<ReadOutcome> {
        loop {
            let key = keys.recv().map_err(|_| {
                Error::Io(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "key input closed",
                ))
            })?;
            if key.kind == KeyEventKind::Release {
                continue;
            }

            let edit = {
                let mut session = self.session();
                let Some(session) = session.as_mut() else {
                    return Ok(ReadOutcome::cancelled());
                };
                if session.cancelled {
                    return Ok(ReadOutcome::cancelled());
                }
                match session.buffer.apply(key) {
                    Edit::Submit => Some(ReadOutcome::submitted(session.buffer.text.clone())),
                    Edit::Cancel => Some(ReadOutcome::cancelled()),
                    Edit::Continue => None,
                }
            };

            match edit {
                Some(outcome) => return Ok(outcome),
                None => self.channels.update_display(),
            }
        }
    }
}

impl LineReader for TerminalReader {
    fn read_line(&self, framing: &str) -> Result<ReadOutcome> {
        let keys = self
            .keys
            .lock()
            .map_err(|_| Error::Command("line reader is unavailable".to_string()))?;

        {
            let mut session = self.session();
            if self.cancel_pending.swap(false, Ordering::SeqCst) {
                return Ok(ReadOutcome::cancelled());
            }
            *session = Some(Session {
                framing: framing.to_string(),
                buffer: LineBuffer::default(),
                cancelled: false,
            });
        }
        let outcome = self.collect(&keys);

        let mut session = self.session();
        *session = None;
        self.cancel_pending.store(false, Ordering::SeqCst);
        outcome
    }

    fn prepare(&self) {
        // A read still holding the receiver owns what is queued
        if let Ok(keys) = self.keys.try_lock() {
            let stale = keys.try_iter().count();
            if stale > 0 {
                tracing::debug!(stale, "dropped keys queued before the prompt opened");
            }
        }
        let _session = self.session();
        self.cancel_pending.store(false, Ordering::SeqCst);
    }

    fn live(&self) -> Option<LiveLine> {
        self.session().as_ref().map(|session| LiveLine {
            framing: session.framing.clone(),
            input: session.buffer.text.clone(),
            point: session.buffer.point,
        })
    }

    fn cancel(&self) {
        let mut session = self.session();
        if let Some(session) = session.as_mut() {
            session.cancelled = true;
            // Wakes the reader; a leftover copy is dropped by the next `prepare`
            let _ = self
                .interrupt
                .send(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE));
        } else {
            self.cancel_pending.store(true, Ordering::SeqCst);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::testing::RecordingChannels;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    fn ctrl(ch: char) -> KeyEvent {
        KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL)
    }

    fn type_str(buffer: &mut LineBuffer, text: &str) {
        for ch in text.chars() {
            buffer.apply(key(KeyCode::Char(ch)));
        }
    }

    #[test]
    fn test_char_boundaries() {
        let text = "aé中";
        assert_eq!(prev_char_boundary(text, 3), 1);
        assert_eq!(prev_char_boundary(text, 6), 3);
        assert_eq!(prev_char_boundary(text, 0), 0);
        assert_eq!(next_char_boundary(text, 1), 3);
        assert_eq!(next_char_boundary(text, 3), 6);
        assert_eq!(next_char_boundary(text, 6), 6);
    }

    #[test]
    fn test_insert_and_move_with_multibyte_chars() {
        let mut buffer = LineBuffer::default();
        type_str(&mut buffer, "a中b");
        assert_eq!(buffer.point, 5);

        buffer.apply(key(KeyCode::Left));
        assert_eq!(buffer.point, 4);
        buffer.apply(key(KeyCode::Left));
        assert_eq!(buffer.point, 1);
        assert!(buffer.text.is_char_boundary(buffer.point));

        buffer.apply(key(KeyCode::Char('é')));
        assert_eq!(buffer.text, "aé中b");
        assert_eq!(buffer.point, 3);
    }

    #[test]
    fn test_backspace_and_delete() {
        let mut buffer = LineBuffer::default();
        type_str(&mut buffer, "x😀y");
        buffer.apply(key(KeyCode::Left));
        buffer.apply(key(KeyCode::Backspace));
        assert_eq!(buffer.text, "xy");
        assert_eq!(buffer.point, 1);

        buffer.apply(key(KeyCode::Home));
        buffer.apply(key(KeyCode::Delete));
        assert_eq!(buffer.text, "y");
        assert_eq!(buffer.point, 0);

        buffer.apply(key(KeyCode::Backspace));
        assert_eq!(buffer.text, "y");
    }

    #[test]
    fn test_kill_to_start() {
        let mut buffer = LineBuffer::default();
        type_str(&mut buffer, "hello world");
        buffer.point = 6;
        buffer.apply(ctrl('u'));
        assert_eq!(buffer.text, "world");
        assert_eq!(buffer.point, 0);
        buffer.apply(ctrl('e'));
        assert_eq!(buffer.point, 5);
    }

    #[test]
    fn test_read_line_submits() {
        let channels = Arc::new(RecordingChannels::default());
        let (reader, keys) = TerminalReader::new(channels.clone());
        for ch in "foo".chars() {
            keys.send(key(KeyCode::Char(ch))).unwrap();
        }
        keys.send(key(KeyCode::Enter)).unwrap();

        let outcome = reader.read_line("/").unwrap();
        assert_eq!(outcome, ReadOutcome::submitted("foo"));
        assert!(reader.live().is_none());
        assert_eq!(channels.redraws(), 3);
    }

    #[test]
    fn test_read_line_cancels() {
        let (reader, keys) = TerminalReader::new(Arc::new(RecordingChannels::default()));
        keys.send(key(KeyCode::Char('x'))).unwrap();
        keys.send(ctrl('c')).unwrap();
        assert_eq!(reader.read_line(":").unwrap(), ReadOutcome::cancelled());

        keys.send(key(KeyCode::Esc)).unwrap();
        assert_eq!(reader.read_line(":").unwrap(), ReadOutcome::cancelled());
    }

    #[test]
    fn test_cancel_before_read_starts() {
        let (reader, keys) = TerminalReader::new(Arc::new(RecordingChannels::default()));
        reader.prepare();
        reader.cancel();
        assert_eq!(reader.read_line(":").unwrap(), ReadOutcome::cancelled());

        // Only the next read is affected
        keys.send(key(KeyCode::Char('a'))).unwrap();
        keys.send(key(KeyCode::Enter)).unwrap();
        assert_eq!(reader.read_line(":").unwrap(), ReadOutcome::submitted("a"));
    }

    #[test]
    fn test_cancel_interrupts_read() {
        let (reader, keys) = TerminalReader::new(Arc::new(RecordingChannels::default()));
        let reader = Arc::new(reader);
        let worker = {
            let reader = reader.clone();
            std::thread::spawn(move || reader.read_line("/"))
        };
        keys.send(key(KeyCode::Char('x'))).unwrap();
        while reader.live().is_none_or(|live| live.input.is_empty()) {
            std::thread::yield_now();
        }
        reader.cancel();
        assert_eq!(worker.join().unwrap().unwrap(), ReadOutcome::cancelled());
    }

    #[test]
    fn test_late_cancel_and_keys_do_not_reach_next_read() {
        let (reader, keys) = TerminalReader::new(Arc::new(RecordingChannels::default()));
        let reader = Arc::new(reader);
        reader.prepare();
        let worker = {
            let reader = reader.clone();
            std::thread::spawn(move || reader.read_line("/"))
        };
        keys.send(key(KeyCode::Char('a'))).unwrap();
        keys.send(key(KeyCode::Enter)).unwrap();
        assert_eq!(worker.join().unwrap().unwrap(), ReadOutcome::submitted("a"));

        // Focus lost after Enter, with an interrupt and a typed key still
        // queued behind it
        reader.cancel();
        keys.send(key(KeyCode::Esc)).unwrap();
        keys.send(key(KeyCode::Char('z'))).unwrap();

        reader.prepare();
        keys.send(key(KeyCode::Char('b'))).unwrap();
        keys.send(key(KeyCode::Enter)).unwrap();
        assert_eq!(reader.read_line(":").unwrap(), ReadOutcome::submitted("b"));
    }

    #[test]
    fn test_cancel_marks_only_the_live_session() {
        let (reader, keys) = TerminalReader::new(Arc::new(RecordingChannels::default()));
        let reader = Arc::new(reader);
        reader.prepare();
        let worker = {
            let reader = reader.clone();
            std::thread::spawn(move || reader.read_line("/"))
        };
        while reader.live().is_none() {
            std::thread::yield_now();
        }
        reader.cancel();
        assert_eq!(worker.join().unwrap().unwrap(), ReadOutcome::cancelled());

        // A session that ended cleanly leaves nothing pending
        keys.send(key(KeyCode::Char('c'))).unwrap();
        keys.send(key(KeyCode::Enter)).unwrap();
        assert_eq!(reader.read_line(":").unwrap(), ReadOutcome::submitted("c"));
    }

    #[test]
    fn test_live_line_while_reading() {
        let (reader, keys) = TerminalReader::new(Arc::new(RecordingChannels::default()));
        let reader = Arc::new(reader);
        let worker = {
            let reader = reader.clone();
            std::thread::spawn(move || reader.read_line("query: "))
        };

        keys.send(key(KeyCode::Char('é'))).unwrap();
        let live = loop {
            if let Some(live) = reader.live()
                && live.input == "é"
            {
                break live;
            }
            std::thread::yield_now();
        };
        assert_eq!(live.framing, "query: ");
        assert_eq!(live.point, 2);

        keys.send(key(KeyCode::Enter)).unwrap();
        assert_eq!(
            worker.join().unwrap().unwrap(),
            ReadOutcome::submitted("é")
        );
    }
}
