// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Modal prompt sessions.
//!
//! Each prompt kind maps to its framing text, help message and the way a
//! completed input turns into an action. A session switches the bar into
//! prompt mode, blocks on the line reader, then switches back before any
//! action is emitted.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};

use crate::action::{Action, Channels};
use crate::error::Result;
use crate::evaluate::Evaluator;
use crate::readline::LineReader;
use crate::state::{ActivePrompt, StatusBar};

pub(crate) const PROMPT_TEXT: &str = ":";
pub(crate) const SEARCH_PROMPT_TEXT: &str = "/";
pub(crate) const REVERSE_SEARCH_PROMPT_TEXT: &str = "?";
pub(crate) const FILTER_PROMPT_TEXT: &str = "query: ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) enum PromptType {
    #[default]
    None,
    Command,
    Search,
    ReverseSearch,
    Filter,
}

/// What a finished prompt asks for.
#[derive(Debug, PartialEq)]
pub(crate) enum Completion {
    /// Evaluate the text as a command, inline
    Evaluate(String),
    /// Send the action through the action channel
    Emit(Action),
    Nothing,
}

impl PromptType {
    /// The prompt kind an action opens, if any.
    pub(crate) fn from_action(action: &Action) -> Option<Self> {
        match action {
            Action::Prompt => Some(PromptType::Command),
            Action::SearchPrompt => Some(PromptType::Search),
            Action::ReverseSearchPrompt => Some(PromptType::ReverseSearch),
            Action::FilterPrompt => Some(PromptType::Filter),
            _ => None,
        }
    }

    pub(crate) fn framing(self) -> Option<&'static str> {
        match self {
            PromptType::None => None,
            PromptType::Command => Some(PROMPT_TEXT),
            PromptType::Search => Some(SEARCH_PROMPT_TEXT),
            PromptType::ReverseSearch => Some(REVERSE_SEARCH_PROMPT_TEXT),
            PromptType::Filter => Some(FILTER_PROMPT_TEXT),
        }
    }

    pub(crate) fn help(self) -> &'static str {
        match self {
            PromptType::None => "",
            PromptType::Command => "Enter a command",
            PromptType::Search | PromptType::ReverseSearch => "Enter a regex pattern",
            PromptType::Filter => "Enter a filter query",
        }
    }

    /// Turn non-cancelled input into the follow-up for this kind.
    pub(crate) fn complete(self, input: String) -> Completion {
        match self {
            PromptType::None => Completion::Nothing,
            PromptType::Command => Completion::Evaluate(input),
            PromptType::Search | PromptType::ReverseSearch if input.is_empty() => {
                Completion::Emit(Action::ClearSearch)
            }
            PromptType::Search => Completion::Emit(Action::Search(input)),
            PromptType::ReverseSearch => Completion::Emit(Action::ReverseSearch(input)),
            PromptType::Filter if input.is_empty() => Completion::Nothing,
            PromptType::Filter => Completion::Emit(Action::AddFilter(input)),
        }
    }
}

/// One finished prompt, as returned by the line reader.
#[derive(Debug)]
pub(crate) struct PromptSession {
    pub kind: PromptType,
    pub framing: &'static str,
    pub input: String,
    pub cancelled: bool,
}

impl PromptSession {
    fn completion(self) -> Completion {
        if self.cancelled {
            return Completion::Nothing;
        }
        self.kind.complete(self.input)
    }
}

/// Clears the controller's running flag when the read ends or unwinds.
struct Running<'a>(&'a AtomicBool);

impl Drop for Running<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

pub(crate) struct PromptController {
    bar: StatusBar,
    reader: Arc<dyn LineReader>,
    evaluator: Arc<dyn Evaluator>,
    /// Set from prompt entry until the session's read returns. Unlike the
    /// bar's `prompt_type`, this stays set after a focus change resets the bar.
    running: AtomicBool,
}

impl PromptController {
    pub(crate) fn new(
        bar: StatusBar,
        reader: Arc<dyn LineReader>,
        evaluator: Arc<dyn Evaluator>,
    ) -> Self {
        Self {
            bar,
            reader,
            evaluator,
            running: AtomicBool::new(false),
        }
    }

    /// True while a session's read is in progress or about to start.
    pub(crate) fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Claim the single session slot and switch the bar into prompt mode.
    fn start(&self, kind: PromptType) -> Option<ActivePrompt> {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::debug!(?kind, "prompt already open, ignoring");
            return None;
        }
        self.reader.prepare();
        Some(self.bar.enter_prompt(kind))
    }

    fn channels(&self) -> &Arc<dyn Channels> {
        self.bar.channels()
    }

    /// Run a prompt session to completion. Blocks until the user submits or
    /// cancels, so this must not be called from the render path.
    pub(crate) fn run_prompt(&self, kind: PromptType) {
        let Some(framing) = kind.framing() else {
            return;
        };
        let Some(prompt) = self.start(kind) else {
            return;
        };
        self.collect(kind, framing, prompt);
    }

    /// Run a prompt session on its own thread so the UI keeps rendering.
    ///
    /// The bar switches into prompt mode before this returns, so keys typed
    /// right after the trigger already belong to the prompt. Returns `None`
    /// when there is nothing to prompt for or a session is still running.
    pub(crate) fn spawn(self: &Arc<Self>, kind: PromptType) -> Result<Option<JoinHandle<()>>> {
        let Some(framing) = kind.framing() else {
            return Ok(None);
        };
        let Some(prompt) = self.start(kind) else {
            return Ok(None);
        };
        let controller = Arc::clone(self);
        let spawned = thread::Builder::new()
            .name("prompt".to_string())
            .spawn(move || controller.collect(kind, framing, prompt));
        match spawned {
            Ok(handle) => Ok(Some(handle)),
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                Err(err.into())
            }
        }
    }

    fn collect(&self, kind: PromptType, framing: &'static str, prompt: ActivePrompt) {
        let running = Running(&self.running);
        let outcome = self.reader.read_line(framing);
        drop(prompt);
        drop(running);

        let session = match outcome {
            Ok(outcome) => PromptSession {
                kind,
                framing,
                input: outcome.input,
                cancelled: outcome.cancelled,
            },
            Err(err) => {
                self.channels().report_errors(vec![err]);
                return;
            }
        };
        tracing::debug!(
            kind = ?session.kind,
            framing = session.framing,
            cancelled = session.cancelled,
            "prompt finished"
        );

        match session.completion() {
            Completion::Evaluate(input) => {
                let errors = self.evaluator.evaluate(&input);
                self.channels().report_errors(errors);
            }
            Completion::Emit(action) => self.channels().do_action(action),
            Completion::Nothing => {}
        }
    }
}
