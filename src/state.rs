// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Shared status/prompt state.
//!
//! A single mutex guards every field so `active` and `prompt_type` always
//! change together. The render path only ever takes a snapshot.

use std::sync::{Arc, Mutex, MutexGuard};

use crate::action::Channels;
use crate::prompt::PromptType;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub(crate) struct BarState {
    /// True while the bar renders the live prompt
    pub active: bool,
    pub prompt_type: PromptType,
    pub pending_status: String,
}

/// Handle to the bar state. Cheap to clone (Arc internally).
#[derive(Clone)]
pub(crate) struct StatusBar {
    state: Arc<Mutex<BarState>>,
    channels: Arc<dyn Channels>,
}

impl StatusBar {
    pub(crate) fn new(channels: Arc<dyn Channels>) -> Self {
        Self {
            state: Arc::new(Mutex::new(BarState::default())),
            channels,
        }
    }

    // A panic on another thread must not take the status line down with it.
    fn lock(&self) -> MutexGuard<'_, BarState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub(crate) fn channels(&self) -> &Arc<dyn Channels> {
        &self.channels
    }

    pub(crate) fn set_active(&self, active: bool) {
        tracing::debug!("StatusBar active: {}", active);
        let mut state = self.lock();
        state.active = active;
        if !active {
            state.prompt_type = PromptType::None;
        }
    }

    pub(crate) fn set_pending_status(&self, status: impl Into<String>) {
        let status = status.into();
        tracing::info!("Received status: {}", status);
        {
            let mut state = self.lock();
            state.pending_status = status;
        }
        // Outside the lock: the redraw path snapshots this state.
        self.channels.update_display();
    }

    pub(crate) fn snapshot(&self) -> BarState {
        self.lock().clone()
    }

    /// Switch into prompt mode for `kind` until the returned guard drops.
    pub(crate) fn enter_prompt(&self, kind: PromptType) -> ActivePrompt {
        tracing::debug!(?kind, "entering prompt");
        {
            let mut state = self.lock();
            state.active = true;
            state.prompt_type = kind;
        }
        self.channels.update_display();
        ActivePrompt { bar: self.clone() }
    }

    fn leave_prompt(&self) {
        {
            let mut state = self.lock();
            state.active = false;
            state.prompt_type = PromptType::None;
        }
        tracing::debug!("left prompt");
        self.channels.update_display();
    }
}

/// Restores the bar to status mode when dropped, including on unwind.
#[must_use = "the prompt ends as soon as the guard is dropped"]
pub(crate) struct ActivePrompt {
    bar: StatusBar,
}

impl Drop for ActivePrompt {
    fn drop(&mut self) {
        self.bar.leave_prompt();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::testing::RecordingChannels;

    fn new_bar() -> (StatusBar, Arc<RecordingChannels>) {
        let channels = Arc::new(RecordingChannels::default());
        (StatusBar::new(channels.clone()), channels)
    }

    #[test]
    fn test_initial_state() {
        let (bar, _) = new_bar();
        assert_eq!(
            bar.snapshot(),
            BarState {
                active: false,
                prompt_type: PromptType::None,
                pending_status: String::new(),
            }
        );
    }

    #[test]
    fn test_pending_status_requests_one_redraw() {
        let (bar, channels) = new_bar();
        bar.set_pending_status("Loading...");
        assert_eq!(bar.snapshot().pending_status, "Loading...");
        assert_eq!(channels.redraws(), 1);
    }

    #[test]
    fn test_prompt_guard_resets_state() {
        let (bar, _) = new_bar();
        {
            let _prompt = bar.enter_prompt(PromptType::Filter);
            let state = bar.snapshot();
            assert!(state.active);
            assert_eq!(state.prompt_type, PromptType::Filter);
        }
        let state = bar.snapshot();
        assert!(!state.active);
        assert_eq!(state.prompt_type, PromptType::None);
    }

    #[test]
    fn test_prompt_guard_resets_on_panic() {
        let (bar, _) = new_bar();
        let inner = bar.clone();
        let result = std::thread::spawn(move || {
            let _prompt = inner.enter_prompt(PromptType::Command);
            panic!("input loop failed");
        })
        .join();
        assert!(result.is_err());

        let state = bar.snapshot();
        assert!(!state.active);
        assert_eq!(state.prompt_type, PromptType::None);
    }

    #[test]
    fn test_deactivate_clears_prompt_type() {
        let (bar, _) = new_bar();
        let _prompt = bar.enter_prompt(PromptType::Search);
        bar.set_active(false);
        let state = bar.snapshot();
        assert!(!state.active);
        assert_eq!(state.prompt_type, PromptType::None);
    }

    #[test]
    fn test_concurrent_status_updates() {
        let (bar, channels) = new_bar();
        let submitted: Vec<String> = (0..8).map(|i| format!("status {i}")).collect();

        let handles: Vec<_> = submitted
            .iter()
            .cloned()
            .map(|status| {
                let bar = bar.clone();
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        bar.set_pending_status(status.clone());
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let state = bar.snapshot();
        assert!(submitted.contains(&state.pending_status));
        assert!(!state.active);
        assert_eq!(channels.redraws(), 8 * 50);
    }
}
