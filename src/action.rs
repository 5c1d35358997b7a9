// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use tokio::sync::mpsc;

use crate::error::Error;

/// Actions exchanged between the bar and the rest of the application.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum Action {
    /// Open the command prompt
    Prompt,
    /// Open the forward search prompt
    SearchPrompt,
    /// Open the reverse search prompt
    ReverseSearchPrompt,
    /// Open the filter prompt
    FilterPrompt,
    /// Replace the status text; the first argument must be a string
    ShowStatus { args: Vec<serde_json::Value> },
    /// The bar gained or lost focus
    SetActiveFocus(bool),
    /// Search forward for a pattern
    Search(String),
    /// Search backward for a pattern
    ReverseSearch(String),
    /// Clear the current search
    ClearSearch,
    /// Add a filter query
    AddFilter(String),
    /// Leave the application
    Quit,
}

impl Action {
    pub(crate) fn show_status(status: impl Into<String>) -> Self {
        Action::ShowStatus {
            args: vec![serde_json::Value::String(status.into())],
        }
    }
}

/// Outbound side of the bar: actions, redraw requests and error reports.
pub(crate) trait Channels: Send + Sync {
    fn do_action(&self, action: Action);
    fn update_display(&self);
    fn report_errors(&self, errors: Vec<Error>);
}

/// Events delivered to the UI loop.
#[derive(Debug)]
pub(crate) enum AppEvent {
    Action(Action),
    Redraw,
    Errors(Vec<Error>),
}

/// `Channels` backed by an unbounded tokio channel. Cheap to clone.
#[derive(Clone)]
pub(crate) struct EventChannels {
    sender: mpsc::UnboundedSender<AppEvent>,
}

impl EventChannels {
    pub(crate) fn new(sender: mpsc::UnboundedSender<AppEvent>) -> Self {
        Self { sender }
    }

    fn send(&self, event: AppEvent) {
        // The receiver only goes away during shutdown
        if self.sender.send(event).is_err() {
            tracing::debug!("event channel closed");
        }
    }
}

impl Channels for EventChannels {
    fn do_action(&self, action: Action) {
        tracing::debug!(?action, "dispatching action");
        self.send(AppEvent::Action(action));
    }

    fn update_display(&self) {
        self.send(AppEvent::Redraw);
    }

    fn report_errors(&self, errors: Vec<Error>) {
        if errors.is_empty() {
            return;
        }
        for err in &errors {
            tracing::warn!("{err}");
        }
        self.send(AppEvent::Errors(errors));
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_channels_forward_events() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channels = EventChannels::new(tx);

        channels.do_action(Action::ClearSearch);
        channels.update_display();
        channels.report_errors(vec![Error::Command("bad".to_string())]);

        assert!(matches!(
            rx.try_recv(),
            Ok(AppEvent::Action(Action::ClearSearch))
        ));
        assert!(matches!(rx.try_recv(), Ok(AppEvent::Redraw)));
        match rx.try_recv() {
            Ok(AppEvent::Errors(errors)) => assert_eq!(errors.len(), 1),
            other => panic!("Expected errors, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_error_report_is_dropped() {
        let (tx, mut rx) = mpsc::unbounded_channel();
        let channels = EventChannels::new(tx);
        channels.report_errors(Vec::new());
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_send_after_receiver_dropped() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let channels = EventChannels::new(tx);
        channels.update_display();
    }

    #[test]
    fn test_show_status_helper() {
        assert_eq!(
            Action::show_status("Loading..."),
            Action::ShowStatus {
                args: vec![serde_json::json!("Loading...")]
            }
        );
    }
}
