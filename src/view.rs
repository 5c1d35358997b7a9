// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

use std::sync::Arc;

use crate::action::Action;
use crate::error::{Error, Result};
use crate::prompt::{PromptController, PromptType};
use crate::readline::LineReader;
use crate::render::{self, LineBuilder};
use crate::state::StatusBar;

/// The status bar as seen by the rest of the application: routes actions
/// into the shared state and prompt sessions, and renders both rows.
pub(crate) struct StatusBarView {
    bar: StatusBar,
    controller: Arc<PromptController>,
    reader: Arc<dyn LineReader>,
}

impl StatusBarView {
    pub(crate) fn new(
        bar: StatusBar,
        controller: Arc<PromptController>,
        reader: Arc<dyn LineReader>,
    ) -> Self {
        Self {
            bar,
            controller,
            reader,
        }
    }

    pub(crate) fn bar(&self) -> &StatusBar {
        &self.bar
    }

    /// True while a prompt session owns keyboard input. This outlasts a
    /// focus change that resets the bar, until the session's read returns.
    pub(crate) fn is_prompting(&self) -> bool {
        self.controller.is_running()
    }

    /// Handle an action addressed to the bar. Actions meant for other views
    /// are ignored.
    pub(crate) fn handle_action(&self, action: &Action) -> Result<()> {
        if let Some(kind) = PromptType::from_action(action) {
            // Detached: the session reports back through the action channel.
            // Refused while another session is still running.
            let _ = self.controller.spawn(kind)?;
            return Ok(());
        }

        match action {
            Action::ShowStatus { args } => match args.first().and_then(|arg| arg.as_str()) {
                Some(status) => {
                    self.bar.set_pending_status(status);
                    Ok(())
                }
                None => Err(Error::InvalidArgument(format!(
                    "Expected status argument but received: {:?}",
                    args
                ))),
            },
            Action::SetActiveFocus(active) => {
                if !*active && self.is_prompting() {
                    self.reader.cancel();
                }
                self.bar.set_active(*active);
                Ok(())
            }
            _ => Ok(()),
        }
    }

    /// Handle an action and report any failure instead of returning it.
    pub(crate) fn dispatch(&self, action: &Action) {
        if let Err(err) = self.handle_action(action) {
            self.bar.channels().report_errors(vec![err]);
        }
    }

    pub(crate) fn render(&self, builder: &mut dyn LineBuilder) {
        let state = self.bar.snapshot();
        let live = if state.active { self.reader.live() } else { None };
        render::render_bar(&state, live, builder);
    }

    pub(crate) fn render_help_bar(&self, builder: &mut dyn LineBuilder) {
        render::render_help(self.bar.snapshot().prompt_type, builder);
    }
}
