// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Demo application hosting the status bar.
//!
//! The UI loop owns the terminal. Keys go to the line reader while a prompt
//! is open and are treated as shortcuts otherwise. Prompt sessions run on
//! their own threads and report back through the event channel.

use std::io;
use std::sync::mpsc::Sender;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crossterm::event::{
    DisableFocusChange, EnableFocusChange, Event, EventStream, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use futures::StreamExt;
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;
use tokio::sync::mpsc::{self, UnboundedReceiver};

use crate::action::{Action, AppEvent, Channels, EventChannels};
use crate::config::ConfigFile;
use crate::error::{Error, Result};
use crate::evaluate::ConfigEvaluator;
use crate::prompt::PromptController;
use crate::readline::{LineReader, TerminalReader};
use crate::render::{PropertyValue, SpanLine, Theme, render_properties};
use crate::state::StatusBar;
use crate::view::StatusBarView;

const USAGE: &str =
    "':' command   '/' search   '?' reverse search   'f' filter   's' background task   'q' quit";

pub(crate) struct App {
    view: StatusBarView,
    config: Arc<RwLock<ConfigFile>>,
    channels: EventChannels,
    keys: Sender<KeyEvent>,
    events: UnboundedReceiver<AppEvent>,
    search: Option<(String, bool)>,
    filters: Vec<String>,
    should_exit: bool,
}

impl App {
    pub(crate) fn new(config: ConfigFile) -> Self {
        let (tx, events) = mpsc::unbounded_channel();
        let channels = EventChannels::new(tx);
        let shared: Arc<dyn Channels> = Arc::new(channels.clone());
        let config = Arc::new(RwLock::new(config));

        let bar = StatusBar::new(shared.clone());
        let (reader, keys) = TerminalReader::new(shared.clone());
        let reader: Arc<dyn LineReader> = Arc::new(reader);
        let evaluator = Arc::new(ConfigEvaluator::new(config.clone(), shared));
        let controller = Arc::new(PromptController::new(bar.clone(), reader.clone(), evaluator));

        Self {
            view: StatusBarView::new(bar, controller, reader),
            config,
            channels,
            keys,
            events,
            search: None,
            filters: Vec::new(),
            should_exit: false,
        }
    }

    pub(crate) fn set_status(&self, status: &str) {
        self.view.dispatch(&Action::show_status(status));
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind == KeyEventKind::Release {
            return;
        }

        if self.view.is_prompting() {
            if self.keys.send(key).is_err() {
                tracing::warn!("line reader is gone, dropping key");
            }
            return;
        }

        let action = match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_exit = true;
                return;
            }
            KeyCode::Char(':') => Action::Prompt,
            KeyCode::Char('/') => Action::SearchPrompt,
            KeyCode::Char('?') => Action::ReverseSearchPrompt,
            KeyCode::Char('f') => Action::FilterPrompt,
            KeyCode::Char('s') => {
                self.spawn_background_task();
                return;
            }
            KeyCode::Char('q') => {
                self.should_exit = true;
                return;
            }
            _ => return,
        };
        self.view.dispatch(&action);
    }

    /// Simulated long-running operation posting progress to the bar.
    fn spawn_background_task(&self) {
        let channels = self.channels.clone();
        tokio::spawn(async move {
            for percent in (0..=100).step_by(20) {
                channels.do_action(Action::show_status(format!("Loading... {percent}%")));
                tokio::time::sleep(Duration::from_millis(300)).await;
            }
            channels.do_action(Action::show_status("Background task finished"));
        });
    }

    /// Apply one event. Returns true if the screen needs redrawing.
    fn handle_event(&mut self, event: AppEvent) -> bool {
        match event {
            AppEvent::Redraw => true,
            AppEvent::Errors(errors) => {
                if let Some(first) = errors.first() {
                    self.view.bar().set_pending_status(first.status_message());
                }
                true
            }
            AppEvent::Action(action) => {
                self.apply(action);
                true
            }
        }
    }

    fn apply(&mut self, action: Action) {
        match action {
            Action::Search(pattern) => {
                self.set_status(&format!("Search: {pattern}"));
                self.search = Some((pattern, false));
            }
            Action::ReverseSearch(pattern) => {
                self.set_status(&format!("Reverse search: {pattern}"));
                self.search = Some((pattern, true));
            }
            Action::ClearSearch => {
                self.set_status("Search cleared");
                self.search = None;
            }
            Action::AddFilter(query) => {
                self.set_status(&format!("Added filter: {query}"));
                self.filters.push(query);
            }
            Action::Quit => self.should_exit = true,
            other => self.view.dispatch(&other),
        }
    }

    fn properties(&self) -> Vec<PropertyValue> {
        let search = match &self.search {
            Some((pattern, false)) => format!("/{pattern}"),
            Some((pattern, true)) => format!("?{pattern}"),
            None => "none".to_string(),
        };
        let filters = if self.filters.is_empty() {
            "none".to_string()
        } else {
            self.filters.join(" && ")
        };
        vec![
            PropertyValue::new("Search", search),
            PropertyValue::new("Filters", filters),
        ]
    }

    fn theme(&self) -> Theme {
        match self.config.read() {
            Ok(config) => Theme::from_config(&config),
            Err(poisoned) => Theme::from_config(&poisoned.into_inner()),
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let theme = self.theme();
        let [body, status_row, help_row] = Layout::vertical([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .areas(frame.area());

        let mut properties = SpanLine::new(theme);
        render_properties(&mut properties, &self.properties());
        frame.render_widget(
            Paragraph::new(vec![properties.into_line(), Line::from(""), Line::from(USAGE)]),
            body,
        );

        let mut status = SpanLine::new(theme);
        self.view.render(&mut status);
        let cursor = status.cursor();
        frame.render_widget(Paragraph::new(status.into_line()), status_row);
        if let Some((row, column)) = cursor {
            let x = status_row
                .x
                .saturating_add(column)
                .min(status_row.right().saturating_sub(1));
            frame.set_cursor_position((x, status_row.y.saturating_add(row)));
        }

        let mut help = SpanLine::new(theme);
        self.view.render_help_bar(&mut help);
        frame.render_widget(Paragraph::new(help.into_line()), help_row);
    }
}

fn setup_terminal() -> io::Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen, EnableFocusChange)?;
    Ok(())
}

fn restore_terminal() -> io::Result<()> {
    disable_raw_mode()?;
    execute!(io::stdout(), DisableFocusChange, LeaveAlternateScreen)?;
    Ok(())
}

/// Main entry point for the demo UI
pub(crate) async fn run(app: App) -> Result<()> {
    setup_terminal()?;

    // Install panic hook to restore terminal on panic
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = restore_terminal();
        original_hook(panic_info);
    }));

    let res = match Terminal::new(CrosstermBackend::new(io::stdout())) {
        Ok(mut terminal) => run_app(&mut terminal, app).await,
        Err(err) => Err(Error::Io(err)),
    };

    restore_terminal()?;
    res
}

async fn run_app(
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    mut app: App,
) -> Result<()> {
    let mut event_stream = EventStream::new();
    let mut needs_redraw = true;

    loop {
        if app.should_exit {
            tracing::info!("exiting");
            return Ok(());
        }

        if needs_redraw {
            terminal.draw(|frame| app.draw(frame))?;
            needs_redraw = false;
        }

        tokio::select! {
            event = event_stream.next() => match event {
                Some(Ok(Event::Key(key))) => {
                    app.handle_key(key);
                    needs_redraw = true;
                }
                Some(Ok(Event::FocusLost)) => {
                    // An open prompt does not survive losing the terminal
                    app.view.dispatch(&Action::SetActiveFocus(false));
                    needs_redraw = true;
                }
                Some(Ok(Event::Resize(_, _))) => needs_redraw = true,
                Some(Ok(_)) => {}
                Some(Err(err)) => return Err(err.into()),
                None => return Ok(()),
            },
            Some(event) = app.events.recv() => {
                needs_redraw |= app.handle_event(event);
            }
        }
    }
}
