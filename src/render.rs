// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Rendering of the status bar and help line.

use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};

use crate::config::ConfigFile;
use crate::cursor::visual_column;
use crate::prompt::PromptType;
use crate::readline::LiveLine;
use crate::state::BarState;

/// Named styles a line builder knows how to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BarStyle {
    /// Passive status line
    Normal,
    /// Live prompt text
    Prompt,
    /// Highlighted help text
    HelpSpecial,
}

/// Render target for one terminal row.
pub(crate) trait LineBuilder {
    fn append(&mut self, text: &str);
    fn append_styled(&mut self, style: BarStyle, text: &str);
    /// Apply `style` to the whole row.
    fn apply_style(&mut self, style: BarStyle);
    fn set_cursor(&mut self, row: u16, column: u16);
}

/// Render the main bar row.
///
/// While active, the row shows the framing text and the line being edited
/// with the cursor on the edit point. Otherwise it shows the pending status.
pub(crate) fn render_bar(state: &BarState, live: Option<LiveLine>, builder: &mut dyn LineBuilder) {
    if !state.active {
        builder.append(&format!(" {}", state.pending_status));
        builder.apply_style(BarStyle::Normal);
        return;
    }

    // The reader may not have opened its buffer yet
    let live = live.unwrap_or_else(|| LiveLine {
        framing: state.prompt_type.framing().unwrap_or_default().to_string(),
        input: String::new(),
        point: 0,
    });

    builder.append(&format!("{}{}", live.framing, live.input));
    builder.apply_style(BarStyle::Prompt);
    let column = visual_column(&live.framing, &live.input, live.point);
    builder.set_cursor(0, u16::try_from(column).unwrap_or(u16::MAX));
}

/// Render the help row for the active prompt type. Nothing is appended when
/// no prompt is open.
pub(crate) fn render_help(prompt_type: PromptType, builder: &mut dyn LineBuilder) {
    let message = prompt_type.help();
    if !message.is_empty() {
        builder.append_styled(BarStyle::HelpSpecial, message);
    }
}

/// A label and value shown on a status line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct PropertyValue {
    pub property: String,
    pub value: String,
}

impl PropertyValue {
    pub(crate) fn new(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            property: property.into(),
            value: value.into(),
        }
    }
}

pub(crate) fn render_properties(builder: &mut dyn LineBuilder, values: &[PropertyValue]) {
    for value in values {
        builder.append(&format!("{}: {}     ", value.property, value.value));
    }
}

/// Resolves `BarStyle`s to concrete terminal styles.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Theme {
    normal: Style,
    prompt: Style,
    help_special: Style,
}

impl Theme {
    pub(crate) fn from_config(config: &ConfigFile) -> Self {
        Self {
            normal: Style::default().fg(config.status_color()),
            prompt: Style::default(),
            help_special: Style::default()
                .fg(config.help_color())
                .add_modifier(Modifier::BOLD),
        }
    }

    pub(crate) fn style(&self, style: BarStyle) -> Style {
        match style {
            BarStyle::Normal => self.normal,
            BarStyle::Prompt => self.prompt,
            BarStyle::HelpSpecial => self.help_special,
        }
    }
}

/// `LineBuilder` that collects ratatui spans for one row.
#[derive(Debug)]
pub(crate) struct SpanLine {
    theme: Theme,
    spans: Vec<Span<'static>>,
    style: Style,
    cursor: Option<(u16, u16)>,
}

impl SpanLine {
    pub(crate) fn new(theme: Theme) -> Self {
        Self {
            theme,
            spans: Vec::new(),
            style: Style::default(),
            cursor: None,
        }
    }

    /// Cursor as (row, column) relative to the row's origin.
    pub(crate) fn cursor(&self) -> Option<(u16, u16)> {
        self.cursor
    }

    pub(crate) fn into_line(self) -> Line<'static> {
        Line::from(self.spans).style(self.style)
    }
}

impl LineBuilder for SpanLine {
    fn append(&mut self, text: &str) {
        self.spans.push(Span::raw(text.to_string()));
    }

    fn append_styled(&mut self, style: BarStyle, text: &str) {
        self.spans
            .push(Span::styled(text.to_string(), self.theme.style(style)));
    }

    fn apply_style(&mut self, style: BarStyle) {
        self.style = self.theme.style(style);
    }

    fn set_cursor(&mut self, row: u16, column: u16) {
        self.cursor = Some((row, column));
    }
}
