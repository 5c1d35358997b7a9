// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Jason Ish

//! Command evaluation for the `:` prompt.
//!
//! Commands are separated by `;`. Each failing command contributes one
//! error and evaluation carries on with the next one.

use std::sync::{Arc, RwLock};

use crate::action::{Action, Channels};
use crate::config::{ConfigFile, parse_color};
use crate::error::{Error, Result};

pub(crate) trait Evaluator: Send + Sync {
    fn evaluate(&self, input: &str) -> Vec<Error>;
}

/// Settings that can be changed with `set`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Variable {
    StatusColor,
    HelpColor,
}

impl Variable {
    fn parse(name: &str) -> Option<Self> {
        match name {
            "status-color" => Some(Variable::StatusColor),
            "help-color" => Some(Variable::HelpColor),
            _ => None,
        }
    }
}

pub(crate) struct ConfigEvaluator {
    config: Arc<RwLock<ConfigFile>>,
    channels: Arc<dyn Channels>,
}

impl ConfigEvaluator {
    pub(crate) fn new(config: Arc<RwLock<ConfigFile>>, channels: Arc<dyn Channels>) -> Self {
        Self { config, channels }
    }

    fn evaluate_command(&self, command: &str) -> Result<()> {
        let mut words = command.split_whitespace();
        let Some(name) = words.next() else {
            return Ok(());
        };
        let args: Vec<&str> = words.collect();

        match name {
            "q" | "quit" => {
                if !args.is_empty() {
                    return Err(Error::Command(format!("{name} takes no arguments")));
                }
                self.channels.do_action(Action::Quit);
                Ok(())
            }
            "set" => self.set(&args),
            other => Err(Error::UnknownCommand(other.to_string())),
        }
    }

    fn set(&self, args: &[&str]) -> Result<()> {
        let [name, value] = args else {
            return Err(Error::Command(
                "Usage: set <variable> <value>".to_string(),
            ));
        };
        let variable = Variable::parse(name)
            .ok_or_else(|| Error::Command(format!("Unknown variable: {name}")))?;
        parse_color(value)?;

        {
            let mut config = self
                .config
                .write()
                .map_err(|_| Error::Config("config lock poisoned".to_string()))?;
            match variable {
                Variable::StatusColor => config.status_color = value.to_string(),
                Variable::HelpColor => config.help_color = value.to_string(),
            }
        }
        tracing::debug!(?variable, value, "config updated");
        self.channels.update_display();
        Ok(())
    }
}

impl Evaluator for ConfigEvaluator {
    fn evaluate(&self, input: &str) -> Vec<Error> {
        input
            .split(';')
            .filter_map(|command| self.evaluate_command(command.trim()).err())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::action::testing::RecordingChannels;

    fn evaluator() -> (ConfigEvaluator, Arc<RwLock<ConfigFile>>, Arc<RecordingChannels>) {
        let config = Arc::new(RwLock::new(ConfigFile::default()));
        let channels = Arc::new(RecordingChannels::default());
        (
            ConfigEvaluator::new(config.clone(), channels.clone()),
            config,
            channels,
        )
    }

    #[test]
    fn test_empty_input() {
        let (evaluator, config, channels) = evaluator();
        assert!(evaluator.evaluate("").is_empty());
        assert!(evaluator.evaluate("  ;  ").is_empty());
        assert_eq!(*config.read().unwrap(), ConfigFile::default());
        assert!(channels.actions().is_empty());
    }

    #[test]
    fn test_set_colors() {
        let (evaluator, config, channels) = evaluator();
        let errors = evaluator.evaluate("set status-color blue; set help-color #ff0000");
        assert!(errors.is_empty(), "{:?}", errors);

        let config = config.read().unwrap();
        assert_eq!(config.status_color, "blue");
        assert_eq!(config.help_color, "#ff0000");
        assert_eq!(channels.redraws(), 2);
    }

    #[test]
    fn test_quit() {
        let (evaluator, _, channels) = evaluator();
        assert!(evaluator.evaluate("q").is_empty());
        assert_eq!(channels.actions(), vec![Action::Quit]);
    }

    #[test]
    fn test_errors_are_collected() {
        let (evaluator, config, _) = evaluator();
        let errors = evaluator.evaluate("bogus; set status-color red; set nope 1; set help-color");
        assert_eq!(errors.len(), 3);
        assert!(matches!(&errors[0], Error::UnknownCommand(name) if name == "bogus"));
        assert!(matches!(&errors[1], Error::Command(_)));
        assert!(matches!(&errors[2], Error::Command(_)));
        assert_eq!(config.read().unwrap().status_color, "red");
    }

    #[test]
    fn test_invalid_color_leaves_config() {
        let (evaluator, config, _) = evaluator();
        let errors = evaluator.evaluate("set status-color nonsense");
        assert!(matches!(errors.as_slice(), [Error::Config(_)]));
        assert_eq!(*config.read().unwrap(), ConfigFile::default());
    }
}
