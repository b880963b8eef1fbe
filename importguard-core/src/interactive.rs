use anyhow::{anyhow, Result};
use console::style;
use dialoguer::Confirm;
use std::io::{self, IsTerminal};

/// Controls behavior when running in non-interactive mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NonInteractiveMode {
    /// Fail with an error when a confirmation is required
    Fail,
    /// Take the prompt's default answer
    #[default]
    Defaults,
}

impl std::str::FromStr for NonInteractiveMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "fail" => Ok(NonInteractiveMode::Fail),
            "defaults" => Ok(NonInteractiveMode::Defaults),
            other => Err(anyhow!(
                "Invalid non-interactive mode: '{}'. Use 'fail' or 'defaults'",
                other
            )),
        }
    }
}

/// Detects if we're running in an interactive TTY
pub fn is_interactive() -> bool {
    io::stdin().is_terminal() && io::stdout().is_terminal()
}

/// Prompts for a yes/no confirmation
///
/// # Arguments
/// * `prompt` - The prompt text
/// * `default` - Default value if user just presses enter
/// * `non_interactive` - How to behave when not in a TTY
pub fn prompt_confirm(prompt: &str, default: bool, non_interactive: NonInteractiveMode) -> Result<bool> {
    if !is_interactive() {
        return answer_without_terminal(prompt, default, non_interactive);
    }

    let confirm = Confirm::new()
        .with_prompt(format!("{}", style(format!("→ {}", prompt)).cyan()))
        .default(default)
        .interact_opt()?;

    match confirm {
        Some(value) => Ok(value),
        None => Err(anyhow!("Cancelled by user")),
    }
}

fn answer_without_terminal(prompt: &str, default: bool, mode: NonInteractiveMode) -> Result<bool> {
    match mode {
        NonInteractiveMode::Fail => Err(anyhow!(
            "Interactive confirmation required for: '{}'. Use --non-interactive=defaults",
            prompt
        )),
        NonInteractiveMode::Defaults => Ok(default),
    }
}
