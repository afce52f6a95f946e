//! System prompt rendering.
//!
//! The prompt is a minijinja template compiled into the binary and rendered once per
//! session; the result becomes the single system turn at index 0 of the history.

use anyhow::{Context, Result};
use minijinja::{Environment, context};

const SYSTEM_PROMPT_TEMPLATE: &str = include_str!("../../templates/system_prompt.md");

/// Section headers the formatter may emit, in emission order.
const FEEDBACK_SECTIONS: [&str; 5] = [
    "--- User Input:",
    "--- COMMAND:",
    "--- DECLINED",
    "--- STDOUT:",
    "--- STDERR:",
];

/// Render the system prompt for a session that runs commands through `shell`.
pub fn render_system_prompt(shell: &str) -> Result<String> {
    let mut env = Environment::new();
    env.add_template("system_prompt", SYSTEM_PROMPT_TEMPLATE)
        .context("load system prompt template")?;
    let template = env.get_template("system_prompt")?;
    let rendered = template
        .render(context! {
            shell => shell,
            sections => FEEDBACK_SECTIONS,
        })
        .context("render system prompt")?;
    Ok(rendered)
}
