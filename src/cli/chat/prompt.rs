use rustyline::{Config, Editor, Result};

use super::session_state::SessionState;

/// Prompt for the next line. A locked marker shows that questions are
/// refused until a PDF is uploaded.
pub fn generate_prompt(state: &SessionState) -> String {
    if state.question_input_enabled() {
        "> ".to_string()
    } else {
        "[upload a PDF] > ".to_string()
    }
}

pub fn rl() -> Result<Editor<()>> {
    let config = Config::builder()
        .history_ignore_space(true)
        .build();
    Editor::with_config(config)
}
