pub mod command;
pub mod notification;
pub mod paths;
pub mod prompt;
pub mod render;
pub mod session_state;
pub mod spinner;

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use command::Command;
use crossterm::tty::IsTty;
use eyre::Result;
use notification::{Level, NotificationQueue};
use prompt::generate_prompt;
use rustyline::error::ReadlineError;
use session_state::{SessionEvent, SessionState};
use spinner::Spinner;
use tracing::{debug, error};

use crate::models::Exchange;
use crate::pdf_chat_client::{ChatBackend, ClientError};

const WELCOME_TEXT: &str = color_print::cstr!(
    "
<bold>PDF Chat</bold>. Upload a document, then ask questions about it.

<green>/upload</green> <<path>  Upload a PDF
<green>/help</green>           Show the help dialogue
<green>/quit</green>           Quit the application
"
);

const HELP_TEXT: &str = color_print::cstr!(
    "
<bold>PDF Chat CLI</bold>

<green>/upload</green> <<path>  Upload a PDF to the backend
<green>/history</green>        Show every exchange so far
<green>/help</green>           Show this help dialogue
<green>/quit</green>           Quit the application

Anything else is sent as a question about the uploaded document.
"
);

const EMPTY_QUESTION: &str = "Please enter a question";
const QUESTIONS_LOCKED: &str = "Upload a PDF with /upload <path> before asking questions";
const ASK_BUSY: &str = "Still waiting for the previous answer";
const ASK_FAILED: &str = "An error occurred while sending the message";
const UPLOAD_FAILED: &str = "An error occurred while uploading the PDF";
const UPLOAD_NO_MESSAGE: &str = "Upload finished without a message";

pub struct ChatContext {
    output: Box<dyn Write>,
    backend: Box<dyn ChatBackend>,
    input: Option<String>,
    file: Option<PathBuf>,
    interactive: bool,
    color: bool,
    session_state: SessionState,
    notifications: NotificationQueue,
    saw_error: bool,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        backend: Box<dyn ChatBackend>,
        input: Option<String>,
        file: Option<PathBuf>,
        interactive: bool,
        skip_upload: bool,
    ) -> Self {
        let session_state = if skip_upload {
            SessionState::unlocked()
        } else {
            SessionState::new()
        };

        Self {
            output,
            backend,
            input,
            file,
            interactive,
            color: interactive && io::stdout().is_tty(),
            session_state,
            notifications: NotificationQueue::new(),
            saw_error: false,
        }
    }

    pub fn session_state(&self) -> &SessionState {
        &self.session_state
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if self.interactive {
            self.print_welcome()?;
        }

        if let Some(file) = self.file.take() {
            self.upload(Some(file)).await?;
        }

        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            let before = self.session_state.exchanges().len();
            self.ask(&input).await?;
            // A refused question was never answered
            if self.session_state.exchanges().len() == before {
                self.saw_error = true;
            }
            return Ok(self.exit_code());
        }

        if self.interactive {
            self.run_interactive().await?;
        }

        Ok(self.exit_code())
    }

    fn exit_code(&self) -> ExitCode {
        if self.saw_error {
            ExitCode::FAILURE
        } else {
            ExitCode::SUCCESS
        }
    }

    fn print_welcome(&mut self) -> Result<()> {
        writeln!(self.output, "{}", WELCOME_TEXT)?;
        Ok(())
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(&self.session_state);
            // A question that failed is offered again for editing
            let pending = self.session_state.pending_question().to_string();
            let readline = if pending.is_empty() {
                rl.readline(&prompt_text)
            } else {
                rl.readline_with_initial(&prompt_text, (pending.as_str(), ""))
            };

            match readline {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if Command::parse(&line) == Command::Quit {
                        break;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(ReadlineError::Interrupted | ReadlineError::Eof) => break,
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    pub async fn handle_input(&mut self, input: &str) -> Result<()> {
        match Command::parse(input) {
            Command::Help => {
                writeln!(self.output, "{}", HELP_TEXT)?;
            }
            Command::History => {
                let exchanges = self.session_state.exchanges().to_vec();
                if exchanges.is_empty() {
                    writeln!(self.output, "No questions asked yet.")?;
                }
                self.print_exchanges(&exchanges)?;
            }
            Command::Upload(path) => {
                self.upload(path).await?;
            }
            Command::Ask(text) => {
                self.ask(&text).await?;
            }
            Command::Quit => {}
        }

        Ok(())
    }

    /// Send `path` to the upload endpoint with a spinner running until it
    /// resolves. Exactly one notification reports the outcome.
    pub async fn upload(&mut self, path: Option<PathBuf>) -> Result<()> {
        self.transition(SessionEvent::FileSelected { present: path.is_some() });
        self.transition(SessionEvent::UploadStarted);

        let label = match &path {
            Some(path) => {
                let cwd = std::env::current_dir().unwrap_or_default();
                format!("Uploading {}", paths::format_path(&cwd, path))
            }
            None => "Uploading".to_string(),
        };
        debug!("{}", label);

        let spinner = if self.interactive && io::stderr().is_tty() {
            Spinner::start(label)
        } else {
            Spinner::hidden()
        };
        let result = self.backend.upload_pdf(path.as_deref()).await;
        spinner.finish();

        match result {
            Ok(reply) => {
                let accepted = reply.is_accepted();
                self.transition(SessionEvent::UploadSucceeded { accepted });

                let message = reply
                    .message
                    .or(reply.error)
                    .unwrap_or_else(|| UPLOAD_NO_MESSAGE.to_string());
                if accepted {
                    self.notifications.info(message);
                } else {
                    self.notifications.warning(message);
                }
            }
            Err(e @ ClientError::ReadFile { .. }) => {
                error!("Upload aborted: {}", e);
                self.transition(SessionEvent::UploadFailed);
                self.notifications.error(format!("{}: {}", UPLOAD_FAILED, e));
            }
            Err(e) => {
                error!("Upload failed: {}", e);
                self.transition(SessionEvent::UploadFailed);
                self.notifications.error(UPLOAD_FAILED);
            }
        }

        self.flush_notifications()
    }

    /// Ask `text` with the full history as context. On success the two new
    /// turns are printed; otherwise one notification explains why not.
    pub async fn ask(&mut self, text: &str) -> Result<()> {
        let question = text.trim().to_string();
        self.transition(SessionEvent::QuestionEdited(text.to_string()));

        if question.is_empty() {
            self.notifications.warning(EMPTY_QUESTION);
            return self.flush_notifications();
        }
        if !self.session_state.question_input_enabled() {
            self.notifications.warning(QUESTIONS_LOCKED);
            return self.flush_notifications();
        }
        if self.session_state.ask_in_flight() || self.session_state.upload_in_flight() {
            self.notifications.warning(ASK_BUSY);
            return self.flush_notifications();
        }

        let history = self.session_state.exchanges().to_vec();
        self.transition(SessionEvent::AskStarted);

        match self.backend.ask_question(&question, &history).await {
            Ok(reply) => {
                let reply = reply.response.unwrap_or_default();
                self.transition(SessionEvent::AskSucceeded { question, reply });

                let exchanges = self.session_state.exchanges();
                let added = exchanges[exchanges.len() - 2..].to_vec();
                self.print_exchanges(&added)?;
            }
            Err(e) => {
                error!("Question failed: {}", e);
                self.transition(SessionEvent::AskFailed);
                self.notifications.error(ASK_FAILED);
            }
        }

        self.flush_notifications()
    }

    fn transition(&mut self, event: SessionEvent) {
        debug!("Session event: {:?}", event);
        self.session_state = self.session_state.apply(event);
    }

    fn print_exchanges(&mut self, exchanges: &[Exchange]) -> Result<()> {
        let width = render::terminal_width();
        for exchange in exchanges {
            writeln!(self.output, "{}", render::render_exchange(exchange, width, self.color))?;
        }
        Ok(())
    }

    fn flush_notifications(&mut self) -> Result<()> {
        for notification in self.notifications.drain() {
            if notification.level == Level::Error {
                self.saw_error = true;
            }
            if self.color {
                writeln!(self.output, "{}", notification.render(true))?;
            } else {
                writeln!(self.output, "{}", notification)?;
            }
        }
        self.output.flush()?;
        Ok(())
    }
}
