pub mod conversation_state;
pub mod prompt;

use std::io::Write;
use std::process::ExitCode;

use color_print::cformat;
use conversation_state::{ConversationState, Role};
use eyre::Result;
use prompt::{generate_prompt, render_markdown};
use tracing::error;

use crate::client::ApiClient;

const WELCOME_TEXT: &str = "
Hi! I'm your Music Assistant powered by AI. Ask me for song recommendations!

Things to try
• Recommend something like \"Yesterday\"
• Any songs similar to Bohemian Rhapsody?
• What makes a good love song?

/help         Show the help dialogue
/quit         Quit the application
";

const HELP_TEXT: &str = "
VibeCheck Music Assistant

/history      Show this session's conversation
/help         Show this help dialogue
/quit         Quit the application

Quote a song name, or say \"similar to <song>\", to get recommendations.
";

const LIMITED_MODE_TEXT: &str = "
AI Assistant is running in limited mode (Groq API key missing).
The assistant requires a valid Groq API key. Add GROQ_API_KEY to your .env file
and restart the server. Song browsing still works: try `vibecheck browse`.
";

pub struct ChatContext {
    output: Box<dyn Write>,
    input: Option<String>,
    interactive: bool,
    conversation_state: ConversationState,
    api_client: ApiClient,
    agent_ready: bool,
}

impl ChatContext {
    pub fn new(
        output: Box<dyn Write>,
        input: Option<String>,
        interactive: bool,
        api_client: ApiClient,
        agent_ready: bool,
    ) -> Self {
        Self {
            output,
            input,
            interactive,
            conversation_state: ConversationState::new(),
            api_client,
            agent_ready,
        }
    }

    pub async fn run(&mut self) -> Result<ExitCode> {
        if !self.agent_ready {
            writeln!(self.output, "{}", LIMITED_MODE_TEXT)?;
            return Ok(ExitCode::FAILURE);
        }

        // Handle non-interactive mode (single query)
        if let Some(input) = self.input.take() {
            self.process_chat_input(&input).await?;
            return Ok(ExitCode::SUCCESS);
        }

        if self.interactive {
            writeln!(self.output, "{}", WELCOME_TEXT)?;
            self.run_interactive().await?;
        }

        Ok(ExitCode::SUCCESS)
    }

    async fn run_interactive(&mut self) -> Result<()> {
        let mut rl = prompt::rl()?;

        loop {
            let prompt_text = generate_prompt(None);
            match rl.readline(&prompt_text) {
                Ok(line) => {
                    if line.trim().is_empty() {
                        continue;
                    }

                    rl.add_history_entry(line.as_str());

                    if line.trim() == "/quit" {
                        break;
                    }

                    if let Err(e) = self.handle_input(&line).await {
                        writeln!(self.output, "Error: {}", e)?;
                    }
                }
                Err(e) => {
                    writeln!(self.output, "Error: {}", e)?;
                    break;
                }
            }
        }

        Ok(())
    }

    async fn handle_input(&mut self, input: &str) -> Result<()> {
        match input.trim() {
            "/help" => writeln!(self.output, "{}", HELP_TEXT)?,
            "/history" => self.print_history()?,
            _ => self.process_chat_input(input).await?,
        }
        Ok(())
    }

    async fn process_chat_input(&mut self, input: &str) -> Result<()> {
        self.conversation_state.add_user_message(input);

        match self.api_client.chat(input).await {
            Ok(response) => {
                writeln!(self.output, "\n{}\n", render_markdown(&response))?;
                self.conversation_state.add_assistant_message(&response);
            }
            Err(e) => {
                error!(error = %e, "chat request failed");
                writeln!(self.output, "{}", cformat!("<red>Chat error: {}</red>", e))?;
            }
        }

        Ok(())
    }

    fn print_history(&mut self) -> Result<()> {
        if self.conversation_state.is_empty() {
            writeln!(self.output, "No messages yet.")?;
            return Ok(());
        }

        for message in self.conversation_state.get_messages() {
            let stamp = message.created_at.format("%H:%M:%S");
            let line = match message.role {
                Role::User => cformat!("<dim>{}</dim> <cyan>you</cyan>: {}", stamp, message.content),
                Role::Assistant => cformat!(
                    "<dim>{}</dim> <green>assistant</green>: {}",
                    stamp,
                    render_markdown(&message.content)
                ),
            };
            writeln!(self.output, "{}", line)?;
        }
        Ok(())
    }
}
