// UI layer: collects typed values from the user.
//
// `InputCollector` is the seam the shell depends on. Two implementations:
// - `LineCollector` reads newline-terminated answers from any `BufRead`
//   (piped stdin, scripts, tests).
// - `TerminalCollector` drives `dialoguer` prompts on an interactive TTY.

use std::io::{self, BufRead, Read, Write};

use dialoguer::{Confirm, Input, Password, Select};

use crate::error::{ClientError, Result};
use crate::model::{RecordDraft, RecordKind};

const EMPTY_VALUE: &str = "Please enter a non-empty value.";

/// One method per kind of value the workflows need.
///
/// Login, password and text answers are never empty: implementations keep
/// asking until they get something. Binary input is read to the end of the
/// stream and accepted as-is.
pub trait InputCollector {
    /// Next command token. `Ok(None)` when the command source is exhausted.
    fn command(&mut self) -> Result<Option<String>>;

    fn login(&mut self) -> Result<String>;

    fn password(&mut self) -> Result<String>;

    /// Ask whether to attach meta information and, if so, read it.
    /// Returns an empty string when the user declines.
    fn meta_info(&mut self) -> Result<String>;

    fn text(&mut self) -> Result<String>;

    fn record_id(&mut self) -> Result<u64>;

    fn binary(&mut self) -> Result<Vec<u8>>;

    /// Kind of record to add. `Ok(None)` means the user chose `exit`.
    fn record_kind(&mut self) -> Result<Option<RecordKind>>;

    fn credential_draft(&mut self, meta_info: String) -> Result<RecordDraft> {
        let login = self.login()?;
        let password = self.password()?;
        Ok(RecordDraft::Credential {
            login,
            password,
            meta_info,
        })
    }

    fn text_draft(&mut self, meta_info: String) -> Result<RecordDraft> {
        let text = self.text()?;
        Ok(RecordDraft::Text { text, meta_info })
    }

    fn binary_draft(&mut self, meta_info: String) -> Result<RecordDraft> {
        let binary_data = self.binary()?;
        Ok(RecordDraft::Binary {
            meta_info,
            binary_data,
        })
    }

    /// Build a draft of exactly `kind`.
    fn draft(&mut self, kind: RecordKind, meta_info: String) -> Result<RecordDraft> {
        match kind {
            RecordKind::Credential => self.credential_draft(meta_info),
            RecordKind::Text => self.text_draft(meta_info),
            RecordKind::Binary => self.binary_draft(meta_info),
        }
    }
}

/// Line-oriented collector over any reader/writer pair.
pub struct LineCollector<R, W> {
    input: R,
    output: W,
}

impl LineCollector<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        LineCollector::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> LineCollector<R, W> {
    pub fn new(input: R, output: W) -> Self {
        LineCollector { input, output }
    }

    #[cfg(test)]
    fn into_output(self) -> W {
        self.output
    }

    fn say(&mut self, message: &str) -> Result<()> {
        writeln!(self.output, "{message}")?;
        self.output.flush()?;
        Ok(())
    }

    /// One line without its terminator, or `None` at end of input.
    fn next_line(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        if line.ends_with('\n') {
            line.pop();
            if line.ends_with('\r') {
                line.pop();
            }
        }
        Ok(Some(line))
    }

    fn required_line(&mut self) -> Result<String> {
        self.next_line()?.ok_or(ClientError::InputClosed)
    }

    /// Prompt until a non-empty trimmed token is entered.
    fn token(&mut self, prompt: &str) -> Result<String> {
        loop {
            self.say(prompt)?;
            let line = self.required_line()?;
            let token = line.trim();
            if !token.is_empty() {
                return Ok(token.to_string());
            }
            self.say(EMPTY_VALUE)?;
        }
    }
}

impl<R: BufRead, W: Write> InputCollector for LineCollector<R, W> {
    fn command(&mut self) -> Result<Option<String>> {
        self.say("Enter a command (help for the list):")?;
        loop {
            match self.next_line()? {
                None => return Ok(None),
                Some(line) if line.trim().is_empty() => continue,
                Some(line) => return Ok(Some(line.trim().to_string())),
            }
        }
    }

    fn login(&mut self) -> Result<String> {
        self.token("Enter login:")
    }

    fn password(&mut self) -> Result<String> {
        self.token("Enter password:")
    }

    fn meta_info(&mut self) -> Result<String> {
        loop {
            self.say("Attach meta information to the data? yes/no")?;
            match self.required_line()?.trim() {
                "yes" => break,
                "no" => return Ok(String::new()),
                _ => self.say("Please answer 'yes' or 'no'.")?,
            }
        }
        self.say("Enter meta information:")?;
        self.required_line()
    }

    fn text(&mut self) -> Result<String> {
        loop {
            self.say("Enter text:")?;
            let text = self.required_line()?;
            if !text.is_empty() {
                return Ok(text);
            }
            self.say(EMPTY_VALUE)?;
        }
    }

    fn record_id(&mut self) -> Result<u64> {
        self.say("Enter record id:")?;
        loop {
            let line = self.required_line()?;
            match line.trim().parse::<u64>() {
                Ok(id) => return Ok(id),
                Err(e) => self.say(&format!("Could not read id ({e}), try again:"))?,
            }
        }
    }

    fn binary(&mut self) -> Result<Vec<u8>> {
        self.say("Enter binary data (Ctrl+D to finish):")?;
        let mut data = Vec::new();
        self.input.read_to_end(&mut data)?;
        Ok(data)
    }

    fn record_kind(&mut self) -> Result<Option<RecordKind>> {
        loop {
            self.say(
                "Choose the kind of data to store:\n\
                 login/password: key-pas\n\
                 text: text\n\
                 binary: binary\n\
                 cancel: exit",
            )?;
            let line = self.required_line()?;
            let answer = line.trim();
            if answer == "exit" {
                return Ok(None);
            }
            match answer.parse::<RecordKind>() {
                Ok(kind) => return Ok(Some(kind)),
                Err(e) => self.say(&e)?,
            }
        }
    }
}

/// Interactive collector built on `dialoguer` prompts.
#[derive(Default)]
pub struct TerminalCollector;

impl TerminalCollector {
    pub fn new() -> Self {
        TerminalCollector
    }

    fn non_empty(prompt: &str) -> Result<String> {
        loop {
            // `allow_empty` so the empty case gets our message instead of a
            // silent re-prompt.
            let value: String = Input::new()
                .with_prompt(prompt)
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_error)?;
            if !value.trim().is_empty() {
                return Ok(value);
            }
            println!("{EMPTY_VALUE}");
        }
    }
}

impl InputCollector for TerminalCollector {
    fn command(&mut self) -> Result<Option<String>> {
        loop {
            let command: String = Input::new()
                .with_prompt("keeper")
                .allow_empty(true)
                .interact_text()
                .map_err(prompt_error)?;
            let command = command.trim();
            if !command.is_empty() {
                return Ok(Some(command.to_string()));
            }
        }
    }

    fn login(&mut self) -> Result<String> {
        Self::non_empty("Login").map(|login| login.trim().to_string())
    }

    fn password(&mut self) -> Result<String> {
        loop {
            let password = Password::new()
                .with_prompt("Password")
                .allow_empty_password(true)
                .interact()
                .map_err(prompt_error)?;
            if !password.is_empty() {
                return Ok(password);
            }
            println!("{EMPTY_VALUE}");
        }
    }

    fn meta_info(&mut self) -> Result<String> {
        let attach = Confirm::new()
            .with_prompt("Attach meta information to the data?")
            .default(false)
            .interact()
            .map_err(prompt_error)?;
        if !attach {
            return Ok(String::new());
        }
        let meta: String = Input::new()
            .with_prompt("Meta information")
            .allow_empty(true)
            .interact_text()
            .map_err(prompt_error)?;
        Ok(meta)
    }

    fn text(&mut self) -> Result<String> {
        Self::non_empty("Text")
    }

    fn record_id(&mut self) -> Result<u64> {
        // dialoguer re-prompts on its own when parsing fails.
        let id: u64 = Input::new()
            .with_prompt("Record id")
            .interact_text()
            .map_err(prompt_error)?;
        Ok(id)
    }

    fn binary(&mut self) -> Result<Vec<u8>> {
        println!("Enter binary data (Ctrl+D to finish):");
        let mut data = Vec::new();
        io::stdin().lock().read_to_end(&mut data)?;
        Ok(data)
    }

    fn record_kind(&mut self) -> Result<Option<RecordKind>> {
        let mut items: Vec<&str> = RecordKind::ALL.iter().map(|kind| kind.label()).collect();
        items.push("exit");
        let selection = Select::new()
            .with_prompt("Kind of data to store")
            .items(&items)
            .default(0)
            .interact()
            .map_err(prompt_error)?;
        Ok(RecordKind::ALL.get(selection).copied())
    }
}

fn prompt_error(err: io::Error) -> ClientError {
    match err.kind() {
        io::ErrorKind::UnexpectedEof => ClientError::InputClosed,
        io::ErrorKind::Interrupted => ClientError::Interrupted,
        _ => ClientError::Input(err),
    }
}
