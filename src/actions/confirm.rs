//! Interactive confirmation before an auto-clean.
//!
//! [`assess`] sums what an auto-clean would remove. [`ConfirmationGate`]
//! shows those numbers on a [`ConfirmationChannel`] and waits for an
//! explicit answer. Nothing is ever confirmed implicitly: an empty batch is
//! [`Decision::NothingToDo`] without a prompt, and a channel that cannot be
//! opened or is closed mid-prompt gives [`Decision::Unavailable`].

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};

use bytesize::ByteSize;

use crate::duplicates::DuplicateGroup;
use crate::scanner::FileRecords;

/// What an auto-clean would remove.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CleanupAssessment {
    /// Non-first members across all groups.
    pub files_to_delete: usize,
    /// Recorded size of those members.
    pub bytes_to_delete: u64,
}

impl CleanupAssessment {
    /// Whether the auto-clean would remove nothing.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files_to_delete == 0
    }
}

/// Sum every non-first member of `groups`. Unknown paths add no bytes.
#[must_use]
pub fn assess(groups: &[DuplicateGroup], records: &FileRecords) -> CleanupAssessment {
    groups
        .iter()
        .flat_map(DuplicateGroup::rest)
        .fold(CleanupAssessment::default(), |mut acc, path| {
            acc.files_to_delete += 1;
            acc.bytes_to_delete += records.size_of(path).unwrap_or(0);
            acc
        })
}

/// Outcome of a confirmation round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing to remove; no prompt was shown.
    NothingToDo,
    /// The user answered yes.
    Confirmed,
    /// The user answered no.
    Declined,
    /// No answer could be obtained.
    Unavailable,
}

impl Decision {
    /// Whether the auto-clean may proceed.
    #[must_use]
    pub fn is_confirmed(self) -> bool {
        self == Self::Confirmed
    }
}

/// Where the prompt is shown and the answer read.
pub trait ConfirmationChannel {
    /// Show text to the user.
    ///
    /// # Errors
    ///
    /// Returns an error if the output cannot be written.
    fn write_prompt(&mut self, text: &str) -> io::Result<()>;

    /// Read one line. `Ok(None)` means the input is closed.
    ///
    /// # Errors
    ///
    /// Returns an error if the input cannot be read.
    fn read_response(&mut self) -> io::Result<Option<String>>;
}

/// The controlling terminal: answers come from `/dev/tty` (`CONIN$` on
/// Windows), the prompt goes to stderr. Both survive a redirected stdout.
pub struct TerminalChannel {
    input: BufReader<File>,
}

impl TerminalChannel {
    #[cfg(windows)]
    const DEVICE: &'static str = "CONIN$";
    #[cfg(not(windows))]
    const DEVICE: &'static str = "/dev/tty";

    /// Open the terminal device.
    ///
    /// # Errors
    ///
    /// Returns an error if there is no controlling terminal.
    pub fn open() -> io::Result<Self> {
        let file = File::open(Self::DEVICE)?;
        Ok(Self {
            input: BufReader::new(file),
        })
    }
}

impl ConfirmationChannel for TerminalChannel {
    fn write_prompt(&mut self, text: &str) -> io::Result<()> {
        let mut stderr = io::stderr().lock();
        stderr.write_all(text.as_bytes())?;
        stderr.flush()
    }

    fn read_response(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        match self.input.read_line(&mut line)? {
            0 => Ok(None),
            _ => Ok(Some(line)),
        }
    }
}

/// Canned answers with a transcript of everything written.
#[derive(Debug, Clone, Default)]
pub struct ScriptedChannel {
    answers: VecDeque<String>,
    transcript: String,
}

impl ScriptedChannel {
    /// Replay `answers` in order, then report a closed input.
    #[must_use]
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: String::new(),
        }
    }

    /// Everything written so far.
    #[must_use]
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    /// Answers not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl ConfirmationChannel for ScriptedChannel {
    fn write_prompt(&mut self, text: &str) -> io::Result<()> {
        self.transcript.push_str(text);
        Ok(())
    }

    fn read_response(&mut self) -> io::Result<Option<String>> {
        Ok(self.answers.pop_front())
    }
}

const RULE_WIDTH: usize = 60;

/// Accepted affirmative answers.
pub const YES_ANSWERS: [&str; 2] = ["yes", "y"];
/// Accepted negative answers.
pub const NO_ANSWERS: [&str; 2] = ["no", "n"];

/// Asks before anything irreversible happens.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConfirmationGate;

impl ConfirmationGate {
    /// Create a gate.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Confirm on the controlling terminal.
    ///
    /// When no terminal can be opened the user is warned on stderr and the
    /// answer is [`Decision::Unavailable`].
    #[must_use]
    pub fn confirm_on_terminal(&self, assessment: &CleanupAssessment) -> Decision {
        if assessment.is_empty() {
            return self.nothing_to_do();
        }
        match TerminalChannel::open() {
            Ok(mut channel) => self.confirm(assessment, &mut channel),
            Err(e) => {
                log::debug!("Cannot open terminal: {}", e);
                eprint!("{}", Self::unavailable_notice("Interactive terminal not available"));
                Decision::Unavailable
            }
        }
    }

    /// Show the assessment on `channel` and wait for yes or no.
    pub fn confirm<C: ConfirmationChannel + ?Sized>(
        &self,
        assessment: &CleanupAssessment,
        channel: &mut C,
    ) -> Decision {
        if assessment.is_empty() {
            return self.nothing_to_do();
        }

        match self.ask(assessment, channel) {
            Ok(decision) => decision,
            Err(e) => {
                log::debug!("Confirmation channel failed: {}", e);
                eprint!(
                    "{}",
                    Self::unavailable_notice(&format!("Confirmation channel failed: {}", e))
                );
                Decision::Unavailable
            }
        }
    }

    fn nothing_to_do(&self) -> Decision {
        log::info!("No duplicate files to delete.");
        Decision::NothingToDo
    }

    fn ask<C: ConfirmationChannel + ?Sized>(
        &self,
        assessment: &CleanupAssessment,
        channel: &mut C,
    ) -> io::Result<Decision> {
        channel.write_prompt(&Self::banner(assessment))?;
        channel.write_prompt("\nAre you sure you want to proceed? (yes/no): ")?;

        loop {
            let Some(line) = channel.read_response()? else {
                log::debug!("Confirmation channel closed before an answer");
                channel.write_prompt(&Self::unavailable_notice("No answer received"))?;
                return Ok(Decision::Unavailable);
            };
            let answer = line.trim().to_lowercase();

            if YES_ANSWERS.contains(&answer.as_str()) {
                channel.write_prompt("\nConfirmed. Starting auto-clean...\n")?;
                return Ok(Decision::Confirmed);
            }
            if NO_ANSWERS.contains(&answer.as_str()) {
                channel.write_prompt("\nCancelled. Auto-clean aborted.\n")?;
                return Ok(Decision::Declined);
            }

            let valid: Vec<&str> = YES_ANSWERS.iter().chain(NO_ANSWERS.iter()).copied().collect();
            channel.write_prompt(&format!(
                "Invalid response. Please enter one of: {}: ",
                valid.join(", ")
            ))?;
        }
    }

    /// Why auto-clean did not run, shown even in quiet mode.
    fn unavailable_notice(reason: &str) -> String {
        format!(
            "\nWARNING: {}\nCannot confirm auto-clean operation.\nPlease run the command interactively.\n",
            reason
        )
    }

    fn banner(assessment: &CleanupAssessment) -> String {
        let heavy = "=".repeat(RULE_WIDTH);
        let light = "-".repeat(RULE_WIDTH);
        format!(
            "\n{heavy}\nAUTO-CLEAN CONFIRMATION\n{heavy}\n\n\
             WARNING: This operation will delete files!\n\n\
             Statistics:\n  Files to delete: {}\n  Space to free:   {}\n\n\
             Action: Keeping the first file in each duplicate group\n        and deleting all copies\n\n{light}\n",
            assessment.files_to_delete,
            ByteSize(assessment.bytes_to_delete),
        )
    }
}
