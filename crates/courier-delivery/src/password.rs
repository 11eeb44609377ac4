//! Numeric password prompt guarding pause, skip and abort.

/// Digits the prompt accepts before ignoring further input.
pub const MAX_DIGITS: usize = 4;

/// Input typed so far into an open prompt.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PasswordChallenge {
    input: String,
}

impl PasswordChallenge {
    pub fn input(&self) -> &str {
        &self.input
    }
}

/// Outcome of confirming an open prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Input matched; the admin menu (or settings) opens.
    Granted,
    /// Input did not match; whatever was paused resumes.
    Mismatch,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum PasswordGate {
    #[default]
    Closed,
    Prompt(PasswordChallenge),
}

impl PasswordGate {
    /// Open the prompt with empty input, discarding anything stale.
    pub fn open(&mut self) {
        *self = PasswordGate::Prompt(PasswordChallenge::default());
    }

    pub fn is_open(&self) -> bool {
        matches!(self, PasswordGate::Prompt(_))
    }

    pub fn input(&self) -> Option<&str> {
        match self {
            PasswordGate::Prompt(c) => Some(c.input()),
            PasswordGate::Closed => None,
        }
    }

    /// Append a digit (0-9). Ignored when closed or already full.
    pub fn push_digit(&mut self, digit: u8) -> bool {
        let PasswordGate::Prompt(challenge) = self else {
            return false;
        };
        if digit > 9 || challenge.input.len() >= MAX_DIGITS {
            return false;
        }
        challenge.input.push(char::from(b'0' + digit));
        true
    }

    /// Remove the last digit.
    pub fn delete(&mut self) -> bool {
        match self {
            PasswordGate::Prompt(challenge) => challenge.input.pop().is_some(),
            PasswordGate::Closed => false,
        }
    }

    /// Compare the input with `target` and close the prompt.
    /// Returns `None` if the prompt was not open.
    pub fn confirm(&mut self, target: &str) -> Option<Verdict> {
        let PasswordGate::Prompt(challenge) = core::mem::take(self) else {
            return None;
        };
        if challenge.input == target {
            Some(Verdict::Granted)
        } else {
            Some(Verdict::Mismatch)
        }
    }

    /// Close without comparing.
    pub fn dismiss(&mut self) -> bool {
        let was_open = self.is_open();
        *self = PasswordGate::Closed;
        was_open
    }
}
