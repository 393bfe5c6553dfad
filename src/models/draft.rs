use crate::error::SyncError;

/// Minimum number of option slots a poll form keeps, and the minimum number
/// of non-blank options a poll is created with.
pub const MIN_OPTIONS: usize = 2;

/// Editable state of the "create poll" form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDraft {
    pub question: String,
    pub options: Vec<String>,
}

impl Default for PollDraft {
    fn default() -> Self {
        PollDraft {
            question: String::new(),
            options: vec![String::new(); MIN_OPTIONS],
        }
    }
}

impl PollDraft {
    pub fn add_option(&mut self) {
        self.options.push(String::new());
    }

    pub fn update_option(&mut self, index: usize, value: impl Into<String>) {
        if let Some(slot) = self.options.get_mut(index) {
            *slot = value.into();
        }
    }

    /// Removes the slot at `index`. The form never shrinks below two slots.
    pub fn remove_option(&mut self, index: usize) -> Result<(), SyncError> {
        if self.options.len() <= MIN_OPTIONS {
            return Err(SyncError::InvalidPoll(format!(
                "a poll must have at least {} options",
                MIN_OPTIONS
            )));
        }
        if index < self.options.len() {
            self.options.remove(index);
        }
        Ok(())
    }

    /// The question and non-blank options, validated for submission.
    pub fn submission(&self) -> Result<(String, Vec<String>), SyncError> {
        validate_poll(&self.question, &self.options)
    }

    pub fn reset(&mut self) {
        *self = PollDraft::default();
    }
}

/// Drops blank options and checks what is left.
pub fn validate_poll(question: &str, options: &[String]) -> Result<(String, Vec<String>), SyncError> {
    if question.trim().is_empty() {
        return Err(SyncError::InvalidPoll("question must not be empty".to_owned()));
    }
    let options: Vec<String> = options
        .iter()
        .filter(|option| !option.trim().is_empty())
        .cloned()
        .collect();
    if options.len() < MIN_OPTIONS {
        return Err(SyncError::InvalidPoll(format!(
            "you need at least {} options for a poll",
            MIN_OPTIONS
        )));
    }
    Ok((question.to_owned(), options))
}
