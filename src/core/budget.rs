//! How many completion tokens are left once the prompt is counted.

use super::tokenizer::Tokenizer;
use super::Result;

const MODEL_CONTEXT_WINDOWS: &[(&str, usize)] = &[
    ("text-davinci-003", 4097),
    ("code-davinci-002", 8001),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenBudget {
    context_window: usize,
}

impl TokenBudget {
    pub fn new(context_window: usize) -> Self {
        Self { context_window }
    }

    pub fn for_model(model: &str) -> Option<Self> {
        MODEL_CONTEXT_WINDOWS
            .iter()
            .find(|(name, _)| *name == model)
            .map(|&(_, window)| Self::new(window))
    }

    pub fn context_window(&self) -> usize {
        self.context_window
    }

    /// Token count of the prompt, segment by segment.
    pub fn prompt_tokens<T, S>(&self, tokenizer: &T, segments: &[S]) -> Result<usize>
    where
        T: Tokenizer + ?Sized,
        S: AsRef<str>,
    {
        segments
            .iter()
            .map(|s| tokenizer.count_tokens(s.as_ref()))
            .sum()
    }

    /// Completion tokens left after the prompt; zero when the prompt alone
    /// fills the window.
    pub fn remaining<T, S>(&self, tokenizer: &T, segments: &[S]) -> Result<usize>
    where
        T: Tokenizer + ?Sized,
        S: AsRef<str>,
    {
        let used = self.prompt_tokens(tokenizer, segments)?;
        let remaining = self.context_window.saturating_sub(used);
        tracing::debug!(used, remaining, window = self.context_window, "token budget");
        Ok(remaining)
    }

    pub fn fits<T, S>(&self, tokenizer: &T, segments: &[S]) -> Result<bool>
    where
        T: Tokenizer + ?Sized,
        S: AsRef<str>,
    {
        Ok(self.remaining(tokenizer, segments)? > 0)
    }
}
