/// How many times a prompt or a generated value may be retried.
///
/// The default has no cap: the console keeps asking until it gets an
/// acceptable answer. Tests and unattended runs set a cap.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: Option<u32>,
}

impl RetryPolicy {
    pub fn unbounded() -> Self {
        RetryPolicy { max_attempts: None }
    }

    /// At most `attempts` tries; zero means no cap
    pub fn capped(attempts: u32) -> Self {
        RetryPolicy {
            max_attempts: (attempts > 0).then_some(attempts),
        }
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    /// True once `attempts` failed tries have used up the budget
    pub fn exhausted(&self, attempts: u32) -> bool {
        self.max_attempts.is_some_and(|max| attempts >= max)
    }
}
