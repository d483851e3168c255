use crate::result::SessionResult;

/// Receives the final result of a session
pub trait ResultSink {
    fn deliver(&mut self, result: &SessionResult);
}

impl<F: FnMut(&SessionResult)> ResultSink for F {
    fn deliver(&mut self, result: &SessionResult) {
        self(result)
    }
}

/// Hands a session result to its sink at most once
pub struct Reporter {
    sink: Box<dyn ResultSink>,
    delivered: bool,
}

impl Reporter {
    pub fn new(sink: impl ResultSink + 'static) -> Self {
        Self {
            sink: Box::new(sink),
            delivered: false,
        }
    }

    /// Returns false if a result was already delivered.
    pub fn report(&mut self, result: &SessionResult) -> bool {
        if self.delivered {
            log::warn!("result for {} already reported, dropping", result.game_id);
            return false;
        }
        self.delivered = true;
        self.sink.deliver(result);
        true
    }

    /// Allow the next session to report again
    pub fn rearm(&mut self) {
        self.delivered = false;
    }
}

impl std::fmt::Debug for Reporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reporter")
            .field("delivered", &self.delivered)
            .finish_non_exhaustive()
    }
}
