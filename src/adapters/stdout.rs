use crate::domain::model::{DeliveryError, FormattedMessage};
use crate::domain::ports::MessageSink;
use async_trait::async_trait;
use std::io::Write;
use std::sync::Mutex;

/// Prints messages to any writer, separated by a rule. Used by the
/// command-line search where there is no chat.
pub struct StdoutSink<W: Write + Send> {
    out: Mutex<W>,
}

impl StdoutSink<std::io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }
}

impl<W: Write + Send> StdoutSink<W> {
    pub fn new(out: W) -> Self {
        Self {
            out: Mutex::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        match self.out.into_inner() {
            Ok(out) => out,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

#[async_trait]
impl<W: Write + Send> MessageSink for StdoutSink<W> {
    async fn send(&self, _chat_id: i64, message: &FormattedMessage) -> Result<(), DeliveryError> {
        let mut out = self.out.lock().map_err(|_| DeliveryError::ChannelRejected {
            reason: "output lock poisoned".to_string(),
        })?;
        writeln!(out, "{}\n{}", message.text.trim_end(), "-".repeat(40))
            .and_then(|_| out.flush())
            .map_err(|e| DeliveryError::ChannelRejected {
                reason: e.to_string(),
            })
    }
}
