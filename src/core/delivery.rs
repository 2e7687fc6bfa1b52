use crate::domain::model::{DeliveryError, DispatchReport, FormattedMessage, Resume};
use crate::domain::ports::MessageSink;
use std::fmt::Write as _;

/// Telegram rejects messages longer than this many characters.
pub const TELEGRAM_MAX_MESSAGE_CHARS: usize = 4096;

const BLOCK_SEPARATOR: &str = "\n";
const ELLIPSIS: char = '…';

/// Message length the way Telegram counts it: UTF-16 code units, so an
/// emoji outside the BMP costs two.
pub fn message_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Turns resumes into chat-sized messages.
#[derive(Debug, Clone)]
pub struct Renderer {
    max_message_chars: usize,
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(TELEGRAM_MAX_MESSAGE_CHARS)
    }
}

impl Renderer {
    pub fn new(max_message_chars: usize) -> Self {
        Self { max_message_chars }
    }

    pub fn max_message_chars(&self) -> usize {
        self.max_message_chars
    }

    pub fn format_resume(resume: &Resume) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "👤 {} ({})", resume.full_name, resume.source);
        if let Some(headline) = &resume.headline {
            let _ = writeln!(out, "{}", headline);
        }
        if let Some(url) = &resume.profile_url {
            let _ = writeln!(out, "Resume: {}", url);
        }
        if let Some(salary) = &resume.salary_expectation {
            let _ = writeln!(out, "Salary expectation: {}", salary);
        }
        if !resume.skills.is_empty() {
            let skills: Vec<&str> = resume.skills.iter().map(String::as_str).collect();
            let _ = writeln!(out, "Skills: {}", skills.join(", "));
        }
        if !resume.experience.is_empty() {
            let _ = writeln!(out, "Experience:");
            for entry in &resume.experience {
                let _ = writeln!(
                    out,
                    "    {} at {} ({})",
                    entry.role.as_deref().unwrap_or("N/A"),
                    entry.employer.as_deref().unwrap_or("N/A"),
                    entry.duration.as_deref().unwrap_or("N/A"),
                );
            }
        }
        if let Some(contact) = &resume.contact {
            let _ = writeln!(out, "Contact: {}", contact);
        }
        if let Some(pct) = resume.filling_percentage {
            let _ = writeln!(out, "Resume filling percentage: {}%", pct);
        }
        out
    }

    /// A block that alone exceeds the limit is cut, never spread over two
    /// messages.
    fn fit_block(&self, block: String) -> String {
        if message_len(&block) <= self.max_message_chars {
            return block;
        }
        let budget = self
            .max_message_chars
            .saturating_sub(ELLIPSIS.len_utf16());
        let mut used = 0;
        let mut cut: String = block
            .chars()
            .take_while(|c| {
                used += c.len_utf16();
                used <= budget
            })
            .collect();
        cut.push(ELLIPSIS);
        cut
    }

    /// Packs whole resumes greedily into as few messages as fit the limit,
    /// keeping input order.
    pub fn render(&self, resumes: &[Resume]) -> Vec<FormattedMessage> {
        let separator_len = message_len(BLOCK_SEPARATOR);
        let mut messages = Vec::new();
        let mut text = String::new();
        let mut text_len = 0;
        let mut count = 0;

        for resume in resumes {
            let block = self.fit_block(Self::format_resume(resume));
            let block_len = message_len(&block);

            if count > 0 && text_len + separator_len + block_len > self.max_message_chars {
                messages.push(FormattedMessage {
                    text: std::mem::take(&mut text),
                    resume_count: count,
                });
                text_len = 0;
                count = 0;
            }

            if count > 0 {
                text.push_str(BLOCK_SEPARATOR);
                text_len += separator_len;
            }
            text.push_str(&block);
            text_len += block_len;
            count += 1;
        }

        if count > 0 {
            messages.push(FormattedMessage {
                text,
                resume_count: count,
            });
        }
        messages
    }

    /// Headline message for a finished request, including the sources that
    /// could not be searched.
    pub fn summary(&self, report: &DispatchReport) -> FormattedMessage {
        let shown = report.resumes.len();
        let mut text = if shown == 0 {
            "No resumes found.".to_string()
        } else if report.totals.is_empty() {
            format!("Found {} resumes:", shown)
        } else {
            let total: usize = report.totals.iter().map(|(_, n)| n).sum();
            let per_site: Vec<String> = report
                .totals
                .iter()
                .map(|(site, n)| format!("{} on {}", n, site))
                .collect();
            format!(
                "Found {} resumes ({}), showing {}:",
                total.max(shown),
                per_site.join(", "),
                shown
            )
        };
        for (site, failure) in &report.failures {
            let _ = write!(text, "\n⚠️ {} could not be searched: {}", site, failure);
        }
        FormattedMessage {
            text: self.fit_block(text),
            resume_count: 0,
        }
    }
}

/// Sends `messages` in order; stops at the first failure.
pub async fn deliver<S>(
    sink: &S,
    chat_id: i64,
    messages: &[FormattedMessage],
) -> Result<usize, DeliveryError>
where
    S: MessageSink + ?Sized,
{
    for (sent, message) in messages.iter().enumerate() {
        if let Err(e) = sink.send(chat_id, message).await {
            tracing::error!(
                "Delivery to chat {} stopped after {}/{} messages: {}",
                chat_id,
                sent,
                messages.len(),
                e
            );
            return Err(DeliveryError::Interrupted {
                sent,
                total: messages.len(),
                reason: e.to_string(),
            });
        }
    }
    Ok(messages.len())
}
