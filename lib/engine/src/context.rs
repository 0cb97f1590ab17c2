//! Context assembly and the prompt template.

use hotelrag_core::Record;
use tracing::debug;

/// Separator placed between record texts
pub const DEFAULT_SEPARATOR: &str = " ";

/// Character budget leaving room for the template, the question and the
/// answer inside a 2048-token model window
pub const DEFAULT_MAX_CONTEXT_CHARS: usize = 6000;

/// Render the instruction prompt for one question.
pub fn build_prompt(context: &str, query: &str) -> String {
    format!(
        "Based on the following hotel data: {}\n\nAnswer this question: {}",
        context, query
    )
}

/// Joins record texts, in rank order, under a character budget.
#[derive(Debug, Clone)]
pub struct ContextAssembler {
    separator: String,
    max_chars: usize,
}

impl Default for ContextAssembler {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR, DEFAULT_MAX_CONTEXT_CHARS)
    }
}

impl ContextAssembler {
    pub fn new(separator: impl Into<String>, max_chars: usize) -> Self {
        Self {
            separator: separator.into(),
            max_chars,
        }
    }

    /// Concatenate record texts in the given order.
    ///
    /// Records are kept whole. The first record that would push the total
    /// past the budget is dropped together with every record after it.
    /// No records gives an empty context.
    pub fn build_context<'r, I>(&self, records: I) -> String
    where
        I: IntoIterator<Item = &'r Record>,
    {
        let sep_chars = self.separator.chars().count();
        let mut context = String::new();
        let mut used = 0usize;
        let mut kept = 0usize;

        let mut records = records.into_iter();
        while let Some(record) = records.next() {
            let extra = if kept == 0 { 0 } else { sep_chars };
            let cost = extra + record.text.chars().count();
            if used + cost > self.max_chars {
                let dropped = 1 + records.by_ref().count();
                debug!(
                    "Context budget of {} chars reached; dropped {} lowest-ranked records",
                    self.max_chars, dropped
                );
                break;
            }
            if kept > 0 {
                context.push_str(&self.separator);
            }
            context.push_str(&record.text);
            used += cost;
            kept += 1;
        }

        context
    }
}
