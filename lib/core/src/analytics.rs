use crate::RowStore;
use serde::Serialize;

/// Aggregate booking statistics over the whole row store
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Analytics {
    /// Sum of `adr`
    pub total_revenue: f64,
    /// Percentage of canceled bookings, 0 to 100
    pub cancellation_rate: f64,
    pub average_lead_time: f64,
}

impl Analytics {
    /// Single pass over the rows. An empty store reports zeros.
    pub fn compute(rows: &RowStore) -> Self {
        let (revenue, canceled, lead_time) = rows.iter().fold(
            (0.0f64, 0usize, 0.0f64),
            |(revenue, canceled, lead_time), r| {
                (
                    revenue + r.adr,
                    canceled + usize::from(r.is_canceled),
                    lead_time + f64::from(r.lead_time),
                )
            },
        );

        if rows.is_empty() {
            return Self {
                total_revenue: 0.0,
                cancellation_rate: 0.0,
                average_lead_time: 0.0,
            };
        }

        let n = rows.len() as f64;
        Self {
            total_revenue: revenue,
            cancellation_rate: 100.0 * canceled as f64 / n,
            average_lead_time: lead_time / n,
        }
    }
}
