//! Per-customer aggregation and quintile scoring.
//!
//! Scoring is two-phase: [`aggregate_customers`] materializes the whole population's metrics,
//! then [`score_customers`] buckets each metric against that population. A customer's score is
//! only meaningful relative to the population it was scored with.

use std::collections::{BTreeMap, HashSet};
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use crate::error::{RfmError, RfmResult};
use crate::prepare::Transaction;
use crate::processing::{qcut, rank_first, QUINTILES};

const SECONDS_PER_DAY: i64 = 86_400;

/// Default reference date: the day after the last activity in the Online Retail II dataset.
pub fn default_reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2011, 12, 11).unwrap_or(NaiveDate::MIN)
}

/// The three scored RFM metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Recency,
    Frequency,
    Monetary,
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Metric::Recency => "recency",
            Metric::Frequency => "frequency",
            Metric::Monetary => "monetary",
        })
    }
}

/// Raw RFM metrics for one customer.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerMetrics {
    pub customer_id: i64,
    /// Whole days between the reference date and the latest invoice. Negative when the latest
    /// invoice is after the reference date.
    pub recency: i64,
    /// Number of distinct invoices.
    pub frequency: u64,
    /// Sum of `TotalPrice`; always > 0 after [`aggregate_customers`].
    pub monetary: f64,
}

/// Customer metrics plus their quintile scores (each in `1..=5`).
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredCustomer {
    pub metrics: CustomerMetrics,
    pub recency_score: u8,
    pub frequency_score: u8,
    pub monetary_score: u8,
}

#[derive(Default)]
struct Accumulator<'a> {
    last_purchase: Option<NaiveDateTime>,
    invoices: HashSet<&'a str>,
    monetary: f64,
}

/// Groups transactions by customer and computes recency, frequency and monetary.
///
/// Output is ordered by ascending customer id. Customers whose monetary sum is `<= 0` are
/// dropped.
pub fn aggregate_customers(
    transactions: &[Transaction],
    reference_date: NaiveDate,
) -> Vec<CustomerMetrics> {
    let mut by_customer: BTreeMap<i64, Accumulator<'_>> = BTreeMap::new();
    for t in transactions {
        let acc = by_customer.entry(t.customer_id).or_default();
        acc.last_purchase = Some(match acc.last_purchase {
            Some(prev) => prev.max(t.invoice_date),
            None => t.invoice_date,
        });
        acc.invoices.insert(t.invoice.as_str());
        acc.monetary += t.total_price;
    }

    let reference = reference_date.and_time(NaiveTime::MIN);
    let total = by_customer.len();
    let metrics: Vec<CustomerMetrics> = by_customer
        .into_iter()
        .filter_map(|(customer_id, acc)| {
            let last = acc.last_purchase?;
            let recency = days_between(last, reference);
            if recency < 0 {
                tracing::warn!(
                    customer_id,
                    recency,
                    %reference_date,
                    "latest invoice is after the reference date"
                );
            }
            Some(CustomerMetrics {
                customer_id,
                recency,
                frequency: acc.invoices.len() as u64,
                monetary: acc.monetary,
            })
        })
        .filter(|m| m.monetary > 0.0)
        .collect();

    tracing::debug!(
        customers = total,
        dropped_non_positive = total - metrics.len(),
        "aggregated customers"
    );
    metrics
}

/// Floored whole days from `from` to `to`.
fn days_between(from: NaiveDateTime, to: NaiveDateTime) -> i64 {
    (to - from).num_seconds().div_euclid(SECONDS_PER_DAY)
}

/// Assigns quintile scores to every customer, using the whole slice as the population.
///
/// - recency: smallest values score 5, largest score 1
/// - frequency: ranked first (ties broken by position), then smallest score 1
/// - monetary: smallest score 1
///
/// An empty population yields an empty result. A metric that cannot be split into five
/// buckets is an [`RfmError::DegenerateQuantiles`].
pub fn score_customers(customers: Vec<CustomerMetrics>) -> RfmResult<Vec<ScoredCustomer>> {
    if customers.is_empty() {
        return Ok(Vec::new());
    }

    let recency: Vec<f64> = customers.iter().map(|c| c.recency as f64).collect();
    let frequency: Vec<f64> = customers.iter().map(|c| c.frequency as f64).collect();
    let monetary: Vec<f64> = customers.iter().map(|c| c.monetary).collect();

    let recency_buckets = buckets(Metric::Recency, &recency)?;
    let frequency_buckets = buckets(Metric::Frequency, &rank_first(&frequency))?;
    let monetary_buckets = buckets(Metric::Monetary, &monetary)?;

    Ok(customers
        .into_iter()
        .enumerate()
        .map(|(i, metrics)| ScoredCustomer {
            metrics,
            recency_score: (QUINTILES - recency_buckets[i]) as u8,
            frequency_score: (frequency_buckets[i] + 1) as u8,
            monetary_score: (monetary_buckets[i] + 1) as u8,
        })
        .collect())
}

fn buckets(metric: Metric, values: &[f64]) -> RfmResult<Vec<usize>> {
    qcut(values, QUINTILES)
        .map_err(|e| RfmError::DegenerateQuantiles {
            metric,
            distinct: e.distinct,
        })
}

/// Aggregates and scores `transactions` against `reference_date`.
pub fn calculate_rfm(
    transactions: &[Transaction],
    reference_date: NaiveDate,
) -> RfmResult<Vec<ScoredCustomer>> {
    score_customers(aggregate_customers(transactions, reference_date))
}
