//! Maps (recency score, frequency score) pairs to named marketing segments.
//!
//! [`SEGMENT_RULES`] is evaluated in order and the first rule whose recency and frequency
//! ranges both contain the scores wins. Monetary score plays no part in classification.

use std::fmt;
use std::ops::RangeInclusive;

use serde::{Deserialize, Serialize};

use crate::error::{RfmError, RfmResult};
use crate::rfm::ScoredCustomer;

/// Named customer segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Segment {
    Hibernating,
    AtRisk,
    CantLoose,
    AboutToSleep,
    NeedAttention,
    LoyalCustomers,
    Promising,
    NewCustomers,
    PotentialLoyalists,
    Champions,
}

impl Segment {
    /// All segments, in rule order.
    pub const ALL: [Segment; 10] = [
        Segment::Hibernating,
        Segment::AtRisk,
        Segment::CantLoose,
        Segment::AboutToSleep,
        Segment::NeedAttention,
        Segment::LoyalCustomers,
        Segment::Promising,
        Segment::NewCustomers,
        Segment::PotentialLoyalists,
        Segment::Champions,
    ];

    /// Label written to output files.
    pub fn as_str(self) -> &'static str {
        match self {
            Segment::Hibernating => "hibernating",
            Segment::AtRisk => "at_risk",
            Segment::CantLoose => "cant_loose",
            Segment::AboutToSleep => "about_to_sleep",
            Segment::NeedAttention => "need_attention",
            Segment::LoyalCustomers => "loyal_customers",
            Segment::Promising => "promising",
            Segment::NewCustomers => "new_customers",
            Segment::PotentialLoyalists => "potential_loyalists",
            Segment::Champions => "champions",
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One row of the segment table: a digit class for each score position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRule {
    pub recency: RangeInclusive<u8>,
    pub frequency: RangeInclusive<u8>,
    pub segment: Segment,
}

impl SegmentRule {
    const fn new(recency: RangeInclusive<u8>, frequency: RangeInclusive<u8>, segment: Segment) -> Self {
        Self {
            recency,
            frequency,
            segment,
        }
    }

    /// Whether both scores fall in this rule's classes.
    pub fn matches(&self, recency_score: u8, frequency_score: u8) -> bool {
        self.recency.contains(&recency_score) && self.frequency.contains(&frequency_score)
    }
}

/// Segment table in priority order.
pub const SEGMENT_RULES: [SegmentRule; 10] = [
    SegmentRule::new(1..=2, 1..=2, Segment::Hibernating),
    SegmentRule::new(1..=2, 3..=4, Segment::AtRisk),
    SegmentRule::new(1..=2, 5..=5, Segment::CantLoose),
    SegmentRule::new(3..=3, 1..=2, Segment::AboutToSleep),
    SegmentRule::new(3..=3, 3..=3, Segment::NeedAttention),
    SegmentRule::new(3..=4, 4..=5, Segment::LoyalCustomers),
    SegmentRule::new(4..=4, 1..=1, Segment::Promising),
    SegmentRule::new(5..=5, 1..=1, Segment::NewCustomers),
    SegmentRule::new(4..=5, 2..=3, Segment::PotentialLoyalists),
    SegmentRule::new(5..=5, 4..=5, Segment::Champions),
];

/// The two-digit "RF" code, e.g. `"53"`.
pub fn rfm_code(recency_score: u8, frequency_score: u8) -> String {
    format!("{recency_score}{frequency_score}")
}

/// Classifies a score pair; a pair matching no rule is an [`RfmError::UnmatchedSegment`].
///
/// ```rust
/// use rfm_segmentation::segment::{segment_for, Segment};
///
/// assert_eq!(segment_for(5, 5).unwrap(), Segment::Champions);
/// assert_eq!(segment_for(1, 1).unwrap(), Segment::Hibernating);
/// assert!(segment_for(0, 6).is_err());
/// ```
pub fn segment_for(recency_score: u8, frequency_score: u8) -> RfmResult<Segment> {
    SEGMENT_RULES
        .iter()
        .find(|rule| rule.matches(recency_score, frequency_score))
        .map(|rule| rule.segment)
        .ok_or_else(|| RfmError::UnmatchedSegment {
            code: rfm_code(recency_score, frequency_score),
        })
}

/// Final per-customer output record.
#[derive(Debug, Clone, PartialEq)]
pub struct CustomerSegment {
    pub customer: ScoredCustomer,
    pub segment: Segment,
}

impl CustomerSegment {
    pub fn customer_id(&self) -> i64 {
        self.customer.metrics.customer_id
    }
}

/// Classifies every scored customer; fails on the first unmatched code.
pub fn assign_segments(customers: Vec<ScoredCustomer>) -> RfmResult<Vec<CustomerSegment>> {
    customers
        .into_iter()
        .map(|customer| {
            let segment = segment_for(customer.recency_score, customer.frequency_score)?;
            Ok(CustomerSegment { customer, segment })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{assign_segments, rfm_code, segment_for, Segment, SEGMENT_RULES};
    use crate::error::RfmError;
    use crate::rfm::{CustomerMetrics, ScoredCustomer};

    #[test]
    fn table_covers_every_valid_score_pair() {
        for r in 1..=5 {
            for f in 1..=5 {
                assert!(segment_for(r, f).is_ok(), "no segment for {r}{f}");
            }
        }
    }

    #[test]
    fn every_valid_pair_matches_exactly_one_rule() {
        for r in 1..=5 {
            for f in 1..=5 {
                let hits = SEGMENT_RULES.iter().filter(|rule| rule.matches(r, f)).count();
                assert_eq!(hits, 1, "code {r}{f}");
            }
        }
    }

    #[test]
    fn known_codes_map_to_expected_segments() {
        let cases = [
            (1, 1, Segment::Hibernating),
            (2, 4, Segment::AtRisk),
            (1, 5, Segment::CantLoose),
            (3, 2, Segment::AboutToSleep),
            (3, 3, Segment::NeedAttention),
            (4, 4, Segment::LoyalCustomers),
            (3, 5, Segment::LoyalCustomers),
            (4, 1, Segment::Promising),
            (5, 1, Segment::NewCustomers),
            (4, 3, Segment::PotentialLoyalists),
            (5, 2, Segment::PotentialLoyalists),
            (5, 5, Segment::Champions),
        ];
        for (r, f, expected) in cases {
            assert_eq!(segment_for(r, f).unwrap(), expected, "code {}", rfm_code(r, f));
        }
    }

    #[test]
    fn out_of_range_code_is_an_error() {
        let err = segment_for(6, 1).unwrap_err();
        assert!(matches!(err, RfmError::UnmatchedSegment { ref code } if code == "61"));
    }

    #[test]
    fn labels_are_snake_case() {
        let labels: Vec<_> = Segment::ALL.iter().map(|s| s.to_string()).collect();
        assert!(labels.contains(&"cant_loose".to_string()));
        assert!(labels.contains(&"potential_loyalists".to_string()));
        assert_eq!(serde_json::to_string(&Segment::AtRisk).unwrap(), "\"at_risk\"");
    }

    #[test]
    fn assign_segments_rejects_invalid_scores() {
        let bad = ScoredCustomer {
            metrics: CustomerMetrics {
                customer_id: 1,
                recency: 1,
                frequency: 1,
                monetary: 1.0,
            },
            recency_score: 0,
            frequency_score: 3,
            monetary_score: 3,
        };
        assert!(assign_segments(vec![bad]).is_err());
    }
}
