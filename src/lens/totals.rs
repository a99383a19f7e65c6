//! Prefix count totals across all ASNs

use crate::api::types::{AsnMap, AsnSummary};
use serde::{Deserialize, Serialize};

/// Total prefix counts, split per family
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "display", derive(tabled::Tabled))]
pub struct Totals {
    pub all: u64,
    pub v4: u64,
    pub v6: u64,
}

/// Sum the v4 and v6 counts of every ASN in the mapping
pub fn calculate_totals(asns: &AsnMap) -> Totals {
    sum_summaries(asns.values())
}

pub fn sum_summaries<'a>(summaries: impl IntoIterator<Item = &'a AsnSummary>) -> Totals {
    let (v4, v6) = summaries
        .into_iter()
        .fold((0u64, 0u64), |(v4, v6), s| {
            (v4.saturating_add(s.v4), v6.saturating_add(s.v6))
        });
    Totals {
        all: v4.saturating_add(v6),
        v4,
        v6,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_mapping() {
        assert_eq!(
            calculate_totals(&AsnMap::new()),
            Totals {
                all: 0,
                v4: 0,
                v6: 0
            }
        );
    }

    #[test]
    fn test_two_asns() {
        let asns: AsnMap = [(1, AsnSummary::new(2, 3)), (2, AsnSummary::new(1, 0))]
            .into_iter()
            .collect();
        assert_eq!(
            calculate_totals(&asns),
            Totals {
                all: 6,
                v4: 3,
                v6: 3
            }
        );
    }

    #[test]
    fn test_ignores_server_prefix_field() {
        // `prefixes` is informational; totals come from v4 and v6 only
        let mut summary = AsnSummary::new(4, 1);
        summary.prefixes = Some(100);
        let asns: AsnMap = [(210083, summary)].into_iter().collect();
        assert_eq!(calculate_totals(&asns).all, 5);
    }

    #[test]
    fn test_absurd_counts_saturate() {
        let asns: AsnMap = [
            (1, AsnSummary::new(u64::MAX, 1)),
            (2, AsnSummary::new(5, u64::MAX)),
        ]
        .into_iter()
        .collect();
        assert_eq!(
            calculate_totals(&asns),
            Totals {
                all: u64::MAX,
                v4: u64::MAX,
                v6: u64::MAX
            }
        );
    }
}
