// Occupancy of the venue bands by the assigned channels.

use log::debug;
use std::collections::BTreeSet;

use crate::config::*;

/// A closed frequency interval in MHz.
#[derive(PartialEq, Debug, Clone, Copy)]
pub struct Interval {
    pub lower: f64,
    pub upper: f64,
}

impl Interval {
    pub fn new(lower: f64, upper: f64) -> Interval {
        Interval { lower, upper }
    }

    pub fn length(&self) -> f64 {
        self.upper - self.lower
    }

    /// The part of the interval inside [lower, upper], if it has a positive length.
    pub fn clip(&self, lower: f64, upper: f64) -> Option<Interval> {
        let c = Interval::new(self.lower.max(lower), self.upper.min(upper));
        if c.length() > 0.0 {
            Some(c)
        } else {
            None
        }
    }
}

/// Merges overlapping or adjacent intervals.
///
/// The result is sorted and disjoint; it does not depend on the input order.
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    let mut sorted: Vec<Interval> = intervals.to_vec();
    sorted.sort_by(|a, b| a.lower.total_cmp(&b.lower));
    let mut merged: Vec<Interval> = Vec::new();
    for iv in sorted {
        match merged.last_mut() {
            Some(cur) if iv.lower <= cur.upper => {
                cur.upper = cur.upper.max(iv.upper);
            }
            _ => merged.push(iv),
        }
    }
    merged
}

/// The total length covered by the intervals inside [lower, upper].
///
/// Never more than `upper - lower`.
pub fn covered_length(intervals: &[Interval], lower: f64, upper: f64) -> f64 {
    let clipped: Vec<Interval> = intervals
        .iter()
        .filter_map(|iv| iv.clip(lower, upper))
        .collect();
    merge_intervals(&clipped).iter().map(|iv| iv.length()).sum()
}

/// The occupancy of one band by the rows of its venue.
pub fn band_occupancy(rows: &[DerivedRow], band: &CapacityRecord) -> OccupancyResult {
    let intervals: Vec<Interval> = rows
        .iter()
        .filter(|r| r.venue.as_deref() == Some(band.venue.as_str()))
        .map(|r| Interval::new(r.lower_mhz(), r.upper_mhz()))
        .collect();
    let occupied_mhz = covered_length(&intervals, band.lower_mhz, band.upper_mhz);
    let occupancy_pct = if band.total_mhz > 0.0 {
        // The stated total may be smaller than the span of the band.
        (occupied_mhz / band.total_mhz * 100.0).min(100.0)
    } else {
        0.0
    };
    OccupancyResult {
        venue: band.venue.clone(),
        lower_mhz: band.lower_mhz,
        upper_mhz: band.upper_mhz,
        total_mhz: band.total_mhz,
        occupied_mhz,
        occupancy_pct,
    }
}

/// The occupancy of the bands of the given venues. Bands without any
/// occupancy are dropped.
pub fn compute_occupancy(
    rows: &[DerivedRow],
    capacity: &[CapacityRecord],
    venues: &BTreeSet<String>,
) -> Vec<OccupancyResult> {
    let mut res: Vec<OccupancyResult> = capacity
        .iter()
        .filter(|band| venues.contains(&band.venue))
        .map(|band| band_occupancy(rows, band))
        .filter(|occ| occ.occupancy_pct > 0.0)
        .collect();
    res.sort_by(|a, b| {
        a.venue
            .cmp(&b.venue)
            .then(a.lower_mhz.total_cmp(&b.lower_mhz))
    });
    debug!(
        "compute_occupancy: {} bands occupied out of {} for venues {:?}",
        res.len(),
        capacity.len(),
        venues
    );
    res
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn row(venue: &str, lower: f64, upper: f64) -> DerivedRow {
        DerivedRow {
            request_id: format!("{}-{}", lower, upper),
            stakeholder: None,
            venue: Some(venue.to_string()),
            center_mhz: (lower + upper) / 2.0,
            width_mhz: upper - lower,
            bandwidth_khz: (upper - lower) * 1000.0,
            power: 30.0,
            tuning_range: None,
        }
    }

    fn band(venue: &str, lower: f64, upper: f64) -> CapacityRecord {
        CapacityRecord {
            venue: venue.to_string(),
            lower_mhz: lower,
            upper_mhz: upper,
            total_mhz: upper - lower,
        }
    }

    #[test]
    fn overlapping_intervals_merge() {
        let rows = vec![row("STA", 401.0, 403.0), row("STA", 402.0, 405.0)];
        let occ = band_occupancy(&rows, &band("STA", 400.0, 410.0));
        assert!((occ.occupied_mhz - 4.0).abs() < 1e-9);
        assert!((occ.occupancy_pct - 40.0).abs() < 1e-9);
    }

    #[test]
    fn adjacent_intervals_merge() {
        let merged = merge_intervals(&[Interval::new(3.0, 4.0), Interval::new(1.0, 3.0)]);
        assert_eq!(merged, vec![Interval::new(1.0, 4.0)]);
    }

    #[test]
    fn intervals_are_clipped_to_the_band() {
        let rows = vec![row("STA", 395.0, 402.0), row("STA", 409.0, 420.0)];
        let occ = band_occupancy(&rows, &band("STA", 400.0, 410.0));
        assert!((occ.occupied_mhz - 3.0).abs() < 1e-9);
    }

    #[test]
    fn no_intersection_is_zero_and_exact_cover_is_hundred() {
        let b = band("STA", 400.0, 410.0);
        assert_eq!(band_occupancy(&[row("STA", 420.0, 430.0)], &b).occupancy_pct, 0.0);
        assert_eq!(band_occupancy(&[row("AQU", 400.0, 410.0)], &b).occupancy_pct, 0.0);
        let full = band_occupancy(&[row("STA", 400.0, 410.0)], &b);
        assert!((full.occupancy_pct - 100.0).abs() < 1e-9);
    }

    #[test]
    fn zero_total_is_zero_occupancy() {
        let mut b = band("STA", 400.0, 410.0);
        b.total_mhz = 0.0;
        assert_eq!(band_occupancy(&[row("STA", 400.0, 410.0)], &b).occupancy_pct, 0.0);
    }

    #[test]
    fn empty_bands_and_other_venues_are_dropped() {
        let rows = vec![row("STA", 401.0, 402.0), row("VEL", 501.0, 502.0)];
        let capacity = vec![
            band("STA", 400.0, 410.0),
            band("STA", 300.0, 310.0),
            band("VEL", 500.0, 510.0),
        ];
        let venues: BTreeSet<String> = ["STA".to_string()].into_iter().collect();
        let res = compute_occupancy(&rows, &capacity, &venues);
        assert_eq!(res.len(), 1);
        assert_eq!(res[0].lower_mhz, 400.0);
    }

    fn arb_intervals() -> impl Strategy<Value = Vec<Interval>> {
        proptest::collection::vec((380.0..430.0f64, 0.0..8.0f64), 0..20)
            .prop_map(|v| v.into_iter().map(|(lo, w)| Interval::new(lo, lo + w)).collect())
    }

    proptest! {
        #[test]
        fn covered_length_is_bounded_by_the_band(ivs in arb_intervals()) {
            let len = covered_length(&ivs, 400.0, 410.0);
            prop_assert!(len >= 0.0);
            prop_assert!(len <= 10.0 + 1e-9);
        }

        #[test]
        fn covered_length_ignores_order(ivs in arb_intervals()) {
            let mut rev = ivs.clone();
            rev.reverse();
            let a = covered_length(&ivs, 400.0, 410.0);
            let b = covered_length(&rev, 400.0, 410.0);
            prop_assert!((a - b).abs() < 1e-9);
        }

        #[test]
        fn covered_length_is_monotone(ivs in arb_intervals(), lo in 380.0..430.0f64, w in 0.0..8.0f64) {
            let before = covered_length(&ivs, 400.0, 410.0);
            let mut more = ivs.clone();
            more.push(Interval::new(lo, lo + w));
            let after = covered_length(&more, 400.0, 410.0);
            prop_assert!(after + 1e-9 >= before);
        }
    }
}
