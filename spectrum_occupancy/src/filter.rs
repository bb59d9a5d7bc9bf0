// The cascade of categorical selectors: period -> venue -> service -> stakeholder.

use log::debug;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::config::*;

/// The choices offered by every selector, each computed within the subset
/// narrowed by the selectors above it.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CascadeOptions {
    pub periods: Vec<String>,
    pub venues: Vec<String>,
    pub services: Vec<String>,
    pub stakeholders: Vec<String>,
}

impl CascadeOptions {
    pub fn get(&self, dim: Dimension) -> &[String] {
        match dim {
            Dimension::Period => &self.periods,
            Dimension::Venue => &self.venues,
            Dimension::Service => &self.services,
            Dimension::Stakeholder => &self.stakeholders,
        }
    }

    fn set(&mut self, dim: Dimension, values: Vec<String>) {
        match dim {
            Dimension::Period => self.periods = values,
            Dimension::Venue => self.venues = values,
            Dimension::Service => self.services = values,
            Dimension::Stakeholder => self.stakeholders = values,
        }
    }
}

fn distinct_values(records: &[&AssignmentRecord], dim: Dimension) -> Vec<String> {
    let values: BTreeSet<&str> = records.iter().filter_map(|r| dim.value(r)).collect();
    values.into_iter().map(|s| s.to_string()).collect()
}

// A dimension without any value in the whole table (the column is absent or
// blank) cannot narrow anything and is bypassed.
fn populated_dimensions(table: &AssignmentTable) -> HashSet<Dimension> {
    Dimension::CASCADE
        .iter()
        .filter(|dim| table.records.iter().any(|r| dim.value(r).is_some()))
        .cloned()
        .collect()
}

fn accepts(
    ctx: &FilterContext,
    populated: &HashSet<Dimension>,
    dim: Dimension,
    record: &AssignmentRecord,
) -> bool {
    !populated.contains(&dim) || ctx.selection(dim).accepts(dim.value(record))
}

pub fn cascade_options(table: &AssignmentTable, ctx: &FilterContext) -> CascadeOptions {
    let populated = populated_dimensions(table);
    let mut scoped: Vec<&AssignmentRecord> = table.records.iter().collect();
    let mut options = CascadeOptions::default();
    for dim in Dimension::CASCADE {
        options.set(dim, distinct_values(&scoped, dim));
        scoped.retain(|r| accepts(ctx, &populated, dim, r));
    }
    options
}

/// The filtered view: the conjunction of all the active selections.
pub fn apply(table: &AssignmentTable, ctx: &FilterContext) -> AssignmentTable {
    let populated = populated_dimensions(table);
    let records: Vec<AssignmentRecord> = table
        .records
        .iter()
        .filter(|r| {
            Dimension::CASCADE
                .iter()
                .all(|dim| accepts(ctx, &populated, *dim, r))
        })
        .cloned()
        .collect();
    debug!(
        "apply: {} records -> {} records for {:?}",
        table.len(),
        records.len(),
        ctx
    );
    table.with_records(records)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn record(period: &str, venue: &str, service: &str, stakeholder: &str) -> AssignmentRecord {
        let label = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };
        AssignmentRecord {
            request_id: Some(format!("{}-{}-{}-{}", period, venue, service, stakeholder)),
            stakeholder: label(stakeholder),
            venue: label(venue),
            service: label(service),
            period: label(period),
            tuning_range: None,
            frequency: Cell::Empty,
            bandwidth_khz: Cell::Empty,
            power_w: Cell::Empty,
            final_status: None,
            coordination: None,
            cells: vec![],
        }
    }

    fn table() -> AssignmentTable {
        AssignmentTable {
            headers: vec![],
            records: vec![
                record("Olympic", "STA", "PMSE", "BBC"),
                record("Olympic", "STA", "PTT", "NBC"),
                record("Olympic", "AQU", "PMSE", "NBC"),
                record("Paralympic", "VEL", "PTT", "RAI"),
                record("Paralympic", "", "PTT", "RAI"),
            ],
        }
    }

    fn only(values: &[&str]) -> Selection {
        Selection::from_values(values.iter().cloned())
    }

    #[test]
    fn all_selections_keep_everything() {
        let t = table();
        let view = apply(&t, &FilterContext::default());
        assert_eq!(view.len(), t.len());
        let opts = cascade_options(&t, &FilterContext::default());
        assert_eq!(opts.periods, vec!["Olympic", "Paralympic"]);
        assert_eq!(opts.venues, vec!["AQU", "STA", "VEL"]);
    }

    #[test]
    fn upstream_selection_scopes_downstream_options() {
        let t = table();
        let ctx = FilterContext {
            period: only(&["Olympic"]),
            venues: only(&["STA"]),
            ..FilterContext::default()
        };
        let opts = cascade_options(&t, &ctx);
        assert_eq!(opts.periods, vec!["Olympic", "Paralympic"]);
        assert_eq!(opts.venues, vec!["AQU", "STA"]);
        assert_eq!(opts.services, vec!["PMSE", "PTT"]);
        assert_eq!(opts.stakeholders, vec!["BBC", "NBC"]);
        assert_eq!(apply(&t, &ctx).len(), 2);
    }

    #[test]
    fn only_selection_drops_null_values() {
        let t = table();
        let ctx = FilterContext {
            period: only(&["Paralympic"]),
            venues: only(&["VEL"]),
            ..FilterContext::default()
        };
        let view = apply(&t, &ctx);
        assert_eq!(view.len(), 1);
        assert_eq!(view.records[0].venue.as_deref(), Some("VEL"));
    }

    #[test]
    fn empty_selection_is_all() {
        assert_eq!(Selection::from_values(Vec::<String>::new()), Selection::All);
        assert_eq!(Selection::from_values(vec!["All"]), Selection::All);
    }

    #[test]
    fn absent_column_is_bypassed() {
        let mut t = table();
        for r in t.records.iter_mut() {
            r.service = None;
        }
        let ctx = FilterContext {
            services: only(&["PMSE"]),
            ..FilterContext::default()
        };
        assert_eq!(apply(&t, &ctx).len(), t.len());
        assert!(cascade_options(&t, &ctx).services.is_empty());
    }

    fn arb_record() -> impl Strategy<Value = AssignmentRecord> {
        (0..3usize, 0..4usize, 0..3usize, 0..5usize).prop_map(|(p, v, s, k)| {
            record(
                ["Olympic", "Paralympic", ""][p],
                ["STA", "AQU", "VEL", ""][v],
                ["PMSE", "PTT", ""][s],
                ["BBC", "NBC", "RAI", "ZDF", ""][k],
            )
        })
    }

    proptest! {
        #[test]
        fn narrowing_upstream_never_grows_downstream(
            records in proptest::collection::vec(arb_record(), 0..40),
            venue_subset in proptest::collection::btree_set(
                prop_oneof![Just("STA"), Just("AQU"), Just("VEL")], 1..3),
        ) {
            let t = AssignmentTable { headers: vec![], records };
            let wide = FilterContext {
                period: only(&["Olympic"]),
                ..FilterContext::default()
            };
            let narrow = FilterContext {
                venues: Selection::from_values(venue_subset.iter().cloned()),
                ..wide.clone()
            };
            let wide_opts = cascade_options(&t, &wide);
            let narrow_opts = cascade_options(&t, &narrow);
            for dim in [Dimension::Service, Dimension::Stakeholder] {
                let w: BTreeSet<&String> = wide_opts.get(dim).iter().collect();
                for v in narrow_opts.get(dim) {
                    prop_assert!(w.contains(v));
                }
            }
            prop_assert!(apply(&t, &narrow).len() <= apply(&t, &wide).len());
        }
    }
}
