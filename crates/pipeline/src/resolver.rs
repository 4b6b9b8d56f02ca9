//! Record resolver: one authoritative record per email.

use std::collections::BTreeMap;

use attribution_core::{email_key, CustomerRecord, RecordStatus, ResolvedRecord};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Resolution summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolverStats {
    pub input_records: usize,
    pub resolved: usize,
    pub no_record: usize,
    /// Emails resolved to a valid UTM record.
    pub valid: usize,
    /// Emails whose oldest record was downgraded to `EMPTY`.
    pub downgraded: usize,
}

/// Resolved rows plus summary.
#[derive(Debug, Clone)]
pub struct ResolverOutput {
    pub records: Vec<ResolvedRecord>,
    pub stats: ResolverStats,
}

/// Collapses the collected rows to exactly one record per distinct email.
///
/// Rows are grouped on the normalized email; output is ordered by that key.
pub fn resolve(records: Vec<CustomerRecord>) -> ResolverOutput {
    let mut stats = ResolverStats {
        input_records: records.len(),
        ..Default::default()
    };

    let mut groups: BTreeMap<String, Vec<CustomerRecord>> = BTreeMap::new();
    for record in records {
        groups.entry(email_key(&record.email)).or_default().push(record);
    }

    let resolved: Vec<ResolvedRecord> = groups
        .into_values()
        .filter_map(|group| {
            let (record, outcome) = resolve_group(group)?;
            match outcome {
                Outcome::NoRecord => stats.no_record += 1,
                Outcome::Valid => stats.valid += 1,
                Outcome::Downgraded => stats.downgraded += 1,
            }
            Some(record)
        })
        .collect();

    stats.resolved = resolved.len();
    info!(
        input_records = stats.input_records,
        resolved = stats.resolved,
        valid = stats.valid,
        downgraded = stats.downgraded,
        no_record = stats.no_record,
        "Resolution complete"
    );

    ResolverOutput {
        records: resolved,
        stats,
    }
}

enum Outcome {
    NoRecord,
    Valid,
    Downgraded,
}

fn resolve_group(mut group: Vec<CustomerRecord>) -> Option<(ResolvedRecord, Outcome)> {
    if group.len() == 1 && group[0].status == RecordStatus::NoRecord {
        return group.pop().map(|r| (r, Outcome::NoRecord));
    }

    // Oldest first; rows without a timestamp last. Stable for ties.
    group.sort_by_key(|r| (r.submitted_at.is_none(), r.submitted_at));

    if let Some(index) = group.iter().position(CustomerRecord::is_valid_attribution) {
        return Some((group.swap_remove(index), Outcome::Valid));
    }

    let first = group.into_iter().next()?;
    if first.status == RecordStatus::NoRecord {
        return Some((first, Outcome::NoRecord));
    }
    debug!(email = %first.email, "No valid UTM record; downgrading oldest");
    Some((first.downgraded(), Outcome::Downgraded))
}
