//! Report emitters: grouping of atomic changes plus HTML and JSON output.

pub mod html;
pub mod json;
mod template;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::diff::describe::{AtomicChange, ChangeCategory};

/// One row of the final report: all atomic changes for a single API in a
/// single header, with the collapsed change type and verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupedRecord {
    pub headerfile: String,
    pub name: String,
    pub description: String,
    pub changetype: String,
    pub compatibility: String,
}

/// Group atomic records by `(headerfile, name)`.
///
/// The grouped change type is conservative: if any contributing row affects
/// compatibility, the group is "Compatibility Changed"; otherwise it is
/// "Functionality Added". Descriptions concatenate newline-separated.
/// Groups come out ordered by key, so runs are deterministic.
pub fn group_records(rows: &[AtomicChange]) -> Vec<GroupedRecord> {
    struct Agg {
        descriptions: Vec<String>,
        any_compatibility_changed: bool,
    }

    let mut buckets: BTreeMap<(String, String), Agg> = BTreeMap::new();

    for row in rows {
        let key = (row.headerfile.clone(), row.name.clone());
        let agg = buckets.entry(key).or_insert(Agg {
            descriptions: Vec::new(),
            any_compatibility_changed: false,
        });
        if !row.description.is_empty() {
            agg.descriptions.push(row.description.clone());
        }
        if row.changetype == ChangeCategory::CompatibilityChanged {
            agg.any_compatibility_changed = true;
        }
    }

    buckets
        .into_iter()
        .map(|((headerfile, name), agg)| {
            let (changetype, compatibility) = if agg.any_compatibility_changed {
                ("Compatibility Changed", "backward_incompatible")
            } else {
                ("Functionality Added", "backward_compatible")
            };
            GroupedRecord {
                headerfile,
                name,
                description: agg.descriptions.join("\n"),
                changetype: changetype.to_string(),
                compatibility: compatibility.to_string(),
            }
        })
        .collect()
}
