use std::collections::{BTreeMap, HashSet};

use crate::document::{ConfigDocument, underscore_form};
use crate::types::OptValue;

/// Carry document keys that match no declared option into `values`, under
/// their underscore spelling. Existing entries always win.
pub fn merge_residual(
    values: &mut BTreeMap<String, OptValue>,
    document: &ConfigDocument,
    declared: &HashSet<String>,
) {
    for (key, value) in document.table() {
        let name = underscore_form(key);
        if declared.contains(&name) || values.contains_key(&name) {
            continue;
        }
        tracing::trace!(key = %key, "residual config key merged");
        values.insert(name, OptValue::from(value.clone()));
    }
}
