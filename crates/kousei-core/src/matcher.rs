//! Maps an engine finding back to a catalog rule and its enabled flag.
//!
//! Most engine rule ids are a shortened form of a catalog id (the engine drops
//! the `preset-` prefix, for example), so a catalog entry matches when its id
//! contains the reported id. The prh dictionary engine reports every finding
//! as `prh`; the dictionary entry that produced it only shows up in the message
//! text, as `（誤字）` and the like.

use crate::catalog::{AGGREGATOR_RULE_ID, RuleCatalog};
use crate::settings::EffectiveSettings;

/// Whether a finding should be shown under `settings`.
///
/// Every catalog entry is visited in order and each match overwrites the
/// result, so the last matching entry wins. Findings that match nothing are
/// suppressed.
pub fn is_enabled(
    catalog: &RuleCatalog,
    settings: &EffectiveSettings,
    rule_id: &str,
    message: &str,
) -> bool {
    let mut enabled = false;

    for rule in catalog {
        if rule_id == AGGREGATOR_RULE_ID {
            let tag = format!("（{}）", rule.short_key());
            if message.contains(&tag) {
                enabled = settings.is_enabled(rule);
            }
        } else if rule.id.contains(rule_id) {
            enabled = settings.is_enabled(rule);
        }
    }

    enabled
}
