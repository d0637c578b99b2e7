//! Advisory check for editing against an outdated version.

use serde::{Deserialize, Serialize};

/// Versions the form was opened with, supplied by the hosting session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionContext {
    /// Version of the secret the form was pre-filled from.
    pub previous_version: Option<u64>,
    /// Latest version according to the metadata endpoint.
    pub current_version: Option<u64>,
}

impl VersionContext {
    pub fn new(previous_version: Option<u64>, current_version: Option<u64>) -> Self {
        Self { previous_version, current_version }
    }
}

/// True when the user may be editing against outdated data.
///
/// Version `0` counts as absent. Once the draft is persisted the advisory is
/// off, so it does not flash between a save and the route transition.
pub fn is_stale(ctx: &VersionContext, is_new_record: bool) -> bool {
    if !is_new_record {
        return false;
    }
    match (ctx.previous_version, ctx.current_version) {
        (Some(previous), Some(current)) if previous != 0 && current != 0 => previous != current,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_truth_table() {
        assert!(is_stale(&VersionContext::new(Some(1), Some(2)), true));
        assert!(!is_stale(&VersionContext::new(Some(2), Some(2)), true));
        assert!(!is_stale(&VersionContext::new(Some(1), Some(2)), false));
        assert!(!is_stale(&VersionContext::new(None, Some(2)), true));
        assert!(!is_stale(&VersionContext::new(Some(1), None), true));
        assert!(!is_stale(&VersionContext::new(Some(0), Some(2)), true));
        assert!(!is_stale(&VersionContext::default(), true));
    }

    proptest! {
        #[test]
        fn stale_iff_new_and_both_present_and_different(
            previous in proptest::option::of(0u64..5),
            current in proptest::option::of(0u64..5),
            is_new in any::<bool>(),
        ) {
            let ctx = VersionContext::new(previous, current);
            let present = |v: Option<u64>| v.is_some_and(|n| n != 0);
            let expected = is_new && present(previous) && present(current) && previous != current;
            prop_assert_eq!(is_stale(&ctx, is_new), expected);
        }
    }
}
