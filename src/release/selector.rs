//! Next-release selection
//!
//! The next release is the lowest version strictly greater than the current
//! one, i.e. the minimal incremental upgrade rather than the latest release.

use tracing::debug;

use crate::release::exclusion::ExclusionRules;
use crate::release::types::{Release, ReleaseSet};
use crate::release::version::Version;

/// Return the release to upgrade to from `current`
///
/// Returns `None` when `current` is unset, when it is quarantined as an
/// upgrade source, or when no newer non-quarantined release exists. The
/// returned release may have no assets; callers must check before offering it.
pub fn next_release<'a>(
    set: &'a ReleaseSet,
    current: Option<&Version>,
    rules: &ExclusionRules,
) -> Option<&'a Release> {
    let current = current?;

    if rules.contains_source(set.owner(), set.app(), current) {
        debug!(
            "Version {} of {}/{} is excluded as an upgrade source",
            current,
            set.owner(),
            set.app()
        );
        return None;
    }

    set.iter()
        .filter(|release| {
            let excluded = rules.contains_target(set.owner(), set.app(), &release.version);
            if excluded {
                debug!(
                    "Skipping release {} of {}/{}: excluded as an upgrade target",
                    release.version,
                    set.owner(),
                    set.app()
                );
            }
            !excluded
        })
        .find(|release| release.version > *current)
}
