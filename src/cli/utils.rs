//! Shared CLI utilities.

use crate::config::{BaseSource, OverrideSource, Sources};
use std::path::Path;

/// Map the global source flags onto loader sources. `--no-override` beats an
/// override path from either the flag or the environment.
pub fn sources_from_args(
    base: Option<&Path>,
    properties: Option<&Path>,
    no_override: bool,
) -> Sources {
    let base = base.map_or(BaseSource::Bundled, |path| BaseSource::File(path.to_path_buf()));
    let override_source = match (no_override, properties) {
        (true, _) => OverrideSource::Disabled,
        (false, Some(path)) => OverrideSource::File(path.to_path_buf()),
        (false, None) => OverrideSource::Environment,
    };
    Sources::new(base, override_source)
}
