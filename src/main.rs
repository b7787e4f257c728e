//! hapi-config: inspect the resolved configuration of a FHIR JPA server
//!
//! Shows where every parameter comes from (override file, bundled base, or the
//! declared default) and checks that configured values convert to their types.

use anyhow::Result;

fn main() -> Result<()> {
    hapi_config::cli::run()
}
