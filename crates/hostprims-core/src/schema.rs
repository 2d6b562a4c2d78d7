//! Schema ID constants for JSON output contracts.
//!
//! Every hostprims JSON document emitted by the CLI carries a `schema_id`
//! field that references the corresponding schema.
//!
//! ## URI Structure
//!
//! ```text
//! https://schemas.3leaps.dev/<module>/<topic>/<version>/<filename>
//! ```
//!
//! Where:
//! - `module` = `hostprims` (source repository)
//! - `topic` = feature area (e.g., `host`, `process`, `version`)
//! - `version` = SemVer (e.g., `v1.0.0`)
//! - `filename` = schema file with `.schema.json` suffix

/// Schema ID for the host snapshot emitted by `hostprims info --json` (v1.0.0).
pub const HOST_INFO_V1: &str =
    "https://schemas.3leaps.dev/hostprims/host/v1.0.0/host-info.schema.json";

/// Schema ID for OS version reports emitted by `hostprims version --json` (v1.0.0).
pub const OS_VERSIONS_V1: &str =
    "https://schemas.3leaps.dev/hostprims/version/v1.0.0/os-versions.schema.json";

/// Schema ID for process identity output emitted by `hostprims pinfo --json` (v1.0.0).
pub const PROCESS_IDENTITY_V1: &str =
    "https://schemas.3leaps.dev/hostprims/process/v1.0.0/process-identity.schema.json";

#[cfg(test)]
mod tests {
    use super::*;

    const ALL: [&str; 3] = [HOST_INFO_V1, OS_VERSIONS_V1, PROCESS_IDENTITY_V1];

    #[test]
    fn schema_ids_share_host_prefix() {
        for id in ALL {
            assert!(
                id.starts_with("https://schemas.3leaps.dev/hostprims/"),
                "unexpected prefix: {id}"
            );
            assert!(id.ends_with(".schema.json"), "unexpected suffix: {id}");
        }
    }

    #[test]
    fn schema_ids_are_versioned() {
        for id in ALL {
            assert!(id.contains("/v1."), "missing version segment: {id}");
        }
    }
}
