//! sf CLI invocation and response classification.
//!
//! The Salesforce CLI is the only write path to the org: each staged
//! batch file goes through one `sf data upsert ... --json` call, matched
//! on the dataset's external-id field. The CLI's behavior when no default
//! org is configured is awkward (it prints an interactive prompt instead
//! of JSON), so everything that inspects its output is kept in pure
//! functions over the captured text, with the recognized marker strings
//! as named constants.

use serde::Deserialize;
use std::path::Path;

use crate::config::DatasetConfig;
use crate::error::{UpsertError, UpsertResult};
use crate::progress::{log_error, log_info, log_success};

/// Prompt fragments the CLI emits instead of JSON when no default org is
/// configured. Tool wording changes go here, nowhere else.
pub const ORG_PROMPT_MARKERS: &[&str] =
    &["Which of these orgs would you like to use?", "? Which of"];

/// Fragment identifying a no-default-org failure in a thrown CLI error.
pub const NO_DEFAULT_ORG_MARKER: &str = "No default org";

/// Outcome of one dataset's upsert: per-row counts plus the error text of
/// each failed row. Row failures are surfaced, not fatal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpsertOutcome {
    pub success_count: usize,
    pub failure_count: usize,
    pub row_errors: Vec<String>,
}

// =============================================================================
// sf CLI JSON envelopes
// =============================================================================

#[derive(Debug, Deserialize)]
struct UpsertEnvelope {
    status: i64,
    #[serde(default)]
    result: Option<UpsertPayload>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertPayload {
    #[serde(default)]
    successful_results: Vec<serde_json::Value>,
    #[serde(default)]
    failed_results: Vec<FailedRow>,
}

#[derive(Debug, Deserialize)]
struct FailedRow {
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OrgListEnvelope {
    #[serde(default)]
    result: OrgListPayload,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrgListPayload {
    #[serde(default)]
    non_scratch_orgs: Vec<OrgInfo>,
    #[serde(default)]
    scratch_orgs: Vec<OrgInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OrgInfo {
    username: String,
    #[serde(default)]
    is_default_username: bool,
}

// =============================================================================
// Pure classification
// =============================================================================

/// Classify CLI output that failed to parse as JSON: either a recognized
/// org-selection prompt or an unexpected response.
pub fn classify_raw_response(raw: &str) -> UpsertError {
    if ORG_PROMPT_MARKERS.iter().any(|m| raw.contains(m)) {
        UpsertError::UnconfiguredOrg
    } else {
        UpsertError::MalformedResponse(raw.trim().to_string())
    }
}

/// Classify a process-level failure message, disambiguating the
/// no-default-org case from other execution errors.
pub fn classify_invocation_error(message: &str) -> UpsertError {
    if message.contains(NO_DEFAULT_ORG_MARKER) {
        UpsertError::UnconfiguredOrg
    } else {
        UpsertError::Invocation(message.trim().to_string())
    }
}

/// Interpret the text an `sf data upsert --json` call produced.
///
/// A parseable envelope with `status == 0` is a success regardless of
/// per-row failures; a non-zero status fails with the envelope's message;
/// non-JSON output is classified by [`classify_raw_response`].
pub fn interpret_response(raw: &str) -> UpsertResult<UpsertOutcome> {
    let envelope: UpsertEnvelope = match serde_json::from_str(raw) {
        Ok(envelope) => envelope,
        Err(_) => return Err(classify_raw_response(raw)),
    };

    if envelope.status != 0 {
        return Err(UpsertError::CommandFailed(
            envelope.message.unwrap_or_else(|| "unknown error".to_string()),
        ));
    }

    let payload = envelope.result.unwrap_or_default();
    Ok(UpsertOutcome {
        success_count: payload.successful_results.len(),
        failure_count: payload.failed_results.len(),
        row_errors: payload
            .failed_results
            .into_iter()
            .map(|row| row.error.unwrap_or_else(|| "unknown row error".to_string()))
            .collect(),
    })
}

/// Pick the default org username out of an `sf org list --json` payload:
/// non-scratch orgs take precedence over scratch orgs.
pub fn default_org_from_list(raw: &str) -> Option<String> {
    let envelope: OrgListEnvelope = serde_json::from_str(raw).ok()?;
    envelope
        .result
        .non_scratch_orgs
        .into_iter()
        .chain(envelope.result.scratch_orgs)
        .find(|org| org.is_default_username)
        .map(|org| org.username)
}

// =============================================================================
// CLI invocation
// =============================================================================

/// Look up the default org via `sf org list`. Any failure (CLI missing,
/// unparseable output, no default) yields `None`: the upsert call then
/// runs without `-o` and its own response classification takes over.
pub async fn discover_default_org() -> Option<String> {
    let output = tokio::process::Command::new("sf")
        .args(["org", "list", "--json"])
        .output()
        .await
        .ok()?;
    let org = default_org_from_list(&String::from_utf8_lossy(&output.stdout));
    match &org {
        Some(username) => log_info(format!("   Using default org: {}", username)),
        None => log_info("   No default org found, sf will prompt for selection"),
    }
    org
}

/// Upsert one staged batch file into the configured object.
pub async fn run_upsert(
    config: &DatasetConfig,
    batch_file: &Path,
    org: Option<&str>,
) -> UpsertResult<UpsertOutcome> {
    log_info(format!("🚀 Upserting {} to {}...", config.name, config.object));

    let mut args = vec![
        "data".to_string(),
        "upsert".to_string(),
        "-s".to_string(),
        config.object.to_string(),
        "-f".to_string(),
        batch_file.display().to_string(),
        "-i".to_string(),
        config.external_id_field.to_string(),
    ];
    if let Some(org) = org {
        args.push("-o".to_string());
        args.push(org.to_string());
    }
    args.push("--json".to_string());

    log_info(format!("   Command: sf {}", args.join(" ")));

    let output = tokio::process::Command::new("sf")
        .args(&args)
        .output()
        .await
        .map_err(|e| classify_invocation_error(&e.to_string()))?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    let interpreted = interpret_response(&stdout);

    match interpreted {
        // With --json the envelope lands on stdout even when the process
        // exits non-zero, so only a completely unparseable response falls
        // back to the stderr text.
        Err(UpsertError::MalformedResponse(_)) if !output.status.success() => {
            let stderr = String::from_utf8_lossy(&output.stderr);
            let detail = if stderr.trim().is_empty() { stdout } else { stderr };
            Err(classify_invocation_error(&detail))
        }
        other => other,
    }
}

/// Narrate one dataset's outcome the way the loader reports it.
pub fn report_outcome(config: &DatasetConfig, outcome: &UpsertOutcome) {
    log_success(format!(
        "{}: {} successful, {} failed",
        config.name, outcome.success_count, outcome.failure_count
    ));
    if outcome.failure_count > 0 {
        log_error(format!("Failures for {}:", config.name));
        for error in &outcome.row_errors {
            log_error(format!("   - {}", error));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_envelope() {
        let raw = r#"{"status":0,"result":{"successfulResults":[{}],"failedResults":[]}}"#;
        let outcome = interpret_response(raw).unwrap();
        assert_eq!(outcome.success_count, 1);
        assert_eq!(outcome.failure_count, 0);
    }

    #[test]
    fn test_partial_failures_still_succeed() {
        let raw = r#"{"status":0,"result":{
            "successfulResults":[{},{}],
            "failedResults":[{"error":"REQUIRED_FIELD_MISSING: Name"}]
        }}"#;
        let outcome = interpret_response(raw).unwrap();
        assert_eq!(outcome.success_count, 2);
        assert_eq!(outcome.failure_count, 1);
        assert_eq!(outcome.row_errors, vec!["REQUIRED_FIELD_MISSING: Name"]);
    }

    #[test]
    fn test_nonzero_status_fails_with_message() {
        let raw = r#"{"status":1,"message":"INVALID_FIELD: no such column"}"#;
        let err = interpret_response(raw).unwrap_err();
        assert!(matches!(err, UpsertError::CommandFailed(m) if m.contains("INVALID_FIELD")));
    }

    #[test]
    fn test_org_prompt_classified_as_unconfigured() {
        for prompt in ["Which of these orgs would you like to use?", "? Which of"] {
            let err = interpret_response(&format!("some text {} more", prompt)).unwrap_err();
            assert!(matches!(err, UpsertError::UnconfiguredOrg));
        }
    }

    #[test]
    fn test_garbage_is_malformed() {
        let err = interpret_response("segmentation fault").unwrap_err();
        assert!(matches!(err, UpsertError::MalformedResponse(m) if m == "segmentation fault"));
    }

    #[test]
    fn test_invocation_error_disambiguation() {
        assert!(matches!(
            classify_invocation_error("Error: No default org set"),
            UpsertError::UnconfiguredOrg
        ));
        assert!(matches!(
            classify_invocation_error("sf: command not found"),
            UpsertError::Invocation(_)
        ));
    }

    #[test]
    fn test_default_org_prefers_non_scratch() {
        let raw = r#"{"result":{
            "nonScratchOrgs":[
                {"username":"other@example.com","isDefaultUsername":false},
                {"username":"hub@example.com","isDefaultUsername":true}
            ],
            "scratchOrgs":[{"username":"scratch@example.com","isDefaultUsername":true}]
        }}"#;
        assert_eq!(default_org_from_list(raw).unwrap(), "hub@example.com");
    }

    #[test]
    fn test_default_org_falls_back_to_scratch() {
        let raw = r#"{"result":{
            "nonScratchOrgs":[{"username":"hub@example.com","isDefaultUsername":false}],
            "scratchOrgs":[{"username":"scratch@example.com","isDefaultUsername":true}]
        }}"#;
        assert_eq!(default_org_from_list(raw).unwrap(), "scratch@example.com");
    }

    #[test]
    fn test_default_org_none_when_unset() {
        assert!(default_org_from_list(r#"{"result":{}}"#).is_none());
        assert!(default_org_from_list("not json").is_none());
    }
}
