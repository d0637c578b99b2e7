//! `kv-console submit`: runs the new-version workflow once.

use std::sync::Arc;

use anyhow::{Context, Result};
use owo_colors::OwoColorize;
use serde::Serialize;

use super::output::{print_output, OutputFormat};
use super::SubmitArgs;
use crate::config::AppConfig;
use crate::control_group::ControlGroupTokenStore;
use crate::secrets::{DefaultErrorHumanizer, FieldState, KvSecretDraft, VaultKvPersistence};
use crate::workflow::{
    FormSubmitEvent, SubmissionController, SubmissionServices, SubmitOutcome, TracingNavigator,
    TracingNotifier, VersionContext,
};

/// Machine-readable summary of one submit.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SubmitReport {
    status: &'static str,
    path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    version: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    alert: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    field_errors: Option<FieldState>,
}

pub async fn handle_submit(args: SubmitArgs, config: &AppConfig, format: OutputFormat) -> Result<()> {
    let data: serde_json::Value =
        serde_json::from_str(&args.data).context("--data must be valid JSON")?;
    let mut draft = KvSecretDraft::new(args.backend.as_str(), args.path.as_str()).with_data(data)?;
    if let Some(cas) = args.cas {
        draft = draft.with_cas(cas);
    }

    let services = SubmissionServices {
        persistence: Arc::new(VaultKvPersistence::new(config.vault.clone())?),
        control_group: Arc::new(ControlGroupTokenStore::new(config.console.ui_base_path.as_str())),
        humanizer: Arc::new(DefaultErrorHumanizer),
        navigator: Arc::new(TracingNavigator),
        notifier: Arc::new(TracingNotifier),
    };
    let context = VersionContext::new(args.previous_version, args.current_version);
    let controller = SubmissionController::new(draft, context, services, config.console.clone());

    if controller.is_stale() {
        eprintln!("{}", stale_advisory(&args.path, &context).yellow());
    }

    let outcome = controller.submit(&mut FormSubmitEvent::new()).await;
    let mut report = SubmitReport {
        status: "",
        path: args.path.clone(),
        version: None,
        alert: controller.invalid_form_alert(),
        error: controller.current_error(),
        field_errors: controller.field_errors(),
    };

    let succeeded = match outcome {
        SubmitOutcome::Saved { path, version } => {
            eprintln!("{}", format!("Successfully created new version of {}.", path).green());
            report.status = "saved";
            report.version = Some(version);
            true
        }
        SubmitOutcome::Rejected(_) => {
            report.status = "rejected";
            false
        }
        SubmitOutcome::Failed(error) => {
            report.status = if error.is_control_group() { "control_group" } else { "failed" };
            false
        }
        SubmitOutcome::InFlight => {
            report.status = "in_flight";
            false
        }
    };

    print_output(&report, format)?;

    if !succeeded {
        if let Some(alert) = &report.alert {
            eprintln!("{}", alert.red());
        }
        std::process::exit(1);
    }
    Ok(())
}

fn stale_advisory(path: &str, context: &VersionContext) -> String {
    format!(
        "You are creating a new version of {} based on version {}, but the current version is {}.",
        path,
        context.previous_version.unwrap_or_default(),
        context.current_version.unwrap_or_default()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stale_advisory_names_both_versions() {
        let advisory = stale_advisory("app/db", &VersionContext::new(Some(2), Some(5)));
        assert!(advisory.contains("app/db"));
        assert!(advisory.contains("version 2"));
        assert!(advisory.contains("current version is 5"));
    }

    #[test]
    fn test_report_skips_empty_fields() {
        let report = SubmitReport {
            status: "saved",
            path: "app".to_string(),
            version: Some(4),
            alert: None,
            error: None,
            field_errors: None,
        };
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json, serde_json::json!({"status": "saved", "path": "app", "version": 4}));
    }
}
