use crate::infra::{seeded_store, AdjudicatorBackend, ApiAuditService, InMemoryCaseStore};
use chrono::{Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;
use enroll_ai::error::AppError;
use enroll_ai::workflows::audit::{AuditReport, AuditService, CaseId, ConsistencyRuleEngine};

#[derive(Args, Debug)]
pub(crate) struct AuditRunArgs {
    /// Seeded case to audit (1 = consistent, 2 = exam id mismatch,
    /// 3 = missing issuance date)
    #[arg(long)]
    pub(crate) case_id: u64,
    /// Reference date for date-derived facts (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Destination CSV file
    #[arg(long)]
    pub(crate) out: PathBuf,
    /// Reference date for date-derived facts (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reference date for date-derived facts (YYYY-MM-DD, defaults to today)
    #[arg(long, value_parser = crate::infra::parse_date)]
    pub(crate) as_of: Option<NaiveDate>,
}

fn demo_service(as_of: NaiveDate) -> (ApiAuditService, Arc<InMemoryCaseStore>) {
    let store = Arc::new(seeded_store(as_of));
    let service = AuditService::new(
        store.clone(),
        store.clone(),
        Arc::new(AdjudicatorBackend::Rules(ConsistencyRuleEngine::new())),
    );
    (service, store)
}

pub(crate) async fn run_audit_case(args: AuditRunArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let (service, store) = demo_service(as_of);

    let report = service.audit(CaseId(args.case_id), Some(as_of)).await?;
    render_report(&report);
    render_rejections(&store, report.case_id);

    Ok(())
}

pub(crate) async fn run_decision_export(args: ExportArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let (service, store) = demo_service(as_of);

    for case_id in store.case_ids() {
        service.audit(case_id, Some(as_of)).await?;
    }

    let mut writer = csv::Writer::from_path(&args.out).map_err(csv_io_error)?;
    writer
        .write_record(["case_id", "decision", "explanation", "decided_at"])
        .map_err(csv_io_error)?;
    let decisions = store.decisions();
    for (case_id, record) in &decisions {
        writer
            .write_record([
                case_id.0.to_string(),
                record.decision.label().to_string(),
                record.explanation.clone(),
                record.decided_at.to_rfc3339(),
            ])
            .map_err(csv_io_error)?;
    }
    writer.flush()?;

    println!(
        "Exported {} decision(s) to {}",
        decisions.len(),
        args.out.display()
    );
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let as_of = args.as_of.unwrap_or_else(|| Local::now().date_naive());
    let (service, store) = demo_service(as_of);

    println!("Enrollment audit demo (as of {as_of})");

    let scenarios = [
        (CaseId(1), "fully consistent dossier"),
        (CaseId(2), "exam report national id mismatch"),
        (CaseId(3), "identity card without issuance date"),
    ];

    for (case_id, label) in scenarios {
        println!("\nScenario: {label}");
        let report = service.audit(case_id, Some(as_of)).await?;
        render_report(&report);
        render_rejections(&store, case_id);
    }

    if let Some((_, record)) = store.decisions().first() {
        match serde_json::to_string_pretty(record) {
            Ok(json) => println!("\nSample persisted decision payload:\n{json}"),
            Err(err) => println!("\nSample decision payload unavailable: {err}"),
        }
    }

    Ok(())
}

fn render_report(report: &AuditReport) {
    println!(
        "Case {} -> {}",
        report.case_id.0,
        report.decision.label()
    );
    println!("  Explanation: {}", report.explanation);

    if !report.prerequisites_met {
        println!("  Findings: none (prerequisite gate short-circuited)");
        return;
    }

    println!("  Findings:");
    for finding in &report.findings {
        println!(
            "    - [{}] {:?}: {}",
            finding.severity.label(),
            finding.rule,
            finding.detail
        );
    }
}

fn render_rejections(store: &InMemoryCaseStore, case_id: CaseId) {
    let rejections = store.rejections(case_id);
    if rejections.is_empty() {
        return;
    }

    println!("  Rejected documents:");
    for rejection in rejections {
        println!(
            "    - document {} ({:?}): {}",
            rejection.document_id, rejection.reason.rule, rejection.reason.detail
        );
    }
}

fn csv_io_error(err: csv::Error) -> AppError {
    AppError::Io(std::io::Error::new(std::io::ErrorKind::Other, err))
}
