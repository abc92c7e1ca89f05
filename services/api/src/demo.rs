use crate::infra::{parse_export_format, parse_zone, ServiceGraph};
use chrono::Duration;
use clap::Args;
use std::fs;
use std::path::PathBuf;
use wastewatch::error::AppError;
use wastewatch::workflows::auth::{
    AuthPolicy, CredentialHasher, RegisterRequest, RoleKind, Session,
};
use wastewatch::workflows::reports::{
    sample, ExportFormat, GeoLocation, ReportAnalytics, ReportId, ReportQuery,
    ReportServiceError, ReportSubmission, Reporter, WasteReport, WasteType, Zone,
};

#[derive(Args, Debug)]
pub(crate) struct ExportArgs {
    /// Output format: csv or html
    #[arg(long, default_value = "csv", value_parser = parse_export_format)]
    pub(crate) format: ExportFormat,
    /// Only export reports with this status label (e.g. "In Progress")
    #[arg(long)]
    pub(crate) status: Option<String>,
    /// Only export reports of this waste type
    #[arg(long)]
    pub(crate) waste_type: Option<String>,
    /// Minimum severity, inclusive
    #[arg(long)]
    pub(crate) severity: Option<String>,
    /// Case-insensitive search over report id or reporter phone
    #[arg(long)]
    pub(crate) search: Option<String>,
    /// Write to this file instead of stdout
    #[arg(long)]
    pub(crate) output: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub(crate) struct DemoArgs {
    /// Zone the demo worker patrols
    #[arg(long, default_value = "North", value_parser = parse_zone)]
    pub(crate) zone: Zone,
    /// Completion notes recorded when the worker resolves the report
    #[arg(long, default_value = "Area cleared and bins replaced")]
    pub(crate) notes: String,
}

pub(crate) fn run_export(args: ExportArgs) -> Result<(), AppError> {
    let ExportArgs {
        format,
        status,
        waste_type,
        severity,
        search,
        output,
    } = args;

    let query = ReportQuery {
        status,
        waste_type,
        severity,
        search,
        ..ReportQuery::default()
    };
    let filter = query.filter().map_err(ReportServiceError::from)?;
    let reports = filter.apply(sample::reports());
    let rendered = format.render(&reports).map_err(ReportServiceError::from)?;

    match output {
        Some(path) => {
            fs::write(&path, rendered)?;
            println!(
                "Exported {} report(s) to {}",
                reports.len(),
                path.display()
            );
        }
        None => print!("{rendered}"),
    }

    Ok(())
}

pub(crate) fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { zone, notes } = args;

    let services = ServiceGraph::assemble(
        true,
        AuthPolicy {
            allow_admin_signup: true,
        },
        Duration::minutes(30),
        CredentialHasher::default(),
    );

    println!("Waste report lifecycle demo");
    let (admin, _) = services.auth.register(account(
        "Ops Admin",
        "admin@wastewatch.example",
        RoleKind::Admin,
        None,
    ))?;
    let (worker, _) = services.auth.register(account(
        "Demo Worker",
        "worker@wastewatch.example",
        RoleKind::Worker,
        Some(zone),
    ))?;
    let (citizen, _) = services.auth.register(account(
        "Demo Citizen",
        "citizen@wastewatch.example",
        RoleKind::Citizen,
        None,
    ))?;

    let worker_actor = worker.worker()?;
    let worker_id = worker_actor.worker_id().clone();
    println!("- registered worker {worker_id} patrolling {zone}");

    let submitted = services
        .reports
        .submit(Some(citizen.user_id().clone()), demo_submission(zone))?;
    print_step("citizen submitted", &submitted);

    let admin_actor = admin.admin()?;
    let assigned = services
        .reports
        .assign(&admin_actor, &submitted.id, &worker_id)?;
    print_step("admin assigned", &assigned);

    let (auto, pick) = services
        .reports
        .auto_assign(&admin_actor, &ReportId("5".to_string()))?;
    println!(
        "- auto-assigned report {} to {} (zone match: {}, {} active job(s) before)",
        auto.id,
        pick.worker.name,
        if pick.zone_match { "yes" } else { "no" },
        pick.active_jobs
    );

    let started = services.reports.start(&worker_actor, &submitted.id)?;
    print_step("worker started", &started);
    let resolved = services
        .reports
        .complete(&worker_actor, &submitted.id, &notes)?;
    print_step("worker resolved", &resolved);

    let visible = services.reports.my_reports(citizen.user_id())?;
    println!(
        "- citizen sees {} report(s) of their own",
        visible.len()
    );

    print_analytics(&services.reports.analytics(&admin_actor)?);
    close_sessions(&services, [&admin, &worker, &citizen]);
    Ok(())
}

fn account(name: &str, email: &str, role: RoleKind, zone: Option<Zone>) -> RegisterRequest {
    RegisterRequest {
        name: name.to_string(),
        email: email.to_string(),
        password: "demo-password-1".to_string(),
        confirm_password: None,
        phone: "+91-9000000000".to_string(),
        role,
        zone,
    }
}

fn demo_submission(zone: Zone) -> ReportSubmission {
    ReportSubmission {
        reporter: Reporter {
            name: "Demo Citizen".to_string(),
            phone: "+91-9000000000".to_string(),
        },
        location: GeoLocation {
            latitude: 28.6448,
            longitude: 77.2167,
            address: Some("Community park gate".to_string()),
            zone: Some(zone),
        },
        waste_type: WasteType::Plastic,
        severity: 6.8,
        confidence: 0.87,
        description: Some("Overflowing bins near the park entrance".to_string()),
        photo: None,
    }
}

fn print_step(label: &str, report: &WasteReport) {
    let worker = report
        .assigned_worker
        .as_ref()
        .map(|assigned| assigned.name.as_str())
        .unwrap_or("unassigned");
    println!(
        "- {label}: report {} is {} ({worker})",
        report.id, report.status
    );
}

fn print_analytics(summary: &ReportAnalytics) {
    println!("\nAnalytics ({} reports)", summary.total);
    for count in &summary.by_status {
        println!("  - {}: {}", count.label, count.count);
    }
    if let Some(average) = summary.average_severity {
        println!("  Average severity: {average:.1}");
    }
    println!("  Monthly trend:");
    for point in &summary.monthly_trend {
        println!(
            "    {} | {} created | {} resolved",
            point.month, point.created, point.resolved
        );
    }
}

fn close_sessions<'a>(services: &ServiceGraph, sessions: impl IntoIterator<Item = &'a Session>) {
    for session in sessions {
        services.sessions.close(session.token());
    }
}
