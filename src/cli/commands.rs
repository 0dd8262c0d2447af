use crate::cert::stats::RECENT_WINDOW_DAYS;
use crate::cert::{
    CertificateListingService, CertificatePayload, CertificateRecord, CertificateService,
    ListingFilter, StatsSummary, VerificationResult,
};
use crate::cli::args::*;
use crate::cli::completions::{handle_completion_command, handle_completion_helper_command};
use crate::config::Config;
use crate::storage::{CertificateStore, LocalStore};
use crate::utils::errors::{CertError, Result};
use crate::utils::output::OutputFormat;
use crate::utils::paths::CertAnchorPaths;
use serde_json::Value;
use std::io;
use tokio::io::AsyncReadExt;

/// Exit status for a verification that completed but found the certificate invalid
pub const EXIT_INVALID: i32 = 2;

pub async fn handle_command(cli: Cli) -> Result<()> {
    // Initialize logging - always to stderr
    if !cli.quiet {
        let log_level = match cli.verbose {
            0 => "cert_anchor=warn",  // Default: warnings only
            1 => "cert_anchor=info",  // -v: info level
            2 => "cert_anchor=debug", // -vv: debug level
            _ => "cert_anchor=trace", // -vvv+: trace level
        };

        tracing_subscriber::fmt()
            .with_writer(io::stderr)
            .with_env_filter(log_level)
            .init();
    }

    let output = OutputFormat::new(cli.raw, cli.json);

    // Completion scripts need neither config nor store
    if let Commands::Completion { ref command } = cli.command {
        return handle_completion_command(command);
    }

    let config_path = match cli.config.as_deref() {
        Some(path) => CertAnchorPaths::expand_home(path)?,
        None => CertAnchorPaths::config_file()?,
    };
    let config = Config::load(&config_path)?;
    let store = LocalStore::open(config.store_path(cli.store.as_deref())?)?;
    tracing::debug!("Using certificate store {}", store.path().display());
    let service = CertificateService::new(store)
        .with_verification_base_url(config.verification_base_url());

    match cli.command {
        Commands::Issue(args) => handle_issue_command(&service, &config, args, &output).await,
        Commands::Verify {
            certificate_id,
            hash,
        } => {
            let result = service.verify(&certificate_id, hash.as_deref())?;
            print_verification(&result, &output)?;
            if !result.valid {
                std::process::exit(EXIT_INVALID);
            }
            Ok(())
        }
        Commands::Revoke {
            certificate_id,
            reason,
        } => {
            let record = service.revoke(&certificate_id, reason.as_deref())?;
            if output.json {
                return output.print_json(&record);
            }
            output.print_key_value(&[
                ("Certificate", record.certificate_id.to_string()),
                ("Status", record.status.to_string()),
                ("Reason", record.revoked_reason.unwrap_or_default()),
            ]);
            Ok(())
        }
        Commands::List {
            student,
            status,
            columns,
        } => {
            let filter = ListingFilter {
                student_id: student,
                status: status.map(Into::into),
            };
            CertificateListingService::print(&service, &filter, columns.as_deref(), &output)
        }
        Commands::Show { certificate_id } => {
            let record = service.get_certificate(&certificate_id)?;
            if output.json {
                return output.print_json(&record);
            }
            print_record(&record, &output);
            Ok(())
        }
        Commands::Stats => {
            let stats = service.statistics()?;
            if output.json {
                return output.print_json(&stats);
            }
            print_stats(&stats, &output);
            Ok(())
        }
        Commands::Completion { .. } => Ok(()),
        Commands::CompletionHelper { ref command } => {
            handle_completion_helper_command(command, &service, &output)
        }
    }
}

async fn handle_issue_command<S: CertificateStore>(
    service: &CertificateService<S>,
    config: &Config,
    args: IssueArgs,
    output: &OutputFormat,
) -> Result<()> {
    let mut payload = match args.payload.as_deref() {
        Some(source) => CertificatePayload::from_json(&read_payload(source).await?)?,
        None => CertificatePayload::default(),
    };

    // Flags win over payload fields; numbers are validated with the rest of the payload
    if let Some(student_id) = args.student_id {
        payload.student_id = Some(Value::String(student_id));
    }
    if let Some(student_name) = args.student_name {
        payload.student_name = Some(student_name);
    }
    if let Some(degree) = args.degree {
        payload.degree = Some(degree);
    }
    if let Some(school_id) = args.school_id {
        payload.school_id = Some(Value::String(school_id));
    }
    if let Some(school_name) = args.school_name {
        payload.school_name = Some(school_name);
    }
    if let Some(graduation_date) = args.graduation_date {
        payload.graduation_date = Some(graduation_date);
    }
    if let Some(gpa) = args.gpa {
        payload.gpa = Some(Value::String(gpa));
    }
    if let Some(courses) = args.courses {
        payload.courses = Some(
            courses
                .split(',')
                .map(str::trim)
                .filter(|c| !c.is_empty())
                .map(str::to_string)
                .collect(),
        );
    }

    let issued_by = args.issued_by.unwrap_or_else(|| config.issuer());
    let record = service.issue(payload, &issued_by)?;

    if output.json {
        return output.print_json(&record);
    }
    output.print_key_value(&[
        ("Certificate", record.certificate_id.to_string()),
        ("Hash", record.blockchain_hash.clone()),
        ("URL", record.verification_url.clone()),
    ]);
    Ok(())
}

async fn read_payload(source: &str) -> Result<String> {
    if source == "-" {
        let mut content = String::new();
        tokio::io::stdin().read_to_string(&mut content).await?;
        return Ok(content);
    }

    let path = CertAnchorPaths::expand_home(source)?;
    tokio::fs::read_to_string(&path).await.map_err(|e| {
        CertError::Validation(format!("Cannot read payload {}: {e}", path.display()))
    })
}

fn print_verification(result: &VerificationResult, output: &OutputFormat) -> Result<()> {
    if output.json {
        return output.print_json(result);
    }

    let mut pairs = vec![("Valid", result.valid.to_string())];
    if let Some(reason) = &result.reason {
        pairs.push(("Reason", reason.to_string()));
    }
    if let Some(cert) = &result.certificate {
        pairs.push(("Certificate", cert.certificate_id.to_string()));
        pairs.push(("Student", cert.student_name.clone()));
        pairs.push(("Degree", cert.degree.clone()));
        pairs.push(("GPA", format!("{:.2}", cert.gpa)));
        pairs.push(("Hash", cert.blockchain_hash.clone()));
    }
    if let Some(count) = result.verification_count {
        pairs.push(("Verifications", count.to_string()));
    }
    if let Some(last) = result.last_verified {
        pairs.push(("Last verified", last.to_rfc3339()));
    }
    output.print_key_value(&pairs);
    Ok(())
}

fn print_record(record: &CertificateRecord, output: &OutputFormat) {
    let or_dash = |value: Option<String>| value.unwrap_or_else(|| "-".to_string());

    output.print_key_value(&[
        ("Certificate", record.certificate_id.to_string()),
        ("Internal id", record.internal_id.to_string()),
        ("Student id", record.student_id.to_string()),
        ("Student", record.student_name.clone()),
        ("Degree", record.degree.clone()),
        ("School id", or_dash(record.school_id.map(|id| id.to_string()))),
        ("School", or_dash(record.school_name.clone())),
        (
            "Graduated",
            or_dash(record.graduation_date.map(|d| d.to_string())),
        ),
        ("GPA", format!("{:.2}", record.gpa)),
        ("Courses", record.courses.join(",")),
        ("Hash", record.blockchain_hash.clone()),
        ("URL", record.verification_url.clone()),
        ("Issued by", record.issued_by.clone()),
        ("Issued", record.issued_date.to_rfc3339()),
        ("Status", record.status.to_string()),
        (
            "Revoked",
            or_dash(record.revoked_date.map(|d| d.to_rfc3339())),
        ),
        ("Revoked reason", or_dash(record.revoked_reason.clone())),
        ("Verifications", record.verification_count.to_string()),
        (
            "Last verified",
            or_dash(record.last_verified.map(|d| d.to_rfc3339())),
        ),
    ]);
}

fn print_stats(stats: &StatsSummary, output: &OutputFormat) {
    let mut pairs = vec![
        ("Total".to_string(), stats.total.to_string()),
        ("Active".to_string(), stats.active.to_string()),
        ("Revoked".to_string(), stats.revoked.to_string()),
        (
            "Verifications".to_string(),
            stats.total_verifications.to_string(),
        ),
        (
            "Average GPA".to_string(),
            stats
                .average_gpa
                .map_or_else(|| "n/a".to_string(), |gpa| format!("{gpa:.2}")),
        ),
        (
            "Degrees".to_string(),
            stats.degrees.iter().cloned().collect::<Vec<_>>().join(","),
        ),
        (
            format!("Issued ({RECENT_WINDOW_DAYS} days)"),
            stats.recently_issued.to_string(),
        ),
    ];
    for (school, count) in &stats.by_school {
        pairs.push((format!("School {school}"), count.to_string()));
    }
    output.print_key_value(&pairs);
}
