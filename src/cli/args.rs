use clap::{Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "cert-anchor")]
#[command(version = "1.0.0")]
#[command(about = "Issue, verify and revoke tamper-evident academic certificates")]
#[command(long_about = None)]
pub struct Cli {
    /// Certificate store file (overrides store_path from the config file)
    #[arg(long, env = "CERT_ANCHOR_STORE", global = true)]
    pub store: Option<String>,

    /// Config file path (default: ~/.config/cert-anchor/config.yaml)
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// Enable verbose logging (repeat for more verbosity: -v INFO, -vv DEBUG, -vvv TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress log output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output raw tab-separated values (no formatting)
    #[arg(short, long, global = true)]
    pub raw: bool,

    /// Output JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Issue a new certificate
    Issue(IssueArgs),
    /// Verify a certificate against its content hash
    Verify {
        /// Certificate id (CERT-<year>-<sequence>)
        certificate_id: String,
        /// Hash the caller expects the certificate to carry
        #[arg(long)]
        hash: Option<String>,
    },
    /// Revoke a certificate (permanent)
    Revoke {
        /// Certificate id (CERT-<year>-<sequence>)
        certificate_id: String,
        /// Revocation reason
        #[arg(long)]
        reason: Option<String>,
    },
    /// List certificates
    List {
        /// Only certificates of this student
        #[arg(long)]
        student: Option<u64>,
        /// Only certificates with this status
        #[arg(long)]
        status: Option<StatusFilter>,
        /// Columns to display (comma-separated): id,internal_id,student_id,student,degree,school,gpa,graduated,issued,issued_by,status,verifications,last_verified,hash,url,revoked_reason. Use +column to append to defaults.
        #[arg(long)]
        columns: Option<String>,
    },
    /// Show one certificate
    Show {
        /// Certificate id (CERT-<year>-<sequence>)
        certificate_id: String,
    },
    /// Show store statistics
    Stats,
    /// Generate shell completion scripts
    Completion {
        #[command(subcommand)]
        command: CompletionCommands,
    },
    /// Internal completion helpers (hidden)
    #[command(hide = true)]
    CompletionHelper {
        #[command(subcommand)]
        command: CompletionHelperCommands,
    },
}

#[derive(clap::Args, Debug, Default)]
pub struct IssueArgs {
    /// JSON payload file ("-" for stdin); flags below override its fields
    #[arg(long)]
    pub payload: Option<String>,
    #[arg(long)]
    pub student_id: Option<String>,
    #[arg(long)]
    pub student_name: Option<String>,
    #[arg(long)]
    pub degree: Option<String>,
    #[arg(long)]
    pub school_id: Option<String>,
    #[arg(long)]
    pub school_name: Option<String>,
    /// Graduation date (YYYY-MM-DD)
    #[arg(long)]
    pub graduation_date: Option<String>,
    #[arg(long)]
    pub gpa: Option<String>,
    /// Courses (comma-separated)
    #[arg(long)]
    pub courses: Option<String>,
    /// Issuer recorded on the certificate (defaults to config issuer or $USER)
    #[arg(long)]
    pub issued_by: Option<String>,
}

#[derive(Subcommand)]
pub enum CompletionCommands {
    /// Generate bash completion script
    Bash,
    /// Generate zsh completion script
    Zsh,
    /// Generate fish completion script
    Fish,
    /// Generate PowerShell completion script
    PowerShell,
}

impl CompletionCommands {
    pub fn shell(&self) -> Shell {
        match self {
            CompletionCommands::Bash => Shell::Bash,
            CompletionCommands::Zsh => Shell::Zsh,
            CompletionCommands::Fish => Shell::Fish,
            CompletionCommands::PowerShell => Shell::PowerShell,
        }
    }
}

#[derive(Subcommand)]
pub enum CompletionHelperCommands {
    /// List certificate ids for completion
    CertificateIds,
    /// List column names for completion
    Columns,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum StatusFilter {
    Active,
    Revoked,
}

impl From<StatusFilter> for crate::cert::CertStatus {
    fn from(filter: StatusFilter) -> Self {
        match filter {
            StatusFilter::Active => Self::Active,
            StatusFilter::Revoked => Self::Revoked,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_verify_with_hash() {
        let cli = Cli::try_parse_from([
            "cert-anchor",
            "verify",
            "CERT-2026-001",
            "--hash",
            "deadbeef",
            "-vv",
        ])
        .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Verify {
                certificate_id,
                hash,
            } => {
                assert_eq!(certificate_id, "CERT-2026-001");
                assert_eq!(hash.as_deref(), Some("deadbeef"));
            }
            _ => panic!("expected verify"),
        }
    }

    #[test]
    fn test_parse_issue_flags() {
        let cli = Cli::try_parse_from([
            "cert-anchor",
            "issue",
            "--student-id",
            "1",
            "--student-name",
            "Asha",
            "--degree",
            "BSc CS",
            "--gpa",
            "8.7",
            "--courses",
            "CS101,CS102",
        ])
        .unwrap();
        match cli.command {
            Commands::Issue(args) => {
                assert_eq!(args.student_id.as_deref(), Some("1"));
                assert_eq!(args.courses.as_deref(), Some("CS101,CS102"));
                assert!(args.payload.is_none());
            }
            _ => panic!("expected issue"),
        }
    }
}
