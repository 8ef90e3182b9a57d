//! hrdesk CLI
//!
//! Usage:
//!   hrdesk [OPTIONS] <COMMAND>
//!
//! Commands:
//!   render      Render a template for an employee from JSON files
//!   fields      List the field keys a variable can refer to
//!   attendance  Preview an attendance CSV upload
//!   payroll     Show the PF/ESIC breakdown of a salary
//!   config      Print the default configuration file
//!   login       Sign in to the HR backend
//!   logout      Forget the stored session
//!   preview     Render a stored template for a stored employee

use std::fmt::Display;
use std::fs;
use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use serde::de::DeserializeOwned;
use thiserror::Error;

use hrdesk::api::{ApiClient, ApiError};
use hrdesk::attendance::{parse_upload, CsvMode, PreviewLine};
use hrdesk::config::{AppConfig, ConfigError, DEFAULT_CONFIG};
use hrdesk::model::{Employee, SalaryStructure};
use hrdesk::payroll::{compute, SalaryBreakdown};
use hrdesk::session::{FileStore, SessionError, SessionManager};
use hrdesk::template::FieldKey;
use hrdesk::{
    logging, render_document, DocumentTemplate, RenderedDocument, TemplateError, TemplateVariable,
    VariablePolicy,
};

/// Config file picked up from the working directory when `--config` is absent
const LOCAL_CONFIG: &str = "hrdesk.toml";

#[derive(Parser)]
#[command(name = "hrdesk")]
#[command(about = "HR administration toolkit: documents, attendance uploads and payroll")]
#[command(arg_required_else_help = true)]
struct Cli {
    /// Configuration file (TOML format)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Render a template for an employee from JSON files
    Render {
        /// Template JSON (title, subject, body)
        #[arg(short, long)]
        template: PathBuf,

        /// Variable list JSON ([{name, value}, ...])
        #[arg(long)]
        variables: PathBuf,

        /// Employee JSON; without it placeholders are left as written
        #[arg(short, long)]
        employee: Option<PathBuf>,

        #[arg(long, value_enum, default_value_t = Policy::LastWins)]
        policy: Policy,
    },

    /// List the field keys a variable can refer to
    Fields,

    /// Preview an attendance CSV upload
    Attendance {
        /// CSV file to check
        file: PathBuf,

        /// Understand double-quoted fields
        #[arg(long)]
        quoted: bool,
    },

    /// Show the PF/ESIC breakdown of a salary
    Payroll {
        /// Employee JSON; uses the current salary structure
        #[arg(long, conflicts_with = "gross", required_unless_present = "gross")]
        employee: Option<PathBuf>,

        /// Monthly gross to split into components
        #[arg(long)]
        gross: Option<f64>,
    },

    /// Print the default configuration file
    Config,

    /// Sign in to the HR backend
    Login {
        #[arg(short, long)]
        username: String,

        #[arg(short, long)]
        password: String,
    },

    /// Forget the stored session
    Logout,

    /// Render a stored template for a stored employee
    Preview {
        #[arg(long)]
        template_id: u64,

        #[arg(long)]
        employee_id: u64,

        #[arg(long, value_enum, default_value_t = Policy::LastWins)]
        policy: Policy,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Policy {
    /// Repeated variable names take the later definition
    LastWins,
    /// Ignore inactive variables
    ActiveOnly,
    /// Reject repeated variable names
    Strict,
}

impl From<Policy> for VariablePolicy {
    fn from(p: Policy) -> Self {
        match p {
            Policy::LastWins => VariablePolicy::LastWins,
            Policy::ActiveOnly => VariablePolicy::ActiveOnly,
            Policy::Strict => VariablePolicy::Strict,
        }
    }
}

#[derive(Debug, Error)]
enum CliError {
    #[error("Error reading file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Error parsing '{}': {source}", path.display())]
    Json {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Error loading config: {0}")]
    Config(#[from] ConfigError),

    #[error("Error: {0}")]
    Template(#[from] TemplateError),

    #[error("Error: {0}")]
    Session(#[from] SessionError),

    #[error("Error: {0}")]
    Runtime(std::io::Error),

    #[error("Error: {}", .0.user_message())]
    Api(#[from] ApiError),

    #[error("Error: {0}")]
    Input(String),
}

fn main() {
    let cli = Cli::parse();

    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("{}", e);
            std::process::exit(1);
        }
    };
    logging::init(&config.logging.filter, cli.verbose);

    let result = match cli.command {
        Command::Render {
            template,
            variables,
            employee,
            policy,
        } => cmd_render(&template, &variables, employee.as_deref(), policy.into()),
        Command::Fields => {
            print_fields();
            Ok(())
        }
        Command::Attendance { file, quoted } => cmd_attendance(&config, &file, quoted),
        Command::Payroll { employee, gross } => cmd_payroll(&config, employee.as_deref(), gross),
        Command::Config => {
            println!("{}", DEFAULT_CONFIG.trim());
            Ok(())
        }
        Command::Login { username, password } => block_on(async {
            let client = open_client(&config)?;
            let session = client.login(&username, &password).await?;
            let who = session
                .user
                .and_then(|u| u.username)
                .unwrap_or_else(|| username.clone());
            println!("Logged in as {}", who);
            Ok(())
        }),
        Command::Logout => open_client(&config).and_then(|client| {
            client.logout()?;
            println!("Logged out");
            Ok(())
        }),
        Command::Preview {
            template_id,
            employee_id,
            policy,
        } => block_on(cmd_preview(&config, template_id, employee_id, policy.into())),
    };

    if let Err(e) = result {
        if let CliError::Api(api) = &e {
            if api.is_unauthorized() {
                eprintln!("Session expired or missing, run `hrdesk login` first");
            }
        }
        eprintln!("{}", e);
        std::process::exit(1);
    }
}

fn load_config(path: Option<&Path>) -> Result<AppConfig, CliError> {
    match path {
        Some(path) => Ok(AppConfig::from_file(path)?),
        None if Path::new(LOCAL_CONFIG).exists() => {
            Ok(AppConfig::from_file(Path::new(LOCAL_CONFIG))?)
        }
        None => Ok(AppConfig::default()),
    }
}

fn read_text(path: &Path) -> Result<String, CliError> {
    fs::read_to_string(path).map_err(|source| CliError::Read {
        path: path.to_path_buf(),
        source,
    })
}

fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T, CliError> {
    let text = read_text(path)?;
    serde_json::from_str(&text).map_err(|source| CliError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn block_on<F>(fut: F) -> Result<(), CliError>
where
    F: Future<Output = Result<(), CliError>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    runtime.block_on(fut)
}

fn open_client(config: &AppConfig) -> Result<ApiClient, CliError> {
    let session = SessionManager::restore(FileStore::new(&config.session.path));
    Ok(ApiClient::new(
        &config.api.base_url,
        Arc::new(session),
        config.api_timeout(),
    )?)
}

fn print_document(doc: &RenderedDocument) {
    println!("Subject: {}", doc.subject);
    println!();
    println!("{}", doc.body);
}

fn cmd_render(
    template: &Path,
    variables: &Path,
    employee: Option<&Path>,
    policy: VariablePolicy,
) -> Result<(), CliError> {
    let template: DocumentTemplate = read_json(template)?;
    let variables: Vec<TemplateVariable> = read_json(variables)?;
    let employee: Option<Employee> = employee.map(read_json).transpose()?;

    let doc = render_document(&template, &variables, employee.as_ref(), policy)?;
    print_document(&doc);
    Ok(())
}

async fn cmd_preview(
    config: &AppConfig,
    template_id: u64,
    employee_id: u64,
    policy: VariablePolicy,
) -> Result<(), CliError> {
    let client = open_client(config)?;
    let template = client.template(template_id).await?;
    let variables = client.template_variables().await?;
    let employee = client.employee(employee_id).await?;

    let doc = render_document(&template, &variables, Some(&employee), policy)?;
    print_document(&doc);
    Ok(())
}

fn print_fields() {
    println!("{:<24} SOURCE", "FIELD");
    for key in FieldKey::ALL {
        let source = match key {
            FieldKey::Name => "first and last name",
            FieldKey::Department | FieldKey::Designation | FieldKey::Shift => "related record name",
            k if k.is_salary() => "current salary structure",
            _ => "employee record",
        };
        println!("{:<24} {}", key.as_str(), source);
    }
    println!();
    println!("Any other key is looked up directly on the employee record.");
}

fn cmd_attendance(config: &AppConfig, file: &Path, quoted: bool) -> Result<(), CliError> {
    let text = read_text(file)?;
    let mut options = config.upload_options();
    if quoted {
        options = options.with_mode(CsvMode::Quoted);
    }

    let filename = file.display().to_string();
    let preview = match parse_upload(&text, &options) {
        Ok(preview) => preview,
        Err(e) => {
            eprint!("{}", e.format(&text, &filename));
            return Err(CliError::Input(format!("cannot read the header of {}", filename)));
        }
    };

    if !preview.missing_columns.is_empty() {
        eprintln!(
            "warning: header lacks required columns: {}",
            preview.missing_columns.join(", ")
        );
    }

    println!("{:<6} {:<8} {}", "LINE", "STATUS", preview.headers.join(" | "));
    for line in &preview.lines {
        match line {
            PreviewLine::Row(row) => {
                let values: Vec<&str> = row.fields.iter().map(|(_, v)| v.as_str()).collect();
                println!("{:<6} {:<8} {}", row.line, row.status, values.join(" | "));
            }
            PreviewLine::Malformed(err) => {
                println!("{:<6} {:<8} {}", err.line(), "Error", err);
                eprint!("{}", err.format(&text, &filename));
            }
        }
    }

    let summary = preview.summary();
    println!();
    println!(
        "{} valid, {} invalid, {} malformed",
        summary.valid, summary.invalid, summary.malformed
    );
    if !preview.is_submittable() {
        println!("Fix the rows above before submitting.");
    }
    Ok(())
}

fn cmd_payroll(config: &AppConfig, employee: Option<&Path>, gross: Option<f64>) -> Result<(), CliError> {
    let salary = match (employee, gross) {
        (Some(path), _) => {
            let employee: Employee = read_json(path)?;
            employee
                .current_salary()
                .cloned()
                .ok_or_else(|| CliError::Input(format!("{} has no salary structure", path.display())))?
        }
        (None, Some(gross)) => SalaryStructure::auto_split(gross, &config.payroll),
        (None, None) => return Err(CliError::Input("pass --employee or --gross".to_string())),
    };

    print_breakdown(&salary, &compute(&salary, &config.payroll));
    Ok(())
}

fn print_breakdown(salary: &SalaryStructure, b: &SalaryBreakdown) {
    fn line(label: &str, value: impl Display) {
        println!("{:<28} {:>12}", label, value);
    }
    fn amount(value: Option<f64>) -> String {
        format!("{:.2}", value.unwrap_or(0.0))
    }

    line("Basic", amount(salary.basic_salary));
    line("HRA", amount(salary.hra));
    line("Special allowance", amount(salary.special_allowance));
    line("Conveyance allowance", amount(salary.conveyance_allowance));
    line("Medical allowance", amount(salary.medical_allowance));
    line("Gross", format!("{:.2}", b.gross));
    println!();
    line("PF wage", format!("{:.2}", b.pf_wage));
    line("PF (employee)", format!("{:.2}", b.pf_employee));
    line("PF (employer)", format!("{:.2}", b.pf_employer));
    if b.esic_applicable {
        line("ESIC (employee)", format!("{:.2}", b.esic_employee));
        line("ESIC (employer)", format!("{:.2}", b.esic_employer));
    } else {
        line("ESIC", "not applicable");
    }
    println!();
    line("Total deductions", format!("{:.2}", b.total_deductions));
    line("Net pay", format!("{:.2}", b.net_pay));
}
