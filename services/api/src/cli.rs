use crate::demo::{
    run_audit_case, run_decision_export, run_demo, AuditRunArgs, DemoArgs, ExportArgs,
};
use crate::server;
use clap::{Args, Parser, Subcommand};
use enroll_ai::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Enrollment Audit Orchestrator",
    about = "Run and exercise the enrollment document audit service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run audits against the seeded demo cases
    Audit {
        #[command(subcommand)]
        command: AuditCommand,
    },
    /// Walk through every seeded scenario end to end
    Demo(DemoArgs),
}

#[derive(Subcommand, Debug)]
enum AuditCommand {
    /// Audit one seeded case and print its report
    Run(AuditRunArgs),
    /// Audit every seeded case and export the decisions as CSV
    Export(ExportArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Audit {
            command: AuditCommand::Run(args),
        } => run_audit_case(args).await,
        Command::Audit {
            command: AuditCommand::Export(args),
        } => run_decision_export(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}
