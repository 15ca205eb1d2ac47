use crate::core::reports::ReportKind;
use crate::export::ExportFormat;
use clap::{Parser, Subcommand, ValueEnum};

/// Command-line interface definition for rTimebill
/// Timesheet and project-billing back office on SQLite
#[derive(Parser)]
#[command(
    name = "rtimebill",
    version = env!("CARGO_PKG_VERSION"),
    about = "Timesheet and project-billing back office: clock punches, timesheet ledger, banked hours and cost/revenue/margin reports on SQLite",
    long_about = None
)]
pub struct Cli {
    /// Override database path (useful for tests or custom DB)
    #[arg(global = true, long = "db")]
    pub db: Option<String>,

    /// Acting user id recorded as creator/updater and in the audit log
    #[arg(global = true, long = "as-user")]
    pub as_user: Option<i64>,

    /// Run in test mode (no config file update)
    #[arg(global = true, long = "test", hide = true)]
    pub test: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum RoleArg {
    Admin,
    Gestor,
    Colaborador,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BillingModelArg {
    /// Fixed-fee scope (ESCOPO_FECHADO)
    EscopoFechado,
    /// Monthly allocation (ALOCACAO)
    Alocacao,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FeeTypeArg {
    Fixo,
    PorHora,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProjectStatusArg {
    Ativo,
    Pausado,
    Concluido,
    Cancelado,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum InstallmentArg {
    Marco,
    Outro,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PunchArg {
    Entrada,
    SaidaAlmoco,
    VoltaAlmoco,
    Saida,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    Timesheet,
    Ponto,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum CollabClassArg {
    Normal,
    Extra,
    Banco,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ProjectClassArg {
    Normal,
    Extra,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Initialize the database and configuration
    Init,

    /// Manage the configuration file (view or edit)
    Config {
        #[arg(long = "print", help = "Print the current configuration")]
        print_config: bool,

        #[arg(long = "check", help = "Check configuration file for missing fields")]
        check: bool,

        #[arg(long = "migrate", help = "Add missing fields with their defaults")]
        migrate: bool,

        #[arg(
            long = "edit",
            help = "Edit the configuration file (default editor: $EDITOR, or nano/notepad)"
        )]
        edit_config: bool,

        #[arg(
            long = "editor",
            help = "Specify the editor to use (vim, nano, or custom path)"
        )]
        editor: Option<String>,
    },

    /// Manage the database (migrations, integrity checks, etc.)
    Db {
        #[arg(long = "migrate", help = "Run pending database migrations")]
        migrate: bool,

        #[arg(long = "check", help = "Check database integrity")]
        check: bool,

        #[arg(long = "vacuum", help = "Optimize the database using VACUUM")]
        vacuum: bool,

        #[arg(long = "info", help = "Show database information")]
        info: bool,
    },

    /// Print the internal audit log
    Log {
        #[arg(long = "print", help = "Print rows from the internal log table")]
        print: bool,
    },

    /// Cost profiles
    Profile {
        #[command(subcommand)]
        action: ProfileCmd,
    },

    /// Users
    User {
        #[command(subcommand)]
        action: UserCmd,
    },

    /// Projects and their billing data
    Project {
        #[command(subcommand)]
        action: ProjectCmd,
    },

    /// Project tasks
    Task {
        #[command(subcommand)]
        action: TaskCmd,
    },

    /// Standing allocations of users to projects
    Alloc {
        #[command(subcommand)]
        action: AllocCmd,
    },

    /// Record a clock punch
    Punch {
        /// User id
        user: i64,

        /// Date of the punch (YYYY-MM-DD)
        date: String,

        /// Punch type
        #[arg(value_enum)]
        kind: PunchArg,

        #[arg(long = "project")]
        project: Option<i64>,

        #[arg(long = "note")]
        note: Option<String>,
    },

    /// Record a timesheet line
    Timesheet {
        /// Work date (YYYY-MM-DD)
        date: String,

        #[arg(long = "project")]
        project: i64,

        /// Defaults to --as-user
        #[arg(long = "user")]
        user: Option<i64>,

        #[arg(long = "task")]
        task: Option<i64>,

        /// Duration in hours; when omitted it is derived from --start/--end
        #[arg(long = "hours", conflicts_with_all = ["start", "end"])]
        hours: Option<String>,

        /// Start time (HH:MM)
        #[arg(long = "start", requires = "end")]
        start: Option<String>,

        /// End time (HH:MM)
        #[arg(long = "end", requires = "start")]
        end: Option<String>,

        #[arg(long = "mode", value_enum, default_value = "timesheet")]
        mode: ModeArg,

        #[arg(long = "collab-class", value_enum)]
        collab_class: Option<CollabClassArg>,

        #[arg(long = "project-class", value_enum)]
        project_class: Option<ProjectClassArg>,

        #[arg(long = "off-hours")]
        off_hours: bool,

        /// Reason for a manual correction
        #[arg(long = "edit-reason")]
        edit_reason: Option<String>,
    },

    /// Banked hours
    Bank {
        #[command(subcommand)]
        action: BankCmd,
    },

    /// Aggregated reports
    Report {
        #[arg(value_enum)]
        kind: ReportKind,

        /// First date included (YYYY-MM-DD)
        #[arg(long = "from")]
        from: Option<String>,

        /// Last date included (YYYY-MM-DD)
        #[arg(long = "to")]
        to: Option<String>,

        #[arg(long = "project")]
        project: Option<i64>,

        #[arg(long = "collaborator")]
        collaborator: Option<i64>,

        #[arg(long = "profile")]
        profile: Option<i64>,

        #[arg(long = "manager")]
        manager: Option<i64>,

        #[arg(long = "format", value_enum, default_value = "table")]
        format: ExportFormat,

        /// Output file (required for csv, json, xlsx)
        #[arg(long = "file")]
        file: Option<String>,

        /// Overwrite an existing output file without asking
        #[arg(long = "force")]
        force: bool,
    },
}

#[derive(Subcommand)]
pub enum ProfileCmd {
    Add {
        name: String,
        /// Hourly cost
        #[arg(long = "cost")]
        cost: String,
    },
    List,
    Deactivate {
        id: i64,
    },
    Activate {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum UserCmd {
    Add {
        name: String,
        email: String,
        #[arg(long = "role", value_enum, default_value = "colaborador")]
        role: RoleArg,
        #[arg(long = "profile")]
        profile: Option<i64>,
        /// Direct hourly cost, overrides the profile rate
        #[arg(long = "cost")]
        cost: Option<String>,
        /// Weekly workload hours (1-60)
        #[arg(long = "weekly", default_value = "40")]
        weekly: String,
    },
    List,
    Deactivate {
        id: i64,
    },
    Activate {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum ProjectCmd {
    Add {
        name: String,
        #[arg(long = "model", value_enum)]
        model: BillingModelArg,
        #[arg(long = "manager")]
        manager: i64,
        #[arg(long = "client")]
        client: Option<String>,
        #[arg(long = "cost-center")]
        cost_center: Option<String>,
        #[arg(long = "fee-type", value_enum)]
        fee_type: Option<FeeTypeArg>,
        #[arg(long = "fee")]
        fee: Option<String>,
    },
    List,
    /// Change the project status
    Status {
        id: i64,
        #[arg(value_enum)]
        status: ProjectStatusArg,
    },
    Deactivate {
        id: i64,
    },
    Activate {
        id: i64,
    },
    /// Add an estimate line (fixed-scope projects)
    Estimate {
        id: i64,
        #[arg(long = "profile")]
        profile: i64,
        #[arg(long = "hours")]
        hours: String,
        #[arg(long = "price")]
        price: String,
    },
    /// Add a monthly contract line (allocation projects)
    Contract {
        id: i64,
        /// Competence month (YYYY-MM)
        month: String,
        #[arg(long = "profile")]
        profile: i64,
        #[arg(long = "hours")]
        hours: String,
        #[arg(long = "price")]
        price: String,
        #[arg(long = "price-additional")]
        price_additional: String,
        #[arg(long = "price-off-hours")]
        price_off_hours: String,
        #[arg(long = "price-overtime")]
        price_overtime: String,
    },
    /// Add a fee installment (fixed-scope projects)
    Installment {
        id: i64,
        /// Due date (YYYY-MM-DD)
        due: String,
        amount: String,
        #[arg(long = "kind", value_enum, default_value = "outro")]
        kind: InstallmentArg,
        #[arg(long = "description")]
        description: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum TaskCmd {
    Add {
        project: i64,
        name: String,
        #[arg(long = "budget", default_value = "0")]
        budget: String,
    },
    List {
        #[arg(long = "project")]
        project: Option<i64>,
    },
    Deactivate {
        id: i64,
    },
    Activate {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum AllocCmd {
    Add {
        user: i64,
        project: i64,
        /// Start date (YYYY-MM-DD)
        start: String,
        #[arg(long = "task")]
        task: Option<i64>,
    },
    List {
        #[arg(long = "user")]
        user: Option<i64>,
    },
    Deactivate {
        id: i64,
    },
    Activate {
        id: i64,
    },
}

#[derive(Subcommand)]
pub enum BankCmd {
    /// Append a signed movement (+credit / -debit)
    Add {
        user: i64,
        #[arg(allow_hyphen_values = true)]
        hours: String,
        #[arg(long = "note")]
        note: Option<String>,
    },
    /// Show the current balance and movements
    Balance { user: i64 },
}

// ---------------------------
// CLI values → domain enums
// ---------------------------

use crate::models::project::{BillingModel, FeeType, InstallmentType, ProjectStatus};
use crate::models::punch::PunchType;
use crate::models::timesheet::{CollaboratorClass, EntryMode, ProjectClass};
use crate::models::user::Role;

impl From<RoleArg> for Role {
    fn from(v: RoleArg) -> Self {
        match v {
            RoleArg::Admin => Role::Admin,
            RoleArg::Gestor => Role::Manager,
            RoleArg::Colaborador => Role::Collaborator,
        }
    }
}

impl From<BillingModelArg> for BillingModel {
    fn from(v: BillingModelArg) -> Self {
        match v {
            BillingModelArg::EscopoFechado => BillingModel::FixedScope,
            BillingModelArg::Alocacao => BillingModel::Allocation,
        }
    }
}

impl From<FeeTypeArg> for FeeType {
    fn from(v: FeeTypeArg) -> Self {
        match v {
            FeeTypeArg::Fixo => FeeType::Fixed,
            FeeTypeArg::PorHora => FeeType::Hourly,
        }
    }
}

impl From<ProjectStatusArg> for ProjectStatus {
    fn from(v: ProjectStatusArg) -> Self {
        match v {
            ProjectStatusArg::Ativo => ProjectStatus::Active,
            ProjectStatusArg::Pausado => ProjectStatus::Paused,
            ProjectStatusArg::Concluido => ProjectStatus::Completed,
            ProjectStatusArg::Cancelado => ProjectStatus::Cancelled,
        }
    }
}

impl From<InstallmentArg> for InstallmentType {
    fn from(v: InstallmentArg) -> Self {
        match v {
            InstallmentArg::Marco => InstallmentType::Milestone,
            InstallmentArg::Outro => InstallmentType::Other,
        }
    }
}

impl From<PunchArg> for PunchType {
    fn from(v: PunchArg) -> Self {
        match v {
            PunchArg::Entrada => PunchType::Entrada,
            PunchArg::SaidaAlmoco => PunchType::SaidaAlmoco,
            PunchArg::VoltaAlmoco => PunchType::VoltaAlmoco,
            PunchArg::Saida => PunchType::Saida,
        }
    }
}

impl From<ModeArg> for EntryMode {
    fn from(v: ModeArg) -> Self {
        match v {
            ModeArg::Timesheet => EntryMode::Timesheet,
            ModeArg::Ponto => EntryMode::Punch,
        }
    }
}

impl From<CollabClassArg> for CollaboratorClass {
    fn from(v: CollabClassArg) -> Self {
        match v {
            CollabClassArg::Normal => CollaboratorClass::Normal,
            CollabClassArg::Extra => CollaboratorClass::Extra,
            CollabClassArg::Banco => CollaboratorClass::Banked,
        }
    }
}

impl From<ProjectClassArg> for ProjectClass {
    fn from(v: ProjectClassArg) -> Self {
        match v {
            ProjectClassArg::Normal => ProjectClass::Normal,
            ProjectClassArg::Extra => ProjectClass::Extra,
        }
    }
}
