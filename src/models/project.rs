use super::competence::Competence;
use super::lifecycle::Lifecycle;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ProjectStatus {
    Active,
    Paused,
    Completed,
    Cancelled,
}

impl ProjectStatus {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            ProjectStatus::Active => "ATIVO",
            ProjectStatus::Paused => "PAUSADO",
            ProjectStatus::Completed => "CONCLUIDO",
            ProjectStatus::Cancelled => "CANCELADO",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ATIVO" => Some(ProjectStatus::Active),
            "PAUSADO" => Some(ProjectStatus::Paused),
            "CONCLUIDO" => Some(ProjectStatus::Completed),
            "CANCELADO" => Some(ProjectStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BillingModel {
    /// Fixed-fee scope (`ESCOPO_FECHADO`).
    FixedScope,
    /// Monthly staff allocation (`ALOCACAO`).
    Allocation,
}

impl BillingModel {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            BillingModel::FixedScope => "ESCOPO_FECHADO",
            BillingModel::Allocation => "ALOCACAO",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ESCOPO_FECHADO" => Some(BillingModel::FixedScope),
            "ALOCACAO" => Some(BillingModel::Allocation),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum FeeType {
    Fixed,
    Hourly,
}

impl FeeType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            FeeType::Fixed => "FIXO",
            FeeType::Hourly => "POR_HORA",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "FIXO" => Some(FeeType::Fixed),
            "POR_HORA" => Some(FeeType::Hourly),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Project {
    pub id: i64,
    pub name: String,
    pub client: Option<String>,
    pub cost_center: Option<String>,
    pub status: ProjectStatus,
    pub billing_model: BillingModel,
    pub fee_type: Option<FeeType>,
    pub fee_amount: Option<Decimal>,
    pub manager_id: i64,
    pub lifecycle: Lifecycle,
}

/// Fixed-scope estimate line; snapshots are frozen at estimate time.
#[derive(Debug, Clone, Serialize)]
pub struct EstimateProfile {
    pub id: i64,
    pub project_id: i64,
    pub cost_profile_id: i64,
    pub estimated_hours: Decimal,
    pub cost_per_hour: Decimal,
    pub price_per_hour: Decimal,
}

/// Allocation contract line for one competence month and cost profile.
#[derive(Debug, Clone, Serialize)]
pub struct MonthlyContract {
    pub id: i64,
    pub project_id: i64,
    pub competence: Competence,
    pub cost_profile_id: i64,
    pub contracted_hours: Decimal,
    pub price_contracted: Decimal,
    pub price_additional: Decimal,
    pub price_off_hours: Decimal,
    pub price_overtime: Decimal,
    pub cost_per_hour: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InstallmentType {
    Milestone,
    Other,
}

impl InstallmentType {
    pub fn to_db_str(&self) -> &'static str {
        match self {
            InstallmentType::Milestone => "MARCO",
            InstallmentType::Other => "OUTRO",
        }
    }

    pub fn from_db_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "MARCO" => Some(InstallmentType::Milestone),
            "OUTRO" => Some(InstallmentType::Other),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct FeeInstallment {
    pub id: i64,
    pub project_id: i64,
    pub kind: InstallmentType,
    pub description: Option<String>,
    pub due_date: NaiveDate,
    pub amount: Decimal,
}

/// A project with every billing-relevant child record attached.
#[derive(Debug, Clone)]
pub struct ProjectBook {
    pub project: Project,
    pub estimates: Vec<EstimateProfile>,
    pub contracts: Vec<MonthlyContract>,
    pub installments: Vec<FeeInstallment>,
}

impl ProjectBook {
    pub fn estimated_hours(&self) -> Decimal {
        self.estimates.iter().map(|e| e.estimated_hours).sum()
    }

    pub fn contracts_for(&self, month: Competence) -> impl Iterator<Item = &MonthlyContract> {
        self.contracts.iter().filter(move |c| c.competence == month)
    }

    pub fn contracted_hours(&self, month: Competence) -> Decimal {
        self.contracts_for(month).map(|c| c.contracted_hours).sum()
    }

    pub fn estimate_for_profile(&self, cost_profile_id: Option<i64>) -> Option<&EstimateProfile> {
        let pid = cost_profile_id?;
        self.estimates.iter().find(|e| e.cost_profile_id == pid)
    }
}
