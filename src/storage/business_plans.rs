use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{OrderBy, Record, Session, StorageError, Store};
use crate::model::{BusinessPlan, PlanSections};

#[derive(Debug, Serialize, Deserialize)]
pub struct BusinessPlanRow {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub executive_summary: String,
    #[serde(default)]
    pub company_description: String,
    #[serde(default)]
    pub market_analysis: String,
    #[serde(default)]
    pub competitive_analysis: String,
    #[serde(default)]
    pub marketing_strategy: String,
    #[serde(default)]
    pub operations_plan: String,
    #[serde(default)]
    pub financial_projections: String,
    #[serde(default)]
    pub funding_requirements: String,
    /// Set by the database on insert.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Record for BusinessPlan {
    const TABLE: &'static str = "business_plans";
    const ORDER: OrderBy = OrderBy::desc("updated_at");

    type Row = BusinessPlanRow;

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn to_row(&self) -> BusinessPlanRow {
        let sections = &self.sections;
        BusinessPlanRow {
            id: self.id.clone(),
            title: self.title.clone(),
            executive_summary: sections.executive_summary.clone(),
            company_description: sections.company_description.clone(),
            market_analysis: sections.market_analysis.clone(),
            competitive_analysis: sections.competitive_analysis.clone(),
            marketing_strategy: sections.marketing_strategy.clone(),
            operations_plan: sections.operations_plan.clone(),
            financial_projections: sections.financial_projections.clone(),
            funding_requirements: sections.funding_requirements.clone(),
            created_at: None,
            // every save counts as an edit
            updated_at: Some(Utc::now()),
        }
    }

    fn from_row(row: BusinessPlanRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            sections: PlanSections {
                executive_summary: row.executive_summary,
                company_description: row.company_description,
                market_analysis: row.market_analysis,
                competitive_analysis: row.competitive_analysis,
                marketing_strategy: row.marketing_strategy,
                operations_plan: row.operations_plan,
                financial_projections: row.financial_projections,
                funding_requirements: row.funding_requirements,
            },
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

impl Store {
    pub async fn save_business_plan(
        &self,
        session: &Session,
        plan: &BusinessPlan,
    ) -> Result<BusinessPlan, StorageError> {
        self.save(session, plan).await
    }

    /// The caller's plans, most recently edited first.
    pub async fn load_business_plans(
        &self,
        session: &Session,
    ) -> Result<Vec<BusinessPlan>, StorageError> {
        self.load(session).await
    }

    pub async fn delete_business_plan(
        &self,
        session: &Session,
        id: &str,
    ) -> Result<(), StorageError> {
        self.delete::<BusinessPlan>(session, id).await
    }
}
