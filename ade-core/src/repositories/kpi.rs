use crate::{
    Error,
    kpi::{KpiFilter, KpiKey, KpiMeasures, KpiRecord, KpiSummary},
};
use async_trait::async_trait;

/// Repository for `FAIT_KPI_ADE`
#[async_trait]
pub trait KpiRepository: Send + Sync + 'static {
    /// List rows matching the filter, most recent first
    async fn list(&self, filter: &KpiFilter) -> Result<Vec<KpiRecord>, Error>;

    async fn find(&self, key: &KpiKey) -> Result<Option<KpiRecord>, Error>;

    /// Insert a row; fails with a constraint error when the key already exists
    async fn create(&self, record: &KpiRecord) -> Result<KpiRecord, Error>;

    async fn update(&self, key: &KpiKey, measures: &KpiMeasures)
    -> Result<Option<KpiRecord>, Error>;

    async fn delete(&self, key: &KpiKey) -> Result<bool, Error>;

    /// Sum every indicator over the rows matching the filter
    async fn summarize(&self, filter: &KpiFilter) -> Result<KpiSummary, Error>;
}
