use async_trait::async_trait;

use crate::{ClosedTrade, ExposureState, OpenTrade, Result, RiskConfig, Summary};

/// Durable home of the trade ledger and exposure state.
///
/// The engine treats this as a transactional load/replace resource: state is
/// loaded at the start of a tick and written back in one `save` call at the
/// end. The summary is derived data; implementations may persist it for
/// readers, but it is always recomputed before being written.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    async fn load_open(&self) -> Result<Vec<OpenTrade>>;
    async fn load_closed(&self) -> Result<Vec<ClosedTrade>>;
    async fn load_exposure(&self) -> Result<ExposureState>;

    /// Persist ledger, exposure and summary as one logical unit.
    async fn save(
        &self,
        open: &[OpenTrade],
        closed: &[ClosedTrade],
        exposure: &ExposureState,
        summary: &Summary,
    ) -> Result<()>;
}

/// Externally editable risk configuration.
#[async_trait]
pub trait SettingsStore: Send + Sync {
    /// `Ok(None)` when no settings have been saved yet.
    async fn load(&self) -> Result<Option<RiskConfig>>;
    async fn save(&self, config: &RiskConfig) -> Result<()>;
}
