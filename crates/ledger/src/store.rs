use std::io::ErrorKind;
use std::path::PathBuf;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::debug;

use common::{
    ClosedTrade, ExposureState, LedgerStore, OpenTrade, Result, RiskConfig, SettingsStore, Summary,
};

const SETTINGS_FILE: &str = "settings.json";
const OPEN_FILE: &str = "trades_open.json";
const CLOSED_FILE: &str = "trades_closed.json";
const STATE_FILE: &str = "state.json";
const SUMMARY_FILE: &str = "trades_summary.json";

/// JSON-document store over a flat data directory.
///
/// One file per collection. A missing file reads as the empty default; a
/// file that exists but fails to parse is an error, not a silent default.
/// Writes go to a temp file that is renamed into place, so readers never
/// see a half-written document.
pub struct JsonStore {
    dir: PathBuf,
}

impl JsonStore {
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    async fn read_or<T: DeserializeOwned>(&self, name: &str, default: T) -> Result<T> {
        let path = self.dir.join(name);
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(default),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_atomic<T: Serialize + Sync>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.dir.join(name);
        let tmp = self.dir.join(format!("{name}.tmp"));
        let bytes = serde_json::to_vec_pretty(value)?;
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }
}

#[async_trait]
impl LedgerStore for JsonStore {
    async fn load_open(&self) -> Result<Vec<OpenTrade>> {
        self.read_or(OPEN_FILE, Vec::new()).await
    }

    async fn load_closed(&self) -> Result<Vec<ClosedTrade>> {
        self.read_or(CLOSED_FILE, Vec::new()).await
    }

    async fn load_exposure(&self) -> Result<ExposureState> {
        self.read_or(STATE_FILE, ExposureState::default()).await
    }

    async fn save(
        &self,
        open: &[OpenTrade],
        closed: &[ClosedTrade],
        exposure: &ExposureState,
        summary: &Summary,
    ) -> Result<()> {
        // Summary goes last: it is derived data, and a crash between
        // renames leaves at worst a stale summary that the next
        // recomputation repairs.
        self.write_atomic(STATE_FILE, exposure).await?;
        self.write_atomic(OPEN_FILE, &open).await?;
        self.write_atomic(CLOSED_FILE, &closed).await?;
        self.write_atomic(SUMMARY_FILE, summary).await?;
        debug!(
            open = open.len(),
            closed = closed.len(),
            "Ledger persisted"
        );
        Ok(())
    }
}

#[async_trait]
impl SettingsStore for JsonStore {
    async fn load(&self) -> Result<Option<RiskConfig>> {
        let path = self.dir.join(SETTINGS_FILE);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let config: RiskConfig = serde_json::from_slice(&bytes)?;
                Ok(Some(config.normalized()))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn save(&self, config: &RiskConfig) -> Result<()> {
        self.write_atomic(SETTINGS_FILE, config).await
    }
}
