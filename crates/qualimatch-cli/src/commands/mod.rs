//! Subcommand implementations and the state they share.

pub mod build;
pub mod infer;
pub mod init;
pub mod participant;
pub mod practice;
pub mod quiz;
pub mod validate;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use qualimatch_core::bank::load_bank;
use qualimatch_core::config::{load_config_from, QualimatchConfig};
use qualimatch_core::model::Bank;
use qualimatch_core::session::{stored_participant, Session, SessionContext, SystemClock};
use qualimatch_core::store::FileStore;

static CLOCK: SystemClock = SystemClock;

/// Flags accepted by every subcommand.
pub struct GlobalArgs {
    pub seed: Option<String>,
    pub pid: Option<String>,
    pub config: Option<PathBuf>,
    pub store: Option<PathBuf>,
    pub bank: Option<PathBuf>,
}

impl GlobalArgs {
    pub fn load_config(&self) -> Result<QualimatchConfig> {
        let mut config = load_config_from(self.config.as_deref())?;
        if let Some(store) = &self.store {
            config.store_path = store.clone();
        }
        if let Some(bank) = &self.bank {
            config.bank_path = Some(bank.clone());
        }
        Ok(config)
    }
}

/// Config, bank, and store opened for one invocation.
pub struct Workspace {
    pub config: QualimatchConfig,
    pub bank: Bank,
    pub store: FileStore,
    pub ctx: SessionContext,
}

impl Workspace {
    pub fn open(args: &GlobalArgs) -> Result<Self> {
        let config = args.load_config()?;
        let bank = load_bank(config.bank_path.as_deref())?;
        let store = FileStore::open(config.store_path.clone())
            .with_context(|| format!("failed to open store {}", config.store_path.display()))?;

        let pid = args.pid.clone().or_else(|| stored_participant(&store));
        let seed = args.seed.as_deref().unwrap_or(&config.default_seed);
        let ctx = SessionContext::new(Some(seed), pid.as_deref());
        tracing::debug!(seed = %ctx.seed, pid = ?ctx.pid, "session context");

        Ok(Self {
            config,
            bank,
            store,
            ctx,
        })
    }

    pub fn session(&mut self) -> Session<'_> {
        Session::new(&self.bank, &mut self.store, &CLOCK, self.ctx.clone())
            .with_thresholds(self.config.inference.clone())
    }

    /// `explicit`, or `file_name` inside the configured output directory.
    pub fn export_path(&self, explicit: Option<PathBuf>, file_name: &str) -> PathBuf {
        explicit.unwrap_or_else(|| self.config.output_dir.join(file_name))
    }
}

/// Write an export and report where it went.
pub fn write_export(path: &Path, body: &str, rows: usize) -> Result<()> {
    qualimatch_report::write_csv(path, body)?;
    println!("Wrote {rows} row(s) to {}", path.display());
    Ok(())
}

/// Shorten long text for table cells.
pub fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{cut}...")
    }
}
