//! Downloadable report assets.
//!
//! The report and the script are plain files. The presentation is rebuilt by
//! running the analysis script through an external interpreter when it is
//! missing; such runs are serialised so that concurrent requests launch at
//! most one process.

use std::fmt;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Context, Result, bail};
use parking_lot::Mutex;

use crate::config::AssetConfig;
use crate::error::AssetError;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

// ---------------------------------------------------------------------------
// Asset kinds
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Report,
    Presentation,
    Script,
}

impl AssetKind {
    pub const ALL: [AssetKind; 3] = [AssetKind::Report, AssetKind::Presentation, AssetKind::Script];

    pub fn mime(self) -> &'static str {
        match self {
            AssetKind::Report => "application/pdf",
            AssetKind::Presentation => {
                "application/vnd.openxmlformats-officedocument.presentationml.presentation"
            }
            AssetKind::Script => "text/plain",
        }
    }

    /// Label of the download button.
    pub fn button_label(self) -> &'static str {
        match self {
            AssetKind::Report => "Download Report (PDF)",
            AssetKind::Presentation => "Download Presentation (PPTX)",
            AssetKind::Script => "Download Analysis Script",
        }
    }
}

impl fmt::Display for AssetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            AssetKind::Report => "report",
            AssetKind::Presentation => "presentation",
            AssetKind::Script => "script",
        })
    }
}

/// A fetched asset, ready to be saved.
#[derive(Debug, Clone, PartialEq)]
pub struct Asset {
    pub kind: AssetKind,
    /// Suggested name for the saved copy.
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl Asset {
    pub fn mime(&self) -> &'static str {
        self.kind.mime()
    }

    /// Contents as text, for inline display of the script.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

// ---------------------------------------------------------------------------
// Regeneration
// ---------------------------------------------------------------------------

/// Rebuilds the presentation file.
pub trait Regenerator: Send + Sync {
    fn regenerate(&self) -> Result<()>;
}

/// Runs `<interpreter> <script>` and waits for it, killing it on timeout.
#[derive(Debug, Clone)]
pub struct ScriptRegenerator {
    pub interpreter: String,
    pub script: PathBuf,
    pub timeout: Duration,
}

impl ScriptRegenerator {
    pub fn from_config(config: &AssetConfig) -> Self {
        Self {
            interpreter: config.interpreter.clone(),
            script: config.script_path.clone(),
            timeout: Duration::from_secs(config.regeneration_timeout_secs),
        }
    }
}

impl Regenerator for ScriptRegenerator {
    fn regenerate(&self) -> Result<()> {
        log::info!(
            "Running {} {} (timeout {:?})",
            self.interpreter,
            self.script.display(),
            self.timeout
        );
        let mut child = Command::new(&self.interpreter)
            .arg(&self.script)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .with_context(|| format!("starting {}", self.interpreter))?;

        // Drain stderr on the side so a chatty script cannot fill the pipe.
        let mut stderr = child.stderr.take();
        let stderr_reader = thread::spawn(move || {
            let mut text = String::new();
            if let Some(pipe) = stderr.as_mut() {
                let _ = pipe.read_to_string(&mut text);
            }
            text
        });

        let started = Instant::now();
        let status = loop {
            if let Some(status) = child.try_wait().context("waiting for interpreter")? {
                break status;
            }
            if started.elapsed() >= self.timeout {
                let _ = child.kill();
                let _ = child.wait();
                bail!("{} timed out after {:?}", self.interpreter, self.timeout);
            }
            thread::sleep(POLL_INTERVAL);
        };

        let stderr_text = stderr_reader.join().unwrap_or_default();
        if !status.success() {
            bail!(
                "{} exited with {status}: {}",
                self.interpreter,
                stderr_text.trim()
            );
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Asset store
// ---------------------------------------------------------------------------

pub struct AssetStore {
    report: PathBuf,
    presentation: PathBuf,
    script: PathBuf,
    regenerator: Box<dyn Regenerator>,
    regeneration: Mutex<()>,
}

impl AssetStore {
    pub fn new(config: &AssetConfig, regenerator: Box<dyn Regenerator>) -> Self {
        Self {
            report: config.report_path.clone(),
            presentation: config.presentation_path.clone(),
            script: config.script_path.clone(),
            regenerator,
            regeneration: Mutex::new(()),
        }
    }

    pub fn from_config(config: &AssetConfig) -> Self {
        Self::new(config, Box::new(ScriptRegenerator::from_config(config)))
    }

    pub fn path(&self, kind: AssetKind) -> &Path {
        match kind {
            AssetKind::Report => &self.report,
            AssetKind::Presentation => &self.presentation,
            AssetKind::Script => &self.script,
        }
    }

    /// Read an asset, regenerating the presentation first if it is missing.
    pub fn fetch_asset(&self, kind: AssetKind) -> Result<Asset, AssetError> {
        let path = self.path(kind);
        if !path.exists() {
            if kind != AssetKind::Presentation {
                return Err(AssetError::Missing {
                    kind,
                    path: path.to_path_buf(),
                });
            }
            self.regenerate_presentation()?;
        }

        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| kind.to_string());
        Ok(Asset {
            kind,
            file_name,
            bytes,
        })
    }

    fn regenerate_presentation(&self) -> Result<(), AssetError> {
        let _guard = self.regeneration.lock();
        // Another caller may have rebuilt it while we waited.
        if self.presentation.exists() {
            return Ok(());
        }

        let generation_error = |message: String| AssetError::Generation {
            kind: AssetKind::Presentation,
            message,
        };

        if let Err(e) = self.regenerator.regenerate() {
            log::error!("Presentation regeneration failed: {e:#}");
            self.discard_partial_presentation();
            return Err(generation_error(format!("{e:#}")));
        }
        if !self.presentation.exists() {
            log::error!(
                "Regeneration finished but {} is still missing",
                self.presentation.display()
            );
            return Err(generation_error(format!(
                "{} was not created",
                self.presentation.display()
            )));
        }
        log::info!("Regenerated {}", self.presentation.display());
        Ok(())
    }

    /// A failed run must not leave a half-written deck to be served later.
    fn discard_partial_presentation(&self) {
        if self.presentation.exists() {
            if let Err(e) = std::fs::remove_file(&self.presentation) {
                log::warn!(
                    "Could not remove partial {}: {e}",
                    self.presentation.display()
                );
            }
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    /// Counts runs; optionally writes `output` to simulate a successful run.
    pub(crate) struct FakeRegenerator {
        pub calls: Arc<AtomicUsize>,
        pub output: Option<PathBuf>,
        pub delay: Duration,
    }

    impl Regenerator for FakeRegenerator {
        fn regenerate(&self) -> Result<()> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            thread::sleep(self.delay);
            match &self.output {
                Some(path) => {
                    std::fs::write(path, b"deck")?;
                    Ok(())
                }
                None => bail!("interpreter exited with status 1"),
            }
        }
    }

    /// Config pointing into `dir`, with report and script present.
    pub(crate) fn asset_config(dir: &Path) -> AssetConfig {
        let config = AssetConfig {
            report_path: dir.join("report.pdf"),
            presentation_path: dir.join("deck.pptx"),
            script_path: dir.join("analysis.R"),
            ..AssetConfig::default()
        };
        std::fs::write(&config.report_path, b"%PDF-1.4").unwrap();
        std::fs::write(&config.script_path, b"library(ggplot2)\n").unwrap();
        config
    }

    #[test]
    fn serves_existing_files_with_mime_types() {
        let dir = tempfile::tempdir().unwrap();
        let config = asset_config(dir.path());
        std::fs::write(&config.presentation_path, b"deck").unwrap();
        let calls = Arc::new(AtomicUsize::new(0));
        let store = AssetStore::new(
            &config,
            Box::new(FakeRegenerator {
                calls: calls.clone(),
                output: None,
                delay: Duration::ZERO,
            }),
        );

        let report = store.fetch_asset(AssetKind::Report).unwrap();
        assert_eq!(report.bytes, b"%PDF-1.4");
        assert_eq!(report.file_name, "report.pdf");
        assert_eq!(report.mime(), "application/pdf");
        assert_eq!(
            store.fetch_asset(AssetKind::Presentation).unwrap().mime(),
            "application/vnd.openxmlformats-officedocument.presentationml.presentation"
        );
        assert_eq!(
            store.fetch_asset(AssetKind::Script).unwrap().text(),
            "library(ggplot2)\n"
        );
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn missing_report_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = asset_config(dir.path());
        std::fs::remove_file(&config.report_path).unwrap();
        let store = AssetStore::from_config(&config);
        assert!(matches!(
            store.fetch_asset(AssetKind::Report),
            Err(AssetError::Missing {
                kind: AssetKind::Report,
                ..
            })
        ));
    }

    #[test]
    fn failed_regeneration_leaves_other_assets_available() {
        let dir = tempfile::tempdir().unwrap();
        let config = asset_config(dir.path());
        let calls = Arc::new(AtomicUsize::new(0));
        let store = AssetStore::new(
            &config,
            Box::new(FakeRegenerator {
                calls: calls.clone(),
                output: None,
                delay: Duration::ZERO,
            }),
        );

        let err = store.fetch_asset(AssetKind::Presentation).unwrap_err();
        assert!(matches!(
            err,
            AssetError::Generation {
                kind: AssetKind::Presentation,
                ..
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(store.fetch_asset(AssetKind::Report).is_ok());
        assert!(store.fetch_asset(AssetKind::Script).is_ok());
    }

    #[test]
    fn concurrent_requests_regenerate_once() {
        let dir = tempfile::tempdir().unwrap();
        let config = asset_config(dir.path());
        let calls = Arc::new(AtomicUsize::new(0));
        let store = AssetStore::new(
            &config,
            Box::new(FakeRegenerator {
                calls: calls.clone(),
                output: Some(config.presentation_path.clone()),
                delay: Duration::from_millis(100),
            }),
        );

        thread::scope(|s| {
            let a = s.spawn(|| store.fetch_asset(AssetKind::Presentation));
            let b = s.spawn(|| store.fetch_asset(AssetKind::Presentation));
            assert_eq!(a.join().unwrap().unwrap().bytes, b"deck");
            assert_eq!(b.join().unwrap().unwrap().bytes, b"deck");
        });
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(unix)]
    #[test]
    fn script_regenerator_reports_exit_status() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fail.sh");
        std::fs::write(&script, "echo broken >&2\nexit 3\n").unwrap();
        let regenerator = ScriptRegenerator {
            interpreter: "sh".to_string(),
            script,
            timeout: Duration::from_secs(10),
        };
        let msg = format!("{:#}", regenerator.regenerate().unwrap_err());
        assert!(msg.contains("broken"), "{msg}");
    }

    #[cfg(unix)]
    #[test]
    fn script_regenerator_times_out() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("slow.sh");
        std::fs::write(&script, "exec sleep 5\n").unwrap();
        let regenerator = ScriptRegenerator {
            interpreter: "sh".to_string(),
            script,
            timeout: Duration::from_millis(200),
        };
        let started = Instant::now();
        let msg = format!("{:#}", regenerator.regenerate().unwrap_err());
        assert!(msg.contains("timed out"), "{msg}");
        assert!(started.elapsed() < Duration::from_secs(4));
    }

    #[test]
    fn missing_interpreter_is_a_generation_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = asset_config(dir.path());
        config.interpreter = "definitely-not-an-interpreter".to_string();
        let store = AssetStore::from_config(&config);
        assert!(matches!(
            store.fetch_asset(AssetKind::Presentation),
            Err(AssetError::Generation { .. })
        ));
    }
}
