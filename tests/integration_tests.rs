//! Integration tests for vsmodup
//!
//! These tests verify:
//! - Full update runs against real zip archives and a scripted registry
//! - Failure isolation between mods
//! - Dry-run, backup and interactive confirmation behaviour
//! - Export / import round-trip

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use vsmodup::config::RunConfig;
use vsmodup::domain::{ActionTaken, ModState, Release, SemVer};
use vsmodup::error::RegistryError;
use vsmodup::modes::{export_mods, import_mods};
use vsmodup::orchestrator::{Answer, Orchestrator, ScriptedConfirm};
use vsmodup::output::StatusPrinter;
use vsmodup::registry::{ModListing, ModRegistry};
use vsmodup::update::PreReleasePolicy;
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

/// Write a mod archive with the given manifest
fn write_mod_zip(path: &Path, manifest: &str) {
    let file = fs::File::create(path).unwrap();
    let mut zip = ZipWriter::new(file);
    zip.start_file("modinfo.json", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(manifest.as_bytes()).unwrap();
    zip.finish().unwrap();
}

fn manifest(mod_id: &str, version: &str) -> String {
    format!(
        r#"{{"type": "code", "name": "{id}", "modid": "{id}", "version": "{version}", "authors": ["tester"]}}"#,
        id = mod_id,
        version = version
    )
}

/// In-memory registry: releases per mod id, downloads write real mod archives
#[derive(Default)]
struct ScriptedRegistry {
    listings: HashMap<String, Vec<Release>>,
    /// Release filename → mod id, used to write a matching manifest
    owners: HashMap<String, String>,
    failing_downloads: HashSet<String>,
    failing_fetches: HashSet<String>,
    fetched: Mutex<Vec<String>>,
    downloaded: Mutex<Vec<String>>,
}

impl ScriptedRegistry {
    fn with_mod(mut self, mod_id: &str, versions: &[&str]) -> Self {
        let releases = versions
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let filename = format!("{}_{}.zip", mod_id, v);
                self.owners.insert(filename.clone(), mod_id.to_string());
                Release::new(
                    i as u64 + 1,
                    format!("https://mods.example/files/{}", filename),
                    filename,
                    SemVer::parse(v).unwrap(),
                )
            })
            .collect();
        self.listings.insert(mod_id.to_string(), releases);
        self
    }

    fn failing_download(mut self, filename: &str) -> Self {
        self.failing_downloads.insert(filename.to_string());
        self
    }

    fn failing_fetch(mut self, mod_id: &str) -> Self {
        self.failing_fetches.insert(mod_id.to_string());
        self
    }

    fn fetched(&self) -> Vec<String> {
        self.fetched.lock().unwrap().clone()
    }

    fn downloaded(&self) -> Vec<String> {
        self.downloaded.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModRegistry for ScriptedRegistry {
    fn registry_name(&self) -> &'static str {
        "scripted"
    }

    async fn fetch_mod(&self, mod_id: &str) -> Result<ModListing, RegistryError> {
        self.fetched.lock().unwrap().push(mod_id.to_string());
        if self.failing_fetches.contains(mod_id) {
            return Err(RegistryError::network_error(mod_id, "connection refused"));
        }
        let releases = self
            .listings
            .get(mod_id)
            .cloned()
            .ok_or_else(|| RegistryError::mod_not_found(mod_id))?;
        Ok(ModListing {
            name: mod_id.to_string(),
            releases,
        })
    }

    async fn download(&self, release: &Release, target: &Path) -> Result<(), RegistryError> {
        if self.failing_downloads.contains(&release.filename) {
            return Err(RegistryError::download_failed(
                &release.download_url,
                "connection reset by peer",
            ));
        }
        let owner = self.owners.get(&release.filename).cloned().unwrap_or_default();
        let version = release.version.to_string();
        write_mod_zip(target, &manifest(&owner, version.trim_start_matches('v')));
        self.downloaded
            .lock()
            .unwrap()
            .push(format!("{}@{}", owner, release.version));
        Ok(())
    }
}

struct Fixture {
    _dir: TempDir,
    mods: PathBuf,
    backups: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp directory");
        let mods = dir.path().join("Mods");
        let backups = dir.path().join("ModBackups");
        fs::create_dir_all(&mods).unwrap();
        Self {
            _dir: dir,
            mods,
            backups,
        }
    }

    fn install(&self, file: &str, mod_id: &str, version: &str) -> PathBuf {
        let path = self.mods.join(file);
        write_mod_zip(&path, &manifest(mod_id, version));
        path
    }

    fn config(&self) -> RunConfig {
        RunConfig::for_mod_path(&self.mods, &self.backups)
    }
}

fn text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}

mod update_runs {
    use super::*;

    /// Mod #2's download fails; #1 and #3 still finish
    #[tokio::test]
    async fn test_failure_isolation() {
        let fx = Fixture::new();
        let first = fx.install("a_alpha.zip", "alpha", "1.0.0");
        let second = fx.install("b_beta.zip", "beta", "1.0.0");
        fx.install("c_gamma.zip", "gamma", "2.0.0");

        let registry = Arc::new(
            ScriptedRegistry::default()
                .with_mod("alpha", &["1.0.0", "1.1.0"])
                .with_mod("beta", &["1.0.0", "1.5.0"])
                .with_mod("gamma", &["1.0.0", "2.0.0"])
                .failing_download("beta_1.5.0.zip"),
        );

        let mut orchestrator = Orchestrator::new(registry.clone(), fx.config());
        let mut out = Vec::new();
        let summary = orchestrator.run(&mut out).await.unwrap();

        assert_eq!(summary.total(), 3);
        assert_eq!(summary.find("alpha").unwrap().state, ModState::Finalized);
        assert_eq!(summary.find("beta").unwrap().state, ModState::Failed);
        assert_eq!(summary.find("gamma").unwrap().state, ModState::NoUpdate);

        assert!(!first.exists());
        assert!(fx.mods.join("alpha_1.1.0.zip").exists());
        assert!(second.exists(), "failed download must restore the old archive");
        assert!(!fx.mods.join("beta_1.5.0.zip").exists());

        let output = text(out);
        assert!(output.starts_with(&format!("Updating mods: {}\n", fx.mods.display())));
        assert!(output.contains("Downloading beta: v1.0.0 => v1.5.0 - FAIL"));
        assert!(output.contains("gamma@v2.0.0 - No updates"));
        assert!(output.ends_with("Finished Updating.\n"));
    }

    /// The very first mod's registry query fails; the rest still run
    #[tokio::test]
    async fn test_first_fetch_failure_is_isolated() {
        let fx = Fixture::new();
        let first = fx.install("a_alpha.zip", "alpha", "1.0.0");
        fx.install("b_beta.zip", "beta", "1.0.0");
        fx.install("c_gamma.zip", "gamma", "1.0.0");

        let registry = Arc::new(
            ScriptedRegistry::default()
                .with_mod("alpha", &["1.1.0"])
                .with_mod("beta", &["1.1.0"])
                .with_mod("gamma", &["1.0.0"])
                .failing_fetch("alpha"),
        );

        let mut orchestrator = Orchestrator::new(registry.clone(), fx.config());
        let mut out = Vec::new();
        let summary = orchestrator.run(&mut out).await.unwrap();

        assert_eq!(summary.total(), 3);
        let alpha = summary.find("alpha").unwrap();
        assert_eq!(alpha.state, ModState::Failed);
        assert!(alpha.error_message().unwrap().contains("connection refused"));
        assert_eq!(summary.find("beta").unwrap().state, ModState::Finalized);
        assert_eq!(summary.find("gamma").unwrap().state, ModState::NoUpdate);
        assert_eq!(summary.failed(), 1);

        assert_eq!(registry.fetched(), vec!["alpha", "beta", "gamma"]);
        assert!(first.exists());
        assert!(text(out).ends_with("Finished Updating.\n"));
    }

    #[tokio::test]
    async fn test_dry_run_changes_nothing() {
        let fx = Fixture::new();
        let installed = fx.install("alpha.zip", "alpha", "1.0.0");
        let before = fs::read(&installed).unwrap();

        let registry = Arc::new(ScriptedRegistry::default().with_mod("alpha", &["1.2.0"]));
        let mut config = fx.config();
        config.dry_run = true;

        let mut orchestrator = Orchestrator::new(registry.clone(), config);
        let mut out = Vec::new();
        let summary = orchestrator.run(&mut out).await.unwrap();

        assert_eq!(summary.reported(), 1);
        assert_eq!(summary.updated(), 0);
        assert_eq!(fs::read(&installed).unwrap(), before);
        assert!(registry.downloaded().is_empty());
        assert!(!fx.backups.exists());
        assert!(text(out).contains("alpha@v1.0.0 - Update v1.2.0 found!"));
    }

    /// Old and new archive share a name; the old one must land in the backup dir
    #[tokio::test]
    async fn test_backup_keeps_old_archive() {
        let fx = Fixture::new();
        fx.install("alpha_1.1.0.zip", "alpha", "1.0.0");

        let registry = Arc::new(ScriptedRegistry::default().with_mod("alpha", &["1.1.0"]));
        let mut config = fx.config();
        config.backup = true;

        let mut orchestrator = Orchestrator::new(registry, config);
        let mut out = Vec::new();
        let summary = orchestrator.run(&mut out).await.unwrap();

        let outcome = summary.find("alpha").unwrap();
        assert_eq!(outcome.action, ActionTaken::BackedUp);

        let backed_up = vsmodup::inventory::read_descriptor(&fx.backups.join("alpha_1.1.0.zip")).unwrap();
        assert_eq!(backed_up.installed_version.to_string(), "v1.0.0");
        let current = vsmodup::inventory::read_descriptor(&fx.mods.join("alpha_1.1.0.zip")).unwrap();
        assert_eq!(current.installed_version.to_string(), "v1.1.0");
        assert!(!text(out).contains("Removing"));
    }

    #[tokio::test]
    async fn test_missing_mod_id_never_queries_registry() {
        let fx = Fixture::new();
        write_mod_zip(
            &fx.mods.join("anonymous.zip"),
            r#"{"name": "Anonymous", "version": "1.0.0"}"#,
        );

        let registry = Arc::new(ScriptedRegistry::default());
        let mut orchestrator = Orchestrator::new(registry.clone(), fx.config());
        let mut out = Vec::new();
        let summary = orchestrator.run(&mut out).await.unwrap();

        assert_eq!(summary.outcomes()[0].state, ModState::MissingModId);
        assert!(registry.fetched().is_empty());
        assert!(text(out).contains("Anonymous@v1.0.0 - No modid, SKIP"));
    }

    #[tokio::test]
    async fn test_broken_archive_is_reported_and_run_continues() {
        let fx = Fixture::new();
        fs::write(fx.mods.join("aaa_garbage.zip"), b"not a zip").unwrap();
        fx.install("alpha.zip", "alpha", "1.0.0");

        let registry = Arc::new(ScriptedRegistry::default().with_mod("alpha", &["1.0.1"]));
        let mut orchestrator = Orchestrator::new(registry, fx.config());
        let mut out = Vec::new();
        let summary = orchestrator.run(&mut out).await.unwrap();

        assert_eq!(summary.outcomes()[0].state, ModState::Errored);
        assert_eq!(summary.updated(), 1);
        assert!(text(out).contains("!!! aaa_garbage.zip - Failed:"));
    }

    #[tokio::test]
    async fn test_pre_release_gating() {
        let fx = Fixture::new();
        fx.install("stable.zip", "stable", "1.2.0");
        fx.install("tester.zip", "tester", "1.0.0-beta");

        let registry = Arc::new(
            ScriptedRegistry::default()
                .with_mod("stable", &["1.1.0", "1.2.0", "1.3.0-rc1"])
                .with_mod("tester", &["1.0.0-beta", "1.0.0-rc1"]),
        );

        let mut orchestrator = Orchestrator::new(registry.clone(), fx.config());
        let mut out = Vec::new();
        let summary = orchestrator.run(&mut out).await.unwrap();

        assert_eq!(summary.find("stable").unwrap().state, ModState::PreReleaseSkip);
        assert_eq!(summary.find("tester").unwrap().state, ModState::Finalized);
        assert_eq!(registry.downloaded(), vec!["tester@v1.0.0-rc1"]);

        // the same run with pre-releases allowed updates both
        let fx = Fixture::new();
        fx.install("stable.zip", "stable", "1.2.0");
        let mut config = fx.config();
        config.pre_release = PreReleasePolicy::Always;
        let mut orchestrator = Orchestrator::new(registry, config);
        let summary = orchestrator.run(&mut Vec::<u8>::new()).await.unwrap();
        assert_eq!(summary.find("stable").unwrap().state, ModState::Finalized);
    }

    #[tokio::test]
    async fn test_interactive_prompts() {
        let fx = Fixture::new();
        fx.install("a.zip", "alpha", "1.0.0");
        fx.install("b.zip", "beta", "1.0.0");
        fx.install("c.zip", "gamma", "1.0.0");

        let registry = Arc::new(
            ScriptedRegistry::default()
                .with_mod("alpha", &["1.1.0"])
                .with_mod("beta", &["1.1.0"])
                .with_mod("gamma", &["1.1.0"]),
        );
        let mut config = fx.config();
        config.interactive = true;

        let mut confirm = ScriptedConfirm::new([Answer::No, Answer::All]);
        let summary = {
            let mut orchestrator =
                Orchestrator::new(registry.clone(), config).with_confirm(&mut confirm);
            orchestrator.run(&mut Vec::<u8>::new()).await.unwrap()
        };

        assert_eq!(summary.find("alpha").unwrap().state, ModState::Declined);
        assert_eq!(summary.find("beta").unwrap().state, ModState::Finalized);
        assert_eq!(summary.find("gamma").unwrap().state, ModState::Finalized);
        assert_eq!(
            confirm.prompts(),
            [
                "Update alpha: v1.0.0 => v1.1.0? [Y/n/a] ",
                "Update beta: v1.0.0 => v1.1.0? [Y/n/a] ",
            ]
        );
        assert!(fx.mods.join("a.zip").exists());
    }

    #[tokio::test]
    async fn test_empty_mod_dir() {
        let fx = Fixture::new();
        let registry = Arc::new(ScriptedRegistry::default());
        let mut orchestrator = Orchestrator::new(registry, fx.config());
        let mut out = Vec::new();
        let summary = orchestrator.run(&mut out).await.unwrap();

        assert_eq!(summary.total(), 0);
        assert!(text(out).ends_with("No Mods found\n"));
    }

    #[tokio::test]
    async fn test_missing_mod_dir_is_fatal() {
        let fx = Fixture::new();
        let config = RunConfig::for_mod_path(fx.mods.join("missing"), &fx.backups);
        let registry = Arc::new(ScriptedRegistry::default());
        let mut orchestrator = Orchestrator::new(registry, config);

        assert!(orchestrator.run(&mut Vec::<u8>::new()).await.is_err());
    }
}

mod export_import {
    use super::*;

    #[tokio::test]
    async fn test_round_trip() {
        let fx = Fixture::new();
        fx.install("alpha.zip", "alpha", "1.0.0");
        fx.install("beta.zip", "beta", "2.1.0-rc.1");
        fx.install("gamma.zip", "gamma", "0.4.2");

        let export_file = fx.mods.parent().unwrap().join("export").join("mods.txt");
        let printer = StatusPrinter::plain();
        let report = export_mods(&fx.mods, &export_file, &printer, &mut Vec::<u8>::new()).unwrap();
        assert_eq!(report.exported, 3);

        let registry = ScriptedRegistry::default()
            .with_mod("alpha", &["1.0.0", "1.1.0"])
            .with_mod("beta", &["2.0.0", "2.1.0-rc.1"])
            .with_mod("gamma", &["0.4.2", "0.5.0"]);

        let target = fx.mods.parent().unwrap().join("NewMods");
        let mut out = Vec::new();
        let summary = import_mods(
            &registry,
            &export_file,
            &target,
            &CancellationToken::new(),
            &printer,
            &mut out,
        )
        .await
        .unwrap();

        assert_eq!(summary.updated(), 3);
        assert_eq!(
            registry.downloaded(),
            vec!["alpha@v1.0.0", "beta@v2.1.0-rc.1", "gamma@v0.4.2"]
        );
        assert!(target.join("gamma_0.4.2.zip").exists());
        assert!(text(out).ends_with("Finished import\n"));
    }

    #[tokio::test]
    async fn test_import_cancelled() {
        let fx = Fixture::new();
        let file = fx.mods.join("list.txt");
        fs::write(&file, "alpha@1.0.0\n").unwrap();

        let registry = ScriptedRegistry::default().with_mod("alpha", &["1.0.0"]);
        let cancel = CancellationToken::new();
        cancel.cancel();
        let summary = import_mods(
            &registry,
            &file,
            &fx.mods,
            &cancel,
            &StatusPrinter::plain(),
            &mut Vec::<u8>::new(),
        )
        .await
        .unwrap();

        assert!(summary.cancelled);
        assert!(registry.fetched().is_empty());
    }
}
