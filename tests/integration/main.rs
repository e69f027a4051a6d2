//! Integration tests for covcache

mod cli_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;

    fn covcache() -> Command {
        cargo_bin_cmd!("covcache")
    }

    #[test]
    fn help_displays() {
        covcache()
            .arg("--help")
            .assert()
            .success()
            .stdout(predicate::str::contains("Content-addressed cache for per-package coverage runs"));
    }

    #[test]
    fn version_displays() {
        covcache()
            .arg("--version")
            .assert()
            .success()
            .stdout(predicate::str::contains("covcache"));
    }

    #[test]
    fn checksum_missing_dir_fails() {
        covcache()
            .args(["--no-local", "checksum", "/definitely/not/here"])
            .assert()
            .failure()
            .stderr(predicate::str::contains("Failed to checksum"));
    }
}

mod workflow_tests {
    use assert_cmd::{cargo::cargo_bin_cmd, Command};
    use predicates::prelude::*;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tempfile::TempDir;

    /// A throwaway project: two units under `src/`, a config whose runner
    /// appends each invocation to `runs.log`, and a private cache dir.
    struct Project {
        root: TempDir,
    }

    impl Project {
        fn new(runner_script: &str) -> Self {
            let root = TempDir::new().unwrap();
            for unit in ["app/core", "app/web"] {
                let dir = root.path().join("src").join(unit);
                fs::create_dir_all(&dir).unwrap();
                fs::write(dir.join("lib.go"), format!("package {unit}\n")).unwrap();
            }

            let config = format!(
                r#"
[cache]
dir = "{cache}"
report = "{report}"
parallel = 2

[units]
list = ["printf", "app/core\napp/web\n"]
source_root = "{src}"

[runner]
command = ["sh", "-c", {script:?}]
"#,
                cache = root.path().join("cache").display(),
                report = root.path().join("profile.cov").display(),
                src = root.path().join("src").display(),
                script = runner_script,
            );
            fs::write(root.path().join("config.toml"), config).unwrap();

            Self { root }
        }

        fn ok() -> Self {
            let log = "echo {unit} >> runs.log";
            Self::new(&format!(
                "{log}; printf 'mode: {{mode}}\\n{{unit}}/lib.go:1.1,2.2 1 1\\n' > {{output}}"
            ))
        }

        fn path(&self) -> &Path {
            self.root.path()
        }

        fn cmd(&self) -> Command {
            let mut cmd = cargo_bin_cmd!("covcache");
            cmd.current_dir(self.path())
                .env_remove("COVCACHE_CONFIG")
                .arg("--no-local")
                .arg("--config")
                .arg(self.path().join("config.toml"));
            cmd
        }

        fn runs(&self) -> Vec<String> {
            fs::read_to_string(self.path().join("runs.log"))
                .unwrap_or_default()
                .lines()
                .map(str::to_string)
                .collect()
        }

        fn fragments(&self) -> Vec<PathBuf> {
            let mut paths: Vec<PathBuf> = fs::read_dir(self.path().join("cache"))
                .unwrap()
                .map(|e| e.unwrap().path())
                .collect();
            paths.sort();
            paths
        }

        fn report(&self) -> String {
            fs::read_to_string(self.path().join("profile.cov")).unwrap()
        }
    }

    #[test]
    fn first_run_verifies_and_merges() {
        let project = Project::ok();

        project.cmd().arg("run").assert().success();

        let mut runs = project.runs();
        runs.sort();
        assert_eq!(runs, vec!["app/core", "app/web"]);
        assert_eq!(project.fragments().len(), 2);
        assert_eq!(
            project.report(),
            "mode: count\napp/core/lib.go:1.1,2.2 1 1\napp/web/lib.go:1.1,2.2 1 1\n"
        );
    }

    #[test]
    fn second_run_is_all_hits() {
        let project = Project::ok();
        project.cmd().arg("run").assert().success();
        fs::remove_file(project.path().join("profile.cov")).unwrap();

        project
            .cmd()
            .arg("run")
            .assert()
            .success()
            .stdout(predicate::str::contains("2 unchanged, 0 verified"));

        assert_eq!(project.runs().len(), 2);
        assert!(project.report().starts_with("mode: count\n"));
    }

    #[test]
    fn changed_unit_reruns_and_evicts() {
        let project = Project::ok();
        project.cmd().arg("run").assert().success();
        let before = project.fragments();

        fs::write(
            project.path().join("src/app/web/lib.go"),
            "package web // edited\n",
        )
        .unwrap();
        project.cmd().arg("run").assert().success();

        let runs = project.runs();
        assert_eq!(runs.len(), 3);
        assert_eq!(runs[2], "app/web");

        let after = project.fragments();
        assert_eq!(after.len(), 2);
        let kept: Vec<_> = after.iter().filter(|p| before.contains(p)).collect();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].to_string_lossy().contains("app%2Fcore"));
    }

    #[test]
    fn failing_unit_fails_run_without_report() {
        let project = Project::new("exit 4");

        project
            .cmd()
            .arg("run")
            .assert()
            .failure()
            .stderr(predicate::str::contains("Verification failed"));

        assert!(!project.path().join("profile.cov").exists());
        assert!(project.fragments().is_empty());
    }

    #[test]
    fn merge_rebuilds_report_from_cache() {
        let project = Project::ok();
        project.cmd().args(["run", "--no-merge"]).assert().success();
        assert!(!project.path().join("profile.cov").exists());

        project.cmd().arg("merge").assert().success();

        assert_eq!(project.report().matches("mode:").count(), 1);
        assert_eq!(project.report().lines().count(), 3);
    }

    #[test]
    fn list_and_clear() {
        let project = Project::ok();
        project.cmd().arg("run").assert().success();

        project
            .cmd()
            .args(["list", "--format", "plain"])
            .assert()
            .success()
            .stdout(predicate::str::contains("app%2Fweb.profile."));

        project
            .cmd()
            .args(["clear", "--yes"])
            .assert()
            .success()
            .stdout(predicate::str::contains("Removed 2 fragment(s)"));
        assert!(project.fragments().is_empty());
    }

    #[test]
    fn config_show_reflects_file() {
        let project = Project::ok();
        project
            .cmd()
            .args(["config", "show"])
            .assert()
            .success()
            .stdout(predicate::str::contains("parallel = 2"));
    }

    #[test]
    fn checksum_is_stable() {
        let project = Project::ok();
        let dir = project.path().join("src/app/core");

        let first = project.cmd().arg("checksum").arg(&dir).output().unwrap();
        let second = project.cmd().arg("checksum").arg(&dir).output().unwrap();

        assert!(first.status.success());
        assert_eq!(first.stdout, second.stdout);
        assert_eq!(String::from_utf8_lossy(&first.stdout).trim().len(), 64);
    }
}
