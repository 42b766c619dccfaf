//! End-to-end tests driving the yandagen binary in a scratch directory

use assert_cmd::Command;
use predicates::prelude::*;

fn yandagen(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("yandagen").unwrap();
    cmd.current_dir(dir);
    cmd
}

#[test]
fn dry_run_writes_dockerfiles_and_prints_commands() {
    let dir = tempfile::tempdir().unwrap();
    yandagen(dir.path())
        .arg("make")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "docker build --no-cache --pull -t csirocass/yandabase:openmpi3 -f Dockerfile-yandabase-openmpi3 .",
        ))
        .stdout(predicate::str::contains(
            "docker build --no-cache --pull -t csirocass/yandasoft:dev-openmpi3 -f Dockerfile-yandasoft-openmpi3 .",
        ));

    let base = dir.path().join("Dockerfile-yandabase-openmpi3");
    let final_image = dir.path().join("Dockerfile-yandasoft-openmpi3");
    assert!(base.is_file());
    assert!(final_image.is_file());
    // A dry run writes the two recipes and nothing else.
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);

    let base_text = std::fs::read_to_string(&base).unwrap();
    assert!(base_text.starts_with("# This file is automatically created by yandagen"));
    assert!(base_text.contains("FROM ubuntu:bionic as buildenv"));

    let final_text = std::fs::read_to_string(&final_image).unwrap();
    assert!(final_text.contains("FROM csirocass/yandabase:openmpi3 as buildenv"));
}

#[test]
fn targets_lists_the_matrix_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    yandagen(dir.path())
        .arg("targets")
        .assert()
        .success()
        .stdout(predicate::str::contains("- Machine: generic"))
        .stdout(predicate::str::contains("- MPI: openmpi-3.1.6"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
}

#[test]
fn batch_writes_a_sample_slurm_script() {
    let dir = tempfile::tempdir().unwrap();
    yandagen(dir.path()).arg("batch").assert().success();

    let path = dir.path().join("sample-generic-openmpi-3.1.6.sbatch");
    let text = std::fs::read_to_string(path).unwrap();
    assert!(text.starts_with("#!/bin/bash -l\n"));
    assert!(text.contains("module load openmpi/3.1.6-ofed45-gcc"));
    assert!(text.contains("singularity exec yandasoft-3.1.6_latest.sif"));
}

#[test]
fn branch_override_changes_the_final_image_prefix() {
    let dir = tempfile::tempdir().unwrap();
    yandagen(dir.path())
        .arg("make")
        .env("YANDAGEN_GIT_BRANCH", "master")
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "-t csirocass/yandasoft:openmpi3 -f Dockerfile-yandasoft-openmpi3",
        ));
}
