use std::fs;
use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

fn ls_rof(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ls-rof"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn pack_rof(args: &[&Path]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_pack-rof"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).unwrap()
}

fn sample_tree(root: &Path) {
    fs::write(root.join("a.txt"), b"hi").unwrap();
    fs::create_dir(root.join("sub")).unwrap();
    fs::write(root.join("sub").join("b.txt"), b"bye").unwrap();
}

#[test]
fn pack_then_list() {
    let source = TempDir::new().unwrap();
    sample_tree(source.path());
    let out = TempDir::new().unwrap();
    let archive = out.path().join("sample.rof");

    let packed = pack_rof(&[source.path(), archive.as_path()]);
    assert!(packed.status.success());
    assert_eq!(stdout(&packed), "");
    assert!(archive.is_file());

    let listed = ls_rof(&[archive.as_path()]);
    assert!(listed.status.success());
    assert_eq!(stdout(&listed), "sub:\n  b.txt\na.txt\n");
}

#[test]
fn pack_overwrites_existing_archive() {
    let source = TempDir::new().unwrap();
    sample_tree(source.path());
    let out = TempDir::new().unwrap();
    let archive = out.path().join("sample.rof");
    fs::write(&archive, vec![0xaau8; 1024]).unwrap();

    assert!(pack_rof(&[source.path(), archive.as_path()]).status.success());
    assert_eq!(
        fs::read(&archive).unwrap(),
        rof_format::pack_to_vec(source.path()).unwrap()
    );
}

#[test]
fn list_without_arguments_prints_usage() {
    let output = ls_rof(&[]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("rof-file"));
}

#[test]
fn list_missing_archive_reports_error() {
    let dir = TempDir::new().unwrap();
    let output = ls_rof(&[dir.path().join("missing.rof").as_path()]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "Error: first argument should be a path to a ROF file.\n"
    );
}

#[test]
fn list_directory_reports_error() {
    let dir = TempDir::new().unwrap();
    let output = ls_rof(&[dir.path()]);
    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        "Error: first argument should be a path to a ROF file.\n"
    );
}

#[test]
fn pack_with_wrong_argument_count_prints_usage() {
    let dir = TempDir::new().unwrap();
    let output = pack_rof(&[dir.path()]);
    assert!(output.status.success());
    assert!(stdout(&output).contains("source-directory"));
}

#[test]
fn pack_missing_source_reports_error() {
    let dir = TempDir::new().unwrap();
    let archive = dir.path().join("out.rof");
    let output = pack_rof(&[dir.path().join("missing").as_path(), archive.as_path()]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "Error: input path does not exist.\n");
    assert!(!archive.exists());
}

#[test]
fn pack_refuses_archive_inside_source() {
    let source = TempDir::new().unwrap();
    sample_tree(source.path());
    let archive = source.path().join("sub").join("self.rof");

    let output = pack_rof(&[source.path(), archive.as_path()]);
    assert!(!output.status.success());
    assert!(!archive.exists());
}

#[test]
fn corrupt_archive_fails() {
    let source = TempDir::new().unwrap();
    sample_tree(source.path());
    let out = TempDir::new().unwrap();
    let archive = out.path().join("sample.rof");
    assert!(pack_rof(&[source.path(), archive.as_path()]).status.success());

    let mut data = fs::read(&archive).unwrap();
    data.truncate(30);
    fs::write(&archive, data).unwrap();

    let output = ls_rof(&[archive.as_path()]);
    assert!(!output.status.success());
    let stderr = String::from_utf8(output.stderr).unwrap();
    assert!(stderr.contains("Corrupt archive"), "{}", stderr);
}
