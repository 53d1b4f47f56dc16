use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn fixture_path() -> String {
    let manifest_dir = env!("CARGO_MANIFEST_DIR");
    format!("{manifest_dir}/tests/fixtures/sample-cpp-project")
}

fn copy_dir(from: &Path, to: &Path) {
    fs::create_dir_all(to).expect("failed to create dir");
    for entry in fs::read_dir(from).expect("failed to read fixture dir") {
        let entry = entry.expect("failed to read entry");
        let dest = to.join(entry.file_name());
        if entry.path().is_dir() {
            copy_dir(&entry.path(), &dest);
        } else {
            fs::copy(entry.path(), &dest).expect("failed to copy fixture file");
        }
    }
}

/// Fresh copy of the sample project, since every run writes into it.
fn sample_project() -> tempfile::TempDir {
    let dir = tempfile::tempdir().expect("failed to create temp dir");
    copy_dir(Path::new(&fixture_path()), dir.path());
    dir
}

fn testgen(project: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_testgen"))
        .args(args)
        .current_dir(project)
        .env_remove("TESTGEN_LOG")
        .env("NO_COLOR", "1")
        .output()
        .expect("failed to run testgen")
}

fn read(project: &Path, rel: &str) -> String {
    fs::read_to_string(project.join(rel)).unwrap_or_else(|e| panic!("failed to read {rel}: {e}"))
}

#[test]
fn test_unit_test_for_single_header() {
    let project = sample_project();
    let output = testgen(project.path(), &["gen", "--unit-test", "src/foo.h"]);

    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(
        output.status.success(),
        "gen failed: stdout={stdout}, stderr={stderr}"
    );
    assert!(stdout.contains("wrote tests/ut/ut_foo.cpp"), "{stdout}");

    let unit_test = read(project.path(), "tests/ut/ut_foo.cpp");
    assert!(unit_test.contains("#include <foo.h>"), "{unit_test}");
    assert!(unit_test.contains("TEST(FooTest, Bar)"), "{unit_test}");
    assert!(unit_test.contains("demo::Foo::bar(int)"), "{unit_test}");

    let build = read(project.path(), "tests/ut/CMakeLists.txt");
    assert!(build.contains("    ut_foo.cpp\n"), "{build}");
    assert!(build.contains("${CMAKE_SOURCE_DIR}/src/foo.cpp"), "{build}");
    assert!(!build.contains("main.cpp"), "entry point must not be listed: {build}");
}

#[test]
fn test_nested_directory_then_whole_tree() {
    let project = sample_project();

    let first = testgen(project.path(), &["gen", "--unit-test", "src/fs2/test2"]);
    assert!(first.status.success(), "{}", String::from_utf8_lossy(&first.stderr));
    assert!(project.path().join("tests/ut/fs2/test2/ut_pow.cpp").is_file());

    let second = testgen(project.path(), &["gen", "--unit-test", "src"]);
    assert!(second.status.success(), "{}", String::from_utf8_lossy(&second.stderr));

    let fs2 = read(project.path(), "tests/ut/fs2/CMakeLists.txt");
    assert_eq!(fs2.matches("add_subdirectory(test2)").count(), 1, "{fs2}");
    assert!(!fs2.contains("test1"), "{fs2}");

    let top = read(project.path(), "tests/ut/CMakeLists.txt");
    assert_eq!(top.matches("add_subdirectory(fs2)").count(), 1, "{top}");
    assert!(top.contains("ut_foo.cpp"), "{top}");

    let leaf = read(project.path(), "tests/ut/fs2/test2/CMakeLists.txt");
    assert!(leaf.contains("set(UT_NAME tests_ut_fs2_test2)"), "{leaf}");
    assert!(leaf.contains("${CMAKE_SOURCE_DIR}/src/fs2/test2/pow.cpp"), "{leaf}");

    assert!(!project.path().join("tests/ut/fs2/test1").exists());
}

#[test]
fn test_existing_unit_test_needs_force() {
    let project = sample_project();
    let first = testgen(project.path(), &["gen", "--unit-test", "src/foo.h"]);
    assert!(first.status.success());

    fs::write(project.path().join("tests/ut/ut_foo.cpp"), "// my tests\n").unwrap();

    let kept = testgen(project.path(), &["gen", "--unit-test", "src/foo.h"]);
    assert!(kept.status.success());
    let stdout = String::from_utf8_lossy(&kept.stdout);
    assert!(stdout.contains("skipped: already exists tests/ut/ut_foo.cpp"), "{stdout}");
    assert_eq!(read(project.path(), "tests/ut/ut_foo.cpp"), "// my tests\n");

    let forced = testgen(project.path(), &["gen", "--unit-test", "src/foo.h", "--force"]);
    assert!(forced.status.success());
    assert!(read(project.path(), "tests/ut/ut_foo.cpp").contains("TEST(FooTest, Bar)"));
}

#[test]
fn test_mock_generation_is_idempotent() {
    let project = sample_project();

    let first = testgen(project.path(), &["gen", "--mock", "src/foo.h"]);
    let stdout = String::from_utf8_lossy(&first.stdout);
    assert!(
        first.status.success(),
        "gen --mock failed: {stdout} {}",
        String::from_utf8_lossy(&first.stderr)
    );

    let mock_header = read(project.path(), "tests/mocks/mock_foo.h");
    assert!(mock_header.contains("class MockFoo : public Foo"), "{mock_header}");
    assert!(
        mock_header.contains("MOCK_METHOD(std::string, name, (), (override, const));"),
        "{mock_header}"
    );
    let mock_source = read(project.path(), "tests/mocks/mock_foo.cpp");
    assert!(mock_source.contains("int Foo::bar(int x)"), "{mock_source}");
    let interface = read(project.path(), "tests/mocks/foo.h");
    assert!(interface.contains("virtual std::string name() const = 0;"), "{interface}");

    fs::write(project.path().join("tests/mocks/mock_foo.h"), "// tuned by hand\n").unwrap();

    let second = testgen(project.path(), &["gen", "--mock", "src/foo.h"]);
    assert!(second.status.success());
    let stdout = String::from_utf8_lossy(&second.stdout);
    assert!(stdout.contains("skipped: already exists tests/mocks/foo.h"), "{stdout}");
    assert_eq!(read(project.path(), "tests/mocks/mock_foo.h"), "// tuned by hand\n");
}

#[test]
fn test_mock_rejects_non_header() {
    let project = sample_project();
    let output = testgen(project.path(), &["gen", "--mock", "src/foo.cpp"]);

    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("not a header file"), "{stderr}");
    assert!(!project.path().join("tests").exists());
}

#[test]
fn test_missing_input_is_user_error() {
    let project = sample_project();
    let output = testgen(project.path(), &["gen", "--unit-test", "src/nope.h"]);
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_json_report() {
    let project = sample_project();
    let output = testgen(
        project.path(),
        &["gen", "--unit-test", "src/foo.h", "--format", "json"],
    );
    assert!(output.status.success());

    let value: serde_json::Value =
        serde_json::from_slice(&output.stdout).expect("stdout should be JSON");
    assert_eq!(value["command"], "gen");
    assert_eq!(value["success"], true);
    let artifacts = value["artifacts"].as_array().unwrap();
    assert!(artifacts
        .iter()
        .any(|a| a["path"] == "tests/ut/ut_foo.cpp" && a["outcome"] == "written"));
}

#[test]
fn test_exclude_glob_suppresses_output() {
    let project = sample_project();
    fs::write(
        project.path().join("testgen.toml"),
        "[project]\nentry_point = \"main.cpp\"\n\n\
         [generate]\nexclude = [\"tests/ut/CMakeLists.txt\"]\n",
    )
    .unwrap();

    let output = testgen(project.path(), &["gen", "--unit-test", "src/foo.h"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("skipped: excluded tests/ut/CMakeLists.txt"), "{stdout}");
    assert!(project.path().join("tests/ut/ut_foo.cpp").is_file());
    assert!(!project.path().join("tests/ut/CMakeLists.txt").exists());
}

#[test]
fn test_init_creates_config() {
    let dir = tempfile::tempdir().expect("failed to create temp dir");

    let output = testgen(dir.path(), &["init"]);
    assert!(output.status.success(), "init should succeed");
    let config = read(dir.path(), "testgen.toml");
    assert!(config.contains("[project]"));
    assert!(config.contains("source_dir = \"src\""));

    let again = testgen(dir.path(), &["init"]);
    assert_eq!(again.status.code(), Some(1), "init should refuse to overwrite");

    let forced = testgen(dir.path(), &["init", "--force"]);
    assert!(forced.status.success());
}
