//! Test: Environment Resolution - `.env` parsing and ambient precedence

use spreader_tasks::core::env::{parse_env_file, ConfigEntry, EnvResolver, ENV_FILE_NAME};
use spreader_tasks::core::ProcessEnvironment;

fn write_env(content: &str) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join(ENV_FILE_NAME), content).unwrap();
    dir
}

#[test]
fn test_documented_example() {
    let dir = write_env("TOOLCHAIN = /opt/sdk/toolchain.cmake\n# comment\nBAD LINE\nFOO=bar");

    let parsed = parse_env_file(&std::fs::read_to_string(dir.path().join(ENV_FILE_NAME)).unwrap());
    assert_eq!(parsed.malformed.len(), 1);
    assert_eq!(parsed.malformed[0].text, "BAD LINE");

    let env = EnvResolver::new()
        .require("TOOLCHAIN")
        .resolve(&dir.path().join(ENV_FILE_NAME), ProcessEnvironment::new())
        .unwrap();
    assert_eq!(env.get("TOOLCHAIN"), Some("/opt/sdk/toolchain.cmake"));
    assert_eq!(env.get("FOO"), Some("bar"));
}

#[test]
fn test_ambient_wins_over_file() {
    let dir = write_env("SHARED=file\nFILE_ONLY=file\n");
    let ambient: ProcessEnvironment = [("SHARED", "shell"), ("SHELL_ONLY", "shell")].into_iter().collect();

    let env = EnvResolver::new()
        .resolve(&dir.path().join(ENV_FILE_NAME), ambient)
        .unwrap();

    assert_eq!(env.get("SHARED"), Some("shell"));
    assert_eq!(env.get("FILE_ONLY"), Some("file"));
    assert_eq!(env.get("SHELL_ONLY"), Some("shell"));
}

#[test]
fn test_well_formed_lines_keep_trimmed_sides() {
    let cases = [
        ("KEY=value", "KEY", "value"),
        ("  KEY  =  value  ", "KEY", "value"),
        ("KEY\t=\t/path/to/file.cmake", "KEY", "/path/to/file.cmake"),
        ("lower_case.key=C:\\sdk", "lower_case.key", "C:\\sdk"),
    ];

    for (line, key, value) in cases {
        let parsed = parse_env_file(line);
        assert_eq!(
            parsed.entries,
            vec![ConfigEntry {
                key: key.to_string(),
                value: value.to_string()
            }],
            "line {:?}",
            line
        );
    }
}

#[test]
fn test_lines_with_hash_are_ignored() {
    let parsed = parse_env_file("#A=1\nB=2#\nC=#3\n D = 4 # note\nE=5\r\n");
    assert_eq!(
        parsed.entries,
        vec![ConfigEntry {
            key: "E".to_string(),
            value: "5".to_string()
        }]
    );
    assert!(parsed.malformed.is_empty());
}

#[test]
fn test_unreadable_path_is_skipped() {
    // A directory cannot be read as a file
    let dir = tempfile::tempdir().unwrap();
    let ambient: ProcessEnvironment = [("X", "1")].into_iter().collect();

    let env = EnvResolver::new().resolve(dir.path(), ambient.clone()).unwrap();
    assert_eq!(env, ambient);
}
