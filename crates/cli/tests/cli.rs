use assert_cmd::Command;

#[test]
fn help_lists_overrides() {
    let output = Command::cargo_bin("booklib")
        .unwrap()
        .arg("--help")
        .output()
        .unwrap();

    assert!(output.status.success());
    let stdout = String::from_utf8(output.stdout).unwrap();
    for flag in ["--addr", "--debug", "--log-file", "--db-file", "--env"] {
        assert!(stdout.contains(flag), "missing {flag} in help:\n{stdout}");
    }
}

#[test]
fn unknown_environment_fails_before_serving() {
    let dir = std::env::temp_dir().join(format!("booklib-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).unwrap();

    Command::cargo_bin("booklib")
        .unwrap()
        .current_dir(&dir)
        .env("BOOKLIB_CONFIG_DIR", &dir)
        .args(["--env", "moon"])
        .assert()
        .failure();
}
