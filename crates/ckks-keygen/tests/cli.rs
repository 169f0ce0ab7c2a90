use std::error::Error as StdError;
use std::process::Command;

const BIN: &str = env!("CARGO_BIN_EXE_ckks-keygen");

#[test]
fn help_exits_successfully() -> Result<(), Box<dyn StdError>> {
    for flag in ["-h", "--help"] {
        let output = Command::new(BIN).arg(flag).output()?;
        assert_eq!(output.status.code(), Some(0));
        assert!(String::from_utf8(output.stdout)?.contains("--dir"));
    }
    Ok(())
}

#[test]
fn bad_arguments_exit_with_one() -> Result<(), Box<dyn StdError>> {
    for args in [&["--dir"][..], &["--unknown"][..], &["-d", "a", "b"][..]] {
        let output = Command::new(BIN).args(args).output()?;
        assert_eq!(output.status.code(), Some(1), "{args:?}");
        let stderr = String::from_utf8(output.stderr)?;
        assert!(stderr.contains("Usage:"), "{args:?}: {stderr}");
    }
    Ok(())
}

#[test]
fn generate_then_load() -> Result<(), Box<dyn StdError>> {
    let root = tempfile::tempdir()?;
    let dir = root.path().join("keys");

    let output = Command::new(BIN).arg("--dir").arg(&dir).output()?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(stdout.contains("Input Serialization Check Passed"));
    assert!(stdout.contains("Output Serialization Check Passed"));
    assert!(dir.join("ckks-secret-key.b64").exists());

    let output = Command::new(BIN).arg("-d").arg(&dir).output()?;
    assert_eq!(output.status.code(), Some(0));
    let stdout = String::from_utf8(output.stdout)?;
    assert!(!stdout.contains("Input Serialization Check Passed"));
    assert!(stdout.contains("Output Serialization Check Passed"));
    Ok(())
}

#[test]
fn corrupt_bundle_fails() -> Result<(), Box<dyn StdError>> {
    let root = tempfile::tempdir()?;
    std::fs::write(root.path().join("ckks-params.b64"), "garbage")?;
    let output = Command::new(BIN).arg("--dir").arg(root.path()).output()?;
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8(output.stderr)?.contains("[ERROR]"));
    Ok(())
}
