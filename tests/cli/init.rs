use anyhow::{Context, Result};
use serde_json::Value;

use crate::{CliTest, run};

/// Validates config file structure and default values.
fn assert_config_content(content: &str) -> Result<()> {
    let parsed: Value = serde_json::from_str(content).context("Config should be valid JSON")?;

    assert_eq!(parsed["localesDir"], "./locales");
    assert_eq!(parsed["baseLanguage"], "en");
    assert_eq!(parsed["batchSize"], 20);
    assert!(
        parsed.get("openaiApiKey").is_none(),
        "Config must not contain an API key"
    );

    // 2-space indentation
    assert!(content.contains("\n  \"localesDir\""));

    Ok(())
}

#[test]
fn test_init_creates_config() -> Result<()> {
    let test = CliTest::new()?;

    let output = run(test.command().arg("init"))?;

    assert_eq!(output.code, Some(0));
    assert_eq!(output.stdout, "✓ Created linguasync.config.json\n");
    assert!(test.root().join("linguasync.config.json").exists());

    let content = test.read_file("linguasync.config.json")?;
    assert_config_content(&content)?;

    Ok(())
}

#[test]
fn test_init_fails_if_exists() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file("linguasync.config.json", "{}")?;

    let output = run(test.command().arg("init"))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("linguasync.config.json already exists"));
    assert_eq!(test.read_file("linguasync.config.json")?, "{}");

    Ok(())
}

#[test]
fn test_no_command_prints_help() -> Result<()> {
    let test = CliTest::new()?;

    let output = run(&mut test.command())?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("Usage:"));
    assert!(output.stdout.contains("sync"));

    Ok(())
}
