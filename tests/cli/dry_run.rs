use anyhow::Result;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{CliTest, run};

#[test]
fn test_no_languages_lists_available() -> Result<()> {
    let test = CliTest::with_locales()?;

    let output = run(&mut test.sync_command())?;

    assert_eq!(output.code, Some(1));
    assert!(output.stdout.contains("No languages specified"));
    assert!(output.stdout.contains("Available languages: de, fr"));

    Ok(())
}

#[test]
fn test_dry_run_reports_missing_keys() -> Result<()> {
    let test = CliTest::with_locales()?;

    let output = run(test.sync_command().args(["--all", "--dry-run", "-v"]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output.stdout.contains("Dry run: no files will be modified"));
    assert!(output
        .stdout
        .contains("de (German): would update 1 translation across 1 file"));
    assert!(output.stdout.contains("translation.json:menu.save [missing]"));
    assert!(output.stdout.contains("EN: \"Save\""));
    assert!(!output.stdout.contains("fr (French)"));
    assert!(output
        .stdout
        .contains("Summary: 1 pending translation across 1 language"));

    Ok(())
}

#[test]
fn test_dry_run_is_read_only() -> Result<()> {
    let test = CliTest::with_locales()?;
    let before = test.read_file("locales/de/translation.json")?;

    run(test.sync_command().args(["--lang", "de", "--dry-run"]))?;

    assert_eq!(test.read_file("locales/de/translation.json")?, before);
    assert!(!test.root().join("locales/en/translation.json.bak").exists());

    Ok(())
}

#[test]
fn test_dry_run_needs_no_api_key() -> Result<()> {
    let test = CliTest::with_locales()?;

    let output = run(test.sync_command().args(["--all", "--dry-run"]))?;

    assert_eq!(output.code, Some(0));
    assert!(!output.stderr.contains("OPENAI_API_KEY"));

    Ok(())
}

#[test]
fn test_dry_run_detects_changed_keys() -> Result<()> {
    let test = CliTest::with_locales()?;
    test.write_json(
        "locales/en/translation.json.bak",
        &json!({"greeting": "Hi", "menu": {"save": "Save", "open": "Open"}}),
    )?;

    let output = run(test.sync_command().args(["--lang", "fr", "--dry-run", "-v"]))?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("translation.json:greeting [changed]"));
    assert!(output.stdout.contains("EN: \"Hello\""));
    assert!(output.stdout.contains("French: [STALE]"));
    assert!(!output.stdout.contains("[MISSING]"));

    Ok(())
}

#[test]
fn test_dry_run_output_file() -> Result<()> {
    let test = CliTest::with_locales()?;

    let output = run(test.sync_command().args([
        "--all",
        "--dry-run",
        "--output",
        "reports/missing.json",
    ]))?;

    assert_eq!(output.code, Some(0));
    assert!(output.stdout.contains("Report saved to: reports/missing.json"));

    let report = test.read_json("reports/missing.json")?;
    assert_eq!(report["baseLanguage"], "en");
    assert_eq!(
        report["languages"]["de"]["missing"],
        json!([{
            "path": "translation.json:menu.save",
            "englishValue": "Save",
            "isNested": true,
            "filename": "translation.json",
            "type": "missing"
        }])
    );
    assert_eq!(
        report["summary"],
        json!({"totalLanguages": 1, "totalMissingTranslations": 1})
    );

    Ok(())
}

#[test]
fn test_output_requires_dry_run() -> Result<()> {
    let test = CliTest::with_locales()?;

    let output = run(test.sync_command().args(["--all", "--output", "out.json"]))?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("--dry-run"));
    assert!(!test.root().join("out.json").exists());

    Ok(())
}

#[test]
fn test_unknown_language_is_rejected() -> Result<()> {
    let test = CliTest::with_locales()?;

    let output = run(test.sync_command().args(["--lang", "de,xx", "--dry-run"]))?;

    assert_eq!(output.code, Some(1));
    assert!(output.stderr.contains("Invalid language codes: xx"));
    assert!(output.stderr.contains("Available languages: de, fr"));

    Ok(())
}

#[test]
fn test_missing_locales_dir() -> Result<()> {
    let test = CliTest::new()?;

    let output = run(test.sync_command().args(["--all", "--dry-run"]))?;

    assert_eq!(output.code, Some(2));
    assert!(output.stderr.contains("does not exist"));

    Ok(())
}

#[test]
fn test_config_file_settings() -> Result<()> {
    let test = CliTest::new()?;
    test.write_file(
        "linguasync.config.json",
        r#"{ "localesDir": "public/i18n", "baseLanguage": "de", "translationFiles": ["*.json"] }"#,
    )?;
    test.write_json("public/i18n/de/common.json", &json!({"ok": "OK"}))?;
    test.write_json("public/i18n/de/errors.json", &json!({"fail": "Fehler"}))?;
    test.write_json("public/i18n/en/common.json", &json!({"ok": "OK"}))?;

    let output = run(test.sync_command().args(["--all", "--dry-run", "-v"]))?;

    assert_eq!(output.code, Some(0), "stderr: {}", output.stderr);
    assert!(output
        .stdout
        .contains("en (en): would update 1 translation across 2 files"));
    assert!(output.stdout.contains("errors.json:fail [missing]"));

    Ok(())
}
