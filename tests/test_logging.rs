use wikistats::logging;

#[test]
fn test_file_logging_writes_separator_and_events() -> anyhow::Result<()> {
    let test_dir = tempfile::tempdir()?;
    let log_dir = test_dir.path().join("logs");

    logging::init_logging(Some(&log_dir))?;

    tracing::warn!("Test warning message");
    tracing::error!(revision = 42, "Test error message");

    let log_file = log_dir.join(logging::LOG_FILE_NAME);
    assert!(log_file.exists(), "log file not created");

    let contents = std::fs::read_to_string(&log_file)?;
    assert!(contents.contains(&"=".repeat(80)));
    assert!(contents.contains("New wikistats run"));
    assert!(contents.contains("Test warning message"));
    assert!(contents.contains("Test error message"));
    assert!(!contents.contains("\u{1b}["), "ANSI codes in log file");

    // A second call keeps the first subscriber
    logging::init_logging(None)?;

    Ok(())
}
