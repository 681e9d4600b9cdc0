use std::path::PathBuf;

/// Test that the embedded website brief template exists in src/templates
#[test]
fn test_website_brief_template_exists() {
    let template_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/templates/website-brief-pt.toml");

    assert!(
        template_path.exists(),
        "Website brief template should exist at {:?}",
        template_path
    );
}

/// Test that the embedded template parses and has all three fragment groups
#[test]
fn test_website_brief_template_loads() {
    let template_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src/templates/website-brief-pt.toml");

    let content =
        std::fs::read_to_string(&template_path).expect("Should be able to read template file");

    let config: toml::Value = toml::from_str(&content).expect("Template should be valid TOML");

    for group in ["preamble", "section", "trailer"] {
        let fragments = config
            .get(group)
            .and_then(toml::Value::as_array)
            .unwrap_or_else(|| panic!("Template should define [[{}]] fragments", group));
        assert!(!fragments.is_empty(), "[[{}]] should not be empty", group);
    }
}

/// Test that the sample extraction result is valid JSON with sections
#[test]
fn test_sample_extraction_loads() {
    let sample_path =
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("samples/extraction.json");

    let content = std::fs::read_to_string(&sample_path).expect("Should be able to read sample");
    let value: serde_json::Value =
        serde_json::from_str(&content).expect("Sample should be valid JSON");

    assert_eq!(value["projectName"], "Padaria Central");
    assert_eq!(value["sections"].as_array().map(Vec::len), Some(3));
}
