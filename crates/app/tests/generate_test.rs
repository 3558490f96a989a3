//! Integration tests for source generation
//!
//! These tests run the complete flow from a settings file on disk to the
//! written handler source using the real file system adapter.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use std::fs;
use std::path::Path;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use torchgen_application::GenerateError;
use torchgen_domain::{Rule, ShapeDim};
use torchgen_infrastructure::{generate, generate_with_template};

const IMAGE_CLASSIFIER: &str = r#"
input:
  type: float
  shape: [1, 3, "width", "height"]
return:
  output: null
  result:
    type: int
    item: true
    operations: argmax
"#;

fn write_settings(dir: &Path, yaml: &str) -> std::path::PathBuf {
    let path = dir.join("settings.yaml");
    fs::write(&path, yaml).expect("Failed to write settings");
    path
}

fn defined(source: &str, name: &str) -> bool {
    source.lines().any(|line| {
        line.strip_prefix("#define ")
            .is_some_and(|rest| rest.split_whitespace().next() == Some(name))
    })
}

#[test]
fn test_generate_image_classifier() {
    let temp_dir = tempdir().expect("Failed to create temp directory");
    let config = write_settings(temp_dir.path(), IMAGE_CLASSIFIER);
    let destination = temp_dir.path().join("build").join("src");

    let generated = generate(&config, &destination).expect("Failed to generate source");

    assert_eq!(generated.path, destination.join("main.cpp"));
    let source = fs::read_to_string(&generated.path).unwrap();

    assert!(!source.contains("{{"));
    assert!(defined(&source, "RETURN_RESULT_ITEM"));
    assert!(!defined(&source, "RETURN_RESULT"));
    assert!(!defined(&source, "RETURN_OUTPUT"));
    assert!(!defined(&source, "BASE64"));
    assert!(!defined(&source, "STATIC"));
    assert!(defined(&source, "VALIDATE_JSON"));
    assert!(source.contains("const auto result = (argmax(output)).toType(torch::kInt32);"));
    assert!(source.contains("const Aws::String fields[]{ \"width\", \"height\" };"));
    assert!(source.contains(
        ".reshape({ 1, 3, json_view.GetInteger(\"width\"), json_view.GetInteger(\"height\") })"
    ));
    assert!(source.contains("constexpr auto model_path = \"/opt/model.ptc\";"));

    let settings = &generated.settings;
    assert_eq!(settings.input.shape[2], ShapeDim::Field("width".into()));
    assert_eq!(settings.input.dynamic_fields(), vec!["width", "height"]);
}

#[test]
fn test_generate_static_base64_input() {
    let temp_dir = tempdir().unwrap();
    let config = write_settings(
        temp_dir.path(),
        r"
input:
  type: base64
  shape: [1, 3, 64, 64]
  cast: float
  divide: 255
normalize:
  means: [0.485, 0.456, 0.406]
  stddevs: [0.229, 0.224, 0.225]
return:
  output:
    type: double
",
    );

    let generated = generate(&config, temp_dir.path()).unwrap();
    let source = fs::read_to_string(&generated.path).unwrap();

    assert!(defined(&source, "STATIC"));
    assert!(defined(&source, "BASE64"));
    assert!(defined(&source, "NORMALIZE"));
    assert!(source.contains("#define CAST torch::kFloat32"));
    assert!(source.contains("#define DIVIDE 255.0"));
    assert!(defined(&source, "RETURN_OUTPUT"));
    assert!(!defined(&source, "RETURN_OUTPUT_ITEM"));
    assert!(source.contains("{ 0.485, 0.456, 0.406 }, { 0.229, 0.224, 0.225 }"));
    assert!(source.contains(".reshape({ 1, 3, 64, 64 })"));
    assert!(!source.contains("{{"));
    assert_eq!(
        generated.active_macros,
        vec![
            "STATIC",
            "VALIDATE_JSON",
            "BASE64",
            "VALIDATE_FIELD",
            "VALIDATE_SHAPE",
            "NORMALIZE",
            "CAST",
            "DIVIDE",
            "RETURN_OUTPUT",
        ]
    );
}

#[test]
fn test_schema_error_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let config = write_settings(
        temp_dir.path(),
        r"
input:
  type: float
  shape: [1, 10]
return:
  result:
    type: int
    operations: argmax
    arguments: [1, 2]
",
    );
    let destination = temp_dir.path().join("out");

    let err = generate(&config, &destination).unwrap_err();

    let schema = err.as_schema().expect("Expected a schema error");
    assert_eq!(
        schema.rules_at("return.result.arguments").collect::<Vec<_>>(),
        vec![&Rule::TooManyArguments {
            arguments: 2,
            operations: 1
        }]
    );
    assert!(!destination.exists());
}

#[test]
fn test_custom_template() {
    let temp_dir = tempdir().unwrap();
    let config = write_settings(temp_dir.path(), IMAGE_CLASSIFIER);
    let template = temp_dir.path().join("handler.cpp");
    fs::write(&template, "// {{DATA}} -> {{RESULT_EXPRESSION}}\n{{RETURN_RESULT_ITEM}}\n").unwrap();

    let generated = generate_with_template(&config, temp_dir.path(), &template).unwrap();

    assert_eq!(
        fs::read_to_string(generated.path).unwrap(),
        "// \"data\" -> argmax(output)\n#define RETURN_RESULT_ITEM\n"
    );
}

#[test]
fn test_template_with_unknown_placeholder_writes_nothing() {
    let temp_dir = tempdir().unwrap();
    let config = write_settings(temp_dir.path(), IMAGE_CLASSIFIER);
    let template = temp_dir.path().join("handler.cpp");
    fs::write(&template, "{{DATA}} {{BATCH_SIZE}}").unwrap();
    let destination = temp_dir.path().join("out");

    let err = generate_with_template(&config, &destination, &template).unwrap_err();

    assert!(matches!(err, GenerateError::TemplateRender(_)));
    assert!(err.to_string().contains("BATCH_SIZE"));
    assert!(!destination.exists());
}

#[test]
fn test_missing_settings_file() {
    let temp_dir = tempdir().unwrap();
    let err = generate(&temp_dir.path().join("absent.yaml"), temp_dir.path()).unwrap_err();
    assert!(matches!(err, GenerateError::Io(_)));
}
