//! Library-level tests running whole configuration sets from disk through
//! the compiler.

use std::fs;
use std::path::PathBuf;

use chrono::NaiveDateTime;
use tempfile::TempDir;
use view_config::codegen::ir::{LayoutMode, Statement, TemplateSource};
use view_config::codegen::{compile_files, compile_tree, CompileOptions};
use view_config::config::ConfigTree;
use view_config::constants::NoConstants;
use view_config::error::Error;
use view_config::loader::YamlFileLoader;

fn options() -> CompileOptions {
    CompileOptions::at(
        NaiveDateTime::parse_from_str("2024-01-02 03:04:05", "%Y-%m-%d %H:%M:%S").unwrap(),
    )
}

fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_later_files_override_earlier_ones() {
    let temp = TempDir::new().unwrap();
    let app = write(
        &temp,
        "app.yml",
        "default:\n  stylesheets: [main]\n  has_layout: true\n  layout: layout\nall:\n  template: home\n",
    );
    let module = write(
        &temp,
        "module.yml",
        "all:\n  template: blog\n  stylesheets: [blog]\nindexSuccess:\n  has_layout: false\n",
    );

    let compiled =
        compile_files(&[app, module], &YamlFileLoader::new(), &NoConstants, &options()).unwrap();

    assert_eq!(
        compiled.procedure.template_phase.fallback,
        vec![Statement::SelectTemplate {
            default: TemplateSource::Named("blog".into())
        }]
    );
    assert_eq!(
        compiled.procedure.setup_phase.body_for("indexSuccess")[0],
        Statement::ApplyLayout {
            layout: None,
            mode: LayoutMode::Local
        }
    );

    let script = compiled.render();
    let main = script.find("addStylesheet('main'").unwrap();
    let blog = script.find("addStylesheet('blog'").unwrap();
    assert!(main < blog);
}

#[test]
fn test_edit_view_layout_scenario() {
    let raw = ConfigTree::from_yaml_str(
        "all:\n  template: t\n  layout: l\n  has_layout: true\nedit:\n  layout: custom\n",
        "view.yml",
    )
    .unwrap();
    let script = compile_tree(raw, &NoConstants, &options()).render();

    let (edit, general) = script
        .split_once("} else {\n  const layout")
        .expect("setup phase has a general branch");
    let edit = edit.split("=== 'edit') {").last().unwrap();

    assert!(edit.contains("  } else {\n    view.setDecoratorTemplate('custom' + view.extension());"));
    assert!(general.contains(
        "} else if (view.getDecoratorTemplate() === null && !view.request().isXmlHttpRequest()) {\n    view.setDecoratorTemplate('l' + view.extension());"
    ));
}

#[test]
fn test_unreadable_file_is_reported_unmodified() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("missing.yml");

    let err = compile_files(&[missing.clone()], &YamlFileLoader::new(), &NoConstants, &options())
        .unwrap_err();
    match err {
        Error::ConfigUnreadable { path, .. } => assert_eq!(path, missing.display().to_string()),
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn test_empty_file_compiles_to_defaults() {
    let temp = TempDir::new().unwrap();
    let empty = write(&temp, "view.yml", "");

    let compiled =
        compile_files(&[empty], &YamlFileLoader::new(), &NoConstants, &options()).unwrap();
    assert!(compiled.merged.contains("all"));
    assert_eq!(
        compiled.procedure.setup_phase.fallback,
        vec![Statement::ApplyLayout {
            layout: None,
            mode: LayoutMode::Inherited
        }]
    );
}
