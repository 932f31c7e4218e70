//! # Statement Emitters
//!
//! One emitter per configuration facet. Each takes a view identifier (empty
//! for the general case) and returns the statements that configure that
//! facet. Emitters never fail and never validate the names they reference:
//! absent keys and malformed entries fall back to defaults.
//!
//! | emitter            | keys read                          |
//! |--------------------|------------------------------------|
//! | `template`         | `template`                         |
//! | `layout`           | `layout`, `has_layout`             |
//! | `component_slots`  | `components` (additive)            |
//! | `html_head`        | `http_metas`, `metas` (additive)   |
//! | `escaping`         | `escaping.method`                  |
//! | `html_assets`      | `stylesheets`, `javascripts` (additive) |

use std::sync::LazyLock;

use log::warn;
use regex::Regex;
use serde_yaml::Value;

use crate::assets::{asset_items, compile_assets, AssetKind};
use crate::codegen::ir::{LayoutMode, Statement, TemplateSource};
use crate::config::{is_truthy, key_string, scalar_string};
use crate::resolve::{entries, ViewResolver};

static ESCAPED_ENTITY: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"&amp;(#?\w+;)").expect("entity pattern is valid"));

/// Emits the statements for each configuration facet of a view.
#[derive(Debug, Clone, Copy)]
pub struct StatementEmitter<'a> {
    resolver: ViewResolver<'a>,
}

impl<'a> StatementEmitter<'a> {
    pub fn new(resolver: ViewResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Template selection. Defaults to the action name when no truthy
    /// `template` is configured.
    pub fn template(&self, view_id: &str) -> Vec<Statement> {
        let default = self
            .resolver
            .get_value("template", view_id)
            .filter(|value| is_truthy(value))
            .and_then(scalar_string)
            .map_or(TemplateSource::ActionName, TemplateSource::Named);

        vec![Statement::SelectTemplate { default }]
    }

    /// Decorator layout.
    ///
    /// A view that mentions `layout` or `has_layout` itself gets its layout
    /// unconditionally; otherwise the inherited layout is guarded.
    pub fn layout(&self, view_id: &str) -> Vec<Statement> {
        let has_local_layout = self.resolver.has_local_key("layout", view_id)
            || self.resolver.has_local_key("has_layout", view_id);

        let layout = if self
            .resolver
            .get_value("has_layout", view_id)
            .is_some_and(is_truthy)
        {
            self.resolver
                .get_value("layout", view_id)
                .and_then(scalar_string)
                .filter(|name| !name.is_empty())
        } else {
            None
        };

        let mode = if has_local_layout {
            LayoutMode::Local
        } else {
            LayoutMode::Inherited
        };

        vec![Statement::ApplyLayout { layout, mode }]
    }

    /// Component slot registrations, one per merged `components` entry.
    pub fn component_slots(&self, view_id: &str) -> Vec<Statement> {
        let components = self.resolver.merged_list_value("components", view_id);

        entries(&components)
            .into_iter()
            .map(|(name, component)| {
                let name = key_string(&name);
                let (module, action) = match component {
                    Value::Sequence(parts) if parts.len() >= 2 => {
                        (scalar_string(&parts[0]), scalar_string(&parts[1]))
                    }
                    _ => {
                        warn!("Component slot '{}' has no module/action; clearing it", name);
                        (None, None)
                    }
                };
                Statement::SetComponentSlot {
                    name,
                    module,
                    action,
                }
            })
            .collect()
    }

    /// HTTP-equiv metas (verbatim) followed by metas (HTML-escaped).
    pub fn html_head(&self, view_id: &str) -> Vec<Statement> {
        let http_metas = self.resolver.merged_list_value("http_metas", view_id);
        let metas = self.resolver.merged_list_value("metas", view_id);

        let mut statements: Vec<Statement> = entries(&http_metas)
            .into_iter()
            .map(|(name, content)| Statement::AddHttpMeta {
                name: key_string(&name),
                content: scalar_string(content).unwrap_or_default(),
            })
            .collect();

        statements.extend(entries(&metas).into_iter().map(|(name, content)| {
            Statement::AddMeta {
                name: key_string(&name),
                content: escape_meta_content(&scalar_string(content).unwrap_or_default()),
            }
        }));

        statements
    }

    /// Escaping method, when `escaping.method` resolves.
    pub fn escaping(&self, view_id: &str) -> Vec<Statement> {
        self.resolver
            .get_value("escaping", view_id)
            .and_then(|escaping| escaping.get("method"))
            .filter(|method| !method.is_null())
            .map(|method| Statement::SetEscapingMethod {
                method: method.clone(),
            })
            .into_iter()
            .collect()
    }

    /// Stylesheets, then javascripts.
    pub fn html_assets(&self, view_id: &str) -> Vec<Statement> {
        [AssetKind::Stylesheet, AssetKind::Javascript]
            .into_iter()
            .flat_map(|kind| {
                let merged = self.resolver.merged_list_value(kind.config_key(), view_id);
                compile_assets(kind, &asset_items(&merged))
            })
            .collect()
    }
}

/// HTML-escape meta content, keeping entities that were already written.
///
/// `& < > " '` are escaped; an escaped ampersand that starts a named or
/// numeric entity (`&copy;`, `&#169;`) is turned back into `&`. Only
/// entities are reverted: a bare `&` stays `&amp;`, so `Tom & Jerry`
/// becomes `Tom &amp; Jerry`.
pub fn escape_meta_content(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            other => escaped.push(other),
        }
    }
    ESCAPED_ENTITY.replace_all(&escaped, "&$1").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigTree;

    fn tree(text: &str) -> ConfigTree {
        ConfigTree::from_yaml_str(text, "view.yml").unwrap()
    }

    fn emit<T>(text: &str, f: impl FnOnce(StatementEmitter<'_>) -> T) -> T {
        let tree = tree(text);
        f(StatementEmitter::new(ViewResolver::new(&tree)))
    }

    #[test]
    fn test_template_from_view() {
        let out = emit("all:\n  template: base\nedit:\n  template: form\n", |e| {
            e.template("edit")
        });
        assert_eq!(
            out,
            vec![Statement::SelectTemplate {
                default: TemplateSource::Named("form".to_string())
            }]
        );
    }

    #[test]
    fn test_template_falls_back_to_all_then_action() {
        let out = emit("all:\n  template: base\nedit: {}\n", |e| e.template("edit"));
        assert_eq!(
            out,
            vec![Statement::SelectTemplate {
                default: TemplateSource::Named("base".to_string())
            }]
        );

        let out = emit("all: {}\nedit: {}\n", |e| e.template("edit"));
        assert_eq!(
            out,
            vec![Statement::SelectTemplate {
                default: TemplateSource::ActionName
            }]
        );
    }

    #[test]
    fn test_template_empty_string_uses_action() {
        let out = emit("all:\n  template: ''\n", |e| e.template(""));
        assert_eq!(
            out,
            vec![Statement::SelectTemplate {
                default: TemplateSource::ActionName
            }]
        );
    }

    #[test]
    fn test_layout_local_from_view_layout() {
        let out = emit(
            "all:\n  template: t\n  layout: l\n  has_layout: true\nedit:\n  layout: custom\n",
            |e| e.layout("edit"),
        );
        assert_eq!(
            out,
            vec![Statement::ApplyLayout {
                layout: Some("custom".to_string()),
                mode: LayoutMode::Local
            }]
        );
    }

    #[test]
    fn test_layout_general_is_inherited() {
        let out = emit(
            "all:\n  layout: l\n  has_layout: true\nedit:\n  layout: custom\n",
            |e| e.layout(""),
        );
        assert_eq!(
            out,
            vec![Statement::ApplyLayout {
                layout: Some("l".to_string()),
                mode: LayoutMode::Inherited
            }]
        );
    }

    #[test]
    fn test_layout_view_without_layout_keys_is_inherited() {
        let out = emit(
            "all:\n  layout: l\n  has_layout: true\nshow:\n  template: detail\n",
            |e| e.layout("show"),
        );
        assert_eq!(
            out,
            vec![Statement::ApplyLayout {
                layout: Some("l".to_string()),
                mode: LayoutMode::Inherited
            }]
        );
    }

    #[test]
    fn test_has_layout_false_means_no_decorator() {
        let out = emit(
            "all:\n  layout: l\n  has_layout: true\npopup:\n  has_layout: false\n",
            |e| e.layout("popup"),
        );
        assert_eq!(
            out,
            vec![Statement::ApplyLayout {
                layout: None,
                mode: LayoutMode::Local
            }]
        );
    }

    #[test]
    fn test_has_layout_yaml11_false_words() {
        for word in ["off", "no", "'false'", "Off"] {
            let config = format!("all:\n  layout: l\n  has_layout: true\npopup:\n  has_layout: {word}\n");
            let out = emit(&config, |e| e.layout("popup"));
            assert_eq!(
                out,
                vec![Statement::ApplyLayout {
                    layout: None,
                    mode: LayoutMode::Local
                }],
                "has_layout: {word}"
            );
        }
    }

    #[test]
    fn test_template_off_uses_action() {
        let out = emit("all:\n  template: base\nedit:\n  template: off\n", |e| {
            e.template("edit")
        });
        assert_eq!(
            out,
            vec![Statement::SelectTemplate {
                default: TemplateSource::ActionName
            }]
        );
    }

    #[test]
    fn test_has_layout_presence_not_truthiness() {
        let out = emit("all:\n  layout: l\npopup:\n  has_layout: ~\n", |e| {
            e.layout("popup")
        });
        assert_eq!(
            out,
            vec![Statement::ApplyLayout {
                layout: None,
                mode: LayoutMode::Local
            }]
        );
    }

    #[test]
    fn test_empty_layout_means_no_decorator() {
        let out = emit("all:\n  has_layout: true\n  layout: ''\n", |e| e.layout(""));
        assert_eq!(
            out,
            vec![Statement::ApplyLayout {
                layout: None,
                mode: LayoutMode::Inherited
            }]
        );
    }

    #[test]
    fn test_component_slots_merged() {
        let out = emit(
            "all:\n  components: {header: [default, header], footer: [default, footer]}\nedit:\n  components: {footer: [edit, footer], sidebar: []}\n",
            |e| e.component_slots("edit"),
        );
        assert_eq!(
            out,
            vec![
                Statement::SetComponentSlot {
                    name: "header".into(),
                    module: Some("default".into()),
                    action: Some("header".into())
                },
                Statement::SetComponentSlot {
                    name: "footer".into(),
                    module: Some("edit".into()),
                    action: Some("footer".into())
                },
                Statement::SetComponentSlot {
                    name: "sidebar".into(),
                    module: None,
                    action: None
                },
            ]
        );
    }

    #[test]
    fn test_component_malformed_entries_degrade() {
        let out = emit(
            "all:\n  components: {a: [only], b: text, c: ~}\n",
            |e| e.component_slots(""),
        );
        assert_eq!(out.len(), 3);
        for statement in out {
            match statement {
                Statement::SetComponentSlot { module, action, .. } => {
                    assert_eq!(module, None);
                    assert_eq!(action, None);
                }
                other => panic!("unexpected statement {other:?}"),
            }
        }
    }

    #[test]
    fn test_component_degrade_is_logged() {
        testing_logger::setup();
        emit("all:\n  components: {sidebar: [only]}\n", |e| e.component_slots(""));
        testing_logger::validate(|captured_logs| {
            let warnings: Vec<_> = captured_logs
                .iter()
                .filter(|entry| entry.level == log::Level::Warn)
                .collect();
            assert_eq!(warnings.len(), 1);
            assert!(warnings[0].body.contains("'sidebar'"));
        });
    }

    #[test]
    fn test_html_head_http_metas_first_and_verbatim() {
        let out = emit(
            "all:\n  metas: {title: \"Tom's <b>\"}\n  http_metas: {content-type: \"text/html; charset='x'\"}\n",
            |e| e.html_head(""),
        );
        assert_eq!(
            out,
            vec![
                Statement::AddHttpMeta {
                    name: "content-type".into(),
                    content: "text/html; charset='x'".into()
                },
                Statement::AddMeta {
                    name: "title".into(),
                    content: "Tom&#039;s &lt;b&gt;".into()
                },
            ]
        );
    }

    #[test]
    fn test_html_head_view_metas_appended() {
        let out = emit(
            "all:\n  metas: {title: Site}\nedit:\n  metas: {robots: none}\n",
            |e| e.html_head("edit"),
        );
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_escape_meta_content() {
        assert_eq!(
            escape_meta_content("<script>alert(\"x\")</script>"),
            "&lt;script&gt;alert(&quot;x&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_meta_content("Tom & Jerry"), "Tom &amp; Jerry");
        assert_eq!(escape_meta_content("&copy; 2024"), "&copy; 2024");
        assert_eq!(escape_meta_content("&#169; 2024"), "&#169; 2024");
        assert_eq!(escape_meta_content("a &amp; b"), "a &amp; b");
        assert_eq!(escape_meta_content("it's"), "it&#039;s");
    }

    #[test]
    fn test_escaping_method() {
        let out = emit(
            "all:\n  escaping: {method: ESC_SPECIALCHARS}\nraw:\n  escaping: {method: ESC_RAW}\n",
            |e| (e.escaping(""), e.escaping("raw")),
        );
        assert_eq!(
            out.0,
            vec![Statement::SetEscapingMethod {
                method: Value::String("ESC_SPECIALCHARS".into())
            }]
        );
        assert_eq!(
            out.1,
            vec![Statement::SetEscapingMethod {
                method: Value::String("ESC_RAW".into())
            }]
        );
    }

    #[test]
    fn test_escaping_absent_or_without_method() {
        assert!(emit("all: {}\n", |e| e.escaping("")).is_empty());
        assert!(emit("all:\n  escaping: {strategy: on}\n", |e| e.escaping("")).is_empty());
        assert!(emit("all:\n  escaping: off\n", |e| e.escaping("")).is_empty());
    }

    #[test]
    fn test_html_assets_stylesheets_then_javascripts() {
        let out = emit(
            "all:\n  javascripts: [app]\n  stylesheets: [main]\nedit:\n  stylesheets: [form, -main]\n  javascripts: [form]\n",
            |e| e.html_assets("edit"),
        );
        let summary: Vec<(AssetKind, &str)> = out
            .iter()
            .map(|statement| match statement {
                Statement::AddAsset { kind, name, .. } => (*kind, name.as_str()),
                other => panic!("unexpected statement {other:?}"),
            })
            .collect();
        assert_eq!(
            summary,
            vec![
                (AssetKind::Stylesheet, "form"),
                (AssetKind::Javascript, "app"),
                (AssetKind::Javascript, "form"),
            ]
        );
    }
}
