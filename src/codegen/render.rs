//! Rendering of a [`Procedure`] as an ECMAScript function body.
//!
//! The body expects three identifiers from its caller:
//!
//! - `view`: the view being initialized.
//! - `overrides`: the runtime override store; `get(key)` returns `null` or
//!   `undefined` for unset keys.
//! - `settings`: runtime settings; `get('logging_enabled')` gates slot logs.
//!
//! Template and layout overrides are looked up under
//! `<module>_<action>_template` and `<module>_<action>_layout`.

use serde_yaml::{Mapping, Value};

use super::ir::{Dispatch, DispatchSubject, LayoutMode, Procedure, Statement, TemplateSource};
use crate::assets::AssetKind;
use crate::config::key_string;

/// First line of every generated procedure.
pub const HEADER: &str = "// auto-generated by view-config";

/// Format of the `date:` header line.
pub const DATE_FORMAT: &str = "%Y/%m/%d %H:%M:%S";

const OVERRIDE_PREFIX: &str = "view.moduleName + '_' + view.actionName + ";

/// Render the procedure as source text.
pub fn render(procedure: &Procedure) -> String {
    let mut writer = ScriptWriter::default();

    writer.line(HEADER);
    writer.line(format!(
        "// date: {}",
        procedure.generated_at.format(DATE_FORMAT)
    ));
    for statement in &procedure.prelude {
        writer.statement(statement);
    }
    writer.line("let templateName;");
    writer.blank();

    writer.dispatch(&procedure.template_phase);
    writer.blank();
    writer.dispatch(&procedure.setup_phase);

    writer.out
}

#[derive(Default)]
struct ScriptWriter {
    out: String,
    indent: usize,
}

impl ScriptWriter {
    fn line(&mut self, text: impl AsRef<str>) {
        for _ in 0..self.indent {
            self.out.push_str("  ");
        }
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn block(&mut self, statements: &[Statement]) {
        self.indent += 1;
        for statement in statements {
            self.statement(statement);
        }
        self.indent -= 1;
    }

    fn dispatch(&mut self, dispatch: &Dispatch) {
        if !dispatch.is_conditional() {
            for statement in &dispatch.fallback {
                self.statement(statement);
            }
            return;
        }

        let subject = match dispatch.subject {
            DispatchSubject::ActionView => "view.actionName + view.viewName",
            DispatchSubject::TemplateView => "templateName + view.viewName",
        };

        for (index, branch) in dispatch.branches.iter().enumerate() {
            let keyword = if index == 0 { "if" } else { "} else if" };
            self.line(format!(
                "{} ({} === {}) {{",
                keyword,
                subject,
                string_literal(&branch.view)
            ));
            self.block(&branch.body);
        }
        self.line("} else {");
        self.block(&dispatch.fallback);
        self.line("}");
    }

    fn statement(&mut self, statement: &Statement) {
        match statement {
            Statement::CaptureResponse => self.line("const response = view.response();"),
            Statement::SelectTemplate { default } => {
                let default = match default {
                    TemplateSource::ActionName => "view.actionName".to_string(),
                    TemplateSource::Named(name) => string_literal(name),
                };
                self.line(format!(
                    "templateName = overrides.get({}'_template') ?? {};",
                    OVERRIDE_PREFIX, default
                ));
                self.line("view.setTemplate(templateName + view.viewName + view.extension());");
            }
            Statement::ApplyLayout { layout, mode } => {
                let decorator = match layout {
                    Some(name) => format!("{} + view.extension()", string_literal(name)),
                    None => "false".to_string(),
                };
                self.line(format!(
                    "const layout = overrides.get({}'_layout');",
                    OVERRIDE_PREFIX
                ));
                self.line("if (layout !== null && layout !== undefined) {");
                self.indent += 1;
                self.line(
                    "view.setDecoratorTemplate(layout === false ? false : layout + view.extension());",
                );
                self.indent -= 1;
                match mode {
                    LayoutMode::Local => self.line("} else {"),
                    LayoutMode::Inherited => self.line(
                        "} else if (view.getDecoratorTemplate() === null && !view.request().isXmlHttpRequest()) {",
                    ),
                }
                self.indent += 1;
                self.line(format!("view.setDecoratorTemplate({});", decorator));
                self.indent -= 1;
                self.line("}");
            }
            Statement::SetComponentSlot {
                name,
                module,
                action,
            } => {
                self.line(format!(
                    "view.setComponentSlot({}, {}, {});",
                    string_literal(name),
                    optional_literal(module.as_deref()),
                    optional_literal(action.as_deref())
                ));
                let message = format!(
                    "Set component \"{}\" ({}/{})",
                    name,
                    module.as_deref().unwrap_or_default(),
                    action.as_deref().unwrap_or_default()
                );
                self.line(format!(
                    "if (settings.get('logging_enabled')) view.log({});",
                    string_literal(&message)
                ));
            }
            Statement::AddHttpMeta { name, content } => self.line(format!(
                "response.addHttpMeta({}, {}, false);",
                string_literal(name),
                string_literal(content)
            )),
            Statement::AddMeta { name, content } => self.line(format!(
                "response.addMeta({}, {}, false, false);",
                string_literal(name),
                string_literal(content)
            )),
            Statement::SetEscapingMethod { method } => self.line(format!(
                "view.setEscapingMethod({});",
                value_literal(method)
            )),
            Statement::AddAsset {
                kind,
                name,
                position,
                options,
            } => {
                let method = match kind {
                    AssetKind::Stylesheet => "addStylesheet",
                    AssetKind::Javascript => "addJavascript",
                };
                self.line(format!(
                    "response.{}({}, {}, {});",
                    method,
                    string_literal(name),
                    string_literal(position),
                    mapping_json(options)
                ));
            }
        }
    }
}

/// Single-quoted string literal.
pub fn string_literal(text: &str) -> String {
    let mut literal = String::with_capacity(text.len() + 2);
    literal.push('\'');
    for ch in text.chars() {
        match ch {
            '\\' => literal.push_str("\\\\"),
            '\'' => literal.push_str("\\'"),
            '\n' => literal.push_str("\\n"),
            '\r' => literal.push_str("\\r"),
            '\t' => literal.push_str("\\t"),
            c if c.is_control() || c == '\u{2028}' || c == '\u{2029}' => {
                literal.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => literal.push(c),
        }
    }
    literal.push('\'');
    literal
}

fn optional_literal(text: Option<&str>) -> String {
    text.map_or_else(|| "null".to_string(), string_literal)
}

/// Literal for an arbitrary configuration value: strings are single-quoted,
/// everything else is JSON.
pub fn value_literal(value: &Value) -> String {
    match value {
        Value::String(text) => string_literal(text),
        Value::Tagged(tagged) => value_literal(&tagged.value),
        other => to_json(other).to_string(),
    }
}

fn mapping_json(mapping: &Mapping) -> String {
    serde_json::Value::Object(object(mapping)).to_string()
}

fn object(mapping: &Mapping) -> serde_json::Map<String, serde_json::Value> {
    mapping
        .iter()
        .map(|(key, value)| (key_string(key), to_json(value)))
        .collect()
}

fn to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Null => serde_json::Value::Null,
        Value::Bool(b) => serde_json::Value::Bool(*b),
        Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i.into()
            } else if let Some(u) = n.as_u64() {
                u.into()
            } else {
                n.as_f64()
                    .and_then(serde_json::Number::from_f64)
                    .map_or(serde_json::Value::Null, serde_json::Value::Number)
            }
        }
        Value::String(s) => serde_json::Value::String(s.clone()),
        Value::Sequence(items) => serde_json::Value::Array(items.iter().map(to_json).collect()),
        Value::Mapping(mapping) => serde_json::Value::Object(object(mapping)),
        Value::Tagged(tagged) => to_json(&tagged.value),
    }
}
