//! Statement-level representation of a generated view initializer.
//!
//! Emitters produce [`Statement`]s, the dispatch generator arranges them in
//! two [`Dispatch`] phases, and the renderer turns the resulting
//! [`Procedure`] into text. Keeping this layer separate lets tests assert on
//! what is emitted without parsing generated source.

use chrono::NaiveDateTime;
use serde::Serialize;
use serde_yaml::{Mapping, Value};

use crate::assets::AssetKind;

/// One operation of the generated procedure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Statement {
    /// Bind the response handle used by meta and asset statements.
    CaptureResponse,

    /// Pick the template name (runtime override first, then `default`) and
    /// set `name ++ view suffix ++ extension` as the template.
    SelectTemplate { default: TemplateSource },

    /// Apply a decorator layout unless a runtime override exists.
    ///
    /// `layout` of `None` means "no decorator".
    ApplyLayout {
        layout: Option<String>,
        mode: LayoutMode,
    },

    /// Register a component slot and log the assignment when logging is on.
    SetComponentSlot {
        name: String,
        module: Option<String>,
        action: Option<String>,
    },

    /// Register an HTTP-equiv meta; content is emitted verbatim.
    AddHttpMeta { name: String, content: String },

    /// Register a meta tag; content is already HTML-escaped.
    AddMeta { name: String, content: String },

    /// Set the active output escaping method.
    SetEscapingMethod { method: Value },

    /// Add a stylesheet or javascript to the response.
    AddAsset {
        kind: AssetKind,
        name: String,
        position: String,
        options: Mapping,
    },
}

/// Where the default template name comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "source", content = "name", rename_all = "snake_case")]
pub enum TemplateSource {
    /// The current action's name.
    ActionName,
    /// A configured template name.
    Named(String),
}

/// When a configured layout is applied if no runtime override exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutMode {
    /// The view sets its own layout: apply it unconditionally.
    Local,
    /// Inherited from `all`: apply only when no decorator has been set yet
    /// and the request is not an XHR request.
    Inherited,
}

/// The runtime string a dispatch phase compares view identifiers against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DispatchSubject {
    /// `action name ++ view name`
    ActionView,
    /// `resolved template name ++ view name`
    TemplateView,
}

/// One `if`/`else if` arm of a dispatch.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Branch {
    pub view: String,
    pub body: Vec<Statement>,
}

/// An if/else-if chain over distinct view identifiers with a trailing else.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dispatch {
    pub subject: DispatchSubject,
    pub branches: Vec<Branch>,
    pub fallback: Vec<Statement>,
}

impl Dispatch {
    /// Whether rendering needs a conditional at all.
    pub fn is_conditional(&self) -> bool {
        !self.branches.is_empty()
    }

    /// The body chosen for `view`, or the fallback.
    pub fn body_for(&self, view: &str) -> &[Statement] {
        self.branches
            .iter()
            .find(|branch| branch.view == view)
            .map_or(self.fallback.as_slice(), |branch| branch.body.as_slice())
    }
}

/// A complete generated view initializer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Procedure {
    pub generated_at: NaiveDateTime,
    pub prelude: Vec<Statement>,
    pub template_phase: Dispatch,
    pub setup_phase: Dispatch,
}
