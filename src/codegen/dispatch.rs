//! Two-phase view dispatch.
//!
//! Phase 1 compares `action name ++ view name` against every non-reserved
//! view identifier and selects the template. Phase 2 compares
//! `template name ++ view name` and applies layout, component slots, head
//! metadata, escaping and assets, in that order. Both phases end with a
//! general branch resolved against `all`.

use chrono::NaiveDateTime;
use log::trace;

use super::ir::{Branch, Dispatch, DispatchSubject, Procedure, Statement};
use crate::config::ConfigTree;
use crate::emit::StatementEmitter;
use crate::resolve::ViewResolver;

/// Empty view identifier: the general case.
const GENERAL: &str = "";

/// Phase 1: template selection per view.
pub fn template_phase(tree: &ConfigTree, emitter: &StatementEmitter<'_>) -> Dispatch {
    build_phase(tree, DispatchSubject::ActionView, |view| emitter.template(view))
}

/// Phase 2: everything else per resolved template.
pub fn setup_phase(tree: &ConfigTree, emitter: &StatementEmitter<'_>) -> Dispatch {
    build_phase(tree, DispatchSubject::TemplateView, |view| {
        view_setup(emitter, view)
    })
}

/// The five phase-2 emitters for one view, in their fixed order.
pub fn view_setup(emitter: &StatementEmitter<'_>, view: &str) -> Vec<Statement> {
    let mut statements = emitter.layout(view);
    statements.extend(emitter.component_slots(view));
    statements.extend(emitter.html_head(view));
    statements.extend(emitter.escaping(view));
    statements.extend(emitter.html_assets(view));
    statements
}

fn build_phase(
    tree: &ConfigTree,
    subject: DispatchSubject,
    body: impl Fn(&str) -> Vec<Statement>,
) -> Dispatch {
    let branches = tree
        .view_names()
        .map(|view| {
            trace!("{:?}: branch for '{}'", subject, view);
            Branch {
                view: view.to_string(),
                body: body(view),
            }
        })
        .collect();

    Dispatch {
        subject,
        branches,
        fallback: body(GENERAL),
    }
}

/// Assemble the whole procedure for a merged tree.
pub fn build_procedure(tree: &ConfigTree, generated_at: NaiveDateTime) -> Procedure {
    let emitter = StatementEmitter::new(ViewResolver::new(tree));
    Procedure {
        generated_at,
        prelude: vec![Statement::CaptureResponse],
        template_phase: template_phase(tree, &emitter),
        setup_phase: setup_phase(tree, &emitter),
    }
}
