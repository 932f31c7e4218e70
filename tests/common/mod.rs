//! Shared test utilities for integration and E2E tests.
//!
//! ```rust,ignore
//! mod common;
//! use common::prelude::*;
//!
//! let fixture = TestFixture::new().with_file("config/view.yml", configs::APP);
//! fixture.command().args(["compile", "config/view.yml"]).assert().success();
//! ```

use assert_fs::prelude::*;
use std::path::Path;

/// Re-export commonly used test dependencies for convenience.
pub mod prelude {
    pub use assert_cmd::cargo::cargo_bin_cmd;
    pub use assert_fs::prelude::*;
    pub use predicates::prelude::*;

    #[allow(unused_imports)]
    pub use super::configs;
    #[allow(unused_imports)]
    pub use super::FIXED_DATE;
    pub use super::TestFixture;
}

/// Timestamp passed as `--date` so output is reproducible.
#[allow(dead_code)]
pub const FIXED_DATE: &str = "2024-01-02 03:04:05";

/// Common view.yml snippets.
#[allow(dead_code)]
pub mod configs {
    /// Application-level configuration with a default layer.
    pub const APP: &str = r#"
default:
  http_metas:
    content-type: text/html
  metas:
    title: Tom & Jerry
  stylesheets: [main]
  javascripts: [app]
  has_layout: true
  layout: layout
"#;

    /// A module configuration with one special view.
    pub const MODULE: &str = r#"
all:
  stylesheets: [blog]
editSuccess:
  layout: editor
  stylesheets: [-main]
"#;

    /// Only an `all` layer.
    pub const ALL_ONLY: &str = r#"
all:
  template: home
"#;

    /// Unparsable YAML.
    pub const INVALID_YAML: &str = "all: [unclosed\n";

    /// Top level is a list, not a mapping of views.
    pub const NOT_A_MAPPING: &str = "- all\n- edit\n";
}

/// A temporary directory populated with configuration files.
pub struct TestFixture {
    temp_dir: assert_fs::TempDir,
}

impl TestFixture {
    pub fn new() -> Self {
        Self {
            temp_dir: assert_fs::TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Add a file with the given path and content.
    pub fn with_file(self, path: &str, content: &str) -> Self {
        self.temp_dir
            .child(path)
            .write_str(content)
            .expect("Failed to write file");
        self
    }

    /// Add `<module>/config/view.yml` under `modules/`.
    #[allow(dead_code)]
    pub fn with_module(self, module: &str, content: &str) -> Self {
        self.with_file(&format!("modules/{}/config/view.yml", module), content)
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    #[allow(dead_code)]
    pub fn child(&self, path: &str) -> assert_fs::fixture::ChildPath {
        self.temp_dir.child(path)
    }

    /// The binary, run inside the fixture directory.
    pub fn command(&self) -> assert_cmd::Command {
        let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("view-config");
        cmd.current_dir(self.temp_dir.path());
        cmd.env_remove("VIEW_CONFIG_CONSTANTS");
        cmd.env_remove("RUST_LOG");
        cmd
    }
}

impl Default for TestFixture {
    fn default() -> Self {
        Self::new()
    }
}
