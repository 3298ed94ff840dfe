//! Tera templates framing the generated rules.

use std::error::Error as _;

use anyhow::Result;
use tera::{Context, Tera};

use crate::core::DepgenError;

pub const EXTENSION_TEMPLATE: &str = "extension.bzl";
pub const WRAPPER_TEMPLATE: &str = "wrapper.bazel";

const EXTENSION: &str = r#"# DO NOT EDIT: File is auto-generated from {{ config_file }} by bazel-depgen version {{ version }}

"""
    Macro rules to load dependencies.

    Invoke 'generate_workspace_rules' from a WORKSPACE file.
    Invoke 'generate_targets' from a BUILD.bazel file.
"""

{% for load in loads %}{{ load }}
{% endfor %}
# SHA256 of the configuration content
_CONFIG_SHA256 = "{{ config_sha256 }}"

def generate_workspace_rules():
    """
        Repository rules macro to load dependencies.

        Must be run from a WORKSPACE file.
    """

{{ workspace_rules }}
def generate_targets():
    """
        Macro to define targets for dependencies.
    """

{{ targets }}"#;

const WRAPPER: &str = r#"# File is auto-generated from {{ config_file }} by bazel-depgen version {{ version }}
# Contents can be edited and will not be overridden.
load("{{ extension_label }}", "generate_targets")

package(default_visibility = ["//visibility:public"])

generate_targets()
"#;

/// Template engine holding the built-in templates.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    pub fn new() -> Result<Self> {
        let mut tera = Tera::default();
        tera.autoescape_on(Vec::new());
        tera.add_raw_templates(vec![(EXTENSION_TEMPLATE, EXTENSION), (WRAPPER_TEMPLATE, WRAPPER)])
            .map_err(|e| template_error("built-in", &e))?;
        Ok(Self {
            tera,
        })
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String> {
        self.tera.render(template, context).map_err(|e| template_error(template, &e).into())
    }
}

fn template_error(template: &str, error: &tera::Error) -> DepgenError {
    let mut reason = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        reason.push_str(": ");
        reason.push_str(&cause.to_string());
        source = cause.source();
    }
    DepgenError::TemplateError {
        template: template.to_string(),
        reason,
    }
}
