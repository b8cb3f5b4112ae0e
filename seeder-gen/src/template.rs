use std::path::Path;

use serde_json::Value;
use tera::{Context, Tera};

use crate::{Error, Result};

/// Folder, relative to the project root, searched for template overrides.
pub const DEFAULT_LOCAL_TEMPLATE: &str = ".seeder-templates";

pub const SEEDER_T: &str = "seeder.t";
pub const RECORD_T: &str = "record.t";
pub const PIVOT_ROW_T: &str = "pivot_row.t";
pub const DATABASE_T: &str = "database.t";

const BUILTIN: &[(&str, &str)] = &[
    (SEEDER_T, include_str!("templates/seeder.t")),
    (RECORD_T, include_str!("templates/record.t")),
    (PIVOT_ROW_T, include_str!("templates/pivot_row.t")),
    (DATABASE_T, include_str!("templates/database.t")),
];

/// The set of templates used to render seeders.
#[derive(Debug)]
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// Templates shipped with the crate.
    ///
    /// # Errors
    ///
    /// When a built-in template does not parse
    pub fn builtin() -> Result<Self> {
        Self::with_overrides(None)
    }

    /// Built-in templates, each replaced by a file of the same name found in
    /// `dir`.
    ///
    /// # Errors
    ///
    /// When an override cannot be read or a template does not parse
    pub fn with_overrides(dir: Option<&Path>) -> Result<Self> {
        let mut tera = Tera::default();
        for (name, content) in BUILTIN {
            let custom = dir.map(|dir| dir.join(name)).filter(|path| path.is_file());
            if let Some(path) = custom {
                tracing::debug!(template = name, path = %path.display(), "using template override");
                let content = std::fs::read_to_string(&path)
                    .map_err(|source| Error::TemplateOverride { path, source })?;
                tera.add_raw_template(name, &content)?;
            } else {
                tera.add_raw_template(name, content)?;
            }
        }
        Ok(Self { tera })
    }

    /// Render the named template with `vars`.
    ///
    /// # Errors
    ///
    /// When the template is unknown or fails to render
    pub fn render(&self, name: &str, vars: &Value) -> Result<String> {
        if !self.tera.get_template_names().any(|known| known == name) {
            return Err(Error::TemplateNotFound {
                name: name.to_string(),
            });
        }
        Ok(self.tera.render(name, &Context::from_serialize(vars)?)?)
    }
}
