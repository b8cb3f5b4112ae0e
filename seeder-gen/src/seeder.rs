use heck::ToUpperCamelCase;
use serde_json::{json, Value as Json};

use crate::{
    template::{Templates, DATABASE_T, PIVOT_ROW_T, RECORD_T, SEEDER_T},
    value::{quote, Value},
    Result,
};

/// Class imported by pivot seeders, which insert through the query builder.
pub const PIVOT_IMPORT: &str = r"Illuminate\Support\Facades\DB";

/// A seeder class ready to be rendered around a pre-rendered body.
#[derive(Debug)]
pub struct SeederFile<'a> {
    /// Seeder class name, e.g. `UserSeeder`
    pub class_name: &'a str,
    /// Namespace of the seeders folder
    pub parent_namespace: &'a str,
    /// Fully qualified class the body refers to
    pub import: &'a str,
    pub with_events: bool,
    pub body: &'a str,
}

/// The two join-table columns that link a pivot row to both sides of the
/// relation.
#[derive(Debug)]
pub struct PivotLinkage<'a> {
    pub foreign: (&'a str, &'a Value),
    pub related: (&'a str, &'a Value),
}

/// Seeder class name for a join table, e.g. `role_user` → `RoleUserPivotSeeder`.
#[must_use]
pub fn pivot_seeder_name(table: &str) -> String {
    format!("{}Seeder", format!("{table}_pivot").to_upper_camel_case())
}

fn attribute_vars(attributes: &[(String, Value)]) -> Vec<Json> {
    attributes
        .iter()
        .map(|(key, value)| json!({"key": quote(key), "value": value.to_string()}))
        .collect()
}

/// Render the block that recreates one record of `model`.
///
/// # Errors
///
/// When the record template fails to render
pub fn render_record(
    templates: &Templates,
    model: &str,
    index: usize,
    attributes: &[(String, Value)],
) -> Result<String> {
    let vars = json!({
        "model": model,
        "index": index,
        "attributes": attribute_vars(attributes),
    });
    templates.render(RECORD_T, &vars)
}

/// Render the insert statement for one join-table row.
///
/// # Errors
///
/// When the pivot row template fails to render
pub fn render_pivot_row(
    templates: &Templates,
    connection: &str,
    table: &str,
    linkage: &PivotLinkage<'_>,
    attributes: &[(String, Value)],
) -> Result<String> {
    let vars = json!({
        "connection": quote(connection),
        "table": quote(table),
        "foreign": {"key": quote(linkage.foreign.0), "value": linkage.foreign.1.to_string()},
        "related": {"key": quote(linkage.related.0), "value": linkage.related.1.to_string()},
        "attributes": attribute_vars(attributes),
    });
    templates.render(PIVOT_ROW_T, &vars)
}

/// Render a complete seeder class.
///
/// # Errors
///
/// When the seeder template fails to render
pub fn render_seeder(templates: &Templates, file: &SeederFile<'_>) -> Result<String> {
    let vars = json!({
        "class_name": file.class_name,
        "parent_namespace": file.parent_namespace,
        "import": file.import,
        "with_events": file.with_events,
        "body": file.body,
    });
    templates.render(SEEDER_T, &vars)
}

/// Render the `DatabaseSeeder` calling every seeder of a namespace.
///
/// # Errors
///
/// When the database template fails to render
pub fn render_aggregator(templates: &Templates, namespace: &str, seeders: &[String]) -> Result<String> {
    tracing::debug!(namespace, seeders = seeders.len(), "rendering database seeder");
    templates.render(DATABASE_T, &json!({"namespace": namespace, "seeders": seeders}))
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    fn templates() -> Templates {
        Templates::builtin().expect("builtin templates")
    }

    #[rstest]
    #[case("role_user", "RoleUserPivotSeeder")]
    #[case("tags", "TagsPivotSeeder")]
    #[case("post_tag", "PostTagPivotSeeder")]
    fn can_name_pivot_seeder(#[case] table: &str, #[case] expected: &str) {
        assert_eq!(pivot_seeder_name(table), expected);
    }

    #[test]
    fn can_render_record() {
        let attributes = vec![
            ("id".to_string(), Value::Int(1)),
            ("name".to_string(), Value::Text("O'Hara".to_string())),
            (
                "settings".to_string(),
                Value::Mapping(vec![("theme".to_string(), Value::Text("dark".to_string()))]),
            ),
            ("deleted_at".to_string(), Value::Null),
        ];
        let rendered = render_record(&templates(), "User", 3, &attributes).expect("render");

        assert_eq!(
            rendered.trim_end(),
            r#"        // User #3
        User::forceCreate([
            'id' => 1,
            'name' => 'O\'Hara',
            'settings' => ["theme" => 'dark', ],
            'deleted_at' => null,
        ]);"#
        );
    }

    #[test]
    fn can_render_pivot_row() {
        let user = Value::Int(1);
        let role = Value::Int(4);
        let linkage = PivotLinkage {
            foreign: ("user_id", &user),
            related: ("role_id", &role),
        };
        let attributes = vec![("granted_by".to_string(), Value::Text("admin".to_string()))];
        let rendered =
            render_pivot_row(&templates(), "mysql", "role_user", &linkage, &attributes).expect("render");

        assert_eq!(
            rendered.trim_end(),
            r"        DB::connection('mysql')->table('role_user')->insert([
            'user_id' => 1,
            'role_id' => 4,
            'granted_by' => 'admin',
        ]);"
        );
    }

    #[test]
    fn can_render_seeder_without_events() {
        let file = SeederFile {
            class_name: "UserSeeder",
            parent_namespace: r"Database\Seeders",
            import: r"App\Models\User",
            with_events: false,
            body: "        // body\n",
        };
        let rendered = render_seeder(&templates(), &file).expect("render");

        assert_eq!(
            rendered.trim_end(),
            r"<?php

namespace Database\Seeders;

use App\Models\User;
use Illuminate\Database\Console\Seeds\WithoutModelEvents;
use Illuminate\Database\Seeder;

class UserSeeder extends Seeder
{
    use WithoutModelEvents;

    /**
     * Run the database seeds.
     */
    public function run(): void
    {
        // body
    }
}"
        );
    }

    #[test]
    fn seeder_with_events_skips_trait() {
        let file = SeederFile {
            class_name: "RoleUserPivotSeeder",
            parent_namespace: r"Database\Seeders",
            import: PIVOT_IMPORT,
            with_events: true,
            body: "",
        };
        let rendered = render_seeder(&templates(), &file).expect("render");

        assert!(rendered.contains(r"use Illuminate\Support\Facades\DB;"));
        assert!(!rendered.contains("WithoutModelEvents"));
        assert!(rendered.contains("class RoleUserPivotSeeder extends Seeder"));
    }

    #[test]
    fn can_render_aggregator() {
        let seeders = vec!["UserSeeder".to_string(), "RoleUserPivotSeeder".to_string()];
        let rendered =
            render_aggregator(&templates(), r"Database\Seeders", &seeders).expect("render");

        assert!(rendered.contains(r"namespace Database\Seeders;"));
        assert!(rendered.contains(
            "        $this->call([\n            UserSeeder::class,\n            RoleUserPivotSeeder::class,\n        ]);"
        ));
    }

    #[test]
    fn aggregator_without_namespace_omits_declaration() {
        let rendered = render_aggregator(&templates(), "", &[]).expect("render");
        assert!(!rendered.contains("namespace"));
    }
}
