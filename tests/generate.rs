use std::path::PathBuf;

use model_seeder::{
    config::Config,
    discovery::SourcePaths,
    generate::{generate, GenerateOptions, GenerateResults, OutputMode},
    registry::ModelRegistry,
    testing::MemoryRecordSource,
    Error,
};
use serde_json::json;
use tree_fs::TreeBuilder;

const USER: &str = r"<?php

namespace App\Models;

use Illuminate\Foundation\Auth\User as Authenticatable;

class User extends Authenticatable
{
    public function roles(): BelongsToMany
    {
        return $this->belongsToMany(Role::class);
    }
}
";

const ROLE: &str = r"<?php

namespace App\Models;

use Illuminate\Database\Eloquent\Model;

class Role extends Model
{
}
";

const CONFIG: &str = r"
database:
  uri: mysql://root@localhost/app
seeder:
  exclude_columns:
    - password
  models:
    User:
      casts:
        settings: array
      pivots:
        roles:
          related: Role
";

fn project() -> tree_fs::Tree {
    TreeBuilder::default()
        .drop(true)
        .add("app/Models/User.php", USER)
        .add("app/Models/Role.php", ROLE)
        .add("database/migrations/.gitkeep", "")
        .create()
        .expect("create project")
}

fn source() -> MemoryRecordSource {
    MemoryRecordSource::default()
        .with_table(
            "users",
            vec![
                json!({
                    "id": 1,
                    "name": "Ada",
                    "password": "$2y$10$hash",
                    "settings": "{\"theme\":\"dark\"}",
                    "created_at": "2024-01-01 00:00:00",
                }),
                json!({
                    "id": 2,
                    "name": "Grace",
                    "password": "$2y$10$other",
                    "settings": null,
                    "created_at": "2024-01-02 00:00:00",
                }),
            ],
        )
        .with_table(
            "roles",
            vec![json!({"id": 1, "name": "admin"}), json!({"id": 2, "name": "editor"})],
        )
        .with_table(
            "role_user",
            vec![
                json!({
                    "user_id": 1,
                    "role_id": 1,
                    "password": "granted-by-admin",
                    "created_at": "2024-01-03 00:00:00",
                }),
                json!({
                    "user_id": 2,
                    "role_id": 2,
                    "password": "granted-by-editor",
                    "created_at": "2024-01-04 00:00:00",
                }),
            ],
        )
}

fn setup(tree: &tree_fs::Tree) -> (ModelRegistry, GenerateOptions) {
    let config = Config::from_yaml(CONFIG, "test.yaml").expect("config");
    let registry = ModelRegistry::from_config(&config);
    let options = GenerateOptions::from_config(&tree.root, &config.seeder);
    (registry, options)
}

fn read(path: PathBuf) -> String {
    std::fs::read_to_string(&path).unwrap_or_else(|_| panic!("read {}", path.display()))
}

async fn run(
    source: &MemoryRecordSource,
    registry: &ModelRegistry,
    options: &GenerateOptions,
) -> GenerateResults {
    generate(source, registry, options).await.expect("generate")
}

#[tokio::test]
async fn can_generate_model_pivot_and_database_seeders() {
    let tree = project();
    let (registry, options) = setup(&tree);

    let results = run(&source(), &registry, &options).await;

    let seeders = tree.root.join("database/seeders");
    assert_eq!(
        results.written,
        vec![
            seeders.join("RoleSeeder.php"),
            seeders.join("UserSeeder.php"),
            seeders.join("RoleUserPivotSeeder.php"),
            seeders.join("DatabaseSeeder.php"),
        ]
    );
    assert!(results.skipped.is_empty());

    let user = read(seeders.join("UserSeeder.php"));
    assert!(user.contains("namespace Database\\Seeders;"));
    assert!(user.contains("use App\\Models\\User;"));
    assert!(user.contains("use WithoutModelEvents;"));
    assert!(user.contains("class UserSeeder extends Seeder"));
    assert_eq!(user.matches("User::forceCreate([").count(), 2);
    assert!(!user.contains("password"));
    assert!(user.contains("            'settings' => [\"theme\" => 'dark', ],\n"));
    assert!(user.contains("            'settings' => null,\n"));
    assert!(user.contains("            'created_at' => '2024-01-01 00:00:00',\n"));

    let pivot = read(seeders.join("RoleUserPivotSeeder.php"));
    assert!(pivot.contains("use Illuminate\\Support\\Facades\\DB;"));
    assert!(pivot.contains("class RoleUserPivotSeeder extends Seeder"));
    assert_eq!(pivot.matches("->insert([").count(), 2);
    assert!(pivot.contains(
        "        DB::connection('mysql')->table('role_user')->insert([\n            'user_id' => 1,\n            'role_id' => 1,\n            'created_at' => '2024-01-03 00:00:00',\n        ]);"
    ));
    assert_eq!(pivot.matches("'user_id' =>").count(), 2);
    assert!(!pivot.contains("password"));
    assert!(!pivot.contains("granted-by"));

    let database = read(seeders.join("DatabaseSeeder.php"));
    assert!(database.contains("namespace Database\\Seeders;"));
    assert!(database.contains(
        "            RoleSeeder::class,\n            UserSeeder::class,\n            RoleUserPivotSeeder::class,\n"
    ));
}

#[tokio::test]
async fn fetch_failure_skips_model() {
    let tree = project();
    let (registry, options) = setup(&tree);

    let results = run(&source().failing("roles"), &registry, &options).await;

    let seeders = tree.root.join("database/seeders");
    assert_eq!(results.skipped, vec!["App\\Models\\Role".to_string()]);
    assert!(!seeders.join("RoleSeeder.php").exists());
    assert!(seeders.join("UserSeeder.php").exists());

    let database = read(seeders.join("DatabaseSeeder.php"));
    assert!(!database.contains("RoleSeeder::class"));
    assert!(database.contains("UserSeeder::class"));
}

#[tokio::test]
async fn pivot_failure_skips_relation() {
    let tree = project();
    let (registry, options) = setup(&tree);

    let results = run(&source().failing("role_user"), &registry, &options).await;

    let seeders = tree.root.join("database/seeders");
    assert!(results.skipped.is_empty());
    assert!(seeders.join("UserSeeder.php").exists());
    assert!(!seeders.join("RoleUserPivotSeeder.php").exists());
}

#[tokio::test]
async fn missing_database_folder_is_fatal() {
    let tree = TreeBuilder::default()
        .drop(true)
        .add("app/Models/User.php", USER)
        .create()
        .expect("create project");
    let (registry, options) = setup(&tree);

    let err = generate(&source(), &registry, &options)
        .await
        .expect_err("no database folder");

    let models = tree.root.join("app/Models");
    assert!(matches!(&err, Error::OutputPathNotFound(path) if path == &models));
}

#[tokio::test]
async fn file_without_class_is_fatal() {
    let tree = project();
    std::fs::write(
        tree.root.join("app/Models/HasRoles.php"),
        "<?php\nnamespace App\\Models;\ntrait HasRoles\n{\n}\n",
    )
    .expect("write trait");
    let (registry, options) = setup(&tree);

    let err = generate(&source(), &registry, &options)
        .await
        .expect_err("invalid model");

    assert!(matches!(err, Error::InvalidModel(_)));
}

#[tokio::test]
async fn can_write_to_fixed_output() {
    let tree = project();
    let (registry, mut options) = setup(&tree);
    options.output = OutputMode::Fixed(PathBuf::from("database/generated"));

    run(&source(), &registry, &options).await;

    let generated = tree.root.join("database/generated");
    assert!(generated.join("UserSeeder.php").exists());
    assert!(!tree.root.join("database/seeders").exists());

    let database = read(generated.join("DatabaseSeeder.php"));
    assert!(database.contains("namespace Database\\Generated;"));
}

#[tokio::test]
async fn fixed_output_with_parent_folders_keeps_namespace() {
    let tree = project();
    let (registry, mut options) = setup(&tree);
    options.output = OutputMode::Fixed(PathBuf::from("database/../database/seeders"));
    options.pivots = false;

    let results = run(&source(), &registry, &options).await;

    let seeders = tree.root.join("database/seeders");
    assert_eq!(
        results.written,
        vec![
            seeders.join("RoleSeeder.php"),
            seeders.join("UserSeeder.php"),
            seeders.join("DatabaseSeeder.php"),
        ]
    );
    let user = read(seeders.join("UserSeeder.php"));
    assert!(user.contains("namespace Database\\Seeders;"));
    let database = read(seeders.join("DatabaseSeeder.php"));
    assert!(database.contains("namespace Database\\Seeders;"));
}

#[tokio::test]
async fn nested_model_folders_get_one_seeder_each() {
    let tree = TreeBuilder::default()
        .drop(true)
        .add("app/Models/User.php", USER)
        .add(
            "app/Models/Blog/Post.php",
            "<?php\nnamespace App\\Models\\Blog;\nclass Post extends Model\n{\n}\n",
        )
        .add("database/.gitkeep", "")
        .create()
        .expect("create project");
    let (registry, mut options) = setup(&tree);
    options.source = SourcePaths::Auto;
    options.pivots = false;

    let source = source().with_table("posts", vec![json!({"id": 1, "title": "Hello"})]);
    let results = run(&source, &registry, &options).await;

    let seeders = tree.root.join("database/seeders");
    assert_eq!(
        results.written,
        vec![
            seeders.join("PostSeeder.php"),
            seeders.join("UserSeeder.php"),
            seeders.join("DatabaseSeeder.php"),
        ]
    );

    let post = read(seeders.join("PostSeeder.php"));
    assert_eq!(post.matches("Post::forceCreate([").count(), 1);

    let database = read(seeders.join("DatabaseSeeder.php"));
    assert_eq!(database.matches("PostSeeder::class").count(), 1);
    assert_eq!(database.matches("UserSeeder::class").count(), 1);
}

#[tokio::test]
async fn only_generates_named_models() {
    let tree = project();
    let (registry, mut options) = setup(&tree);
    options.only = vec!["Role".to_string()];

    let results = run(&source(), &registry, &options).await;

    let seeders = tree.root.join("database/seeders");
    assert_eq!(
        results.written,
        vec![seeders.join("RoleSeeder.php"), seeders.join("DatabaseSeeder.php")]
    );
}

#[tokio::test]
async fn can_keep_model_events() {
    let tree = project();
    let (registry, mut options) = setup(&tree);
    options.with_events = true;
    options.pivots = false;

    run(&source(), &registry, &options).await;

    let seeders = tree.root.join("database/seeders");
    let user = read(seeders.join("UserSeeder.php"));
    assert!(!user.contains("WithoutModelEvents"));
    assert!(!seeders.join("RoleUserPivotSeeder.php").exists());
}

#[tokio::test]
async fn can_discover_model_folders() {
    let tree = TreeBuilder::default()
        .drop(true)
        .add("src/Billing/Entities/Invoice.php", "<?php\nnamespace Billing\\Entities;\nclass Invoice extends Model\n{\n}\n")
        .add("src/Billing/Database/.gitkeep", "")
        .create()
        .expect("create project");
    let (registry, mut options) = setup(&tree);
    options.source = SourcePaths::Auto;

    let source = MemoryRecordSource::default().with_table("invoices", vec![json!({"id": 7})]);
    let results = run(&source, &registry, &options).await;

    let seeders = tree.root.join("src/Billing/Database/Seeders");
    assert_eq!(
        results.written,
        vec![seeders.join("InvoiceSeeder.php"), seeders.join("DatabaseSeeder.php")]
    );
    let invoice = read(seeders.join("InvoiceSeeder.php"));
    assert!(invoice.contains("namespace Src\\Billing\\Database\\Seeders;"));
    assert!(invoice.contains("use Billing\\Entities\\Invoice;"));
    assert!(invoice.contains("            'id' => 7,\n"));
}

#[tokio::test]
async fn can_use_template_overrides() {
    let tree = project();
    std::fs::create_dir_all(tree.root.join(".seeder-templates")).expect("create folder");
    std::fs::write(
        tree.root.join(".seeder-templates/database.t"),
        "{{ seeders | join(sep=\"|\") }}",
    )
    .expect("write override");
    let (registry, options) = setup(&tree);

    run(&source(), &registry, &options).await;

    let database = read(tree.root.join("database/seeders/DatabaseSeeder.php"));
    assert_eq!(database, "RoleSeeder|UserSeeder|RoleUserPivotSeeder");
}
