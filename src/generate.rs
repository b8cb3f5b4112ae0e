//! # Seeder Generation
//!
//! Drives a run: discover models, fetch their records, render one seeder per
//! model and per populated join table, then one `DatabaseSeeder` per
//! namespace calling all of them.
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};

use fs_err as fs;
use seeder_gen::{
    pivot_seeder_name, render_aggregator, render_pivot_row, render_record, render_seeder,
    template::{Templates, DEFAULT_LOCAL_TEMPLATE},
    PivotLinkage, SeederFile, Value, PIVOT_IMPORT,
};
use serde_json::Value as Json;

use crate::{
    config,
    discovery::{extract_models, ModelDescriptor, SourcePaths},
    record::{cast_value, Ordering, RecordSet, RecordSource},
    registry::{ModelRegistry, ModelSchema, PivotRelation},
    resolver::ResolvedOutputLocation,
    Result,
};

/// Value of `--path` and `--output` that turns on automatic resolution.
pub const AUTO: &str = "auto";

const AGGREGATOR_FILE: &str = "DatabaseSeeder.php";

/// Where generated seeders are written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputMode {
    /// A seeders folder resolved next to each model
    Auto,
    /// One folder, relative to the project root, for every seeder
    Fixed(PathBuf),
}

impl OutputMode {
    #[must_use]
    pub fn parse(value: Option<&str>) -> Self {
        match value {
            None | Some(AUTO) => Self::Auto,
            Some(path) => Self::Fixed(PathBuf::from(path)),
        }
    }
}

impl SourcePaths {
    /// `auto`, or a single folder overriding the configured ones.
    #[must_use]
    pub fn parse(value: &str) -> Self {
        if value == AUTO {
            Self::Auto
        } else {
            Self::Configured(vec![PathBuf::from(value)])
        }
    }
}

/// Settings of one generation run.
#[derive(Debug, Clone)]
pub struct GenerateOptions {
    /// Project root, the base of every relative path
    pub root: PathBuf,
    pub source: SourcePaths,
    pub output: OutputMode,
    /// Keep model events firing when the seeders run
    pub with_events: bool,
    /// Model class names to generate, all when empty
    pub only: Vec<String>,
    pub order: Ordering,
    pub exclude_columns: Vec<String>,
    /// Generate join table seeders
    pub pivots: bool,
    pub model_base_classes: Vec<String>,
    /// Template overrides folder, relative to the project root
    pub templates_dir: Option<PathBuf>,
}

impl GenerateOptions {
    /// Options taken from the `seeder` configuration section.
    #[must_use]
    pub fn from_config(root: &Path, config: &config::Seeder) -> Self {
        Self {
            root: root.to_path_buf(),
            source: SourcePaths::Configured(config.models_path.iter().map(PathBuf::from).collect()),
            output: OutputMode::parse(config.output_path.as_deref()),
            with_events: false,
            only: vec![],
            order: Ordering::default(),
            exclude_columns: config.exclude_columns.clone(),
            pivots: true,
            model_base_classes: config.model_base_classes.clone(),
            templates_dir: config.templates_dir.as_ref().map(PathBuf::from),
        }
    }

    fn templates(&self) -> Result<Templates> {
        let dir = self
            .templates_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOCAL_TEMPLATE));
        Ok(Templates::with_overrides(Some(&self.root.join(dir)))?)
    }
}

/// Outcome of a generation run.
#[derive(Debug, Default)]
pub struct GenerateResults {
    /// Files written, in write order
    pub written: Vec<PathBuf>,
    /// Fully qualified names of models left out because their records could
    /// not be read
    pub skipped: Vec<String>,
}

#[must_use]
pub fn collect_messages(results: &GenerateResults) -> String {
    let mut messages = String::new();
    for path in &results.written {
        messages.push_str(&format!("* {}\n", path.display()));
    }
    if !results.skipped.is_empty() {
        messages.push_str("\nskipped, records could not be read:\n");
        for model in &results.skipped {
            messages.push_str(&format!("* {model}\n"));
        }
    }
    messages
}

/// Seeder class names sharing a namespace, and the folder its aggregator is
/// written to.
#[derive(Debug)]
struct NamespaceGroup {
    namespace: String,
    directory: PathBuf,
    seeders: Vec<String>,
}

/// A single generation run.
pub struct Generator<'a> {
    source: &'a dyn RecordSource,
    registry: &'a ModelRegistry,
    options: &'a GenerateOptions,
    templates: Templates,
    fixed: Option<ResolvedOutputLocation>,
    locations: BTreeMap<PathBuf, ResolvedOutputLocation>,
    groups: Vec<NamespaceGroup>,
    pivot_files: BTreeSet<PathBuf>,
    results: GenerateResults,
}

impl<'a> Generator<'a> {
    /// Prepare a run, loading templates and creating a fixed output folder.
    ///
    /// # Errors
    ///
    /// When a template override cannot be loaded or the output folder cannot
    /// be created
    pub fn new(
        source: &'a dyn RecordSource,
        registry: &'a ModelRegistry,
        options: &'a GenerateOptions,
    ) -> Result<Self> {
        let fixed = match &options.output {
            OutputMode::Auto => None,
            OutputMode::Fixed(path) => Some(ResolvedOutputLocation::fixed(
                options.root.join(path),
                &options.root,
            )?),
        };

        Ok(Self {
            source,
            registry,
            options,
            templates: options.templates()?,
            fixed,
            locations: BTreeMap::new(),
            groups: vec![],
            pivot_files: BTreeSet::new(),
            results: GenerateResults::default(),
        })
    }

    /// Generate every seeder.
    ///
    /// # Errors
    ///
    /// On fatal errors: an invalid model file, an output path that cannot be
    /// resolved, a template or filesystem failure. Records that cannot be
    /// read only skip their model.
    pub async fn run(mut self) -> Result<GenerateResults> {
        let models = extract_models(
            &self.options.root,
            &self.options.source,
            &self.options.model_base_classes,
            &self.options.only,
        )?;
        if models.is_empty() {
            tracing::warn!(root = %self.options.root.display(), "no models found");
        }

        for model in &models {
            self.model(model).await?;
        }
        self.aggregators()?;

        Ok(self.results)
    }

    fn excluded(&self) -> Vec<&'a str> {
        self.options
            .exclude_columns
            .iter()
            .map(String::as_str)
            .collect()
    }

    async fn model(&mut self, model: &ModelDescriptor) -> Result<()> {
        let schema = self.registry.schema(model);
        let records = match self.source.records(&schema, &self.options.order).await {
            Ok(records) => records,
            Err(err) => {
                tracing::error!(model = %model.fqcn(), error = %err, "failed to read records, skipping model");
                self.results.skipped.push(model.fqcn());
                return Ok(());
            }
        };

        let excluded = self.excluded();
        let mut body = String::new();
        for (index, record) in records.iter().enumerate() {
            let attributes = record.attributes(Some(&schema), &excluded);
            body.push_str(&render_record(
                &self.templates,
                &model.class_name,
                index,
                &attributes,
            )?);
        }

        let location = self.location(model)?;
        let class_name = format!("{}Seeder", model.class_name);
        self.write_seeder(&location, &class_name, &model.fqcn(), &body)?;
        tracing::info!(model = %model.fqcn(), records = records.len(), "generated seeder");

        if self.options.pivots {
            for pivot in &schema.pivots {
                self.pivot(&schema, pivot, &records, &location).await?;
            }
        }
        Ok(())
    }

    async fn pivot(
        &mut self,
        schema: &ModelSchema,
        pivot: &PivotRelation,
        records: &RecordSet,
        location: &ResolvedOutputLocation,
    ) -> Result<()> {
        let class_name = pivot_seeder_name(&pivot.table);
        let path = location.directory.join(format!("{class_name}.php"));
        if self.pivot_files.contains(&path) {
            tracing::debug!(table = %pivot.table, "join table already generated");
            return Ok(());
        }

        let mut excluded = self.excluded();
        excluded.push(&pivot.foreign_pivot_key);
        excluded.push(&pivot.related_pivot_key);

        let missing = Json::Null;
        let mut body = String::new();
        for record in records {
            let parent_key = record.get(&pivot.parent_key).unwrap_or(&missing);
            let rows = match self.source.pivot_rows(pivot, parent_key).await {
                Ok(rows) => rows,
                Err(err) => {
                    tracing::error!(
                        model = %schema.class_name,
                        relation = %pivot.relation,
                        error = %err,
                        "failed to read join table rows, skipping relation"
                    );
                    return Ok(());
                }
            };

            for row in &rows {
                let foreign = cast_value(
                    row.get(&pivot.foreign_pivot_key).unwrap_or(parent_key),
                    None,
                );
                let related = row
                    .get(&pivot.related_pivot_key)
                    .map_or(Value::Null, |raw| cast_value(raw, None));
                let linkage = PivotLinkage {
                    foreign: (&pivot.foreign_pivot_key, &foreign),
                    related: (&pivot.related_pivot_key, &related),
                };
                body.push_str(&render_pivot_row(
                    &self.templates,
                    &pivot.connection,
                    &pivot.table,
                    &linkage,
                    &row.attributes(None, &excluded),
                )?);
            }
        }

        if body.is_empty() {
            tracing::debug!(table = %pivot.table, "join table has no rows");
            return Ok(());
        }

        self.write_seeder(location, &class_name, PIVOT_IMPORT, &body)?;
        self.pivot_files.insert(path);
        tracing::info!(relation = %pivot.relation, table = %pivot.table, "generated pivot seeder");
        Ok(())
    }

    fn location(&mut self, model: &ModelDescriptor) -> Result<ResolvedOutputLocation> {
        if let Some(fixed) = &self.fixed {
            return Ok(fixed.clone());
        }
        if let Some(location) = self.locations.get(&model.source_dir) {
            return Ok(location.clone());
        }
        let location = ResolvedOutputLocation::resolve(&model.source_dir, &self.options.root)?;
        self.locations
            .insert(model.source_dir.clone(), location.clone());
        Ok(location)
    }

    fn write_seeder(
        &mut self,
        location: &ResolvedOutputLocation,
        class_name: &str,
        import: &str,
        body: &str,
    ) -> Result<()> {
        let content = render_seeder(
            &self.templates,
            &SeederFile {
                class_name,
                parent_namespace: &location.namespace,
                import,
                with_events: self.options.with_events,
                body,
            },
        )?;
        let path = location.directory.join(format!("{class_name}.php"));
        fs::write(&path, content)?;
        self.results.written.push(path);

        let class_name = class_name.to_string();
        match self
            .groups
            .iter_mut()
            .find(|group| group.namespace == location.namespace)
        {
            Some(group) => group.seeders.push(class_name),
            None => self.groups.push(NamespaceGroup {
                namespace: location.namespace.clone(),
                directory: location.directory.clone(),
                seeders: vec![class_name],
            }),
        }
        Ok(())
    }

    fn aggregators(&mut self) -> Result<()> {
        for group in &self.groups {
            let content = render_aggregator(&self.templates, &group.namespace, &group.seeders)?;
            let path = group.directory.join(AGGREGATOR_FILE);
            fs::write(&path, content)?;
            self.results.written.push(path);
        }
        Ok(())
    }
}

/// Run a generation with `options`.
///
/// # Errors
///
/// See [`Generator::run`]
pub async fn generate(
    source: &dyn RecordSource,
    registry: &ModelRegistry,
    options: &GenerateOptions,
) -> Result<GenerateResults> {
    Generator::new(source, registry, options)?.run().await
}
