//! The compile orchestrator.

use std::sync::Arc;

use tracing::{debug, info, warn};
use uuid::Uuid;

use skyforge_core::{
    Architecture, ArchitectureGenerator, CancellationToken, GeneratorRegistry, Inventory, Warning,
};
use skyforge_graph::ResourceGraph;
use skyforge_hcl::{Emitter, IacFile, MapperRegistry, ResourceMapper};
use skyforge_ir::{normalize, parse_diagram, ValidationIssue, Validator};
use skyforge_rules::{
    evaluate, parse_records, ConstraintRecord, Rule, RuleError, RuleRegistry,
};
use skyforge_store::{Gateway, MemoryGateway, ProjectRecord, ResourceRecord, Tx};

use crate::config::{EngineConfig, PersistOrder};
use crate::error::{BuildError, CompileError, CompileFailure, ErrorCode, Stage};

/// Per-compile options.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Project name persisted with the compile.
    pub project_name: String,
    /// Owning user id.
    pub user_id: String,
    /// Provider override; the configured default applies when absent.
    pub provider: Option<String>,
    /// Cancellation token, checked between resources in every stage.
    pub cancel: CancellationToken,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            project_name: "untitled".to_string(),
            user_id: "anonymous".to_string(),
            provider: None,
            cancel: CancellationToken::new(),
        }
    }
}

/// A successful compile: the emitted files and any warnings.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    /// Emitted IaC files.
    pub files: Vec<IacFile>,
    /// Non-fatal diagnostics.
    pub warnings: Vec<Warning>,
}

/// The compiler engine.
///
/// Holds the process-wide read-only state; build one at startup via
/// [`Engine::builder`] or [`Engine::with_defaults`] and share it freely —
/// compiles never mutate it.
pub struct Engine {
    inventory: Inventory,
    generators: GeneratorRegistry,
    mappers: MapperRegistry,
    rules: RuleRegistry,
    config: EngineConfig,
    gateway: Arc<dyn Gateway>,
}

impl Engine {
    /// Start building an engine.
    #[must_use]
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    /// An engine wired with the AWS provider, the embedded inventory, the
    /// configured default rule set and an in-memory gateway.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if any default component fails to register.
    pub fn with_defaults() -> Result<Self, BuildError> {
        Self::with_config(EngineConfig::default())
    }

    /// Like [`Engine::with_defaults`] but with explicit configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] if any default component fails to register.
    pub fn with_config(config: EngineConfig) -> Result<Self, BuildError> {
        let rules = skyforge_aws::default_rules(config.rule_profile);
        Self::builder()
            .config(config)
            .inventory(skyforge_aws::default_inventory()?)
            .generator(Arc::new(skyforge_aws::AwsGenerator::new()))?
            .mapper(Arc::new(skyforge_aws::AwsMapper::new()))?
            .default_rules(rules)
            .build()
    }

    /// The engine's configuration.
    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// The persistence gateway the engine writes through.
    #[must_use]
    pub fn gateway(&self) -> &Arc<dyn Gateway> {
        &self.gateway
    }

    /// Run one compile.
    ///
    /// Stages run synchronously in order; early stages fail fast, the
    /// validator and rule engine collect, and the emitter collects
    /// missing-config errors across resources. Files and errors are mutually
    /// exclusive: a failure after emission discards the rendered files.
    ///
    /// # Errors
    ///
    /// Returns a [`CompileFailure`] carrying every error of the failing
    /// stage plus any warnings gathered before it.
    pub fn compile(
        &self,
        bytes: &[u8],
        options: &CompileOptions,
    ) -> Result<CompileOutput, CompileFailure> {
        let provider = options
            .provider
            .clone()
            .unwrap_or_else(|| self.config.provider.clone());
        info!(provider = %provider, project = %options.project_name, "compile started");

        // Parse.
        self.check_cancel(Stage::Parse, &options.cancel, &[])?;
        let ir = parse_diagram(bytes).map_err(|e| fail(ir_error(e, Stage::Parse), vec![]))?;

        // Normalize.
        self.check_cancel(Stage::Normalize, &options.cancel, &[])?;
        let graph = normalize(&ir).map_err(|e| fail(ir_error(e, Stage::Normalize), vec![]))?;

        let generator = self.generators.get(&provider).ok_or_else(|| {
            fail(
                CompileError::new(
                    ErrorCode::MapperNotRegistered,
                    Stage::Map,
                    format!("no generator registered for provider '{provider}'"),
                ),
                vec![],
            )
        })?;

        // Validate.
        self.check_cancel(Stage::Validate, &options.cancel, &[])?;
        let schema = generator.validation_schema(&self.inventory);
        let validation = Validator::new(schema).validate(&graph);
        if !validation.valid {
            let errors = validation.errors.into_iter().map(validation_error).collect();
            return Err(CompileFailure {
                errors,
                warnings: vec![],
            });
        }

        // Map to the domain architecture.
        let mut architecture = generator
            .generate(&graph, &self.inventory, &options.cancel)
            .map_err(|e| fail(core_error(&e), vec![]))?;
        let warnings = architecture.warnings.clone();

        // Rules.
        let evaluation = evaluate(&architecture, &self.rules, &options.cancel)
            .map_err(|_| fail(CompileError::cancelled(Stage::Rules), warnings.clone()))?;
        if !evaluation.valid {
            let errors = evaluation.errors.into_iter().map(rule_error).collect();
            return Err(CompileFailure {
                errors,
                warnings,
            });
        }

        // Sort.
        self.check_cancel(Stage::Sort, &options.cancel, &warnings)?;
        let order = ResourceGraph::from_architecture(&architecture)
            .and_then(|g| g.sort())
            .map_err(|e| fail(graph_error(&e), warnings.clone()))?;

        // Enrich.
        generator.enrich(&mut architecture, &order);

        if self.config.persist_order == PersistOrder::BeforeEmission {
            self.persist(&architecture, options)
                .map_err(|e| fail(e, warnings.clone()))?;
        }

        // Emit.
        let files = Emitter::new(&self.mappers)
            .emit(&architecture, &order, &options.cancel)
            .map_err(|errors| CompileFailure {
                errors: errors.iter().map(emit_error).collect(),
                warnings: warnings.clone(),
            })?;

        if self.config.persist_order == PersistOrder::AfterEmission {
            // A persist failure discards the rendered files.
            self.persist(&architecture, options)
                .map_err(|e| fail(e, warnings.clone()))?;
        }

        info!(
            files = files.len(),
            warnings = warnings.len(),
            "compile finished"
        );
        Ok(CompileOutput { files, warnings })
    }

    fn check_cancel(
        &self,
        stage: Stage,
        cancel: &CancellationToken,
        warnings: &[Warning],
    ) -> Result<(), CompileFailure> {
        if cancel.is_cancelled() {
            warn!(stage = stage.as_str(), "compile cancelled");
            return Err(fail(CompileError::cancelled(stage), warnings.to_vec()));
        }
        Ok(())
    }

    /// Persist the architecture inside one transaction.
    fn persist(
        &self,
        architecture: &Architecture,
        options: &CompileOptions,
    ) -> Result<(), CompileError> {
        let tx = self.gateway.begin().map_err(|e| persist_error(&e))?;
        match self.persist_in_tx(tx, architecture, options) {
            Ok(()) => self.gateway.commit(tx).map_err(|e| persist_error(&e)),
            Err(error) => {
                if let Err(rollback) = self.gateway.rollback(tx) {
                    warn!(error = %rollback, "rollback failed after persistence error");
                }
                Err(error)
            }
        }
    }

    fn persist_in_tx(
        &self,
        tx: Tx,
        architecture: &Architecture,
        options: &CompileOptions,
    ) -> Result<(), CompileError> {
        let gw = &self.gateway;
        gw.ensure_user(tx, &options.user_id)
            .map_err(|e| persist_error(&e))?;
        gw.ensure_iac_target(tx, &self.config.iac_target)
            .map_err(|e| persist_error(&e))?;
        gw.ensure_dependency_type(tx, "dependency")
            .map_err(|e| persist_error(&e))?;

        let project = ProjectRecord::new(
            &options.project_name,
            &options.user_id,
            &architecture.provider,
            &architecture.region,
        );
        gw.save_project(tx, &project).map_err(|e| persist_error(&e))?;

        for resource in &architecture.resources {
            if options.cancel.is_cancelled() {
                return Err(CompileError::cancelled(Stage::Persist));
            }
            gw.ensure_resource_type(tx, resource.type_name())
                .map_err(|e| persist_error(&e))?;
            let record = ResourceRecord {
                id: Uuid::new_v4(),
                project_id: project.id,
                external_id: resource.id.clone(),
                name: resource.name.clone(),
                resource_type: resource.type_name().to_string(),
                region: resource.region.clone(),
                metadata: serde_json::to_value(&resource.metadata).unwrap_or_default(),
            };
            gw.save_resource(tx, &record)
                .map_err(|e| persist_error(&e).with_resource(&resource.id))?;
        }

        for (parent, children) in &architecture.containments {
            for child in children {
                gw.save_containment(tx, parent, child)
                    .map_err(|e| persist_error(&e))?;
            }
        }
        for (from, dependencies) in &architecture.dependencies {
            for to in dependencies {
                gw.save_dependency(tx, from, to, "dependency")
                    .map_err(|e| persist_error(&e))?;
            }
        }
        debug!(resources = architecture.resources.len(), "architecture persisted");
        Ok(())
    }
}

impl std::fmt::Debug for Engine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Engine")
            .field("inventory_types", &self.inventory.len())
            .field("generators", &self.generators)
            .field("mappers", &self.mappers)
            .field("rules", &self.rules.len())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Builder for [`Engine`].
///
/// Registries are populated here, once, and become read-only when `build`
/// hands them to the engine. Registering two components under one provider
/// tag is an error rather than a replacement.
#[derive(Default)]
pub struct EngineBuilder {
    inventory: Option<Inventory>,
    config: EngineConfig,
    generators: GeneratorRegistry,
    mappers: MapperRegistry,
    defaults: Vec<Rule>,
    records: Vec<ConstraintRecord>,
    gateway: Option<Arc<dyn Gateway>>,
}

impl EngineBuilder {
    /// Set the configuration.
    #[must_use]
    pub fn config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Set the resource type inventory.
    #[must_use]
    pub fn inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = Some(inventory);
        self
    }

    /// Register an architecture generator.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] on an empty or duplicate provider tag.
    pub fn generator(
        mut self,
        generator: Arc<dyn ArchitectureGenerator>,
    ) -> Result<Self, BuildError> {
        self.generators.register(generator)?;
        Ok(self)
    }

    /// Register a resource mapper.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] on an empty or duplicate provider tag.
    pub fn mapper(mut self, mapper: Arc<dyn ResourceMapper>) -> Result<Self, BuildError> {
        self.mappers.register(mapper)?;
        Ok(self)
    }

    /// Seed the code-defined default rules.
    #[must_use]
    pub fn default_rules(mut self, rules: Vec<Rule>) -> Self {
        self.defaults = rules;
        self
    }

    /// Add data-driven constraint records that override defaults.
    #[must_use]
    pub fn constraint_records(mut self, records: Vec<ConstraintRecord>) -> Self {
        self.records.extend(records);
        self
    }

    /// Set the persistence gateway. Defaults to an in-memory gateway.
    #[must_use]
    pub fn gateway(mut self, gateway: Arc<dyn Gateway>) -> Self {
        self.gateway = Some(gateway);
        self
    }

    /// Finish building.
    ///
    /// # Errors
    ///
    /// Returns a [`BuildError`] when no inventory was provided or the
    /// constraint records do not decode.
    pub fn build(self) -> Result<Engine, BuildError> {
        let inventory = self
            .inventory
            .ok_or_else(|| BuildError::config("an inventory is required"))?;
        let overrides = parse_records(&self.records)?;
        let mut rules = RuleRegistry::new();
        rules.load(self.defaults, overrides);
        Ok(Engine {
            inventory,
            generators: self.generators,
            mappers: self.mappers,
            rules,
            config: self.config,
            gateway: self
                .gateway
                .unwrap_or_else(|| Arc::new(MemoryGateway::new())),
        })
    }
}

fn fail(error: CompileError, warnings: Vec<Warning>) -> CompileFailure {
    CompileFailure {
        errors: vec![error],
        warnings,
    }
}

fn ir_error(error: skyforge_ir::Error, stage: Stage) -> CompileError {
    use skyforge_ir::Error as Ir;
    let message = error.to_string();
    match error {
        Ir::MalformedIr { .. } => CompileError::new(ErrorCode::MalformedIr, stage, message),
        Ir::DuplicateNodeId { node_id } => {
            CompileError::new(ErrorCode::DuplicateNodeId, stage, message).with_node(node_id)
        }
        Ir::DanglingParent { node_id, .. } => {
            CompileError::new(ErrorCode::DanglingParent, stage, message).with_node(node_id)
        }
        Ir::DanglingEdge { .. } => CompileError::new(ErrorCode::DanglingEdge, stage, message),
        Ir::ContainmentCycle { .. } => {
            CompileError::new(ErrorCode::ContainmentCycle, stage, message)
        }
    }
}

fn validation_error(issue: ValidationIssue) -> CompileError {
    let mut error = CompileError::new(ErrorCode::SchemaViolation, Stage::Validate, issue.message);
    if let Some(node_id) = issue.node_id {
        error = error.with_node(node_id);
    }
    error
}

fn core_error(error: &skyforge_core::Error) -> CompileError {
    use skyforge_core::Error as Core;
    let message = error.to_string();
    match error {
        Core::UnknownResourceType { node_id, .. } => {
            CompileError::new(ErrorCode::UnknownResourceType, Stage::Map, message)
                .with_node(node_id.clone())
        }
        Core::Cancelled => CompileError::cancelled(Stage::Map),
        _ => CompileError::new(ErrorCode::MapperNotRegistered, Stage::Map, message),
    }
}

fn rule_error(error: RuleError) -> CompileError {
    CompileError::new(ErrorCode::RuleViolation, Stage::Rules, error.message)
        .with_resource(error.resource_id)
}

fn graph_error(error: &skyforge_graph::Error) -> CompileError {
    use skyforge_graph::Error as Graph;
    let message = error.to_string();
    match error {
        Graph::CycleDetected { .. } => {
            CompileError::new(ErrorCode::DependencyCycle, Stage::Sort, message)
        }
        Graph::UnknownResource { id } => {
            CompileError::new(ErrorCode::SchemaViolation, Stage::Sort, message)
                .with_resource(id.clone())
        }
    }
}

fn emit_error(error: &skyforge_hcl::Error) -> CompileError {
    use skyforge_hcl::Error as Hcl;
    let message = error.to_string();
    match error {
        Hcl::MissingRequiredConfig { resource_id, .. } => {
            CompileError::new(ErrorCode::MissingRequiredConfig, Stage::Emit, message)
                .with_resource(resource_id.clone())
        }
        Hcl::InvalidFieldValue { resource_id, .. } => {
            CompileError::new(ErrorCode::MissingRequiredConfig, Stage::Emit, message)
                .with_resource(resource_id.clone())
        }
        Hcl::UnsupportedResource { resource_id, .. } => {
            CompileError::new(ErrorCode::UnsupportedResource, Stage::Emit, message)
                .with_resource(resource_id.clone())
        }
        Hcl::MapperNotRegistered { .. } | Hcl::EmptyProvider | Hcl::DuplicateProvider { .. } => {
            CompileError::new(ErrorCode::MapperNotRegistered, Stage::Emit, message)
        }
        Hcl::Cancelled => CompileError::cancelled(Stage::Emit),
    }
}

fn persist_error(error: &skyforge_store::Error) -> CompileError {
    CompileError::new(
        ErrorCode::PersistenceFailure,
        Stage::Persist,
        error.to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyforge_rules::RuleProfile;

    #[test]
    fn test_builder_requires_inventory() {
        let err = Engine::builder().build().unwrap_err();
        assert!(matches!(err, BuildError::Config { .. }));
    }

    #[test]
    fn test_with_defaults_builds() {
        let engine = Engine::with_defaults().unwrap();
        assert_eq!(engine.config().provider, "aws");
        assert!(!engine.rules.is_empty());
    }

    #[test]
    fn test_duplicate_generator_rejected() {
        let result = Engine::builder()
            .generator(Arc::new(skyforge_aws::AwsGenerator::new()))
            .unwrap()
            .generator(Arc::new(skyforge_aws::AwsGenerator::new()));
        assert!(result.is_err());
    }

    #[test]
    fn test_constraint_records_override_defaults() {
        let engine = Engine::builder()
            .inventory(skyforge_aws::default_inventory().unwrap())
            .generator(Arc::new(skyforge_aws::AwsGenerator::new()))
            .unwrap()
            .mapper(Arc::new(skyforge_aws::AwsMapper::new()))
            .unwrap()
            .default_rules(skyforge_aws::default_rules(RuleProfile::Expanded))
            .constraint_records(vec![ConstraintRecord {
                resource_type: "EC2".to_string(),
                constraint_type: "RequiresParent".to_string(),
                constraint_value: "VPC".to_string(),
            }])
            .build()
            .unwrap();
        // The override replaced the default EC2 RequiresParent(Subnet) rule.
        let rules: Vec<_> = engine.rules.rules_for("EC2");
        let requires_parent = rules
            .iter()
            .find_map(|r| match r {
                Rule::RequiresParent { parent_type, .. } => Some(parent_type.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(requires_parent, "VPC");
    }
}
