//! Query assembler.
//!
//! Wraps the compiled filter in the outer statement: type membership,
//! DISTINCT entity rows (or a count), sort joins, and pagination.

use crate::ast::{JoinKind, Path, PathStep, QueryRequest, SortKey, SortOrder, SqlType, Value};
use crate::config::{CompilerOptions, LayoutConfig};
use crate::error::{EavError, EavResult};
use crate::schema::Metadata;
use crate::transpiler::CompileContext;
use crate::transpiler::conditions::{Condition, ParamContext};
use crate::transpiler::dialect::Dialect;
use crate::transpiler::joins::{JoinTarget, resolve_path, slot_info};
use crate::transpiler::predicates::compile_predicate;
use crate::transpiler::query::{
    ColumnRef, FilterQuery, Projection, RenderContext, SelectQuery, TableAlias,
};
use crate::transpiler::traits::SqlGenerator;

/// SQL text plus its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledQuery {
    pub sql: String,
    /// Bound values in placeholder order.
    pub params: Vec<Value>,
    /// SQL type of each bound value.
    pub param_types: Vec<SqlType>,
}

/// Compiles [`QueryRequest`]s against one metadata source and SQL dialect.
///
/// A compiler holds no per-call state; share it freely across threads.
///
/// # Example
/// ```
/// use eavql::prelude::*;
/// use eavql::ast::builders::gt;
///
/// let mut schema = Schema::new();
/// schema
///     .entity("Person", 1, &[])
///     .add_slot(QualifiedName::new("Person", "age"), SlotInfo::new("T_AGE", 0));
///
/// let compiler = Compiler::new(&schema, Dialect::SQLite);
/// let age = Path::property(QualifiedName::new("Person", "age"));
/// let query = compiler
///     .compile(&QueryRequest::new("Person").filter(gt(age, 30)))
///     .unwrap();
/// assert_eq!(query.params, vec![Value::Int(30)]);
/// ```
pub struct Compiler<'m> {
    metadata: &'m dyn Metadata,
    generator: Box<dyn SqlGenerator>,
    layout: LayoutConfig,
    options: CompilerOptions,
}

impl<'m> Compiler<'m> {
    pub fn new(metadata: &'m dyn Metadata, dialect: Dialect) -> Self {
        Self::with_generator(metadata, dialect.generator())
    }

    /// Use a caller-supplied SQL grammar.
    pub fn with_generator(metadata: &'m dyn Metadata, generator: Box<dyn SqlGenerator>) -> Self {
        Self {
            metadata,
            generator,
            layout: LayoutConfig::default(),
            options: CompilerOptions::default(),
        }
    }

    pub fn with_layout(mut self, layout: LayoutConfig) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_options(mut self, options: CompilerOptions) -> Self {
        self.options = options;
        self
    }

    /// Compile a request into one SQL statement.
    pub fn compile(&self, request: &QueryRequest) -> EavResult<CompiledQuery> {
        let type_ids = self.metadata.assignable_type_ids(&request.result_type);
        if type_ids.is_empty() {
            return Err(EavError::UnknownResultType(request.result_type.clone()));
        }

        let ctx = CompileContext {
            metadata: self.metadata,
            generator: self.generator.as_ref(),
            layout: &self.layout,
            options: &self.options,
            type_ids,
        };

        let filter = request
            .predicate
            .as_ref()
            .map(|predicate| compile_predicate(&ctx, predicate, false))
            .transpose()?;
        let outer = assemble(&ctx, request, filter)?;

        let render = RenderContext { generator: ctx.generator, layout: ctx.layout };
        let mut params = ParamContext::new();
        let sql = outer.to_sql(&render, &mut params);

        tracing::debug!(
            result_type = %request.result_type,
            dialect = ctx.generator.name(),
            type_ids = ctx.type_ids.len(),
            params = params.params.len(),
            count_only = request.count_only,
            "compiled query"
        );

        Ok(CompiledQuery { sql, params: params.params, param_types: params.types })
    }

    /// Compile and append the bound values and their types to caller lists.
    ///
    /// Nothing is appended when compilation fails.
    pub fn compile_into(
        &self,
        request: &QueryRequest,
        values: &mut Vec<Value>,
        types: &mut Vec<SqlType>,
    ) -> EavResult<String> {
        let compiled = self.compile(request)?;
        values.extend(compiled.params);
        types.extend(compiled.param_types);
        Ok(compiled.sql)
    }
}

fn assemble(
    ctx: &CompileContext<'_>,
    request: &QueryRequest,
    filter: Option<FilterQuery>,
) -> EavResult<SelectQuery> {
    let layout = ctx.layout;
    let pk = ColumnRef::new(TableAlias::ROOT, &layout.entity_pk_column);

    let projection = if request.count_only {
        Projection::Count
    } else {
        Projection::Entities { extra: Vec::new() }
    };
    let mut outer = SelectQuery::new(projection, layout, &ctx.type_ids);
    if let Some(filter) = filter {
        outer.filter(Condition::InQuery { column: pk.clone(), query: Box::new(filter) });
    }

    // A count ignores ordering and windows.
    if request.count_only {
        return Ok(outer);
    }

    let mut extra = Vec::new();
    for order in &request.order_by {
        let column = match &order.key {
            SortKey::Identity => ColumnRef::new(TableAlias::ROOT, &layout.entity_identity_column),
            SortKey::Path(path) => {
                check_sortable(ctx, path)?;
                let resolved =
                    resolve_path(ctx, &mut outer, path, JoinKind::Left, JoinTarget::Entity)?;
                let column = resolved.value_column(ctx);
                // DISTINCT requires sort expressions in the select list.
                extra.push(column.clone());
                column
            }
        };
        outer.order_by.push((column, order.order));
    }

    if !outer.order_by.is_empty() || request.limit.is_some() || request.offset.is_some() {
        outer.order_by.push((pk, SortOrder::Asc));
    }

    outer.projection = Projection::Entities { extra };
    outer.limit = request.limit;
    outer.offset = request.offset;
    Ok(outer)
}

/// Sorting through a multi-valued hop would repeat entities.
fn check_sortable(ctx: &CompileContext<'_>, path: &Path) -> EavResult<()> {
    for step in path.steps() {
        let many = matches!(step, PathStep::ManyAssociation(_))
            || slot_info(ctx, step.name())?.is_collection();
        if many {
            return Err(EavError::unsupported(
                "order_by",
                format!("'{}' is multi-valued and cannot be sorted on", step.name()),
            ));
        }
    }
    Ok(())
}
