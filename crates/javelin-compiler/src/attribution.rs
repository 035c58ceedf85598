//! Attribution - lazy, per-member expression typing.
//!
//! [`Attribution`] implements [`TypeResolver`] over the symbol registry. The
//! first query for an expression inside a member attributes that whole member
//! (method, constructor, initializer or field), recording a type for every
//! sub-expression it can type; later queries are table lookups.
//!
//! Typing is deliberately shallow. It knows enough Java to type receivers:
//!
//! - literals, locals and parameters (with block scoping and shadowing)
//! - fields through supertypes and enclosing types, static fields through
//!   type names, array `length`
//! - method calls by name and arity, preferring an exact signature, then an
//!   assignable one, then the first candidate
//! - `new`, casts, the conditional operator, numeric promotion with
//!   unboxing, string concatenation, comparisons and `instanceof`
//! - `var`, enhanced-for elements, lambda parameters with declared types
//!
//! Bodies of anonymous, local and member classes are not attributed.
//! Anything else is untyped and resolves to `None`.

use javelin_core::{DataType, TypeHash, primitives};
use javelin_parser::ast::{
    BinaryOp, Block, CallExpr, Expr, FieldAccessExpr, LambdaBody, LambdaExpr, LiteralKind,
    LocalVarStmt, Member, Param, Stmt, TypeBase, TypeExpr, UnaryOp,
};
use javelin_registry::{MethodSymbol, MethodType, SymbolRegistry};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::context::{CompilationContext, SourceFile};
use crate::resolution::{Site, TypeResolver};
use crate::scope::LocalScope;
use crate::type_resolver::TypeExprResolver;

type TypeTable<'ast> = FxHashMap<*const Expr<'ast>, DataType>;

/// Registry-backed [`TypeResolver`] that attributes members on demand.
pub struct Attribution<'a, 'ast> {
    registry: &'a SymbolRegistry,
    files: &'a [SourceFile<'ast>],
    /// Types keyed by expression node address.
    types: TypeTable<'ast>,
    attributed: FxHashSet<*const Member<'ast>>,
    passes: usize,
}

impl<'a, 'ast> Attribution<'a, 'ast> {
    pub fn new(registry: &'a SymbolRegistry, files: &'a [SourceFile<'ast>]) -> Self {
        Self {
            registry,
            files,
            types: FxHashMap::default(),
            attributed: FxHashSet::default(),
            passes: 0,
        }
    }

    /// Number of members attributed so far.
    pub fn pass_count(&self) -> usize {
        self.passes
    }

    /// Number of expressions with a recorded type.
    pub fn typed_count(&self) -> usize {
        self.types.len()
    }

    fn ensure_attributed(&mut self, site: &Site<'ast>, member: &'ast Member<'ast>) {
        if !self.attributed.insert(member as *const Member<'ast>) {
            return;
        }
        let Some(file) = self.files.get(site.file) else {
            return;
        };

        self.passes += 1;
        let ctx = CompilationContext::new(self.registry, &file.scope).with_owner(site.owner);
        let before = self.types.len();
        MemberAttributor {
            ctx,
            owner: site.owner,
            scope: LocalScope::new(),
            types: &mut self.types,
        }
        .member(member);

        trace!(
            owner = %self.registry.type_name(site.owner),
            typed = self.types.len() - before,
            pass = self.passes,
            "attributed member"
        );
    }
}

impl<'a, 'ast> TypeResolver<'ast> for Attribution<'a, 'ast> {
    fn resolve(&mut self, site: &Site<'ast>, expr: &'ast Expr<'ast>) -> Option<DataType> {
        if let Expr::This(_) = expr {
            return Some(DataType::simple(site.owner));
        }
        if let Some(member) = site.member {
            self.ensure_attributed(site, member);
        }
        self.types.get(&(expr as *const Expr<'ast>)).copied()
    }

    fn resolve_type(&mut self, site: &Site<'ast>, ty: &TypeExpr<'ast>) -> Option<TypeHash> {
        if ty.dims > 0 {
            return None;
        }
        let file = self.files.get(site.file)?;
        let ctx = CompilationContext::new(self.registry, &file.scope).with_owner(site.owner);
        let hash = TypeExprResolver::new(&ctx).resolve_base(ty).ok()?;
        self.registry.get(hash).map(|symbol| symbol.type_hash)
    }
}

// ============================================================================
// Member attribution
// ============================================================================

struct MemberAttributor<'t, 'a, 'ast> {
    ctx: CompilationContext<'a>,
    owner: TypeHash,
    scope: LocalScope,
    types: &'t mut TypeTable<'ast>,
}

impl<'t, 'a, 'ast> MemberAttributor<'t, 'a, 'ast> {
    fn registry(&self) -> &'a SymbolRegistry {
        self.ctx.registry()
    }

    fn member(&mut self, member: &'ast Member<'ast>) {
        match member {
            Member::Field(field) => {
                let declared = self.type_expr(&field.ty);
                for var in field.vars {
                    if let Some(init) = var.init {
                        self.typed(init, declared.map(|t| t.with_dims(var.dims)));
                    }
                }
            }
            Member::Method(method) => {
                self.ctx = self
                    .ctx
                    .clone()
                    .with_type_vars(method.type_params.iter().map(|p| p.name.name));
                self.params(method.params);
                if let Some(body) = &method.body {
                    self.block(body);
                }
            }
            Member::Constructor(ctor) => {
                self.ctx = self
                    .ctx
                    .clone()
                    .with_type_vars(ctor.type_params.iter().map(|p| p.name.name));
                self.params(ctor.params);
                self.block(&ctor.body);
            }
            Member::Initializer(init) => self.block(&init.body),
            Member::Type(_) => {}
        }
    }

    fn params(&mut self, params: &[Param<'_>]) {
        for param in params {
            let ty = self.type_expr(&param.ty);
            self.scope.declare(param.name.name, ty, param.name.span);
        }
    }

    fn type_expr(&self, ty: &TypeExpr<'_>) -> Option<DataType> {
        TypeExprResolver::new(&self.ctx).resolve(ty).ok()
    }

    // ==========================================================================
    // Statements
    // ==========================================================================

    fn block(&mut self, block: &'ast Block<'ast>) {
        self.scope.push_scope();
        for stmt in block.stmts {
            self.stmt(stmt);
        }
        self.scope.pop_scope();
    }

    /// A statement in its own scope, for bodies that are not blocks.
    fn nested(&mut self, stmt: &'ast Stmt<'ast>) {
        self.scope.push_scope();
        self.stmt(stmt);
        self.scope.pop_scope();
    }

    fn stmt(&mut self, stmt: &'ast Stmt<'ast>) {
        match stmt {
            Stmt::Block(block) => self.block(block),
            Stmt::LocalVar(decl) => self.local_var(decl),
            Stmt::LocalClass(_) | Stmt::Break(_) | Stmt::Continue(_) | Stmt::Empty(_) => {}
            Stmt::Expr(s) => {
                self.expr(s.expr);
            }
            Stmt::If(s) => {
                self.expr(s.condition);
                self.nested(&s.then_stmt);
                if let Some(else_stmt) = &s.else_stmt {
                    self.nested(else_stmt);
                }
            }
            Stmt::While(s) => {
                self.expr(s.condition);
                self.nested(&s.body);
            }
            Stmt::DoWhile(s) => {
                self.nested(&s.body);
                self.expr(s.condition);
            }
            Stmt::For(s) => {
                self.scope.push_scope();
                for init in s.init {
                    self.stmt(init);
                }
                if let Some(condition) = s.condition {
                    self.expr(condition);
                }
                for update in s.update {
                    self.expr(update);
                }
                self.nested(&s.body);
                self.scope.pop_scope();
            }
            Stmt::ForEach(s) => {
                self.scope.push_scope();
                let iterable = self.expr(s.iterable);
                let element = match s.ty.base {
                    TypeBase::Var => iterable.filter(DataType::is_array).map(|t| t.element()),
                    _ => self.type_expr(&s.ty),
                };
                self.scope.declare(s.name.name, element, s.name.span);
                self.nested(&s.body);
                self.scope.pop_scope();
            }
            Stmt::Return(s) => {
                if let Some(value) = s.value {
                    self.expr(value);
                }
            }
            Stmt::Throw(s) => {
                self.expr(s.expr);
            }
            Stmt::Try(s) => {
                self.scope.push_scope();
                for resource in s.resources {
                    self.stmt(resource);
                }
                self.block(&s.body);
                self.scope.pop_scope();

                for catch in s.catches {
                    self.scope.push_scope();
                    // Multi-catch parameters take the first alternative.
                    let ty = catch.types.first().and_then(|t| self.type_expr(t));
                    self.scope.declare(catch.name.name, ty, catch.name.span);
                    self.block(&catch.body);
                    self.scope.pop_scope();
                }
                if let Some(finally) = &s.finally {
                    self.block(finally);
                }
            }
            Stmt::Switch(s) => {
                self.expr(s.selector);
                self.scope.push_scope();
                for case in s.cases {
                    for label in case.labels {
                        self.expr(label);
                    }
                    for stmt in case.body {
                        self.stmt(stmt);
                    }
                }
                self.scope.pop_scope();
            }
            Stmt::Synchronized(s) => {
                self.expr(s.lock);
                self.block(&s.body);
            }
            Stmt::Labeled(s) => self.stmt(&s.body),
            Stmt::Assert(s) => {
                self.expr(s.condition);
                if let Some(message) = s.message {
                    self.expr(message);
                }
            }
        }
    }

    fn local_var(&mut self, decl: &'ast LocalVarStmt<'ast>) {
        let inferred = matches!(decl.ty.base, TypeBase::Var);
        let declared = if inferred { None } else { self.type_expr(&decl.ty) };

        for var in decl.vars {
            let ty = declared.map(|t| t.with_dims(var.dims));
            let init = var.init.and_then(|init| self.typed(init, ty));
            let ty = if inferred { init } else { ty };
            self.scope.declare(var.name.name, ty, var.name.span);
        }
    }

    // ==========================================================================
    // Expressions
    // ==========================================================================

    fn expr(&mut self, expr: &'ast Expr<'ast>) -> Option<DataType> {
        self.typed(expr, None)
    }

    /// Type `expr` and record the result. `expected` only matters for array
    /// initializers, which take their type from the declaration.
    fn typed(&mut self, expr: &'ast Expr<'ast>, expected: Option<DataType>) -> Option<DataType> {
        let ty = self.compute(expr, expected);
        if let Some(ty) = ty {
            self.types.insert(expr as *const Expr<'ast>, ty);
        }
        ty
    }

    fn compute(&mut self, expr: &'ast Expr<'ast>, expected: Option<DataType>) -> Option<DataType> {
        match *expr {
            Expr::Literal(literal) => Some(literal_type(&literal.kind)),
            Expr::Ident(ident) => self.name_value(ident.name),
            Expr::This(_) => Some(DataType::simple(self.owner)),
            Expr::Super(_) => self
                .registry()
                .get(self.owner)
                .and_then(|symbol| symbol.superclass)
                .map(DataType::simple),
            Expr::FieldAccess(access) => self.field_access(access),
            Expr::Call(call) => self.call(call),
            Expr::New(new) => {
                for arg in new.args {
                    self.expr(arg);
                }
                self.type_expr(&new.ty)
            }
            Expr::NewArray(array) => {
                for dim in array.dim_exprs {
                    self.expr(dim);
                }
                let ty = self.type_expr(&array.ty);
                if let Some(init) = array.init {
                    self.array_elements(init.elements, ty);
                }
                ty
            }
            Expr::ArrayInit(init) => {
                self.array_elements(init.elements, expected);
                expected.filter(DataType::is_array)
            }
            Expr::Index(index) => {
                let target = self.expr(index.target);
                self.expr(index.index);
                target.filter(DataType::is_array).map(|t| t.element())
            }
            Expr::Unary(unary) => {
                let operand = self.expr(unary.operand);
                match unary.op {
                    UnaryOp::LogicalNot => Some(DataType::simple(primitives::BOOLEAN)),
                    UnaryOp::PreInc | UnaryOp::PreDec => operand,
                    UnaryOp::Neg | UnaryOp::Plus | UnaryOp::BitwiseNot => {
                        operand.and_then(unary_promote)
                    }
                }
            }
            Expr::Binary(binary) => {
                let left = self.expr(binary.left);
                let right = self.expr(binary.right);
                binary_type(binary.op, left, right)
            }
            Expr::InstanceOf(test) => {
                self.expr(test.expr);
                if let Some(binding) = test.binding {
                    let ty = self.type_expr(&test.ty);
                    self.scope.declare(binding.name, ty, binding.span);
                }
                Some(DataType::simple(primitives::BOOLEAN))
            }
            Expr::Assign(assign) => {
                let target = self.expr(assign.target);
                self.typed(assign.value, target);
                target
            }
            Expr::Ternary(ternary) => {
                self.expr(ternary.condition);
                let then_ty = self.expr(ternary.then_expr);
                let else_ty = self.expr(ternary.else_expr);
                self.conditional(then_ty?, else_ty?)
            }
            Expr::Cast(cast) => {
                self.expr(cast.expr);
                self.type_expr(&cast.ty)
            }
            Expr::Postfix(postfix) => self.expr(postfix.operand),
            Expr::Paren(paren) => self.typed(paren.expr, expected),
            Expr::ClassLit(_) => Some(DataType::simple(primitives::CLASS)),
            Expr::Lambda(lambda) => {
                self.lambda(lambda);
                None
            }
            Expr::MethodRef(method_ref) => {
                self.expr(method_ref.target);
                None
            }
        }
    }

    fn array_elements(&mut self, elements: &'ast [&'ast Expr<'ast>], array: Option<DataType>) {
        let element = array.filter(DataType::is_array).map(|t| t.element());
        for expr in elements {
            self.typed(expr, element);
        }
    }

    /// A simple name used as a value: local, then field of an enclosing type.
    fn name_value(&self, name: &str) -> Option<DataType> {
        if self.scope.is_declared(name) {
            return self.scope.type_of(name);
        }
        let registry = self.registry();
        self.ctx
            .enclosing_types()
            .into_iter()
            .find_map(|owner| registry.find_field(owner, name))
            .map(|field| field.ty)
    }

    /// The type named by a name or field-access chain, unless it is a value.
    fn type_name(&self, expr: &Expr<'_>) -> Option<TypeHash> {
        if let Expr::Ident(ident) = expr
            && self.scope.is_declared(ident.name)
        {
            return None;
        }
        let dotted = expr.dotted_name()?;
        let segments: Vec<&str> = dotted.split('.').collect();
        self.ctx.resolve_type_name(&segments)
    }

    fn field_access(&mut self, access: &'ast FieldAccessExpr<'ast>) -> Option<DataType> {
        let name = access.name.name;
        let owner = match self.expr(access.target) {
            Some(target) if target.is_array() => {
                return (name == "length").then_some(DataType::simple(primitives::INT));
            }
            Some(target) => target.type_hash,
            None => self.type_name(access.target)?,
        };
        self.registry().find_field(owner, name).map(|field| field.ty)
    }

    fn call(&mut self, call: &'ast CallExpr<'ast>) -> Option<DataType> {
        match *call.callee {
            Expr::This(_) | Expr::Super(_) => {
                self.args(call.args);
                Some(DataType::void())
            }
            Expr::Ident(ident) => {
                let args = self.args(call.args);
                let registry = self.registry();
                // The innermost type declaring the name wins.
                for owner in self.ctx.enclosing_types() {
                    let candidates = registry.find_methods(owner, ident.name);
                    if !candidates.is_empty() {
                        return self.select(candidates, &args);
                    }
                }
                None
            }
            Expr::FieldAccess(access) => {
                let receiver = match self.expr(access.target) {
                    Some(target) if target.is_array() => Some(primitives::OBJECT),
                    Some(target) if target.is_primitive() => None,
                    Some(target) => Some(target.type_hash),
                    None => self.type_name(access.target),
                };
                let args = self.args(call.args);
                let candidates = self.registry().find_methods(receiver?, access.name.name);
                self.select(candidates, &args)
            }
            _ => {
                self.expr(call.callee);
                self.args(call.args);
                None
            }
        }
    }

    fn args(&mut self, args: &'ast [&'ast Expr<'ast>]) -> Vec<Option<DataType>> {
        args.iter().map(|arg| self.expr(arg)).collect()
    }

    /// Pick an overload: exact match, then assignable, then the first that
    /// takes this many arguments.
    fn select(&self, candidates: Vec<&MethodSymbol>, args: &[Option<DataType>]) -> Option<DataType> {
        let applicable: Vec<&MethodType> = candidates
            .into_iter()
            .map(MethodSymbol::signature)
            .filter(|sig| sig.accepts_arity(args.len()))
            .collect();

        let exact = applicable.iter().find(|sig| {
            !sig.varargs
                && sig
                    .params
                    .iter()
                    .zip(args)
                    .all(|(param, arg)| *arg == Some(*param))
        });
        let assignable = || {
            applicable
                .iter()
                .find(|sig| args.iter().enumerate().all(|(i, arg)| self.accepts(sig, i, *arg)))
        };

        exact
            .or_else(assignable)
            .or(applicable.first())
            .map(|sig| sig.return_type)
    }

    /// Whether argument `index` of a call fits `sig`.
    fn accepts(&self, sig: &MethodType, index: usize, arg: Option<DataType>) -> bool {
        let Some(last) = sig.params.len().checked_sub(1) else {
            return false;
        };
        if sig.varargs && index >= last {
            let array = sig.params[last];
            return self.assignable(arg, array.element())
                || (index == last && self.assignable(arg, array));
        }
        sig.params
            .get(index)
            .is_some_and(|param| self.assignable(arg, *param))
    }

    fn assignable(&self, arg: Option<DataType>, param: DataType) -> bool {
        let Some(arg) = arg else {
            return true;
        };
        if arg == param {
            return true;
        }
        if arg == DataType::null() {
            return !param.is_primitive();
        }
        if param.is_primitive() {
            return unboxed(arg).is_some_and(|a| widens(a.type_hash, param.type_hash));
        }
        if arg.is_primitive() {
            return boxed(arg.type_hash)
                .is_some_and(|b| self.registry().is_subtype(b, param.type_hash) && param.dims == 0);
        }
        if param == DataType::simple(primitives::OBJECT) {
            return true;
        }
        arg.dims == param.dims && self.registry().is_subtype(arg.type_hash, param.type_hash)
    }

    fn conditional(&self, a: DataType, b: DataType) -> Option<DataType> {
        if a == b || b == DataType::null() {
            return Some(a);
        }
        if a == DataType::null() {
            return Some(b);
        }
        if let (Some(x), Some(y)) = (unboxed(a), unboxed(b))
            && let Some(promoted) = binary_promote(x, y)
        {
            return Some(promoted);
        }
        let registry = self.registry();
        if a.dims == b.dims && registry.is_subtype(a.type_hash, b.type_hash) {
            Some(b)
        } else if a.dims == b.dims && registry.is_subtype(b.type_hash, a.type_hash) {
            Some(a)
        } else {
            Some(DataType::simple(primitives::OBJECT))
        }
    }

    fn lambda(&mut self, lambda: &'ast LambdaExpr<'ast>) {
        self.scope.push_scope();
        for param in lambda.params {
            let ty = param.ty.as_ref().and_then(|t| self.type_expr(t));
            self.scope.declare(param.name.name, ty, param.name.span);
        }
        match &lambda.body {
            LambdaBody::Expr(body) => {
                self.expr(body);
            }
            LambdaBody::Block(block) => self.block(block),
        }
        self.scope.pop_scope();
    }
}

// ============================================================================
// Primitive typing rules
// ============================================================================

const BOXES: [(TypeHash, TypeHash); 8] = [
    (primitives::BOOLEAN, TypeHash::from_name("java.lang.Boolean")),
    (primitives::BYTE, TypeHash::from_name("java.lang.Byte")),
    (primitives::SHORT, TypeHash::from_name("java.lang.Short")),
    (primitives::CHAR, TypeHash::from_name("java.lang.Character")),
    (primitives::INT, TypeHash::from_name("java.lang.Integer")),
    (primitives::LONG, TypeHash::from_name("java.lang.Long")),
    (primitives::FLOAT, TypeHash::from_name("java.lang.Float")),
    (primitives::DOUBLE, TypeHash::from_name("java.lang.Double")),
];

fn boxed(primitive: TypeHash) -> Option<TypeHash> {
    BOXES.iter().find(|(p, _)| *p == primitive).map(|(_, b)| *b)
}

/// The primitive behind `ty`: itself if primitive, its unboxed form if a box.
fn unboxed(ty: DataType) -> Option<DataType> {
    if ty.is_primitive() {
        return Some(ty);
    }
    if ty.dims > 0 {
        return None;
    }
    BOXES
        .iter()
        .find(|(_, b)| *b == ty.type_hash)
        .map(|(p, _)| DataType::simple(*p))
}

/// Primitive widening, identity included.
fn widens(from: TypeHash, to: TypeHash) -> bool {
    if from == to {
        return true;
    }
    if to == primitives::CHAR {
        return false;
    }
    match (primitives::numeric_rank(from), primitives::numeric_rank(to)) {
        (Some(f), Some(t)) => f < t,
        _ => false,
    }
}

fn literal_type(kind: &LiteralKind<'_>) -> DataType {
    DataType::simple(match kind {
        LiteralKind::Int(_) => primitives::INT,
        LiteralKind::Long(_) => primitives::LONG,
        LiteralKind::Float(_) => primitives::FLOAT,
        LiteralKind::Double(_) => primitives::DOUBLE,
        LiteralKind::Char(_) => primitives::CHAR,
        LiteralKind::String(_) => primitives::STRING,
        LiteralKind::Bool(_) => primitives::BOOLEAN,
        LiteralKind::Null => primitives::NULL,
    })
}

const INT_RANK: u8 = 3;

fn unary_promote(ty: DataType) -> Option<DataType> {
    let ty = unboxed(ty)?;
    let rank = primitives::numeric_rank(ty.type_hash)?;
    Some(if rank <= INT_RANK {
        DataType::simple(primitives::INT)
    } else {
        ty
    })
}

fn binary_promote(a: DataType, b: DataType) -> Option<DataType> {
    let ra = primitives::numeric_rank(a.type_hash)?;
    let rb = primitives::numeric_rank(b.type_hash)?;
    Some(if ra.max(rb) <= INT_RANK {
        DataType::simple(primitives::INT)
    } else if ra >= rb {
        a
    } else {
        b
    })
}

fn binary_type(op: BinaryOp, left: Option<DataType>, right: Option<DataType>) -> Option<DataType> {
    let boolean = DataType::simple(primitives::BOOLEAN);
    if op.is_logical() || op.is_comparison() {
        return Some(boolean);
    }
    let string = DataType::simple(primitives::STRING);
    if op == BinaryOp::Add && (left == Some(string) || right == Some(string)) {
        return Some(string);
    }

    let left = unboxed(left?)?;
    if op.is_shift() {
        return unary_promote(left);
    }
    let right = unboxed(right?)?;
    if matches!(op, BinaryOp::BitwiseAnd | BinaryOp::BitwiseOr | BinaryOp::BitwiseXor)
        && left == boolean
        && right == boolean
    {
        return Some(boolean);
    }
    binary_promote(left, right)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::passes::RegistrationPass;
    use crate::prelude::register_prelude;
    use bumpalo::Bump;
    use javelin_parser::Parser;
    use javelin_parser::ast::{MethodDecl, TypeDecl};

    struct Fixture<'ast> {
        registry: SymbolRegistry,
        files: Vec<SourceFile<'ast>>,
    }

    fn fixture<'ast>(arena: &'ast Bump, source: &str) -> Fixture<'ast> {
        let mut registry = SymbolRegistry::new();
        register_prelude(arena, &mut registry).unwrap();
        let unit = Parser::parse(source, arena).unwrap();
        let files = vec![SourceFile::new("Test.java", unit)];
        let output = RegistrationPass::new(&mut registry).run(&files);
        assert!(output.is_success());
        Fixture { registry, files }
    }

    fn class<'ast>(fixture: &Fixture<'ast>) -> &'ast TypeDecl<'ast> {
        fixture.files[0].unit.types[0]
    }

    fn method<'ast>(decl: &'ast TypeDecl<'ast>, name: &str) -> (&'ast Member<'ast>, &'ast MethodDecl<'ast>) {
        decl.members
            .iter()
            .find_map(|m| match m {
                Member::Method(method) if method.name.name == name => Some((m, *method)),
                _ => None,
            })
            .unwrap()
    }

    fn site<'ast>(fixture: &Fixture<'ast>, member: &'ast Member<'ast>) -> Site<'ast> {
        let decl = class(fixture);
        let owner = TypeHash::from_name(&format!("{}.{}", fixture.files[0].scope.package(), decl.name.name));
        Site::new(0, owner).in_member(member)
    }

    /// The receiver of the call in expression statement `index` of `name`.
    fn receiver<'ast>(decl: &'ast TypeDecl<'ast>, name: &str, index: usize) -> &'ast Expr<'ast> {
        let (_, method) = method(decl, name);
        match &method.body.as_ref().unwrap().stmts[index] {
            Stmt::Expr(s) => s.expr.as_call().and_then(|c| c.qualifier()).unwrap(),
            other => panic!("not an expression statement: {other:?}"),
        }
    }

    const SOURCE: &str = r#"
        package app;

        import java.util.List;

        class Demo {
            String name;
            int[] counts;
            static final String PREFIX = "p";

            void locals(String s, List<String> list) {
                s.trim();
                list.size();
                name.trim();
                PREFIX.trim();
                this.name.trim();
                counts.clone();
            }

            void expressions(int i, long l, Integer boxed) {
                var v = "text";
                v.trim();
                (i + l).foo();
                (boxed + 1).foo();
                ("a" + i).foo();
                (i < 2).foo();
                ((Object) v).foo();
                s().trim();
                System.out.println();
                counts[0].foo();
                (i > 0 ? "a" : null).trim();
            }

            void loops(String[] names) {
                for (String n : names) { n.trim(); }
                for (var n : names) { n.trim(); }
                { int n = 1; }
                undefined.trim();
            }

            String s() { return name; }
        }
    "#;

    #[test]
    fn receivers_of_locals_fields_and_statics() {
        let arena = Bump::new();
        let fx = fixture(&arena, SOURCE);
        let decl = class(&fx);
        let (member, _) = method(decl, "locals");
        let site = site(&fx, member);
        let mut attribution = Attribution::new(&fx.registry, &fx.files);

        let string = Some(DataType::simple(primitives::STRING));
        assert_eq!(attribution.resolve(&site, receiver(decl, "locals", 0)), string);
        assert_eq!(
            attribution.resolve(&site, receiver(decl, "locals", 1)),
            Some(DataType::simple(TypeHash::from_name("java.util.List")))
        );
        assert_eq!(attribution.resolve(&site, receiver(decl, "locals", 2)), string);
        assert_eq!(attribution.resolve(&site, receiver(decl, "locals", 3)), string);
        assert_eq!(attribution.resolve(&site, receiver(decl, "locals", 4)), string);
        assert_eq!(
            attribution.resolve(&site, receiver(decl, "locals", 5)),
            Some(DataType::array(primitives::INT, 1))
        );
        assert_eq!(attribution.pass_count(), 1);
    }

    #[test]
    fn receivers_of_compound_expressions() {
        let arena = Bump::new();
        let fx = fixture(&arena, SOURCE);
        let decl = class(&fx);
        let (member, _) = method(decl, "expressions");
        let site = site(&fx, member);
        let mut attribution = Attribution::new(&fx.registry, &fx.files);
        let mut at = |i| attribution.resolve(&site, receiver(decl, "expressions", i)).map(|t| t.type_hash);

        assert_eq!(at(1), Some(primitives::STRING));
        assert_eq!(at(2), Some(primitives::LONG));
        assert_eq!(at(3), Some(primitives::INT));
        assert_eq!(at(4), Some(primitives::STRING));
        assert_eq!(at(5), Some(primitives::BOOLEAN));
        assert_eq!(at(6), Some(primitives::OBJECT));
        assert_eq!(at(7), Some(primitives::STRING));
        assert_eq!(at(8), Some(TypeHash::from_name("java.io.PrintStream")));
        assert_eq!(at(9), Some(primitives::INT));
        assert_eq!(at(10), Some(primitives::STRING));
    }

    #[test]
    fn scoping_and_unknown_names() {
        let arena = Bump::new();
        let fx = fixture(&arena, SOURCE);
        let decl = class(&fx);
        let (member, method) = method(decl, "loops");
        let site = site(&fx, member);
        let mut attribution = Attribution::new(&fx.registry, &fx.files);

        let body = method.body.as_ref().unwrap();
        for index in [0, 1] {
            let Stmt::ForEach(each) = &body.stmts[index] else { panic!() };
            let Stmt::Block(block) = &each.body else { panic!() };
            let Stmt::Expr(s) = &block.stmts[0] else { panic!() };
            let receiver = s.expr.as_call().unwrap().qualifier().unwrap();
            assert_eq!(
                attribution.resolve(&site, receiver),
                Some(DataType::simple(primitives::STRING))
            );
        }
        assert_eq!(attribution.resolve(&site, receiver(decl, "loops", 3)), None);
    }

    #[test]
    fn synthesized_this_resolves_to_owner_without_a_pass() {
        let arena = Bump::new();
        let fx = fixture(&arena, SOURCE);
        let decl = class(&fx);
        let (member, _) = method(decl, "locals");
        let site = site(&fx, member);
        let mut attribution = Attribution::new(&fx.registry, &fx.files);

        let this = arena.alloc(Expr::This(javelin_core::Span::default()));
        assert_eq!(
            attribution.resolve(&site, this),
            Some(DataType::simple(TypeHash::from_name("app.Demo")))
        );
        assert_eq!(attribution.pass_count(), 0);
    }

    #[test]
    fn resolve_type_names_classes_only() {
        let arena = Bump::new();
        let fx = fixture(&arena, SOURCE);
        let site = Site::new(0, TypeHash::from_name("app.Demo"));
        let mut attribution = Attribution::new(&fx.registry, &fx.files);

        let list = Parser::type_expr("List", &arena).unwrap();
        assert_eq!(
            attribution.resolve_type(&site, &list),
            Some(TypeHash::from_name("java.util.List"))
        );
        let int = Parser::type_expr("int", &arena).unwrap();
        assert_eq!(attribution.resolve_type(&site, &int), None);
        let array = Parser::type_expr("String[]", &arena).unwrap();
        assert_eq!(attribution.resolve_type(&site, &array), None);
    }

    #[test]
    fn promotion_rules() {
        let int = DataType::simple(primitives::INT);
        let byte = DataType::simple(primitives::BYTE);
        let double = DataType::simple(primitives::DOUBLE);
        assert_eq!(binary_type(BinaryOp::Add, Some(byte), Some(byte)), Some(int));
        assert_eq!(binary_type(BinaryOp::Mul, Some(int), Some(double)), Some(double));
        assert_eq!(binary_type(BinaryOp::ShiftLeft, Some(byte), Some(double)), Some(int));
        assert_eq!(binary_type(BinaryOp::Add, None, Some(int)), None);
        assert!(widens(primitives::INT, primitives::LONG));
        assert!(!widens(primitives::LONG, primitives::INT));
        assert!(!widens(primitives::BYTE, primitives::CHAR));
    }
}
