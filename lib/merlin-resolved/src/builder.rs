//! Programmatic construction of resolved programs.
//!
//! The builder plays the role of the resolver for tools and tests: names are
//! bound to declarations as they are written, and every node receives a span
//! taken from a monotonically increasing cursor, so construction order is
//! source order.
//!
//! ```
//! use merlin_resolved::*;
//!
//! let p = ProgramBuilder::new();
//! let lib = p.library("main");
//! let foo = p.class(lib, "Foo");
//! let bar = p.class(lib, "Bar");
//! p.implements(bar, &["Foo", "Foo"]);
//! let program = p.finish();
//! assert_eq!(program.class(bar).unwrap().interfaces.len(), 2);
//! # let _ = foo;
//! ```

use std::cell::{Cell, RefCell};

use merlin_span::{SourceId, Span};

use crate::decl::*;
use crate::expr::*;
use crate::ids::{ClassId, ConstructorId, LibraryId, TypedefId, VariableId};
use crate::program::Program;
use crate::stmt::*;
use crate::types::{Ident, TypeName, TypeTarget};

pub struct ProgramBuilder {
    program: RefCell<Program>,
    next_source: Cell<u32>,
    cursor: Cell<usize>,
    current_source: Cell<SourceId>,
}

impl ProgramBuilder {
    pub fn new() -> Self {
        Self {
            program: RefCell::new(Program::new()),
            next_source: Cell::new(0),
            cursor: Cell::new(0),
            current_source: Cell::new(SourceId(0)),
        }
    }

    pub fn finish(self) -> Program {
        self.program.into_inner()
    }

    /// Read access to the program under construction.
    pub fn with_program<R>(&self, f: impl FnOnce(&Program) -> R) -> R {
        f(&self.program.borrow())
    }

    // ----- spans -------------------------------------------------------

    /// Allocate the next span in the current unit.
    pub fn span(&self, len: usize) -> Span {
        let start = self.cursor.get();
        self.cursor.set(start + len.max(1) + 1);
        Span::new(self.current_source.get(), start, len.max(1))
    }

    pub fn ident(&self, name: &str) -> Ident {
        Ident::new(name, self.span(name.len()))
    }

    /// Switch the unit that receives subsequent spans and declarations.
    pub fn enter_unit(&self, source: SourceId) {
        self.current_source.set(source);
    }

    fn fresh_source(&self) -> SourceId {
        let id = SourceId(self.next_source.get());
        self.next_source.set(id.0 + 1);
        id
    }

    // ----- libraries and units -----------------------------------------

    pub fn library(&self, name: &str) -> LibraryId {
        self.library_with(name, false)
    }

    pub fn internal_library(&self, name: &str) -> LibraryId {
        self.library_with(name, true)
    }

    fn library_with(&self, name: &str, is_internal: bool) -> LibraryId {
        let source = self.fresh_source();
        self.enter_unit(source);
        let unit = CompilationUnit {
            source,
            path: format!("{name}.src"),
            directives: Vec::new(),
            declarations: Vec::new(),
        };
        self.program.borrow_mut().libraries.alloc(Library {
            name: name.to_string(),
            uri: name.to_string(),
            is_internal,
            units: vec![unit],
        })
    }

    /// Add a part unit to `library` and make it current.
    pub fn part_unit(&self, library: LibraryId, path: &str) -> SourceId {
        let source = self.fresh_source();
        self.enter_unit(source);
        if let Some(lib) = self.program.borrow_mut().libraries.get_mut(library) {
            lib.units.push(CompilationUnit {
                source,
                path: path.to_string(),
                directives: Vec::new(),
                declarations: Vec::new(),
            });
        }
        source
    }

    pub fn library_uri(&self, library: LibraryId) -> String {
        self.with_program(|p| p.library(library).map(|l| l.uri.clone()).unwrap_or_default())
    }

    pub fn directive(&self, library: LibraryId, spec: DirectiveSpec) {
        let text = match (spec.uri, spec.target) {
            (Some(text), _) => text,
            (None, UriTarget::Library(target)) => self.library_uri(target),
            (None, _) => "unknown".to_string(),
        };
        let prefix = spec.prefix.map(|p| self.ident(&p));
        let combinators = spec
            .combinators
            .into_iter()
            .map(|(show, names)| {
                let names = names.iter().map(|n| self.ident(n)).collect();
                if show {
                    Combinator::Show(names)
                } else {
                    Combinator::Hide(names)
                }
            })
            .collect();
        let kind = match spec.kind {
            SpecDirective::Import => DirectiveKind::Import {
                prefix,
                combinators,
            },
            SpecDirective::Export => DirectiveKind::Export { combinators },
            SpecDirective::Part => DirectiveKind::Part,
        };
        let uri = UriReference {
            span: self.span(text.len() + 2),
            text,
            interpolated: spec.interpolated,
            target: spec.target,
        };
        let directive = Directive {
            span: uri.span,
            kind,
            uri,
        };
        if let Some(unit) = self
            .program
            .borrow_mut()
            .libraries
            .get_mut(library)
            .and_then(|lib| lib.units.first_mut())
        {
            unit.directives.push(directive);
        }
    }

    /// `import 'target';`
    pub fn import(&self, library: LibraryId, target: LibraryId) {
        self.directive(library, DirectiveSpec::import(UriTarget::Library(target)));
    }

    /// `export 'target';`
    pub fn export(&self, library: LibraryId, target: LibraryId) {
        self.directive(library, DirectiveSpec::export(UriTarget::Library(target)));
    }

    fn declare(&self, library: LibraryId, declaration: Declaration) {
        if let Some(unit) = self
            .program
            .borrow_mut()
            .libraries
            .get_mut(library)
            .and_then(|lib| lib.units.last_mut())
        {
            unit.declarations.push(declaration);
        }
    }

    // ----- types -------------------------------------------------------

    /// A type reference resolved by name against what has been declared so far.
    pub fn ty(&self, name: &str) -> TypeName {
        let target = self.resolve_type(name);
        self.ty_as(name, target)
    }

    pub fn ty_as(&self, name: &str, target: TypeTarget) -> TypeName {
        TypeName {
            name: name.to_string(),
            span: self.span(name.len()),
            target,
            arguments: Vec::new(),
        }
    }

    pub fn generic_ty(&self, name: &str, arguments: &[&str]) -> TypeName {
        let mut ty = self.ty(name);
        ty.arguments = arguments.iter().map(|a| self.ty(a)).collect();
        ty
    }

    fn resolve_type(&self, name: &str) -> TypeTarget {
        match name {
            "dynamic" => return TypeTarget::Dynamic,
            "void" => return TypeTarget::Void,
            _ => {}
        }
        let program = self.program.borrow();
        if let Some((id, _)) = program.classes.iter().find(|(_, c)| c.name.name == name) {
            return TypeTarget::Class(id);
        }
        if let Some((id, _)) = program.typedefs.iter().find(|(_, t)| t.name.name == name) {
            return TypeTarget::Typedef(id);
        }
        let is_type_parameter = program
            .classes
            .iter()
            .any(|(_, c)| c.type_parameters.iter().any(|t| t.name == name))
            || program
                .typedefs
                .iter()
                .any(|(_, t)| t.type_parameters.iter().any(|t| t.name == name));
        if is_type_parameter {
            TypeTarget::TypeParameter
        } else {
            TypeTarget::Unresolved
        }
    }

    // ----- classes -----------------------------------------------------

    pub fn class(&self, library: LibraryId, name: &str) -> ClassId {
        let ident = self.ident(name);
        let id = self.program.borrow_mut().classes.alloc(ClassDecl {
            span: ident.span,
            name: ident,
            library,
            kind: ClassKind::Declaration,
            is_abstract: false,
            type_parameters: Vec::new(),
            superclass: None,
            mixins: Vec::new(),
            interfaces: Vec::new(),
            members: Vec::new(),
        });
        self.declare(library, Declaration::Class(id));
        id
    }

    /// Declare the root class and record it as the program's object class.
    pub fn object_class(&self, library: LibraryId) -> ClassId {
        let id = self.class(library, "Object");
        self.program.borrow_mut().object_class = Some(id);
        id
    }

    /// `class name = superclass with mixins;`
    pub fn mixin_application(
        &self,
        library: LibraryId,
        name: &str,
        superclass: &str,
        mixins: &[&str],
    ) -> ClassId {
        let id = self.class(library, name);
        let superclass = self.ty(superclass);
        let mixins: Vec<_> = mixins.iter().map(|m| self.ty(m)).collect();
        self.update_class(id, |class| {
            class.kind = ClassKind::MixinApplication;
            class.superclass = Some(superclass);
            class.mixins = mixins;
        });
        id
    }

    fn update_class(&self, id: ClassId, f: impl FnOnce(&mut ClassDecl)) {
        if let Some(class) = self.program.borrow_mut().classes.get_mut(id) {
            f(class);
        }
    }

    pub fn type_parameters(&self, class: ClassId, names: &[&str]) {
        let params: Vec<_> = names.iter().map(|n| self.ident(n)).collect();
        self.update_class(class, |c| c.type_parameters = params);
    }

    pub fn extends(&self, class: ClassId, superclass: &str) {
        let ty = self.ty(superclass);
        self.extends_type(class, ty);
    }

    pub fn extends_type(&self, class: ClassId, ty: TypeName) {
        self.update_class(class, |c| c.superclass = Some(ty));
    }

    pub fn implements(&self, class: ClassId, interfaces: &[&str]) {
        let types: Vec<_> = interfaces.iter().map(|i| self.ty(i)).collect();
        self.update_class(class, |c| c.interfaces.extend(types));
    }

    pub fn implements_type(&self, class: ClassId, ty: TypeName) {
        self.update_class(class, |c| c.interfaces.push(ty));
    }

    pub fn with_mixins(&self, class: ClassId, mixins: &[&str]) {
        let types: Vec<_> = mixins.iter().map(|m| self.ty(m)).collect();
        self.update_class(class, |c| c.mixins.extend(types));
    }

    pub fn field(&self, class: ClassId, spec: VarSpec) -> VariableId {
        let id = self.variable(VariableOwner::Class(class), spec);
        self.update_class(class, |c| c.members.push(Member::Field(id)));
        id
    }

    pub fn method(&self, class: ClassId, spec: MethodSpec) {
        let method = self.build_method(spec);
        self.update_class(class, |c| c.members.push(Member::Method(method)));
    }

    pub fn constructor(&self, class: ClassId, spec: CtorSpec) -> ConstructorId {
        let class_name = self.with_program(|p| p.class_name(class).unwrap_or("").to_string());
        let return_type = self.ident(spec.return_type.as_deref().unwrap_or(&class_name));
        let name = spec.name.as_deref().map(|n| self.ident(n));
        let parameters = self.build_parameters(spec.parameters);
        let initializers = spec
            .initializers
            .into_iter()
            .map(|init| self.build_initializer(init))
            .collect();
        let redirect = spec.redirect.map(|(type_name, ctor)| {
            let type_name = self.ty(&type_name);
            let constructor = ctor.as_deref().map(|c| self.ident(c));
            let target = type_name.class_id().and_then(|class| {
                self.with_program(|p| p.find_constructor(class, ctor.as_deref()).map(|(id, _)| id))
            });
            ConstructorRedirect {
                span: type_name.span,
                type_name,
                constructor,
                target,
            }
        });
        let span = match &name {
            Some(n) => return_type.span.to(n.span),
            None => return_type.span,
        };
        let decl = ConstructorDecl {
            class,
            return_type,
            name,
            is_const: spec.is_const,
            is_factory: spec.is_factory,
            parameters,
            initializers,
            redirect,
            body: spec.body.map(|b| self.build_body(b)),
            span,
        };
        let id = self.program.borrow_mut().constructors.alloc(decl);
        self.update_class(class, |c| c.members.push(Member::Constructor(id)));
        id
    }

    /// Point a factory's redirection at a constructor declared later.
    pub fn resolve_redirect(&self, factory: ConstructorId, target: ConstructorId) {
        if let Some(ctor) = self.program.borrow_mut().constructors.get_mut(factory) {
            if let Some(redirect) = ctor.redirect.as_mut() {
                redirect.target = Some(target);
            }
        }
    }

    // ----- top-level declarations --------------------------------------

    pub fn top_level_variable(&self, library: LibraryId, spec: VarSpec) -> VariableId {
        let id = self.variable(VariableOwner::Library(library), spec);
        self.declare(library, Declaration::Variable(id));
        id
    }

    pub fn function(&self, library: LibraryId, spec: MethodSpec) {
        let function = self.build_function(spec);
        self.declare(library, Declaration::Function(function));
    }

    pub fn typedef(&self, library: LibraryId, spec: TypedefSpec) -> TypedefId {
        let name = self.ident(&spec.name);
        let type_parameters = spec.type_parameters.iter().map(|t| self.ident(t)).collect();
        let id = self.program.borrow_mut().typedefs.alloc(TypedefDecl {
            span: name.span,
            name,
            library,
            type_parameters,
            return_type: None,
            parameters: Vec::new(),
        });
        // Resolve after allocation so a typedef may mention itself.
        let return_type = spec.return_type.as_deref().map(|t| self.ty(t));
        let parameters = self.build_parameters(spec.parameters);
        if let Some(typedef) = self.program.borrow_mut().typedefs.get_mut(id) {
            typedef.return_type = return_type;
            typedef.parameters = parameters;
        }
        self.declare(library, Declaration::Typedef(id));
        id
    }

    // ----- variables, functions, parameters ----------------------------

    fn variable(&self, owner: VariableOwner, spec: VarSpec) -> VariableId {
        let declared_type = spec.ty.as_deref().map(|t| self.ty(t));
        let name = self.ident(&spec.name);
        self.program.borrow_mut().variables.alloc(VariableDecl {
            span: name.span,
            name,
            owner,
            is_const: spec.is_const,
            is_final: spec.is_final,
            is_static: spec.is_static,
            declared_type,
            initializer: spec.initializer,
        })
    }

    /// A local variable declaration statement.
    pub fn local(&self, spec: VarSpec) -> Stmt {
        let id = self.variable(VariableOwner::Local, spec);
        let span = self.with_program(|p| p.variable(id).map(|v| v.span)).unwrap_or(self.span(1));
        Stmt::new(StmtKind::Variable(id), span)
    }

    /// Allocate a local variable and return its id, for use in loops.
    pub fn local_id(&self, spec: VarSpec) -> VariableId {
        self.variable(VariableOwner::Local, spec)
    }

    fn build_parameters(&self, specs: Vec<ParamSpec>) -> Vec<Parameter> {
        specs
            .into_iter()
            .map(|spec| {
                let declared_type = spec.ty.as_deref().map(|t| self.ty(t));
                let name = self.ident(&spec.name);
                Parameter {
                    span: name.span,
                    name,
                    kind: spec.kind,
                    is_field_formal: spec.is_field_formal,
                    is_const: spec.is_const,
                    declared_type,
                    default_value: spec.default_value,
                }
            })
            .collect()
    }

    fn build_body(&self, body: BodySpec) -> FunctionBody {
        match body {
            BodySpec::Block(statements) => FunctionBody::Block(self.block(statements)),
            BodySpec::Expression(expr) => FunctionBody::Expression(expr),
        }
    }

    fn build_method(&self, spec: MethodSpec) -> MethodDecl {
        let return_type = spec.return_type.as_deref().map(|t| self.ty(t));
        let name = self.ident(&spec.name);
        MethodDecl {
            span: name.span,
            name,
            kind: spec.kind,
            is_static: spec.is_static,
            is_abstract: spec.body.is_none(),
            parameters: self.build_parameters(spec.parameters),
            return_type,
            body: spec.body.map(|b| self.build_body(b)),
        }
    }

    fn build_function(&self, spec: MethodSpec) -> FunctionDecl {
        let return_type = spec.return_type.as_deref().map(|t| self.ty(t));
        let name = self.ident(&spec.name);
        FunctionDecl {
            span: name.span,
            name,
            kind: spec.kind,
            is_static: spec.is_static,
            parameters: self.build_parameters(spec.parameters),
            return_type,
            body: spec.body.map(|b| self.build_body(b)),
        }
    }

    fn build_initializer(&self, spec: InitSpec) -> Initializer {
        match spec {
            InitSpec::Field(field, value) => {
                let field = self.ident(&field);
                Initializer {
                    span: field.span.to(value.span),
                    kind: InitializerKind::Field { field, value },
                }
            }
            InitSpec::Super(constructor, arguments) => Initializer {
                span: self.span(5),
                kind: InitializerKind::Super {
                    constructor: constructor.as_deref().map(|c| self.ident(c)),
                    arguments,
                },
            },
            InitSpec::Redirect(constructor, arguments) => Initializer {
                span: self.span(4),
                kind: InitializerKind::Redirect {
                    constructor: constructor.as_deref().map(|c| self.ident(c)),
                    arguments,
                    target: None,
                },
            },
        }
    }

    // ----- statements --------------------------------------------------

    pub fn block(&self, statements: Vec<Stmt>) -> Block {
        let span = match (statements.first(), statements.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => self.span(2),
        };
        Block { statements, span }
    }

    pub fn expr_stmt(&self, expr: Expr) -> Stmt {
        let span = expr.span;
        Stmt::new(StmtKind::Expression(expr), span)
    }

    pub fn ret(&self, value: Option<Expr>) -> Stmt {
        let keyword = self.span(6);
        let span = value.as_ref().map_or(keyword, |v| keyword.to(v.span));
        Stmt::new(StmtKind::Return(value), span)
    }

    pub fn block_stmt(&self, statements: Vec<Stmt>) -> Stmt {
        let block = self.block(statements);
        let span = block.span;
        Stmt::new(StmtKind::Block(block), span)
    }

    pub fn if_stmt(&self, condition: Expr, then_branch: Stmt, else_branch: Option<Stmt>) -> Stmt {
        let span = condition.span.to(then_branch.span);
        Stmt::new(
            StmtKind::If {
                condition,
                then_branch: Box::new(then_branch),
                else_branch: else_branch.map(Box::new),
            },
            span,
        )
    }

    pub fn while_stmt(&self, condition: Expr, body: Stmt) -> Stmt {
        let span = condition.span.to(body.span);
        Stmt::new(
            StmtKind::While {
                condition,
                body: Box::new(body),
            },
            span,
        )
    }

    pub fn labeled(&self, labels: &[&str], body: Stmt) -> Stmt {
        let labels: Vec<Ident> = labels.iter().map(|l| self.ident(l)).collect();
        let span = labels.first().map_or(body.span, |l| l.span.to(body.span));
        Stmt::new(
            StmtKind::Labeled {
                labels,
                body: Box::new(body),
            },
            span,
        )
    }

    pub fn break_stmt(&self, label: Option<&str>) -> Stmt {
        let keyword = self.span(5);
        let label = label.map(|l| self.ident(l));
        let span = label.as_ref().map_or(keyword, |l| keyword.to(l.span));
        Stmt::new(StmtKind::Break(label), span)
    }

    pub fn continue_stmt(&self, label: Option<&str>) -> Stmt {
        let keyword = self.span(8);
        let label = label.map(|l| self.ident(l));
        let span = label.as_ref().map_or(keyword, |l| keyword.to(l.span));
        Stmt::new(StmtKind::Continue(label), span)
    }

    /// `case expression:` member; `None` builds `default:`.
    pub fn case(
        &self,
        labels: &[&str],
        expression: Option<Expr>,
        statements: Vec<Stmt>,
    ) -> SwitchMember {
        let labels: Vec<Ident> = labels.iter().map(|l| self.ident(l)).collect();
        let keyword = self.span(4);
        let span = expression.as_ref().map_or(keyword, |e| keyword.to(e.span));
        SwitchMember {
            labels,
            expression,
            statements,
            span,
        }
    }

    pub fn switch(&self, subject: Expr, members: Vec<SwitchMember>) -> Stmt {
        let span = members.last().map_or(subject.span, |m| subject.span.to(m.span));
        Stmt::new(StmtKind::Switch { subject, members }, span)
    }

    pub fn try_catch(
        &self,
        body: Vec<Stmt>,
        catch_body: Vec<Stmt>,
        finally: Option<Vec<Stmt>>,
    ) -> Stmt {
        let body = self.block(body);
        let exception = self.ident("e");
        let catch_block = self.block(catch_body);
        let catch = CatchClause {
            span: exception.span.to(catch_block.span),
            exception_type: None,
            exception: Some(exception),
            stack_trace: None,
            body: catch_block,
        };
        let finally = finally.map(|f| self.block(f));
        let span = body.span.to(catch.span);
        Stmt::new(
            StmtKind::Try {
                body,
                catches: vec![catch],
                finally,
            },
            span,
        )
    }

    pub fn local_function(&self, spec: MethodSpec) -> Stmt {
        let function = self.build_function(spec);
        let span = function.span;
        Stmt::new(StmtKind::LocalFunction(function), span)
    }

    // ----- expressions -------------------------------------------------

    fn literal(&self, literal: Literal, len: usize) -> Expr {
        Expr::new(ExprKind::Literal(literal), self.span(len))
    }

    pub fn null(&self) -> Expr {
        self.literal(Literal::Null, 4)
    }

    pub fn bool(&self, value: bool) -> Expr {
        self.literal(Literal::Bool(value), if value { 4 } else { 5 })
    }

    pub fn int(&self, value: i64) -> Expr {
        self.literal(Literal::Int(value), value.to_string().len())
    }

    pub fn double(&self, value: f64) -> Expr {
        self.literal(Literal::Double(value), value.to_string().len())
    }

    pub fn string(&self, value: &str) -> Expr {
        self.literal(Literal::String(value.to_string()), value.len() + 2)
    }

    pub fn interpolation(&self, parts: Vec<Expr>) -> Expr {
        let span = self.cover(&parts, 2);
        Expr::new(ExprKind::Interpolation(parts), span)
    }

    fn cover(&self, parts: &[Expr], fallback: usize) -> Span {
        match (parts.first(), parts.last()) {
            (Some(first), Some(last)) => first.span.to(last.span),
            _ => self.span(fallback),
        }
    }

    pub fn identifier(&self, name: &str, element: Element) -> Expr {
        Expr::new(
            ExprKind::Identifier {
                name: name.to_string(),
                element,
            },
            self.span(name.len()),
        )
    }

    /// Reference to a variable or field by id.
    pub fn var_ref(&self, id: VariableId) -> Expr {
        let name = self.with_program(|p| p.variable(id).map(|v| v.name.name.clone()));
        self.identifier(name.as_deref().unwrap_or("?"), Element::Variable(id))
    }

    pub fn param_ref(&self, name: &str) -> Expr {
        self.identifier(name, Element::Parameter)
    }

    pub fn method_ref(&self, class: ClassId, name: &str, is_static: bool) -> Expr {
        self.identifier(name, Element::Method { class, is_static })
    }

    pub fn function_ref(&self, name: &str) -> Expr {
        self.identifier(name, Element::Function)
    }

    pub fn class_ref(&self, class: ClassId) -> Expr {
        let name = self.with_program(|p| p.class_name(class).map(str::to_string));
        self.identifier(name.as_deref().unwrap_or("?"), Element::Class(class))
    }

    pub fn prefixed(&self, prefix: &str, name: &str, element: Element) -> Expr {
        let prefix = self.ident(prefix);
        let name = self.ident(name);
        let span = prefix.span.to(name.span);
        Expr::new(
            ExprKind::PrefixedIdentifier {
                prefix,
                name,
                element,
            },
            span,
        )
    }

    pub fn property(&self, target: Expr, name: &str) -> Expr {
        let name = self.ident(name);
        let span = target.span.to(name.span);
        Expr::new(
            ExprKind::PropertyAccess {
                target: Box::new(target),
                name,
            },
            span,
        )
    }

    pub fn this(&self) -> Expr {
        Expr::new(ExprKind::This, self.span(4))
    }

    pub fn super_expr(&self) -> Expr {
        Expr::new(ExprKind::Super, self.span(5))
    }

    pub fn unary(&self, op: UnaryOp, operand: Expr) -> Expr {
        let span = self.span(1).to(operand.span);
        Expr::new(
            ExprKind::Unary {
                op,
                operand: Box::new(operand),
            },
            span,
        )
    }

    pub fn binary(&self, op: BinaryOp, left: Expr, right: Expr) -> Expr {
        let span = left.span.to(right.span);
        Expr::new(
            ExprKind::Binary {
                op,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )
    }

    pub fn conditional(&self, condition: Expr, then_expr: Expr, else_expr: Expr) -> Expr {
        let span = condition.span.to(else_expr.span);
        Expr::new(
            ExprKind::Conditional {
                condition: Box::new(condition),
                then_expr: Box::new(then_expr),
                else_expr: Box::new(else_expr),
            },
            span,
        )
    }

    pub fn list(&self, is_const: bool, type_arguments: Vec<TypeName>, elements: Vec<Expr>) -> Expr {
        let open = self.span(1);
        let span = elements.last().map_or(open, |e| open.to(e.span));
        Expr::new(
            ExprKind::List {
                is_const,
                type_arguments,
                elements,
            },
            span,
        )
    }

    pub fn map(
        &self,
        is_const: bool,
        type_arguments: Vec<TypeName>,
        entries: Vec<(Expr, Expr)>,
    ) -> Expr {
        let open = self.span(1);
        let span = entries.last().map_or(open, |(_, v)| open.to(v.span));
        let entries = entries
            .into_iter()
            .map(|(key, value)| MapEntry { key, value })
            .collect();
        Expr::new(
            ExprKind::Map {
                is_const,
                type_arguments,
                entries,
            },
            span,
        )
    }

    pub fn arg(&self, value: Expr) -> Argument {
        Argument { name: None, value }
    }

    pub fn named_arg(&self, name: &str, value: Expr) -> Argument {
        Argument {
            name: Some(self.ident(name)),
            value,
        }
    }

    /// `new T.ctor(args)` / `const T.ctor(args)`; the constructor is bound when it exists.
    pub fn instance(
        &self,
        is_const: bool,
        type_name: TypeName,
        constructor: Option<&str>,
        arguments: Vec<Argument>,
    ) -> Expr {
        let keyword = self.span(if is_const { 5 } else { 3 });
        let target = type_name.class_id().and_then(|class| {
            self.with_program(|p| p.find_constructor(class, constructor).map(|(id, _)| id))
        });
        let constructor = constructor.map(|c| self.ident(c));
        let span = keyword.to(type_name.span);
        let span = arguments.last().map_or(span, |a| span.to(a.value.span));
        Expr::new(
            ExprKind::InstanceCreation {
                is_const,
                type_name,
                constructor,
                target,
                arguments,
            },
            span,
        )
    }

    pub fn call(
        &self,
        target: Option<Expr>,
        name: &str,
        element: Element,
        arguments: Vec<Argument>,
    ) -> Expr {
        let name = self.ident(name);
        let span = target.as_ref().map_or(name.span, |t| t.span.to(name.span));
        let span = arguments.last().map_or(span, |a| span.to(a.value.span));
        Expr::new(
            ExprKind::Invocation {
                target: target.map(Box::new),
                name,
                element,
                arguments,
            },
            span,
        )
    }

    pub fn assign(&self, target: Expr, value: Expr) -> Expr {
        let span = target.span.to(value.span);
        Expr::new(
            ExprKind::Assignment {
                target: Box::new(target),
                value: Box::new(value),
            },
            span,
        )
    }

    pub fn throw(&self, value: Expr) -> Expr {
        let span = self.span(5).to(value.span);
        Expr::new(ExprKind::Throw(Box::new(value)), span)
    }

    pub fn rethrow(&self) -> Expr {
        Expr::new(ExprKind::Rethrow, self.span(7))
    }

    pub fn argument_test(&self, name: &str, element: Element) -> Expr {
        let name = self.ident(name);
        let span = name.span;
        Expr::new(ExprKind::ArgumentDefinitionTest { name, element }, span)
    }

    pub fn closure(&self, parameters: Vec<ParamSpec>, statements: Vec<Stmt>) -> Expr {
        let parameters = self.build_parameters(parameters);
        let block = self.block(statements);
        let span = block.span;
        Expr::new(
            ExprKind::Closure {
                parameters,
                body: Box::new(FunctionBody::Block(block)),
            },
            span,
        )
    }
}

impl Default for ProgramBuilder {
    fn default() -> Self {
        Self::new()
    }
}

// ----- declaration specs ---------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SpecDirective {
    Import,
    Export,
    Part,
}

/// Description of an import, export or part directive.
#[derive(Debug, Clone)]
pub struct DirectiveSpec {
    kind: SpecDirective,
    target: UriTarget,
    uri: Option<String>,
    prefix: Option<String>,
    combinators: Vec<(bool, Vec<String>)>,
    interpolated: bool,
}

impl DirectiveSpec {
    fn new(kind: SpecDirective, target: UriTarget) -> Self {
        Self {
            kind,
            target,
            uri: None,
            prefix: None,
            combinators: Vec::new(),
            interpolated: false,
        }
    }

    pub fn import(target: UriTarget) -> Self {
        Self::new(SpecDirective::Import, target)
    }

    pub fn export(target: UriTarget) -> Self {
        Self::new(SpecDirective::Export, target)
    }

    pub fn part(target: UriTarget) -> Self {
        Self::new(SpecDirective::Part, target)
    }

    pub fn uri(mut self, text: &str) -> Self {
        self.uri = Some(text.to_string());
        self
    }

    pub fn prefix(mut self, prefix: &str) -> Self {
        self.prefix = Some(prefix.to_string());
        self
    }

    pub fn show(mut self, names: &[&str]) -> Self {
        self.combinators
            .push((true, names.iter().map(|n| n.to_string()).collect()));
        self
    }

    pub fn hide(mut self, names: &[&str]) -> Self {
        self.combinators
            .push((false, names.iter().map(|n| n.to_string()).collect()));
        self
    }

    pub fn interpolated(mut self) -> Self {
        self.interpolated = true;
        self
    }
}

#[derive(Debug, Clone)]
pub struct VarSpec {
    name: String,
    is_const: bool,
    is_final: bool,
    is_static: bool,
    ty: Option<String>,
    initializer: Option<Expr>,
}

impl VarSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_const: false,
            is_final: false,
            is_static: false,
            ty: None,
            initializer: None,
        }
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn final_(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn typed(mut self, ty: &str) -> Self {
        self.ty = Some(ty.to_string());
        self
    }

    pub fn init(mut self, value: Expr) -> Self {
        self.initializer = Some(value);
        self
    }
}

#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: String,
    kind: ParameterKind,
    is_field_formal: bool,
    is_const: bool,
    ty: Option<String>,
    default_value: Option<Expr>,
}

impl ParamSpec {
    fn new(name: &str, kind: ParameterKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            is_field_formal: false,
            is_const: false,
            ty: None,
            default_value: None,
        }
    }

    pub fn required(name: &str) -> Self {
        Self::new(name, ParameterKind::Required)
    }

    pub fn optional(name: &str) -> Self {
        Self::new(name, ParameterKind::OptionalPositional)
    }

    pub fn named(name: &str) -> Self {
        Self::new(name, ParameterKind::Named)
    }

    /// `this.name`
    pub fn field_formal(mut self) -> Self {
        self.is_field_formal = true;
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn typed(mut self, ty: &str) -> Self {
        self.ty = Some(ty.to_string());
        self
    }

    pub fn default_value(mut self, value: Expr) -> Self {
        self.default_value = Some(value);
        self
    }
}

#[derive(Debug, Clone)]
pub enum BodySpec {
    Block(Vec<Stmt>),
    Expression(Expr),
}

/// Methods of classes and top-level or local functions.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: String,
    kind: MethodKind,
    is_static: bool,
    parameters: Vec<ParamSpec>,
    return_type: Option<String>,
    body: Option<BodySpec>,
}

impl MethodSpec {
    fn new(name: &str, kind: MethodKind) -> Self {
        Self {
            name: name.to_string(),
            kind,
            is_static: false,
            parameters: Vec::new(),
            return_type: None,
            body: Some(BodySpec::Block(Vec::new())),
        }
    }

    pub fn method(name: &str) -> Self {
        Self::new(name, MethodKind::Method)
    }

    pub fn getter(name: &str) -> Self {
        Self::new(name, MethodKind::Getter)
    }

    pub fn setter(name: &str) -> Self {
        Self::new(name, MethodKind::Setter)
    }

    pub fn operator(symbol: &str) -> Self {
        Self::new(symbol, MethodKind::Operator)
    }

    pub fn static_(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn abstract_(mut self) -> Self {
        self.body = None;
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.return_type = Some(ty.to_string());
        self
    }

    pub fn body(mut self, statements: Vec<Stmt>) -> Self {
        self.body = Some(BodySpec::Block(statements));
        self
    }

    pub fn arrow(mut self, expr: Expr) -> Self {
        self.body = Some(BodySpec::Expression(expr));
        self
    }
}

#[derive(Debug, Clone)]
enum InitSpec {
    Field(String, Expr),
    Super(Option<String>, Vec<Argument>),
    Redirect(Option<String>, Vec<Argument>),
}

#[derive(Debug, Clone)]
pub struct CtorSpec {
    name: Option<String>,
    return_type: Option<String>,
    is_const: bool,
    is_factory: bool,
    parameters: Vec<ParamSpec>,
    initializers: Vec<InitSpec>,
    redirect: Option<(String, Option<String>)>,
    body: Option<BodySpec>,
}

impl CtorSpec {
    pub fn unnamed() -> Self {
        Self {
            name: None,
            return_type: None,
            is_const: false,
            is_factory: false,
            parameters: Vec::new(),
            initializers: Vec::new(),
            redirect: None,
            body: None,
        }
    }

    pub fn named(name: &str) -> Self {
        Self {
            name: Some(name.to_string()),
            ..Self::unnamed()
        }
    }

    /// Write a different class name in front of the constructor.
    pub fn written_as(mut self, class_name: &str) -> Self {
        self.return_type = Some(class_name.to_string());
        self
    }

    pub fn constant(mut self) -> Self {
        self.is_const = true;
        self
    }

    pub fn factory(mut self) -> Self {
        self.is_factory = true;
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }

    pub fn init_field(mut self, field: &str, value: Expr) -> Self {
        self.initializers.push(InitSpec::Field(field.to_string(), value));
        self
    }

    pub fn super_call(mut self, constructor: Option<&str>, arguments: Vec<Argument>) -> Self {
        self.initializers
            .push(InitSpec::Super(constructor.map(str::to_string), arguments));
        self
    }

    pub fn this_call(mut self, constructor: Option<&str>, arguments: Vec<Argument>) -> Self {
        self.initializers
            .push(InitSpec::Redirect(constructor.map(str::to_string), arguments));
        self
    }

    /// `factory C() = Type.constructor;`
    pub fn redirects_to(mut self, type_name: &str, constructor: Option<&str>) -> Self {
        self.is_factory = true;
        self.redirect = Some((type_name.to_string(), constructor.map(str::to_string)));
        self
    }

    pub fn body(mut self, statements: Vec<Stmt>) -> Self {
        self.body = Some(BodySpec::Block(statements));
        self
    }
}

#[derive(Debug, Clone)]
pub struct TypedefSpec {
    name: String,
    type_parameters: Vec<String>,
    return_type: Option<String>,
    parameters: Vec<ParamSpec>,
}

impl TypedefSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            type_parameters: Vec::new(),
            return_type: None,
            parameters: Vec::new(),
        }
    }

    pub fn type_parameter(mut self, name: &str) -> Self {
        self.type_parameters.push(name.to_string());
        self
    }

    pub fn returns(mut self, ty: &str) -> Self {
        self.return_type = Some(ty.to_string());
        self
    }

    pub fn param(mut self, param: ParamSpec) -> Self {
        self.parameters.push(param);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spans_follow_construction_order() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let a = p.class(lib, "A");
        let b = p.class(lib, "B");
        let program = p.finish();
        let a = program.class(a).unwrap().name.span;
        let b = program.class(b).unwrap().name.span;
        assert!(a.start < b.start);
        assert_eq!(a.source, b.source);
    }

    #[test]
    fn type_names_bind_to_declared_classes() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let foo = p.class(lib, "Foo");
        assert_eq!(p.ty("Foo").target, TypeTarget::Class(foo));
        assert_eq!(p.ty("dynamic").target, TypeTarget::Dynamic);
        assert_eq!(p.ty("Missing").target, TypeTarget::Unresolved);
        p.type_parameters(foo, &["T"]);
        assert_eq!(p.ty("T").target, TypeTarget::TypeParameter);
    }

    #[test]
    fn constructors_are_members_of_their_class() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let c = p.class(lib, "C");
        let ctor = p.constructor(c, CtorSpec::named("origin").constant());
        let program = p.finish();
        let (found, decl) = program.find_constructor(c, Some("origin")).unwrap();
        assert_eq!(found, ctor);
        assert!(decl.is_const);
        assert_eq!(decl.display_name(), "C.origin");
    }

    #[test]
    fn part_units_receive_declarations() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let part = p.part_unit(lib, "part.src");
        p.class(lib, "InPart");
        let program = p.finish();
        let library = program.library(lib).unwrap();
        assert_eq!(library.units.len(), 2);
        assert_eq!(library.units[1].source, part);
        assert_eq!(library.units[1].declarations.len(), 1);
    }

    #[test]
    fn program_survives_json() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let c = p.class(lib, "C");
        p.field(c, VarSpec::new("x").final_().init(p.int(1)));
        let program = p.finish();

        let json = serde_json::to_string(&program).unwrap();
        let back: Program = serde_json::from_str(&json).unwrap();
        assert_eq!(back.classes.len(), 1);
        assert_eq!(back.find_field(c, "x").map(|(_, v)| v.is_final), Some(true));
    }
}
