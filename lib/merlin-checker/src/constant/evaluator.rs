use merlin_diagnostics::{args, Argument, DiagnosticCollector, ErrorKind, Severity};
use merlin_resolved::{
    arity, Argument as ActualArgument, BinaryOp, ClassId, ConstructorDecl, ConstructorId, Element,
    Expr, ExprKind, InitializerKind, Literal, Parameter, ParameterKind, Program, Span, TypeName,
    TypeTarget, UnaryOp, VariableId,
};
use num_bigint::BigInt;
use num_traits::{FromPrimitive, Signed, ToPrimitive, Zero};
use rustc_hash::FxHashMap;

use super::{ConstValue, ConstantState};
use crate::queries::{self, ConstructorLookup};

/// Shift counts above this are left unevaluated.
const MAX_SHIFT: usize = 1 << 16;

/// Why an expression produced no value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// The expression is not a constant expression. The caller reports it
    /// with the kind that fits its context.
    NotConstant,
    /// A diagnostic was already reported.
    Reported,
}

pub type ConstResult = Result<ConstValue, Fault>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OperandFamily {
    Bool,
    Equality,
    Int,
    Num,
}

impl OperandFamily {
    fn of(op: BinaryOp) -> Self {
        match op {
            BinaryOp::And | BinaryOp::Or => OperandFamily::Bool,
            BinaryOp::Eq | BinaryOp::NotEq => OperandFamily::Equality,
            BinaryOp::BitAnd | BinaryOp::BitOr | BinaryOp::BitXor | BinaryOp::Shl | BinaryOp::Shr => {
                OperandFamily::Int
            }
            BinaryOp::Add
            | BinaryOp::Sub
            | BinaryOp::Mul
            | BinaryOp::Div
            | BinaryOp::TruncDiv
            | BinaryOp::Mod
            | BinaryOp::Lt
            | BinaryOp::Gt
            | BinaryOp::LtEq
            | BinaryOp::GtEq => OperandFamily::Num,
        }
    }

    fn accepts(self, value: &ConstValue) -> bool {
        match self {
            OperandFamily::Bool => value.is_bool(),
            OperandFamily::Equality => value.is_bool_num_string_or_null(),
            OperandFamily::Int => value.is_int_or_null(),
            OperandFamily::Num => value.is_num_or_null(),
        }
    }

    fn error(self) -> ErrorKind {
        match self {
            OperandFamily::Bool => ErrorKind::ConstEvalTypeBool,
            OperandFamily::Equality => ErrorKind::ConstEvalTypeBoolNumString,
            OperandFamily::Int => ErrorKind::ConstEvalTypeInt,
            OperandFamily::Num => ErrorKind::ConstEvalTypeNum,
        }
    }
}

/// Evaluates constant expressions, reporting what goes wrong on the way.
///
/// While a constant constructor runs for a particular creation, reports are
/// muted: anything it would throw surfaces as one
/// `CONST_CONSTRUCTOR_THROWS_EXCEPTION` at the creation site. Problems that
/// do not depend on the arguments are reported once, at the constructor
/// declaration, by the constant validator.
pub struct ConstantEvaluator<'a> {
    program: &'a Program,
    state: &'a mut ConstantState,
    out: &'a mut DiagnosticCollector,
    checked_mode: bool,
    /// Parameter values of the constructor being evaluated. `None` outside
    /// constructors, where parameters are never constant.
    bindings: Option<FxHashMap<String, ConstValue>>,
    muted: usize,
    threw: bool,
}

impl<'a> ConstantEvaluator<'a> {
    pub fn new(
        program: &'a Program,
        state: &'a mut ConstantState,
        out: &'a mut DiagnosticCollector,
        checked_mode: bool,
    ) -> Self {
        Self {
            program,
            state,
            out,
            checked_mode,
            bindings: None,
            muted: 0,
            threw: false,
        }
    }

    /// Treat parameters as potentially constant values of unknown content,
    /// as in the initializer list of a constant constructor.
    pub fn with_parameters(mut self) -> Self {
        self.bindings = Some(FxHashMap::default());
        self
    }

    /// Evaluate `expr` as the root of a constant context, reporting a
    /// non-constant expression as `kind` at `expr`.
    pub fn evaluate_root(&mut self, expr: &Expr, kind: ErrorKind) -> Option<ConstValue> {
        match self.evaluate(expr) {
            Ok(value) => Some(value),
            Err(Fault::NotConstant) => {
                self.report(kind, expr.span, args![]);
                None
            }
            Err(Fault::Reported) => None,
        }
    }

    /// Evaluate a `const` variable for its diagnostics, leaving the value cached.
    pub fn check_variable(&mut self, id: VariableId) {
        match self.variable_value(id) {
            Ok(value) => tracing::trace!(?id, unknown = value.is_unknown(), "constant checked"),
            Err(Fault::Reported) => {}
            Err(Fault::NotConstant) => tracing::trace!(?id, "not a constant variable"),
        }
    }

    /// Value of a `const` variable; evaluated and reported once per run.
    pub fn variable_value(&mut self, id: VariableId) -> ConstResult {
        if let Some(cached) = self.state.variables.get(&id) {
            return cached.clone().ok_or(Fault::Reported);
        }
        let program = self.program;
        let Some(decl) = program.variable(id) else {
            return Ok(ConstValue::Unknown);
        };
        if !decl.is_const {
            return Err(Fault::NotConstant);
        }

        if let Err(cycle) = self.state.variable_path.enter(id) {
            let entry = *cycle.entry();
            let path = cycle.render(
                |v| program.variable(*v).map_or_else(String::new, |d| d.name.name.clone()),
            );
            tracing::debug!(%path, "recursive constant");
            if let Some(entry) = program.variable(entry) {
                self.out.report(ErrorKind::RecursiveCompileTimeConstant, entry.name.span, args![]);
            }
            return Err(Fault::Reported);
        }

        // A variable's initializer never sees the parameters of the
        // constructor that referenced it, and reports for its own declaration.
        let bindings = self.bindings.take();
        let muted = std::mem::take(&mut self.muted);
        let result = match &decl.initializer {
            Some(initializer) => self.evaluate(initializer),
            None => Ok(ConstValue::Null),
        };
        let value = match result {
            Ok(value) => Some(value),
            Err(Fault::NotConstant) => {
                if let Some(initializer) = &decl.initializer {
                    self.report(
                        ErrorKind::ConstInitializedWithNonConstantValue,
                        initializer.span,
                        args![],
                    );
                }
                None
            }
            Err(Fault::Reported) => None,
        };
        self.muted = muted;
        self.bindings = bindings;
        self.state.variable_path.exit();

        tracing::trace!(variable = %decl.name.name, constant = value.is_some(), "constant cached");
        self.state.variables.insert(id, value.clone());
        value.ok_or(Fault::Reported)
    }

    pub fn evaluate(&mut self, expr: &Expr) -> ConstResult {
        match &expr.kind {
            ExprKind::Literal(literal) => Ok(match literal {
                Literal::Null => ConstValue::Null,
                Literal::Bool(b) => ConstValue::Bool(*b),
                Literal::Int(i) => ConstValue::int(*i),
                Literal::Double(d) => ConstValue::Double(*d),
                Literal::String(s) => ConstValue::String(s.clone()),
            }),
            ExprKind::Interpolation(parts) => self.evaluate_interpolation(parts),
            ExprKind::Identifier { name, element } => self.evaluate_element(*element, name),
            ExprKind::PrefixedIdentifier { name, element, .. } => self.evaluate_element(*element, &name.name),
            ExprKind::PropertyAccess { target, name } if name.name == "length" => {
                match self.evaluate(target)? {
                    ConstValue::String(s) => Ok(ConstValue::Int(BigInt::from(s.chars().count()))),
                    ConstValue::Unknown => Ok(ConstValue::Unknown),
                    _ => Err(Fault::NotConstant),
                }
            }
            ExprKind::Unary { op, operand } => self.evaluate_unary(expr, *op, operand),
            ExprKind::Binary { op, left, right } => self.evaluate_binary(expr, *op, left, right),
            ExprKind::Conditional {
                condition,
                then_expr,
                else_expr,
            } => {
                let condition_value = self.evaluate(condition)?;
                let then_value = self.evaluate(then_expr)?;
                let else_value = self.evaluate(else_expr)?;
                if !condition_value.is_bool() {
                    self.report(ErrorKind::ConstEvalTypeBool, condition.span, args![]);
                    return Err(Fault::Reported);
                }
                Ok(match condition_value.as_bool() {
                    Some(true) => then_value,
                    Some(false) => else_value,
                    None => ConstValue::Unknown,
                })
            }
            ExprKind::List {
                is_const,
                type_arguments,
                elements,
            } => self.evaluate_list(expr, *is_const, type_arguments, elements),
            ExprKind::Map {
                is_const,
                type_arguments,
                entries,
            } => {
                if !is_const {
                    self.report(ErrorKind::MissingConstInMapLiteral, expr.span, args![]);
                    return Err(Fault::Reported);
                }
                let mut failed = false;
                if let Some(ty) = find_type_parameter(type_arguments) {
                    self.report(
                        ErrorKind::InvalidTypeArgumentInConstMap,
                        ty.span,
                        args![Argument::ty(&ty.name)],
                    );
                    failed = true;
                }
                let mut values = Vec::with_capacity(entries.len());
                for entry in entries {
                    let key = self.evaluate_root(&entry.key, ErrorKind::NonConstantMapKey);
                    let value = self.evaluate_root(&entry.value, ErrorKind::NonConstantMapValue);
                    match (key, value) {
                        (Some(key), Some(value)) => values.push((key, value)),
                        _ => failed = true,
                    }
                }
                if failed {
                    Err(Fault::Reported)
                } else {
                    Ok(ConstValue::Map(values))
                }
            }
            ExprKind::InstanceCreation { is_const: true, .. } => self.evaluate_creation(expr),
            ExprKind::Invocation {
                target: None,
                name,
                element: Element::Function,
                arguments,
            } if name.name == "identical" && arguments.len() == 2 => {
                let left = self.evaluate(&arguments[0].value)?;
                let right = self.evaluate(&arguments[1].value)?;
                Ok(match left.equals(&right) {
                    Some(same) => ConstValue::Bool(same),
                    None => ConstValue::Unknown,
                })
            }
            ExprKind::Throw(_) => {
                self.report(ErrorKind::ConstEvalThrowsException, expr.span, args![]);
                Err(Fault::Reported)
            }
            _ => Err(Fault::NotConstant),
        }
    }

    fn report(&mut self, kind: ErrorKind, span: Span, arguments: Vec<Argument>) {
        if self.muted > 0 {
            self.threw = true;
            return;
        }
        self.out.report(kind, span, arguments);
    }

    fn evaluate_element(&mut self, element: Element, name: &str) -> ConstResult {
        match element {
            Element::Variable(id) => self.variable_value(id),
            Element::Parameter => match &self.bindings {
                Some(bindings) => Ok(bindings.get(name).cloned().unwrap_or(ConstValue::Unknown)),
                None => Err(Fault::NotConstant),
            },
            Element::Function | Element::Method { is_static: true, .. } => {
                Ok(ConstValue::Function(name.to_string()))
            }
            Element::Class(_) | Element::Typedef(_) => Ok(ConstValue::Type(name.to_string())),
            _ => Err(Fault::NotConstant),
        }
    }

    fn evaluate_interpolation(&mut self, parts: &[Expr]) -> ConstResult {
        let mut text = String::new();
        let mut known = true;
        for part in parts {
            let value = self.evaluate(part)?;
            if !value.is_bool_num_string_or_null() {
                self.report(ErrorKind::ConstEvalTypeBoolNumString, part.span, args![]);
                return Err(Fault::Reported);
            }
            match value.interpolate() {
                Some(segment) => text.push_str(&segment),
                None => known = false,
            }
        }
        Ok(if known {
            ConstValue::String(text)
        } else {
            ConstValue::Unknown
        })
    }

    fn evaluate_unary(&mut self, expr: &Expr, op: UnaryOp, operand: &Expr) -> ConstResult {
        let value = self.evaluate(operand)?;
        let (accepted, error) = match op {
            UnaryOp::Not => (value.is_bool(), ErrorKind::ConstEvalTypeBool),
            UnaryOp::Negate => (value.is_num_or_null(), ErrorKind::ConstEvalTypeNum),
            UnaryOp::Complement => (value.is_int_or_null(), ErrorKind::ConstEvalTypeInt),
        };
        if !accepted {
            self.report(error, operand.span, args![]);
            return Err(Fault::Reported);
        }
        match (op, value) {
            (_, ConstValue::Null) => {
                self.report(ErrorKind::ConstEvalThrowsException, expr.span, args![]);
                Err(Fault::Reported)
            }
            (UnaryOp::Not, ConstValue::Bool(b)) => Ok(ConstValue::Bool(!b)),
            (UnaryOp::Negate, ConstValue::Int(i)) => Ok(ConstValue::Int(-i)),
            (UnaryOp::Negate, ConstValue::Double(d)) => Ok(ConstValue::Double(-d)),
            (UnaryOp::Complement, ConstValue::Int(i)) => Ok(ConstValue::Int(!i)),
            _ => Ok(ConstValue::Unknown),
        }
    }

    fn evaluate_binary(
        &mut self,
        expr: &Expr,
        op: BinaryOp,
        left: &Expr,
        right: &Expr,
    ) -> ConstResult {
        let l = self.evaluate(left)?;
        let r = self.evaluate(right)?;

        let family = OperandFamily::of(op);
        let mut accepted = true;
        for (value, operand) in [(&l, left), (&r, right)] {
            if !family.accepts(value) {
                self.report(family.error(), operand.span, args![]);
                accepted = false;
            }
        }
        if !accepted {
            return Err(Fault::Reported);
        }
        if l.is_unknown() || r.is_unknown() {
            return Ok(ConstValue::Unknown);
        }

        match family {
            OperandFamily::Bool => {
                let (Some(a), Some(b)) = (l.as_bool(), r.as_bool()) else {
                    return Ok(ConstValue::Unknown);
                };
                Ok(ConstValue::Bool(if op == BinaryOp::And { a && b } else { a || b }))
            }
            OperandFamily::Equality => {
                let equal = l.equals(&r).unwrap_or(false);
                Ok(ConstValue::Bool(if op == BinaryOp::Eq { equal } else { !equal }))
            }
            _ if l == ConstValue::Null || r == ConstValue::Null => {
                self.report(ErrorKind::ConstEvalThrowsException, expr.span, args![]);
                Err(Fault::Reported)
            }
            OperandFamily::Int => self.bitwise(expr.span, op, &l, &r),
            OperandFamily::Num => match op {
                BinaryOp::Lt | BinaryOp::Gt | BinaryOp::LtEq | BinaryOp::GtEq => {
                    let ordering = l.compare(&r);
                    Ok(ConstValue::Bool(ordering.is_some_and(|o| match op {
                        BinaryOp::Lt => o.is_lt(),
                        BinaryOp::Gt => o.is_gt(),
                        BinaryOp::LtEq => o.is_le(),
                        _ => o.is_ge(),
                    })))
                }
                _ => self.arithmetic(expr.span, op, &l, &r),
            },
        }
    }

    fn arithmetic(
        &mut self,
        span: Span,
        op: BinaryOp,
        l: &ConstValue,
        r: &ConstValue,
    ) -> ConstResult {
        if let (ConstValue::Int(a), ConstValue::Int(b)) = (l, r) {
            return match op {
                BinaryOp::Add => Ok(ConstValue::Int(a + b)),
                BinaryOp::Sub => Ok(ConstValue::Int(a - b)),
                BinaryOp::Mul => Ok(ConstValue::Int(a * b)),
                BinaryOp::Div => match (a.to_f64(), b.to_f64()) {
                    (Some(a), Some(b)) => Ok(ConstValue::Double(a / b)),
                    _ => Ok(ConstValue::Unknown),
                },
                BinaryOp::TruncDiv | BinaryOp::Mod if b.is_zero() => {
                    self.report(ErrorKind::ConstEvalThrowsIdbze, span, args![]);
                    Err(Fault::Reported)
                }
                BinaryOp::TruncDiv => Ok(ConstValue::Int(a / b)),
                BinaryOp::Mod => {
                    // The result of `%` is never negative.
                    let m = a % b;
                    Ok(ConstValue::Int(if m.is_negative() { m + b.abs() } else { m }))
                }
                _ => Ok(ConstValue::Unknown),
            };
        }

        let (Some(a), Some(b)) = (l.as_f64(), r.as_f64()) else {
            return Ok(ConstValue::Unknown);
        };
        match op {
            BinaryOp::Add => Ok(ConstValue::Double(a + b)),
            BinaryOp::Sub => Ok(ConstValue::Double(a - b)),
            BinaryOp::Mul => Ok(ConstValue::Double(a * b)),
            BinaryOp::Div => Ok(ConstValue::Double(a / b)),
            BinaryOp::TruncDiv => {
                let quotient = (a / b).trunc();
                match BigInt::from_f64(quotient).filter(|_| quotient.is_finite()) {
                    Some(q) => Ok(ConstValue::Int(q)),
                    None => {
                        self.report(ErrorKind::ConstEvalThrowsException, span, args![]);
                        Err(Fault::Reported)
                    }
                }
            }
            BinaryOp::Mod => {
                let m = a % b;
                Ok(ConstValue::Double(if m < 0.0 { m + b.abs() } else { m }))
            }
            _ => Ok(ConstValue::Unknown),
        }
    }

    fn bitwise(&mut self, span: Span, op: BinaryOp, l: &ConstValue, r: &ConstValue) -> ConstResult {
        let (ConstValue::Int(a), ConstValue::Int(b)) = (l, r) else {
            return Ok(ConstValue::Unknown);
        };
        match op {
            BinaryOp::BitAnd => Ok(ConstValue::Int(a & b)),
            BinaryOp::BitOr => Ok(ConstValue::Int(a | b)),
            BinaryOp::BitXor => Ok(ConstValue::Int(a ^ b)),
            _ if b.is_negative() => {
                self.report(ErrorKind::ConstEvalThrowsException, span, args![]);
                Err(Fault::Reported)
            }
            _ => {
                let Some(count) = b.to_usize().filter(|count| *count <= MAX_SHIFT) else {
                    return Ok(match op {
                        BinaryOp::Shr if a.is_negative() => ConstValue::int(-1),
                        BinaryOp::Shr => ConstValue::int(0),
                        _ => ConstValue::Unknown,
                    });
                };
                Ok(ConstValue::Int(if op == BinaryOp::Shl { a << count } else { a >> count }))
            }
        }
    }

    fn evaluate_list(
        &mut self,
        expr: &Expr,
        is_const: bool,
        type_arguments: &[TypeName],
        elements: &[Expr],
    ) -> ConstResult {
        if !is_const {
            self.report(ErrorKind::MissingConstInListLiteral, expr.span, args![]);
            return Err(Fault::Reported);
        }
        let mut failed = false;
        if let Some(ty) = find_type_parameter(type_arguments) {
            self.report(
                ErrorKind::InvalidTypeArgumentInConstList,
                ty.span,
                args![Argument::ty(&ty.name)],
            );
            failed = true;
        }
        let mut values = Vec::with_capacity(elements.len());
        for element in elements {
            match self.evaluate_root(element, ErrorKind::NonConstantListElement) {
                Some(value) => values.push(value),
                None => failed = true,
            }
        }
        if failed {
            Err(Fault::Reported)
        } else {
            Ok(ConstValue::List(values))
        }
    }

    fn evaluate_creation(&mut self, expr: &Expr) -> ConstResult {
        let ExprKind::InstanceCreation {
            type_name,
            constructor,
            target,
            arguments,
            ..
        } = &expr.kind
        else {
            return Err(Fault::NotConstant);
        };

        let class = match type_name.target {
            TypeTarget::Class(class) => class,
            TypeTarget::Unresolved => {
                self.report(ErrorKind::UndefinedClass, type_name.span, args![&type_name.name]);
                return Err(Fault::Reported);
            }
            _ => {
                self.report(ErrorKind::ConstWithNonType, type_name.span, args![&type_name.name]);
                return Err(Fault::Reported);
            }
        };
        if self.program.class(class).is_none() {
            return Ok(ConstValue::Unknown);
        }

        let mut failed = false;
        if let Some(ty) = find_type_parameter(&type_name.arguments) {
            self.report(ErrorKind::ConstWithTypeParameters, ty.span, args![]);
            failed = true;
        }
        let declared = queries::type_parameter_count(self.program, type_name.target).unwrap_or(0);
        let given = type_name.arguments.len();
        if given != 0 && given != declared {
            self.report(
                ErrorKind::ConstWithInvalidTypeParameters,
                type_name.span,
                args![Argument::ty(&type_name.name), declared, given],
            );
            failed = true;
        }

        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            match self.evaluate_root(&argument.value, ErrorKind::ConstWithNonConstantArgument) {
                Some(value) => values.push((argument.name.as_ref().map(|n| n.name.as_str()), value)),
                None => failed = true,
            }
        }

        let program = self.program;
        let name = constructor.as_ref().map(|c| c.name.as_str());
        let resolved = match target.and_then(|id| program.constructor(id).map(|decl| (id, decl))) {
            Some((id, decl)) => ConstructorLookup::Declared(id, decl),
            None => queries::lookup_constructor(program, class, name),
        };
        let (id, decl) = match resolved {
            ConstructorLookup::Declared(id, decl) => (id, decl),
            ConstructorLookup::Implicit => {
                self.report(ErrorKind::ConstWithNonConst, expr.span, args![]);
                return Err(Fault::Reported);
            }
            ConstructorLookup::Missing => {
                match constructor {
                    Some(ctor) => self.report(
                        ErrorKind::ConstWithUndefinedConstructor,
                        ctor.span,
                        args![Argument::ty(&type_name.name), &ctor.name],
                    ),
                    None => self.report(
                        ErrorKind::ConstWithUndefinedConstructorDefault,
                        type_name.span,
                        args![Argument::ty(&type_name.name)],
                    ),
                }
                return Err(Fault::Reported);
            }
        };

        if !decl.is_const {
            self.report(ErrorKind::ConstWithNonConst, expr.span, args![]);
            failed = true;
        }
        if !self.check_arity(&decl.parameters, arguments, expr.span) {
            failed = true;
        }
        if failed {
            return Err(Fault::Reported);
        }

        let bindings = self.bind_arguments(&decl.parameters, &values);
        self.invoke_constructor(id, decl, bindings, expr.span)
    }

    fn check_arity(
        &mut self,
        parameters: &[Parameter],
        arguments: &[ActualArgument],
        creation: Span,
    ) -> bool {
        let arity = arity(parameters);
        let positional: Vec<&ActualArgument> = arguments.iter().filter(|a| !a.is_named()).collect();
        let mut valid = true;

        if positional.len() < arity.required {
            self.report(
                ErrorKind::NotEnoughRequiredArguments,
                creation,
                args![arity.required, positional.len()],
            );
            valid = false;
        }
        let max = arity.required + arity.optional_positional;
        if let Some(extra) = positional.get(max) {
            self.report(
                ErrorKind::ExtraPositionalArguments,
                extra.value.span,
                args![max, positional.len()],
            );
            valid = false;
        }
        for name in arguments.iter().filter_map(|a| a.name.as_ref()) {
            let declared = parameters
                .iter()
                .any(|p| p.kind == ParameterKind::Named && p.name.name == name.name);
            if !declared {
                self.report(ErrorKind::UndefinedNamedParameter, name.span, args![&name.name]);
                valid = false;
            }
        }
        valid
    }

    fn bind_arguments(
        &mut self,
        parameters: &[Parameter],
        arguments: &[(Option<&str>, ConstValue)],
    ) -> FxHashMap<String, ConstValue> {
        let mut bindings = FxHashMap::default();
        let mut positional = arguments.iter().filter(|(name, _)| name.is_none()).map(|(_, v)| v);
        for parameter in parameters {
            let passed = match parameter.kind {
                ParameterKind::Named => arguments
                    .iter()
                    .find(|(name, _)| *name == Some(parameter.name.as_str()))
                    .map(|(_, value)| value.clone()),
                _ => positional.next().cloned(),
            };
            let value = match passed {
                Some(value) => value,
                None => self.default_value(parameter),
            };
            bindings.insert(parameter.name.name.clone(), value);
        }
        bindings
    }

    fn default_value(&mut self, parameter: &Parameter) -> ConstValue {
        let Some(default) = &parameter.default_value else {
            return ConstValue::Null;
        };
        let bindings = self.bindings.take();
        let value = self.evaluate(default).unwrap_or(ConstValue::Unknown);
        self.bindings = bindings;
        value
    }

    fn invoke_constructor(
        &mut self,
        id: ConstructorId,
        decl: &ConstructorDecl,
        bindings: FxHashMap<String, ConstValue>,
        call: Span,
    ) -> ConstResult {
        if self.state.constructor_path.enter(id).is_err() {
            tracing::debug!(constructor = %decl.display_name(), "recursive constant constructor");
            self.out.report(ErrorKind::RecursiveCompileTimeConstant, call, args![]);
            return Err(Fault::Reported);
        }

        let outer_bindings = self.bindings.replace(bindings);
        let outer_threw = std::mem::take(&mut self.threw);
        self.muted += 1;
        let result = self.run_constructor(decl, call);
        self.muted -= 1;
        let threw = std::mem::replace(&mut self.threw, outer_threw);
        self.bindings = outer_bindings;
        self.state.constructor_path.exit();

        if threw {
            self.report(ErrorKind::ConstConstructorThrowsException, call, args![]);
            return Err(Fault::Reported);
        }
        result
    }

    fn run_constructor(&mut self, decl: &ConstructorDecl, call: Span) -> ConstResult {
        // Redirecting factories produce an instance of another class.
        if decl.is_factory {
            return Ok(ConstValue::Unknown);
        }
        let class = decl.class;

        for parameter in decl.parameters.iter().filter(|p| p.is_field_formal) {
            let value = self
                .bindings
                .as_ref()
                .and_then(|b| b.get(&parameter.name.name).cloned())
                .unwrap_or(ConstValue::Unknown);
            self.check_field_assignment(class, &parameter.name.name, &value, call);
        }

        for initializer in &decl.initializers {
            match &initializer.kind {
                InitializerKind::Field { field, value } => {
                    if let Ok(value) = self.evaluate(value) {
                        self.check_field_assignment(class, &field.name, &value, call);
                    }
                }
                InitializerKind::Super {
                    constructor,
                    arguments,
                } => {
                    if let Some(superclass) = self.program.superclass_of(class) {
                        self.delegate(
                            superclass,
                            constructor.as_ref().map(|c| c.name.as_str()),
                            arguments,
                            call,
                        );
                    }
                }
                InitializerKind::Redirect {
                    constructor,
                    arguments,
                    ..
                } => {
                    self.delegate(
                        class,
                        constructor.as_ref().map(|c| c.name.as_str()),
                        arguments,
                        call,
                    );
                }
            }
        }
        Ok(ConstValue::Object(class))
    }

    /// Run the constructor a `super(...)` or `this(...)` initializer invokes.
    fn delegate(
        &mut self,
        class: ClassId,
        name: Option<&str>,
        arguments: &[ActualArgument],
        call: Span,
    ) {
        let ConstructorLookup::Declared(id, target) = queries::lookup_constructor(self.program, class, name) else {
            return;
        };
        if !target.is_const || target.is_factory {
            return;
        }
        let mut values = Vec::with_capacity(arguments.len());
        for argument in arguments {
            let Ok(value) = self.evaluate(&argument.value) else {
                return;
            };
            values.push((argument.name.as_ref().map(|n| n.name.as_str()), value));
        }
        let bindings = self.bind_arguments(&target.parameters, &values);
        let _ = self.invoke_constructor(id, target, bindings, call);
    }

    fn check_field_assignment(
        &mut self,
        class: ClassId,
        field: &str,
        value: &ConstValue,
        call: Span,
    ) {
        let Some((_, decl)) = self.program.find_field(class, field) else {
            return;
        };
        let Some(ty) = &decl.declared_type else {
            return;
        };
        if self.is_assignable(value, ty) {
            return;
        }
        let severity = if self.checked_mode {
            Severity::Error
        } else {
            Severity::Warning
        };
        self.out.report_with_severity(
            ErrorKind::ConstFieldInitializerNotAssignable,
            call,
            args![Argument::ty(value.type_name(self.program)), Argument::ty(&ty.name)],
            severity,
        );
    }

    fn is_assignable(&self, value: &ConstValue, ty: &TypeName) -> bool {
        let TypeTarget::Class(target) = ty.target else {
            return true;
        };
        if self.program.is_object(target) {
            return true;
        }
        let Some(name) = self.program.class_name(target) else {
            return true;
        };
        match value {
            ConstValue::Null | ConstValue::Unknown => true,
            ConstValue::Bool(_) => name == "bool",
            ConstValue::Int(_) => matches!(name, "int" | "num"),
            ConstValue::Double(_) => matches!(name, "double" | "num"),
            ConstValue::String(_) => name == "String",
            ConstValue::List(_) => name == "List",
            ConstValue::Map(_) => name == "Map",
            ConstValue::Type(_) => name == "Type",
            ConstValue::Function(_) => name == "Function",
            ConstValue::Object(class) => queries::is_subclass_of(self.program, *class, target),
        }
    }
}

/// First type argument, at any depth, that names a type parameter.
fn find_type_parameter(types: &[TypeName]) -> Option<&TypeName> {
    types.iter().find_map(|ty| {
        if ty.target == TypeTarget::TypeParameter {
            Some(ty)
        } else {
            find_type_parameter(&ty.arguments)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use merlin_resolved::{ProgramBuilder, VarSpec};

    fn evaluate(p: &ProgramBuilder, expr: Expr) -> (Option<ConstValue>, Vec<ErrorKind>) {
        let mut state = ConstantState::default();
        let mut out = DiagnosticCollector::new();
        let value = p.with_program(|program| {
            ConstantEvaluator::new(program, &mut state, &mut out, true)
                .evaluate_root(&expr, ErrorKind::InvalidConstant)
        });
        let kinds = out.finish().iter().map(|d| d.kind).collect();
        (value, kinds)
    }

    fn reports(p: &ProgramBuilder, expr: Expr) -> Vec<(ErrorKind, Span)> {
        let mut state = ConstantState::default();
        let mut out = DiagnosticCollector::new();
        p.with_program(|program| {
            ConstantEvaluator::new(program, &mut state, &mut out, true)
                .evaluate_root(&expr, ErrorKind::InvalidConstant)
        });
        out.finish().iter().map(|d| (d.kind, d.span)).collect()
    }

    #[test]
    fn integer_arithmetic_does_not_overflow() {
        let p = ProgramBuilder::new();
        let expr = p.binary(BinaryOp::Mul, p.int(i64::MAX), p.int(4));
        let (value, kinds) = evaluate(&p, expr);
        assert_eq!(value, Some(ConstValue::Int(BigInt::from(i64::MAX) * BigInt::from(4))));
        assert!(kinds.is_empty());
    }

    #[test]
    fn modulo_is_never_negative() {
        let p = ProgramBuilder::new();
        let expr = p.binary(BinaryOp::Mod, p.unary(UnaryOp::Negate, p.int(5)), p.int(3));
        assert_eq!(evaluate(&p, expr).0, Some(ConstValue::int(1)));
    }

    #[test]
    fn integer_division_by_zero() {
        let p = ProgramBuilder::new();
        let expr = p.binary(BinaryOp::TruncDiv, p.int(1), p.int(0));
        assert_eq!(evaluate(&p, expr).1, vec![ErrorKind::ConstEvalThrowsIdbze]);

        let expr = p.binary(BinaryOp::TruncDiv, p.double(1.0), p.int(0));
        assert_eq!(evaluate(&p, expr).1, vec![ErrorKind::ConstEvalThrowsException]);
    }

    #[test]
    fn operand_families() {
        let p = ProgramBuilder::new();
        let expr = p.binary(BinaryOp::And, p.bool(true), p.int(1));
        assert_eq!(evaluate(&p, expr).1, vec![ErrorKind::ConstEvalTypeBool]);

        let expr = p.binary(BinaryOp::BitAnd, p.double(1.0), p.int(1));
        assert_eq!(evaluate(&p, expr).1, vec![ErrorKind::ConstEvalTypeInt]);

        let expr = p.binary(BinaryOp::Eq, p.list(true, vec![], vec![]), p.int(1));
        assert_eq!(evaluate(&p, expr).1, vec![ErrorKind::ConstEvalTypeBoolNumString]);

        let expr = p.binary(BinaryOp::Add, p.null(), p.int(1));
        assert_eq!(evaluate(&p, expr).1, vec![ErrorKind::ConstEvalThrowsException]);
    }

    #[test]
    fn numeric_operands() {
        let p = ProgramBuilder::new();
        let text = p.string("a");
        let at = text.span;
        let expr = p.binary(BinaryOp::Add, p.int(1), text);
        assert_eq!(reports(&p, expr), vec![(ErrorKind::ConstEvalTypeNum, at)]);

        let flag = p.bool(true);
        let at = flag.span;
        let expr = p.unary(UnaryOp::Negate, flag);
        assert_eq!(reports(&p, expr), vec![(ErrorKind::ConstEvalTypeNum, at)]);

        let expr = p.binary(BinaryOp::Lt, p.bool(false), p.string("b"));
        assert_eq!(
            evaluate(&p, expr).1,
            vec![ErrorKind::ConstEvalTypeNum, ErrorKind::ConstEvalTypeNum]
        );

        let expr = p.binary(BinaryOp::Sub, p.double(2.5), p.unary(UnaryOp::Negate, p.int(1)));
        assert!(evaluate(&p, expr).1.is_empty());
    }

    #[test]
    fn interpolation_and_length() {
        let p = ProgramBuilder::new();
        let expr = p.property(p.interpolation(vec![p.string("ab"), p.int(12)]), "length");
        assert_eq!(evaluate(&p, expr).0, Some(ConstValue::int(4)));
    }

    #[test]
    fn non_constant_reference() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let plain = p.top_level_variable(lib, VarSpec::new("plain").init(p.int(1)));
        let expr = p.binary(BinaryOp::Add, p.var_ref(plain), p.int(1));
        assert_eq!(evaluate(&p, expr).1, vec![ErrorKind::InvalidConstant]);
    }

    #[test]
    fn checking_a_variable_reports_once_and_caches() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let bad = p.binary(BinaryOp::TruncDiv, p.int(1), p.int(0));
        let x = p.top_level_variable(lib, VarSpec::new("x").constant().init(bad));
        let plain = p.top_level_variable(lib, VarSpec::new("plain").init(p.int(1)));

        let mut state = ConstantState::default();
        let mut out = DiagnosticCollector::new();
        p.with_program(|program| {
            let mut evaluator = ConstantEvaluator::new(program, &mut state, &mut out, true);
            evaluator.check_variable(x);
            evaluator.check_variable(x);
            evaluator.check_variable(plain);
        });
        assert_eq!(state.cached(x), Some(None));
        assert_eq!(state.cached(plain), None);
        let kinds: Vec<_> = out.finish().iter().map(|d| d.kind).collect();
        assert_eq!(kinds, vec![ErrorKind::ConstEvalThrowsIdbze]);
    }

    #[test]
    fn recursive_constants_are_reported_once() {
        let p = ProgramBuilder::new();
        let lib = p.library("main");
        let a = p.local_id(VarSpec::new("a").constant());
        let b = p.top_level_variable(lib, VarSpec::new("b").constant().init(p.var_ref(a)));
        let mut program = p.finish();
        if let Some(decl) = program.variables.get_mut(a) {
            decl.initializer = Some(Expr::new(
                ExprKind::Identifier {
                    name: "b".into(),
                    element: Element::Variable(b),
                },
                decl.span,
            ));
        }

        let mut state = ConstantState::default();
        let mut out = DiagnosticCollector::new();
        let mut evaluator = ConstantEvaluator::new(&program, &mut state, &mut out, true);
        assert_eq!(evaluator.variable_value(a), Err(Fault::Reported));
        assert_eq!(evaluator.variable_value(b), Err(Fault::Reported));
        let diagnostics = out.finish();
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics.as_slice()[0].kind, ErrorKind::RecursiveCompileTimeConstant);
    }
}
