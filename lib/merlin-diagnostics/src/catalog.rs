//! The closed catalog of compile-time error kinds.
//!
//! Every kind carries static metadata: its stable symbolic name, the rule
//! family it belongs to, the language clause that governs it, a message
//! template with typed `{}` placeholders, and its default severity.
//! Templates are filled by [`ErrorKind::format`], which rejects argument
//! lists that do not match the declared placeholders.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rule family of an error kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ErrorCategory {
    Directive,
    Hierarchy,
    Mixin,
    Declaration,
    Constructor,
    Constant,
    Override,
    Expression,
    Statement,
    Operator,
}

impl ErrorCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Directive => "directive",
            ErrorCategory::Hierarchy => "hierarchy",
            ErrorCategory::Mixin => "mixin",
            ErrorCategory::Declaration => "declaration",
            ErrorCategory::Constructor => "constructor",
            ErrorCategory::Constant => "constant",
            ErrorCategory::Override => "override",
            ErrorCategory::Expression => "expression",
            ErrorCategory::Statement => "statement",
            ErrorCategory::Operator => "operator",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// The expected shape of one template placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Param {
    /// A name, URI or other piece of source text.
    Text,
    /// A count or arity.
    Count,
    /// A rendered type name.
    Type,
}

/// One formatted value substituted into a template.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Argument {
    Text(String),
    Count(i64),
    Type(String),
}

impl Argument {
    pub fn ty(name: impl Into<String>) -> Self {
        Argument::Type(name.into())
    }

    fn matches(&self, param: Param) -> bool {
        matches!(
            (self, param),
            (Argument::Text(_), Param::Text)
                | (Argument::Count(_), Param::Count)
                | (Argument::Type(_), Param::Type)
        )
    }
}

impl fmt::Display for Argument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Argument::Text(text) | Argument::Type(text) => f.write_str(text),
            Argument::Count(count) => write!(f, "{count}"),
        }
    }
}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Text(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Text(value)
    }
}

impl From<&String> for Argument {
    fn from(value: &String) -> Self {
        Argument::Text(value.clone())
    }
}

impl From<usize> for Argument {
    fn from(value: usize) -> Self {
        Argument::Count(value as i64)
    }
}

impl From<i64> for Argument {
    fn from(value: i64) -> Self {
        Argument::Count(value)
    }
}

/// Build an argument list: `args!["Foo", 2, Argument::ty("int")]`.
#[macro_export]
macro_rules! args {
    () => {
        ::std::vec::Vec::<$crate::Argument>::new()
    };
    ($($arg:expr),+ $(,)?) => {
        vec![$($crate::Argument::from($arg)),+]
    };
}

/// A caller violated a template's declared placeholders.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FormatError {
    #[error("{kind} expects {expected} argument(s), but {found} were supplied")]
    ArityMismatch {
        kind: ErrorKind,
        expected: usize,
        found: usize,
    },
    #[error("argument {index} of {kind} should be {expected:?}")]
    ArgumentKindMismatch {
        kind: ErrorKind,
        index: usize,
        expected: Param,
    },
}

/// Static description of an error kind.
#[derive(Debug, PartialEq, Eq)]
pub struct ErrorMetadata {
    pub name: &'static str,
    pub category: ErrorCategory,
    pub clause: &'static str,
    pub template: &'static str,
    pub params: &'static [Param],
}

impl ErrorMetadata {
    pub fn arity(&self) -> usize {
        self.params.len()
    }
}

macro_rules! error_kinds {
    ($(
        $variant:ident = $name:literal, $category:ident, $clause:literal,
        $template:literal, [$($param:ident),*];
    )*) => {
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(rename_all = "SCREAMING_SNAKE_CASE")]
        pub enum ErrorKind {
            $($variant,)*
        }

        impl ErrorKind {
            pub const ALL: &'static [ErrorKind] = &[$(ErrorKind::$variant,)*];

            pub fn metadata(self) -> &'static ErrorMetadata {
                match self {
                    $(ErrorKind::$variant => &ErrorMetadata {
                        name: $name,
                        category: ErrorCategory::$category,
                        clause: $clause,
                        template: $template,
                        params: &[$(Param::$param),*],
                    },)*
                }
            }
        }
    };
}

error_kinds! {
    // directives
    AmbiguousExport = "AMBIGUOUS_EXPORT", Directive, "14.2 Exports",
        "The element '{}' is defined in the libraries '{}' and '{}'", [Text, Text, Text];
    AmbiguousImport = "AMBIGUOUS_IMPORT", Directive, "14.1 Imports",
        "The element '{}' is defined in the libraries '{}' and '{}'", [Text, Text, Text];
    ExportInternalLibrary = "EXPORT_INTERNAL_LIBRARY", Directive, "14.2 Exports",
        "The library {} is internal and cannot be exported", [Text];
    ExportOfNonLibrary = "EXPORT_OF_NON_LIBRARY", Directive, "14.2 Exports",
        "The exported library '{}' must not have a part-of directive", [Text];
    ImportInternalLibrary = "IMPORT_INTERNAL_LIBRARY", Directive, "14.1 Imports",
        "The library {} is internal and cannot be imported", [Text];
    ImportOfNonLibrary = "IMPORT_OF_NON_LIBRARY", Directive, "14.1 Imports",
        "The imported library '{}' must not have a part-of directive", [Text];
    InvalidUri = "INVALID_URI", Directive, "14.1 Imports",
        "Invalid URI syntax: '{}'", [Text];
    PartOfNonPart = "PART_OF_NON_PART", Directive, "14.3 Parts",
        "The included part '{}' must have a part-of directive", [Text];
    PrefixCollidesWithTopLevelMember = "PREFIX_COLLIDES_WITH_TOP_LEVEL_MEMBER", Directive, "14.1 Imports",
        "The name '{}' is already used as an import prefix and cannot be used to name a top-level element", [Text];
    UriDoesNotExist = "URI_DOES_NOT_EXIST", Directive, "14.2 Exports",
        "Target of URI does not exist: '{}'", [Text];
    UriWithInterpolation = "URI_WITH_INTERPOLATION", Directive, "14.1 Imports",
        "URIs cannot use string interpolation", [];

    // class hierarchy
    ExtendsDisallowedClass = "EXTENDS_DISALLOWED_CLASS", Hierarchy, "12.2 Null",
        "Classes cannot extend '{}'", [Type];
    ExtendsNonClass = "EXTENDS_NON_CLASS", Hierarchy, "7.9 Superclasses",
        "Classes can only extend other classes", [];
    ImplementsDisallowedClass = "IMPLEMENTS_DISALLOWED_CLASS", Hierarchy, "12.2 Null",
        "Classes cannot implement '{}'", [Type];
    ImplementsDynamic = "IMPLEMENTS_DYNAMIC", Hierarchy, "7.10 Superinterfaces",
        "Classes cannot implement 'dynamic'", [];
    ImplementsNonClass = "IMPLEMENTS_NON_CLASS", Hierarchy, "7.10 Superinterfaces",
        "Classes can only implement other classes", [];
    ImplementsRepeated = "IMPLEMENTS_REPEATED", Hierarchy, "7.10 Superinterfaces",
        "'{}' can only be implemented once", [Type];
    ObjectCannotExtendAnotherClass = "OBJECT_CANNOT_EXTEND_ANOTHER_CLASS", Hierarchy, "7.9 Superclasses",
        "", [];
    RecursiveFunctionTypeAlias = "RECURSIVE_FUNCTION_TYPE_ALIAS", Hierarchy, "15.3.1 Typedef",
        "", [];
    RecursiveInterfaceInheritance = "RECURSIVE_INTERFACE_INHERITANCE", Hierarchy, "7.10 Superinterfaces",
        "'{}' cannot be a superinterface of itself: {}", [Type, Text];
    RecursiveInterfaceInheritanceBaseCaseExtends = "RECURSIVE_INTERFACE_INHERITANCE_BASE_CASE_EXTENDS", Hierarchy, "7.10 Superinterfaces",
        "'{}' cannot extend itself", [Type];
    RecursiveInterfaceInheritanceBaseCaseImplements = "RECURSIVE_INTERFACE_INHERITANCE_BASE_CASE_IMPLEMENTS", Hierarchy, "7.10 Superinterfaces",
        "'{}' cannot implement itself", [Type];

    // mixins
    MixinDeclaresConstructor = "MIXIN_DECLARES_CONSTRUCTOR", Mixin, "9 Mixins",
        "The class '{}' cannot be used as a mixin because it declares a constructor", [Type];
    MixinInheritsFromNotObject = "MIXIN_INHERITS_FROM_NOT_OBJECT", Mixin, "9 Mixins",
        "The class '{}' cannot be used as a mixin because it extends a class other than Object", [Type];
    MixinOfNonClass = "MIXIN_OF_NON_CLASS", Mixin, "9.1 Mixin Application",
        "Classes can only mixin other classes", [];
    MixinReferencesSuper = "MIXIN_REFERENCES_SUPER", Mixin, "9 Mixins",
        "The class '{}' cannot be used as a mixin because it references 'super'", [Type];
    MixinWithNonClassSuperclass = "MIXIN_WITH_NON_CLASS_SUPERCLASS", Mixin, "9.1 Mixin Application",
        "Mixin can only be applied to class", [];

    // declarations and names
    BuiltInIdentifierAsType = "BUILT_IN_IDENTIFIER_AS_TYPE", Declaration, "12.30 Identifier Reference",
        "The built-in identifier '{}' cannot be as a type", [Text];
    BuiltInIdentifierAsTypeName = "BUILT_IN_IDENTIFIER_AS_TYPE_NAME", Declaration, "12.30 Identifier Reference",
        "The built-in identifier '{}' cannot be used as a type name", [Text];
    BuiltInIdentifierAsTypedefName = "BUILT_IN_IDENTIFIER_AS_TYPEDEF_NAME", Declaration, "12.30 Identifier Reference",
        "The built-in identifier '{}' cannot be used as a type alias name", [Text];
    BuiltInIdentifierAsTypeVariableName = "BUILT_IN_IDENTIFIER_AS_TYPE_VARIABLE_NAME", Declaration, "12.30 Identifier Reference",
        "The built-in identifier '{}' cannot be used as a type variable name", [Text];
    ConflictingConstructorNameAndField = "CONFLICTING_CONSTRUCTOR_NAME_AND_FIELD", Declaration, "7.6 Constructors",
        "'{}' cannot be used to name a constructor and a field in this class", [Text];
    ConflictingConstructorNameAndMethod = "CONFLICTING_CONSTRUCTOR_NAME_AND_METHOD", Declaration, "7.6 Constructors",
        "'{}' cannot be used to name a constructor and a method in this class", [Text];
    ConflictingGetterAndMethod = "CONFLICTING_GETTER_AND_METHOD", Declaration, "7.2 Getters",
        "Class '{}' cannot have both getter '{}.{}' and method with the same name", [Type, Type, Text];
    ConflictingMethodAndGetter = "CONFLICTING_METHOD_AND_GETTER", Declaration, "7.2 Getters",
        "Class '{}' cannot have both method '{}.{}' and getter with the same name", [Type, Type, Text];
    ConstFormalParameter = "CONST_FORMAL_PARAMETER", Declaration, "6.2 Formal Parameters",
        "Parameters cannot be 'const'", [];
    ConstInstanceField = "CONST_INSTANCE_FIELD", Declaration, "7.5 Instance Variables",
        "Only static fields can be declared as 'const'", [];
    DefaultValueInFunctionTypeAlias = "DEFAULT_VALUE_IN_FUNCTION_TYPE_ALIAS", Declaration, "15.3.1 Typedef",
        "Default values aren't allowed in typedefs", [];
    DuplicateConstructorDefault = "DUPLICATE_CONSTRUCTOR_DEFAULT", Declaration, "3.1 Scoping",
        "The default constructor is already defined", [];
    DuplicateConstructorName = "DUPLICATE_CONSTRUCTOR_NAME", Declaration, "3.1 Scoping",
        "The constructor with name '{}' is already defined", [Text];
    DuplicateDefinition = "DUPLICATE_DEFINITION", Declaration, "3.1 Scoping",
        "The name '{}' is already defined", [Text];
    DuplicateDefinitionInheritance = "DUPLICATE_DEFINITION_INHERITANCE", Declaration, "7 Classes",
        "The name '{}' is already defined in '{}'", [Text, Type];
    GetterAndMethodWithSameName = "GETTER_AND_METHOD_WITH_SAME_NAME", Declaration, "7.2 Getters",
        "'{}' cannot be used to name a getter, there is already a method with the same name", [Text];
    MemberWithClassName = "MEMBER_WITH_CLASS_NAME", Declaration, "7 Classes",
        "Class members cannot have the same name as the enclosing class", [];
    MethodAndGetterWithSameName = "METHOD_AND_GETTER_WITH_SAME_NAME", Declaration, "7.2 Getters",
        "'{}' cannot be used to name a method, there is already a getter with the same name", [Text];
    PrivateOptionalParameter = "PRIVATE_OPTIONAL_PARAMETER", Declaration, "6.2.2 Optional Formals",
        "Named optional parameters cannot start with an underscore", [];
    ReservedWordAsIdentifier = "RESERVED_WORD_AS_IDENTIFIER", Declaration, "16.1.1 Reserved Words",
        "", [];
    StaticTopLevelFunction = "STATIC_TOP_LEVEL_FUNCTION", Declaration, "6 Functions",
        "", [];
    StaticTopLevelVariable = "STATIC_TOP_LEVEL_VARIABLE", Declaration, "5 Variables",
        "", [];

    // constructors and initializers
    ConstConstructorWithNonFinalField = "CONST_CONSTRUCTOR_WITH_NON_FINAL_FIELD", Constructor, "7.6.3 Constant Constructors",
        "Cannot define the 'const' constructor for a class with non-final fields", [];
    FieldInitializedByMultipleInitializers = "FIELD_INITIALIZED_BY_MULTIPLE_INITIALIZERS", Constructor, "7.6.1 Generative Constructors",
        "The field '{}' cannot be initialized twice in the same constructor", [Text];
    FieldInitializedInInitializerAndDeclaration = "FIELD_INITIALIZED_IN_INITIALIZER_AND_DECLARATION", Constructor, "7.6.1 Generative Constructors",
        "The final field '{}' already has a value from its declaration and cannot be set again in the constructor", [Text];
    FieldInitializedInParameterAndInitializer = "FIELD_INITIALIZED_IN_PARAMETER_AND_INITIALIZER", Constructor, "7.6.1 Generative Constructors",
        "The field '{}' cannot be initialized in both the parameter list and the initializers", [Text];
    FieldInitializerFactoryConstructor = "FIELD_INITIALIZER_FACTORY_CONSTRUCTOR", Constructor, "7.6.1 Generative Constructors",
        "Initializing formal fields cannot be used in factory constructors", [];
    FieldInitializerOutsideConstructor = "FIELD_INITIALIZER_OUTSIDE_CONSTRUCTOR", Constructor, "7.6.1 Generative Constructors",
        "Initializing formal fields can only be used in constructors", [];
    FieldInitializerRedirectingConstructor = "FIELD_INITIALIZER_REDIRECTING_CONSTRUCTOR", Constructor, "7.6.1 Generative Constructors",
        "The redirecting constructor cannot have a field initializer", [];
    FinalInitializedInDeclarationAndConstructor = "FINAL_INITIALIZED_IN_DECLARATION_AND_CONSTRUCTOR", Constructor, "7.6.1 Generative Constructors",
        "'{}' is final and was given a value when it was declared, so it cannot be set to a new value", [Text];
    FinalInitializedMultipleTimes = "FINAL_INITIALIZED_MULTIPLE_TIMES", Constructor, "7.6.1 Generative Constructors",
        "'{}' is a final field and so can only be set once", [Text];
    ImplicitThisReferenceInInitializer = "IMPLICIT_THIS_REFERENCE_IN_INITIALIZER", Constructor, "7.6.1 Generative Constructors",
        "The 'this' expression cannot be implicitly used in initializers", [];
    InitializerForNonExistantField = "INITIALIZER_FOR_NON_EXISTANT_FIELD", Constructor, "7.6.1 Generative Constructors",
        "'{}' is not a variable in the enclosing class", [Text];
    InitializerForStaticField = "INITIALIZER_FOR_STATIC_FIELD", Constructor, "7.6.1 Generative Constructors",
        "'{}' is a static variable in the enclosing class, variables initialized in a constructor cannot be static", [Text];
    InitializingFormalForNonExistantField = "INITIALIZING_FORMAL_FOR_NON_EXISTANT_FIELD", Constructor, "7.6.1 Generative Constructors",
        "'{}' is not a variable in the enclosing class", [Text];
    InitializingFormalForStaticField = "INITIALIZING_FORMAL_FOR_STATIC_FIELD", Constructor, "7.6.1 Generative Constructors",
        "'{}' is a static variable in the enclosing class, variables initialized in a constructor cannot be static", [Text];
    InvalidConstructorName = "INVALID_CONSTRUCTOR_NAME", Constructor, "7.6 Constructors",
        "Invalid constructor name", [];
    InvalidFactoryNameNotAClass = "INVALID_FACTORY_NAME_NOT_A_CLASS", Constructor, "7.6.2 Factories",
        "The name of the immediately enclosing class expected", [];
    MultipleRedirectingConstructorInvocations = "MULTIPLE_REDIRECTING_CONSTRUCTOR_INVOCATIONS", Constructor, "7.6.1 Generative Constructors",
        "Constructor may have at most one 'this' redirection", [];
    MultipleSuperInitializers = "MULTIPLE_SUPER_INITIALIZERS", Constructor, "7.6.1 Generative Constructors",
        "Constructor may have at most one 'super' initializer", [];
    NoDefaultSuperConstructorExplicit = "NO_DEFAULT_SUPER_CONSTRUCTOR_EXPLICIT", Constructor, "7.6.1 Generative Constructors",
        "The class '{}' does not have a default constructor", [Type];
    NoDefaultSuperConstructorImplicit = "NO_DEFAULT_SUPER_CONSTRUCTOR_IMPLICIT", Constructor, "7.6 Constructors",
        "The class '{}' does not have a default constructor", [Type];
    NonGenerativeConstructor = "NON_GENERATIVE_CONSTRUCTOR", Constructor, "7.6.1 Generative Constructors",
        "The generative constructor '{}' expected, but factory found", [Text];
    RecursiveConstructorRedirect = "RECURSIVE_CONSTRUCTOR_REDIRECT", Constructor, "7.6.1 Generative Constructors",
        "Cycle in redirecting generative constructors", [];
    RecursiveFactoryRedirect = "RECURSIVE_FACTORY_REDIRECT", Constructor, "7.6.2 Factories",
        "Cycle in redirecting factory constructors", [];
    RedirectToNonConstConstructor = "REDIRECT_TO_NON_CONST_CONSTRUCTOR", Constructor, "7.6.2 Factories",
        "Constant factory constructor cannot delegate to a non-constant constructor", [];
    ReturnInGenerativeConstructor = "RETURN_IN_GENERATIVE_CONSTRUCTOR", Constructor, "13.11 Return",
        "Constructors cannot return a value", [];
    SuperInitializerInObject = "SUPER_INITIALIZER_IN_OBJECT", Constructor, "7.6.1 Generative Constructors",
        "", [];
    SuperInRedirectingConstructor = "SUPER_IN_REDIRECTING_CONSTRUCTOR", Constructor, "7.6.1 Generative Constructors",
        "The redirecting constructor cannot have a 'super' initializer", [];
    UndefinedConstructorInInitializer = "UNDEFINED_CONSTRUCTOR_IN_INITIALIZER", Constructor, "7.6.1 Generative Constructors",
        "The class '{}' does not have a generative constructor '{}'", [Type, Text];
    UndefinedConstructorInInitializerDefault = "UNDEFINED_CONSTRUCTOR_IN_INITIALIZER_DEFAULT", Constructor, "7.6.1 Generative Constructors",
        "The class '{}' does not have a default generative constructor", [Type];
    UninitializedFinalField = "UNINITIALIZED_FINAL_FIELD", Constructor, "7.6.1 Generative Constructors",
        "The final field '{}' must be initialized", [Text];

    // constants
    CompileTimeConstantRaisesException = "COMPILE_TIME_CONSTANT_RAISES_EXCEPTION", Constant, "12.1 Constants",
        "", [];
    ConstConstructorThrowsException = "CONST_CONSTRUCTOR_THROWS_EXCEPTION", Constant, "12.11.2 Const",
        "'const' constructors cannot throw exceptions", [];
    ConstEvalThrowsException = "CONST_EVAL_THROWS_EXCEPTION", Constant, "12.11.2 Const",
        "Evaluation of this constant expression causes exception", [];
    ConstEvalThrowsIdbze = "CONST_EVAL_THROWS_IDBZE", Constant, "12.11.2 Const",
        "Evaluation of this constant expression throws IntegerDivisionByZeroException", [];
    ConstEvalTypeBool = "CONST_EVAL_TYPE_BOOL", Constant, "12.11.2 Const",
        "An expression of type 'bool' was expected", [];
    ConstEvalTypeBoolNumString = "CONST_EVAL_TYPE_BOOL_NUM_STRING", Constant, "12.11.2 Const",
        "An expression of type 'bool', 'num', 'String' or 'null' was expected", [];
    ConstEvalTypeInt = "CONST_EVAL_TYPE_INT", Constant, "12.11.2 Const",
        "An expression of type 'int' was expected", [];
    ConstEvalTypeNum = "CONST_EVAL_TYPE_NUM", Constant, "12.11.2 Const",
        "An expression of type 'num' was expected", [];
    ConstFieldInitializerNotAssignable = "CONST_FIELD_INITIALIZER_NOT_ASSIGNABLE", Constant, "7.6.1 Generative Constructors",
        "The initializer type '{}' cannot be assigned to the field type '{}'", [Type, Type];
    ConstInitializedWithNonConstantValue = "CONST_INITIALIZED_WITH_NON_CONSTANT_VALUE", Constant, "5 Variables",
        "'const' variables must be constant value", [];
    ConstWithInvalidTypeParameters = "CONST_WITH_INVALID_TYPE_PARAMETERS", Constant, "12.11.2 Const",
        "The type '{}' is declared with {} type parameters, but {} type arguments were given", [Type, Count, Count];
    ConstWithNonConst = "CONST_WITH_NON_CONST", Constant, "12.11.2 Const",
        "The constructor being called is not a 'const' constructor", [];
    ConstWithNonConstantArgument = "CONST_WITH_NON_CONSTANT_ARGUMENT", Constant, "12.11.2 Const",
        "Arguments of a constant creation must be constant expressions", [];
    ConstWithNonType = "CONST_WITH_NON_TYPE", Constant, "12.11.2 Const",
        "The name '{}' is not a class", [Text];
    ConstWithTypeParameters = "CONST_WITH_TYPE_PARAMETERS", Constant, "12.11.2 Const",
        "The constant creation cannot use a type parameter", [];
    ConstWithUndefinedConstructor = "CONST_WITH_UNDEFINED_CONSTRUCTOR", Constant, "12.11.2 Const",
        "The class '{}' does not have a constant constructor '{}'", [Type, Text];
    ConstWithUndefinedConstructorDefault = "CONST_WITH_UNDEFINED_CONSTRUCTOR_DEFAULT", Constant, "12.11.2 Const",
        "The class '{}' does not have a default constant constructor", [Type];
    ExtraPositionalArguments = "EXTRA_POSITIONAL_ARGUMENTS", Constant, "12.14.2 Binding Actuals to Formals",
        "{} positional arguments expected, but {} found", [Count, Count];
    InvalidConstant = "INVALID_CONSTANT", Constant, "12.1 Constants",
        "", [];
    InvalidTypeArgumentInConstList = "INVALID_TYPE_ARGUMENT_IN_CONST_LIST", Constant, "12.6 Lists",
        "Constant list literals cannot include a type parameter as a type argument, such as '{}'", [Type];
    InvalidTypeArgumentInConstMap = "INVALID_TYPE_ARGUMENT_IN_CONST_MAP", Constant, "12.7 Maps",
        "Constant map literals cannot include a type parameter as a type argument, such as '{}'", [Type];
    MissingConstInListLiteral = "MISSING_CONST_IN_LIST_LITERAL", Constant, "12.1 Constants",
        "List literals must be prefixed with 'const' when used as a constant expression", [];
    MissingConstInMapLiteral = "MISSING_CONST_IN_MAP_LITERAL", Constant, "12.1 Constants",
        "Map literals must be prefixed with 'const' when used as a constant expression", [];
    NewWithInvalidTypeParameters = "NEW_WITH_INVALID_TYPE_PARAMETERS", Constant, "12.11.1 New",
        "The type '{}' is declared with {} type parameters, but {} type arguments were given", [Type, Count, Count];
    NonConstantCaseExpression = "NON_CONSTANT_CASE_EXPRESSION", Constant, "13.9 Switch",
        "Case expressions must be constant", [];
    NonConstantDefaultValue = "NON_CONSTANT_DEFAULT_VALUE", Constant, "6.2.2 Optional Formals",
        "Default values of an optional parameter must be constant", [];
    NonConstantListElement = "NON_CONSTANT_LIST_ELEMENT", Constant, "12.6 Lists",
        "'const' lists must have all constant values", [];
    NonConstantMapKey = "NON_CONSTANT_MAP_KEY", Constant, "12.7 Maps",
        "The keys in a map must be constant", [];
    NonConstantMapValue = "NON_CONSTANT_MAP_VALUE", Constant, "12.7 Maps",
        "The values in a 'const' map must be constant", [];
    NonConstantValueInInitializer = "NON_CONSTANT_VALUE_IN_INITIALIZER", Constant, "7.6.3 Constant Constructors",
        "Initializer expressions in constant constructors must be constants", [];
    NotEnoughRequiredArguments = "NOT_ENOUGH_REQUIRED_ARGUMENTS", Constant, "12.14.2 Binding Actuals to Formals",
        "{} required argument(s) expected, but {} found", [Count, Count];
    RecursiveCompileTimeConstant = "RECURSIVE_COMPILE_TIME_CONSTANT", Constant, "12.1 Constants",
        "", [];
    UndefinedClass = "UNDEFINED_CLASS", Constant, "12.11.2 Const",
        "Undefined class '{}'", [Text];
    UndefinedNamedParameter = "UNDEFINED_NAMED_PARAMETER", Constant, "12.14.2 Binding Actuals to Formals",
        "The named parameter '{}' is not defined", [Text];

    // overrides
    InvalidOverrideNamed = "INVALID_OVERRIDE_NAMED", Override, "7.1 Instance Methods",
        "Missing the named parameter '{}' to match the overridden method from '{}'", [Text, Type];
    InvalidOverridePositional = "INVALID_OVERRIDE_POSITIONAL", Override, "7.1 Instance Methods",
        "Must have at least {} optional parameters to match the overridden method from '{}'", [Count, Type];
    InvalidOverrideRequired = "INVALID_OVERRIDE_REQUIRED", Override, "7.1 Instance Methods",
        "Must have exactly {} required parameters to match the overridden method from '{}'", [Count, Type];

    // expressions
    ArgumentDefinitionTestNonParameter = "ARGUMENT_DEFINITION_TEST_NON_PARAMETER", Expression, "12.33 Argument Definition Test",
        "'{}' is not a parameter", [Text];
    DuplicateNamedArgument = "DUPLICATE_NAMED_ARGUMENT", Expression, "12.14.2 Binding Actuals to Formals",
        "The argument for the named parameter '{}' was already specified", [Text];
    InstanceMemberAccessFromStatic = "INSTANCE_MEMBER_ACCESS_FROM_STATIC", Expression, "12.30 Identifier Reference",
        "Instance member cannot be accessed from static method", [];
    InvalidReferenceToThis = "INVALID_REFERENCE_TO_THIS", Expression, "12.10 This",
        "Invalid reference to 'this' expression", [];
    InvalidTypeArgumentForKey = "INVALID_TYPE_ARGUMENT_FOR_KEY", Expression, "12.7 Maps",
        "The first type argument to a map literal must be 'String'", [];
    ReferenceToDeclaredVariableInInitializer = "REFERENCE_TO_DECLARED_VARIABLE_IN_INITIALIZER", Expression, "13.3 Local Variable Declaration",
        "The name '{}' cannot be referenced in the initializer of a variable with the same name", [Text];
    SuperInInvalidContext = "SUPER_IN_INVALID_CONTEXT", Expression, "12.15.4 Super Invocation",
        "Invalid context for 'super' invocation", [];

    // statements
    CaseExpressionTypeImplementsEquals = "CASE_EXPRESSION_TYPE_IMPLEMENTS_EQUALS", Statement, "13.9 Switch",
        "The switch case expression type '{}' cannot override the == operator", [Type];
    InconsistentCaseExpressionTypes = "INCONSISTENT_CASE_EXPRESSION_TYPES", Statement, "13.9 Switch",
        "Case expressions must have the same types, '{}' is not a '{}'", [Text, Type];
    LabelInOuterScope = "LABEL_IN_OUTER_SCOPE", Statement, "13.13 Break",
        "Cannot reference label '{}' declared in an outer method", [Text];
    LabelUndefined = "LABEL_UNDEFINED", Statement, "13.13 Break",
        "Cannot reference undefined label '{}'", [Text];
    NonConstMapAsExpressionStatement = "NON_CONST_MAP_AS_EXPRESSION_STATEMENT", Statement, "13.2 Expression Statements",
        "A non-constant map literal without type arguments cannot be used as an expression statement", [];
    RethrowOutsideCatch = "RETHROW_OUTSIDE_CATCH", Statement, "12.8.1 Rethrow",
        "rethrow must be inside of a catch clause", [];

    // operators and accessors
    OptionalParameterInOperator = "OPTIONAL_PARAMETER_IN_OPERATOR", Operator, "7.1.1 Operators",
        "Optional parameters are not allowed when defining an operator", [];
    WrongNumberOfParametersForOperator = "WRONG_NUMBER_OF_PARAMETERS_FOR_OPERATOR", Operator, "7.1.1 Operators",
        "Operator '{}' should declare exactly {} parameter(s), but {} found", [Text, Count, Count];
    WrongNumberOfParametersForOperatorMinus = "WRONG_NUMBER_OF_PARAMETERS_FOR_OPERATOR_MINUS", Operator, "7.1.1 Operators",
        "Operator '-' should declare 0 or 1 parameter, but {} found", [Count];
    WrongNumberOfParametersForSetter = "WRONG_NUMBER_OF_PARAMETERS_FOR_SETTER", Operator, "7.3 Setters",
        "Setters should declare exactly one required parameter", [];
}

impl ErrorKind {
    /// Stable symbolic name, e.g. `IMPLEMENTS_REPEATED`.
    pub fn name(self) -> &'static str {
        self.metadata().name
    }

    pub fn category(self) -> ErrorCategory {
        self.metadata().category
    }

    pub fn template(self) -> &'static str {
        self.metadata().template
    }

    pub fn arity(self) -> usize {
        self.metadata().arity()
    }

    /// Every catalog entry is a compile-time error; callers may downgrade.
    pub fn default_severity(self) -> Severity {
        Severity::Error
    }

    /// Kinds that are kept in the catalog with an empty message.
    pub fn is_reserved(self) -> bool {
        self.template().is_empty()
    }

    pub fn from_name(name: &str) -> Option<ErrorKind> {
        ErrorKind::ALL.iter().copied().find(|kind| kind.name() == name)
    }

    /// Fill the template; the argument list must match the declared placeholders.
    pub fn format(self, arguments: &[Argument]) -> Result<String, FormatError> {
        let metadata = self.metadata();
        if arguments.len() != metadata.arity() {
            return Err(FormatError::ArityMismatch {
                kind: self,
                expected: metadata.arity(),
                found: arguments.len(),
            });
        }
        for (index, (argument, param)) in arguments.iter().zip(metadata.params).enumerate() {
            if !argument.matches(*param) {
                return Err(FormatError::ArgumentKindMismatch {
                    kind: self,
                    index,
                    expected: *param,
                });
            }
        }

        let mut message = String::with_capacity(metadata.template.len());
        let mut pieces = metadata.template.split("{}");
        if let Some(first) = pieces.next() {
            message.push_str(first);
        }
        for (piece, argument) in pieces.zip(arguments) {
            message.push_str(&argument.to_string());
            message.push_str(piece);
        }
        Ok(message)
    }
}

impl fmt::Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_count_matches_declared_params() {
        for kind in ErrorKind::ALL {
            let placeholders = kind.template().matches("{}").count();
            assert_eq!(placeholders, kind.arity(), "{kind} template and params disagree");
        }
    }

    #[test]
    fn names_are_unique_and_round_trip() {
        let mut seen = std::collections::HashSet::new();
        for kind in ErrorKind::ALL {
            assert!(seen.insert(kind.name()), "duplicate name {}", kind.name());
            assert_eq!(ErrorKind::from_name(kind.name()), Some(*kind));
        }
    }

    #[test]
    fn serde_name_is_the_symbolic_name() {
        for kind in ErrorKind::ALL {
            let json = serde_json::to_string(kind).unwrap();
            assert_eq!(json, format!("\"{}\"", kind.name()));
        }
    }

    #[test]
    fn formats_in_order() {
        let message = ErrorKind::AmbiguousExport
            .format(&args!["List", "a.lib", "b.lib"])
            .unwrap();
        assert_eq!(message, "The element 'List' is defined in the libraries 'a.lib' and 'b.lib'");
    }

    #[test]
    fn formats_counts() {
        let message = ErrorKind::ConstWithInvalidTypeParameters
            .format(&args![Argument::ty("Pair"), 2usize, 1usize])
            .unwrap();
        assert_eq!(
            message,
            "The type 'Pair' is declared with 2 type parameters, but 1 type arguments were given"
        );
    }

    #[test]
    fn rejects_wrong_arity() {
        let err = ErrorKind::ImplementsRepeated.format(&args![]).unwrap_err();
        assert_eq!(
            err,
            FormatError::ArityMismatch {
                kind: ErrorKind::ImplementsRepeated,
                expected: 1,
                found: 0
            }
        );

        let err = ErrorKind::UriWithInterpolation
            .format(&args!["extra"])
            .unwrap_err();
        assert!(matches!(err, FormatError::ArityMismatch { expected: 0, found: 1, .. }));
    }

    #[test]
    fn rejects_wrong_argument_kind() {
        let err = ErrorKind::NotEnoughRequiredArguments
            .format(&args!["two", 1usize])
            .unwrap_err();
        assert_eq!(
            err,
            FormatError::ArgumentKindMismatch {
                kind: ErrorKind::NotEnoughRequiredArguments,
                index: 0,
                expected: Param::Count
            }
        );
    }

    #[test]
    fn reserved_kinds_format_to_empty() {
        for kind in ErrorKind::ALL.iter().filter(|k| k.is_reserved()) {
            assert_eq!(kind.format(&[]).unwrap(), "");
        }
        assert!(ErrorKind::RecursiveCompileTimeConstant.is_reserved());
        assert!(!ErrorKind::ImplementsRepeated.is_reserved());
    }

    #[test]
    fn categories_partition_the_catalog() {
        let directives = ErrorKind::ALL
            .iter()
            .filter(|k| k.category() == ErrorCategory::Directive)
            .count();
        assert_eq!(directives, 11);
        assert_eq!(ErrorKind::InvalidOverridePositional.category(), ErrorCategory::Override);
    }
}
