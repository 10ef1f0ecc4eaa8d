use std::fmt::Display;

use thiserror::Error;

use crate::Position;

/// A positioned diagnostic produced by the lexer, parser or analyzer.
///
/// Compilation stops at the first one of these; there is no recovery.
#[derive(Debug, Clone, PartialEq)]
pub struct Error {
    internal_error: ErrorImpl,
    position: Position,
}

impl Error {
    pub fn new(error_impl: ErrorImpl, position: Position) -> Self {
        Error {
            internal_error: error_impl,
            position,
        }
    }

    pub fn get_position(&self) -> &Position {
        &self.position
    }

    pub fn get_impl(&self) -> &ErrorImpl {
        &self.internal_error
    }

    /// The human readable message, without position.
    pub fn get_message(&self) -> String {
        self.internal_error.to_string()
    }

    pub fn kind(&self) -> ErrorKind {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { .. }
            | ErrorImpl::UnexpectedToken { .. }
            | ErrorImpl::UnexpectedTokenDetailed { .. }
            | ErrorImpl::NumberParseError { .. } => ErrorKind::SyntaxError,
            ErrorImpl::IdentifierNotFound { .. }
            | ErrorImpl::TypeNotFound { .. }
            | ErrorImpl::NotAType { .. }
            | ErrorImpl::ReturnTypeNotFound { .. }
            | ErrorImpl::ArgumentTypeNotFound { .. }
            | ErrorImpl::SubsymbolNotFound { .. }
            | ErrorImpl::MemberNotFound { .. } => ErrorKind::NameError,
            ErrorImpl::AlreadyInSymtab { .. }
            | ErrorImpl::DuplicateArgument { .. }
            | ErrorImpl::BuiltinOverride { .. } => ErrorKind::DuplicateSymbolError,
            ErrorImpl::InitializerTypeMismatch { .. }
            | ErrorImpl::OperatorTypeMismatch { .. }
            | ErrorImpl::AssignmentTypeMismatch { .. }
            | ErrorImpl::AssignToBooleanLiteral
            | ErrorImpl::ConditionNotBoolean { .. }
            | ErrorImpl::ReturnTypeMismatch { .. }
            | ErrorImpl::ArgumentTypeMismatch { .. }
            | ErrorImpl::NotAFunction { .. }
            | ErrorImpl::PrintArgumentType { .. } => ErrorKind::TypeError,
            ErrorImpl::WrongArgumentCount { .. } => ErrorKind::ArityError,
            ErrorImpl::StatementNotAllowed { .. } | ErrorImpl::StatementNotAllowedInClass => {
                ErrorKind::InvalidScopeError
            }
            ErrorImpl::LowercaseClassName { .. } => ErrorKind::NamingError,
            ErrorImpl::MissingReturn { .. } => ErrorKind::MissingReturnError,
            ErrorImpl::ModuleNotFound { .. } => ErrorKind::ModuleNotFoundError,
            ErrorImpl::ModuleOverride { .. } => ErrorKind::ImportOverrideError,
            ErrorImpl::NullInitializer | ErrorImpl::NullTypeDesignation => {
                ErrorKind::InvalidTypeError
            }
        }
    }

    pub fn get_error_name(&self) -> &'static str {
        self.kind().as_str()
    }

    pub fn get_tip(&self) -> ErrorTip {
        match &self.internal_error {
            ErrorImpl::UnrecognisedToken { token } => {
                ErrorTip::Suggestion(format!("Unrecognised character `{}`", token))
            }
            ErrorImpl::UnexpectedToken { token } => ErrorTip::Suggestion(format!(
                "Unexpected token: `{}`, did you miss a semicolon?",
                token
            )),
            ErrorImpl::UnexpectedTokenDetailed { token, message } => {
                ErrorTip::Suggestion(format!("Unexpected token: `{}`, {}", token, message))
            }
            ErrorImpl::NumberParseError { token } => ErrorTip::Suggestion(format!(
                "Invalid number: `{}`, is it above the integer limit?",
                token
            )),
            ErrorImpl::LowercaseClassName { name } => ErrorTip::Suggestion(format!(
                "Class names start with an uppercase letter, try `{}`",
                capitalize(name)
            )),
            ErrorImpl::MissingReturn { .. } => ErrorTip::Suggestion(String::from(
                "Add a `return` statement to the function body or declare it `: Null`",
            )),
            ErrorImpl::ModuleNotFound { .. } => {
                ErrorTip::Suggestion(String::from("The only available module is `io`"))
            }
            _ => ErrorTip::Suggestion(self.get_message()),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Error at {}:{}: {}",
            self.position.line, self.position.col, self.internal_error
        )
    }
}

impl std::error::Error for Error {}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// The error taxonomy reported to users.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    SyntaxError,
    NameError,
    DuplicateSymbolError,
    TypeError,
    ArityError,
    InvalidScopeError,
    NamingError,
    MissingReturnError,
    ModuleNotFoundError,
    ImportOverrideError,
    InvalidTypeError,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::SyntaxError => "SyntaxError",
            ErrorKind::NameError => "NameError",
            ErrorKind::DuplicateSymbolError => "DuplicateSymbolError",
            ErrorKind::TypeError => "TypeError",
            ErrorKind::ArityError => "ArityError",
            ErrorKind::InvalidScopeError => "InvalidScopeError",
            ErrorKind::NamingError => "NamingError",
            ErrorKind::MissingReturnError => "MissingReturnError",
            ErrorKind::ModuleNotFoundError => "ModuleNotFoundError",
            ErrorKind::ImportOverrideError => "ImportOverrideError",
            ErrorKind::InvalidTypeError => "InvalidTypeError",
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

pub enum ErrorTip {
    None,
    Suggestion(String),
}

impl Display for ErrorTip {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorTip::None => write!(f, ""),
            ErrorTip::Suggestion(suggestion) => write!(f, "{}", suggestion),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ErrorImpl {
    #[error("unrecognised token: {token:?}")]
    UnrecognisedToken { token: String },
    #[error("unexpected token: {token:?}")]
    UnexpectedToken { token: String },
    #[error("unexpected token ({message}): {token:?}")]
    UnexpectedTokenDetailed { token: String, message: String },
    #[error("error parsing number: {token:?}")]
    NumberParseError { token: String },

    #[error("Identifier '{name}' is not found")]
    IdentifierNotFound { name: String },
    #[error("Type '{name}' not found")]
    TypeNotFound { name: String },
    #[error("Identifier '{name}' does not name a type")]
    NotAType { name: String },
    #[error("Return type '{type_name}' of function '{function}' is not found")]
    ReturnTypeNotFound { type_name: String, function: String },
    #[error("Identifier '{type_name}' in type of argument '{argument}' in function '{function}' is not found")]
    ArgumentTypeNotFound {
        type_name: String,
        argument: String,
        function: String,
    },
    #[error("Identifier '{owner}' has no subsymbol '{member}'")]
    SubsymbolNotFound { owner: String, member: String },
    #[error("Identifier '{owner}.{member}' is not found")]
    MemberNotFound { owner: String, member: String },

    #[error("Identifier '{name}' is already in symtab")]
    AlreadyInSymtab { name: String },
    #[error("Identifier '{name}' in argument list of function '{function}' is already in symtab")]
    DuplicateArgument { name: String, function: String },
    #[error("Overriding builtin '{name}' is not allowed")]
    BuiltinOverride { name: String },

    #[error("Initializer type '{init}' does not match explicit type '{explicit}'")]
    InitializerTypeMismatch { init: String, explicit: String },
    #[error("Operator '{operator}' not defined for types '{left}' and '{right}'")]
    OperatorTypeMismatch {
        operator: String,
        left: String,
        right: String,
    },
    #[error("Left type '{left}' of assignment does not match the right type '{right}'")]
    AssignmentTypeMismatch { left: String, right: String },
    #[error("Can not assign to boolean literal")]
    AssignToBooleanLiteral,
    #[error("{statement} only accepts tests of type 'Boolean'")]
    ConditionNotBoolean { statement: String },
    #[error("Return statement type '{value}' does not match function return type '{expected}'")]
    ReturnTypeMismatch { value: String, expected: String },
    #[error("Argument {index} in call to function '{function}' has type '{received}' which does not match definition type '{expected}'")]
    ArgumentTypeMismatch {
        index: usize,
        function: String,
        received: String,
        expected: String,
    },
    #[error("'{name}' is not a function")]
    NotAFunction { name: String },
    #[error("io.print only accepts Integer64, String, or Boolean, received '{received}'")]
    PrintArgumentType { received: String },

    #[error("Call to function '{function}' has wrong number of arguments: expected {expected}, received {received}")]
    WrongArgumentCount {
        function: String,
        expected: usize,
        received: usize,
    },

    #[error("{statement} not allowed in this scope")]
    StatementNotAllowed { statement: String },
    #[error("Statement not allowed in class scope")]
    StatementNotAllowedInClass,

    #[error("Class name '{name}' can not start with a lowercase letter")]
    LowercaseClassName { name: String },

    #[error("Function '{function}' is missing return value")]
    MissingReturn { function: String },

    #[error("Module '{name}' not found")]
    ModuleNotFound { name: String },
    #[error("Overriding imported module '{name}' is not allowed")]
    ModuleOverride { name: String },

    #[error("Null type can not be used in let initializer")]
    NullInitializer,
    #[error("Null type can not be used in let type designation")]
    NullTypeDesignation,
}

/// Failure while lowering an analyzed tree to module text.
///
/// These are distinct from semantic errors: the tree already passed analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CodegenError {
    #[error("{construct} is not supported by the code generator (at {position})")]
    Unsupported {
        construct: String,
        position: Position,
    },
    #[error("missing type information at {position}, was the tree analyzed?")]
    MissingType { position: Position },
}
