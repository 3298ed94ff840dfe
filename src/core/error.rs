//! Error handling for bazel-depgen
//!
//! This module provides the typed error enum used across the generation pipeline
//! and the user-facing reporting layer built on top of it. The design mirrors the
//! two audiences an error has:
//! 1. **Code** matches on [`DepgenError`] variants (and maps them to an [`ExitCode`])
//! 2. **Users** see an [`ErrorContext`] with details and an actionable suggestion
//!
//! # Error Categories
//!
//! - **Configuration**: [`DepgenError::ConfigNotFound`], [`DepgenError::ConfigParseError`],
//!   [`DepgenError::InvalidConfig`], [`DepgenError::InvalidCoordinate`]. Detected before
//!   any traversal happens and always fatal.
//! - **Resolution boundary**: [`DepgenError::TreeParseError`],
//!   [`DepgenError::ResolutionProblem`], [`DepgenError::ArtifactFileMissing`],
//!   [`DepgenError::NoRepositoryContainsArtifact`].
//! - **Generation**: [`DepgenError::GenerationFailed`],
//!   [`DepgenError::DirectoryCreationFailed`], [`DepgenError::TemplateError`],
//!   [`DepgenError::IoError`].
//!
//! Corrupt metadata cache files never surface here: the cache treats them as a
//! miss. Lookup-invariant violations inside the record graph are programming
//! errors and panic instead of producing a value of this type.
//!
//! # Examples
//!
//! ```rust,no_run
//! use bazel_depgen::core::{DepgenError, ExitCode, user_friendly_error};
//!
//! let error = DepgenError::InvalidConfig {
//!     reason: "duplicate artifact".to_string(),
//!     fragment: "coord: com.example:myapp".to_string(),
//! };
//! assert_eq!(error.exit_code(), ExitCode::InvalidConfig);
//!
//! let ctx = user_friendly_error(anyhow::Error::from(error));
//! ctx.display();
//! ```

use colored::Colorize;
use std::fmt;
use thiserror::Error;

/// Stable outcome codes reported by the command-line entry point.
///
/// The numeric values are part of the tool's interface: scripts wrapping the
/// generator rely on them, so existing values must never be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ExitCode {
    /// Generation completed.
    Success = 0,
    /// An error that does not fall in any other category.
    Failure = 1,
    /// The configuration file could not be found or parsed.
    LoadConfigFailed = 2,
    /// The configuration parsed but failed validation.
    InvalidConfig = 3,
    /// The resolved dependency tree could not be turned into a record graph.
    ResolutionFailed = 4,
    /// Writing generated files failed.
    GenerationFailed = 5,
    /// An output directory could not be created.
    DirectoryCreationFailed = 6,
}

impl ExitCode {
    /// Numeric process exit status.
    #[must_use]
    pub const fn code(self) -> i32 {
        self as i32
    }
}

/// The main error type for bazel-depgen operations.
///
/// Each variant carries enough context (artifact coordinate, configuration
/// fragment, path) to render an actionable message without consulting any
/// other state.
#[derive(Error, Debug)]
pub enum DepgenError {
    /// Configuration file does not exist
    #[error("Configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was searched
        path: String,
    },

    /// Configuration file is not valid YAML or does not match the schema
    #[error("Invalid configuration file syntax in {file}")]
    ConfigParseError {
        /// Path to the configuration file
        file: String,
        /// Parser message
        reason: String,
    },

    /// Configuration parsed but is semantically invalid
    ///
    /// Raised before dependency traversal begins. `fragment` holds the offending
    /// part of the configuration so the message points at what to fix.
    #[error("Invalid configuration: {reason}")]
    InvalidConfig {
        /// Why validation failed
        reason: String,
        /// The configuration fragment that failed validation
        fragment: String,
    },

    /// A coordinate string could not be parsed
    #[error("Invalid artifact coordinate '{coordinate}': {reason}")]
    InvalidCoordinate {
        /// The text that failed to parse
        coordinate: String,
        /// Why it failed
        reason: String,
    },

    /// The resolved dependency tree document could not be read
    #[error("Invalid resolved dependency tree in {file}")]
    TreeParseError {
        /// Path to the tree document
        file: String,
        /// Parser message
        reason: String,
    },

    /// The resolver reported a problem that the failure policy escalates
    #[error("Dependency resolution problem for {coordinate}: {message}")]
    ResolutionProblem {
        /// Artifact the problem was reported against
        coordinate: String,
        /// Resolver message
        message: String,
    },

    /// A resolved node does not point at an existing local file
    #[error("Resolved file for {coordinate} is missing")]
    ArtifactFileMissing {
        /// Artifact coordinate
        coordinate: String,
        /// Path the resolver reported, if any
        path: Option<String>,
    },

    /// No configured repository serves the artifact
    #[error("Unable to locate artifact {coordinate} in any repository")]
    NoRepositoryContainsArtifact {
        /// Artifact coordinate
        coordinate: String,
        /// Repositories that were consulted, in order
        repositories: Vec<String>,
    },

    /// An output directory could not be created
    #[error("Failed to create directory: {path}")]
    DirectoryCreationFailed {
        /// Directory that could not be created
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// Writing a generated file failed
    #[error("Failed to generate {path}")]
    GenerationFailed {
        /// File being written
        path: String,
        /// Underlying reason
        reason: String,
    },

    /// A build file template failed to render
    #[error("Template rendering failed for {template}: {reason}")]
    TemplateError {
        /// Name of the template
        template: String,
        /// Tera message
        reason: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic error for cases not covered by specific variants
    #[error("{message}")]
    Other {
        /// Generic error message
        message: String,
    },
}

impl DepgenError {
    /// Outcome code the CLI exits with when this error terminates a run.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        match self {
            Self::ConfigNotFound {
                ..
            }
            | Self::ConfigParseError {
                ..
            } => ExitCode::LoadConfigFailed,
            Self::InvalidConfig {
                ..
            }
            | Self::InvalidCoordinate {
                ..
            } => ExitCode::InvalidConfig,
            Self::TreeParseError {
                ..
            }
            | Self::ResolutionProblem {
                ..
            }
            | Self::ArtifactFileMissing {
                ..
            }
            | Self::NoRepositoryContainsArtifact {
                ..
            } => ExitCode::ResolutionFailed,
            Self::DirectoryCreationFailed {
                ..
            } => ExitCode::DirectoryCreationFailed,
            Self::GenerationFailed {
                ..
            }
            | Self::TemplateError {
                ..
            }
            | Self::IoError(_) => ExitCode::GenerationFailed,
            Self::Other {
                ..
            } => ExitCode::Failure,
        }
    }
}

impl Clone for DepgenError {
    fn clone(&self) -> Self {
        match self {
            Self::ConfigNotFound {
                path,
            } => Self::ConfigNotFound {
                path: path.clone(),
            },
            Self::ConfigParseError {
                file,
                reason,
            } => Self::ConfigParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::InvalidConfig {
                reason,
                fragment,
            } => Self::InvalidConfig {
                reason: reason.clone(),
                fragment: fragment.clone(),
            },
            Self::InvalidCoordinate {
                coordinate,
                reason,
            } => Self::InvalidCoordinate {
                coordinate: coordinate.clone(),
                reason: reason.clone(),
            },
            Self::TreeParseError {
                file,
                reason,
            } => Self::TreeParseError {
                file: file.clone(),
                reason: reason.clone(),
            },
            Self::ResolutionProblem {
                coordinate,
                message,
            } => Self::ResolutionProblem {
                coordinate: coordinate.clone(),
                message: message.clone(),
            },
            Self::ArtifactFileMissing {
                coordinate,
                path,
            } => Self::ArtifactFileMissing {
                coordinate: coordinate.clone(),
                path: path.clone(),
            },
            Self::NoRepositoryContainsArtifact {
                coordinate,
                repositories,
            } => Self::NoRepositoryContainsArtifact {
                coordinate: coordinate.clone(),
                repositories: repositories.clone(),
            },
            Self::DirectoryCreationFailed {
                path,
                reason,
            } => Self::DirectoryCreationFailed {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::GenerationFailed {
                path,
                reason,
            } => Self::GenerationFailed {
                path: path.clone(),
                reason: reason.clone(),
            },
            Self::TemplateError {
                template,
                reason,
            } => Self::TemplateError {
                template: template.clone(),
                reason: reason.clone(),
            },
            // io::Error is not Clone; keep the kind and message
            Self::IoError(e) => Self::IoError(std::io::Error::new(e.kind(), e.to_string())),
            Self::Other {
                message,
            } => Self::Other {
                message: message.clone(),
            },
        }
    }
}

/// Error wrapper carrying user-facing details and a suggestion.
///
/// # Examples
///
/// ```rust,no_run
/// use bazel_depgen::core::{DepgenError, ErrorContext};
///
/// let context = ErrorContext::new(DepgenError::ConfigNotFound {
///     path: "dependencies.yml".to_string(),
/// })
/// .with_suggestion("Pass --config-file or run from the directory holding dependencies.yml");
///
/// println!("{}", context);
/// ```
#[derive(Debug)]
pub struct ErrorContext {
    /// The underlying error
    pub error: DepgenError,
    /// Optional suggestion for resolving the error
    pub suggestion: Option<String>,
    /// Optional additional details about the error
    pub details: Option<String>,
}

impl ErrorContext {
    /// Create a new error context with no suggestion or details.
    #[must_use]
    pub const fn new(error: DepgenError) -> Self {
        Self {
            error,
            suggestion: None,
            details: None,
        }
    }

    /// Add a suggestion for resolving the error.
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Add details explaining the error.
    pub fn with_details(mut self, details: impl Into<String>) -> Self {
        self.details = Some(details.into());
        self
    }

    /// Exit code for the wrapped error.
    #[must_use]
    pub const fn exit_code(&self) -> ExitCode {
        self.error.exit_code()
    }

    /// Print the error to stderr with terminal colors.
    ///
    /// - Error message: red and bold
    /// - Details: yellow
    /// - Suggestion: green
    pub fn display(&self) {
        eprintln!("{}: {}", "error".red().bold(), self.error);

        if let Some(details) = &self.details {
            eprintln!("{}: {}", "details".yellow(), details);
        }

        if let Some(suggestion) = &self.suggestion {
            eprintln!("{}: {}", "suggestion".green(), suggestion);
        }
    }
}

impl fmt::Display for ErrorContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.error)?;

        if let Some(details) = &self.details {
            write!(f, "\nDetails: {details}")?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\nSuggestion: {suggestion}")?;
        }

        Ok(())
    }
}

impl std::error::Error for ErrorContext {}

/// Convert any error to a user-friendly [`ErrorContext`].
///
/// Recognizes [`DepgenError`] anywhere in the `anyhow` chain (so context added
/// with `.with_context(...)` does not hide the classification), then
/// [`std::io::Error`], then falls back to a generic message that includes the
/// full cause chain.
#[must_use]
pub fn user_friendly_error(error: anyhow::Error) -> ErrorContext {
    if let Some(depgen_error) = error.chain().find_map(|e| e.downcast_ref::<DepgenError>()) {
        let ctx = create_error_context(depgen_error.clone());
        // Outer context messages are still useful, keep them as details
        if ctx.details.is_none() && error.downcast_ref::<DepgenError>().is_none() {
            return ctx.with_details(error.to_string());
        }
        return ctx;
    }

    if let Some(io_error) = error.chain().find_map(|e| e.downcast_ref::<std::io::Error>()) {
        let ctx = ErrorContext::new(DepgenError::IoError(std::io::Error::new(
            io_error.kind(),
            io_error.to_string(),
        )))
        .with_details(error.to_string());
        return match io_error.kind() {
            std::io::ErrorKind::PermissionDenied => ctx.with_suggestion(
                "Check that the output directory and the local repository are writable",
            ),
            std::io::ErrorKind::NotFound => {
                ctx.with_suggestion("Check that the file or directory exists and the path is correct")
            }
            _ => ctx,
        };
    }

    let mut message = error.to_string();
    let chain: Vec<String> = error.chain().skip(1).map(std::string::ToString::to_string).collect();

    if !chain.is_empty() {
        message.push_str("\n\nCaused by:");
        for (i, cause) in chain.iter().enumerate() {
            message.push_str(&format!("\n  {}: {}", i + 1, cause));
        }
    }

    ErrorContext::new(DepgenError::Other {
        message,
    })
}

fn create_error_context(error: DepgenError) -> ErrorContext {
    match &error {
        DepgenError::ConfigNotFound {
            path,
        } => ErrorContext::new(error.clone())
            .with_suggestion("Pass --config-file or run the command from the directory containing dependencies.yml")
            .with_details(format!("No configuration was found at {path}")),

        DepgenError::ConfigParseError {
            file,
            reason,
        } => ErrorContext::new(error.clone())
            .with_suggestion(format!("Check the YAML syntax and property names in {file}"))
            .with_details(reason.clone()),

        DepgenError::InvalidConfig {
            fragment,
            ..
        } => ErrorContext::new(error.clone())
            .with_suggestion("Fix the configuration entry shown above and re-run the generator")
            .with_details(format!("Offending configuration:\n{fragment}")),

        DepgenError::InvalidCoordinate {
            ..
        } => ErrorContext::new(error.clone()).with_suggestion(
            "Coordinates use the form group:artifact[:type[:classifier]]:version",
        ),

        DepgenError::NoRepositoryContainsArtifact {
            coordinate,
            repositories,
        } => ErrorContext::new(error.clone())
            .with_suggestion("Add a repository that serves the artifact or check the coordinate for typos")
            .with_details(format!(
                "{coordinate} was not found in: {}",
                repositories.join(", ")
            )),

        DepgenError::ArtifactFileMissing {
            path: Some(path),
            ..
        } => ErrorContext::new(error.clone())
            .with_details(format!("Expected file at {path}"))
            .with_suggestion("Re-run dependency resolution so the local repository is populated"),

        DepgenError::DirectoryCreationFailed {
            reason,
            ..
        }
        | DepgenError::GenerationFailed {
            reason,
            ..
        } => ErrorContext::new(error.clone())
            .with_details(reason.clone())
            .with_suggestion("Check permissions of the workspace directory"),

        _ => ErrorContext::new(error.clone()),
    }
}
