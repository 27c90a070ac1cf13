//! # rusty-forms-validator
//!
//! Declarative form constraints that validate on the server and describe
//! themselves to a client-side engine (Parsley style `data-parsley-*`
//! attributes), plus conditional "validate if" logic between fields.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use rusty_forms_validator::{FormValidator, Length, MemoryForm, Required, SubmittedData};
//!
//! let mut validator = FormValidator::new();
//! validator.attach_to_form(MemoryForm::new("Signup", &["Email", "Name", "Newsletter"]))?;
//!
//! validator
//!     .add_required_fields(["Email"])?
//!     .set_constraint("Name", Length::range(2, 40)?)?;
//!
//! // Name only validates when the newsletter box is ticked
//! validator.validate_if("Name", "Newsletter").is_checked().end()?;
//!
//! let data = SubmittedData::new().with("Email", "").with("Newsletter", "1");
//! if !validator.run_server_validation(&data)? {
//!     for error in validator.errors() {
//!         println!("{}: {}", error.field_name, error.message);
//!     }
//! }
//! ```
//!
//! ## Features
//!
//! - **`default`** - Constraints, logic and the in-memory form
//! - **`http`** - [`remote::HttpTransport`], a blocking reqwest transport for
//!   remote constraints
//!
//! ## Architecture
//!
//! - [`constraint`] - The [`Constraint`] trait and every constraint kind
//! - [`logic`] - Criteria trees built by chaining predicates
//! - [`validator`] - The per-form registry running server validation
//! - [`form`] - The form framework boundary ([`FormAdapter`]) and [`MemoryForm`]
//! - [`remote`], [`messages`], [`config`] - Injected capabilities and settings

pub mod config;
pub mod constraint;
pub mod error;
pub mod field_logic;
pub mod form;
pub mod logic;
pub mod messages;
pub mod remote;
pub mod submission;
pub mod validator;

pub use config::{ClientConfig, RemoteConfig, ValidatorConfig};
pub use constraint::{
    Bounds, Check, Comparison, ComparisonOp, Constraint, ConstraintExt, ConstraintKind,
    ConstraintSet, DataType, Date, Dimension, DimensionRule, EqualTo, ImageInspector, Length,
    NotEqualTo, Regex, Remote, Required, Type, ValidationContext, Value, Verdict, Words,
};
pub use error::{ConfigError, ValidationError, ValidationResult, ValidatorError};
pub use field_logic::FieldLogic;
pub use form::{FormAdapter, MemoryField, MemoryForm, ScriptRequirement};
pub use logic::{Criteria, CriteriaBuilder, Criterion, LogicalOperator, Operator};
pub use messages::{DefaultTranslator, MessageCatalog, Translator};
pub use remote::{HttpMethod, RemoteRequest, RemoteResponse, RemoteTransport, TransportError};
pub use submission::{FieldValue, SubmittedData, UploadedFile};
pub use validator::{ClientSync, FormValidator, RequiredField};
