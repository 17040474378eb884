//! Input validation: Brazilian tax-document checksums, string
//! sanitization, and the field-rule runner handlers build requests on.

pub mod document;
pub mod rules;
pub mod sanitize;

pub use document::{is_valid_cnpj, is_valid_cpf, is_valid_document, normalize};
pub use rules::{Check, FieldRules, ValidationReport};
pub use sanitize::{sanitize, sanitize_str};
