use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use socks_infra::{ImportError, LedgerError, StoreError};

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ServiceError {
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// How a transport layer should answer a failed call.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionKind {
    BadRequest,
    NotFound,
    Conflict,
    Internal,
}

impl RejectionKind {
    /// Matching HTTP status code.
    pub fn status(self) -> u16 {
        match self {
            RejectionKind::BadRequest => 400,
            RejectionKind::NotFound => 404,
            RejectionKind::Conflict => 409,
            RejectionKind::Internal => 500,
        }
    }
}

fn store_kind(err: &StoreError) -> RejectionKind {
    match err {
        StoreError::UniqueViolation(_) | StoreError::Conflict(_) => RejectionKind::Conflict,
        StoreError::NotFound(_) => RejectionKind::NotFound,
        StoreError::Unavailable(_) => RejectionKind::Internal,
    }
}

impl ServiceError {
    pub fn kind(&self) -> RejectionKind {
        match self {
            ServiceError::Ledger(LedgerError::Validation(_) | LedgerError::Rejected(_)) => {
                RejectionKind::BadRequest
            }
            ServiceError::Ledger(LedgerError::NotFound) => RejectionKind::NotFound,
            ServiceError::Ledger(LedgerError::Store(e)) => store_kind(e),
            ServiceError::Import(
                ImportError::EmptyInput | ImportError::Unreadable { .. } | ImportError::Parse { .. },
            ) => RejectionKind::BadRequest,
            ServiceError::Import(ImportError::Read(_)) => RejectionKind::Internal,
            ServiceError::Import(ImportError::Store(e)) => store_kind(e),
            ServiceError::Store(e) => store_kind(e),
            ServiceError::Internal(_) => RejectionKind::Internal,
        }
    }

    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ServiceError::Ledger(LedgerError::Validation(_)) => "validation_error",
            ServiceError::Ledger(LedgerError::Rejected(_)) => "movement_rejected",
            ServiceError::Ledger(LedgerError::NotFound) => "not_found",
            ServiceError::Import(ImportError::EmptyInput) => "empty_input",
            ServiceError::Import(ImportError::Unreadable { .. }) => "unreadable_source",
            ServiceError::Import(ImportError::Parse { .. } | ImportError::Read(_)) => "import_error",
            ServiceError::Ledger(LedgerError::Store(e))
            | ServiceError::Import(ImportError::Store(e))
            | ServiceError::Store(e) => match e {
                StoreError::UniqueViolation(_) => "duplicate_stock",
                StoreError::Conflict(_) => "conflict",
                StoreError::NotFound(_) => "not_found",
                StoreError::Unavailable(_) => "store_error",
            },
            ServiceError::Internal(_) => "internal_error",
        }
    }

    /// Error body in the shape `{"error": code, "message": ...}`.
    pub fn to_json(&self) -> serde_json::Value {
        json!({
            "error": self.code(),
            "message": self.to_string(),
        })
    }
}
