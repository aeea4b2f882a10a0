//! Declared message codes.
//!
//! Every exception and log code the host and its plugins share is listed
//! here, grouped by category. The tables are plain data; the registry
//! ([`crate::registry::Taxonomy`]) validates and materializes them once at
//! startup.
//!
//! # Governance
//!
//! - Exception codes carry their HTTP status; do not reuse a sequence number
//!   with a different status.
//! - Every code must have a template in `plugin-messages.properties`. The
//!   tests at the bottom of this file fail the build otherwise.
//! - Severity is normally left to the catalog or status inference. A
//!   declared severity (`=> Severity::X`) is only the last resort.

use crate::{CodeDef, ErrorCategory, LogCategory, LogDef, define_exception_codes, define_log_codes};

// -----------------------------------------------------------------------------
// Exceptions: Auth (AN) - credential handling
// -----------------------------------------------------------------------------
define_exception_codes! {
    ErrorCategory::Auth => {
        PASSWORD_INVALID        = "PR400-AN-0001",
        IDTOKEN_ENCODED_INVALID = "PR400-AN-0002",
        AUTHN_FAILED            = "PR401-AN-0003",
        REQUIRED_PARAM_MISSING  = "PR400-AN-0004",
        UNSUPPORTED_GRANT_TYPE  = "PR400-AN-0005",
    }
}

// -----------------------------------------------------------------------------
// Exceptions: Authn (AU) - tokens and identity providers
// -----------------------------------------------------------------------------
define_exception_codes! {
    ErrorCategory::Authn => {
        TOKEN_PARSE_ERROR            = "PR400-AU-0001",
        TOKEN_EXPIRED                = "PR401-AU-0002",
        TOKEN_DSIG_INVALID           = "PR400-AU-0003",
        OIDC_INVALID_ISSUER          = "PR400-AU-0004",
        UNSUPPORTED_ACCOUNT_GRANT_TYPE = "PR401-AU-0005",
    }
}

// -----------------------------------------------------------------------------
// Exceptions: NetWork (NW) - outbound calls
// -----------------------------------------------------------------------------
define_exception_codes! {
    ErrorCategory::NetWork => {
        NETWORK_ERROR           = "PR500-NW-0000",
        HTTP_REQUEST_FAILED     = "PR500-NW-0001",
        UNEXPECTED_RESPONSE     = "PR500-NW-0002",
        UNEXPECTED_VALUE        = "PR500-NW-0003",
        TEMPORARILY_UNAVAILABLE = "PR503-NW-0004",
    }
}

// -----------------------------------------------------------------------------
// Exceptions: OData (OD) - data parsing
// -----------------------------------------------------------------------------
define_exception_codes! {
    ErrorCategory::OData => {
        JSON_PARSE_ERROR = "PR400-OD-0001",
        NO_SUCH_ENTITY   = "PR404-OD-0002",
    }
}

// -----------------------------------------------------------------------------
// Exceptions: Server (SV) and Misc (MC)
// -----------------------------------------------------------------------------
define_exception_codes! {
    ErrorCategory::Server => {
        UNKNOWN_ERROR         = "PR500-SV-0000",
        CONFIGURATION_INVALID = "PR500-SV-0001",
    }
}

define_exception_codes! {
    ErrorCategory::Misc => {
        UNREACHABLE_CODE       = "PR500-MC-0001",
        METHOD_NOT_IMPLEMENTED = "PR501-MC-0002",
    }
}

/// Every declared exception code.
pub const EXCEPTION_CODES: &[CodeDef] = &[
    PASSWORD_INVALID,
    IDTOKEN_ENCODED_INVALID,
    AUTHN_FAILED,
    REQUIRED_PARAM_MISSING,
    UNSUPPORTED_GRANT_TYPE,
    TOKEN_PARSE_ERROR,
    TOKEN_EXPIRED,
    TOKEN_DSIG_INVALID,
    OIDC_INVALID_ISSUER,
    UNSUPPORTED_ACCOUNT_GRANT_TYPE,
    NETWORK_ERROR,
    HTTP_REQUEST_FAILED,
    UNEXPECTED_RESPONSE,
    UNEXPECTED_VALUE,
    TEMPORARILY_UNAVAILABLE,
    JSON_PARSE_ERROR,
    NO_SUCH_ENTITY,
    UNKNOWN_ERROR,
    CONFIGURATION_INVALID,
    UNREACHABLE_CODE,
    METHOD_NOT_IMPLEMENTED,
];

/// Log codes, namespaced by category to keep identical names apart.
pub mod log {
    use super::*;
    use crate::Severity;

    /// OData processing.
    pub mod odata {
        use super::*;
        define_log_codes! {
            LogCategory::OData => {
                FOUND_MULTIPLE_RECORDS   = "PL-OD-0001",
                BULK_INSERT_FAIL         = "PL-OD-0002",
                DUPLICATED_PROPERTY_NAME = "PL-OD-0003",
            }
        }
    }

    /// WebDAV resources.
    pub mod dav {
        use super::*;
        define_log_codes! {
            LogCategory::Dav => {
                ROLE_NOT_FOUND                  = "PL-DV-0001",
                REQUESTED_RANGE_NOT_SATISFIABLE = "PL-DV-0002",
                FILE_TOO_SHORT                  = "PL-DV-0003",
                FILE_DELETE_FAIL                = "PL-DV-0004",
            }
        }
    }

    /// Token handling.
    pub mod auth {
        use super::*;
        define_log_codes! {
            LogCategory::Auth => {
                TOKEN_PARSE_ERROR              = "PL-AU-0001",
                TOKEN_DISG_ERROR               = "PL-AU-0002",
                ROOT_CA_CRT_SETTING_ERROR      = "PL-AU-0003",
                ACCOUNT_ALREADY_DELETED        = "PL-AU-0004",
                UNSUPPORTED_ACCOUNT_GRANT_TYPE = "PL-AU-0005",
            }
        }
    }

    /// OpenID Connect.
    pub mod oidc {
        use super::*;
        define_log_codes! {
            LogCategory::Oidc => {
                NO_SUCH_ACCOUNT                = "PL-OI-0001",
                UNSUPPORTED_ACCOUNT_GRANT_TYPE = "PL-OI-0002",
                INVALID_ACCOUNT                = "PL-OI-0003",
                INVALID_ISSUER                 = "PL-OI-0004",
            }
        }
    }

    /// Host-side failures and datastore traffic.
    pub mod server {
        use super::*;
        define_log_codes! {
            LogCategory::Server => {
                DATA_STORE_ENTITY_CREATE_FAIL      = "PL-SV-0001",
                DATA_STORE_ENTITY_UPDATE_FAIL      = "PL-SV-0002",
                DATA_STORE_ENTITY_DELETE_FAIL      = "PL-SV-0003",
                MEMCACHED_PORT_FORMAT_ERROR        = "PL-SV-0004",
                MEMCACHED_CONNECT_FAIL             = "PL-SV-0005",
                MEMCACHED_SET_FAIL                 = "PL-SV-0006",
                MEMCACHED_CLEAR_FAIL               = "PL-SV-0007",
                MEMCACHED_DELETE_FAIL              = "PL-SV-0008",
                DATA_STORE_ENTITY_BULK_CREATE_FAIL = "PL-SV-0009",
                RDB_CONNECT_FAIL                   = "PL-SV-0010",
                EXECUTE_QUERY_SQL_FAIL             = "PL-SV-0011",
                RDB_DISCONNECT_FAIL                = "PL-SV-0012",
                ADS_CONNECTION_ERROR               = "PL-SV-0013",
                ES_INDEX_NOT_EXIST                 = "PL-SV-0014",
                FAILED_TO_CREATE_ADS               = "PL-SV-0015",
                JDBC_EXEC_SQL                      = "PL-SV-0016" => Severity::Debug,
                FAILED_TO_START_SERVER             = "PL-SV-0017",
                JDBC_USER_ODATA_SQL                = "PL-SV-0018" => Severity::Debug,
                SET_REFERENCE_ONLY_LOCK            = "PL-SV-0019",
                WRITE_ADS_FAILURE_LOG_ERROR        = "PL-SV-0020",
                WRITE_ADS_FAILURE_LOG_INFO         = "PL-SV-0021",
            }
        }
    }

    /// Search-engine traffic.
    pub mod es {
        use super::*;
        define_log_codes! {
            LogCategory::Es => {
                CONNECTED         = "PL-ES-0001",
                AFTER_REQUEST     = "PL-ES-0002",
                CREATING_INDEX    = "PL-ES-0003",
                AFTER_CREATE      = "PL-ES-0004",
                AFTER_CREATE_BODY = "PL-ES-0005",
            }
        }
    }

    /// Everything else.
    pub mod misc {
        use super::*;
        define_log_codes! {
            LogCategory::Misc => {
                UNREACHABLE_CODE_ERROR = "PL-MC-0001",
            }
        }
    }

    /// Every declared log code.
    pub const LOG_CODES: &[LogDef] = &[
        odata::FOUND_MULTIPLE_RECORDS,
        odata::BULK_INSERT_FAIL,
        odata::DUPLICATED_PROPERTY_NAME,
        dav::ROLE_NOT_FOUND,
        dav::REQUESTED_RANGE_NOT_SATISFIABLE,
        dav::FILE_TOO_SHORT,
        dav::FILE_DELETE_FAIL,
        auth::TOKEN_PARSE_ERROR,
        auth::TOKEN_DISG_ERROR,
        auth::ROOT_CA_CRT_SETTING_ERROR,
        auth::ACCOUNT_ALREADY_DELETED,
        auth::UNSUPPORTED_ACCOUNT_GRANT_TYPE,
        oidc::NO_SUCH_ACCOUNT,
        oidc::UNSUPPORTED_ACCOUNT_GRANT_TYPE,
        oidc::INVALID_ACCOUNT,
        oidc::INVALID_ISSUER,
        server::DATA_STORE_ENTITY_CREATE_FAIL,
        server::DATA_STORE_ENTITY_UPDATE_FAIL,
        server::DATA_STORE_ENTITY_DELETE_FAIL,
        server::MEMCACHED_PORT_FORMAT_ERROR,
        server::MEMCACHED_CONNECT_FAIL,
        server::MEMCACHED_SET_FAIL,
        server::MEMCACHED_CLEAR_FAIL,
        server::MEMCACHED_DELETE_FAIL,
        server::DATA_STORE_ENTITY_BULK_CREATE_FAIL,
        server::RDB_CONNECT_FAIL,
        server::EXECUTE_QUERY_SQL_FAIL,
        server::RDB_DISCONNECT_FAIL,
        server::ADS_CONNECTION_ERROR,
        server::ES_INDEX_NOT_EXIST,
        server::FAILED_TO_CREATE_ADS,
        server::JDBC_EXEC_SQL,
        server::FAILED_TO_START_SERVER,
        server::JDBC_USER_ODATA_SQL,
        server::SET_REFERENCE_ONLY_LOCK,
        server::WRITE_ADS_FAILURE_LOG_ERROR,
        server::WRITE_ADS_FAILURE_LOG_INFO,
        es::CONNECTED,
        es::AFTER_REQUEST,
        es::CREATING_INDEX,
        es::AFTER_CREATE,
        es::AFTER_CREATE_BODY,
        misc::UNREACHABLE_CODE_ERROR,
    ];
}

pub use log::LOG_CODES;
