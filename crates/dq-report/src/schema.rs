//! Fixed report schema.

pub const DATA_DATE: &str = "DataDate";
pub const COUNTRY_ID: &str = "CountryId";
pub const PROJECT: &str = "Project";
pub const ENTITY: &str = "Entity";
pub const TESTED_FIELDS: &str = "TestedFields";
pub const DOMAIN: &str = "Domain";
pub const SUB_DOMAIN: &str = "SubDomain";
pub const SEGMENT: &str = "Segment";
pub const AREA: &str = "Area";
pub const AUDIT_DATE: &str = "AuditDate";
pub const FUNCTION_CODE: &str = "FunctionCode";
pub const RULE_CODE: &str = "RuleCode";
pub const DATA_REQUIREMENT: &str = "DataRequirement";
pub const THRESHOLD: &str = "Threshold";
pub const RULE_GROUP: &str = "RuleGroup";
pub const RULE_PROPERTY: &str = "RuleProperty";
pub const TESTED_REGISTER_AMOUNT: &str = "TestedRegisterAmount";
pub const PASSED_REGISTERS_AMOUNT: &str = "PassedRegistersAmount";
pub const SUCCESS_RATE: &str = "SuccessRate";
pub const FAILED_REGISTERS_AMOUNT: &str = "FailedRegistersAmount";
pub const FAIL_RATE: &str = "FailRate";
pub const LIBRARY_VERSION: &str = "LibraryVersion";

/// Report columns in output order.
pub const REPORT_COLUMNS: [&str; 22] = [
    DATA_DATE,
    COUNTRY_ID,
    PROJECT,
    ENTITY,
    TESTED_FIELDS,
    DOMAIN,
    SUB_DOMAIN,
    SEGMENT,
    AREA,
    AUDIT_DATE,
    FUNCTION_CODE,
    RULE_CODE,
    DATA_REQUIREMENT,
    THRESHOLD,
    RULE_GROUP,
    RULE_PROPERTY,
    TESTED_REGISTER_AMOUNT,
    PASSED_REGISTERS_AMOUNT,
    SUCCESS_RATE,
    FAILED_REGISTERS_AMOUNT,
    FAIL_RATE,
    LIBRARY_VERSION,
];

/// Columns holding integer counts; every other column is text.
pub const COUNT_COLUMNS: [&str; 3] = [
    TESTED_REGISTER_AMOUNT,
    PASSED_REGISTERS_AMOUNT,
    FAILED_REGISTERS_AMOUNT,
];

/// `AuditDate` rendering.
pub const AUDIT_DATE_FORMAT: &str = "%Y-%m-%d_%H-%M-%S";

/// Placeholder for date and country on the prerequisites failure report.
pub const MISSING_VALUE: &str = "-";
