//! Namespace and element name constants for Trusted List documents.

/// Placeholder used by every bound field to mean "nothing selected".
pub const NO_SELECTION_ENTRY: &str = "----";

/// Trusted List namespace (ETSI TS 119 612)
pub const TSL: &str = "http://uri.etsi.org/02231/v2#";

/// Trusted List additional types namespace
pub const TSLX: &str = "http://uri.etsi.org/02231/v2/additionaltypes#";

/// Qualifications extension namespace
pub const ECC: &str = "http://uri.etsi.org/TrstSvc/SvcInfoExt/eSigDir-1999-93-EC-TrustedList/#";

/// XML Digital Signature namespace
pub const DSIG: &str = "http://www.w3.org/2000/09/xmldsig#";

/// XML namespace
pub const XML: &str = "http://www.w3.org/XML/1998/namespace";

// ── Element names ────────────────────────────────────────────────────

pub mod node {
    pub const SIGNATURE: &str = "Signature";

    // Scheme information
    pub const TRUST_SERVICE_STATUS_LIST: &str = "TrustServiceStatusList";
    pub const SCHEME_INFORMATION: &str = "SchemeInformation";
    pub const TSL_SEQUENCE_NUMBER: &str = "TSLSequenceNumber";
    pub const TSL_TYPE: &str = "TSLType";
    pub const SCHEME_OPERATOR_NAME: &str = "SchemeOperatorName";
    pub const SCHEME_TERRITORY: &str = "SchemeTerritory";
    pub const NEXT_UPDATE: &str = "NextUpdate";
    pub const DATE_TIME: &str = "dateTime";
    pub const NAME: &str = "Name";
    pub const URI: &str = "URI";

    // Pointers
    pub const POINTERS_TO_OTHER_TSL: &str = "PointersToOtherTSL";
    pub const OTHER_TSL_POINTER: &str = "OtherTSLPointer";
    pub const TSL_LOCATION: &str = "TSLLocation";
    pub const ADDITIONAL_INFORMATION: &str = "AdditionalInformation";
    pub const OTHER_INFORMATION: &str = "OtherInformation";
    pub const MIME_TYPE: &str = "MimeType";

    // Providers and services
    pub const TRUST_SERVICE_PROVIDER_LIST: &str = "TrustServiceProviderList";
    pub const TRUST_SERVICE_PROVIDER: &str = "TrustServiceProvider";
    pub const TSP_INFORMATION: &str = "TSPInformation";
    pub const TSP_NAME: &str = "TSPName";
    pub const TSP_TRADE_NAME: &str = "TSPTradeName";
    pub const TSP_SERVICES: &str = "TSPServices";
    pub const TSP_SERVICE: &str = "TSPService";
    pub const SERVICE_INFORMATION: &str = "ServiceInformation";
    pub const SERVICE_TYPE_IDENTIFIER: &str = "ServiceTypeIdentifier";
    pub const SERVICE_NAME: &str = "ServiceName";
    pub const SERVICE_STATUS: &str = "ServiceStatus";
    pub const STATUS_STARTING_TIME: &str = "StatusStartingTime";
    pub const SERVICE_HISTORY: &str = "ServiceHistory";
    pub const SERVICE_HISTORY_INSTANCE: &str = "ServiceHistoryInstance";

    // Extensions
    pub const SERVICE_INFORMATION_EXTENSIONS: &str = "ServiceInformationExtensions";
    pub const EXTENSION: &str = "Extension";
    pub const QUALIFICATIONS: &str = "Qualifications";
    pub const QUALIFICATION_ELEMENT: &str = "QualificationElement";
    pub const QUALIFIERS: &str = "Qualifiers";
    pub const QUALIFIER: &str = "Qualifier";
    pub const CRITERIA_LIST: &str = "CriteriaList";
    pub const TAKEN_OVER_BY: &str = "TakenOverBy";
    pub const ADDITIONAL_SERVICE_INFORMATION: &str = "AdditionalServiceInformation";
    pub const INFORMATION_VALUE: &str = "InformationValue";
    pub const EXPIRED_CERTS_REVOCATION_INFO: &str = "ExpiredCertsRevocationInfo";
}

// ── Attribute names ──────────────────────────────────────────────────

pub mod attr {
    pub const LANG: &str = "lang";
    pub const CRITICAL: &str = "Critical";
    pub const QUALIFIER_URI: &str = "uri";
    pub const ASSERT: &str = "assert";
}

/// Language whose name is picked for display labels and sort keys.
pub const PREFERRED_LANGUAGE: &str = "en";
