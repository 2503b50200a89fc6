//! Domain entities: typed records of a Trusted List document

use chrono::{DateTime, Utc};

use crate::domain::duplicate::{clean_item, determine_highest_counter, duplicate};
use crate::domain::names::{node, ECC, PREFERRED_LANGUAGE, TSL, TSLX};
use crate::domain::DomainResult;

/// A value tagged with a language code (`xml:lang`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MultiLangName {
    /// Language code, possibly carrying a duplication tag (`en_2`)
    pub lang: String,
    pub value: String,
}

impl MultiLangName {
    pub fn new(lang: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            lang: lang.into(),
            value: value.into(),
        }
    }

    /// Pick the value to display: English first, else the first entry.
    pub fn preferred(names: &[MultiLangName]) -> Option<&str> {
        names
            .iter()
            .find(|n| clean_item(&n.lang) == PREFERRED_LANGUAGE)
            .or_else(|| names.first())
            .map(|n| n.value.as_str())
    }

    /// Add a second entry for `lang`, tagging the language so both survive in the list.
    pub fn duplicate_in(names: &mut Vec<MultiLangName>, lang: &str, value: impl Into<String>) -> DomainResult<()> {
        let langs: Vec<&str> = names.iter().map(|n| n.lang.as_str()).collect();
        let counter = determine_highest_counter(&langs, lang)?;
        let tagged = duplicate(lang, counter);
        names.push(MultiLangName::new(tagged, value));
        Ok(())
    }
}

/// A complete Trusted List document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrustStatusList {
    pub scheme: SchemeInformation,
    pub pointers: Vec<OtherTslPointer>,
    pub providers: Vec<TrustServiceProvider>,
}

/// Scheme-level information, the payload of the root node.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemeInformation {
    pub sequence_number: Option<u32>,
    pub tsl_type: String,
    pub operator_names: Vec<MultiLangName>,
    pub territory: String,
    pub next_update: Option<DateTime<Utc>>,
}

/// Pointer to another Trusted List (or its human-readable PDF form).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OtherTslPointer {
    pub location: String,
    pub territory: String,
    pub mime_type: String,
    pub tsl_type: String,
}

impl OtherTslPointer {
    /// Display label shared by the node tree and the DOM sorter.
    pub fn label(territory: &str, mime_type: &str) -> String {
        format!("{territory} - {mime_type}")
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrustServiceProvider {
    pub information: TspInformation,
    pub services: Vec<TspService>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TspInformation {
    pub names: Vec<MultiLangName>,
    pub trade_names: Vec<MultiLangName>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TspService {
    pub information: ServiceInformation,
    pub extensions: Vec<Extension>,
    pub history: Vec<ServiceHistoryInstance>,
}

/// Service data shared by current services and their history instances.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServiceInformation {
    pub type_identifier: String,
    pub names: Vec<MultiLangName>,
    pub status: String,
    pub status_starting_time: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ServiceHistoryInstance {
    pub information: ServiceInformation,
    pub extensions: Vec<Extension>,
}

/// A service information extension.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Extension {
    pub critical: bool,
    pub content: Vec<ExtensionContent>,
}

impl Extension {
    pub fn new(critical: bool, content: Vec<ExtensionContent>) -> Self {
        Self { critical, content }
    }

    /// Content element names joined, e.g. `"Qualifications"`.
    pub fn label(&self) -> String {
        extension_label(self.content.iter().map(ExtensionContent::element_name))
    }
}

/// Label of an extension given the local names of its content elements.
pub fn extension_label<'a>(names: impl Iterator<Item = &'a str>) -> String {
    itertools::join(names, ", ")
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExtensionContent {
    Qualifications(Vec<QualificationElement>),
    TakenOverBy(TakenOverBy),
    AdditionalServiceInformation(AdditionalServiceInformation),
    ExpiredCertsRevocationInfo(DateTime<Utc>),
}

impl ExtensionContent {
    pub fn element_name(&self) -> &'static str {
        match self {
            ExtensionContent::Qualifications(_) => node::QUALIFICATIONS,
            ExtensionContent::TakenOverBy(_) => node::TAKEN_OVER_BY,
            ExtensionContent::AdditionalServiceInformation(_) => node::ADDITIONAL_SERVICE_INFORMATION,
            ExtensionContent::ExpiredCertsRevocationInfo(_) => node::EXPIRED_CERTS_REVOCATION_INFO,
        }
    }

    /// Element name with its namespace, `{namespace}local`.
    pub fn expanded_name(&self) -> String {
        let namespace = match self {
            ExtensionContent::Qualifications(_) => ECC,
            ExtensionContent::TakenOverBy(_) => TSLX,
            ExtensionContent::AdditionalServiceInformation(_) | ExtensionContent::ExpiredCertsRevocationInfo(_) => TSL,
        };
        format!("{{{namespace}}}{}", self.element_name())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualificationElement {
    /// Qualifier URIs
    pub qualifiers: Vec<String>,
    /// `assert` attribute of the criteria list (`all`, `atLeastOne`, `none`)
    pub criteria_assert: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TakenOverBy {
    pub uri: String,
    pub tsp_names: Vec<MultiLangName>,
    pub scheme_territory: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdditionalServiceInformation {
    pub uri: String,
    pub information_value: Option<String>,
}

/// Last path segment of a URI, e.g. `granted` for `.../Svcstatus/granted`.
pub fn uri_suffix(uri: &str) -> &str {
    uri.trim_end_matches('/').rsplit('/').next().unwrap_or(uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn given_english_name_when_preferred_then_returns_english() {
        let names = vec![MultiLangName::new("de", "Anbieter"), MultiLangName::new("en", "Provider")];
        assert_eq!(MultiLangName::preferred(&names), Some("Provider"));
    }

    #[test]
    fn given_no_english_name_when_preferred_then_returns_first() {
        let names = vec![MultiLangName::new("de", "Anbieter"), MultiLangName::new("fr", "Fournisseur")];
        assert_eq!(MultiLangName::preferred(&names), Some("Anbieter"));
        assert_eq!(MultiLangName::preferred(&[]), None);
    }

    #[test]
    fn given_existing_language_when_duplicate_in_then_tags_new_entry() {
        let mut names = vec![MultiLangName::new("en", "One")];
        MultiLangName::duplicate_in(&mut names, "en", "Two").unwrap();
        MultiLangName::duplicate_in(&mut names, "en", "Three").unwrap();
        let langs: Vec<&str> = names.iter().map(|n| n.lang.as_str()).collect();
        assert_eq!(langs, vec!["en", "en_1", "en_2"]);
    }

    #[test]
    fn given_mixed_content_when_label_then_joins_element_names() {
        let ext = Extension::new(
            true,
            vec![
                ExtensionContent::Qualifications(vec![]),
                ExtensionContent::AdditionalServiceInformation(AdditionalServiceInformation::default()),
            ],
        );
        assert_eq!(ext.label(), "Qualifications, AdditionalServiceInformation");
    }

    #[test]
    fn given_status_uri_when_suffix_then_returns_last_segment() {
        assert_eq!(uri_suffix("http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/granted"), "granted");
        assert_eq!(uri_suffix("granted"), "granted");
        assert_eq!(uri_suffix("http://x/y/"), "y");
    }
}
