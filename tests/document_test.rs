//! Tests for the XML save pipeline on a complete sample list

use std::fs;

use rstest::{fixture, rstest};

use tslkit::domain::names::{attr, node, DSIG, ECC, TSL, XML};
use tslkit::domain::{ExtensionContent, TslTree};
use tslkit::xml::{
    node_to_string, parse, read_trust_status_list, remove_empty_nodes_from_the_bottom, sort_child_nodes,
    to_string, wrap_all_extensions, WriteOptions, XmlDocument,
};
use tslkit::util::testing::{init_test_setup, resource_path};

#[fixture]
fn sample() -> XmlDocument {
    init_test_setup();
    let content = fs::read_to_string(resource_path("tsl/sample-tl.xml")).expect("read sample");
    parse(&content).expect("parse sample")
}

fn texts(doc: &XmlDocument, ns: &str, local: &str) -> Vec<String> {
    doc.find_elements(ns, local)
        .into_iter()
        .map(|n| doc.text_content(n).trim().to_string())
        .collect()
}

fn service_names(doc: &XmlDocument) -> Vec<String> {
    doc.find_elements(TSL, node::SERVICE_NAME)
        .into_iter()
        .filter(|&n| {
            doc.parent(n)
                .is_some_and(|p| doc.is_element(p, TSL, node::SERVICE_INFORMATION))
        })
        .map(|n| doc.text_content(n))
        .collect()
}

// ============================================================
// sort_child_nodes
// ============================================================

#[rstest]
fn given_sample_when_sorted_then_pointers_grouped_by_territory_with_pdf_last(mut sample: XmlDocument) {
    let root = sample.root().unwrap();

    sort_child_nodes(&mut sample, root, false).unwrap();

    assert_eq!(
        texts(&sample, TSL, node::TSL_LOCATION),
        vec![
            "https://www.example.at/TrustedList.xml",
            "https://www.example.at/TrustedList.pdf",
            "https://ec.europa.eu/tools/lotl/eu-lotl.xml",
        ]
    );
}

#[rstest]
fn given_sample_when_sorted_then_providers_reverse_and_services_ascending(mut sample: XmlDocument) {
    let root = sample.root().unwrap();

    sort_child_nodes(&mut sample, root, false).unwrap();

    assert_eq!(
        service_names(&sample),
        vec!["Zeta QTSA", "Qualified CA", "Timestamp Service"]
    );
}

#[rstest]
fn given_sample_when_sorted_then_history_ascending_with_missing_time_last(mut sample: XmlDocument) {
    let root = sample.root().unwrap();

    sort_child_nodes(&mut sample, root, false).unwrap();

    let history = sample.find_elements(TSL, node::SERVICE_HISTORY_INSTANCE);
    let statuses: Vec<String> = history
        .into_iter()
        .filter_map(|h| sample.child_text(h, TSL, node::SERVICE_STATUS))
        .map(|s| s.rsplit('/').next().unwrap_or_default().to_string())
        .collect();
    assert_eq!(statuses, vec!["accredited", "granted", "undersupervision"]);
}

#[rstest]
fn given_sample_when_sorted_descending_then_collections_reversed(mut sample: XmlDocument) {
    let root = sample.root().unwrap();

    sort_child_nodes(&mut sample, root, true).unwrap();

    assert_eq!(
        texts(&sample, TSL, node::TSL_LOCATION),
        vec![
            "https://ec.europa.eu/tools/lotl/eu-lotl.xml",
            "https://www.example.at/TrustedList.pdf",
            "https://www.example.at/TrustedList.xml",
        ]
    );
    assert_eq!(
        service_names(&sample),
        vec!["Timestamp Service", "Qualified CA", "Zeta QTSA"]
    );
}

#[rstest]
fn given_sample_when_sorted_then_scheme_information_children_by_node_name(mut sample: XmlDocument) {
    let root = sample.root().unwrap();
    let scheme = sample.find_child(root, TSL, node::SCHEME_INFORMATION).unwrap();

    sort_child_nodes(&mut sample, root, false).unwrap();

    let names: Vec<String> = sample.children(scheme).into_iter().map(|c| sample.node_name(c)).collect();
    let mut expected = names.clone();
    expected.sort();
    assert_eq!(names, expected);
    assert_eq!(sample.local_name(sample.children(scheme)[0]), Some("ListIssueDateTime"));
}

#[rstest]
fn given_sample_when_sorted_then_signature_untouched(mut sample: XmlDocument) {
    let root = sample.root().unwrap();
    let signature = sample.find_child(root, DSIG, node::SIGNATURE).unwrap();
    let before = node_to_string(&sample, signature, WriteOptions::default()).unwrap();

    sort_child_nodes(&mut sample, root, false).unwrap();

    assert_eq!(node_to_string(&sample, signature, WriteOptions::default()).unwrap(), before);
}

const NAMELESS_PROVIDER: &str = r#"<TrustServiceStatusList xmlns="http://uri.etsi.org/02231/v2#">
  <TrustServiceProviderList>
    <TrustServiceProvider>
      <TSPInformation><TSPTradeName><Name xml:lang="en">Nameless Ltd</Name></TSPTradeName></TSPInformation>
    </TrustServiceProvider>
    <TrustServiceProvider>
      <TSPInformation><TSPName><Name xml:lang="en">Acme</Name></TSPName></TSPInformation>
    </TrustServiceProvider>
  </TrustServiceProviderList>
</TrustServiceStatusList>"#;

const NAMELESS_SERVICE: &str = r#"<TrustServiceStatusList xmlns="http://uri.etsi.org/02231/v2#">
  <TrustServiceProviderList>
    <TrustServiceProvider>
      <TSPInformation><TSPName><Name xml:lang="en">Acme</Name></TSPName></TSPInformation>
      <TSPServices>
        <TSPService><ServiceInformation><ServiceName><Name xml:lang="en">Timestamps</Name></ServiceName></ServiceInformation></TSPService>
        <TSPService><ServiceInformation><ServiceStatus>http://uri.etsi.org/TrstSvc/TrustedList/Svcstatus/granted</ServiceStatus></ServiceInformation></TSPService>
      </TSPServices>
    </TrustServiceProvider>
  </TrustServiceProviderList>
</TrustServiceStatusList>"#;

const EMPTY_POINTER: &str = r#"<TrustServiceStatusList xmlns="http://uri.etsi.org/02231/v2#"
    xmlns:tslx="http://uri.etsi.org/02231/v2/additionaltypes#">
  <SchemeInformation>
    <SchemeTerritory>AT</SchemeTerritory>
    <PointersToOtherTSL>
      <OtherTSLPointer>
        <TSLLocation>https://example.org/be.xml</TSLLocation>
        <AdditionalInformation>
          <OtherInformation><SchemeTerritory>BE</SchemeTerritory></OtherInformation>
          <OtherInformation><tslx:MimeType>application/vnd.etsi.tsl+xml</tslx:MimeType></OtherInformation>
        </AdditionalInformation>
      </OtherTSLPointer>
      <OtherTSLPointer><TSLLocation>https://example.org/unknown.xml</TSLLocation></OtherTSLPointer>
    </PointersToOtherTSL>
  </SchemeInformation>
</TrustServiceStatusList>"#;

#[rstest]
#[case::sample(include_str!("resources/tsl/sample-tl.xml"))]
#[case::nameless_provider(NAMELESS_PROVIDER)]
#[case::nameless_service(NAMELESS_SERVICE)]
#[case::empty_pointer(EMPTY_POINTER)]
fn given_document_when_tree_and_dom_sorted_then_same_document_order(#[case] source: &str) {
    init_test_setup();
    let doc = parse(source).unwrap();

    let mut tree = TslTree::from_list(read_trust_status_list(&doc).unwrap());
    tree.sort_all().unwrap();
    let from_tree = tree.into_list().unwrap();

    let mut dom = doc;
    let root = dom.root().unwrap();
    sort_child_nodes(&mut dom, root, false).unwrap();
    let from_dom = read_trust_status_list(&dom).unwrap();

    assert_eq!(from_tree, from_dom);
}

#[test]
fn given_nameless_provider_when_dom_sorted_then_goes_last() {
    init_test_setup();
    let mut doc = parse(NAMELESS_PROVIDER).unwrap();
    let root = doc.root().unwrap();

    sort_child_nodes(&mut doc, root, false).unwrap();

    let list = read_trust_status_list(&doc).unwrap();
    let names: Vec<usize> = list.providers.iter().map(|p| p.information.names.len()).collect();
    assert_eq!(names, vec![1, 0]);
}

// ============================================================
// remove_empty_nodes_from_the_bottom
// ============================================================

#[rstest]
fn given_sample_when_pruned_then_placeholders_removed(mut sample: XmlDocument) {
    let root = sample.root().unwrap();
    let before = sample.len();

    remove_empty_nodes_from_the_bottom(&mut sample, root);

    assert!(sample.find_elements(TSL, node::TSP_TRADE_NAME).is_empty());
    assert!(sample.find_elements(TSL, "ServiceSupplyPoints").is_empty());
    assert_eq!(
        texts(&sample, TSL, node::URI)
            .into_iter()
            .filter(|t| t.starts_with("http://www.example.at"))
            .count(),
        1
    );
    // URI and TradeName and SupplyPoints with their text, plus the bare CriteriaList
    assert_eq!(before - sample.len(), 9);
}

#[rstest]
fn given_sample_when_pruned_then_signature_untouched(mut sample: XmlDocument) {
    let root = sample.root().unwrap();
    let signature = sample.find_child(root, DSIG, node::SIGNATURE).unwrap();
    let before = node_to_string(&sample, signature, WriteOptions::default()).unwrap();
    assert!(before.contains(r#"xml:lang="en_2""#));
    assert!(before.contains(r#"Id="----""#));

    remove_empty_nodes_from_the_bottom(&mut sample, root);

    assert_eq!(node_to_string(&sample, signature, WriteOptions::default()).unwrap(), before);
}

#[rstest]
fn given_sample_when_pruned_then_qualifiers_and_next_update_kept(mut sample: XmlDocument) {
    let root = sample.root().unwrap();

    remove_empty_nodes_from_the_bottom(&mut sample, root);

    assert_eq!(sample.find_elements(TSL, node::NEXT_UPDATE).len(), 1);
    assert_eq!(sample.find_elements(ECC, node::QUALIFIERS).len(), 1);
    assert_eq!(sample.find_elements(ECC, node::QUALIFIER).len(), 1);
    assert!(sample.find_elements(ECC, node::CRITERIA_LIST).is_empty());
}

#[rstest]
fn given_sample_when_pruned_then_duplication_tags_stripped(mut sample: XmlDocument) {
    let root = sample.root().unwrap();

    remove_empty_nodes_from_the_bottom(&mut sample, root);

    let operator = sample.find_elements(TSL, node::SCHEME_OPERATOR_NAME)[0];
    let langs: Vec<&str> = sample
        .find_children(operator, TSL, node::NAME)
        .into_iter()
        .filter_map(|n| {
            sample
                .attributes(n)
                .iter()
                .find(|a| a.name.is(XML, attr::LANG))
                .map(|a| a.value.as_str())
        })
        .collect();
    assert_eq!(langs, vec!["de", "en", "en"]);
}

#[rstest]
fn given_pruned_sample_when_pruned_again_then_nothing_removed(mut sample: XmlDocument) {
    let root = sample.root().unwrap();
    remove_empty_nodes_from_the_bottom(&mut sample, root);
    let once = to_string(&sample, WriteOptions::default()).unwrap();

    remove_empty_nodes_from_the_bottom(&mut sample, root);

    assert_eq!(to_string(&sample, WriteOptions::default()).unwrap(), once);
}

// ============================================================
// wrap_all_extensions
// ============================================================

#[rstest]
fn given_sample_when_extensions_wrapped_then_each_extension_holds_one_item(mut sample: XmlDocument) {
    assert_eq!(wrap_all_extensions(&mut sample).unwrap(), 1);

    let extensions = sample.find_elements(TSL, node::EXTENSION);
    assert_eq!(extensions.len(), 3);
    assert!(extensions.iter().all(|&e| sample.child_elements(e).len() == 1));

    let critical: Vec<Option<&str>> = extensions
        .iter()
        .map(|&e| sample.attribute(e, attr::CRITICAL))
        .collect();
    assert_eq!(critical, vec![Some("true"), Some("true"), Some("false")]);
}

#[rstest]
fn given_wrapped_sample_when_read_then_typed_extensions_split_too(mut sample: XmlDocument) {
    wrap_all_extensions(&mut sample).unwrap();

    let list = read_trust_status_list(&sample).unwrap();
    let service = &list.providers[0].services[1];
    let labels: Vec<String> = service.extensions.iter().map(|e| e.label()).collect();
    assert_eq!(
        labels,
        vec![
            "Qualifications",
            "AdditionalServiceInformation",
            "AdditionalServiceInformation",
        ]
    );
    assert!(matches!(
        &service.extensions[0].content[0],
        ExtensionContent::Qualifications(q) if q.len() == 1
    ));
}
