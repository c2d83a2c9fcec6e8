use std::path::PathBuf;

use pfxml_core::parse_file;

fn fixture(path: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(path)
}

#[test]
fn parses_pfsense_root_and_package_sections() {
    let node = parse_file(&fixture("fixtures/pfsense-suricata.xml")).expect("parse should succeed");
    assert_eq!(node.tag, "pfsense");

    let suricata = node
        .get_path(&["installedpackages", "suricata"])
        .expect("suricata section should exist");
    assert_eq!(suricata.get_children("rule").len(), 1);
    assert_eq!(
        suricata.get_text(&["suppress", "item", "name"]),
        Some("wansuppress_57d8285cbd9c0")
    );
}

#[test]
fn cdata_descriptions_become_plain_text() {
    let node = parse_file(&fixture("fixtures/pfsense-suricata.xml")).expect("parse should succeed");
    assert_eq!(node.get_text(&["interfaces", "lan", "descr"]), Some("LAN"));
}

#[test]
fn missing_package_section_is_not_an_error() {
    let node =
        parse_file(&fixture("fixtures/pfsense-no-suricata.xml")).expect("parse should succeed");
    assert!(node.get_path(&["installedpackages", "suricata"]).is_none());
}
