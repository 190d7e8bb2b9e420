use std::fs;

use aideon_leads::IngestError;
use aideon_leads::aliases::{AliasTable, FieldProfile};
use aideon_leads::model::CanonicalField;
use aideon_leads::resolve::ColumnResolver;
use tempfile::tempdir;

#[test]
fn resolves_common_export_headers() {
    let resolver = ColumnResolver::new(AliasTable::standard());
    let mapping = resolver.resolve(&["Customer Name", "Mobile Number", "Email ID", "Notes"]);

    assert_eq!(mapping.header(CanonicalField::Name), Some("Customer Name"));
    assert_eq!(mapping.header(CanonicalField::Phone), Some("Mobile Number"));
    assert_eq!(mapping.header(CanonicalField::Email), Some("Email ID"));
    assert_eq!(mapping.column(CanonicalField::Email).map(|c| c.index), Some(2));
    assert_eq!(mapping.len(), 3);
    assert!(!mapping.is_resolved(CanonicalField::City));
}

#[test]
fn header_matching_ignores_case_and_padding() {
    let resolver = ColumnResolver::new(AliasTable::standard());
    let mapping = resolver.resolve(&["  WHATSAPP NUMBER ", "location"]);

    assert_eq!(mapping.header(CanonicalField::Phone), Some("  WHATSAPP NUMBER "));
    assert_eq!(mapping.header(CanonicalField::City), Some("location"));
}

#[test]
fn first_alias_in_declaration_order_wins() {
    let resolver = ColumnResolver::new(AliasTable::standard());
    // "phone" is declared before "mobile", regardless of column order.
    let mapping = resolver.resolve(&["Mobile", "Phone"]);
    assert_eq!(mapping.header(CanonicalField::Phone), Some("Phone"));

    let mapping = resolver.resolve(&["Contact Number", "Mobile Number"]);
    assert_eq!(mapping.header(CanonicalField::Phone), Some("Mobile Number"));
}

#[test]
fn duplicate_headers_resolve_to_the_leftmost_column() {
    let resolver = ColumnResolver::new(AliasTable::standard());
    let mapping = resolver.resolve(&["Email", "email "]);
    assert_eq!(mapping.column(CanonicalField::Email).map(|c| c.index), Some(0));
}

#[test]
fn missing_phone_column_is_reported() {
    let resolver = ColumnResolver::new(AliasTable::standard());
    let mapping = resolver.resolve(&["Name", "Email"]);
    assert!(!mapping.has_phone());
}

#[test]
fn extended_profile_adds_salary_and_alternate_phone() {
    let headers = ["Name", "Phone", "CTC", "Alternate Number"];

    let standard = ColumnResolver::new(AliasTable::for_profile(FieldProfile::Standard));
    let mapping = standard.resolve(&headers);
    assert!(!mapping.is_resolved(CanonicalField::Salary));
    assert!(!mapping.is_resolved(CanonicalField::AlternatePhone));

    let extended = ColumnResolver::new(AliasTable::for_profile(FieldProfile::Extended));
    let mapping = extended.resolve(&headers);
    assert_eq!(mapping.header(CanonicalField::Salary), Some("CTC"));
    assert_eq!(mapping.header(CanonicalField::AlternatePhone), Some("Alternate Number"));
}

#[test]
fn alias_overrides_replace_spellings_per_field() {
    let overrides = AliasTable::from_json_str(r#"{ "phone": ["cell"], "city": ["district"] }"#)
        .expect("alias overrides parsed");
    let table = AliasTable::standard().with_overrides(overrides);

    assert_eq!(table.aliases(CanonicalField::Phone), ["cell".to_string()]);
    assert_eq!(
        table.aliases(CanonicalField::Name),
        AliasTable::standard().aliases(CanonicalField::Name)
    );

    let mapping = ColumnResolver::new(table).resolve(&["Cell", "Mobile", "District"]);
    assert_eq!(mapping.header(CanonicalField::Phone), Some("Cell"));
    assert_eq!(mapping.header(CanonicalField::City), Some("District"));
}

#[test]
fn alias_file_is_read_from_disk() {
    let temp_dir = tempdir().expect("temporary directory");
    let path = temp_dir.path().join("aliases.json");
    fs::write(&path, r#"{ "salary": ["pay"] }"#).expect("alias file written");

    let table = AliasTable::from_json_file(&path).expect("alias file parsed");
    assert!(table.recognises(CanonicalField::Salary));
    assert!(!table.recognises(CanonicalField::Phone));
}

#[test]
fn invalid_alias_files_are_rejected() {
    for source in [
        r#"{ "nickname": ["nick"] }"#,
        r#"{ "phone": [] }"#,
        r#"{ "phone": ["  "] }"#,
        r#"["phone"]"#,
    ] {
        let result = AliasTable::from_json_str(source);
        assert!(
            matches!(result, Err(IngestError::InvalidAliasTable(_))),
            "source {source} gave {result:?}"
        );
    }
}
