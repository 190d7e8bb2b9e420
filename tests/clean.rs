use std::path::Path;

use aideon_leads::aliases::AliasTable;
use aideon_leads::clean::{
    CleanPolicy, DEFAULT_CATEGORY_NAME, DEFAULT_LEAD_SOURCE, DEFAULT_USER_TYPE, LeadSourcePolicy,
    RecordCleaner,
};
use aideon_leads::model::{PhoneNumber, RawBatch, RawRecord};
use aideon_leads::resolve::ColumnResolver;

fn batch(headers: &[&str], rows: &[&[&str]]) -> RawBatch {
    RawBatch::new(
        headers.iter().map(|h| h.to_string()).collect(),
        rows.iter()
            .enumerate()
            .map(|(idx, cells)| {
                RawRecord::new(idx as u64 + 2, cells.iter().map(|c| c.to_string()).collect())
            })
            .collect(),
    )
}

fn cleaner(aliases: AliasTable, policy: CleanPolicy) -> RecordCleaner {
    RecordCleaner::new(ColumnResolver::new(aliases), policy)
}

#[test]
fn three_rows_with_one_invalid_phone_yield_two_records() {
    let input = batch(
        &["Customer Name", "Mobile Number", "Email ID", "City"],
        &[
            &["Asha Rao", "+91 98450 12345", " Asha@Example.com ", "Bengaluru"],
            &["Vikram Singh", "12345", "vikram@example.com", "Delhi"],
            &["Meera Iyer", "09812345678", "", "  "],
        ],
    );

    let cleaned = cleaner(AliasTable::standard(), CleanPolicy::default())
        .clean(&input, Path::new("data/contacts.csv"));

    assert_eq!(cleaned.records.len(), 2);
    assert_eq!(cleaned.stats.rows_read, 3);
    assert_eq!(cleaned.stats.rows_without_phone, 1);
    assert_eq!(cleaned.stats.cleaned, 2);

    let first = &cleaned.records[0];
    assert_eq!(first.name.as_deref(), Some("Asha Rao"));
    assert_eq!(first.phone, PhoneNumber::new("9845012345", "+91"));
    assert_eq!(first.email.as_deref(), Some("asha@example.com"));
    assert_eq!(first.city.as_deref(), Some("Bengaluru"));
    assert_eq!(first.lead_source, DEFAULT_LEAD_SOURCE);
    assert_eq!(first.user_type, DEFAULT_USER_TYPE);
    assert_eq!(first.category_name, DEFAULT_CATEGORY_NAME);
    assert_eq!(first.salary, None);

    let second = &cleaned.records[1];
    assert_eq!(second.name.as_deref(), Some("Meera Iyer"));
    assert_eq!(second.phone.national, "9812345678");
    assert_eq!(second.email, None);
    assert_eq!(second.city, None);
}

#[test]
fn batch_without_phone_column_yields_nothing() {
    let input = batch(&["Name", "Email"], &[&["Asha", "asha@example.com"]]);
    let cleaned = cleaner(AliasTable::standard(), CleanPolicy::default())
        .clean(&input, Path::new("contacts.csv"));

    assert!(cleaned.records.is_empty());
    assert_eq!(cleaned.stats.rows_read, 1);
    assert_eq!(cleaned.stats.rows_without_phone, 1);
}

#[test]
fn exact_duplicates_are_removed_keeping_order() {
    let input = batch(
        &["Name", "Phone"],
        &[
            &["Asha", "9845012345"],
            &["Ravi", "9845099999"],
            &["Asha", "+919845012345"],
            &["Asha (work)", "9845012345"],
        ],
    );

    let cleaned = cleaner(AliasTable::standard(), CleanPolicy::default())
        .clean(&input, Path::new("contacts.csv"));

    let names: Vec<_> = cleaned
        .records
        .iter()
        .map(|record| record.name.as_deref().unwrap_or_default())
        .collect();
    // Same key with different data is not an exact duplicate; the store
    // resolves that conflict.
    assert_eq!(names, ["Asha", "Ravi", "Asha (work)"]);
    assert_eq!(cleaned.stats.duplicates_removed, 1);
}

#[test]
fn lead_source_can_follow_the_file_name() {
    let input = batch(&["Phone"], &[&["9845012345"]]);
    let policy = CleanPolicy {
        lead_source: LeadSourcePolicy::FileStem,
        user_type: "2".to_string(),
        category_name: "Insurance".to_string(),
    };

    let cleaned = cleaner(AliasTable::standard(), policy)
        .clean(&input, Path::new("/imports/Diwali Expo Leads.csv"));

    let record = &cleaned.records[0];
    assert_eq!(record.lead_source, "Diwali Expo Leads");
    assert_eq!(record.user_type, "2");
    assert_eq!(record.category_name, "Insurance");
}

#[test]
fn fixed_lead_source_is_used_verbatim() {
    let policy = LeadSourcePolicy::Fixed("Walk-in".to_string());
    assert_eq!(policy.lead_source_for(Path::new("anything.csv")), "Walk-in");
}

#[test]
fn extended_profile_reads_salary_and_falls_back_to_alternate_phone() {
    let input = batch(
        &["Name", "Phone", "Alternate Phone", "Salary", "Age"],
        &[
            &["Asha", "n/a", "98450 12345", "6.5 lakh", "29 yrs"],
            &["Ravi", "9845099999", "9845011111", "1,20,000", ""],
            &["Kiran", "", "", "1 cr", "40"],
        ],
    );

    let cleaned = cleaner(AliasTable::extended(), CleanPolicy::default())
        .clean(&input, Path::new("payroll.csv"));

    assert_eq!(cleaned.records.len(), 2);
    assert_eq!(cleaned.records[0].phone.national, "9845012345");
    assert_eq!(cleaned.records[0].salary, Some(650000.0));
    assert_eq!(cleaned.records[0].age, Some(29));
    assert_eq!(cleaned.records[1].phone.national, "9845099999");
    assert_eq!(cleaned.records[1].salary, Some(120000.0));
    assert_eq!(cleaned.records[1].age, None);
}

#[test]
fn standard_profile_ignores_salary_columns() {
    let input = batch(&["Phone", "Salary"], &[&["9845012345", "50000"]]);
    let cleaned = cleaner(AliasTable::standard(), CleanPolicy::default())
        .clean(&input, Path::new("contacts.csv"));
    assert_eq!(cleaned.records[0].salary, None);
}

#[test]
fn short_rows_leave_missing_fields_empty() {
    let input = batch(&["Phone", "Name", "City"], &[&["9845012345"]]);
    let cleaned = cleaner(AliasTable::standard(), CleanPolicy::default())
        .clean(&input, Path::new("contacts.csv"));

    assert_eq!(cleaned.records.len(), 1);
    assert_eq!(cleaned.records[0].name, None);
    assert_eq!(cleaned.records[0].city, None);
}
