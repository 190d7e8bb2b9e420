use aideon_leads::IngestError;
use aideon_leads::model::{CanonicalRecord, PhoneNumber};
use aideon_leads::store::postgres::encode_copy_payload;
use aideon_leads::store::{MemoryStore, RecordSink, TargetTable};

fn record(name: &str, phone: &str) -> CanonicalRecord {
    CanonicalRecord {
        email: Some(format!("{}@example.com", name.to_lowercase())),
        name: Some(name.to_string()),
        age: None,
        city: Some("Pune".to_string()),
        phone: PhoneNumber::new(phone, "+91"),
        bio: None,
        referral_code: None,
        lead_source: "Manual Excel Import".to_string(),
        user_type: "1".to_string(),
        category_name: "Finance".to_string(),
        salary: None,
    }
}

#[tokio::test]
async fn loading_the_same_batch_twice_inserts_nothing_new() {
    let batch = vec![record("Asha", "9845012345"), record("Ravi", "9845099999")];
    let mut store = MemoryStore::new();

    let first = store.load(&batch).await.expect("first load");
    let second = store.load(&batch).await.expect("second load");

    assert_eq!(first, 2);
    assert_eq!(second, 0);
    assert_eq!(store.len(), 2);
}

#[tokio::test]
async fn first_record_for_a_key_wins() {
    let mut store = MemoryStore::new();
    store
        .load(&[record("Asha", "9845012345")])
        .await
        .expect("first load");
    let inserted = store
        .load(&[record("Imposter", "9845012345"), record("Ravi", "9845099999")])
        .await
        .expect("second load");

    assert_eq!(inserted, 1);
    let names: Vec<_> = store
        .records()
        .iter()
        .map(|r| r.name.clone().unwrap_or_default())
        .collect();
    assert_eq!(names, ["Asha", "Ravi"]);
}

#[tokio::test]
async fn empty_batch_is_a_no_op() {
    let mut store = MemoryStore::new();
    assert_eq!(store.load(&[]).await.expect("empty load"), 0);
    assert!(store.is_empty());
}

#[test]
fn target_table_names_are_validated_and_quoted() {
    let table = TargetTable::parse("users").expect("plain name");
    assert_eq!(table.quoted(), "\"users\"");
    assert_eq!(table.qualified_staging(), "pg_temp.\"users_staging\"");

    let table = TargetTable::parse("crm.leads").expect("qualified name");
    assert_eq!(table.quoted(), "\"crm\".\"leads\"");
    assert_eq!(table.name(), "leads");

    for bad in ["", "users; drop table users", "a.b.c", "1users", "users\""] {
        assert!(
            matches!(TargetTable::parse(bad), Err(IngestError::InvalidTableName(_))),
            "accepted {bad:?}"
        );
    }
}

#[test]
fn column_list_matches_table_layout() {
    let table = TargetTable::default();
    assert_eq!(
        table.column_list(),
        "\"email\", \"name\", \"age\", \"city\", \"phone\", \"countryCode\", \"bio\", \
         \"referralCode\", \"LeadSource\", \"type\", \"categoryName\""
    );

    let with_salary = TargetTable::default().with_salary(true);
    assert_eq!(with_salary.columns().last(), Some(&"salary"));
    assert_eq!(with_salary.columns().len(), 12);
}

#[test]
fn copy_payload_writes_absent_values_as_empty_fields() {
    let mut asha = record("Asha", "9845012345");
    asha.age = Some(31);
    asha.bio = Some("Likes \"mutual funds\", SIPs".to_string());
    asha.salary = Some(250000.0);

    let payload = encode_copy_payload(&[asha.clone()], false).expect("payload encoded");
    let text = String::from_utf8(payload).expect("utf-8 payload");
    assert_eq!(
        text,
        "asha@example.com,Asha,31,Pune,9845012345,+91,\"Likes \"\"mutual funds\"\", SIPs\",,\
         Manual Excel Import,1,Finance\n"
    );

    let payload = encode_copy_payload(&[asha], true).expect("payload encoded");
    let text = String::from_utf8(payload).expect("utf-8 payload");
    assert!(text.ends_with(",Finance,250000\n"), "{text}");
}
