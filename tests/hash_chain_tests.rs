//! Hash chain vectors and properties.
//!
//! Run with: `cargo test --test hash_chain_tests`

#![cfg(feature = "core")]

use chrono::{DateTime, FixedOffset, NaiveDate};
use proptest::prelude::*;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use verifactu::core::hash::canonical_input;
use verifactu::core::money::round_amount;
use verifactu::*;

const V1: &str = "3C464DAF61ACB827C65FDA19F352A4E3BDC2C640E9E9FC4CC058073F38F12F60";
const V2: &str = "F7B94CFD8924EDFF273501B01EE5153E4CE8F259766F88CF6ACB8935802A2B97";
const V3: &str = "177547C0D57AC74748561D054A9CEC14B4C4EA23D1BEFD6F2E69E3A388F90C68";

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn ts(s: &str) -> DateTime<FixedOffset> {
    DateTime::parse_from_rfc3339(s).unwrap()
}

fn issuer() -> LegalEntity {
    LegalEntity::new("Issuer SL", "89890001K")
}

fn invoice(number: &str, at: &str, previous: Option<PreviousRecord>) -> InvoiceRecord {
    let mut builder = SubmissionBuilder::new(issuer(), number, date(2024, 1, 1), InvoiceType::Standard)
        .description("Test")
        .recipient(Recipient::domestic("Client SA", "B12345678").unwrap())
        .qualification(OperationQualification::SubjectDirect)
        .amounts(Amounts::new(dec!(10), dec!(111.10), dec!(12.35), dec!(123.45)))
        .generated_at(ts(at));
    if let Some(prev) = previous {
        builder = builder.previous(prev);
    }
    builder.build().unwrap().into()
}

#[test]
fn three_record_chain() {
    let first = invoice("12345678/G33", "2024-01-01T19:20:30+01:00", None);
    assert!(first.header().is_first());
    assert_eq!(first.seal(), V1);

    let prev = PreviousRecord::new("12345678/G33", date(2024, 1, 1), first.seal()).unwrap();
    let second = invoice("12345679/G34", "2024-01-01T19:20:35+01:00", Some(prev));
    assert_eq!(second.seal(), V2);

    let prev = PreviousRecord::new("12345679/G34", date(2024, 1, 1), second.seal()).unwrap();
    let cancellation: InvoiceRecord =
        CancellationBuilder::new(issuer(), "12345679/G34", date(2024, 1, 1))
            .previous(prev)
            .generated_at(ts("2024-01-01T19:20:40+01:00"))
            .build()
            .into();
    assert_eq!(cancellation.seal(), V3);
}

#[test]
fn cancellation_input_layout() {
    let prev = PreviousRecord::new("12345679/G34", date(2024, 1, 1), V2).unwrap();
    let cancellation: InvoiceRecord =
        InvoiceCancellation::new(issuer(), "12345679/G34", date(2024, 1, 1), Some(prev)).into();
    assert_eq!(
        canonical_input(&cancellation, "2024-01-01T19:20:40+01:00"),
        format!(
            "IDEmisorFacturaAnulada=89890001K&NumSerieFacturaAnulada=12345679/G34\
             &FechaExpedicionFacturaAnulada=01-01-2024&Huella={V2}\
             &FechaHoraHusoGenRegistro=2024-01-01T19:20:40+01:00"
        )
    );
}

#[test]
fn seal_is_stable_and_blocks_mutation() {
    let mut record = invoice("A-1", "2024-01-01T19:20:30+01:00", None);
    let hash = record.seal().to_string();
    assert!(record.is_sealed());
    assert_eq!(record.seal(), hash);
    assert_eq!(record.header().sealed_hash(), Some(hash.as_str()));

    let InvoiceRecord::Submission(ref mut submission) = record else {
        panic!("expected a submission");
    };
    let err = submission
        .set_operation_qualification(OperationQualification::SubjectReverseCharge)
        .unwrap_err();
    assert!(matches!(err, VerifactuError::Sealed(_)));
    let err = submission
        .set_previous(PreviousRecord::new("A-0", date(2023, 12, 31), V1).unwrap())
        .unwrap_err();
    assert!(matches!(err, VerifactuError::Sealed(_)));
}

#[test]
fn compute_hash_does_not_seal() {
    let record = invoice("A-1", "2024-01-01T19:20:30+01:00", None);
    let once = compute_hash(&record, None);
    assert_eq!(compute_hash(&record, None), once);
    assert!(!record.is_sealed());
    assert_eq!(record.seal(), once);
}

#[test]
fn amounts_enter_the_hash_rounded() {
    let a = SubmissionBuilder::new(issuer(), "A-1", date(2024, 1, 1), InvoiceType::Standard)
        .amounts(Amounts::new(dec!(21), dec!(10), dec!(2.1), dec!(12.1)))
        .generated_at(ts("2024-01-01T10:00:00+01:00"))
        .build()
        .unwrap();
    let b = SubmissionBuilder::new(issuer(), "A-1", date(2024, 1, 1), InvoiceType::Standard)
        .amounts(Amounts::new(dec!(21), dec!(10), dec!(2.1000), dec!(12.099999)))
        .generated_at(ts("2024-01-01T10:00:00+01:00"))
        .build()
        .unwrap();
    assert_eq!(
        compute_hash(&InvoiceRecord::from(a), None),
        compute_hash(&InvoiceRecord::from(b), None)
    );
}

#[test]
fn empty_previous_hash_rejected() {
    assert!(PreviousRecord::new("A-1", date(2024, 1, 1), "").is_err());
    assert!(PreviousRecord::new("", date(2024, 1, 1), V1).is_err());
}

proptest! {
    #[test]
    fn hash_is_deterministic_upper_hex(
        number in "[A-Z0-9/-]{1,20}",
        cents in 0i64..100_000_000,
        second in 0u32..60,
    ) {
        let total = Decimal::new(cents, 2);
        let at = format!("2024-05-01T08:15:{second:02}+02:00");
        let build = || -> InvoiceRecord {
            SubmissionBuilder::new(issuer(), number.clone(), date(2024, 5, 1), InvoiceType::Simplified)
                .amounts(Amounts::new(dec!(21), total, Decimal::ZERO, total))
                .generated_at(ts(&at))
                .build()
                .unwrap()
                .into()
        };
        let h1 = compute_hash(&build(), None);
        let h2 = compute_hash(&build(), None);
        prop_assert_eq!(&h1, &h2);
        prop_assert_eq!(h1.len(), 64);
        prop_assert!(h1.chars().all(|c| c.is_ascii_digit() || ('A'..='F').contains(&c)));
    }

    #[test]
    fn amounts_always_two_decimals(mantissa in -10_000_000_000i64..10_000_000_000, scale in 0u32..6) {
        let value = Decimal::new(mantissa, scale);
        let formatted = format_amount(value);
        let (_, frac) = formatted.split_once('.').unwrap();
        prop_assert_eq!(frac.len(), 2);
        prop_assert!(!formatted.contains(','));
        prop_assert_eq!(formatted.parse::<Decimal>().unwrap(), round_amount(value));
    }
}
