use criterion::{Criterion, criterion_group, criterion_main};
use domain::{
    AddressInput, CitizenInput, CredentialInput, validate_address, validate_citizen,
    validate_credential,
};

fn citizen_input() -> CitizenInput {
    CitizenInput {
        national_id: Some("RUAA900101MDFZNN09".to_string()),
        first_name: Some("Ana".to_string()),
        paternal_surname: Some("Ruiz".to_string()),
        birth_date: Some("1990-01-01".to_string()),
    }
}

fn bench_validate_citizen(c: &mut Criterion) {
    let input = citizen_input();

    c.bench_function("domain/validate_citizen", |b| {
        b.iter(|| validate_citizen(&input).unwrap());
    });
}

fn bench_validate_composite(c: &mut Criterion) {
    let citizen = citizen_input();
    let credential = CredentialInput {
        folio: Some("F-001".to_string()),
        kind: Some("REPLACEMENT".to_string()),
        issue_date: Some("2024-01-01T09:00:00Z".to_string()),
    };
    let address = AddressInput {
        street: Some("Av. Reforma 1".to_string()),
        municipality: Some("CDMX".to_string()),
        state: Some("CDMX".to_string()),
    };

    c.bench_function("domain/validate_composite", |b| {
        b.iter(|| {
            validate_citizen(&citizen).unwrap();
            validate_credential(Some(&credential)).unwrap();
            validate_address(Some(&address)).unwrap();
        });
    });
}

fn bench_rejected_kind(c: &mut Criterion) {
    let credential = CredentialInput {
        folio: Some("F-001".to_string()),
        kind: Some("INVALID".to_string()),
        issue_date: Some("2024-01-01".to_string()),
    };

    c.bench_function("domain/reject_invalid_kind", |b| {
        b.iter(|| validate_credential(Some(&credential)).unwrap_err());
    });
}

criterion_group!(
    benches,
    bench_validate_citizen,
    bench_validate_composite,
    bench_rejected_kind
);
criterion_main!(benches);
