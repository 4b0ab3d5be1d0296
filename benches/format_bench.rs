use criterion::{black_box, criterion_group, criterion_main, Criterion};

use numplan::{PhoneNumber, PhoneNumberFormat, PHONE_NUMBER_UTIL};

fn setup_numbers() -> Vec<PhoneNumber> {
    [
        ("+16502530000", "ZZ"),
        ("+442087389353", "ZZ"),
        ("+5491187654321", "ZZ"),
        ("+390236618300", "ZZ"),
        ("+5215512345678", "ZZ"),
    ]
    .iter()
    .map(|(number, region)| PHONE_NUMBER_UTIL.parse(number, region).unwrap())
    .collect()
}

fn formatting_benchmark(c: &mut Criterion) {
    let numbers = setup_numbers();
    let formats = [
        PhoneNumberFormat::E164,
        PhoneNumberFormat::International,
        PhoneNumberFormat::National,
        PhoneNumberFormat::RFC3966,
    ];

    c.bench_function("format", |b| {
        b.iter(|| {
            for number in &numbers {
                for format in formats {
                    let _ = PHONE_NUMBER_UTIL.format(black_box(number), black_box(format));
                }
            }
        })
    });
}

criterion_group!(benches, formatting_benchmark);
criterion_main!(benches);
