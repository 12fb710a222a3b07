use super::*;

#[track_caller]
fn munch_all(input: &str) -> Temporal {
    let (amount, result) = munch(input.as_bytes()).unwrap();
    assert_eq!(amount, input.len(), "consumed wrong amount for {input:?}");
    result
}

fn display(temporal: &Temporal) -> String {
    match temporal {
        Temporal::Instant(v) => v.to_string(),
        Temporal::LocalDateTime(v) => v.to_string(),
        Temporal::LocalDate(v) => v.to_string(),
        Temporal::LocalTime(v) => v.to_string(),
    }
}

#[track_caller]
fn roundtrip(input: &str) {
    assert_eq!(display(&munch_all(input)), input, "roundtrip mismatch for {input:?}");
}

#[track_caller]
fn roundtrip_lossy(input: &str, expected: &str) {
    assert_eq!(display(&munch_all(input)), expected, "mismatch for {input:?}");
}

#[track_caller]
fn expect_err(input: &str) {
    let result = munch(input.as_bytes());
    assert!(result.is_none(), "for {input:?}: {result:?}");
}

#[test]
fn exact_roundtrip() {
    let inputs = [
        "1979-05-27T07:32:00Z",
        "1979-05-27T07:32:00",
        "1979-05-27T07:32:00.5",
        "1979-05-27T07:32:00.999999999",
        "1979-05-27",
        "07:32:00",
        "00:32:00.999999",
    ];
    for input in inputs {
        roundtrip(input);
    }
}

#[test]
fn lossy_roundtrip() {
    roundtrip_lossy("1979-05-27 07:32:00Z", "1979-05-27T07:32:00Z");
    roundtrip_lossy("1999-12-31 23:59:59.9", "1999-12-31T23:59:59.9");
    roundtrip_lossy("1979-05-27T07:32Z", "1979-05-27T07:32:00Z");
    roundtrip_lossy("9999-12-29T07:32", "9999-12-29T07:32:00");
    roundtrip_lossy("07:32", "07:32:00");
    roundtrip_lossy("1987-07-05t17:45:00z", "1987-07-05T17:45:00Z");
}

#[test]
fn offsets_normalize_to_utc() {
    let cases = [
        ("1979-05-27T00:32:00-07:00", "1979-05-27T07:32:00Z"),
        ("1979-05-27T00:32:00.999999-07:00", "1979-05-27T07:32:00.999999Z"),
        ("1979-05-27T00:32:00+21:20", "1979-05-26T03:12:00Z"),
        ("2000-01-01T00:30:00+01:00", "1999-12-31T23:30:00Z"),
        ("2024-02-28T23:00:00-02:00", "2024-02-29T01:00:00Z"),
        ("2023-02-28T23:00:00-02:00", "2023-03-01T01:00:00Z"),
        ("2023-12-31T23:59:60-00:01", "2024-01-01T00:00:60Z"),
        ("1987-07-05T17:45:00+00:00", "1987-07-05T17:45:00Z"),
        ("0000-01-01T00:00:00+01:00", "-0001-12-31T23:00:00Z"),
        ("9999-12-31T23:30:00-01:00", "10000-01-01T00:30:00Z"),
    ];
    for (input, expected) in cases {
        roundtrip_lossy(input, expected);
    }

    let Temporal::Instant(instant) = munch_all("1979-05-27T00:32:00-07:00") else {
        panic!("expected an instant");
    };
    assert_eq!(
        instant.original_offset(),
        TimeOffset::Custom { minutes: -420 }
    );
    assert_eq!(instant.utc().time.hour, 7);
}

#[test]
fn negative_years_keep_four_digits() {
    let date = Date {
        year: -1,
        month: 12,
        day: 31,
    };
    assert_eq!(date.to_string(), "-0001-12-31");
    let date = Date {
        year: -12345,
        month: 1,
        day: 1,
    };
    assert_eq!(date.to_string(), "-12345-01-01");
}

#[test]
fn literal_kinds() {
    assert!(matches!(munch_all("1979-05-27T07:32:00Z"), Temporal::Instant(_)));
    assert!(matches!(munch_all("1979-05-27T07:32:00"), Temporal::LocalDateTime(_)));
    assert!(matches!(munch_all("1979-05-27"), Temporal::LocalDate(_)));
    assert!(matches!(munch_all("07:32:00"), Temporal::LocalTime(_)));
}

#[test]
fn stops_at_token_boundary() {
    let cases = [
        ("1979-05-27 # comment", 10),
        ("1979-05-27, 2", 10),
        ("07:32:00]", 8),
        ("1979-05-27T07:32:00Z x", 20),
    ];
    for (input, expected) in cases {
        let (amount, _) = munch(input.as_bytes()).unwrap();
        assert_eq!(amount, expected, "input: {input:?}");
    }
}

#[test]
fn rejects_malformed() {
    let inputs = [
        "",
        "12",
        "12:",
        "1979",
        "1979-13-01",
        "1979-00-10",
        "1979-02-30",
        "2023-02-29",
        "24:00:00",
        "07:60:00",
        "07:32:61",
        "07:32:00Z",
        "07:32:00+01:00",
        "1979-05-27T",
        "1979-05-27T07",
        "1979-05-27T07:32:00.",
        "1979-05-27T07:32:00+25:00",
        "79-05-27",
    ];
    for input in inputs {
        expect_err(input);
    }
}

#[test]
fn leap_years() {
    fn is_leap_naive(y: i32) -> bool {
        (y % 4 == 0 && y % 100 != 0) || y % 400 == 0
    }
    for y in 0..=9999 {
        assert_eq!(is_leap_year(y), is_leap_naive(y), "year {y}");
    }
    roundtrip("2000-02-29");
    roundtrip("2024-02-29");
    expect_err("1900-02-29");
}

#[test]
fn day_counting_is_consistent() {
    assert_eq!(days_from_civil(1970, 1, 1), 0);
    assert_eq!(days_from_civil(2000, 3, 1), 11_017);
    assert_eq!(days_from_civil(1969, 12, 31), -1);

    for days in (-800_000..800_000).step_by(997) {
        let date = civil_from_days(days);
        assert_eq!(
            days_from_civil(date.year, date.month, date.day),
            days,
            "days {days} -> {date}"
        );
    }
}

#[test]
fn randomized_offsets_preserve_instant() {
    let mut rng = oorandom::Rand32::new(3);
    for _ in 0..5000 {
        let year = (rng.rand_u32() % 9000) as i32 + 500;
        let month = (rng.rand_u32() % 12) as u8 + 1;
        let day = (rng.rand_u32() % days_in_month(year, month) as u32) as u8 + 1;
        let hour = (rng.rand_u32() % 24) as u8;
        let minute = (rng.rand_u32() % 60) as u8;
        let off_hour = rng.rand_u32() % 24;
        let off_min = rng.rand_u32() % 60;
        let sign = if rng.rand_u32() % 2 == 0 { '+' } else { '-' };

        let input = format!(
            "{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}:00{sign}{off_hour:02}:{off_min:02}"
        );
        let Temporal::Instant(instant) = munch_all(&input) else {
            panic!("expected an instant for {input}");
        };

        let local = days_from_civil(year, month, day) * 1440 + hour as i64 * 60 + minute as i64;
        let offset = (off_hour * 60 + off_min) as i64 * if sign == '+' { 1 } else { -1 };
        let utc = instant.utc();
        let got = days_from_civil(utc.date.year, utc.date.month, utc.date.day) * 1440
            + utc.time.hour as i64 * 60
            + utc.time.minute as i64;
        assert_eq!(got, local - offset, "input: {input}");
    }
}
