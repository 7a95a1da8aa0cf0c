// Copyright (c) 2025 Kirky.X
//
// Licensed under the MIT License
// See LICENSE file in the project root for full license information.

use formrs::domain::models::document_type::DocumentType;
use formrs::domain::services::field_normalizer::{normalize, normalized};
use serde_json::{json, Value};

fn records() -> Vec<Value> {
    vec![
        json!({"header": {"uap": "UAP12", "equipe": "iv"}}),
        json!({"header": {"uap": "1234", "equipe": "XI"}}),
        json!({"header": {"uap": "", "equipe": "3"}}),
        json!({"header": {"uap": "12A", "equipe": "Équipe VII"}}),
        json!({"header": {"uap": 45, "equipe": 10}}),
        json!({"header": {"uap": "UAP 3", "equipe": "Equipe 02"}}),
        json!({"header": {"uap": "07", "equipe": "Eq. II"}}),
        json!({"header": {"uap": "1", "equipe": "STEAM IV"}}),
        json!({"header": {"uap": null, "equipe": null, "date": "22/07/2025"}}),
        json!({"header": {"uap": ["1"], "equipe": {"v": "I"}}}),
        json!({"header": {"ligne": "L2"}, "items": [{"uap": "UAP99"}]}),
        json!({"header": "flat"}),
        json!({"Equipe": "2", "Suivi horaire": []}),
        json!([1, 2, 3]),
        Value::Null,
    ]
}

#[test]
fn test_documented_examples() {
    let cases = [
        (json!("UAP12"), json!("iv"), json!("12"), json!("IV")),
        (json!("1234"), json!("XI"), Value::Null, Value::Null),
        (json!(""), json!("3"), Value::Null, json!("III")),
        (json!("12A"), json!("x"), json!("12"), json!("X")),
        (json!("UAP 3"), json!("03"), json!("3"), json!("III")),
        (json!("45"), json!("Equipe 02"), json!("45"), json!("II")),
        (json!("7"), json!("Eq. II"), json!("7"), json!("II")),
        (json!("8"), json!("STEAM IV"), json!("8"), json!("IV")),
    ];

    for (uap, equipe, expected_uap, expected_equipe) in cases {
        let record = normalized(json!({"header": {"uap": uap, "equipe": equipe}}));
        assert_eq!(record["header"]["uap"], expected_uap);
        assert_eq!(record["header"]["equipe"], expected_equipe);
    }
}

#[test]
fn test_normalize_is_idempotent() {
    for record in records() {
        let once = normalized(record.clone());
        let twice = normalized(once.clone());
        assert_eq!(once, twice, "{record}");
    }
}

#[test]
fn test_only_covered_fields_change() {
    for record in records() {
        let mut out = record.clone();
        normalize(&mut out);

        let strip = |mut v: Value| {
            if let Some(header) = v.get_mut("header").and_then(Value::as_object_mut) {
                header.remove("uap");
                header.remove("equipe");
            }
            v
        };
        assert_eq!(
            serde_json::to_vec(&strip(out)).unwrap(),
            serde_json::to_vec(&strip(record.clone())).unwrap(),
            "{record}"
        );
    }
}

#[test]
fn test_covered_fields_are_always_canonical_or_null() {
    let romans = ["I", "II", "III", "IV", "V", "VI", "VII", "VIII", "IX", "X"];

    for record in records() {
        let out = normalized(record);
        let Some(header) = out.get("header").and_then(Value::as_object) else {
            continue;
        };
        if let Some(uap) = header.get("uap") {
            assert!(
                uap.is_null()
                    || uap
                        .as_str()
                        .is_some_and(|s| (1..=3).contains(&s.len())
                            && s.chars().all(|c| c.is_ascii_digit())),
                "{uap}"
            );
        }
        if let Some(equipe) = header.get("equipe") {
            assert!(
                equipe.is_null() || equipe.as_str().is_some_and(|s| romans.contains(&s)),
                "{equipe}"
            );
        }
    }
}

#[test]
fn test_every_type_variant_resolves() {
    let variants = [
        ("Rebut", DocumentType::Rebut),
        ("rebut", DocumentType::Rebut),
        ("NPT", DocumentType::Npt),
        ("Npt", DocumentType::Npt),
        ("Kosu", DocumentType::Kosu),
        ("KOSU", DocumentType::Kosu),
        ("Défauts", DocumentType::Defauts),
        ("Defauts", DocumentType::Defauts),
        ("défauts", DocumentType::Defauts),
        ("dÉfAuTs", DocumentType::Defauts),
    ];
    for (input, expected) in variants {
        assert_eq!(DocumentType::resolve(input), Ok(expected), "{input}");
    }
    for input in ["Défaut", "rebuts", "kosu!", "n.p.t"] {
        assert!(DocumentType::resolve(input).is_err(), "{input}");
    }
}
