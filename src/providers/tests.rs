use super::*;

fn spec(id: &str, mx: &[&str]) -> ProviderSpec {
    ProviderSpec {
        id: id.to_string(),
        mx: mx.iter().map(|p| p.to_string()).collect(),
        ..ProviderSpec::default()
    }
}

fn table(specs: Vec<ProviderSpec>) -> ProviderTable {
    ProviderTable::from_specs(specs).unwrap()
}

#[test]
fn wildcard_pattern_single_match() {
    let table = table(vec![spec("google-apps", &["*.l.google.com"])]);
    assert_eq!(
        table.match_exchanges(["aspmx.l.google.com"]),
        ProviderMatch::Single("google-apps".into())
    );
}

#[test]
fn no_match_is_none() {
    let table = table(vec![spec("google-apps", &["*.l.google.com"])]);
    let found = table.match_exchanges(["mx.example.net", "l.google.com"]);
    assert!(found.is_none());
    assert_eq!(found.to_string(), "");
    assert!(table.match_exchanges(std::iter::empty()).is_none());
}

#[test]
fn equal_specificity_tie_is_multiple() {
    let table = table(vec![
        spec("zeta", &["*.mx.example.net"]),
        spec("alpha", &["mx1.*.example.net"]),
        spec("other", &["*.unrelated.org"]),
    ]);
    let found = table.match_exchanges(["mx1.mx.example.net"]);
    assert_eq!(
        found,
        ProviderMatch::Multiple(vec!["alpha".into(), "zeta".into()])
    );
    assert_eq!(found.to_string(), "alpha zeta");
    assert!(found.single().is_none());
}

#[test]
fn exact_pattern_beats_wildcard() {
    let table = table(vec![
        spec("wild", &["*.l.google.com"]),
        spec("exact", &["aspmx.l.google.com"]),
    ]);
    assert_eq!(
        table.match_exchanges(["aspmx.l.google.com", "alt1.l.google.com"]),
        ProviderMatch::Single("exact".into())
    );
}

#[test]
fn exact_matches_on_different_depths_tie() {
    let table = table(vec![
        spec("short", &["smtp.short.com"]),
        spec("long", &["mx1.mail.long.com"]),
        spec("wild", &["*.mail.long.com"]),
    ]);
    assert_eq!(
        table.match_exchanges(["smtp.short.com", "mx1.mail.long.com"]),
        ProviderMatch::Multiple(vec!["long".into(), "short".into()])
    );
    assert_eq!(
        table.match_exchanges(["mx1.mail.long.com", "smtp.short.com"]),
        ProviderMatch::Multiple(vec!["long".into(), "short".into()])
    );
}

#[test]
fn more_fixed_labels_beat_fewer() {
    let table = table(vec![
        spec("broad", &["*.*.google.com"]),
        spec("narrow", &["*.l.google.com"]),
    ]);
    assert_eq!(
        table.match_exchanges(["aspmx.l.google.com"]),
        ProviderMatch::Single("narrow".into())
    );
    assert_eq!(
        table.match_exchanges(["aspmx.x.google.com"]),
        ProviderMatch::Single("broad".into())
    );
}

#[test]
fn union_across_hostnames_at_best_level() {
    let table = table(vec![
        spec("first", &["*.first.net"]),
        spec("second", &["*.second.net"]),
    ]);
    assert_eq!(
        table.match_exchanges(["mx.first.net", "mx.second.net", "mx.third.net"]),
        ProviderMatch::Multiple(vec!["first".into(), "second".into()])
    );
}

#[test]
fn match_is_independent_of_declaration_and_mx_order() {
    let forward = table(vec![
        spec("first", &["*.first.net"]),
        spec("second", &["*.second.net"]),
    ]);
    let backward = table(vec![
        spec("second", &["*.second.net"]),
        spec("first", &["*.first.net"]),
    ]);
    let hosts = ["mx.second.net", "mx.first.net"];
    let reversed = ["mx.first.net", "mx.second.net"];
    assert_eq!(forward.match_exchanges(hosts), backward.match_exchanges(reversed));
}

#[test]
fn validation_errors() {
    assert_eq!(
        ProviderTable::from_specs(vec![spec("", &["mx.example.com"])]).unwrap_err(),
        TableError::EmptyId
    );
    assert_eq!(
        ProviderTable::from_specs(vec![spec("self", &["mx.example.com"])]).unwrap_err(),
        TableError::ReservedId("self".into())
    );
    assert_eq!(
        ProviderTable::from_specs(vec![spec("a", &["mx.a.com"]), spec("a", &["mx.b.com"])])
            .unwrap_err(),
        TableError::DuplicateProvider("a".into())
    );
    assert_eq!(
        ProviderTable::from_specs(vec![spec("a", &[])]).unwrap_err(),
        TableError::NoPatterns("a".into())
    );
    assert!(matches!(
        ProviderTable::from_specs(vec![spec("a", &["mx*.a.com"])]).unwrap_err(),
        TableError::InvalidPattern { provider, .. } if provider == "a"
    ));

    let mut first = spec("a", &["mx.a.com"]);
    first.domains = vec!["shared.com".into()];
    let mut second = spec("b", &["mx.b.com"]);
    second.domains = vec!["Shared.com.".into()];
    assert_eq!(
        ProviderTable::from_specs(vec![first, second]).unwrap_err(),
        TableError::DuplicateDomain {
            domain: "shared.com".into(),
            first: "a".into(),
            second: "b".into(),
        }
    );
}

#[test]
fn provider_for_domain_uses_registrable_fallback() {
    let mut gmail = spec("gmail", &["gmail-smtp-in.l.google.com"]);
    gmail.domains = vec!["gmail.com".into()];
    gmail.public = true;
    let table = table(vec![gmail, spec("corp", &["mx.corp.com"])]);

    assert_eq!(table.provider_for_domain("gmail.com").unwrap().id, "gmail");
    assert_eq!(table.provider_for_domain("eu.gmail.com").unwrap().id, "gmail");
    assert!(table.provider_for_domain("corp.com").is_none());
    assert!(table.is_public_domain("gmail.com"));
    assert!(!table.is_public_domain("corp.com"));
}

#[test]
fn builtin_table_loads() {
    let table = ProviderTable::builtin().unwrap();
    assert!(table.len() > 50);
    assert!(table.provider("google-gmail").is_some());
    assert_eq!(
        table.match_exchanges(["gmail-smtp-in.l.google.com", "alt1.gmail-smtp-in.l.google.com"]),
        ProviderMatch::Single("google-gmail".into())
    );
    assert_eq!(
        table.match_exchanges(["aspmx.l.google.com", "alt1.aspmx.l.google.com"]),
        ProviderMatch::Single("google-apps".into())
    );
    assert_eq!(
        table.provider_for_domain("googlemail.com").map(|p| p.id.as_str()),
        Some("google-gmail")
    );
    assert!(table.is_public_domain("gmail.com"));
    assert!(!table.is_public_domain("google.com"));

    let patterns: Vec<_> = table.patterns().map(|(p, _)| p.specificity()).collect();
    assert!(patterns.windows(2).all(|w| w[0] >= w[1]));
}

#[cfg(feature = "with-serde")]
#[test]
fn json_table() {
    let json = r#"[
        {"id": "acme", "mx": ["*.mail.acme.test"], "title": "Acme Mail", "public": true,
         "domains": ["acme.test"], "canonical": {"lowercase": true}}
    ]"#;
    let table = ProviderTable::from_json(json).unwrap();
    let acme = table.provider("acme").unwrap();
    assert_eq!(acme.info().title.as_deref(), Some("Acme Mail"));
    assert!(acme.canonical.lowercase);
    assert!(table.is_public_domain("acme.test"));

    assert!(matches!(
        ProviderTable::from_json("{not json"),
        Err(TableError::Json(_))
    ));
}
