//! Tests for graph model types

#![allow(clippy::unwrap_used)]

use rstest::rstest;

use crate::graph::model::{Accessibility, RelType, SymbolKind};

#[test]
fn test_symbol_kind_display() {
    assert_eq!(format!("{}", SymbolKind::Class), "Class");
    assert_eq!(format!("{}", SymbolKind::EnumMember), "EnumMember");
    assert_eq!(format!("{}", SymbolKind::JsonProperty), "JsonProperty");
    assert_eq!(
        format!("{}", SymbolKind::HtmlScriptReference),
        "HtmlScriptReference"
    );
}

#[test]
fn test_symbol_kind_classification() {
    assert!(SymbolKind::Namespace.is_namespace());
    assert!(!SymbolKind::Class.is_namespace());
}

// ============================================================================
// Accessibility
// ============================================================================

#[test]
fn test_accessibility_ordering() {
    assert!(Accessibility::Private < Accessibility::ProtectedAndInternal);
    assert!(Accessibility::ProtectedAndInternal < Accessibility::Protected);
    assert!(Accessibility::Protected < Accessibility::Internal);
    assert!(Accessibility::Internal < Accessibility::ProtectedOrInternal);
    assert!(Accessibility::ProtectedOrInternal < Accessibility::Public);
}

#[rstest]
#[case(Accessibility::Public, Accessibility::Public, true)]
#[case(Accessibility::Private, Accessibility::Public, false)]
#[case(Accessibility::Internal, Accessibility::Protected, true)]
#[case(Accessibility::Protected, Accessibility::Internal, false)]
#[case(Accessibility::Private, Accessibility::Private, true)]
#[case(Accessibility::NotApplicable, Accessibility::Public, true)]
fn test_accessibility_admits(
    #[case] accessibility: Accessibility,
    #[case] minimum: Accessibility,
    #[case] expected: bool,
) {
    assert_eq!(accessibility.admits(minimum), expected);
}

#[rstest]
#[case("public", Accessibility::Public)]
#[case("Private", Accessibility::Private)]
#[case("protected-internal", Accessibility::ProtectedOrInternal)]
#[case("ProtectedOrInternal", Accessibility::ProtectedOrInternal)]
#[case("private_protected", Accessibility::ProtectedAndInternal)]
#[case("internal", Accessibility::Internal)]
fn test_accessibility_from_str(#[case] input: &str, #[case] expected: Accessibility) {
    assert_eq!(input.parse::<Accessibility>(), Ok(expected));
}

#[test]
fn test_accessibility_from_str_rejects_unknown() {
    let err = "friend".parse::<Accessibility>().unwrap_err();
    assert!(err.to_string().contains("friend"));
}

#[test]
fn test_accessibility_display_round_trips_through_from_str() {
    let parsed: Accessibility = Accessibility::ProtectedAndInternal
        .to_string()
        .parse()
        .unwrap_or(Accessibility::NotApplicable);
    assert_eq!(parsed, Accessibility::ProtectedAndInternal);
}

// ============================================================================
// RelType
// ============================================================================

#[test]
fn test_rel_type_display() {
    assert_eq!(RelType::Contains.to_string(), "CONTAINS");
    assert_eq!(RelType::DependsOn.to_string(), "DEPENDS_ON");
    assert_eq!(RelType::BindsTo.to_string(), "BINDS_TO");
    assert_eq!(RelType::HasProperty.to_string(), "HAS_PROPERTY");
}

#[test]
fn test_rel_type_other_maps_well_known_names() {
    assert_eq!(RelType::other("contains"), RelType::Contains);
    assert_eq!(RelType::other("depends-on"), RelType::DependsOn);
}

#[test]
fn test_rel_type_other_sanitizes() {
    assert_eq!(RelType::other("calls into"), RelType::Other("CALLS_INTO".into()));
    assert_eq!(RelType::other("x)-[:Y"), RelType::Other("X____Y".into()));
    assert_eq!(RelType::other(""), RelType::Other("RELATED_TO".into()));
}
