use fenris_dss_engine::{AssemblyPolicy, EngineError, FactorizationKind};

#[test]
fn factorization_kind_parses_registry_names() {
    for kind in FactorizationKind::ALL {
        let parsed: FactorizationKind = kind.name().parse().unwrap();
        assert_eq!(parsed, kind);
        assert_eq!(kind.to_string(), kind.name());
    }
}

#[test]
fn unknown_factorization_kind_is_rejected() {
    let result = "dss_sym_qr".parse::<FactorizationKind>();
    assert_eq!(result, Err(EngineError::UnknownFactorizationKind("dss_sym_qr".to_string())));
}

#[test]
fn factorization_kind_determines_assembly_policy() {
    assert_eq!(FactorizationKind::SymmetricLdl.assembly_policy(), AssemblyPolicy::SymmetricLower);
    assert_eq!(FactorizationKind::SymmetricLl.assembly_policy(), AssemblyPolicy::SymmetricLower);
    assert_eq!(FactorizationKind::UnsymmetricLu.assembly_policy(), AssemblyPolicy::UnsymmetricFull);
    assert_eq!(FactorizationKind::default(), FactorizationKind::SymmetricLdl);
}
