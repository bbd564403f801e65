use std::collections::HashMap;

use limber::symbols::{
    ensure_loaded, BoundaryError, HandleKind, SymbolKind, SymbolSource, SymbolTable, SymbolValue,
    EXPECTED_SYMBOLS,
};

// A stand-in for a foreign symbol source, the way a compiled extension
// module would look to the boundary.
struct MockSource {
    values: HashMap<String, SymbolValue>,
}

impl MockSource {
    // Placeholder values for every declared symbol: floats get the speed of
    // light, ints get 5, handles get the tracer descriptor.
    fn complete() -> MockSource {
        let mut values = HashMap::new();
        for spec in EXPECTED_SYMBOLS {
            let value = match spec.kind {
                SymbolKind::Float => SymbolValue::Float(299792.458),
                SymbolKind::Int => SymbolValue::Int(5),
                SymbolKind::Handle => SymbolValue::Handle(HandleKind::Tracer),
            };
            values.insert(spec.name.to_string(), value);
        }
        MockSource { values }
    }
}

impl SymbolSource for MockSource {
    fn module_name(&self) -> &str {
        "mock_core"
    }

    fn resolve(&self, name: &str) -> Option<SymbolValue> {
        self.values.get(name).copied()
    }
}

#[test]
fn complete_mock_source_loads_identical_values() {
    let source = MockSource::complete();
    let table = SymbolTable::load(&source).unwrap();

    assert_eq!(table.module(), "mock_core");
    assert_eq!(table.len(), EXPECTED_SYMBOLS.len());
    for spec in EXPECTED_SYMBOLS {
        assert_eq!(table.get(spec.name), source.resolve(spec.name));
    }
    assert_eq!(table.float("SPEED_OF_LIGHT").unwrap(), 299792.458);
    assert_eq!(table.int("ERROR_SPLINE").unwrap(), 5);
}

#[test]
fn missing_symbol_fails_naming_it() {
    let mut source = MockSource::complete();
    source.values.remove("RHO_CRITICAL");

    let err = SymbolTable::load(&source).unwrap_err();
    match &err {
        BoundaryError::MissingSymbol { module, name } => {
            assert_eq!(module, "mock_core");
            assert_eq!(name, "RHO_CRITICAL");
        }
        other => panic!("expected MissingSymbol, got {:?}", other),
    }
    assert!(err.to_string().contains("RHO_CRITICAL"));
    assert!(err.to_string().contains("mock_core"));
}

#[test]
fn mistyped_symbol_fails_with_kind_mismatch() {
    let mut source = MockSource::complete();
    source
        .values
        .insert("GNEWT".to_string(), SymbolValue::Int(42));

    let err = SymbolTable::load(&source).unwrap_err();
    match err {
        BoundaryError::KindMismatch {
            name,
            expected,
            found,
        } => {
            assert_eq!(name, "GNEWT");
            assert_eq!(expected, SymbolKind::Float);
            assert_eq!(found, SymbolKind::Int);
        }
        other => panic!("expected KindMismatch, got {:?}", other),
    }
}

#[test]
fn process_table_loads_once_and_is_stable() {
    let first = ensure_loaded().unwrap();
    let second = ensure_loaded().unwrap();
    assert!(std::ptr::eq(first, second));

    // Every declared symbol is present with its documented kind, and the
    // values read back identically across calls.
    for spec in EXPECTED_SYMBOLS {
        let v1 = first.get(spec.name).unwrap();
        let v2 = second.get(spec.name).unwrap();
        assert_eq!(v1.kind(), spec.kind);
        assert_eq!(v1, v2);
    }
}

#[test]
fn tracer_and_error_tags_are_distinct() {
    let table = ensure_loaded().unwrap();
    assert_ne!(
        table.int("CL_TRACER_NC").unwrap(),
        table.int("CL_TRACER_WL").unwrap()
    );
    let codes = [
        "ERROR_MEMORY",
        "ERROR_LINSPACE",
        "ERROR_INCONSISTENT",
        "ERROR_SPLINE",
        "ERROR_SPLINE_EV",
        "ERROR_INTEG",
        "ERROR_ROOT",
        "ERROR_CLASS",
    ];
    let mut tags: Vec<i64> = codes.iter().map(|c| table.int(c).unwrap()).collect();
    tags.sort();
    tags.dedup();
    assert_eq!(tags.len(), codes.len());
}
