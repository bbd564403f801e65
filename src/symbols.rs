//! Typed symbol table for host-language wrappers.
//!
//! Scripting-language bindings to this library should not reach into the
//! core's items one by one: they depend on a single, statically declared
//! table of constants, enum tags, error codes and opaque handle descriptors.
//! [`EXPECTED_SYMBOLS`] declares every name and its kind; loading resolves
//! the whole table against a [`SymbolSource`] and fails fast on the first
//! missing or mistyped symbol. Nothing is retried and there is no partial
//! success. Once loaded the table is immutable for the life of the process
//! and safe for unsynchronized concurrent reads.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::constants;
use crate::error::ErrorCode;
use crate::tracer::{DndzModel, TracerKind};

/// The documented kind of a published symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolKind {
    Float,
    Int,
    Handle,
}

/// Descriptors for the native-owned structures a wrapper may hold a
/// reference to but never introspect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleKind {
    Tracer,
    SplineParams,
}

/// A resolved symbol value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SymbolValue {
    Float(f64),
    Int(i64),
    Handle(HandleKind),
}

impl SymbolValue {
    pub fn kind(&self) -> SymbolKind {
        match self {
            SymbolValue::Float(_) => SymbolKind::Float,
            SymbolValue::Int(_) => SymbolKind::Int,
            SymbolValue::Handle(_) => SymbolKind::Handle,
        }
    }
}

/// One entry of the statically declared symbol table.
pub struct SymbolSpec {
    pub name: &'static str,
    pub kind: SymbolKind,
}

const fn float(name: &'static str) -> SymbolSpec {
    SymbolSpec {
        name,
        kind: SymbolKind::Float,
    }
}

const fn int(name: &'static str) -> SymbolSpec {
    SymbolSpec {
        name,
        kind: SymbolKind::Int,
    }
}

const fn handle(name: &'static str) -> SymbolSpec {
    SymbolSpec {
        name,
        kind: SymbolKind::Handle,
    }
}

/// Every symbol a wrapper may depend on. Declared statically so that a
/// mismatch against the source is caught in one validation pass at load
/// time, not scattered through later use sites.
pub const EXPECTED_SYMBOLS: &[SymbolSpec] = &[
    // Physical constants and unit conversions.
    float("SPEED_OF_LIGHT"),
    float("CLIGHT_HMPC"),
    float("GNEWT"),
    float("MPC_TO_METER"),
    float("PC_TO_METER"),
    float("RHO_CRITICAL"),
    float("SOLAR_MASS"),
    float("K_PIVOT"),
    // Numerical tuning parameters.
    float("EPSREL_DIST"),
    float("EPSREL_DNDZ"),
    float("EPSREL_GROWTH"),
    float("EPS_SCALEFAC_GROWTH"),
    float("Z_MIN_SOURCES"),
    float("Z_MAX_SOURCES"),
    // Tracer kinds and redshift-distribution models.
    int("CL_TRACER_NC"),
    int("CL_TRACER_WL"),
    int("DNDZ_NC"),
    int("DNDZ_WL_FID"),
    int("DNDZ_WL_CONS"),
    int("DNDZ_WL_OPT"),
    // Error classes.
    int("ERROR_MEMORY"),
    int("ERROR_LINSPACE"),
    int("ERROR_INCONSISTENT"),
    int("ERROR_SPLINE"),
    int("ERROR_SPLINE_EV"),
    int("ERROR_INTEG"),
    int("ERROR_ROOT"),
    int("ERROR_CLASS"),
    // Opaque handle descriptors.
    handle("CL_TRACER"),
    handle("SPLINE_PARAMS"),
];

/// Failures of the load step. All are fatal: there is no fallback value for
/// a missing physical constant.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum BoundaryError {
    #[error("could not load symbol source `{module}`: {reason}")]
    Load { module: String, reason: String },

    #[error("symbol source `{module}` is missing expected symbol `{name}`")]
    MissingSymbol { module: String, name: String },

    #[error("symbol `{name}` has kind {found:?}, expected {expected:?}")]
    KindMismatch {
        name: String,
        expected: SymbolKind,
        found: SymbolKind,
    },
}

/// A resolver for symbol names. The crate's own core implements this; a real
/// foreign backend would plug in here too, which is what the mock sources in
/// the tests stand in for.
pub trait SymbolSource {
    fn module_name(&self) -> &str;
    fn resolve(&self, name: &str) -> Option<SymbolValue>;
}

/// The in-crate symbol source, backed by the constants and enum tags of the
/// computational core.
pub struct CoreSymbols;

impl SymbolSource for CoreSymbols {
    fn module_name(&self) -> &str {
        "limber"
    }

    fn resolve(&self, name: &str) -> Option<SymbolValue> {
        for code in ErrorCode::ALL {
            if name == code.symbol_name() {
                return Some(SymbolValue::Int(code as i64));
            }
        }
        match name {
            "SPEED_OF_LIGHT" => Some(SymbolValue::Float(constants::SPEED_OF_LIGHT)),
            "CLIGHT_HMPC" => Some(SymbolValue::Float(constants::CLIGHT_HMPC)),
            "GNEWT" => Some(SymbolValue::Float(constants::GNEWT)),
            "MPC_TO_METER" => Some(SymbolValue::Float(constants::MPC_TO_METER)),
            "PC_TO_METER" => Some(SymbolValue::Float(constants::PC_TO_METER)),
            "RHO_CRITICAL" => Some(SymbolValue::Float(constants::RHO_CRITICAL)),
            "SOLAR_MASS" => Some(SymbolValue::Float(constants::SOLAR_MASS)),
            "K_PIVOT" => Some(SymbolValue::Float(constants::K_PIVOT)),
            "EPSREL_DIST" => Some(SymbolValue::Float(constants::EPSREL_DIST)),
            "EPSREL_DNDZ" => Some(SymbolValue::Float(constants::EPSREL_DNDZ)),
            "EPSREL_GROWTH" => Some(SymbolValue::Float(constants::EPSREL_GROWTH)),
            "EPS_SCALEFAC_GROWTH" => Some(SymbolValue::Float(constants::EPS_SCALEFAC_GROWTH)),
            "Z_MIN_SOURCES" => Some(SymbolValue::Float(constants::Z_MIN_SOURCES)),
            "Z_MAX_SOURCES" => Some(SymbolValue::Float(constants::Z_MAX_SOURCES)),
            "CL_TRACER_NC" => Some(SymbolValue::Int(TracerKind::NumberCounts as i64)),
            "CL_TRACER_WL" => Some(SymbolValue::Int(TracerKind::WeakLensing as i64)),
            "DNDZ_NC" => Some(SymbolValue::Int(DndzModel::Clustering as i64)),
            "DNDZ_WL_FID" => Some(SymbolValue::Int(DndzModel::WlFid as i64)),
            "DNDZ_WL_CONS" => Some(SymbolValue::Int(DndzModel::WlCons as i64)),
            "DNDZ_WL_OPT" => Some(SymbolValue::Int(DndzModel::WlOpt as i64)),
            "CL_TRACER" => Some(SymbolValue::Handle(HandleKind::Tracer)),
            "SPLINE_PARAMS" => Some(SymbolValue::Handle(HandleKind::SplineParams)),
            _ => None,
        }
    }
}

/// The loaded, read-only symbol table.
#[derive(Debug)]
pub struct SymbolTable {
    module: String,
    values: FxHashMap<&'static str, SymbolValue>,
}

impl SymbolTable {
    /// Resolve every declared symbol against `source`. The first missing or
    /// mistyped symbol aborts the load; there is no partial table.
    pub fn load<S: SymbolSource>(source: &S) -> Result<SymbolTable, BoundaryError> {
        let mut values =
            FxHashMap::with_capacity_and_hasher(EXPECTED_SYMBOLS.len(), Default::default());
        for spec in EXPECTED_SYMBOLS {
            let value =
                source
                    .resolve(spec.name)
                    .ok_or_else(|| BoundaryError::MissingSymbol {
                        module: source.module_name().to_string(),
                        name: spec.name.to_string(),
                    })?;
            if value.kind() != spec.kind {
                return Err(BoundaryError::KindMismatch {
                    name: spec.name.to_string(),
                    expected: spec.kind,
                    found: value.kind(),
                });
            }
            values.insert(spec.name, value);
        }
        Ok(SymbolTable {
            module: source.module_name().to_string(),
            values,
        })
    }

    pub fn module(&self) -> &str {
        &self.module
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<SymbolValue> {
        self.values.get(name).copied()
    }

    pub fn float(&self, name: &str) -> Result<f64, BoundaryError> {
        match self.get(name) {
            Some(SymbolValue::Float(v)) => Ok(v),
            Some(other) => Err(BoundaryError::KindMismatch {
                name: name.to_string(),
                expected: SymbolKind::Float,
                found: other.kind(),
            }),
            None => Err(BoundaryError::MissingSymbol {
                module: self.module.clone(),
                name: name.to_string(),
            }),
        }
    }

    pub fn int(&self, name: &str) -> Result<i64, BoundaryError> {
        match self.get(name) {
            Some(SymbolValue::Int(v)) => Ok(v),
            Some(other) => Err(BoundaryError::KindMismatch {
                name: name.to_string(),
                expected: SymbolKind::Int,
                found: other.kind(),
            }),
            None => Err(BoundaryError::MissingSymbol {
                module: self.module.clone(),
                name: name.to_string(),
            }),
        }
    }

    pub fn handle(&self, name: &str) -> Result<HandleKind, BoundaryError> {
        match self.get(name) {
            Some(SymbolValue::Handle(h)) => Ok(h),
            Some(other) => Err(BoundaryError::KindMismatch {
                name: name.to_string(),
                expected: SymbolKind::Handle,
                found: other.kind(),
            }),
            None => Err(BoundaryError::MissingSymbol {
                module: self.module.clone(),
                name: name.to_string(),
            }),
        }
    }
}

static TABLE: OnceLock<Result<SymbolTable, BoundaryError>> = OnceLock::new();

/// Process-wide symbol table backed by the crate's own core. The first call
/// performs the load; later calls return the same table without re-running
/// any setup.
pub fn ensure_loaded() -> Result<&'static SymbolTable, BoundaryError> {
    TABLE
        .get_or_init(|| SymbolTable::load(&CoreSymbols))
        .as_ref()
        .map_err(|err| err.clone())
}
