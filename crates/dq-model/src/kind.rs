//! Rule kinds and the fixed code table.
//!
//! Every configured rule code starts with a three-digit prefix that selects
//! its kind. The table below is the single source of truth for that mapping
//! and for the group/property vocabulary stamped into audit reports.

use serde::{Deserialize, Serialize};

/// The fixed set of rule kinds understood by the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum RuleKind {
    Prerequisites,
    NullCheck,
    DuplicateCheck,
    ReferentialIntegrity,
    DateFormatCheck,
    RangeCheck,
    CatalogCheck,
    ForbiddenCharacters,
    TypeCheck,
    CompositionCheck,
    LengthCheck,
    ParquetTypeCheck,
    NumericFormatCheck,
    NumericOperationCheck,
    StatisticsSummary,
    TimeRangeCheck,
    ConditionalRule,
    PositionValueCheck,
    EmailCheck,
    ValueTrendCheck,
}

struct KindEntry {
    kind: RuleKind,
    code: &'static str,
    group: &'static str,
    property: &'static str,
    label: &'static str,
}

const KIND_TABLE: &[KindEntry] = &[
    KindEntry {
        kind: RuleKind::Prerequisites,
        code: "100",
        group: "Requisitos Previos",
        property: "Requisitos Previos",
        label: "Requisitos previos",
    },
    KindEntry {
        kind: RuleKind::NullCheck,
        code: "101",
        group: "Nulos",
        property: "Completitud",
        label: "Nulos",
    },
    KindEntry {
        kind: RuleKind::DuplicateCheck,
        code: "102",
        group: "Duplicados",
        property: "Unicidad",
        label: "Duplicidad",
    },
    KindEntry {
        kind: RuleKind::ReferentialIntegrity,
        code: "103",
        group: "Integridad Referencial",
        property: "Consistencia",
        label: "Integridad referencial",
    },
    KindEntry {
        kind: RuleKind::DateFormatCheck,
        code: "104",
        group: "Formato de Fecha",
        property: "Validez",
        label: "Formato",
    },
    KindEntry {
        kind: RuleKind::RangeCheck,
        code: "105",
        group: "Rango",
        property: "Exactitud",
        label: "Rango",
    },
    KindEntry {
        kind: RuleKind::CatalogCheck,
        code: "106",
        group: "Catalogo",
        property: "Exactitud",
        label: "Catalogo",
    },
    KindEntry {
        kind: RuleKind::ForbiddenCharacters,
        code: "107",
        group: "Caracteres Prohibidos",
        property: "Exactitud",
        label: "Caracteres prohibidos",
    },
    KindEntry {
        kind: RuleKind::TypeCheck,
        code: "108",
        group: "Tipo de Dato",
        property: "Validez",
        label: "Tipo de dato error",
    },
    KindEntry {
        kind: RuleKind::CompositionCheck,
        code: "109",
        group: "Composicion",
        property: "Consistencia",
        label: "Composicion error",
    },
    KindEntry {
        kind: RuleKind::LengthCheck,
        code: "110",
        group: "Longitud",
        property: "Validez",
        label: "Longitud",
    },
    KindEntry {
        kind: RuleKind::ParquetTypeCheck,
        code: "111",
        group: "Tipo de Dato Almacenado",
        property: "Validez",
        label: "Tipo de dato almacenado",
    },
    KindEntry {
        kind: RuleKind::NumericFormatCheck,
        code: "112",
        group: "Formato Numerico",
        property: "Validez",
        label: "Formato Numerico",
    },
    KindEntry {
        kind: RuleKind::NumericOperationCheck,
        code: "113",
        group: "Operacion Numerica",
        property: "Exactitud",
        label: "Operacion Numerica",
    },
    KindEntry {
        kind: RuleKind::StatisticsSummary,
        code: "114",
        group: "Estadisticas",
        property: "Perfilamiento",
        label: "Estadisticas",
    },
    KindEntry {
        kind: RuleKind::TimeRangeCheck,
        code: "115",
        group: "Rango de Fechas",
        property: "Exactitud",
        label: "Rango de fechas",
    },
    KindEntry {
        kind: RuleKind::ConditionalRule,
        code: "116",
        group: "Regla Condicional",
        property: "Consistencia",
        label: "Regla condicional",
    },
    KindEntry {
        kind: RuleKind::PositionValueCheck,
        code: "117",
        group: "Valor en Posicion",
        property: "Validez",
        label: "Valor en posición específica",
    },
    KindEntry {
        kind: RuleKind::EmailCheck,
        code: "118",
        group: "Email",
        property: "Validez",
        label: "Regla de Email",
    },
    KindEntry {
        kind: RuleKind::ValueTrendCheck,
        code: "119",
        group: "Valor en Tendencia",
        property: "Exactitud",
        label: "Regla de Valor en Tendencia",
    },
];

impl RuleKind {
    /// Resolve a configured rule code by its three-character prefix.
    ///
    /// Returns `None` for codes shorter than three characters or with an
    /// unknown prefix.
    pub fn from_code(code: &str) -> Option<Self> {
        let prefix = code.trim().get(0..3)?;
        KIND_TABLE
            .iter()
            .find(|entry| entry.code == prefix)
            .map(|entry| entry.kind)
    }

    /// Three-digit function code reported as `FunctionCode`.
    pub fn code(self) -> &'static str {
        self.entry().code
    }

    /// Rule group reported as `RuleGroup`.
    pub fn group(self) -> &'static str {
        self.entry().group
    }

    /// Quality dimension reported as `RuleProperty`.
    pub fn property(self) -> &'static str {
        self.entry().property
    }

    /// Prefix of the data requirement text, e.g. `Nulos` in `Nulos - id`.
    pub fn label(self) -> &'static str {
        self.entry().label
    }

    /// Whether the kind produces scored outcomes for the result table.
    pub fn is_scored(self) -> bool {
        !matches!(self, RuleKind::StatisticsSummary | RuleKind::Prerequisites)
    }

    /// All kinds in code order.
    pub fn all() -> impl Iterator<Item = RuleKind> {
        KIND_TABLE.iter().map(|entry| entry.kind)
    }

    fn entry(self) -> &'static KindEntry {
        // Every variant has exactly one table entry; `kind_table_is_complete` guards it.
        KIND_TABLE
            .iter()
            .find(|entry| entry.kind == self)
            .unwrap_or(&KIND_TABLE[0])
    }
}
