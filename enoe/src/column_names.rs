//! Column names used across the preparation steps. The legacy ENOE names embed the type and width
//! of the original field (e.g. `MUN,C,3`); they are opaque keys and must match the headers of the
//! raw extracts exactly.

// Legacy ENOE fields
pub const LEGACY_MUNICIPALITY: &str = "MUN,C,3";
pub const LEGACY_ENTITY: &str = "ENT,C,2";
pub const LEGACY_RESIDENCY_CONDITION: &str = "C_RES,C,1";
pub const LEGACY_BIRTHPLACE: &str = "L_NAC_C,C,3";
pub const LEGACY_EXPANSION_FACTOR: &str = "FAC_NP,N,6,0";

// Added by the concatenation step
pub const PERIOD: &str = "TRIMESTRE";
pub const ADJUSTED_FACTOR: &str = "FAC_T2_2020_AJUSTADO";

// Human readable names after renaming
pub const MUNICIPALITY: &str = "Municipio";
pub const ENTITY_CODE: &str = "Entidad_Clave";
pub const RESIDENCY_CONDITION: &str = "Condicion_Residencia";
pub const BIRTHPLACE: &str = "Lugar_Residencia";
pub const EXPANSION_FACTOR: &str = "Factor_Expansion";

// Percentage table
pub const ENTITY_NAME: &str = "Nombre_Entidad";
pub const PCT_USUAL_RESIDENT: &str = "Porcentaje_Residente_Habitual";
pub const PCT_DEFINITIVE_ABSENT: &str = "Porcentaje_Ausente_Definitivo";
pub const PCT_NEW_RESIDENT: &str = "Porcentaje_Nuevo_Residente";
pub const VERIFICATION_SUM: &str = "Suma_Verificacion";

// Inflation series
pub const INDEX_TUXTLA: &str = "INPC TUXTLA";
pub const QUARTERLY_INFLATION: &str = "Inflacion_TRIMESTRAL_FINAL";
pub const ROW_INDEX: &str = "index";

// Consolidated report
pub const REPORT_LABEL: &str = "Año/Trimestre";
