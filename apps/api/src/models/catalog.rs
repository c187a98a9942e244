use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// Read-only row of the French job catalogue (`metiers_france`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MetierRow {
    pub id: i64,
    pub nom: String,
    pub description: Option<String>,
    pub secteur: Option<String>,
    pub code_rome: Option<String>,
}

/// Read-only row of the French study catalogue (`formation_france`).
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct FormationCatalogRow {
    pub id: i64,
    pub nom: String,
    pub etablissement: Option<String>,
    pub ville: Option<String>,
    pub niveau: Option<String>,
    pub url: Option<String>,
}
