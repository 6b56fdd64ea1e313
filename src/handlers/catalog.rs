use axum::Json;
use axum::extract::Query;
use serde::{Deserialize, Serialize};

use crate::formulae::{self, FormulaSearch};
use crate::models::Subject;

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct SubjectInfo {
    pub id: String,
    pub title: String,
    pub description: String,
}

impl From<Subject> for SubjectInfo {
    fn from(subject: Subject) -> Self {
        Self {
            id: subject.tag().to_string(),
            title: subject.title().to_string(),
            description: subject.description().to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Default)]
pub struct FormulaQuery {
    #[serde(default)]
    pub q: Option<String>,
}

/// `GET /subjects`
pub async fn subjects() -> Json<Vec<SubjectInfo>> {
    Json(Subject::RECOGNIZED.into_iter().map(SubjectInfo::from).collect())
}

/// `GET /formulae?q=`
pub async fn formulae(Query(query): Query<FormulaQuery>) -> Json<FormulaSearch> {
    Json(formulae::search(query.q.as_deref().unwrap_or_default()))
}
