use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    evaluations::ManagerEvaluation,
    registry::Employee,
    schema::avaliacoes_gestores,
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, created},
    validation::{
        Validate, Validated, answers, required_id, str_or_empty,
    },
};

/// Managers are employees, so `gestor_id` is an employee id. Whether that
/// employee currently holds the manager role is not checked.
#[derive(Deserialize, Debug)]
pub struct ManagerEvaluationForm {
    gestor_id: Option<Value>,
    avaliacao_1: Option<Value>,
    avaliacao_2: Option<Value>,
    avaliacao_3: Option<Value>,
    avaliacao_4: Option<Value>,
    sugestoes: Option<Value>,
}

#[derive(Debug)]
pub struct ManagerEvaluationInput {
    manager_id: i32,
    answers: [String; 3],
    answer_4: String,
    suggestions: String,
}

impl Validate for ManagerEvaluationForm {
    type Output = ManagerEvaluationInput;

    fn validate(self) -> Result<ManagerEvaluationInput, FailureResponse> {
        Ok(ManagerEvaluationInput {
            manager_id: required_id(self.gestor_id, "gestor_id")?,
            answers: answers([
                self.avaliacao_1,
                self.avaliacao_2,
                self.avaliacao_3,
            ])?,
            answer_4: str_or_empty(self.avaliacao_4, "avaliacao_4")?,
            suggestions: str_or_empty(self.sugestoes, "sugestoes")?,
        })
    }
}

impl ManagerEvaluationInput {
    fn into_row(self, created_at: NaiveDateTime) -> ManagerEvaluation {
        let [avaliacao_1, avaliacao_2, avaliacao_3] = self.answers;

        ManagerEvaluation {
            manager_id: self.manager_id,
            avaliacao_1,
            avaliacao_2,
            avaliacao_3,
            avaliacao_4: self.answer_4,
            sugestoes: self.suggestions,
            created_at,
        }
    }
}

pub async fn submit_manager_evaluation(
    mut conn: Conn<true>,
    Validated(form): Validated<ManagerEvaluationForm>,
) -> StandardResponse {
    let manager = Employee::fetch(form.manager_id, &mut *conn).map_err(|e| {
        match e {
            FailureResponse::NotFound(_) => FailureResponse::NotFound(
                "Gestor não encontrado".to_string(),
            ),
            other => other,
        }
    })?;

    let row = form.into_row(Utc::now().naive_utc());
    diesel::insert_into(avaliacoes_gestores::table)
        .values(&row)
        .execute(&mut *conn)?;

    tracing::info!(manager_id = manager.id, "recorded manager evaluation");

    created("Avaliação de gestor registrada com sucesso!")
}
