use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    evaluations::EmployeeEvaluation,
    registry::Employee,
    schema::avaliacoes_funcionarios,
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, created},
    validation::{
        Validate, Validated, answers, required_id, str_or_empty,
    },
};

#[derive(Deserialize, Debug)]
pub struct EmployeeEvaluationForm {
    #[serde(alias = "funcionario_id")]
    employee_id: Option<Value>,
    avaliacao_1: Option<Value>,
    avaliacao_2: Option<Value>,
    avaliacao_3: Option<Value>,
    avaliacao_4: Option<Value>,
    /// The fifth question may be left unanswered.
    avaliacao_5: Option<Value>,
    sugestoes: Option<Value>,
}

#[derive(Debug)]
pub struct EmployeeEvaluationInput {
    employee_id: i32,
    answers: [String; 4],
    answer_5: String,
    suggestions: String,
}

impl Validate for EmployeeEvaluationForm {
    type Output = EmployeeEvaluationInput;

    fn validate(self) -> Result<EmployeeEvaluationInput, FailureResponse> {
        Ok(EmployeeEvaluationInput {
            employee_id: required_id(self.employee_id, "employee_id")?,
            answers: answers([
                self.avaliacao_1,
                self.avaliacao_2,
                self.avaliacao_3,
                self.avaliacao_4,
            ])?,
            answer_5: str_or_empty(self.avaliacao_5, "avaliacao_5")?,
            suggestions: str_or_empty(self.sugestoes, "sugestoes")?,
        })
    }
}

impl EmployeeEvaluationInput {
    fn into_row(self, created_at: NaiveDateTime) -> EmployeeEvaluation {
        let [avaliacao_1, avaliacao_2, avaliacao_3, avaliacao_4] = self.answers;

        EmployeeEvaluation {
            employee_id: self.employee_id,
            avaliacao_1,
            avaliacao_2,
            avaliacao_3,
            avaliacao_4,
            avaliacao_5: self.answer_5,
            sugestoes: self.suggestions,
            created_at,
        }
    }
}

pub async fn submit_employee_evaluation(
    mut conn: Conn<true>,
    Validated(form): Validated<EmployeeEvaluationForm>,
) -> StandardResponse {
    let employee = Employee::fetch(form.employee_id, &mut *conn)?;

    let row = form.into_row(Utc::now().naive_utc());
    diesel::insert_into(avaliacoes_funcionarios::table)
        .values(&row)
        .execute(&mut *conn)?;

    tracing::info!(employee_id = employee.id, "recorded employee evaluation");

    created("Avaliação de funcionário registrada com sucesso!")
}
