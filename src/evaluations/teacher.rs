use chrono::{NaiveDateTime, Utc};
use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    evaluations::TeacherEvaluation,
    registry::{Class, Teacher},
    schema::avaliacoes_professores,
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, created},
    validation::{
        Validate, Validated, answers, required_id, str_or_empty,
    },
};

pub const TEACHER_QUESTIONS: usize = 14;

#[derive(Deserialize, Debug)]
pub struct TeacherEvaluationForm {
    #[serde(alias = "professor_id")]
    teacher_id: Option<Value>,
    turma_id: Option<Value>,
    avaliacao_1: Option<Value>,
    avaliacao_2: Option<Value>,
    avaliacao_3: Option<Value>,
    avaliacao_4: Option<Value>,
    avaliacao_5: Option<Value>,
    avaliacao_6: Option<Value>,
    avaliacao_7: Option<Value>,
    avaliacao_8: Option<Value>,
    avaliacao_9: Option<Value>,
    avaliacao_10: Option<Value>,
    avaliacao_11: Option<Value>,
    avaliacao_12: Option<Value>,
    avaliacao_13: Option<Value>,
    avaliacao_14: Option<Value>,
    sugestoes: Option<Value>,
}

#[derive(Debug)]
pub struct TeacherEvaluationInput {
    teacher_id: i32,
    class_id: i32,
    answers: [String; TEACHER_QUESTIONS],
    suggestions: String,
}

impl Validate for TeacherEvaluationForm {
    type Output = TeacherEvaluationInput;

    fn validate(self) -> Result<TeacherEvaluationInput, FailureResponse> {
        let teacher_id = required_id(self.teacher_id, "teacher_id")?;
        let class_id = required_id(self.turma_id, "turma_id")?;
        let answers = answers([
            self.avaliacao_1,
            self.avaliacao_2,
            self.avaliacao_3,
            self.avaliacao_4,
            self.avaliacao_5,
            self.avaliacao_6,
            self.avaliacao_7,
            self.avaliacao_8,
            self.avaliacao_9,
            self.avaliacao_10,
            self.avaliacao_11,
            self.avaliacao_12,
            self.avaliacao_13,
            self.avaliacao_14,
        ])?;

        Ok(TeacherEvaluationInput {
            teacher_id,
            class_id,
            answers,
            suggestions: str_or_empty(self.sugestoes, "sugestoes")?,
        })
    }
}

impl TeacherEvaluationInput {
    fn into_row(self, created_at: NaiveDateTime) -> TeacherEvaluation {
        let [
            avaliacao_1,
            avaliacao_2,
            avaliacao_3,
            avaliacao_4,
            avaliacao_5,
            avaliacao_6,
            avaliacao_7,
            avaliacao_8,
            avaliacao_9,
            avaliacao_10,
            avaliacao_11,
            avaliacao_12,
            avaliacao_13,
            avaliacao_14,
        ] = self.answers;

        TeacherEvaluation {
            teacher_id: self.teacher_id,
            class_id: self.class_id,
            avaliacao_1,
            avaliacao_2,
            avaliacao_3,
            avaliacao_4,
            avaliacao_5,
            avaliacao_6,
            avaliacao_7,
            avaliacao_8,
            avaliacao_9,
            avaliacao_10,
            avaliacao_11,
            avaliacao_12,
            avaliacao_13,
            avaliacao_14,
            sugestoes: self.suggestions,
            created_at,
        }
    }
}

pub async fn submit_teacher_evaluation(
    mut conn: Conn<true>,
    Validated(form): Validated<TeacherEvaluationForm>,
) -> StandardResponse {
    let teacher = Teacher::fetch(form.teacher_id, &mut *conn)?;
    let class = Class::fetch(form.class_id, &mut *conn)?;

    let row = form.into_row(Utc::now().naive_utc());
    diesel::insert_into(avaliacoes_professores::table)
        .values(&row)
        .execute(&mut *conn)?;

    tracing::info!(
        teacher_id = teacher.id,
        class_id = class.id,
        "recorded teacher evaluation"
    );

    created("Avaliação de professor registrada com sucesso!")
}
