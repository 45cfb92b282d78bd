//! Evaluation intake. Submissions are only ever inserted: nothing here reads
//! them back, updates them or deduplicates them.

use chrono::NaiveDateTime;
use diesel::prelude::*;
use diesel::sqlite::Sqlite;

use crate::schema::{
    avaliacoes_funcionarios, avaliacoes_gestores, avaliacoes_professores,
};

pub mod employee;
pub mod manager;
pub mod teacher;

#[derive(Insertable, Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = avaliacoes_professores)]
#[diesel(check_for_backend(Sqlite))]
pub struct TeacherEvaluation {
    #[diesel(column_name = professor_id)]
    pub teacher_id: i32,
    #[diesel(column_name = turma_id)]
    pub class_id: i32,
    pub avaliacao_1: String,
    pub avaliacao_2: String,
    pub avaliacao_3: String,
    pub avaliacao_4: String,
    pub avaliacao_5: String,
    pub avaliacao_6: String,
    pub avaliacao_7: String,
    pub avaliacao_8: String,
    pub avaliacao_9: String,
    pub avaliacao_10: String,
    pub avaliacao_11: String,
    pub avaliacao_12: String,
    pub avaliacao_13: String,
    pub avaliacao_14: String,
    pub sugestoes: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = avaliacoes_funcionarios)]
#[diesel(check_for_backend(Sqlite))]
pub struct EmployeeEvaluation {
    #[diesel(column_name = funcionario_id)]
    pub employee_id: i32,
    pub avaliacao_1: String,
    pub avaliacao_2: String,
    pub avaliacao_3: String,
    pub avaliacao_4: String,
    pub avaliacao_5: String,
    pub sugestoes: String,
    pub created_at: NaiveDateTime,
}

#[derive(Insertable, Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = avaliacoes_gestores)]
#[diesel(check_for_backend(Sqlite))]
pub struct ManagerEvaluation {
    #[diesel(column_name = gestor_id)]
    pub manager_id: i32,
    pub avaliacao_1: String,
    pub avaliacao_2: String,
    pub avaliacao_3: String,
    pub avaliacao_4: String,
    pub sugestoes: String,
    pub created_at: NaiveDateTime,
}
