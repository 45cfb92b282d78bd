use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    registry::{Class, Teacher, TeacherWithClasses},
    schema::{professor_turma, professores, turmas},
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, created, success},
    validation::{IdPath, Validate, Validated, required_str},
};

pub async fn list_classes(mut conn: Conn<false>) -> StandardResponse {
    let classes = turmas::table
        .order_by(turmas::id.asc())
        .select(Class::as_select())
        .load::<Class>(&mut *conn)?;

    success(classes)
}

pub async fn teachers_of_class(
    IdPath(class_id): IdPath,
    mut conn: Conn<false>,
) -> StandardResponse {
    let class = Class::fetch(class_id, &mut *conn)?;

    let teachers = professores::table
        .inner_join(professor_turma::table)
        .filter(professor_turma::turma_id.eq(class.id))
        .order_by(professores::id.asc())
        .select(Teacher::as_select())
        .load::<Teacher>(&mut *conn)?;

    success(TeacherWithClasses::load(teachers, &mut *conn)?)
}

#[derive(Deserialize, Debug)]
pub struct ClassForm {
    nome: Option<Value>,
}

#[derive(Debug)]
pub struct NewClass {
    name: String,
}

impl Validate for ClassForm {
    type Output = NewClass;

    fn validate(self) -> Result<NewClass, FailureResponse> {
        Ok(NewClass {
            name: required_str(self.nome, "nome")?,
        })
    }
}

pub async fn add_class(
    mut conn: Conn<true>,
    Validated(new): Validated<ClassForm>,
) -> StandardResponse {
    let id = diesel::insert_into(turmas::table)
        .values(turmas::nome.eq(&new.name))
        .returning(turmas::id)
        .get_result::<i32>(&mut *conn)?;

    tracing::info!(id, "created class");

    created("Turma adicionada com sucesso!")
}
