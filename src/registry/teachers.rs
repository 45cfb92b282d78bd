use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    registry::{Teacher, TeacherClass, TeacherWithClasses},
    schema::{professor_turma, professores, turmas},
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, created, success},
    validation::{Validate, Validated, id_list, required_str},
};

pub async fn list_teachers(mut conn: Conn<false>) -> StandardResponse {
    let teachers = professores::table
        .order_by(professores::id.asc())
        .select(Teacher::as_select())
        .load::<Teacher>(&mut *conn)?;

    success(TeacherWithClasses::load(teachers, &mut *conn)?)
}

#[derive(Deserialize, Debug)]
pub struct TeacherForm {
    nome: Option<Value>,
    /// Class ids.
    turmas: Option<Value>,
}

#[derive(Debug)]
pub struct NewTeacher {
    name: String,
    class_ids: Vec<i32>,
}

impl Validate for TeacherForm {
    type Output = NewTeacher;

    fn validate(self) -> Result<NewTeacher, FailureResponse> {
        Ok(NewTeacher {
            name: required_str(self.nome, "nome")?,
            class_ids: id_list(self.turmas, "turmas")?,
        })
    }
}

pub async fn add_teacher(
    mut conn: Conn<true>,
    Validated(new): Validated<TeacherForm>,
) -> StandardResponse {
    let id = diesel::insert_into(professores::table)
        .values(professores::nome.eq(&new.name))
        .returning(professores::id)
        .get_result::<i32>(&mut *conn)?;

    let linked = link_classes(id, &new.class_ids, &mut *conn)?;

    tracing::info!(id, classes = linked, "created teacher");

    created("Professor adicionado com sucesso!")
}

/// Associates the teacher with each of `class_ids` that names an existing
/// class. Ids matching no class are skipped rather than rejected. Returns
/// the number of associations that were created.
#[tracing::instrument(skip(conn))]
pub fn link_classes(
    teacher_id: i32,
    class_ids: &[i32],
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<usize> {
    if class_ids.is_empty() {
        return Ok(0);
    }

    let known = turmas::table
        .filter(turmas::id.eq_any(class_ids))
        .order_by(turmas::id.asc())
        .select(turmas::id)
        .load::<i32>(&mut *conn)?;

    if known.len() < class_ids.len() {
        tracing::debug!(
            requested = class_ids.len(),
            known = known.len(),
            "skipping unknown or repeated class ids"
        );
    }

    let mut linked = 0;
    for class_id in known {
        linked += diesel::insert_or_ignore_into(professor_turma::table)
            .values(TeacherClass {
                teacher_id,
                class_id,
            })
            .execute(&mut *conn)?;
    }

    Ok(linked)
}
