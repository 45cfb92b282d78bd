//! Reference data: teachers, classes, roles and employees.

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use indexmap::IndexMap;
use serde::Serialize;

use crate::{
    schema::{funcionarios, funcoes, professor_turma, professores, turmas},
    util_resp::FailureResponse,
};

pub mod classes;
pub mod employees;
pub mod roles;
pub mod teachers;

/// Employees holding the role with exactly this name are managers.
pub const MANAGER_ROLE_NAME: &str = "Gestor Escolar";

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = turmas)]
#[diesel(check_for_backend(Sqlite))]
pub struct Class {
    pub id: i32,
    #[diesel(column_name = nome)]
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = professores)]
#[diesel(check_for_backend(Sqlite))]
pub struct Teacher {
    pub id: i32,
    #[diesel(column_name = nome)]
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Queryable, Selectable, Serialize, Debug, Clone, PartialEq)]
#[diesel(table_name = funcoes)]
#[diesel(check_for_backend(Sqlite))]
pub struct Role {
    pub id: i32,
    #[diesel(column_name = nome)]
    #[serde(rename = "nome")]
    pub name: String,
}

#[derive(Queryable, Selectable, Debug, Clone, PartialEq)]
#[diesel(table_name = funcionarios)]
#[diesel(check_for_backend(Sqlite))]
pub struct Employee {
    pub id: i32,
    #[diesel(column_name = nome)]
    pub name: String,
    #[diesel(column_name = funcao_id)]
    pub role_id: i32,
}

/// How employees are listed: role ids are not part of the listing.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct EmployeeSummary {
    pub id: i32,
    #[serde(rename = "nome")]
    pub name: String,
}

impl From<Employee> for EmployeeSummary {
    fn from(e: Employee) -> Self {
        EmployeeSummary {
            id: e.id,
            name: e.name,
        }
    }
}

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = professor_turma)]
#[diesel(check_for_backend(Sqlite))]
pub struct TeacherClass {
    #[diesel(column_name = professor_id)]
    pub teacher_id: i32,
    #[diesel(column_name = turma_id)]
    pub class_id: i32,
}

impl Class {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: i32,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Class, FailureResponse> {
        turmas::table
            .find(id)
            .select(Class::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| {
                FailureResponse::NotFound("Turma não encontrada".to_string())
            })
    }
}

impl Teacher {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: i32,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Teacher, FailureResponse> {
        professores::table
            .find(id)
            .select(Teacher::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| {
                FailureResponse::NotFound(
                    "Professor não encontrado".to_string(),
                )
            })
    }
}

impl Employee {
    #[tracing::instrument(skip(conn))]
    pub fn fetch(
        id: i32,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Employee, FailureResponse> {
        funcionarios::table
            .find(id)
            .select(Employee::as_select())
            .first(conn)
            .optional()?
            .ok_or_else(|| {
                FailureResponse::NotFound(
                    "Funcionário não encontrado".to_string(),
                )
            })
    }
}

/// A teacher together with the names of the classes they teach.
#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TeacherWithClasses {
    pub id: i32,
    #[serde(rename = "nome")]
    pub name: String,
    #[serde(rename = "turmas")]
    pub classes: Vec<String>,
}

impl TeacherWithClasses {
    /// Attaches class names to each of `teachers`, keeping their order.
    pub fn load(
        teachers: Vec<Teacher>,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<Vec<TeacherWithClasses>, FailureResponse> {
        let ids: Vec<i32> = teachers.iter().map(|t| t.id).collect();

        let links = professor_turma::table
            .inner_join(turmas::table)
            .filter(professor_turma::professor_id.eq_any(&ids))
            .order_by((professor_turma::professor_id, turmas::id))
            .select((professor_turma::professor_id, turmas::nome))
            .load::<(i32, String)>(conn)?;

        let mut by_teacher: IndexMap<i32, TeacherWithClasses> = teachers
            .into_iter()
            .map(|t| {
                (
                    t.id,
                    TeacherWithClasses {
                        id: t.id,
                        name: t.name,
                        classes: Vec::new(),
                    },
                )
            })
            .collect();

        for (teacher_id, class_name) in links {
            if let Some(entry) = by_teacher.get_mut(&teacher_id) {
                entry.classes.push(class_name);
            }
        }

        Ok(by_teacher.into_values().collect())
    }
}
