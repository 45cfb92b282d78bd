use diesel::prelude::*;
use serde::Deserialize;
use serde_json::Value;

use crate::{
    registry::{Employee, EmployeeSummary, Role},
    schema::{funcionarios, funcoes},
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, created, success},
    validation::{IdPath, Validate, Validated, required_str},
};

pub async fn list_roles(mut conn: Conn<false>) -> StandardResponse {
    let roles = funcoes::table
        .order_by(funcoes::id.asc())
        .select(Role::as_select())
        .load::<Role>(&mut *conn)?;

    success(roles)
}

/// Employees holding the given role. A role id that matches nothing is not
/// an error, it just has no employees.
pub async fn employees_of_role(
    IdPath(role_id): IdPath,
    mut conn: Conn<false>,
) -> StandardResponse {
    let employees = funcionarios::table
        .filter(funcionarios::funcao_id.eq(role_id))
        .order_by(funcionarios::id.asc())
        .select(Employee::as_select())
        .load::<Employee>(&mut *conn)?;

    success(
        employees
            .into_iter()
            .map(EmployeeSummary::from)
            .collect::<Vec<_>>(),
    )
}

#[derive(Deserialize, Debug)]
pub struct RoleForm {
    nome: Option<Value>,
}

#[derive(Debug)]
pub struct NewRole {
    name: String,
}

impl Validate for RoleForm {
    type Output = NewRole;

    fn validate(self) -> Result<NewRole, FailureResponse> {
        Ok(NewRole {
            name: required_str(self.nome, "nome")?,
        })
    }
}

pub async fn add_role(
    mut conn: Conn<true>,
    Validated(new): Validated<RoleForm>,
) -> StandardResponse {
    let id = diesel::insert_into(funcoes::table)
        .values(funcoes::nome.eq(&new.name))
        .returning(funcoes::id)
        .get_result::<i32>(&mut *conn)?;

    tracing::info!(id, "created role");

    created("Função adicionada com sucesso!")
}
