use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Deserialize;
use serde_json::Value;

use crate::{
    registry::{Employee, EmployeeSummary, MANAGER_ROLE_NAME},
    schema::{funcionarios, funcoes},
    state::Conn,
    util_resp::{FailureResponse, StandardResponse, created, success},
    validation::{Validate, Validated, required_id, required_str},
};

/// Lists employees whose role is named exactly [`MANAGER_ROLE_NAME`].
pub async fn list_managers(mut conn: Conn<false>) -> StandardResponse {
    let managers = funcionarios::table
        .inner_join(funcoes::table)
        .filter(funcoes::nome.eq(MANAGER_ROLE_NAME))
        .order_by(funcionarios::id.asc())
        .select(Employee::as_select())
        .load::<Employee>(&mut *conn)?;

    success(
        managers
            .into_iter()
            .map(EmployeeSummary::from)
            .collect::<Vec<_>>(),
    )
}

/// Body of both `/add_funcionario` and `/add_gestor`.
#[derive(Deserialize, Debug)]
pub struct EmployeeForm {
    nome: Option<Value>,
    funcao_id: Option<Value>,
}

/// The role is not looked up here; a dangling `role_id` is refused by the
/// foreign key when the row is inserted.
#[derive(Debug)]
pub struct NewEmployee {
    name: String,
    role_id: i32,
}

impl Validate for EmployeeForm {
    type Output = NewEmployee;

    fn validate(self) -> Result<NewEmployee, FailureResponse> {
        Ok(NewEmployee {
            name: required_str(self.nome, "nome")?,
            role_id: required_id(self.funcao_id, "funcao_id")?,
        })
    }
}

fn insert_employee(
    new: &NewEmployee,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> Result<i32, FailureResponse> {
    let id = diesel::insert_into(funcionarios::table)
        .values((
            funcionarios::nome.eq(&new.name),
            funcionarios::funcao_id.eq(new.role_id),
        ))
        .returning(funcionarios::id)
        .get_result::<i32>(conn)?;

    Ok(id)
}

pub async fn add_employee(
    mut conn: Conn<true>,
    Validated(new): Validated<EmployeeForm>,
) -> StandardResponse {
    let id = insert_employee(&new, &mut *conn)?;
    tracing::info!(id, role_id = new.role_id, "created employee");

    created("Funcionário adicionado com sucesso!")
}

pub async fn add_manager(
    mut conn: Conn<true>,
    Validated(new): Validated<EmployeeForm>,
) -> StandardResponse {
    let id = insert_employee(&new, &mut *conn)?;
    tracing::info!(id, role_id = new.role_id, "created manager");

    created("Gestor adicionado com sucesso!")
}
