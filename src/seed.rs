//! Bulk loading of reference data from a TOML document, used by the `seed`
//! binary to prepare a fresh database:
//!
//! ```toml
//! [[turmas]]
//! nome = "Turma A"
//!
//! [[funcoes]]
//! nome = "Gestor Escolar"
//!
//! [[professores]]
//! nome = "Ana"
//! turmas = ["Turma A"]
//!
//! [[funcionarios]]
//! nome = "Carlos"
//! funcao = "Gestor Escolar"
//! ```
//!
//! Classes and roles are referred to by name. Names declared in the same
//! file take precedence, otherwise the oldest row with that name is used.

use std::collections::HashMap;

use diesel::{connection::LoadConnection, prelude::*, sqlite::Sqlite};
use serde::Deserialize;

use crate::{
    registry::teachers::link_classes,
    schema::{funcionarios, funcoes, professores, turmas},
    validation::is_blank,
};

#[derive(Deserialize, Debug, Default)]
#[serde(deny_unknown_fields)]
pub struct SeedFile {
    #[serde(default)]
    pub turmas: Vec<SeedNamed>,
    #[serde(default)]
    pub funcoes: Vec<SeedNamed>,
    #[serde(default)]
    pub professores: Vec<SeedTeacher>,
    #[serde(default)]
    pub funcionarios: Vec<SeedEmployee>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SeedNamed {
    pub nome: String,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SeedTeacher {
    pub nome: String,
    #[serde(default)]
    pub turmas: Vec<String>,
}

#[derive(Deserialize, Debug)]
#[serde(deny_unknown_fields)]
pub struct SeedEmployee {
    pub nome: String,
    pub funcao: String,
}

#[derive(thiserror::Error, Debug)]
pub enum SeedError {
    #[error("failed to parse seed file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("an entry in `{0}` has a blank name")]
    BlankName(&'static str),
    #[error("no class named `{0}`")]
    UnknownClass(String),
    #[error("no role named `{0}`")]
    UnknownRole(String),
    #[error("database error: {0}")]
    Database(#[from] diesel::result::Error),
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub classes: usize,
    pub roles: usize,
    pub teachers: usize,
    pub links: usize,
    pub employees: usize,
}

impl SeedFile {
    pub fn parse(contents: &str) -> Result<Self, SeedError> {
        Ok(toml::from_str(contents)?)
    }

    /// Inserts everything in a single transaction; on any error nothing is
    /// written.
    pub fn apply<C>(&self, conn: &mut C) -> Result<SeedReport, SeedError>
    where
        C: LoadConnection<Backend = Sqlite>,
    {
        self.check_names()?;
        conn.transaction(|conn| self.insert_all(conn))
    }

    fn check_names(&self) -> Result<(), SeedError> {
        let sections: [(&'static str, Vec<&str>); 4] = [
            ("turmas", self.turmas.iter().map(|t| t.nome.as_str()).collect()),
            ("funcoes", self.funcoes.iter().map(|f| f.nome.as_str()).collect()),
            (
                "professores",
                self.professores.iter().map(|p| p.nome.as_str()).collect(),
            ),
            (
                "funcionarios",
                self.funcionarios.iter().map(|f| f.nome.as_str()).collect(),
            ),
        ];

        for (section, names) in sections {
            if names.into_iter().any(is_blank) {
                return Err(SeedError::BlankName(section));
            }
        }
        Ok(())
    }

    fn insert_all(
        &self,
        conn: &mut impl LoadConnection<Backend = Sqlite>,
    ) -> Result<SeedReport, SeedError> {
        let mut report = SeedReport::default();

        let mut classes = HashMap::new();
        for class in &self.turmas {
            let id = diesel::insert_into(turmas::table)
                .values(turmas::nome.eq(&class.nome))
                .returning(turmas::id)
                .get_result::<i32>(conn)?;
            classes.entry(class.nome.as_str()).or_insert(id);
            report.classes += 1;
        }

        let mut roles = HashMap::new();
        for role in &self.funcoes {
            let id = diesel::insert_into(funcoes::table)
                .values(funcoes::nome.eq(&role.nome))
                .returning(funcoes::id)
                .get_result::<i32>(conn)?;
            roles.entry(role.nome.as_str()).or_insert(id);
            report.roles += 1;
        }

        for teacher in &self.professores {
            let class_ids = teacher
                .turmas
                .iter()
                .map(|name| match classes.get(name.as_str()) {
                    Some(id) => Ok(*id),
                    None => existing_class(name, conn)?
                        .ok_or_else(|| SeedError::UnknownClass(name.clone())),
                })
                .collect::<Result<Vec<_>, _>>()?;

            let id = diesel::insert_into(professores::table)
                .values(professores::nome.eq(&teacher.nome))
                .returning(professores::id)
                .get_result::<i32>(conn)?;
            report.links += link_classes(id, &class_ids, conn)?;
            report.teachers += 1;
        }

        for employee in &self.funcionarios {
            let role_id = match roles.get(employee.funcao.as_str()) {
                Some(id) => *id,
                None => existing_role(&employee.funcao, conn)?.ok_or_else(
                    || SeedError::UnknownRole(employee.funcao.clone()),
                )?,
            };

            diesel::insert_into(funcionarios::table)
                .values((
                    funcionarios::nome.eq(&employee.nome),
                    funcionarios::funcao_id.eq(role_id),
                ))
                .execute(conn)?;
            report.employees += 1;
        }

        tracing::info!(?report, "seeded reference data");

        Ok(report)
    }
}

fn existing_class(
    name: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<Option<i32>> {
    turmas::table
        .filter(turmas::nome.eq(name))
        .order_by(turmas::id.asc())
        .select(turmas::id)
        .first::<i32>(conn)
        .optional()
}

fn existing_role(
    name: &str,
    conn: &mut impl LoadConnection<Backend = Sqlite>,
) -> QueryResult<Option<i32>> {
    funcoes::table
        .filter(funcoes::nome.eq(name))
        .order_by(funcoes::id.asc())
        .select(funcoes::id)
        .first::<i32>(conn)
        .optional()
}

#[cfg(test)]
mod tests {
    use diesel::{SqliteConnection, connection::SimpleConnection};
    use diesel_migrations::MigrationHarness;

    use super::*;
    use crate::{
        MIGRATIONS,
        registry::{MANAGER_ROLE_NAME, Teacher, TeacherWithClasses},
    };

    fn conn() -> SqliteConnection {
        let mut conn = SqliteConnection::establish(":memory:").unwrap();
        conn.batch_execute("PRAGMA foreign_keys = ON;").unwrap();
        conn.run_pending_migrations(MIGRATIONS).unwrap();
        conn
    }

    const SEED: &str = r#"
        [[turmas]]
        nome = "Turma A"

        [[turmas]]
        nome = "Turma B"

        [[funcoes]]
        nome = "Gestor Escolar"

        [[funcoes]]
        nome = "Secretaria"

        [[professores]]
        nome = "Ana"
        turmas = ["Turma A", "Turma B"]

        [[professores]]
        nome = "Bruno"

        [[funcionarios]]
        nome = "Carlos"
        funcao = "Gestor Escolar"
    "#;

    #[test]
    fn seeds_reference_data() {
        let mut conn = conn();
        let report = SeedFile::parse(SEED).unwrap().apply(&mut conn).unwrap();
        assert_eq!(
            report,
            SeedReport {
                classes: 2,
                roles: 2,
                teachers: 2,
                links: 2,
                employees: 1,
            }
        );

        let teachers = professores::table
            .order_by(professores::id)
            .select(Teacher::as_select())
            .load::<Teacher>(&mut conn)
            .unwrap();
        let teachers = TeacherWithClasses::load(teachers, &mut conn).unwrap();
        assert_eq!(teachers[0].classes, vec!["Turma A", "Turma B"]);
        assert!(teachers[1].classes.is_empty());

        let manager_role = funcionarios::table
            .inner_join(funcoes::table)
            .select(funcoes::nome)
            .first::<String>(&mut conn)
            .unwrap();
        assert_eq!(manager_role, MANAGER_ROLE_NAME);
    }

    #[test]
    fn names_resolve_against_existing_rows() {
        let mut conn = conn();
        SeedFile::parse(SEED).unwrap().apply(&mut conn).unwrap();

        let more = SeedFile::parse(
            r#"
            [[professores]]
            nome = "Clara"
            turmas = ["Turma B"]
            "#,
        )
        .unwrap();
        let report = more.apply(&mut conn).unwrap();
        assert_eq!(report.links, 1);
    }

    #[test]
    fn unknown_names_roll_everything_back() {
        let mut conn = conn();
        let seed = SeedFile::parse(
            r#"
            [[turmas]]
            nome = "Turma A"

            [[funcionarios]]
            nome = "Carlos"
            funcao = "Diretor"
            "#,
        )
        .unwrap();

        let err = seed.apply(&mut conn).unwrap_err();
        assert!(matches!(err, SeedError::UnknownRole(ref r) if r == "Diretor"));

        let classes = turmas::table
            .count()
            .get_result::<i64>(&mut conn)
            .unwrap();
        assert_eq!(classes, 0);
    }

    #[test]
    fn rejects_blank_names_and_unknown_keys() {
        assert!(matches!(
            SeedFile::parse("[[turmas]]\nnome = \" \"")
                .unwrap()
                .apply(&mut conn()),
            Err(SeedError::BlankName("turmas"))
        ));
        assert!(matches!(
            SeedFile::parse("[[turmas]]\nname = \"A\""),
            Err(SeedError::Parse(_))
        ));
    }
}
