//! CSV wire format for secrets, variables and the environment report.
//!
//! Multi-valued cells (repository names and IDs) are joined with `;`. An empty
//! list and a list holding one empty string both serialize to `""`, and `""`
//! always parses back to the empty list.

use std::io;

use serde::{Deserialize, Serialize};

use crate::constants::csv::{
    CELL_SEPARATOR, ENVIRONMENT_HEADER, REPO_ONLY_ACCESS, SECRET_HEADER, VARIABLE_HEADER,
};
use crate::errors::SchemaError;
use crate::models::{Level, Provider, Visibility};

/// Join a repository name or ID list into one cell.
pub fn join_cell<S: AsRef<str>>(values: &[S]) -> String {
    values
        .iter()
        .map(|v| v.as_ref())
        .collect::<Vec<_>>()
        .join(CELL_SEPARATOR)
}

/// Split a cell back into its list. `""` yields no entries.
pub fn split_cell(cell: &str) -> Vec<String> {
    if cell.is_empty() {
        return Vec::new();
    }
    cell.split(CELL_SEPARATOR).map(str::to_string).collect()
}

/// A secret row read from a CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedSecret {
    pub level: Level,
    pub provider: Provider,
    pub name: String,
    pub value: String,
    /// `all`, `private`, `selected` or `RepoOnly`.
    pub access: String,
    pub repository_names: Vec<String>,
    pub repository_ids: Vec<String>,
}

/// A variable row read from a CSV file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportedVariable {
    pub level: Level,
    pub name: String,
    pub value: String,
    pub access: String,
    pub repository_names: Vec<String>,
    pub repository_ids: Vec<String>,
}

/// The concrete repository set a secret or variable applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RepositoryScope {
    pub names: Vec<String>,
    pub ids: Vec<String>,
}

impl RepositoryScope {
    pub fn is_empty(&self) -> bool {
        self.names.is_empty() && self.ids.is_empty()
    }
}

/// Positional layout of a secrets row.
#[derive(Debug, Serialize, Deserialize)]
struct SecretRecord {
    level: Level,
    provider: Provider,
    name: String,
    value: String,
    access: String,
    repository_names: String,
    repository_ids: String,
}

/// Positional layout of a variables row.
#[derive(Debug, Serialize, Deserialize)]
struct VariableRecord {
    level: Level,
    name: String,
    value: String,
    access: String,
    repository_names: String,
    repository_ids: String,
}

/// One row of the environment report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EnvironmentRecord {
    pub repository_name: String,
    pub repository_id: u64,
    pub environment_name: String,
    pub admin_bypass: bool,
    pub wait_timer: u64,
    pub reviewers: String,
    pub protected_branches: bool,
    pub custom_branch_policies: bool,
    pub secrets_total_count: usize,
    pub secrets_list: String,
    pub variables_total_count: usize,
    pub variables_list: String,
}

impl ImportedSecret {
    /// The single repository a repository-level secret targets.
    pub fn target_repository(&self) -> Result<&str, SchemaError> {
        single_repository(&self.name, &self.repository_names)
    }

    pub fn is_selected(&self) -> bool {
        self.access.eq_ignore_ascii_case(Visibility::Selected.as_str())
    }
}

impl ImportedVariable {
    pub fn target_repository(&self) -> Result<&str, SchemaError> {
        single_repository(&self.name, &self.repository_names)
    }

    pub fn is_selected(&self) -> bool {
        self.access.eq_ignore_ascii_case(Visibility::Selected.as_str())
    }
}

fn single_repository<'a>(name: &str, names: &'a [String]) -> Result<&'a str, SchemaError> {
    match names {
        [] => Err(SchemaError::MissingRepository(name.to_string())),
        [only] if only.trim().is_empty() => Err(SchemaError::MissingRepository(name.to_string())),
        [only] => Ok(only.trim()),
        many => Err(SchemaError::AmbiguousRepository {
            name: name.to_string(),
            count: many.len(),
        }),
    }
}

/// Writes export rows to any `io::Write`.
pub struct CsvExporter<W: io::Write> {
    writer: csv::Writer<W>,
}

impl<W: io::Write> CsvExporter<W> {
    fn with_header(inner: W, header: &[&str]) -> csv::Result<Self> {
        let mut writer = csv::WriterBuilder::new()
            .has_headers(false)
            .from_writer(inner);
        writer.write_record(header)?;
        Ok(Self { writer })
    }

    pub fn secrets(inner: W) -> csv::Result<Self> {
        Self::with_header(inner, &SECRET_HEADER)
    }

    pub fn variables(inner: W) -> csv::Result<Self> {
        Self::with_header(inner, &VARIABLE_HEADER)
    }

    pub fn environments(inner: W) -> csv::Result<Self> {
        Self::with_header(inner, &ENVIRONMENT_HEADER)
    }

    /// Secret values are never returned by GitHub, so the value cell is always empty.
    pub fn write_secret(
        &mut self,
        level: Level,
        provider: Provider,
        name: &str,
        access: &str,
        scope: &RepositoryScope,
    ) -> csv::Result<()> {
        self.writer.serialize(SecretRecord {
            level,
            provider,
            name: name.to_string(),
            value: String::new(),
            access: access.to_string(),
            repository_names: join_cell(&scope.names),
            repository_ids: join_cell(&scope.ids),
        })
    }

    pub fn write_variable(
        &mut self,
        level: Level,
        name: &str,
        value: &str,
        access: &str,
        scope: &RepositoryScope,
    ) -> csv::Result<()> {
        self.writer.serialize(VariableRecord {
            level,
            name: name.to_string(),
            value: value.to_string(),
            access: access.to_string(),
            repository_names: join_cell(&scope.names),
            repository_ids: join_cell(&scope.ids),
        })
    }

    pub fn write_environment(&mut self, record: &EnvironmentRecord) -> csv::Result<()> {
        self.writer.serialize(record)
    }

    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    pub fn into_inner(self) -> Result<W, csv::IntoInnerError<csv::Writer<W>>> {
        self.writer.into_inner()
    }
}

fn reader<R: io::Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(input)
}

fn line_of(record: &csv::StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or_default()
}

fn malformed(line: u64, err: impl std::fmt::Display) -> SchemaError {
    SchemaError::Malformed {
        line,
        message: err.to_string(),
    }
}

/// Parse every data row of a secrets CSV. The header line is skipped whatever
/// its content. A bad row yields an `Err` entry; the rest are still parsed.
pub fn parse_secrets<R: io::Read>(input: R) -> csv::Result<Vec<Result<ImportedSecret, SchemaError>>> {
    let mut rdr = reader(input);
    rdr.headers()?;

    let rows = rdr
        .records()
        .map(|record| {
            let record = record.map_err(|e| {
                malformed(e.position().map(|p| p.line()).unwrap_or_default(), &e)
            })?;
            let line = line_of(&record);
            if record.len() != SECRET_HEADER.len() {
                return Err(malformed(
                    line,
                    format!("expected {} fields, found {}", SECRET_HEADER.len(), record.len()),
                ));
            }
            let raw: SecretRecord = record.deserialize(None).map_err(|e| malformed(line, e))?;
            Ok(ImportedSecret {
                level: raw.level,
                provider: raw.provider,
                name: raw.name.trim().to_string(),
                value: raw.value,
                access: raw.access.trim().to_string(),
                repository_names: split_cell(raw.repository_names.trim()),
                repository_ids: split_cell(raw.repository_ids.trim()),
            })
        })
        .collect();

    Ok(rows)
}

/// Parse every data row of a variables CSV.
pub fn parse_variables<R: io::Read>(
    input: R,
) -> csv::Result<Vec<Result<ImportedVariable, SchemaError>>> {
    let mut rdr = reader(input);
    rdr.headers()?;

    let rows = rdr
        .records()
        .map(|record| {
            let record = record.map_err(|e| {
                malformed(e.position().map(|p| p.line()).unwrap_or_default(), &e)
            })?;
            let line = line_of(&record);
            if record.len() != VARIABLE_HEADER.len() {
                return Err(malformed(
                    line,
                    format!("expected {} fields, found {}", VARIABLE_HEADER.len(), record.len()),
                ));
            }
            let raw: VariableRecord = record.deserialize(None).map_err(|e| malformed(line, e))?;
            Ok(ImportedVariable {
                level: raw.level,
                name: raw.name.trim().to_string(),
                value: raw.value,
                access: raw.access.trim().to_string(),
                repository_names: split_cell(raw.repository_names.trim()),
                repository_ids: split_cell(raw.repository_ids.trim()),
            })
        })
        .collect();

    Ok(rows)
}
