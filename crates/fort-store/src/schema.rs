//! Table configuration and the `abilities` migration.
//!
//! The table name is resolved once, when the store is built, and validated
//! there: it is interpolated into DDL, so only plain identifiers are
//! accepted. Configuration is loaded from environment variables with a
//! default suitable for most deployments.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::ConfigError;

/// Environment variable naming the abilities table.
pub const ABILITIES_TABLE_ENV: &str = "FORT_ABILITIES_TABLE";

/// Default abilities table name.
pub const DEFAULT_ABILITIES_TABLE: &str = "abilities";

const MAX_IDENTIFIER_LEN: usize = 63;

/// Schema configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaConfig {
    /// Name of the abilities table.
    pub abilities_table: String,
}

impl Default for SchemaConfig {
    fn default() -> Self {
        Self {
            abilities_table: DEFAULT_ABILITIES_TABLE.to_string(),
        }
    }
}

impl SchemaConfig {
    /// Use a specific abilities table name.
    pub fn with_abilities_table(table: impl Into<String>) -> Self {
        Self {
            abilities_table: table.into(),
        }
    }

    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `FORT_ABILITIES_TABLE`: abilities table name (default: abilities)
    ///
    /// An invalid value is logged and the default is used.
    pub fn from_env() -> Self {
        Self::from_value(std::env::var(ABILITIES_TABLE_ENV).ok())
    }

    fn from_value(value: Option<String>) -> Self {
        let Some(table) = value else {
            return Self::default();
        };
        let config = Self::with_abilities_table(table.trim());
        match config.validate() {
            Ok(()) => config,
            Err(e) => {
                warn!(error = %e, "Falling back to default abilities table");
                Self::default()
            }
        }
    }

    /// Validate that table names are plain SQL identifiers.
    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_identifier(ABILITIES_TABLE_ENV, &self.abilities_table)
    }
}

fn validate_identifier(key: &str, name: &str) -> Result<(), ConfigError> {
    let invalid = |message: &str| ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    };

    let mut chars = name.chars();
    match chars.next() {
        None => return Err(invalid("must not be empty")),
        Some(c) if !(c.is_ascii_alphabetic() || c == '_') => {
            return Err(invalid("must start with a letter or underscore"))
        }
        _ => {}
    }
    if !chars.all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("may only contain letters, digits and underscores"));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(invalid("is longer than 63 characters"));
    }
    Ok(())
}

/// Column definition in the abilities table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Column {
    /// Column name
    pub name: &'static str,
    /// SQL type
    pub sql_type: &'static str,
    /// Whether NULL is allowed
    pub nullable: bool,
}

const fn column(name: &'static str, sql_type: &'static str, nullable: bool) -> Column {
    Column {
        name,
        sql_type,
        nullable,
    }
}

/// Columns of the abilities table, in creation order.
pub const ABILITY_COLUMNS: &[Column] = &[
    column("id", "SERIAL PRIMARY KEY", false),
    column("action", "VARCHAR(255)", false),
    column("resource", "VARCHAR(255)", false),
    column("policy", "VARCHAR(255)", true),
    column("name", "VARCHAR(255)", false),
    column("description", "TEXT", true),
    column("created_at", "TIMESTAMP", true),
    column("updated_at", "TIMESTAMP", true),
    column("deleted_at", "TIMESTAMP", true),
];

/// Columns forming the unique key.
pub const ABILITY_UNIQUE_KEY: &[&str] = &["action", "resource"];

/// Migration creating and dropping the abilities table.
///
/// The unique key on (action, resource) is a partial index over active rows
/// with trimmed, lowercased values. That is the rule the in-memory registry
/// enforces: a soft-deleted ability does not block redefining its key, and
/// `View`/`view` collide.
///
/// # Example
///
/// ```
/// use fort_store::schema::{AbilitiesMigration, SchemaConfig};
///
/// # fn main() -> Result<(), fort_store::ConfigError> {
/// let migration = AbilitiesMigration::new(&SchemaConfig::with_abilities_table("fort_abilities"))?;
/// assert!(migration.up().starts_with("CREATE TABLE fort_abilities ("));
/// assert_eq!(migration.down(), "DROP TABLE IF EXISTS fort_abilities;");
///
/// assert!(AbilitiesMigration::new(&SchemaConfig::with_abilities_table("x; DROP TABLE users")).is_err());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct AbilitiesMigration {
    table: String,
}

impl AbilitiesMigration {
    /// Create the migration for the configured table.
    ///
    /// # Errors
    ///
    /// `InvalidValue` if the table name is not a plain identifier.
    pub fn new(config: &SchemaConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            table: config.abilities_table.clone(),
        })
    }

    /// Table this migration manages.
    pub fn table(&self) -> &str {
        &self.table
    }

    /// DDL creating the table and its unique index.
    pub fn up(&self) -> String {
        let lines: Vec<String> = ABILITY_COLUMNS
            .iter()
            .map(|c| {
                let null = if c.nullable || c.sql_type.contains("PRIMARY KEY") {
                    ""
                } else {
                    " NOT NULL"
                };
                format!("    {} {}{}", c.name, c.sql_type, null)
            })
            .collect();
        let key: Vec<String> = ABILITY_UNIQUE_KEY
            .iter()
            .map(|c| format!("lower(trim({}))", c))
            .collect();
        format!(
            "CREATE TABLE {table} (\n{columns}\n);\n\
             CREATE UNIQUE INDEX {table}_{name}_unique ON {table} ({key}) WHERE deleted_at IS NULL;",
            table = self.table,
            columns = lines.join(",\n"),
            name = ABILITY_UNIQUE_KEY.join("_"),
            key = key.join(", "),
        )
    }

    /// DDL dropping the table.
    pub fn down(&self) -> String {
        format!("DROP TABLE IF EXISTS {};", self.table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = SchemaConfig::default();
        assert_eq!(config.abilities_table, "abilities");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_value() {
        assert_eq!(SchemaConfig::from_value(None), SchemaConfig::default());
        assert_eq!(
            SchemaConfig::from_value(Some(" fort_abilities ".to_string())).abilities_table,
            "fort_abilities"
        );
        // Invalid names fall back to the default
        assert_eq!(
            SchemaConfig::from_value(Some("abilities; DROP TABLE users".to_string())),
            SchemaConfig::default()
        );
    }

    #[test]
    fn test_validate() {
        assert!(SchemaConfig::with_abilities_table("_abilities2").validate().is_ok());
        assert!(SchemaConfig::with_abilities_table("").validate().is_err());
        assert!(SchemaConfig::with_abilities_table("2abilities").validate().is_err());
        assert!(SchemaConfig::with_abilities_table("my-abilities").validate().is_err());
        assert!(SchemaConfig::with_abilities_table("a".repeat(64)).validate().is_err());

        let err = SchemaConfig::with_abilities_table("").validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid configuration value for FORT_ABILITIES_TABLE: must not be empty"
        );
    }

    #[test]
    fn test_migration_up() {
        let sql = AbilitiesMigration::new(&SchemaConfig::default()).unwrap().up();
        assert!(sql.starts_with("CREATE TABLE abilities ("));
        assert!(sql.contains("    id SERIAL PRIMARY KEY,\n"));
        assert!(sql.contains("    action VARCHAR(255) NOT NULL,\n"));
        assert!(sql.contains("    policy VARCHAR(255),\n"));
        assert!(sql.contains("    description TEXT,\n"));
        assert!(sql.contains("    deleted_at TIMESTAMP\n);\n"));
        assert!(sql.ends_with(
            "CREATE UNIQUE INDEX abilities_action_resource_unique ON abilities \
             (lower(trim(action)), lower(trim(resource))) WHERE deleted_at IS NULL;"
        ));
    }

    #[test]
    fn test_migration_rejects_unsafe_table_names() {
        for name in ["x; DROP TABLE users", "x (id int); DROP TABLE users; --", "", "a b"] {
            let err = AbilitiesMigration::new(&SchemaConfig::with_abilities_table(name)).unwrap_err();
            assert!(matches!(err, ConfigError::InvalidValue { ref key, .. } if key == ABILITIES_TABLE_ENV));
        }
    }

    #[test]
    fn test_migration_down() {
        let migration = AbilitiesMigration::new(&SchemaConfig::default()).unwrap();
        assert_eq!(migration.table(), "abilities");
        assert_eq!(migration.down(), "DROP TABLE IF EXISTS abilities;");
    }

    #[test]
    fn test_columns_match_ability_fields() {
        let names: Vec<&str> = ABILITY_COLUMNS.iter().map(|c| c.name).collect();
        assert_eq!(
            names,
            vec![
                "id",
                "action",
                "resource",
                "policy",
                "name",
                "description",
                "created_at",
                "updated_at",
                "deleted_at"
            ]
        );
    }
}
