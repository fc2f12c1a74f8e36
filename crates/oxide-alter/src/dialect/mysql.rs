//! MySQL dialect.
//!
//! MySQL can express every operation the planner emits: columns are changed
//! and moved with `CHANGE COLUMN ... FIRST | AFTER`, constraints and foreign
//! keys are added and dropped after creation, and table options are altered
//! in place.

use crate::operation::{AddIndexOp, ColumnPosition, CreateTableOp, DropIndexOp, Operation};
use crate::policy::CapabilityPolicy;
use crate::schema::{Column, ColumnOptions, ColumnType, Index, IndexMethod, TableOptions};

use super::{quote_literal, StatementRenderer};

/// MySQL dialect: full DDL capability policy and statement renderer.
#[derive(Debug, Clone, Default)]
pub struct MysqlDialect;

impl MysqlDialect {
    /// Creates a new MySQL dialect.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Generates a column definition.
    fn column_definition(&self, column: &Column) -> String {
        let options = &column.options;
        let mut parts = vec![
            self.quote_identifier(&column.name),
            self.type_name(options),
        ];

        if let Some(charset) = &options.charset {
            parts.push(format!("CHARACTER SET {charset}"));
        }
        if let Some(collation) = &options.collation {
            parts.push(format!("COLLATE {collation}"));
        }

        parts.push(if options.is_nullable() { "NULL" } else { "NOT NULL" }.to_string());

        if let Some(default) = &options.default {
            parts.push(format!("DEFAULT {}", default.to_sql()));
        }
        if options.is_auto_increment() {
            parts.push("AUTO_INCREMENT".to_string());
        }
        if let Some(comment) = &options.comment {
            parts.push(format!("COMMENT {}", quote_literal(comment)));
        }

        parts.join(" ")
    }

    fn position_sql(&self, position: Option<&ColumnPosition>) -> String {
        match position {
            None => String::new(),
            Some(ColumnPosition::First) => " FIRST".to_string(),
            Some(ColumnPosition::After(column)) => {
                format!(" AFTER {}", self.quote_identifier(column))
            }
        }
    }

    /// Generates the key definition used both inside CREATE TABLE and after
    /// `ALTER TABLE ... ADD`.
    fn key_definition(&self, index: &Index) -> String {
        let columns = self.column_list(&index.options.columns);
        if index.is_primary() {
            return format!("PRIMARY KEY {columns}");
        }

        let name = self.quote_identifier(&index.name);
        let method = index.method();
        let kind = match method {
            IndexMethod::FullText => "FULLTEXT INDEX",
            IndexMethod::Spatial => "SPATIAL INDEX",
            _ if index.is_constraint() => "UNIQUE INDEX",
            _ => "INDEX",
        };
        match index.options.method {
            Some(IndexMethod::BTree) => format!("{kind} {name} {columns} USING BTREE"),
            Some(IndexMethod::Hash) => format!("{kind} {name} {columns} USING HASH"),
            _ => format!("{kind} {name} {columns}"),
        }
    }

    fn table_options_sql(&self, options: &TableOptions) -> Vec<String> {
        let mut parts = Vec::new();
        if let Some(engine) = &options.engine {
            parts.push(format!("ENGINE={engine}"));
        }
        if let Some(charset) = &options.charset {
            parts.push(format!("DEFAULT CHARSET={charset}"));
        }
        if let Some(collation) = &options.collation {
            parts.push(format!("COLLATE={collation}"));
        }
        if let Some(comment) = &options.comment {
            parts.push(format!("COMMENT={}", quote_literal(comment)));
        }
        parts
    }

    fn create_table_sql(&self, op: &CreateTableOp) -> String {
        let mut parts: Vec<String> = op
            .columns
            .iter()
            .map(|c| self.column_definition(c))
            .collect();
        parts.extend(op.indexes.iter().map(|index| self.key_definition(index)));
        parts.extend(op.foreign_keys.iter().map(|fk| self.foreign_key_clause(fk)));

        let mut sql = format!(
            "CREATE TABLE {} (\n  {}\n)",
            self.quote_identifier(&op.table),
            parts.join(",\n  ")
        );
        let options = self.table_options_sql(&op.options);
        if !options.is_empty() {
            sql.push(' ');
            sql.push_str(&options.join(" "));
        }
        sql
    }

    fn add_index_sql(&self, op: &AddIndexOp) -> String {
        format!(
            "ALTER TABLE {} ADD {}",
            self.quote_identifier(&op.table),
            self.key_definition(&op.index)
        )
    }

    fn drop_index_sql(&self, op: &DropIndexOp) -> String {
        let table = self.quote_identifier(&op.table);
        if op.index.is_primary() {
            format!("ALTER TABLE {table} DROP PRIMARY KEY")
        } else {
            format!(
                "ALTER TABLE {table} DROP INDEX {}",
                self.quote_identifier(&op.index.name)
            )
        }
    }
}

impl CapabilityPolicy for MysqlDialect {
    fn name(&self) -> &'static str {
        "mysql"
    }

    fn supports_alter_column(&self) -> bool {
        true
    }

    fn supports_column_positions(&self) -> bool {
        true
    }

    fn supports_constraint_changes(&self) -> bool {
        true
    }

    fn supports_foreign_key_changes(&self) -> bool {
        true
    }

    fn supports_table_options(&self) -> bool {
        true
    }

    fn supports_inline_indexes(&self) -> bool {
        true
    }
}

impl StatementRenderer for MysqlDialect {
    fn generate_sql(&self, operation: &Operation) -> Vec<String> {
        match operation {
            Operation::CreateTable(op) => vec![self.create_table_sql(op)],

            Operation::CreateIndex(op) => vec![self.add_index_sql(&AddIndexOp {
                table: op.table.clone(),
                index: op.index.clone(),
            })],

            Operation::AddIndex(op) => vec![self.add_index_sql(op)],

            Operation::DropIndex(op) => vec![self.drop_index_sql(op)],

            Operation::DropTable(op) => {
                vec![format!("DROP TABLE {}", self.quote_identifier(&op.table))]
            }

            Operation::RenameTable(op) => vec![format!(
                "RENAME TABLE {} TO {}",
                self.quote_identifier(&op.old_name),
                self.quote_identifier(&op.new_name)
            )],

            Operation::AddColumn(op) => vec![format!(
                "ALTER TABLE {} ADD COLUMN {}{}",
                self.quote_identifier(&op.table),
                self.column_definition(&op.column),
                self.position_sql(op.position.as_ref())
            )],

            Operation::ChangeColumn(op) => vec![format!(
                "ALTER TABLE {} CHANGE COLUMN {} {}{}",
                self.quote_identifier(&op.table),
                self.quote_identifier(&op.name),
                self.column_definition(&op.column),
                self.position_sql(op.position.as_ref())
            )],

            Operation::DropColumn(op) => vec![format!(
                "ALTER TABLE {} DROP COLUMN {}",
                self.quote_identifier(&op.table),
                self.quote_identifier(&op.column)
            )],

            Operation::AddForeignKey(op) => vec![format!(
                "ALTER TABLE {} ADD {}",
                self.quote_identifier(&op.table),
                self.foreign_key_clause(&op.foreign_key)
            )],

            Operation::DropForeignKey(op) => vec![format!(
                "ALTER TABLE {} DROP FOREIGN KEY {}",
                self.quote_identifier(&op.table),
                self.quote_identifier(&op.name)
            )],

            Operation::AlterTableOptions(op) => vec![format!(
                "ALTER TABLE {} {}",
                self.quote_identifier(&op.table),
                self.table_options_sql(&op.options).join(" ")
            )],
        }
    }

    fn type_name(&self, options: &ColumnOptions) -> String {
        let Some(column_type) = options.column_type else {
            return "TEXT".to_string();
        };

        let sized = |name: &str, default: Option<u32>| match options.length.or(default) {
            Some(length) => format!("{name}({length})"),
            None => name.to_string(),
        };

        let mut name = match column_type {
            ColumnType::TinyInt => sized("TINYINT", None),
            ColumnType::SmallInt => sized("SMALLINT", None),
            ColumnType::Integer => sized("INT", None),
            ColumnType::BigInt => sized("BIGINT", None),
            ColumnType::Boolean => "TINYINT(1)".to_string(),
            ColumnType::Decimal | ColumnType::Float | ColumnType::Double => {
                let base = match column_type {
                    ColumnType::Decimal => "DECIMAL",
                    ColumnType::Float => "FLOAT",
                    _ => "DOUBLE",
                };
                match (options.precision, options.scale) {
                    (Some(precision), Some(scale)) => format!("{base}({precision},{scale})"),
                    (Some(precision), None) => format!("{base}({precision})"),
                    _ => base.to_string(),
                }
            }
            ColumnType::Char => sized("CHAR", Some(1)),
            ColumnType::Varchar => sized("VARCHAR", Some(255)),
            ColumnType::Text => "TEXT".to_string(),
            ColumnType::Blob => "BLOB".to_string(),
            ColumnType::Binary => sized("BINARY", Some(1)),
            ColumnType::VarBinary => sized("VARBINARY", Some(255)),
            ColumnType::Date => "DATE".to_string(),
            ColumnType::Time => "TIME".to_string(),
            ColumnType::DateTime => "DATETIME".to_string(),
            ColumnType::Timestamp => "TIMESTAMP".to_string(),
            ColumnType::Json => "JSON".to_string(),
            ColumnType::Uuid => "CHAR(36)".to_string(),
        };

        if options.unsigned.unwrap_or(false) {
            name.push_str(" UNSIGNED");
        }
        name
    }

    fn quote_identifier(&self, name: &str) -> String {
        format!("`{}`", name.replace('`', "``"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::operation::{
        AddColumnOp, AddForeignKeyOp, AlterTableOptionsOp, ChangeColumnOp, DropForeignKeyOp,
        RenameTableOp,
    };
    use crate::schema::{
        DefaultValue, ForeignKey, ForeignKeyAction, ForeignKeyOptions, IndexOptions, PRIMARY_KEY,
    };

    fn dialect() -> MysqlDialect {
        MysqlDialect::new()
    }

    #[test]
    fn test_create_table_with_keys_and_options() {
        let op = CreateTableOp {
            table: "users".to_string(),
            columns: vec![
                Column::new(
                    "id",
                    ColumnOptions::new(ColumnType::Integer)
                        .unsigned()
                        .not_null()
                        .auto_increment(),
                ),
                Column::new(
                    "email",
                    ColumnOptions::new(ColumnType::Varchar).length(255).not_null(),
                ),
            ],
            indexes: vec![
                Index::new(PRIMARY_KEY, IndexOptions::on(["id"])),
                Index::new("uniq_email", IndexOptions::on(["email"]).unique()),
            ],
            foreign_keys: Vec::new(),
            options: TableOptions::new().engine("InnoDB").charset("utf8mb4"),
        };

        let sql = dialect().generate_sql(&op.into());
        assert_eq!(
            sql[0],
            "CREATE TABLE `users` (\n  `id` INT UNSIGNED NOT NULL AUTO_INCREMENT,\n  \
             `email` VARCHAR(255) NOT NULL,\n  PRIMARY KEY (`id`),\n  \
             UNIQUE INDEX `uniq_email` (`email`)\n) ENGINE=InnoDB DEFAULT CHARSET=utf8mb4"
        );
    }

    #[test]
    fn test_add_column_after() {
        let op = AddColumnOp {
            table: "users".to_string(),
            column: Column::new(
                "value",
                ColumnOptions::new(ColumnType::Decimal)
                    .precision(10)
                    .scale(2)
                    .default_value(DefaultValue::Literal("0".to_string())),
            ),
            position: Some(ColumnPosition::after("id")),
        };

        let sql = dialect().generate_sql(&op.into());
        assert_eq!(
            sql[0],
            "ALTER TABLE `users` ADD COLUMN `value` DECIMAL(10,2) NULL DEFAULT '0' AFTER `id`"
        );
    }

    #[test]
    fn test_change_column_renames_and_moves() {
        let previous = ColumnOptions::new(ColumnType::Varchar).length(80);
        let op = ChangeColumnOp {
            table: "users".to_string(),
            name: "name".to_string(),
            new_name: Some("label".to_string()),
            column: Column::new("label", previous.clone().not_null().comment("it's shown")),
            previous,
            position: Some(ColumnPosition::First),
        };

        let sql = dialect().generate_sql(&op.into());
        assert_eq!(
            sql[0],
            "ALTER TABLE `users` CHANGE COLUMN `name` `label` VARCHAR(80) NOT NULL \
             COMMENT 'it''s shown' FIRST"
        );
    }

    #[test]
    fn test_index_statements() {
        let d = dialect();

        let fulltext = AddIndexOp {
            table: "posts".to_string(),
            index: Index::new(
                "ft_body",
                IndexOptions::on(["body"]).method(IndexMethod::FullText),
            ),
        };
        assert_eq!(
            d.generate_sql(&fulltext.into())[0],
            "ALTER TABLE `posts` ADD FULLTEXT INDEX `ft_body` (`body`)"
        );

        let hash = AddIndexOp {
            table: "posts".to_string(),
            index: Index::new("idx_slug", IndexOptions::on(["slug"]).method(IndexMethod::Hash)),
        };
        assert_eq!(
            d.generate_sql(&hash.into())[0],
            "ALTER TABLE `posts` ADD INDEX `idx_slug` (`slug`) USING HASH"
        );

        let primary = DropIndexOp {
            table: "posts".to_string(),
            index: Index::new(PRIMARY_KEY, IndexOptions::on(["id"])),
        };
        assert_eq!(
            d.generate_sql(&primary.into())[0],
            "ALTER TABLE `posts` DROP PRIMARY KEY"
        );
    }

    #[test]
    fn test_foreign_key_statements() {
        let d = dialect();

        let add = AddForeignKeyOp {
            table: "posts".to_string(),
            foreign_key: ForeignKey::new(
                "fk_posts_user",
                ForeignKeyOptions::new(["user_id"], "users", ["id"])
                    .on_delete(ForeignKeyAction::SetNull)
                    .on_update(ForeignKeyAction::Cascade),
            ),
        };
        assert_eq!(
            d.generate_sql(&add.into())[0],
            "ALTER TABLE `posts` ADD CONSTRAINT `fk_posts_user` FOREIGN KEY (`user_id`) \
             REFERENCES `users` (`id`) ON DELETE SET NULL ON UPDATE CASCADE"
        );

        let drop = DropForeignKeyOp {
            table: "posts".to_string(),
            name: "fk_posts_user".to_string(),
        };
        assert_eq!(
            d.generate_sql(&drop.into())[0],
            "ALTER TABLE `posts` DROP FOREIGN KEY `fk_posts_user`"
        );
    }

    #[test]
    fn test_table_statements() {
        let d = dialect();

        let rename = RenameTableOp {
            old_name: "users".to_string(),
            new_name: "accounts".to_string(),
        };
        assert_eq!(
            d.generate_sql(&rename.into())[0],
            "RENAME TABLE `users` TO `accounts`"
        );

        let options = AlterTableOptionsOp {
            table: "accounts".to_string(),
            options: TableOptions::new().collation("utf8mb4_bin").comment("Accounts"),
        };
        assert_eq!(
            d.generate_sql(&options.into())[0],
            "ALTER TABLE `accounts` COLLATE=utf8mb4_bin COMMENT='Accounts'"
        );
    }

    #[test]
    fn test_type_names() {
        let d = dialect();
        assert_eq!(d.type_name(&ColumnOptions::new(ColumnType::Varchar)), "VARCHAR(255)");
        assert_eq!(
            d.type_name(&ColumnOptions::new(ColumnType::BigInt).length(20).unsigned()),
            "BIGINT(20) UNSIGNED"
        );
        assert_eq!(d.type_name(&ColumnOptions::new(ColumnType::Boolean)), "TINYINT(1)");
        assert_eq!(d.type_name(&ColumnOptions::new(ColumnType::Uuid)), "CHAR(36)");
    }
}
