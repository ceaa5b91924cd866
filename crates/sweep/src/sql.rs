//! SQL text for residual scans and cascade deletes
//!
//! Table and column names come from relation metadata and are quoted here;
//! type labels and keys are always bound as parameters.

use morphsweep_errors::{Error, SweepError};
use morphsweep_types::{EntityMeta, RelationDescriptor, ScanMode};

/// Alias given to the parent table inside correlated sub-queries, so a
/// relation whose children live in the parent's own table stays unambiguous.
const PARENT_ALIAS: &str = "morph_parent";

/// Quote an identifier, splitting `schema.table` into separately quoted parts
///
/// # Errors
///
/// Returns an error if the identifier (or any dotted segment) is empty or
/// contains a NUL byte.
pub fn quote_ident(ident: &str) -> Result<String, Error> {
    let invalid = || SweepError::InvalidIdentifier {
        ident: ident.to_string(),
    };
    if ident.contains('\0') {
        return Err(invalid().into());
    }

    let mut quoted = String::with_capacity(ident.len() + 2);
    for (i, part) in ident.split('.').enumerate() {
        if part.is_empty() {
            return Err(invalid().into());
        }
        if i > 0 {
            quoted.push('.');
        }
        quoted.push('"');
        quoted.push_str(&part.replace('"', "\"\""));
        quoted.push('"');
    }
    Ok(quoted)
}

/// Statements over one relation's child table
#[derive(Debug, Clone)]
pub struct RelationStatements {
    child: String,
    morph_type: String,
    morph_key: String,
}

impl RelationStatements {
    /// # Errors
    ///
    /// Returns an error if any identifier in the descriptor is invalid.
    pub fn new(descriptor: &RelationDescriptor) -> Result<Self, Error> {
        Ok(Self {
            child: quote_ident(&descriptor.child_table)?,
            morph_type: quote_ident(&descriptor.morph_type_column)?,
            morph_key: quote_ident(&descriptor.morph_key_column)?,
        })
    }

    fn head(&self, mode: ScanMode) -> String {
        match mode {
            ScanMode::Delete => format!("DELETE FROM {}", self.child),
            ScanMode::DryRun => format!("SELECT COUNT(*) FROM {}", self.child),
        }
    }

    /// Label as text; type columns without TEXT affinity may hold integers
    fn label_text(&self) -> String {
        format!("CAST({} AS TEXT)", self.morph_type)
    }

    /// Distinct type labels present in the child table, NULL first
    #[must_use]
    pub fn distinct_labels(&self) -> String {
        format!(
            "SELECT {label} FROM {child} GROUP BY 1 ORDER BY 1",
            label = self.label_text(),
            child = self.child
        )
    }

    /// Rows of label `?1` whose parent row is missing from `parent`'s table
    ///
    /// # Errors
    ///
    /// Returns an error if the parent's table or key column is invalid.
    pub fn orphans(&self, parent: &EntityMeta, mode: ScanMode) -> Result<String, Error> {
        let parent_table = quote_ident(&parent.table)?;
        let parent_key = quote_ident(&parent.key_column)?;
        Ok(format!(
            "{head} WHERE {label} = ?1 AND NOT EXISTS \
             (SELECT 1 FROM {parent_table} AS {PARENT_ALIAS} \
             WHERE {PARENT_ALIAS}.{parent_key} = {child}.{key})",
            head = self.head(mode),
            label = self.label_text(),
            child = self.child,
            key = self.morph_key,
        ))
    }

    /// Every row of label `?1`
    #[must_use]
    pub fn label(&self, mode: ScanMode) -> String {
        format!("{} WHERE {} = ?1", self.head(mode), self.label_text())
    }

    /// Every row whose label is NULL
    #[must_use]
    pub fn null_label(&self, mode: ScanMode) -> String {
        format!("{} WHERE {} IS NULL", self.head(mode), self.morph_type)
    }

    /// Rows owned by the parent with label `?1` and key `?2`
    #[must_use]
    pub fn dependents(&self) -> String {
        format!(
            "DELETE FROM {} WHERE {} = ?1 AND {} = ?2",
            self.child, self.morph_type, self.morph_key
        )
    }
}

/// Delete the parent row with key `?1`
///
/// # Errors
///
/// Returns an error if the entity's table or key column is invalid.
pub fn delete_parent(meta: &EntityMeta) -> Result<String, Error> {
    Ok(format!(
        "DELETE FROM {} WHERE {} = ?1",
        quote_ident(&meta.table)?,
        quote_ident(&meta.key_column)?
    ))
}
