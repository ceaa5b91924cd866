//! Output rendering and formatting

use comfy_table::{presets::UTF8_FULL, Attribute, Cell, Color, ContentArrangement, Table};
use console::{Style, Term};
use morphsweep_types::{
    CascadeReport, ColorChoice, RelationDescriptor, SkippedAccessor, SweepReport,
};
use serde::Serialize;
use std::io;

/// One declared entity, as listed by `entities`
#[derive(Debug, Clone, Serialize)]
pub struct EntitySummary {
    pub label: String,
    pub table: String,
    pub key: String,
    pub cascade: bool,
    pub accessors: Vec<String>,
}

/// Resolved relation of an entity, as listed by `relations`
#[derive(Debug, Clone, Serialize)]
pub struct RelationListing {
    pub accessor: String,
    #[serde(flatten)]
    pub descriptor: RelationDescriptor,
}

/// Relation catalog of one entity
#[derive(Debug, Clone, Serialize)]
pub struct RelationCatalog {
    pub label: String,
    pub relations: Vec<RelationListing>,
    pub skipped: Vec<SkippedAccessor>,
}

/// Result of a command, rendered as a table or JSON
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum OperationResult {
    Sweep(SweepReport),
    Cascade(CascadeReport),
    Entities(Vec<EntitySummary>),
    Relations(RelationCatalog),
}

/// Output renderer for CLI results
#[derive(Clone)]
pub struct OutputRenderer {
    /// Use JSON output format
    json_output: bool,
    /// Color configuration
    color_choice: ColorChoice,
    /// Terminal instance
    term: Term,
}

impl OutputRenderer {
    /// Create new output renderer
    pub fn new(json_output: bool, color_choice: ColorChoice) -> Self {
        Self {
            json_output,
            color_choice,
            term: Term::stdout(),
        }
    }

    /// Whether styled output should be produced
    pub fn colors_enabled(&self) -> bool {
        match self.color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.term.features().colors_supported(),
        }
    }

    /// Render operation result
    pub fn render_result(&self, result: &OperationResult) -> io::Result<()> {
        if self.json_output {
            self.render_json(result)
        } else {
            self.render_table(result)
        }
    }

    /// Render as JSON
    fn render_json(&self, result: &OperationResult) -> io::Result<()> {
        let json = serde_json::to_string_pretty(result).map_err(io::Error::other)?;
        println!("{json}");
        Ok(())
    }

    /// Render as formatted table
    fn render_table(&self, result: &OperationResult) -> io::Result<()> {
        match result {
            OperationResult::Sweep(report) => self.render_sweep_report(report),
            OperationResult::Cascade(report) => self.render_cascade_report(report),
            OperationResult::Entities(entities) => self.render_entities(entities),
            OperationResult::Relations(catalog) => self.render_relations(catalog),
        }
    }

    fn new_table(headers: &[&str]) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL)
            .set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).add_attribute(Attribute::Bold))
                .collect::<Vec<_>>(),
        );
        table
    }

    fn render_sweep_report(&self, report: &SweepReport) -> io::Result<()> {
        let mut table =
            Self::new_table(&["Entity", "Relation", "Table", "Label", "Parent", "Rows"]);
        let mut any = false;

        for entity in &report.entities {
            for relation in &entity.relations {
                for outcome in relation.labels.iter().filter(|o| o.rows > 0) {
                    any = true;
                    let parent = match &outcome.parent_table {
                        Some(table) => Cell::new(table),
                        None => self.colored(Cell::new("(dangling)"), Color::Yellow),
                    };
                    table.add_row(vec![
                        Cell::new(&entity.label),
                        Cell::new(&relation.accessor),
                        Cell::new(&relation.descriptor.child_table),
                        Cell::new(outcome.label.as_deref().unwrap_or("NULL")),
                        parent,
                        Cell::new(outcome.rows),
                    ]);
                }
            }
        }

        if any {
            println!("{table}");
        }

        let verb = if report.mode.is_dry_run() {
            "Would remove"
        } else {
            "Removed"
        };
        println!(
            "{} {} residual row(s) across {} entit{} in {}ms",
            self.style_success(verb),
            report.total_rows(),
            report.entities.len(),
            if report.entities.len() == 1 { "y" } else { "ies" },
            report.duration_ms
        );
        Ok(())
    }

    fn render_cascade_report(&self, report: &CascadeReport) -> io::Result<()> {
        let Some(key) = &report.key else {
            println!("{} has no key; nothing deleted.", report.label);
            return Ok(());
        };

        if !report.relations.is_empty() {
            let mut table = Self::new_table(&["Relation", "Table", "Kind", "Rows"]);
            for relation in &report.relations {
                table.add_row(vec![
                    Cell::new(&relation.accessor),
                    Cell::new(&relation.table),
                    Cell::new(relation.kind),
                    Cell::new(relation.rows),
                ]);
            }
            println!("{table}");
        }

        println!(
            "{} {} dependent row(s) of {} {key}",
            self.style_success("Deleted"),
            report.dependent_rows(),
            report.label
        );
        if report.parent_deleted {
            println!("{} {} {key}", self.style_success("Deleted"), report.label);
        }
        Ok(())
    }

    fn render_entities(&self, entities: &[EntitySummary]) -> io::Result<()> {
        if entities.is_empty() {
            println!("No entities declared.");
            return Ok(());
        }

        let mut table = Self::new_table(&["Label", "Table", "Key", "Cascade", "Accessors"]);
        for entity in entities {
            let cascade = if entity.cascade {
                self.colored(Cell::new("yes"), Color::Green)
            } else {
                Cell::new("no")
            };
            table.add_row(vec![
                Cell::new(&entity.label),
                Cell::new(&entity.table),
                Cell::new(&entity.key),
                cascade,
                Cell::new(if entity.accessors.is_empty() {
                    "-".to_string()
                } else {
                    entity.accessors.join(", ")
                }),
            ]);
        }

        println!("{table}");
        Ok(())
    }

    fn render_relations(&self, catalog: &RelationCatalog) -> io::Result<()> {
        println!("{}", Style::new().bold().apply_to(&catalog.label));
        println!();

        if catalog.relations.is_empty() {
            println!("No morph relations.");
        } else {
            let mut table =
                Self::new_table(&["Accessor", "Table", "Type column", "Key column", "Kind"]);
            for relation in &catalog.relations {
                let d = &relation.descriptor;
                table.add_row(vec![
                    Cell::new(&relation.accessor),
                    Cell::new(&d.child_table),
                    Cell::new(&d.morph_type_column),
                    Cell::new(&d.morph_key_column),
                    Cell::new(d.kind),
                ]);
            }
            println!("{table}");
        }

        for skipped in &catalog.skipped {
            println!("  skipped `{}`: {}", skipped.accessor, skipped.reason);
        }
        Ok(())
    }

    fn colored(&self, cell: Cell, color: Color) -> Cell {
        if self.colors_enabled() {
            cell.fg(color)
        } else {
            cell
        }
    }

    fn style_success(&self, text: &str) -> String {
        if self.colors_enabled() {
            Style::new().green().bold().apply_to(text).to_string()
        } else {
            text.to_string()
        }
    }
}
