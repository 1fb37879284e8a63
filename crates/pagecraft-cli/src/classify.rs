//! Block classification table for the `classify` command.

use std::path::Path;

use anyhow::{Context, Result};
use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use pagecraft_model::Block;
use tracing::debug;

type Predicate = fn(&Block) -> bool;

const CAPABILITIES: [(&str, Predicate); 13] = [
    ("system", Block::is_system),
    ("children", Block::can_have_children),
    ("align", Block::can_have_align),
    ("color", Block::can_have_color),
    ("background", Block::can_have_background),
    ("marks", Block::can_have_marks),
    ("turn", Block::can_turn),
    ("history", Block::can_have_history),
    ("indent", Block::is_indentable),
    ("focus", Block::is_focusable),
    ("select", Block::is_selectable),
    ("drag", Block::is_draggable),
    ("readonly", Block::is_object_read_only),
];

/// One row of the classification table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlockRow {
    pub id: String,
    pub block_type: &'static str,
    pub capabilities: Vec<&'static str>,
    /// Text length in characters.
    pub length: usize,
}

/// Read a JSON array (or single object) of backend blocks.
pub fn load_blocks(path: &Path) -> Result<Vec<Block>> {
    let input = std::fs::read_to_string(path)
        .with_context(|| format!("read {}", path.display()))?;
    let blocks = Block::list_from_json(&input)
        .with_context(|| format!("parse blocks from {}", path.display()))?;
    debug!(count = blocks.len(), "blocks loaded");
    Ok(blocks)
}

pub fn classify(blocks: &[Block]) -> Vec<BlockRow> {
    blocks
        .iter()
        .map(|block| BlockRow {
            id: block.id.clone(),
            block_type: block.block_type.as_str(),
            capabilities: CAPABILITIES
                .iter()
                .filter(|(_, predicate)| predicate(block))
                .map(|(name, _)| *name)
                .collect(),
            length: block.get_length(),
        })
        .collect()
}

pub fn render_table(rows: &[BlockRow]) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Id"),
        header_cell("Type"),
        header_cell("Capabilities"),
        header_cell("Length"),
    ]);
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
    if let Some(column) = table.column_mut(3) {
        column.set_cell_alignment(CellAlignment::Right);
    }
    for row in rows {
        let capabilities = if row.capabilities.is_empty() {
            Cell::new("-").fg(Color::DarkGrey)
        } else {
            Cell::new(row.capabilities.join(" "))
        };
        table.add_row(vec![
            Cell::new(&row.id),
            Cell::new(row.block_type),
            capabilities,
            Cell::new(row.length),
        ]);
    }
    table
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label).fg(Color::Cyan).add_attribute(Attribute::Bold)
}
